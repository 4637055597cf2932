//! twilight - command-line client for the Twilight gateway and account API.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use twilight_cli::cli::{Cli, Commands};
use twilight_cli::commands::{AccountCommand, ListenCommand};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive("twilight=info".parse()?))
        .init();

    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut stdout = io::stdout().lock();

    let success = match cli.command {
        Commands::Listen(args) => {
            ListenCommand::new(&args).execute(&mut stdout).await?;
            true
        }
        Commands::Register(args) => AccountCommand::new(&args.api)?
            .register(&mut stdout, &args)
            .await?
            .is_success(),
        Commands::Login(args) => AccountCommand::new(&args.api)?
            .login(&mut stdout, &args)
            .await?
            .is_success(),
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
