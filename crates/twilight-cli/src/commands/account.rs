//! `twilight register` and `twilight login`.

use std::io::Write;

use anyhow::Result;
use twilight_client::{ApiClient, ApiConfig, ApiResponse};

use crate::cli::{LoginArgs, RegisterArgs};

/// Account API commands. Each prints the status line followed by the body.
#[derive(Debug, Clone)]
pub struct AccountCommand {
    api: ApiClient,
}

impl AccountCommand {
    /// Create a command against the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(ApiConfig::new(base_url)?)?,
        })
    }

    /// Register an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or output cannot be written.
    pub async fn register<W: Write>(
        &self,
        writer: &mut W,
        args: &RegisterArgs,
    ) -> Result<ApiResponse> {
        let response = self
            .api
            .register(&args.username, &args.password, &args.email)
            .await?;
        write_response(writer, &response)?;
        Ok(response)
    }

    /// Log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or output cannot be written.
    pub async fn login<W: Write>(&self, writer: &mut W, args: &LoginArgs) -> Result<ApiResponse> {
        let response = self.api.login(&args.password, &args.email).await?;
        write_response(writer, &response)?;
        Ok(response)
    }
}

fn write_response<W: Write>(writer: &mut W, response: &ApiResponse) -> Result<()> {
    writeln!(writer, "{}", response.status)?;
    writeln!(writer, "{}", response.body)?;
    Ok(())
}
