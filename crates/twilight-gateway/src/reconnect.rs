//! Reconnection configuration and exponential backoff.

use std::time::Duration;

use rand::Rng;

use crate::error::GatewayError;

/// Configuration for reconnection behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectConfig {
    /// Delay before the first reconnection attempt.
    pub initial_delay: Duration,
    /// Maximum delay between reconnection attempts.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Maximum number of reconnection attempts (None = infinite).
    pub max_attempts: Option<u32>,
    /// Fraction of each delay that may be randomly shaved off (0.0..=1.0).
    pub jitter: f64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            max_attempts: Some(1000),
            jitter: 0.2,
        }
    }
}

impl ReconnectConfig {
    /// Calculate the un-jittered delay for the given attempt number (1-based).
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        calculate_backoff(
            attempt,
            self.initial_delay,
            self.max_delay,
            self.backoff_multiplier,
        )
    }

    /// Check if another attempt is allowed after `attempt` attempts.
    #[must_use]
    pub const fn should_reconnect(&self, attempt: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempt < max,
            None => true,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the multiplier shrinks delays, the jitter is out
    /// of range, or the initial delay exceeds the cap.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if !(self.backoff_multiplier >= 1.0) {
            return Err(GatewayError::Config(format!(
                "backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(GatewayError::Config(format!(
                "jitter must be within 0.0..=1.0, got {}",
                self.jitter
            )));
        }
        if self.initial_delay > self.max_delay {
            return Err(GatewayError::Config(
                "initial_delay cannot exceed max_delay".to_string(),
            ));
        }
        Ok(())
    }
}

/// Calculate reconnection delay using exponential backoff.
#[must_use]
pub fn calculate_backoff(
    attempt: u32,
    initial_delay: Duration,
    max_delay: Duration,
    multiplier: f64,
) -> Duration {
    let factor = multiplier.powi(attempt.saturating_sub(1) as i32);
    let delay_millis = initial_delay.as_millis() as f64 * factor;
    if !delay_millis.is_finite() || delay_millis >= max_delay.as_millis() as f64 {
        return max_delay;
    }
    Duration::from_millis(delay_millis as u64).min(max_delay)
}

/// Retry counter and delay state for one run of the supervisor.
///
/// Delays never decrease between consecutive attempts and never exceed
/// `max_delay`, with or without jitter.
#[derive(Debug, Clone)]
pub struct Backoff {
    config: ReconnectConfig,
    attempts: u32,
    last_delay: Duration,
}

impl Backoff {
    /// Create a fresh backoff.
    #[must_use]
    pub fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
            last_delay: Duration::ZERO,
        }
    }

    /// Number of attempts handed out since the last reset.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay before the next attempt, or `None` once the budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if !self.config.should_reconnect(self.attempts) {
            return None;
        }
        self.attempts += 1;

        let base = self.config.delay_for_attempt(self.attempts);
        let delay = apply_jitter(base, self.config.jitter)
            .max(self.last_delay)
            .min(self.config.max_delay);
        self.last_delay = delay;
        Some(delay)
    }

    /// Start over after a session reached `Ready`.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.last_delay = Duration::ZERO;
    }
}

fn apply_jitter(delay: Duration, jitter: f64) -> Duration {
    let jitter = jitter.clamp(0.0, 1.0);
    if jitter == 0.0 || delay.is_zero() {
        return delay;
    }
    let shave = rand::thread_rng().gen_range(0.0..=jitter);
    delay.mul_f64(1.0 - shave)
}
