use clap::Parser;
use std::time::Duration;
use crate::error::ConfigError;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "admission-gateway")]
#[command(about = "HTTP gateway with per-client fixed-window admission control")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Max requests per client per window
    #[arg(long, default_value_t = 30)]
    pub rate_limit: u32,

    // Window length in seconds
    #[arg(long, default_value_t = 60)]
    pub rate_window: u64,

    // How often idle clients are dropped, in seconds
    #[arg(long, default_value_t = 120)]
    pub sweep_interval: u64,
}

impl Args {
    pub fn admission_config(&self) -> AdmissionConfig {
        AdmissionConfig {
            limit: self.rate_limit,
            window: Duration::from_secs(self.rate_window),
            sweep_interval: Duration::from_secs(self.sweep_interval),
        }
    }
}

// Longest window or sweep interval accepted; timers are scheduled as
// `Instant::now() + period`, which must not overflow
pub const MAX_PERIOD: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Settings of an [`AdmissionController`](crate::rate_limit::AdmissionController).
///
/// Fixed at construction; the controller never changes them afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Requests (admitted and rejected) a client may issue per window.
    pub limit: u32,
    /// Length of each client's window, anchored at its first request.
    pub window: Duration,
    /// Cadence of the idle-client sweep.
    pub sweep_interval: Duration,
}

impl AdmissionConfig {
    pub fn new(limit: u32, window: Duration, sweep_interval: Duration) -> Self {
        Self {
            limit,
            window,
            sweep_interval,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limit == 0 {
            return Err(ConfigError::ZeroLimit);
        }
        if self.window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        if self.window > MAX_PERIOD {
            return Err(ConfigError::WindowTooLong { max: MAX_PERIOD });
        }
        if self.sweep_interval > MAX_PERIOD {
            return Err(ConfigError::SweepIntervalTooLong { max: MAX_PERIOD });
        }
        Ok(())
    }
}
