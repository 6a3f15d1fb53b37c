use crate::application::dispatcher::DispatcherConfig;
use crate::error::{PipelineError, Result};
use clap::Args;
use std::time::Duration;

/// Provider cap on messages per receive.
pub const MAX_BATCH_SIZE: u32 = 10;
/// Provider cap on long-poll wait.
pub const MAX_WAIT_TIME_SECS: u64 = 20;
/// Provider cap on visibility timeout (12 hours).
pub const MAX_VISIBILITY_TIMEOUT_SECS: u64 = 43_200;

/// Consumer tuning, settable by flag or environment variable.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ConsumerArgs {
    /// Milliseconds between poll cycles
    #[arg(long, env = "POLL_INTERVAL_MS", default_value_t = 1000)]
    pub poll_interval_ms: u64,

    /// Maximum messages requested per receive
    #[arg(long, env = "MAX_MESSAGES", default_value_t = 10)]
    pub max_messages: u32,

    /// Long-poll wait per receive, in seconds
    #[arg(long, env = "WAIT_TIME_SECS", default_value_t = 20)]
    pub wait_time_secs: u64,

    /// Seconds a received message stays hidden before redelivery
    #[arg(long, env = "VISIBILITY_TIMEOUT_SECS", default_value_t = 300)]
    pub visibility_timeout_secs: u64,

    /// Number of messages processed concurrently
    #[arg(long, env = "WORKER_POOL_SIZE", default_value_t = 5)]
    pub worker_pool_size: usize,

    /// Stop after the first poll that returns no messages
    #[arg(long)]
    pub exit_when_idle: bool,
}

impl Default for ConsumerArgs {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            max_messages: 10,
            wait_time_secs: 20,
            visibility_timeout_secs: 300,
            worker_pool_size: 5,
            exit_when_idle: false,
        }
    }
}

impl ConsumerArgs {
    /// Validates the values against provider limits.
    pub fn into_config(self) -> Result<DispatcherConfig> {
        if self.poll_interval_ms == 0 {
            return Err(PipelineError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if !(1..=MAX_BATCH_SIZE).contains(&self.max_messages) {
            return Err(PipelineError::Config(format!(
                "max messages must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.max_messages
            )));
        }
        if self.wait_time_secs > MAX_WAIT_TIME_SECS {
            return Err(PipelineError::Config(format!(
                "wait time must be at most {MAX_WAIT_TIME_SECS}s, got {}s",
                self.wait_time_secs
            )));
        }
        if self.visibility_timeout_secs > MAX_VISIBILITY_TIMEOUT_SECS {
            return Err(PipelineError::Config(format!(
                "visibility timeout must be at most {MAX_VISIBILITY_TIMEOUT_SECS}s, got {}s",
                self.visibility_timeout_secs
            )));
        }
        if self.worker_pool_size == 0 {
            return Err(PipelineError::Config(
                "worker pool size must be at least 1".to_string(),
            ));
        }

        Ok(DispatcherConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            max_messages: self.max_messages,
            wait_time: Duration::from_secs(self.wait_time_secs),
            visibility_timeout: Duration::from_secs(self.visibility_timeout_secs),
            worker_pool_size: self.worker_pool_size,
            stop_when_idle: self.exit_when_idle,
        })
    }
}
