//! Executor configuration
//!
//! Defines the parameters the orchestrator needs beyond the pipeline
//! definition itself: the compute domain and group sessions are created in,
//! the in-session mount prefix, and the bounded kernel-id poll.

use std::time::Duration;

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Compute domain sessions are created in
    pub domain: String,

    /// Compute group sessions are created in
    pub group: String,

    /// Prefix under which storage folders are mounted inside a session
    pub mount_prefix: String,

    /// How many times to poll get-session for a kernel id before giving up
    pub kernel_poll_attempts: u32,

    /// Delay between kernel-id polls
    pub kernel_poll_interval: Duration,
}

impl ExecutorConfig {
    /// Creates a new configuration with defaults for the poll bound
    pub fn new(domain: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            group: group.into(),
            mount_prefix: "/home/work".to_string(),
            kernel_poll_attempts: 10,
            kernel_poll_interval: Duration::from_secs(1),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - GANTRY_DOMAIN (optional, default: "default")
    /// - GANTRY_GROUP (optional, default: "default")
    /// - GANTRY_MOUNT_PREFIX (optional, default: "/home/work")
    /// - GANTRY_KERNEL_POLL_ATTEMPTS (optional, default: 10)
    /// - GANTRY_KERNEL_POLL_INTERVAL (optional, seconds, default: 1)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(domain) = std::env::var("GANTRY_DOMAIN") {
            config.domain = domain;
        }
        if let Ok(group) = std::env::var("GANTRY_GROUP") {
            config.group = group;
        }
        if let Ok(prefix) = std::env::var("GANTRY_MOUNT_PREFIX") {
            config.mount_prefix = prefix;
        }
        if let Some(attempts) = std::env::var("GANTRY_KERNEL_POLL_ATTEMPTS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
        {
            config.kernel_poll_attempts = attempts;
        }
        if let Some(interval) = std::env::var("GANTRY_KERNEL_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
        {
            config.kernel_poll_interval = Duration::from_secs(interval);
        }

        config
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.domain.is_empty() {
            return Err("domain cannot be empty".to_string());
        }

        if self.group.is_empty() {
            return Err("group cannot be empty".to_string());
        }

        if self.kernel_poll_attempts == 0 {
            return Err("kernel_poll_attempts must be greater than 0".to_string());
        }

        Ok(())
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new("default", "default")
    }
}
