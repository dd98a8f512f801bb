use serde::Deserialize;
use std::time::Duration;

use crate::services::executor::TerminalPolicy;
use crate::services::pipeline::PipelineSettings;
use crate::services::queue::EnqueuePolicyKind;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Maximum number of jobs waiting for a worker.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Number of concurrent workers.
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Behaviour of submissions when the queue is full: block, reject or timeout.
    #[serde(default)]
    pub enqueue_policy: EnqueuePolicyKind,

    /// How long a submission may wait under the `timeout` policy.
    #[serde(default = "default_enqueue_timeout_ms")]
    pub enqueue_timeout_ms: u64,

    /// Terminal state rule: always_completed or fail_on_visit_error.
    #[serde(default)]
    pub terminal_policy: TerminalPolicy,

    /// Simulated latency per analysed image.
    #[serde(default = "default_analysis_delay_ms")]
    pub analysis_delay_ms: u64,

    /// CSV file with store reference data.
    #[serde(default = "default_store_master_path")]
    pub store_master_path: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_queue_capacity() -> usize {
    5
}

fn default_worker_count() -> usize {
    2
}

fn default_enqueue_timeout_ms() -> u64 {
    5_000
}

fn default_analysis_delay_ms() -> u64 {
    2_000
}

fn default_store_master_path() -> String {
    "StoreMasterAssignment.csv".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("QUEUE_CAPACITY must be at least 1"));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::Invalid("WORKER_COUNT must be at least 1"));
        }
        Ok(())
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            queue_capacity: self.queue_capacity,
            worker_count: self.worker_count,
            enqueue_policy: self
                .enqueue_policy
                .into_policy(Duration::from_millis(self.enqueue_timeout_ms)),
            terminal_policy: self.terminal_policy,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::queue::EnqueuePolicy;

    fn from_pairs(pairs: &[(&str, &str)]) -> Result<AppConfig, envy::Error> {
        envy::from_iter(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        )
    }

    #[test]
    fn test_defaults() {
        let config = from_pairs(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.queue_capacity, 5);
        assert_eq!(config.worker_count, 2);
        assert_eq!(config.enqueue_policy, EnqueuePolicyKind::Block);
        assert_eq!(config.terminal_policy, TerminalPolicy::AlwaysCompleted);
        assert_eq!(config.analysis_delay(), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = from_pairs(&[
            ("QUEUE_CAPACITY", "10"),
            ("WORKER_COUNT", "4"),
            ("ENQUEUE_POLICY", "timeout"),
            ("ENQUEUE_TIMEOUT_MS", "250"),
            ("TERMINAL_POLICY", "fail_on_visit_error"),
        ])
        .unwrap();

        let settings = config.pipeline_settings();
        assert_eq!(settings.queue_capacity, 10);
        assert_eq!(settings.worker_count, 4);
        assert_eq!(
            settings.enqueue_policy,
            EnqueuePolicy::Timeout(Duration::from_millis(250))
        );
        assert_eq!(settings.terminal_policy, TerminalPolicy::FailOnVisitError);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = from_pairs(&[("WORKER_COUNT", "0")]).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(from_pairs(&[("ENQUEUE_POLICY", "drop")]).is_err());
    }
}
