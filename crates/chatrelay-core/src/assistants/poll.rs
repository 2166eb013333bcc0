use std::time::Duration;

use chatrelay_types::config::OpenAiConfig;

/// How often and how many times a run is re-checked before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

    /// Upper bound on time spent waiting between checks.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Self::DEFAULT_INTERVAL,
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl From<&OpenAiConfig> for PollPolicy {
    fn from(config: &OpenAiConfig) -> Self {
        Self {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_poll_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_waits_at_most_ten_seconds() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_millis(500));
        assert_eq!(policy.max_attempts, 20);
        assert_eq!(policy.budget(), Duration::from_secs(10));
    }

    #[test]
    fn policy_follows_config() {
        let config = OpenAiConfig {
            poll_interval_ms: 100,
            max_poll_attempts: 3,
            ..OpenAiConfig::default()
        };
        let policy = PollPolicy::from(&config);
        assert_eq!(policy.interval, Duration::from_millis(100));
        assert_eq!(policy.max_attempts, 3);
    }
}
