// ABOUTME: Bounded polling used by every convergence loop.
// ABOUTME: Sleeps then checks; gives up with ConvergenceTimeout after max_attempts.

use std::time::Duration;

use serde::Deserialize;

/// How often and how many times a convergence loop checks remote state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PollPolicy {
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// ECS service/task convergence: 10s, up to one hour.
    pub fn ecs_default() -> Self {
        Self::new(Duration::from_secs(10), 360)
    }

    /// Load balancer attachment convergence: 5s, up to thirty minutes.
    pub fn load_balancer_default() -> Self {
        Self::new(Duration::from_secs(5), 360)
    }

    pub fn ticker(&self) -> Ticker {
        Ticker {
            policy: *self,
            attempts: 0,
        }
    }
}

/// Counts attempts for one convergence loop.
///
/// ```
/// # use std::time::Duration;
/// # use ecs_cutover::poll::PollPolicy;
/// # tokio_test_block(async {
/// let mut ticker = PollPolicy::new(Duration::ZERO, 2).ticker();
/// assert!(ticker.tick().await);
/// assert!(ticker.tick().await);
/// assert!(!ticker.tick().await);
/// assert_eq!(ticker.attempts(), 2);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct Ticker {
    policy: PollPolicy,
    attempts: u32,
}

impl Ticker {
    /// Sleep one interval and return `true` if another check is allowed.
    pub async fn tick(&mut self) -> bool {
        if self.attempts >= self.policy.max_attempts {
            return false;
        }
        tokio::time::sleep(self.policy.interval).await;
        self.attempts += 1;
        true
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_humantime_interval() {
        let policy: PollPolicy =
            serde_yaml::from_str("interval: 2s\nmax_attempts: 7\n").unwrap();
        assert_eq!(policy, PollPolicy::new(Duration::from_secs(2), 7));
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_sleeps_before_each_check() {
        let mut ticker = PollPolicy::new(Duration::from_secs(10), 3).ticker();
        let start = tokio::time::Instant::now();

        while ticker.tick().await {}

        assert_eq!(ticker.attempts(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }
}
