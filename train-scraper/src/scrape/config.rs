//! Pipeline configuration.

use std::time::Duration;

use crate::domain::Direction;

/// Bounds for driving the status page.
#[derive(Debug, Clone)]
pub struct NavigationConfig {
    /// Hard bound for one whole route/direction walk, enforced by the
    /// controller whatever the page driver does. Individual waits inside the
    /// walk have their own, shorter bounds set by the page driver.
    pub iteration_timeout: Duration,

    /// Directions visited for every route, in order.
    pub directions: Vec<Direction>,
}

impl NavigationConfig {
    pub fn with_iteration_timeout(mut self, timeout: Duration) -> Self {
        self.iteration_timeout = timeout;
        self
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            iteration_timeout: Duration::from_secs(90),
            directions: Direction::ALL.to_vec(),
        }
    }
}

/// How many times to attempt a full cycle, and how long to wait between.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}
