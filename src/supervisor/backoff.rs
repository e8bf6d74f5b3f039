use std::time::Duration;

/// Escalating retry delays keyed by the consecutive-failure count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule {
    steps: Vec<Duration>,
    ceiling: Duration,
}

impl RetrySchedule {
    pub fn new(steps: Vec<Duration>, ceiling: Duration) -> Self {
        Self { steps, ceiling }
    }

    /// Delay before the next read attempt given the current failure count
    pub fn delay(&self, failures: u32) -> Duration {
        self.steps
            .get(failures as usize)
            .copied()
            .unwrap_or(self.ceiling)
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        let steps = [
            vec![Duration::from_millis(100); 3],
            vec![Duration::from_secs(1); 3],
            vec![Duration::from_secs(5); 3],
            vec![Duration::from_secs(20); 2],
        ]
        .concat();

        Self {
            steps,
            ceiling: Duration::from_secs(60),
        }
    }
}
