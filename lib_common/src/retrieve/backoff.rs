use std::time::Duration;

/// A pure generator for the delay sequence between retry attempts.
///
/// Yields `d, 2d, 4d, 8d, …` for an initial delay `d`, saturating instead
/// of overflowing. The sequence never ends; the consumer's attempt budget
/// bounds how much of it is used.
#[derive(Debug, Clone)]
pub struct Backoff {
    next_delay: Duration,
}

impl Backoff {
    /// Creates the sequence starting at `initial_delay`.
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            next_delay: initial_delay,
        }
    }

    /// Returns the next delay and advances the sequence.
    pub fn advance(&mut self) -> Duration {
        let current = self.next_delay;
        self.next_delay = self.next_delay.saturating_mul(2);
        current
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.advance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_geometric_with_ratio_two() {
        let delays: Vec<Duration> = Backoff::new(Duration::from_secs(2)).take(4).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(16),
            ]
        );
    }

    #[test]
    fn starts_at_the_configured_delay() {
        let mut backoff = Backoff::new(Duration::from_millis(250));
        assert_eq!(backoff.advance(), Duration::from_millis(250));
        assert_eq!(backoff.advance(), Duration::from_millis(500));
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let mut backoff = Backoff::new(Duration::MAX);
        assert_eq!(backoff.advance(), Duration::MAX);
        assert_eq!(backoff.advance(), Duration::MAX);
    }
}
