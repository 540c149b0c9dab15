//! Retrain cadence.
//!
//! Positions are indices into the trading-day history, so intervals count
//! trading days rather than calendar days.

/// Whether the scorer must be retrained before scoring `current`.
///
/// Always true when nothing has been trained yet. Otherwise true once at
/// least `min_interval` trading days have passed since the last training,
/// and never on the day of the last training itself.
#[must_use]
pub const fn should_retrain(current: usize, last_train: Option<usize>, min_interval: usize) -> bool {
    match last_train {
        None => true,
        Some(last) if current <= last => false,
        Some(last) => current - last >= min_interval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untrained_always_retrains() {
        assert!(should_retrain(0, None, 30));
        assert!(should_retrain(1000, None, 30));
    }

    #[test]
    fn test_same_day_never_retrains() {
        assert!(!should_retrain(49, Some(49), 30));
        assert!(!should_retrain(49, Some(49), 0));
    }

    #[test]
    fn test_interval_boundary() {
        assert!(!should_retrain(68, Some(49), 20));
        assert!(should_retrain(69, Some(49), 20));
        assert!(should_retrain(90, Some(49), 20));
    }
}
