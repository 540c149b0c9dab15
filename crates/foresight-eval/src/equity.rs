//! Signal-gated dollar-cost averaging.
//!
//! Once per calendar month a fixed contribution is added to cash on the first
//! trading day whose day-of-month is at least `contribution_day`. The gated
//! strategy keeps that cash until the first Buy signal at or after the
//! contribution and then converts all of it to units at that day's close. The
//! baseline converts every contribution on the day it arrives.

use chrono::Datelike;
use foresight_traits::{Action, Date, ForesightError, Result, Signal, SignalLog};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Contribution schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EquityConfig {
    /// Earliest day of month on which the monthly contribution is made
    pub contribution_day: u32,
    /// Amount added per contribution
    pub contribution: f64,
}

impl Default for EquityConfig {
    fn default() -> Self {
        Self {
            contribution_day: 25,
            contribution: 1000.0,
        }
    }
}

impl EquityConfig {
    /// Checks the schedule.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the day is outside `1..=31` or the
    /// contribution is not a positive finite amount.
    pub fn validate(&self) -> Result<()> {
        if !(1..=31).contains(&self.contribution_day) {
            return Err(ForesightError::Configuration(format!(
                "contribution_day must be in 1..=31, got {}",
                self.contribution_day
            )));
        }
        if !self.contribution.is_finite() || self.contribution <= 0.0 {
            return Err(ForesightError::Configuration(format!(
                "contribution must be positive, got {}",
                self.contribution
            )));
        }
        Ok(())
    }
}

/// Portfolio state at the close of one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Trading date.
    pub date: Date,
    /// Uninvested cash.
    pub cash: f64,
    /// Units held.
    pub units: f64,
    /// Cash plus units valued at the close.
    pub equity: f64,
}

/// Final values of the gated strategy against the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityComparison {
    /// Total amount contributed.
    pub contributed: f64,
    /// Final equity of the gated strategy.
    pub strategy_final: f64,
    /// Final equity of the baseline.
    pub baseline_final: f64,
    /// `strategy_final - baseline_final`.
    pub difference: f64,
    /// Difference relative to the baseline, zero when the baseline is zero.
    pub relative: f64,
}

/// Both equity curves and their comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityReport {
    /// Signal-gated curve.
    pub strategy: Vec<EquityPoint>,
    /// Always-buy-on-schedule curve.
    pub baseline: Vec<EquityPoint>,
    /// Summary.
    pub comparison: EquityComparison,
}

/// Rows usable for pricing; a zero, negative or non-finite close is skipped.
fn priced(log: &SignalLog) -> impl Iterator<Item = &Signal> {
    log.iter().filter(|s| s.close.is_finite() && s.close > 0.0)
}

/// Yields `true` on the dates that receive the monthly contribution.
struct Schedule {
    day: u32,
    last_month: Option<(i32, u32)>,
}

impl Schedule {
    const fn new(day: u32) -> Self {
        Self {
            day,
            last_month: None,
        }
    }

    fn is_contribution(&mut self, date: Date) -> bool {
        let month = (date.year(), date.month());
        if date.day() >= self.day && self.last_month != Some(month) {
            self.last_month = Some(month);
            true
        } else {
            false
        }
    }
}

fn point(date: Date, cash: f64, units: f64, close: f64) -> EquityPoint {
    EquityPoint {
        date,
        cash,
        units,
        equity: cash + units * close,
    }
}

/// Equity curve of the signal-gated strategy.
///
/// Pending cash stays uninvested while signals say Hold; a month without a
/// Buy rolls its contribution into the next one.
#[must_use]
pub fn simulate_strategy(log: &SignalLog, config: &EquityConfig) -> Vec<EquityPoint> {
    let mut schedule = Schedule::new(config.contribution_day);
    let (mut cash, mut units) = (0.0, 0.0);
    let mut curve = Vec::with_capacity(log.len());

    for signal in priced(log) {
        if schedule.is_contribution(signal.date) {
            cash += config.contribution;
        }
        if cash > 0.0 && signal.action() == Action::Buy {
            units += cash / signal.close;
            debug!(date = %signal.date, amount = cash, close = signal.close, "gated buy");
            cash = 0.0;
        }
        curve.push(point(signal.date, cash, units, signal.close));
    }
    curve
}

/// Equity curve of the baseline that buys on every contribution date.
#[must_use]
pub fn simulate_baseline(log: &SignalLog, config: &EquityConfig) -> Vec<EquityPoint> {
    let mut schedule = Schedule::new(config.contribution_day);
    let mut units = 0.0;

    priced(log)
        .map(|signal| {
            if schedule.is_contribution(signal.date) {
                units += config.contribution / signal.close;
            }
            point(signal.date, 0.0, units, signal.close)
        })
        .collect()
}

impl EquityComparison {
    /// Compares two curves simulated over the same dates.
    #[must_use]
    pub fn from_curves(strategy: &[EquityPoint], baseline: &[EquityPoint], contributed: f64) -> Self {
        let strategy_final = strategy.last().map_or(0.0, |p| p.equity);
        let baseline_final = baseline.last().map_or(0.0, |p| p.equity);
        let difference = strategy_final - baseline_final;
        let relative = if baseline_final > 0.0 {
            difference / baseline_final
        } else {
            0.0
        };
        Self {
            contributed,
            strategy_final,
            baseline_final,
            difference,
            relative,
        }
    }
}

/// Simulates both policies over a signal log.
///
/// # Errors
///
/// Returns a configuration error for an invalid schedule.
pub fn simulate(log: &SignalLog, config: &EquityConfig) -> Result<EquityReport> {
    config.validate()?;
    let strategy = simulate_strategy(log, config);
    let baseline = simulate_baseline(log, config);

    let mut schedule = Schedule::new(config.contribution_day);
    let contributions = priced(log)
        .filter(|s| schedule.is_contribution(s.date))
        .count();
    let contributed = contributions as f64 * config.contribution;

    let comparison = EquityComparison::from_curves(&strategy, &baseline, contributed);
    Ok(EquityReport {
        strategy,
        baseline,
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd_opt(y, m, day).unwrap()
    }

    /// Weekday log over `[from, to]` with a constant close and Buy on `buy` dates.
    fn log(from: Date, to: Date, close: impl Fn(Date) -> f64, buy: impl Fn(Date) -> bool) -> SignalLog {
        let mut log = SignalLog::new();
        let mut date = from;
        while date <= to {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let p = if buy(date) { 0.9 } else { 0.1 };
                log.push(Signal::from_score(date, close(date), p, 0.5, None, from))
                    .unwrap();
            }
            date = date.succ_opt().unwrap();
        }
        log
    }

    #[test]
    fn test_contribution_on_first_trading_day_from_day_25() {
        // 2024-05-25 is a Saturday, so May contributes on Monday the 27th
        let signals = log(d(2024, 5, 1), d(2024, 6, 30), |_| 100.0, |_| true);
        let curve = simulate_baseline(&signals, &EquityConfig::default());

        let first = curve.iter().find(|p| p.units > 0.0).unwrap();
        assert_eq!(first.date, d(2024, 5, 27));
        assert_relative_eq!(first.units, 10.0);
        // June contributes on Tuesday the 25th
        let june = curve.iter().find(|p| p.units > 10.0).unwrap();
        assert_eq!(june.date, d(2024, 6, 25));
    }

    #[test]
    fn test_gated_strategy_waits_for_buy() {
        let close = |date: Date| if date < d(2024, 6, 3) { 100.0 } else { 50.0 };
        let buy = |date: Date| date == d(2024, 6, 4);
        let signals = log(d(2024, 5, 1), d(2024, 6, 10), close, buy);

        let curve = simulate_strategy(&signals, &EquityConfig::default());
        let on = |date: Date| *curve.iter().find(|p| p.date == date).unwrap();

        assert_relative_eq!(on(d(2024, 5, 27)).cash, 1000.0);
        assert_relative_eq!(on(d(2024, 6, 3)).cash, 1000.0);
        let bought = on(d(2024, 6, 4));
        assert_relative_eq!(bought.cash, 0.0);
        assert_relative_eq!(bought.units, 20.0);
        assert_relative_eq!(bought.equity, 1000.0);
    }

    #[test]
    fn test_comparison() {
        let close = |date: Date| if date < d(2024, 6, 3) { 100.0 } else { 50.0 };
        let buy = |date: Date| date >= d(2024, 6, 4);
        let signals = log(d(2024, 5, 1), d(2024, 6, 10), close, buy);

        let report = simulate(&signals, &EquityConfig::default()).unwrap();
        let c = report.comparison;
        assert_relative_eq!(c.contributed, 1000.0);
        // baseline bought 10 units at 100, now worth 500
        assert_relative_eq!(c.baseline_final, 500.0);
        assert_relative_eq!(c.strategy_final, 1000.0);
        assert_relative_eq!(c.difference, 500.0);
        assert_relative_eq!(c.relative, 1.0);
        assert_eq!(report.strategy.len(), report.baseline.len());
    }

    #[test]
    fn test_month_without_trading_day_after_cutoff() {
        // the log ends on the 20th, before any contribution date
        let signals = log(d(2024, 5, 1), d(2024, 5, 20), |_| 100.0, |_| true);
        let report = simulate(&signals, &EquityConfig::default()).unwrap();
        assert_relative_eq!(report.comparison.contributed, 0.0);
        assert_relative_eq!(report.comparison.relative, 0.0);
    }

    #[test]
    fn test_config_validation() {
        assert!(EquityConfig::default().validate().is_ok());
        let bad_day = EquityConfig {
            contribution_day: 0,
            ..EquityConfig::default()
        };
        assert!(bad_day.validate().is_err());
        let bad_amount = EquityConfig {
            contribution: -1.0,
            ..EquityConfig::default()
        };
        assert!(simulate(&SignalLog::new(), &bad_amount).is_err());
    }

    #[test]
    fn test_empty_log() {
        let report = simulate(&SignalLog::new(), &EquityConfig::default()).unwrap();
        assert!(report.strategy.is_empty());
        assert_relative_eq!(report.comparison.strategy_final, 0.0);
    }
}
