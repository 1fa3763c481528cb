//! Threshold alerter
//!
//! Maps a spend-to-salary ratio onto one of four alert levels. Levels are
//! checked from the highest down and the first match wins, so a single
//! insert never produces more than one alert.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Spend-ratio threshold that triggers a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AlertLevel {
    #[serde(rename = "30%")]
    Thirty,
    #[serde(rename = "50%")]
    Fifty,
    #[serde(rename = "80%")]
    Eighty,
    #[serde(rename = "100%")]
    Full,
}

impl AlertLevel {
    /// Evaluation order: highest threshold first
    pub const DESCENDING: [AlertLevel; 4] = [
        AlertLevel::Full,
        AlertLevel::Eighty,
        AlertLevel::Fifty,
        AlertLevel::Thirty,
    ];

    /// Threshold in percent of the cycle salary
    pub fn percent(self) -> u8 {
        match self {
            AlertLevel::Thirty => 30,
            AlertLevel::Fifty => 50,
            AlertLevel::Eighty => 80,
            AlertLevel::Full => 100,
        }
    }

    pub fn from_percent(percent: i16) -> Option<Self> {
        Self::DESCENDING
            .into_iter()
            .find(|level| i16::from(level.percent()) == percent)
    }

    pub fn label(self) -> &'static str {
        match self {
            AlertLevel::Thirty => "30%",
            AlertLevel::Fifty => "50%",
            AlertLevel::Eighty => "80%",
            AlertLevel::Full => "100%",
        }
    }

    /// Level reached by `spent` against `salary`, if any
    ///
    /// A zero salary has no defined ratio and never alerts.
    pub fn evaluate(spent: Decimal, salary: Decimal) -> Option<Self> {
        if salary <= Decimal::ZERO {
            return None;
        }
        // Compare spent * 100 against threshold * salary to stay exact.
        let scaled = spent.checked_mul(Decimal::ONE_HUNDRED)?;
        Self::DESCENDING.into_iter().find(|level| {
            Decimal::from(level.percent())
                .checked_mul(salary)
                .is_some_and(|threshold| scaled >= threshold)
        })
    }

    /// Whether reaching `self` should notify, given the highest level already sent this cycle
    pub fn exceeds(self, watermark: Option<AlertLevel>) -> bool {
        watermark.is_none_or(|sent| self > sent)
    }

    pub fn title(self) -> &'static str {
        match self {
            AlertLevel::Thirty => "Budget check-in",
            AlertLevel::Fifty => "Half of your salary is spent",
            AlertLevel::Eighty => "Budget running low",
            AlertLevel::Full => "Salary fully spent",
        }
    }

    pub fn message(self) -> String {
        match self {
            AlertLevel::Full => {
                "You have spent 100% of your salary for this cycle. Please check your expenses."
                    .to_string()
            }
            level => format!(
                "You have spent {} of your salary. Please check your expenses.",
                level.label()
            ),
        }
    }
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_at(spent: i64, salary: i64) -> Option<AlertLevel> {
        AlertLevel::evaluate(Decimal::from(spent), Decimal::from(salary))
    }

    #[test]
    fn highest_qualifying_threshold_wins() {
        assert_eq!(level_at(25, 100), None);
        assert_eq!(level_at(30, 100), Some(AlertLevel::Thirty));
        assert_eq!(level_at(49, 100), Some(AlertLevel::Thirty));
        assert_eq!(level_at(50, 100), Some(AlertLevel::Fifty));
        assert_eq!(level_at(95, 100), Some(AlertLevel::Eighty));
        assert_eq!(level_at(99, 100), Some(AlertLevel::Eighty));
        assert_eq!(level_at(100, 100), Some(AlertLevel::Full));
        assert_eq!(level_at(101, 100), Some(AlertLevel::Full));
    }

    #[test]
    fn level_is_monotonic_in_spend() {
        let mut previous = None;
        for spent in 0..=150 {
            let level = level_at(spent, 100);
            assert!(level >= previous, "level dropped at {spent}");
            previous = level;
        }
    }

    #[test]
    fn boundaries_are_exact_for_fractional_salaries() {
        let salary: Decimal = "333.33".parse().unwrap();
        let just_below: Decimal = "99.99".parse().unwrap();
        let at: Decimal = "99.999".parse().unwrap();
        assert_eq!(AlertLevel::evaluate(just_below, salary), None);
        assert_eq!(AlertLevel::evaluate(at, salary), Some(AlertLevel::Thirty));
    }

    #[test]
    fn overflowing_ratios_yield_no_level() {
        assert_eq!(AlertLevel::evaluate(Decimal::MAX, Decimal::ONE), None);
        assert_eq!(AlertLevel::evaluate(Decimal::ONE, Decimal::MAX), None);
    }

    #[test]
    fn zero_salary_never_alerts() {
        assert_eq!(level_at(500, 0), None);
    }

    #[test]
    fn watermark_only_lets_higher_levels_through() {
        assert!(AlertLevel::Thirty.exceeds(None));
        assert!(AlertLevel::Eighty.exceeds(Some(AlertLevel::Fifty)));
        assert!(!AlertLevel::Eighty.exceeds(Some(AlertLevel::Eighty)));
        assert!(!AlertLevel::Fifty.exceeds(Some(AlertLevel::Full)));
    }

    #[test]
    fn percent_round_trips() {
        for level in AlertLevel::DESCENDING {
            assert_eq!(AlertLevel::from_percent(level.percent().into()), Some(level));
        }
        assert_eq!(AlertLevel::from_percent(42), None);
    }

    #[test]
    fn serializes_as_percent_label() {
        let json = serde_json::to_string(&AlertLevel::Eighty).unwrap();
        assert_eq!(json, "\"80%\"");
        assert!(AlertLevel::Eighty.message().contains("80%"));
    }
}
