//! Accounting engine
//!
//! Pure arithmetic over a cycle's salary and the amounts bound to it. The
//! service layer resolves which cycle is current and feeds the sums in here.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use uuid::Uuid;

use crate::models::SalaryCycle;

/// Spend position of a user's current cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSummary {
    pub cycle_id: Uuid,
    pub salary: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    /// Two-decimal percentage, `None` when the cycle salary is zero
    #[serde(rename = "percentUsed")]
    pub percent_used: Option<String>,
}

impl CycleSummary {
    pub fn compute(cycle: &SalaryCycle, spent: Decimal) -> Self {
        Self {
            cycle_id: cycle.id,
            salary: cycle.salary,
            spent,
            remaining: cycle.salary - spent,
            percent_used: percent_used(spent, cycle.salary).map(format_percent),
        }
    }
}

/// `spent / salary * 100` rounded half away from zero to two places
///
/// Returns `None` for a zero (or negative) salary instead of an unbounded ratio.
pub fn percent_used(spent: Decimal, salary: Decimal) -> Option<Decimal> {
    if salary <= Decimal::ZERO {
        return None;
    }
    let ratio = spent.checked_mul(Decimal::ONE_HUNDRED)?.checked_div(salary)?;
    Some(ratio.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

pub fn format_percent(value: Decimal) -> String {
    format!("{:.2}", value)
}

/// Sum of amounts per category
pub fn category_totals<I>(amounts: I) -> BTreeMap<String, Decimal>
where
    I: IntoIterator<Item = (String, Decimal)>,
{
    let mut totals = BTreeMap::new();
    for (category, amount) in amounts {
        *totals.entry(category).or_insert(Decimal::ZERO) += amount;
    }
    totals
}
