//! Expense model and input validation

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{BudgetError, BudgetResult};

/// Largest number of fractional digits an amount may carry
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount or salary the `NUMERIC(14, 2)` columns can hold
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// A recorded spend event
///
/// `cycle_id` is the owner's current cycle at insertion time and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cycle_id: Uuid,
    pub amount: Decimal,
    pub budget_type: Option<String>,
    pub category: String,
    pub note: Option<String>,
    pub expense_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Raw expense input as received from a client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseDraft {
    pub user_id: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub budget_type: Option<String>,
    pub category: Option<String>,
    pub note: Option<String>,
    pub expense_date: Option<NaiveDate>,
}

/// Validated expense, ready to be appended to the ledger
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub amount: Decimal,
    pub budget_type: Option<String>,
    pub category: String,
    pub note: Option<String>,
    pub expense_date: NaiveDate,
}

impl ExpenseDraft {
    /// Check required fields and normalize free-form labels
    pub fn validate(self) -> BudgetResult<NewExpense> {
        let user_id = self
            .user_id
            .ok_or_else(|| BudgetError::validation("user_id is required"))?;

        let amount = self
            .amount
            .ok_or_else(|| BudgetError::validation("amount is required"))?
            .normalize();
        if amount <= Decimal::ZERO {
            return Err(BudgetError::validation("amount must be greater than zero"));
        }
        if amount.scale() > AMOUNT_SCALE {
            return Err(BudgetError::validation(
                "amount supports at most two decimal places",
            ));
        }
        if amount > MAX_AMOUNT {
            return Err(BudgetError::validation(format!(
                "amount must not exceed {MAX_AMOUNT}"
            )));
        }

        let category = non_blank(self.category)
            .ok_or_else(|| BudgetError::validation("category is required"))?;

        let expense_date = self
            .expense_date
            .ok_or_else(|| BudgetError::validation("expense_date is required"))?;

        Ok(NewExpense {
            user_id,
            amount,
            budget_type: non_blank(self.budget_type),
            category,
            note: non_blank(self.note),
            expense_date,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn draft() -> ExpenseDraft {
        ExpenseDraft {
            user_id: Some(Uuid::new_v4()),
            amount: Some(d("12.50")),
            budget_type: Some("needs".to_string()),
            category: Some("  Groceries ".to_string()),
            note: Some("   ".to_string()),
            expense_date: NaiveDate::from_ymd_opt(2025, 3, 14),
        }
    }

    #[test]
    fn valid_draft_is_trimmed() {
        let expense = draft().validate().unwrap();
        assert_eq!(expense.category, "Groceries");
        assert_eq!(expense.note, None);
        assert_eq!(expense.budget_type.as_deref(), Some("needs"));
        assert_eq!(expense.amount, d("12.5"));
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        for amount in [d("0"), d("-3.20")] {
            let err = ExpenseDraft {
                amount: Some(amount),
                ..draft()
            }
            .validate()
            .unwrap_err();
            assert!(matches!(err, BudgetError::Validation(_)));
        }
    }

    #[test]
    fn sub_cent_amounts_are_rejected() {
        let err = ExpenseDraft {
            amount: Some(d("1.005")),
            ..draft()
        }
        .validate()
        .unwrap_err();
        assert!(err.to_string().contains("two decimal places"));
    }

    #[test]
    fn max_amount_matches_column_precision() {
        assert_eq!(MAX_AMOUNT, d("999999999999.99"));
    }

    #[test]
    fn amounts_beyond_column_precision_are_rejected() {
        let at_limit = ExpenseDraft {
            amount: Some(MAX_AMOUNT),
            ..draft()
        }
        .validate()
        .unwrap();
        assert_eq!(at_limit.amount, MAX_AMOUNT);

        for amount in [d("1000000000000"), d("1000000000000000"), Decimal::MAX] {
            let err = ExpenseDraft {
                amount: Some(amount),
                ..draft()
            }
            .validate()
            .unwrap_err();
            assert!(matches!(err, BudgetError::Validation(_)), "{amount} accepted");
        }
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        let expense = ExpenseDraft {
            amount: Some(d("7.5000")),
            ..draft()
        }
        .validate()
        .unwrap();
        assert_eq!(expense.amount, d("7.5"));
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let cases = [
            (
                ExpenseDraft {
                    expense_date: None,
                    ..draft()
                },
                "expense_date",
            ),
            (
                ExpenseDraft {
                    category: Some(" ".to_string()),
                    ..draft()
                },
                "category",
            ),
            (
                ExpenseDraft {
                    user_id: None,
                    ..draft()
                },
                "user_id",
            ),
            (
                ExpenseDraft {
                    amount: None,
                    ..draft()
                },
                "amount",
            ),
        ];

        for (input, field) in cases {
            let err = input.validate().unwrap_err();
            assert!(err.to_string().contains(field), "{err} should mention {field}");
        }
    }
}
