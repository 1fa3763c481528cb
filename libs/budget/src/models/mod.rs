//! Budget data model

pub mod cycle;
pub mod expense;
pub mod notification;
pub mod user;

pub use cycle::{CycleListing, SalaryCycle};
pub use expense::{Expense, ExpenseDraft, NewExpense};
pub use notification::{AlertRecord, NewNotification};
pub use user::{NewAccount, UserAccount};
