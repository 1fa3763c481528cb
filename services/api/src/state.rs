//! Application state shared across handlers

use budget::BudgetService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub budget: BudgetService,
}

impl AppState {
    pub fn new(budget: BudgetService) -> Self {
        Self { budget }
    }
}
