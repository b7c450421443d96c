//! Data access seam for the trend engine
//!
//! Implementations return unfiltered rows; the engine applies its own date
//! and activity logic.

use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{BudgetLimit, PlannedItem, RecurringObligation, Transaction, Wallet};

/// Read access to a user's financial records
pub trait TrendSource: Send + Sync {
    /// Realized transactions dated on or after `start`
    fn transactions_since(&self, user_id: &str, start: NaiveDate) -> Result<Vec<Transaction>>;

    fn wallets(&self, user_id: &str) -> Result<Vec<Wallet>>;

    fn recurring(&self, user_id: &str) -> Result<Vec<RecurringObligation>>;

    fn planned_income(&self, user_id: &str) -> Result<Vec<PlannedItem>>;

    fn planned_expenses(&self, user_id: &str) -> Result<Vec<PlannedItem>>;

    fn budgets(&self, user_id: &str) -> Result<Vec<BudgetLimit>>;
}
