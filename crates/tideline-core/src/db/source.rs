//! `TrendSource` backed by the SQLite database

use chrono::NaiveDate;

use super::Database;
use crate::error::Result;
use crate::models::{BudgetLimit, EntryType, PlannedItem, RecurringObligation, Transaction, Wallet};
use crate::source::TrendSource;

impl TrendSource for Database {
    fn transactions_since(&self, user_id: &str, start: NaiveDate) -> Result<Vec<Transaction>> {
        self.list_transactions_since(user_id, start)
    }

    fn wallets(&self, user_id: &str) -> Result<Vec<Wallet>> {
        self.list_wallets(user_id)
    }

    fn recurring(&self, user_id: &str) -> Result<Vec<RecurringObligation>> {
        self.list_recurring(user_id)
    }

    fn planned_income(&self, user_id: &str) -> Result<Vec<PlannedItem>> {
        self.list_planned(user_id, EntryType::Income)
    }

    fn planned_expenses(&self, user_id: &str) -> Result<Vec<PlannedItem>> {
        self.list_planned(user_id, EntryType::Expense)
    }

    fn budgets(&self, user_id: &str) -> Result<Vec<BudgetLimit>> {
        self.list_budgets(user_id)
    }
}
