//! Budget ceiling operations

use rusqlite::params;

use super::{enum_column, Database};
use crate::error::{Error, Result};
use crate::models::{BudgetLimit, BudgetPeriod};

impl Database {
    /// Add an active budget ceiling
    pub fn insert_budget(
        &self,
        user_id: &str,
        name: &str,
        amount: f64,
        period: BudgetPeriod,
        currency: &str,
    ) -> Result<i64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Budget amount must be a non-negative number, got {}",
                amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO budgets (user_id, name, amount, period, currency) VALUES (?, ?, ?, ?, ?)",
            params![
                user_id,
                name,
                amount,
                period.as_str(),
                currency.to_uppercase()
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Enable or disable a budget ceiling
    pub fn set_budget_active(&self, user_id: &str, id: i64, active: bool) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE budgets SET is_active = ? WHERE id = ? AND user_id = ?",
            params![active, id, user_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Budget {}", id)));
        }
        Ok(())
    }

    /// List all budgets for a user (active and inactive)
    pub fn list_budgets(&self, user_id: &str) -> Result<Vec<BudgetLimit>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, name, amount, period, is_active, currency
            FROM budgets
            WHERE user_id = ?
            ORDER BY name
            "#,
        )?;

        let budgets = stmt
            .query_map(params![user_id], |row| {
                let period: String = row.get(4)?;
                Ok(BudgetLimit {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    amount: row.get(3)?,
                    period: enum_column(4, &period)?,
                    is_active: row.get(5)?,
                    currency: row.get(6)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }
}
