//! Recurring obligation operations

use chrono::NaiveDate;
use rusqlite::params;

use super::{date_column, enum_column, Database};
use crate::error::{Error, Result};
use crate::models::{EntryType, Frequency, RecurringObligation};

impl Database {
    /// Add a recurring obligation (active)
    #[allow(clippy::too_many_arguments)]
    pub fn insert_recurring(
        &self,
        user_id: &str,
        title: &str,
        amount: f64,
        entry_type: EntryType,
        frequency: Frequency,
        next_occurrence: NaiveDate,
        currency: &str,
    ) -> Result<i64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Recurring amount must be a non-negative number, got {}",
                amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO recurring (user_id, title, amount, entry_type, frequency, next_occurrence, currency)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                title,
                amount,
                entry_type.as_str(),
                frequency.as_str(),
                next_occurrence.to_string(),
                currency.to_uppercase(),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Pause or resume a recurring obligation
    pub fn set_recurring_active(&self, user_id: &str, id: i64, active: bool) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE recurring SET is_active = ? WHERE id = ? AND user_id = ?",
            params![active, id, user_id],
        )?;
        if updated == 0 {
            return Err(Error::NotFound(format!("Recurring obligation {}", id)));
        }
        Ok(())
    }

    /// List all recurring obligations for a user (active and inactive)
    pub fn list_recurring(&self, user_id: &str) -> Result<Vec<RecurringObligation>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, title, amount, entry_type, frequency, next_occurrence, is_active, currency
            FROM recurring
            WHERE user_id = ?
            ORDER BY next_occurrence, id
            "#,
        )?;

        let obligations = stmt
            .query_map(params![user_id], |row| {
                let entry_type: String = row.get(4)?;
                let frequency: String = row.get(5)?;
                let next_occurrence: String = row.get(6)?;
                Ok(RecurringObligation {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    amount: row.get(3)?,
                    entry_type: enum_column(4, &entry_type)?,
                    frequency: enum_column(5, &frequency)?,
                    next_occurrence: date_column(6, &next_occurrence)?,
                    is_active: row.get(7)?,
                    currency: row.get(8)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(obligations)
    }
}
