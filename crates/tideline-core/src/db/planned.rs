//! Planned one-off income and expense operations
//!
//! Income and expenses live in separate tables; both map to `PlannedItem`.

use chrono::NaiveDate;
use rusqlite::params;

use super::{date_column, Database};
use crate::error::{Error, Result};
use crate::models::{EntryType, PlannedItem};

fn table_for(entry_type: EntryType) -> &'static str {
    match entry_type {
        EntryType::Income => "planned_income",
        EntryType::Expense => "planned_expenses",
    }
}

impl Database {
    /// Plan a one-off income or expense on `date`
    pub fn insert_planned(
        &self,
        user_id: &str,
        entry_type: EntryType,
        title: &str,
        amount: f64,
        date: NaiveDate,
        currency: &str,
    ) -> Result<i64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Planned amount must be a non-negative number, got {}",
                amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, title, amount, date, currency) VALUES (?, ?, ?, ?, ?)",
                table_for(entry_type)
            ),
            params![
                user_id,
                title,
                amount,
                date.to_string(),
                currency.to_uppercase()
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List planned items of one direction, ordered by date
    pub fn list_planned(&self, user_id: &str, entry_type: EntryType) -> Result<Vec<PlannedItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT id, user_id, title, amount, date, currency FROM {} WHERE user_id = ? ORDER BY date, id",
            table_for(entry_type)
        ))?;

        let items = stmt
            .query_map(params![user_id], |row| {
                let date: String = row.get(4)?;
                Ok(PlannedItem {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    amount: row.get(3)?,
                    date: date_column(4, &date)?,
                    entry_type,
                    currency: row.get(5)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(items)
    }
}
