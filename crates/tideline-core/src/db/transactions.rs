//! Transaction operations

use chrono::NaiveDate;
use rusqlite::params;

use super::{date_column, enum_column, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction};

const SELECT_TRANSACTIONS: &str = r#"
    SELECT id, user_id, wallet_id, date, amount, entry_type, currency, description
    FROM transactions
"#;

fn map_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    let date: String = row.get(3)?;
    let entry_type: String = row.get(5)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        wallet_id: row.get(2)?,
        date: date_column(3, &date)?,
        amount: row.get(4)?,
        entry_type: enum_column(5, &entry_type)?,
        currency: row.get(6)?,
        description: row.get(7)?,
    })
}

impl Database {
    /// Record a realized transaction
    pub fn insert_transaction(&self, user_id: &str, tx: &NewTransaction) -> Result<i64> {
        if !tx.amount.is_finite() || tx.amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Transaction amount must be a non-negative number, got {}",
                tx.amount
            )));
        }

        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO transactions (user_id, wallet_id, date, amount, entry_type, currency, description)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                tx.wallet_id,
                tx.date.to_string(),
                tx.amount,
                tx.entry_type.as_str(),
                tx.currency.to_uppercase(),
                tx.description,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List a user's transactions dated on or after `start`, oldest first
    pub fn list_transactions_since(
        &self,
        user_id: &str,
        start: NaiveDate,
    ) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? AND date >= ? ORDER BY date, id",
            SELECT_TRANSACTIONS
        ))?;

        let transactions = stmt
            .query_map(params![user_id, start.to_string()], map_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Most recent transactions, newest first
    pub fn list_recent_transactions(&self, user_id: &str, limit: i64) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT ?",
            SELECT_TRANSACTIONS
        ))?;

        let transactions = stmt
            .query_map(params![user_id, limit], map_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}
