//! Wallet operations

use rusqlite::params;

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::Wallet;

impl Database {
    /// Create a wallet, or update the balance of an existing one with the same name
    pub fn upsert_wallet(
        &self,
        user_id: &str,
        name: &str,
        balance: f64,
        currency: &str,
    ) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM wallets WHERE user_id = ? AND name = ?",
                params![user_id, name],
                |row| row.get(0),
            )
            .ok();

        if let Some(id) = existing {
            conn.execute(
                "UPDATE wallets SET balance = ?, currency = ? WHERE id = ?",
                params![balance, currency.to_uppercase(), id],
            )?;
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO wallets (user_id, name, balance, currency) VALUES (?, ?, ?, ?)",
            params![user_id, name, balance, currency.to_uppercase()],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Overwrite a wallet balance (out-of-band edit, not a transaction)
    pub fn set_wallet_balance(&self, user_id: &str, wallet_id: i64, balance: f64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE wallets SET balance = ? WHERE id = ? AND user_id = ?",
            params![balance, wallet_id, user_id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("Wallet {}", wallet_id)));
        }
        Ok(())
    }

    /// List a user's wallets
    pub fn list_wallets(&self, user_id: &str) -> Result<Vec<Wallet>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, name, balance, currency, created_at
            FROM wallets
            WHERE user_id = ?
            ORDER BY name
            "#,
        )?;

        let wallets = stmt
            .query_map(params![user_id], |row| {
                let created_at: String = row.get(5)?;
                Ok(Wallet {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    name: row.get(2)?,
                    balance: row.get(3)?,
                    currency: row.get(4)?,
                    created_at: parse_datetime(&created_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(wallets)
    }
}
