//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheKey, ForecastCacheStore};
    use crate::source::TrendSource;
    use chrono::{Duration, TimeZone};
    use rusqlite::params;

    const USER: &str = "user-1";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn income(d: NaiveDate, amount: f64) -> NewTransaction {
        NewTransaction {
            wallet_id: None,
            date: d,
            amount,
            entry_type: EntryType::Income,
            currency: "usd".into(),
            description: Some("salary".into()),
        }
    }

    fn expense(d: NaiveDate, amount: f64) -> NewTransaction {
        NewTransaction {
            entry_type: EntryType::Expense,
            description: None,
            ..income(d, amount)
        }
    }

    fn entry(generated_at: DateTime<Utc>, ttl_hours: i64) -> CacheEntry {
        CacheEntry {
            daily_income: vec![0.0, 100.0],
            daily_expense: vec![20.0, 30.0],
            daily_capital: vec![None, Some(1050.0)],
            base_capital: 1000.0,
            generated_at,
            expires_at: generated_at + Duration::hours(ttl_hours),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_wallets(USER).unwrap().is_empty());
        assert_eq!(db.cached_forecast_count().unwrap(), 0);
    }

    #[test]
    fn test_schema_tables_exist() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        for table in [
            "wallets",
            "transactions",
            "recurring",
            "planned_income",
            "planned_expenses",
            "budgets",
            "forecast_cache",
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
                    params![table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }

    #[test]
    fn test_wallet_upsert() {
        let db = Database::in_memory().unwrap();

        let id = db.upsert_wallet(USER, "Checking", 1200.0, "usd").unwrap();
        assert!(id > 0);

        // Same name updates in place
        let id2 = db.upsert_wallet(USER, "Checking", 1500.0, "USD").unwrap();
        assert_eq!(id, id2);

        db.upsert_wallet(USER, "Savings", 300.0, "EUR").unwrap();
        db.upsert_wallet("someone-else", "Checking", 9.0, "USD").unwrap();

        let wallets = db.list_wallets(USER).unwrap();
        assert_eq!(wallets.len(), 2);
        assert_eq!(wallets[0].name, "Checking");
        assert_eq!(wallets[0].balance, 1500.0);
        assert_eq!(wallets[0].currency, "USD");
        assert_eq!(wallets[1].name, "Savings");
    }

    #[test]
    fn test_set_wallet_balance() {
        let db = Database::in_memory().unwrap();
        let id = db.upsert_wallet(USER, "Checking", 100.0, "USD").unwrap();

        db.set_wallet_balance(USER, id, 2000.0).unwrap();
        assert_eq!(db.list_wallets(USER).unwrap()[0].balance, 2000.0);

        let err = db.set_wallet_balance(USER, id + 100, 1.0).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        // Another user's wallet is out of reach
        let err = db.set_wallet_balance("intruder", id, 1.0).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_transaction_insert_and_list_since() {
        let db = Database::in_memory().unwrap();

        db.insert_transaction(USER, &income(date(2024, 3, 1), 500.0))
            .unwrap();
        db.insert_transaction(USER, &expense(date(2024, 2, 20), 40.0))
            .unwrap();
        db.insert_transaction(USER, &expense(date(2024, 3, 5), 75.5))
            .unwrap();
        db.insert_transaction("other", &income(date(2024, 3, 2), 1.0))
            .unwrap();

        let since = db.list_transactions_since(USER, date(2024, 3, 1)).unwrap();
        assert_eq!(since.len(), 2);
        assert_eq!(since[0].date, date(2024, 3, 1));
        assert_eq!(since[0].entry_type, EntryType::Income);
        assert_eq!(since[0].currency, "USD");
        assert_eq!(since[0].description.as_deref(), Some("salary"));
        assert_eq!(since[1].amount, 75.5);
        assert_eq!(since[1].entry_type, EntryType::Expense);

        let all = db.list_transactions_since(USER, date(2000, 1, 1)).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_transaction_rejects_negative_amount() {
        let db = Database::in_memory().unwrap();

        let err = db
            .insert_transaction(USER, &expense(date(2024, 3, 1), -10.0))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        let err = db
            .insert_transaction(USER, &expense(date(2024, 3, 1), f64::NAN))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidData(_)));

        assert!(db.list_recent_transactions(USER, 10).unwrap().is_empty());
    }

    #[test]
    fn test_recent_transactions_newest_first() {
        let db = Database::in_memory().unwrap();
        for day in 1..=5 {
            db.insert_transaction(USER, &income(date(2024, 1, day), f64::from(day)))
                .unwrap();
        }

        let recent = db.list_recent_transactions(USER, 3).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].date, date(2024, 1, 5));
        assert_eq!(recent[2].date, date(2024, 1, 3));
    }

    #[test]
    fn test_transaction_wallet_link() {
        let db = Database::in_memory().unwrap();
        let wallet_id = db.upsert_wallet(USER, "Cash", 50.0, "USD").unwrap();

        let tx = NewTransaction {
            wallet_id: Some(wallet_id),
            ..expense(date(2024, 3, 3), 12.0)
        };
        db.insert_transaction(USER, &tx).unwrap();

        let listed = db.list_recent_transactions(USER, 1).unwrap();
        assert_eq!(listed[0].wallet_id, Some(wallet_id));
    }

    #[test]
    fn test_recurring_crud() {
        let db = Database::in_memory().unwrap();

        let rent = db
            .insert_recurring(
                USER,
                "Rent",
                1200.0,
                EntryType::Expense,
                Frequency::Monthly,
                date(2024, 1, 31),
                "usd",
            )
            .unwrap();
        db.insert_recurring(
            USER,
            "Salary",
            3000.0,
            EntryType::Income,
            Frequency::Weekly,
            date(2024, 1, 5),
            "USD",
        )
        .unwrap();

        let listed = db.list_recurring(USER).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].title, "Salary");
        assert_eq!(listed[0].frequency, Frequency::Weekly);
        assert_eq!(listed[1].title, "Rent");
        assert_eq!(listed[1].next_occurrence, date(2024, 1, 31));
        assert_eq!(listed[1].currency, "USD");
        assert!(listed.iter().all(|r| r.is_active));

        db.set_recurring_active(USER, rent, false).unwrap();
        let rent_row = db
            .list_recurring(USER)
            .unwrap()
            .into_iter()
            .find(|r| r.id == rent)
            .unwrap();
        assert!(!rent_row.is_active);

        assert!(matches!(
            db.set_recurring_active(USER, 999, true),
            Err(Error::NotFound(_))
        ));
        assert!(db
            .insert_recurring(
                USER,
                "Bad",
                -1.0,
                EntryType::Expense,
                Frequency::Daily,
                date(2024, 1, 1),
                "USD"
            )
            .is_err());
    }

    #[test]
    fn test_planned_items_split_by_direction() {
        let db = Database::in_memory().unwrap();

        db.insert_planned(
            USER,
            EntryType::Income,
            "Bonus",
            800.0,
            date(2024, 4, 1),
            "USD",
        )
        .unwrap();
        db.insert_planned(
            USER,
            EntryType::Expense,
            "Laptop",
            1500.0,
            date(2024, 3, 20),
            "usd",
        )
        .unwrap();
        db.insert_planned(
            USER,
            EntryType::Expense,
            "Tickets",
            200.0,
            date(2024, 3, 15),
            "USD",
        )
        .unwrap();

        let planned_income = db.list_planned(USER, EntryType::Income).unwrap();
        assert_eq!(planned_income.len(), 1);
        assert_eq!(planned_income[0].title, "Bonus");
        assert_eq!(planned_income[0].entry_type, EntryType::Income);

        let planned_expenses = db.list_planned(USER, EntryType::Expense).unwrap();
        assert_eq!(planned_expenses.len(), 2);
        assert_eq!(planned_expenses[0].title, "Tickets");
        assert_eq!(planned_expenses[1].currency, "USD");
        assert!(planned_expenses
            .iter()
            .all(|p| p.entry_type == EntryType::Expense));

        assert!(matches!(
            db.insert_planned(
                USER,
                EntryType::Income,
                "Bad",
                f64::INFINITY,
                date(2024, 1, 1),
                "USD"
            ),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_budget_crud() {
        let db = Database::in_memory().unwrap();

        let groceries = db
            .insert_budget(USER, "Groceries", 400.0, BudgetPeriod::Monthly, "USD")
            .unwrap();
        db.insert_budget(USER, "Dining", 50.0, BudgetPeriod::Weekly, "USD")
            .unwrap();

        let budgets = db.list_budgets(USER).unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].name, "Dining");
        assert_eq!(budgets[0].period, BudgetPeriod::Weekly);
        assert_eq!(budgets[1].name, "Groceries");

        db.set_budget_active(USER, groceries, false).unwrap();
        let budgets = db.list_budgets(USER).unwrap();
        assert!(!budgets[1].is_active);
        assert!(budgets[0].is_active);

        assert!(matches!(
            db.set_budget_active("other", groceries, true),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_trend_source_impl() {
        let db = Database::in_memory().unwrap();
        db.upsert_wallet(USER, "Checking", 2000.0, "USD").unwrap();
        db.insert_transaction(USER, &income(date(2024, 3, 9), 500.0))
            .unwrap();
        db.insert_recurring(
            USER,
            "Gym",
            30.0,
            EntryType::Expense,
            Frequency::Monthly,
            date(2024, 3, 15),
            "USD",
        )
        .unwrap();
        db.insert_planned(
            USER,
            EntryType::Income,
            "Refund",
            60.0,
            date(2024, 3, 12),
            "USD",
        )
        .unwrap();
        db.insert_planned(
            USER,
            EntryType::Expense,
            "Repair",
            90.0,
            date(2024, 3, 13),
            "USD",
        )
        .unwrap();
        db.insert_budget(USER, "Fun", 100.0, BudgetPeriod::Monthly, "USD")
            .unwrap();

        let source: &dyn TrendSource = &db;
        assert_eq!(source.wallets(USER).unwrap().len(), 1);
        assert_eq!(
            source
                .transactions_since(USER, date(2024, 3, 1))
                .unwrap()
                .len(),
            1
        );
        assert!(source
            .transactions_since(USER, date(2024, 3, 10))
            .unwrap()
            .is_empty());
        assert_eq!(source.recurring(USER).unwrap()[0].title, "Gym");
        assert_eq!(source.planned_income(USER).unwrap()[0].amount, 60.0);
        assert_eq!(source.planned_expenses(USER).unwrap()[0].amount, 90.0);
        assert_eq!(source.budgets(USER).unwrap()[0].name, "Fun");
    }

    #[tokio::test]
    async fn test_forecast_cache_roundtrip() {
        let db = Database::in_memory().unwrap();
        let key = CacheKey::for_request(&TrendRequest::new(USER, 30, 2).with_ai(true));
        let stored = entry(now(), 12);

        assert!(db.get(&key, now()).await.unwrap().is_none());

        db.set(&key, &stored).await.unwrap();
        let loaded = db.get(&key, now() + Duration::hours(1)).await.unwrap();
        assert_eq!(loaded, Some(stored));
        assert_eq!(db.cached_forecast_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_forecast_cache_overwrites() {
        let db = Database::in_memory().unwrap();
        let key = CacheKey::for_request(&TrendRequest::new(USER, 30, 2).with_ai(true));

        db.set(&key, &entry(now(), 12)).await.unwrap();
        let mut newer = entry(now() + Duration::hours(2), 12);
        newer.base_capital = 4321.0;
        db.set(&key, &newer).await.unwrap();

        assert_eq!(db.cached_forecast_count().unwrap(), 1);
        let loaded = db.get(&key, now() + Duration::hours(3)).await.unwrap();
        assert_eq!(loaded.map(|e| e.base_capital), Some(4321.0));
    }

    #[tokio::test]
    async fn test_forecast_cache_expired_is_miss_and_evicted() {
        let db = Database::in_memory().unwrap();
        let key = CacheKey::for_request(&TrendRequest::new(USER, 30, 2).with_ai(true));
        db.set(&key, &entry(now(), 12)).await.unwrap();

        let at_expiry = now() + Duration::hours(12);
        assert!(db.get(&key, at_expiry).await.unwrap().is_none());
        assert_eq!(db.cached_forecast_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_forecast_cache_unreadable_payload_is_miss() {
        let db = Database::in_memory().unwrap();
        let key = CacheKey::for_request(&TrendRequest::new(USER, 30, 2).with_ai(true));

        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO forecast_cache (cache_key, payload, generated_at, expires_at) VALUES (?, ?, ?, ?)",
                params![key.to_string(), "{not json", "x", "y"],
            )
            .unwrap();

        assert!(db.get(&key, now()).await.unwrap().is_none());
        assert_eq!(db.cached_forecast_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_forecast_cache_purge_and_clear() {
        let db = Database::in_memory().unwrap();
        let short = CacheKey::for_request(&TrendRequest::new(USER, 30, 2).with_ai(true));
        let long = CacheKey::for_request(&TrendRequest::new(USER, 60, 2).with_ai(true));

        db.set(&short, &entry(now(), 1)).await.unwrap();
        db.set(&long, &entry(now(), 12)).await.unwrap();

        let removed = db.purge_expired(now() + Duration::hours(2)).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(db.cached_forecast_count().unwrap(), 1);
        assert!(db
            .get(&long, now() + Duration::hours(2))
            .await
            .unwrap()
            .is_some());

        assert_eq!(db.clear().await.unwrap(), 1);
        assert_eq!(db.cached_forecast_count().unwrap(), 0);
    }

    #[test]
    fn test_encrypted_database_requires_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tideline.db");
        let path = path.to_string_lossy().to_string();

        {
            let db = Database::new_with_key(&path, Some("correct horse")).unwrap();
            db.upsert_wallet(USER, "Checking", 10.0, "USD").unwrap();
        }

        let reopened = Database::new_with_key(&path, Some("correct horse")).unwrap();
        assert_eq!(reopened.list_wallets(USER).unwrap().len(), 1);

        assert!(Database::new_with_key(&path, Some("wrong")).is_err());
    }
}
