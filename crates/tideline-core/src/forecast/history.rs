//! Historical window, running totals and capital synchronization

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::currency::CurrencyConverter;
use crate::models::{EntryType, Transaction, TrendPoint, Wallet};

/// Income and expense for one day (raw or cumulative depending on stage)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayTotals {
    pub date: NaiveDate,
    pub income: f64,
    pub expense: f64,
}

impl DayTotals {
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            income: 0.0,
            expense: 0.0,
        }
    }

    pub fn net(&self) -> f64 {
        self.income - self.expense
    }
}

/// First day of a `days`-long window ending on `today`
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN)
}

/// Bucket transactions into one zero-filled entry per day from `start`
///
/// Transactions outside the window are ignored; amounts are normalized to the
/// base currency.
pub fn build_daily_window(
    transactions: &[Transaction],
    start: NaiveDate,
    days: u32,
    converter: &dyn CurrencyConverter,
) -> Vec<DayTotals> {
    let mut window: Vec<DayTotals> = (0..u64::from(days))
        .map_while(|offset| start.checked_add_days(Days::new(offset)))
        .map(DayTotals::zero)
        .collect();

    for tx in transactions {
        let Ok(offset) = usize::try_from((tx.date - start).num_days()) else {
            continue;
        };
        let Some(day) = window.get_mut(offset) else {
            continue;
        };
        let amount = converter.to_base(tx.amount, &tx.currency);
        match tx.entry_type {
            EntryType::Income => day.income += amount,
            EntryType::Expense => day.expense += amount,
        }
    }

    window
}

/// Replace each day's raw amounts with running totals seeded at zero
pub fn accumulate(daily: &[DayTotals]) -> Vec<DayTotals> {
    daily
        .iter()
        .scan((0.0, 0.0), |(income, expense), day| {
            *income += day.income;
            *expense += day.expense;
            Some(DayTotals {
                date: day.date,
                income: *income,
                expense: *expense,
            })
        })
        .collect()
}

/// Current capital: sum of wallet balances in the base currency
pub fn current_capital(wallets: &[Wallet], converter: &dyn CurrencyConverter) -> f64 {
    wallets
        .iter()
        .map(|w| converter.to_base(w.balance, &w.currency))
        .sum()
}

/// Reconciles the authoritative balance with the window's net movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapitalSync {
    /// Authoritative capital now
    pub current: f64,
    /// Net income minus expense accumulated over the window
    pub window_net: f64,
    /// Capital before the first day of the window
    pub at_window_start: f64,
}

impl CapitalSync {
    /// Derive window-start capital from `current` and the cumulative series
    ///
    /// The last historical point then carries exactly `current`.
    pub fn sync(current: f64, cumulative: &[DayTotals]) -> Self {
        let window_net = cumulative.last().map(DayTotals::net).unwrap_or(0.0);
        Self {
            current,
            window_net,
            at_window_start: current - window_net,
        }
    }
}

/// Historical trend points; the last one is flagged as today
pub fn historical_points(
    cumulative: &[DayTotals],
    capital_base: f64,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    cumulative
        .iter()
        .map(|day| TrendPoint {
            date: day.date,
            income: day.income,
            expense: day.expense,
            capital: capital_base + day.income - day.expense,
            is_today: day.date == today,
            is_forecast: false,
        })
        .collect()
}

/// Window averages handed to the AI prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct HistoricalStats {
    pub days: u32,
    pub total_income: f64,
    pub total_expense: f64,
    pub avg_daily_income: f64,
    pub avg_daily_expense: f64,
}

impl HistoricalStats {
    /// Zero-guarded: an empty window yields all-zero stats
    pub fn from_daily(daily: &[DayTotals]) -> Self {
        if daily.is_empty() {
            return Self::default();
        }

        let total_income: f64 = daily.iter().map(|d| d.income).sum();
        let total_expense: f64 = daily.iter().map(|d| d.expense).sum();
        let n = daily.len() as f64;

        Self {
            days: daily.len() as u32,
            total_income,
            total_expense,
            avg_daily_income: total_income / n,
            avg_daily_expense: total_expense / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::RateTable;
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(date: NaiveDate, amount: f64, entry_type: EntryType, currency: &str) -> Transaction {
        Transaction {
            id: 0,
            user_id: "u".into(),
            wallet_id: None,
            date,
            amount,
            entry_type,
            currency: currency.into(),
            description: None,
        }
    }

    #[test]
    fn test_window_start() {
        assert_eq!(window_start(date(2024, 3, 10), 10), date(2024, 3, 1));
        assert_eq!(window_start(date(2024, 3, 10), 1), date(2024, 3, 10));
    }

    #[test]
    fn test_build_daily_window_buckets_and_ignores_outside() {
        let rates = RateTable::new("USD").with_rate("EUR", 2.0);
        let start = date(2024, 3, 1);
        let txs = vec![
            tx(date(2024, 2, 29), 999.0, EntryType::Income, "USD"),
            tx(date(2024, 3, 1), 100.0, EntryType::Income, "USD"),
            tx(date(2024, 3, 1), 10.0, EntryType::Expense, "EUR"),
            tx(date(2024, 3, 3), 5.0, EntryType::Expense, "USD"),
            tx(date(2024, 3, 4), 999.0, EntryType::Expense, "USD"),
        ];

        let window = build_daily_window(&txs, start, 3, &rates);
        assert_eq!(window.len(), 3);
        assert_eq!(window[0].income, 100.0);
        assert_eq!(window[0].expense, 20.0);
        assert_eq!(window[1], DayTotals::zero(date(2024, 3, 2)));
        assert_eq!(window[2].expense, 5.0);
    }

    #[test]
    fn test_accumulate_is_non_decreasing() {
        let daily = vec![
            DayTotals { date: date(2024, 1, 1), income: 10.0, expense: 0.0 },
            DayTotals { date: date(2024, 1, 2), income: 0.0, expense: 4.0 },
            DayTotals { date: date(2024, 1, 3), income: 5.0, expense: 1.0 },
        ];
        let cumulative = accumulate(&daily);

        assert_eq!(cumulative[2].income, 15.0);
        assert_eq!(cumulative[2].expense, 5.0);
        for pair in cumulative.windows(2) {
            assert!(pair[1].income >= pair[0].income);
            assert!(pair[1].expense >= pair[0].expense);
        }
    }

    #[test]
    fn test_capital_sync_lands_on_current_balance() {
        let daily = vec![
            DayTotals { date: date(2024, 1, 1), income: 800.0, expense: 100.0 },
            DayTotals { date: date(2024, 1, 2), income: 0.0, expense: 200.0 },
        ];
        let cumulative = accumulate(&daily);
        let sync = CapitalSync::sync(2000.0, &cumulative);

        assert_eq!(sync.window_net, 500.0);
        assert_eq!(sync.at_window_start, 1500.0);

        let points = historical_points(&cumulative, sync.at_window_start, date(2024, 1, 2));
        assert_eq!(points.last().unwrap().capital, 2000.0);
        assert!(points.last().unwrap().is_today);
        assert!(!points[0].is_today);
    }

    #[test]
    fn test_current_capital_normalizes_wallets() {
        let rates = RateTable::new("USD").with_rate("EUR", 1.5);
        let wallet = |balance: f64, currency: &str| Wallet {
            id: 0,
            user_id: "u".into(),
            name: currency.into(),
            balance,
            currency: currency.into(),
            created_at: Utc::now(),
        };
        let total = current_capital(&[wallet(100.0, "USD"), wallet(10.0, "EUR")], &rates);
        assert_eq!(total, 115.0);
    }

    #[test]
    fn test_stats_zero_guarded() {
        let stats = HistoricalStats::from_daily(&[]);
        assert_eq!(stats.avg_daily_income, 0.0);
        assert!(!stats.avg_daily_expense.is_nan());

        let daily = vec![
            DayTotals { date: date(2024, 1, 1), income: 30.0, expense: 10.0 },
            DayTotals { date: date(2024, 1, 2), income: 0.0, expense: 10.0 },
        ];
        let stats = HistoricalStats::from_daily(&daily);
        assert_eq!(stats.avg_daily_income, 15.0);
        assert_eq!(stats.avg_daily_expense, 10.0);
    }
}
