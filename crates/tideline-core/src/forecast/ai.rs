//! AI forecast generator
//!
//! Cache lookup, prompt rendering, one completion call under a hard deadline,
//! truncation check, parsing and cache write. Every failure is returned as an
//! error for the caller to fall back on; nothing here retries.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::forecast_dates;
use super::history::HistoricalStats;
use crate::ai::parsing::{parse_forecast_rows, ForecastRow};
use crate::ai::{AIBackend, AIClient, CompletionRequest};
use crate::cache::{CacheKey, ForecastCacheStore};
use crate::config::AiSettings;
use crate::error::{Error, Result};
use crate::models::{CacheEntry, ForecastDayDelta, RecurringObligation};
use crate::prompts::Prompt;

/// Inputs for one forecast generation
#[derive(Debug, Clone)]
pub struct ForecastContext<'a> {
    pub key: &'a CacheKey,
    pub today: NaiveDate,
    pub days_ahead: u32,
    pub current_capital: f64,
    pub currency: &'a str,
    pub stats: &'a HistoricalStats,
    /// Active obligations, amounts already in the base currency
    pub recurring: &'a [RecurringObligation],
}

/// Raw per-day AI forecast
#[derive(Debug, Clone, PartialEq)]
pub struct AiForecast {
    pub days: Vec<ForecastDayDelta>,
    pub from_cache: bool,
    pub expires_at: DateTime<Utc>,
}

/// Generates forecasts through an LLM backend
pub struct AiForecaster<'a> {
    client: &'a AIClient,
    cache: &'a dyn ForecastCacheStore,
    settings: &'a AiSettings,
    prompt: &'a Prompt,
}

impl<'a> AiForecaster<'a> {
    pub fn new(
        client: &'a AIClient,
        cache: &'a dyn ForecastCacheStore,
        settings: &'a AiSettings,
        prompt: &'a Prompt,
    ) -> Self {
        Self {
            client,
            cache,
            settings,
            prompt,
        }
    }

    /// Produce a forecast for `today + 1 ..= today + days_ahead`
    pub async fn generate(&self, ctx: &ForecastContext<'_>, now: DateTime<Utc>) -> Result<AiForecast> {
        let dates = forecast_dates(ctx.today, ctx.days_ahead);

        match self.cache.get(ctx.key, now).await {
            Ok(Some(entry)) => {
                debug!(key = %ctx.key, expires_at = %entry.expires_at, "Forecast cache hit");
                return Ok(AiForecast {
                    days: deltas_from_entry(&entry, &dates),
                    from_cache: true,
                    expires_at: entry.expires_at,
                });
            }
            Ok(None) => debug!(key = %ctx.key, "Forecast cache miss"),
            Err(e) => warn!(key = %ctx.key, error = %e, "Forecast cache unavailable, treating as miss"),
        }

        let max_tokens = self.settings.token_budget(ctx.days_ahead);
        let mut request = CompletionRequest::new(self.render_prompt(ctx, &dates), max_tokens)
            .with_temperature(self.settings.temperature);
        if let Some(system) = self.prompt.system_section() {
            request = request.with_system(system);
        }

        info!(
            model = %self.client.model(),
            days = ctx.days_ahead,
            max_tokens,
            "Requesting AI forecast"
        );

        let completion = tokio::time::timeout(self.settings.timeout, self.client.complete(&request))
            .await
            .map_err(|_| Error::Timeout {
                secs: self.settings.timeout.as_secs(),
            })??;

        if completion.is_truncated() {
            return Err(Error::Truncated { max_tokens });
        }

        let rows = parse_forecast_rows(&completion.text)?;
        let days = align_rows(&rows, &dates);
        let expires_at = now
            .checked_add_signed(self.settings.cache_ttl)
            .ok_or_else(|| Error::Config("ai.cache_ttl_hours overflows the clock".into()))?;

        let entry = CacheEntry {
            daily_income: days.iter().map(|d| d.predicted_income).collect(),
            daily_expense: days.iter().map(|d| d.predicted_expense).collect(),
            daily_capital: days.iter().map(|d| d.predicted_capital).collect(),
            base_capital: ctx.current_capital,
            generated_at: now,
            expires_at,
        };
        if let Err(e) = self.cache.set(ctx.key, &entry).await {
            warn!(key = %ctx.key, error = %e, "Failed to cache AI forecast");
        }

        Ok(AiForecast {
            days,
            from_cache: false,
            expires_at: entry.expires_at,
        })
    }

    fn render_prompt(&self, ctx: &ForecastContext<'_>, dates: &[NaiveDate]) -> String {
        let start_date = dates.first().map(ToString::to_string).unwrap_or_default();
        let end_date = dates.last().map(ToString::to_string).unwrap_or_default();
        let days_ahead = ctx.days_ahead.to_string();
        let history_days = ctx.stats.days.to_string();
        let current_capital = format!("{:.2}", ctx.current_capital);
        let avg_daily_income = format!("{:.2}", ctx.stats.avg_daily_income);
        let avg_daily_expense = format!("{:.2}", ctx.stats.avg_daily_expense);
        let total_income = format!("{:.2}", ctx.stats.total_income);
        let total_expense = format!("{:.2}", ctx.stats.total_expense);
        let recurring = ctx
            .recurring
            .iter()
            .map(|r| {
                format!(
                    "- {} ({}): {:.2} {}, next on {}",
                    r.title, r.entry_type, r.amount, r.frequency, r.next_occurrence
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let mut vars = HashMap::new();
        vars.insert("days_ahead", days_ahead.as_str());
        vars.insert("start_date", start_date.as_str());
        vars.insert("end_date", end_date.as_str());
        vars.insert("history_days", history_days.as_str());
        vars.insert("current_capital", current_capital.as_str());
        vars.insert("currency", ctx.currency);
        vars.insert("avg_daily_income", avg_daily_income.as_str());
        vars.insert("avg_daily_expense", avg_daily_expense.as_str());
        vars.insert("total_income", total_income.as_str());
        vars.insert("total_expense", total_expense.as_str());
        vars.insert("recurring", recurring.as_str());

        self.prompt.render_user(&vars)
    }
}

/// Negative, NaN and infinite daily values become zero
fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn delta_from_row(date: NaiveDate, row: &ForecastRow) -> ForecastDayDelta {
    ForecastDayDelta {
        date,
        predicted_income: sanitize(row.income),
        predicted_expense: sanitize(row.expense),
        predicted_capital: row.capital.filter(|c| c.is_finite()),
    }
}

/// Map model rows onto the forecast calendar
///
/// Rows are matched by date; if no row's date falls on the calendar they are
/// taken in order. Days without a row are zero.
pub fn align_rows(rows: &[ForecastRow], dates: &[NaiveDate]) -> Vec<ForecastDayDelta> {
    let by_date: HashMap<NaiveDate, &ForecastRow> = rows
        .iter()
        .filter_map(|row| row.date.map(|d| (d, row)))
        .collect();
    let any_match = dates.iter().any(|d| by_date.contains_key(d));

    dates
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let row = if any_match {
                by_date.get(&date).copied()
            } else {
                rows.get(i)
            };
            row.map(|r| delta_from_row(date, r))
                .unwrap_or_else(|| ForecastDayDelta::zero(date))
        })
        .collect()
}

/// Rebuild deltas from a cached entry onto today's calendar
fn deltas_from_entry(entry: &CacheEntry, dates: &[NaiveDate]) -> Vec<ForecastDayDelta> {
    dates
        .iter()
        .enumerate()
        .map(|(i, &date)| ForecastDayDelta {
            date,
            predicted_income: entry.daily_income.get(i).copied().map(sanitize).unwrap_or(0.0),
            predicted_expense: entry.daily_expense.get(i).copied().map(sanitize).unwrap_or(0.0),
            predicted_capital: entry.daily_capital.get(i).copied().flatten(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockBackend;
    use crate::cache::MemoryForecastCache;
    use crate::models::TrendRequest;
    use crate::prompts::{PromptId, PromptLibrary};
    use chrono::{Duration, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    fn prompt() -> Prompt {
        PromptLibrary::embedded_only()
            .get(PromptId::ForecastTrend)
            .unwrap()
            .clone()
    }

    struct Harness {
        key: CacheKey,
        stats: HistoricalStats,
        prompt: Prompt,
        settings: AiSettings,
        cache: MemoryForecastCache,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                key: CacheKey::for_request(&TrendRequest::new("alice", 30, 3).with_ai(true)),
                stats: HistoricalStats::default(),
                prompt: prompt(),
                settings: AiSettings::default(),
                cache: MemoryForecastCache::new(),
            }
        }

        fn ctx(&self) -> ForecastContext<'_> {
            ForecastContext {
                key: &self.key,
                today: now().date_naive(),
                days_ahead: 3,
                current_capital: 1000.0,
                currency: "USD",
                stats: &self.stats,
                recurring: &[],
            }
        }

        async fn run(&self, client: &AIClient) -> Result<AiForecast> {
            AiForecaster::new(client, &self.cache, &self.settings, &self.prompt)
                .generate(&self.ctx(), now())
                .await
        }
    }

    const THREE_DAYS: &str = r#"[
        {"date": "2024-03-11", "predictedIncome": 0, "predictedExpense": 20, "predictedCapital": 980},
        {"date": "2024-03-12", "predictedIncome": 100, "predictedExpense": -5},
        {"date": "2024-03-13", "predictedIncome": 0, "predictedExpense": 15}
    ]"#;

    #[tokio::test]
    async fn test_generate_parses_and_caches() {
        let h = Harness::new();
        let mock = MockBackend::new().with_response(THREE_DAYS);
        let client = AIClient::Mock(mock.clone());

        let forecast = h.run(&client).await.unwrap();
        assert!(!forecast.from_cache);
        assert_eq!(forecast.expires_at, now() + Duration::hours(12));
        assert_eq!(forecast.days.len(), 3);
        assert_eq!(forecast.days[0].date, date(2024, 3, 11));
        assert_eq!(forecast.days[1].predicted_income, 100.0);
        assert_eq!(forecast.days[1].predicted_expense, 0.0);

        let second = h.run(&client).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.days, forecast.days);
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_truncated_response_is_rejected_before_parsing() {
        let h = Harness::new();
        let client = AIClient::Mock(MockBackend::new().truncated(THREE_DAYS));

        let err = h.run(&client).await.unwrap_err();
        assert!(matches!(err, Error::Truncated { .. }));
        assert!(h.cache.is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_response_is_an_error() {
        let h = Harness::new();
        let client = AIClient::Mock(MockBackend::new().with_response("no numbers today"));

        let err = h.run(&client).await.unwrap_err();
        assert!(matches!(err, Error::AiResponse(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_hard_deadline() {
        let mut h = Harness::new();
        h.settings.timeout = std::time::Duration::from_millis(50);
        let mock = MockBackend::new()
            .with_response(THREE_DAYS)
            .with_delay(std::time::Duration::from_secs(5));
        let client = AIClient::Mock(mock);

        let err = h.run(&client).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(err.is_transient());
        assert!(h.cache.is_empty());
    }

    #[test]
    fn test_align_rows_by_date_and_position() {
        let dates = vec![date(2024, 3, 11), date(2024, 3, 12)];
        let row = |d: Option<NaiveDate>, income: f64| ForecastRow {
            date: d,
            income,
            expense: 0.0,
            capital: None,
        };

        // Out-of-order dated rows land on their own day
        let dated = vec![row(Some(date(2024, 3, 12)), 2.0), row(Some(date(2024, 3, 11)), 1.0)];
        let aligned = align_rows(&dated, &dates);
        assert_eq!(aligned[0].predicted_income, 1.0);
        assert_eq!(aligned[1].predicted_income, 2.0);

        // Stale dates fall back to position
        let stale = vec![row(Some(date(2020, 1, 1)), 5.0)];
        let aligned = align_rows(&stale, &dates);
        assert_eq!(aligned[0].predicted_income, 5.0);
        assert_eq!(aligned[1], ForecastDayDelta::zero(date(2024, 3, 12)));
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(-3.0), 0.0);
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(4.5), 4.5);
    }

    #[test]
    fn test_rendered_prompt_mentions_recurring() {
        let h = Harness::new();
        let client = AIClient::mock();
        let salary = RecurringObligation {
            id: 1,
            user_id: "alice".into(),
            title: "Salary".into(),
            amount: 3000.0,
            entry_type: crate::models::EntryType::Income,
            frequency: crate::models::Frequency::Monthly,
            next_occurrence: date(2024, 3, 25),
            is_active: true,
            currency: "USD".into(),
        };
        let recurring = [salary];
        let ctx = ForecastContext {
            recurring: &recurring,
            ..h.ctx()
        };

        let forecaster = AiForecaster::new(&client, &h.cache, &h.settings, &h.prompt);
        let dates = forecast_dates(ctx.today, ctx.days_ahead);
        let rendered = forecaster.render_prompt(&ctx, &dates);

        assert!(rendered.contains("Salary (income): 3000.00 monthly, next on 2024-03-25"));
        assert!(rendered.contains("2024-03-11 to 2024-03-13"));
        assert!(rendered.contains("1000.00 USD"));
        assert!(!rendered.contains("{{"));
    }
}
