//! Trend engine
//!
//! Builds the historical series, synchronizes it to the current balance, then
//! extends it with a forecast. The AI leg returns a `Result`; any error drops
//! to the flat baseline so callers always get a usable series.

use std::sync::RwLock;

use chrono::{DateTime, Months, Utc};
use tracing::{debug, error, info, warn};

use super::ai::{AiForecaster, ForecastContext};
use super::filters::FilterPipeline;
use super::goals;
use super::history::{self, CapitalSync, HistoricalStats};
use super::simple;
use crate::ai::AIClient;
use crate::cache::{CacheKey, ForecastCacheStore};
use crate::config::TrendConfig;
use crate::currency::{CurrencyConverter, RateTable};
use crate::error::{Error, Result};
use crate::models::{
    ForecastDayDelta, GoalForecast, RecurringObligation, TrendMetadata, TrendPoint, TrendRequest,
    TrendResult,
};
use crate::prompts::{PromptId, PromptLibrary};
use crate::source::TrendSource;

/// Computes trends and goal predictions for one data source
pub struct TrendEngine<'a> {
    source: &'a dyn TrendSource,
    cache: &'a dyn ForecastCacheStore,
    config: &'a TrendConfig,
    ai: Option<&'a AIClient>,
    rates: RateTable,
    prompts: RwLock<PromptLibrary>,
}

impl<'a> TrendEngine<'a> {
    pub fn new(
        source: &'a dyn TrendSource,
        cache: &'a dyn ForecastCacheStore,
        config: &'a TrendConfig,
    ) -> Self {
        Self {
            source,
            cache,
            config,
            ai: None,
            rates: config.rate_table(),
            prompts: RwLock::new(PromptLibrary::new()),
        }
    }

    /// Attach an AI backend; without one, AI requests use the baseline forecast
    pub fn with_ai(mut self, ai: Option<&'a AIClient>) -> Self {
        self.ai = ai;
        self
    }

    /// Use a specific prompt library (e.g. embedded-only in tests)
    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = RwLock::new(prompts);
        self
    }

    fn validate(&self, request: &TrendRequest) -> Result<()> {
        if request.user_id.trim().is_empty() {
            return Err(Error::Validation("User id is required".into()));
        }
        if request.history_days < 1 {
            return Err(Error::Validation(
                "History window must be at least one day".into(),
            ));
        }
        if request.history_days > self.config.max_history_days {
            return Err(Error::Validation(format!(
                "History window of {} days exceeds the maximum of {}",
                request.history_days, self.config.max_history_days
            )));
        }
        if request.forecast_days > self.config.max_forecast_days {
            return Err(Error::Validation(format!(
                "Forecast window of {} days exceeds the maximum of {}",
                request.forecast_days, self.config.max_forecast_days
            )));
        }
        Ok(())
    }

    /// Merge history and forecast into one continuous cumulative series
    pub async fn compute_trend(
        &self,
        request: &TrendRequest,
        now: DateTime<Utc>,
    ) -> Result<TrendResult> {
        self.validate(request)?;

        let user_id = request.user_id.as_str();
        let today = now.date_naive();
        let start = history::window_start(today, request.history_days);

        let transactions = self.source.transactions_since(user_id, start)?;
        let wallets = self.source.wallets(user_id)?;

        let daily = history::build_daily_window(&transactions, start, request.history_days, &self.rates);
        let cumulative = history::accumulate(&daily);
        let stats = HistoricalStats::from_daily(&daily);

        let current_capital = history::current_capital(&wallets, &self.rates);
        let sync = CapitalSync::sync(current_capital, &cumulative);
        debug!(
            user = %user_id,
            current = sync.current,
            window_net = sync.window_net,
            at_window_start = sync.at_window_start,
            "Capital synchronized"
        );

        let mut points = history::historical_points(&cumulative, sync.at_window_start, today);

        if request.forecast_days == 0 {
            return Ok(TrendResult {
                points,
                metadata: TrendMetadata::default(),
                capital_base: sync.at_window_start,
            });
        }

        let (baseline, metadata) = match self.ai.filter(|_| request.use_ai) {
            Some(client) => {
                match self
                    .ai_forecast(client, request, now, current_capital, &stats)
                    .await
                {
                    Ok(forecast) => (
                        forecast.days,
                        TrendMetadata {
                            used_ai: true,
                            from_cache: forecast.from_cache,
                            cache_expires_at: Some(forecast.expires_at),
                        },
                    ),
                    Err(e) => {
                        if e.is_transient() {
                            warn!(user = %user_id, error = %e, "AI forecast unavailable");
                        } else {
                            error!(user = %user_id, error = %e, "AI forecast rejected");
                        }
                        info!(user = %user_id, "Falling back to simple forecast");
                        (
                            simple::generate(today, request.forecast_days),
                            TrendMetadata::default(),
                        )
                    }
                }
            }
            None => {
                if request.use_ai {
                    warn!(user = %user_id, "AI forecast requested but no AI backend is configured");
                }
                (
                    simple::generate(today, request.forecast_days),
                    TrendMetadata::default(),
                )
            }
        };

        let pipeline = FilterPipeline::load(self.source, user_id, &request.filters, &self.rates)?;
        let filtered = pipeline.apply(baseline);

        let forecast = forecast_points(points.last(), &filtered, sync.at_window_start);
        points.extend(forecast);

        Ok(TrendResult {
            points,
            metadata,
            capital_base: sync.at_window_start,
        })
    }

    async fn ai_forecast(
        &self,
        client: &AIClient,
        request: &TrendRequest,
        now: DateTime<Utc>,
        current_capital: f64,
        stats: &HistoricalStats,
    ) -> Result<super::AiForecast> {
        let prompt = {
            let mut prompts = self
                .prompts
                .write()
                .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
            prompts.get(PromptId::ForecastTrend)?.clone()
        };

        let recurring: Vec<RecurringObligation> = self
            .source
            .recurring(&request.user_id)?
            .into_iter()
            .filter(|r| r.is_active)
            .map(|mut r| {
                r.amount = self.rates.to_base(r.amount, &r.currency);
                r.currency = self.rates.base().to_string();
                r
            })
            .collect();

        let key = CacheKey::for_request(request);
        let ctx = ForecastContext {
            key: &key,
            today: now.date_naive(),
            days_ahead: request.forecast_days,
            current_capital,
            currency: self.rates.base(),
            stats,
            recurring: &recurring,
        };

        AiForecaster::new(client, self.cache, &self.config.ai, &prompt)
            .generate(&ctx, now)
            .await
    }

    /// Months-to-goal at the realized pace and within budget ceilings
    pub fn predict_goal(
        &self,
        user_id: &str,
        goal_amount: f64,
        now: DateTime<Utc>,
    ) -> Result<GoalForecast> {
        if user_id.trim().is_empty() {
            return Err(Error::Validation("User id is required".into()));
        }

        let today = now.date_naive();
        let start = today
            .checked_sub_months(Months::new(goals::TRAILING_MONTHS))
            .unwrap_or(today);

        let transactions = self.source.transactions_since(user_id, start)?;
        let recurring = self.source.recurring(user_id)?;
        let budgets = self.source.budgets(user_id)?;

        let stats = goals::monthly_stats(&transactions, &recurring, start, today, &self.rates);
        let budget_total = goals::monthly_budget_total(&budgets, &self.rates);

        goals::predict(goal_amount, stats, budget_total, today)
    }
}

/// Continue cumulative totals from the last historical point
///
/// Capital is always `capital_base + income - expense`; the model's own
/// capital estimate is ignored.
pub fn forecast_points(
    last: Option<&TrendPoint>,
    deltas: &[ForecastDayDelta],
    capital_base: f64,
) -> Vec<TrendPoint> {
    let (mut income, mut expense) = last.map(|p| (p.income, p.expense)).unwrap_or((0.0, 0.0));

    deltas
        .iter()
        .map(|day| {
            income += day.predicted_income;
            expense += day.predicted_expense;
            TrendPoint {
                date: day.date,
                income,
                expense,
                capital: capital_base + income - expense,
                is_today: false,
                is_forecast: true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_forecast_points_continue_from_history() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let last = TrendPoint {
            date: today,
            income: 500.0,
            expense: 200.0,
            capital: 1300.0,
            is_today: true,
            is_forecast: false,
        };
        let deltas = vec![
            ForecastDayDelta {
                date: today.succ_opt().unwrap(),
                predicted_income: 100.0,
                predicted_expense: 50.0,
                predicted_capital: Some(-99999.0),
            },
            ForecastDayDelta::zero(NaiveDate::from_ymd_opt(2024, 3, 12).unwrap()),
        ];

        let points = forecast_points(Some(&last), &deltas, 1000.0);
        assert_eq!(points[0].income, 600.0);
        assert_eq!(points[0].expense, 250.0);
        assert_eq!(points[0].capital, 1350.0);
        assert!(points[0].is_forecast);
        assert_eq!(points[1].capital, 1350.0);
    }
}
