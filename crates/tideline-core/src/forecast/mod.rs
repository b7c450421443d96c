//! Trend forecasting engine
//!
//! Leaf to root:
//! - `history` - daily window, running totals, capital synchronization
//! - `simple` - flat zero baseline forecast
//! - `ai` - LLM forecast with hard deadline, truncation check and cache
//! - `filters` - recurring, planned and budget contributions per forecast day
//! - `engine` - stitches history and forecast into one series
//! - `goals` - months-to-goal under realized and budgeted spending

pub mod ai;
pub mod engine;
pub mod filters;
pub mod goals;
pub mod history;
pub mod simple;

use chrono::{Days, NaiveDate};

pub use ai::{AiForecast, AiForecaster, ForecastContext};
pub use engine::TrendEngine;
pub use filters::FilterPipeline;
pub use history::{CapitalSync, DayTotals, HistoricalStats};

/// Forecast calendar: `today + 1` through `today + days`
pub fn forecast_dates(today: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (1..=u64::from(days))
        .map_while(|offset| today.checked_add_days(Days::new(offset)))
        .collect()
}
