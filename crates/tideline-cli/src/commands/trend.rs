//! Trend, goal and forecast cache commands
//!
//! Both the trend and goal commands read straight from the database; the
//! SQLite `forecast_cache` table doubles as the AI forecast cache.

use anyhow::{Context, Result};
use chrono::Utc;
use tideline_core::ai::{AIBackend, AIClient};
use tideline_core::db::Database;
use tideline_core::models::{GoalPrediction, TrendFilters, TrendRequest, TrendResult};
use tideline_core::{ForecastCacheStore, TrendConfig, TrendEngine};

/// Options for the trend command
#[derive(Debug, Clone)]
pub struct TrendOptions {
    pub history_days: u32,
    pub forecast_days: u32,
    pub use_ai: bool,
    pub filters: TrendFilters,
    pub json: bool,
}

pub async fn cmd_trend(
    db: &Database,
    config: &TrendConfig,
    client: Option<&AIClient>,
    user_id: &str,
    options: &TrendOptions,
) -> Result<()> {
    if options.use_ai && !options.json {
        match client {
            Some(client) => println!("🤖 AI forecast via {} ({})", client.model(), client.host()),
            None => println!("💡 Tip: Set OLLAMA_HOST for AI forecasts; using a flat forecast"),
        }
    }

    let engine = TrendEngine::new(db, db, config).with_ai(client);
    let request = TrendRequest::new(user_id, options.history_days, options.forecast_days)
        .with_ai(options.use_ai)
        .with_filters(options.filters);

    let result = engine
        .compute_trend(&request, Utc::now())
        .await
        .context("Failed to compute trend")?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    print_trend(&result, &config.base_currency);
    Ok(())
}

fn print_trend(result: &TrendResult, currency: &str) {
    println!();
    println!("🌊 Capital Trend ({})", currency);
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<10}   {:>12}   {:>12}   {:>12}",
        "DATE", "INCOME", "EXPENSE", "CAPITAL"
    );

    for point in &result.points {
        let marker = if point.is_today {
            " ◀ today"
        } else if point.is_forecast {
            " ~"
        } else {
            ""
        };
        println!(
            "   {}   {:>12.2}   {:>12.2}   {:>12.2}{}",
            point.date, point.income, point.expense, point.capital, marker
        );
    }

    let today = result.points.iter().find(|p| p.is_today);
    let end = result.points.last().filter(|p| p.is_forecast);

    println!("   ─────────────────────────────────────────────────────────────");
    if let Some(today) = today {
        println!("   Capital today: {:.2}", today.capital);
        if let Some(end) = end {
            let change = end.capital - today.capital;
            let arrow = if change >= 0.0 { "📈" } else { "📉" };
            println!(
                "   {} Forecast {}: {:.2} ({:+.2})",
                arrow, end.date, end.capital, change
            );
        }
    }

    let source = match (result.metadata.used_ai, result.metadata.from_cache) {
        (true, true) => "AI (cached)",
        (true, false) => "AI",
        (false, _) => "flat baseline",
    };
    println!("   Forecast source: {}", source);
    if let Some(expires) = result.metadata.cache_expires_at {
        println!("   Cached until: {}", expires.format("%Y-%m-%d %H:%M UTC"));
    }
}

pub fn cmd_goal(
    db: &Database,
    config: &TrendConfig,
    user_id: &str,
    amount: f64,
    json: bool,
) -> Result<()> {
    let engine = TrendEngine::new(db, db, config);
    let forecast = engine
        .predict_goal(user_id, amount, Utc::now())
        .context("Failed to predict goal")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&forecast)?);
        return Ok(());
    }

    println!();
    println!("🎯 Goal: {:.2} {}", forecast.goal_amount, config.base_currency);
    println!("   ─────────────────────────────────────────────");
    println!("   Monthly income:   {:>10.2}", forecast.stats.income);
    println!("   Monthly expenses: {:>10.2}", forecast.stats.expenses);
    println!("   Free capital:     {:>10.2}", forecast.stats.free_capital);
    println!();
    print_scenario("At current pace", &forecast.current_pace);
    print_scenario("Within budget limits", &forecast.within_limits);

    Ok(())
}

fn print_scenario(label: &str, prediction: &GoalPrediction) {
    println!("   {}:", label);
    match (prediction.months_to_goal, prediction.target_date) {
        (Some(months), Some(date)) if prediction.can_afford => {
            println!(
                "      ✅ {} months (by {}), {:.2} left over",
                months, date, prediction.capital_leftover_at_goal
            );
        }
        _ => {
            println!("      ❌ Not reachable");
        }
    }
    if let Some(ref warning) = prediction.warning {
        println!("      ⚠️  {}", warning);
    }
}

pub async fn cmd_cache_purge(db: &Database) -> Result<()> {
    let removed = db
        .purge_expired(Utc::now())
        .await
        .context("Failed to purge forecast cache")?;
    println!("🧹 Removed {} expired forecast(s)", removed);
    Ok(())
}

pub async fn cmd_cache_clear(db: &Database) -> Result<()> {
    let removed = db
        .clear()
        .await
        .context("Failed to clear forecast cache")?;
    println!("🧹 Removed {} cached forecast(s)", removed);
    Ok(())
}
