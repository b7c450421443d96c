//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` - Engine config from `--config` or the default locations
//! - `parse_date` / `parse_kind` - Argument parsing shared by record commands
//! - `cmd_init` - Initialize the database
//! - `cmd_status` - Database, config and AI backend status

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tideline_core::ai::{AIBackend, AIClient};
use tideline_core::config::default_config_path;
use tideline_core::db::{Database, DB_KEY_ENV};
use tideline_core::TrendConfig;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load the engine config from an explicit file, else the data dir override, else defaults
pub fn load_config(path: Option<&Path>) -> Result<TrendConfig> {
    match path {
        Some(path) => TrendConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => TrendConfig::load().context("Failed to load config"),
    }
}

/// Parse a `YYYY-MM-DD` argument
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Parse an enum argument (entry type, frequency, budget period)
pub fn parse_kind<T>(s: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    s.parse::<T>().map_err(|e| anyhow::anyhow!(e))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Add a wallet: tideline wallets add --name Checking --balance 2000");
    println!("  2. Add recurring bills: tideline recurring add --title Rent -a 1200 -t expense -f monthly --next 2024-02-01");
    println!("  3. See your trend: tideline trend --all-filters");

    Ok(())
}

pub async fn cmd_status(
    db_path: &Path,
    no_encrypt: bool,
    user_id: &str,
    config: &TrendConfig,
) -> Result<()> {
    use std::fs;

    println!();
    println!("📊 Tideline Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());
    println!("   User: {}", user_id);

    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // Check encryption status
    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                println!();
                println!("   Wallets: {}", db.list_wallets(user_id)?.len());
                println!("   Recurring: {}", db.list_recurring(user_id)?.len());
                println!("   Budgets: {}", db.list_budgets(user_id)?.len());
                println!("   Cached forecasts: {}", db.cached_forecast_count()?);
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    // Config
    println!();
    let override_path = default_config_path().filter(|p| p.exists());
    match override_path {
        Some(path) => println!("   Config: {}", path.display()),
        None => println!("   Config: built-in defaults"),
    }
    println!(
        "   Windows: {} days history, {} days forecast (max {} / {})",
        config.default_history_days,
        config.default_forecast_days,
        config.max_history_days,
        config.max_forecast_days
    );
    println!("   Base currency: {}", config.base_currency);

    // AI backend
    println!();
    match AIClient::from_env() {
        Some(client) => {
            let healthy = client.health_check().await;
            println!(
                "   🤖 AI backend: {} at {} ({})",
                client.model(),
                client.host(),
                if healthy { "reachable" } else { "unreachable" }
            );
        }
        None => {
            println!("   💡 AI backend: not configured");
            println!("      Set OLLAMA_HOST (or AI_BACKEND=openai_compatible) for AI forecasts");
        }
    }

    println!();
    Ok(())
}
