//! Trend engine configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tideline/config/trend.toml)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::currency::RateTable;
use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/trend.toml");

/// Settings for the AI forecast leg
#[derive(Debug, Clone)]
pub struct AiSettings {
    /// Hard deadline for one completion call
    pub timeout: Duration,
    /// Lifetime of a cached forecast
    pub cache_ttl: chrono::Duration,
    pub tokens_per_day: u32,
    pub min_tokens: u32,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            cache_ttl: chrono::Duration::hours(12),
            tokens_per_day: 60,
            min_tokens: 1024,
            max_tokens: 8192,
            temperature: 0.2,
        }
    }
}

impl AiSettings {
    /// Response token budget for a forecast of `days` days
    pub fn token_budget(&self, days: u32) -> u32 {
        days.saturating_mul(self.tokens_per_day)
            .clamp(self.min_tokens, self.max_tokens)
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct TrendConfig {
    pub default_history_days: u32,
    pub default_forecast_days: u32,
    pub max_history_days: u32,
    pub max_forecast_days: u32,
    pub ai: AiSettings,
    pub base_currency: String,
    pub rates: HashMap<String, f64>,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            default_history_days: 30,
            default_forecast_days: 30,
            max_history_days: 3650,
            max_forecast_days: 365,
            ai: AiSettings::default(),
            base_currency: "USD".to_string(),
            rates: HashMap::new(),
        }
    }
}

impl TrendConfig {
    /// Load from the default override location, else the embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from a specific file (embedded defaults if it does not exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Rate table for currency normalization
    pub fn rate_table(&self) -> RateTable {
        RateTable::from_rates(&self.base_currency, &self.rates)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tideline").join("config").join("trend.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<TrendConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?,
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    defaults: Option<RawDefaults>,
    ai: Option<RawAi>,
    currency: Option<RawCurrency>,
}

#[derive(Debug, Deserialize)]
struct RawDefaults {
    history_days: Option<u32>,
    forecast_days: Option<u32>,
    max_history_days: Option<u32>,
    max_forecast_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawAi {
    timeout_secs: Option<u64>,
    cache_ttl_hours: Option<i64>,
    tokens_per_day: Option<u32>,
    min_tokens: Option<u32>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    base: Option<String>,
    rates: Option<HashMap<String, f64>>,
}

/// Longest forecast cache lifetime accepted from config (one year)
pub const MAX_CACHE_TTL_HOURS: i64 = 24 * 366;

fn parse_config(content: &str) -> Result<TrendConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = TrendConfig::default();

    if let Some(defaults) = raw.defaults {
        if let Some(days) = defaults.history_days {
            config.default_history_days = days;
        }
        if let Some(days) = defaults.forecast_days {
            config.default_forecast_days = days;
        }
        if let Some(days) = defaults.max_history_days {
            config.max_history_days = days;
        }
        if let Some(days) = defaults.max_forecast_days {
            config.max_forecast_days = days;
        }
    }

    if let Some(ai) = raw.ai {
        if let Some(secs) = ai.timeout_secs {
            config.ai.timeout = Duration::from_secs(secs);
        }
        if let Some(hours) = ai.cache_ttl_hours {
            if !(1..=MAX_CACHE_TTL_HOURS).contains(&hours) {
                return Err(Error::Config(format!(
                    "ai.cache_ttl_hours must be between 1 and {}",
                    MAX_CACHE_TTL_HOURS
                )));
            }
            config.ai.cache_ttl = chrono::Duration::hours(hours);
        }
        if let Some(tokens) = ai.tokens_per_day {
            config.ai.tokens_per_day = tokens;
        }
        if let Some(tokens) = ai.min_tokens {
            config.ai.min_tokens = tokens;
        }
        if let Some(tokens) = ai.max_tokens {
            config.ai.max_tokens = tokens;
        }
        if let Some(temperature) = ai.temperature {
            config.ai.temperature = temperature;
        }
    }

    if let Some(currency) = raw.currency {
        if let Some(base) = currency.base {
            config.base_currency = base.to_uppercase();
        }
        if let Some(rates) = currency.rates {
            config.rates = rates
                .into_iter()
                .map(|(code, rate)| (code.to_uppercase(), rate))
                .collect();
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &TrendConfig) -> Result<()> {
    if config.ai.timeout.is_zero() {
        return Err(Error::Config("ai.timeout_secs must be positive".into()));
    }
    if config.ai.cache_ttl <= chrono::Duration::zero()
        || config.ai.cache_ttl > chrono::Duration::hours(MAX_CACHE_TTL_HOURS)
    {
        return Err(Error::Config(format!(
            "ai.cache_ttl_hours must be between 1 and {}",
            MAX_CACHE_TTL_HOURS
        )));
    }
    if config.ai.min_tokens > config.ai.max_tokens {
        return Err(Error::Config(format!(
            "ai.min_tokens ({}) exceeds ai.max_tokens ({})",
            config.ai.min_tokens, config.ai.max_tokens
        )));
    }
    if config.max_history_days == 0 {
        return Err(Error::Config("defaults.max_history_days must be positive".into()));
    }
    if let Some((code, rate)) = config
        .rates
        .iter()
        .find(|(_, rate)| !rate.is_finite() || **rate <= 0.0)
    {
        return Err(Error::Config(format!("Invalid rate for {}: {}", code, rate)));
    }
    Ok(())
}
