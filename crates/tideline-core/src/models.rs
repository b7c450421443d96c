//! Domain models for Tideline

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Direction of a money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Income,
    Expense,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Ok(Self::Income),
            "expense" | "expenses" | "out" => Ok(Self::Expense),
            _ => Err(format!("Unknown entry type: {}", s)),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Repetition cadence of a recurring obligation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Multiplier converting one occurrence into a monthly amount
    pub fn monthly_factor(&self) -> f64 {
        match self {
            Self::Daily => 30.0,
            Self::Weekly => 4.33,
            Self::Monthly => 1.0,
            Self::Yearly => 1.0 / 12.0,
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Period a budget ceiling applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Number of days a ceiling is spread over when projected per day
    pub fn days(&self) -> f64 {
        match self {
            Self::Weekly => 7.0,
            Self::Monthly => 30.0,
            Self::Yearly => 365.0,
        }
    }

    /// Multiplier converting a ceiling into a monthly amount
    pub fn monthly_factor(&self) -> f64 {
        match self {
            Self::Weekly => 4.33,
            Self::Monthly => 1.0,
            Self::Yearly => 1.0 / 12.0,
        }
    }
}

impl std::str::FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            _ => Err(format!("Unknown budget period: {}", s)),
        }
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A wallet (cash, checking, savings...) holding an authoritative balance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    /// Current balance as edited by the user or their bank sync
    pub balance: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// A realized transaction
///
/// Amounts are always non-negative; the direction lives in `entry_type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: String,
    pub wallet_id: Option<i64>,
    pub date: NaiveDate,
    pub amount: f64,
    pub entry_type: EntryType,
    pub currency: String,
    pub description: Option<String>,
}

/// Fields for creating a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub wallet_id: Option<i64>,
    pub date: NaiveDate,
    pub amount: f64,
    pub entry_type: EntryType,
    pub currency: String,
    pub description: Option<String>,
}

/// A scheduled income or expense that repeats from an anchor date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringObligation {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub amount: f64,
    pub entry_type: EntryType,
    pub frequency: Frequency,
    /// Anchor date: first occurrence still to be counted
    pub next_occurrence: NaiveDate,
    pub is_active: bool,
    pub currency: String,
}

/// A one-off income or expense planned for a specific date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedItem {
    pub id: i64,
    pub user_id: String,
    pub title: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub entry_type: EntryType,
    pub currency: String,
}

/// A spending ceiling for a period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetLimit {
    pub id: i64,
    pub user_id: String,
    pub name: String,
    pub amount: f64,
    pub period: BudgetPeriod,
    pub is_active: bool,
    pub currency: String,
}

/// One day of the merged trend series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Cumulative income since the window start
    pub income: f64,
    /// Cumulative expense since the window start
    pub expense: f64,
    /// `capital_base + income - expense`
    pub capital: f64,
    pub is_today: bool,
    pub is_forecast: bool,
}

/// Predicted (non-cumulative) movement for one forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDayDelta {
    pub date: NaiveDate,
    pub predicted_income: f64,
    pub predicted_expense: f64,
    /// Informational only, never used to compute capital
    #[serde(default)]
    pub predicted_capital: Option<f64>,
}

impl ForecastDayDelta {
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            predicted_income: 0.0,
            predicted_expense: 0.0,
            predicted_capital: None,
        }
    }
}

/// Optional contributions layered onto the baseline forecast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendFilters {
    pub include_recurring_income: bool,
    pub include_recurring_expense: bool,
    pub include_planned_income: bool,
    pub include_planned_expenses: bool,
    pub include_budget_limits: bool,
}

impl TrendFilters {
    pub fn all() -> Self {
        Self {
            include_recurring_income: true,
            include_recurring_expense: true,
            include_planned_income: true,
            include_planned_expenses: true,
            include_budget_limits: true,
        }
    }

    pub fn any(&self) -> bool {
        self.include_recurring_income
            || self.include_recurring_expense
            || self.include_planned_income
            || self.include_planned_expenses
            || self.include_budget_limits
    }
}

/// Parameters for a trend computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendRequest {
    pub user_id: String,
    pub history_days: u32,
    pub forecast_days: u32,
    pub use_ai: bool,
    pub filters: TrendFilters,
}

impl TrendRequest {
    pub fn new(user_id: impl Into<String>, history_days: u32, forecast_days: u32) -> Self {
        Self {
            user_id: user_id.into(),
            history_days,
            forecast_days,
            use_ai: false,
            filters: TrendFilters::default(),
        }
    }

    pub fn with_ai(mut self, use_ai: bool) -> Self {
        self.use_ai = use_ai;
        self
    }

    pub fn with_filters(mut self, filters: TrendFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// How the forecast leg of a trend was produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendMetadata {
    #[serde(rename = "usedAI")]
    pub used_ai: bool,
    pub from_cache: bool,
    pub cache_expires_at: Option<DateTime<Utc>>,
}

/// Merged historical + forecast series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub points: Vec<TrendPoint>,
    pub metadata: TrendMetadata,
    /// Capital at the start of the historical window
    pub capital_base: f64,
}

/// Cached raw AI forecast
///
/// Holds unfiltered per-day values only, so filters apply identically to
/// cached and fresh forecasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub daily_income: Vec<f64>,
    pub daily_expense: Vec<f64>,
    pub daily_capital: Vec<Option<f64>>,
    /// Current capital at generation time
    pub base_capital: f64,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Average monthly figures used by the goal predictor
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub income: f64,
    pub expenses: f64,
    pub free_capital: f64,
}

impl MonthlyStats {
    pub fn new(income: f64, expenses: f64) -> Self {
        Self {
            income,
            expenses,
            free_capital: income - expenses,
        }
    }
}

/// Time-to-goal estimate for one spending scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPrediction {
    pub can_afford: bool,
    /// `None` when the goal is never reached at this pace
    pub months_to_goal: Option<u32>,
    pub target_date: Option<NaiveDate>,
    pub capital_leftover_at_goal: f64,
    pub monthly_free_capital_used: f64,
    pub warning: Option<String>,
}

/// Goal estimate under realized pace and under budget ceilings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalForecast {
    pub goal_amount: f64,
    pub stats: MonthlyStats,
    pub current_pace: GoalPrediction,
    pub within_limits: GoalPrediction,
}
