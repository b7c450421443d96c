//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tideline - See where your money is heading
#[derive(Parser)]
#[command(name = "tideline")]
#[command(about = "Personal finance trend and forecast engine", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "tideline.db", global = true)]
    pub db: PathBuf,

    /// User whose records are read and written
    #[arg(long, default_value = "local", env = "TIDELINE_USER", global = true)]
    pub user: String,

    /// Engine config file (defaults to the data dir override, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set TIDELINE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Show database, config and AI backend status
    Status,

    /// Manage wallets (list, add, set-balance)
    Wallets {
        #[command(subcommand)]
        action: Option<WalletsAction>,
    },

    /// Manage realized transactions (list, add)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage recurring obligations (list, add, pause, resume)
    Recurring {
        #[command(subcommand)]
        action: Option<RecurringAction>,
    },

    /// Manage planned one-off income and expenses (list, add)
    Planned {
        #[command(subcommand)]
        action: Option<PlannedAction>,
    },

    /// Manage budget ceilings (list, add, enable, disable)
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Show the capital trend: history plus forecast
    Trend {
        /// Days of history ending today (defaults to config)
        #[arg(long)]
        history: Option<u32>,

        /// Days to forecast after today (defaults to config)
        #[arg(long)]
        forecast: Option<u32>,

        /// Use the AI backend for the forecast (falls back to a flat forecast)
        #[arg(long)]
        ai: bool,

        /// Add recurring income to forecast days
        #[arg(long)]
        recurring_income: bool,

        /// Add recurring expenses to forecast days
        #[arg(long)]
        recurring_expense: bool,

        /// Add planned one-off income
        #[arg(long)]
        planned_income: bool,

        /// Add planned one-off expenses
        #[arg(long)]
        planned_expenses: bool,

        /// Spend the daily share of active budgets every forecast day
        #[arg(long)]
        budget_limits: bool,

        /// Enable every filter above
        #[arg(long)]
        all_filters: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate when a savings goal becomes affordable
    Goal {
        /// Target amount in the base currency
        #[arg(short, long)]
        amount: f64,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage cached AI forecasts
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage AI prompts (list available prompts, view override status)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },
}

#[derive(Subcommand)]
pub enum WalletsAction {
    /// List wallets and total capital
    List,

    /// Add a wallet (or update the balance of one with the same name)
    Add {
        /// Wallet name
        #[arg(short, long)]
        name: String,

        /// Current balance
        #[arg(short, long)]
        balance: f64,

        /// Currency code
        #[arg(short, long, default_value = "USD")]
        currency: String,
    },

    /// Overwrite a wallet balance
    SetBalance {
        /// Wallet ID
        #[arg(long)]
        id: i64,

        /// New balance
        #[arg(short, long)]
        balance: f64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions from the last N days
    List {
        /// Number of days to include
        #[arg(short, long, default_value = "30")]
        days: u32,
    },

    /// Record a realized transaction
    Add {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Amount (non-negative; direction comes from --type)
        #[arg(short, long)]
        amount: f64,

        /// Entry type: income or expense
        #[arg(short = 't', long = "type")]
        entry_type: String,

        /// Wallet ID
        #[arg(short, long)]
        wallet: Option<i64>,

        /// Currency code
        #[arg(short, long, default_value = "USD")]
        currency: String,

        /// Free-form description
        #[arg(short, long)]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RecurringAction {
    /// List recurring obligations
    List,

    /// Add a recurring obligation
    Add {
        /// Title
        #[arg(long)]
        title: String,

        /// Amount per occurrence
        #[arg(short, long)]
        amount: f64,

        /// Entry type: income or expense
        #[arg(short = 't', long = "type")]
        entry_type: String,

        /// Frequency: daily, weekly, monthly, yearly
        #[arg(short, long)]
        frequency: String,

        /// Next occurrence (YYYY-MM-DD), the schedule anchor
        #[arg(long)]
        next: String,

        /// Currency code
        #[arg(short, long, default_value = "USD")]
        currency: String,
    },

    /// Pause a recurring obligation
    Pause {
        /// Obligation ID
        id: i64,
    },

    /// Resume a paused recurring obligation
    Resume {
        /// Obligation ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum PlannedAction {
    /// List planned income and expenses
    List,

    /// Plan a one-off income or expense
    Add {
        /// Title
        #[arg(long)]
        title: String,

        /// Amount
        #[arg(short, long)]
        amount: f64,

        /// Entry type: income or expense
        #[arg(short = 't', long = "type")]
        entry_type: String,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Currency code
        #[arg(short, long, default_value = "USD")]
        currency: String,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// List budget ceilings
    List,

    /// Add a budget ceiling
    Add {
        /// Budget name
        #[arg(short, long)]
        name: String,

        /// Ceiling amount per period
        #[arg(short, long)]
        amount: f64,

        /// Period: weekly, monthly, yearly
        #[arg(short, long, default_value = "monthly")]
        period: String,

        /// Currency code
        #[arg(short, long, default_value = "USD")]
        currency: String,
    },

    /// Enable a budget ceiling
    Enable {
        /// Budget ID
        id: i64,
    },

    /// Disable a budget ceiling
    Disable {
        /// Budget ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Remove expired forecasts
    Purge,

    /// Remove every cached forecast
    Clear,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts with override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., "forecast_trend")
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
