//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init, status) and shared utilities (open_db, load_config, parsing)
//! - `data` - Record management (wallets, transactions, recurring, planned, budgets)
//! - `prompts` - Prompt library management commands
//! - `trend` - Trend, goal and forecast cache commands

pub mod core;
pub mod data;
pub mod prompts;
pub mod trend;

// Re-export command functions for main.rs
pub use core::*;
pub use data::*;
pub use prompts::*;
pub use trend::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format a signed amount with color: green for income, red for expenses
pub fn format_amount(amount: f64, is_income: bool) -> String {
    if is_income {
        format!("\x1b[32m+{:.2}\x1b[0m", amount)
    } else {
        format!("\x1b[31m-{:.2}\x1b[0m", amount)
    }
}
