//! Tideline CLI - Personal finance trend engine
//!
//! Usage:
//!   tideline init                              Initialize database
//!   tideline wallets add --name Checking -b 2000
//!   tideline recurring add --title Rent -a 1200 -t expense -f monthly --next 2024-02-01
//!   tideline trend --history 30 --forecast 30 --ai --all-filters
//!   tideline goal --amount 6000

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let user = cli.user.as_str();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Status => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_status(&cli.db, cli.no_encrypt, user, &config).await
        }
        Commands::Wallets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(WalletsAction::List) => commands::cmd_wallets_list(&db, user),
                Some(WalletsAction::Add {
                    name,
                    balance,
                    currency,
                }) => commands::cmd_wallets_add(&db, user, &name, balance, &currency),
                Some(WalletsAction::SetBalance { id, balance }) => {
                    commands::cmd_wallets_set_balance(&db, user, id, balance)
                }
            }
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, user, 30),
                Some(TransactionsAction::List { days }) => {
                    commands::cmd_transactions_list(&db, user, days)
                }
                Some(TransactionsAction::Add {
                    date,
                    amount,
                    entry_type,
                    wallet,
                    currency,
                    description,
                }) => commands::cmd_transactions_add(
                    &db,
                    user,
                    &date,
                    amount,
                    &entry_type,
                    wallet,
                    &currency,
                    description.as_deref(),
                ),
            }
        }
        Commands::Recurring { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(RecurringAction::List) => commands::cmd_recurring_list(&db, user),
                Some(RecurringAction::Add {
                    title,
                    amount,
                    entry_type,
                    frequency,
                    next,
                    currency,
                }) => commands::cmd_recurring_add(
                    &db,
                    user,
                    &title,
                    amount,
                    &entry_type,
                    &frequency,
                    &next,
                    &currency,
                ),
                Some(RecurringAction::Pause { id }) => {
                    commands::cmd_recurring_set_active(&db, user, id, false)
                }
                Some(RecurringAction::Resume { id }) => {
                    commands::cmd_recurring_set_active(&db, user, id, true)
                }
            }
        }
        Commands::Planned { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(PlannedAction::List) => commands::cmd_planned_list(&db, user),
                Some(PlannedAction::Add {
                    title,
                    amount,
                    entry_type,
                    date,
                    currency,
                }) => commands::cmd_planned_add(
                    &db,
                    user,
                    &title,
                    amount,
                    &entry_type,
                    &date,
                    &currency,
                ),
            }
        }
        Commands::Budgets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(BudgetsAction::List) => commands::cmd_budgets_list(&db, user),
                Some(BudgetsAction::Add {
                    name,
                    amount,
                    period,
                    currency,
                }) => commands::cmd_budgets_add(&db, user, &name, amount, &period, &currency),
                Some(BudgetsAction::Enable { id }) => {
                    commands::cmd_budgets_set_active(&db, user, id, true)
                }
                Some(BudgetsAction::Disable { id }) => {
                    commands::cmd_budgets_set_active(&db, user, id, false)
                }
            }
        }
        Commands::Trend {
            history,
            forecast,
            ai,
            recurring_income,
            recurring_expense,
            planned_income,
            planned_expenses,
            budget_limits,
            all_filters,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            let filters = if all_filters {
                tideline_core::TrendFilters::all()
            } else {
                tideline_core::TrendFilters {
                    include_recurring_income: recurring_income,
                    include_recurring_expense: recurring_expense,
                    include_planned_income: planned_income,
                    include_planned_expenses: planned_expenses,
                    include_budget_limits: budget_limits,
                }
            };
            let options = commands::TrendOptions {
                history_days: history.unwrap_or(config.default_history_days),
                forecast_days: forecast.unwrap_or(config.default_forecast_days),
                use_ai: ai,
                filters,
                json,
            };
            let client = if ai {
                tideline_core::AIClient::from_env()
            } else {
                None
            };
            commands::cmd_trend(&db, &config, client.as_ref(), user, &options).await
        }
        Commands::Goal { amount, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_goal(&db, &config, user, amount, json)
        }
        Commands::Cache { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                CacheAction::Purge => commands::cmd_cache_purge(&db).await,
                CacheAction::Clear => commands::cmd_cache_clear(&db).await,
            }
        }
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
    }
}
