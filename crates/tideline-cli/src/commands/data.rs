//! Record management commands
//!
//! Wallets, realized transactions, recurring obligations, planned items and
//! budget ceilings. Amounts are stored non-negative; direction comes from the
//! entry type.

use anyhow::{Context, Result};
use chrono::{Days, Utc};
use tideline_core::db::Database;
use tideline_core::models::{BudgetPeriod, EntryType, Frequency, NewTransaction};

use super::{format_amount, parse_date, parse_kind, truncate};

// ========== Wallets ==========

pub fn cmd_wallets_list(db: &Database, user_id: &str) -> Result<()> {
    let wallets = db.list_wallets(user_id)?;

    if wallets.is_empty() {
        println!("No wallets yet. Add one with:");
        println!("  tideline wallets add --name Checking --balance 2000");
        return Ok(());
    }

    println!();
    println!("👛 Wallets");
    println!("   ─────────────────────────────────────────────");

    for wallet in &wallets {
        println!(
            "   [{}] {:<24} {:>12.2} {}",
            wallet.id,
            truncate(&wallet.name, 24),
            wallet.balance,
            wallet.currency
        );
    }

    Ok(())
}

pub fn cmd_wallets_add(
    db: &Database,
    user_id: &str,
    name: &str,
    balance: f64,
    currency: &str,
) -> Result<()> {
    if !balance.is_finite() {
        anyhow::bail!("Balance must be a finite number");
    }

    let id = db
        .upsert_wallet(user_id, name, balance, currency)
        .context("Failed to save wallet")?;

    println!(
        "✅ Wallet [{}] {}: {:.2} {}",
        id,
        name,
        balance,
        currency.to_uppercase()
    );
    Ok(())
}

pub fn cmd_wallets_set_balance(db: &Database, user_id: &str, id: i64, balance: f64) -> Result<()> {
    if !balance.is_finite() {
        anyhow::bail!("Balance must be a finite number");
    }

    db.set_wallet_balance(user_id, id, balance)?;
    println!("✅ Wallet {} balance set to {:.2}", id, balance);
    println!("   Cached AI forecasts are reused until they expire; run 'tideline cache clear' to refresh now.");
    Ok(())
}

// ========== Transactions ==========

pub fn cmd_transactions_list(db: &Database, user_id: &str, days: u32) -> Result<()> {
    let today = Utc::now().date_naive();
    let start = today
        .checked_sub_days(Days::new(u64::from(days.saturating_sub(1))))
        .unwrap_or(today);
    let transactions = db.list_transactions_since(user_id, start)?;

    if transactions.is_empty() {
        println!("No transactions in the last {} days. Record one with:", days);
        println!("  tideline transactions add --date {} -a 42.50 -t expense", today);
        return Ok(());
    }

    println!();
    println!("📝 Transactions since {}", start);
    println!("   ─────────────────────────────────────────────────────────────");

    let (mut income, mut expense) = (0.0, 0.0);
    for tx in &transactions {
        let is_income = tx.entry_type == EntryType::Income;
        if is_income {
            income += tx.amount;
        } else {
            expense += tx.amount;
        }

        println!(
            "   {} │ {:>20} {} │ {}",
            tx.date,
            format_amount(tx.amount, is_income),
            tx.currency,
            truncate(tx.description.as_deref().unwrap_or("-"), 40)
        );
    }

    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {} transactions │ income {:.2} │ expense {:.2}",
        transactions.len(),
        income,
        expense
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_transactions_add(
    db: &Database,
    user_id: &str,
    date: &str,
    amount: f64,
    entry_type: &str,
    wallet_id: Option<i64>,
    currency: &str,
    description: Option<&str>,
) -> Result<()> {
    let tx = NewTransaction {
        wallet_id,
        date: parse_date(date)?,
        amount,
        entry_type: parse_kind::<EntryType>(entry_type)?,
        currency: currency.to_string(),
        description: description.map(str::to_string),
    };

    let id = db
        .insert_transaction(user_id, &tx)
        .context("Failed to record transaction")?;

    println!(
        "✅ Recorded transaction {}: {} {} on {}",
        id, tx.entry_type, amount, tx.date
    );
    Ok(())
}

// ========== Recurring ==========

pub fn cmd_recurring_list(db: &Database, user_id: &str) -> Result<()> {
    let obligations = db.list_recurring(user_id)?;

    if obligations.is_empty() {
        println!("No recurring obligations. Add one with:");
        println!("  tideline recurring add --title Rent -a 1200 -t expense -f monthly --next 2024-02-01");
        return Ok(());
    }

    println!();
    println!("🔁 Recurring Obligations");
    println!("   ─────────────────────────────────────────────────────────────");

    for r in &obligations {
        let status = if r.is_active { "" } else { " (paused)" };
        println!(
            "   [{}] {:<24} {:>20} {} │ {:<8} │ next {}{}",
            r.id,
            truncate(&r.title, 24),
            format_amount(r.amount, r.entry_type == EntryType::Income),
            r.currency,
            r.frequency,
            r.next_occurrence,
            status
        );
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_recurring_add(
    db: &Database,
    user_id: &str,
    title: &str,
    amount: f64,
    entry_type: &str,
    frequency: &str,
    next: &str,
    currency: &str,
) -> Result<()> {
    let entry_type = parse_kind::<EntryType>(entry_type)?;
    let frequency = parse_kind::<Frequency>(frequency)?;
    let next = parse_date(next)?;

    let id = db
        .insert_recurring(user_id, title, amount, entry_type, frequency, next, currency)
        .context("Failed to add recurring obligation")?;

    println!(
        "✅ Added recurring {} [{}] {}: {:.2} {}, starting {}",
        entry_type, id, title, amount, frequency, next
    );
    Ok(())
}

pub fn cmd_recurring_set_active(db: &Database, user_id: &str, id: i64, active: bool) -> Result<()> {
    db.set_recurring_active(user_id, id, active)?;
    if active {
        println!("▶️  Resumed recurring obligation {}", id);
    } else {
        println!("⏸️  Paused recurring obligation {}", id);
    }
    Ok(())
}

// ========== Planned ==========

pub fn cmd_planned_list(db: &Database, user_id: &str) -> Result<()> {
    let mut items = db.list_planned(user_id, EntryType::Income)?;
    items.extend(db.list_planned(user_id, EntryType::Expense)?);
    items.sort_by_key(|item| item.date);

    if items.is_empty() {
        println!("Nothing planned. Plan a one-off with:");
        println!("  tideline planned add --title Vacation -a 900 -t expense --date 2024-07-01");
        return Ok(());
    }

    println!();
    println!("🗓️  Planned Items");
    println!("   ─────────────────────────────────────────────────────────────");

    for item in &items {
        println!(
            "   {} │ {:>20} {} │ {}",
            item.date,
            format_amount(item.amount, item.entry_type == EntryType::Income),
            item.currency,
            truncate(&item.title, 40)
        );
    }

    Ok(())
}

pub fn cmd_planned_add(
    db: &Database,
    user_id: &str,
    title: &str,
    amount: f64,
    entry_type: &str,
    date: &str,
    currency: &str,
) -> Result<()> {
    let entry_type = parse_kind::<EntryType>(entry_type)?;
    let date = parse_date(date)?;

    let id = db
        .insert_planned(user_id, entry_type, title, amount, date, currency)
        .context("Failed to add planned item")?;

    println!(
        "✅ Planned {} [{}] {}: {:.2} on {}",
        entry_type, id, title, amount, date
    );
    Ok(())
}

// ========== Budgets ==========

pub fn cmd_budgets_list(db: &Database, user_id: &str) -> Result<()> {
    let budgets = db.list_budgets(user_id)?;

    if budgets.is_empty() {
        println!("No budgets. Add one with:");
        println!("  tideline budgets add --name Groceries -a 400 --period monthly");
        return Ok(());
    }

    println!();
    println!("📏 Budget Ceilings");
    println!("   ─────────────────────────────────────────────");

    for b in &budgets {
        let status = if b.is_active { "" } else { " (disabled)" };
        println!(
            "   [{}] {:<24} {:>10.2} {} per {}{}",
            b.id,
            truncate(&b.name, 24),
            b.amount,
            b.currency,
            b.period,
            status
        );
    }

    Ok(())
}

pub fn cmd_budgets_add(
    db: &Database,
    user_id: &str,
    name: &str,
    amount: f64,
    period: &str,
    currency: &str,
) -> Result<()> {
    let period = parse_kind::<BudgetPeriod>(period)?;

    let id = db
        .insert_budget(user_id, name, amount, period, currency)
        .context("Failed to add budget")?;

    println!(
        "✅ Budget [{}] {}: {:.2} per {}",
        id, name, amount, period
    );
    Ok(())
}

pub fn cmd_budgets_set_active(db: &Database, user_id: &str, id: i64, active: bool) -> Result<()> {
    db.set_budget_active(user_id, id, active)?;
    if active {
        println!("✅ Enabled budget {}", id);
    } else {
        println!("⏸️  Disabled budget {}", id);
    }
    Ok(())
}
