//! Goal and budget predictor
//!
//! Estimates how many months of free capital it takes to afford a target
//! amount, once at the realized pace and once with expenses capped at the
//! configured budget ceilings.

use chrono::{Months, NaiveDate};

use crate::currency::CurrencyConverter;
use crate::error::{Error, Result};
use crate::models::{
    BudgetLimit, EntryType, GoalForecast, GoalPrediction, MonthlyStats, RecurringObligation,
    Transaction,
};

/// Months of realized history averaged into monthly stats
pub const TRAILING_MONTHS: u32 = 3;

/// Average monthly income and expenses
///
/// Realized transactions in `[start, today]` are averaged over
/// `TRAILING_MONTHS`; active recurring obligations are added at their monthly
/// rate (daily x30, weekly x4.33, yearly /12).
pub fn monthly_stats(
    transactions: &[Transaction],
    recurring: &[RecurringObligation],
    start: NaiveDate,
    today: NaiveDate,
    converter: &dyn CurrencyConverter,
) -> MonthlyStats {
    let months = f64::from(TRAILING_MONTHS);
    let (mut income, mut expenses) = (0.0, 0.0);

    for tx in transactions
        .iter()
        .filter(|tx| tx.date >= start && tx.date <= today)
    {
        let amount = converter.to_base(tx.amount, &tx.currency);
        match tx.entry_type {
            EntryType::Income => income += amount,
            EntryType::Expense => expenses += amount,
        }
    }
    income /= months;
    expenses /= months;

    for obligation in recurring.iter().filter(|r| r.is_active) {
        let monthly = converter.to_base(obligation.amount, &obligation.currency)
            * obligation.frequency.monthly_factor();
        match obligation.entry_type {
            EntryType::Income => income += monthly,
            EntryType::Expense => expenses += monthly,
        }
    }

    MonthlyStats::new(income, expenses)
}

/// Monthly total of active budget ceilings, `None` when there are none
pub fn monthly_budget_total(
    budgets: &[BudgetLimit],
    converter: &dyn CurrencyConverter,
) -> Option<f64> {
    let active: Vec<&BudgetLimit> = budgets.iter().filter(|b| b.is_active).collect();
    if active.is_empty() {
        return None;
    }
    Some(
        active
            .iter()
            .map(|b| converter.to_base(b.amount, &b.currency) * b.period.monthly_factor())
            .sum(),
    )
}

/// Predict both scenarios for `goal_amount`
pub fn predict(
    goal_amount: f64,
    stats: MonthlyStats,
    budget_total: Option<f64>,
    today: NaiveDate,
) -> Result<GoalForecast> {
    if !goal_amount.is_finite() || goal_amount <= 0.0 {
        return Err(Error::Validation(format!(
            "Goal amount must be a positive number, got {}",
            goal_amount
        )));
    }

    let current_pace = scenario(goal_amount, stats.free_capital, today);
    let within_limits = match budget_total {
        Some(ceiling) => scenario(goal_amount, stats.income - ceiling, today),
        None => current_pace.clone(),
    };

    Ok(GoalForecast {
        goal_amount,
        stats,
        current_pace,
        within_limits,
    })
}

/// Time to goal at a fixed monthly free capital
pub fn scenario(goal_amount: f64, free_capital: f64, today: NaiveDate) -> GoalPrediction {
    if !free_capital.is_finite() || free_capital <= 0.0 {
        return out_of_reach(
            free_capital,
            "Monthly expenses meet or exceed income; no free capital to save towards this goal",
        );
    }

    let months = (goal_amount / free_capital).ceil();
    let reached = (months <= f64::from(u32::MAX))
        .then_some(months as u32)
        .and_then(|m| Some((m, today.checked_add_months(Months::new(m))?)));
    let Some((months_to_goal, target_date)) = reached else {
        return out_of_reach(
            free_capital,
            "Free capital is too small to reach this goal on any calendar date",
        );
    };

    GoalPrediction {
        can_afford: true,
        months_to_goal: Some(months_to_goal),
        target_date: Some(target_date),
        capital_leftover_at_goal: free_capital * f64::from(months_to_goal) - goal_amount,
        monthly_free_capital_used: free_capital,
        warning: None,
    }
}

fn out_of_reach(free_capital: f64, warning: &str) -> GoalPrediction {
    GoalPrediction {
        can_afford: false,
        months_to_goal: None,
        target_date: None,
        capital_leftover_at_goal: 0.0,
        monthly_free_capital_used: free_capital,
        warning: Some(warning.to_string()),
    }
}
