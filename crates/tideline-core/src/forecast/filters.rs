//! Forecast filter pipeline
//!
//! Each enabled filter is fetched once per computation, then evaluated in
//! memory for every forecast day. Contributions are additive and independent,
//! so the order filters run in does not matter.

use tracing::debug;

use crate::currency::CurrencyConverter;
use crate::error::Result;
use crate::models::{
    BudgetLimit, EntryType, ForecastDayDelta, PlannedItem, RecurringObligation, TrendFilters,
};
use crate::schedule::occurs_on;
use crate::source::TrendSource;

/// Normalized inputs for the enabled filters
#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    recurring_income: Vec<(RecurringObligation, f64)>,
    recurring_expense: Vec<(RecurringObligation, f64)>,
    planned_income: Vec<(PlannedItem, f64)>,
    planned_expenses: Vec<(PlannedItem, f64)>,
    /// Daily share of all active budget ceilings
    budget_daily: f64,
}

impl FilterPipeline {
    /// Fetch what the enabled filters need, one call per record type
    pub fn load(
        source: &dyn TrendSource,
        user_id: &str,
        filters: &TrendFilters,
        converter: &dyn CurrencyConverter,
    ) -> Result<Self> {
        let mut pipeline = Self::default();
        if !filters.any() {
            return Ok(pipeline);
        }

        if filters.include_recurring_income || filters.include_recurring_expense {
            for obligation in source.recurring(user_id)? {
                if !obligation.is_active {
                    continue;
                }
                let amount = converter.to_base(obligation.amount, &obligation.currency);
                match obligation.entry_type {
                    EntryType::Income if filters.include_recurring_income => {
                        pipeline.recurring_income.push((obligation, amount))
                    }
                    EntryType::Expense if filters.include_recurring_expense => {
                        pipeline.recurring_expense.push((obligation, amount))
                    }
                    _ => {}
                }
            }
        }

        if filters.include_planned_income {
            pipeline.planned_income = normalize_planned(source.planned_income(user_id)?, converter);
        }

        if filters.include_planned_expenses {
            pipeline.planned_expenses =
                normalize_planned(source.planned_expenses(user_id)?, converter);
        }

        if filters.include_budget_limits {
            pipeline.budget_daily = daily_budget_share(&source.budgets(user_id)?, converter);
        }

        debug!(
            recurring_income = pipeline.recurring_income.len(),
            recurring_expense = pipeline.recurring_expense.len(),
            planned_income = pipeline.planned_income.len(),
            planned_expenses = pipeline.planned_expenses.len(),
            budget_daily = pipeline.budget_daily,
            "Filter pipeline loaded"
        );

        Ok(pipeline)
    }

    /// Add every enabled contribution to each day
    pub fn apply(&self, deltas: Vec<ForecastDayDelta>) -> Vec<ForecastDayDelta> {
        deltas.into_iter().map(|day| self.apply_day(day)).collect()
    }

    fn apply_day(&self, mut day: ForecastDayDelta) -> ForecastDayDelta {
        let date = day.date;

        day.predicted_income += self
            .recurring_income
            .iter()
            .filter(|(obligation, _)| occurs_on(obligation, date))
            .map(|(_, amount)| amount)
            .sum::<f64>();

        day.predicted_expense += self
            .recurring_expense
            .iter()
            .filter(|(obligation, _)| occurs_on(obligation, date))
            .map(|(_, amount)| amount)
            .sum::<f64>();

        day.predicted_income += planned_on(&self.planned_income, date);
        day.predicted_expense += planned_on(&self.planned_expenses, date);
        day.predicted_expense += self.budget_daily;

        day
    }
}

fn normalize_planned(
    items: Vec<PlannedItem>,
    converter: &dyn CurrencyConverter,
) -> Vec<(PlannedItem, f64)> {
    items
        .into_iter()
        .map(|item| {
            let amount = converter.to_base(item.amount, &item.currency);
            (item, amount)
        })
        .collect()
}

fn planned_on(items: &[(PlannedItem, f64)], date: chrono::NaiveDate) -> f64 {
    items
        .iter()
        .filter(|(item, _)| item.date == date)
        .map(|(_, amount)| amount)
        .sum()
}

/// Daily-equivalent expense of all active budgets (weekly /7, monthly /30, yearly /365)
pub fn daily_budget_share(budgets: &[BudgetLimit], converter: &dyn CurrencyConverter) -> f64 {
    budgets
        .iter()
        .filter(|b| b.is_active)
        .map(|b| converter.to_base(b.amount, &b.currency) / b.period.days())
        .sum()
}
