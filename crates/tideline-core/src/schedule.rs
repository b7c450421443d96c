//! Recurring schedule evaluation
//!
//! Decides whether a recurring obligation falls on a given calendar day.
//! Monthly and yearly schedules keep the anchor's day-of-month and clamp it to
//! the last day of shorter months (an anchor on the 31st lands on Feb 28/29,
//! Apr 30, and back on Mar 31).

use chrono::{Datelike, Months, NaiveDate};

use crate::models::{Frequency, RecurringObligation};

/// Upper bound on month advances when searching a monthly schedule (10 years)
pub const MAX_MONTH_ADVANCES: u32 = 120;

/// Does the obligation occur on `target`?
///
/// Ignores `is_active`; callers filter inactive obligations.
pub fn occurs_on(obligation: &RecurringObligation, target: NaiveDate) -> bool {
    occurs_on_schedule(obligation.next_occurrence, obligation.frequency, target)
}

/// Schedule check on the raw anchor/frequency pair
pub fn occurs_on_schedule(anchor: NaiveDate, frequency: Frequency, target: NaiveDate) -> bool {
    if target < anchor {
        return false;
    }
    if target == anchor {
        return true;
    }

    match frequency {
        Frequency::Daily => true,
        Frequency::Weekly => (target - anchor).num_days() % 7 == 0,
        Frequency::Monthly => {
            for advance in 1..=MAX_MONTH_ADVANCES {
                let Some(candidate) = add_months_clamped(anchor, advance) else {
                    return false;
                };
                if candidate == target {
                    return true;
                }
                if candidate > target {
                    return false;
                }
            }
            false
        }
        Frequency::Yearly => {
            target.month() == anchor.month()
                && target.year() > anchor.year()
                && target.day() == clamp_day(anchor.day(), target.year(), target.month())
        }
    }
}

/// Advance `date` by `months` calendar months, clamping to the month's last day
///
/// Always computed from the original date, so a clamped month never shortens
/// later occurrences.
pub fn add_months_clamped(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

fn clamp_day(day: u32, year: i32, month: u32) -> u32 {
    day.min(days_in_month(year, month))
}
