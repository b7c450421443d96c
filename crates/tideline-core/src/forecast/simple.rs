//! Flat zero baseline forecast
//!
//! Every day predicts zero income and zero expense. Non-zero contributions come
//! only from the filter pipeline, so nothing is counted twice.

use chrono::NaiveDate;

use super::forecast_dates;
use crate::models::ForecastDayDelta;

/// Zero-valued deltas for `today + 1 ..= today + days`
pub fn generate(today: NaiveDate, days: u32) -> Vec<ForecastDayDelta> {
    forecast_dates(today, days)
        .into_iter()
        .map(ForecastDayDelta::zero)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_flat_zero() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        for days in [1, 7, 90] {
            let deltas = generate(today, days);
            assert_eq!(deltas.len(), days as usize);
            assert!(deltas
                .iter()
                .all(|d| d.predicted_income == 0.0 && d.predicted_expense == 0.0));
            assert!(deltas.iter().all(|d| d.predicted_capital.is_none()));
        }
        assert_eq!(
            generate(today, 2)[1].date,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
    }
}
