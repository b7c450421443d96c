//! JSON parsing helpers for AI forecast responses
//!
//! Models often wrap the payload in prose or code fences, leave trailing
//! commas, or quote numbers. Parsing escalates through three attempts:
//! the raw text, a normalized copy, then the first array found by regex.

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Longest slice of raw model output carried in error messages and logs
pub const RAW_PREVIEW_CHARS: usize = 200;

/// One day of model output before alignment to the forecast calendar
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    /// `None` when the model omitted or garbled the date
    pub date: Option<NaiveDate>,
    pub income: f64,
    pub expense: f64,
    pub capital: Option<f64>,
}

/// Truncate raw model text for error messages
pub fn preview(raw: &str) -> String {
    let raw = raw.trim();
    match raw.char_indices().nth(RAW_PREVIEW_CHARS) {
        Some((idx, _)) => format!("{}...", &raw[..idx]),
        None => raw.to_string(),
    }
}

/// One forecast row as models tend to write it
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default, alias = "day")]
    date: Option<Value>,
    #[serde(
        default,
        rename = "predictedIncome",
        alias = "predicted_income",
        alias = "income"
    )]
    income: Option<Amount>,
    #[serde(
        default,
        rename = "predictedExpense",
        alias = "predicted_expense",
        alias = "expense",
        alias = "expenses"
    )]
    expense: Option<Amount>,
    #[serde(
        default,
        rename = "predictedCapital",
        alias = "predicted_capital",
        alias = "capital"
    )]
    capital: Option<Amount>,
}

/// A number or a numeric string such as "1,250.50" or "$40"
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    fn value(&self) -> Option<f64> {
        match self {
            Amount::Number(n) => Some(*n),
            Amount::Text(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| !matches!(c, ',' | '$' | ' '))
                    .collect();
                cleaned.parse::<f64>().ok()
            }
        }
    }
}

impl RawRow {
    /// `None` when the row carries neither an income nor an expense figure
    fn into_row(self) -> Option<ForecastRow> {
        let income = self.income.as_ref().and_then(Amount::value);
        let expense = self.expense.as_ref().and_then(Amount::value);
        if income.is_none() && expense.is_none() {
            return None;
        }

        Some(ForecastRow {
            date: self.date.as_ref().and_then(Value::as_str).and_then(parse_date),
            income: income.unwrap_or(0.0),
            expense: expense.unwrap_or(0.0),
            capital: self.capital.as_ref().and_then(Amount::value),
        })
    }
}

/// Parse a forecast array from model output
///
/// Fails unless at least one row carries a numeric income or expense.
pub fn parse_forecast_rows(response: &str) -> Result<Vec<ForecastRow>> {
    let trimmed = response.trim();

    if let Ok(raw) = serde_json::from_str::<Vec<RawRow>>(trimmed) {
        return collect_rows(raw, response);
    }
    debug!("Direct parse failed, normalizing forecast response");

    let normalized = normalize(trimmed)?;
    if let Ok(raw) = serde_json::from_str::<Vec<RawRow>>(&normalized) {
        return collect_rows(raw, response);
    }
    debug!("Normalized parse failed, extracting first array");

    let extract = Regex::new(r"(?s)\[\s*(?:\{.*?\}\s*,?\s*)+\]")?;
    if let Some(found) = extract.find(&normalized) {
        let candidate = normalize(found.as_str())?;
        return match serde_json::from_str::<Vec<RawRow>>(&candidate) {
            Ok(raw) => collect_rows(raw, response),
            Err(e) => Err(Error::AiResponse(format!(
                "Invalid forecast JSON: {} | Raw: {}",
                e,
                preview(response)
            ))),
        };
    }

    Err(Error::AiResponse(format!(
        "No forecast array found | Raw: {}",
        preview(response)
    )))
}

fn collect_rows(raw: Vec<RawRow>, response: &str) -> Result<Vec<ForecastRow>> {
    let rows: Vec<ForecastRow> = raw.into_iter().filter_map(RawRow::into_row).collect();
    if rows.is_empty() {
        return Err(Error::AiResponse(format!(
            "Forecast array has no income or expense values | Raw: {}",
            preview(response)
        )));
    }
    Ok(rows)
}

/// Strip code fences, collapse whitespace and drop trailing commas
fn normalize(text: &str) -> Result<String> {
    let fences = Regex::new(r"```[A-Za-z]*")?;
    let trailing_commas = Regex::new(r",\s*([\]}])")?;

    let unfenced = fences.replace_all(text, "");
    let collapsed = unfenced.split_whitespace().collect::<Vec<_>>().join(" ");
    Ok(trailing_commas.replace_all(&collapsed, "$1").into_owned())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let head = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct_array() {
        let response = r#"[
            {"date": "2024-03-01", "predictedIncome": 0, "predictedExpense": 42.5, "predictedCapital": 957.5},
            {"date": "2024-03-02", "predictedIncome": 100, "predictedExpense": 10}
        ]"#;
        let rows = parse_forecast_rows(response).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(rows[0].expense, 42.5);
        assert_eq!(rows[0].capital, Some(957.5));
        assert_eq!(rows[1].income, 100.0);
        assert_eq!(rows[1].capital, None);
    }

    #[test]
    fn test_parse_trailing_commas_and_fences() {
        let response = "```json\n[\n  {\"date\": \"2024-03-01\", \"predictedIncome\": 5, \"predictedExpense\": 1,},\n]\n```";
        let rows = parse_forecast_rows(response).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].income, 5.0);
    }

    #[test]
    fn test_parse_array_embedded_in_prose() {
        let response = r#"Sure! Here is the forecast you asked for:
[{"date": "2024-03-01", "predictedIncome": "1,200.00", "predictedExpense": "$30"}]
Let me know if you need anything else."#;
        let rows = parse_forecast_rows(response).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].income, 1200.0);
        assert_eq!(rows[0].expense, 30.0);
    }

    #[test]
    fn test_parse_rejects_empty_array() {
        let err = parse_forecast_rows("[]").unwrap_err();
        assert!(matches!(err, Error::AiResponse(_)));
    }

    #[test]
    fn test_parse_rejects_array_of_strings() {
        let err = parse_forecast_rows(r#"["I cannot forecast this"]"#).unwrap_err();
        assert!(matches!(err, Error::AiResponse(_)));
    }

    #[test]
    fn test_parse_rejects_objects_without_amounts() {
        let err = parse_forecast_rows(r#"[{"note": "insufficient data"}]"#).unwrap_err();
        assert!(err.to_string().contains("no income or expense"));

        let err = parse_forecast_rows(r#"[{"date": "2024-03-01", "predictedIncome": "n/a"}]"#)
            .unwrap_err();
        assert!(matches!(err, Error::AiResponse(_)));
    }

    #[test]
    fn test_parse_ignores_empty_brackets_in_prose() {
        let err = parse_forecast_rows("Not enough history [] to forecast, sorry.").unwrap_err();
        assert!(err.to_string().contains("No forecast array found"));
    }

    #[test]
    fn test_parse_drops_rows_without_amounts() {
        let response = r#"[
            {"note": "weekend"},
            {"date": "2024-03-02", "expense": 12}
        ]"#;
        let rows = parse_forecast_rows(response).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].income, 0.0);
        assert_eq!(rows[0].expense, 12.0);
    }

    #[test]
    fn test_parse_snake_case_and_bad_date() {
        let response = r#"[{"date": "soon", "predicted_income": 3, "predicted_expense": 4}]"#;
        let rows = parse_forecast_rows(response).unwrap();
        assert_eq!(rows[0].date, None);
        assert_eq!(rows[0].income, 3.0);
        assert_eq!(rows[0].expense, 4.0);
    }

    #[test]
    fn test_parse_failure_carries_preview() {
        let response = "I cannot help with that. ".repeat(20);
        let err = parse_forecast_rows(&response).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("No forecast array found"));
        assert!(message.contains("..."));
        assert!(message.len() < response.len());
    }

    #[test]
    fn test_preview_is_char_safe() {
        let raw = "€".repeat(300);
        let shown = preview(&raw);
        assert_eq!(shown.chars().count(), RAW_PREVIEW_CHARS + 3);
    }
}
