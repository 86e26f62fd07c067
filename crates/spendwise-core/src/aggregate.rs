//! Expense aggregation engine
//!
//! Turns a flat list of expenses into category, weekly and monthly totals
//! plus overspending recommendations. Everything here is pure: each call
//! recomputes the whole summary from its input and never fails. Malformed
//! amounts count as 0 and malformed dates land in [`INVALID_DATE_BUCKET`].
//!
//! ## Week numbering
//!
//! Week keys are NOT ISO-8601. Weeks start on Sunday, week 1 is the
//! (possibly partial) week containing January 1, and nothing carries over
//! between years:
//!
//! ```text
//! week = ceil((days_since_jan1 + weekday(jan1) + 1) / 7)    Sunday = 0
//! ```
//!
//! So December 31 can report week 53 (or 54 in a leap year starting on a
//! Saturday) where ISO would report week 1 of the next year. Keys must stay
//! compatible with existing reports; do not switch to ISO weeks.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::models::{
    Amount, CategoryTotal, DataQuality, ExpenseRecord, MonthlyTotal, SpendingSummary, WeeklyTotal,
};

/// Bucket for records whose date is not a valid `YYYY-MM-DD` calendar date
pub const INVALID_DATE_BUCKET: &str = "invalid-date";

/// A category is flagged once its total is strictly above this share of all
/// spending
pub const RECOMMENDATION_SHARE: f64 = 0.3;

/// Parse an amount the way the entry form does
///
/// Numbers are used as-is. Text uses its longest leading decimal literal
/// after leading whitespace, so `"12.5 eur"` reads as 12.5. Returns `None`
/// when nothing usable is there (missing, `"abc"`, non-finite).
pub fn parse_amount(amount: Option<&Amount>) -> Option<f64> {
    let value = match amount? {
        Amount::Number(n) => *n,
        Amount::Text(s) => {
            let s = s.trim_start();
            let end = decimal_prefix_len(s);
            if end == 0 {
                return None;
            }
            s[..end].parse::<f64>().ok()?
        }
        Amount::Other(_) => return None,
    };
    value.is_finite().then_some(value)
}

/// Length in bytes of the leading `[+-]digits[.digits][e[+-]digits]` literal
fn decimal_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if digits > 0 || j > frac_start {
            digits += j - frac_start;
            i = j;
        }
    }

    if digits == 0 {
        return 0;
    }

    // Exponent only counts when followed by at least one digit
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }

    i
}

/// Sum of all parsed amounts, unrounded
pub fn total_amount(records: &[ExpenseRecord]) -> f64 {
    records
        .iter()
        .map(|r| parse_amount(r.amount.as_ref()).unwrap_or(0.0))
        .sum()
}

/// Parse an expense date (`YYYY-MM-DD`)
///
/// Only the zero-padded, ten-character form is accepted. chrono on its own
/// also takes unpadded fields, a leading sign, and leading whitespace.
pub fn parse_date(date: &str) -> Option<NaiveDate> {
    let bytes = date.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Sunday-start week number within the date's own year (see module docs)
pub fn week_number(date: NaiveDate) -> u32 {
    let offset = date.ordinal0();
    let jan1_weekday = (date.weekday().num_days_from_sunday() + 7 - offset % 7) % 7;
    (offset + jan1_weekday) / 7 + 1
}

/// Week bucket for a date string, e.g. `"W1-2024"`
///
/// Returns [`INVALID_DATE_BUCKET`] when the string is not a valid date.
pub fn week_key(date: &str) -> String {
    match parse_date(date) {
        Some(d) => format!("W{}-{}", week_number(d), d.year()),
        None => INVALID_DATE_BUCKET.to_string(),
    }
}

/// Month bucket for a date string: its first 7 characters (`YYYY-MM`)
///
/// Best-effort only. The string is not validated and a short one yields
/// whatever prefix it has.
pub fn month_key(date: &str) -> String {
    date.chars().take(7).collect()
}

/// Keep only the records owned by `user_id`, preserving order
pub fn filter_by_user(records: &[ExpenseRecord], user_id: &str) -> Vec<ExpenseRecord> {
    records
        .iter()
        .filter(|r| r.user_id == user_id)
        .cloned()
        .collect()
}

/// Sums keyed by name, remembering first-appearance order
#[derive(Default)]
struct Buckets {
    order: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl Buckets {
    fn add(&mut self, key: &str, amount: f64) {
        match self.index.get(key) {
            Some(&i) => self.order[i].1 += amount,
            None => {
                self.index.insert(key.to_string(), self.order.len());
                self.order.push((key.to_string(), amount));
            }
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn iter(&self) -> impl Iterator<Item = &(String, f64)> {
        self.order.iter()
    }

    fn into_vec<T>(self, f: impl Fn(String, f64) -> T) -> Vec<T> {
        self.order.into_iter().map(|(k, v)| f(k, v)).collect()
    }
}

/// Compute the full spending summary for a set of expenses
pub fn aggregate(records: &[ExpenseRecord]) -> SpendingSummary {
    let total = total_amount(records);

    let mut categories = Buckets::default();
    let mut weeks = Buckets::default();
    let mut months = Buckets::default();
    let mut invalid_amounts = 0;
    let mut invalid_dates = 0;

    for record in records {
        let amount = match parse_amount(record.amount.as_ref()) {
            Some(amount) => amount,
            None => {
                invalid_amounts += 1;
                0.0
            }
        };

        categories.add(&record.category, amount);

        match parse_date(&record.date) {
            Some(date) => {
                weeks.add(&format!("W{}-{}", week_number(date), date.year()), amount);
                months.add(&month_key(&record.date), amount);
            }
            None => {
                invalid_dates += 1;
                weeks.add(INVALID_DATE_BUCKET, amount);
                months.add(INVALID_DATE_BUCKET, amount);
            }
        }
    }

    // With a zero total nothing is strictly above the threshold
    let threshold = total * RECOMMENDATION_SHARE;
    let recommendations: Vec<String> = categories
        .iter()
        .filter(|(_, value)| *value > threshold)
        .map(|(name, _)| format!("High spending in {}. Consider reducing it.", name))
        .collect();

    let mut warnings = Vec::new();
    if invalid_amounts > 0 {
        warn!(count = invalid_amounts, "Expenses with missing or invalid amount");
        warnings.push(format!(
            "{} record(s) had a missing or invalid amount and were counted as 0",
            invalid_amounts
        ));
    }
    if invalid_dates > 0 {
        warn!(count = invalid_dates, "Expenses with invalid date");
        warnings.push(format!(
            "{} record(s) had an invalid date and were grouped under {}",
            invalid_dates, INVALID_DATE_BUCKET
        ));
    }

    debug!(
        records = records.len(),
        categories = categories.len(),
        weeks = weeks.len(),
        months = months.len(),
        total,
        "Aggregated expenses"
    );

    SpendingSummary {
        total_amount: total,
        category_totals: categories.into_vec(|name, value| CategoryTotal { name, value }),
        weekly_totals: weeks.into_vec(|week, value| WeeklyTotal { week, value }),
        monthly_totals: months.into_vec(|month, value| MonthlyTotal { month, value }),
        recommendations,
        data_quality: DataQuality {
            record_count: records.len(),
            invalid_amounts,
            invalid_dates,
            warnings,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(category: &str, amount: f64, date: &str) -> ExpenseRecord {
        ExpenseRecord::new(category, amount, date)
    }

    // ========== Amount Parsing ==========

    #[test]
    fn test_parse_amount_numbers_and_text() {
        assert_eq!(parse_amount(Some(&Amount::Number(42.5))), Some(42.5));
        assert_eq!(parse_amount(Some(&Amount::from("19.99"))), Some(19.99));
        assert_eq!(parse_amount(Some(&Amount::from("  7"))), Some(7.0));
        assert_eq!(parse_amount(Some(&Amount::from("-3.5"))), Some(-3.5));
        assert_eq!(parse_amount(Some(&Amount::from(".5"))), Some(0.5));
        assert_eq!(parse_amount(Some(&Amount::from("5."))), Some(5.0));
        assert_eq!(parse_amount(Some(&Amount::from("1e3"))), Some(1000.0));
    }

    #[test]
    fn test_parse_amount_uses_leading_literal() {
        assert_eq!(parse_amount(Some(&Amount::from("12.5kg"))), Some(12.5));
        assert_eq!(parse_amount(Some(&Amount::from("3e"))), Some(3.0));
        assert_eq!(parse_amount(Some(&Amount::from("4e+x"))), Some(4.0));
        assert_eq!(parse_amount(Some(&Amount::from("1.2.3"))), Some(1.2));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(None), None);
        assert_eq!(parse_amount(Some(&Amount::from("abc"))), None);
        assert_eq!(parse_amount(Some(&Amount::from(""))), None);
        assert_eq!(parse_amount(Some(&Amount::from("."))), None);
        assert_eq!(parse_amount(Some(&Amount::from("-"))), None);
        assert_eq!(parse_amount(Some(&Amount::from("Infinity"))), None);
        assert_eq!(parse_amount(Some(&Amount::Other(serde_json::json!([1])))), None);
        assert_eq!(parse_amount(Some(&Amount::Number(f64::NAN))), None);
    }

    // ========== Week Keys ==========

    #[test]
    fn test_week_key_golden_values() {
        // 2024 starts on a Monday
        assert_eq!(week_key("2024-01-01"), "W1-2024");
        assert_eq!(week_key("2024-01-06"), "W1-2024");
        assert_eq!(week_key("2024-01-07"), "W2-2024");
        assert_eq!(week_key("2024-12-31"), "W53-2024");

        // 2023 starts on a Sunday
        assert_eq!(week_key("2023-01-01"), "W1-2023");
        assert_eq!(week_key("2023-01-07"), "W1-2023");
        assert_eq!(week_key("2023-01-08"), "W2-2023");
    }

    #[test]
    fn test_week_key_is_not_iso() {
        // ISO puts 2024-12-30 in week 1 of 2025; here it stays in 2024
        assert_eq!(week_key("2024-12-30"), "W53-2024");
        // ISO puts 2021-01-01 in week 53 of 2020
        assert_eq!(week_key("2021-01-01"), "W1-2021");
        // Leap year starting on a Saturday reaches week 54
        assert_eq!(week_key("2000-12-31"), "W54-2000");
    }

    #[test]
    fn test_week_key_invalid_dates() {
        assert_eq!(week_key(""), INVALID_DATE_BUCKET);
        assert_eq!(week_key("not a date"), INVALID_DATE_BUCKET);
        assert_eq!(week_key("2024-02-30"), INVALID_DATE_BUCKET);
        assert_eq!(week_key("2024-13-01"), INVALID_DATE_BUCKET);
    }

    #[test]
    fn test_parse_date_requires_padded_form() {
        assert!(parse_date("2024-01-05").is_some());
        assert!(parse_date("2024-1-5").is_none());
        assert!(parse_date(" 2024-01-05").is_none());
        assert!(parse_date("+2024-01-05").is_none());
        assert!(parse_date("2024-01-05 ").is_none());
        assert!(parse_date("2024/01/05").is_none());
        assert_eq!(week_key("2024-1-5"), INVALID_DATE_BUCKET);
    }

    // ========== Month Keys ==========

    #[test]
    fn test_month_key() {
        assert_eq!(month_key("2024-03-15"), "2024-03");
        assert_eq!(month_key("2024-03"), "2024-03");
        assert_eq!(month_key("2024"), "2024");
        assert_eq!(month_key(""), "");
        assert_eq!(month_key("garbage-date"), "garbage");
    }

    #[test]
    fn test_month_key_respects_char_boundaries() {
        assert_eq!(month_key("日付日付日付日付"), "日付日付日付日");
    }

    // ========== Aggregation ==========

    #[test]
    fn test_aggregate_empty() {
        let summary = aggregate(&[]);

        assert_eq!(summary.total_amount, 0.0);
        assert!(summary.category_totals.is_empty());
        assert!(summary.weekly_totals.is_empty());
        assert!(summary.monthly_totals.is_empty());
        assert!(summary.recommendations.is_empty());
        assert!(summary.data_quality.is_clean());
        assert!(summary.is_empty());
    }

    #[test]
    fn test_aggregate_groups_buckets() {
        let records = vec![
            expense("Food", 10.0, "2024-01-01"),
            expense("Travel", 50.0, "2024-01-08"),
            expense("Food", 15.0, "2024-02-03"),
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.total_amount, 75.0);
        assert_eq!(summary.category_total("Food"), Some(25.0));
        assert_eq!(summary.category_total("Travel"), Some(50.0));
        assert_eq!(summary.weekly_total("W1-2024"), Some(10.0));
        assert_eq!(summary.weekly_total("W2-2024"), Some(50.0));
        assert_eq!(summary.weekly_total("W5-2024"), Some(15.0));
        assert_eq!(summary.monthly_total("2024-01"), Some(60.0));
        assert_eq!(summary.monthly_total("2024-02"), Some(15.0));
    }

    #[test]
    fn test_aggregate_totals_in_first_appearance_order() {
        let records = vec![
            expense("Rent", 1.0, "2024-05-01"),
            expense("Food", 1.0, "2024-04-01"),
            expense("Rent", 1.0, "2024-03-01"),
        ];
        let summary = aggregate(&records);

        let names: Vec<_> = summary.category_totals.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food"]);
        let months: Vec<_> = summary.monthly_totals.iter().map(|t| t.month.as_str()).collect();
        assert_eq!(months, vec!["2024-05", "2024-04", "2024-03"]);
    }

    #[test]
    fn test_empty_category_is_own_bucket() {
        let records = vec![expense("", 5.0, "2024-01-01"), expense("Food", 5.0, "2024-01-01")];
        let summary = aggregate(&records);

        assert_eq!(summary.category_total(""), Some(5.0));
        assert_eq!(summary.category_totals.len(), 2);
    }

    #[test]
    fn test_recommends_every_category_above_share() {
        let records = vec![
            expense("A", 100.0, "2024-01-01"),
            expense("A", 100.0, "2024-01-02"),
            expense("B", 100.0, "2024-01-03"),
        ];
        let summary = aggregate(&records);

        assert_eq!(
            summary.recommendations,
            vec![
                "High spending in A. Consider reducing it.",
                "High spending in B. Consider reducing it.",
            ]
        );
    }

    #[test]
    fn test_exact_thirty_percent_not_recommended() {
        let records = vec![expense("A", 30.0, "2024-01-01"), expense("B", 70.0, "2024-01-01")];
        let summary = aggregate(&records);

        assert_eq!(
            summary.recommendations,
            vec!["High spending in B. Consider reducing it."]
        );
    }

    #[test]
    fn test_zero_total_has_no_recommendations() {
        let records = vec![
            ExpenseRecord::new("A", "abc", "2024-01-01"),
            expense("B", 0.0, "2024-01-01"),
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.total_amount, 0.0);
        assert!(summary.recommendations.is_empty());
        assert_eq!(summary.category_total("A"), Some(0.0));
    }

    #[test]
    fn test_malformed_amount_counts_as_zero() {
        let records = vec![
            ExpenseRecord::new("Food", "abc", "2024-03-15"),
            expense("Food", 20.0, "2024-03-15"),
            ExpenseRecord {
                category: "Food".to_string(),
                date: "2024-03-15".to_string(),
                ..Default::default()
            },
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.total_amount, 20.0);
        assert_eq!(summary.category_total("Food"), Some(20.0));
        assert_eq!(summary.monthly_total("2024-03"), Some(20.0));
        assert_eq!(summary.data_quality.invalid_amounts, 2);
        assert_eq!(summary.data_quality.warnings.len(), 1);
        assert!(summary.data_quality.warnings[0].starts_with("2 record(s)"));
    }

    #[test]
    fn test_invalid_date_bucket() {
        let records = vec![
            expense("Food", 10.0, "yesterday"),
            expense("Food", 5.0, ""),
            expense("Food", 1.0, "2024-01-01"),
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.weekly_total(INVALID_DATE_BUCKET), Some(15.0));
        assert_eq!(summary.monthly_total(INVALID_DATE_BUCKET), Some(15.0));
        assert_eq!(summary.weekly_total("W1-2024"), Some(1.0));
        assert_eq!(summary.data_quality.invalid_dates, 2);
        assert!(summary
            .weekly_totals
            .iter()
            .all(|t| !t.week.contains("NaN")));
        assert!(summary.data_quality.warnings[0].contains(INVALID_DATE_BUCKET));
    }

    #[test]
    fn test_loosely_formatted_dates_are_invalid() {
        let records = vec![
            expense("A", 10.0, "2024-1-5"),
            expense("A", 10.0, " 2024-01-05"),
            expense("A", 10.0, "+2024-01-05"),
        ];
        let summary = aggregate(&records);

        assert_eq!(summary.data_quality.invalid_dates, 3);
        assert_eq!(summary.weekly_total(INVALID_DATE_BUCKET), Some(30.0));
        assert_eq!(summary.monthly_total(INVALID_DATE_BUCKET), Some(30.0));
        assert_eq!(summary.monthly_totals.len(), 1);
        assert_eq!(summary.weekly_totals.len(), 1);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let records = vec![
            expense("Food", 0.1, "2024-01-01"),
            expense("Food", 0.2, "2024-01-02"),
            expense("Rent", 0.3, "2024-02-01"),
        ];
        assert_eq!(aggregate(&records), aggregate(&records));
    }

    #[test]
    fn test_filter_by_user() {
        let records = vec![
            expense("Food", 1.0, "2024-01-01").with_user("alice"),
            expense("Food", 2.0, "2024-01-01").with_user("bob"),
            expense("Rent", 3.0, "2024-01-01").with_user("alice"),
        ];
        let alice = filter_by_user(&records, "alice");

        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].category, "Food");
        assert_eq!(alice[1].category, "Rent");
        assert!(filter_by_user(&records, "ALICE").is_empty());
    }
}
