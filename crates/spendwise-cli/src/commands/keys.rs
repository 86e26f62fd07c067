//! Bucket key lookups for a single date

use anyhow::Result;
use spendwise_core::{aggregate::parse_date, month_key, week_key};
use tracing::warn;

/// Week bucket for `date`, warning when the date is not valid
pub fn lookup_week_key(date: &str) -> String {
    if parse_date(date).is_none() {
        warn!(date, "Not a valid YYYY-MM-DD date");
    }
    week_key(date)
}

/// Month bucket for `date`, warning when the date is not valid
pub fn lookup_month_key(date: &str) -> String {
    if parse_date(date).is_none() {
        warn!(date, "Not a valid YYYY-MM-DD date; month key is a best-effort prefix");
    }
    month_key(date)
}

pub fn cmd_week_key(date: &str) -> Result<()> {
    println!("{}", lookup_week_key(date));
    Ok(())
}

pub fn cmd_month_key(date: &str) -> Result<()> {
    println!("{}", lookup_month_key(date));
    Ok(())
}
