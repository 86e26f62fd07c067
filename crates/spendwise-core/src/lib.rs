//! SpendWise Core Library
//!
//! Shared functionality for the SpendWise expense tracker:
//! - Expense record model tolerant of malformed backend/form data
//! - Aggregation engine (category, weekly and monthly totals, recommendations)
//! - Expense sources (JSON snapshot files, read-only backend client)
//! - Layered TOML configuration

pub mod aggregate;
pub mod config;
pub mod error;
pub mod models;
pub mod source;

/// Test utilities including a mock expense backend
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{
    aggregate, filter_by_user, month_key, parse_amount, total_amount, week_key,
    INVALID_DATE_BUCKET, RECOMMENDATION_SHARE,
};
pub use config::{Config, OutputFormat};
pub use error::{Error, Result};
pub use models::{
    Amount, CategoryTotal, DataQuality, ExpenseRecord, MonthlyTotal, SpendingSummary, WeeklyTotal,
};
pub use source::{ExpenseSource, FileSource, HttpSource};
