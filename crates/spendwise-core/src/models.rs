//! Data models for SpendWise

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An expense as stored by the backend
///
/// The backend and the entry form are both loose about types, so every
/// field deserializes leniently: a malformed value never rejects the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRecord {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_opt_string"
    )]
    pub description: Option<String>,
    /// `YYYY-MM-DD`, no time or timezone
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: String,
}

impl ExpenseRecord {
    pub fn new(category: &str, amount: impl Into<Amount>, date: &str) -> Self {
        Self {
            category: category.to_string(),
            amount: Some(amount.into()),
            date: date.to_string(),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }
}

/// Raw amount as it arrives on the wire
///
/// Stored records carry numbers, but records created from the form carry
/// whatever text was typed. Anything else is kept so it can be reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
    Other(Value),
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Total spent in one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
}

/// Total spent in one week bucket (see [`crate::aggregate::week_key`])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyTotal {
    pub week: String,
    pub value: f64,
}

/// Total spent in one `YYYY-MM` bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    pub month: String,
    pub value: f64,
}

/// Counters for input that was accepted but degraded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub record_count: usize,
    /// Records whose amount was missing or unparseable and counted as 0
    pub invalid_amounts: usize,
    /// Records grouped under the invalid-date bucket
    pub invalid_dates: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl DataQuality {
    pub fn is_clean(&self) -> bool {
        self.invalid_amounts == 0 && self.invalid_dates == 0
    }
}

/// Derived spending analytics for a set of expenses
///
/// A disposable snapshot: recomputed from scratch on every call and holding
/// no reference back to the records it came from. Totals are listed in the
/// order their key first appeared in the input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total_amount: f64,
    pub category_totals: Vec<CategoryTotal>,
    pub weekly_totals: Vec<WeeklyTotal>,
    pub monthly_totals: Vec<MonthlyTotal>,
    pub recommendations: Vec<String>,
    pub data_quality: DataQuality,
}

impl SpendingSummary {
    pub fn category_total(&self, name: &str) -> Option<f64> {
        self.category_totals
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value)
    }

    pub fn weekly_total(&self, week: &str) -> Option<f64> {
        self.weekly_totals
            .iter()
            .find(|t| t.week == week)
            .map(|t| t.value)
    }

    pub fn monthly_total(&self, month: &str) -> Option<f64> {
        self.monthly_totals
            .iter()
            .find(|t| t.month == month)
            .map(|t| t.value)
    }

    pub fn is_empty(&self) -> bool {
        self.data_quality.record_count == 0
    }
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}
