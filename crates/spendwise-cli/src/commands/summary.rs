//! Summary command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use spendwise_core::{
    aggregate, Config, ExpenseSource, FileSource, HttpSource, OutputFormat, SpendingSummary,
};
use tracing::info;

use super::truncate;

/// Options for `spendwise summary`
#[derive(Debug, Default, Clone)]
pub struct SummaryArgs {
    pub file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub user: Option<String>,
    pub format: Option<String>,
}

/// Pick the expense source: --file, then --api-url, then the configured URL
pub fn resolve_source(config: &Config, args: &SummaryArgs) -> Result<Box<dyn ExpenseSource>> {
    if let Some(ref path) = args.file {
        let mut source = FileSource::new(path);
        if let Some(ref user) = args.user {
            source = source.for_user(user);
        }
        return Ok(Box::new(source));
    }

    let http = match args.api_url.as_deref() {
        Some(url) => HttpSource::new(url, config.timeout)?,
        None => match HttpSource::from_config(config) {
            Some(source) => source?,
            None => anyhow::bail!(
                "No expense source: pass --file or --api-url, or set api_url in the config or SPENDWISE_API_URL"
            ),
        },
    };

    Ok(match args.user {
        Some(ref user) => Box::new(http.for_user(user)),
        None => Box::new(http),
    })
}

/// Load, aggregate and render; returns the report text
pub async fn summary_report(config: &Config, args: &SummaryArgs) -> Result<String> {
    let format: OutputFormat = match args.format.as_deref() {
        Some(f) => f.parse().map_err(|e: String| anyhow::anyhow!(e))?,
        None => config.format,
    };

    let source = resolve_source(config, args)?;
    let origin = source.describe();
    let records = source
        .fetch()
        .await
        .with_context(|| format!("Failed to load expenses from {}", origin))?;
    info!(count = records.len(), source = %origin, "Loaded expenses");

    let summary = aggregate(&records);

    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&summary).context("Failed to serialize summary")
        }
        OutputFormat::Text => Ok(render_text(&summary, &origin)),
    }
}

pub async fn cmd_summary(config: &Config, args: &SummaryArgs) -> Result<()> {
    let report = summary_report(config, args).await?;
    println!("{}", report);
    Ok(())
}

fn percentage(value: f64, total: f64) -> String {
    if total > 0.0 {
        format!("{:>5.1}%", value / total * 100.0)
    } else {
        format!("{:>6}", "-")
    }
}

fn display_category(name: &str) -> String {
    if name.is_empty() {
        "(no category)".to_string()
    } else {
        truncate(name, 25)
    }
}

/// Render a summary as a plain-text report
pub fn render_text(summary: &SpendingSummary, origin: &str) -> String {
    let mut out = Vec::new();

    out.push(String::new());
    out.push("📊 Spending Summary".to_string());
    out.push(format!("   Source: {}", origin));
    out.push("   ─────────────────────────────────────────────────────────────".to_string());

    if summary.is_empty() {
        out.push("   No expenses found.".to_string());
        return out.join("\n");
    }

    out.push(format!(
        "   Total: {:.2} across {} expense(s)",
        summary.total_amount, summary.data_quality.record_count
    ));
    out.push(String::new());

    out.push(format!("   {:25} │ {:>10} │ {:>6}", "Category", "Amount", "%"));
    out.push("   ──────────────────────────┼────────────┼───────".to_string());
    for total in &summary.category_totals {
        out.push(format!(
            "   {:25} │ {:>10.2} │ {}",
            display_category(&total.name),
            total.value,
            percentage(total.value, summary.total_amount)
        ));
    }
    out.push(String::new());

    out.push(format!("   {:12} │ {:>10}", "Week", "Amount"));
    out.push("   ─────────────┼────────────".to_string());
    for total in &summary.weekly_totals {
        out.push(format!("   {:12} │ {:>10.2}", total.week, total.value));
    }
    out.push(String::new());

    out.push(format!("   {:12} │ {:>10}", "Month", "Amount"));
    out.push("   ─────────────┼────────────".to_string());
    for total in &summary.monthly_totals {
        out.push(format!("   {:12} │ {:>10.2}", total.month, total.value));
    }

    if !summary.recommendations.is_empty() {
        out.push(String::new());
        out.push("💡 Recommendations".to_string());
        for rec in &summary.recommendations {
            out.push(format!("   • {}", rec));
        }
    }

    if !summary.data_quality.warnings.is_empty() {
        out.push(String::new());
        out.push("⚠️  Data quality".to_string());
        for warning in &summary.data_quality.warnings {
            out.push(format!("   • {}", warning));
        }
    }

    out.join("\n")
}
