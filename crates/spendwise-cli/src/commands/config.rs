//! Config command implementation

use anyhow::Result;
use spendwise_core::config::{default_config_path, Config};

/// Describe where the effective config came from
pub fn config_origin(config: &Config) -> String {
    match config.source_path {
        Some(ref path) => path.display().to_string(),
        None => match default_config_path() {
            Some(path) => format!("built-in defaults (override at {})", path.display()),
            None => "built-in defaults".to_string(),
        },
    }
}

/// Render the effective configuration
pub fn render_config(config: &Config) -> String {
    [
        "⚙️  SpendWise configuration".to_string(),
        format!("   Loaded from:  {}", config_origin(config)),
        format!(
            "   API URL:      {}",
            config.api_url.as_deref().unwrap_or("(not set)")
        ),
        format!("   Timeout:      {}s", config.timeout.as_secs()),
        format!("   Format:       {}", config.format.as_str()),
        format!("   Log level:    {}", config.log_level),
    ]
    .join("\n")
}

pub fn cmd_config(config: &Config, path_only: bool) -> Result<()> {
    if path_only {
        println!("{}", config_origin(config));
    } else {
        println!("{}", render_config(config));
    }
    Ok(())
}
