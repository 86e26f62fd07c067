//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `summary` - Load expenses and print the aggregated summary
//! - `keys` - Week/month bucket lookups for a single date
//! - `config` - Show effective configuration

pub mod config;
pub mod keys;
pub mod summary;

// Re-export command functions for main.rs
pub use config::*;
pub use keys::*;
pub use summary::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
