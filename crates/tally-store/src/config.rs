//! # Terminal Configuration
//!
//! Per-terminal settings loaded at startup. Read-only after
//! initialization, so no locking is needed.
//!
//! Sources, in priority order: `TALLY_*` environment variables, then the
//! defaults below.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use tally_core::TaxRate;

/// Terminal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalConfig {
    /// Identifies this terminal; keys the cart snapshot and stamps
    /// receipts.
    pub terminal_id: String,

    /// Store name, for receipts.
    pub store_name: String,

    /// Currency symbol, for display.
    pub currency_symbol: String,

    /// Flat tax rate in basis points. Zero by default: totals are
    /// untaxed unless a deployment opts in.
    pub tax_rate_bps: u32,

    /// Path to the SQLite database file.
    pub database_path: PathBuf,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            terminal_id: "term-01".to_string(),
            store_name: "Tally Dev Store".to_string(),
            currency_symbol: "$".to_string(),
            tax_rate_bps: 0,
            database_path: PathBuf::from("./data/tally.db"),
        }
    }
}

impl TerminalConfig {
    /// Builds a configuration from environment variables over defaults.
    ///
    /// - `TALLY_TERMINAL_ID`
    /// - `TALLY_STORE_NAME`
    /// - `TALLY_TAX_RATE` (percentage, e.g. "8.25")
    /// - `TALLY_DB_PATH`
    pub fn from_env() -> Self {
        let mut config = TerminalConfig::default();

        if let Ok(terminal_id) = std::env::var("TALLY_TERMINAL_ID") {
            config.terminal_id = terminal_id;
        }

        if let Ok(store_name) = std::env::var("TALLY_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Ok(rate_str) = std::env::var("TALLY_TAX_RATE") {
            if let Ok(rate) = rate_str.parse::<f64>() {
                config.tax_rate_bps = (rate * 100.0).round() as u32;
            }
        }

        if let Ok(db_path) = std::env::var("TALLY_DB_PATH") {
            config.database_path = PathBuf::from(db_path);
        }

        config
    }

    /// The configured flat tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }

    /// Formats a cent amount with the configured currency symbol.
    pub fn format_currency(&self, cents: i64) -> String {
        let sign = if cents < 0 { "-" } else { "" };
        let whole = (cents / 100).abs();
        let frac = (cents % 100).abs();
        format!("{}{}{}.{:02}", sign, self.currency_symbol, whole, frac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_untaxed() {
        let config = TerminalConfig::default();
        assert!(config.tax_rate().is_zero());
        assert_eq!(config.terminal_id, "term-01");
    }

    #[test]
    fn format_currency() {
        let config = TerminalConfig::default();
        assert_eq!(config.format_currency(1234), "$12.34");
        assert_eq!(config.format_currency(5), "$0.05");
        assert_eq!(config.format_currency(-1234), "-$12.34");
        assert_eq!(config.format_currency(0), "$0.00");
    }
}
