//! # Till Configuration
//!
//! Built once in `main`: defaults, then `TALLY_*` environment variables,
//! then command-line flags. Nothing changes it afterwards.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

use tally_checkout::config::{DEFAULT_CHECKOUT_TIMEOUT, DEFAULT_COMMIT_TIMEOUT, DEFAULT_MAX_ATTEMPTS};
use tally_checkout::CheckoutConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// `None` puts the database in the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Receipt header.
    pub store_name: String,

    pub currency_symbol: String,

    /// Minor-unit digits: 2 for paise and cents, 0 for yen.
    pub currency_decimals: u8,

    /// Per attempt, not per checkout.
    #[serde(with = "duration_millis")]
    pub checkout_timeout: Duration,

    /// Wait for the database to acknowledge a commit.
    #[serde(with = "duration_millis")]
    pub commit_timeout: Duration,

    pub checkout_max_attempts: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            db_path: None,
            store_name: "Tally General Store".to_string(),
            currency_symbol: "₹".to_string(),
            currency_decimals: 2,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
            commit_timeout: DEFAULT_COMMIT_TIMEOUT,
            checkout_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// Parses `key` when set, warning about and skipping values that don't parse.
fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable setting");
            None
        }
    }
}

impl AppConfig {
    /// Reads `TALLY_DB_PATH`, `TALLY_STORE_NAME`, `TALLY_CURRENCY_SYMBOL`,
    /// `TALLY_CHECKOUT_TIMEOUT_MS`, `TALLY_COMMIT_TIMEOUT_MS` and
    /// `TALLY_CHECKOUT_MAX_ATTEMPTS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// [`AppConfig::from_env`] over any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();

        AppConfig {
            db_path: lookup("TALLY_DB_PATH").map(PathBuf::from),
            store_name: lookup("TALLY_STORE_NAME").unwrap_or(defaults.store_name),
            currency_symbol: lookup("TALLY_CURRENCY_SYMBOL").unwrap_or(defaults.currency_symbol),
            checkout_timeout: parsed(&lookup, "TALLY_CHECKOUT_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.checkout_timeout),
            commit_timeout: parsed(&lookup, "TALLY_COMMIT_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.commit_timeout),
            checkout_max_attempts: parsed(&lookup, "TALLY_CHECKOUT_MAX_ATTEMPTS")
                .unwrap_or(defaults.checkout_max_attempts),
            ..defaults
        }
    }

    /// Checkout settings for the committer.
    pub fn checkout_config(&self) -> CheckoutConfig {
        CheckoutConfig::default()
            .with_timeout(self.checkout_timeout)
            .with_commit_timeout(self.commit_timeout)
            .with_max_attempts(self.checkout_max_attempts)
    }

    /// `16000` → `₹160.00`; the sign goes before the symbol.
    ///
    /// ```rust
    /// use tally_till::AppConfig;
    ///
    /// assert_eq!(AppConfig::default().format_currency(-550), "-₹5.50");
    /// ```
    pub fn format_currency(&self, cents: i64) -> String {
        let sign = if cents < 0 { "-" } else { "" };
        let digits = usize::from(self.currency_decimals);
        let scale = 10_u64.pow(u32::from(self.currency_decimals));
        let magnitude = cents.unsigned_abs();

        let amount = match digits {
            0 => magnitude.to_string(),
            _ => format!("{}.{:0digits$}", magnitude / scale, magnitude % scale),
        };
        format!("{}{}{}", sign, self.currency_symbol, amount)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_format_currency() {
        let config = AppConfig::default();
        assert_eq!(config.format_currency(1234), "₹12.34");
        assert_eq!(config.format_currency(100), "₹1.00");
        assert_eq!(config.format_currency(1), "₹0.01");
        assert_eq!(config.format_currency(0), "₹0.00");
        assert_eq!(config.format_currency(-1234), "-₹12.34");
    }

    #[test]
    fn test_format_currency_no_decimals() {
        let config = AppConfig {
            currency_decimals: 0,
            currency_symbol: "¥".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.format_currency(500), "¥500");
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TALLY_DB_PATH", "/tmp/till.db"),
            ("TALLY_STORE_NAME", "Corner Shop"),
            ("TALLY_CURRENCY_SYMBOL", "Rs "),
            ("TALLY_CHECKOUT_TIMEOUT_MS", "2500"),
            ("TALLY_COMMIT_TIMEOUT_MS", "4000"),
            ("TALLY_CHECKOUT_MAX_ATTEMPTS", "5"),
        ]));

        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/till.db")));
        assert_eq!(config.store_name, "Corner Shop");
        assert_eq!(config.format_currency(250), "Rs 2.50");
        assert_eq!(config.checkout_timeout, Duration::from_millis(2500));
        assert_eq!(config.checkout_config().max_attempts, 5);
        assert_eq!(config.checkout_config().commit_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_bad_numbers_keep_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("TALLY_CHECKOUT_TIMEOUT_MS", "soon"),
            ("TALLY_CHECKOUT_MAX_ATTEMPTS", "-1"),
        ]));

        assert_eq!(config.checkout_timeout, DEFAULT_CHECKOUT_TIMEOUT);
        assert_eq!(config.checkout_max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(AppConfig::default()).unwrap();
        assert_eq!(json["storeName"], "Tally General Store");
        assert_eq!(json["checkoutTimeout"], 10_000);
        assert_eq!(json["commitTimeout"], 10_000);
    }
}
