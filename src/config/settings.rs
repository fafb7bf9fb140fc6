//! Application settings loaded from config.toml
//!
//! Every section has built-in defaults, so an absent section (or an absent
//! default config file) still yields a usable configuration. Secrets such as the
//! bot token and the insights API key are read from the environment instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Premium tier pricing
    pub premium: PremiumConfig,
    /// Generative insights API settings
    pub insights: InsightsConfig,
    /// Payment proof storage
    pub uploads: UploadConfig,
    /// Suggested expense categories offered by autocomplete
    pub categories: Categories,
}

/// Pricing for the one-time premium upgrade.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PremiumConfig {
    /// Price recorded as `amount_paid` on every request
    pub price: f64,
    /// Currency label used in messages
    pub currency: String,
}

impl Default for PremiumConfig {
    fn default() -> Self {
        Self {
            price: 499.0,
            currency: "INR".to_string(),
        }
    }
}

/// Settings for the OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Full URL of the chat completions endpoint
    pub api_url: String,
    /// Model name sent with each request
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 15,
        }
    }
}

/// Where payment proofs are written and how they are addressed afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Root directory for stored artifacts
    pub directory: PathBuf,
    /// Base URL under which `directory` is served
    pub public_base_url: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("data/payment-proofs"),
            public_base_url: "http://localhost:8080/payment-proofs".to_string(),
        }
    }
}

/// Suggested category names. Not enforced when an expense is stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Categories(pub Vec<String>);

impl Default for Categories {
    fn default() -> Self {
        Self(
            [
                "Food",
                "Transport",
                "Shopping",
                "Entertainment",
                "Bills",
                "Health",
                "Education",
                "Other",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        )
    }
}

/// Loads application configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<()> {
    if !config.premium.price.is_finite() || config.premium.price <= 0.0 {
        return Err(Error::Config {
            message: format!("premium.price must be positive, got {}", config.premium.price),
        });
    }
    if config.categories.0.is_empty() {
        return Err(Error::Config {
            message: "categories must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Loads the application configuration.
///
/// Uses `BUDGET_BUDDY_CONFIG` when set (the file must then exist). Otherwise reads
/// `./config.toml` if present and falls back to built-in defaults if it is not.
pub fn load_app_configuration() -> Result<AppConfig> {
    if let Ok(path) = std::env::var("BUDGET_BUDDY_CONFIG") {
        tracing::info!("Loading configuration from BUDGET_BUDDY_CONFIG={}", path);
        return load_config(path);
    }

    if Path::new(DEFAULT_CONFIG_PATH).exists() {
        return load_config(DEFAULT_CONFIG_PATH);
    }

    tracing::warn!("No {} found, using built-in defaults", DEFAULT_CONFIG_PATH);
    Ok(AppConfig::default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            categories = ["Groceries", "Rent"]

            [premium]
            price = 299.0
            currency = "USD"

            [insights]
            api_url = "http://localhost:9000/v1/chat/completions"
            model = "local-model"
            timeout_secs = 5

            [uploads]
            directory = "/tmp/proofs"
            public_base_url = "https://cdn.example.com/proofs"
        "#;

        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.premium.price, 299.0);
        assert_eq!(config.premium.currency, "USD");
        assert_eq!(config.insights.model, "local-model");
        assert_eq!(config.insights.timeout_secs, 5);
        assert_eq!(config.uploads.directory, PathBuf::from("/tmp/proofs"));
        assert_eq!(config.categories.0, vec!["Groceries", "Rent"]);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = parse_config("[premium]\nprice = 100.0\n").unwrap();
        assert_eq!(config.premium.price, 100.0);
        assert_eq!(config.premium.currency, "INR");
        assert_eq!(config.insights.timeout_secs, 15);
        assert_eq!(config.categories.0.len(), 8);
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let result = parse_config("[premium]\nprice = 0.0\n");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_rejects_invalid_toml() {
        let result = parse_config("premium = [");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
