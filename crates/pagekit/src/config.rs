//! Runtime configuration.
//!
//! Defaults can be overridden from a JSON file or from `PAGEKIT_*`
//! environment variables.

use crate::error::{Error, Result};
use crate::price::{FormatPriceOptions, DEFAULT_CURRENCY, DEFAULT_LOCALE};
use crate::prop_scale::EnvMode;
use crate::viewport::ViewportSpacing;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_LOCALE: &str = "PAGEKIT_LOCALE";
pub const ENV_CURRENCY: &str = "PAGEKIT_CURRENCY";
pub const ENV_MODE: &str = "PAGEKIT_ENV";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub locale: String,
    pub currency: String,
    pub env_mode: EnvMode,
    pub viewport_spacing: ViewportSpacing,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: DEFAULT_LOCALE.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            env_mode: EnvMode::Production,
            viewport_spacing: ViewportSpacing::default(),
        }
    }
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `PAGEKIT_*` variables from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(locale) = lookup(ENV_LOCALE).filter(|v| !v.is_empty()) {
            self.locale = locale;
        }
        if let Some(currency) = lookup(ENV_CURRENCY).filter(|v| !v.is_empty()) {
            self.currency = currency;
        }
        if let Some(mode) = lookup(ENV_MODE).filter(|v| !v.is_empty()) {
            self.env_mode = EnvMode::from(mode);
        }
        self
    }

    /// Price options for `value` using the configured locale and currency.
    pub fn price_options(&self, value: f64) -> FormatPriceOptions {
        FormatPriceOptions::new(value)
            .locale(&self.locale)
            .currency(&self.currency)
    }
}
