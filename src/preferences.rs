//! Display preferences stored beside the tariff settings
//!
//! Same fallback rules as the tariff records: anything missing or unusable
//! reads as the default.

use crate::error::Result;
use crate::tariff::TariffSettingsStore;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const STORAGE_KEY_REFRESH: &str = "solis_refresh_seconds";
pub const STORAGE_KEY_CURRENCY: &str = "solis_currency";
pub const STORAGE_KEY_EXPORT_PRICE: &str = "solis_export_price";

pub const DEFAULT_REFRESH_SECONDS: u32 = 300;
pub const MIN_REFRESH_SECONDS: u32 = 10;

/// Currency used when displaying rates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencySettings {
    pub symbol: String,
    pub code: String,
}

impl CurrencySettings {
    fn new(symbol: &str, code: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            code: code.to_string(),
        }
    }
}

impl Default for CurrencySettings {
    fn default() -> Self {
        Self::new("\u{20AC}", "EUR")
    }
}

/// Selectable currencies; the first one is the default
pub fn currency_options() -> Vec<CurrencySettings> {
    vec![
        CurrencySettings::default(),
        CurrencySettings::new("$", "USD"),
        CurrencySettings::new("\u{00A3}", "GBP"),
        CurrencySettings::new("R", "ZAR"),
        CurrencySettings::new("A$", "AUD"),
        CurrencySettings::new("C$", "CAD"),
        CurrencySettings::new("CHF", "CHF"),
        CurrencySettings::new("\u{00A5}", "JPY"),
        CurrencySettings::new("\u{20B9}", "INR"),
        CurrencySettings::new("R$", "BRL"),
    ]
}

/// All preferences in one value, as served over HTTP
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub refresh_seconds: u32,
    pub currency: CurrencySettings,
    pub export_price: f64,
}

/// Partial preferences update; absent fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub refresh_seconds: Option<u32>,
    pub currency: Option<CurrencySettings>,
    pub export_price: Option<f64>,
}

impl PreferencesUpdate {
    /// Storage entries this update writes, already clamped and serialized
    fn entries(&self) -> Result<Vec<(&'static str, String)>> {
        let mut entries = Vec::new();
        if let Some(seconds) = self.refresh_seconds {
            entries.push((STORAGE_KEY_REFRESH, clamp_refresh(seconds).to_string()));
        }
        if let Some(currency) = &self.currency {
            entries.push((STORAGE_KEY_CURRENCY, serde_json::to_string(currency)?));
        }
        if let Some(price) = self.export_price {
            entries.push((STORAGE_KEY_EXPORT_PRICE, clamp_export_price(price).to_string()));
        }
        Ok(entries)
    }
}

fn clamp_refresh(seconds: u32) -> u32 {
    seconds.max(MIN_REFRESH_SECONDS)
}

fn clamp_export_price(price: f64) -> f64 {
    if price.is_finite() { price.max(0.0) } else { 0.0 }
}

impl TariffSettingsStore {
    /// Dashboard refresh interval in seconds
    pub fn get_refresh_seconds(&self) -> u32 {
        self.read(STORAGE_KEY_REFRESH)
            .ok()
            .flatten()
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|secs| *secs >= MIN_REFRESH_SECONDS)
            .unwrap_or(DEFAULT_REFRESH_SECONDS)
    }

    /// Store the refresh interval, raising it to the minimum when shorter
    pub fn save_refresh_seconds(&mut self, seconds: u32) -> Result<()> {
        self.write(STORAGE_KEY_REFRESH, &clamp_refresh(seconds).to_string())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.get_refresh_seconds()))
    }

    pub fn get_currency_settings(&self) -> CurrencySettings {
        self.read_json(STORAGE_KEY_CURRENCY)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    pub fn save_currency_settings(&mut self, currency: &CurrencySettings) -> Result<()> {
        let json = serde_json::to_string(currency)?;
        self.write(STORAGE_KEY_CURRENCY, &json)
    }

    /// Price paid for exported energy, never negative
    pub fn get_export_price(&self) -> f64 {
        self.read(STORAGE_KEY_EXPORT_PRICE)
            .ok()
            .flatten()
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|price| price.is_finite() && *price >= 0.0)
            .unwrap_or(0.0)
    }

    pub fn save_export_price(&mut self, price: f64) -> Result<()> {
        self.write(STORAGE_KEY_EXPORT_PRICE, &clamp_export_price(price).to_string())
    }

    /// Apply every field present in `update`, or none of them if a write fails
    pub fn update_preferences(&mut self, update: &PreferencesUpdate) -> Result<()> {
        self.write_all(&update.entries()?)
    }

    pub fn get_preferences(&self) -> Preferences {
        Preferences {
            refresh_seconds: self.get_refresh_seconds(),
            currency: self.get_currency_settings(),
            export_price: self.get_export_price(),
        }
    }
}
