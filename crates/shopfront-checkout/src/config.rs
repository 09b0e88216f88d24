//! # Checkout Configuration
//!
//! Configuration management for the checkout layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPFRONT_TAX_KIND=tax-invoice                                     │
//! │     SHOPFRONT_SCAN_GAP_MS=80                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shopfront/shopfront.toml (Linux)                         │
//! │     ~/Library/Application Support/com.shopfront.pos/shopfront.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     5% retail, 18% tax invoice, 50ms scan gap                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # shopfront.toml
//! [store]
//! name = "Asha General Store"
//! currency_symbol = "₹"
//!
//! [tax]
//! retail_rate = 0.05
//! tax_invoice_rate = 0.18
//! default_kind = "retail"   # retail | tax_invoice
//!
//! [scanner]
//! max_key_gap_ms = 50
//! min_barcode_len = 4
//! enabled = true
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shopfront_core::validation::validate_tax_rate;
use shopfront_core::{InvoiceKind, ScannerConfig, TaxRate};
use shopfront_core::{DEFAULT_MAX_KEY_GAP_MS, DEFAULT_MIN_BARCODE_LEN};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CheckoutError, CheckoutResult};

const CONFIG_FILE_NAME: &str = "shopfront.toml";

// =============================================================================
// Store Settings
// =============================================================================

/// Store identity printed on every invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Store name in the document header.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Symbol shown next to amounts by the rendering sink.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Shopfront".to_string()
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Tax Settings
// =============================================================================

/// Flat tax rates per invoice kind.
///
/// Rates are fractions (0.18 = 18%). They are fixed for the lifetime of a
/// draft; the operator never edits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSettings {
    #[serde(default = "default_retail_rate")]
    pub retail_rate: Decimal,

    #[serde(default = "default_tax_invoice_rate")]
    pub tax_invoice_rate: Decimal,

    /// Kind used for new drafts.
    #[serde(default)]
    pub default_kind: InvoiceKind,
}

fn default_retail_rate() -> Decimal {
    InvoiceKind::Retail.default_tax_rate().fraction()
}

fn default_tax_invoice_rate() -> Decimal {
    InvoiceKind::TaxInvoice.default_tax_rate().fraction()
}

impl Default for TaxSettings {
    fn default() -> Self {
        TaxSettings {
            retail_rate: default_retail_rate(),
            tax_invoice_rate: default_tax_invoice_rate(),
            default_kind: InvoiceKind::default(),
        }
    }
}

impl TaxSettings {
    /// Returns the configured rate for an invoice kind.
    pub fn rate_for(&self, kind: InvoiceKind) -> TaxRate {
        match kind {
            InvoiceKind::Retail => TaxRate::from_fraction(self.retail_rate),
            InvoiceKind::TaxInvoice => TaxRate::from_fraction(self.tax_invoice_rate),
        }
    }
}

// =============================================================================
// Scanner Settings
// =============================================================================

/// Keystroke timing used to tell a scanner from a human.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerSettings {
    /// Maximum gap between two keystrokes of one scan burst.
    #[serde(default = "default_max_key_gap_ms")]
    pub max_key_gap_ms: u64,

    /// Shortest buffer accepted as a barcode.
    #[serde(default = "default_min_barcode_len")]
    pub min_barcode_len: usize,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_max_key_gap_ms() -> u64 {
    DEFAULT_MAX_KEY_GAP_MS
}

fn default_min_barcode_len() -> usize {
    DEFAULT_MIN_BARCODE_LEN
}

fn default_true() -> bool {
    true
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            max_key_gap_ms: default_max_key_gap_ms(),
            min_barcode_len: default_min_barcode_len(),
            enabled: true,
        }
    }
}

impl ScannerSettings {
    /// Converts to the filter configuration used by the core.
    pub fn to_scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            max_key_gap: Duration::from_millis(self.max_key_gap_ms),
            min_barcode_len: self.min_barcode_len,
            enabled: self.enabled,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete checkout configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub tax: TaxSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,
}

impl CheckoutConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Loading Order
    /// 1. Start with defaults
    /// 2. Load from TOML file (explicit path, else the platform config dir)
    /// 3. Override with `SHOPFRONT_*` environment variables
    /// 4. Validate
    pub fn load(config_path: Option<PathBuf>) -> CheckoutResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading checkout config from file");
                config = Self::read_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads configuration, falling back to defaults on any error.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load checkout config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration as pretty TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> CheckoutResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CheckoutError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CheckoutError::ConfigSaveFailed(format!("{}: {}", parent.display(), e)))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| CheckoutError::ConfigSaveFailed(format!("{}: {}", path.display(), e)))?;

        info!(?path, "Checkout config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CheckoutResult<()> {
        for (name, rate) in [
            ("tax.retail_rate", self.tax.retail_rate),
            ("tax.tax_invoice_rate", self.tax.tax_invoice_rate),
        ] {
            validate_tax_rate(TaxRate::from_fraction(rate)).map_err(|_| {
                CheckoutError::InvalidConfig(format!("{} must be between 0 and 1, got {}", name, rate))
            })?;
        }

        if self.scanner.max_key_gap_ms == 0 {
            return Err(CheckoutError::InvalidConfig(
                "scanner.max_key_gap_ms must be greater than 0".into(),
            ));
        }

        if self.scanner.min_barcode_len == 0 {
            return Err(CheckoutError::InvalidConfig(
                "scanner.min_barcode_len must be at least 1".into(),
            ));
        }

        Ok(())
    }

    fn read_file(path: &Path) -> CheckoutResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CheckoutError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from a key lookup (the process environment in
    /// production).
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("SHOPFRONT_STORE_NAME") {
            debug!(store_name = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        if let Some(kind) = lookup("SHOPFRONT_TAX_KIND") {
            match kind.parse::<InvoiceKind>() {
                Ok(parsed) => {
                    debug!(kind = %parsed, "Overriding default invoice kind from environment");
                    self.tax.default_kind = parsed;
                }
                Err(_) => warn!(kind = %kind, "Unknown invoice kind in environment"),
            }
        }

        if let Some(gap) = lookup("SHOPFRONT_SCAN_GAP_MS") {
            match gap.parse::<u64>() {
                Ok(ms) => {
                    debug!(max_key_gap_ms = ms, "Overriding scan gap from environment");
                    self.scanner.max_key_gap_ms = ms;
                }
                Err(_) => warn!(value = %gap, "Ignoring non-numeric SHOPFRONT_SCAN_GAP_MS"),
            }
        }

        if let Some(enabled) = lookup("SHOPFRONT_SCANNER_ENABLED") {
            match enabled.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.scanner.enabled = true,
                "0" | "false" | "no" | "off" => self.scanner.enabled = false,
                _ => warn!(value = %enabled, "Ignoring unrecognized SHOPFRONT_SCANNER_ENABLED"),
            }
        }
    }

    /// Returns the platform-specific config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "shopfront", "pos")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the tax rate for an invoice kind.
    pub fn tax_rate_for(&self, kind: InvoiceKind) -> TaxRate {
        self.tax.rate_for(kind)
    }

    /// Returns the kind used for new drafts.
    pub fn default_kind(&self) -> InvoiceKind {
        self.tax.default_kind
    }

    /// Returns the scan filter configuration.
    pub fn scanner_config(&self) -> ScannerConfig {
        self.scanner.to_scanner_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = CheckoutConfig::default();
        assert_eq!(config.tax.retail_rate, Decimal::new(5, 2));
        assert_eq!(config.tax.tax_invoice_rate, Decimal::new(18, 2));
        assert_eq!(config.default_kind(), InvoiceKind::Retail);
        assert_eq!(config.scanner.max_key_gap_ms, 50);
        assert_eq!(config.scanner.min_barcode_len, 4);
        assert!(config.scanner.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CheckoutConfig::default();
        config.tax.tax_invoice_rate = Decimal::new(15, 1);
        assert!(matches!(config.validate(), Err(CheckoutError::InvalidConfig(_))));

        let mut config = CheckoutConfig::default();
        config.tax.retail_rate = Decimal::new(-1, 2);
        assert!(config.validate().is_err());

        let mut config = CheckoutConfig::default();
        config.scanner.max_key_gap_ms = 0;
        assert!(config.validate().is_err());

        let mut config = CheckoutConfig::default();
        config.scanner.min_barcode_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tax_rate_for_kind() {
        let config = CheckoutConfig::default();
        assert_eq!(
            config.tax_rate_for(InvoiceKind::TaxInvoice).percentage(),
            Decimal::from(18)
        );
        assert_eq!(config.tax_rate_for(InvoiceKind::Retail).percentage(), Decimal::from(5));
    }

    #[test]
    fn test_scanner_config_conversion() {
        let mut config = CheckoutConfig::default();
        config.scanner.max_key_gap_ms = 80;
        config.scanner.enabled = false;

        let scanner = config.scanner_config();
        assert_eq!(scanner.max_key_gap, Duration::from_millis(80));
        assert_eq!(scanner.min_barcode_len, 4);
        assert!(!scanner.enabled);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml_str = r#"
            [store]
            name = "Asha General Store"

            [tax]
            tax_invoice_rate = 0.12
            default_kind = "tax_invoice"
        "#;

        let config: CheckoutConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.name, "Asha General Store");
        assert_eq!(config.store.currency_symbol, "₹");
        assert_eq!(config.tax.retail_rate, Decimal::new(5, 2));
        assert_eq!(config.tax.tax_invoice_rate, Decimal::new(12, 2));
        assert_eq!(config.default_kind(), InvoiceKind::TaxInvoice);
        assert_eq!(config.scanner, ScannerSettings::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CheckoutConfig::default();
        config.store.name = "Corner Shop".to_string();
        config.scanner.min_barcode_len = 6;
        config.save(Some(path.clone())).unwrap();

        let loaded = CheckoutConfig::read_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[scanner]\nmax_key_gap_ms = \"fast\"\n").unwrap();

        let err = CheckoutConfig::read_file(&path).unwrap_err();
        assert!(matches!(err, CheckoutError::ConfigLoadFailed(_)));
    }

    #[test]
    fn test_overrides() {
        let mut config = CheckoutConfig::default();
        config.apply_overrides(lookup_from(&[
            ("SHOPFRONT_STORE_NAME", "Night Market"),
            ("SHOPFRONT_TAX_KIND", "tax-invoice"),
            ("SHOPFRONT_SCAN_GAP_MS", "75"),
            ("SHOPFRONT_SCANNER_ENABLED", "off"),
        ]));

        assert_eq!(config.store.name, "Night Market");
        assert_eq!(config.default_kind(), InvoiceKind::TaxInvoice);
        assert_eq!(config.scanner.max_key_gap_ms, 75);
        assert!(!config.scanner.enabled);
    }

    #[test]
    fn test_bad_overrides_are_ignored() {
        let mut config = CheckoutConfig::default();
        config.apply_overrides(lookup_from(&[
            ("SHOPFRONT_TAX_KIND", "wholesale"),
            ("SHOPFRONT_SCAN_GAP_MS", "soon"),
            ("SHOPFRONT_SCANNER_ENABLED", "maybe"),
        ]));

        assert_eq!(config, CheckoutConfig::default());
    }
}
