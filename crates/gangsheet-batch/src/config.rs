//! # Batch Configuration
//!
//! Configuration management for batch generation.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GANGSHEET_MAX_LENGTH_IN=120                                        │
//! │     GANGSHEET_DPI=300                                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/gangsheet/batch.toml (Linux)                             │
//! │     ~/Library/Application Support/com.gangsheet.gangsheet/batch.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     22.5" roll, 0.15" margin, 0.1" spacing, 60" max, 300 DPI           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # batch.toml
//! [sheet]
//! width_in = 22.5
//! margin_in = 0.15
//! spacing_in = 0.1
//! max_length_in = 60.0
//!
//! [render]
//! dpi = 300
//!
//! [fetch]
//! concurrency = 8
//! timeout_secs = 30
//!
//! [export]
//! prefix = "batches"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use gangsheet_core::raster::DEFAULT_DPI;
use gangsheet_core::validation::validate_sheet_config;
use gangsheet_core::SheetConfig;

use crate::error::{BatchError, BatchResult};

// =============================================================================
// Sheet Settings
// =============================================================================

/// Physical sheet constraints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetSettings {
    /// Roll width (inches).
    #[serde(default = "default_width")]
    pub width_in: f64,

    /// Clear border on every edge (inches).
    #[serde(default = "default_margin")]
    pub margin_in: f64,

    /// Gap between neighbouring items and rows (inches).
    #[serde(default = "default_spacing")]
    pub spacing_in: f64,

    /// Longest sheet one batch may produce (inches).
    #[serde(default = "default_max_length")]
    pub max_length_in: f64,
}

fn default_width() -> f64 {
    22.5
}

fn default_margin() -> f64 {
    0.15
}

fn default_spacing() -> f64 {
    0.1
}

fn default_max_length() -> f64 {
    60.0
}

impl Default for SheetSettings {
    fn default() -> Self {
        SheetSettings {
            width_in: default_width(),
            margin_in: default_margin(),
            spacing_in: default_spacing(),
            max_length_in: default_max_length(),
        }
    }
}

// =============================================================================
// Render Settings
// =============================================================================

/// Raster output settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Print resolution (dots per inch).
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings { dpi: default_dpi() }
    }
}

// =============================================================================
// Fetch Settings
// =============================================================================

/// Source image download behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSettings {
    /// Maximum source downloads in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-download timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_concurrency() -> usize {
    8
}

fn default_timeout() -> u64 {
    30
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            concurrency: default_concurrency(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Export Settings
// =============================================================================

/// Where rendered sheets are uploaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Object key prefix; sheets land at `<prefix>/<unix_millis>-batch.png`.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "batches".to_string()
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            prefix: default_prefix(),
        }
    }
}

// =============================================================================
// Main Batch Configuration
// =============================================================================

/// Complete batch configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub sheet: SheetSettings,

    #[serde(default)]
    pub render: RenderSettings,

    #[serde(default)]
    pub fetch: FetchSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl BatchConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (batch.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> BatchResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading batch config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load batch config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> BatchResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| BatchError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Batch config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> BatchResult<()> {
        validate_sheet_config(&self.sheet_config())
            .map_err(|e| BatchError::InvalidConfig(e.to_string()))?;

        if self.render.dpi == 0 {
            return Err(BatchError::InvalidConfig("dpi must be greater than 0".into()));
        }
        if self.fetch.concurrency == 0 {
            return Err(BatchError::InvalidConfig(
                "fetch concurrency must be greater than 0".into(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(BatchError::InvalidConfig(
                "fetch timeout must be greater than 0".into(),
            ));
        }
        if self.export.prefix.trim_matches('/').is_empty() {
            return Err(BatchError::InvalidConfig("export prefix must not be empty".into()));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from any `name → value` lookup.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_parsed(&lookup, "GANGSHEET_SHEET_WIDTH_IN", &mut self.sheet.width_in);
        override_parsed(&lookup, "GANGSHEET_MARGIN_IN", &mut self.sheet.margin_in);
        override_parsed(&lookup, "GANGSHEET_SPACING_IN", &mut self.sheet.spacing_in);
        override_parsed(&lookup, "GANGSHEET_MAX_LENGTH_IN", &mut self.sheet.max_length_in);
        override_parsed(&lookup, "GANGSHEET_DPI", &mut self.render.dpi);
        override_parsed(&lookup, "GANGSHEET_FETCH_CONCURRENCY", &mut self.fetch.concurrency);
        override_parsed(&lookup, "GANGSHEET_FETCH_TIMEOUT_SECS", &mut self.fetch.timeout_secs);

        if let Some(prefix) = lookup("GANGSHEET_EXPORT_PREFIX") {
            debug!(prefix = %prefix, "Overriding export prefix from environment");
            self.export.prefix = prefix;
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "gangsheet", "gangsheet")
            .map(|dirs| dirs.config_dir().join("batch.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Sheet constraints in the form the packer takes.
    pub fn sheet_config(&self) -> SheetConfig {
        SheetConfig {
            sheet_width_in: self.sheet.width_in,
            margin_in: self.sheet.margin_in,
            spacing_in: self.sheet.spacing_in,
            max_length_in: self.sheet.max_length_in,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    /// Object key for a sheet exported at `unix_millis`.
    pub fn export_key(&self, unix_millis: i64) -> String {
        format!("{}/{}-batch.png", self.export.prefix.trim_end_matches('/'), unix_millis)
    }
}

/// Parses `name` from the lookup into `target`; unparsable values are ignored.
fn override_parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, target: &mut T)
where
    T: std::str::FromStr + std::fmt::Debug,
{
    let Some(raw) = lookup(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => {
            debug!(var = name, ?value, "Overriding batch config from environment");
            *target = value;
        }
        Err(_) => warn!(var = name, value = %raw, "Ignoring unparsable environment override"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.sheet_config(), SheetConfig::default());
        assert_eq!(config.render.dpi, 300);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = BatchConfig::default();

        config.render.dpi = 0;
        assert!(config.validate().is_err());

        config.render.dpi = 300;
        config.sheet.margin_in = 20.0;
        assert!(matches!(config.validate(), Err(BatchError::InvalidConfig(_))));

        config.sheet.margin_in = 0.15;
        config.export.prefix = "/".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GANGSHEET_MAX_LENGTH_IN", "120"),
            ("GANGSHEET_DPI", "150"),
            ("GANGSHEET_FETCH_CONCURRENCY", "not-a-number"),
            ("GANGSHEET_EXPORT_PREFIX", "sheets/2026"),
        ]);

        let mut config = BatchConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.sheet.max_length_in, 120.0);
        assert_eq!(config.render.dpi, 150);
        assert_eq!(config.fetch.concurrency, 8);
        assert_eq!(config.export.prefix, "sheets/2026");
    }

    #[test]
    fn test_load_from_file_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(
            &path,
            "[sheet]\nmax_length_in = 100.0\n\n[render]\ndpi = 600\n",
        )
        .unwrap();

        let config = BatchConfig::load(Some(path.clone())).unwrap();
        // Sections and fields not in the file keep their defaults.
        assert_eq!(config.sheet.max_length_in, 100.0);
        assert_eq!(config.sheet.width_in, 22.5);
        assert_eq!(config.render.dpi, 600);
        assert_eq!(config.export.prefix, "batches");

        let saved = dir.path().join("nested").join("batch.toml");
        config.save(Some(saved.clone())).unwrap();
        let reloaded: BatchConfig = toml::from_str(&std::fs::read_to_string(saved).unwrap()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_bad_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(&path, "[sheet\nwidth_in = ").unwrap();

        assert!(matches!(
            BatchConfig::load(Some(path.clone())),
            Err(BatchError::ConfigLoadFailed(_))
        ));
        assert_eq!(BatchConfig::load_or_default(Some(path)), BatchConfig::default());
    }

    #[test]
    fn test_export_key() {
        let config = BatchConfig::default();
        assert_eq!(config.export_key(1_700_000_000_123), "batches/1700000000123-batch.png");
    }
}
