//! Configuration system: TOML file + env var overrides + named defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SlhError};

/// Full SLH configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub thresholds: ThresholdConfig,
    pub rates: RateConfig,
    pub paths: PathsConfig,
}

/// Size and staleness thresholds. All comparisons against them are strict `>`.
///
/// The unused-bucket pair and the deletion/archival triple are independent
/// rules and are never reconciled with each other.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Unused report: minimum size (exclusive) in GB.
    pub unused_size_gb: f64,
    /// Unused report: minimum staleness (exclusive) in days.
    pub unused_stale_days: i64,
    /// Deletion queue: minimum size (exclusive) in GB.
    pub deletion_size_gb: f64,
    /// Deletion queue: minimum staleness (exclusive) in days.
    pub deletion_stale_days: i64,
    /// Archival candidates: minimum size (exclusive) in GB.
    pub archival_size_gb: f64,
}

/// Per-GB monthly unit prices in USD.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateConfig {
    pub standard_usd_per_gb: f64,
    pub glacier_usd_per_gb: f64,
}

/// Filesystem paths used by slh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub config_file: PathBuf,
    pub inventory_file: PathBuf,
    pub jsonl_log: PathBuf,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            unused_size_gb: 80.0,
            unused_stale_days: 90,
            deletion_size_gb: 100.0,
            deletion_stale_days: 20,
            archival_size_gb: 50.0,
        }
    }
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            standard_usd_per_gb: 0.023,
            glacier_usd_per_gb: 0.004,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                eprintln!(
                    "[SLH-CONFIG] WARNING: HOME not set, falling back to /tmp for data paths"
                );
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        let cfg = home_dir.join(".config").join("slh").join("config.toml");
        let data = home_dir.join(".local").join("share").join("slh");
        Self {
            config_file: cfg,
            inventory_file: PathBuf::from("buckets.json"),
            jsonl_log: data.join("activity.jsonl"),
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        PathsConfig::default().config_file
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| SlhError::Io {
                path: path_buf.clone(),
                source,
            })?;
            let parsed: Self = toml::from_str(&raw)?;
            parsed
        } else if is_explicit_path {
            return Err(SlhError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.paths.config_file = path_buf;
        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        // thresholds
        override_f64(
            &mut lookup,
            "SLH_THRESHOLDS_UNUSED_SIZE_GB",
            &mut self.thresholds.unused_size_gb,
        )?;
        override_i64(
            &mut lookup,
            "SLH_THRESHOLDS_UNUSED_STALE_DAYS",
            &mut self.thresholds.unused_stale_days,
        )?;
        override_f64(
            &mut lookup,
            "SLH_THRESHOLDS_DELETION_SIZE_GB",
            &mut self.thresholds.deletion_size_gb,
        )?;
        override_i64(
            &mut lookup,
            "SLH_THRESHOLDS_DELETION_STALE_DAYS",
            &mut self.thresholds.deletion_stale_days,
        )?;
        override_f64(
            &mut lookup,
            "SLH_THRESHOLDS_ARCHIVAL_SIZE_GB",
            &mut self.thresholds.archival_size_gb,
        )?;

        // rates
        override_f64(
            &mut lookup,
            "SLH_RATES_STANDARD_USD_PER_GB",
            &mut self.rates.standard_usd_per_gb,
        )?;
        override_f64(
            &mut lookup,
            "SLH_RATES_GLACIER_USD_PER_GB",
            &mut self.rates.glacier_usd_per_gb,
        )?;

        // paths
        if let Some(raw) = lookup("SLH_PATHS_INVENTORY_FILE") {
            self.paths.inventory_file = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("SLH_PATHS_JSONL_LOG") {
            self.paths.jsonl_log = PathBuf::from(raw);
        }

        Ok(())
    }

    /// Check ranges. Rates are deliberately not compared against each other:
    /// a glacier rate above the standard rate yields negative savings, which is
    /// reported rather than rejected.
    pub fn validate(&self) -> Result<()> {
        for (name, val) in [
            ("thresholds.unused_size_gb", self.thresholds.unused_size_gb),
            (
                "thresholds.deletion_size_gb",
                self.thresholds.deletion_size_gb,
            ),
            (
                "thresholds.archival_size_gb",
                self.thresholds.archival_size_gb,
            ),
            ("rates.standard_usd_per_gb", self.rates.standard_usd_per_gb),
            ("rates.glacier_usd_per_gb", self.rates.glacier_usd_per_gb),
        ] {
            validate_non_negative(name, val)?;
        }

        for (name, val) in [
            (
                "thresholds.unused_stale_days",
                self.thresholds.unused_stale_days,
            ),
            (
                "thresholds.deletion_stale_days",
                self.thresholds.deletion_stale_days,
            ),
        ] {
            if val < 0 {
                return Err(SlhError::InvalidConfig {
                    details: format!("{name} must be >= 0, got {val}"),
                });
            }
        }

        Ok(())
    }
}

fn validate_non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SlhError::InvalidConfig {
            details: format!("{name} must be a finite number >= 0, got {value}"),
        });
    }
    Ok(())
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn override_f64<F>(lookup: &mut F, name: &str, slot: &mut f64) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *slot = raw.trim().parse::<f64>().map_err(|error| SlhError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}

fn override_i64<F>(lookup: &mut F, name: &str, slot: &mut i64) -> Result<()>
where
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *slot = raw.trim().parse::<i64>().map_err(|error| SlhError::ConfigParse {
            context: "env",
            details: format!("{name}={raw:?}: {error}"),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Config, SlhError};
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn default_config_is_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert!((cfg.thresholds.unused_size_gb - 80.0).abs() < f64::EPSILON);
        assert_eq!(cfg.thresholds.unused_stale_days, 90);
        assert!((cfg.thresholds.deletion_size_gb - 100.0).abs() < f64::EPSILON);
        assert_eq!(cfg.thresholds.deletion_stale_days, 20);
        assert!((cfg.thresholds.archival_size_gb - 50.0).abs() < f64::EPSILON);
        assert!((cfg.rates.standard_usd_per_gb - 0.023).abs() < f64::EPSILON);
        assert!((cfg.rates.glacier_usd_per_gb - 0.004).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_rate_rejected() {
        let mut cfg = Config::default();
        cfg.rates.glacier_usd_per_gb = -0.1;
        let err = cfg.validate().expect_err("expected rate validation error");
        match err {
            SlhError::InvalidConfig { details } => {
                assert!(details.contains("glacier_usd_per_gb"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn nan_threshold_rejected() {
        let mut cfg = Config::default();
        cfg.thresholds.archival_size_gb = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_stale_days_rejected() {
        let mut cfg = Config::default();
        cfg.thresholds.deletion_stale_days = -1;
        let err = cfg.validate().expect_err("expected stale days error");
        assert!(err.to_string().contains("deletion_stale_days"));
    }

    #[test]
    fn inverted_rates_are_accepted() {
        let mut cfg = Config::default();
        cfg.rates.standard_usd_per_gb = 0.001;
        cfg.rates.glacier_usd_per_gb = 0.01;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_overrides_replace_defaults() {
        let mut cfg = Config::default();
        let overrides = vars(&[
            ("SLH_THRESHOLDS_DELETION_STALE_DAYS", "45"),
            ("SLH_RATES_STANDARD_USD_PER_GB", "0.025"),
            ("SLH_PATHS_INVENTORY_FILE", "/srv/inventory/buckets.json"),
        ]);

        cfg.apply_env_overrides_from(|name| overrides.get(name).cloned())
            .expect("env overrides should parse");

        assert_eq!(cfg.thresholds.deletion_stale_days, 45);
        assert!((cfg.rates.standard_usd_per_gb - 0.025).abs() < f64::EPSILON);
        assert_eq!(
            cfg.paths.inventory_file,
            PathBuf::from("/srv/inventory/buckets.json")
        );
        // untouched values keep their defaults
        assert_eq!(cfg.thresholds.unused_stale_days, 90);
    }

    #[test]
    fn env_invalid_number_rejected() {
        let mut cfg = Config::default();
        let overrides = vars(&[("SLH_THRESHOLDS_UNUSED_SIZE_GB", "eighty")]);

        let err = cfg
            .apply_env_overrides_from(|name| overrides.get(name).cloned())
            .expect_err("invalid number should fail");
        match err {
            SlhError::ConfigParse { context, details } => {
                assert_eq!(context, "env");
                assert!(details.contains("SLH_THRESHOLDS_UNUSED_SIZE_GB"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn partial_toml_keeps_defaults_for_other_fields() {
        let cfg: Config = toml::from_str("[rates]\nglacier_usd_per_gb = 0.00099\n")
            .expect("partial config should parse");
        assert!((cfg.rates.glacier_usd_per_gb - 0.00099).abs() < f64::EPSILON);
        assert!((cfg.rates.standard_usd_per_gb - 0.023).abs() < f64::EPSILON);
        assert_eq!(cfg.thresholds.deletion_stale_days, 20);
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[thresholds]\narchival_size_gb = 10.0\n").expect("write config");

        let cfg = Config::load(Some(&path)).expect("config should load");
        assert!((cfg.thresholds.archival_size_gb - 10.0).abs() < f64::EPSILON);
        assert_eq!(cfg.paths.config_file, path);
    }

    #[test]
    fn load_rejects_invalid_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[thresholds\n").expect("write config");

        let err = Config::load(Some(&path)).expect_err("bad toml should fail");
        assert_eq!(err.code(), "SLH-1003");
    }

    #[test]
    fn load_returns_error_for_explicit_missing_path() {
        let result = Config::load(Some(Path::new("/nonexistent/slh/config.toml")));
        assert!(matches!(result, Err(SlhError::MissingConfig { .. })));
    }

    #[test]
    fn stable_hash_changes_when_config_changes() {
        let cfg = Config::default();
        let hash_before = cfg.stable_hash().expect("hash should compute");
        let mut modified = Config::default();
        modified.thresholds.unused_stale_days += 1;
        let hash_after = modified.stable_hash().expect("hash should compute");
        assert_ne!(hash_before, hash_after);
        assert_eq!(hash_before, cfg.stable_hash().expect("hash"));
    }
}
