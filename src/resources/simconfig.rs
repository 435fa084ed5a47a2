//! Simulation configuration resource.
//!
//! Settings loaded from an INI configuration file. Defaults are safe to run
//! with, so a missing file or key is never fatal.
//!
//! # Configuration File Format
//!
//! ```ini
//! [grid]
//! size = 16
//!
//! [cache]
//! sweep_interval_ms = 1000
//!
//! [simulation]
//! tick_ms = 16
//! time_scale = 1.0
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

use crate::error::SimError;

/// Default safe values for startup
const DEFAULT_GRID_SIZE: f32 = 16.0;
const DEFAULT_CACHE_SWEEP_INTERVAL_MS: u64 = 1000;
const DEFAULT_TICK_MS: u64 = 16;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_CONFIG_PATH: &str = "./pawngrid.ini";

/// Simulation configuration resource.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Pixels per grid unit, used to convert animation definitions.
    pub grid_size: f32,
    /// How often every pawn cache is cleared, in simulated milliseconds.
    pub cache_sweep_interval_ms: u64,
    /// Fixed step used by headless runners.
    pub tick_ms: u64,
    pub time_scale: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl SimConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            cache_sweep_interval_ms: DEFAULT_CACHE_SWEEP_INTERVAL_MS,
            tick_ms: DEFAULT_TICK_MS,
            time_scale: DEFAULT_TIME_SCALE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values. Present but
    /// malformed values are an error.
    pub fn load_from_file(&mut self) -> Result<(), SimError> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| SimError::Config(format!("Failed to load config file: {}", e)))?;

        // [grid] section
        if let Some(size) = config.getfloat("grid", "size").map_err(SimError::Config)? {
            if size <= 0.0 {
                return Err(SimError::Config(format!(
                    "grid size must be positive, got {}",
                    size
                )));
            }
            self.grid_size = size as f32;
        }

        // [cache] section
        if let Some(interval) = config
            .getuint("cache", "sweep_interval_ms")
            .map_err(SimError::Config)?
        {
            if interval == 0 {
                warn!("cache sweep_interval_ms = 0, caches will be cleared every tick");
            }
            self.cache_sweep_interval_ms = interval;
        }

        // [simulation] section
        if let Some(tick) = config
            .getuint("simulation", "tick_ms")
            .map_err(SimError::Config)?
        {
            self.tick_ms = tick;
        }
        if let Some(scale) = config
            .getfloat("simulation", "time_scale")
            .map_err(SimError::Config)?
        {
            if scale < 0.0 {
                return Err(SimError::Config(format!(
                    "time_scale must not be negative, got {}",
                    scale
                )));
            }
            self.time_scale = scale as f32;
        }

        info!(
            "Loaded config: grid={}px, cache sweep every {}ms, tick={}ms, time_scale={}",
            self.grid_size, self.cache_sweep_interval_ms, self.tick_ms, self.time_scale
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), SimError> {
        let mut config = Ini::new();

        config.set("grid", "size", Some(self.grid_size.to_string()));
        config.set(
            "cache",
            "sweep_interval_ms",
            Some(self.cache_sweep_interval_ms.to_string()),
        );
        config.set("simulation", "tick_ms", Some(self.tick_ms.to_string()));
        config.set("simulation", "time_scale", Some(self.time_scale.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| SimError::Config(format!("Failed to save config file: {}", e)))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pawngrid-{}-{}.ini", name, std::process::id()))
    }

    #[test]
    fn defaults() {
        let config = SimConfig::new();
        assert_eq!(config.grid_size, 16.0);
        assert_eq!(config.cache_sweep_interval_ms, 1000);
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.time_scale, 1.0);
    }

    #[test]
    fn missing_file_is_an_error_and_keeps_defaults() {
        let mut config = SimConfig::with_path(temp_path("missing"));
        assert!(matches!(config.load_from_file(), Err(SimError::Config(_))));
        assert_eq!(config.grid_size, 16.0);
    }

    #[test]
    fn partial_file_overrides_only_present_keys() {
        let path = temp_path("partial");
        std::fs::write(&path, "[grid]\nsize = 32\n\n[simulation]\ntime_scale = 0.5\n").unwrap();
        let mut config = SimConfig::with_path(&path);
        config.load_from_file().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.grid_size, 32.0);
        assert_eq!(config.time_scale, 0.5);
        assert_eq!(config.cache_sweep_interval_ms, 1000);
        assert_eq!(config.tick_ms, 16);
    }

    #[test]
    fn malformed_value_is_rejected() {
        let path = temp_path("malformed");
        std::fs::write(&path, "[cache]\nsweep_interval_ms = soon\n").unwrap();
        let mut config = SimConfig::with_path(&path);
        let result = config.load_from_file();
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn save_then_load() {
        let path = temp_path("saved");
        let mut saved = SimConfig::with_path(&path);
        saved.grid_size = 8.0;
        saved.cache_sweep_interval_ms = 250;
        saved.save_to_file().unwrap();

        let mut loaded = SimConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, saved);
    }
}
