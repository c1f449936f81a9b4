//! Service configuration file support.
//!
//! This module provides utilities for reading repository and attendance
//! configuration from TOML configuration files.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::factory::RepositoryType;
use super::repository::RepositoryError;
use crate::models::ReferenceClock;
use crate::services::outlier::OutlierConfig;

/// Service configuration from file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub repository: RepositorySettings,
    #[serde(default)]
    pub attendance: AttendanceSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

/// Attendance engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceSettings {
    /// IANA name of the deployment's reference time zone
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Pairwise-consensus radius in meters
    #[serde(default = "default_proximity_radius_m")]
    pub proximity_radius_m: f64,
    /// Minimum fraction of nearby peers for a sample to pass consensus
    #[serde(default = "default_proximity_quorum")]
    pub proximity_quorum: f64,
    /// Standard-deviation multiplier for the centroid/deviation threshold
    #[serde(default = "default_deviation_multiplier")]
    pub deviation_multiplier: f64,
    /// Whether the server runs the periodic absence sweep
    #[serde(default)]
    pub nightly_backfill: bool,
}

fn default_timezone() -> String {
    crate::models::DEFAULT_TIMEZONE.to_string()
}

fn default_proximity_radius_m() -> f64 {
    50.0
}

fn default_proximity_quorum() -> f64 {
    0.5
}

fn default_deviation_multiplier() -> f64 {
    2.0
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            proximity_radius_m: default_proximity_radius_m(),
            proximity_quorum: default_proximity_quorum(),
            deviation_multiplier: default_deviation_multiplier(),
            nightly_backfill: false,
        }
    }
}

impl ServiceConfig {
    /// Load service configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(ServiceConfig)` if successful
    /// * `Err(RepositoryError)` if file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: ServiceConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load service configuration from the default location.
    ///
    /// Searches for `attendance.toml` in:
    /// 1. Current directory
    /// 2. `config/` directory
    /// 3. Parent directory
    ///
    /// # Returns
    /// * `Ok(ServiceConfig)` if found and parsed successfully
    /// * `Err(RepositoryError)` if no config file found or parse error
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = vec![
            PathBuf::from("attendance.toml"),
            PathBuf::from("config/attendance.toml"),
            PathBuf::from("../attendance.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(RepositoryError::configuration(
            "No attendance.toml found in standard locations",
        ))
    }

    /// Built-in defaults: local repository, default zone and thresholds.
    pub fn default_local() -> Self {
        Self {
            repository: RepositorySettings {
                repo_type: "local".to_string(),
            },
            attendance: AttendanceSettings::default(),
        }
    }

    /// Get the repository type from configuration.
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        RepositoryType::from_str(&self.repository.repo_type)
    }

    /// Reference clock for the configured time zone.
    pub fn clock(&self) -> Result<ReferenceClock, RepositoryError> {
        ReferenceClock::from_name(&self.attendance.timezone)
            .map_err(|e| RepositoryError::configuration(e.to_string()))
    }

    /// Outlier detection tuning derived from the attendance settings.
    pub fn outlier_config(&self) -> OutlierConfig {
        OutlierConfig {
            proximity_radius_m: self.attendance.proximity_radius_m,
            proximity_quorum: self.attendance.proximity_quorum,
            deviation_multiplier: self.attendance.deviation_multiplier,
        }
    }
}
