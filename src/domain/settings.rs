use crate::domain::error::TrackerError;
use crate::domain::models::{
    BeaconUuid, Region, DEFAULT_BEACON_UUID, MONITORING_REGION_ID, RANGING_REGION_ID,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_true(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

/// Parameters of the simulated beacon service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_bind_delay_ms")]
    pub bind_delay_ms: u64,
    #[serde(default = "default_scan_period_ms")]
    pub scan_period_ms: u64,
    #[serde(default = "default_min_distance")]
    pub min_distance_m: f64,
    #[serde(default = "default_max_distance")]
    pub max_distance_m: f64,
    #[serde(default = "default_path_period")]
    pub path_period_s: f64,
    #[serde(default = "default_range_limit")]
    pub range_limit_m: f64,
    #[serde(default = "default_major")]
    pub major: u16,
    #[serde(default = "default_minor")]
    pub minor: u16,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            bind_delay_ms: default_bind_delay_ms(),
            scan_period_ms: default_scan_period_ms(),
            min_distance_m: default_min_distance(),
            max_distance_m: default_max_distance(),
            path_period_s: default_path_period(),
            range_limit_m: default_range_limit(),
            major: default_major(),
            minor: default_minor(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "beacon_finder".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}
fn default_bind_delay_ms() -> u64 {
    500
}
fn default_scan_period_ms() -> u64 {
    1100
}
fn default_min_distance() -> f64 {
    0.2
}
fn default_max_distance() -> f64 {
    25.0
}
fn default_path_period() -> f64 {
    60.0
}
fn default_range_limit() -> f64 {
    20.0
}
fn default_major() -> u16 {
    1
}
fn default_minor() -> u16 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_beacon_uuid")]
    pub beacon_uuid: String,
    #[serde(default = "default_monitoring_region_id")]
    pub monitoring_region_id: String,
    #[serde(default = "default_ranging_region_id")]
    pub ranging_region_id: String,

    #[serde(default)]
    pub simulation: SimulationSettings,

    // Logging Settings
    #[serde(default)]
    pub log_settings: LogSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            beacon_uuid: default_beacon_uuid(),
            monitoring_region_id: default_monitoring_region_id(),
            ranging_region_id: default_ranging_region_id(),
            simulation: SimulationSettings::default(),
            log_settings: LogSettings::default(),
        }
    }
}

impl Settings {
    /// Monitoring and ranging regions for the configured beacon UUID
    pub fn regions(&self) -> Result<(Region, Region), TrackerError> {
        let uuid = BeaconUuid::parse(&self.beacon_uuid)?;
        Ok((
            Region::new(self.monitoring_region_id.clone(), uuid),
            Region::new(self.ranging_region_id.clone(), uuid),
        ))
    }
}

fn default_beacon_uuid() -> String {
    DEFAULT_BEACON_UUID.to_string()
}
fn default_monitoring_region_id() -> String {
    MONITORING_REGION_ID.to_string()
}
fn default_ranging_region_id() -> String {
    RANGING_REGION_ID.to_string()
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::from_path(settings_path))
    }

    /// Load settings from `path`, falling back to defaults if it is missing or invalid
    pub fn from_path(settings_path: PathBuf) -> Self {
        let settings = Self::load_from_file(&settings_path).unwrap_or_default();
        Self {
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("BeaconFinder");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}
