use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
    time::Duration,
};

use crate::render::RenderConfig;

/// Overrides `data_dir` when the settings file leaves it unset.
pub const DATA_DIR_ENV: &str = "SENSOR_OVERLAY_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardSettings {
    pub title: String,
    /// Directory the relative file names below resolve against.
    pub data_dir: Option<PathBuf>,
    pub readings_csv: PathBuf,
    pub floor_plan_image: PathBuf,
    pub branding_image: PathBuf,
    pub branding_url: String,
    pub branding_caption: String,
    pub frame_delay_ms: u64,
    pub marker_scale: f64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            title: "NIOSH Sensor Data Visualization Project".into(),
            data_dir: None,
            readings_csv: "October31.csv".into(),
            floor_plan_image: "niosh_sensor.png".into(),
            branding_image: "intellygiene.png".into(),
            branding_url: "https://intellygiene.com".into(),
            branding_caption: "Created by Intellygiene".into(),
            frame_delay_ms: 500,
            marker_scale: 10.0,
        }
    }
}

impl DashboardSettings {
    /// `data_dir`, else `$SENSOR_OVERLAY_DATA_DIR`, else the working directory.
    pub fn data_root(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }
        std::env::current_dir().context("Cannot resolve working directory")
    }

    pub fn resolve(&self, file: &Path) -> Result<PathBuf> {
        if file.is_absolute() {
            return Ok(file.to_path_buf());
        }
        Ok(self.data_root()?.join(file))
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms.max(1))
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            marker_scale: self.marker_scale,
            ..RenderConfig::default()
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<DashboardSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            DashboardSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> DashboardSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update(&self, settings: DashboardSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        *guard = settings;
        self.persist(&guard)
    }

    fn persist(&self, data: &DashboardSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
