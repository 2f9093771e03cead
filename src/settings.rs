use std::path::{Path, PathBuf};

use bevy::prelude::*;
use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::ConfigError;

pub const SETTINGS_FILE: &str = "globe.json";

/// Everything tunable about the viewer. Loaded once before the app starts;
/// any field missing from the file keeps its default.
#[derive(Resource, Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GlobeSettings {
    /// Root the geodata path and textures are resolved against.
    pub asset_root: String,
    pub geodata_path: String,
    /// Object inside a TopoJSON topology holding the countries.
    pub topology_object: String,

    pub earth_radius: f64,
    pub border_radius: f64,
    pub label_radius: f64,
    pub cloud_radius: f64,
    pub star_radius: f64,

    pub border_color: [u8; 3],
    pub highlight_color: [u8; 3],

    /// Label text height in world units.
    pub label_font_size: f32,
    pub narrow_window_width: f32,
    pub narrow_label_scale: f32,

    /// Max distance (world units) between the pick ray and a border segment.
    pub pick_threshold: f32,
    /// How far behind the globe's entry point a clicked border may lie.
    pub occlusion_tolerance: f32,

    pub rest_countries_url: String,
    pub world_bank_url: String,
    pub gdp_indicator: String,
    pub flag_cdn_url: String,
    pub request_timeout_secs: u64,
    pub max_concurrent_lookups: usize,

    pub message_seconds: f32,

    pub travel_on_search: bool,
    pub travel_seconds: f32,
    pub travel_hold_seconds: f32,
    pub travel_altitude: f64,

    pub camera_start_distance: f32,
    pub camera_min_distance: f32,
    pub camera_max_distance: f32,
    /// Fraction of the remaining orbit motion applied per 60 Hz frame.
    pub camera_damping: f32,

    /// Radians per second, negative spins westward.
    pub earth_spin: f32,
    pub cloud_spin: f32,
    pub star_spin: f32,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            geodata_path: "data/world-topo-min.json".to_string(),
            topology_object: "countries".to_string(),
            earth_radius: 0.6,
            border_radius: 0.602,
            label_radius: 0.65,
            cloud_radius: 0.63,
            star_radius: 80.0,
            border_color: [0xff, 0xff, 0xff],
            highlight_color: [0x39, 0xff, 0x14],
            label_font_size: 0.01,
            narrow_window_width: 600.0,
            narrow_label_scale: 1.6,
            pick_threshold: 0.006,
            occlusion_tolerance: 0.01,
            rest_countries_url: "https://restcountries.com/v3.1/name".to_string(),
            world_bank_url: "https://api.worldbank.org/v2/country".to_string(),
            gdp_indicator: "NY.GDP.MKTP.CD".to_string(),
            flag_cdn_url: "https://flagcdn.com/w80".to_string(),
            request_timeout_secs: 10,
            max_concurrent_lookups: 2,
            message_seconds: 3.0,
            travel_on_search: true,
            travel_seconds: 1.8,
            travel_hold_seconds: 3.0,
            travel_altitude: 1.0,
            camera_start_distance: 2.0,
            camera_min_distance: 0.8,
            camera_max_distance: 3.0,
            camera_damping: 0.05,
            earth_spin: -0.0015 * 60.0,
            cloud_spin: -0.001 * 60.0,
            star_spin: -0.002 * 60.0,
        }
    }
}

impl GlobeSettings {
    /// Path of the settings file in the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "country-globe").map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads the user's settings, falling back to defaults when there is no
    /// file or it cannot be used.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(settings) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Ignoring settings file: {e}");
                Self::default()
            }
        }
    }

    pub fn geodata_file(&self) -> PathBuf {
        Path::new(&self.asset_root).join(&self.geodata_path)
    }

    pub fn border_color(&self) -> Color {
        let [r, g, b] = self.border_color;
        Color::srgb_u8(r, g, b)
    }

    pub fn highlight_color(&self) -> Color {
        let [r, g, b] = self.highlight_color;
        Color::srgb_u8(r, g, b)
    }
}
