use std::fs;

use anyhow::Context;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "mapmigo.conf";

/// Default place feed, fronted by the edge proxy.
pub const DEFAULT_DATA_URL: &str = "https://mapmigo.mapmigo.workers.dev/places";

// Region-level default view over Puerto Rico.
pub const DEFAULT_VIEW_LAT: f64 = 18.2208;
pub const DEFAULT_VIEW_LON: f64 = -66.5901;
pub const DEFAULT_VIEW_ZOOM: f64 = 9.0;

#[derive(Serialize, Deserialize, Clone)]
pub struct MapConfig {
    pub data_url: Option<String>,
    pub default_lat: Option<f64>,
    pub default_lon: Option<f64>,
    pub default_zoom: Option<f64>,
    /// "Satellite", "Dark" or "Light".
    pub base_layer: Option<String>,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            data_url: Some(DEFAULT_DATA_URL.to_string()),
            default_lat: Some(DEFAULT_VIEW_LAT),
            default_lon: Some(DEFAULT_VIEW_LON),
            default_zoom: Some(DEFAULT_VIEW_ZOOM),
            base_layer: Some("Satellite".to_string()),
        }
    }
}

impl MapConfig {
    pub fn data_url(&self) -> &str {
        self.data_url.as_deref().unwrap_or(DEFAULT_DATA_URL)
    }

    pub fn default_view(&self) -> (f64, f64, f64) {
        (
            self.default_lat.unwrap_or(DEFAULT_VIEW_LAT),
            self.default_lon.unwrap_or(DEFAULT_VIEW_LON),
            self.default_zoom.unwrap_or(DEFAULT_VIEW_ZOOM),
        )
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct GuiConfig {
    pub font_scale: Option<f32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub panel_width: Option<f32>,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self { font_scale: Some(1.0), width: Some(1280), height: Some(720), panel_width: Some(360.0) }
    }
}

#[derive(Serialize, Deserialize, Default)]
struct Config {
    #[serde(default)]
    map: MapConfig,
    #[serde(default)]
    gui: GuiConfig,
}

pub struct AppContext {
    pub map_config: MapConfig,
    pub gui_config: GuiConfig,
}

impl AppContext {
    /// Load the config file, creating it with defaults on first run and
    /// writing back any section a newer version added.
    pub fn new() -> anyhow::Result<Self> {
        let config_dir = dirs::config_dir().context("No config dir found")?;
        fs::create_dir_all(&config_dir)?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let cfg: Config = toml::from_str(&content)
                .context("Failed to parse config. Format might have changed.")?;

            let raw_value: toml::Value = toml::from_str(&content).unwrap_or(toml::Value::Integer(0));
            if raw_value.get("map").is_none() || raw_value.get("gui").is_none() {
                let toml_str = toml::to_string_pretty(&cfg)?;
                fs::write(&config_path, toml_str)?;
            }
            cfg
        } else {
            let cfg = Config::default();
            let toml_str = toml::to_string_pretty(&cfg)?;
            fs::write(&config_path, toml_str)?;
            cfg
        };

        Ok(Self { map_config: config.map, gui_config: config.gui })
    }

    /// Defaults only, for headless runs that must not touch the filesystem.
    pub fn ephemeral() -> Self {
        Self { map_config: MapConfig::default(), gui_config: GuiConfig::default() }
    }

    /// Save updated gui settings (window geometry) back to the config file.
    pub fn save_gui_config(&self, gui_config: &GuiConfig) -> anyhow::Result<()> {
        let config_dir = dirs::config_dir().context("No config dir found")?;
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let mut cfg: Config = toml::from_str(&content)?;
            cfg.gui = gui_config.clone();
            fs::write(&config_path, toml::to_string_pretty(&cfg)?)?;
        }
        Ok(())
    }
}
