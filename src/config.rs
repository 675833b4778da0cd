//! Configuration: TOML file in the user config directory plus the color
//! theme resolved from it. Missing file or missing keys fall back to
//! built-in defaults.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Manages the config directory and config file operations.
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing).
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Load `config.toml`, or the defaults when no file exists. A present but
    /// unparsable file is an error; silently ignoring it would hide typos.
    pub fn load_config(&self) -> Result<AppConfig> {
        let path = self.config_path("config.toml");
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let contents = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| eyre!("Invalid config file {}: {}", path.display(), e))?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub theme: ThemeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            display: DisplayConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Rows shown in the Introduction page dataset previews.
    pub preview_rows: usize,
    /// Event poll interval for the main loop, in milliseconds.
    pub event_poll_interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_rows: 10,
            event_poll_interval_ms: 25,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub primary: String,
    pub secondary: String,
    pub error: String,
    pub dimmed: String,
    pub surface: String,
    pub controls_bg: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub text_inverse: String,
    pub table_header: String,
    pub modal_border: String,
    pub modal_border_active: String,
    pub chart_series_1: String,
    pub chart_series_2: String,
    pub chart_series_3: String,
    pub negative: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            primary: "cyan".to_string(),
            secondary: "magenta".to_string(),
            error: "red".to_string(),
            dimmed: "darkgray".to_string(),
            surface: "#303030".to_string(),
            controls_bg: "darkgray".to_string(),
            text_primary: "white".to_string(),
            text_secondary: "gray".to_string(),
            text_inverse: "black".to_string(),
            table_header: "yellow".to_string(),
            modal_border: "gray".to_string(),
            modal_border_active: "cyan".to_string(),
            chart_series_1: "cyan".to_string(),
            chart_series_2: "yellow".to_string(),
            chart_series_3: "green".to_string(),
            negative: "red".to_string(),
        }
    }
}

/// Resolved theme: named colors the widgets look up at render time.
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let c = &config.colors;
        let entries = [
            ("primary", &c.primary),
            ("secondary", &c.secondary),
            ("error", &c.error),
            ("dimmed", &c.dimmed),
            ("surface", &c.surface),
            ("controls_bg", &c.controls_bg),
            ("text_primary", &c.text_primary),
            ("text_secondary", &c.text_secondary),
            ("text_inverse", &c.text_inverse),
            ("table_header", &c.table_header),
            ("modal_border", &c.modal_border),
            ("modal_border_active", &c.modal_border_active),
            ("chart_series_1", &c.chart_series_1),
            ("chart_series_2", &c.chart_series_2),
            ("chart_series_3", &c.chart_series_3),
            ("negative", &c.negative),
        ];
        let mut colors = HashMap::new();
        for (name, value) in entries {
            colors.insert(name.to_string(), parse_color(value)?);
        }
        Ok(Self { colors })
    }

    /// Look up a named color; white when the name is unknown.
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::White)
    }
}

impl Default for Theme {
    fn default() -> Self {
        // The built-in palette always parses.
        Self::from_config(&ThemeConfig::default()).expect("default theme must parse")
    }
}

/// Parse `#RRGGBB` hex or a basic ANSI color name.
pub fn parse_color(value: &str) -> Result<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(eyre!("Invalid hex color '{}': expected #RRGGBB", value));
        }
        let r = u8::from_str_radix(&hex[0..2], 16)?;
        let g = u8::from_str_radix(&hex[2..4], 16)?;
        let b = u8::from_str_radix(&hex[4..6], 16)?;
        return Ok(Color::Rgb(r, g, b));
    }

    match value.to_lowercase().as_str() {
        "black" => Ok(Color::Black),
        "red" => Ok(Color::Red),
        "green" => Ok(Color::Green),
        "yellow" => Ok(Color::Yellow),
        "blue" => Ok(Color::Blue),
        "magenta" => Ok(Color::Magenta),
        "cyan" => Ok(Color::Cyan),
        "gray" | "grey" => Ok(Color::Gray),
        "darkgray" | "darkgrey" => Ok(Color::DarkGray),
        "lightred" => Ok(Color::LightRed),
        "lightgreen" => Ok(Color::LightGreen),
        "lightyellow" => Ok(Color::LightYellow),
        "lightblue" => Ok(Color::LightBlue),
        "lightmagenta" => Ok(Color::LightMagenta),
        "lightcyan" => Ok(Color::LightCyan),
        "white" => Ok(Color::White),
        other => Err(eyre!("Unknown color name '{}'", other)),
    }
}
