//! Configuration persistence for snapmark settings

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A user-chosen stroke color, kept as entered alongside its parsed RGBA value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColorToken {
    token: String,
    rgba: [u8; 4],
}

impl ColorToken {
    pub fn parse(token: &str) -> Result<Self, ConfigError> {
        let trimmed = token.trim();
        let rgba = parse_color(trimmed)
            .ok_or_else(|| ConfigError::InvalidColor(token.to_string()))?;
        Ok(Self {
            token: trimmed.to_string(),
            rgba,
        })
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(&self) -> [u8; 4] {
        self.rgba
    }
}

impl Default for ColorToken {
    fn default() -> Self {
        // Default red matching the toolbar's initial swatch
        Self {
            token: "#ff3b30".to_string(),
            rgba: [0xff, 0x3b, 0x30, 0xff],
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token)
    }
}

impl TryFrom<String> for ColorToken {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ColorToken> for String {
    fn from(c: ColorToken) -> Self {
        c.token
    }
}

fn parse_color(token: &str) -> Option<[u8; 4]> {
    if let Some(hex) = token.strip_prefix('#') {
        return parse_hex(hex);
    }
    let rgb = match token.to_ascii_lowercase().as_str() {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        _ => return None,
    };
    Some([rgb[0], rgb[1], rgb[2], 255])
}

fn parse_hex(hex: &str) -> Option<[u8; 4]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some([nibble(0)?, nibble(1)?, nibble(2)?, 255]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:36677/upload";

/// Upload settings persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadConfig {
    /// Endpoint of the local image-hosting companion
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Try a direct multipart upload before the clipboard trigger
    #[serde(default = "default_use_multipart")]
    pub use_multipart: bool,
    /// Sent as the `key` query parameter when non-empty
    #[serde(default)]
    pub secret_key: String,
    /// Per-request network timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Font used to render text annotations
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_use_multipart() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            use_multipart: default_use_multipart(),
            secret_key: String::new(),
            timeout_secs: default_timeout_secs(),
            font_path: None,
        }
    }
}

/// Read-only settings access needed by an upload attempt
pub trait SettingsStore {
    /// Load settings, falling back to defaults on any problem
    fn load(&self) -> UploadConfig;
}

/// Settings stored as JSON in the user configuration directory
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Directory name under the platform config dir
    pub const ID: &'static str = "snapmark";

    /// Store at the platform default location
    pub fn new() -> Result<Self, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::at(dir.join(Self::ID).join("settings.json")))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read settings, reporting every failure
    pub fn try_load(&self) -> Result<UploadConfig, ConfigError> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Save settings to disk
    pub fn save(&self, config: &UploadConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, text)?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> UploadConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(ConfigError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings at {}, using defaults", self.path.display());
                UploadConfig::default()
            }
            Err(err) => {
                log::warn!("Error loading settings, using defaults: {}", err);
                UploadConfig::default()
            }
        }
    }
}

impl SettingsStore for UploadConfig {
    fn load(&self) -> UploadConfig {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_named_colors() {
        assert_eq!(ColorToken::parse("#f00").unwrap().to_rgba_u8(), [255, 0, 0, 255]);
        assert_eq!(
            ColorToken::parse("#1e90ff").unwrap().to_rgba_u8(),
            [0x1e, 0x90, 0xff, 255]
        );
        assert_eq!(
            ColorToken::parse("#00000080").unwrap().to_rgba_u8(),
            [0, 0, 0, 0x80]
        );
        assert_eq!(ColorToken::parse("Blue").unwrap().to_rgba_u8(), [0, 0, 255, 255]);
    }

    #[test]
    fn rejects_unknown_colors() {
        assert!(ColorToken::parse("#12").is_err());
        assert!(ColorToken::parse("#gg0000").is_err());
        assert!(ColorToken::parse("chartreuse-ish").is_err());
    }

    #[test]
    fn color_token_serializes_as_entered() {
        let c = ColorToken::parse("#ABC").unwrap();
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#ABC\"");
        let back: ColorToken = serde_json::from_str("\"#ABC\"").unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: UploadConfig = serde_json::from_str(r#"{"secretKey":"s3"}"#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(config.use_multipart);
        assert_eq!(config.secret_key, "s3");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::at(dir.path().join("nope.json"));
        assert_eq!(store.load(), UploadConfig::default());
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonSettingsStore::at(&path);
        assert!(store.try_load().is_err());
        assert_eq!(store.load(), UploadConfig::default());
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSettingsStore::at(dir.path().join("nested").join("settings.json"));
        let config = UploadConfig {
            endpoint: "http://localhost:9000/up".into(),
            use_multipart: false,
            secret_key: "abc".into(),
            timeout_secs: 5,
            font_path: Some(PathBuf::from("/tmp/font.ttf")),
        };
        store.save(&config).unwrap();
        assert_eq!(store.load(), config);
    }
}
