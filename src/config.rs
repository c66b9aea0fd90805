//! Configuration management

use crate::speech::session::{PARAM_MAX, PARAM_MIN};
use crate::{Result, VoiceLensError};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Sample text spoken by the voice gallery when none is configured
const DEFAULT_SAMPLE_TEXT: &str =
    "Hello! This is a sample voice for VoiceLens. Experience natural and clear speech synthesis.";

/// Application configuration for the reader
///
/// Persists speech defaults (voice, pitch, rate), the gallery sample text,
/// the history limit and the transform endpoint across sessions.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.voicelens.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location or create it
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| VoiceLensError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| VoiceLensError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| VoiceLensError::Config(format!("Failed to save config: {}", e)))
    }

    /// Config file path (~/.voicelens.cfg)
    fn config_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".voicelens.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("voice", "")
            .set("pitch", "1.0")
            .set("rate", "1.0")
            .set("sample_text", DEFAULT_SAMPLE_TEXT);

        ini.with_section(Some("library"))
            .set("history_limit", "50");

        ini.with_section(Some("transform")).set("endpoint", "");

        ini
    }

    fn speech_str(&self, key: &str) -> Option<&str> {
        self.ini
            .section(Some("speech"))
            .and_then(|s| s.get(key))
            .filter(|v| !v.is_empty())
    }

    /// Preferred voice name, if configured
    pub fn voice(&self) -> Option<&str> {
        self.speech_str("voice")
    }

    pub fn set_voice(&mut self, name: &str) {
        self.ini.with_section(Some("speech")).set("voice", name);
    }

    /// Default pitch multiplier, clamped to the legal range
    pub fn pitch(&self) -> f32 {
        self.speech_str("pitch")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0_f32)
            .clamp(PARAM_MIN, PARAM_MAX)
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.ini
            .with_section(Some("speech"))
            .set("pitch", format!("{:.1}", pitch.clamp(PARAM_MIN, PARAM_MAX)));
    }

    /// Default rate multiplier, clamped to the legal range
    pub fn rate(&self) -> f32 {
        self.speech_str("rate")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1.0_f32)
            .clamp(PARAM_MIN, PARAM_MAX)
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.ini
            .with_section(Some("speech"))
            .set("rate", format!("{:.1}", rate.clamp(PARAM_MIN, PARAM_MAX)));
    }

    /// Gallery sample text
    pub fn sample_text(&self) -> &str {
        self.speech_str("sample_text").unwrap_or(DEFAULT_SAMPLE_TEXT)
    }

    /// History rows fetched per refresh
    pub fn history_limit(&self) -> usize {
        self.ini
            .section(Some("library"))
            .and_then(|s| s.get("history_limit"))
            .and_then(|v| v.parse().ok())
            .unwrap_or(crate::library::DEFAULT_HISTORY_LIMIT)
    }

    /// Remote transform endpoint, if configured
    pub fn transform_endpoint(&self) -> Option<&str> {
        self.ini
            .section(Some("transform"))
            .and_then(|s| s.get("endpoint"))
            .filter(|v| !v.is_empty())
    }
}
