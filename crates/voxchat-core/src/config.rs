use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoxchatError};
use crate::types::{ListeningMode, SpokenCue};

/// Top-level configuration for voxchat.
///
/// Loaded from `~/.voxchat/config.toml` by default. Every section falls back
/// to its defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxchatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub dictation: DictationConfig,
    #[serde(default)]
    pub page: PageConfig,
    #[serde(default)]
    pub punctuation: PunctuationConfig,
}

impl VoxchatConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: VoxchatConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VoxchatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Switch recognition and dictation flags to a preset.
    pub fn apply_mode(&mut self, mode: ListeningMode) {
        match mode {
            ListeningMode::Continuous => {
                self.recognition.continuous = true;
                self.recognition.auto_restart = true;
                self.dictation.append_mode = true;
            }
            ListeningMode::SingleShot => {
                self.recognition.continuous = false;
                self.recognition.auto_restart = false;
                self.dictation.append_mode = false;
            }
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Speech recognition engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// BCP 47 locale tag handed to the recognition engine.
    pub lang: String,
    /// Keep listening across pauses instead of ending after one utterance.
    pub continuous: bool,
    /// Deliver non-final hypotheses for the status indicator.
    pub interim_results: bool,
    /// Acquire a new engine when the current one ends without a stop request.
    pub auto_restart: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            lang: "uk-UA".to_string(),
            continuous: true,
            interim_results: true,
            auto_restart: true,
        }
    }
}

/// Dictation behavior toggles. Both flags can be flipped at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DictationConfig {
    /// Submit the message right after each finalized chunk is inserted.
    pub auto_send: bool,
    /// Append to existing editor content instead of replacing it.
    pub append_mode: bool,
    /// Appended after every finalized chunk.
    pub delimiter: String,
}

impl Default for DictationConfig {
    fn default() -> Self {
        Self {
            auto_send: true,
            append_mode: true,
            delimiter: " ".to_string(),
        }
    }
}

/// Attribute selectors for the host page elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Rich-text chat editor.
    pub editor_selector: String,
    /// Send button.
    pub submit_selector: String,
    /// Zero-width placeholder nodes left behind by the editor.
    pub placeholder_selector: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            editor_selector: "[data-a-target=\"chat-input\"]".to_string(),
            submit_selector: "[data-a-target=\"chat-send-button\"]".to_string(),
            placeholder_selector: "[data-slate-zero-width]".to_string(),
        }
    }
}

/// Spoken punctuation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PunctuationConfig {
    /// Whether spoken cues are rewritten at all.
    pub enabled: bool,
    /// Custom cue table. When absent, the built-in table for the recognition
    /// locale is used.
    pub cues: Option<Vec<SpokenCue>>,
}

impl Default for PunctuationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cues: None,
        }
    }
}
