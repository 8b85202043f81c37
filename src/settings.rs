//! Generation settings: tone selection, custom tones, output language and
//! detail level. Process-wide and user-editable; never reset automatically.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Built-in tone presets as (label, descriptor) pairs.
pub const TONE_PRESETS: &[(&str, &str)] = &[
    ("Academic", "Professional, academic"),
    ("Storytelling", "Friendly, storytelling"),
    ("Persuasive", "Persuasive, rousing"),
    ("Emotional", "Gentle, emotional"),
    ("Humorous", "Humorous, witty"),
];

/// Target verbosity tier for each generated section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Brief,
    #[default]
    Standard,
    Detailed,
}

impl DetailLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            DetailLevel::Brief => "brief",
            DetailLevel::Standard => "standard",
            DetailLevel::Detailed => "detailed",
        }
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailLevel {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brief" => Ok(DetailLevel::Brief),
            "standard" => Ok(DetailLevel::Standard),
            "detailed" => Ok(DetailLevel::Detailed),
            other => Err(ApiError::UserConfigViolation(format!(
                "Unknown detail level '{}' (expected brief, standard or detailed)",
                other
            ))),
        }
    }
}

/// Typed form of a single-field settings edit coming from the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigUpdate {
    ToggleTone(String),
    SelectTone(String),
    DeselectTone(String),
    SetTones(Vec<String>),
    AddCustomTone(String),
    RemoveCustomTone(String),
    Language(String),
    DetailLevel(DetailLevel),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    tones: Vec<String>,
    custom_tones: Vec<String>,
    pub language: String,
    pub detail_level: DetailLevel,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            tones: vec![TONE_PRESETS[0].1.to_string()],
            custom_tones: Vec::new(),
            language: "English".to_string(),
            detail_level: DetailLevel::Standard,
        }
    }
}

impl GenerationConfig {
    /// Build from configured defaults. Blank tones are dropped; an empty list
    /// falls back to the first preset.
    pub fn new(tones: Vec<String>, language: impl Into<String>, detail_level: DetailLevel) -> Self {
        let mut config = Self {
            language: language.into(),
            detail_level,
            ..Self::default()
        };
        let tones: Vec<String> = tones
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if !tones.is_empty() {
            config.tones.clear();
            for tone in tones {
                if !config.tones.contains(&tone) {
                    config.tones.push(tone);
                }
            }
        }
        config
    }

    pub fn tones(&self) -> &[String] {
        &self.tones
    }

    pub fn custom_tones(&self) -> &[String] {
        &self.custom_tones
    }

    /// Presets followed by custom tones, in definition order.
    pub fn available_tones(&self) -> Vec<String> {
        TONE_PRESETS
            .iter()
            .map(|(_, value)| value.to_string())
            .chain(self.custom_tones.iter().cloned())
            .collect()
    }

    pub fn is_selected(&self, tone: &str) -> bool {
        self.tones.iter().any(|t| t == tone)
    }

    /// All selected tones as one comma-separated descriptor.
    pub fn tone_descriptor(&self) -> String {
        self.tones.join(", ")
    }

    pub fn select_tone(&mut self, tone: &str) {
        let tone = tone.trim();
        if !tone.is_empty() && !self.is_selected(tone) {
            self.tones.push(tone.to_string());
        }
    }

    /// Remove a tone from the selection. Removing the last one is rejected and
    /// leaves the selection unchanged.
    pub fn deselect_tone(&mut self, tone: &str) -> Result<(), ApiError> {
        let tone = tone.trim();
        if !self.is_selected(tone) {
            return Ok(());
        }
        if self.tones.len() == 1 {
            return Err(ApiError::UserConfigViolation(
                "At least one tone must remain selected".to_string(),
            ));
        }
        self.tones.retain(|t| t != tone);
        Ok(())
    }

    pub fn toggle_tone(&mut self, tone: &str) -> Result<(), ApiError> {
        let tone = tone.trim();
        if self.is_selected(tone) {
            self.deselect_tone(tone)
        } else {
            self.select_tone(tone);
            Ok(())
        }
    }

    pub fn set_tones(&mut self, tones: Vec<String>) -> Result<(), ApiError> {
        let mut cleaned: Vec<String> = Vec::new();
        for tone in tones {
            let tone = tone.trim().to_string();
            if !tone.is_empty() && !cleaned.contains(&tone) {
                cleaned.push(tone);
            }
        }
        if cleaned.is_empty() {
            return Err(ApiError::UserConfigViolation(
                "At least one tone must remain selected".to_string(),
            ));
        }
        self.tones = cleaned;
        Ok(())
    }

    /// Define a custom tone and select it. Blank labels and presets are ignored.
    pub fn add_custom_tone(&mut self, tone: &str) {
        let tone = tone.trim();
        if tone.is_empty() {
            return;
        }
        let is_preset = TONE_PRESETS.iter().any(|(_, value)| *value == tone);
        if !is_preset && !self.custom_tones.iter().any(|t| t == tone) {
            self.custom_tones.push(tone.to_string());
        }
        self.select_tone(tone);
    }

    /// Delete a custom tone from the available list and from the selection.
    pub fn remove_custom_tone(&mut self, tone: &str) -> Result<(), ApiError> {
        let tone = tone.trim();
        if self.tones.len() == 1 && self.is_selected(tone) {
            return Err(ApiError::UserConfigViolation(
                "Cannot delete the only selected tone".to_string(),
            ));
        }
        self.custom_tones.retain(|t| t != tone);
        self.tones.retain(|t| t != tone);
        Ok(())
    }

    pub fn set_language(&mut self, language: &str) -> Result<(), ApiError> {
        let language = language.trim();
        if language.is_empty() {
            return Err(ApiError::UserConfigViolation(
                "Output language cannot be empty".to_string(),
            ));
        }
        self.language = language.to_string();
        Ok(())
    }

    pub fn apply(&mut self, update: ConfigUpdate) -> Result<(), ApiError> {
        debug!(update = ?update, "Applying settings update");
        match update {
            ConfigUpdate::ToggleTone(tone) => self.toggle_tone(&tone),
            ConfigUpdate::SelectTone(tone) => {
                self.select_tone(&tone);
                Ok(())
            }
            ConfigUpdate::DeselectTone(tone) => self.deselect_tone(&tone),
            ConfigUpdate::SetTones(tones) => self.set_tones(tones),
            ConfigUpdate::AddCustomTone(tone) => {
                self.add_custom_tone(&tone);
                Ok(())
            }
            ConfigUpdate::RemoveCustomTone(tone) => self.remove_custom_tone(&tone),
            ConfigUpdate::Language(language) => self.set_language(&language),
            ConfigUpdate::DetailLevel(level) => {
                self.detail_level = level;
                Ok(())
            }
        }
    }
}
