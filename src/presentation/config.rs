//! Engine configuration.
//!
//! A process may install one [`EngineConfig`] at startup with [`install`];
//! operations read it through [`current`]. Backends can also be built with an
//! explicit configuration, which is what tests do.

use crate::common::{Error, RGBColor, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

static INSTALLED: OnceCell<EngineConfig> = OnceCell::new();

/// Tunables of the presentation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// JPEG thumbnail quality, 1 to 100
    pub jpeg_quality: u8,
    /// Page colour behind slides without any background, as `RRGGBB`
    pub background: String,
    /// Fan split and bulk thumbnails out over the rayon pool
    pub parallel: bool,
    /// File name of a merge result when the caller gives none
    pub merged_file_name: String,
    /// File name of a rendered template when neither caller nor template has one
    pub template_fallback_name: String,
    /// Base of split file names when the source blob has no name
    pub slide_file_base: String,
    /// Load system fonts to draw thumbnail text
    pub load_system_fonts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            background: "FFFFFF".to_string(),
            parallel: false,
            merged_file_name: "merged.pptx".to_string(),
            template_fallback_name: "template".to_string(),
            slide_file_base: "slide".to_string(),
            load_system_fonts: true,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(Error::Config(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if RGBColor::from_hex(&self.background).is_none() {
            return Err(Error::Config(format!("invalid background colour '{}'", self.background)));
        }
        Ok(())
    }

    /// Page colour, white when `background` does not parse.
    pub fn background_color(&self) -> RGBColor {
        RGBColor::from_hex(&self.background).unwrap_or(RGBColor::WHITE)
    }
}

/// Install the process-wide configuration. Fails if one is already installed.
pub fn install(config: EngineConfig) -> Result<()> {
    config.validate()?;
    INSTALLED
        .set(config)
        .map_err(|_| Error::Config("engine configuration is already installed".to_string()))?;
    log::info!("Engine configuration installed");
    Ok(())
}

/// The installed configuration, or the defaults.
pub fn current() -> EngineConfig {
    INSTALLED.get().cloned().unwrap_or_default()
}
