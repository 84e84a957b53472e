//! Render options loaded from TOML configuration
//!
//! The options file sets up the canvas a template is rendered onto. All
//! fields are optional and fall back to the defaults.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing an options file
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse options TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Canvas and output options for rendering.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Canvas width in pixels.
    pub width: i32,
    /// Canvas height in pixels.
    pub height: i32,
    /// Pixel density used to scale font sizes.
    pub ppi: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            ppi: 72.0,
        }
    }
}

impl Options {
    /// Load options from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&content)?)
    }

    /// Load options from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
