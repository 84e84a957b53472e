//! Glyph metric collaborators for text components
//!
//! Fonts are reached through the same narrow-interface discipline as files
//! and images: open a face by name or parse one from bytes, then ask it for
//! advance widths. The built-in face uses fixed advances so measurements
//! stay deterministic without a font file on disk.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors from font collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FontError {
    /// No face is registered under the requested name.
    #[error("no font registered under name {name}")]
    NotFound { name: String },

    /// Font bytes did not parse.
    #[error("could not parse font data: {reason}")]
    Parse { reason: String },

    /// The requested source kind is reserved but not implemented.
    #[error("{feature} not implemented")]
    NotImplemented { feature: String },
}

/// Scaled glyph metrics for one typeface.
pub trait FontFace: fmt::Debug {
    /// Advance width of `text` in pixels at `scale` pixels per em.
    fn measure(&self, text: &str, scale: f64) -> f64;
}

/// Open-by-name and decode-bytes access to typefaces.
pub trait FontSource: fmt::Debug {
    fn open(&self, name: &str) -> Result<Arc<dyn FontFace>, FontError>;
    fn parse(&self, data: &[u8]) -> Result<Arc<dyn FontFace>, FontError>;
}

/// A face whose glyphs all advance by the same fraction of the em size.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceFace {
    /// Advance per glyph as a fraction of the em size.
    pub aspect: f64,
}

impl Default for FixedAdvanceFace {
    fn default() -> Self {
        Self { aspect: 0.6 }
    }
}

impl FontFace for FixedAdvanceFace {
    fn measure(&self, text: &str, scale: f64) -> f64 {
        text.chars().count() as f64 * self.aspect * scale
    }
}

/// A [`FontSource`] that hands out [`FixedAdvanceFace`] for any name.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAdvanceSource;

impl FontSource for FixedAdvanceSource {
    fn open(&self, _name: &str) -> Result<Arc<dyn FontFace>, FontError> {
        Ok(Arc::new(FixedAdvanceFace::default()))
    }

    fn parse(&self, data: &[u8]) -> Result<Arc<dyn FontFace>, FontError> {
        if data.is_empty() {
            return Err(FontError::Parse {
                reason: "empty font data".to_string(),
            });
        }
        Ok(Arc::new(FixedAdvanceFace::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_advance_measurement() {
        let face = FixedAdvanceFace { aspect: 0.5 };
        assert_eq!(face.measure("abcd", 10.0), 20.0);
        assert_eq!(face.measure("", 10.0), 0.0);
    }

    #[test]
    fn test_source_rejects_empty_data() {
        let source = FixedAdvanceSource;
        assert!(source.open("anything").is_ok());
        assert!(source.parse(b"font bytes").is_ok());
        assert!(matches!(
            source.parse(b""),
            Err(FontError::Parse { .. })
        ));
    }
}
