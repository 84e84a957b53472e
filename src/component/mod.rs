//! Render components and the protocol binding them to template fields
//!
//! Every component kind follows the same life cycle: it is decoded from the
//! raw `properties` object of a template entry, deferring any
//! variable-referencing fields into its [`PropertyBindings`]; caller values
//! later arrive through [`Component::set_named_values`]; once no bindings
//! remain the component can write itself to a canvas.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::filesystem::{FileSource, OsFiles};
use crate::property::{
    extract_single, PropKind, PropValue, PropertyBindings, PropertyError,
};
use crate::render::{
    Canvas, CanvasError, FixedAdvanceSource, FontError, FontSource, ImageDecoder, PpmDecoder,
    Rgba,
};

mod barcode;
mod circle;
mod datetime;
mod image;
mod rectangle;
mod registry;
mod text;

pub use barcode::BarcodeComponent;
pub use circle::CircleComponent;
pub use datetime::DatetimeComponent;
pub use image::ImageComponent;
pub use rectangle::RectangleComponent;
pub use registry::{ComponentFactory, ComponentRegistry};
pub use text::TextComponent;

/// Caller-supplied variable values.
pub type NamedValues = BTreeMap<String, PropValue>;

/// The set of variable names a template needs filled.
pub type DiscoveredVariables = BTreeSet<String>;

/// Errors raised while decoding or resolving components.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// The raw properties object did not match the kind's document shape.
    #[error("component {kind} properties did not match the document: {source}")]
    Document {
        kind: &'static str,
        source: serde_json::Error,
    },

    /// A field failed property extraction.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// A font collaborator failed.
    #[error(transparent)]
    Font(#[from] FontError),

    /// An image collaborator failed.
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// Reading a referenced file failed.
    #[error("failed to read {name}: {source}")]
    FileRead {
        name: String,
        source: std::io::Error,
    },

    /// The template named a kind the registry does not know.
    #[error("no component registered for kind {name}")]
    UnknownKind { name: String },

    /// A kind name was registered twice.
    #[error("cannot register component, {name} is already registered")]
    DuplicateKind { name: String },
}

/// Collaborators available while decoding a template.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// Open-by-name file access.
    pub files: Arc<dyn FileSource>,
    /// Typeface lookup and parsing.
    pub fonts: Arc<dyn FontSource>,
    /// Decode-bytes image access.
    pub images: Arc<dyn ImageDecoder>,
    /// The instant the template was loaded; datetime offsets are relative
    /// to this.
    pub loaded_at: DateTime<Utc>,
}

impl LoadContext {
    pub fn new() -> Self {
        Self {
            files: Arc::new(OsFiles),
            fonts: Arc::new(FixedAdvanceSource),
            images: Arc::new(PpmDecoder),
            loaded_at: Utc::now(),
        }
    }

    pub fn with_files(mut self, files: Arc<dyn FileSource>) -> Self {
        self.files = files;
        self
    }

    pub fn with_fonts(mut self, fonts: Arc<dyn FontSource>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_images(mut self, images: Arc<dyn ImageDecoder>) -> Self {
        self.images = images;
        self
    }

    pub fn with_loaded_at(mut self, loaded_at: DateTime<Utc>) -> Self {
        self.loaded_at = loaded_at;
        self
    }
}

impl Default for LoadContext {
    fn default() -> Self {
        Self::new()
    }
}

/// One renderable unit of a template.
pub trait Component: fmt::Debug {
    /// The kind name, as used in error messages.
    fn kind(&self) -> &'static str;

    /// Variables still waiting for values. Empty means drawable.
    fn bindings(&self) -> &PropertyBindings;

    /// Apply caller values through the bulk-apply protocol, returning the
    /// updated component. The receiver is unchanged, so on error the caller
    /// simply keeps its original.
    fn set_named_values(&self, values: &NamedValues) -> Result<Box<dyn Component>, PropertyError>;

    /// Draw onto the canvas, threading a new canvas value back. Refuses to
    /// draw while bindings remain.
    fn write(&self, canvas: &dyn Canvas) -> Result<Box<dyn Canvas>, CanvasError>;
}

/// The guard at the top of every `write` implementation.
pub(crate) fn ensure_bound(
    kind: &'static str,
    bindings: &PropertyBindings,
) -> Result<(), CanvasError> {
    if bindings.is_empty() {
        return Ok(());
    }
    Err(CanvasError::UnboundVariables {
        kind: kind.to_string(),
        remaining: bindings.variable_list(),
    })
}

/// Extract an optional field: an empty document field keeps the default and
/// registers nothing. Required fields call [`extract_single`] directly so
/// the empty-input error surfaces.
pub(crate) fn extract_optional(
    raw: &str,
    name: &str,
    kind: PropKind,
    bindings: &PropertyBindings,
) -> Result<(PropertyBindings, Option<PropValue>), PropertyError> {
    if raw.is_empty() {
        return Ok((bindings.clone(), None));
    }
    extract_single(raw, name, kind, bindings)
}

/// Wire shape of a colour object; channels are optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ColourDoc {
    #[serde(rename = "R")]
    pub red: String,
    #[serde(rename = "G")]
    pub green: String,
    #[serde(rename = "B")]
    pub blue: String,
    #[serde(rename = "A")]
    pub alpha: String,
}

/// Extract the four channels of a colour, prefixing slot names so multiple
/// colours on one component stay distinct (for example `dR` for a data
/// colour channel). Omitted channels keep the zero default.
pub(crate) fn extract_colour(
    doc: &ColourDoc,
    prefix: &str,
    bindings: &PropertyBindings,
) -> Result<(PropertyBindings, Rgba), PropertyError> {
    let mut colour = Rgba::default();
    let mut bindings = bindings.clone();
    let channels = [
        (&doc.red, "R"),
        (&doc.green, "G"),
        (&doc.blue, "B"),
        (&doc.alpha, "A"),
    ];
    for (raw, channel) in channels {
        let slot = format!("{prefix}{channel}");
        let (updated, value) = extract_optional(raw, &slot, PropKind::Uint8, &bindings)?;
        bindings = updated;
        if let Some(value) = value {
            let parsed = value.as_uint8(&slot)?;
            match channel {
                "R" => colour.r = parsed,
                "G" => colour.g = parsed,
                "B" => colour.b = parsed,
                _ => colour.a = parsed,
            }
        }
    }
    Ok((bindings, colour))
}

/// Set one channel of a colour from a bulk-apply slot name.
pub(crate) fn set_colour_slot(
    colour: &mut Rgba,
    channel: &str,
    value: &PropValue,
    slot: &str,
) -> Result<(), PropertyError> {
    let parsed = value.as_uint8(slot)?;
    match channel {
        "R" => colour.r = parsed,
        "G" => colour.g = parsed,
        "B" => colour.b = parsed,
        "A" => colour.a = parsed,
        _ => {
            return Err(PropertyError::UnknownSlot {
                slot: slot.to_string(),
            })
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_extract_colour_literal_channels() {
        let doc = ColourDoc {
            red: "255".to_string(),
            green: "128".to_string(),
            blue: "0".to_string(),
            alpha: "255".to_string(),
        };
        let (bindings, colour) =
            extract_colour(&doc, "", &PropertyBindings::new()).expect("Should extract");
        assert!(bindings.is_empty());
        assert_eq!(colour, Rgba::new(255, 128, 0, 255));
    }

    #[test]
    fn test_extract_colour_defers_and_prefixes() {
        let doc = ColourDoc {
            red: "$ink$".to_string(),
            green: "$ink$".to_string(),
            blue: "10".to_string(),
            alpha: String::new(),
        };
        let (bindings, colour) =
            extract_colour(&doc, "d", &PropertyBindings::new()).expect("Should extract");
        assert_eq!(
            bindings.slots("ink"),
            Some(&["dR".to_string(), "dG".to_string()][..])
        );
        assert_eq!(colour.b, 10);
        assert_eq!(colour.a, 0);
    }

    #[test]
    fn test_extract_colour_rejects_out_of_range() {
        let doc = ColourDoc {
            red: "300".to_string(),
            ..ColourDoc::default()
        };
        let err = extract_colour(&doc, "", &PropertyBindings::new()).expect_err("Should fail");
        assert_eq!(err.to_string(), "failed to convert property R to uint8: '300'");
    }

    #[test]
    fn test_ensure_bound_reports_remaining_variables() {
        let mut bindings = PropertyBindings::new();
        bindings.bind("size", "radius");
        let err = ensure_bound("circle", &bindings).expect_err("Should fail");
        assert_eq!(
            err.to_string(),
            "cannot draw circle, not all variable bindings are set: size"
        );
        assert!(ensure_bound("circle", &PropertyBindings::new()).is_ok());
    }
}
