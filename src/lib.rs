//! image-stencil - declarative image templates with deferred variables
//!
//! A template positions graphic components on a canvas, with any field
//! value deferrable to a `$variable$` reference filled in by the caller at
//! render time. This library is the decision engine: it parses field
//! values, resolves typed properties per component, evaluates the boolean
//! conditional gating each component, and orchestrates load → apply →
//! render. Pixels, fonts, image codecs and barcode symbologies live behind
//! narrow collaborator traits in [`render`].
//!
//! # Example
//!
//! ```rust
//! use image_stencil::{Builder, ComponentRegistry, PixmapCanvas};
//!
//! let template = br#"{
//!     "components": [{
//!         "type": "circle",
//!         "properties": {
//!             "centreX": "32", "centreY": "32", "radius": "$size$",
//!             "colour": {"R": "200", "G": "30", "B": "30", "A": "255"}
//!         }
//!     }]
//! }"#;
//!
//! let mut builder = Builder::new(
//!     ComponentRegistry::with_builtin_kinds(),
//!     Box::new(PixmapCanvas::new(64, 64)),
//! );
//! builder.load_data(template).unwrap();
//! assert!(builder.variables().contains("size"));
//!
//! let values = [("size".to_string(), 20i64.into())].into();
//! builder.set_named_values(&values).unwrap();
//! builder.write_components().unwrap();
//! ```

pub mod component;
pub mod conditional;
pub mod filesystem;
pub mod options;
pub mod parser;
pub mod property;
pub mod render;
pub mod template;

pub use component::{
    Component, ComponentError, ComponentRegistry, DiscoveredVariables, LoadContext, NamedValues,
};
pub use conditional::{Conditional, ConditionalError, ConditionGroup};
pub use options::Options;
pub use parser::{parse_field, DeconstructedField, FieldError};
pub use property::{PropKind, PropValue, PropertyBindings, PropertyError};
pub use render::{
    Alignment, Canvas, CanvasError, FitError, MockCanvas, PixmapCanvas, Raster,
};
pub use template::{BuildError, Builder, TemplateDoc};

/// Load a template and report the variables a caller must supply, without
/// rendering anything.
pub fn discover_variables(data: &[u8]) -> Result<DiscoveredVariables, BuildError> {
    let mut builder = Builder::new(
        ComponentRegistry::with_builtin_kinds(),
        Box::new(PixmapCanvas::new(1, 1)),
    );
    builder.load_data(data)?;
    Ok(builder.variables().clone())
}
