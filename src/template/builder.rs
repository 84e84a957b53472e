//! The orchestrator: load a template, apply variables, render components

use thiserror::Error;
use tracing::debug;

use crate::component::{
    Component, ComponentError, ComponentRegistry, DiscoveredVariables, LoadContext, NamedValues,
};
use crate::conditional::{Conditional, ConditionalError};
use crate::property::PropertyError;
use crate::render::{Canvas, CanvasError, Raster, Rgba};

use super::TemplateDoc;

/// Errors from loading, applying values to, or rendering a template.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The template JSON did not decode.
    #[error("could not decode template document: {0}")]
    Document(#[from] serde_json::Error),

    /// A component failed to decode or resolve.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// A property failed to apply.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// A conditional failed to evaluate.
    #[error(transparent)]
    Conditional(#[from] ConditionalError),

    /// A drawing collaborator failed.
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// More than one base image source was specified.
    #[error("cannot load base image from more than one source, specify only data, fileName or baseColour")]
    BaseImageConflict,

    /// A base image field did not parse.
    #[error("failed to parse base image field {field}: '{text}'")]
    BaseImageField { field: String, text: String },

    /// Reading the template file failed.
    #[error("failed to read template file {path}: {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
}

/// A component paired with its render gate.
#[derive(Debug)]
pub struct GatedComponent {
    pub conditional: Conditional,
    pub component: Box<dyn Component>,
}

/// Drives a template through load, variable application and rendering.
///
/// The builder owns the ordered (conditional, component) list and the
/// aggregate set of variables the template still needs. Loading commits
/// state only on full success; applying values mutates pair by pair and
/// keeps the effects of pairs processed before an error, as does rendering
/// with the canvas.
#[derive(Debug)]
pub struct Builder {
    registry: ComponentRegistry,
    context: LoadContext,
    canvas: Box<dyn Canvas>,
    pairs: Vec<GatedComponent>,
    variables: DiscoveredVariables,
}

impl Builder {
    pub fn new(registry: ComponentRegistry, canvas: Box<dyn Canvas>) -> Self {
        Self {
            registry,
            context: LoadContext::new(),
            canvas,
            pairs: Vec::new(),
            variables: DiscoveredVariables::new(),
        }
    }

    /// Replace the collaborators used during load.
    pub fn with_context(mut self, context: LoadContext) -> Self {
        self.context = context;
        self
    }

    /// Load a template document from a file through the file collaborator.
    pub fn load_file(&mut self, path: &str) -> Result<(), BuildError> {
        let data = self
            .context
            .files
            .read(path)
            .map_err(|source| BuildError::FileRead {
                path: path.to_string(),
                source,
            })?;
        self.load_data(&data)
    }

    /// Load a template document from raw JSON bytes.
    ///
    /// Decodes each component in document order and gathers every variable
    /// the components and their conditionals need. On error the builder is
    /// left exactly as it was.
    pub fn load_data(&mut self, data: &[u8]) -> Result<(), BuildError> {
        let doc: TemplateDoc = serde_json::from_slice(data)?;
        let background = self.background_canvas(&doc.base_image)?;

        let mut pairs = Vec::new();
        let mut variables = DiscoveredVariables::new();
        for entry in &doc.components {
            let factory = self.registry.decode(&entry.kind)?;
            variables.extend(entry.conditional.named_properties());
            let component = factory(&self.context, &entry.properties)?;
            variables.extend(component.bindings().variables().map(str::to_string));
            pairs.push(GatedComponent {
                conditional: entry.conditional.clone(),
                component,
            });
        }
        debug!(
            components = pairs.len(),
            variables = variables.len(),
            "template loaded"
        );

        if let Some(background) = background {
            self.canvas = background;
        }
        self.pairs = pairs;
        self.variables = variables;
        Ok(())
    }

    fn background_canvas(
        &self,
        base: &super::BaseImageDoc,
    ) -> Result<Option<Box<dyn Canvas>>, BuildError> {
        let data_set = !base.data.is_empty();
        let file_set = !base.file_name.is_empty();
        let colour_set = !base.base_colour.red.is_empty();
        if [data_set, file_set, colour_set].iter().filter(|set| **set).count() > 1 {
            return Err(BuildError::BaseImageConflict);
        }

        let mut canvas = None;
        if !base.ppi.is_empty() {
            let ppi = base.ppi.parse::<f64>().map_err(|_| BuildError::BaseImageField {
                field: "ppi".to_string(),
                text: base.ppi.clone(),
            })?;
            canvas = Some(self.canvas.with_ppi(ppi));
        }

        if !data_set && !file_set && !colour_set {
            return Ok(canvas);
        }

        let image = if colour_set {
            let width = parse_base_int("width", &base.width)?;
            let height = parse_base_int("height", &base.height)?;
            let colour = Rgba::new(
                parse_base_channel("R", &base.base_colour.red)?,
                parse_base_channel("G", &base.base_colour.green)?,
                parse_base_channel("B", &base.base_colour.blue)?,
                parse_base_channel("A", &base.base_colour.alpha)?,
            );
            Raster::filled(width, height, colour)
        } else {
            let bytes = if data_set {
                use base64::Engine as _;
                base64::engine::general_purpose::STANDARD
                    .decode(&base.data)
                    .map_err(|err| {
                        BuildError::Canvas(CanvasError::Decode {
                            reason: err.to_string(),
                        })
                    })?
            } else {
                self.context.files.read(&base.file_name).map_err(|source| {
                    BuildError::FileRead {
                        path: base.file_name.clone(),
                        source,
                    }
                })?
            };
            self.context.images.decode(&bytes)?
        };

        let target: &dyn Canvas = canvas.as_deref().unwrap_or(self.canvas.as_ref());
        let fitted = fit_to_canvas(&image, target.width(), target.height());
        Ok(Some(target.set_base_image(&fitted)?))
    }

    /// The variables discovered at load time that the caller must supply.
    pub fn variables(&self) -> &DiscoveredVariables {
        &self.variables
    }

    /// The current canvas state.
    pub fn canvas(&self) -> &dyn Canvas {
        self.canvas.as_ref()
    }

    /// The components whose gates currently validate true.
    pub fn components(&self) -> Vec<&dyn Component> {
        self.pairs
            .iter()
            .filter(|pair| pair.conditional.validate().unwrap_or(false))
            .map(|pair| pair.component.as_ref())
            .collect()
    }

    /// Apply caller values to every component and conditional.
    ///
    /// Each pair gets the full dictionary: components run the bulk-apply
    /// protocol and conditionals evaluate every (name, value) entry. The
    /// first error aborts the call; pairs processed before it keep their
    /// new state. Safe to call repeatedly as more values arrive.
    pub fn set_named_values(&mut self, values: &NamedValues) -> Result<(), BuildError> {
        for pair in &mut self.pairs {
            pair.component = pair.component.set_named_values(values)?;
            for (name, value) in values {
                pair.conditional = pair.conditional.set_value(name, value)?;
            }
        }
        debug!(values = values.len(), "named values applied");
        Ok(())
    }

    /// Render every component whose gate passes, in document order.
    ///
    /// A conditional with an empty root name renders unconditionally; any
    /// other gate is validated, where an error aborts the render and a
    /// false result skips the component. The first drawing error aborts,
    /// leaving the canvas as of the last successful component.
    pub fn write_components(&mut self) -> Result<(), BuildError> {
        for (index, pair) in self.pairs.iter().enumerate() {
            let render = if pair.conditional.name.is_empty() {
                true
            } else {
                pair.conditional.validate()?
            };
            if !render {
                debug!(index, kind = pair.component.kind(), "component skipped");
                continue;
            }
            self.canvas = pair.component.write(self.canvas.as_ref())?;
            debug!(index, kind = pair.component.kind(), "component rendered");
        }
        Ok(())
    }
}

fn parse_base_int(field: &str, text: &str) -> Result<i32, BuildError> {
    text.parse().map_err(|_| BuildError::BaseImageField {
        field: field.to_string(),
        text: text.to_string(),
    })
}

fn parse_base_channel(field: &str, text: &str) -> Result<u8, BuildError> {
    text.parse().map_err(|_| BuildError::BaseImageField {
        field: field.to_string(),
        text: text.to_string(),
    })
}

/// Resize a base image to the canvas, preserving aspect ratio when the
/// shapes differ: a wider image fits the canvas height, a taller image fits
/// the canvas width.
fn fit_to_canvas(image: &Raster, canvas_width: i32, canvas_height: i32) -> Raster {
    if image.width() == canvas_width && image.height() == canvas_height {
        return image.clone();
    }
    if image.width() == 0 || image.height() == 0 || canvas_height == 0 {
        return image.clone();
    }
    let canvas_aspect = f64::from(canvas_width) / f64::from(canvas_height);
    let image_aspect = f64::from(image.width()) / f64::from(image.height());
    if canvas_aspect == image_aspect {
        image.resized(canvas_width, canvas_height)
    } else if canvas_aspect < image_aspect {
        image.resized(0, canvas_height)
    } else {
        image.resized(canvas_width, 0)
    }
}
