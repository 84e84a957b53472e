//! Embedded image component sourced from a file or inline base64 data

use std::sync::Arc;

use base64::Engine as _;
use serde::Deserialize;

use crate::filesystem::FileSource;
use crate::property::{
    apply_named_values, extract_exclusive, extract_single, ExclusiveField, PropKind, PropValue,
    PropertyBindings, PropertyError,
};
use crate::render::{Canvas, CanvasError, ImageDecoder, Point, Raster};

use super::{
    ensure_bound, extract_optional, Component, ComponentError, LoadContext, NamedValues,
};

/// A raster image drawn at a position, optionally rescaled.
///
/// Exactly one of `fileName` and `data` must be set; the exclusive-choice
/// protocol enforces this at load time even when the winner defers to a
/// variable.
#[derive(Debug, Clone)]
pub struct ImageComponent {
    bindings: PropertyBindings,
    top_left: Point,
    width: i32,
    height: i32,
    image: Option<Raster>,
    files: Arc<dyn FileSource>,
    images: Arc<dyn ImageDecoder>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ImageDoc {
    #[serde(rename = "topLeftX")]
    top_left_x: String,
    #[serde(rename = "topLeftY")]
    top_left_y: String,
    width: String,
    height: String,
    #[serde(rename = "fileName")]
    file_name: String,
    data: String,
}

impl ImageComponent {
    /// Decode image properties, deferring variable fields into bindings.
    pub fn from_document(
        context: &LoadContext,
        properties: &serde_json::Value,
    ) -> Result<Box<dyn Component>, ComponentError> {
        let doc: ImageDoc = serde_json::from_value(properties.clone())
            .map_err(|source| ComponentError::Document {
                kind: "image",
                source,
            })?;
        let mut component = ImageComponent {
            bindings: PropertyBindings::new(),
            top_left: Point::default(),
            width: 0,
            height: 0,
            image: None,
            files: context.files.clone(),
            images: context.images.clone(),
        };
        let mut bindings = PropertyBindings::new();

        let candidates = [
            ExclusiveField::new(&doc.file_name, "fileName", PropKind::String),
            ExclusiveField::new(&doc.data, "data", PropKind::String),
        ];
        let (updated, source, index) = extract_exclusive(&candidates, &bindings)?;
        bindings = updated;
        if let Some(source) = source {
            let name = candidates[index].name;
            component.image = Some(component.load_image(index, source.as_str(name)?)?);
        }

        for (raw, slot) in [
            (&doc.top_left_x, "topLeftX"),
            (&doc.top_left_y, "topLeftY"),
        ] {
            let (updated, value) = extract_single(raw, slot, PropKind::Int, &bindings)?;
            bindings = updated;
            if let Some(value) = value {
                let parsed = value.as_int(slot)?;
                if slot == "topLeftX" {
                    component.top_left.x = parsed;
                } else {
                    component.top_left.y = parsed;
                }
            }
        }

        // Width and height are optional; zero means keep the source size.
        for (raw, slot) in [(&doc.width, "width"), (&doc.height, "height")] {
            let (updated, value) = extract_optional(raw, slot, PropKind::Int, &bindings)?;
            bindings = updated;
            if let Some(value) = value {
                let parsed = value.as_int(slot)?;
                if slot == "width" {
                    component.width = parsed;
                } else {
                    component.height = parsed;
                }
            }
        }

        component.bindings = bindings;
        Ok(Box::new(component))
    }

    fn load_image(&self, source_index: usize, value: &str) -> Result<Raster, ComponentError> {
        let bytes = match source_index {
            0 => self
                .files
                .read(value)
                .map_err(|source| ComponentError::FileRead {
                    name: value.to_string(),
                    source,
                })?,
            _ => base64::engine::general_purpose::STANDARD
                .decode(value)
                .map_err(|err| {
                    ComponentError::Canvas(CanvasError::Decode {
                        reason: err.to_string(),
                    })
                })?,
        };
        Ok(self.images.decode(&bytes)?)
    }

    fn set_slot(&mut self, slot: &str, value: &PropValue) -> Result<(), PropertyError> {
        match slot {
            "fileName" | "data" => {
                let index = usize::from(slot == "data");
                let raster = self
                    .load_image(index, value.as_str(slot)?)
                    .map_err(|err| PropertyError::Setter {
                        slot: slot.to_string(),
                        message: err.to_string(),
                    })?;
                self.image = Some(raster);
            }
            "topLeftX" => self.top_left.x = value.as_int(slot)?,
            "topLeftY" => self.top_left.y = value.as_int(slot)?,
            "width" => self.width = value.as_int(slot)?,
            "height" => self.height = value.as_int(slot)?,
            _ => {
                return Err(PropertyError::UnknownSlot {
                    slot: slot.to_string(),
                })
            }
        }
        Ok(())
    }
}

impl Component for ImageComponent {
    fn kind(&self) -> &'static str {
        "image"
    }

    fn bindings(&self) -> &PropertyBindings {
        &self.bindings
    }

    fn set_named_values(&self, values: &NamedValues) -> Result<Box<dyn Component>, PropertyError> {
        let mut next = self.clone();
        let remaining =
            apply_named_values(&self.bindings, values, |slot, value| next.set_slot(slot, value))?;
        next.bindings = remaining;
        Ok(Box::new(next))
    }

    fn write(&self, canvas: &dyn Canvas) -> Result<Box<dyn Canvas>, CanvasError> {
        ensure_bound(self.kind(), &self.bindings)?;
        let Some(image) = &self.image else {
            return Err(CanvasError::Draw {
                message: "image component has no image data".to_string(),
            });
        };
        let scaled = image.resized(self.width, self.height);
        canvas.draw_image(self.top_left, &scaled)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::filesystem::MemoryFiles;
    use crate::render::{MockCall, MockCanvas, Rgba};

    use super::*;

    fn ppm_fixture() -> Vec<u8> {
        Raster::filled(4, 2, Rgba::new(9, 9, 9, 255)).to_ppm()
    }

    fn context_with_file(name: &str) -> LoadContext {
        let files = MemoryFiles::new().with_file(name, ppm_fixture());
        LoadContext::new().with_files(Arc::new(files))
    }

    #[test]
    fn test_image_from_file_draws_scaled() {
        let properties = json!({
            "fileName": "photo.ppm",
            "topLeftX": "3",
            "topLeftY": "4",
            "width": "8",
            "height": "4"
        });
        let component =
            ImageComponent::from_document(&context_with_file("photo.ppm"), &properties)
                .expect("Should decode");
        assert!(component.bindings().is_empty());

        let mock = MockCanvas::new(100, 100);
        component.write(&mock).expect("Should draw");
        assert_eq!(
            mock.calls(),
            vec![MockCall::DrawImage {
                top_left: Point::new(3, 4),
                width: 8,
                height: 4,
            }]
        );
    }

    #[test]
    fn test_image_from_inline_data() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(ppm_fixture());
        let properties = json!({
            "data": encoded,
            "topLeftX": "0",
            "topLeftY": "0"
        });
        let component = ImageComponent::from_document(&LoadContext::new(), &properties)
            .expect("Should decode");

        let mock = MockCanvas::new(100, 100);
        component.write(&mock).expect("Should draw");
        // No explicit size keeps the source dimensions.
        assert_eq!(
            mock.calls(),
            vec![MockCall::DrawImage {
                top_left: Point::new(0, 0),
                width: 4,
                height: 2,
            }]
        );
    }

    #[test]
    fn test_both_sources_set_is_an_exclusivity_error() {
        let properties = json!({
            "fileName": "photo.ppm",
            "data": "aGVsbG8=",
            "topLeftX": "0",
            "topLeftY": "0"
        });
        let err = ImageComponent::from_document(&context_with_file("photo.ppm"), &properties)
            .expect_err("Should fail");
        assert_eq!(
            err.to_string(),
            "exactly one of (fileName,data) must be set"
        );
    }

    #[test]
    fn test_deferred_file_name_loads_on_apply() {
        let properties = json!({
            "fileName": "$photo$",
            "topLeftX": "0",
            "topLeftY": "0"
        });
        let component =
            ImageComponent::from_document(&context_with_file("late.ppm"), &properties)
                .expect("Should decode");
        assert_eq!(component.bindings().variable_list(), "photo");

        let values: NamedValues =
            [("photo".to_string(), PropValue::String("late.ppm".to_string()))].into();
        let resolved = component.set_named_values(&values).expect("Should apply");
        assert!(resolved.bindings().is_empty());

        let mock = MockCanvas::new(100, 100);
        resolved.write(&mock).expect("Should draw");
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn test_missing_file_surfaces_in_setter_error() {
        let properties = json!({
            "fileName": "$photo$",
            "topLeftX": "0",
            "topLeftY": "0"
        });
        let component = ImageComponent::from_document(&LoadContext::new(), &properties)
            .expect("Should decode");
        let values: NamedValues = [(
            "photo".to_string(),
            PropValue::String("/definitely/not/here.ppm".to_string()),
        )]
        .into();
        let err = component.set_named_values(&values).expect_err("Should fail");
        assert!(matches!(err, PropertyError::Setter { .. }));
    }
}
