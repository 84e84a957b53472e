//! Text component with width-constrained scaling and alignment

use std::sync::Arc;

use serde::Deserialize;

use crate::filesystem::FileSource;
use crate::property::{
    apply_named_values, extract_exclusive, extract_single, ExclusiveField, PropKind, PropValue,
    PropertyBindings, PropertyError,
};
use crate::render::{
    fit_text, Alignment, Canvas, CanvasError, FontError, FontFace, FontSource, Point, Rgba,
};

use super::{
    ensure_bound, extract_colour, extract_optional, set_colour_slot, ColourDoc, Component,
    ComponentError, LoadContext, NamedValues,
};

/// A line of text drawn from a start point within a width budget.
///
/// The typeface comes from exactly one of `fontName` and `fontFile`;
/// `fontURL` is reserved in the document format but not implemented. At
/// write time the fit loop shrinks the nominal size until the content fits
/// `maxWidth`, then applies the alignment offset.
#[derive(Debug, Clone)]
pub struct TextComponent {
    bindings: PropertyBindings,
    content: String,
    start: Point,
    size: f64,
    max_width: i32,
    alignment: Alignment,
    face: Option<Arc<dyn FontFace>>,
    colour: Rgba,
    fonts: Arc<dyn FontSource>,
    files: Arc<dyn FileSource>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FontDoc {
    #[serde(rename = "fontName")]
    font_name: String,
    #[serde(rename = "fontFile")]
    font_file: String,
    #[serde(rename = "fontURL")]
    font_url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TextDoc {
    content: String,
    #[serde(rename = "startX")]
    start_x: String,
    #[serde(rename = "startY")]
    start_y: String,
    size: String,
    #[serde(rename = "maxWidth")]
    max_width: String,
    alignment: String,
    font: FontDoc,
    colour: ColourDoc,
}

/// Resolve the font exclusive-choice group shared by text-like components.
pub(crate) fn extract_font(
    doc: &FontDoc,
    bindings: &PropertyBindings,
    fonts: &Arc<dyn FontSource>,
    files: &Arc<dyn FileSource>,
) -> Result<(PropertyBindings, Option<Arc<dyn FontFace>>), ComponentError> {
    let candidates = [
        ExclusiveField::new(&doc.font_name, "fontName", PropKind::String),
        ExclusiveField::new(&doc.font_file, "fontFile", PropKind::String),
        ExclusiveField::new(&doc.font_url, "fontURL", PropKind::String),
    ];
    let (bindings, value, index) = extract_exclusive(&candidates, bindings)?;
    let Some(value) = value else {
        return Ok((bindings, None));
    };
    let name = candidates[index].name;
    let face = load_font(index, value.as_str(name)?, fonts, files)?;
    Ok((bindings, Some(face)))
}

pub(crate) fn load_font(
    source_index: usize,
    value: &str,
    fonts: &Arc<dyn FontSource>,
    files: &Arc<dyn FileSource>,
) -> Result<Arc<dyn FontFace>, ComponentError> {
    match source_index {
        0 => Ok(fonts.open(value)?),
        1 => {
            let data = files
                .read(value)
                .map_err(|source| ComponentError::FileRead {
                    name: value.to_string(),
                    source,
                })?;
            Ok(fonts.parse(&data)?)
        }
        _ => Err(ComponentError::Font(FontError::NotImplemented {
            feature: "fontURL".to_string(),
        })),
    }
}

impl TextComponent {
    /// Decode text properties, deferring variable fields into bindings.
    pub fn from_document(
        context: &LoadContext,
        properties: &serde_json::Value,
    ) -> Result<Box<dyn Component>, ComponentError> {
        let doc: TextDoc = serde_json::from_value(properties.clone())
            .map_err(|source| ComponentError::Document {
                kind: "text",
                source,
            })?;
        let mut component = TextComponent {
            bindings: PropertyBindings::new(),
            content: String::new(),
            start: Point::default(),
            size: 0.0,
            max_width: 0,
            alignment: Alignment::default(),
            face: None,
            colour: Rgba::default(),
            fonts: context.fonts.clone(),
            files: context.files.clone(),
        };
        let mut bindings = PropertyBindings::new();

        let (updated, face) =
            extract_font(&doc.font, &bindings, &component.fonts, &component.files)?;
        bindings = updated;
        component.face = face;

        let (updated, value) =
            extract_single(&doc.content, "content", PropKind::String, &bindings)?;
        bindings = updated;
        if let Some(value) = value {
            component.content = value.as_str("content")?.to_string();
        }

        for (raw, slot) in [
            (&doc.start_x, "startX"),
            (&doc.start_y, "startY"),
            (&doc.max_width, "maxWidth"),
        ] {
            let (updated, value) = extract_single(raw, slot, PropKind::Int, &bindings)?;
            bindings = updated;
            if let Some(value) = value {
                let parsed = value.as_int(slot)?;
                match slot {
                    "startX" => component.start.x = parsed,
                    "startY" => component.start.y = parsed,
                    _ => component.max_width = parsed,
                }
            }
        }

        let (updated, value) = extract_single(&doc.size, "size", PropKind::Float, &bindings)?;
        bindings = updated;
        if let Some(value) = value {
            component.size = value.as_float("size")?;
        }

        let (updated, value) =
            extract_optional(&doc.alignment, "alignment", PropKind::String, &bindings)?;
        bindings = updated;
        if let Some(value) = value {
            component.alignment = Alignment::from_name(value.as_str("alignment")?);
        }

        let (updated, colour) = extract_colour(&doc.colour, "", &bindings)?;
        bindings = updated;
        component.colour = colour;
        component.bindings = bindings;
        Ok(Box::new(component))
    }

    fn set_slot(&mut self, slot: &str, value: &PropValue) -> Result<(), PropertyError> {
        match slot {
            "content" => self.content = value.as_str(slot)?.to_string(),
            "fontName" | "fontFile" | "fontURL" => {
                let index = match slot {
                    "fontName" => 0,
                    "fontFile" => 1,
                    _ => 2,
                };
                let face = load_font(index, value.as_str(slot)?, &self.fonts, &self.files)
                    .map_err(|err| PropertyError::Setter {
                        slot: slot.to_string(),
                        message: err.to_string(),
                    })?;
                self.face = Some(face);
            }
            "size" => self.size = value.as_float(slot)?,
            "alignment" => self.alignment = Alignment::from_name(value.as_str(slot)?),
            "startX" => self.start.x = value.as_int(slot)?,
            "startY" => self.start.y = value.as_int(slot)?,
            "maxWidth" => self.max_width = value.as_int(slot)?,
            "R" | "G" | "B" | "A" => set_colour_slot(&mut self.colour, slot, value, slot)?,
            _ => {
                return Err(PropertyError::UnknownSlot {
                    slot: slot.to_string(),
                })
            }
        }
        Ok(())
    }
}

impl Component for TextComponent {
    fn kind(&self) -> &'static str {
        "text"
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
        let Some(face) = &self.face else {
            return Err(CanvasError::Draw {
                message: "text component has no typeface".to_string(),
            });
        };
        let fit = fit_text(
            &self.content,
            self.size,
            self.max_width,
            canvas.ppi(),
            self.alignment,
            |scale| canvas.try_text(&self.content, face.as_ref(), scale, self.max_width),
        )?;
        canvas.text(
            &self.content,
            Point::new(self.start.x + fit.offset, self.start.y),
            face.as_ref(),
            fit.scale,
            self.colour,
            self.max_width,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::render::{MockCall, MockCanvas};

    use super::*;

    fn text_properties() -> serde_json::Value {
        json!({
            "content": "Hello",
            "startX": "10",
            "startY": "40",
            "size": "12",
            "maxWidth": "100",
            "alignment": "right",
            "font": {"fontName": "Sans"},
            "colour": {"R": "0", "G": "0", "B": "0", "A": "255"}
        })
    }

    #[test]
    fn test_text_draws_with_alignment_offset() {
        let component = TextComponent::from_document(&LoadContext::new(), &text_properties())
            .expect("Should decode");
        assert!(component.bindings().is_empty());

        let mock = MockCanvas::new(200, 100);
        mock.push_try_text(true, 60);
        component.write(&mock).expect("Should draw");

        // Right alignment pushes the start point by the 40 pixel slack.
        match &mock.calls()[0] {
            MockCall::Text { start, scale, .. } => {
                assert_eq!(*start, Point::new(50, 40));
                assert_eq!(*scale, 12.0);
            }
            other => panic!("Expected Text call, got {other:?}"),
        }
    }

    #[test]
    fn test_text_shrinks_until_it_fits() {
        let component = TextComponent::from_document(&LoadContext::new(), &text_properties())
            .expect("Should decode");

        let mock = MockCanvas::new(200, 100);
        mock.push_try_text(false, 200);
        mock.push_try_text(true, 100);
        component.write(&mock).expect("Should draw");

        match &mock.calls()[0] {
            MockCall::Text { scale, start, .. } => {
                assert_eq!(*scale, 6.0);
                // Exact fit leaves no alignment slack.
                assert_eq!(*start, Point::new(10, 40));
            }
            other => panic!("Expected Text call, got {other:?}"),
        }
    }

    #[test]
    fn test_text_that_never_fits_errors() {
        let component = TextComponent::from_document(&LoadContext::new(), &text_properties())
            .expect("Should decode");

        let mock = MockCanvas::new(200, 100);
        for _ in 0..10 {
            mock.push_try_text(false, 500);
        }
        let err = component.write(&mock).expect_err("Should fail");
        assert!(err.to_string().contains("Hello"));
        assert!(err.to_string().contains("10 tries"));
    }

    #[test]
    fn test_font_url_is_rejected() {
        let properties = json!({
            "content": "x",
            "startX": "0",
            "startY": "0",
            "size": "10",
            "maxWidth": "50",
            "font": {"fontURL": "https://example.com/font.ttf"},
            "colour": {"R": "0", "G": "0", "B": "0", "A": "255"}
        });
        let err = TextComponent::from_document(&LoadContext::new(), &properties)
            .expect_err("Should fail");
        assert_eq!(err.to_string(), "fontURL not implemented");
    }

    #[test]
    fn test_deferred_content_and_font() {
        let properties = json!({
            "content": "$greeting$",
            "startX": "0",
            "startY": "20",
            "size": "10",
            "maxWidth": "80",
            "font": {"fontName": "$face$"},
            "colour": {"R": "0", "G": "0", "B": "0", "A": "255"}
        });
        let component = TextComponent::from_document(&LoadContext::new(), &properties)
            .expect("Should decode");
        assert_eq!(component.bindings().variable_list(), "face,greeting");

        let values: NamedValues = [
            ("greeting".to_string(), PropValue::String("hi".to_string())),
            ("face".to_string(), PropValue::String("Serif".to_string())),
        ]
        .into();
        let resolved = component.set_named_values(&values).expect("Should apply");
        assert!(resolved.bindings().is_empty());

        let mock = MockCanvas::new(100, 100);
        resolved.write(&mock).expect("Should draw");
        match &mock.calls()[0] {
            MockCall::Text { text, .. } => assert_eq!(text, "hi"),
            other => panic!("Expected Text call, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_alignment_defaults_left() {
        let properties = json!({
            "content": "x",
            "startX": "0",
            "startY": "0",
            "size": "10",
            "maxWidth": "50",
            "font": {"fontName": "Sans"},
            "colour": {"R": "0", "G": "0", "B": "0", "A": "255"}
        });
        let component = TextComponent::from_document(&LoadContext::new(), &properties)
            .expect("Should decode");
        let mock = MockCanvas::new(100, 100);
        mock.push_try_text(true, 20);
        component.write(&mock).expect("Should draw");
        match &mock.calls()[0] {
            MockCall::Text { start, .. } => assert_eq!(start.x, 0),
            other => panic!("Expected Text call, got {other:?}"),
        }
    }
}
