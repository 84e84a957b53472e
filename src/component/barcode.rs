//! Barcode component delegating symbol encoding to the canvas

use serde::Deserialize;

use crate::property::{
    apply_named_values, extract_single, PropKind, PropValue, PropertyBindings, PropertyError,
};
use crate::render::{BarcodeKind, Canvas, CanvasError, Point, Rgba};

use super::{
    ensure_bound, extract_colour, set_colour_slot, ColourDoc, Component, ComponentError,
    LoadContext, NamedValues,
};

/// A barcode with separate data and background colours.
///
/// The component resolves content, symbology and geometry; turning content
/// into bars or modules is the canvas collaborator's concern.
#[derive(Debug, Clone)]
pub struct BarcodeComponent {
    bindings: PropertyBindings,
    content: String,
    symbology: Option<BarcodeKind>,
    top_left: Point,
    width: i32,
    height: i32,
    data_colour: Rgba,
    background_colour: Rgba,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BarcodeDoc {
    content: String,
    #[serde(rename = "barcodeType")]
    barcode_type: String,
    #[serde(rename = "topLeftX")]
    top_left_x: String,
    #[serde(rename = "topLeftY")]
    top_left_y: String,
    width: String,
    height: String,
    #[serde(rename = "dataColour")]
    data_colour: ColourDoc,
    #[serde(rename = "backgroundColour")]
    background_colour: ColourDoc,
}

fn parse_symbology(name: &str) -> Result<BarcodeKind, CanvasError> {
    BarcodeKind::from_name(name).ok_or_else(|| CanvasError::UnknownBarcodeKind {
        name: name.to_string(),
    })
}

impl BarcodeComponent {
    /// Decode barcode properties, deferring variable fields into bindings.
    pub fn from_document(
        _context: &LoadContext,
        properties: &serde_json::Value,
    ) -> Result<Box<dyn Component>, ComponentError> {
        let doc: BarcodeDoc = serde_json::from_value(properties.clone())
            .map_err(|source| ComponentError::Document {
                kind: "barcode",
                source,
            })?;
        let mut component = BarcodeComponent {
            bindings: PropertyBindings::new(),
            content: String::new(),
            symbology: None,
            top_left: Point::default(),
            width: 0,
            height: 0,
            data_colour: Rgba::default(),
            background_colour: Rgba::default(),
        };
        let mut bindings = PropertyBindings::new();

        let (updated, value) =
            extract_single(&doc.barcode_type, "barcodeType", PropKind::String, &bindings)?;
        bindings = updated;
        if let Some(value) = value {
            component.symbology = Some(parse_symbology(value.as_str("barcodeType")?)?);
        }

        let (updated, value) =
            extract_single(&doc.content, "content", PropKind::String, &bindings)?;
        bindings = updated;
        if let Some(value) = value {
            component.content = value.as_str("content")?.to_string();
        }

        for (raw, slot) in [
            (&doc.top_left_x, "topLeftX"),
            (&doc.top_left_y, "topLeftY"),
            (&doc.width, "width"),
            (&doc.height, "height"),
        ] {
            let (updated, value) = extract_single(raw, slot, PropKind::Int, &bindings)?;
            bindings = updated;
            if let Some(value) = value {
                let parsed = value.as_int(slot)?;
                match slot {
                    "topLeftX" => component.top_left.x = parsed,
                    "topLeftY" => component.top_left.y = parsed,
                    "width" => component.width = parsed,
                    _ => component.height = parsed,
                }
            }
        }

        let (updated, colour) = extract_colour(&doc.data_colour, "d", &bindings)?;
        bindings = updated;
        component.data_colour = colour;

        let (updated, colour) = extract_colour(&doc.background_colour, "b", &bindings)?;
        bindings = updated;
        component.background_colour = colour;

        component.bindings = bindings;
        Ok(Box::new(component))
    }

    fn set_slot(&mut self, slot: &str, value: &PropValue) -> Result<(), PropertyError> {
        match slot {
            "content" => self.content = value.as_str(slot)?.to_string(),
            "barcodeType" => {
                let symbology = parse_symbology(value.as_str(slot)?).map_err(|err| {
                    PropertyError::Setter {
                        slot: slot.to_string(),
                        message: err.to_string(),
                    }
                })?;
                self.symbology = Some(symbology);
            }
            "topLeftX" => self.top_left.x = value.as_int(slot)?,
            "topLeftY" => self.top_left.y = value.as_int(slot)?,
            "width" => self.width = value.as_int(slot)?,
            "height" => self.height = value.as_int(slot)?,
            "dR" | "dG" | "dB" | "dA" => {
                set_colour_slot(&mut self.data_colour, &slot[1..], value, slot)?
            }
            "bR" | "bG" | "bB" | "bA" => {
                set_colour_slot(&mut self.background_colour, &slot[1..], value, slot)?
            }
            _ => {
                return Err(PropertyError::UnknownSlot {
                    slot: slot.to_string(),
                })
            }
        }
        Ok(())
    }
}

impl Component for BarcodeComponent {
    fn kind(&self) -> &'static str {
        "barcode"
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
        let Some(symbology) = self.symbology else {
            return Err(CanvasError::Draw {
                message: "barcode component has no symbology".to_string(),
            });
        };
        canvas.barcode(
            symbology,
            self.content.as_bytes(),
            self.top_left,
            self.width,
            self.height,
            self.data_colour,
            self.background_colour,
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::render::{MockCall, MockCanvas};

    use super::*;

    fn barcode_properties() -> serde_json::Value {
        json!({
            "content": "https://example.com",
            "barcodeType": "qr",
            "topLeftX": "10",
            "topLeftY": "20",
            "width": "100",
            "height": "100",
            "dataColour": {"R": "0", "G": "0", "B": "0", "A": "255"},
            "backgroundColour": {"R": "255", "G": "255", "B": "255", "A": "255"}
        })
    }

    #[test]
    fn test_barcode_draws_through_canvas() {
        let component = BarcodeComponent::from_document(&LoadContext::new(), &barcode_properties())
            .expect("Should decode");
        assert!(component.bindings().is_empty());

        let mock = MockCanvas::new(200, 200);
        component.write(&mock).expect("Should draw");
        assert_eq!(
            mock.calls(),
            vec![MockCall::Barcode {
                kind: BarcodeKind::Qr,
                content: b"https://example.com".to_vec(),
                top_left: Point::new(10, 20),
                width: 100,
                height: 100,
            }]
        );
    }

    #[test]
    fn test_unknown_symbology_errors_at_load() {
        let mut properties = barcode_properties();
        properties["barcodeType"] = json!("upc");
        let err = BarcodeComponent::from_document(&LoadContext::new(), &properties)
            .expect_err("Should fail");
        assert_eq!(err.to_string(), "unknown barcode type upc");
    }

    #[test]
    fn test_colour_channels_stay_distinct_per_group() {
        let mut properties = barcode_properties();
        properties["dataColour"] = json!({"R": "$ink$", "G": "0", "B": "0", "A": "255"});
        properties["backgroundColour"] = json!({"R": "$paper$", "G": "255", "B": "255", "A": "255"});
        let component = BarcodeComponent::from_document(&LoadContext::new(), &properties)
            .expect("Should decode");
        assert_eq!(
            component.bindings().slots("ink"),
            Some(&["dR".to_string()][..])
        );
        assert_eq!(
            component.bindings().slots("paper"),
            Some(&["bR".to_string()][..])
        );

        let values: NamedValues = [
            ("ink".to_string(), PropValue::Uint8(10)),
            ("paper".to_string(), PropValue::Uint8(240)),
        ]
        .into();
        let resolved = component.set_named_values(&values).expect("Should apply");
        assert!(resolved.bindings().is_empty());

        let mock = MockCanvas::new(200, 200);
        resolved.write(&mock).expect("Should draw");
        assert_eq!(mock.calls().len(), 1);
    }
}
