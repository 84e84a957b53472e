//! Rectangle component with customisable position, size and colour

use serde::Deserialize;

use crate::property::{
    apply_named_values, extract_single, PropKind, PropValue, PropertyBindings, PropertyError,
};
use crate::render::{Canvas, CanvasError, Point, Rgba};

use super::{
    ensure_bound, extract_colour, set_colour_slot, ColourDoc, Component, ComponentError,
    LoadContext, NamedValues,
};

/// A filled axis-aligned rectangle.
#[derive(Debug, Clone, Default)]
pub struct RectangleComponent {
    bindings: PropertyBindings,
    top_left: Point,
    width: i32,
    height: i32,
    colour: Rgba,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RectangleDoc {
    #[serde(rename = "topLeftX")]
    top_left_x: String,
    #[serde(rename = "topLeftY")]
    top_left_y: String,
    width: String,
    height: String,
    colour: ColourDoc,
}

impl RectangleComponent {
    /// Decode rectangle properties, deferring variable fields into bindings.
    pub fn from_document(
        _context: &LoadContext,
        properties: &serde_json::Value,
    ) -> Result<Box<dyn Component>, ComponentError> {
        let doc: RectangleDoc = serde_json::from_value(properties.clone())
            .map_err(|source| ComponentError::Document {
                kind: "rectangle",
                source,
            })?;
        let mut component = RectangleComponent::default();
        let mut bindings = PropertyBindings::new();

        for (raw, slot, field) in [
            (&doc.top_left_x, "topLeftX", &mut component.top_left.x),
            (&doc.top_left_y, "topLeftY", &mut component.top_left.y),
            (&doc.width, "width", &mut component.width),
            (&doc.height, "height", &mut component.height),
        ] {
            let (updated, value) = extract_single(raw, slot, PropKind::Int, &bindings)?;
            bindings = updated;
            if let Some(value) = value {
                *field = value.as_int(slot)?;
            }
        }

        let (updated, colour) = extract_colour(&doc.colour, "", &bindings)?;
        bindings = updated;
        component.colour = colour;
        component.bindings = bindings;
        Ok(Box::new(component))
    }

    fn set_slot(&mut self, slot: &str, value: &PropValue) -> Result<(), PropertyError> {
        match slot {
            "topLeftX" => self.top_left.x = value.as_int(slot)?,
            "topLeftY" => self.top_left.y = value.as_int(slot)?,
            "width" => self.width = value.as_int(slot)?,
            "height" => self.height = value.as_int(slot)?,
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

impl Component for RectangleComponent {
    fn kind(&self) -> &'static str {
        "rectangle"
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
        canvas.rectangle(self.top_left, self.width, self.height, self.colour)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::render::{MockCall, MockCanvas};

    use super::*;

    #[test]
    fn test_literal_rectangle_draws() {
        let properties = json!({
            "topLeftX": "5",
            "topLeftY": "10",
            "width": "20",
            "height": "30",
            "colour": {"R": "1", "G": "2", "B": "3", "A": "255"}
        });
        let component = RectangleComponent::from_document(&LoadContext::new(), &properties)
            .expect("Should decode");
        assert!(component.bindings().is_empty());

        let mock = MockCanvas::new(100, 100);
        component.write(&mock).expect("Should draw");
        assert_eq!(
            mock.calls(),
            vec![MockCall::Rectangle {
                top_left: Point::new(5, 10),
                width: 20,
                height: 30,
                colour: Rgba::new(1, 2, 3, 255),
            }]
        );
    }

    #[test]
    fn test_one_variable_fans_out_to_both_dimensions() {
        let properties = json!({
            "topLeftX": "0",
            "topLeftY": "0",
            "width": "$side$",
            "height": "$side$",
            "colour": {"R": "0", "G": "0", "B": "0", "A": "255"}
        });
        let component = RectangleComponent::from_document(&LoadContext::new(), &properties)
            .expect("Should decode");
        assert_eq!(
            component.bindings().slots("side"),
            Some(&["width".to_string(), "height".to_string()][..])
        );

        let values: NamedValues = [("side".to_string(), PropValue::Int(42))].into();
        let resolved = component.set_named_values(&values).expect("Should apply");
        assert!(resolved.bindings().is_empty());

        let mock = MockCanvas::new(100, 100);
        resolved.write(&mock).expect("Should draw");
        assert_eq!(
            mock.calls(),
            vec![MockCall::Rectangle {
                top_left: Point::new(0, 0),
                width: 42,
                height: 42,
                colour: Rgba::new(0, 0, 0, 255),
            }]
        );
    }

    #[test]
    fn test_irrelevant_values_leave_component_unchanged() {
        let properties = json!({
            "topLeftX": "0",
            "topLeftY": "0",
            "width": "$side$",
            "height": "$side$",
            "colour": {"R": "0", "G": "0", "B": "0", "A": "255"}
        });
        let component = RectangleComponent::from_document(&LoadContext::new(), &properties)
            .expect("Should decode");
        let values: NamedValues = [("other".to_string(), PropValue::Int(1))].into();
        let applied = component.set_named_values(&values).expect("Should apply");
        assert_eq!(applied.bindings(), component.bindings());
    }
}
