//! Circle component with customisable centre, radius and colour

use serde::Deserialize;

use crate::property::{
    apply_named_values, extract_single, PropKind, PropValue, PropertyBindings, PropertyError,
};
use crate::render::{Canvas, CanvasError, Point, Rgba};

use super::{
    ensure_bound, extract_colour, set_colour_slot, ColourDoc, Component, ComponentError,
    LoadContext, NamedValues,
};

/// A filled circle positioned by its centre point.
#[derive(Debug, Clone, Default)]
pub struct CircleComponent {
    bindings: PropertyBindings,
    centre: Point,
    radius: i32,
    colour: Rgba,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CircleDoc {
    #[serde(rename = "centreX")]
    centre_x: String,
    #[serde(rename = "centreY")]
    centre_y: String,
    radius: String,
    colour: ColourDoc,
}

impl CircleComponent {
    /// Decode circle properties, deferring variable fields into bindings.
    pub fn from_document(
        _context: &LoadContext,
        properties: &serde_json::Value,
    ) -> Result<Box<dyn Component>, ComponentError> {
        let doc: CircleDoc = serde_json::from_value(properties.clone())
            .map_err(|source| ComponentError::Document {
                kind: "circle",
                source,
            })?;
        let mut component = CircleComponent::default();
        let mut bindings = PropertyBindings::new();

        for (raw, slot, field) in [
            (&doc.centre_x, "centreX", &mut component.centre.x),
            (&doc.centre_y, "centreY", &mut component.centre.y),
            (&doc.radius, "radius", &mut component.radius),
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
            "centreX" => self.centre.x = value.as_int(slot)?,
            "centreY" => self.centre.y = value.as_int(slot)?,
            "radius" => self.radius = value.as_int(slot)?,
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

impl Component for CircleComponent {
    fn kind(&self) -> &'static str {
        "circle"
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
        canvas.circle(self.centre, self.radius, self.colour)
    }
}
