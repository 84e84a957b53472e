//! Timestamp component rendering a formatted time as fitted text

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::filesystem::FileSource;
use crate::property::{
    apply_named_values, extract_single, PropKind, PropValue, PropertyBindings, PropertyError,
};
use crate::render::{
    fit_text, Alignment, Canvas, CanvasError, FontFace, FontSource, Point, Rgba,
};

use super::text::{extract_font, load_font, FontDoc};
use super::{
    ensure_bound, extract_colour, extract_optional, set_colour_slot, ColourDoc, Component,
    ComponentError, LoadContext, NamedValues,
};

/// A formatted timestamp drawn like a text component.
///
/// The `time` field is a duration offset relative to the instant the
/// template was loaded, so templates can say "now", "in two hours" or
/// "ninety days ago" without embedding a wall-clock time.
#[derive(Debug, Clone)]
pub struct DatetimeComponent {
    bindings: PropertyBindings,
    time: Option<DateTime<Utc>>,
    time_format: String,
    start: Point,
    size: f64,
    max_width: i32,
    alignment: Alignment,
    face: Option<Arc<dyn FontFace>>,
    colour: Rgba,
    fonts: Arc<dyn FontSource>,
    files: Arc<dyn FileSource>,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DatetimeDoc {
    time: String,
    #[serde(rename = "timeFormat")]
    time_format: String,
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

impl DatetimeComponent {
    /// Decode datetime properties, deferring variable fields into bindings.
    pub fn from_document(
        context: &LoadContext,
        properties: &serde_json::Value,
    ) -> Result<Box<dyn Component>, ComponentError> {
        let doc: DatetimeDoc = serde_json::from_value(properties.clone())
            .map_err(|source| ComponentError::Document {
                kind: "datetime",
                source,
            })?;
        let mut component = DatetimeComponent {
            bindings: PropertyBindings::new(),
            time: None,
            time_format: String::new(),
            start: Point::default(),
            size: 0.0,
            max_width: 0,
            alignment: Alignment::default(),
            face: None,
            colour: Rgba::default(),
            fonts: context.fonts.clone(),
            files: context.files.clone(),
            loaded_at: context.loaded_at,
        };
        let mut bindings = PropertyBindings::new();

        let (updated, face) =
            extract_font(&doc.font, &bindings, &component.fonts, &component.files)?;
        bindings = updated;
        component.face = face;

        let (updated, value) = extract_single(&doc.time, "time", PropKind::Duration, &bindings)?;
        bindings = updated;
        if let Some(value) = value {
            component.time = Some(component.loaded_at + value.as_duration("time")?);
        }

        let (updated, value) =
            extract_single(&doc.time_format, "timeFormat", PropKind::String, &bindings)?;
        bindings = updated;
        if let Some(value) = value {
            component.time_format = value.as_str("timeFormat")?.to_string();
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

    fn formatted_time(&self) -> Result<String, CanvasError> {
        let Some(time) = self.time else {
            return Err(CanvasError::Draw {
                message: "datetime component has no time value".to_string(),
            });
        };
        let mut formatted = String::new();
        // chrono surfaces bad format strings through the Display impl.
        write!(formatted, "{}", time.format(&self.time_format)).map_err(|_| {
            CanvasError::Draw {
                message: format!("invalid time format '{}'", self.time_format),
            }
        })?;
        Ok(formatted)
    }

    fn set_slot(&mut self, slot: &str, value: &PropValue) -> Result<(), PropertyError> {
        match slot {
            "time" => self.time = Some(self.loaded_at + value.as_duration(slot)?),
            "timeFormat" => self.time_format = value.as_str(slot)?.to_string(),
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

impl Component for DatetimeComponent {
    fn kind(&self) -> &'static str {
        "datetime"
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
                message: "datetime component has no typeface".to_string(),
            });
        };
        let formatted = self.formatted_time()?;
        let fit = fit_text(
            &formatted,
            self.size,
            self.max_width,
            canvas.ppi(),
            self.alignment,
            |scale| canvas.try_text(&formatted, face.as_ref(), scale, self.max_width),
        )?;
        canvas.text(
            &formatted,
            Point::new(self.start.x + fit.offset, self.start.y),
            face.as_ref(),
            fit.scale,
            self.colour,
            self.max_width,
        )
    }
}
