//! Typed component properties and the variable binding protocol
//!
//! Template fields are always textual. At load time each field either
//! coerces directly to a typed value or defers to a named variable; deferred
//! fields are tracked in a [`PropertyBindings`] map from variable name to the
//! internal property slots it must fill. Callers later supply real values
//! through the bulk-apply protocol in [`apply`].

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::parser::FieldError;

mod apply;
mod extract;

pub use apply::apply_named_values;
pub use extract::{extract_exclusive, extract_single, parse_duration, ExclusiveField};

/// The types a template field can coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Int,
    String,
    Bool,
    Uint8,
    Float,
    Duration,
}

impl fmt::Display for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropKind::Int => "integer",
            PropKind::String => "string",
            PropKind::Bool => "bool",
            PropKind::Uint8 => "uint8",
            PropKind::Float => "float",
            PropKind::Duration => "duration",
        };
        f.write_str(name)
    }
}

/// A runtime property value, either coerced from a literal at load time or
/// supplied by the caller for a deferred variable.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Int(i64),
    String(String),
    Bool(bool),
    Uint8(u8),
    Float(f64),
    Duration(chrono::Duration),
}

impl PropValue {
    /// The kind tag of this value.
    pub fn kind(&self) -> PropKind {
        match self {
            PropValue::Int(_) => PropKind::Int,
            PropValue::String(_) => PropKind::String,
            PropValue::Bool(_) => PropKind::Bool,
            PropValue::Uint8(_) => PropKind::Uint8,
            PropValue::Float(_) => PropKind::Float,
            PropValue::Duration(_) => PropKind::Duration,
        }
    }

    /// Short name of the runtime type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PropValue::Int(_) => "integer",
            PropValue::String(_) => "string",
            PropValue::Bool(_) => "bool",
            PropValue::Uint8(_) => "uint8",
            PropValue::Float(_) => "float",
            PropValue::Duration(_) => "duration",
        }
    }

    /// Coerce to a coordinate-sized integer for the named slot.
    pub fn as_int(&self, slot: &str) -> Result<i32, PropertyError> {
        match self {
            PropValue::Int(value) => i32::try_from(*value).map_err(|_| PropertyError::Setter {
                slot: slot.to_string(),
                message: format!("integer {value} is out of range"),
            }),
            other => Err(setter_type_error(slot, "integer", other)),
        }
    }

    /// Coerce to an unsigned channel value for the named slot. Plain
    /// integers in range are accepted so callers do not need to tag channel
    /// values specially.
    pub fn as_uint8(&self, slot: &str) -> Result<u8, PropertyError> {
        match self {
            PropValue::Uint8(value) => Ok(*value),
            PropValue::Int(value) => u8::try_from(*value).map_err(|_| PropertyError::Setter {
                slot: slot.to_string(),
                message: format!("integer {value} is out of range for a channel value"),
            }),
            other => Err(setter_type_error(slot, "uint8", other)),
        }
    }

    /// Coerce to a float for the named slot.
    pub fn as_float(&self, slot: &str) -> Result<f64, PropertyError> {
        match self {
            PropValue::Float(value) => Ok(*value),
            other => Err(setter_type_error(slot, "float", other)),
        }
    }

    /// Coerce to a string slice for the named slot.
    pub fn as_str(&self, slot: &str) -> Result<&str, PropertyError> {
        match self {
            PropValue::String(value) => Ok(value),
            other => Err(setter_type_error(slot, "string", other)),
        }
    }

    /// Coerce to a bool for the named slot.
    pub fn as_bool(&self, slot: &str) -> Result<bool, PropertyError> {
        match self {
            PropValue::Bool(value) => Ok(*value),
            other => Err(setter_type_error(slot, "bool", other)),
        }
    }

    /// Coerce to a duration for the named slot.
    pub fn as_duration(&self, slot: &str) -> Result<chrono::Duration, PropertyError> {
        match self {
            PropValue::Duration(value) => Ok(*value),
            other => Err(setter_type_error(slot, "duration", other)),
        }
    }
}

fn setter_type_error(slot: &str, expected: &str, actual: &PropValue) -> PropertyError {
    PropertyError::Setter {
        slot: slot.to_string(),
        message: format!("expected {expected}, got {}", actual.type_name()),
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(i64::from(value))
    }
}

impl From<u8> for PropValue {
    fn from(value: u8) -> Self {
        PropValue::Uint8(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::String(value.to_string())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::String(value)
    }
}

/// Map from variable name to the ordered internal property slots it fills.
///
/// One variable may fan out to several slots. The map is created at load
/// time and only ever shrinks as values are applied; an empty map means the
/// owning component needs no further substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyBindings {
    map: BTreeMap<String, Vec<String>>,
}

impl PropertyBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Record that `variable` must fill `slot` when a value arrives.
    pub fn bind(&mut self, variable: &str, slot: &str) {
        self.map
            .entry(variable.to_string())
            .or_default()
            .push(slot.to_string());
    }

    /// The slots mapped to `variable`, if any.
    pub fn slots(&self, variable: &str) -> Option<&[String]> {
        self.map.get(variable).map(Vec::as_slice)
    }

    /// Drop a variable once its value has been applied.
    pub fn remove(&mut self, variable: &str) {
        self.map.remove(variable);
    }

    /// All bound variable names, in sorted order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Append every binding from `other`, preserving slot order.
    pub fn merge_from(&mut self, other: &PropertyBindings) {
        for (variable, slots) in &other.map {
            let entry = self.map.entry(variable.clone()).or_default();
            entry.extend(slots.iter().cloned());
        }
    }

    /// Comma-joined variable names, for error messages.
    pub fn variable_list(&self) -> String {
        self.map.keys().cloned().collect::<Vec<_>>().join(",")
    }
}

/// Errors from the property resolution protocol.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PropertyError {
    /// The raw field text was malformed.
    #[error("error parsing data for property {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: FieldError,
    },

    /// The field mixed literal text and variable references, or referenced
    /// more than one variable.
    #[error("composite properties are not yet supported: {raw}")]
    CompositeUnsupported { raw: String },

    /// The literal text did not coerce to the expected kind.
    #[error("failed to convert property {name} to {kind}: '{text}'")]
    Coerce {
        name: String,
        kind: PropKind,
        text: String,
    },

    /// Zero or more than one of a set of exclusive candidates was set.
    #[error("exactly one of ({candidates}) must be set")]
    Exclusivity { candidates: String },

    /// A component rejected a value during bulk apply.
    #[error("failed to set property {slot}: {message}")]
    Setter { slot: String, message: String },

    /// A binding named a slot the component does not have.
    #[error("invalid component property in named property map: {slot}")]
    UnknownSlot { slot: String },
}
