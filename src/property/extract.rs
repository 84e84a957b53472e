//! Field extraction: raw template text to typed values or deferred bindings

use crate::parser::parse_field;

use super::{PropKind, PropValue, PropertyBindings, PropertyError};

/// Extract one field into either a typed value or a deferred binding.
///
/// A field that is a single bare variable reference registers
/// variable → `name` in a copy of `bindings` and yields no value. A field
/// with no references coerces its literal per `kind`. Mixed literal and
/// variable content is rejected. The caller's `bindings` are untouched on
/// error; optional fields must be filtered out by the caller before this is
/// called, so empty input is always an error.
pub fn extract_single(
    raw: &str,
    name: &str,
    kind: PropKind,
    bindings: &PropertyBindings,
) -> Result<(PropertyBindings, Option<PropValue>), PropertyError> {
    let field = parse_field(raw).map_err(|source| PropertyError::Parse {
        name: name.to_string(),
        source,
    })?;
    if field.has_variables() {
        if !field.is_single_variable() {
            return Err(PropertyError::CompositeUnsupported {
                raw: raw.to_string(),
            });
        }
        let mut updated = bindings.clone();
        updated.bind(&field.variables[0], name);
        return Ok((updated, None));
    }
    let literal = &field.literals[0];
    let value = coerce_literal(literal, name, kind)?;
    Ok((bindings.clone(), Some(value)))
}

fn coerce_literal(text: &str, name: &str, kind: PropKind) -> Result<PropValue, PropertyError> {
    let coercion_error = || PropertyError::Coerce {
        name: name.to_string(),
        kind,
        text: text.to_string(),
    };
    match kind {
        PropKind::String => Ok(PropValue::String(text.to_string())),
        PropKind::Int => text
            .parse::<i64>()
            .map(PropValue::Int)
            .map_err(|_| coercion_error()),
        PropKind::Uint8 => text
            .parse::<u8>()
            .map(PropValue::Uint8)
            .map_err(|_| coercion_error()),
        PropKind::Float => text
            .parse::<f64>()
            .map(PropValue::Float)
            .map_err(|_| coercion_error()),
        PropKind::Bool => text
            .parse::<bool>()
            .map(PropValue::Bool)
            .map_err(|_| coercion_error()),
        PropKind::Duration => parse_duration(text)
            .map(PropValue::Duration)
            .ok_or_else(coercion_error),
    }
}

/// Parse a duration literal such as `1m30s`, `250ms` or `-1.5h`.
///
/// A duration is an optional sign followed by one or more decimal numbers,
/// each with a unit suffix: `ns`, `us`, `ms`, `s`, `m` or `h`. Bare numbers
/// carry no unit and are rejected.
pub fn parse_duration(text: &str) -> Option<chrono::Duration> {
    let (negative, mut rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    if rest.is_empty() {
        return None;
    }
    let mut total_nanos: i128 = 0;
    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let number: f64 = rest[..number_end].parse().ok()?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale: f64 = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3_600e9,
            _ => return None,
        };
        rest = &rest[unit_end..];
        total_nanos += (number * scale) as i128;
    }
    let nanos = i64::try_from(total_nanos).ok()?;
    Some(chrono::Duration::nanoseconds(if negative {
        -nanos
    } else {
        nanos
    }))
}

/// One candidate field in an exactly-one-of-N group.
#[derive(Debug, Clone, Copy)]
pub struct ExclusiveField<'a> {
    /// Raw field text from the template; empty means unset.
    pub raw: &'a str,
    /// Canonical property name.
    pub name: &'a str,
    /// Kind the literal must coerce to.
    pub kind: PropKind,
}

impl<'a> ExclusiveField<'a> {
    pub fn new(raw: &'a str, name: &'a str, kind: PropKind) -> Self {
        Self { raw, name, kind }
    }
}

/// Resolve an exactly-one-of-N candidate group.
///
/// Every candidate is extracted independently into an isolated scratch map.
/// A candidate succeeds when it either deferred to a variable or resolved a
/// literal without error; anything other than exactly one success is an
/// error naming all candidates. On success only the winner's scratch
/// bindings are merged into a copy of `bindings`, and the winner's value
/// (`None` when deferred) and index are returned.
pub fn extract_exclusive(
    candidates: &[ExclusiveField<'_>],
    bindings: &PropertyBindings,
) -> Result<(PropertyBindings, Option<PropValue>, usize), PropertyError> {
    let mut winner: Option<(PropertyBindings, Option<PropValue>, usize)> = None;
    let mut successes = 0;
    for (index, candidate) in candidates.iter().enumerate() {
        let scratch = PropertyBindings::new();
        match extract_single(candidate.raw, candidate.name, candidate.kind, &scratch) {
            Ok((scratch, value)) => {
                successes += 1;
                winner = Some((scratch, value, index));
            }
            Err(_) => {
                // A failed candidate is just "unset" here; exclusivity is
                // judged on the count of successes.
            }
        }
    }
    if successes != 1 {
        let names: Vec<&str> = candidates.iter().map(|c| c.name).collect();
        return Err(PropertyError::Exclusivity {
            candidates: names.join(","),
        });
    }
    let (scratch, value, index) = winner.expect("one success recorded");
    let mut merged = bindings.clone();
    merged.merge_from(&scratch);
    Ok((merged, value, index))
}
