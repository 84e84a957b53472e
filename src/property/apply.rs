//! Bulk application of caller-supplied values to deferred bindings

use crate::component::NamedValues;

use super::{PropertyBindings, PropertyError};

/// Apply a dictionary of named values against a binding map.
///
/// For each supplied name present in `bindings`, `set` is invoked once per
/// mapped slot in order, then the name is dropped from the returned map.
/// Names with no binding are ignored. The first setter failure aborts the
/// call; the caller's `bindings` are never modified, so a failed call can
/// simply keep its original component state.
pub fn apply_named_values(
    bindings: &PropertyBindings,
    values: &NamedValues,
    mut set: impl FnMut(&str, &crate::property::PropValue) -> Result<(), PropertyError>,
) -> Result<PropertyBindings, PropertyError> {
    let mut remaining = bindings.clone();
    for (name, value) in values {
        let Some(slots) = bindings.slots(name) else {
            continue;
        };
        for slot in slots {
            set(slot, value)?;
        }
        remaining.remove(name);
    }
    Ok(remaining)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::property::PropValue;

    use super::*;

    fn values(entries: &[(&str, PropValue)]) -> NamedValues {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_apply_sets_each_mapped_slot_once() {
        let mut bindings = PropertyBindings::new();
        bindings.bind("size", "width");
        bindings.bind("size", "height");
        bindings.bind("title", "content");

        let mut seen = Vec::new();
        let remaining = apply_named_values(
            &bindings,
            &values(&[("size", PropValue::Int(10))]),
            |slot, value| {
                seen.push((slot.to_string(), value.clone()));
                Ok(())
            },
        )
        .expect("Should apply");

        assert_eq!(
            seen,
            vec![
                ("width".to_string(), PropValue::Int(10)),
                ("height".to_string(), PropValue::Int(10)),
            ]
        );
        assert_eq!(remaining.len(), 1);
        assert!(remaining.slots("size").is_none());
        assert!(remaining.slots("title").is_some());
    }

    #[test]
    fn test_apply_ignores_unmatched_names() {
        let mut bindings = PropertyBindings::new();
        bindings.bind("title", "content");

        let remaining = apply_named_values(
            &bindings,
            &values(&[("unrelated", PropValue::Int(1))]),
            |_, _| panic!("setter must not run for unmatched names"),
        )
        .expect("Should apply");

        assert_eq!(remaining, bindings);
    }

    #[test]
    fn test_apply_empty_dictionary_is_a_no_op() {
        let mut bindings = PropertyBindings::new();
        bindings.bind("title", "content");

        let remaining =
            apply_named_values(&bindings, &NamedValues::new(), |_, _| Ok(()))
                .expect("Should apply");
        assert_eq!(remaining, bindings);
    }

    #[test]
    fn test_apply_stops_at_first_setter_failure() {
        let mut bindings = PropertyBindings::new();
        bindings.bind("a", "first");
        bindings.bind("b", "second");
        bindings.bind("c", "third");

        let mut calls = 0;
        let err = apply_named_values(
            &bindings,
            &values(&[
                ("a", PropValue::Int(1)),
                ("b", PropValue::Int(2)),
                ("c", PropValue::Int(3)),
            ]),
            |slot, _| {
                calls += 1;
                if slot == "second" {
                    return Err(PropertyError::UnknownSlot {
                        slot: slot.to_string(),
                    });
                }
                Ok(())
            },
        )
        .expect_err("Should fail");

        assert!(matches!(err, PropertyError::UnknownSlot { .. }));
        // "a" succeeded, "b" failed, "c" was never attempted.
        assert_eq!(calls, 2);
        // The input map is untouched.
        assert_eq!(bindings.len(), 3);
    }
}
