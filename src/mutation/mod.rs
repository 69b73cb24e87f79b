//! Declarative manifest projection
//!
//! The mutation engine re-expresses the assembled snapshot in alternate
//! schemas. It is a pure projection over an immutable in-memory manifest:
//! no I/O, no fetches, no shared state. Two primitives cover the whole DSL:
//! `map_field` for scalars and `map_list_field` for list projection.

pub mod configurator;
pub mod terraform;

pub use configurator::ConfiguratorMutation;
pub use terraform::TerraformMutation;

use serde_json::Value;

use crate::entity::Attrs;
use crate::error::MutationError;

/// Options for a single scalar field projection
#[derive(Default)]
pub struct FieldMap<'a> {
    /// Source key, when it differs from the destination key
    pub source_key: Option<&'a str>,

    /// Omit the destination key silently when the source is absent. A
    /// non-optional field with no value and no default is a mapping-table
    /// error, not a recoverable condition.
    pub optional: bool,

    /// Value written when the source key is absent. Explicit tri-state:
    /// a present value always wins over the default, even when falsy.
    pub default: Option<Value>,

    /// Value remapping table consulted before the verbatim copy
    pub mapping: &'a [(Value, Value)],
}

/// Project one field from `source` into `dest` under `dest_key`.
///
/// Resolution order: remapped value, verbatim copy, declared default,
/// required-field violation (or silent omission when optional). A source
/// value of null counts as absent.
pub fn map_field(
    dest_key: &str,
    dest: &mut Attrs,
    source: &Attrs,
    opts: &FieldMap,
) -> Result<(), MutationError> {
    let source_key = opts.source_key.unwrap_or(dest_key);

    match source.get(source_key) {
        Some(value) if !value.is_null() => {
            let remapped = opts
                .mapping
                .iter()
                .find(|(from, _)| from == value)
                .map(|(_, to)| to.clone());
            dest.insert(dest_key.to_string(), remapped.unwrap_or_else(|| value.clone()));
            Ok(())
        }
        _ => {
            if let Some(default) = &opts.default {
                dest.insert(dest_key.to_string(), default.clone());
                Ok(())
            } else if opts.optional {
                Ok(())
            } else {
                Err(MutationError::RequiredField {
                    field: dest_key.to_string(),
                })
            }
        }
    }
}

/// Options for a list field projection
#[derive(Default)]
pub struct ListMap<'a> {
    /// Source key, when it differs from the destination key
    pub source_key: Option<&'a str>,

    /// Extract this key from each element before further processing
    pub key: Option<&'a str>,

    /// Per-element transform applied after key extraction
    pub key_fn: Option<fn(&Value) -> Value>,

    /// Template with a `{}` placeholder, formatting each element into a
    /// reference token string
    pub fmt: Option<&'a str>,
}

/// Project a list from `source` into `dest` under `dest_key`.
///
/// Always writes an array: an absent source key yields an empty one.
pub fn map_list_field(dest_key: &str, dest: &mut Attrs, source: &Attrs, opts: &ListMap) {
    let source_key = opts.source_key.unwrap_or(dest_key);
    let mut items = Vec::new();

    if let Some(Value::Array(elements)) = source.get(source_key) {
        for element in elements {
            let mut value = match opts.key {
                Some(key) => match element.get(key) {
                    Some(value) if !value.is_null() => value.clone(),
                    _ => continue,
                },
                None => element.clone(),
            };
            if let Some(key_fn) = opts.key_fn {
                value = key_fn(&value);
            }
            if let Some(template) = opts.fmt {
                value = format_token(template, &value);
            }
            items.push(value);
        }
    }

    dest.insert(dest_key.to_string(), Value::Array(items));
}

/// Substitute a value into the `{}` placeholder of a template
fn format_token(template: &str, value: &Value) -> Value {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Value::String(template.replacen("{}", &text, 1))
}

/// Derive a stable identifier from a human-readable resource name.
///
/// Replaces characters disallowed in downstream identifiers (`@`, `.`)
/// with an underscore.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c == '@' || c == '.' { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> Attrs {
        json!({
            "name": "resource_name",
            "property": "value",
            "none_property": null,
            "list_item": ["value1", "value2"]
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[test]
    fn test_map_field_copies_verbatim() {
        let mut dest = Attrs::new();
        map_field("name", &mut dest, &source(), &FieldMap::default()).unwrap();
        assert_eq!(dest.get("name"), Some(&json!("resource_name")));
    }

    #[test]
    fn test_map_field_renames_source_key() {
        let mut dest = Attrs::new();
        map_field(
            "mutated_name",
            &mut dest,
            &source(),
            &FieldMap {
                source_key: Some("name"),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(dest.get("mutated_name"), Some(&json!("resource_name")));
    }

    #[test]
    fn test_map_field_required_violation() {
        let mut dest = Attrs::new();
        let err = map_field("not_existent", &mut dest, &source(), &FieldMap::default())
            .unwrap_err();
        match err {
            MutationError::RequiredField { field } => assert_eq!(field, "not_existent"),
        }
    }

    #[test]
    fn test_map_field_optional_omits() {
        let mut dest = Attrs::new();
        map_field(
            "not_existent",
            &mut dest,
            &source(),
            &FieldMap {
                optional: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!dest.contains_key("not_existent"));
    }

    #[test]
    fn test_map_field_applies_default() {
        let mut dest = Attrs::new();
        map_field(
            "not_existent_w_default",
            &mut dest,
            &source(),
            &FieldMap {
                source_key: Some("not_existent"),
                optional: true,
                default: Some(json!("default")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(dest.get("not_existent_w_default"), Some(&json!("default")));
    }

    #[test]
    fn test_map_field_present_value_beats_default() {
        // Tri-state check: a present falsy value must not be replaced
        let source: Attrs = json!({"limit": 0}).as_object().unwrap().clone();
        let mut dest = Attrs::new();
        map_field(
            "limit",
            &mut dest,
            &source,
            &FieldMap {
                default: Some(json!(-1)),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(dest.get("limit"), Some(&json!(0)));
    }

    #[test]
    fn test_map_field_value_remapping() {
        let mut dest = Attrs::new();
        map_field(
            "mapped_property",
            &mut dest,
            &source(),
            &FieldMap {
                source_key: Some("property"),
                mapping: &[(json!("value"), json!("mapped_value"))],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(dest.get("mapped_property"), Some(&json!("mapped_value")));
    }

    #[test]
    fn test_map_field_null_source_counts_as_absent() {
        let mut dest = Attrs::new();
        map_field(
            "none_property",
            &mut dest,
            &source(),
            &FieldMap {
                optional: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(!dest.contains_key("none_property"));
    }

    #[test]
    fn test_map_list_field_copies_elements() {
        let mut dest = Attrs::new();
        map_list_field("list_item", &mut dest, &source(), &ListMap::default());
        assert_eq!(dest.get("list_item"), Some(&json!(["value1", "value2"])));
    }

    #[test]
    fn test_map_list_field_formats_elements() {
        let mut dest = Attrs::new();
        map_list_field(
            "list_item",
            &mut dest,
            &source(),
            &ListMap {
                fmt: Some("fmt_{}"),
                ..Default::default()
            },
        );
        assert_eq!(
            dest.get("list_item"),
            Some(&json!(["fmt_value1", "fmt_value2"]))
        );
    }

    #[test]
    fn test_map_list_field_applies_key_fn() {
        fn mapped(_: &Value) -> Value {
            json!("mapped")
        }

        let mut dest = Attrs::new();
        map_list_field(
            "list_item",
            &mut dest,
            &source(),
            &ListMap {
                key_fn: Some(mapped),
                ..Default::default()
            },
        );
        assert_eq!(dest.get("list_item"), Some(&json!(["mapped", "mapped"])));
    }

    #[test]
    fn test_map_list_field_absent_source_yields_empty_array() {
        let mut dest = Attrs::new();
        map_list_field("not_existent", &mut dest, &source(), &ListMap::default());
        assert_eq!(dest.get("not_existent"), Some(&json!([])));
    }

    #[test]
    fn test_map_list_field_extracts_key() {
        let source: Attrs = json!({"managers": [{"name": "alice@example.com"}]})
            .as_object()
            .unwrap()
            .clone();
        let mut dest = Attrs::new();
        map_list_field(
            "managers",
            &mut dest,
            &source,
            &ListMap {
                key: Some("name"),
                ..Default::default()
            },
        );
        assert_eq!(dest.get("managers"), Some(&json!(["alice@example.com"])));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("alice@example.com"), "alice_example_com");
        assert_eq!(sanitize_name("plain-name"), "plain-name");
    }
}
