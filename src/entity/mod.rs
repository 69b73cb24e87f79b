//! Attribute resolution over partially overlapping source fragments
//!
//! Several resource types unify two independently sourced attribute sets
//! (a control-plane entity body and an identity-provider profile body).
//! `Entity` resolves a declared property list against an ordered chain of
//! such fragments: the first source holding a non-null value wins, and
//! type-specific computed values override raw lookup entirely.

use serde_json::Value;

/// Ordered attribute dictionary.
///
/// `serde_json`'s `preserve_order` feature keeps insertion order end to end,
/// so manifests serialize byte-identically across runs.
pub type Attrs = serde_json::Map<String, Value>;

/// A typed view over one or more raw attribute dictionaries
pub struct Entity {
    sources: Vec<Attrs>,
}

impl Entity {
    /// Build an entity from an ordered list of source fragments
    pub fn new(sources: Vec<Attrs>) -> Self {
        Self { sources }
    }

    /// Build an entity from a single source fragment
    pub fn single(attrs: Attrs) -> Self {
        Self::new(vec![attrs])
    }

    /// Look an attribute up across the source chain.
    ///
    /// Sources are scanned in the order given; a null is treated as "no data
    /// here" and the scan continues. Absence is an expected outcome, not an
    /// error.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.sources
            .iter()
            .filter_map(|source| source.get(name))
            .find(|value| !value.is_null())
            .cloned()
    }

    /// Look up an attribute expected to hold a string
    pub fn lookup_str(&self, name: &str) -> Option<String> {
        self.lookup(name)
            .and_then(|value| value.as_str().map(str::to_string))
    }

    /// Resolve the declared property list into an ordered attribute map.
    ///
    /// For each property, a computed value takes precedence over raw lookup.
    /// Properties that resolve to nothing are omitted: the result is a sparse
    /// map that never carries null placeholders.
    pub fn collect(&self, properties: &[&str], computed: &Attrs) -> Attrs {
        let mut resolved = Attrs::new();
        for &prop in properties {
            let value = computed
                .get(prop)
                .filter(|value| !value.is_null())
                .cloned()
                .or_else(|| self.lookup(prop));
            if let Some(value) = value {
                resolved.insert(prop.to_string(), value);
            }
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attrs {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_lookup_scans_sources_in_order() {
        let primary = attrs(json!({"name": "from-primary", "only_primary": 1}));
        let secondary = attrs(json!({"name": "from-secondary", "only_secondary": 2}));
        let entity = Entity::new(vec![primary, secondary]);

        assert_eq!(entity.lookup("name"), Some(json!("from-primary")));
        assert_eq!(entity.lookup("only_primary"), Some(json!(1)));
        assert_eq!(entity.lookup("only_secondary"), Some(json!(2)));
        assert_eq!(entity.lookup("missing"), None);
    }

    #[test]
    fn test_lookup_skips_null_and_keeps_scanning() {
        let primary = attrs(json!({"origin": null}));
        let secondary = attrs(json!({"origin": "uaa"}));
        let entity = Entity::new(vec![primary, secondary]);

        assert_eq!(entity.lookup("origin"), Some(json!("uaa")));
    }

    #[test]
    fn test_collect_omits_absent_properties() {
        let entity = Entity::single(attrs(json!({"name": "a", "extra": true})));
        let resolved = entity.collect(&["name", "missing"], &Attrs::new());

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved.get("name"), Some(&json!("a")));
        assert!(!resolved.contains_key("missing"));
    }

    #[test]
    fn test_collect_never_contains_null() {
        let entity = Entity::single(attrs(json!({"name": "a", "status": null})));
        let resolved = entity.collect(&["name", "status"], &Attrs::new());

        assert!(!resolved.contains_key("status"));
        assert!(resolved.values().all(|v| !v.is_null()));
    }

    #[test]
    fn test_collect_keeps_false_values() {
        let entity = Entity::single(attrs(json!({"enabled": false})));
        let resolved = entity.collect(&["enabled"], &Attrs::new());

        assert_eq!(resolved.get("enabled"), Some(&json!(false)));
    }

    #[test]
    fn test_computed_takes_precedence_over_lookup() {
        let entity = Entity::single(attrs(json!({"name": "raw"})));
        let computed = attrs(json!({"name": "computed"}));
        let resolved = entity.collect(&["name"], &computed);

        assert_eq!(resolved.get("name"), Some(&json!("computed")));
    }

    #[test]
    fn test_collect_preserves_declared_order() {
        let entity = Entity::single(attrs(json!({"b": 2, "a": 1, "c": 3})));
        let resolved = entity.collect(&["a", "b", "c"], &Attrs::new());

        let keys: Vec<&String> = resolved.keys().collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }
}
