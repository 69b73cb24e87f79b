//! Environment variable group loader
//!
//! Variable groups bypass the fixed-property loader entirely: the decoded
//! body is a free-form bag of key/value pairs and is exported as-is, minus
//! any keys matching the configured exclusion prefixes.

use crate::entity::Attrs;

/// A free-form bag of environment key/value pairs
pub struct VariableGroup {
    attrs: Attrs,
}

impl VariableGroup {
    pub fn new(attrs: Attrs) -> Self {
        Self { attrs }
    }

    /// Load, dropping keys whose lowercase form starts with any of the
    /// given prefixes (matched case-insensitively). With no prefixes this
    /// is a pure pass-through.
    pub fn load_filtered(&self, exclude_prefixes: &[String]) -> Attrs {
        let prefixes: Vec<String> = exclude_prefixes
            .iter()
            .filter(|prefix| !prefix.is_empty())
            .map(|prefix| prefix.to_lowercase())
            .collect();

        self.attrs
            .iter()
            .filter(|(key, _)| {
                let key = key.to_lowercase();
                !prefixes.iter().any(|prefix| key.starts_with(prefix))
            })
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}
