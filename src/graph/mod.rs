//! Type-specific resource loaders
//!
//! Each loader knows which nested collections its resource type owns, pulls
//! them through the fetcher, and folds everything into an ordered attribute
//! map via the shared entity resolution.

pub mod feature_flag;
pub mod organization;
pub mod quota;
pub mod security_group;
pub mod space;
pub mod user;
pub mod variable_group;

pub use feature_flag::FeatureFlag;
pub use organization::Organization;
pub use quota::Quota;
pub use security_group::{SecurityGroup, SecurityRule};
pub use space::Space;
pub use user::User;
pub use variable_group::VariableGroup;

use serde_json::Value;

use crate::entity::Attrs;

/// Map a collection of entity bodies to name-only reference objects.
///
/// Entries missing the name field are skipped rather than exported empty.
pub(crate) fn name_refs(entities: &[Attrs], name_field: &str) -> Vec<Value> {
    entities
        .iter()
        .filter_map(|entity| entity.get(name_field))
        .filter(|value| !value.is_null())
        .map(|value| {
            let mut reference = Attrs::new();
            reference.insert("name".to_string(), value.clone());
            Value::Object(reference)
        })
        .collect()
}
