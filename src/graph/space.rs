//! Space loader

use serde_json::Value;

use super::name_refs;
use crate::entity::{Attrs, Entity};
use crate::error::Result;
use crate::fetcher::ResourceFetcher;

/// Role collections a space owns, with the URL field each is fetched from
const ROLE_COLLECTIONS: &[(&str, &str)] = &[
    ("developers", "developers_url"),
    ("managers", "managers_url"),
    ("auditors", "auditors_url"),
];

/// A deployment scope nested under an organization
pub struct Space<'a> {
    entity: Entity,
    fetcher: &'a ResourceFetcher,
}

impl<'a> Space<'a> {
    pub const PROPERTIES: &'static [&'static str] = &[
        "name",
        "allow_ssh",
        "developers",
        "managers",
        "auditors",
        "security_groups",
    ];

    pub fn new(attrs: Attrs, fetcher: &'a ResourceFetcher) -> Self {
        Self {
            entity: Entity::single(attrs),
            fetcher,
        }
    }

    pub async fn load(&self) -> Result<Attrs> {
        let mut computed = Attrs::new();

        for &(prop, url_field) in ROLE_COLLECTIONS {
            if let Some(url) = self.entity.lookup_str(url_field) {
                let members = self.fetcher.entity_list(&url).await?;
                let refs = name_refs(&members, "username");
                if !refs.is_empty() {
                    computed.insert(prop.to_string(), Value::Array(refs));
                }
            }
        }

        if let Some(url) = self.entity.lookup_str("security_groups_url") {
            let groups = self.security_groups(&url).await?;
            if !groups.is_empty() {
                computed.insert("security_groups".to_string(), Value::Array(groups));
            }
        }

        Ok(self.entity.collect(Self::PROPERTIES, &computed))
    }

    /// Name references for the groups explicitly bound to this space.
    ///
    /// Groups flagged as the platform-wide running default apply everywhere,
    /// so listing them per space would be noise; they are filtered out. The
    /// remaining names are deduplicated, first occurrence wins.
    async fn security_groups(&self, url: &str) -> Result<Vec<Value>> {
        let groups = self.fetcher.entity_list(url).await?;

        let mut seen = std::collections::HashSet::new();
        let refs = groups
            .iter()
            .filter(|group| {
                group
                    .get("running_default")
                    .and_then(Value::as_bool)
                    .is_none_or(|default| !default)
            })
            .filter_map(|group| group.get("name").and_then(Value::as_str))
            .filter(|name| seen.insert(name.to_string()))
            .map(|name| {
                let mut reference = Attrs::new();
                reference.insert("name".to_string(), Value::String(name.to_string()));
                Value::Object(reference)
            })
            .collect();

        Ok(refs)
    }
}
