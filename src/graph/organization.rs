//! Organization loader

use serde_json::Value;

use super::{Space, name_refs};
use crate::entity::{Attrs, Entity};
use crate::error::Result;
use crate::fetcher::ResourceFetcher;

/// Role collections an organization owns, with the URL field each is
/// fetched from
const ROLE_COLLECTIONS: &[(&str, &str)] = &[
    ("users", "users_url"),
    ("managers", "managers_url"),
    ("billing_managers", "billing_managers_url"),
    ("auditors", "auditors_url"),
];

/// A billing/administrative tenant boundary
pub struct Organization<'a> {
    entity: Entity,
    fetcher: &'a ResourceFetcher,
}

impl<'a> Organization<'a> {
    pub const PROPERTIES: &'static [&'static str] = &[
        "name",
        "quota",
        "private_domains",
        "spaces",
        "users",
        "managers",
        "billing_managers",
        "auditors",
    ];

    pub fn new(attrs: Attrs, fetcher: &'a ResourceFetcher) -> Self {
        Self {
            entity: Entity::single(attrs),
            fetcher,
        }
    }

    /// Load the organization and everything it owns, depth-first.
    ///
    /// Spaces are fully loaded and embedded as copies in the order the
    /// remote collection returned them. The quota reference collapses to its
    /// scalar name; the full quota definition is exported separately at the
    /// top level.
    pub async fn load(&self) -> Result<Attrs> {
        let mut computed = Attrs::new();

        if let Some(url) = self.entity.lookup_str("quota_definition_url") {
            let quotas = self.fetcher.entity_list(&url).await?;
            if let Some(name) = quotas
                .first()
                .and_then(|quota| quota.get("name"))
                .filter(|name| !name.is_null())
            {
                computed.insert("quota".to_string(), name.clone());
            }
        }

        if let Some(url) = self.entity.lookup_str("private_domains_url") {
            let domains = self.fetcher.entity_list(&url).await?;
            let names: Vec<Value> = domains
                .iter()
                .filter_map(|domain| domain.get("name"))
                .filter(|name| !name.is_null())
                .cloned()
                .collect();
            if !names.is_empty() {
                computed.insert("private_domains".to_string(), Value::Array(names));
            }
        }

        if let Some(url) = self.entity.lookup_str("spaces_url") {
            let mut spaces = Vec::new();
            for attrs in self.fetcher.entity_list(&url).await? {
                let space = Space::new(attrs, self.fetcher);
                spaces.push(Value::Object(space.load().await?));
            }
            if !spaces.is_empty() {
                computed.insert("spaces".to_string(), Value::Array(spaces));
            }
        }

        for &(prop, url_field) in ROLE_COLLECTIONS {
            if let Some(url) = self.entity.lookup_str(url_field) {
                let members = self.fetcher.entity_list(&url).await?;
                let refs = name_refs(&members, "username");
                if !refs.is_empty() {
                    computed.insert(prop.to_string(), Value::Array(refs));
                }
            }
        }

        Ok(self.entity.collect(Self::PROPERTIES, &computed))
    }
}
