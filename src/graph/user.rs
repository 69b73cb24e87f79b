//! User loader
//!
//! A user is the correlation of two source fragments: the control-plane
//! account body and the identity-provider profile body. Most scalar fields
//! resolve from whichever fragment has them; the home space/org pair is
//! resolved by following the default-space reference chain.

use serde_json::Value;

use crate::entity::{Attrs, Entity};
use crate::error::Result;
use crate::fetcher::ResourceFetcher;

/// An identity-provider account correlated with a control-plane account
pub struct User<'a> {
    entity: Entity,
    fetcher: &'a ResourceFetcher,
}

impl<'a> User<'a> {
    pub const PROPERTIES: &'static [&'static str] = &[
        "name",
        "active",
        "email",
        "given_name",
        "family_name",
        "default_organization",
        "default_space",
        "origin",
        "external_id",
    ];

    /// Both fragments are required; the control-plane body is consulted
    /// first on overlapping fields.
    pub fn new(cloud_attrs: Attrs, profile_attrs: Attrs, fetcher: &'a ResourceFetcher) -> Self {
        Self {
            entity: Entity::new(vec![cloud_attrs, profile_attrs]),
            fetcher,
        }
    }

    pub async fn load(&self) -> Result<Attrs> {
        let mut computed = Attrs::new();

        if let Some(user_name) = self.entity.lookup("userName") {
            computed.insert("name".to_string(), user_name);
        }
        if let Some(external_id) = self.entity.lookup("externalId") {
            computed.insert("external_id".to_string(), external_id);
        }

        // The profile's `name` field is a structured given/family pair, not
        // the account name.
        if let Some(Value::Object(profile_name)) = self.entity.lookup("name") {
            if let Some(given) = profile_name.get("givenName").filter(|v| !v.is_null()) {
                computed.insert("given_name".to_string(), given.clone());
            }
            if let Some(family) = profile_name.get("familyName").filter(|v| !v.is_null()) {
                computed.insert("family_name".to_string(), family.clone());
            }
        }

        if let Some(email) = self.email() {
            computed.insert("email".to_string(), email);
        }

        if let Some((space_name, org_name)) = self.default_scope().await? {
            computed.insert("default_organization".to_string(), org_name);
            computed.insert("default_space".to_string(), space_name);
        }

        Ok(self.entity.collect(Self::PROPERTIES, &computed))
    }

    /// Primary email address, falling back to the first listed
    fn email(&self) -> Option<Value> {
        let emails = self.entity.lookup("emails")?;
        let emails = emails.as_array()?;

        let primary = emails.iter().find(|email| {
            email
                .get("primary")
                .and_then(Value::as_bool)
                .unwrap_or(false)
        });

        primary
            .or_else(|| emails.first())
            .and_then(|email| email.get("value"))
            .filter(|value| !value.is_null())
            .cloned()
    }

    /// Resolve the default space/org pair by following the reference chain.
    ///
    /// Populated only when the whole chain holds: the space exists, has a
    /// name, carries an organization reference, and that organization
    /// resolves to a name. Any break leaves both fields absent; a partially
    /// populated pair is never exported.
    async fn default_scope(&self) -> Result<Option<(Value, Value)>> {
        let Some(space_url) = self.entity.lookup_str("default_space_url") else {
            return Ok(None);
        };

        let spaces = self.fetcher.entity_list(&space_url).await?;
        let Some(space) = spaces.first() else {
            return Ok(None);
        };

        let space_name = space.get("name").filter(|name| !name.is_null());
        let org_url = space.get("organization_url").and_then(Value::as_str);
        let (Some(space_name), Some(org_url)) = (space_name, org_url) else {
            return Ok(None);
        };

        let orgs = self.fetcher.entity_list(org_url).await?;
        let org_name = orgs
            .first()
            .and_then(|org| org.get("name"))
            .filter(|name| !name.is_null());

        Ok(org_name.map(|org_name| (space_name.clone(), org_name.clone())))
    }
}
