//! Security group and rule loaders

use serde_json::Value;

use crate::entity::{Attrs, Entity};

/// A named firewall policy composed of ordered rules
pub struct SecurityGroup {
    entity: Entity,
}

impl SecurityGroup {
    pub const PROPERTIES: &'static [&'static str] =
        &["name", "running_default", "staging_default", "rules"];

    pub fn new(attrs: Attrs) -> Self {
        Self {
            entity: Entity::single(attrs),
        }
    }

    /// Load the group, folding in its embedded rule bodies.
    ///
    /// Rules without a usable name are dropped entirely, never auto-named.
    pub fn load(&self) -> Attrs {
        let mut computed = Attrs::new();

        // The computed entry must always be present, otherwise resolution
        // would fall back to the raw unfiltered rule bodies.
        if let Some(Value::Array(raw_rules)) = self.entity.lookup("rules") {
            let rules: Vec<Value> = raw_rules
                .iter()
                .filter_map(|rule| rule.as_object())
                .filter_map(|rule| SecurityRule::new(rule.clone()).load_named())
                .map(Value::Object)
                .collect();
            computed.insert("rules".to_string(), Value::Array(rules));
        }

        let mut resolved = self.entity.collect(Self::PROPERTIES, &computed);
        if resolved
            .get("rules")
            .and_then(Value::as_array)
            .is_some_and(Vec::is_empty)
        {
            resolved.remove("rules");
        }
        resolved
    }
}

/// One firewall rule owned by a security group
pub struct SecurityRule {
    entity: Entity,
}

impl SecurityRule {
    pub const PROPERTIES: &'static [&'static str] =
        &["name", "protocol", "destination", "ports", "logs", "code", "type"];

    pub fn new(attrs: Attrs) -> Self {
        Self {
            entity: Entity::single(attrs),
        }
    }

    /// The rule name comes from the upstream `description` field
    pub fn load(&self) -> Attrs {
        let mut computed = Attrs::new();
        if let Some(description) = self.entity.lookup("description") {
            computed.insert("name".to_string(), description);
        }
        self.entity.collect(Self::PROPERTIES, &computed)
    }

    /// Load the rule, keeping it only when it carries a name
    pub fn load_named(&self) -> Option<Attrs> {
        let rule = self.load();
        rule.contains_key("name").then_some(rule)
    }
}
