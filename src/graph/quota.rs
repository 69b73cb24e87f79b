//! Quota definition loader

use crate::entity::{Attrs, Entity};

/// A named resource-limit plan referenced by organizations
pub struct Quota {
    entity: Entity,
}

impl Quota {
    /// Exported scalar fields, in manifest order.
    ///
    /// Absent numeric limits stay absent here; defaults are applied at the
    /// mutation stage, not at load stage.
    pub const PROPERTIES: &'static [&'static str] = &[
        "name",
        "total_services",
        "total_routes",
        "memory_limit",
        "non_basic_services_allowed",
        "instance_memory_limit",
        "total_service_keys",
        "total_reserved_route_ports",
        "total_private_domains",
        "app_instance_limit",
    ];

    pub fn new(attrs: Attrs) -> Self {
        Self {
            entity: Entity::single(attrs),
        }
    }

    pub fn load(&self) -> Attrs {
        self.entity.collect(Self::PROPERTIES, &Attrs::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quota_loads_its_config() {
        let definition = json!({
            "name": "default",
            "non_basic_services_allowed": true,
            "total_services": 100,
            "total_routes": 1000,
            "total_private_domains": -1,
            "memory_limit": 10240,
            "trial_db_allowed": false,
            "instance_memory_limit": -1,
            "app_instance_limit": -1,
            "app_task_limit": -1,
            "total_service_keys": -1,
            "total_reserved_route_ports": 0
        });

        let quota = Quota::new(definition.as_object().unwrap().clone());
        let resolved = quota.load();

        assert_eq!(resolved.get("name"), Some(&json!("default")));
        assert_eq!(resolved.get("memory_limit"), Some(&json!(10240)));
        assert_eq!(resolved.get("total_reserved_route_ports"), Some(&json!(0)));
        // Undeclared source fields never leak into the manifest
        assert!(!resolved.contains_key("trial_db_allowed"));
        assert!(!resolved.contains_key("app_task_limit"));
    }

    #[test]
    fn test_absent_limits_stay_absent() {
        let definition = json!({"name": "small", "memory_limit": 2048});
        let quota = Quota::new(definition.as_object().unwrap().clone());
        let resolved = quota.load();

        assert_eq!(resolved.len(), 2);
        assert!(!resolved.contains_key("app_instance_limit"));
    }
}
