//! Configurator-schema projection
//!
//! Re-expresses the snapshot as the document consumed by config-management
//! tooling: the same top-level sections as the snapshot, but with feature
//! flags re-encoded as a whitelist-filtered name/value map, plain user-name
//! lists instead of reference objects, and quota limits defaulted.

use serde_json::{Value, json};

use super::{FieldMap, ListMap, map_field, map_list_field};
use crate::entity::Attrs;
use crate::error::MutationError;

/// Feature flags the configurator schema recognizes; anything else the
/// platform reports is dropped from the projection.
const KNOWN_FEATURE_FLAGS: &[&str] = &[
    "user_org_creation",
    "private_domain_creation",
    "app_bits_upload",
    "app_scaling",
    "route_creation",
    "service_instance_creation",
    "diego_docker",
    "set_roles_by_username",
    "unset_roles_by_username",
    "env_var_visibility",
    "space_scoped_private_broker_creation",
    "space_developer_env_var_visibility",
    "task_creation",
];

/// Configurator mutation over an assembled manifest
pub struct ConfiguratorMutation<'a> {
    manifest: &'a Attrs,
}

impl<'a> ConfiguratorMutation<'a> {
    pub fn new(manifest: &'a Attrs) -> Self {
        Self { manifest }
    }

    /// Build the full configurator-schema document
    pub fn build(&self) -> Result<Attrs, MutationError> {
        let mut document = Attrs::new();

        document.insert("feature_flags".to_string(), self.feature_flags());
        // Pass-through sections; an absent section is omitted, never
        // exported as a null placeholder
        for key in [
            "staging_environment_variables",
            "running_environment_variables",
            "shared_domains",
        ] {
            if let Some(section) = self.manifest.get(key) {
                document.insert(key.to_string(), section.clone());
            }
        }
        document.insert(
            "security_groups".to_string(),
            Value::Array(self.security_groups()?),
        );
        document.insert("quotas".to_string(), Value::Array(self.quotas()?));
        document.insert("users".to_string(), Value::Array(self.users()?));
        document.insert("orgs".to_string(), Value::Array(self.orgs()?));

        Ok(document)
    }

    fn source_list(&self, key: &str) -> Vec<Attrs> {
        self.manifest
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
            .unwrap_or_default()
    }

    /// Re-encode flags as an ordered name/value map, keeping recognized
    /// names only
    fn feature_flags(&self) -> Value {
        let mut flags = Attrs::new();
        for flag in self.source_list("feature_flags") {
            let name = flag.get("name").and_then(Value::as_str);
            let value = flag.get("value").and_then(Value::as_bool);
            if let (Some(name), Some(value)) = (name, value) {
                if KNOWN_FEATURE_FLAGS.contains(&name) {
                    flags.insert(name.to_string(), Value::Bool(value));
                }
            }
        }
        Value::Object(flags)
    }

    fn security_groups(&self) -> Result<Vec<Value>, MutationError> {
        let mut groups = Vec::new();

        for group in self.source_list("security_groups") {
            let mut projected = Attrs::new();
            map_field("name", &mut projected, &group, &FieldMap::default())?;
            for field in ["running_default", "staging_default"] {
                map_field(
                    field,
                    &mut projected,
                    &group,
                    &FieldMap {
                        optional: true,
                        default: Some(json!(false)),
                        ..Default::default()
                    },
                )?;
            }
            map_list_field("rules", &mut projected, &group, &ListMap::default());
            groups.push(Value::Object(projected));
        }

        Ok(groups)
    }

    fn quotas(&self) -> Result<Vec<Value>, MutationError> {
        // Limit fields absent upstream fall back to schema defaults here,
        // never at load stage.
        const LIMIT_DEFAULTS: &[(&str, i64)] = &[
            ("total_services", -1),
            ("total_routes", -1),
            ("memory_limit", -1),
            ("instance_memory_limit", -1),
            ("total_service_keys", -1),
            ("total_reserved_route_ports", 0),
            ("total_private_domains", -1),
            ("app_instance_limit", -1),
        ];

        let mut quotas = Vec::new();
        for quota in self.source_list("quotas") {
            let mut projected = Attrs::new();
            map_field("name", &mut projected, &quota, &FieldMap::default())?;
            map_field(
                "non_basic_services_allowed",
                &mut projected,
                &quota,
                &FieldMap {
                    optional: true,
                    default: Some(json!(false)),
                    ..Default::default()
                },
            )?;
            for &(field, default) in LIMIT_DEFAULTS {
                map_field(
                    field,
                    &mut projected,
                    &quota,
                    &FieldMap {
                        optional: true,
                        default: Some(json!(default)),
                        ..Default::default()
                    },
                )?;
            }
            quotas.push(Value::Object(projected));
        }

        Ok(quotas)
    }

    fn users(&self) -> Result<Vec<Value>, MutationError> {
        let mut users = Vec::new();

        for user in self.source_list("users") {
            let mut projected = Attrs::new();
            map_field("name", &mut projected, &user, &FieldMap::default())?;
            map_field(
                "active",
                &mut projected,
                &user,
                &FieldMap {
                    optional: true,
                    default: Some(json!(false)),
                    ..Default::default()
                },
            )?;
            for field in [
                "email",
                "given_name",
                "family_name",
                "origin",
                "external_id",
                "default_organization",
                "default_space",
            ] {
                map_field(
                    field,
                    &mut projected,
                    &user,
                    &FieldMap {
                        optional: true,
                        ..Default::default()
                    },
                )?;
            }
            users.push(Value::Object(projected));
        }

        Ok(users)
    }

    fn orgs(&self) -> Result<Vec<Value>, MutationError> {
        let mut orgs = Vec::new();

        for org in self.source_list("orgs") {
            let mut projected = Attrs::new();
            map_field("name", &mut projected, &org, &FieldMap::default())?;
            map_field(
                "quota",
                &mut projected,
                &org,
                &FieldMap {
                    optional: true,
                    ..Default::default()
                },
            )?;
            map_list_field(
                "private_domains",
                &mut projected,
                &org,
                &ListMap::default(),
            );
            for field in ["users", "managers", "billing_managers", "auditors"] {
                map_list_field(field, &mut projected, &org, &plain_name_list());
            }

            projected.insert("spaces".to_string(), Value::Array(spaces(&org)?));
            orgs.push(Value::Object(projected));
        }

        Ok(orgs)
    }
}

fn spaces(org: &Attrs) -> Result<Vec<Value>, MutationError> {
    let source_spaces: Vec<Attrs> = org
        .get("spaces")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
        .unwrap_or_default();

    let mut projected_spaces = Vec::new();
    for space in &source_spaces {
        let mut projected = Attrs::new();
        map_field("name", &mut projected, space, &FieldMap::default())?;
        map_field(
            "allow_ssh",
            &mut projected,
            space,
            &FieldMap {
                optional: true,
                default: Some(json!(false)),
                ..Default::default()
            },
        )?;
        for field in ["developers", "managers", "auditors"] {
            map_list_field(field, &mut projected, space, &plain_name_list());
        }
        map_list_field(
            "security_groups",
            &mut projected,
            space,
            &plain_name_list(),
        );
        projected_spaces.push(Value::Object(projected));
    }

    Ok(projected_spaces)
}

/// List projection extracting plain names from reference objects
fn plain_name_list<'a>() -> ListMap<'a> {
    ListMap {
        key: Some("name"),
        ..Default::default()
    }
}
