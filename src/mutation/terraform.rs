//! Terraform-schema projection
//!
//! Re-expresses the snapshot as the input document for Terraform-based
//! tooling: resource names are sanitized into identifiers, user references
//! become `${cf_user.<id>.id}` interpolation tokens, and booleans that the
//! downstream provider wants as strings are remapped.

use serde_json::{Value, json};

use super::{FieldMap, ListMap, map_field, map_list_field, sanitize_name};
use crate::entity::Attrs;
use crate::error::MutationError;

/// Interpolation token referencing an exported user resource
const USER_FMT: &str = "${cf_user.user_{}.id}";

/// Boolean to provider-string remapping table
fn bool_as_string() -> Vec<(Value, Value)> {
    vec![(json!(true), json!("true")), (json!(false), json!("false"))]
}

/// Terraform mutation over an assembled manifest
pub struct TerraformMutation<'a> {
    manifest: &'a Attrs,
}

impl<'a> TerraformMutation<'a> {
    pub fn new(manifest: &'a Attrs) -> Self {
        Self { manifest }
    }

    /// Build the full Terraform-schema document
    pub fn build(&self) -> Result<Attrs, MutationError> {
        let mut document = Attrs::new();
        document.insert("cf_users".to_string(), Value::Array(self.users()?));
        document.insert("cf_orgs".to_string(), Value::Array(self.orgs()?));
        document.insert("cf_quotas".to_string(), Value::Array(self.quotas()?));
        Ok(document)
    }

    fn source_list(&self, key: &str) -> Vec<Attrs> {
        self.manifest
            .get(key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn users(&self) -> Result<Vec<Value>, MutationError> {
        let mut users = Vec::new();

        for user in self.source_list("users") {
            let mut tf_user = Attrs::new();
            insert_resource_name(&mut tf_user, &user);

            map_field("name", &mut tf_user, &user, &FieldMap::default())?;
            for field in ["origin", "given_name", "family_name", "email"] {
                map_field(
                    field,
                    &mut tf_user,
                    &user,
                    &FieldMap {
                        optional: true,
                        ..Default::default()
                    },
                )?;
            }

            users.push(Value::Object(tf_user));
        }

        Ok(users)
    }

    fn orgs(&self) -> Result<Vec<Value>, MutationError> {
        let mut orgs = Vec::new();

        for org in self.source_list("orgs") {
            let mut tf_org = Attrs::new();
            insert_resource_name(&mut tf_org, &org);

            map_field("name", &mut tf_org, &org, &FieldMap::default())?;
            map_field(
                "quota",
                &mut tf_org,
                &org,
                &FieldMap {
                    optional: true,
                    ..Default::default()
                },
            )?;

            for field in ["managers", "billing_managers", "auditors"] {
                map_list_field(field, &mut tf_org, &org, &user_token_list());
            }

            tf_org.insert("spaces".to_string(), Value::Array(self.spaces(&org)?));
            orgs.push(Value::Object(tf_org));
        }

        Ok(orgs)
    }

    fn spaces(&self, org: &Attrs) -> Result<Vec<Value>, MutationError> {
        let org_name = org.get("name").cloned().unwrap_or(Value::Null);
        let spaces = org
            .get("spaces")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_object).cloned().collect())
            .unwrap_or_else(Vec::new);

        let mut tf_spaces = Vec::new();
        for space in &spaces {
            let mut tf_space = Attrs::new();
            insert_resource_name(&mut tf_space, space);
            tf_space.insert("org".to_string(), org_name.clone());

            map_field("name", &mut tf_space, space, &FieldMap::default())?;
            map_field(
                "allow_ssh",
                &mut tf_space,
                space,
                &FieldMap {
                    mapping: &bool_as_string(),
                    optional: true,
                    ..Default::default()
                },
            )?;

            map_list_field(
                "asgs",
                &mut tf_space,
                space,
                &ListMap {
                    source_key: Some("security_groups"),
                    key: Some("name"),
                    ..Default::default()
                },
            );
            for field in ["managers", "developers", "auditors"] {
                map_list_field(field, &mut tf_space, space, &user_token_list());
            }

            tf_spaces.push(Value::Object(tf_space));
        }

        Ok(tf_spaces)
    }

    fn quotas(&self) -> Result<Vec<Value>, MutationError> {
        let mut quotas = Vec::new();

        for quota in self.source_list("quotas") {
            let mut tf_quota = Attrs::new();

            map_field("name", &mut tf_quota, &quota, &FieldMap::default())?;
            map_field(
                "allow_paid_service_plans",
                &mut tf_quota,
                &quota,
                &FieldMap {
                    source_key: Some("non_basic_services_allowed"),
                    mapping: &bool_as_string(),
                    optional: true,
                    ..Default::default()
                },
            )?;
            map_field(
                "total_memory",
                &mut tf_quota,
                &quota,
                &FieldMap {
                    source_key: Some("memory_limit"),
                    ..Default::default()
                },
            )?;
            map_field("total_routes", &mut tf_quota, &quota, &FieldMap::default())?;
            map_field(
                "total_services",
                &mut tf_quota,
                &quota,
                &FieldMap::default(),
            )?;
            map_field(
                "instance_memory",
                &mut tf_quota,
                &quota,
                &FieldMap {
                    source_key: Some("instance_memory_limit"),
                    optional: true,
                    default: Some(json!(-1)),
                    ..Default::default()
                },
            )?;
            map_field(
                "total_app_instances",
                &mut tf_quota,
                &quota,
                &FieldMap {
                    source_key: Some("app_instance_limit"),
                    optional: true,
                    default: Some(json!(-1)),
                    ..Default::default()
                },
            )?;
            map_field(
                "total_route_ports",
                &mut tf_quota,
                &quota,
                &FieldMap {
                    source_key: Some("total_reserved_route_ports"),
                    optional: true,
                    default: Some(json!(-1)),
                    ..Default::default()
                },
            )?;
            map_field(
                "total_private_domains",
                &mut tf_quota,
                &quota,
                &FieldMap {
                    optional: true,
                    default: Some(json!(0)),
                    ..Default::default()
                },
            )?;

            quotas.push(Value::Object(tf_quota));
        }

        Ok(quotas)
    }
}

/// Derive and insert a `resource_name` identifier from the entry's name
fn insert_resource_name(dest: &mut Attrs, source: &Attrs) {
    if let Some(name) = source.get("name").and_then(Value::as_str) {
        dest.insert(
            "resource_name".to_string(),
            Value::String(sanitize_name(name)),
        );
    }
}

/// Sanitize a user name reference into an identifier-safe token
fn sanitized_user_name(name: &Value) -> Value {
    match name.as_str() {
        Some(name) => Value::String(sanitize_name(name)),
        None => name.clone(),
    }
}

/// List projection turning name references into user interpolation tokens
fn user_token_list<'a>() -> ListMap<'a> {
    ListMap {
        key: Some("name"),
        key_fn: Some(sanitized_user_name),
        fmt: Some(USER_FMT),
        ..Default::default()
    }
}
