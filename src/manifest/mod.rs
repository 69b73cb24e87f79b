//! Manifest assembly
//!
//! Orchestrates the full export: every top-level collection is fetched in a
//! fixed order and folded into one ordered map. This map is the sole
//! artifact the mutation engine consumes.

use std::sync::Arc;

use log::{info, warn};
use serde_json::Value;

use crate::client::UaaApi;
use crate::entity::Attrs;
use crate::error::{ApiError, Error, Result};
use crate::fetcher::ResourceFetcher;
use crate::graph::{FeatureFlag, Organization, Quota, SecurityGroup, User, VariableGroup};

const FEATURE_FLAGS_URL: &str = "/v2/config/feature_flags";
const STAGING_VARS_URL: &str = "/v2/config/environment_variable_groups/staging";
const RUNNING_VARS_URL: &str = "/v2/config/environment_variable_groups/running";
const SHARED_DOMAINS_URL: &str = "/v2/shared_domains";
const SECURITY_GROUPS_URL: &str = "/v2/security_groups";
const QUOTAS_URL: &str = "/v2/quota_definitions";
const USERS_URL: &str = "/v2/users";
const ORGANIZATIONS_URL: &str = "/v2/organizations";

/// Assembles the configuration snapshot for one export run
pub struct ManifestBuilder<'a> {
    fetcher: &'a ResourceFetcher,
    uaa: Arc<dyn UaaApi>,
    exclude_env_vars: Vec<String>,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(
        fetcher: &'a ResourceFetcher,
        uaa: Arc<dyn UaaApi>,
        exclude_env_vars: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            uaa,
            exclude_env_vars,
        }
    }

    /// Build the full ordered manifest map
    pub async fn build(&self) -> Result<Attrs> {
        let mut manifest = Attrs::new();

        info!("exporting feature flags");
        manifest.insert("feature_flags".to_string(), self.feature_flags().await?);

        info!("exporting environment variable groups");
        manifest.insert(
            "staging_environment_variables".to_string(),
            self.variable_group(STAGING_VARS_URL).await?,
        );
        manifest.insert(
            "running_environment_variables".to_string(),
            self.variable_group(RUNNING_VARS_URL).await?,
        );

        info!("exporting shared domains");
        manifest.insert("shared_domains".to_string(), self.shared_domains().await?);

        info!("exporting security groups");
        manifest.insert(
            "security_groups".to_string(),
            self.security_groups().await?,
        );

        info!("exporting quotas");
        manifest.insert("quotas".to_string(), self.quotas().await?);

        info!("exporting users");
        manifest.insert("users".to_string(), self.users().await?);

        info!("exporting organizations");
        manifest.insert("orgs".to_string(), self.organizations().await?);

        Ok(manifest)
    }

    async fn feature_flags(&self) -> Result<Value> {
        let flags = self
            .fetcher
            .entity_list(FEATURE_FLAGS_URL)
            .await?
            .into_iter()
            .map(|attrs| Value::Object(FeatureFlag::new(attrs).load()))
            .collect();
        Ok(Value::Array(flags))
    }

    async fn variable_group(&self, url: &str) -> Result<Value> {
        let body = self.fetcher.raw_body(url).await?;
        let attrs = body.as_object().cloned().ok_or_else(|| {
            ApiError::InvalidResponse(format!("Expected a variable map from {}", url))
        })?;
        let group = VariableGroup::new(attrs);
        Ok(Value::Object(group.load_filtered(&self.exclude_env_vars)))
    }

    async fn shared_domains(&self) -> Result<Value> {
        let names = self
            .fetcher
            .entity_list(SHARED_DOMAINS_URL)
            .await?
            .iter()
            .filter_map(|domain| domain.get("name"))
            .filter(|name| !name.is_null())
            .cloned()
            .collect();
        Ok(Value::Array(names))
    }

    async fn security_groups(&self) -> Result<Value> {
        let groups = self
            .fetcher
            .entity_list(SECURITY_GROUPS_URL)
            .await?
            .into_iter()
            .map(|attrs| Value::Object(SecurityGroup::new(attrs).load()))
            .collect();
        Ok(Value::Array(groups))
    }

    async fn quotas(&self) -> Result<Value> {
        let quotas = self
            .fetcher
            .entity_list(QUOTAS_URL)
            .await?
            .into_iter()
            .map(|attrs| Value::Object(Quota::new(attrs).load()))
            .collect();
        Ok(Value::Array(quotas))
    }

    /// Join control-plane user records with identity-provider profiles.
    ///
    /// A user with no identity-provider record is skipped and logged; a
    /// single broken identity link must not abort the whole export. Any
    /// other fetch failure is fatal as usual.
    async fn users(&self) -> Result<Value> {
        let mut users = Vec::new();

        for envelope in self.fetcher.resource_list(USERS_URL).await? {
            let guid = envelope
                .get("metadata")
                .and_then(|metadata| metadata.get("guid"))
                .and_then(Value::as_str);
            let Some(guid) = guid else {
                warn!("skipping user resource without a guid");
                continue;
            };

            let Some(cloud_attrs) = envelope.get("entity").and_then(Value::as_object) else {
                warn!("skipping user {}: no entity body", guid);
                continue;
            };

            let profile = match self.uaa.user_get(guid).await {
                Ok(Value::Object(profile)) => profile,
                Ok(_) => {
                    warn!("skipping user {}: malformed identity profile", guid);
                    continue;
                }
                Err(Error::Api(ApiError::NotFound(_))) => {
                    warn!("skipping user {}: no identity-provider record", guid);
                    continue;
                }
                Err(err) => return Err(err),
            };

            let user = User::new(cloud_attrs.clone(), profile, self.fetcher);
            users.push(Value::Object(user.load().await?));
        }

        Ok(Value::Array(users))
    }

    async fn organizations(&self) -> Result<Value> {
        let mut orgs = Vec::new();
        for attrs in self.fetcher.entity_list(ORGANIZATIONS_URL).await? {
            let org = Organization::new(attrs, self.fetcher);
            orgs.push(Value::Object(org.load().await?));
        }
        Ok(Value::Array(orgs))
    }
}
