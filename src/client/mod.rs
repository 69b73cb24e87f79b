//! Cloud Controller and UAA API clients

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

pub mod cloud;
#[cfg(test)]
pub mod mock;

pub use cloud::CloudClient;
#[cfg(test)]
#[allow(unused_imports)]
pub use mock::{MockCloudClient, MockUaaClient};

/// Cloud Controller API client trait
///
/// The export run is read-only, so the surface is a login plus GET. Response
/// bodies are returned as raw JSON; shape normalization is the resource
/// fetcher's job.
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Authenticate against the platform's token endpoint.
    async fn login(&self) -> Result<()>;

    /// Issue a GET request against the control plane and decode the body.
    async fn get(&self, path: &str) -> Result<Value>;
}

/// Identity provider (UAA) client trait
#[async_trait]
pub trait UaaApi: Send + Sync {
    /// Fetch a user profile by identifier.
    ///
    /// Returns `ApiError::NotFound` when the identity provider has no record
    /// for the id, so callers can skip that user without aborting the run.
    async fn user_get(&self, user_id: &str) -> Result<Value>;
}
