//! Memoized resource fetching
//!
//! All remote reads go through `ResourceFetcher`, which normalizes the two
//! response shapes the control plane serves (single resource vs. paged
//! collection) and memoizes decoded bodies by exact URL. The snapshot is a
//! point-in-time read, so the cache lives for one export run and needs no
//! invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::client::CloudApi;
use crate::entity::Attrs;
use crate::error::{ApiError, Result};

/// Marker key identifying a wrapped collection response
const COLLECTION_KEY: &str = "resources";

/// Memoizing fetch layer over the Cloud Controller client
pub struct ResourceFetcher {
    client: Arc<dyn CloudApi>,
    cache: Mutex<HashMap<String, Value>>,
}

impl ResourceFetcher {
    pub fn new(client: Arc<dyn CloudApi>) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Decoded response body for `url`, fetched at most once per run.
    ///
    /// Used directly where the body is not a wrapped collection, e.g. an
    /// environment variable group, which is a flat map.
    pub async fn raw_body(&self, url: &str) -> Result<Value> {
        let mut cache = self.cache.lock().await;
        if let Some(body) = cache.get(url) {
            return Ok(body.clone());
        }

        debug!("fetching {}", url);
        let body = self.client.get(url).await?;
        cache.insert(url.to_string(), body.clone());
        Ok(body)
    }

    /// Full resource envelopes (metadata + entity sections).
    ///
    /// Only used where resource identity matters, e.g. correlating users
    /// with their identity-provider profiles by guid.
    pub async fn resource_list(&self, url: &str) -> Result<Vec<Attrs>> {
        let body = self.raw_body(url).await?;
        items(&body)
            .iter()
            .map(|item| as_object(item, url))
            .collect()
    }

    /// Entity sections, normalized across response shapes.
    ///
    /// A wrapped collection yields the `entity` section of every item; a
    /// singleton response yields its own entity section (or the bare body,
    /// for endpoints that skip the envelope). The same call therefore serves
    /// both "all spaces in this org" and "the quota this org references".
    pub async fn entity_list(&self, url: &str) -> Result<Vec<Attrs>> {
        let body = self.raw_body(url).await?;
        items(&body)
            .iter()
            .map(|item| match item.get("entity") {
                Some(entity) => as_object(entity, url),
                None => as_object(item, url),
            })
            .collect()
    }

    /// Metadata sections, normalized the same way as `entity_list`
    pub async fn metadata_list(&self, url: &str) -> Result<Vec<Attrs>> {
        let body = self.raw_body(url).await?;
        items(&body)
            .iter()
            .map(|item| match item.get("metadata") {
                Some(metadata) => as_object(metadata, url),
                None => as_object(item, url),
            })
            .collect()
    }
}

/// Split a response body into its item bodies.
///
/// Wrapped collections carry a `resources` array; the feature-flag endpoint
/// returns a bare array; anything else is a singleton.
fn items(body: &Value) -> Vec<Value> {
    if let Some(resources) = body.get(COLLECTION_KEY).and_then(Value::as_array) {
        return resources.clone();
    }
    if let Some(array) = body.as_array() {
        return array.clone();
    }
    vec![body.clone()]
}

fn as_object(value: &Value, url: &str) -> Result<Attrs> {
    value.as_object().cloned().ok_or_else(|| {
        ApiError::InvalidResponse(format!("Expected JSON object from {}", url)).into()
    })
}
