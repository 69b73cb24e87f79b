//! Mock API clients for testing
//!
//! Route-table driven stand-ins for the Cloud Controller and UAA clients.
//! Call counts are tracked so tests can verify the fetcher's memoization.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{CloudApi, UaaApi};
use crate::error::{ApiError, Result};

/// Mock Cloud Controller client.
///
/// Configure responses per URL via `with_route`, then hand it to a
/// `ResourceFetcher`. Unknown URLs return `ApiError::NotFound` so a test
/// touching an unexpected endpoint fails loudly.
#[derive(Default)]
pub struct MockCloudClient {
    routes: Mutex<HashMap<String, Value>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl MockCloudClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a response body for a URL
    pub fn with_route(self, url: &str, body: Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), body);
        self
    }

    /// Number of times a URL was requested
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    /// Total number of requests issued
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl CloudApi for MockCloudClient {
    async fn login(&self) -> Result<()> {
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Value> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert(0) += 1;

        self.routes
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(path.to_string()).into())
    }
}

/// Mock identity provider client
#[derive(Default)]
pub struct MockUaaClient {
    profiles: Mutex<HashMap<String, Value>>,
}

impl MockUaaClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile body for a user id
    pub fn with_user(self, user_id: &str, profile: Value) -> Self {
        self.profiles
            .lock()
            .unwrap()
            .insert(user_id.to_string(), profile);
        self
    }
}

#[async_trait]
impl UaaApi for MockUaaClient {
    async fn user_get(&self, user_id: &str) -> Result<Value> {
        self.profiles
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(user_id.to_string()).into())
    }
}
