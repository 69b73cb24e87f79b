//! Cloud Controller client implementation
//!
//! One client covers both collaborators: the control plane (`CloudApi`) and
//! the identity provider (`UaaApi`). The identity endpoint is discovered from
//! the control plane's info document and shares the same bearer token.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{CloudApi, UaaApi};
use crate::error::{ApiError, Result};

/// Rate limit: 10 requests per second
const RATE_LIMIT_PER_SECOND: u32 = 10;

/// Refresh the token this long before it actually expires
const TOKEN_EXPIRY_BUFFER_SECS: i64 = 60;

/// Cloud Controller API client
pub struct CloudClient {
    http: HttpClient,
    api_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    auth_state: Arc<RwLock<AuthState>>,
}

/// Internal authentication state
#[derive(Debug, Clone)]
struct AuthState {
    username: String,
    password: String,
    token_endpoint: Option<String>,
    token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl CloudClient {
    /// Create a new client for the given API endpoint and admin credentials
    pub fn new(api_url: &str, username: &str, password: &str) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(std::num::NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            rate_limiter,
            auth_state: Arc::new(RwLock::new(AuthState {
                username: username.to_string(),
                password: password.to_string(),
                token_endpoint: None,
                token: None,
                expires_at: None,
            })),
        })
    }

    /// Discover the identity provider endpoint from the info document
    async fn token_endpoint(&self) -> Result<String> {
        {
            let state = self.auth_state.read().await;
            if let Some(ref endpoint) = state.token_endpoint {
                return Ok(endpoint.clone());
            }
        }

        #[derive(Deserialize)]
        struct InfoResponse {
            token_endpoint: String,
        }

        self.rate_limiter.until_ready().await;
        let url = format!("{}/v2/info", self.api_url);
        debug!("discovering token endpoint via {}", url);

        let response = self.http.get(&url).send().await.map_err(ApiError::from)?;
        if !response.status().is_success() {
            return Err(ApiError::InvalidResponse(format!(
                "Info endpoint returned {}",
                response.status()
            ))
            .into());
        }

        let info: InfoResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse info: {}", e)))?;

        let endpoint = info.token_endpoint.trim_end_matches('/').to_string();
        let mut state = self.auth_state.write().await;
        state.token_endpoint = Some(endpoint.clone());
        Ok(endpoint)
    }

    /// Check if the token is missing, expired, or about to expire
    async fn is_token_expired(&self) -> bool {
        let state = self.auth_state.read().await;
        match (&state.token, state.expires_at) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some(expires_at)) => {
                expires_at - chrono::Duration::seconds(TOKEN_EXPIRY_BUFFER_SECS) < Utc::now()
            }
        }
    }

    /// Get the current bearer token, logging in first if necessary
    async fn valid_token(&self) -> Result<String> {
        if self.is_token_expired().await {
            self.login().await?;
        }

        let state = self.auth_state.read().await;
        state.token.clone().ok_or(ApiError::Unauthorized.into())
    }

    /// GET an absolute URL with the current bearer token, re-authenticating
    /// once on 401
    async fn get_url(&self, url: &str) -> Result<Value> {
        for attempt in 0..2 {
            self.rate_limiter.until_ready().await;
            let token = self.valid_token().await?;

            let response = self
                .http
                .get(url)
                .header("Authorization", format!("Bearer {}", token))
                .send()
                .await
                .map_err(ApiError::from)?;

            let status = response.status();
            match status {
                StatusCode::OK => {
                    let body = response.json::<Value>().await.map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                    })?;
                    return Ok(body);
                }
                StatusCode::UNAUTHORIZED if attempt == 0 => {
                    // Token may have been revoked mid-run; retry once
                    self.login().await?;
                }
                StatusCode::UNAUTHORIZED => return Err(ApiError::Unauthorized.into()),
                StatusCode::FORBIDDEN => return Err(ApiError::Forbidden.into()),
                StatusCode::NOT_FOUND => return Err(ApiError::NotFound(url.to_string()).into()),
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|v| v.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into());
                }
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                    let error_msg = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Bad request".to_string());
                    return Err(ApiError::BadRequest(error_msg).into());
                }
                status if status.is_server_error() => {
                    let error_msg = response
                        .text()
                        .await
                        .unwrap_or_else(|_| format!("Server error: {}", status));
                    return Err(ApiError::ServerError(error_msg).into());
                }
                _ => {
                    return Err(
                        ApiError::InvalidResponse(format!("Unexpected status code: {}", status))
                            .into(),
                    );
                }
            }
        }

        Err(ApiError::Unauthorized.into())
    }
}

#[async_trait]
impl CloudApi for CloudClient {
    async fn login(&self) -> Result<()> {
        #[derive(Deserialize)]
        struct TokenResponse {
            access_token: String,
            #[serde(default)]
            expires_in: Option<i64>,
        }

        let token_endpoint = self.token_endpoint().await?;
        let (username, password) = {
            let state = self.auth_state.read().await;
            (state.username.clone(), state.password.clone())
        };

        self.rate_limiter.until_ready().await;
        let url = format!("{}/oauth/token", token_endpoint);
        debug!("requesting token from {}", url);

        let response = self
            .http
            .post(&url)
            .basic_auth("cf", Some(""))
            .form(&[
                ("grant_type", "password"),
                ("username", username.as_str()),
                ("password", password.as_str()),
            ])
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized.into());
        }
        if !status.is_success() {
            return Err(
                ApiError::InvalidResponse(format!("Token endpoint returned {}", status)).into(),
            );
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse token: {}", e)))?;

        let mut state = self.auth_state.write().await;
        state.token = Some(token.access_token);
        state.expires_at = token
            .expires_in
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs));

        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Value> {
        let url = format!("{}{}", self.api_url, path);
        self.get_url(&url).await
    }
}

#[async_trait]
impl UaaApi for CloudClient {
    async fn user_get(&self, user_id: &str) -> Result<Value> {
        let token_endpoint = self.token_endpoint().await?;
        let url = format!("{}/Users/{}", token_endpoint, user_id);

        self.get_url(&url).await.map_err(|err| match err {
            crate::error::Error::Api(ApiError::NotFound(_)) => {
                ApiError::NotFound(user_id.to_string()).into()
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn info_body(server: &mockito::ServerGuard) -> String {
        format!(r#"{{"token_endpoint": "{}"}}"#, server.url())
    }

    #[tokio::test]
    async fn test_login_uses_discovered_token_endpoint() {
        let mut server = mockito::Server::new_async().await;

        let info = server
            .mock("GET", "/v2/info")
            .with_body(info_body(&server))
            .create_async()
            .await;
        let token = server
            .mock("POST", "/oauth/token")
            .with_body(r#"{"access_token": "test-token", "expires_in": 600}"#)
            .create_async()
            .await;

        let client = CloudClient::new(&server.url(), "admin", "secret").unwrap();
        client.login().await.unwrap();

        info.assert_async().await;
        token.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/v2/info")
            .with_body(info_body(&server))
            .create_async()
            .await;
        server
            .mock("POST", "/oauth/token")
            .with_body(r#"{"access_token": "test-token", "expires_in": 600}"#)
            .create_async()
            .await;
        let users = server
            .mock("GET", "/v2/users")
            .match_header("authorization", "Bearer test-token")
            .with_body(r#"{"resources": []}"#)
            .create_async()
            .await;

        let client = CloudClient::new(&server.url(), "admin", "secret").unwrap();
        let body = client.get("/v2/users").await.unwrap();

        users.assert_async().await;
        assert!(body.get("resources").is_some());
    }

    #[tokio::test]
    async fn test_bad_credentials_map_to_unauthorized() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/v2/info")
            .with_body(info_body(&server))
            .create_async()
            .await;
        server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .create_async()
            .await;

        let client = CloudClient::new(&server.url(), "admin", "wrong").unwrap();
        let err = client.login().await.unwrap_err();

        match err {
            Error::Api(ApiError::Unauthorized) => (),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_uaa_missing_user_maps_to_not_found() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/v2/info")
            .with_body(info_body(&server))
            .create_async()
            .await;
        server
            .mock("POST", "/oauth/token")
            .with_body(r#"{"access_token": "test-token", "expires_in": 600}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/Users/uaa-id-999")
            .with_status(404)
            .create_async()
            .await;

        let client = CloudClient::new(&server.url(), "admin", "secret").unwrap();
        let err = client.user_get("uaa-id-999").await.unwrap_err();

        match err {
            Error::Api(ApiError::NotFound(id)) => assert_eq!(id, "uaa-id-999"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
