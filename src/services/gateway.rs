//! Kardinal API gateway
//!
//! The only component allowed to talk to the optimization vendor. One
//! attempt per call, no retries; a non-2xx answer or transport failure
//! surfaces immediately to the caller.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::defaults::TOKEN_VALIDITY_HOURS;
use crate::error::{Error, Result};

/// Cached bearer credential with an expiry window
///
/// Kardinal issues long-term keys, so "refresh" just re-arms the window
/// around the configured key. The mutex makes concurrent sessions see
/// exactly one refresh per expiry.
pub struct CredentialCache {
    api_key: String,
    validity: Duration,
    state: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CredentialCache {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_validity(api_key, Duration::hours(TOKEN_VALIDITY_HOURS))
    }

    pub fn with_validity(api_key: impl Into<String>, validity: Duration) -> Self {
        Self {
            api_key: api_key.into(),
            validity,
            state: Mutex::new(None),
        }
    }

    /// Return a valid bearer token, refreshing if the window expired
    pub fn bearer(&self) -> String {
        let mut state = self.state.lock();
        let now = Utc::now();

        if let Some(cached) = state.as_ref() {
            if cached.expires_at > now {
                return cached.token.clone();
            }
        }

        debug!("Refreshing Kardinal credential window");
        let token = self.api_key.clone();
        *state = Some(CachedToken {
            token: token.clone(),
            expires_at: now + self.validity,
        });
        token
    }
}

/// HTTP client for the Kardinal optimization API
pub struct KardinalClient {
    client: Client,
    base_url: String,
    credentials: CredentialCache,
}

impl KardinalClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
            credentials: CredentialCache::new(api_key),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    /// GET an endpoint, returning parsed JSON
    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        debug!("Kardinal GET {}", endpoint);
        let response = self
            .client
            .get(self.url(endpoint))
            .bearer_auth(self.credentials.bearer())
            .send()
            .await?;

        Self::read_json(response).await
    }

    /// POST a JSON body to an endpoint, returning parsed JSON
    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        debug!("Kardinal POST {}", endpoint);
        let response = self
            .client
            .post(self.url(endpoint))
            .bearer_auth(self.credentials.bearer())
            .json(body)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn read_json(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Gateway {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}
