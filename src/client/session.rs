use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use super::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, RequestBody};
use crate::config::ApiEndpointConfig;
use crate::constants::{params, API_KEY_HEADER};
use crate::error::{MigrateResult, MigrationError};

/// Authenticated HTTP session for one account.
///
/// Built once per credential pair and passed by reference to every adapter for
/// the lifetime of a run. Immutable after construction.
#[derive(Clone)]
pub struct ApiSession {
    client: Client,
    base_url: String,
    account_id: String,
}

impl std::fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSession")
            .field("base_url", &self.base_url)
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl ApiSession {
    /// Create a session from endpoint configuration
    pub fn new(config: &ApiEndpointConfig) -> MigrateResult<Self> {
        if !(config.base_url.starts_with("http://") || config.base_url.starts_with("https://")) {
            return Err(MigrationError::config_error(format!(
                "Invalid base URL: {}",
                config.base_url
            )));
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            HeaderName::from_static(API_KEY_HEADER),
            HeaderValue::from_str(&config.api_key)
                .map_err(|e| MigrationError::config_error(format!("Invalid API key: {e}")))?,
        );
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("harness-migrate/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(default_headers)
            .build()
            .map_err(|e| {
                MigrationError::config_error(format!("Failed to create HTTP client: {e}"))
            })?;

        info!(
            base_url = %config.base_url,
            account_id = %config.account_id,
            timeout_ms = config.timeout_ms,
            "Created platform API session"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id.clone(),
        })
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpTransport for ApiSession {
    async fn send(&self, request: ApiRequest) -> MigrateResult<ApiResponse> {
        // The gateway prefix is part of base_url, so paths are appended rather than joined.
        let url = format!("{}{}", self.base_url, request.path);

        let mut query = Vec::with_capacity(request.query.len() + 1);
        query.push((params::ACCOUNT.to_string(), self.account_id.clone()));
        query.extend(request.query);

        let builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
        }
        .query(&query);

        let builder = match request.body {
            Some(RequestBody::Json(body)) => builder.json(&body),
            Some(RequestBody::Yaml(body)) => builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/yaml"))
                .body(body),
            None => builder,
        };

        debug!(method = %request.method, url = %url, "Sending platform API request");

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        debug!(method = %request.method, url = %url, status, "Received platform API response");

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_rejects_bad_url() {
        let config = ApiEndpointConfig {
            base_url: "ftp://nowhere".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ApiSession::new(&config),
            Err(MigrationError::ConfigError(_))
        ));
    }

    #[test]
    fn test_session_trims_trailing_slash() {
        let config = ApiEndpointConfig {
            base_url: "https://app.harness.io/gateway/".to_string(),
            account_id: "acct".to_string(),
            api_key: "pat.key".to_string(),
            timeout_ms: 1000,
        };
        let session = ApiSession::new(&config).unwrap();
        assert_eq!(session.base_url(), "https://app.harness.io/gateway");
        assert_eq!(session.account_id(), "acct");
    }
}
