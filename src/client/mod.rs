//! # Platform API Client
//!
//! HTTP plumbing shared by every resource adapter. The engine talks to the
//! platform through the [`HttpTransport`] trait so that pagination, scope
//! enumeration and the runner can be exercised against in-memory fakes; the
//! production implementation is [`ApiSession`].

mod session;

pub use session::ApiSession;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

use crate::error::{MigrateResult, MigrationError};

/// HTTP verbs used by the platform API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
        }
    }
}

/// Request payload
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    /// Sent as `application/yaml`; some endpoints only accept raw YAML documents
    Yaml(String),
}

/// One API call, relative to the session's base URL
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query_pairs(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    #[must_use]
    pub fn yaml(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Yaml(body.into()));
        self
    }

    /// JSON body, if the request carries one
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// Value of a query parameter, if set
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and raw body of an API response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json(&self) -> MigrateResult<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-success response into an [`MigrationError::ApiError`]
    pub fn error_for_status(self) -> MigrateResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(MigrationError::api_error(self.status, self.body))
        }
    }
}

/// Sends API requests for one account
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> MigrateResult<ApiResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::post("/ng/api/secrets/list")
            .query("pageIndex", "2")
            .json(json!({"filterType": "Secret"}));

        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.query_value("pageIndex"), Some("2"));
        assert_eq!(request.query_value("missing"), None);
        assert_eq!(request.json_body(), Some(&json!({"filterType": "Secret"})));
    }

    #[test]
    fn test_error_for_status() {
        assert!(ApiResponse::new(201, "{}").error_for_status().is_ok());

        let err = ApiResponse::new(409, "dup").error_for_status().unwrap_err();
        assert_eq!(err.api_response(), Some((409, "dup")));
    }
}
