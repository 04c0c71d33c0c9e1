//! HTTP client for the backend-as-a-service (auth and wallet-record REST APIs).

use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use url::Url;

use crate::config::Config;

/// Shared client for the hosted backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL, always ending in '/'.
    base: Url,
    /// Public API key sent as `apikey`.
    anon_key: String,
}

/// Error body returned by the backend. Field names vary by service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendErrorBody {
    /// Auth service description.
    pub error_description: Option<String>,
    /// Auth service message.
    pub msg: Option<String>,
    /// REST service message.
    pub message: Option<String>,
    /// Short error code.
    pub error: Option<String>,
}

impl BackendErrorBody {
    /// Most descriptive message available.
    pub fn message(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }
}

impl BackendClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: &str, anon_key: impl Into<String>, timeout: std::time::Duration) -> Result<Self, String> {
        let mut base = Url::parse(base_url).map_err(|e| format!("invalid backend url: {e}"))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(std::time::Duration::from_secs(2))
            .build()
            .map_err(|e| format!("failed to create HTTP client: {e}"))?;

        Ok(Self {
            http,
            base,
            anon_key: anon_key.into(),
        })
    }

    /// Build from config, if a backend is configured.
    pub fn from_config(config: &Config) -> Option<Result<Self, String>> {
        let url = config.backend_url.as_ref()?;
        let key = config.backend_anon_key.clone().unwrap_or_default();
        Some(Self::new(url, key, config.http_timeout()))
    }

    /// Absolute URL for a path relative to the base.
    pub fn url(&self, path: &str) -> Result<Url, String> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| format!("invalid backend path {path}: {e}"))
    }

    /// Start a request with the API key and bearer token set.
    pub fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        let token = bearer.unwrap_or(&self.anon_key);
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    /// Turn a non-success response into its error message.
    pub async fn error_message(response: Response) -> String {
        let status = response.status();
        match response.json::<BackendErrorBody>().await {
            Ok(body) => body
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("backend returned {status}")),
            Err(_) => format!("backend returned {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn url_joins_relative_to_base_path() {
        let client = BackendClient::new("http://localhost:54321/project", "anon", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url("/auth/v1/signup").unwrap().as_str(),
            "http://localhost:54321/project/auth/v1/signup"
        );

        let client = BackendClient::new("https://abc.supabase.co", "anon", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.url("rest/v1/user_wallets").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/user_wallets"
        );
    }

    #[test]
    fn rejects_invalid_base_url() {
        assert!(BackendClient::new("::nope", "anon", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn error_body_prefers_description() {
        let body: BackendErrorBody = serde_json::from_str(
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        )
        .unwrap();
        assert_eq!(body.message(), Some("Invalid login credentials"));

        let body: BackendErrorBody = serde_json::from_str(r#"{"msg":"User already registered"}"#).unwrap();
        assert_eq!(body.message(), Some("User already registered"));
    }
}
