//! The one place upstream GETs are issued.
//!
//! [`Fetcher`] applies the shared [`RetryPolicy`] to a single URL and hands
//! every HTTP 200 body to a caller-supplied [`Accept`] check, which decides
//! whether the payload counts as a success for that route.

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use starlane_core::AppConfig;
use url::Url;

use crate::error::UpstreamError;
use crate::retry::{retry_linear, RetryPolicy};

/// Route-specific success criterion applied to a 200 response body.
///
/// Returning an error marks the attempt as failed, so it is retried while
/// budget remains.
pub trait Accept {
    type Output;

    /// # Errors
    ///
    /// Returns an [`UpstreamError`] when the body does not count as success.
    fn accept(&self, url: &str, body: String) -> Result<Self::Output, UpstreamError>;
}

/// Any 200 response is good; body quality is judged by the extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPage;

impl Accept for HtmlPage {
    type Output = String;

    fn accept(&self, _url: &str, body: String) -> Result<String, UpstreamError> {
        Ok(body)
    }
}

/// Parsed JSON with no error marker and, by default, no empty result.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDocument {
    /// Treat `[]` as a legitimate "no results" answer instead of a failure.
    pub allow_empty_array: bool,
}

impl JsonDocument {
    pub const STRICT: Self = Self {
        allow_empty_array: false,
    };

    pub const ALLOW_EMPTY_ARRAY: Self = Self {
        allow_empty_array: true,
    };
}

impl Accept for JsonDocument {
    type Output = Value;

    fn accept(&self, url: &str, body: String) -> Result<Value, UpstreamError> {
        let value: Value =
            serde_json::from_str(&body).map_err(|e| UpstreamError::Deserialize {
                context: url.to_owned(),
                source: e,
            })?;

        let empty = || UpstreamError::EmptyPayload {
            url: url.to_owned(),
        };

        match &value {
            Value::Null => Err(empty()),
            Value::Object(map) => {
                if let Some(marker) = map.get("error").filter(|v| !v.is_null()) {
                    let message = marker
                        .as_str()
                        .map_or_else(|| marker.to_string(), str::to_owned);
                    return Err(UpstreamError::ApiError {
                        url: url.to_owned(),
                        message,
                    });
                }
                if map.is_empty() {
                    return Err(empty());
                }
                Ok(value)
            }
            Value::Array(items) if items.is_empty() && !self.allow_empty_array => Err(empty()),
            _ => Ok(value),
        }
    }
}

/// Parses `base` as a directory-style base URL, with exactly one trailing slash.
///
/// # Errors
///
/// Returns [`UpstreamError::InvalidUrl`] if `base` is not an absolute URL.
pub fn parse_base_url(base: &str) -> Result<Url, UpstreamError> {
    let normalised = format!("{}/", base.trim_end_matches('/'));
    let url = Url::parse(&normalised).map_err(|e| UpstreamError::InvalidUrl {
        url: base.to_owned(),
        reason: e.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(UpstreamError::InvalidUrl {
            url: base.to_owned(),
            reason: "not usable as a base URL".to_owned(),
        });
    }
    Ok(url)
}

/// Joins `path` onto `base` and appends percent-encoded query parameters.
///
/// # Errors
///
/// Returns [`UpstreamError::InvalidUrl`] if `path` cannot be joined.
pub fn build_url(base: &Url, path: &str, params: &[(&str, &str)]) -> Result<Url, UpstreamError> {
    let mut url = base.join(path).map_err(|e| UpstreamError::InvalidUrl {
        url: format!("{base}{path}"),
        reason: e.to_string(),
    })?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Retrying GET client shared by every upstream.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(policy: RetryPolicy, user_agent: &str) -> Result<Self, UpstreamError> {
        // No client-wide timeout: each attempt is bounded by the policy.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, policy })
    }

    /// # Errors
    ///
    /// Returns [`UpstreamError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        Self::new(RetryPolicy::from_config(config), &config.user_agent)
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GETs `url` with `headers` until `accept` is satisfied or the attempt
    /// budget runs out.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Exhausted`] with the last failure's message
    /// once every attempt has failed.
    pub async fn fetch_with_headers<A: Accept>(
        &self,
        url: &Url,
        headers: &HeaderMap,
        accept: &A,
    ) -> Result<A::Output, UpstreamError> {
        let target = url.as_str();
        let client = &self.client;

        retry_linear(&self.policy, target, move || {
            let request = client.get(url.clone()).headers(headers.clone());
            async move {
                let response = request.send().await?;
                let status = response.status();
                if status != StatusCode::OK {
                    return Err(UpstreamError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: target.to_owned(),
                    });
                }
                let body = response.text().await?;
                accept.accept(target, body)
            }
        })
        .await
    }
}
