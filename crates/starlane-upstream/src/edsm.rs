//! Client for the JSON star-system database API.
//!
//! Three capabilities are proxied: the sphere search (normalized), and the
//! body listing and coordinate lookup (passed through untouched). Only the
//! sphere search treats an empty result array as a legitimate answer; the
//! other two retry on an empty response like any other transient failure.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use starlane_core::AppConfig;
use url::Url;

use crate::error::UpstreamError;
use crate::fetch::{build_url, parse_base_url, Accept, Fetcher, JsonDocument};
use crate::types::RawJsonSystem;

const SPHERE_SYSTEMS_PATH: &str = "api-v1/sphere-systems";
const BODIES_PATH: &str = "api-system-v1/bodies";
const SYSTEM_PATH: &str = "api-v1/system";

/// Sphere search results: a JSON array, possibly empty, decoded record by
/// record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemList;

impl Accept for SystemList {
    type Output = Vec<RawJsonSystem>;

    fn accept(&self, url: &str, body: String) -> Result<Self::Output, UpstreamError> {
        let value = JsonDocument::ALLOW_EMPTY_ARRAY.accept(url, body)?;
        let items: Vec<Value> =
            serde_json::from_value(value).map_err(|e| UpstreamError::Deserialize {
                context: format!("system list from {url}"),
                source: e,
            })?;
        Ok(items.iter().map(RawJsonSystem::from_value).collect())
    }
}

/// Client for the JSON API. Use [`EdsmClient::new`] with a mock server's
/// URI in tests.
#[derive(Debug, Clone)]
pub struct EdsmClient {
    fetcher: Fetcher,
    base_url: Url,
    headers: HeaderMap,
}

impl EdsmClient {
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidUrl`] if `base_url` is not absolute.
    pub fn new(fetcher: Fetcher, base_url: &str) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Ok(Self {
            fetcher,
            base_url: parse_base_url(base_url)?,
            headers,
        })
    }

    /// # Errors
    ///
    /// Returns [`UpstreamError`] if the HTTP client or base URL is invalid.
    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        Self::new(Fetcher::from_config(config)?, config.edsm_base_url.as_str())
    }

    /// Systems within `radius` light-years of `system_name`, excluding those
    /// closer than `min_radius`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Exhausted`] once the attempt budget is spent.
    pub async fn sphere_systems(
        &self,
        system_name: &str,
        radius: f64,
        min_radius: f64,
    ) -> Result<Vec<RawJsonSystem>, UpstreamError> {
        let radius = radius.to_string();
        let min_radius = min_radius.to_string();
        let url = build_url(
            &self.base_url,
            SPHERE_SYSTEMS_PATH,
            &[
                ("systemName", system_name),
                ("radius", &radius),
                ("minRadius", &min_radius),
                ("showInformation", "1"),
            ],
        )?;
        self.fetcher
            .fetch_with_headers(&url, &self.headers, &SystemList)
            .await
    }

    /// Raw body listing for one system.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Exhausted`] once the attempt budget is spent,
    /// including when every response was empty.
    pub async fn bodies(&self, system_name: &str) -> Result<Value, UpstreamError> {
        let url = build_url(&self.base_url, BODIES_PATH, &[("systemName", system_name)])?;
        self.fetcher
            .fetch_with_headers(&url, &self.headers, &JsonDocument::STRICT)
            .await
    }

    /// Raw coordinate lookup for one system.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Exhausted`] once the attempt budget is spent,
    /// including when every response was empty.
    pub async fn system_coordinates(&self, system_name: &str) -> Result<Value, UpstreamError> {
        let url = build_url(
            &self.base_url,
            SYSTEM_PATH,
            &[("systemName", system_name), ("showCoordinates", "1")],
        )?;
        self.fetcher
            .fetch_with_headers(&url, &self.headers, &JsonDocument::STRICT)
            .await
    }
}
