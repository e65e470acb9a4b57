//! Client for the HTML-only star-system website.
//!
//! The site has no API; the nearest-systems search page is requested like a
//! browser would and its results table is handed to [`crate::extract`].

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use starlane_core::AppConfig;
use url::Url;

use crate::error::UpstreamError;
use crate::extract::extract_nearest_systems;
use crate::fetch::{build_url, parse_base_url, Fetcher, HtmlPage};
use crate::types::RawScrapedRow;

const NEAREST_SYSTEMS_PATH: &str = "elite/nearest-starsystems/";
/// Search form field holding the reference system name.
const REFERENCE_SYSTEM_PARAM: &str = "ps1";
/// Search form field: `1` lists systems of any population, `0` only populated ones.
const ANY_POPULATION_PARAM: &str = "pi3";

#[derive(Debug, Clone)]
pub struct InaraClient {
    fetcher: Fetcher,
    base_url: Url,
    headers: HeaderMap,
}

impl InaraClient {
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidUrl`] if `base_url` is not absolute.
    pub fn new(fetcher: Fetcher, base_url: &str) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
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
        Self::new(Fetcher::from_config(config)?, config.inara_base_url.as_str())
    }

    /// Builds the search page URL for `reference_system`.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidUrl`] if the path cannot be joined.
    pub fn nearest_systems_url(
        &self,
        reference_system: &str,
        any_population: bool,
    ) -> Result<Url, UpstreamError> {
        build_url(
            &self.base_url,
            NEAREST_SYSTEMS_PATH,
            &[
                (REFERENCE_SYSTEM_PARAM, reference_system),
                (ANY_POPULATION_PARAM, if any_population { "1" } else { "0" }),
            ],
        )
    }

    /// Systems nearest to `reference_system`, in the page's (distance) order.
    ///
    /// A 200 page without the results table yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::Exhausted`] once the attempt budget is spent.
    pub async fn nearest_systems(
        &self,
        reference_system: &str,
        any_population: bool,
    ) -> Result<Vec<RawScrapedRow>, UpstreamError> {
        let url = self.nearest_systems_url(reference_system, any_population)?;
        let html = self
            .fetcher
            .fetch_with_headers(&url, &self.headers, &HtmlPage)
            .await?;
        Ok(extract_nearest_systems(&html))
    }
}
