use serde::{Deserialize, Serialize};

/// Allegiance reported when a source gives none.
pub const DEFAULT_ALLEGIANCE: &str = "Independent";

/// Which upstream a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// HTML tables rendered for browsers, parsed structurally.
    Scraped,
    /// The JSON database API.
    Json,
}

/// A nearby star system in the one shape the frontend consumes, whichever
/// upstream produced it.
///
/// Every field is always serialized. Values a source cannot provide take a
/// fixed default instead of being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedSystem {
    pub name: String,
    pub economy: String,
    pub security: String,
    /// [`DEFAULT_ALLEGIANCE`] when the source has no value.
    pub allegiance: String,
    pub factions: u32,
    pub stations: u32,
    /// Light-years from the reference system.
    pub distance: Option<f64>,
    /// Bearing in whole degrees, `-180..=180`. Only the scraped source has it.
    pub direction: Option<i32>,
    /// Only the JSON source has it; `0` otherwise.
    pub body_count: u32,
}

impl Default for NormalizedSystem {
    fn default() -> Self {
        Self {
            name: String::new(),
            economy: String::new(),
            security: String::new(),
            allegiance: DEFAULT_ALLEGIANCE.to_string(),
            factions: 0,
            stations: 0,
            distance: None,
            direction: None,
            body_count: 0,
        }
    }
}
