//! Source-native record shapes, before normalization.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One body row of the scraped nearest-systems table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawScrapedRow {
    pub name: String,
    pub economy: String,
    pub security: String,
    pub allegiance: String,
    /// `0` when the cell does not parse as an integer.
    pub factions: u32,
    /// `0` when the cell does not parse as an integer.
    pub stations: u32,
    /// Light-years, from `"<float> Ly"` text; `None` when absent.
    pub distance: Option<f64>,
    /// Whole degrees from a `rotate(<n>deg)` style; `None` when absent.
    pub direction: Option<i32>,
}

/// One system from the JSON API's sphere search.
///
/// Every field is optional and decoded on its own: a missing key, an
/// explicit `null` and a wrong-typed value all become `None` without
/// touching the other fields. Defaulting happens in [`crate::normalize`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJsonSystem {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    /// The API sends `[]` instead of an object when it knows nothing.
    #[serde(default, deserialize_with = "object_or_none")]
    pub information: Option<SystemInformation>,
    #[serde(default, deserialize_with = "lenient")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub body_count: Option<u32>,
}

/// The nested `information` block of a [`RawJsonSystem`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInformation {
    #[serde(default, deserialize_with = "lenient")]
    pub economy: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub security: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub allegiance: Option<String>,
    /// Controlling faction. Only its presence is used.
    #[serde(default)]
    pub faction: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub population: Option<u64>,
}

impl RawJsonSystem {
    /// Best-effort conversion of one array element.
    ///
    /// Bad fields are dropped one by one. Only an element that is not an
    /// object at all comes back empty.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "system record is not an object, defaulting fields");
            Self::default()
        })
    }
}

impl SystemInformation {
    /// `true` when the block names a controlling faction.
    #[must_use]
    pub fn has_faction(&self) -> bool {
        match &self.faction {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.trim().is_empty(),
            Some(_) => true,
        }
    }
}

fn object_or_none<'de, D>(deserializer: D) -> Result<Option<SystemInformation>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(SystemInformation::deserialize(&value).ok())
}

/// Decodes one field, mapping a wrong-typed value to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}
