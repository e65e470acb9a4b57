//! Normalization from source-native records to [`NormalizedSystem`].
//!
//! Order-preserving and one-to-one: every input record produces exactly one
//! output record, in the same position. Unlike the HTML extractor, which
//! drops short rows, a malformed JSON record is kept with defaulted fields.

use starlane_core::{NormalizedSystem, SourceKind, DEFAULT_ALLEGIANCE};

use crate::types::{RawJsonSystem, RawScrapedRow};

/// Raw records tagged with the upstream they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecords {
    Scraped(Vec<RawScrapedRow>),
    Json(Vec<RawJsonSystem>),
}

impl RawRecords {
    #[must_use]
    pub fn source_kind(&self) -> SourceKind {
        match self {
            RawRecords::Scraped(_) => SourceKind::Scraped,
            RawRecords::Json(_) => SourceKind::Json,
        }
    }
}

/// Maps any batch of raw records into the canonical shape.
#[must_use]
pub fn normalize(records: RawRecords) -> Vec<NormalizedSystem> {
    match records {
        RawRecords::Scraped(rows) => rows.into_iter().map(normalize_scraped).collect(),
        RawRecords::Json(systems) => systems.into_iter().map(normalize_json).collect(),
    }
}

/// Scraped rows are already in target shape. `body_count` is filled in and
/// a blank allegiance becomes [`DEFAULT_ALLEGIANCE`].
#[must_use]
pub fn normalize_scraped(row: RawScrapedRow) -> NormalizedSystem {
    NormalizedSystem {
        name: row.name,
        economy: row.economy,
        security: row.security,
        allegiance: allegiance_or_default(Some(row.allegiance)),
        factions: row.factions,
        stations: row.stations,
        distance: row.distance,
        direction: row.direction,
        body_count: 0,
    }
}

/// Maps one JSON API record.
///
/// - No information block: economy and security are empty strings.
/// - Allegiance is [`DEFAULT_ALLEGIANCE`] when missing, `null` or blank.
/// - The API exposes only the controlling faction, so `factions` is `1` when
///   one is named and `0` otherwise.
/// - The API has no station count or bearing: `stations` is `0`, `direction`
///   is `None`.
#[must_use]
pub fn normalize_json(system: RawJsonSystem) -> NormalizedSystem {
    let info = system.information.unwrap_or_default();
    let factions = u32::from(info.has_faction());

    NormalizedSystem {
        name: system.name.unwrap_or_default(),
        economy: info.economy.unwrap_or_default(),
        security: info.security.unwrap_or_default(),
        allegiance: allegiance_or_default(info.allegiance),
        factions,
        stations: 0,
        distance: system.distance,
        direction: None,
        body_count: system.body_count.unwrap_or(0),
    }
}

fn allegiance_or_default(value: Option<String>) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ALLEGIANCE.to_string())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
