//! Structural extraction of the nearest-systems table from scraped HTML.
//!
//! The page is human-facing markup; the only contract relied on is a single
//! sortable, collapsible table whose body rows carry seven cells in a fixed
//! order:
//!
//! | # | Cell |
//! |---|------|
//! | 0 | system name (inside an `<a>`) |
//! | 1 | economy |
//! | 2 | security |
//! | 3 | allegiance |
//! | 4 | faction count |
//! | 5 | station count |
//! | 6 | `"<float> Ly"` plus an arrow element rotated by `rotate(<n>deg)` |
//!
//! Nothing in here fails. Rows with fewer than seven cells are skipped and
//! unparsable fields fall back to `0` or `None`.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::RawScrapedRow;

/// Minimum cells a body row needs to be read at all.
pub const MIN_CELLS: usize = 7;

static SYSTEMS_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table.tablesortercollapsed").expect("valid selector"));
static BODY_ROWS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody > tr").expect("valid selector"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("valid selector"));
static STYLED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[style]").expect("valid selector"));

static DISTANCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\.\d+)?)\s*ly\b").expect("valid distance regex")
});
static ROTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)rotate\(\s*(-?\d+)(?:\.\d+)?\s*deg\s*\)").expect("valid rotation regex")
});

/// Parses a full HTML document and extracts its nearest-systems rows.
#[must_use]
pub fn extract_nearest_systems(html: &str) -> Vec<RawScrapedRow> {
    let document = Html::parse_document(html);
    extract_rows(&document)
}

/// Extracts rows from an already-parsed document, in document order.
///
/// Returns an empty list, with a warning, when the systems table is missing.
#[must_use]
pub fn extract_rows(document: &Html) -> Vec<RawScrapedRow> {
    let mut tables = document.select(&SYSTEMS_TABLE);
    let Some(table) = tables.next() else {
        tracing::warn!("nearest-systems table not found in scraped page");
        return Vec::new();
    };
    if tables.next().is_some() {
        tracing::debug!("more than one systems table found, using the first");
    }

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for tr in table.select(&BODY_ROWS) {
        match parse_row(tr) {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    tracing::debug!(rows = rows.len(), skipped, "extracted nearest-systems table");
    rows
}

fn parse_row(tr: ElementRef<'_>) -> Option<RawScrapedRow> {
    let cells: Vec<ElementRef<'_>> = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "td")
        .collect();
    if cells.len() < MIN_CELLS {
        return None;
    }

    let name = cells[0]
        .select(&ANCHOR)
        .next()
        .map(element_text)
        .unwrap_or_default();

    Some(RawScrapedRow {
        name,
        economy: element_text(cells[1]),
        security: element_text(cells[2]),
        allegiance: element_text(cells[3]),
        factions: parse_count(&element_text(cells[4])),
        stations: parse_count(&element_text(cells[5])),
        distance: parse_distance(&element_text(cells[6])),
        direction: parse_direction(cells[6]),
    })
}

/// Text content with runs of whitespace collapsed and ends trimmed.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Non-negative integer cell; anything else is `0`.
pub(crate) fn parse_count(text: &str) -> u32 {
    text.trim().parse::<u32>().unwrap_or(0)
}

/// First `"<float> Ly"` in `text`, thousands separators allowed.
pub(crate) fn parse_distance(text: &str) -> Option<f64> {
    let caps = DISTANCE_RE.captures(text)?;
    caps[1].replace(',', "").parse::<f64>().ok()
}

/// Rotation of the first styled element under `cell` that declares one.
fn parse_direction(cell: ElementRef<'_>) -> Option<i32> {
    cell.select(&STYLED)
        .filter_map(|el| el.value().attr("style"))
        .find_map(parse_rotation)
}

/// Whole-degree `rotate(...)` value from a style attribute, within -180..=180.
pub(crate) fn parse_rotation(style: &str) -> Option<i32> {
    let caps = ROTATION_RE.captures(style)?;
    caps[1]
        .parse::<i32>()
        .ok()
        .filter(|deg| (-180..=180).contains(deg))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
