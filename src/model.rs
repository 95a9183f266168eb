/// Core data types for the ARPAV bulletin archiver.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic and no I/O, only types and their error impls.

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Header geometry types
// ---------------------------------------------------------------------------

/// One rendered header cell: its displayed text and its horizontal pixel
/// offset on the page.
///
/// Produced fresh per page render. The x-coordinate is the only signal the
/// bulletin table gives us for reconstructing the column hierarchy; the
/// HTML does not carry machine-friendly column spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub text: String,
    pub x: i64,
}

impl HeaderCell {
    pub fn new(text: impl Into<String>, x: i64) -> Self {
        Self { text: text.into(), x }
    }
}

/// A fully resolved data column: the (pollutant, measurement kind,
/// measurement unit) triple owning one column of the bulletin table.
///
/// Derived by the column linker from the three header rows; immutable once
/// built. Every data column resolves to exactly one triple whenever the page
/// carries a non-empty header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub pollutant: String,
    pub measurement_kind: String,
    pub measurement_unit: String,
    pub x: i64,
}

// ---------------------------------------------------------------------------
// Reading type
// ---------------------------------------------------------------------------

/// One scraped table cell, fully annotated with its column and row
/// provenance. The atomic archive unit; written once, never updated.
///
/// Serde field names mirror the archive CSV header exactly
/// (`cell_value, pollutant, meas_info, meas_unit, station_name, city_name,
/// date`), so serializing a `Reading` yields the fixed on-disk field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reading {
    pub cell_value: String,
    pub pollutant: String,
    #[serde(rename = "meas_info")]
    pub measurement_kind: String,
    #[serde(rename = "meas_unit")]
    pub measurement_unit: String,
    pub station_name: String,
    pub city_name: String,
    pub date: NaiveDate,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise while rendering or extracting a bulletin page.
///
/// An empty bulletin (no pollutant header row) is NOT an error; it is the
/// valid "nothing published for this date" outcome, handled by the caller.
#[derive(Debug, PartialEq)]
pub enum ScrapeError {
    /// The browser session could not render the page or answer a DOM query.
    Navigation(String),
    /// An expected DOM element was absent (nested link text, bolded station
    /// name, grid cell). A layout assumption was violated; fatal for the
    /// day's extraction and never masked.
    MalformedPage(String),
}

impl std::fmt::Display for ScrapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrapeError::Navigation(msg) => write!(f, "navigation error: {}", msg),
            ScrapeError::MalformedPage(msg) => write!(f, "malformed page: {}", msg),
        }
    }
}

impl std::error::Error for ScrapeError {}
