/// Bulletin table extraction.
///
/// Turns one rendered bulletin page into `Reading`s: reads the three header
/// rows, rebuilds the column hierarchy via `columns`, then walks the data
/// grid cell by cell. Page access goes through the `TableGeometry` trait so
/// the whole pipeline runs against synthetic geometries in tests, no
/// browser required (the live implementation lives in `ingest::portal`).

use chrono::NaiveDate;

use crate::columns::{link_kinds_to_pollutants, link_units_to_kinds};
use crate::model::{ColumnDescriptor, HeaderCell, Reading, ScrapeError};

// ---------------------------------------------------------------------------
// Table layout constants
// ---------------------------------------------------------------------------

/// The first three measurement-unit columns are row-label metadata, not data
/// columns. Fixed offset in the portal's layout, not geometry-derived.
pub const METADATA_UNIT_COLUMNS: usize = 3;

/// Offset from a 0-based (data column, station row) pair to the raw 1-based
/// table coordinates: 1 for 1-based indexing plus 3 header/label rows or
/// columns. Post-drop column 0, row 0 lives at raw (4, 4).
pub const GRID_OFFSET: usize = 4;

// ---------------------------------------------------------------------------
// Render geometry capability
// ---------------------------------------------------------------------------

/// Read access to the rendered bulletin table's text and cell geometry.
///
/// Implementations answer for whatever page is currently rendered. All
/// methods may fail with `ScrapeError::MalformedPage` when an element the
/// layout promises is absent; that failure is fatal for the day and must
/// not be masked.
pub trait TableGeometry {
    /// Header row 1: pollutant names. Empty means the portal published no
    /// bulletin for the selected date, a valid outcome rather than an error.
    fn pollutant_row(&self) -> Result<Vec<HeaderCell>, ScrapeError>;

    /// Header row 2: measurement kinds. Each cell's displayed text comes
    /// from a nested link element, not the cell's aggregate text.
    fn measurement_kind_row(&self) -> Result<Vec<HeaderCell>, ScrapeError>;

    /// Header row 3: measurement units, as plain cell text.
    fn measurement_unit_row(&self) -> Result<Vec<HeaderCell>, ScrapeError>;

    /// Station name per data row, taken from the bolded sub-element of the
    /// second cell of every data row.
    fn station_names(&self) -> Result<Vec<String>, ScrapeError>;

    /// Text of the grid cell at raw 1-based (row, col) table coordinates.
    fn data_cell(&self, row: usize, col: usize) -> Result<String, ScrapeError>;
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Result of extracting one bulletin page.
///
/// `had_data` distinguishes "the portal published nothing for this date"
/// (empty pollutant header) from a day that produced readings.
#[derive(Debug)]
pub struct ExtractOutcome {
    pub readings: Vec<Reading>,
    pub had_data: bool,
}

/// Extracts every reading from the currently rendered bulletin.
///
/// Emits one `Reading` per (data column, station row) cell, each annotated
/// with the column's (pollutant, kind, unit) triple, the row's station name,
/// and the caller-supplied city and date.
pub fn extract_bulletin<G: TableGeometry + ?Sized>(
    page: &G,
    city_name: &str,
    date: NaiveDate,
) -> Result<ExtractOutcome, ScrapeError> {
    let pollutants = page.pollutant_row()?;
    if pollutants.is_empty() {
        return Ok(ExtractOutcome { readings: Vec::new(), had_data: false });
    }

    let kinds = page.measurement_kind_row()?;
    let linked_kinds = link_kinds_to_pollutants(&pollutants, &kinds);

    let units = page.measurement_unit_row()?;
    let mut columns = link_units_to_kinds(&linked_kinds, &units);

    // Row-label metadata columns carry no measurements.
    columns.drain(..METADATA_UNIT_COLUMNS.min(columns.len()));

    let stations = page.station_names()?;

    let mut readings = Vec::with_capacity(columns.len() * stations.len());
    for (i, column) in columns.iter().enumerate() {
        for (j, station) in stations.iter().enumerate() {
            let cell_value = page.data_cell(j + GRID_OFFSET, i + GRID_OFFSET)?;
            readings.push(reading_for(column, &cell_value, station, city_name, date));
        }
    }

    Ok(ExtractOutcome { readings, had_data: true })
}

fn reading_for(
    column: &ColumnDescriptor,
    cell_value: &str,
    station_name: &str,
    city_name: &str,
    date: NaiveDate,
) -> Reading {
    Reading {
        cell_value: cell_value.to_string(),
        pollutant: column.pollutant.clone(),
        measurement_kind: column.measurement_kind.clone(),
        measurement_unit: column.measurement_unit.clone(),
        station_name: station_name.to_string(),
        city_name: city_name.to_string(),
        date,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
