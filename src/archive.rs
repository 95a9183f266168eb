/// Per-month CSV archive sink.
///
/// Readings are routed to one file per (year, month) under the archive
/// root, laid out as `<root>/<year>/<month>/<year>_<month>_arpav_data.csv`.
/// At most one destination is open at a time; a reading for a different
/// month closes the current file and opens the next, creating directories
/// as needed and writing the header row once per file.
///
/// A destination that already exists on disk is a fatal setup error: stale
/// outputs must be cleared before re-running, the sink never overwrites.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Datelike;

use crate::model::Reading;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ArchiveError {
    /// The month file already exists on persistent storage. Reported, not
    /// auto-resolved; the walk must not proceed silently overwriting.
    DestinationExists(PathBuf),
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArchiveError::DestinationExists(path) => write!(
                f,
                "archive file already exists: {} (delete stale outputs and restart)",
                path.display()
            ),
            ArchiveError::Io(e) => write!(f, "archive I/O error: {}", e),
            ArchiveError::Csv(e) => write!(f, "archive CSV error: {}", e),
        }
    }
}

impl std::error::Error for ArchiveError {}

impl From<std::io::Error> for ArchiveError {
    fn from(e: std::io::Error) -> Self {
        ArchiveError::Io(e)
    }
}

impl From<csv::Error> for ArchiveError {
    fn from(e: csv::Error) -> Self {
        ArchiveError::Csv(e)
    }
}

// ---------------------------------------------------------------------------
// Monthly archive
// ---------------------------------------------------------------------------

struct OpenDestination {
    year: i32,
    month: u32,
    path: PathBuf,
    writer: csv::Writer<File>,
}

/// Sink owning at most one open month file at a time.
pub struct MonthlyArchive {
    root: PathBuf,
    open: Option<OpenDestination>,
}

/// Path of the month file for (year, month) under `root`. The month
/// component is not zero-padded.
pub fn destination_path(root: &Path, year: i32, month: u32) -> PathBuf {
    root.join(year.to_string())
        .join(month.to_string())
        .join(format!("{}_{}_arpav_data.csv", year, month))
}

impl MonthlyArchive {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        MonthlyArchive { root: root.into(), open: None }
    }

    /// Path of the currently open destination, if any.
    pub fn open_path(&self) -> Option<&Path> {
        self.open.as_ref().map(|d| d.path.as_path())
    }

    /// Appends one reading, rotating to the reading's month first if the
    /// open destination (if any) belongs to a different one. The CSV header
    /// is emitted from the `Reading` field names on the first record of
    /// each file.
    pub fn write(&mut self, reading: &Reading) -> Result<(), ArchiveError> {
        let year = reading.date.year();
        let month = reading.date.month();

        let current = matches!(&self.open, Some(d) if d.year == year && d.month == month);
        if !current {
            self.close()?;
            self.open = Some(self.open_destination(year, month)?);
        }

        if let Some(dest) = self.open.as_mut() {
            dest.writer.serialize(reading)?;
        }
        Ok(())
    }

    /// Flushes and closes the open destination, if any. Safe to call when
    /// nothing is open; the walker calls this on both the success and the
    /// error path.
    pub fn close(&mut self) -> Result<(), ArchiveError> {
        if let Some(mut dest) = self.open.take() {
            dest.writer.flush()?;
        }
        Ok(())
    }

    fn open_destination(&self, year: i32, month: u32) -> Result<OpenDestination, ArchiveError> {
        let path = destination_path(&self.root, year, month);
        if path.exists() {
            return Err(ArchiveError::DestinationExists(path));
        }
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let writer = csv::Writer::from_path(&path)?;
        Ok(OpenDestination { year, month, path, writer })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading_on(date: NaiveDate) -> Reading {
        Reading {
            cell_value: "41".to_string(),
            pollutant: "NO2".to_string(),
            measurement_kind: "max ora".to_string(),
            measurement_unit: "conc.".to_string(),
            station_name: "Area Feltrina".to_string(),
            city_name: "Belluno".to_string(),
            date,
        }
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_destination_path_layout() {
        let path = destination_path(Path::new("/data/arpav"), 2011, 3);
        assert_eq!(
            path,
            PathBuf::from("/data/arpav/2011/3/2011_3_arpav_data.csv"),
            "month directory and file name must not be zero-padded"
        );
    }

    #[test]
    fn test_header_written_once_with_fixed_field_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = MonthlyArchive::new(dir.path());
        archive.write(&reading_on(ymd(2011, 1, 1))).unwrap();
        archive.write(&reading_on(ymd(2011, 1, 2))).unwrap();
        archive.close().unwrap();

        let content =
            fs::read_to_string(destination_path(dir.path(), 2011, 1)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3, "one header row plus two records");
        assert_eq!(
            lines[0],
            "cell_value,pollutant,meas_info,meas_unit,station_name,city_name,date"
        );
        assert!(lines[1].ends_with("2011-01-01"));
    }

    #[test]
    fn test_month_rollover_opens_second_destination() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = MonthlyArchive::new(dir.path());

        archive.write(&reading_on(ymd(2011, 1, 31))).unwrap();
        let january = destination_path(dir.path(), 2011, 1);
        assert_eq!(archive.open_path(), Some(january.as_path()));

        archive.write(&reading_on(ymd(2011, 2, 1))).unwrap();
        let february = destination_path(dir.path(), 2011, 2);
        assert_eq!(
            archive.open_path(),
            Some(february.as_path()),
            "a February reading must rotate the sink off the January file"
        );

        // January was flushed on rotation: its record is durable before
        // February's file was opened.
        let january_content = fs::read_to_string(&january).unwrap();
        assert_eq!(january_content.lines().count(), 2);

        archive.close().unwrap();
        let february_content = fs::read_to_string(&february).unwrap();
        assert_eq!(february_content.lines().count(), 2);
    }

    #[test]
    fn test_same_month_readings_share_one_destination() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = MonthlyArchive::new(dir.path());
        for day in 1..=5 {
            archive.write(&reading_on(ymd(2012, 6, day))).unwrap();
        }
        archive.close().unwrap();

        let content = fs::read_to_string(destination_path(dir.path(), 2012, 6)).unwrap();
        assert_eq!(content.lines().count(), 6, "header plus five records");
    }

    #[test]
    fn test_preexisting_destination_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let stale = destination_path(dir.path(), 2011, 1);
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "leftover from a previous run\n").unwrap();

        let mut archive = MonthlyArchive::new(dir.path());
        let err = archive
            .write(&reading_on(ymd(2011, 1, 1)))
            .expect_err("a pre-existing month file must abort, never overwrite");
        match err {
            ArchiveError::DestinationExists(path) => assert_eq!(path, stale),
            other => panic!("expected DestinationExists, got {}", other),
        }
        assert_eq!(
            fs::read_to_string(&stale).unwrap(),
            "leftover from a previous run\n",
            "the stale file must be untouched"
        );
    }

    #[test]
    fn test_close_without_open_destination_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = MonthlyArchive::new(dir.path());
        archive.close().unwrap();
        archive.close().unwrap();
    }
}
