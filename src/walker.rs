/// Day-by-day archive walk.
///
/// Drives one render → extract → archive cycle per calendar day, strictly
/// sequentially, and accumulates the walk summary. Days the portal
/// published nothing for are recorded, not retried; extraction and archive
/// errors halt the walk (the open destination is still closed on the way
/// out).

use std::error::Error;

use chrono::{Datelike, NaiveDate};

use crate::archive::MonthlyArchive;
use crate::extract::{extract_bulletin, TableGeometry};
use crate::logging::{self, Stage};
use crate::model::ScrapeError;

// ---------------------------------------------------------------------------
// Navigator capability
// ---------------------------------------------------------------------------

/// Renders the archive portal's bulletin for one (province, date) and then
/// answers `TableGeometry` queries for the rendered page.
///
/// The live implementation drives a browser (`ingest::portal`); tests
/// substitute scripted pages.
pub trait Navigator: TableGeometry {
    fn render_bulletin(&mut self, city_name: &str, date: NaiveDate) -> Result<(), ScrapeError>;
}

// ---------------------------------------------------------------------------
// Walk summary
// ---------------------------------------------------------------------------

/// Outcome of a full walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub total_readings: usize,
    /// Days that produced zero readings, in walk order. A high ratio flags
    /// suspicious gaps in the portal's archive; it never triggers retries.
    pub missing_dates: Vec<NaiveDate>,
    pub days_walked: usize,
}

impl ScrapeSummary {
    /// Fraction of walked days that produced no readings.
    pub fn missing_ratio(&self) -> f64 {
        if self.days_walked == 0 {
            0.0
        } else {
            self.missing_dates.len() as f64 / self.days_walked as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Walks every calendar day from `start_date` up to (but not including)
/// January 1 of `end_year`, archiving each day's readings.
///
/// The archive destination is closed before returning on both the success
/// and the error path.
pub fn walk<N: Navigator + ?Sized>(
    navigator: &mut N,
    archive: &mut MonthlyArchive,
    city_name: &str,
    start_date: NaiveDate,
    end_year: i32,
) -> Result<ScrapeSummary, Box<dyn Error>> {
    let result = walk_days(navigator, archive, city_name, start_date, end_year);
    let closed = archive.close();
    let summary = result?;
    closed?;
    Ok(summary)
}

fn walk_days<N: Navigator + ?Sized>(
    navigator: &mut N,
    archive: &mut MonthlyArchive,
    city_name: &str,
    start_date: NaiveDate,
    end_year: i32,
) -> Result<ScrapeSummary, Box<dyn Error>> {
    let mut summary = ScrapeSummary {
        total_readings: 0,
        missing_dates: Vec::new(),
        days_walked: 0,
    };

    let mut date = start_date;
    while date.year() < end_year {
        let day = date.to_string();

        logging::debug(Stage::Portal, Some(&day), "rendering bulletin");
        if let Err(e) = navigator.render_bulletin(city_name, date) {
            logging::error(Stage::Portal, Some(&day), &e.to_string());
            return Err(e.into());
        }

        let outcome = match extract_bulletin(&*navigator, city_name, date) {
            Ok(outcome) => outcome,
            Err(e) => {
                logging::error(Stage::Extract, Some(&day), &e.to_string());
                return Err(e.into());
            }
        };

        if outcome.readings.is_empty() {
            logging::info(Stage::Extract, Some(&day), "no readings published for this date");
            summary.missing_dates.push(date);
        } else {
            for reading in &outcome.readings {
                if let Err(e) = archive.write(reading) {
                    logging::error(Stage::Archive, Some(&day), &e.to_string());
                    return Err(e.into());
                }
            }
            summary.total_readings += outcome.readings.len();
            logging::info(
                Stage::Extract,
                Some(&day),
                &format!("archived {} readings", outcome.readings.len()),
            );
        }

        summary.days_walked += 1;
        date = date.succ_opt().ok_or("calendar overflow while advancing the walk date")?;
    }

    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HeaderCell;
    use std::collections::HashSet;

    /// Scripted portal: dates in `published` render a minimal one-column,
    /// one-station bulletin; every other date renders an empty one.
    struct ScriptedPortal {
        published: HashSet<NaiveDate>,
        rendered: Vec<(String, NaiveDate)>,
        current_has_data: bool,
        fail_rendering: Option<NaiveDate>,
    }

    impl ScriptedPortal {
        fn new(published: &[NaiveDate]) -> Self {
            ScriptedPortal {
                published: published.iter().copied().collect(),
                rendered: Vec::new(),
                current_has_data: false,
                fail_rendering: None,
            }
        }
    }

    impl Navigator for ScriptedPortal {
        fn render_bulletin(
            &mut self,
            city_name: &str,
            date: NaiveDate,
        ) -> Result<(), ScrapeError> {
            if self.fail_rendering == Some(date) {
                return Err(ScrapeError::Navigation("connection reset".to_string()));
            }
            self.rendered.push((city_name.to_string(), date));
            self.current_has_data = self.published.contains(&date);
            Ok(())
        }
    }

    impl TableGeometry for ScriptedPortal {
        fn pollutant_row(&self) -> Result<Vec<HeaderCell>, ScrapeError> {
            if self.current_has_data {
                Ok(vec![HeaderCell::new("NO2", 0)])
            } else {
                Ok(Vec::new())
            }
        }
        fn measurement_kind_row(&self) -> Result<Vec<HeaderCell>, ScrapeError> {
            Ok(vec![HeaderCell::new("max ora", 0)])
        }
        fn measurement_unit_row(&self) -> Result<Vec<HeaderCell>, ScrapeError> {
            Ok(vec![
                HeaderCell::new("Staz.", 0),
                HeaderCell::new("Prov.", 10),
                HeaderCell::new("Com.", 20),
                HeaderCell::new("conc.", 40),
            ])
        }
        fn station_names(&self) -> Result<Vec<String>, ScrapeError> {
            Ok(vec!["Area Feltrina".to_string()])
        }
        fn data_cell(&self, _row: usize, _col: usize) -> Result<String, ScrapeError> {
            Ok("42".to_string())
        }
    }

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn temp_archive() -> (tempfile::TempDir, MonthlyArchive) {
        let dir = tempfile::tempdir().unwrap();
        let archive = MonthlyArchive::new(dir.path());
        (dir, archive)
    }

    #[test]
    fn test_walk_covers_every_day_before_end_year() {
        let mut portal = ScriptedPortal::new(&[]);
        let (_dir, mut archive) = temp_archive();

        let summary =
            walk(&mut portal, &mut archive, "Belluno", ymd(2018, 12, 30), 2019).unwrap();

        assert_eq!(summary.days_walked, 2, "Dec 30 and Dec 31 only");
        assert_eq!(
            portal.rendered,
            vec![
                ("Belluno".to_string(), ymd(2018, 12, 30)),
                ("Belluno".to_string(), ymd(2018, 12, 31)),
            ]
        );
    }

    #[test]
    fn test_walk_visits_leap_day() {
        let mut portal = ScriptedPortal::new(&[]);
        let (_dir, mut archive) = temp_archive();

        let summary =
            walk(&mut portal, &mut archive, "Belluno", ymd(2016, 2, 28), 2017).unwrap();

        assert!(
            summary.missing_dates.contains(&ymd(2016, 2, 29)),
            "calendar-exact iteration must visit Feb 29"
        );
        // Feb 28 through Dec 31 of a leap year.
        assert_eq!(summary.days_walked, 308);
    }

    #[test]
    fn test_days_without_readings_are_recorded_in_order() {
        let published = [ymd(2018, 12, 30)];
        let mut portal = ScriptedPortal::new(&published);
        let (_dir, mut archive) = temp_archive();

        let summary =
            walk(&mut portal, &mut archive, "Belluno", ymd(2018, 12, 29), 2019).unwrap();

        assert_eq!(summary.total_readings, 1);
        assert_eq!(summary.missing_dates, vec![ymd(2018, 12, 29), ymd(2018, 12, 31)]);
        assert_eq!(summary.days_walked, 3);
        let expected_ratio = 2.0 / 3.0;
        assert!((summary.missing_ratio() - expected_ratio).abs() < 1e-9);
    }

    #[test]
    fn test_navigation_error_halts_walk_and_closes_archive() {
        let published = [ymd(2018, 12, 29), ymd(2018, 12, 30)];
        let mut portal = ScriptedPortal::new(&published);
        portal.fail_rendering = Some(ymd(2018, 12, 30));
        let (dir, mut archive) = temp_archive();

        let err = walk(&mut portal, &mut archive, "Belluno", ymd(2018, 12, 29), 2019)
            .expect_err("a failed render must halt the walk");
        assert!(err.to_string().contains("connection reset"));
        assert!(archive.open_path().is_none(), "archive must be closed on the error path");

        // The day archived before the failure is durable.
        let december = crate::archive::destination_path(dir.path(), 2018, 12);
        let content = std::fs::read_to_string(december).unwrap();
        assert_eq!(content.lines().count(), 2, "header plus the one archived reading");
    }

    #[test]
    fn test_empty_summary_ratio_is_zero() {
        let summary = ScrapeSummary {
            total_readings: 0,
            missing_dates: Vec::new(),
            days_walked: 0,
        };
        assert_eq!(summary.missing_ratio(), 0.0);
    }
}
