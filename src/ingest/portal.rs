/// ARPAV archive portal navigator.
///
/// Drives the historical air-quality bulletin page: fills the
/// province/day/month/year form, submits it, and exposes the rendered
/// table's geometry to the extractor. The portal's HTML structure is the
/// de facto wire format here: the XPath constants below are the layout
/// contract, and a query they fail to satisfy is a `MalformedPage`.

use chrono::{Datelike, NaiveDate};

use crate::extract::TableGeometry;
use crate::model::{HeaderCell, ScrapeError};
use crate::walker::Navigator;

use super::webdriver::{WebDriverError, WebDriverSession};

// ============================================================================
// Portal layout contract
// ============================================================================

/// The fixed archive page for validated air-quality data.
pub const ARPAV_AIR_ARCHIVE_URL: &str =
    "https://www.arpa.veneto.it/arpavinforma/bollettini/aria/aria_dati_validati_storico.php";

/// Selection form fields, in fill order.
const FORM_FIELDS: [&str; 4] = ["provincia", "giorno", "mese", "anno"];

/// The "Visualizza il bollettino" submit button.
const SUBMIT_BUTTON_XPATH: &str = "//input[@name='Vai' and @value='Visualizza il bollettino']";

/// Body of the bulletin table.
const BULLETIN_TBODY: &str = "//div[@id='ariadativalidati']/table/tbody";

fn header_row_xpath(row: usize) -> String {
    format!("{}/tr[{}]/td", BULLETIN_TBODY, row)
}

fn station_names_xpath() -> String {
    format!("{}/tr/td[2]/strong", BULLETIN_TBODY)
}

fn grid_cell_xpath(row: usize, col: usize) -> String {
    format!("{}/tr[{}]/td[{}]", BULLETIN_TBODY, row, col)
}

/// Values typed into the selection form, one per `FORM_FIELDS` entry: day
/// and month zero-padded to two digits, year as-is.
fn form_values(city_name: &str, date: NaiveDate) -> [String; 4] {
    [
        city_name.to_string(),
        format!("{:02}", date.day()),
        format!("{:02}", date.month()),
        date.year().to_string(),
    ]
}

// ============================================================================
// Portal session
// ============================================================================

/// A live browser session pointed at the ARPAV archive portal.
pub struct ArpavPortal {
    session: WebDriverSession,
}

impl ArpavPortal {
    /// Opens a browser session against the given WebDriver endpoint.
    pub fn connect(webdriver_url: &str) -> Result<Self, ScrapeError> {
        let session = WebDriverSession::connect(webdriver_url).map_err(navigation)?;
        Ok(ArpavPortal { session })
    }

    /// Closes the browser session.
    pub fn quit(self) -> Result<(), ScrapeError> {
        self.session.quit().map_err(navigation)
    }

    /// Reads one header row as (text, x) cells. Row 2's displayed text
    /// lives in a nested link element, not the cell's aggregate text.
    fn header_row(&self, row: usize, text_in_nested_link: bool) -> Result<Vec<HeaderCell>, ScrapeError> {
        let cells = self
            .session
            .find_elements(&header_row_xpath(row))
            .map_err(navigation)?;

        let mut header = Vec::with_capacity(cells.len());
        for cell in &cells {
            let x = self.session.element_rect(cell).map_err(navigation)?.x.round() as i64;
            let text = if text_in_nested_link {
                let link = match self.session.find_child_by_tag(cell, "a") {
                    Ok(link) => link,
                    Err(WebDriverError::NoSuchElement(_)) => {
                        return Err(ScrapeError::MalformedPage(format!(
                            "header row {} cell at x={} has no nested link",
                            row, x
                        )));
                    }
                    Err(e) => return Err(navigation(e)),
                };
                self.session.element_text(&link).map_err(navigation)?
            } else {
                self.session.element_text(cell).map_err(navigation)?
            };
            header.push(HeaderCell { text, x });
        }
        Ok(header)
    }
}

impl Navigator for ArpavPortal {
    fn render_bulletin(&mut self, city_name: &str, date: NaiveDate) -> Result<(), ScrapeError> {
        self.session.goto(ARPAV_AIR_ARCHIVE_URL).map_err(navigation)?;

        for (field, value) in FORM_FIELDS.iter().zip(form_values(city_name, date)) {
            let combo = self
                .session
                .find_element(&format!("//*[@name='{}']", field))
                .map_err(navigation)?;
            self.session.send_keys(&combo, &value).map_err(navigation)?;
        }

        let go = self.session.find_element(SUBMIT_BUTTON_XPATH).map_err(navigation)?;
        self.session.click(&go).map_err(navigation)?;
        Ok(())
    }
}

impl TableGeometry for ArpavPortal {
    fn pollutant_row(&self) -> Result<Vec<HeaderCell>, ScrapeError> {
        self.header_row(1, false)
    }

    fn measurement_kind_row(&self) -> Result<Vec<HeaderCell>, ScrapeError> {
        self.header_row(2, true)
    }

    fn measurement_unit_row(&self) -> Result<Vec<HeaderCell>, ScrapeError> {
        self.header_row(3, false)
    }

    fn station_names(&self) -> Result<Vec<String>, ScrapeError> {
        let cells = self
            .session
            .find_elements(&station_names_xpath())
            .map_err(navigation)?;
        let mut names = Vec::with_capacity(cells.len());
        for cell in &cells {
            names.push(self.session.element_text(cell).map_err(navigation)?);
        }
        Ok(names)
    }

    fn data_cell(&self, row: usize, col: usize) -> Result<String, ScrapeError> {
        let cells = self
            .session
            .find_elements(&grid_cell_xpath(row, col))
            .map_err(navigation)?;
        let cell = cells.first().ok_or_else(|| {
            ScrapeError::MalformedPage(format!("missing grid cell at row {}, col {}", row, col))
        })?;
        self.session.element_text(cell).map_err(navigation)
    }
}

fn navigation(e: WebDriverError) -> ScrapeError {
    ScrapeError::Navigation(e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
