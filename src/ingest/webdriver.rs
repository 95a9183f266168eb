/// Minimal W3C WebDriver client.
///
/// The bulletin portal only renders its table after a form submission, and
/// the column-reconstruction algorithm needs rendered pixel positions, so
/// pages are driven through a real browser via a WebDriver endpoint
/// (chromedriver or geckodriver). This module speaks the small slice of the
/// wire protocol the archiver needs: one session, navigation, element
/// lookup, text/rect reads, keystrokes, clicks.
///
/// Protocol reference: https://www.w3.org/TR/webdriver/

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

/// JSON key carrying an element id in W3C WebDriver payloads.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

// ============================================================================
// Wire payload structures
// ============================================================================

/// Reference to a DOM element held by the browser session.
#[derive(Debug, Clone, Deserialize)]
pub struct ElementRef {
    #[serde(rename = "element-6066-11e4-a52e-4f735466cecf")]
    pub id: String,
}

/// An element's rendered bounding box, in CSS pixels.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Every WebDriver response wraps its payload in `{"value": ...}`.
#[derive(Debug, Deserialize)]
struct WireValue<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Debug)]
pub enum WebDriverError {
    /// Transport-level failure reaching the WebDriver endpoint.
    Http(reqwest::Error),
    /// The endpoint answered with a protocol error other than
    /// "no such element".
    Command { status: u16, error: String, message: String },
    /// The queried element does not exist on the rendered page.
    NoSuchElement(String),
    /// The response body did not match the expected wire shape.
    Protocol(String),
}

impl std::fmt::Display for WebDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebDriverError::Http(e) => write!(f, "webdriver transport error: {}", e),
            WebDriverError::Command { status, error, message } => {
                write!(f, "webdriver command failed (HTTP {}, {}): {}", status, error, message)
            }
            WebDriverError::NoSuchElement(msg) => write!(f, "no such element: {}", msg),
            WebDriverError::Protocol(msg) => write!(f, "webdriver protocol error: {}", msg),
        }
    }
}

impl std::error::Error for WebDriverError {}

impl From<reqwest::Error> for WebDriverError {
    fn from(e: reqwest::Error) -> Self {
        WebDriverError::Http(e)
    }
}

// ============================================================================
// Session
// ============================================================================

/// One browser session against a WebDriver endpoint.
pub struct WebDriverSession {
    client: reqwest::blocking::Client,
    base: String,
    session_id: String,
}

impl WebDriverSession {
    /// Opens a new session. `server_url` is the endpoint root, e.g.
    /// `http://localhost:9515`.
    pub fn connect(server_url: &str) -> Result<Self, WebDriverError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        let base = server_url.trim_end_matches('/').to_string();

        let response = client
            .post(format!("{}/session", base))
            .json(&json!({ "capabilities": { "alwaysMatch": {} } }))
            .send()?;
        let session: NewSession = unwrap_value(response)?;

        Ok(WebDriverSession { client, base, session_id: session.session_id })
    }

    /// Navigates the session's browser to `url` and blocks until the page
    /// load settles.
    pub fn goto(&self, url: &str) -> Result<(), WebDriverError> {
        self.post::<serde_json::Value>("url", json!({ "url": url }))?;
        Ok(())
    }

    /// First element matching the XPath, or `NoSuchElement`.
    pub fn find_element(&self, xpath: &str) -> Result<ElementRef, WebDriverError> {
        self.post("element", json!({ "using": "xpath", "value": xpath }))
    }

    /// All elements matching the XPath; an empty list is not an error.
    pub fn find_elements(&self, xpath: &str) -> Result<Vec<ElementRef>, WebDriverError> {
        self.post("elements", json!({ "using": "xpath", "value": xpath }))
    }

    /// First descendant of `parent` with the given tag name, or
    /// `NoSuchElement`.
    pub fn find_child_by_tag(
        &self,
        parent: &ElementRef,
        tag: &str,
    ) -> Result<ElementRef, WebDriverError> {
        self.post(
            &format!("element/{}/element", parent.id),
            json!({ "using": "tag name", "value": tag }),
        )
    }

    /// The element's rendered text.
    pub fn element_text(&self, element: &ElementRef) -> Result<String, WebDriverError> {
        self.get(&format!("element/{}/text", element.id))
    }

    /// The element's rendered bounding box.
    pub fn element_rect(&self, element: &ElementRef) -> Result<ElementRect, WebDriverError> {
        self.get(&format!("element/{}/rect", element.id))
    }

    /// Types `text` into the element (used for the portal's combo boxes).
    pub fn send_keys(&self, element: &ElementRef, text: &str) -> Result<(), WebDriverError> {
        self.post::<serde_json::Value>(
            &format!("element/{}/value", element.id),
            json!({ "text": text }),
        )?;
        Ok(())
    }

    /// Clicks the element.
    pub fn click(&self, element: &ElementRef) -> Result<(), WebDriverError> {
        self.post::<serde_json::Value>(&format!("element/{}/click", element.id), json!({}))?;
        Ok(())
    }

    /// Ends the session, closing the browser window it owns.
    pub fn quit(self) -> Result<(), WebDriverError> {
        let url = format!("{}/session/{}", self.base, self.session_id);
        let response = self.client.delete(url).send()?;
        unwrap_value::<serde_json::Value>(response)?;
        Ok(())
    }

    fn post<T: DeserializeOwned>(
        &self,
        command: &str,
        body: serde_json::Value,
    ) -> Result<T, WebDriverError> {
        let url = format!("{}/session/{}/{}", self.base, self.session_id, command);
        let response = self.client.post(url).json(&body).send()?;
        unwrap_value(response)
    }

    fn get<T: DeserializeOwned>(&self, command: &str) -> Result<T, WebDriverError> {
        let url = format!("{}/session/{}/{}", self.base, self.session_id, command);
        let response = self.client.get(url).send()?;
        unwrap_value(response)
    }
}

/// Unwraps `{"value": ...}` on success; maps protocol errors, keeping
/// "no such element" distinct so callers can treat it as a layout signal
/// rather than a transport failure.
fn unwrap_value<T: DeserializeOwned>(
    response: reqwest::blocking::Response,
) -> Result<T, WebDriverError> {
    let status = response.status();
    let body = response.text()?;

    if status.is_success() {
        let wire: WireValue<T> = serde_json::from_str(&body)
            .map_err(|e| WebDriverError::Protocol(format!("{} in body {:?}", e, body)))?;
        return Ok(wire.value);
    }

    match serde_json::from_str::<WireValue<WireError>>(&body) {
        Ok(wire) if wire.value.error == "no such element" => {
            Err(WebDriverError::NoSuchElement(wire.value.message))
        }
        Ok(wire) => Err(WebDriverError::Command {
            status: status.as_u16(),
            error: wire.value.error,
            message: wire.value.message,
        }),
        Err(_) => Err(WebDriverError::Protocol(format!(
            "HTTP {} with unparseable body {:?}",
            status, body
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_ref_parses_w3c_key() {
        let json = format!(r#"{{"{}": "abc-123"}}"#, ELEMENT_KEY);
        let element: ElementRef = serde_json::from_str(&json).unwrap();
        assert_eq!(element.id, "abc-123");
    }

    #[test]
    fn test_element_rect_parses_fractional_pixels() {
        let rect: ElementRect =
            serde_json::from_str(r#"{"x": 118.5, "y": 30.0, "width": 48.0, "height": 20.0}"#)
                .unwrap();
        assert_eq!(rect.x, 118.5);
        assert_eq!(rect.width, 48.0);
    }

    #[test]
    fn test_new_session_response_parses() {
        let body = r#"{"value": {"sessionId": "f9c30a", "capabilities": {"browserName": "chrome"}}}"#;
        let wire: WireValue<NewSession> = serde_json::from_str(body).unwrap();
        assert_eq!(wire.value.session_id, "f9c30a");
    }

    #[test]
    fn test_wire_error_parses() {
        let body = r#"{"value": {"error": "no such element", "message": "Unable to locate element", "stacktrace": ""}}"#;
        let wire: WireValue<WireError> = serde_json::from_str(body).unwrap();
        assert_eq!(wire.value.error, "no such element");
        assert!(wire.value.message.starts_with("Unable"));
    }
}
