/// Browser-backed page ingestion.
///
/// `webdriver` speaks the W3C wire protocol; `portal` layers the ARPAV
/// archive page's form driving and table geometry on top of it.

pub mod portal;
pub mod webdriver;
