//! ARPAV historical air-quality bulletin archiver.
//!
//! Scrapes the regional agency's archive portal one calendar day at a time
//! and persists the bulletin table's pollutant readings to per-month CSV
//! files. The table's header hierarchy is reconstructed positionally from
//! rendered x-coordinates (`columns`), the extraction pipeline runs over an
//! abstract page geometry (`extract`), and a browser-backed navigator
//! (`ingest`) supplies the live pages.

pub mod archive;
pub mod columns;
pub mod config;
pub mod extract;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod provinces;
pub mod walker;
