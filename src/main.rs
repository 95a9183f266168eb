use std::error::Error;
use std::path::Path;

use arpav_archive::archive::MonthlyArchive;
use arpav_archive::config::{ArchiveConfig, DEFAULT_CONFIG_PATH};
use arpav_archive::ingest::portal::ArpavPortal;
use arpav_archive::logging::{self, LogLevel, Stage};
use arpav_archive::walker::{self, ScrapeSummary};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = ArchiveConfig::load(Path::new(&config_path))?;

    let min_level = if config.verbose { LogLevel::Debug } else { LogLevel::Info };
    logging::init_logger(min_level, config.log_file.as_deref());
    logging::info(
        Stage::System,
        None,
        &format!(
            "archiving {} bulletins from {} until the end of {}",
            config.city_name,
            config.start_date,
            config.end_year - 1
        ),
    );

    let mut portal = ArpavPortal::connect(&config.webdriver_url)?;
    let mut archive = MonthlyArchive::new(&config.archive_root);

    let walk_result = walker::walk(
        &mut portal,
        &mut archive,
        &config.city_name,
        config.start_date,
        config.end_year,
    );

    if let Err(e) = portal.quit() {
        logging::warn(Stage::Portal, None, &format!("browser session cleanup failed: {}", e));
    }

    let summary = walk_result?;
    logging::log_walk_summary(
        summary.total_readings,
        summary.missing_dates.len(),
        summary.missing_ratio(),
    );
    print_summary(&config, &summary);
    Ok(())
}

fn print_summary(config: &ArchiveConfig, summary: &ScrapeSummary) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("ARCHIVE SUMMARY: {}", config.city_name);
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Days walked:        {}", summary.days_walked);
    println!("Readings archived:  {}", summary.total_readings);
    println!(
        "Days without data:  {} ({:.1}%)",
        summary.missing_dates.len(),
        summary.missing_ratio() * 100.0
    );
    if !summary.missing_dates.is_empty() {
        println!();
        println!("Missing dates:");
        for date in &summary.missing_dates {
            println!("  {}", date);
        }
    }
    println!("═══════════════════════════════════════════════════════════");
}
