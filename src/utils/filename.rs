use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default annual table filename with format: wq-annual-{YYMMDD}.{extension}
pub fn generate_default_annual_filename(extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "wq-annual-{:02}{:02}{:02}.{}",
        year, month, day, extension
    );
    PathBuf::from("output").join(filename)
}

/// Generate default septic table filename with format: septic-calculations-{YYMMDD}.csv
pub fn generate_default_septic_filename() -> PathBuf {
    let now = Local::now();
    let filename = format!(
        "septic-calculations-{:02}{:02}{:02}.csv",
        now.year() % 100,
        now.month(),
        now.day()
    );
    PathBuf::from("output").join(filename)
}
