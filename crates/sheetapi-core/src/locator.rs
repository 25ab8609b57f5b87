use once_cell::sync::Lazy;
use regex::Regex;

static SPREADSHEET_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").expect("spreadsheet path regex must compile")
});

/// Pull the spreadsheet id out of a sharing URL (`.../spreadsheets/d/{id}/edit...`).
pub fn extract_spreadsheet_id(locator: &str) -> Option<&str> {
    SPREADSHEET_PATH
        .captures(locator)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
