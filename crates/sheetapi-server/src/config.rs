use clap::{Parser, ValueEnum};
use sheetapi_core::RegistrationPolicy;
use sheetapi_store::DEFAULT_API_BASE;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Files read into the environment before flags are parsed. Earlier files win, and a
/// variable already set in the process environment is never overridden.
pub const DOTENV_FILES: &[&str] = &["config/.env", ".env"];

#[derive(Parser, Debug, Clone)]
#[command(
    name = "sheetapi",
    version,
    about = "Serve the tabs of a spreadsheet as JSON collections"
)]
pub struct Config {
    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Spreadsheet backend.
    #[arg(long, env = "SHEETAPI_STORE", value_enum, default_value_t = StoreKind::Google)]
    pub store: StoreKind,

    /// OAuth2 bearer token for the Google Sheets API.
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Base URL of the Sheets v4 API.
    #[arg(long, env = "SHEETS_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// JSON fixture loaded into the memory store.
    #[arg(long, env = "SHEETAPI_SEED")]
    pub seed: Option<PathBuf>,

    /// What to do when a tab title is registered twice.
    #[arg(long, env = "SHEETAPI_REGISTRATION", value_enum, default_value_t = RegistrationMode::Replace)]
    pub registration: RegistrationMode,

    /// Timeout for each request to the spreadsheet store, in seconds.
    #[arg(long, env = "SHEETAPI_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "SHEETAPI_LOG", default_value = "info")]
    pub log_filter: String,
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Google,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RegistrationMode {
    Replace,
    Reject,
}

impl From<RegistrationMode> for RegistrationPolicy {
    fn from(mode: RegistrationMode) -> Self {
        match mode {
            RegistrationMode::Replace => RegistrationPolicy::Replace,
            RegistrationMode::Reject => RegistrationPolicy::Reject,
        }
    }
}

/// Load [`DOTENV_FILES`] relative to `root`. Missing files are skipped; returns the files
/// that were read.
pub fn load_dotenv(root: &Path) -> Vec<PathBuf> {
    DOTENV_FILES
        .iter()
        .map(|name| root.join(name))
        .filter(|path| dotenvy::from_path(path).is_ok())
        .collect()
}
