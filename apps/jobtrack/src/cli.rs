//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

pub const PAGE_URL_ENV: &str = "JOBTRACK_PAGE_URL";
const BLANK_PAGE: &str = "about:blank";

/// Session layer of the jobtrack app, driven from the terminal.
///
/// Host messages are read from stdin as JSON lines:
/// `{"origin": "https://host.example", "data": {"type": "CREAO_AUTH_TOKEN", "token": "..."}}`
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "jobtrack")]
#[command(about = "Session bootstrap for the embedded jobtrack app")]
pub struct Cli {
    /// Page URL the app was opened with. `?auth_token=` bootstraps a session.
    #[arg(long, env = PAGE_URL_ENV, default_value = BLANK_PAGE)]
    pub url: String,

    /// Directory holding config.json.
    #[arg(long)]
    pub config_dir: Option<PathBuf>,

    /// Directory for the log file.
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Platform API base path; overrides config and environment.
    #[arg(long)]
    pub api_base_path: Option<String>,
}

impl Cli {
    pub fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(session_core::APP_DIR_NAME)))
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.log_dir.clone().or_else(|| {
            dirs::data_local_dir().map(|dir| dir.join(session_core::APP_DIR_NAME).join("logs"))
        })
    }
}
