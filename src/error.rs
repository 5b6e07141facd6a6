use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MirrorError {
    #[error("invalid month {month} for year {year} (expected 1-12)")]
    InvalidMonth { year: u16, month: u8 },

    #[error("{0} permit files need a region")]
    RegionRequired(String),

    #[error("invalid resource locator: {0}")]
    InvalidLocator(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("server returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("transfer task panicked: {0}")]
    TaskPanicked(String),
}
