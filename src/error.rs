use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ZipcrackError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Archive not found: {path}")]
    ArchiveNotFound { path: PathBuf },

    #[error("Wordlist not found: {path}")]
    WordlistNotFound { path: PathBuf },

    #[error("Cannot create destination directory: {path}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No extraction tool available for {kind} archives")]
    ToolUnavailable { kind: String, searched: Vec<String> },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for ZipcrackError {
    fn user_message(&self) -> String {
        match self {
            ZipcrackError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            ZipcrackError::ArchiveNotFound { path } => {
                format!("Archive not found: {}", path.display())
            }
            ZipcrackError::WordlistNotFound { path } => {
                format!("Wordlist not found: {}", path.display())
            }
            ZipcrackError::Destination { path, source } => {
                format!(
                    "Cannot create destination directory {}: {}",
                    path.display(),
                    source
                )
            }
            ZipcrackError::ToolUnavailable { kind, searched } => {
                format!(
                    "No extraction tool available for {} archives (searched: {})",
                    kind,
                    searched.join(", ")
                )
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            ZipcrackError::Config { .. } => Some(
                "Run with --options to see the available flags and examples.".to_string(),
            ),
            ZipcrackError::ArchiveNotFound { .. } => Some(
                "Check the path passed to --archive. Only .zip and .rar archives are supported."
                    .to_string(),
            ),
            ZipcrackError::WordlistNotFound { .. } => Some(
                "Check the path passed to --wordlist. The file should contain one candidate password per line.".to_string(),
            ),
            ZipcrackError::Destination { .. } => Some(
                "Ensure you have write permission for the destination directory, or pick another one with --dest.".to_string(),
            ),
            ZipcrackError::ToolUnavailable { .. } => Some(
                "Install 7-Zip (p7zip) or unrar and make sure the executable is on your PATH."
                    .to_string(),
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ZipcrackError>;
