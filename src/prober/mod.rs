pub mod tool;
pub mod zip;

pub use self::tool::ToolProber;
pub use self::zip::ZipProber;

use crate::config::ProbeConfig;
use crate::error::{Result, ZipcrackError};
use std::fs;
use std::path::Path;

/// Outcome of testing one candidate password against the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The archive extracted cleanly; the candidate is the password.
    Success,
    /// The oracle rejected the candidate.
    WrongPassword,
    /// No extraction tool could be run for this attempt.
    ToolUnavailable,
    /// The oracle produced output matching neither pattern set; the raw
    /// output is kept for diagnostics.
    Ambiguous(String),
}

/// An extraction oracle bound to one archive and destination directory.
/// Each `probe` call is independent: a failed attempt must not poison
/// the evaluation of the next one.
pub trait Prober {
    fn probe(&self, candidate: &str) -> ProbeOutcome;

    /// Short human description of the strategy, for verbose output.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Rar,
    Other(String),
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("zip") => ArchiveKind::Zip,
            Some("rar") => ArchiveKind::Rar,
            Some(other) => ArchiveKind::Other(other.to_string()),
            None => ArchiveKind::Other("unknown".to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Rar => "rar",
            ArchiveKind::Other(name) => name,
        }
    }
}

/// Pick the oracle for an archive, extension-directed:
/// ZIP archives use the in-process prober unless external tools are
/// preferred; everything else resolves an external tool up front, so a
/// missing tool is a fatal startup error rather than a wasted
/// `ToolUnavailable` on every attempt.
pub fn select_prober(
    archive: &Path,
    dest: &Path,
    config: &ProbeConfig,
) -> Result<Box<dyn Prober>> {
    fs::create_dir_all(dest).map_err(|source| ZipcrackError::Destination {
        path: dest.to_path_buf(),
        source,
    })?;

    let kind = ArchiveKind::from_path(archive);

    if kind == ArchiveKind::Zip && !config.prefer_external {
        return Ok(Box::new(ZipProber::new(archive, dest)));
    }

    let prober = ToolProber::resolve(archive, dest, &kind, config)?;
    Ok(Box::new(prober))
}
