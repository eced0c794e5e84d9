use crate::error::{Result, ZipcrackError};
use std::fs;
use std::path::Path;

/// Candidate passwords loaded from a wordlist file: one per line, in
/// file order, trimmed, blank lines skipped. The file is decoded
/// lossily so a stray non-UTF-8 byte does not abort the whole run.
#[derive(Debug, Clone)]
pub struct Wordlist {
    candidates: Vec<String>,
}

impl Wordlist {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ZipcrackError::WordlistNotFound {
                path: path.to_path_buf(),
            });
        }

        let raw = fs::read(path)?;
        let text = String::from_utf8_lossy(&raw);

        let candidates = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self { candidates })
    }

    /// Number of non-blank candidates, known up front for progress/ETA.
    pub fn total(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl IntoIterator for Wordlist {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}
