pub mod bruteforce;
pub mod wordlist;

pub use bruteforce::BruteForce;
pub use wordlist::Wordlist;

use crate::error::{Result, ZipcrackError};
use std::path::PathBuf;

pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &str = "0123456789";
pub const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// A source of candidate passwords. Re-building the generator restarts
/// the sequence from scratch; the order is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchSpec {
    Wordlist { path: PathBuf },
    BruteForce { charset: Vec<char>, length: usize },
}

impl SearchSpec {
    pub fn brute_force(charset: Vec<char>, length: usize) -> Result<Self> {
        if charset.is_empty() {
            return Err(ZipcrackError::Config {
                message: "brute-force charset is empty; select at least one character class \
                          (--lower, --upper, --numbers, --special) or pass --custom"
                    .to_string(),
            });
        }
        if length == 0 {
            return Err(ZipcrackError::Config {
                message: "brute-force length must be at least 1".to_string(),
            });
        }
        Ok(SearchSpec::BruteForce { charset, length })
    }
}

/// Compose a brute-force alphabet from the selected character classes.
/// A custom charset overrides the classes entirely. Duplicates are
/// removed while preserving first-seen order.
pub fn compose_charset(
    lower: bool,
    upper: bool,
    numbers: bool,
    special: bool,
    custom: Option<&str>,
) -> Vec<char> {
    let mut composed = String::new();

    if let Some(custom) = custom {
        composed.push_str(custom);
    } else {
        if lower {
            composed.push_str(LOWERCASE);
        }
        if upper {
            composed.push_str(UPPERCASE);
        }
        if numbers {
            composed.push_str(DIGITS);
        }
        if special {
            composed.push_str(PUNCTUATION);
        }
    }

    dedup_preserving_order(composed.chars())
}

fn dedup_preserving_order(chars: impl Iterator<Item = char>) -> Vec<char> {
    let mut seen = Vec::new();
    for c in chars {
        if !seen.contains(&c) {
            seen.push(c);
        }
    }
    seen
}
