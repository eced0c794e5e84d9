use crate::error::{Result, ZipcrackError};

/// Generates every string of a fixed length over a charset, in the
/// lexicographic order induced by the charset's own order. Works like an
/// odometer: the last position increments fastest.
#[derive(Debug, Clone)]
pub struct BruteForce {
    charset: Vec<char>,
    indices: Vec<usize>,
    exhausted: bool,
}

impl BruteForce {
    pub fn new(charset: Vec<char>, length: usize) -> Result<Self> {
        if charset.is_empty() {
            return Err(ZipcrackError::Config {
                message: "brute-force charset is empty".to_string(),
            });
        }
        if length == 0 {
            return Err(ZipcrackError::Config {
                message: "brute-force length must be at least 1".to_string(),
            });
        }

        Ok(Self {
            charset,
            indices: vec![0; length],
            exhausted: false,
        })
    }

    /// Total number of candidates, computed without materializing the
    /// sequence. `None` when |charset|^length overflows u128.
    pub fn total(&self) -> Option<u128> {
        (self.charset.len() as u128).checked_pow(self.indices.len() as u32)
    }

    pub fn charset(&self) -> &[char] {
        &self.charset
    }

    pub fn length(&self) -> usize {
        self.indices.len()
    }

    fn current(&self) -> String {
        self.indices.iter().map(|&i| self.charset[i]).collect()
    }

    fn advance(&mut self) {
        for i in (0..self.indices.len()).rev() {
            self.indices[i] += 1;
            if self.indices[i] < self.charset.len() {
                return;
            }
            self.indices[i] = 0;
        }
        // Every position wrapped around.
        self.exhausted = true;
    }
}

impl Iterator for BruteForce {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }
        let candidate = self.current();
        self.advance();
        Some(candidate)
    }
}
