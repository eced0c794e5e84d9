use crate::error::{Result, ZipcrackError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-probe timeout in seconds for external tools. An expired
    /// probe counts as ambiguous, not as a wrong password.
    pub timeout: u64,
    /// Use external tools even for ZIP archives, instead of the
    /// in-process extractor.
    pub prefer_external: bool,
    /// Extra directories to search for extraction tools, in addition to
    /// PATH and the well-known install locations.
    pub extra_tool_dirs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Progress report cadence, in attempts.
    pub show_every: u64,
    /// Warn before starting a brute-force phase larger than this.
    pub warn_threshold: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            prefer_external: false,
            extra_tool_dirs: Vec::new(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            show_every: 200,
            warn_threshold: 10_000_000,
        }
    }
}

/// CLI values that override the file-based configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub show_every: Option<u64>,
    pub timeout: Option<u64>,
    pub prefer_external: bool,
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ZipcrackError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ZipcrackError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ZipcrackError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["zipcrack.toml", ".zipcrack.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, overrides: &CliOverrides) {
        if let Some(show_every) = overrides.show_every {
            self.search.show_every = show_every;
        }
        if let Some(timeout) = overrides.timeout {
            self.probe.timeout = timeout;
        }
        if overrides.prefer_external {
            self.probe.prefer_external = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.show_every == 0 {
            return Err(ZipcrackError::Config {
                message: "show-every must be at least 1".to_string(),
            });
        }
        if self.probe.timeout == 0 {
            return Err(ZipcrackError::Config {
                message: "probe timeout must be at least 1 second".to_string(),
            });
        }
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe.timeout)
    }
}
