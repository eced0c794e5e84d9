pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod generator;
pub mod prober;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ProbeConfig, SearchConfig};
pub use error::{Result, UserFriendlyError, ZipcrackError};

// Core functionality re-exports
pub use driver::{ProgressSnapshot, SearchDriver, SearchObserver, SearchResult, SearchStatus};
pub use generator::{compose_charset, BruteForce, SearchSpec, Wordlist};
pub use prober::{select_prober, ProbeOutcome, Prober};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::Path;
use std::time::Instant;
use ui::SearchProgressObserver;

/// Main library interface: validates resources, selects the extraction
/// oracle, and runs the configured attack phases in order (wordlist
/// before brute force).
pub struct ZipCrack {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl ZipCrack {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// No signal handler registration, for tests.
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(false);
        let shutdown = GracefulShutdown::new_for_test();

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// Run the attack phases against the archive until one finds the
    /// password, everything is exhausted, or the user cancels. Attempts
    /// accumulate across phases in the returned result.
    pub fn recover(&self, archive: &Path, dest: &Path, phases: &[SearchSpec]) -> Result<SearchResult> {
        if !archive.is_file() {
            return Err(ZipcrackError::ArchiveNotFound {
                path: archive.to_path_buf(),
            });
        }
        if phases.is_empty() {
            return Err(ZipcrackError::Config {
                message: "nothing to try: provide a wordlist (-W) and/or a brute-force charset"
                    .to_string(),
            });
        }

        let prober = select_prober(archive, dest, &self.config.probe)?;
        self.output_formatter
            .debug(&format!("oracle: {}", prober.describe()));

        let start = Instant::now();
        let mut attempts: u64 = 0;

        for phase in phases {
            if !self.shutdown.is_running() {
                return Ok(self.final_result(SearchStatus::Cancelled, None, attempts, start));
            }

            let result = match phase {
                SearchSpec::Wordlist { path } => {
                    let wordlist = Wordlist::load(path)?;
                    let total = wordlist.total() as u128;
                    self.output_formatter.start_operation(&format!(
                        "Wordlist attack: {} ({} candidates)",
                        path.display(),
                        ui::output::format_count(total)
                    ));
                    self.run_phase(prober.as_ref(), wordlist.into_iter(), Some(total))
                }
                SearchSpec::BruteForce { charset, length } => {
                    let generator = BruteForce::new(charset.clone(), *length)?;
                    let total = generator.total();
                    self.warn_if_huge(total);
                    self.output_formatter.start_operation(&format!(
                        "Brute-force attack: {} characters, length {}, {} candidates",
                        charset.len(),
                        length,
                        total
                            .map(ui::output::format_count)
                            .unwrap_or_else(|| "more than 2^128".to_string())
                    ));
                    self.run_phase(prober.as_ref(), generator, total)
                }
            };

            attempts += result.attempts;
            match result.status {
                SearchStatus::Found => {
                    return Ok(self.final_result(
                        SearchStatus::Found,
                        result.password,
                        attempts,
                        start,
                    ));
                }
                SearchStatus::Cancelled => {
                    return Ok(self.final_result(SearchStatus::Cancelled, None, attempts, start));
                }
                SearchStatus::Exhausted => {
                    self.output_formatter
                        .info("Phase exhausted without a match");
                }
            }
        }

        Ok(self.final_result(SearchStatus::Exhausted, None, attempts, start))
    }

    fn run_phase(
        &self,
        prober: &dyn Prober,
        candidates: impl Iterator<Item = String>,
        total: Option<u128>,
    ) -> SearchResult {
        let bar = self.progress_manager.create_search_bar(total);
        let mut observer = SearchProgressObserver::new(bar, &self.output_formatter);

        let driver = SearchDriver::new(prober, &self.shutdown, self.config.search.show_every);
        let result = driver.run(candidates, total, &mut observer);

        observer.finish();
        result
    }

    fn warn_if_huge(&self, total: Option<u128>) {
        let threshold = self.config.search.warn_threshold as u128;
        match total {
            Some(total) if total > threshold => {
                self.output_formatter.warning(&format!(
                    "Search space is {} candidates; this may take a very long time",
                    ui::output::format_count(total)
                ));
            }
            None => {
                self.output_formatter
                    .warning("Search space exceeds 2^128 candidates; exhaustion is unreachable");
            }
            _ => {}
        }
    }

    fn final_result(
        &self,
        status: SearchStatus,
        password: Option<String>,
        attempts: u64,
        start: Instant,
    ) -> SearchResult {
        SearchResult {
            status,
            password,
            attempts,
            elapsed: start.elapsed(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &ZipcrackError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
