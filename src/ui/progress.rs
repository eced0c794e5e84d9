use crate::driver::{ProgressSnapshot, SearchObserver};
use crate::ui::output::OutputFormatter;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Progress bar for one search phase. A known total gets a bar with
    /// percentage and ETA; an unknown (or absurdly large) total gets a
    /// counting spinner.
    pub fn create_search_bar(&self, total: Option<u128>) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let bounded_total = total.and_then(|t| u64::try_from(t).ok());

        let pb = match bounded_total {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] \
                         {pos}/{len} ({percent}%) {per_sec} ETA {eta} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::with_template(
                        "{spinner:.green} [{elapsed_precise}] {pos} tried {per_sec} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb
            }
        };

        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Wires driver progress events to an indicatif bar and anomaly
/// diagnostics to the formatter, suspending the bar so the two don't
/// fight over the terminal.
pub struct SearchProgressObserver<'a> {
    bar: ProgressBar,
    formatter: &'a OutputFormatter,
}

impl<'a> SearchProgressObserver<'a> {
    pub fn new(bar: ProgressBar, formatter: &'a OutputFormatter) -> Self {
        Self { bar, formatter }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl SearchObserver for SearchProgressObserver<'_> {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.bar.set_position(snapshot.attempts);
        self.bar
            .set_message(format!("last: {}", snapshot.last_candidate));
    }

    fn on_anomaly(&mut self, diagnostic: &str) {
        let formatter = self.formatter;
        self.bar.suspend(|| formatter.warning(diagnostic));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::output::OutputMode;

    #[test]
    fn test_disabled_bars_are_hidden() {
        let manager = ProgressManager::new(false);
        assert!(!manager.is_enabled());
        assert!(manager.create_search_bar(Some(100)).is_hidden());
        assert!(manager.create_search_bar(None).is_hidden());
    }

    #[test]
    fn test_oversized_total_falls_back_to_spinner() {
        let manager = ProgressManager::new(true);
        let pb = manager.create_search_bar(Some(u128::MAX));
        assert!(pb.length().is_none());
    }

    #[test]
    fn test_observer_updates_bar() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 0, true);
        let manager = ProgressManager::new(false);
        let mut observer =
            SearchProgressObserver::new(manager.create_search_bar(Some(10)), &formatter);

        observer.on_progress(&ProgressSnapshot {
            attempts: 4,
            total: Some(10),
            percent: Some(40.0),
            rate: 2.0,
            eta: None,
            last_candidate: "abcd".to_string(),
        });
        observer.on_anomaly("odd output");
        observer.finish();
    }
}
