use crate::prober::{ProbeOutcome, Prober};
use crate::ui::GracefulShutdown;
use std::time::{Duration, Instant};

/// Terminal states of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Found,
    Exhausted,
    Cancelled,
}

/// Created exactly once, when the loop terminates.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub status: SearchStatus,
    pub password: Option<String>,
    pub attempts: u64,
    pub elapsed: Duration,
}

impl SearchResult {
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            self.attempts as f64
        }
    }
}

/// Progress figures emitted on the first attempt and every `show_every`
/// attempts thereafter.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub attempts: u64,
    pub total: Option<u128>,
    pub percent: Option<f64>,
    pub rate: f64,
    pub eta: Option<Duration>,
    pub last_candidate: String,
}

/// Receives progress reports and one-shot anomaly diagnostics from the
/// driver. Implementations wire these to the terminal UI; tests use
/// stubs.
pub trait SearchObserver {
    fn on_progress(&mut self, _snapshot: &ProgressSnapshot) {}

    /// Called at most once per anomaly kind per run, with diagnostic
    /// output meant to help the user fix a broken or missing tool.
    fn on_anomaly(&mut self, _diagnostic: &str) {}
}

pub struct NullObserver;

impl SearchObserver for NullObserver {}

/// Sequential search loop: pulls candidates, feeds them to the oracle,
/// stops at first success, exhaustion, or cancellation. Cancellation is
/// observed at iteration boundaries; an in-flight probe completes.
pub struct SearchDriver<'a> {
    prober: &'a dyn Prober,
    shutdown: &'a GracefulShutdown,
    show_every: u64,
}

impl<'a> SearchDriver<'a> {
    pub fn new(prober: &'a dyn Prober, shutdown: &'a GracefulShutdown, show_every: u64) -> Self {
        Self {
            prober,
            shutdown,
            show_every: show_every.max(1),
        }
    }

    pub fn run(
        &self,
        candidates: impl Iterator<Item = String>,
        total: Option<u128>,
        observer: &mut dyn SearchObserver,
    ) -> SearchResult {
        let start = Instant::now();
        let mut candidates = candidates;
        let mut attempts: u64 = 0;
        let mut tool_unavailable_reported = false;
        let mut ambiguous_reported = false;

        loop {
            if !self.shutdown.is_running() {
                return self.finish(SearchStatus::Cancelled, None, attempts, start);
            }

            let Some(candidate) = candidates.next() else {
                return self.finish(SearchStatus::Exhausted, None, attempts, start);
            };

            attempts += 1;
            if attempts == 1 || attempts % self.show_every == 0 {
                observer.on_progress(&snapshot(attempts, total, start, &candidate));
            }

            match self.prober.probe(&candidate) {
                ProbeOutcome::Success => {
                    return self.finish(SearchStatus::Found, Some(candidate), attempts, start);
                }
                ProbeOutcome::WrongPassword => {}
                ProbeOutcome::ToolUnavailable => {
                    if !tool_unavailable_reported {
                        observer.on_anomaly(
                            "no extraction tool could be run for this attempt; install 7-Zip \
                             (p7zip) or unrar and ensure it is on PATH",
                        );
                        tool_unavailable_reported = true;
                    }
                }
                ProbeOutcome::Ambiguous(raw) => {
                    if !ambiguous_reported {
                        observer.on_anomaly(&format!(
                            "extraction output could not be classified; continuing. \
                             Diagnostic output:\n{}",
                            raw
                        ));
                        ambiguous_reported = true;
                    }
                }
            }
        }
    }

    fn finish(
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
}

fn snapshot(attempts: u64, total: Option<u128>, start: Instant, candidate: &str) -> ProgressSnapshot {
    let elapsed = start.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 {
        attempts as f64 / elapsed
    } else {
        attempts as f64
    };

    let percent = total
        .filter(|&t| t > 0)
        .map(|t| attempts as f64 / t as f64 * 100.0);

    let eta = total.and_then(|t| {
        let remaining = t.saturating_sub(attempts as u128);
        if rate > 0.0 {
            Some(Duration::from_secs_f64(remaining as f64 / rate))
        } else {
            None
        }
    });

    ProgressSnapshot {
        attempts,
        total,
        percent,
        rate,
        eta,
        last_candidate: candidate.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prober::ProbeOutcome;
    use std::sync::atomic::{AtomicU64, Ordering};

    struct AlwaysWrong {
        probes: AtomicU64,
    }

    impl AlwaysWrong {
        fn new() -> Self {
            Self {
                probes: AtomicU64::new(0),
            }
        }
    }

    impl Prober for AlwaysWrong {
        fn probe(&self, _candidate: &str) -> ProbeOutcome {
            self.probes.fetch_add(1, Ordering::SeqCst);
            ProbeOutcome::WrongPassword
        }

        fn describe(&self) -> String {
            "always-wrong stub".to_string()
        }
    }

    struct SucceedsOn {
        password: String,
    }

    impl Prober for SucceedsOn {
        fn probe(&self, candidate: &str) -> ProbeOutcome {
            if candidate == self.password {
                ProbeOutcome::Success
            } else {
                ProbeOutcome::WrongPassword
            }
        }

        fn describe(&self) -> String {
            "fixed-password stub".to_string()
        }
    }

    /// Requests shutdown from inside the Nth probe, like a Ctrl+C
    /// arriving mid-run.
    struct CancelsDuringProbe<'a> {
        shutdown: &'a GracefulShutdown,
        cancel_at: u64,
        probes: AtomicU64,
    }

    impl Prober for CancelsDuringProbe<'_> {
        fn probe(&self, _candidate: &str) -> ProbeOutcome {
            let n = self.probes.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.cancel_at {
                self.shutdown.request_shutdown();
            }
            ProbeOutcome::WrongPassword
        }

        fn describe(&self) -> String {
            "cancelling stub".to_string()
        }
    }

    struct Recording {
        progress: Vec<ProgressSnapshot>,
        anomalies: Vec<String>,
    }

    impl Recording {
        fn new() -> Self {
            Self {
                progress: Vec::new(),
                anomalies: Vec::new(),
            }
        }
    }

    impl SearchObserver for Recording {
        fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
            self.progress.push(snapshot.clone());
        }

        fn on_anomaly(&mut self, diagnostic: &str) {
            self.anomalies.push(diagnostic.to_string());
        }
    }

    fn candidates(names: &[&str]) -> impl Iterator<Item = String> {
        names
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_never_found_without_prober_success() {
        let prober = AlwaysWrong::new();
        let shutdown = GracefulShutdown::new_for_test();
        let driver = SearchDriver::new(&prober, &shutdown, 200);

        let result = driver.run(
            candidates(&["a", "b", "c", "d"]),
            Some(4),
            &mut NullObserver,
        );

        assert_eq!(result.status, SearchStatus::Exhausted);
        assert!(result.password.is_none());
        assert_eq!(result.attempts, 4);
        assert_eq!(prober.probes.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_found_stops_at_match() {
        let prober = SucceedsOn {
            password: "ab12".to_string(),
        };
        let shutdown = GracefulShutdown::new_for_test();
        let driver = SearchDriver::new(&prober, &shutdown, 200);

        let result = driver.run(
            candidates(&["wrong1", "wrong2", "ab12", "never-tried"]),
            None,
            &mut NullObserver,
        );

        assert_eq!(result.status, SearchStatus::Found);
        assert_eq!(result.password.as_deref(), Some("ab12"));
        assert_eq!(result.attempts, 3);
    }

    #[test]
    fn test_cancellation_bounds_attempts() {
        let shutdown = GracefulShutdown::new_for_test();
        let prober = CancelsDuringProbe {
            shutdown: &shutdown,
            cancel_at: 3,
            probes: AtomicU64::new(0),
        };
        let driver = SearchDriver::new(&prober, &shutdown, 200);

        let many: Vec<String> = (0..1000).map(|i| format!("pw{}", i)).collect();
        let result = driver.run(many.into_iter(), Some(1000), &mut NullObserver);

        assert_eq!(result.status, SearchStatus::Cancelled);
        // The in-flight probe completes; no further probe starts.
        assert_eq!(result.attempts, 3);
        assert_eq!(prober.probes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cancelled_before_start() {
        let prober = AlwaysWrong::new();
        let shutdown = GracefulShutdown::new_for_test();
        shutdown.request_shutdown();
        let driver = SearchDriver::new(&prober, &shutdown, 200);

        let result = driver.run(candidates(&["a", "b"]), Some(2), &mut NullObserver);

        assert_eq!(result.status, SearchStatus::Cancelled);
        assert_eq!(result.attempts, 0);
        assert_eq!(prober.probes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_progress_cadence() {
        let prober = AlwaysWrong::new();
        let shutdown = GracefulShutdown::new_for_test();
        let driver = SearchDriver::new(&prober, &shutdown, 2);
        let mut observer = Recording::new();

        driver.run(candidates(&["a", "b", "c", "d", "e"]), Some(5), &mut observer);

        // First attempt plus every second one: attempts 1, 2, 4.
        let reported: Vec<u64> = observer.progress.iter().map(|s| s.attempts).collect();
        assert_eq!(reported, vec![1, 2, 4]);
        assert_eq!(observer.progress[0].last_candidate, "a");
        assert_eq!(observer.progress[0].percent, Some(20.0));
    }

    #[test]
    fn test_ambiguous_reported_once_and_not_fatal() {
        struct AlwaysAmbiguous;
        impl Prober for AlwaysAmbiguous {
            fn probe(&self, _candidate: &str) -> ProbeOutcome {
                ProbeOutcome::Ambiguous("strange output".to_string())
            }
            fn describe(&self) -> String {
                "ambiguous stub".to_string()
            }
        }

        let shutdown = GracefulShutdown::new_for_test();
        let driver = SearchDriver::new(&AlwaysAmbiguous, &shutdown, 200);
        let mut observer = Recording::new();

        let result = driver.run(candidates(&["a", "b", "c"]), Some(3), &mut observer);

        assert_eq!(result.status, SearchStatus::Exhausted);
        assert_eq!(result.attempts, 3);
        assert_eq!(observer.anomalies.len(), 1);
        assert!(observer.anomalies[0].contains("strange output"));
    }

    #[test]
    fn test_throughput_is_finite() {
        let result = SearchResult {
            status: SearchStatus::Exhausted,
            password: None,
            attempts: 100,
            elapsed: Duration::from_millis(0),
        };
        assert!(result.throughput().is_finite());
    }
}
