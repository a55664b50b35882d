//! Stage and pair progress reporting.
//!
//! Workers call [`ProgressReporter::pair_done`] after every pair. The call is
//! an atomic increment plus a `try_lock`; the worker that wins the lock
//! reports when K pairs or the configured interval have passed since the last
//! report. Callback invocations are serialized by that same mutex.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use derive_more::Display;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::debug;

/// Phase of an analysis run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize)]
pub enum Stage {
    #[display("Loading Data")]
    LoadingData,
    #[display("Computing Features")]
    ComputingFeatures,
    #[display("Analyzing Pairs")]
    AnalyzingPairs,
    #[display("Generating Opportunities")]
    GeneratingOpportunities,
    #[display("Exporting Results")]
    ExportingResults,
    #[display("Complete")]
    Complete,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::LoadingData,
        Stage::ComputingFeatures,
        Stage::AnalyzingPairs,
        Stage::GeneratingOpportunities,
        Stage::ExportingResults,
        Stage::Complete,
    ];
}

/// Receives `(stage, percent)` with percent in `[0, 100]`.
pub type ProgressCallback = Arc<dyn Fn(Stage, f64) + Send + Sync>;

#[derive(Debug)]
struct LastReport {
    at: Instant,
    pairs: usize,
}

/// Throttled progress fan-out shared by the engine and its workers.
pub struct ProgressReporter {
    callback: Option<ProgressCallback>,
    last: Mutex<LastReport>,
    completed: AtomicUsize,
    total: AtomicUsize,
    every_pairs: usize,
    interval: Duration,
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("has_callback", &self.callback.is_some())
            .field("completed", &self.completed.load(Ordering::Relaxed))
            .field("total", &self.total.load(Ordering::Relaxed))
            .field("every_pairs", &self.every_pairs)
            .field("interval", &self.interval)
            .finish()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(None, 1000, Duration::from_millis(500))
    }
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressCallback>, every_pairs: usize, interval: Duration) -> Self {
        Self {
            callback,
            last: Mutex::new(LastReport {
                at: Instant::now(),
                pairs: 0,
            }),
            completed: AtomicUsize::new(0),
            total: AtomicUsize::new(0),
            every_pairs: every_pairs.max(1),
            interval,
        }
    }

    /// Report a stage-level update; blocks until the callback mutex is free.
    pub fn report(&self, stage: Stage, percent: f64) {
        let percent = percent.clamp(0.0, 100.0);
        debug!(stage = %stage, percent, "progress");
        let _guard = self.last.lock();
        if let Some(callback) = &self.callback {
            callback(stage, percent);
        }
    }

    /// Reset the pair counter for a run over `total` pairs.
    pub fn start_pairs(&self, total: usize) {
        self.completed.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
        let mut last = self.last.lock();
        last.at = Instant::now();
        last.pairs = 0;
    }

    /// Pairs finished since [`start_pairs`](Self::start_pairs).
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Count one finished pair and report if this worker is the reporter.
    pub fn pair_done(&self) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let Some(callback) = &self.callback else {
            return;
        };
        let Some(mut last) = self.last.try_lock() else {
            return;
        };
        let total = self.total.load(Ordering::Relaxed);
        let due = done - last.pairs.min(done) >= self.every_pairs
            || last.at.elapsed() >= self.interval
            || done == total;
        if !due {
            return;
        }
        last.at = Instant::now();
        last.pairs = done;
        let percent = if total > 0 {
            (done as f64 / total as f64 * 100.0).min(100.0)
        } else {
            100.0
        };
        callback(Stage::AnalyzingPairs, percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> (ProgressCallback, Arc<Mutex<Vec<(Stage, f64)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressCallback = Arc::new(move |stage, pct| sink.lock().push((stage, pct)));
        (callback, seen)
    }

    #[test]
    fn test_stage_names_in_order() {
        let names: Vec<String> = Stage::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            [
                "Loading Data",
                "Computing Features",
                "Analyzing Pairs",
                "Generating Opportunities",
                "Exporting Results",
                "Complete"
            ]
        );
        assert!(Stage::LoadingData < Stage::Complete);
    }

    #[test]
    fn test_pair_reports_are_throttled_by_count() {
        let (callback, seen) = recording();
        let reporter = ProgressReporter::new(Some(callback), 10, Duration::from_secs(3600));
        reporter.start_pairs(25);
        for _ in 0..25 {
            reporter.pair_done();
        }
        let seen = seen.lock();
        let percents: Vec<f64> = seen.iter().map(|(_, p)| *p).collect();
        assert_eq!(percents, vec![40.0, 80.0, 100.0]);
        assert!(seen.iter().all(|(s, _)| *s == Stage::AnalyzingPairs));
        assert_eq!(reporter.completed(), 25);
    }

    #[test]
    fn test_stage_report_clamps_percent() {
        let (callback, seen) = recording();
        let reporter = ProgressReporter::new(Some(callback), 1, Duration::ZERO);
        reporter.report(Stage::LoadingData, 150.0);
        reporter.report(Stage::Complete, -3.0);
        assert_eq!(
            *seen.lock(),
            vec![(Stage::LoadingData, 100.0), (Stage::Complete, 0.0)]
        );
    }

    #[test]
    fn test_without_callback_only_counts() {
        let reporter = ProgressReporter::default();
        reporter.start_pairs(3);
        for _ in 0..3 {
            reporter.pair_done();
        }
        assert_eq!(reporter.completed(), 3);
    }
}
