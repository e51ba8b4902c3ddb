//! Throughput sampling and progress reports.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default length of a report window.
pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// One progress line: observed rate and a rough time-to-match estimate.
///
/// The estimate is the mean of a geometric distribution, not a bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressReport {
    /// Candidates generated during the window.
    pub samples: u64,
    /// Window length in milliseconds.
    pub elapsed_ms: u64,
    /// Candidates per second.
    pub rate: u64,
    /// `16^len(prefix)`.
    pub possible_choices: u128,
    /// `possible_choices / rate`, `None` while the rate is zero.
    pub eta_seconds: Option<u128>,
}

impl ProgressReport {
    pub fn compute(samples: u64, elapsed_ms: u64, possible_choices: u128) -> Self {
        let rate = if elapsed_ms == 0 {
            0
        } else {
            samples.saturating_mul(1000) / elapsed_ms
        };
        let eta_seconds = (rate > 0).then(|| possible_choices / u128::from(rate));

        Self {
            samples,
            elapsed_ms,
            rate,
            possible_choices,
            eta_seconds,
        }
    }
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addresses per second: {}, total time estimate: ", self.rate)?;
        match self.eta_seconds {
            Some(eta) => write!(f, "{} seconds", eta)?,
            None => f.write_str("unavailable")?,
        }
        write!(f, ", possible choices: {}", self.possible_choices)
    }
}

/// Receives progress reports from whichever worker wins the report lock.
pub trait ProgressSink: Send + Sync {
    fn report(&self, report: &ProgressReport);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressReport) + Send + Sync,
{
    fn report(&self, report: &ProgressReport) {
        self(report)
    }
}

/// Prints each report as a line on stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn report(&self, report: &ProgressReport) {
        println!("{}", report);
    }
}

/// Candidate counters shared by all workers.
///
/// `samples` is the current window and is reset on every report; `total`
/// only ever grows. The window start is stored as milliseconds since
/// `origin` so the hot path can read it without taking the lock.
#[derive(Debug)]
pub struct Throughput {
    origin: Instant,
    interval_ms: u64,
    samples: AtomicU64,
    total: AtomicU64,
    window_start_ms: AtomicU64,
    report_lock: Mutex<()>,
}

impl Throughput {
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval_ms: interval.as_millis() as u64,
            samples: AtomicU64::new(0),
            total: AtomicU64::new(0),
            window_start_ms: AtomicU64::new(0),
            report_lock: Mutex::new(()),
        }
    }

    #[inline]
    pub fn record(&self) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    #[inline]
    fn window_elapsed_ms(&self) -> u64 {
        self.now_ms()
            .saturating_sub(self.window_start_ms.load(Ordering::Acquire))
    }

    /// Lock-free check of whether the current window has run out.
    #[inline]
    pub fn report_due(&self) -> bool {
        self.window_elapsed_ms() > self.interval_ms
    }

    /// Emits a report if the window has run out.
    ///
    /// Double-checked: the cheap test runs unlocked, the winner of the lock
    /// tests again because another worker may have reported in between.
    /// `emit` runs while the lock is held. Returns whether a report was made.
    pub fn try_report<F>(&self, possible_choices: u128, emit: F) -> bool
    where
        F: FnOnce(&ProgressReport),
    {
        if !self.report_due() {
            return false;
        }

        // Poisoned only if a sink panicked; the counters are still consistent.
        let _guard = self
            .report_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let elapsed_ms = self.window_elapsed_ms();
        if elapsed_ms <= self.interval_ms {
            return false;
        }

        let samples = self.samples.swap(0, Ordering::AcqRel);
        let report = ProgressReport::compute(samples, elapsed_ms, possible_choices);
        emit(&report);

        self.window_start_ms.store(self.now_ms(), Ordering::Release);
        true
    }

    /// Candidates counted in the current window.
    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Acquire)
    }

    /// Candidates counted since creation.
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }
}
