//! Worker pool management and the race-to-first search.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver};
use tracing::{debug, info, warn};

use crate::crypto::{Address, Keypair, KeypairSource, Secp256k1Source};
use crate::matcher::Prefix;

use super::cpu::CpuWorker;
use super::throughput::{ProgressSink, StdoutProgress, Throughput, REPORT_INTERVAL};

/// The keypair that satisfied the prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The private key (64 hex digits, no 0x prefix)
    pub private_key: String,
    /// The address (40 lowercase hex digits, no 0x prefix)
    pub address: String,
    /// The ID of the worker that found this result
    pub worker_id: usize,
    checksum_address: String,
}

impl Match {
    pub(crate) fn from_keypair(keypair: &Keypair, worker_id: usize) -> Self {
        let address: &Address = keypair.address();
        Self {
            private_key: keypair.private_key_hex(),
            address: address.to_hex(),
            worker_id,
            checksum_address: address.to_checksum(),
        }
    }

    /// EIP-55 rendering of the address, with 0x prefix.
    pub fn checksum_address(&self) -> &str {
        &self.checksum_address
    }
}

/// A finished search.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub found: Match,
    /// Candidates generated by all workers, counted after they were joined.
    pub total_generated: u64,
    pub elapsed: Duration,
}

impl SearchOutcome {
    /// Average candidates per second over the whole search.
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.total_generated as f64 / elapsed
        } else {
            0.0
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Every worker stopped without producing a match; key generation failed")]
    GenerationFailure,

    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] io::Error),
}

/// Running workers plus the coordinator's end of the result slot.
pub struct WorkerPool {
    num_workers: usize,
    handles: Option<Vec<JoinHandle<()>>>,
    result_rx: Receiver<Match>,
    stop_flag: Arc<AtomicBool>,
    throughput: Arc<Throughput>,
    start_time: Instant,
}

impl WorkerPool {
    /// Spawns `num_workers` named worker threads searching for `prefix`.
    ///
    /// If a thread cannot be spawned the ones already running are stopped
    /// and joined before the error is returned.
    pub fn spawn<S>(
        num_workers: usize,
        prefix: Prefix,
        source: Arc<S>,
        sink: Arc<dyn ProgressSink>,
        report_interval: Duration,
    ) -> Result<Self, SearchError>
    where
        S: KeypairSource + ?Sized + 'static,
    {
        // One slot: the first match fills it, later try_sends are dropped.
        let (result_tx, result_rx) = bounded(1);
        let stop_flag = Arc::new(AtomicBool::new(false));
        let throughput = Arc::new(Throughput::new(report_interval));

        let mut pool = Self {
            num_workers,
            handles: Some(Vec::with_capacity(num_workers)),
            result_rx,
            stop_flag,
            throughput,
            start_time: Instant::now(),
        };

        for id in 0..num_workers {
            let worker = CpuWorker::new(
                id,
                prefix.clone(),
                source.clone(),
                result_tx.clone(),
                pool.stop_flag.clone(),
                pool.throughput.clone(),
                sink.clone(),
            );

            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || worker.run())
                .map_err(SearchError::Spawn)?;

            if let Some(handles) = pool.handles.as_mut() {
                handles.push(handle);
            }
        }

        debug!(workers = num_workers, "worker pool started");
        Ok(pool)
    }

    /// Blocks until the first match is published.
    ///
    /// Returns [`SearchError::GenerationFailure`] once every worker has
    /// exited without publishing, which only happens if the keypair source
    /// panicked in all of them.
    pub fn wait_for_match(&self) -> Result<Match, SearchError> {
        self.result_rx.recv().map_err(|_| SearchError::GenerationFailure)
    }

    /// Waits for a match with a timeout; `None` if nothing arrived in time.
    pub fn wait_for_match_timeout(&self, timeout: Duration) -> Option<Match> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    /// Signals all workers to stop after their current candidate.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops and joins every worker, returning the final candidate count.
    pub fn join(mut self) -> u64 {
        self.join_workers();
        self.throughput.total()
    }

    fn join_workers(&mut self) {
        self.stop();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let name = handle.thread().name().unwrap_or("worker").to_owned();
                if handle.join().is_err() {
                    warn!(thread = %name, "worker panicked");
                }
            }
        }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_flag.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_workers();
    }
}

/// Configured search: a keypair source, a worker count and a report interval.
pub struct SearchEngine<S> {
    source: Arc<S>,
    num_workers: usize,
    report_interval: Duration,
}

impl<S: KeypairSource + 'static> SearchEngine<S> {
    /// One worker per available CPU, reports every second.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            num_workers: num_cpus::get(),
            report_interval: REPORT_INTERVAL,
        }
    }

    pub fn with_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Runs one search to completion.
    ///
    /// The first published match wins. The remaining workers are stopped
    /// and joined before returning, so `total_generated` is exact.
    pub fn search<P>(&self, prefix: &Prefix, sink: P) -> Result<SearchOutcome, SearchError>
    where
        P: ProgressSink + 'static,
    {
        let pool = WorkerPool::spawn(
            self.num_workers,
            prefix.clone(),
            self.source.clone(),
            Arc::new(sink),
            self.report_interval,
        )?;

        let result = pool.wait_for_match();
        let elapsed = pool.elapsed();
        let total_generated = pool.join();
        let found = result?;

        info!(
            worker = found.worker_id,
            total_generated,
            elapsed_ms = elapsed.as_millis() as u64,
            "search finished"
        );

        Ok(SearchOutcome {
            found,
            total_generated,
            elapsed,
        })
    }
}

/// Searches with random secp256k1 keys on every CPU, printing progress to
/// stdout.
pub fn search(prefix: &Prefix) -> Result<Match, SearchError> {
    SearchEngine::new(Secp256k1Source::new())
        .search(prefix, StdoutProgress)
        .map(|outcome| outcome.found)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::AtomicU64;
    use std::sync::Mutex;

    use super::*;
    use crate::crypto::ADDRESS_HEX_LEN;
    use crate::worker::ProgressReport;

    fn quiet() -> impl ProgressSink {
        |_: &ProgressReport| {}
    }

    fn is_lower_hex(s: &str) -> bool {
        s.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
    }

    /// Emits `ff..ff` addresses until `match_after` calls have been made,
    /// then `00..00`.
    struct CountingSource {
        calls: AtomicU64,
        match_after: u64,
    }

    impl CountingSource {
        fn new(match_after: u64) -> Self {
            Self {
                calls: AtomicU64::new(0),
                match_after,
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl KeypairSource for CountingSource {
        fn generate(&self) -> Keypair {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let byte = if n >= self.match_after { 0x00 } else { 0xff };
            Keypair::from_parts([0x11; 32], Address::from_bytes([byte; 20]))
        }
    }

    struct FailingSource;

    impl KeypairSource for FailingSource {
        fn generate(&self) -> Keypair {
            panic!("entropy source unavailable");
        }
    }

    #[test]
    fn test_empty_prefix_matches_quickly() {
        let engine = SearchEngine::new(Secp256k1Source::new()).with_workers(4);
        let outcome = engine.search(&Prefix::default(), quiet()).unwrap();

        let found = &outcome.found;
        assert_eq!(found.private_key.len(), 64);
        assert_eq!(found.address.len(), ADDRESS_HEX_LEN);
        assert!(is_lower_hex(&found.private_key));
        assert!(is_lower_hex(&found.address));
        // Every candidate matches, so no worker gets past its first one.
        assert!((1..=4).contains(&outcome.total_generated));
    }

    #[test]
    fn test_default_search_entry_point() {
        let found = search(&Prefix::default()).unwrap();
        assert_eq!(found.private_key.len(), 64);
        assert_eq!(found.address.len(), ADDRESS_HEX_LEN);
    }

    #[test]
    fn test_found_key_controls_found_address() {
        let prefix = Prefix::new("a").unwrap();
        let found = SearchEngine::new(Secp256k1Source::new())
            .with_workers(2)
            .search(&prefix, quiet())
            .unwrap()
            .found;

        let secret: [u8; 32] = hex::decode(&found.private_key).unwrap().try_into().unwrap();
        let keypair = Keypair::from_secret_key(secret).unwrap();
        assert_eq!(keypair.address().to_hex(), found.address);
        assert_eq!(found.checksum_address().to_lowercase(), format!("0x{}", found.address));
    }

    #[test]
    fn test_two_character_prefix() {
        let prefix = Prefix::new("ab").unwrap();
        let found = SearchEngine::new(Secp256k1Source::new())
            .search(&prefix, quiet())
            .unwrap()
            .found;
        assert!(found.address.starts_with("ab"));
    }

    #[test]
    fn test_substituted_prefix() {
        // "Ds" canonicalizes to "05"
        let prefix = Prefix::new("Ds").unwrap();
        let found = SearchEngine::new(Secp256k1Source::new())
            .search(&prefix, quiet())
            .unwrap()
            .found;
        assert!(found.address.starts_with("05"));
    }

    #[test]
    fn test_repeated_searches_differ() {
        let engine = SearchEngine::new(Secp256k1Source::new()).with_workers(2);
        let prefix = Prefix::new("").unwrap();

        let keys: HashSet<String> = (0..2)
            .map(|_| engine.search(&prefix, quiet()).unwrap().found.private_key)
            .collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_every_generated_candidate_is_counted() {
        let engine = SearchEngine::new(CountingSource::new(50_000))
            .with_workers(8)
            .with_report_interval(Duration::from_millis(1));
        let prefix = Prefix::new("00").unwrap();

        let outcome = engine.search(&prefix, quiet()).unwrap();

        assert_eq!(outcome.found.address, "0".repeat(ADDRESS_HEX_LEN));
        assert!(outcome.total_generated > 50_000);
        assert_eq!(outcome.total_generated, engine.source().calls());
        assert!(outcome.keys_per_second() >= 0.0);
    }

    #[test]
    fn test_progress_reports_reach_sink() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let reports = reports.clone();
            move |report: &ProgressReport| reports.lock().unwrap().push(*report)
        };

        let pool = WorkerPool::spawn(
            2,
            Prefix::new("00").unwrap(),
            Arc::new(CountingSource::new(u64::MAX)),
            Arc::new(sink),
            Duration::from_millis(10),
        )
        .unwrap();

        assert!(pool.wait_for_match_timeout(Duration::from_millis(200)).is_none());
        let total = pool.join();

        let reports = reports.lock().unwrap();
        assert!(!reports.is_empty());
        assert!(reports.iter().all(|r| r.possible_choices == 256));
        let reported: u64 = reports.iter().map(|r| r.samples).sum();
        assert!(reported <= total);
    }

    #[test]
    fn test_failing_source_is_fatal() {
        let engine = SearchEngine::new(FailingSource).with_workers(2);
        let result = engine.search(&Prefix::default(), quiet());
        assert!(matches!(result, Err(SearchError::GenerationFailure)));
    }

    #[test]
    fn test_pool_stop_joins_all_workers() {
        let source = Arc::new(CountingSource::new(u64::MAX));
        let pool = WorkerPool::spawn(
            2,
            Prefix::new("00").unwrap(),
            source.clone(),
            Arc::new(quiet()),
            REPORT_INTERVAL,
        )
        .unwrap();

        assert_eq!(pool.num_workers(), 2);
        assert!(!pool.is_stopped());
        pool.stop();
        assert!(pool.is_stopped());

        let total = pool.join();
        assert_eq!(total, source.calls());
    }
}
