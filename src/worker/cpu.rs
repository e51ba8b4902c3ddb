//! CPU-based worker for vanity address search.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{Sender, TrySendError};
use tracing::{debug, info};

use crate::crypto::KeypairSource;
use crate::matcher::Prefix;

use super::throughput::{ProgressSink, Throughput};
use super::Match;

/// A worker thread's view of the search.
pub struct CpuWorker<S: ?Sized> {
    id: usize,
    prefix: Prefix,
    source: Arc<S>,
    result_tx: Sender<Match>,
    stop_flag: Arc<AtomicBool>,
    throughput: Arc<Throughput>,
    sink: Arc<dyn ProgressSink>,
}

impl<S: KeypairSource + ?Sized> CpuWorker<S> {
    pub fn new(
        id: usize,
        prefix: Prefix,
        source: Arc<S>,
        result_tx: Sender<Match>,
        stop_flag: Arc<AtomicBool>,
        throughput: Arc<Throughput>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            id,
            prefix,
            source,
            result_tx,
            stop_flag,
            throughput,
            sink,
        }
    }

    /// Runs the worker loop.
    ///
    /// Every candidate is counted before it is tested. The loop ends when
    /// this worker finds a match or the stop flag is raised; the flag is
    /// only looked at between candidates, so a stop costs at most one
    /// iteration.
    pub fn run(&self) {
        debug!(worker = self.id, prefix = %self.prefix, "worker started");
        let possible_choices = self.prefix.possible_choices();

        while !self.stop_flag.load(Ordering::Relaxed) {
            let keypair = self.source.generate();
            self.throughput.record();
            self.throughput
                .try_report(possible_choices, |report| self.sink.report(report));

            if self.prefix.matches(keypair.address()) {
                let found = Match::from_keypair(&keypair, self.id);
                match self.result_tx.try_send(found) {
                    Ok(()) => info!(worker = self.id, address = %keypair.address(), "match published"),
                    // Slot already taken: another worker won the race.
                    Err(TrySendError::Full(_)) => {
                        debug!(worker = self.id, "match dropped, result already published")
                    }
                    Err(TrySendError::Disconnected(_)) => {
                        debug!(worker = self.id, "match dropped, coordinator gone")
                    }
                }
                break;
            }
        }

        debug!(worker = self.id, "worker exiting");
    }

    pub fn id(&self) -> usize {
        self.id
    }
}
