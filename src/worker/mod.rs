//! Parallel vanity address search.
//!
//! - One OS thread per CPU, each generating and testing candidates
//! - Single-slot result handoff: the first match wins
//! - Shared throughput sample with periodic progress reports

mod cpu;
mod pool;
mod throughput;

pub use cpu::CpuWorker;
pub use pool::{search, Match, SearchEngine, SearchError, SearchOutcome, WorkerPool};
pub use throughput::{ProgressReport, ProgressSink, StdoutProgress, Throughput, REPORT_INTERVAL};
