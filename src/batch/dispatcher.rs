//! Concurrent enrichment dispatcher.
//!
//! Every record within the row limit becomes one job on a shared queue. A fixed
//! number of workers pull jobs until the queue is empty (or the batch is
//! cancelled) and hand back `(row index, outcome)` pairs. The coordinator merges
//! those into a row-indexed vector after joining every worker, so completion
//! order never leaks into output order.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use indicatif::ProgressBar;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::lookup::PlaceLookup;
use super::query::derive_query;
use crate::error::{LookupError, Result};
use crate::models::{EnrichmentResult, FacilityRecord, RowOutcome};

pub const DEFAULT_WORKERS: usize = 4;

/// How many input rows to look up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowLimit {
    #[default]
    All,
    /// Only the first `n` rows (n >= 1)
    First(usize),
}

impl RowLimit {
    /// Parse the `--num-rows` convention: -1 means all rows
    pub fn from_arg(value: i64) -> Result<Self> {
        match value {
            -1 => Ok(RowLimit::All),
            n if n >= 1 => Ok(RowLimit::First(n as usize)),
            n => Err(LookupError::config(format!(
                "row limit must be a positive count or -1 for all rows, got {}",
                n
            ))),
        }
    }

    fn covers(&self, row: usize) -> bool {
        match self {
            RowLimit::All => true,
            RowLimit::First(n) => row < *n,
        }
    }
}

/// Outcome counts for a finished batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub enriched: usize,
    pub no_match: usize,
    pub no_query: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub skipped: usize,
}

impl BatchStats {
    pub fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        let mut stats = Self::default();
        for outcome in outcomes {
            match outcome {
                RowOutcome::Enriched(_) => stats.enriched += 1,
                RowOutcome::NoMatch => stats.no_match += 1,
                RowOutcome::NoQuery => stats.no_query += 1,
                RowOutcome::Failed(_) => stats.failed += 1,
                RowOutcome::Cancelled => stats.cancelled += 1,
                RowOutcome::Skipped => stats.skipped += 1,
            }
        }
        stats
    }
}

impl std::fmt::Display for BatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} enriched, {} no match, {} no query, {} failed, {} cancelled, {} skipped",
            self.enriched, self.no_match, self.no_query, self.failed, self.cancelled, self.skipped
        )
    }
}

/// Result of a batch: one outcome per input record, in input order
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub outcomes: Vec<RowOutcome>,
    pub stats: BatchStats,
    pub elapsed: Duration,
}

struct Job {
    index: usize,
    facility_id: String,
    query: String,
}

type JobQueue = Arc<Mutex<VecDeque<Job>>>;

pub struct Dispatcher {
    lookup: Arc<dyn PlaceLookup>,
    workers: usize,
    lookup_timeout: Option<Duration>,
    progress: ProgressBar,
}

impl Dispatcher {
    /// Create a dispatcher with a fixed worker pool width (at least 1)
    pub fn new(lookup: Arc<dyn PlaceLookup>, workers: usize) -> Self {
        Self {
            lookup,
            workers: workers.max(1),
            lookup_timeout: None,
            progress: ProgressBar::hidden(),
        }
    }

    /// Abandon any single lookup that runs longer than `timeout`
    pub fn with_lookup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Report completed lookups on `progress`; its length is set by `run`
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Look up every record within `limit`.
    ///
    /// Never fails as a whole: per-record problems are recorded as that row's
    /// outcome. Cancelling `cancel` stops workers from taking new jobs and
    /// abandons in-flight lookups; those rows come back as `Cancelled`.
    pub async fn run(
        &self,
        records: &[FacilityRecord],
        limit: RowLimit,
        cancel: &CancellationToken,
    ) -> BatchOutcome {
        let started = Instant::now();
        let mut slots: Vec<Option<RowOutcome>> = vec![None; records.len()];
        let mut queue = VecDeque::new();

        for (index, record) in records.iter().enumerate() {
            if !limit.covers(index) {
                slots[index] = Some(RowOutcome::Skipped);
                continue;
            }
            match derive_query(record) {
                Some(query) => queue.push_back(Job {
                    index,
                    facility_id: record.id.clone(),
                    query: query.text,
                }),
                None => slots[index] = Some(RowOutcome::NoQuery),
            }
        }

        let queued = queue.len();
        let width = self.workers.min(queued);
        info!(
            "Dispatching {} lookups across {} workers ({} rows total)",
            queued,
            width,
            records.len()
        );
        self.progress.set_length(queued as u64);

        let queue: JobQueue = Arc::new(Mutex::new(queue));
        let mut workers = JoinSet::new();
        for worker_id in 0..width {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&queue),
                Arc::clone(&self.lookup),
                self.lookup_timeout,
                cancel.clone(),
                self.progress.clone(),
            ));
        }

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(done) => {
                    for (index, outcome) in done {
                        slots[index] = Some(outcome);
                    }
                }
                Err(e) => error!("Enrichment worker terminated abnormally: {}", e),
            }
        }
        self.progress.finish();

        let cancelled = cancel.is_cancelled();
        let outcomes: Vec<RowOutcome> = slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    if cancelled {
                        RowOutcome::Cancelled
                    } else {
                        RowOutcome::Failed("lookup did not complete".to_string())
                    }
                })
            })
            .collect();

        let stats = BatchStats::from_outcomes(&outcomes);
        let elapsed = started.elapsed();
        if cancelled {
            warn!("Batch cancelled after {:.1?}: {}", elapsed, stats);
        } else {
            info!("Batch finished in {:.1?}: {}", elapsed, stats);
        }

        BatchOutcome {
            outcomes,
            stats,
            elapsed,
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: JobQueue,
    lookup: Arc<dyn PlaceLookup>,
    timeout: Option<Duration>,
    cancel: CancellationToken,
    progress: ProgressBar,
) -> Vec<(usize, RowOutcome)> {
    let mut done = Vec::new();

    while !cancel.is_cancelled() {
        let Some(job) = queue.lock().await.pop_front() else {
            break;
        };
        debug!(
            worker = worker_id,
            row = job.index,
            "Processing {}: {}",
            job.facility_id,
            job.query
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                done.push((job.index, RowOutcome::Cancelled));
                break;
            }
            outcome = lookup_one(lookup.as_ref(), &job, timeout) => {
                done.push((job.index, outcome));
                progress.inc(1);
            }
        }
    }

    debug!(worker = worker_id, "Worker done after {} jobs", done.len());
    done
}

/// Run one lookup, containing errors, timeouts and panics to this row
async fn lookup_one(
    lookup: &dyn PlaceLookup,
    job: &Job,
    timeout: Option<Duration>,
) -> RowOutcome {
    let call = AssertUnwindSafe(lookup.lookup(&job.query)).catch_unwind();
    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Ok(Err(LookupError::Timeout(limit))),
        },
        None => call.await,
    };

    match result {
        Ok(Ok(Some(place))) => {
            RowOutcome::Enriched(EnrichmentResult::new(job.facility_id.clone(), place))
        }
        Ok(Ok(None)) => {
            info!("No match for {} ('{}')", job.facility_id, job.query);
            RowOutcome::NoMatch
        }
        Ok(Err(e)) => {
            warn!("Lookup failed for {} ('{}'): {}", job.facility_id, job.query, e);
            RowOutcome::Failed(e.to_string())
        }
        Err(_) => {
            error!("Lookup panicked for {} ('{}')", job.facility_id, job.query);
            RowOutcome::Failed("lookup panicked".to_string())
        }
    }
}
