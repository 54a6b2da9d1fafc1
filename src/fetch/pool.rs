//! Concurrent Fetcher: a bounded worker pool that downloads planned segments
//! in parallel, recovers ordering from `index`, retries transient failures
//! with full-jitter exponential backoff, and cancels cooperatively on the
//! first fatal failure.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::debug_log::DebugLog;
use crate::errors::{FetchError, FetchResult};
use crate::playlist::SegmentPlan;
use crate::progress::{Phase, ProgressHandle};
use crate::transport::{Fetcher, SegmentSink, TransportError};

use super::backoff::backoff_delay;
use super::job::{temp_path_for, FetchJob, FetchJobState};

const MAX_RETRIES: u32 = 3;

pub async fn run(
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn SegmentSink>,
    plan: &SegmentPlan,
    output_base: &Path,
    max_threads: usize,
    progress: ProgressHandle,
    debug_log: &DebugLog,
) -> FetchResult<Vec<FetchJob>> {
    let total = plan.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let permits = max_threads.min(total).max(1);
    let semaphore = Arc::new(Semaphore::new(permits));
    let cancelled = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicUsize::new(0));

    let temp_paths: Vec<PathBuf> = (0..total).map(|i| temp_path_for(output_base, i)).collect();

    let mut tasks: JoinSet<Result<FetchJob, (usize, String, FetchError)>> = JoinSet::new();

    for segment in plan.segments() {
        let fetcher = Arc::clone(&fetcher);
        let sink = Arc::clone(&sink);
        let semaphore = Arc::clone(&semaphore);
        let cancelled = Arc::clone(&cancelled);
        let completed = Arc::clone(&completed);
        let progress = progress.clone();
        let index = segment.index;
        let uri = segment.uri.clone();
        let temp_path = temp_paths[index].clone();

        tasks.spawn(async move {
            fetch_one(
                fetcher, sink, semaphore, cancelled, completed, progress, index, uri, temp_path,
                total,
            )
            .await
        });
    }

    let mut jobs: Vec<Option<FetchJob>> = (0..total).map(|_| None).collect();
    let mut failures: Vec<(usize, String, FetchError)> = Vec::new();

    while let Some(outcome) = tasks.join_next().await {
        match outcome.expect("fetch task panicked") {
            Ok(job) => jobs[job.index] = Some(job),
            Err((index, uri, error)) => {
                cancelled.store(true, Ordering::SeqCst);
                failures.push((index, uri, error));
            }
        }
    }

    if let Some((index, uri, error)) = failures.into_iter().min_by_key(|(i, ..)| *i) {
        warn!(index, uri, "cleaning up after fatal segment failure");
        for path in &temp_paths {
            if let Err(cleanup_error) = sink.remove(path).await {
                warn!(?cleanup_error, path = %path.display(), "cleanup of orphan temp failed");
                debug_log
                    .record(
                        "Download",
                        "cleanup_failed",
                        format!("path={} error={cleanup_error}", path.display()),
                    )
                    .await;
            }
        }
        return Err(error);
    }

    Ok(jobs.into_iter().map(|job| job.expect("every job completes")).collect())
}

#[allow(clippy::too_many_arguments)]
async fn fetch_one(
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn SegmentSink>,
    semaphore: Arc<Semaphore>,
    cancelled: Arc<AtomicBool>,
    completed: Arc<AtomicUsize>,
    progress: ProgressHandle,
    index: usize,
    uri: String,
    temp_path: PathBuf,
    total: usize,
) -> Result<FetchJob, (usize, String, FetchError)> {
    let _permit = semaphore
        .acquire_owned()
        .await
        .expect("semaphore is never closed");

    let mut attempt: u32 = 0;
    loop {
        if cancelled.load(Ordering::SeqCst) {
            return Err((index, uri, FetchError::Cancelled));
        }

        match fetcher.get(&uri).await {
            Ok(response) if response.is_success() => {
                if cancelled.load(Ordering::SeqCst) {
                    return Err((index, uri, FetchError::Cancelled));
                }
                match sink.write_new(&temp_path, &response.body).await {
                    Ok(()) => {
                        let bytes = response.body.len() as u64;
                        let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                        progress.report(Phase::Download, ((done * 100) / total) as u8);
                        return Ok(FetchJob {
                            index,
                            uri,
                            temp_path,
                            state: FetchJobState::Done,
                            bytes: Some(bytes),
                        });
                    }
                    Err(io_error) => {
                        let error = FetchError::Io(io_error);
                        if attempt >= MAX_RETRIES || !error.is_retryable() {
                            return Err((index, uri, error));
                        }
                    }
                }
            }
            Ok(response) => {
                if attempt >= MAX_RETRIES {
                    return Err((
                        index,
                        uri.clone(),
                        FetchError::SegmentFetchFailed {
                            index,
                            uri,
                            cause: format!("HTTP {}", response.status),
                        },
                    ));
                }
            }
            Err(TransportError::Offline(detail)) | Err(TransportError::Other(detail)) => {
                if attempt >= MAX_RETRIES {
                    return Err((
                        index,
                        uri.clone(),
                        FetchError::SegmentFetchFailed {
                            index,
                            uri,
                            cause: detail,
                        },
                    ));
                }
            }
        }

        debug!(index, attempt, "retrying segment after transient failure");
        tokio::time::sleep(backoff_delay(attempt)).await;
        attempt += 1;
    }
}
