//! Concatenator (Build phase): single-threaded, strict index-ascending
//! streaming append of temp segment files into the final output, or a
//! rename-to-stable-path pass when `merge=false`.

use std::path::Path;

use tracing::{debug, warn};

use crate::debug_log::DebugLog;
use crate::errors::{FetchError, FetchResult};
use crate::fetch::{stable_path_for, temp_path_for, FetchJob};
use crate::progress::{Phase, ProgressHandle};
use crate::transport::SegmentSink;

pub async fn build(
    sink: &dyn SegmentSink,
    jobs: &[FetchJob],
    output_base: &Path,
    output_path: &Path,
    merge: bool,
    progress: &ProgressHandle,
    debug_log: &DebugLog,
) -> FetchResult<()> {
    progress.report(Phase::Build, 0);

    if !merge {
        let total = jobs.len().max(1);
        for (done, job) in jobs.iter().enumerate() {
            let stable = stable_path_for(output_base, job.index);
            sink.rename(&job.temp_path, &stable)
                .await
                .map_err(FetchError::BuildFailed)?;
            progress.report(Phase::Build, (((done + 1) * 100) / total) as u8);
        }
        progress.report(Phase::Build, 100);
        return Ok(());
    }

    let mut output = sink
        .create_truncated(output_path)
        .await
        .map_err(FetchError::BuildFailed)?;

    let total = jobs.len().max(1);
    for (done, job) in jobs.iter().enumerate() {
        let expected_path = temp_path_for(output_base, job.index);
        debug_assert_eq!(job.temp_path, expected_path);

        if let Err(copy_error) = sink.append_file(&mut output, &job.temp_path).await {
            cleanup_output(sink, output_path, debug_log).await;
            return Err(FetchError::BuildFailed(copy_error));
        }
        if let Err(remove_error) = sink.remove(&job.temp_path).await {
            cleanup_output(sink, output_path, debug_log).await;
            return Err(FetchError::BuildFailed(remove_error));
        }

        progress.report(Phase::Build, (((done + 1) * 100) / total) as u8);
        debug!(index = job.index, "appended segment to output");
    }

    progress.report(Phase::Build, 100);
    Ok(())
}

/// Best-effort removal of a partially written output after a build failure;
/// the primary error is what gets surfaced, this one never is.
async fn cleanup_output(sink: &dyn SegmentSink, output_path: &Path, debug_log: &DebugLog) {
    if let Err(cleanup_error) = sink.remove(output_path).await {
        warn!(?cleanup_error, path = %output_path.display(), "failed to remove partial output after build failure");
        debug_log
            .record(
                "Build",
                "cleanup_failed",
                format!("path={} error={cleanup_error}", output_path.display()),
            )
            .await;
    }
}
