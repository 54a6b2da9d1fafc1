//! Space Guard: compares a plan's estimated byte size against free space at
//! the output device, with a 5% safety margin. Never downloads a full
//! segment body; only HEAD probes (or, when those are unsupported, a small
//! sample used to extrapolate).

use std::path::Path;

use tracing::warn;

use crate::errors::{FetchError, FetchResult};
use crate::playlist::SegmentPlan;
use crate::progress::{Phase, ProgressHandle};
use crate::transport::{Fetcher, SpaceOracle};

/// HEAD is tried first; when a source clearly doesn't support it we fall
/// back to sampling the first `SPACE_PROBE_SAMPLE` segments and extrapolate
/// from their average size instead of issuing one request per segment.
const SPACE_PROBE_SAMPLE: usize = 5;
const SAFETY_MARGIN: f64 = 1.05;

pub async fn check(
    fetcher: &dyn Fetcher,
    oracle: &dyn SpaceOracle,
    plan: &SegmentPlan,
    output_path: &Path,
    skip: bool,
    progress: &ProgressHandle,
) -> FetchResult<()> {
    progress.report(Phase::Verify, 0);

    if skip || plan.is_empty() {
        progress.report(Phase::Verify, 100);
        return Ok(());
    }

    let total = plan.len();
    let mut known_sizes: Vec<u64> = Vec::new();

    for (probed, segment) in plan.segments().iter().enumerate() {
        let size = match fetcher.head(&segment.uri).await {
            Ok(Some(len)) => Some(len),
            _ => match fetcher.probe_size(&segment.uri).await {
                Ok(Some(len)) => Some(len),
                _ => None,
            },
        };
        if let Some(len) = size {
            known_sizes.push(len);
        }
        let percent = (((probed + 1) * 80) / total) as u8;
        progress.report(Phase::Verify, percent);

        // Once we have enough of a sample and HEAD is clearly unsupported
        // for this source, stop probing the remainder individually;
        // extrapolate instead of issuing one request per segment.
        if known_sizes.is_empty() && probed + 1 >= SPACE_PROBE_SAMPLE.min(total) {
            break;
        }
    }

    progress.report(Phase::Verify, 90);

    let required = if known_sizes.len() == total {
        known_sizes.iter().sum::<u64>()
    } else if !known_sizes.is_empty() {
        let avg = known_sizes.iter().sum::<u64>() / known_sizes.len() as u64;
        avg * total as u64
    } else {
        warn!("space guard could not size any segment; skipping comparison");
        progress.report(Phase::Verify, 100);
        return Ok(());
    };

    let required = (required as f64 * SAFETY_MARGIN).ceil() as u64;

    let probe_dir = output_path.parent().unwrap_or(Path::new("."));
    let available = match oracle.available_bytes(probe_dir) {
        Some(bytes) => bytes,
        None => {
            warn!("space guard could not determine free space; skipping comparison");
            progress.report(Phase::Verify, 100);
            return Ok(());
        }
    };

    progress.report(Phase::Verify, 100);

    if required > available {
        return Err(FetchError::InsufficientSpace {
            required,
            available,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playlist::plan;
    use crate::progress::{ProgressReporter, ProgressSink};
    use crate::transport::{FetchResponse, TransportError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct NoopSink;
    impl ProgressSink for NoopSink {
        fn on_progress(&self, _phase: Phase, _percent: u8) {}
    }

    fn test_handle() -> ProgressHandle {
        ProgressReporter::spawn(Arc::new(NoopSink)).handle()
    }

    struct FixedSizeFetcher(u64);

    #[async_trait]
    impl Fetcher for FixedSizeFetcher {
        async fn get(&self, _url: &str) -> Result<FetchResponse, TransportError> {
            unreachable!("space guard must not fetch full bodies")
        }
        async fn head(&self, _url: &str) -> Result<Option<u64>, TransportError> {
            Ok(Some(self.0))
        }
    }

    /// HEAD unsupported; sizes only via the ranged-GET fallback.
    struct RangeOnlyFetcher(u64);

    #[async_trait]
    impl Fetcher for RangeOnlyFetcher {
        async fn get(&self, _url: &str) -> Result<FetchResponse, TransportError> {
            unreachable!("space guard must not fetch full bodies")
        }
        async fn head(&self, _url: &str) -> Result<Option<u64>, TransportError> {
            Ok(None)
        }
        async fn probe_size(&self, _url: &str) -> Result<Option<u64>, TransportError> {
            Ok(Some(self.0))
        }
    }

    struct FixedSpace(u64);
    impl SpaceOracle for FixedSpace {
        fn available_bytes(&self, _path: &Path) -> Option<u64> {
            Some(self.0)
        }
    }

    fn two_segment_plan() -> SegmentPlan {
        let lines: Vec<String> = vec![
            "#EXTM3U".into(),
            "#EXTINF:10.0,".into(),
            "s0.ts".into(),
            "#EXTINF:10.0,".into(),
            "s1.ts".into(),
            "#EXT-X-ENDLIST".into(),
        ];
        plan(&lines, "")
    }

    #[tokio::test]
    async fn passes_when_plenty_of_space() {
        let handle = test_handle();
        let plan = two_segment_plan();
        let fetcher = FixedSizeFetcher(100);
        let oracle = FixedSpace(10_000);
        let result = check(&fetcher, &oracle, &plan, Path::new("/tmp/out.ts"), false, &handle).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn fails_when_required_exceeds_available() {
        let handle = test_handle();
        let plan = two_segment_plan();
        let fetcher = FixedSizeFetcher(1_000_000);
        let oracle = FixedSpace(100);
        let result = check(&fetcher, &oracle, &plan, Path::new("/tmp/out.ts"), false, &handle).await;
        assert!(matches!(result, Err(FetchError::InsufficientSpace { .. })));
    }

    #[tokio::test]
    async fn falls_back_to_ranged_get_when_head_is_unsupported() {
        let handle = test_handle();
        let plan = two_segment_plan();
        let fetcher = RangeOnlyFetcher(100);
        let oracle = FixedSpace(10_000);
        let result = check(&fetcher, &oracle, &plan, Path::new("/tmp/out.ts"), false, &handle).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn skip_flag_bypasses_probing_entirely() {
        let handle = test_handle();
        let plan = two_segment_plan();
        let fetcher = FixedSizeFetcher(1_000_000);
        let oracle = FixedSpace(1);
        let result = check(&fetcher, &oracle, &plan, Path::new("/tmp/out.ts"), true, &handle).await;
        assert!(result.is_ok());
    }
}
