mod concatenator;

pub use concatenator::build;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_log::DebugLog;
    use crate::fetch::{temp_path_for, FetchJob, FetchJobState};
    use crate::progress::{ProgressReporter, ProgressSink};
    use crate::transport::{SegmentSink, TokioFileSink};
    use std::sync::Arc;

    struct NoopSink;
    impl ProgressSink for NoopSink {
        fn on_progress(&self, _phase: crate::progress::Phase, _percent: u8) {}
    }

    #[tokio::test]
    async fn concatenates_in_index_order_regardless_of_write_order() {
        let dir = tempfile::tempdir().unwrap();
        let output_base = dir.path().join("out");
        let output_path = output_base.with_extension("ts");
        let sink = TokioFileSink;

        let bodies = [b"AAA".to_vec(), b"BBB".to_vec(), b"CCC".to_vec()];
        let mut jobs = Vec::new();
        // Write temp files out of index order to simulate nondeterministic
        // fetch completion while keeping the planner's index assignment.
        for index in [2usize, 0, 1] {
            let temp_path = temp_path_for(&output_base, index);
            tokio::fs::write(&temp_path, &bodies[index]).await.unwrap();
            jobs.push(FetchJob {
                index,
                uri: format!("seg{index}"),
                temp_path,
                state: FetchJobState::Done,
                bytes: Some(bodies[index].len() as u64),
            });
        }
        jobs.sort_by_key(|j| j.index);

        let progress = ProgressReporter::spawn(Arc::new(NoopSink)).handle();
        let debug_log = DebugLog::new(false, dir.path().join("debug.log").as_path());
        build(&sink, &jobs, &output_base, &output_path, true, &progress, &debug_log)
            .await
            .unwrap();

        let contents = tokio::fs::read(&output_path).await.unwrap();
        assert_eq!(contents, b"AAABBBCCC");

        for job in &jobs {
            assert!(!job.temp_path.exists());
        }
    }

    #[tokio::test]
    async fn merge_false_renames_to_stable_paths() {
        let dir = tempfile::tempdir().unwrap();
        let output_base = dir.path().join("out");
        let output_path = output_base.with_extension("ts");
        let sink = TokioFileSink;

        let temp_path = temp_path_for(&output_base, 0);
        tokio::fs::write(&temp_path, b"AAA").await.unwrap();
        let jobs = vec![FetchJob {
            index: 0,
            uri: "seg0".into(),
            temp_path: temp_path.clone(),
            state: FetchJobState::Done,
            bytes: Some(3),
        }];

        let progress = ProgressReporter::spawn(Arc::new(NoopSink)).handle();
        let debug_log = DebugLog::new(false, dir.path().join("debug.log").as_path());
        build(&sink, &jobs, &output_base, &output_path, false, &progress, &debug_log)
            .await
            .unwrap();

        assert!(!temp_path.exists());
        assert!(!output_path.exists());
        let stable = dir.path().join("out.0.ts");
        assert_eq!(tokio::fs::read(&stable).await.unwrap(), b"AAA");
    }
}
