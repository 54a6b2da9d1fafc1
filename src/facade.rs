//! Downloader Facade: the two public entry points, owning the
//! Verify → Plan → Guard → Download → Build pipeline and the per-invocation
//! state machine.

use std::sync::Arc;

use tracing::info;

use crate::config::DownloadContext;
use crate::debug_log::DebugLog;
use crate::errors::{FetchError, FetchResult};
use crate::fetch;
use crate::playlist::{self, PlaylistKind, SelectionKeys};
use crate::progress::{Phase, ProgressHandle, ProgressReporter, ProgressSink, TerminalProgressSink};
use crate::transport::{Fetcher, ReqwestFetcher, SegmentSink, SpaceOracle, SysinfoSpaceOracle, TokioFileSink};
use crate::build;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InvocationState {
    Idle,
    Verifying,
    Planning,
    Guarding,
    Downloading,
    Building,
    Done,
    Failed,
}

/// Orchestrates a single download. A `DownloadContext` must not be reused
/// concurrently across invocations; construct one `HlsDownloader` per
/// request, matching the "no invocation may run concurrently against the
/// same DownloadContext" rule.
pub struct HlsDownloader {
    context: DownloadContext,
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn SegmentSink>,
    oracle: Arc<dyn SpaceOracle>,
    progress_sink: Arc<dyn ProgressSink>,
    state: InvocationState,
}

impl HlsDownloader {
    pub fn new(context: DownloadContext) -> Self {
        Self::with_collaborators(
            context,
            Arc::new(ReqwestFetcher::new()),
            Arc::new(TokioFileSink),
            Arc::new(SysinfoSpaceOracle),
            Arc::new(TerminalProgressSink),
        )
    }

    pub fn with_collaborators(
        context: DownloadContext,
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn SegmentSink>,
        oracle: Arc<dyn SpaceOracle>,
        progress_sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            context,
            fetcher,
            sink,
            oracle,
            progress_sink,
            state: InvocationState::Idle,
        }
    }

    pub fn context(&self) -> &DownloadContext {
        &self.context
    }

    fn transition(&mut self, next: InvocationState) {
        info!(from = ?self.state, to = ?next, "invocation state transition");
        self.state = next;
    }

    /// Loads, classifies, and downloads a media playlist. Fails with
    /// `WRONG_METHOD_MASTER` if the document is a master playlist.
    pub async fn download_playlist(&mut self, merge: bool) -> FetchResult<()> {
        let debug_log = DebugLog::new(self.context.debug(), self.context.debug_path());
        let progress = ProgressReporter::spawn(Arc::clone(&self.progress_sink));
        let handle = progress.handle();

        let result = self.run_from_input(&handle, &debug_log, merge, EntryPoint::Media).await;
        progress.finish().await;
        self.finish(result)
    }

    /// Loads, classifies, selects a variant, and downloads the selected
    /// variant's media playlist. Fails with `WRONG_METHOD_MEDIA` if the
    /// document is already a media playlist.
    pub async fn download_master_playlist(
        &mut self,
        keys: SelectionKeys,
        merge: bool,
    ) -> FetchResult<()> {
        let debug_log = DebugLog::new(self.context.debug(), self.context.debug_path());
        let progress = ProgressReporter::spawn(Arc::clone(&self.progress_sink));
        let handle = progress.handle();

        let result = self
            .run_from_input(&handle, &debug_log, merge, EntryPoint::Master(keys))
            .await;
        progress.finish().await;
        self.finish(result)
    }

    fn finish(&mut self, result: FetchResult<()>) -> FetchResult<()> {
        match &result {
            Ok(()) => {
                self.transition(InvocationState::Done);
                self.context.mark_complete();
                info!("download complete");
            }
            Err(error) => {
                self.transition(InvocationState::Failed);
                info!(%error, "download failed");
            }
        }
        result
    }

    async fn run_from_input(
        &mut self,
        progress: &ProgressHandle,
        debug_log: &DebugLog,
        merge: bool,
        entry: EntryPoint,
    ) -> FetchResult<()> {
        self.transition(InvocationState::Verifying);
        let input = self.context.input().to_string();
        let doc = playlist::load_and_classify(self.fetcher.as_ref(), &input).await?;

        if doc.missing_header {
            debug_log
                .record("Verify", "missing_header", format!("source={input}"))
                .await;
        }

        let media_doc = match entry {
            EntryPoint::Media => match doc.kind {
                PlaylistKind::Master => return Err(FetchError::WrongMethodMaster),
                PlaylistKind::Unknown => return Err(FetchError::NotAPlaylist),
                PlaylistKind::Media => doc,
            },
            EntryPoint::Master(keys) => match doc.kind {
                PlaylistKind::Media => return Err(FetchError::WrongMethodMedia),
                PlaylistKind::Unknown => return Err(FetchError::NotAPlaylist),
                PlaylistKind::Master => {
                    if doc.encrypted {
                        return Err(FetchError::EncryptedUnsupported);
                    }
                    let variants = playlist::extract_variants(&doc.lines, &doc.base_uri);
                    let variant_uri = match playlist::select(&variants, &keys) {
                        Ok(selected) => selected.uri.clone(),
                        Err(FetchError::VariantAmbiguous { candidates }) => {
                            debug_log
                                .record(
                                    "Verify",
                                    "variant_ambiguous",
                                    format!("candidates={candidates:?}"),
                                )
                                .await;
                            return Err(FetchError::VariantAmbiguous { candidates });
                        }
                        Err(other) => return Err(other),
                    };

                    let variant_doc =
                        playlist::load_and_classify(self.fetcher.as_ref(), &variant_uri).await?;
                    if variant_doc.kind != PlaylistKind::Media {
                        return Err(FetchError::MalformedMaster { uri: variant_uri });
                    }
                    variant_doc
                }
            },
        };

        if media_doc.encrypted {
            return Err(FetchError::EncryptedUnsupported);
        }

        self.transition(InvocationState::Planning);
        let plan = playlist::plan(&media_doc.lines, &media_doc.base_uri);

        self.transition(InvocationState::Guarding);
        fetch::check_space(
            self.fetcher.as_ref(),
            self.oracle.as_ref(),
            &plan,
            &self.context.output_with_extension(),
            self.context.skip_space_check(),
            progress,
        )
        .await?;

        self.transition(InvocationState::Downloading);
        let output_base = self.context.output().clone();
        let jobs = fetch::fetch_segments(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.sink),
            &plan,
            &output_base,
            self.context.max_threads(),
            progress.clone(),
            debug_log,
        )
        .await?;

        self.transition(InvocationState::Building);
        build::build(
            self.sink.as_ref(),
            &jobs,
            &output_base,
            &self.context.output_with_extension(),
            merge,
            progress,
            debug_log,
        )
        .await?;

        progress.report(Phase::Build, 100);
        Ok(())
    }
}

enum EntryPoint {
    Media,
    Master(SelectionKeys),
}
