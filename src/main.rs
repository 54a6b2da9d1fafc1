use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hls_fetch::config::DownloadContext;
use hls_fetch::playlist::SelectionKeys;
use hls_fetch::progress::{ProgressSink, TerminalProgressSink};
use hls_fetch::HlsDownloader;

#[derive(Parser)]
#[command(name = "hls-fetch")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Downloads an HLS playlist and its segments to a single file")]
#[command(long_about = None)]
struct Cli {
    /// Playlist URL or local file path
    input: String,

    /// Output file path (a `.ts` extension is appended when absent)
    output: String,

    /// Skip the free-space check before downloading
    #[arg(long)]
    skip_space_check: bool,

    /// Write a structured JSON-lines debug log of each phase
    #[arg(long)]
    debug: bool,

    /// Path for the debug log, when `--debug` is set
    #[arg(long, default_value = "debug.log")]
    debug_path: String,

    /// Maximum concurrent segment fetches
    #[arg(short, long, default_value_t = 10)]
    max_threads: i64,

    /// Keep segments as individual `.N.ts` files instead of concatenating
    #[arg(long)]
    no_merge: bool,

    /// For a master playlist: select the variant with this NAME attribute
    #[arg(long)]
    name: Option<String>,

    /// For a master playlist: select the variant with this BANDWIDTH attribute
    #[arg(long)]
    bandwidth: Option<String>,

    /// For a master playlist: select the variant with this RESOLUTION attribute
    #[arg(long)]
    resolution: Option<String>,

    /// Log level for tracing output
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("hls_fetch={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("hls-fetch v{}", env!("CARGO_PKG_VERSION"));

    let mut context = DownloadContext::new(cli.input, cli.output);
    context.set_skip_space_check(cli.skip_space_check);
    context.set_debug(cli.debug);
    context.set_debug_path(cli.debug_path)?;
    context.set_max_threads(cli.max_threads)?;

    let progress_sink: Arc<dyn ProgressSink> = Arc::new(TerminalProgressSink);
    let mut downloader = HlsDownloader::with_collaborators(
        context,
        Arc::new(hls_fetch::transport::ReqwestFetcher::new()),
        Arc::new(hls_fetch::transport::TokioFileSink),
        Arc::new(hls_fetch::transport::SysinfoSpaceOracle),
        progress_sink,
    );

    let keys = SelectionKeys {
        name: cli.name,
        bandwidth: cli.bandwidth,
        resolution: cli.resolution,
    };
    let merge = !cli.no_merge;

    let result = if keys.is_empty() {
        // Try as a media playlist first; a master playlist with no selection
        // keys is still resolvable when it has exactly one variant.
        match downloader.download_playlist(merge).await {
            Err(hls_fetch::FetchError::WrongMethodMaster) => {
                downloader.download_master_playlist(keys, merge).await
            }
            other => other,
        }
    } else {
        downloader.download_master_playlist(keys, merge).await
    };

    result.map_err(|error| anyhow::anyhow!(error))
}
