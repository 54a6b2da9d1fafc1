//! Progress Reporter: three phases (Verify, Download, Build), each a
//! monotonic non-decreasing 0–100% reading, decoupled from the fetch pool by
//! a single-writer channel so progress updates never contend with hot-path
//! I/O.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Verify,
    Download,
    Build,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Verify => "Verify",
            Phase::Download => "Download",
            Phase::Build => "Build",
        }
    }
}

/// Renders progress updates; implementations must not block.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, phase: Phase, percent: u8);
}

/// A 50-cell bar plus `NNN%`, redrawn on an interactive terminal.
pub struct TerminalProgressSink;

impl ProgressSink for TerminalProgressSink {
    fn on_progress(&self, phase: Phase, percent: u8) {
        let filled = (percent as usize * 50) / 100;
        let bar: String = "#".repeat(filled) + &"-".repeat(50 - filled);
        print!("\r{:<9} [{bar}] {percent:>3}%", phase.label());
        if percent >= 100 {
            println!();
        }
        use std::io::Write;
        let _ = std::io::stdout().flush();
    }
}

/// One line per 1% delta, suitable for non-interactive sinks (CI logs, pipes).
pub struct LoggingProgressSink;

impl ProgressSink for LoggingProgressSink {
    fn on_progress(&self, phase: Phase, percent: u8) {
        info!(phase = phase.label(), percent, "progress");
    }
}

struct ProgressUpdate {
    phase: Phase,
    percent: u8,
}

/// Handle held by producers (the fetch pool, the planner, the concatenator)
/// to report progress without touching the sink directly.
#[derive(Clone)]
pub struct ProgressHandle {
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ProgressHandle {
    pub fn report(&self, phase: Phase, percent: u8) {
        let _ = self.tx.send(ProgressUpdate {
            phase,
            percent: percent.min(100),
        });
    }
}

/// Owns the single-writer task that drains progress updates and enforces
/// monotonicity per phase, resetting when the phase changes.
pub struct ProgressReporter {
    handle: ProgressHandle,
    drain_task: tokio::task::JoinHandle<()>,
}

impl ProgressReporter {
    pub fn spawn(sink: Arc<dyn ProgressSink>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ProgressUpdate>();

        let drain_task = tokio::spawn(async move {
            let mut current_phase: Option<Phase> = None;
            let mut last_percent: u8 = 0;

            while let Some(update) = rx.recv().await {
                if current_phase != Some(update.phase) {
                    current_phase = Some(update.phase);
                    last_percent = 0;
                }
                if update.percent > last_percent {
                    last_percent = update.percent;
                    sink.on_progress(update.phase, last_percent);
                }
            }
        });

        Self {
            handle: ProgressHandle { tx },
            drain_task,
        }
    }

    pub fn handle(&self) -> ProgressHandle {
        self.handle.clone()
    }

    /// Flushes remaining updates and stops the drain task.
    pub async fn finish(self) {
        drop(self.handle);
        let _ = self.drain_task.await;
    }
}
