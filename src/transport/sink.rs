//! Abstract filesystem sink: create/append/remove semantics, kept behind a
//! trait so the Concurrent Fetcher and Concatenator don't depend on
//! `tokio::fs` directly.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

#[async_trait]
pub trait SegmentSink: Send + Sync {
    /// Writes `body` to `path`, creating or truncating it.
    async fn write_new(&self, path: &Path, body: &Bytes) -> std::io::Result<()>;

    /// Appends the full contents of `src` onto an already-open `dest`.
    async fn append_file(&self, dest: &mut tokio::fs::File, src: &Path) -> std::io::Result<u64>;

    async fn remove(&self, path: &Path) -> std::io::Result<()>;

    async fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()>;

    async fn create_truncated(&self, path: &Path) -> std::io::Result<tokio::fs::File>;
}

pub struct TokioFileSink;

#[async_trait]
impl SegmentSink for TokioFileSink {
    async fn write_new(&self, path: &Path, body: &Bytes) -> std::io::Result<()> {
        tokio::fs::write(path, body).await
    }

    async fn append_file(&self, dest: &mut tokio::fs::File, src: &Path) -> std::io::Result<u64> {
        use tokio::io::AsyncWriteExt;
        let mut source = tokio::fs::File::open(src).await?;
        let copied = tokio::io::copy(&mut source, dest).await?;
        dest.flush().await?;
        Ok(copied)
    }

    async fn remove(&self, path: &Path) -> std::io::Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error),
        }
    }

    async fn rename(&self, from: &Path, to: &Path) -> std::io::Result<()> {
        tokio::fs::rename(from, to).await
    }

    async fn create_truncated(&self, path: &Path) -> std::io::Result<tokio::fs::File> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .await
    }
}
