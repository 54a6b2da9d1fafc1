//! Playlist Loader + Classifier: retrieves an M3U8 document and labels it as
//! media, master, or unknown.

mod classifier;
mod loader;
mod segments;
mod selector;
mod url_resolve;
mod variant;

pub use classifier::{parse_attributes, PlaylistKind};
pub use segments::{plan, PlannedSegment, SegmentPlan};
pub use selector::{select, SelectionKeys};
pub use url_resolve::resolve;
pub use variant::{extract_variants, Variant};

use crate::errors::FetchResult;
use crate::transport::Fetcher;
use tracing::debug;

pub struct PlaylistDocument {
    pub source: String,
    pub base_uri: String,
    pub lines: Vec<String>,
    pub kind: PlaylistKind,
    pub missing_header: bool,
    pub encrypted: bool,
}

pub async fn load_and_classify(fetcher: &dyn Fetcher, source: &str) -> FetchResult<PlaylistDocument> {
    let loaded = loader::load(fetcher, source).await?;
    let classification = classifier::classify(&loaded.lines);

    if classification.missing_header {
        debug!(source, "playlist missing leading #EXTM3U tag");
    }

    Ok(PlaylistDocument {
        source: source.to_string(),
        base_uri: loaded.base_uri,
        lines: loaded.lines,
        kind: classification.kind,
        missing_header: classification.missing_header,
        encrypted: classification.encrypted,
    })
}
