//! Error type definitions for the HLS downloader
//!
//! A single flat error family is used throughout the crate so that callers can
//! match on `FetchError::kind()`-equivalent variants without digging through a
//! layered hierarchy. Transport and I/O errors are folded in via `#[from]`.

use thiserror::Error;

/// One selectable variant from a master playlist, used in ambiguity reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSummary {
    pub name: String,
    pub bandwidth: String,
    pub resolution: String,
}

/// Top-level error type for every fallible operation in this crate.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport layer reported offline/DNS failure before any HTTP status.
    #[error("no network connectivity reaching {url}")]
    NoNetwork { url: String },

    /// Input playlist returned non-2xx or the local read failed.
    #[error("input playlist unreachable: {detail}")]
    InputUnreachable { detail: String },

    /// Classifier returned `Unknown`.
    #[error("document is not a recognizable M3U8 playlist")]
    NotAPlaylist,

    /// `download_playlist` was called on a master document.
    #[error("playlist is a master playlist; use download_master_playlist")]
    WrongMethodMaster,

    /// `download_master_playlist` was called on a media document.
    #[error("playlist is a media playlist; use download_playlist")]
    WrongMethodMedia,

    /// Selected variant did not resolve to a media playlist.
    #[error("selected variant at {uri} did not resolve to a media playlist")]
    MalformedMaster { uri: String },

    /// Multiple variants matched and no selection keys narrowed it to one.
    #[error("variant selection is ambiguous among {} candidates", candidates.len())]
    VariantAmbiguous { candidates: Vec<VariantSummary> },

    /// Provided selection keys matched no variant.
    #[error("no variant matches the provided selection keys")]
    VariantNotFound,

    /// Space guard denied the plan.
    #[error("insufficient space: need {required} bytes, {available} available")]
    InsufficientSpace { required: u64, available: u64 },

    /// A segment exhausted its retry budget.
    #[error("segment {index} ({uri}) failed after retries: {cause}")]
    SegmentFetchFailed {
        index: usize,
        uri: String,
        cause: String,
    },

    /// Concatenation I/O error during the Build phase.
    #[error("build failed: {0}")]
    BuildFailed(#[source] std::io::Error),

    /// `#EXT-X-KEY` encountered with a method other than `NONE`.
    #[error("encrypted playlists are not supported")]
    EncryptedUnsupported,

    /// A property setter received an invalid value.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Cooperative cancellation, user-initiated or triggered by a sibling
    /// job's fatal failure.
    #[error("operation cancelled")]
    Cancelled,

    /// Underlying HTTP client error not otherwise classified above.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Underlying filesystem error not otherwise classified above.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn invalid_config<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn input_unreachable<S: Into<String>>(detail: S) -> Self {
        Self::InputUnreachable {
            detail: detail.into(),
        }
    }

    /// True when retrying the same request might succeed: transport-level
    /// failures and 5xx responses, not the structural/semantic errors above.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Io(_))
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
