mod types;

pub use types::{FetchError, FetchResult, VariantSummary};
