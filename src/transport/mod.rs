mod fetcher;
mod sink;
mod space;

pub use fetcher::{Fetcher, FetchResponse, ReqwestFetcher, TransportError};
pub use sink::{SegmentSink, TokioFileSink};
pub use space::{SpaceOracle, SysinfoSpaceOracle};
