mod backoff;
mod job;
mod pool;
mod space_guard;

pub use job::{stable_path_for, temp_path_for, FetchJob, FetchJobState};
pub use pool::run as fetch_segments;
pub use space_guard::check as check_space;
