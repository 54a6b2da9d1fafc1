//! Abstract free-space oracle: a numeric probe for bytes available at a
//! path, kept behind a trait so the Space Guard is testable without touching
//! the real filesystem's disk usage.

use std::path::Path;

pub trait SpaceOracle: Send + Sync {
    /// Bytes available on the device backing `path`'s deepest existing
    /// ancestor. Returns `None` when free space cannot be determined.
    fn available_bytes(&self, path: &Path) -> Option<u64>;
}

/// Production oracle backed by `sysinfo`'s disk listing.
pub struct SysinfoSpaceOracle;

impl SpaceOracle for SysinfoSpaceOracle {
    fn available_bytes(&self, path: &Path) -> Option<u64> {
        let probe_dir = first_existing_ancestor(path)?;
        let probe_dir = std::fs::canonicalize(&probe_dir).unwrap_or(probe_dir);

        let disks = sysinfo::Disks::new_with_refreshed_list();
        disks
            .iter()
            .filter(|disk| probe_dir.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().as_os_str().len())
            .map(|disk| disk.available_space())
    }
}

fn first_existing_ancestor(path: &Path) -> Option<std::path::PathBuf> {
    let mut candidate = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().ok()?.join(path)
    };
    loop {
        if candidate.exists() {
            return Some(candidate);
        }
        candidate = candidate.parent()?.to_path_buf();
    }
}
