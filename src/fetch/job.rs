use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchJobState {
    Pending,
    Running,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct FetchJob {
    pub index: usize,
    pub uri: String,
    pub temp_path: PathBuf,
    pub state: FetchJobState,
    pub bytes: Option<u64>,
}

impl FetchJob {
    pub fn new(index: usize, uri: String, temp_path: PathBuf) -> Self {
        Self {
            index,
            uri,
            temp_path,
            state: FetchJobState::Pending,
            bytes: None,
        }
    }
}

/// Temp-file naming for a segment: `outputDir/<base>.<index>.part`.
pub fn temp_path_for(output_base: &std::path::Path, index: usize) -> PathBuf {
    let file_stem = output_base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let dir = output_base.parent().unwrap_or_else(|| std::path::Path::new("."));
    dir.join(format!("{file_stem}.{index}.part"))
}

/// Stable retained path when `merge=false`: `outputDir/<base>.<index>.ts`.
pub fn stable_path_for(output_base: &std::path::Path, index: usize) -> PathBuf {
    let file_stem = output_base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let dir = output_base.parent().unwrap_or_else(|| std::path::Path::new("."));
    dir.join(format!("{file_stem}.{index}.ts"))
}
