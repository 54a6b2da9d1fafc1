//! Per-invocation configuration for a single download.
//!
//! `DownloadContext` is created once per user request and lives for the
//! duration of a single `download_playlist` / `download_master_playlist`
//! call. Setters validate their input and return `INVALID_CONFIG` rather than
//! panicking, matching the "no runtime introspection required, just validating
//! mutators" design note.

use crate::errors::FetchError;
use std::path::PathBuf;

pub const DEFAULT_MAX_THREADS: usize = 10;
pub const DEFAULT_DEBUG_PATH: &str = "debug.log";

#[derive(Debug, Clone)]
pub struct DownloadContext {
    input: String,
    output: PathBuf,
    skip_space_check: bool,
    debug: bool,
    debug_path: PathBuf,
    max_threads: usize,
    is_download_complete: bool,
}

impl DownloadContext {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(input: S, output: P) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            skip_space_check: false,
            debug: false,
            debug_path: PathBuf::from(DEFAULT_DEBUG_PATH),
            max_threads: DEFAULT_MAX_THREADS,
            is_download_complete: false,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input<S: Into<String>>(&mut self, input: S) -> Result<(), FetchError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(FetchError::invalid_config("input must not be empty"));
        }
        self.input = input;
        Ok(())
    }

    pub fn output(&self) -> &PathBuf {
        &self.output
    }

    pub fn set_output<P: Into<PathBuf>>(&mut self, output: P) -> Result<(), FetchError> {
        let output: PathBuf = output.into();
        if output.as_os_str().is_empty() {
            return Err(FetchError::invalid_config("output must not be empty"));
        }
        self.output = output;
        Ok(())
    }

    pub fn skip_space_check(&self) -> bool {
        self.skip_space_check
    }

    pub fn set_skip_space_check(&mut self, value: bool) {
        self.skip_space_check = value;
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn set_debug(&mut self, value: bool) {
        self.debug = value;
    }

    pub fn debug_path(&self) -> &PathBuf {
        &self.debug_path
    }

    pub fn set_debug_path<P: Into<PathBuf>>(&mut self, path: P) -> Result<(), FetchError> {
        let path: PathBuf = path.into();
        if path.as_os_str().is_empty() {
            return Err(FetchError::invalid_config("debug_path must not be empty"));
        }
        self.debug_path = path;
        Ok(())
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    pub fn set_max_threads(&mut self, value: i64) -> Result<(), FetchError> {
        if value <= 0 {
            return Err(FetchError::invalid_config(
                "max_threads must be a positive integer",
            ));
        }
        self.max_threads = value as usize;
        Ok(())
    }

    pub fn is_download_complete(&self) -> bool {
        self.is_download_complete
    }

    pub(crate) fn mark_complete(&mut self) {
        self.is_download_complete = true;
    }

    /// `outputPath` with `.ts` appended when it has no extension, per the
    /// output filename policy in the Concatenator component.
    pub fn output_with_extension(&self) -> PathBuf {
        if self.output.extension().is_some() {
            self.output.clone()
        } else {
            let mut path = self.output.clone();
            let appended = match path.file_name() {
                Some(name) => format!("{}.ts", name.to_string_lossy()),
                None => "output.ts".to_string(),
            };
            path.set_file_name(appended);
            path
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_spec() {
        let ctx = DownloadContext::new("in.m3u8", "out");
        assert!(!ctx.skip_space_check());
        assert!(!ctx.debug());
        assert_eq!(ctx.debug_path(), &PathBuf::from("debug.log"));
        assert_eq!(ctx.max_threads(), DEFAULT_MAX_THREADS);
        assert!(!ctx.is_download_complete());
    }

    #[test]
    fn rejects_non_positive_max_threads() {
        let mut ctx = DownloadContext::new("in.m3u8", "out");
        assert!(ctx.set_max_threads(0).is_err());
        assert!(ctx.set_max_threads(-1).is_err());
        assert!(ctx.set_max_threads(4).is_ok());
        assert_eq!(ctx.max_threads(), 4);
    }

    #[test]
    fn appends_ts_extension_when_missing() {
        let ctx = DownloadContext::new("in.m3u8", "out");
        assert_eq!(ctx.output_with_extension(), PathBuf::from("out.ts"));

        let ctx = DownloadContext::new("in.m3u8", "out.mp4");
        assert_eq!(ctx.output_with_extension(), PathBuf::from("out.mp4"));
    }
}
