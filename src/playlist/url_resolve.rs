//! URI resolution: absolute references are used as-is; relative ones are
//! joined against `baseUri` using URL semantics when the base is a URL, or
//! filesystem join semantics otherwise.

pub fn is_absolute(uri: &str) -> bool {
    uri.contains("://")
}

pub fn is_url(value: &str) -> bool {
    url::Url::parse(value).is_ok()
}

/// Base URI for a loaded playlist: the source with its final path segment
/// stripped when the source is a URL, or the parent directory of a local
/// path (possibly empty, when the path has no directory component).
pub fn base_uri_for(source: &str) -> String {
    if is_url(source) {
        match url::Url::parse(source) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.pop();
                }
                url.to_string()
            }
            Err(_) => source.to_string(),
        }
    } else {
        std::path::Path::new(source)
            .parent()
            .map(|parent| parent.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Resolve a URI reference found inside a playlist against its `baseUri`.
pub fn resolve(uri: &str, base_uri: &str) -> String {
    if is_absolute(uri) {
        return uri.to_string();
    }

    if base_uri.is_empty() {
        return uri.to_string();
    }

    if is_url(base_uri) {
        match url::Url::parse(base_uri).and_then(|base| base.join(uri)) {
            Ok(joined) => joined.to_string(),
            Err(_) => uri.to_string(),
        }
    } else {
        std::path::Path::new(base_uri)
            .join(uri)
            .to_string_lossy()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_uri_is_unchanged() {
        assert_eq!(
            resolve("https://host/seg.ts", "https://host/path/"),
            "https://host/seg.ts"
        );
    }

    #[test]
    fn relative_uri_joins_against_url_base() {
        assert_eq!(
            resolve("seg0.ts", "https://host/show"),
            "https://host/seg0.ts"
        );
        assert_eq!(
            resolve("v1.m3u8", "https://host/master"),
            "https://host/v1.m3u8"
        );
    }

    #[test]
    fn relative_uri_joins_against_filesystem_base() {
        assert_eq!(resolve("seg0.ts", "/tmp/streams"), "/tmp/streams/seg0.ts");
    }

    #[test]
    fn base_uri_strips_final_segment_from_url() {
        assert_eq!(
            base_uri_for("https://host/path/playlist.m3u8"),
            "https://host/path/"
        );
    }

    #[test]
    fn base_uri_is_parent_dir_for_local_path() {
        assert_eq!(base_uri_for("/tmp/streams/playlist.m3u8"), "/tmp/streams");
        assert_eq!(base_uri_for("playlist.m3u8"), "");
    }
}
