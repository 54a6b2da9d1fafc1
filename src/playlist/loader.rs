//! Playlist Loader: retrieves an M3U8 document from a URL or local path and
//! returns its non-empty, trimmed lines plus a base URI for resolving
//! relative references.

use crate::errors::{FetchError, FetchResult};
use crate::transport::{Fetcher, TransportError};
use tracing::debug;

use super::url_resolve::base_uri_for;

pub struct LoadedPlaylist {
    pub lines: Vec<String>,
    pub base_uri: String,
}

fn is_http_url(location: &str) -> bool {
    matches!(
        url::Url::parse(location).map(|u| u.scheme().to_string()),
        Ok(scheme) if scheme == "http" || scheme == "https"
    )
}

pub async fn load(fetcher: &dyn Fetcher, location: &str) -> FetchResult<LoadedPlaylist> {
    let text = if is_http_url(location) {
        let response = fetcher.get(location).await.map_err(|error| match error {
            TransportError::Offline(detail) => FetchError::NoNetwork {
                url: format!("{location}: {detail}"),
            },
            TransportError::Other(detail) => FetchError::input_unreachable(detail),
        })?;
        if !response.is_success() {
            return Err(FetchError::input_unreachable(format!(
                "HTTP {} for {location}",
                response.status
            )));
        }
        String::from_utf8(response.body.to_vec())
            .map_err(|error| FetchError::input_unreachable(error.to_string()))?
    } else {
        tokio::fs::read_to_string(location)
            .await
            .map_err(|error| FetchError::input_unreachable(error.to_string()))?
    };

    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    let base_uri = base_uri_for(location);
    debug!(location, base_uri, lines = lines.len(), "loaded playlist");

    Ok(LoadedPlaylist { lines, base_uri })
}
