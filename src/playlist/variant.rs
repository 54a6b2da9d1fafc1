//! Variant Index: extracts `{name, bandwidth, resolution, uri}` entries from
//! `#EXT-X-STREAM-INF` and `#EXT-X-MEDIA` tags in a master playlist.

use super::classifier::parse_attributes;
use super::url_resolve::resolve;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: Option<String>,
    pub bandwidth: Option<String>,
    pub resolution: Option<String>,
    pub uri: String,
}

pub fn extract_variants(lines: &[String], base_uri: &str) -> Vec<Variant> {
    let mut variants = Vec::new();

    let mut index = 0;
    while index < lines.len() {
        let line = &lines[index];

        if let Some(rest) = line.strip_prefix("#EXT-X-STREAM-INF:") {
            let attrs = parse_attributes(rest);
            if let Some(uri_line) = lines.get(index + 1) {
                if !uri_line.starts_with('#') {
                    variants.push(Variant {
                        name: attrs.get("NAME").cloned(),
                        bandwidth: attrs.get("BANDWIDTH").cloned(),
                        resolution: attrs.get("RESOLUTION").cloned(),
                        uri: resolve(uri_line, base_uri),
                    });
                    index += 2;
                    continue;
                }
            }
        } else if let Some(rest) = line.strip_prefix("#EXT-X-MEDIA:") {
            let attrs = parse_attributes(rest);
            let is_video = attrs.get("TYPE").map(String::as_str) == Some("VIDEO");
            if is_video {
                if let (Some(name), Some(uri)) = (attrs.get("NAME"), attrs.get("URI")) {
                    variants.push(Variant {
                        name: Some(name.clone()),
                        bandwidth: attrs.get("BANDWIDTH").cloned(),
                        resolution: attrs.get("RESOLUTION").cloned(),
                        uri: resolve(uri, base_uri),
                    });
                }
            }
        }

        index += 1;
    }

    dedupe_by_uri(variants)
}

/// Duplicates by `uri` keep the first occurrence.
fn dedupe_by_uri(variants: Vec<Variant>) -> Vec<Variant> {
    let mut seen = std::collections::HashSet::new();
    variants
        .into_iter()
        .filter(|variant| seen.insert(variant.uri.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn extracts_stream_inf_variants() {
        let doc = lines(
            "#EXTM3U\n\
             #EXT-X-STREAM-INF:BANDWIDTH=2149280,RESOLUTION=1280x720,NAME=\"720\"\n\
             v720.m3u8\n\
             #EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=854x480,NAME=\"480\"\n\
             v480.m3u8",
        );
        let variants = extract_variants(&doc, "https://host/show/");
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].name.as_deref(), Some("720"));
        assert_eq!(variants[0].bandwidth.as_deref(), Some("2149280"));
        assert_eq!(variants[0].uri, "https://host/show/v720.m3u8");
    }

    #[test]
    fn merges_media_tag_variants_and_dedupes_by_uri() {
        let doc = lines(
            "#EXTM3U\n\
             #EXT-X-STREAM-INF:BANDWIDTH=2149280\n\
             v720.m3u8\n\
             #EXT-X-MEDIA:TYPE=VIDEO,NAME=\"720 alt\",URI=\"v720.m3u8\"\n\
             #EXT-X-MEDIA:TYPE=AUDIO,NAME=\"audio\",URI=\"audio.m3u8\"",
        );
        let variants = extract_variants(&doc, "https://host/show/");
        // the audio-typed EXT-X-MEDIA entry is ignored; the duplicate-uri
        // video entry keeps the first occurrence (from STREAM-INF).
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].uri, "https://host/show/v720.m3u8");
        assert_eq!(variants[0].bandwidth.as_deref(), Some("2149280"));
    }
}
