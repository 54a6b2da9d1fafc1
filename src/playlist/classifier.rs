//! Classifier & attribute parser.
//!
//! A document is MASTER iff any line starts with `#EXT-X-STREAM-INF`. It is
//! MEDIA iff it contains any `#EXTINF` line and no `#EXT-X-STREAM-INF` line.
//! Anything else is UNKNOWN.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistKind {
    Media,
    Master,
    Unknown,
}

pub struct Classification {
    pub kind: PlaylistKind,
    /// True when the first non-blank line is not `#EXTM3U`; permitted, but
    /// worth a debug-log record when the caller has debug logging enabled.
    pub missing_header: bool,
    /// True when an `#EXT-X-KEY` tag is present with a method other than
    /// `NONE`; the caller surfaces `ENCRYPTED_UNSUPPORTED` for this.
    pub encrypted: bool,
}

pub fn classify(lines: &[String]) -> Classification {
    let has_stream_inf = lines.iter().any(|l| l.starts_with("#EXT-X-STREAM-INF"));
    let has_extinf = lines.iter().any(|l| l.starts_with("#EXTINF"));

    let kind = if has_stream_inf {
        PlaylistKind::Master
    } else if has_extinf {
        PlaylistKind::Media
    } else {
        PlaylistKind::Unknown
    };

    let missing_header = lines
        .first()
        .map(|first| first != "#EXTM3U")
        .unwrap_or(true);

    let encrypted = lines.iter().any(|l| is_unsupported_key_tag(l));

    Classification {
        kind,
        missing_header,
        encrypted,
    }
}

fn is_unsupported_key_tag(line: &str) -> bool {
    let Some(rest) = line.strip_prefix("#EXT-X-KEY:") else {
        return false;
    };
    let attrs = parse_attributes(rest);
    !matches!(attrs.get("METHOD").map(String::as_str), Some("NONE"))
}

/// Parses a comma-separated `KEY=value` / `KEY="quoted value"` attribute
/// list, as found after `#EXT-X-STREAM-INF:` or `#EXT-X-MEDIA:`. Quoted
/// values may themselves contain commas; unquoted values may not.
pub fn parse_attributes(attrs_part: &str) -> HashMap<String, String> {
    let mut attributes = HashMap::new();
    let mut chars = attrs_part.chars().peekable();

    loop {
        // skip separators
        while matches!(chars.peek(), Some(c) if c.is_whitespace() || *c == ',') {
            chars.next();
        }
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(&c) = chars.peek() {
            if c == '=' {
                break;
            }
            key.push(c);
            chars.next();
        }
        if chars.next() != Some('=') {
            // malformed attribute, bail on the remainder
            break;
        }

        let mut value = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                value.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c == ',' {
                    break;
                }
                value.push(c);
                chars.next();
            }
        }

        let key = key.trim().to_string();
        if !key.is_empty() {
            attributes.insert(key, value.trim().to_string());
        }
    }

    attributes
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
    fn classifies_media_playlist() {
        let doc = lines(
            "#EXTM3U\n#EXTINF:10.0,\ns0.ts\n#EXTINF:10.0,\ns1.ts\n#EXT-X-ENDLIST",
        );
        let classification = classify(&doc);
        assert_eq!(classification.kind, PlaylistKind::Media);
        assert!(!classification.missing_header);
        assert!(!classification.encrypted);
    }

    #[test]
    fn classifies_master_playlist_even_with_extinf_absent() {
        let doc = lines(
            "#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1000\nv1.m3u8",
        );
        assert_eq!(classify(&doc).kind, PlaylistKind::Master);
    }

    #[test]
    fn classifies_unknown_document() {
        let doc = lines("#EXTM3U\n#EXT-X-VERSION:3");
        assert_eq!(classify(&doc).kind, PlaylistKind::Unknown);
    }

    #[test]
    fn classification_is_idempotent() {
        let doc = lines("#EXTM3U\n#EXTINF:10.0,\ns0.ts");
        assert_eq!(classify(&doc).kind, classify(&doc).kind);
    }

    #[test]
    fn missing_header_is_flagged_but_not_fatal() {
        let doc = lines("#EXTINF:10.0,\ns0.ts");
        assert!(classify(&doc).missing_header);
    }

    #[test]
    fn encrypted_key_tag_is_detected() {
        let doc = lines(
            "#EXTM3U\n#EXT-X-KEY:METHOD=AES-128,URI=\"key.bin\"\n#EXTINF:10.0,\ns0.ts",
        );
        assert!(classify(&doc).encrypted);
    }

    #[test]
    fn explicit_method_none_is_not_encrypted() {
        let doc = lines("#EXTM3U\n#EXT-X-KEY:METHOD=NONE\n#EXTINF:10.0,\ns0.ts");
        assert!(!classify(&doc).encrypted);
    }

    #[test]
    fn parses_quoted_and_unquoted_attributes() {
        let attrs = parse_attributes(
            r#"BANDWIDTH=1280000,RESOLUTION=1280x720,NAME="720p feed""#,
        );
        assert_eq!(attrs.get("BANDWIDTH").map(String::as_str), Some("1280000"));
        assert_eq!(
            attrs.get("RESOLUTION").map(String::as_str),
            Some("1280x720")
        );
        assert_eq!(attrs.get("NAME").map(String::as_str), Some("720p feed"));
    }
}
