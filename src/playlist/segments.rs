//! Segment Planner: walks a media playlist and produces an ordered,
//! zero-indexed list of absolute segment URIs.

use super::url_resolve::resolve;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSegment {
    pub index: usize,
    pub uri: String,
}

#[derive(Debug, Clone)]
pub struct SegmentPlan {
    segments: Vec<PlannedSegment>,
}

impl SegmentPlan {
    pub fn segments(&self) -> &[PlannedSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

pub fn plan(lines: &[String], base_uri: &str) -> SegmentPlan {
    let mut segments = Vec::new();
    let mut index = 0;

    for (pos, line) in lines.iter().enumerate() {
        if line.starts_with("#EXT-X-ENDLIST") {
            break;
        }
        if !line.starts_with("#EXTINF") {
            continue;
        }
        if let Some(uri_line) = lines.get(pos + 1) {
            if !uri_line.starts_with('#') {
                segments.push(PlannedSegment {
                    index,
                    uri: resolve(uri_line, base_uri),
                });
                index += 1;
            }
        }
    }

    SegmentPlan { segments }
}
