//! Variant Selector: picks exactly one variant from a master playlist's
//! index, or reports ambiguity/absence.

use tracing::warn;

use crate::errors::{FetchError, FetchResult, VariantSummary};

use super::variant::Variant;

#[derive(Debug, Clone, Default)]
pub struct SelectionKeys {
    pub name: Option<String>,
    pub bandwidth: Option<String>,
    pub resolution: Option<String>,
}

impl SelectionKeys {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bandwidth.is_none() && self.resolution.is_none()
    }

    fn matches(&self, variant: &Variant) -> bool {
        if let Some(name) = &self.name {
            if variant.name.as_deref() != Some(name.as_str()) {
                return false;
            }
        }
        if let Some(bandwidth) = &self.bandwidth {
            if variant.bandwidth.as_deref() != Some(bandwidth.as_str()) {
                return false;
            }
        }
        if let Some(resolution) = &self.resolution {
            if variant.resolution.as_deref() != Some(resolution.as_str()) {
                return false;
            }
        }
        true
    }
}

pub fn select<'a>(
    variants: &'a [Variant],
    keys: &SelectionKeys,
) -> FetchResult<&'a Variant> {
    if variants.len() == 1 {
        return Ok(&variants[0]);
    }

    let matched: Vec<&Variant> = variants.iter().filter(|v| keys.matches(v)).collect();

    match matched.len() {
        0 => Err(FetchError::VariantNotFound),
        1 => Ok(matched[0]),
        _ if keys.is_empty() => {
            let candidates: Vec<VariantSummary> = variants
                .iter()
                .map(|v| VariantSummary {
                    name: v.name.clone().unwrap_or_default(),
                    bandwidth: v.bandwidth.clone().unwrap_or_default(),
                    resolution: v.resolution.clone().unwrap_or_default(),
                })
                .collect();
            warn!(count = candidates.len(), ?candidates, "variant selection is ambiguous");
            Err(FetchError::VariantAmbiguous { candidates })
        }
        _ => {
            // Caller supplied keys but they still matched more than one
            // variant; narrow further would require spec support for
            // selection by position, which is explicitly unsupported.
            let candidates: Vec<VariantSummary> = matched
                .iter()
                .map(|v| VariantSummary {
                    name: v.name.clone().unwrap_or_default(),
                    bandwidth: v.bandwidth.clone().unwrap_or_default(),
                    resolution: v.resolution.clone().unwrap_or_default(),
                })
                .collect();
            warn!(count = candidates.len(), ?candidates, "variant selection is ambiguous");
            Err(FetchError::VariantAmbiguous { candidates })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(name: &str, bandwidth: &str, resolution: &str, uri: &str) -> Variant {
        Variant {
            name: Some(name.to_string()),
            bandwidth: Some(bandwidth.to_string()),
            resolution: Some(resolution.to_string()),
            uri: uri.to_string(),
        }
    }

    #[test]
    fn single_variant_auto_selects_regardless_of_keys() {
        let variants = vec![variant("720", "2149280", "1280x720", "v1.m3u8")];
        let selected = select(&variants, &SelectionKeys::default()).unwrap();
        assert_eq!(selected.uri, "v1.m3u8");
    }

    #[test]
    fn ambiguous_without_keys_lists_all_variants() {
        let variants = vec![
            variant("720", "2149280", "1280x720", "v720.m3u8"),
            variant("480", "800000", "854x480", "v480.m3u8"),
        ];
        let error = select(&variants, &SelectionKeys::default()).unwrap_err();
        match error {
            FetchError::VariantAmbiguous { candidates } => assert_eq!(candidates.len(), 2),
            other => panic!("expected VariantAmbiguous, got {other:?}"),
        }
    }

    #[test]
    fn selection_by_name_is_deterministic() {
        let variants = vec![
            variant("720", "2149280", "1280x720", "v720.m3u8"),
            variant("480", "800000", "854x480", "v480.m3u8"),
        ];
        let keys = SelectionKeys {
            name: Some("720".to_string()),
            ..Default::default()
        };
        for _ in 0..3 {
            let selected = select(&variants, &keys).unwrap();
            assert_eq!(selected.uri, "v720.m3u8");
        }
    }

    #[test]
    fn no_match_is_variant_not_found() {
        let variants = vec![variant("720", "2149280", "1280x720", "v720.m3u8")];
        let keys = SelectionKeys {
            name: Some("1080".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            select(&variants, &keys),
            Err(FetchError::VariantNotFound)
        ));
    }
}
