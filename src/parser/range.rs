//! Range, reach and area extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RangeKind {
    Range,
    Reach,
    Cone,
    Line,
    Burst,
}

/// How far an action reaches, in feet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeReach {
    pub kind: RangeKind,
    pub distance: u32,
    /// Width of a line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

static RANGE_PATTERNS: LazyLock<Vec<(RangeKind, Regex)>> = LazyLock::new(|| {
    [
        (RangeKind::Range, r"(?i)\brange\s*:?\s*(\d+)"),
        (RangeKind::Reach, r"(?i)\breach\s*:?\s*(\d+)"),
        (RangeKind::Cone, r"(?i)\bcone\s*:?\s*(\d+)"),
        (RangeKind::Line, r"(?i)\bline\s*:?\s*(\d+)\s*[x×]\s*(\d+)"),
        (RangeKind::Burst, r"(?i)\bburst\s*:?\s*(\d+)"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Range or reach of an action. A value already on the subject wins over
/// anything in the text.
#[must_use]
pub fn parse_range_reach(description: &str, existing: Option<RangeReach>) -> Option<RangeReach> {
    if existing.is_some() {
        return existing;
    }

    RANGE_PATTERNS.iter().find_map(|(kind, pattern)| {
        let caps = pattern.captures(description)?;
        let distance = caps.get(1)?.as_str().parse().ok()?;
        let width = caps.get(2).and_then(|w| w.as_str().parse().ok());
        Some(RangeReach {
            kind: *kind,
            distance,
            width,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> RangeReach {
        parse_range_reach(text, None).unwrap_or_else(|| panic!("no range in {text:?}"))
    }

    #[test]
    fn test_patterns() {
        assert_eq!(parsed("Range:60 one creature"), RangeReach { kind: RangeKind::Range, distance: 60, width: None });
        assert_eq!(parsed("Melee, Reach 10").kind, RangeKind::Reach);
        assert_eq!(parsed("Cone 15, DC 13 DEX save").distance, 15);
        assert_eq!(
            parsed("Line 30x5 of lightning"),
            RangeReach { kind: RangeKind::Line, distance: 30, width: Some(5) }
        );
        assert_eq!(parsed("Burst 20 centered on self").kind, RangeKind::Burst);
    }

    #[test]
    fn test_existing_wins() {
        let existing = RangeReach { kind: RangeKind::Reach, distance: 5, width: None };
        assert_eq!(parse_range_reach("Range: 120", Some(existing)), Some(existing));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse_range_reach("Bite. 2d6 piercing", None), None);
        assert_eq!(parse_range_reach("Line of sight", None), None);
    }
}
