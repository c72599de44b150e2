//! Saving throw extraction.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::effects::SaveAbility;

use super::aliases::save_ability_alias;

const STAT: &str = r"\b(?P<stat>STR|DEX|INT|WIL|WIS|strength|dexterity|intelligence|will|wisdom)\b";
const DC: &str = r"\bDC\s*(?P<dc>\d+)";

/// Save patterns, most specific first. The first match wins.
static SAVE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?i){DC}\s+{STAT}\s+saving\s+throw"),
        format!(r"(?i){DC}\s+{STAT}\s+save\b"),
        format!(r"(?i){STAT}\s+{DC}\s+saving\s+throw"),
        format!(r"(?i){STAT}\s+{DC}\s+save\b"),
        format!(r"(?i){STAT}\s+saving\s+throw\s*[(,:]?\s*{DC}\)?"),
        format!(r"(?i){STAT}\s+save\s*[(,:]?\s*{DC}\)?"),
        format!(r"(?i){DC}\s+{STAT}"),
        format!(r"(?i){STAT}\s+{DC}"),
        format!(r"(?i){STAT}\s*\(\s*{DC}\s*\)"),
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static HALF_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bhalf\s+damage\b",
        r"(?i)\bhalf\s+as\s+much\b",
        r"(?i)\bsaves?\s+for\s+half\b|\bhalf\s+on\s+(?:a\s+)?(?:successful\s+)?(?:save|success)\b",
        r"(?i)\bhalved\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

static OR_CONSEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[\s,]*(?:saving\s+throw)?[\s,]*or\s+(?:be\s+)?([^.;]+)").expect("valid regex")
});

static FAILURE_CONSEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bon\s+a\s+fail(?:ed\s+save|ure)\s*[,:]?\s*([^.;]+)").expect("valid regex")
});

/// A saving throw found in free text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSave {
    pub dc: u32,
    pub save_type: SaveAbility,
    pub half_on_save: bool,
    /// What happens on a failure, when the save does not halve damage.
    pub consequence: Option<String>,
}

/// Find a saving throw in an action description.
///
/// ```
/// use ability_effects::effects::SaveAbility;
/// use ability_effects::parser::parse_saving_throw;
///
/// let save = parse_saving_throw("DC 21 DEX save for half damage").unwrap();
/// assert_eq!((save.dc, save.save_type, save.half_on_save), (21, SaveAbility::Dexterity, true));
/// ```
#[must_use]
pub fn parse_saving_throw(description: &str) -> Option<ParsedSave> {
    let (caps, end) = SAVE_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(description)?;
        let end = caps.get(0)?.end();
        Some((caps, end))
    })?;

    let dc = caps.name("dc")?.as_str().parse().ok()?;
    let save_type = save_ability_alias(caps.name("stat")?.as_str())?;
    let half_on_save = HALF_PATTERNS.iter().any(|pattern| pattern.is_match(description));

    let consequence = if half_on_save {
        None
    } else {
        OR_CONSEQUENCE
            .captures(&description[end..])
            .or_else(|| FAILURE_CONSEQUENCE.captures(description))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|text| !text.is_empty())
    };

    Some(ParsedSave {
        dc,
        save_type,
        half_on_save,
        consequence,
    })
}
