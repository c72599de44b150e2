//! Damage formula and damage type extraction.

use std::sync::LazyLock;

use regex::Regex;

use crate::effects::DamageType;

use super::aliases::damage_type_alias;

static LEADING_FORMULA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d*[dD]\d+(?:\s*[+-]\s*(?:\d*[dD]\d+|\d+))*|\d+)\b").expect("valid regex")
});

static EMBEDDED_FORMULA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d*[dD]\d+(?:\s*[+-]\s*\d+)?)\b").expect("valid regex")
});

/// Description patterns tried in order when the formula names no type.
static TYPE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "X damage"
        r"(?i)\b([a-z]+)\s+damage\b",
        // "deals X"
        r"(?i)\bdeals?\s+([a-z]+)",
        // word right after a formula
        r"(?i)\d+d\d+(?:\s*[+-]\s*\d+)?\)?\s+([a-z]+)",
        // word right after punctuation
        r"[.,;:!?)]\s*([A-Za-z]+)",
        // leading word
        r"^\s*([A-Za-z]+)",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid regex"))
    .collect()
});

fn compact(formula: &str) -> String {
    formula.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase()
}

/// The leading `NdM[+/-K]` token of a formula field, without any trailing
/// type word.
///
/// ```
/// use ability_effects::parser::extract_dice_formula;
///
/// assert_eq!(extract_dice_formula("5d8+13 Radiant").as_deref(), Some("5d8+13"));
/// assert_eq!(extract_dice_formula("2d6 + 4 slashing").as_deref(), Some("2d6+4"));
/// assert_eq!(extract_dice_formula("Radiant"), None);
/// ```
#[must_use]
pub fn extract_dice_formula(text: &str) -> Option<String> {
    LEADING_FORMULA
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| compact(m.as_str()))
}

/// The first dice formula appearing anywhere in free text.
#[must_use]
pub fn find_dice_formula(text: &str) -> Option<String> {
    EMBEDDED_FORMULA
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| compact(m.as_str()))
}

/// Damage type of an action.
///
/// The formula's trailing word wins; then the description patterns in
/// order; then bludgeoning.
#[must_use]
pub fn parse_damage_type(formula: Option<&str>, description: Option<&str>) -> DamageType {
    if let Some(found) = formula.and_then(trailing_type) {
        return found;
    }

    if let Some(description) = description {
        for pattern in TYPE_PATTERNS.iter() {
            let found = pattern
                .captures_iter(description)
                .filter_map(|caps| caps.get(1))
                .find_map(|word| damage_type_alias(word.as_str()));
            if let Some(found) = found {
                return found;
            }
        }
    }

    DamageType::Bludgeoning
}

fn trailing_type(formula: &str) -> Option<DamageType> {
    let rest = match LEADING_FORMULA.find(formula) {
        Some(m) => &formula[m.end()..],
        None => formula,
    };
    rest.split_whitespace().next().and_then(damage_type_alias)
}
