//! Condition extraction.
//!
//! Three pattern families are unioned: `[[Condition]]` brackets,
//! `On hit: Condition` prefixes and `target is/becomes Condition`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::effects::{Escape, OutcomeContext};

use super::aliases::{condition_alias, condition_id, save_ability_alias};

static BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("valid regex"));

static ON_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)\bon\s+(?P<when>hit|crit(?:ical(?:\s+hit)?)?|(?:a\s+)?failed\s+save|save)\s*:\s*(?P<name>[a-z][a-z ]*?)\s*(?:\(|[.,;]|$)",
    )
    .expect("valid regex")
});

static TARGET_IS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\btarget\s+(?:is|becomes)\s+(?:also\s+)?(?P<name>knocked\s+prone|[a-z]+)")
        .expect("valid regex")
});

static ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*\(\s*escape\s+DC\s*(?P<dc>\d+)(?:\s+(?P<stat>STR|DEX|INT|WIL|WIS|strength|dexterity|intelligence|will|wisdom))?\s*\)",
    )
    .expect("valid regex")
});

/// A condition found in free text, with the edge it applies on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedCondition {
    pub condition: String,
    pub context: OutcomeContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape: Option<Escape>,
}

/// Find every condition an action applies, de-duplicated by
/// `(condition, context)` and ordered by position in the text.
///
/// ```
/// use ability_effects::effects::OutcomeContext;
/// use ability_effects::parser::parse_conditions;
///
/// let found = parse_conditions("On crit: [[Stunned]]");
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].condition, "stunned");
/// assert_eq!(found[0].context, OutcomeContext::CriticalHit);
/// ```
#[must_use]
pub fn parse_conditions(description: &str) -> Vec<ParsedCondition> {
    let mut found: Vec<(usize, ParsedCondition)> = Vec::new();

    for caps in BRACKET.captures_iter(description) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let condition = condition_id(name.as_str());
        if condition.is_empty() {
            continue;
        }
        found.push((
            whole.start(),
            ParsedCondition {
                condition,
                context: infer_context(&description[..whole.start()]),
                escape: escape_after(&description[whole.end()..]),
            },
        ));
    }

    for caps in ON_PREFIX.captures_iter(description) {
        let (Some(whole), Some(when), Some(name)) = (caps.get(0), caps.name("when"), caps.name("name"))
        else {
            continue;
        };
        let Some(condition) = condition_alias(name.as_str()) else {
            continue;
        };
        let when = when.as_str().to_ascii_lowercase();
        let context = if when == "hit" {
            OutcomeContext::Hit
        } else if when.starts_with("crit") {
            OutcomeContext::CriticalHit
        } else {
            OutcomeContext::FailedSave
        };
        found.push((
            whole.start(),
            ParsedCondition {
                condition: condition.to_string(),
                context,
                escape: escape_after(&description[name.end()..]),
            },
        ));
    }

    for caps in TARGET_IS.captures_iter(description) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.name("name")) else {
            continue;
        };
        let Some(condition) = condition_alias(name.as_str()) else {
            continue;
        };
        found.push((
            whole.start(),
            ParsedCondition {
                condition: condition.to_string(),
                context: infer_context(&description[..whole.start()]),
                escape: escape_after(&description[whole.end()..]),
            },
        ));
    }

    found.sort_by_key(|(position, _)| *position);

    let mut unique: Vec<ParsedCondition> = Vec::with_capacity(found.len());
    for (_, parsed) in found {
        let seen = unique
            .iter()
            .any(|u| u.condition == parsed.condition && u.context == parsed.context);
        if !seen {
            unique.push(parsed);
        }
    }
    unique
}

/// Outcome edge implied by the clause leading up to a condition.
fn infer_context(preceding: &str) -> OutcomeContext {
    let clause = preceding
        .rfind(['.', ';', '\n'])
        .map_or(preceding, |cut| &preceding[cut + 1..])
        .to_lowercase();

    if clause.contains("crit") {
        OutcomeContext::CriticalHit
    } else if clause.contains("failed save") || clause.contains("fails") || clause.contains("save or") {
        OutcomeContext::FailedSave
    } else {
        OutcomeContext::Hit
    }
}

fn escape_after(rest: &str) -> Option<Escape> {
    let caps = ESCAPE.captures(rest)?;
    let dc = caps.name("dc")?.as_str().parse().ok()?;
    let ability = caps.name("stat").and_then(|stat| save_ability_alias(stat.as_str()));
    Some(Escape { dc, ability })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::SaveAbility;

    fn one(text: &str) -> ParsedCondition {
        let mut found = parse_conditions(text);
        assert_eq!(found.len(), 1, "{text}: {found:?}");
        found.remove(0)
    }

    #[test]
    fn test_bracket_on_crit() {
        let parsed = one("On crit: [[Stunned]]");
        assert_eq!(parsed.condition, "stunned");
        assert_eq!(parsed.context, OutcomeContext::CriticalHit);
    }

    #[test]
    fn test_bracket_contexts() {
        assert_eq!(one("Hit: 2d6 piercing and [[Poisoned]]").context, OutcomeContext::Hit);
        assert_eq!(
            one("DC 13 STR save or [[Prone]]").context,
            OutcomeContext::FailedSave
        );
        assert_eq!(
            one("If the target fails, it is [[Restrained]]").context,
            OutcomeContext::FailedSave
        );
        assert_eq!(
            one("On a critical hit the target is [[Blinded]]").context,
            OutcomeContext::CriticalHit
        );
    }

    #[test]
    fn test_bracket_context_is_clause_local() {
        let found = parse_conditions("On crit: [[Stunned]]. Also [[Dazed]]");
        assert_eq!(found[0].context, OutcomeContext::CriticalHit);
        assert_eq!(found[1].context, OutcomeContext::Hit);
    }

    #[test]
    fn test_unknown_bracket_kept() {
        assert_eq!(one("[[Marked]]").condition, "marked");
    }

    #[test]
    fn test_prefix_forms() {
        let parsed = one("On hit: Grappled (escape DC 14 STR).");
        assert_eq!(parsed.condition, "grappled");
        assert_eq!(parsed.context, OutcomeContext::Hit);
        assert_eq!(parsed.escape, Some(Escape { dc: 14, ability: Some(SaveAbility::Strength) }));

        assert_eq!(one("On save: Frightened").context, OutcomeContext::FailedSave);
        assert_eq!(one("On critical hit: knocked prone").condition, "prone");
    }

    #[test]
    fn test_target_is() {
        let parsed = one("On a failed save, the target becomes paralysed for 1 minute.");
        assert_eq!(parsed.condition, "paralyzed");
        assert_eq!(parsed.context, OutcomeContext::FailedSave);

        assert!(parse_conditions("The target is within 5 feet").is_empty());
    }

    #[test]
    fn test_bracket_escape() {
        let parsed = one("[[Grappled]] (escape DC 12)");
        assert_eq!(parsed.escape, Some(Escape { dc: 12, ability: None }));
    }

    #[test]
    fn test_dedup_by_condition_and_context() {
        let found = parse_conditions("On hit: Prone. The target is knocked prone. On crit: [[Prone]]");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].context, OutcomeContext::Hit);
        assert_eq!(found[1].context, OutcomeContext::CriticalHit);
    }
}
