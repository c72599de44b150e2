//! Alias tables for imported text.
//!
//! Third-party content spells things many ways; these tables fold the
//! spellings into canonical damage types, conditions and save abilities.

use crate::effects::{DamageType, SaveAbility};

const DAMAGE_ALIASES: &[(&str, DamageType)] = &[
    ("holy", DamageType::Radiant),
    ("divine", DamageType::Radiant),
    ("light", DamageType::Radiant),
    ("radiance", DamageType::Radiant),
    ("electric", DamageType::Lightning),
    ("electrical", DamageType::Lightning),
    ("electricity", DamageType::Lightning),
    ("shock", DamageType::Lightning),
    ("frost", DamageType::Cold),
    ("ice", DamageType::Cold),
    ("flame", DamageType::Fire),
    ("flames", DamageType::Fire),
    ("burning", DamageType::Fire),
    ("toxic", DamageType::Poison),
    ("venom", DamageType::Poison),
    ("acidic", DamageType::Acid),
    ("sonic", DamageType::Thunder),
    ("mental", DamageType::Psychic),
    ("psionic", DamageType::Psychic),
    ("shadow", DamageType::Necrotic),
    ("death", DamageType::Necrotic),
    ("arcane", DamageType::Force),
    ("blunt", DamageType::Bludgeoning),
    ("pierce", DamageType::Piercing),
    ("slash", DamageType::Slashing),
];

/// Canonical condition ids.
pub const CONDITIONS: &[&str] = &[
    "blinded",
    "bleeding",
    "burning",
    "charmed",
    "dazed",
    "deafened",
    "frightened",
    "grappled",
    "incapacitated",
    "invisible",
    "paralyzed",
    "petrified",
    "poisoned",
    "prone",
    "restrained",
    "slowed",
    "stunned",
    "unconscious",
    "weakened",
];

const CONDITION_ALIASES: &[(&str, &str)] = &[
    ("blind", "blinded"),
    ("bleed", "bleeding"),
    ("burn", "burning"),
    ("ignited", "burning"),
    ("charm", "charmed"),
    ("daze", "dazed"),
    ("deaf", "deafened"),
    ("afraid", "frightened"),
    ("fear", "frightened"),
    ("feared", "frightened"),
    ("frighten", "frightened"),
    ("grabbed", "grappled"),
    ("grapple", "grappled"),
    ("paralysed", "paralyzed"),
    ("paralyze", "paralyzed"),
    ("petrify", "petrified"),
    ("poison", "poisoned"),
    ("knocked prone", "prone"),
    ("restrain", "restrained"),
    ("slow", "slowed"),
    ("stun", "stunned"),
    ("asleep", "unconscious"),
    ("sleeping", "unconscious"),
    ("weak", "weakened"),
    ("weaken", "weakened"),
];

fn normalize(word: &str) -> String {
    word.trim()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical damage type for one word, if it names one.
#[must_use]
pub fn damage_type_alias(word: &str) -> Option<DamageType> {
    let word = normalize(word);
    DamageType::from_name(&word).or_else(|| {
        DAMAGE_ALIASES
            .iter()
            .find(|(alias, _)| *alias == word)
            .map(|(_, damage_type)| *damage_type)
    })
}

/// Canonical condition id for a known condition name.
#[must_use]
pub fn condition_alias(name: &str) -> Option<&'static str> {
    let name = normalize(name);
    CONDITIONS.iter().copied().find(|c| *c == name).or_else(|| {
        CONDITION_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, canonical)| *canonical)
    })
}

/// Canonical condition id, falling back to the normalised name itself.
#[must_use]
pub fn condition_id(name: &str) -> String {
    condition_alias(name).map_or_else(|| normalize(name), str::to_string)
}

/// Save ability for a stat name or abbreviation. WIS folds into will.
#[must_use]
pub fn save_ability_alias(stat: &str) -> Option<SaveAbility> {
    match normalize(stat).as_str() {
        "str" | "strength" => Some(SaveAbility::Strength),
        "dex" | "dexterity" => Some(SaveAbility::Dexterity),
        "int" | "intelligence" => Some(SaveAbility::Intelligence),
        "wil" | "will" | "wis" | "wisdom" => Some(SaveAbility::Will),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_aliases() {
        assert_eq!(damage_type_alias("holy"), Some(DamageType::Radiant));
        assert_eq!(damage_type_alias("Electric"), Some(DamageType::Lightning));
        assert_eq!(damage_type_alias("fire,"), Some(DamageType::Fire));
        assert_eq!(damage_type_alias("teeth"), None);
    }

    #[test]
    fn test_condition_aliases() {
        assert_eq!(condition_alias("Stunned"), Some("stunned"));
        assert_eq!(condition_alias("knocked  prone"), Some("prone"));
        assert_eq!(condition_alias("paralysed"), Some("paralyzed"));
        assert_eq!(condition_alias("within"), None);
        assert_eq!(condition_id("Marked by Hunter"), "marked by hunter");
    }

    #[test]
    fn test_wisdom_is_will() {
        assert_eq!(save_ability_alias("WIS"), Some(SaveAbility::Will));
        assert_eq!(save_ability_alias("wil"), Some(SaveAbility::Will));
        assert_eq!(save_ability_alias("DEX"), Some(SaveAbility::Dexterity));
        assert_eq!(save_ability_alias("CON"), None);
    }
}
