//! Effect node definitions.
//!
//! An `EffectNode` is one typed unit of mechanical consequence. The node
//! itself never holds its children: outcome edges live in the owning
//! `EffectTree`, so a node serialises to exactly one flat storage record.

use serde::{Deserialize, Serialize};

use crate::core::NodeId;

use super::context::OutcomeContext;

/// One effect node: a common header plus a typed payload.
///
/// Wire form (one record of the persisted flat array):
///
/// ```json
/// { "id": "aB3...", "type": "damage", "damageType": "fire", "formula": "2d6",
///   "parentNode": null, "parentContext": null }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectNode {
    /// Opaque id, stable across flatten/reconstruct.
    pub id: NodeId,

    /// Owning node, `None` for a root.
    #[serde(default)]
    pub parent_node: Option<NodeId>,

    /// Edge of the owner this node lives under, `None` for a root.
    #[serde(default)]
    pub parent_context: Option<OutcomeContext>,

    /// Variant payload, tagged by `type`.
    #[serde(flatten)]
    pub kind: EffectKind,
}

impl EffectNode {
    /// Create a root-level node.
    pub fn new(id: impl Into<NodeId>, kind: impl Into<EffectKind>) -> Self {
        Self {
            id: id.into(),
            parent_node: None,
            parent_context: None,
            kind: kind.into(),
        }
    }

    /// True when this node has no owner.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent_node.is_none()
    }

    /// Wire name of this node's type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

/// Closed set of effect kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EffectKind {
    /// A damage instance; may own `hit`/`miss`/`criticalHit` edges.
    Damage(Damage),
    /// Healing; always a leaf.
    Healing(Healing),
    /// Applies a status condition; always a leaf.
    Condition(ConditionEffect),
    /// A saving throw; may own `sharedRolls` and save outcome edges.
    SavingThrow(SavingThrow),
    /// How much of a damage roll applies on the branch it sits under.
    DamageOutcome(DamageOutcome),
    /// Free-form rules or flavor text.
    Text(TextNote),
}

impl EffectKind {
    /// Wire name of the kind.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Damage(_) => "damage",
            Self::Healing(_) => "healing",
            Self::Condition(_) => "condition",
            Self::SavingThrow(_) => "savingThrow",
            Self::DamageOutcome(_) => "damageOutcome",
            Self::Text(_) => "text",
        }
    }

    /// Whether a node of this kind may own children under `context`.
    #[must_use]
    pub const fn can_own(&self, context: OutcomeContext) -> bool {
        match self {
            Self::Damage(_) => context.is_attack_outcome(),
            Self::SavingThrow(_) => {
                matches!(context, OutcomeContext::SharedRolls) || context.is_save_outcome()
            }
            Self::Healing(_) | Self::Condition(_) | Self::DamageOutcome(_) | Self::Text(_) => false,
        }
    }

    /// Get the damage payload if this is a damage node.
    #[must_use]
    pub fn as_damage(&self) -> Option<&Damage> {
        match self {
            Self::Damage(damage) => Some(damage),
            _ => None,
        }
    }

    /// Get the saving throw payload if this is a save node.
    #[must_use]
    pub fn as_saving_throw(&self) -> Option<&SavingThrow> {
        match self {
            Self::SavingThrow(save) => Some(save),
            _ => None,
        }
    }

    /// Get the condition payload if this is a condition node.
    #[must_use]
    pub fn as_condition(&self) -> Option<&ConditionEffect> {
        match self {
            Self::Condition(condition) => Some(condition),
            _ => None,
        }
    }
}

/// Damage categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Acid,
    Bludgeoning,
    Cold,
    Fire,
    Force,
    Lightning,
    Necrotic,
    Piercing,
    Poison,
    Psychic,
    Radiant,
    Slashing,
    Thunder,
}

impl DamageType {
    /// Every damage type, in wire-name order.
    pub const ALL: [DamageType; 13] = [
        Self::Acid,
        Self::Bludgeoning,
        Self::Cold,
        Self::Fire,
        Self::Force,
        Self::Lightning,
        Self::Necrotic,
        Self::Piercing,
        Self::Poison,
        Self::Psychic,
        Self::Radiant,
        Self::Slashing,
        Self::Thunder,
    ];

    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Acid => "acid",
            Self::Bludgeoning => "bludgeoning",
            Self::Cold => "cold",
            Self::Fire => "fire",
            Self::Force => "force",
            Self::Lightning => "lightning",
            Self::Necrotic => "necrotic",
            Self::Piercing => "piercing",
            Self::Poison => "poison",
            Self::Psychic => "psychic",
            Self::Radiant => "radiant",
            Self::Slashing => "slashing",
            Self::Thunder => "thunder",
        }
    }

    /// Look up a canonical (lowercase) damage type name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abilities a saving throw can be made with.
///
/// Wisdom-based content maps onto `Will`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveAbility {
    Strength,
    Dexterity,
    Intelligence,
    Will,
}

impl SaveAbility {
    /// Wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Intelligence => "intelligence",
            Self::Will => "will",
        }
    }
}

impl std::fmt::Display for SaveAbility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Roll-derived annotation merged back into a node after activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollAnnotation {
    pub total: i64,
    pub is_critical: bool,
    pub is_miss: bool,
}

/// A damage instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Damage {
    pub damage_type: DamageType,
    pub formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_crit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_miss: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_result: Option<RollAnnotation>,
}

impl Damage {
    /// Create a damage payload with default crit/miss behaviour.
    pub fn new(damage_type: DamageType, formula: impl Into<String>) -> Self {
        Self {
            damage_type,
            formula: formula.into(),
            can_crit: None,
            can_miss: None,
            roll_result: None,
        }
    }

    /// Whether the primary die may explode (defaults to true).
    #[must_use]
    pub fn can_crit(&self) -> bool {
        self.can_crit.unwrap_or(true)
    }

    /// Whether a natural 1 on the primary die misses (defaults to true).
    #[must_use]
    pub fn can_miss(&self) -> bool {
        self.can_miss.unwrap_or(true)
    }
}

/// Healing kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HealingType {
    #[default]
    Healing,
    TemporaryHealing,
}

/// Healing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Healing {
    #[serde(default)]
    pub healing_type: HealingType,
    pub formula: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_result: Option<RollAnnotation>,
}

impl Healing {
    /// Create a plain healing payload.
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            healing_type: HealingType::Healing,
            formula: formula.into(),
            roll_result: None,
        }
    }
}

/// Escape clause attached to grappling-style conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escape {
    pub dc: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ability: Option<SaveAbility>,
}

/// Application of a status condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionEffect {
    /// Canonical condition id (`"stunned"`, `"prone"`, ...).
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape: Option<Escape>,
}

impl ConditionEffect {
    pub fn new(condition: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            escape: None,
        }
    }
}

/// A saving throw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingThrow {
    pub saving_throw_type: SaveAbility,
    #[serde(default, rename = "saveDC", skip_serializing_if = "Option::is_none")]
    pub save_dc: Option<u32>,
}

impl SavingThrow {
    pub fn new(saving_throw_type: SaveAbility, save_dc: Option<u32>) -> Self {
        Self {
            saving_throw_type,
            save_dc,
        }
    }
}

/// Portion of a damage roll that applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeAmount {
    FullDamage,
    HalfDamage,
}

/// Damage outcome marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageOutcome {
    pub outcome: OutcomeAmount,
}

impl DamageOutcome {
    pub const FULL: Self = Self { outcome: OutcomeAmount::FullDamage };
    pub const HALF: Self = Self { outcome: OutcomeAmount::HalfDamage };
}

/// Note categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoteType {
    #[default]
    General,
    Flavor,
    Reminder,
    Warning,
}

/// Free-form text with no mechanical effect.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNote {
    #[serde(default)]
    pub note_type: NoteType,
    pub text: String,
}

impl From<Damage> for EffectKind {
    fn from(v: Damage) -> Self {
        Self::Damage(v)
    }
}

impl From<Healing> for EffectKind {
    fn from(v: Healing) -> Self {
        Self::Healing(v)
    }
}

impl From<ConditionEffect> for EffectKind {
    fn from(v: ConditionEffect) -> Self {
        Self::Condition(v)
    }
}

impl From<SavingThrow> for EffectKind {
    fn from(v: SavingThrow) -> Self {
        Self::SavingThrow(v)
    }
}

impl From<DamageOutcome> for EffectKind {
    fn from(v: DamageOutcome) -> Self {
        Self::DamageOutcome(v)
    }
}

impl From<TextNote> for EffectKind {
    fn from(v: TextNote) -> Self {
        Self::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_damage_wire_form() {
        let node = EffectNode::new("d1", Damage::new(DamageType::Fire, "2d6"));
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "d1",
                "parentNode": null,
                "parentContext": null,
                "type": "damage",
                "damageType": "fire",
                "formula": "2d6"
            })
        );
    }

    #[test]
    fn test_child_record_parses() {
        let node: EffectNode = serde_json::from_value(json!({
            "id": "o1",
            "type": "damageOutcome",
            "outcome": "halfDamage",
            "parentNode": "s1",
            "parentContext": "passedSave"
        }))
        .unwrap();

        assert_eq!(node.parent_node, Some(NodeId::new("s1")));
        assert_eq!(node.parent_context, Some(OutcomeContext::PassedSave));
        assert_eq!(node.kind, EffectKind::DamageOutcome(DamageOutcome::HALF));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result: Result<EffectNode, _> = serde_json::from_value(json!({
            "id": "x",
            "type": "teleport"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_can_own() {
        let damage = EffectKind::from(Damage::new(DamageType::Cold, "1d6"));
        assert!(damage.can_own(OutcomeContext::Hit));
        assert!(!damage.can_own(OutcomeContext::FailedSave));
        assert!(!damage.can_own(OutcomeContext::SharedRolls));

        let save = EffectKind::from(SavingThrow::new(SaveAbility::Will, Some(12)));
        assert!(save.can_own(OutcomeContext::SharedRolls));
        assert!(save.can_own(OutcomeContext::FailedSaveBy(5)));
        assert!(!save.can_own(OutcomeContext::CriticalHit));

        let condition = EffectKind::from(ConditionEffect::new("prone"));
        assert!(!condition.can_own(OutcomeContext::Hit));
    }

    #[test]
    fn test_damage_flag_defaults() {
        let mut damage = Damage::new(DamageType::Piercing, "1d8");
        assert!(damage.can_crit());
        assert!(damage.can_miss());
        damage.can_crit = Some(false);
        assert!(!damage.can_crit());
    }

    #[test]
    fn test_damage_type_lookup() {
        assert_eq!(DamageType::from_name("radiant"), Some(DamageType::Radiant));
        assert_eq!(DamageType::from_name("Radiant"), None);
        assert_eq!(DamageType::Thunder.to_string(), "thunder");
    }
}
