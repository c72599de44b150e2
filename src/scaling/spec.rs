//! Scaling specifications supplied by content.

use serde::{Deserialize, Serialize};

use crate::core::NodeId;

/// How an ability scales when extra mana is spent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalingMode {
    #[default]
    None,
    /// One fixed delta list.
    Upcast,
    /// Several named delta lists; the caster picks one.
    UpcastChoice,
}

/// Declarative scaling operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeltaOperation {
    AddFlatDamage,
    AddDice,
    #[serde(rename = "addDC")]
    AddDc,
    AddAreaSize,
    AddDuration,
    AddRange,
    AddReach,
    AddTargets,
    AddCondition,
    /// Accepted and ignored.
    AddArmor,
}

impl DeltaOperation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AddFlatDamage => "addFlatDamage",
            Self::AddDice => "addDice",
            Self::AddDc => "addDC",
            Self::AddAreaSize => "addAreaSize",
            Self::AddDuration => "addDuration",
            Self::AddRange => "addRange",
            Self::AddReach => "addReach",
            Self::AddTargets => "addTargets",
            Self::AddCondition => "addCondition",
            Self::AddArmor => "addArmor",
        }
    }
}

impl std::fmt::Display for DeltaOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dice added per step by `addDice`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceDelta {
    pub count: u32,
    pub faces: u32,
}

/// One scaling operation, applied once per upcast step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub operation: DeltaOperation,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dice: Option<DiceDelta>,

    /// Condition id for `addCondition`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,

    /// Restrict the delta to one node instead of the first match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_effect_id: Option<NodeId>,

    /// Restrict `addDuration` to durations in this unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_type: Option<String>,
}

impl Delta {
    fn bare(operation: DeltaOperation) -> Self {
        Self {
            operation,
            value: None,
            dice: None,
            condition: None,
            target_effect_id: None,
            duration_type: None,
        }
    }

    /// A delta carrying a per-step amount.
    pub fn amount(operation: DeltaOperation, value: i64) -> Self {
        Self {
            value: Some(value),
            ..Self::bare(operation)
        }
    }

    /// `addFlatDamage(value)`.
    pub fn flat_damage(value: i64) -> Self {
        Self::amount(DeltaOperation::AddFlatDamage, value)
    }

    /// `addDice(count, faces)`.
    pub fn dice(count: u32, faces: u32) -> Self {
        Self {
            dice: Some(DiceDelta { count, faces }),
            ..Self::bare(DeltaOperation::AddDice)
        }
    }

    /// `addCondition(condition)`.
    pub fn condition(condition: impl Into<String>) -> Self {
        Self {
            condition: Some(condition.into()),
            ..Self::bare(DeltaOperation::AddCondition)
        }
    }

    /// Scope this delta to one node.
    #[must_use]
    pub fn targeting(mut self, id: impl Into<NodeId>) -> Self {
        self.target_effect_id = Some(id.into());
        self
    }

    /// Restrict an `addDuration` delta to one unit.
    #[must_use]
    pub fn with_duration_type(mut self, units: impl Into<String>) -> Self {
        self.duration_type = Some(units.into());
        self
    }
}

/// A named option of an `upcastChoice` spec.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScalingChoice {
    pub label: String,
    #[serde(default)]
    pub deltas: Vec<Delta>,
}

/// Scaling rules of one ability.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScalingSpec {
    #[serde(default)]
    pub mode: ScalingMode,
    #[serde(default)]
    pub deltas: Vec<Delta>,
    #[serde(default)]
    pub choices: Option<Vec<ScalingChoice>>,
}

impl ScalingSpec {
    /// An `upcast` spec with one delta list.
    pub fn upcast(deltas: Vec<Delta>) -> Self {
        Self {
            mode: ScalingMode::Upcast,
            deltas,
            choices: None,
        }
    }

    /// An `upcastChoice` spec with named options.
    pub fn upcast_choice(choices: Vec<ScalingChoice>) -> Self {
        Self {
            mode: ScalingMode::UpcastChoice,
            deltas: Vec::new(),
            choices: Some(choices),
        }
    }

    /// Options of an `upcastChoice` spec, empty otherwise.
    #[must_use]
    pub fn choices(&self) -> &[ScalingChoice] {
        self.choices.as_deref().unwrap_or(&[])
    }
}
