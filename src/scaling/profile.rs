//! The scalable parts of an ability and of its caster.

use serde::{Deserialize, Serialize};

use crate::effects::EffectTree;

use super::spec::ScalingSpec;

/// Targeting block of an ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Targets {
    /// Range or reach, in feet.
    #[serde(default)]
    pub distance: u32,
    #[serde(default)]
    pub count: u32,
}

/// Area template; only the dimensions present are scaled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub quantity: u32,
    /// `"rounds"`, `"minutes"`, `"hours"`...
    pub units: String,
}

impl Duration {
    pub fn new(quantity: u32, units: impl Into<String>) -> Self {
        Self {
            quantity,
            units: units.into(),
        }
    }

    /// Unit comparison, case and plural insensitive.
    #[must_use]
    pub fn has_units(&self, units: &str) -> bool {
        fn singular(s: &str) -> String {
            let lower = s.trim().to_ascii_lowercase();
            lower.strip_suffix('s').map(str::to_string).unwrap_or(lower)
        }
        singular(&self.units) == singular(units)
    }
}

/// An ability as seen by the scaling engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellProfile {
    /// Tier 0 is a cantrip. The base mana cost equals the tier.
    pub tier: u32,
    #[serde(default)]
    pub scaling: ScalingSpec,
    #[serde(default)]
    pub effects: EffectTree,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Targets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<AreaTemplate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
}

impl SpellProfile {
    pub fn new(tier: u32, scaling: ScalingSpec, effects: EffectTree) -> Self {
        Self {
            tier,
            scaling,
            effects,
            targets: None,
            template: None,
            duration: None,
        }
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.targets = Some(targets);
        self
    }

    #[must_use]
    pub fn with_template(mut self, template: AreaTemplate) -> Self {
        self.template = Some(template);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    #[must_use]
    pub fn is_cantrip(&self) -> bool {
        self.tier == 0
    }

    #[must_use]
    pub fn base_cost(&self) -> u32 {
        self.tier
    }
}

/// What the caster can currently spend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorResources {
    /// Mana currently available.
    pub mana: u32,
    /// Highest tier the caster has unlocked; no single cast may spend more.
    pub highest_unlocked_tier: u32,
}

impl ActorResources {
    pub fn new(mana: u32, highest_unlocked_tier: u32) -> Self {
        Self {
            mana,
            highest_unlocked_tier,
        }
    }
}
