//! Upcast validation, the first phase of scaling.

use serde::{Deserialize, Serialize};

use super::profile::{ActorResources, SpellProfile};
use super::spec::ScalingMode;

/// Why an upcast was refused. Checked in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("cantrips cannot be upcast")]
    Cantrip,

    #[error("this ability does not scale")]
    NoScaling,

    #[error("must spend at least {base_cost} mana, got {spend}")]
    BelowBaseCost { spend: u32, base_cost: u32 },

    #[error("cannot spend {spend} mana: highest unlocked tier is {ceiling}")]
    AboveCeiling { spend: u32, ceiling: u32 },

    #[error("not enough mana: {spend} requested, {available} available")]
    InsufficientMana { spend: u32, available: u32 },
}

/// Cost breakdown of an accepted upcast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcastPlan {
    /// Times each delta is applied; zero is a legal plain cast.
    pub steps: u32,
    pub base_cost: u32,
    pub total_cost: u32,
    /// Option picked for an `upcastChoice` ability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice: Option<usize>,
}

/// Check whether `mana_to_spend` is a legal upcast of `profile`.
///
/// ```
/// use ability_effects::scaling::{validate, ActorResources, Delta, ScalingSpec, SpellProfile};
/// use ability_effects::effects::EffectTree;
///
/// let spell = SpellProfile::new(3, ScalingSpec::upcast(vec![Delta::dice(1, 6)]), EffectTree::new());
/// let plan = validate(&spell, &ActorResources::new(10, 5), 5, None).unwrap();
/// assert_eq!((plan.steps, plan.base_cost, plan.total_cost), (2, 3, 5));
/// ```
pub fn validate(
    profile: &SpellProfile,
    resources: &ActorResources,
    mana_to_spend: u32,
    choice: Option<usize>,
) -> Result<UpcastPlan, ValidationError> {
    let base_cost = profile.base_cost();
    let checked = if profile.is_cantrip() {
        Err(ValidationError::Cantrip)
    } else if profile.scaling.mode == ScalingMode::None {
        Err(ValidationError::NoScaling)
    } else if mana_to_spend < base_cost {
        Err(ValidationError::BelowBaseCost {
            spend: mana_to_spend,
            base_cost,
        })
    } else if mana_to_spend > resources.highest_unlocked_tier {
        Err(ValidationError::AboveCeiling {
            spend: mana_to_spend,
            ceiling: resources.highest_unlocked_tier,
        })
    } else if mana_to_spend > resources.mana {
        Err(ValidationError::InsufficientMana {
            spend: mana_to_spend,
            available: resources.mana,
        })
    } else {
        Ok(UpcastPlan {
            steps: mana_to_spend - base_cost,
            base_cost,
            total_cost: mana_to_spend,
            choice,
        })
    };

    if let Err(err) = &checked {
        tracing::debug!(tier = profile.tier, mana_to_spend, error = %err, "upcast rejected");
    }
    checked
}
