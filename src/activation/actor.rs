//! Who activates what.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActorType {
    #[default]
    Character,
    Npc,
    /// Minions never crit and can always miss.
    Minion,
    Solo,
}

/// The activating actor as the evaluator sees it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorContext {
    pub actor_type: ActorType,
    /// Values for `@key` formula references.
    #[serde(default)]
    pub roll_data: FxHashMap<String, i64>,
}

impl ActorContext {
    pub fn new(actor_type: ActorType) -> Self {
        Self {
            actor_type,
            roll_data: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_roll_data(mut self, key: impl Into<String>, value: i64) -> Self {
        self.roll_data.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn is_minion(&self) -> bool {
        self.actor_type == ActorType::Minion
    }
}

/// What kind of thing is being activated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SubjectCategory {
    #[default]
    Spell,
    Feature,
    MonsterAction,
    Object,
    /// Only grants other items or features; nothing to roll.
    GrantOnly,
}

impl SubjectCategory {
    #[must_use]
    pub const fn has_rolls(self) -> bool {
        !matches!(self, Self::GrantOnly)
    }
}
