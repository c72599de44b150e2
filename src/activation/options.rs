//! Activation options.

use serde::{Deserialize, Serialize};

/// Per-activation roll options supplied by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationOptions {
    /// Extra primary dice: positive keeps the highest, negative the lowest.
    #[serde(default)]
    pub roll_mode: i32,

    /// Pins the primary die's natural face.
    /// Used by tests and by deferred roll resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_die_value: Option<u32>,

    /// Flat bonus on the primary die, applied before overflow handling.
    #[serde(default)]
    pub primary_die_modifier: i64,

    /// The host skipped its roll dialog. Carried through untouched.
    #[serde(default)]
    pub fast_forward: bool,
}

impl ActivationOptions {
    /// Roll with advantage (`mode > 0`) or disadvantage (`mode < 0`).
    #[must_use]
    pub fn with_roll_mode(mut self, mode: i32) -> Self {
        self.roll_mode = mode;
        self
    }

    /// Pin the primary die.
    #[must_use]
    pub fn with_primary_die_value(mut self, value: u32) -> Self {
        self.primary_die_value = Some(value);
        self
    }

    #[must_use]
    pub fn with_primary_die_modifier(mut self, modifier: i64) -> Self {
        self.primary_die_modifier = modifier;
        self
    }

    #[must_use]
    pub fn with_fast_forward(mut self, fast_forward: bool) -> Self {
        self.fast_forward = fast_forward;
        self
    }
}
