//! Roll evaluation.
//!
//! Two evaluators share one `DiceSource`:
//!
//! - `DamageRoll`: crit/miss-capable. The first die of the first positive
//!   dice term is the primary die. It may be rolled with advantage or
//!   disadvantage, pinned to a fixed face, and shifted by a flat modifier.
//!   Reaching the die's maximum is a critical hit and the die explodes; a
//!   natural 1 is a miss.
//! - `PlainRoll`: an additive roll with no special dice.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::DiceRng;

use super::formula::{DiceFormula, Term};

/// Upper bound on chained explosions of one primary die.
pub const MAX_EXPLOSIONS: usize = 20;

/// Upper bound on extra primary dice rolled for advantage or disadvantage.
pub const MAX_ROLL_MODE: usize = 10;

/// Source of die faces.
pub trait DiceSource {
    /// Roll one die, returning a face in `1..=faces`.
    fn roll(&mut self, faces: u32) -> u32;
}

impl DiceSource for DiceRng {
    fn roll(&mut self, faces: u32) -> u32 {
        self.roll_die(faces)
    }
}

/// Replays a fixed list of faces, then a fallback face.
///
/// Faces are clamped to the die being rolled.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    faces: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedDice {
    /// Replay `faces` in order, then roll 2s.
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
            fallback: 2,
        }
    }

    /// Change the face returned once the script runs out.
    #[must_use]
    pub fn with_fallback(mut self, fallback: u32) -> Self {
        self.fallback = fallback;
        self
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, faces: u32) -> u32 {
        let face = self.faces.pop_front().unwrap_or(self.fallback);
        face.clamp(1, faces.max(1))
    }
}

/// Configuration of the primary die for a damage roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryDieConfig {
    pub can_crit: bool,
    pub can_miss: bool,
    /// Positive: roll extra primary dice and keep the highest.
    /// Negative: roll extra and keep the lowest. At most
    /// [`MAX_ROLL_MODE`] extra dice are rolled.
    pub roll_mode: i32,
    /// Pin the natural face instead of rolling.
    pub primary_die_value: Option<u32>,
    /// Added to the primary die before overflow handling.
    pub primary_die_modifier: i64,
}

/// Primary die details of a resolved damage roll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryDie {
    pub faces: u32,
    /// Face kept from the primary roll(s), before the modifier.
    pub natural: u32,
    /// Candidates dropped by advantage or disadvantage.
    pub discarded: Vec<u32>,
    /// Extra faces from explosions.
    pub explosions: Vec<u32>,
}

/// A fully resolved roll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollOutcome {
    /// Formula after reference resolution.
    pub formula: String,
    pub total: i64,
    /// Every die face rolled, in order (primary first for damage rolls).
    pub faces: Vec<u32>,
    pub primary: Option<PrimaryDie>,
    pub is_critical: bool,
    pub is_miss: bool,
}

/// Crit/miss-capable damage roll.
#[derive(Clone, Debug)]
pub struct DamageRoll {
    formula: DiceFormula,
    config: PrimaryDieConfig,
}

impl DamageRoll {
    /// Create a damage roll from a (resolved) formula.
    pub fn new(formula: DiceFormula, config: PrimaryDieConfig) -> Self {
        Self { formula, config }
    }

    /// Primary die configuration.
    #[must_use]
    pub fn config(&self) -> &PrimaryDieConfig {
        &self.config
    }

    /// Roll every term.
    ///
    /// A miss zeroes the total; damage totals never go below zero.
    pub fn evaluate(&self, dice: &mut impl DiceSource) -> RollOutcome {
        let primary_index = self.formula.primary_term();
        let mut faces_rolled = Vec::new();
        let mut primary = None;
        let mut is_critical = false;
        let mut is_miss = false;
        let mut total: i64 = 0;

        for (index, signed) in self.formula.terms().iter().enumerate() {
            let value = match &signed.term {
                Term::Dice { count, faces } if Some(index) == primary_index => {
                    let (die, contribution, crit, miss) = self.roll_primary(*faces, dice);
                    is_critical = crit;
                    is_miss = miss;
                    faces_rolled.push(die.natural);
                    faces_rolled.extend(die.explosions.iter().copied());
                    primary = Some(die);

                    let mut sum = contribution;
                    for _ in 1..*count {
                        let face = dice.roll(*faces);
                        faces_rolled.push(face);
                        sum = sum.saturating_add(i64::from(face));
                    }
                    sum
                }
                Term::Dice { count, faces } => {
                    let mut sum: i64 = 0;
                    for _ in 0..*count {
                        let face = dice.roll(*faces);
                        faces_rolled.push(face);
                        sum = sum.saturating_add(i64::from(face));
                    }
                    sum
                }
                Term::Constant(value) => *value,
                // Unresolved references count as zero.
                Term::Reference(_) => 0,
            };
            total = if signed.negative {
                total.saturating_sub(value)
            } else {
                total.saturating_add(value)
            };
        }

        let total = if is_miss { 0 } else { total.max(0) };

        RollOutcome {
            formula: self.formula.to_string(),
            total,
            faces: faces_rolled,
            primary,
            is_critical,
            is_miss,
        }
    }

    /// Returns the die record, its contribution, and crit/miss flags.
    fn roll_primary(&self, faces: u32, dice: &mut impl DiceSource) -> (PrimaryDie, i64, bool, bool) {
        let mut discarded = Vec::new();
        let natural = match self.config.primary_die_value {
            Some(pinned) => pinned.clamp(1, faces),
            None => {
                let extra = (self.config.roll_mode.unsigned_abs() as usize).min(MAX_ROLL_MODE);
                let mut candidates: Vec<u32> = (0..=extra).map(|_| dice.roll(faces)).collect();
                candidates.sort_unstable();
                let kept = if self.config.roll_mode < 0 {
                    candidates.remove(0)
                } else {
                    candidates.pop().unwrap_or(1)
                };
                discarded = candidates;
                kept
            }
        };

        let is_miss = self.config.can_miss && natural == 1;
        let modified = i64::from(natural).saturating_add(self.config.primary_die_modifier);
        let max = i64::from(faces);
        let is_critical = self.config.can_crit && !is_miss && modified >= max;

        let mut explosions = Vec::new();
        if is_critical {
            while explosions.len() < MAX_EXPLOSIONS {
                let face = dice.roll(faces);
                explosions.push(face);
                if face < faces {
                    break;
                }
            }
        }

        let contribution = explosions
            .iter()
            .fold(modified.min(max), |sum, face| sum.saturating_add(i64::from(*face)));

        let die = PrimaryDie {
            faces,
            natural,
            discarded,
            explosions,
        };
        (die, contribution, is_critical, is_miss)
    }
}

/// Additive roll with no special dice.
#[derive(Clone, Debug)]
pub struct PlainRoll {
    formula: DiceFormula,
}

impl PlainRoll {
    /// Create a plain roll from a (resolved) formula.
    pub fn new(formula: DiceFormula) -> Self {
        Self { formula }
    }

    /// Roll every term and sum.
    pub fn evaluate(&self, dice: &mut impl DiceSource) -> RollOutcome {
        let mut faces_rolled = Vec::new();
        let mut total: i64 = 0;

        for signed in self.formula.terms() {
            let value = match &signed.term {
                Term::Dice { count, faces } => {
                    let mut sum: i64 = 0;
                    for _ in 0..*count {
                        let face = dice.roll(*faces);
                        faces_rolled.push(face);
                        sum = sum.saturating_add(i64::from(face));
                    }
                    sum
                }
                Term::Constant(value) => *value,
                Term::Reference(_) => 0,
            };
            total = if signed.negative {
                total.saturating_sub(value)
            } else {
                total.saturating_add(value)
            };
        }

        RollOutcome {
            formula: self.formula.to_string(),
            total,
            faces: faces_rolled,
            primary: None,
            is_critical: false,
            is_miss: false,
        }
    }
}
