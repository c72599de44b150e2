//! Dice formulas and roll evaluation.
//!
//! - `DiceFormula`: parsed `NdM + K + @key` formulas
//! - `DamageRoll`: primary-die roll with explode-on-max and miss-on-1
//! - `PlainRoll`: additive roll
//! - `DiceSource`: where faces come from (`DiceRng`, `ScriptedDice`)

mod formula;
mod roll;

pub use formula::{DiceFormula, FormulaError, SignedTerm, Term};
pub use roll::{
    DamageRoll, DiceSource, PlainRoll, PrimaryDie, PrimaryDieConfig, RollOutcome, ScriptedDice,
    MAX_EXPLOSIONS, MAX_ROLL_MODE,
};
