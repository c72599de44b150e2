//! Description parser for imported monster actions.
//!
//! Free text in, effect nodes out. Each sub-parser stands alone and
//! returns `None` or an empty list when nothing matches; the precedence
//! of the patterns is deliberate and should not be reordered.
//!
//! - `extract_dice_formula` / `parse_damage_type`: what the action deals
//! - `parse_saving_throw`: DC, ability, half-on-save and consequence
//! - `parse_conditions`: conditions and the outcome edge they apply on
//! - `parse_range_reach`: range, reach and area
//! - `build_effect_tree` / `parse_action` / `parse_actions`: assembly

mod aliases;
mod build;
mod conditions;
mod damage;
mod range;
mod save;

pub use aliases::{condition_alias, condition_id, damage_type_alias, save_ability_alias, CONDITIONS};
pub use build::{build_effect_tree, parse_action, parse_actions, MonsterAction, ParsedAction};
pub use conditions::{parse_conditions, ParsedCondition};
pub use damage::{extract_dice_formula, find_dice_formula, parse_damage_type};
pub use range::{parse_range_reach, RangeKind, RangeReach};
pub use save::{parse_saving_throw, ParsedSave};
