//! Outcome edges.
//!
//! An `OutcomeContext` names the branch under which a child node lives in
//! its parent. On the wire it is a plain string (`"hit"`,
//! `"failedSaveBy3"`, `"sharedRolls"`, ...).

use serde::{Deserialize, Serialize};

/// Name of an outcome edge.
///
/// The declaration order is the fixed enumeration order used by every walk
/// over the tree: shared rolls first, then attack outcomes, then save
/// outcomes, with graduated failures ordered by margin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OutcomeContext {
    /// Damage rolled once for a saving throw and shared by every target.
    SharedRolls,
    /// The attack hit.
    Hit,
    /// The attack missed.
    Miss,
    /// The attack was a critical hit.
    CriticalHit,
    /// The target failed its save.
    FailedSave,
    /// The target passed its save.
    PassedSave,
    /// The target failed its save by at least this margin.
    FailedSaveBy(u32),
}

const FAILED_SAVE_BY: &str = "failedSaveBy";

impl OutcomeContext {
    /// True for edges a `Damage` node may own.
    #[must_use]
    pub const fn is_attack_outcome(self) -> bool {
        matches!(self, Self::Hit | Self::Miss | Self::CriticalHit)
    }

    /// True for `on` edges a `SavingThrow` node may own.
    #[must_use]
    pub const fn is_save_outcome(self) -> bool {
        matches!(self, Self::FailedSave | Self::PassedSave | Self::FailedSaveBy(_))
    }

    /// Failure margin for graduated save edges.
    #[must_use]
    pub const fn failed_by_margin(self) -> Option<u32> {
        match self {
            Self::FailedSaveBy(margin) => Some(margin),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutcomeContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SharedRolls => f.write_str("sharedRolls"),
            Self::Hit => f.write_str("hit"),
            Self::Miss => f.write_str("miss"),
            Self::CriticalHit => f.write_str("criticalHit"),
            Self::FailedSave => f.write_str("failedSave"),
            Self::PassedSave => f.write_str("passedSave"),
            Self::FailedSaveBy(margin) => write!(f, "{FAILED_SAVE_BY}{margin}"),
        }
    }
}

/// Error for strings that do not name an outcome edge.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown outcome context `{0}`")]
pub struct UnknownContext(pub String);

impl std::str::FromStr for OutcomeContext {
    type Err = UnknownContext;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sharedRolls" => Ok(Self::SharedRolls),
            "hit" => Ok(Self::Hit),
            "miss" => Ok(Self::Miss),
            "criticalHit" => Ok(Self::CriticalHit),
            "failedSave" => Ok(Self::FailedSave),
            "passedSave" => Ok(Self::PassedSave),
            other => other
                .strip_prefix(FAILED_SAVE_BY)
                .and_then(|margin| margin.parse().ok())
                .map(Self::FailedSaveBy)
                .ok_or_else(|| UnknownContext(other.to_string())),
        }
    }
}

impl TryFrom<String> for OutcomeContext {
    type Error = UnknownContext;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OutcomeContext> for String {
    fn from(context: OutcomeContext) -> Self {
        context.to_string()
    }
}
