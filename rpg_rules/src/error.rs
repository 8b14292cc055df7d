//! Error types for the rules core.

use thiserror::Error;

use crate::entities::{EquipSlot, InstanceId, Trait};

/// Errors raised by rules-level operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RulesError {
    /// A referenced entity is missing from its catalog or collection.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A template failed a load-time invariant.
    #[error("invalid template '{id}': {reason}")]
    InvalidTemplate { id: String, reason: String },

    /// A location id could not be parsed as "row-col".
    #[error("invalid location id '{0}'")]
    InvalidLocation(String),

    /// A coordinate lies outside the tile map.
    #[error("coordinate {row}-{col} is outside the map")]
    OutOfBounds { row: i32, col: i32 },

    #[error("no unspent training points to allocate to {0}")]
    NoTrainingPoints(Trait),

    #[error("item {0} cannot be equipped")]
    NotEquippable(InstanceId),

    #[error("nothing equipped in {0:?} slot")]
    SlotEmpty(EquipSlot),

    #[error("insufficient gold: need {needed}, have {available}")]
    InsufficientGold { needed: u32, available: u32 },

    /// Configuration failed to parse or validate.
    #[error("config error: {0}")]
    Config(String),
}

impl RulesError {
    /// Create a not found error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create an invalid template error.
    pub fn invalid_template(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type RulesResult<T> = Result<T, RulesError>;
