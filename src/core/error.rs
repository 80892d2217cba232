use thiserror::Error;

use crate::core::types::TilePos;

#[derive(Error, Debug)]
pub enum PlunderError {
    #[error("Invalid generation parameters: {0}")]
    InvalidGenerationParams(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PlunderError>;

/// Why an action command targeted the wrong thing
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetError {
    #[error("position {0:?} is outside the level")]
    OutOfBounds(TilePos),

    #[error("no door at {0:?}")]
    NoDoor(TilePos),

    #[error("door at {0:?} is already locked")]
    AlreadyLocked(TilePos),

    #[error("no room at {0:?}")]
    NoRoom(TilePos),

    #[error("no camera covers the room at {0:?}")]
    NoCamera(TilePos),

    #[error("no camera with id {0}")]
    UnknownCamera(usize),

    #[error("{0} is not among the offered upgrades")]
    NotOffered(&'static str),
}

/// Reason code for a rejected player action. The world is untouched when one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionRejection {
    #[error("not enough {resource}: need {needed}, have {available}")]
    InsufficientResource {
        resource: &'static str,
        needed: u32,
        available: u32,
    },

    #[error("on cooldown for {remaining} more")]
    OnCooldown { remaining: f32 },

    #[error("invalid target: {0}")]
    InvalidTarget(#[from] TargetError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages() {
        let r = ActionRejection::InsufficientResource {
            resource: "action points",
            needed: 2,
            available: 1,
        };
        assert_eq!(r.to_string(), "not enough action points: need 2, have 1");

        let t: ActionRejection = TargetError::NoDoor(TilePos::new(1, 2)).into();
        assert!(matches!(t, ActionRejection::InvalidTarget(TargetError::NoDoor(_))));
    }

    #[test]
    fn test_toml_error_converts() {
        let err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let e: PlunderError = err.into();
        assert!(e.to_string().starts_with("Config parse error"));
    }
}
