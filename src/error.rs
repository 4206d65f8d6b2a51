//! Errors reported to the caller by rejected commands and invalid settings.
//!
//! None of these are fatal: a rejected command leaves the world untouched.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// An upgrade was selected while no level-up was pending
    NotAwaitingSelection,
    /// The selected index does not name a current offer
    InvalidSelection { index: usize, offered: usize },
    /// A weapon identifier that is not part of the arsenal
    UnknownWeapon(String),
    /// An adversary type name missing from the adversary table
    UnknownAdversary(String),
    /// The weapon is already at its maximum level
    WeaponMaxLevel,
    /// The weapon is already owned by the avatar
    WeaponAlreadyOwned,
    /// Settings failed to parse or validate
    InvalidConfig(String),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAwaitingSelection => write!(f, "no level-up is pending"),
            Self::InvalidSelection { index, offered } => {
                write!(f, "invalid upgrade selection {index} ({offered} offered)")
            }
            Self::UnknownWeapon(id) => write!(f, "unknown weapon: {id}"),
            Self::UnknownAdversary(name) => write!(f, "unknown adversary type: {name}"),
            Self::WeaponMaxLevel => write!(f, "weapon is already at max level"),
            Self::WeaponAlreadyOwned => write!(f, "weapon is already owned"),
            Self::InvalidConfig(reason) => write!(f, "invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for SimError {}

impl From<serde_json::Error> for SimError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}
