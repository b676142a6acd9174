//! Combat error types
//!
//! Only faults live here. Precondition misses (fire while reloading,
//! reload while reloading, empty trigger) are ordinary outcomes, see
//! `FireDecision`.

use bevy::prelude::Entity;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CombatError {
    /// Weapon cannot run without this collaborator; the weapon gets disabled.
    #[error("weapon {weapon:?} is missing required collaborator: {collaborator}")]
    MissingCollaborator {
        weapon: Entity,
        collaborator: &'static str,
    },

    #[error("invalid combat config: {0}")]
    InvalidConfig(String),

    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse combat config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type CombatResult<T> = Result<T, CombatError>;
