//! Player control marker component
//!
//! Marks the entity driven by local input (as opposed to target dummies).

use bevy::prelude::Component;

/// Marker component for the player-controlled combatant
///
/// # Architecture note
/// - HUD publication uses `With<Player>` (only the local player feeds the HUD)
/// - Damage vignette / hit marker notifications carry the entity, the UI
///   collaborator decides whether it belongs to the local player
///
/// # Single-player
/// Usually exactly one entity carries this component.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;
