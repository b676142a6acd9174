//! HUD snapshot (read-only view for the UI collaborator)

use bevy::prelude::*;

use crate::combat::{WeaponOwner, WeaponSnapshot, WeaponState};
use crate::components::{Health, HealthSnapshot, Player};

/// Ammo + health of the local player, refreshed every tick
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerHud {
    pub weapon: Option<WeaponSnapshot>,
    pub health: Option<HealthSnapshot>,
}

impl PlayerHud {
    /// "12 / 30", "Reloading..." while reloading
    pub fn ammo_text(&self) -> Option<String> {
        self.weapon.map(|weapon| {
            if weapon.is_reloading {
                "Reloading...".to_string()
            } else {
                format!("{} / {}", weapon.ammo_current, weapon.ammo_max)
            }
        })
    }
}

/// System: Player entity → PlayerHud
pub fn publish_player_hud(
    mut hud: ResMut<PlayerHud>,
    players: Query<(Entity, &Health), With<Player>>,
    weapons: Query<(&WeaponOwner, &WeaponState)>,
) {
    let Some((player, health)) = players.iter().next() else {
        *hud = PlayerHud::default();
        return;
    };

    let weapon = weapons
        .iter()
        .find(|(owner, _)| owner.0 == player)
        .map(|(_, state)| state.snapshot());

    let next = PlayerHud {
        weapon,
        health: Some(health.snapshot()),
    };
    // Не трогаем ресурс без изменений (change detection для UI)
    if *hud != next {
        *hud = next;
    }
}
