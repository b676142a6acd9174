//! Combatant components: Combatant, Health, SpawnPoint, MovementControl

use bevy::prelude::*;

use crate::components::{CombatInput, LookControl};

/// Combatant (player or dummy target): anything that can shoot or be shot
///
/// Required Components bring in Health, control gate, look and input state.
/// The collision category is inserted by `combatant_bundle`.
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
#[require(Health, MovementControl, LookControl, CombatInput)]
pub struct Combatant;

/// Combatant health
///
/// Invariants:
/// - 0 ≤ current ≤ max
/// - current == 0 ⇒ !alive
/// - !alive ⇒ !can_act
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
    pub alive: bool,
    /// Movement/weapon control gate
    pub can_act: bool,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Read-only view for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HealthSnapshot {
    pub current: u32,
    pub max: u32,
}

impl HealthSnapshot {
    /// Health bar fill (0..=1)
    pub fn fraction(&self) -> f32 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f32 / self.max as f32
        }
    }
}

/// Result of `Health::take_damage` on a living target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChange {
    pub before: u32,
    pub after: u32,
    /// This hit was the killing blow (death entry)
    pub died: bool,
}

impl Health {
    /// `max` меньше 1 поднимается до 1: живой актёр всегда с current > 0
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self {
            current: max,
            max,
            alive: true,
            can_act: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Apply damage to a living target.
    ///
    /// Returns `None` when the target is already dead: damage-while-dead is a
    /// no-op so death entry can't fire twice in one life.
    pub fn take_damage(&mut self, amount: u32) -> Option<HealthChange> {
        if !self.alive {
            return None;
        }

        let before = self.current;
        self.current = self.current.saturating_sub(amount);

        let died = self.current == 0;
        if died {
            self.alive = false;
            self.can_act = false;
        }

        Some(HealthChange {
            before,
            after: self.current,
            died,
        })
    }

    /// Back to full health with control restored
    pub fn respawn(&mut self) {
        self.current = self.max;
        self.alive = true;
        self.can_act = true;
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            current: self.current,
            max: self.max,
        }
    }
}

/// Movement control switch (read by the host's character controller)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct MovementControl {
    pub enabled: bool,
}

impl Default for MovementControl {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Where the combatant reappears after respawn
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SpawnPoint {
    pub position: Vec3,
}

impl Default for SpawnPoint {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}
