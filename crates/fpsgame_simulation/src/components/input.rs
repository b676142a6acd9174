//! Combat input (abstract event source → per-combatant state)
//!
//! The host polls its devices and writes `CombatInputEvent`s; the first
//! system of the combat tick folds them into `CombatInput`. Edge flags
//! (`*_pressed`) live for exactly one tick, levels (`fire_held`) persist
//! until the next event says otherwise.

use bevy::prelude::*;

/// Event: input sample for one combatant (host → simulation)
#[derive(Event, Debug, Clone, Copy)]
pub struct CombatInputEvent {
    pub entity: Entity,
    /// Fire button went down this frame (edge)
    pub fire_pressed: bool,
    /// Fire button is down (level)
    pub fire_held: bool,
    /// Aim toggle (edge)
    pub aim_pressed: bool,
    /// Manual reload (edge)
    pub reload_pressed: bool,
    /// Mouse delta this frame, drives weapon sway
    pub look_delta: Vec2,
}

impl Default for CombatInputEvent {
    fn default() -> Self {
        Self {
            entity: Entity::PLACEHOLDER,
            fire_pressed: false,
            fire_held: false,
            aim_pressed: false,
            reload_pressed: false,
            look_delta: Vec2::ZERO,
        }
    }
}

/// Folded input state consumed by the weapon systems
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct CombatInput {
    pub fire_pressed: bool,
    pub fire_held: bool,
    pub aim_pressed: bool,
    pub reload_pressed: bool,
    pub look_delta: Vec2,
}

/// Trigger state as seen by fire control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerInput {
    Released,
    /// Edge: pressed this tick
    Pressed,
    /// Level: still down from an earlier tick
    Held,
}

impl CombatInput {
    pub fn apply(&mut self, event: &CombatInputEvent) {
        // Edges accumulate (several host frames per tick), levels overwrite
        self.fire_pressed |= event.fire_pressed;
        self.aim_pressed |= event.aim_pressed;
        self.reload_pressed |= event.reload_pressed;
        self.fire_held = event.fire_held || event.fire_pressed;
        self.look_delta += event.look_delta;
    }

    pub fn trigger(&self) -> TriggerInput {
        if self.fire_pressed {
            TriggerInput::Pressed
        } else if self.fire_held {
            TriggerInput::Held
        } else {
            TriggerInput::Released
        }
    }

    pub fn clear_edges(&mut self) {
        self.fire_pressed = false;
        self.aim_pressed = false;
        self.reload_pressed = false;
        self.look_delta = Vec2::ZERO;
    }
}

/// System: fold input events into `CombatInput` (first in the combat tick)
pub fn ingest_combat_input(
    mut events: EventReader<CombatInputEvent>,
    mut inputs: Query<&mut CombatInput>,
) {
    for event in events.read() {
        if let Ok(mut input) = inputs.get_mut(event.entity) {
            input.apply(event);
        }
    }
}

/// System: drop one-tick edges (last in the combat tick)
pub fn clear_input_edges(mut inputs: Query<&mut CombatInput>) {
    for mut input in inputs.iter_mut() {
        input.clear_edges();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_edge_and_level() {
        let mut input = CombatInput::default();
        assert_eq!(input.trigger(), TriggerInput::Released);

        input.apply(&CombatInputEvent {
            fire_pressed: true,
            fire_held: true,
            ..default()
        });
        assert_eq!(input.trigger(), TriggerInput::Pressed);

        input.clear_edges();
        assert_eq!(input.trigger(), TriggerInput::Held);

        input.apply(&CombatInputEvent::default());
        assert_eq!(input.trigger(), TriggerInput::Released);
    }

    #[test]
    fn test_default_event_is_idle() {
        let event = CombatInputEvent::default();
        assert_eq!(event.entity, Entity::PLACEHOLDER);

        let mut input = CombatInput::default();
        input.apply(&event);
        assert_eq!(input, CombatInput::default());
        assert_eq!(input.trigger(), TriggerInput::Released);
    }

    #[test]
    fn test_edges_accumulate_within_tick() {
        let mut input = CombatInput::default();
        input.apply(&CombatInputEvent {
            aim_pressed: true,
            look_delta: Vec2::new(1.0, 0.0),
            ..default()
        });
        input.apply(&CombatInputEvent {
            look_delta: Vec2::new(0.5, 2.0),
            ..default()
        });

        assert!(input.aim_pressed);
        assert_eq!(input.look_delta, Vec2::new(1.5, 2.0));

        input.clear_edges();
        assert!(!input.aim_pressed);
        assert_eq!(input.look_delta, Vec2::ZERO);
    }
}
