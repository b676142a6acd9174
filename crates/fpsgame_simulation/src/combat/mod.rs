//! Combat module: fire control, projectiles, collision filter, damage
//!
//! ECS ответственность:
//! - Game state: WeaponState, Projectile, Health
//! - Combat rules: fire-rate gate, reload, resolution latch, damage arbitration
//! - Events: DamageDealt, EntityDied, EffectNotification
//!
//! Внешние коллабораторы (рендер, звук, UI, physics integrator) общаются
//! только через события: ProjectileContact/Overlap на входе,
//! EffectNotification на выходе.

use bevy::prelude::*;

pub mod components;
pub mod damage;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::*;
pub use damage::{
    arbitrate_damage, damage_intensity, DamageDealt, DamageOutcome, DamageRequest, DamageSource, Dead,
    EntityDied,
};
pub use events::{EffectNotification, ProjectileContact, ProjectileOverlap, SoundKind, WeaponFired};

use crate::components::input::{clear_input_edges, ingest_combat_input};
use crate::components::CombatInputEvent;
use crate::config::CombatConfig;
use crate::hud::{publish_player_hud, PlayerHud};

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate (60Hz).
///
/// Порядок выполнения (один логический тик):
/// 1. ingest_combat_input — input events → CombatInput
/// 2. update_weapon_pose — aim toggle, ADS blend, sway, kick
/// 3. tick_reloads — reload progress / FinishReload
/// 4. process_weapon_triggers — Fire / empty → reload / hit-scan
/// 5. advance_projectiles — lifetime, drift correction, integration
/// 6. detect_projectile_contacts — встроенный detection (вместо physics)
/// 7. resolve_projectile_overlaps → resolve_projectile_contacts
/// 8. apply_damage_requests — arbitration, death entry
/// 9. respawn_dead_combatants
/// 10. despawn_resolved_projectiles, fade_trail_handoffs
/// 11. publish_player_hud, clear_input_edges
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CombatConfig>()
            .init_resource::<PlayerHud>();

        // Регистрация событий
        app.add_event::<CombatInputEvent>()
            .add_event::<WeaponFired>()
            .add_event::<ProjectileContact>()
            .add_event::<ProjectileOverlap>()
            .add_event::<DamageRequest>()
            .add_event::<DamageDealt>()
            .add_event::<EntityDied>()
            .add_event::<EffectNotification>();

        // Регистрация систем в FixedUpdate
        app.add_systems(
            FixedUpdate,
            (
                // Фаза 1: Input + weapon state
                ingest_combat_input,
                systems::update_weapon_pose,
                systems::tick_reloads,
                systems::process_weapon_triggers,

                // Фаза 2: Projectiles
                systems::advance_projectiles,
                systems::detect_projectile_contacts,
                systems::resolve_projectile_overlaps,
                systems::resolve_projectile_contacts,

                // Фаза 3: Damage + death
                systems::apply_damage_requests,
                systems::respawn_dead_combatants,

                // Фаза 4: Cleanup + HUD
                systems::despawn_resolved_projectiles,
                systems::fade_trail_handoffs,
                publish_player_hud,
                clear_input_edges,
            )
                .chain(), // Последовательное выполнение
        );
    }
}
