//! Damage arbitration, death and respawn systems.

use bevy::prelude::*;

use crate::combat::{arbitrate_damage, DamageDealt, DamageRequest, Dead, EffectNotification, EntityDied};
use crate::components::{Health, MovementControl, SpawnPoint};
use crate::config::CombatConfig;

/// System: DamageRequest → Health, vignette / hit marker, death entry
///
/// Death entry (ровно один раз на жизнь):
/// - Health: alive=false, can_act=false
/// - MovementControl выключен
/// - Dead { respawn_at } — respawn по дедлайну
#[allow(clippy::too_many_arguments)]
pub fn apply_damage_requests(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut requests: EventReader<DamageRequest>,
    mut targets: Query<(&mut Health, Option<&mut MovementControl>)>,
    mut dealt_events: EventWriter<DamageDealt>,
    mut died_events: EventWriter<EntityDied>,
    mut effects: EventWriter<EffectNotification>,
) {
    let now = time.elapsed_secs();

    for request in requests.read() {
        let Ok((mut health, movement)) = targets.get_mut(request.target) else {
            crate::logger::log_warning(&format!(
                "DamageRequest: target {:?} has no Health component",
                request.target
            ));
            continue;
        };

        let Some(outcome) = arbitrate_damage(&mut health, request.amount, config.damage.reference_damage) else {
            // Мёртвый не получает урон
            continue;
        };

        effects.write(EffectNotification::ShowDamageVignette {
            target: request.target,
            intensity: outcome.intensity,
        });
        if request.attacker != request.target {
            effects.write(EffectNotification::ShowHitMarker {
                shooter: request.attacker,
            });
        }

        dealt_events.write(DamageDealt {
            attacker: request.attacker,
            target: request.target,
            applied: outcome.applied,
            intensity: outcome.intensity,
            health_after: outcome.health_after,
            target_died: outcome.died,
            source: request.source,
        });

        crate::logger::log(&format!(
            "💥 Damage {:?} → {:?}: {} (HP: {})",
            request.attacker, request.target, outcome.applied, outcome.health_after
        ));

        if outcome.died {
            if let Some(mut movement) = movement {
                movement.enabled = false;
            }

            let respawn_at = now + config.damage.respawn_delay;
            commands.entity(request.target).insert(Dead { respawn_at });

            died_events.write(EntityDied {
                entity: request.target,
                killer: Some(request.attacker),
            });

            crate::logger::log_info(&format!(
                "💀 Entity {:?} killed by {:?}, respawn at {:.2}s",
                request.target, request.attacker, respawn_at
            ));
        }
    }
}

/// System: Dead.respawn_at reached → full health, control back, move to spawn point
pub fn respawn_dead_combatants(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut dead: Query<(
        Entity,
        &Dead,
        &mut Health,
        Option<&SpawnPoint>,
        Option<&mut Transform>,
        Option<&mut MovementControl>,
    )>,
) {
    let now = time.elapsed_secs();

    for (entity, dead, mut health, spawn_point, transform, movement) in dead.iter_mut() {
        if now < dead.respawn_at {
            continue;
        }

        health.respawn();

        if let Some(mut movement) = movement {
            movement.enabled = true;
        }

        let position = spawn_point
            .map(|point| point.position)
            .unwrap_or_else(|| config.damage.default_spawn_point());
        if let Some(mut transform) = transform {
            transform.translation = position;
        }

        commands.entity(entity).remove::<Dead>();

        crate::logger::log_info(&format!("✨ Entity {:?} respawned at {:?}", entity, position));
    }
}
