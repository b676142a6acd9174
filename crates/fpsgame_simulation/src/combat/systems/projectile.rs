//! Projectile systems (tick, built-in detection, resolution, cleanup).

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Group};

use crate::combat::{
    decide, sweep_sphere, CollisionCategory, ContactRelation, DamageRequest, DamageSource, EffectNotification,
    FilterDecision, Projectile, ProjectileContact, ProjectileOverlap, ProjectileTick, Resolution,
    ResolutionContext, SweepHit, TrailHandoff, WeaponOwner,
};
use crate::components::Health;
use crate::config::{CombatConfig, ProjectileConfig};

/// System: lifetime / expiry / drift correction + integration
///
/// Expired снаряды удаляются сразу, без impact эффекта.
pub fn advance_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    mut projectiles: Query<(Entity, &mut Projectile, &ProjectileConfig, &mut Transform)>,
) {
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    for (entity, mut projectile, tuning, mut transform) in projectiles.iter_mut() {
        match projectile.tick(dt, tuning.drift_correction_fraction) {
            ProjectileTick::Inactive => continue,
            ProjectileTick::Expired => {
                crate::logger::log(&format!("⏱️ Projectile {:?} expired", entity));
                commands.entity(entity).despawn();
                continue;
            }
            ProjectileTick::Flying { drift_corrected } => {
                if drift_corrected {
                    crate::logger::log(&format!("Projectile {:?} velocity re-asserted", entity));
                }
            }
        }

        projectile.integrate(dt, tuning.linear_damping, now);
        transform.translation = projectile.position;
    }
}

/// Colliders the built-in detection checks against
pub type DetectionVolumes<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Transform,
        &'static Collider,
        Option<&'static CollisionCategory>,
        Has<Health>,
        Option<&'static WeaponOwner>,
    ),
    Without<Projectile>,
>;

/// Earliest non-filtered volume along one projectile step
struct StepHit {
    other: Entity,
    distance: f32,
    /// Damage sphere touched (damageable targets only)
    overlap: bool,
    contact: Option<SweepHit>,
}

/// System: built-in contact detection (headless stand-in for the physics integrator)
///
/// Swept по шагу `previous_position → position`; события пишутся только для
/// ближайшего по шагу объёма, так что стена закрывает цель за ней.
pub fn detect_projectile_contacts(
    projectiles: Query<(Entity, &Projectile, &ProjectileConfig)>,
    volumes: DetectionVolumes,
    mut contacts: EventWriter<ProjectileContact>,
    mut overlaps: EventWriter<ProjectileOverlap>,
) {
    for (projectile_entity, projectile, tuning) in projectiles.iter() {
        if !projectile.is_flying() || !projectile.collider_enabled {
            continue;
        }

        let from = projectile.previous_position;
        let to = projectile.position;
        let mut nearest: Option<StepHit> = None;

        for (other, body, collider, category, damageable, holder) in volumes.iter() {
            let category = category.copied().unwrap_or_default();
            let relation = relation_to(projectile.owner, other, holder);
            if decide(CollisionCategory::Projectile, category, relation) == FilterDecision::Ignore {
                continue;
            }

            let overlap = damageable
                .then(|| sweep_sphere(collider, body, from, to, tuning.overlap_radius))
                .flatten();
            let contact = sweep_sphere(collider, body, from, to, tuning.collision_radius);

            let Some(distance) = [overlap, contact]
                .into_iter()
                .flatten()
                .map(|hit| hit.distance)
                .reduce(f32::min)
            else {
                continue;
            };

            if nearest.as_ref().is_none_or(|best| distance < best.distance) {
                nearest = Some(StepHit {
                    other,
                    distance,
                    overlap: overlap.is_some(),
                    contact,
                });
            }
        }

        let Some(hit) = nearest else {
            continue;
        };

        if hit.overlap {
            overlaps.write(ProjectileOverlap {
                projectile: projectile_entity,
                other: hit.other,
            });
        }
        if let Some(contact) = hit.contact {
            contacts.write(ProjectileContact {
                projectile: projectile_entity,
                other: hit.other,
                point: contact.point,
                normal: contact.normal,
            });
        }
    }
}

/// What the resolver needs to know about the other party
pub type ContactOthers<'w, 's> = Query<
    'w,
    's,
    (
        Option<&'static CollisionCategory>,
        Has<Health>,
        Option<&'static WeaponOwner>,
    ),
>;

/// Owner relation: the firer's body, or gear the firer holds
fn relation_to(owner: Entity, other: Entity, other_holder: Option<&WeaponOwner>) -> ContactRelation {
    match other_holder {
        Some(holder) if holder.0 == owner => ContactRelation::Owner,
        _ => ContactRelation::between(owner, other),
    }
}

/// Impact effect, detached trail, collider off for the physics integrator
fn finish_resolution(
    commands: &mut Commands,
    projectile: Entity,
    resolution: Resolution,
    effects: &mut EventWriter<EffectNotification>,
) {
    effects.write(EffectNotification::SpawnImpactEffect(resolution.impact));

    commands
        .entity(projectile)
        .insert(CollisionGroups::new(Group::NONE, Group::NONE));

    if !resolution.trail.points.is_empty() {
        commands.spawn(resolution.trail);
    }
}

/// System: overlap (damage volume) → Damage Arbitration + resolution
///
/// Обрабатывается до contact: damage volume больше физического.
#[allow(clippy::too_many_arguments)]
pub fn resolve_projectile_overlaps(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut overlap_events: EventReader<ProjectileOverlap>,
    mut projectiles: Query<(&mut Projectile, &ProjectileConfig)>,
    others: ContactOthers,
    mut damage_requests: EventWriter<DamageRequest>,
    mut effects: EventWriter<EffectNotification>,
) {
    let now = time.elapsed_secs();

    for overlap in overlap_events.read() {
        let Ok((mut projectile, tuning)) = projectiles.get_mut(overlap.projectile) else {
            continue;
        };
        let Ok((category, damageable, holder)) = others.get(overlap.other) else {
            continue;
        };

        let ctx = ResolutionContext {
            now,
            grace_delay: tuning.grace_delay,
            trail: &config.trail,
            impact: &config.impact,
        };
        let relation = relation_to(projectile.owner, overlap.other, holder);
        let Some(hit) = projectile.on_overlap(category.copied().unwrap_or_default(), relation, damageable, ctx)
        else {
            continue;
        };

        damage_requests.write(DamageRequest {
            attacker: projectile.owner,
            target: overlap.other,
            amount: hit.damage,
            source: DamageSource::Projectile,
        });

        crate::logger::log(&format!(
            "🎯 Projectile {:?} hit {:?} (dmg {})",
            overlap.projectile, overlap.other, hit.damage
        ));

        finish_resolution(&mut commands, overlap.projectile, hit.resolution, &mut effects);
    }
}

/// System: contact (physical volume) → resolution against geometry
pub fn resolve_projectile_contacts(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<CombatConfig>,
    mut contact_events: EventReader<ProjectileContact>,
    mut projectiles: Query<(&mut Projectile, &ProjectileConfig)>,
    others: ContactOthers,
    mut effects: EventWriter<EffectNotification>,
) {
    let now = time.elapsed_secs();

    for contact in contact_events.read() {
        let Ok((mut projectile, tuning)) = projectiles.get_mut(contact.projectile) else {
            continue;
        };
        // Неизвестная entity → Environment (default category)
        let (category, holder) = match others.get(contact.other) {
            Ok((category, _, holder)) => (category.copied().unwrap_or_default(), holder),
            Err(_) => (CollisionCategory::default(), None),
        };

        let ctx = ResolutionContext {
            now,
            grace_delay: tuning.grace_delay,
            trail: &config.trail,
            impact: &config.impact,
        };
        let relation = relation_to(projectile.owner, contact.other, holder);
        let Some(resolution) = projectile.on_collision(category, relation, contact.point, contact.normal, ctx)
        else {
            continue;
        };

        crate::logger::log(&format!(
            "💥 Projectile {:?} resolved against {:?} at {:?}",
            contact.projectile, contact.other, contact.point
        ));

        finish_resolution(&mut commands, contact.projectile, resolution, &mut effects);
    }
}

/// System: grace delay elapsed → despawn
pub fn despawn_resolved_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    projectiles: Query<(Entity, &Projectile)>,
) {
    let now = time.elapsed_secs();

    for (entity, projectile) in projectiles.iter() {
        if projectile.ready_to_destroy(now) {
            commands.entity(entity).despawn();
        }
    }
}

/// System: detached trails fade out and despawn on their own
pub fn fade_trail_handoffs(
    mut commands: Commands,
    time: Res<Time>,
    mut trails: Query<(Entity, &mut TrailHandoff)>,
) {
    let dt = time.delta_secs();

    for (entity, mut trail) in trails.iter_mut() {
        if !trail.tick(dt) {
            commands.entity(entity).despawn();
        }
    }
}
