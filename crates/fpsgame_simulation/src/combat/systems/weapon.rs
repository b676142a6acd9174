//! Weapon systems (pose, reload, fire control, hit-scan).

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use rand::Rng;

use crate::combat::{
    cast_ray, decide, CollisionCategory, ContactRelation, DamageRequest, DamageSource, EffectNotification,
    FilterDecision, FireDecision, ImpactDescriptor, Projectile, ProjectileSpawn, RayHit,
    SoundKind, WeaponDisabled, WeaponFired, WeaponOwner, WeaponPose, WeaponState,
};
use crate::components::{CombatInput, Health, LookControl};
use crate::config::{CombatConfig, WeaponConfig};
use crate::error::{CombatError, CombatResult};
use crate::DeterministicRng;

/// Spawn origin + direction after jitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotSpread {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Random jitter, applied once at spawn:
/// - angular: independent yaw/pitch offsets in `[-max_deg, max_deg]`
/// - positional: uniform point in a lateral disc of `radius` around the muzzle
pub fn apply_spread<R: Rng>(rng: &mut R, muzzle: Vec3, aim: Quat, radius: f32, max_deg: f32) -> ShotSpread {
    let max_deg = max_deg.abs();
    let yaw = rng.gen_range(-max_deg..=max_deg).to_radians();
    let pitch = rng.gen_range(-max_deg..=max_deg).to_radians();
    let rotation = aim * Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0);
    let direction = (rotation * Vec3::NEG_Z).normalize();

    // sqrt → равномерно по площади диска
    let angle = rng.gen_range(0.0..std::f32::consts::TAU);
    let distance = radius.abs() * rng.gen::<f32>().sqrt();
    let lateral = aim * Vec3::new(angle.cos(), angle.sin(), 0.0) * distance;

    ShotSpread {
        origin: muzzle + lateral,
        direction,
    }
}

/// System: aim toggle, hip/ADS blend, sway, kick settle
///
/// Пока играет reload анимация, blend и sway заморожены.
pub fn update_weapon_pose(
    time: Res<Time>,
    mut weapons: Query<(&WeaponOwner, &WeaponConfig, &mut WeaponState, &mut WeaponPose), Without<WeaponDisabled>>,
    inputs: Query<&CombatInput>,
) {
    let dt = time.delta_secs();
    let now = time.elapsed_secs();

    for (owner, config, mut state, mut pose) in weapons.iter_mut() {
        // Missing input репортит process_weapon_triggers
        let Ok(input) = inputs.get(owner.0) else {
            continue;
        };

        if input.aim_pressed {
            state.toggle_aim();
        }

        pose.settle_kick(now);

        if pose.reload_animating {
            continue;
        }

        let target = if state.is_aiming {
            config.ads_offset()
        } else {
            config.hip_offset()
        };
        pose.blend_aim(dt, target, config.ads_speed);
        pose.apply_sway(dt, input.look_delta, config.sway_amount, config.sway_smoothing);
    }
}

/// System: reload progress → pose, FinishReload
pub fn tick_reloads(
    time: Res<Time>,
    mut weapons: Query<(Entity, &WeaponConfig, &mut WeaponState, &mut WeaponPose), Without<WeaponDisabled>>,
) {
    let dt = time.delta_secs();

    for (entity, config, mut state, mut pose) in weapons.iter_mut() {
        let Some(tick) = state.tick_reload(dt) else {
            continue;
        };

        pose.animate_reload(tick, &config.reload_curve, config.reload_drop, config.reload_tilt_deg);

        if tick.finished {
            crate::logger::log(&format!(
                "🔄 Weapon {:?} reloaded ({}/{})",
                entity, state.ammo_current, state.ammo_max
            ));
        }
    }
}

/// Collaborators every weapon owner must carry
pub type OwnerCollaborators<'w, 's> = Query<
    'w,
    's,
    (
        Has<Transform>,
        Has<LookControl>,
        Has<CombatInput>,
        Has<Health>,
    ),
>;

/// Fails with the first missing collaborator of the weapon's owner.
pub fn check_collaborators(weapon: Entity, owner: Entity, collaborators: &OwnerCollaborators) -> CombatResult<()> {
    let Ok((transform, look, input, health)) = collaborators.get(owner) else {
        return Err(CombatError::MissingCollaborator {
            weapon,
            collaborator: "owner entity",
        });
    };

    let missing = [
        (transform, "Transform"),
        (look, "LookControl"),
        (input, "CombatInput"),
        (health, "Health"),
    ]
    .into_iter()
    .find_map(|(present, name)| (!present).then_some(name));

    match missing {
        Some(collaborator) => Err(CombatError::MissingCollaborator { weapon, collaborator }),
        None => Ok(()),
    }
}

/// Targets visible to hit-scan
pub type HitScanTargets<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Transform,
        &'static Collider,
        Option<&'static CollisionCategory>,
        Has<Health>,
    ),
>;

/// Nearest non-filtered collider along the ray (ray filtered like a projectile)
pub fn hitscan_nearest(
    origin: Vec3,
    direction: Vec3,
    range: f32,
    shooter: Entity,
    targets: &HitScanTargets,
) -> Option<(Entity, RayHit, bool)> {
    targets
        .iter()
        .filter(|(entity, _, _, category, _)| {
            let category = category.copied().unwrap_or_default();
            decide(
                CollisionCategory::Projectile,
                category,
                ContactRelation::between(shooter, *entity),
            ) == FilterDecision::Resolve
        })
        .filter_map(|(entity, body, collider, _, damageable)| {
            cast_ray(collider, body, origin, direction, range).map(|hit| (entity, hit, damageable))
        })
        .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
}

/// System: trigger → Fire / empty redirect / StartReload
///
/// Отсутствующий коллаборатор у owner → error в лог один раз + WeaponDisabled,
/// симуляция продолжается.
#[allow(clippy::too_many_arguments)]
pub fn process_weapon_triggers(
    mut commands: Commands,
    time: Res<Time>,
    combat_config: Res<CombatConfig>,
    mut rng: ResMut<DeterministicRng>,
    mut weapons: Query<
        (Entity, &WeaponOwner, &WeaponConfig, &mut WeaponState, &mut WeaponPose),
        Without<WeaponDisabled>,
    >,
    collaborators: OwnerCollaborators,
    mut owners: Query<(&Transform, &mut LookControl, &CombatInput, &Health)>,
    targets: HitScanTargets,
    mut fired_events: EventWriter<WeaponFired>,
    mut effects: EventWriter<EffectNotification>,
    mut damage_requests: EventWriter<DamageRequest>,
) {
    let now = time.elapsed_secs();

    for (weapon, owner, config, mut state, mut pose) in weapons.iter_mut() {
        if let Err(err) = check_collaborators(weapon, owner.0, &collaborators) {
            crate::logger::log_error(&format!("❌ {}, weapon disabled", err));
            commands.entity(weapon).insert(WeaponDisabled);
            continue;
        }

        let Ok((transform, mut look, input, health)) = owners.get_mut(owner.0) else {
            continue;
        };

        // Мёртвые не стреляют и не перезаряжаются
        if !health.can_act {
            continue;
        }

        if input.reload_pressed && state.start_reload() {
            pose.begin_reload();
            effects.write(EffectNotification::PlaySound {
                source: weapon,
                kind: SoundKind::Reload,
            });
            crate::logger::log(&format!(
                "🔄 Weapon {:?} reload started ({}/{})",
                weapon, state.ammo_current, state.ammo_max
            ));
        }

        match state.trigger(now, input.trigger()) {
            FireDecision::Idle => {}
            FireDecision::EmptyChamber => {
                pose.begin_reload();
                effects.write(EffectNotification::PlaySound {
                    source: weapon,
                    kind: SoundKind::Empty,
                });
                effects.write(EffectNotification::PlaySound {
                    source: weapon,
                    kind: SoundKind::Reload,
                });
                crate::logger::log(&format!("🔄 Weapon {:?} empty, reload started", weapon));
            }
            FireDecision::Fired => {
                let aim = look.rotation();
                let forward = look.forward();
                let eye = look.eye_position(transform);
                let holder = eye + aim * pose.holder_position;

                pose.kick(now, config.kick_distance, config.kick_duration);
                look.add_recoil_with_factor(config.recoil_amount, state.is_aiming, config.aim_recoil_factor);

                effects.write(EffectNotification::SpawnMuzzleFlash {
                    weapon,
                    position: holder + forward * config.flash_forward_offset,
                    rotation: aim,
                });
                effects.write(EffectNotification::PlaySound {
                    source: weapon,
                    kind: SoundKind::Fire,
                });

                let shot = ShotContext {
                    weapon,
                    shooter: owner.0,
                    config,
                    combat_config: &combat_config,
                };

                let fired = match config.projectile() {
                    Some(_) => spawn_projectile(
                        &mut commands,
                        &mut rng,
                        shot,
                        holder + forward * config.muzzle_forward_offset,
                        aim,
                    ),
                    None => fire_hitscan(
                        shot,
                        eye + forward * config.hitscan_origin_offset,
                        forward,
                        &targets,
                        &mut effects,
                        &mut damage_requests,
                    ),
                };

                crate::logger::log(&format!(
                    "🔫 Weapon {:?} fired ({}/{})",
                    weapon, state.ammo_current, state.ammo_max
                ));
                fired_events.write(fired);
            }
        }
    }
}

/// Per-shot data shared by both resolution strategies
#[derive(Clone, Copy)]
struct ShotContext<'a> {
    weapon: Entity,
    shooter: Entity,
    config: &'a WeaponConfig,
    combat_config: &'a CombatConfig,
}

fn spawn_projectile(
    commands: &mut Commands,
    rng: &mut DeterministicRng,
    shot: ShotContext,
    muzzle: Vec3,
    aim: Quat,
) -> WeaponFired {
    let spread = apply_spread(
        &mut rng.rng,
        muzzle,
        aim,
        shot.config.spawn_jitter_radius,
        shot.config.angular_jitter_deg,
    );

    let projectile = Projectile::spawn(
        ProjectileSpawn::from_config(
            spread.origin,
            spread.direction,
            shot.config.damage,
            shot.shooter,
            &shot.config.projectile,
        ),
        shot.combat_config.trail.time,
    );

    let entity = commands
        .spawn((
            projectile,
            Transform::from_translation(spread.origin)
                .with_rotation(Quat::from_rotation_arc(Vec3::NEG_Z, spread.direction)),
            Collider::ball(shot.config.projectile.collision_radius),
            CollisionCategory::Projectile,
            CollisionCategory::Projectile.collision_groups(),
            shot.config.projectile.clone(),
        ))
        .id();

    WeaponFired {
        weapon: shot.weapon,
        shooter: shot.shooter,
        origin: spread.origin,
        direction: spread.direction,
        projectile: Some(entity),
    }
}

/// Hit-scan fallback: impact + damage request in the same tick
fn fire_hitscan(
    shot: ShotContext,
    origin: Vec3,
    direction: Vec3,
    targets: &HitScanTargets,
    effects: &mut EventWriter<EffectNotification>,
    damage_requests: &mut EventWriter<DamageRequest>,
) -> WeaponFired {
    if let Some((target, hit, damageable)) =
        hitscan_nearest(origin, direction, shot.config.range, shot.shooter, targets)
    {
        effects.write(EffectNotification::SpawnImpactEffect(ImpactDescriptor::new(
            hit.point,
            hit.normal,
            &shot.combat_config.impact,
        )));

        if damageable {
            damage_requests.write(DamageRequest {
                attacker: shot.shooter,
                target,
                amount: shot.config.damage,
                source: DamageSource::HitScan,
            });
        }

        crate::logger::log(&format!(
            "🎯 Hit-scan {:?} → {:?} at {:.2}m",
            shot.shooter, target, hit.distance
        ));
    }

    WeaponFired {
        weapon: shot.weapon,
        shooter: shot.shooter,
        origin,
        direction,
        projectile: None,
    }
}
