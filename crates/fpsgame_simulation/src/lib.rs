//! FPSGame Simulation Core
//!
//! Combat-resolution ядро на Bevy 0.16 (headless, без рендера):
//! fire control, projectiles, collision filter, damage/health.
//!
//! Рендер, звук, UI и physics integrator — внешние коллабораторы,
//! общаются с ядром через события (см. `combat::events`).

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::Collider;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod hud;
pub mod logger;

// Re-export базовых компонентов для удобства
pub use combat::{
    CollisionCategory, CombatPlugin, DamageDealt, Dead, EffectNotification, EntityDied, FireMode,
    Projectile, WeaponOwner, WeaponPose, WeaponState,
};
pub use components::*;
pub use config::{CombatConfig, WeaponConfig};
pub use error::{CombatError, CombatResult};
pub use hud::PlayerHud;
pub use logger::{init_logger, log, log_error, log_info, log_warning};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(CombatPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Каждый `app.update()` (кроме первого, у него delta = 0) продвигает
/// ровно один FixedUpdate тик.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();

    let fixed = Time::<Fixed>::from_hz(60.0);
    let step = fixed.timestep();

    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(fixed) // 60Hz FixedUpdate
        .insert_resource(TimeUpdateStrategy::ManualDuration(step));

    app
}

/// Combatant: body collider, collision groups, spawn point at `position`
pub fn combatant_bundle(position: Vec3, max_health: u32) -> impl Bundle {
    (
        Combatant,
        Health::new(max_health),
        Transform::from_translation(position),
        SpawnPoint { position },
        combat::combatant_collider(),
        CollisionCategory::Combatant,
        CollisionCategory::Combatant.collision_groups(),
    )
}

/// Weapon held by `owner`
pub fn weapon_bundle(owner: Entity, config: WeaponConfig) -> impl Bundle {
    (
        WeaponState::from_config(&config),
        WeaponPose::at_hip(&config),
        WeaponOwner(owner),
        CollisionCategory::Equipment,
        CollisionCategory::Equipment.collision_groups(),
        config,
    )
}

/// Static geometry (walls, floor)
pub fn environment_bundle(position: Vec3, half_extents: Vec3) -> impl Bundle {
    (
        Transform::from_translation(position),
        Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        CollisionCategory::Environment,
        CollisionCategory::Environment.collision_groups(),
    )
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    // Собираем все компоненты в детерминированный формат
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
