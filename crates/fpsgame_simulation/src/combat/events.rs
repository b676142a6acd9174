//! Combat events: physics → resolver, core → effects/UI collaborator

use bevy::prelude::*;

use super::components::ImpactDescriptor;

/// Kind of sound for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKind {
    Fire,
    Reload,
    Empty,
}

/// Fire-and-forget notification for effects/audio/UI
///
/// Ядро ничего не ждёт в ответ, коллаборатор сам решает что рисовать.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum EffectNotification {
    /// Shooter's crosshair hit marker (damage confirmed)
    ShowHitMarker { shooter: Entity },
    /// Damage vignette, `intensity ∈ [0,1]`
    ShowDamageVignette { target: Entity, intensity: f32 },
    SpawnImpactEffect(ImpactDescriptor),
    SpawnMuzzleFlash {
        weapon: Entity,
        position: Vec3,
        rotation: Quat,
    },
    PlaySound { source: Entity, kind: SoundKind },
}

/// Событие: contact физического объёма снаряда (point + normal)
///
/// Пишется встроенной detection системой или внешним physics integrator.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileContact {
    pub projectile: Entity,
    pub other: Entity,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Событие: damage sensing volume снаряда пересёк entity
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectileOverlap {
    pub projectile: Entity,
    pub other: Entity,
}

/// Событие: выстрел произведён
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct WeaponFired {
    pub weapon: Entity,
    pub shooter: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
    /// `None` for hit-scan shots
    pub projectile: Option<Entity>,
}
