//! Damage arbitration
//!
//! Общая точка для projectile overlap и hit-scan: применяет урон к Health,
//! считает intensity для vignette, отдаёт death entry.

use bevy::prelude::*;

use crate::components::Health;

/// Откуда пришёл урон
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Projectile,
    HitScan,
}

/// Событие: запрос на урон (resolver → arbitration)
#[derive(Event, Debug, Clone, Copy)]
pub struct DamageRequest {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: f32,
    pub source: DamageSource,
}

/// Событие: урон нанесен
///
/// Генерируется после применения damage к Health.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub applied: u32,
    /// clamp(amount / reference_damage, 0, 1)
    pub intensity: f32,
    pub health_after: u32,
    pub target_died: bool,
    pub source: DamageSource,
}

/// Событие: entity умер (health == 0)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: entity мертв, ждёт respawn
///
/// Вставляется при death entry, снимается respawn системой.
/// Ровно один на жизнь → ровно один respawn.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Dead {
    /// Время respawn (в секундах симуляции)
    pub respawn_at: f32,
}

/// Результат arbitration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub applied: u32,
    pub intensity: f32,
    pub health_after: u32,
    pub died: bool,
}

/// Normalized feedback intensity
pub fn damage_intensity(amount: f32, reference_damage: f32) -> f32 {
    if reference_damage <= 0.0 {
        return 1.0;
    }
    (amount / reference_damage).clamp(0.0, 1.0)
}

/// ApplyDamage(target, amount)
///
/// `None` when the target is already dead (no-op, no second death entry).
/// Fractional damage is truncated to whole health points (7.6 → 7).
pub fn arbitrate_damage(health: &mut Health, amount: f32, reference_damage: f32) -> Option<DamageOutcome> {
    let points = amount.max(0.0) as u32;
    let change = health.take_damage(points)?;

    Some(DamageOutcome {
        applied: change.before - change.after,
        intensity: damage_intensity(amount, reference_damage),
        health_after: change.after,
        died: change.died,
    })
}
