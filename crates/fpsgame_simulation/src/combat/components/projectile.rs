//! Projectile entity & resolver state
//!
//! Flying → {Resolved, Expired}, terminal states are entered at most once.
//! Две точки входа в Resolved (collision и overlap) закрыты одним латчем
//! `has_resolved`: кто первый обработан, тот и выиграл.

use bevy::prelude::*;
use std::collections::VecDeque;

use super::collision::{decide, CollisionCategory, ContactRelation, FilterDecision};
use crate::config::{ImpactConfig, ProjectileConfig, TrailConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectilePhase {
    Flying,
    /// Hit something; waiting for grace-delay destruction
    Resolved,
    /// Lifetime ran out; removed silently
    Expired,
}

/// Spawn parameters (jitter already applied)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileSpawn {
    pub origin: Vec3,
    /// Normalized
    pub forward: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub max_lifetime: f32,
    pub owner: Entity,
}

impl ProjectileSpawn {
    pub fn from_config(origin: Vec3, forward: Vec3, damage: f32, owner: Entity, config: &ProjectileConfig) -> Self {
        Self {
            origin,
            forward,
            speed: config.speed,
            damage,
            max_lifetime: config.max_lifetime,
            owner,
        }
    }
}

/// Outcome of `Projectile::tick`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileTick {
    Flying { drift_corrected: bool },
    /// Expired this tick
    Expired,
    /// Already terminal
    Inactive,
}

/// Where and how the effects collaborator should draw an impact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactDescriptor {
    pub position: Vec3,
    pub normal: Vec3,
    pub duration: f32,
    pub start_scale: f32,
    pub end_scale: f32,
}

impl ImpactDescriptor {
    pub fn new(position: Vec3, normal: Vec3, config: &ImpactConfig) -> Self {
        Self {
            position,
            normal,
            duration: config.duration,
            start_scale: config.start_scale,
            end_scale: config.end_scale,
        }
    }
}

/// Everything a resolution needs besides the projectile itself
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    pub now: f32,
    pub grace_delay: f32,
    pub trail: &'a TrailConfig,
    pub impact: &'a ImpactConfig,
}

/// Result of a non-filtered collision
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub impact: ImpactDescriptor,
    pub trail: TrailHandoff,
}

/// Result of a non-filtered overlap with a damageable target
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapHit {
    pub damage: f32,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub position: Vec3,
    pub time: f32,
}

/// Time-windowed position samples while flying
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrailSampler {
    pub window: f32,
    pub points: VecDeque<TrailPoint>,
}

impl TrailSampler {
    pub fn new(window: f32) -> Self {
        Self {
            window,
            points: VecDeque::new(),
        }
    }

    pub fn sample(&mut self, now: f32, position: Vec3) {
        self.points.push_back(TrailPoint { position, time: now });
        while let Some(front) = self.points.front() {
            if now - front.time > self.window {
                self.points.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn handoff(&self, config: &TrailConfig) -> TrailHandoff {
        TrailHandoff {
            points: self.points.iter().map(|p| p.position).collect(),
            fade_duration: config.time,
            remaining: config.time,
            start_width: config.start_width,
            end_width: config.end_width,
        }
    }
}

/// Detached trail that fades on its own schedule
///
/// Spawned as its own entity at resolution; has no link back to the projectile.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct TrailHandoff {
    pub points: Vec<Vec3>,
    pub fade_duration: f32,
    pub remaining: f32,
    pub start_width: f32,
    pub end_width: f32,
}

impl TrailHandoff {
    /// Returns false once the fade is over.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining > 0.0
    }

    /// 1 → 0 over the fade
    pub fn opacity(&self) -> f32 {
        if self.fade_duration <= 0.0 {
            return 0.0;
        }
        (self.remaining / self.fade_duration).clamp(0.0, 1.0)
    }
}

/// In-flight projectile
///
/// `position` — авторитетная позиция; `Transform` синхронизируется из неё
/// для рендера.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub position: Vec3,
    /// Position before the last integration step (swept detection)
    pub previous_position: Vec3,
    pub velocity: Vec3,
    /// Fixed at spawn
    pub forward: Vec3,
    pub speed: f32,
    pub damage: f32,
    pub lifetime_remaining: f32,
    pub has_resolved: bool,
    pub owner: Entity,
    pub phase: ProjectilePhase,
    pub visible: bool,
    pub collider_enabled: bool,
    /// Motion frozen (after resolution)
    pub frozen: bool,
    pub destroy_at: Option<f32>,
    pub trail: TrailSampler,
}

impl Projectile {
    pub fn spawn(spawn: ProjectileSpawn, trail_window: f32) -> Self {
        Self {
            position: spawn.origin,
            previous_position: spawn.origin,
            velocity: spawn.forward * spawn.speed,
            forward: spawn.forward,
            speed: spawn.speed,
            damage: spawn.damage,
            lifetime_remaining: spawn.max_lifetime,
            has_resolved: false,
            owner: spawn.owner,
            phase: ProjectilePhase::Flying,
            visible: true,
            collider_enabled: true,
            frozen: false,
            destroy_at: None,
            trail: TrailSampler::new(trail_window),
        }
    }

    pub fn is_flying(&self) -> bool {
        self.phase == ProjectilePhase::Flying
    }

    /// Lifetime countdown, expiry and drift correction
    pub fn tick(&mut self, dt: f32, drift_correction_fraction: f32) -> ProjectileTick {
        if !self.is_flying() {
            return ProjectileTick::Inactive;
        }

        self.lifetime_remaining -= dt;
        if self.lifetime_remaining <= 0.0 && !self.has_resolved {
            self.phase = ProjectilePhase::Expired;
            self.visible = false;
            self.collider_enabled = false;
            self.velocity = Vec3::ZERO;
            return ProjectileTick::Expired;
        }

        // Физика может тормозить снаряд, скорость держим постоянной
        let drift_corrected = self.velocity.length() < self.speed * drift_correction_fraction;
        if drift_corrected {
            self.velocity = self.forward * self.speed;
        }

        ProjectileTick::Flying { drift_corrected }
    }

    /// Built-in motion integrator (linear damping, no gravity)
    pub fn integrate(&mut self, dt: f32, linear_damping: f32, now: f32) {
        if !self.is_flying() || self.frozen {
            return;
        }

        self.previous_position = self.position;
        if linear_damping > 0.0 {
            self.velocity *= 1.0 / (1.0 + dt * linear_damping);
        }
        self.position += self.velocity * dt;
        self.trail.sample(now, self.position);
    }

    /// Collision with the physical volume.
    pub fn on_collision(
        &mut self,
        other: CollisionCategory,
        relation: ContactRelation,
        point: Vec3,
        normal: Vec3,
        ctx: ResolutionContext,
    ) -> Option<Resolution> {
        if self.has_resolved || !self.is_flying() {
            return None;
        }
        if decide(CollisionCategory::Projectile, other, relation) == FilterDecision::Ignore {
            return None;
        }

        let impact = ImpactDescriptor::new(point, normal, ctx.impact);
        let trail = self.resolve(ctx);
        Some(Resolution { impact, trail })
    }

    /// Overlap of the larger damage volume; `damageable` = other has Health.
    pub fn on_overlap(
        &mut self,
        other: CollisionCategory,
        relation: ContactRelation,
        damageable: bool,
        ctx: ResolutionContext,
    ) -> Option<OverlapHit> {
        if self.has_resolved || !self.is_flying() {
            return None;
        }
        if other == CollisionCategory::Projectile || !damageable {
            return None;
        }
        if decide(CollisionCategory::Projectile, other, relation) == FilterDecision::Ignore {
            return None;
        }

        let impact = ImpactDescriptor::new(self.position, self.forward, ctx.impact);
        let damage = self.damage;
        let trail = self.resolve(ctx);
        Some(OverlapHit {
            damage,
            resolution: Resolution { impact, trail },
        })
    }

    /// Shared resolution sequence: latch, trail hand-off, hide, freeze, schedule destroy
    fn resolve(&mut self, ctx: ResolutionContext) -> TrailHandoff {
        self.has_resolved = true;
        self.phase = ProjectilePhase::Resolved;

        let trail = self.trail.handoff(ctx.trail);
        self.trail.points.clear();

        self.visible = false;
        self.collider_enabled = false;
        self.velocity = Vec3::ZERO;
        self.previous_position = self.position;
        self.frozen = true;
        self.destroy_at = Some(ctx.now + ctx.grace_delay);

        trail
    }

    /// Grace delay elapsed?
    pub fn ready_to_destroy(&self, now: f32) -> bool {
        matches!(self.destroy_at, Some(at) if now >= at)
    }
}
