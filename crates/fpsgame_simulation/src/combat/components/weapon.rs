//! Weapon fire-control state machine + weapon pose
//!
//! States: Ready ⇄ Reloading. Firing — мгновенное действие внутри Ready.
//! `WeaponState` ничего не знает про ECS: systems передают `now`/`dt`
//! и получают обратно решение (`FireDecision`, `ReloadTick`).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::components::TriggerInput;
use crate::config::{ReloadCurve, WeaponConfig};

/// Trigger semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
pub enum FireMode {
    /// Fires while the trigger is held
    #[default]
    Automatic,
    /// One shot per press
    SemiAutomatic,
}

impl FireMode {
    /// Does this trigger state count as a fire attempt?
    pub fn accepts(self, trigger: TriggerInput) -> bool {
        match (self, trigger) {
            (_, TriggerInput::Released) => false,
            (FireMode::Automatic, _) => true,
            (FireMode::SemiAutomatic, TriggerInput::Pressed) => true,
            (FireMode::SemiAutomatic, TriggerInput::Held) => false,
        }
    }
}

/// Resting state of the fire-control machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaponPhase {
    Ready,
    Reloading,
}

/// Result of a trigger evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// Nothing happened (released, reloading, fire-rate gate, semi-auto hold)
    Idle,
    /// One round spent, spawn a shot
    Fired,
    /// Empty chamber: no shot, reload started instead
    EmptyChamber,
}

/// Reload progress for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReloadTick {
    /// clamp(elapsed / duration, 0, 1)
    pub progress: f32,
    /// FinishReload happened this tick (ammo refilled)
    pub finished: bool,
}

/// Read-only view for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeaponSnapshot {
    pub ammo_current: u32,
    pub ammo_max: u32,
    pub is_reloading: bool,
}

/// Fire-control state of one weapon instance
///
/// Invariants:
/// - `ammo_current ∈ [0, ammo_max]`
/// - ammo changes only via Fire (−1) or FinishReload (→ ammo_max)
/// - `is_reloading` ⇒ no Fire
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
#[require(WeaponPose)]
pub struct WeaponState {
    pub ammo_current: u32,
    pub ammo_max: u32,
    pub fire_mode: FireMode,
    /// Shots per second
    pub fire_rate: f32,
    /// Seconds (simulation clock)
    pub next_fire_allowed_at: f32,
    pub is_reloading: bool,
    pub reload_elapsed: f32,
    pub reload_duration: f32,
    /// Orthogonal toggle, not a state
    pub is_aiming: bool,
}

impl Default for WeaponState {
    fn default() -> Self {
        Self::from_config(&WeaponConfig::default())
    }
}

impl WeaponState {
    pub fn new(ammo_max: u32, fire_rate: f32, reload_duration: f32, fire_mode: FireMode) -> Self {
        Self {
            ammo_current: ammo_max,
            ammo_max,
            fire_mode,
            fire_rate,
            next_fire_allowed_at: 0.0,
            is_reloading: false,
            reload_elapsed: 0.0,
            reload_duration,
            is_aiming: false,
        }
    }

    pub fn from_config(config: &WeaponConfig) -> Self {
        Self::new(
            config.ammo_max,
            config.fire_rate,
            config.reload_duration,
            config.fire_mode,
        )
    }

    pub fn phase(&self) -> WeaponPhase {
        if self.is_reloading {
            WeaponPhase::Reloading
        } else {
            WeaponPhase::Ready
        }
    }

    /// Minimum interval between shots
    pub fn fire_interval(&self) -> f32 {
        1.0 / self.fire_rate
    }

    /// Evaluate the trigger at simulation time `now`.
    ///
    /// An empty magazine redirects to StartReload on any accepted attempt,
    /// the fire-rate gate does not delay the redirect.
    pub fn trigger(&mut self, now: f32, trigger: TriggerInput) -> FireDecision {
        if self.is_reloading || !self.fire_mode.accepts(trigger) {
            return FireDecision::Idle;
        }

        if self.ammo_current == 0 {
            self.start_reload();
            return FireDecision::EmptyChamber;
        }

        if self.fire(now) {
            FireDecision::Fired
        } else {
            FireDecision::Idle
        }
    }

    /// Fire(now): spends one round when every precondition holds.
    pub fn fire(&mut self, now: f32) -> bool {
        if self.is_reloading || self.ammo_current == 0 || now < self.next_fire_allowed_at {
            return false;
        }

        self.ammo_current -= 1;
        self.next_fire_allowed_at = now + self.fire_interval();
        true
    }

    /// StartReload. Returns false (no-op) when already reloading or full.
    pub fn start_reload(&mut self) -> bool {
        if self.is_reloading || self.ammo_current >= self.ammo_max {
            return false;
        }

        self.is_reloading = true;
        self.reload_elapsed = 0.0;
        true
    }

    /// Advance the reload timer; `None` when not reloading.
    pub fn tick_reload(&mut self, dt: f32) -> Option<ReloadTick> {
        if !self.is_reloading {
            return None;
        }

        self.reload_elapsed += dt;
        if self.reload_elapsed >= self.reload_duration {
            // FinishReload
            self.ammo_current = self.ammo_max;
            self.is_reloading = false;
            return Some(ReloadTick {
                progress: 1.0,
                finished: true,
            });
        }

        Some(ReloadTick {
            progress: self.reload_progress(),
            finished: false,
        })
    }

    pub fn reload_progress(&self) -> f32 {
        if !self.is_reloading {
            return 0.0;
        }
        (self.reload_elapsed / self.reload_duration).clamp(0.0, 1.0)
    }

    pub fn toggle_aim(&mut self) {
        self.is_aiming = !self.is_aiming;
    }

    pub fn snapshot(&self) -> WeaponSnapshot {
        WeaponSnapshot {
            ammo_current: self.ammo_current,
            ammo_max: self.ammo_max,
            is_reloading: self.is_reloading,
        }
    }
}

/// Who holds this weapon (combatant entity)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct WeaponOwner(pub Entity);

/// Marker: weapon lost a required collaborator, all weapon systems skip it
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct WeaponDisabled;

/// Weapon pose exposed to the renderer (view-space offsets)
///
/// - `holder_position`: hip ↔ ADS blend
/// - `sway_euler_deg`: mouse-driven sway rotation
/// - `model_offset`/`model_pitch_deg`: reload animation
/// - `kick_offset`: per-shot kick-back on z
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct WeaponPose {
    pub holder_position: Vec3,
    pub sway_euler_deg: Vec3,
    pub model_offset: Vec3,
    pub model_pitch_deg: f32,
    pub kick_offset: f32,
    pub kick_reset_at: Option<f32>,
    /// Snapshotted on StartReload, restored on FinishReload
    pub reload_baseline: Vec3,
    pub reload_baseline_pitch_deg: f32,
    pub reload_animating: bool,
}

impl Default for WeaponPose {
    fn default() -> Self {
        Self {
            holder_position: WeaponConfig::default().hip_offset(),
            sway_euler_deg: Vec3::ZERO,
            model_offset: Vec3::ZERO,
            model_pitch_deg: 0.0,
            kick_offset: 0.0,
            kick_reset_at: None,
            reload_baseline: Vec3::ZERO,
            reload_baseline_pitch_deg: 0.0,
            reload_animating: false,
        }
    }
}

impl WeaponPose {
    pub fn at_hip(config: &WeaponConfig) -> Self {
        Self {
            holder_position: config.hip_offset(),
            ..default()
        }
    }

    /// Continuous approach toward hip or ADS offset
    pub fn blend_aim(&mut self, dt: f32, target: Vec3, ads_speed: f32) {
        let t = (dt * ads_speed).clamp(0.0, 1.0);
        self.holder_position = self.holder_position.lerp(target, t);
    }

    pub fn apply_sway(&mut self, dt: f32, look_delta: Vec2, amount: f32, smoothing: f32) {
        let target = Vec3::new(-look_delta.y, look_delta.x, 0.0) * amount;
        let t = (dt * smoothing).clamp(0.0, 1.0);
        self.sway_euler_deg = self.sway_euler_deg.lerp(target, t);
    }

    pub fn begin_reload(&mut self) {
        self.reload_baseline = self.model_offset;
        self.reload_baseline_pitch_deg = self.model_pitch_deg;
        self.reload_animating = true;
    }

    /// Down-and-back reload offset for curve value `curve_value ∈ [0,1]`
    pub fn apply_reload(&mut self, curve_value: f32, drop: f32, tilt_deg: f32) {
        let c = curve_value.clamp(0.0, 1.0);
        self.model_offset = self.reload_baseline + Vec3::new(0.0, -drop * c, 0.5 * drop * c);
        self.model_pitch_deg = self.reload_baseline_pitch_deg - tilt_deg * c;
    }

    /// Snap back to the baseline even if the curve has not settled
    pub fn finish_reload(&mut self) {
        self.model_offset = self.reload_baseline;
        self.model_pitch_deg = self.reload_baseline_pitch_deg;
        self.reload_animating = false;
    }

    pub fn animate_reload(&mut self, tick: ReloadTick, curve: &ReloadCurve, drop: f32, tilt_deg: f32) {
        if tick.finished {
            self.finish_reload();
        } else {
            self.apply_reload(curve.evaluate(tick.progress), drop, tilt_deg);
        }
    }

    pub fn kick(&mut self, now: f32, distance: f32, duration: f32) {
        self.kick_offset = distance;
        self.kick_reset_at = Some(now + duration);
    }

    pub fn settle_kick(&mut self, now: f32) {
        if matches!(self.kick_reset_at, Some(reset_at) if now >= reset_at) {
            self.kick_offset = 0.0;
            self.kick_reset_at = None;
        }
    }

    /// Final model translation relative to the holder
    pub fn model_translation(&self) -> Vec3 {
        self.model_offset + Vec3::Z * self.kick_offset
    }
}
