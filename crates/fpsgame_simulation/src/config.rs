//! Combat configuration (TOML)
//!
//! Every table is optional: missing keys fall back to the defaults below,
//! which match the tuned values of the shipped rifle.
//!
//! ```toml
//! [weapon]
//! fire_rate = 8.0
//! fire_mode = "SemiAutomatic"
//!
//! [weapon.projectile]
//! speed = 60.0
//!
//! [damage]
//! respawn_delay = 5.0
//! ```

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::combat::FireMode;
use crate::error::{CombatError, CombatResult};

/// Root config resource
#[derive(Resource, Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub weapon: WeaponConfig,
    pub damage: DamageConfig,
    pub trail: TrailConfig,
    pub impact: ImpactConfig,
}

impl CombatConfig {
    pub fn from_toml_str(text: &str) -> CombatResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> CombatResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CombatError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults when the file does not exist; parse errors still surface.
    pub fn load_or_default(path: impl AsRef<Path>) -> CombatResult<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Self::load(path)
        } else {
            crate::logger::log_info(&format!(
                "Combat config {} not found, using defaults",
                path.display()
            ));
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> CombatResult<()> {
        self.weapon.validate()?;
        self.damage.validate()?;
        Ok(())
    }
}

/// How a shot is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShotKind {
    /// Spawn a projectile entity
    #[default]
    Projectile,
    /// Instant line query (fallback when no projectile is configured)
    HitScan,
}

/// Per-weapon tuning (also attached to the weapon entity as a component)
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    pub damage: f32,
    /// Hit-scan range (meters)
    pub range: f32,
    /// Shots per second
    pub fire_rate: f32,
    pub ammo_max: u32,
    /// Seconds
    pub reload_duration: f32,
    pub fire_mode: FireMode,

    /// View kick per shot (degrees)
    pub recoil_amount: f32,
    /// Recoil multiplier while aiming down sights
    pub aim_recoil_factor: f32,

    pub ads_speed: f32,
    pub sway_amount: f32,
    pub sway_smoothing: f32,
    /// View-space holder offsets (forward is -z)
    pub hip_position: [f32; 3],
    pub ads_position: [f32; 3],

    /// How far the model drops during reload (meters)
    pub reload_drop: f32,
    /// Model tilt at the bottom of the reload (degrees)
    pub reload_tilt_deg: f32,
    pub reload_curve: ReloadCurve,

    /// Model kick-back per shot (meters) and time until it snaps back
    pub kick_distance: f32,
    pub kick_duration: f32,

    /// Projectile spawn distance in front of the muzzle
    pub muzzle_forward_offset: f32,
    pub flash_forward_offset: f32,
    /// Lateral disc radius for spawn position jitter
    pub spawn_jitter_radius: f32,
    /// Max angular deviation per axis (degrees)
    pub angular_jitter_deg: f32,
    /// Hit-scan ray starts this far in front of the eye
    pub hitscan_origin_offset: f32,

    pub shot: ShotKind,
    pub projectile: ProjectileConfig,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            damage: 10.0,
            range: 100.0,
            fire_rate: 10.0,
            ammo_max: 30,
            reload_duration: 1.5,
            fire_mode: FireMode::Automatic,

            recoil_amount: 2.0,
            aim_recoil_factor: 0.3,

            ads_speed: 10.0,
            sway_amount: 0.02,
            sway_smoothing: 10.0,
            hip_position: [0.2, -0.2, -0.5],
            ads_position: [0.0, -0.01, -0.15],

            reload_drop: 0.3,
            reload_tilt_deg: 30.0,
            reload_curve: ReloadCurve::default(),

            kick_distance: 0.1,
            kick_duration: 0.1,

            muzzle_forward_offset: 0.3,
            flash_forward_offset: 0.2,
            spawn_jitter_radius: 0.01,
            angular_jitter_deg: 1.0,
            hitscan_origin_offset: 0.5,

            shot: ShotKind::Projectile,
            projectile: ProjectileConfig::default(),
        }
    }
}

impl WeaponConfig {
    /// Same weapon, resolved by line query instead of projectiles
    pub fn hitscan() -> Self {
        Self {
            shot: ShotKind::HitScan,
            ..default()
        }
    }

    /// `None` selects the hit-scan path
    pub fn projectile(&self) -> Option<&ProjectileConfig> {
        match self.shot {
            ShotKind::Projectile => Some(&self.projectile),
            ShotKind::HitScan => None,
        }
    }

    pub fn hip_offset(&self) -> Vec3 {
        Vec3::from_array(self.hip_position)
    }

    pub fn ads_offset(&self) -> Vec3 {
        Vec3::from_array(self.ads_position)
    }

    pub fn validate(&self) -> CombatResult<()> {
        if self.ammo_max == 0 {
            return Err(CombatError::InvalidConfig("weapon.ammo_max must be > 0".into()));
        }
        if self.fire_rate <= 0.0 {
            return Err(CombatError::InvalidConfig("weapon.fire_rate must be > 0".into()));
        }
        if self.reload_duration <= 0.0 {
            return Err(CombatError::InvalidConfig(
                "weapon.reload_duration must be > 0".into(),
            ));
        }
        if self.damage < 0.0 {
            return Err(CombatError::InvalidConfig("weapon.damage must be >= 0".into()));
        }
        self.reload_curve.validate()?;
        if self.shot == ShotKind::Projectile {
            self.projectile.validate()?;
        }
        Ok(())
    }
}

/// Ballistics tuning, also attached to every spawned projectile
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Target constant speed (m/s)
    pub speed: f32,
    /// Seconds before silent expiry
    pub max_lifetime: f32,
    /// Physical collision sphere (stops against geometry)
    pub collision_radius: f32,
    /// Damage sensing sphere, larger than the collision sphere
    pub overlap_radius: f32,
    /// Velocity is re-asserted when it drops below `speed * fraction`
    pub drift_correction_fraction: f32,
    /// Drag applied by the built-in integrator (1/s)
    pub linear_damping: f32,
    /// Survival after resolution before destruction (seconds)
    pub grace_delay: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 50.0,
            max_lifetime: 3.0,
            collision_radius: 0.05,
            overlap_radius: 0.06,
            drift_correction_fraction: 0.2,
            linear_damping: 0.0,
            grace_delay: 0.1,
        }
    }
}

impl ProjectileConfig {
    pub fn validate(&self) -> CombatResult<()> {
        if self.speed <= 0.0 {
            return Err(CombatError::InvalidConfig("projectile.speed must be > 0".into()));
        }
        if self.max_lifetime <= 0.0 {
            return Err(CombatError::InvalidConfig(
                "projectile.max_lifetime must be > 0".into(),
            ));
        }
        if self.overlap_radius < self.collision_radius {
            return Err(CombatError::InvalidConfig(
                "projectile.overlap_radius must not be smaller than collision_radius".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    pub max_health: u32,
    /// Damage that maps to full vignette intensity
    pub reference_damage: f32,
    /// Seconds between death and respawn
    pub respawn_delay: f32,
    /// Used for combatants without their own `SpawnPoint`
    pub spawn_point: [f32; 3],
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            max_health: 100,
            reference_damage: 30.0,
            respawn_delay: 3.0,
            spawn_point: [0.0, 1.0, 0.0],
        }
    }
}

impl DamageConfig {
    pub fn default_spawn_point(&self) -> Vec3 {
        Vec3::from_array(self.spawn_point)
    }

    pub fn validate(&self) -> CombatResult<()> {
        if self.max_health == 0 {
            return Err(CombatError::InvalidConfig("damage.max_health must be > 0".into()));
        }
        if self.reference_damage <= 0.0 {
            return Err(CombatError::InvalidConfig(
                "damage.reference_damage must be > 0".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Sample window while flying, also the hand-off fade duration
    pub time: f32,
    pub start_width: f32,
    pub end_width: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            time: 0.1,
            start_width: 0.05,
            end_width: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub duration: f32,
    pub start_scale: f32,
    pub end_scale: f32,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            duration: 0.3,
            start_scale: 0.1,
            end_scale: 0.05,
        }
    }
}

/// Reload animation curve: keyframes `(t, value)` over `[0,1] → [0,1]`
///
/// Default shape: drop fast (0 → 0.2), hold (0.2 → 0.8), come back (0.8 → 1).
/// Segments are smoothstepped so the weapon eases in and out of each key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReloadCurve {
    pub keys: Vec<(f32, f32)>,
}

impl Default for ReloadCurve {
    fn default() -> Self {
        Self {
            keys: vec![(0.0, 0.0), (0.2, 1.0), (0.8, 1.0), (1.0, 0.0)],
        }
    }
}

impl ReloadCurve {
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        let Some(&(first_t, first_v)) = self.keys.first() else {
            return 0.0;
        };
        if t <= first_t {
            return first_v.clamp(0.0, 1.0);
        }

        for pair in self.keys.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return v1.clamp(0.0, 1.0);
                }
                let u = (t - t0) / span;
                let s = u * u * (3.0 - 2.0 * u);
                return (v0 + (v1 - v0) * s).clamp(0.0, 1.0);
            }
        }

        self.keys
            .last()
            .map(|&(_, v)| v.clamp(0.0, 1.0))
            .unwrap_or(0.0)
    }

    pub fn validate(&self) -> CombatResult<()> {
        if self.keys.len() < 2 {
            return Err(CombatError::InvalidConfig(
                "reload_curve needs at least two keys".into(),
            ));
        }
        let in_range = |x: f32| (0.0..=1.0).contains(&x);
        if !self.keys.iter().all(|&(t, v)| in_range(t) && in_range(v)) {
            return Err(CombatError::InvalidConfig(
                "reload_curve keys must lie in [0,1]".into(),
            ));
        }
        if self.keys.windows(2).any(|pair| pair[1].0 < pair[0].0) {
            return Err(CombatError::InvalidConfig(
                "reload_curve keys must be sorted by time".into(),
            ));
        }
        Ok(())
    }
}
