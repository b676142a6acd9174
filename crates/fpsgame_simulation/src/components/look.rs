//! Look control (camera pitch/yaw), the recoil target

use bevy::prelude::*;

/// View orientation of a combatant
///
/// Bevy convention: forward is -Z, positive pitch looks up.
/// The eye sits `eye_height` above the combatant's `Transform`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LookControl {
    pub yaw_deg: f32,
    pub pitch_deg: f32,
    /// Symmetric pitch clamp (degrees)
    pub pitch_limit_deg: f32,
    pub eye_height: f32,
}

impl Default for LookControl {
    fn default() -> Self {
        Self {
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            pitch_limit_deg: 45.0,
            eye_height: 0.6,
        }
    }
}

impl LookControl {
    /// Recoil aiming multiplier (aiming down sights absorbs most of the kick)
    pub const AIM_RECOIL_FACTOR: f32 = 0.3;

    /// AddRecoil: kick the view up by `amount` degrees, damped while aiming.
    pub fn add_recoil(&mut self, amount: f32, is_aiming: bool) {
        self.add_recoil_with_factor(amount, is_aiming, Self::AIM_RECOIL_FACTOR);
    }

    pub fn add_recoil_with_factor(&mut self, amount: f32, is_aiming: bool, aim_factor: f32) {
        let modifier = if is_aiming { aim_factor } else { 1.0 };
        self.pitch_deg = (self.pitch_deg + amount * modifier)
            .clamp(-self.pitch_limit_deg, self.pitch_limit_deg);
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw_deg.to_radians(),
            self.pitch_deg.to_radians(),
            0.0,
        )
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn eye_position(&self, body: &Transform) -> Vec3 {
        body.translation + Vec3::Y * self.eye_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoil_hip_vs_aim() {
        let mut hip = LookControl::default();
        hip.add_recoil(2.0, false);
        assert!((hip.pitch_deg - 2.0).abs() < 1e-6);

        let mut aimed = LookControl::default();
        aimed.add_recoil(2.0, true);
        assert!((aimed.pitch_deg - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_recoil_clamped_to_limit() {
        let mut look = LookControl::default();
        for _ in 0..100 {
            look.add_recoil(2.0, false);
        }
        assert_eq!(look.pitch_deg, 45.0);
    }

    #[test]
    fn test_forward_follows_pitch() {
        let mut look = LookControl::default();
        assert!(look.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));

        look.pitch_deg = 30.0;
        let forward = look.forward();
        assert!(forward.y > 0.0, "positive pitch looks up: {:?}", forward);
        assert!((forward.length() - 1.0).abs() < 1e-5);
    }
}
