//! Tests for WeaponState fire control and WeaponPose.

#[cfg(test)]
mod tests {
    use super::super::weapon::*;
    use crate::components::TriggerInput;
    use crate::config::{ReloadCurve, WeaponConfig};
    use bevy::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn rifle() -> WeaponState {
        WeaponState::new(30, 10.0, 1.5, FireMode::Automatic)
    }

    #[test]
    fn test_automatic_hold_fires_ten_shots_in_1_05s() {
        let mut weapon = rifle();
        let mut now = 0.0_f32;
        let mut shots = 0;
        let mut last_fire = 0.0_f32;

        // 1.05s при 60Hz = 63 тика
        for tick in 0..63 {
            let trigger = if tick == 0 { TriggerInput::Pressed } else { TriggerInput::Held };
            if weapon.trigger(now, trigger) == FireDecision::Fired {
                shots += 1;
                last_fire = now;
            }
            now += DT;
        }

        assert_eq!(shots, 10);
        assert_eq!(weapon.ammo_current, 20);
        assert!(
            (weapon.next_fire_allowed_at - (last_fire + 0.1)).abs() < 1e-4,
            "next_fire_allowed_at = {}, last_fire = {}",
            weapon.next_fire_allowed_at,
            last_fire
        );
    }

    #[test]
    fn test_semi_automatic_ignores_held_trigger() {
        let mut weapon = WeaponState::new(30, 10.0, 1.5, FireMode::SemiAutomatic);

        assert_eq!(weapon.trigger(0.0, TriggerInput::Pressed), FireDecision::Fired);
        // Держим кнопку секунду → ни одного выстрела
        for tick in 1..60 {
            assert_eq!(weapon.trigger(tick as f32 * DT, TriggerInput::Held), FireDecision::Idle);
        }
        assert_eq!(weapon.ammo_current, 29);

        assert_eq!(weapon.trigger(1.0, TriggerInput::Pressed), FireDecision::Fired);
        assert_eq!(weapon.ammo_current, 28);
    }

    #[test]
    fn test_fire_rate_gate_applies_to_presses() {
        let mut weapon = WeaponState::new(30, 10.0, 1.5, FireMode::SemiAutomatic);
        assert_eq!(weapon.trigger(0.0, TriggerInput::Pressed), FireDecision::Fired);
        assert_eq!(weapon.trigger(0.05, TriggerInput::Pressed), FireDecision::Idle);
        assert_eq!(weapon.trigger(0.1, TriggerInput::Pressed), FireDecision::Fired);
    }

    #[test]
    fn test_released_trigger_never_fires() {
        let mut weapon = rifle();
        assert_eq!(weapon.trigger(0.0, TriggerInput::Released), FireDecision::Idle);
        assert_eq!(weapon.ammo_current, 30);
    }

    #[test]
    fn test_empty_trigger_starts_reload_and_refills() {
        let mut weapon = rifle();
        weapon.ammo_current = 0;

        let decision = weapon.trigger(0.0, TriggerInput::Pressed);
        assert_eq!(decision, FireDecision::EmptyChamber);
        assert_eq!(weapon.ammo_current, 0);
        assert!(weapon.is_reloading);
        assert_eq!(weapon.phase(), WeaponPhase::Reloading);

        let mut ticks = 0;
        let mut finished = false;
        while ticks < 120 {
            ticks += 1;
            let tick = weapon.tick_reload(DT).expect("reloading");
            assert!((0.0..=1.0).contains(&tick.progress));
            if tick.finished {
                finished = true;
                break;
            }
            // Во время перезарядки ammo не меняется
            assert_eq!(weapon.ammo_current, 0);
        }

        assert!(finished);
        assert!((90..=91).contains(&ticks), "reload took {} ticks", ticks);
        assert_eq!(weapon.ammo_current, 30);
        assert!(!weapon.is_reloading);
        assert!(weapon.tick_reload(DT).is_none());
    }

    #[test]
    fn test_fire_while_reloading_is_noop() {
        let mut weapon = rifle();
        weapon.ammo_current = 12;
        assert!(weapon.start_reload());

        for tick in 0..30 {
            let now = tick as f32 * DT;
            assert_eq!(weapon.trigger(now, TriggerInput::Pressed), FireDecision::Idle);
            assert!(!weapon.fire(now));
        }
        assert_eq!(weapon.ammo_current, 12);
    }

    #[test]
    fn test_start_reload_preconditions() {
        let mut weapon = rifle();
        // Полный магазин → no-op
        assert!(!weapon.start_reload());
        assert!(!weapon.is_reloading);

        weapon.ammo_current = 10;
        assert!(weapon.start_reload());
        weapon.tick_reload(0.5);
        // Повторный reload → no-op, таймер не сбрасывается
        assert!(!weapon.start_reload());
        assert!((weapon.reload_elapsed - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ammo_stays_in_range_over_long_fire() {
        let mut weapon = rifle();
        let mut now = 0.0_f32;
        for _ in 0..1200 {
            weapon.trigger(now, TriggerInput::Held);
            weapon.tick_reload(DT);
            assert!(weapon.ammo_current <= weapon.ammo_max);
            now += DT;
        }
    }

    #[test]
    fn test_aim_toggle_and_snapshot() {
        let mut weapon = rifle();
        weapon.toggle_aim();
        assert!(weapon.is_aiming);
        weapon.toggle_aim();
        assert!(!weapon.is_aiming);

        weapon.ammo_current = 7;
        weapon.start_reload();
        let snapshot = weapon.snapshot();
        assert_eq!(snapshot.ammo_current, 7);
        assert_eq!(snapshot.ammo_max, 30);
        assert!(snapshot.is_reloading);
    }

    #[test]
    fn test_pose_blends_toward_ads() {
        let config = WeaponConfig::default();
        let mut pose = WeaponPose::at_hip(&config);

        for _ in 0..120 {
            pose.blend_aim(DT, config.ads_offset(), config.ads_speed);
        }
        assert!(pose.holder_position.abs_diff_eq(config.ads_offset(), 1e-3));
    }

    #[test]
    fn test_pose_reload_returns_to_baseline() {
        let mut pose = WeaponPose::default();
        pose.model_offset = Vec3::new(0.0, 0.01, 0.0);
        pose.begin_reload();

        let curve = ReloadCurve::default();
        pose.animate_reload(ReloadTick { progress: 0.5, finished: false }, &curve, 0.3, 30.0);
        assert!((pose.model_offset.y - (0.01 - 0.3)).abs() < 1e-5);
        assert!((pose.model_pitch_deg + 30.0).abs() < 1e-5);

        pose.animate_reload(ReloadTick { progress: 1.0, finished: true }, &curve, 0.3, 30.0);
        assert_eq!(pose.model_offset, Vec3::new(0.0, 0.01, 0.0));
        assert_eq!(pose.model_pitch_deg, 0.0);
        assert!(!pose.reload_animating);
    }

    #[test]
    fn test_pose_kick_settles() {
        let mut pose = WeaponPose::default();
        pose.kick(1.0, 0.1, 0.1);
        assert!((pose.model_translation().z - 0.1).abs() < 1e-6);

        pose.settle_kick(1.05);
        assert_eq!(pose.kick_offset, 0.1);
        pose.settle_kick(1.1);
        assert_eq!(pose.kick_offset, 0.0);
        assert!(pose.kick_reset_at.is_none());
    }
}
