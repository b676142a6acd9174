//! Tests for Projectile lifecycle and resolution latch.

#[cfg(test)]
mod tests {
    use super::super::collision::{CollisionCategory, ContactRelation};
    use super::super::projectile::*;
    use crate::config::{ImpactConfig, TrailConfig};
    use bevy::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn shooter() -> Entity {
        Entity::from_raw(1)
    }

    fn spawn_projectile() -> Projectile {
        Projectile::spawn(
            ProjectileSpawn {
                origin: Vec3::ZERO,
                forward: Vec3::NEG_Z,
                speed: 50.0,
                damage: 10.0,
                max_lifetime: 3.0,
                owner: shooter(),
            },
            0.1,
        )
    }

    fn ctx<'a>(now: f32, trail: &'a TrailConfig, impact: &'a ImpactConfig) -> ResolutionContext<'a> {
        ResolutionContext {
            now,
            grace_delay: 0.1,
            trail,
            impact,
        }
    }

    #[test]
    fn test_spawn_velocity() {
        let projectile = spawn_projectile();
        assert_eq!(projectile.velocity, Vec3::new(0.0, 0.0, -50.0));
        assert!(projectile.is_flying());
        assert!(!projectile.has_resolved);
    }

    #[test]
    fn test_expires_silently_after_lifetime() {
        let mut projectile = spawn_projectile();
        let mut expired_at = None;
        for tick in 0..200 {
            match projectile.tick(DT, 0.2) {
                ProjectileTick::Expired => {
                    expired_at = Some(tick);
                    break;
                }
                ProjectileTick::Flying { .. } => {}
                ProjectileTick::Inactive => panic!("inactive before expiry"),
            }
        }

        let expired_at = expired_at.expect("projectile expired");
        assert!((178..=182).contains(&expired_at), "expired at tick {}", expired_at);
        assert_eq!(projectile.phase, ProjectilePhase::Expired);
        assert!(!projectile.has_resolved);
        assert_eq!(projectile.tick(DT, 0.2), ProjectileTick::Inactive);
    }

    #[test]
    fn test_drift_correction_reasserts_speed() {
        let mut projectile = spawn_projectile();
        projectile.velocity = Vec3::new(0.0, 0.0, -5.0); // 10% скорости

        assert_eq!(projectile.tick(DT, 0.2), ProjectileTick::Flying { drift_corrected: true });
        assert_eq!(projectile.velocity, Vec3::new(0.0, 0.0, -50.0));

        // 30% — выше порога, не трогаем
        projectile.velocity = Vec3::new(0.0, 0.0, -15.0);
        assert_eq!(projectile.tick(DT, 0.2), ProjectileTick::Flying { drift_corrected: false });
        assert_eq!(projectile.velocity, Vec3::new(0.0, 0.0, -15.0));
    }

    #[test]
    fn test_integrate_moves_and_samples_trail() {
        let mut projectile = spawn_projectile();
        let mut now = 0.0;
        for _ in 0..30 {
            now += DT;
            projectile.integrate(DT, 0.0, now);
        }

        assert!((projectile.position.z - -25.0).abs() < 1e-3);
        // Окно 0.1s → ~7 точек
        assert!(projectile.trail.points.len() <= 7);
        assert!(!projectile.trail.points.is_empty());
    }

    #[test]
    fn test_collision_resolves_once() {
        let trail = TrailConfig::default();
        let impact = ImpactConfig::default();
        let mut projectile = spawn_projectile();
        projectile.integrate(DT, 0.0, DT);

        let resolution = projectile
            .on_collision(
                CollisionCategory::Environment,
                ContactRelation::Foreign,
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::Z,
                ctx(1.0, &trail, &impact),
            )
            .expect("wall resolves the projectile");

        assert_eq!(resolution.impact.position, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(resolution.impact.normal, Vec3::Z);
        assert_eq!(resolution.trail.points.len(), 1);
        assert_eq!(resolution.trail.fade_duration, trail.time);

        assert!(projectile.has_resolved);
        assert_eq!(projectile.phase, ProjectilePhase::Resolved);
        assert!(!projectile.visible);
        assert!(!projectile.collider_enabled);
        assert_eq!(projectile.velocity, Vec3::ZERO);
        assert_eq!(projectile.destroy_at, Some(1.1));

        // Второй контакт и overlap в том же тике → no-op
        assert!(projectile
            .on_collision(
                CollisionCategory::Combatant,
                ContactRelation::Foreign,
                Vec3::ZERO,
                Vec3::Y,
                ctx(1.0, &trail, &impact),
            )
            .is_none());
        assert!(projectile
            .on_overlap(CollisionCategory::Combatant, ContactRelation::Foreign, true, ctx(1.0, &trail, &impact))
            .is_none());
        assert_eq!(projectile.destroy_at, Some(1.1));
    }

    #[test]
    fn test_filtered_contacts_leave_projectile_flying() {
        let trail = TrailConfig::default();
        let impact = ImpactConfig::default();
        let mut projectile = spawn_projectile();

        for (category, relation) in [
            (CollisionCategory::Projectile, ContactRelation::Foreign),
            (CollisionCategory::Equipment, ContactRelation::Foreign),
            (CollisionCategory::Combatant, ContactRelation::Owner),
        ] {
            assert!(projectile
                .on_collision(category, relation, Vec3::ZERO, Vec3::Y, ctx(0.0, &trail, &impact))
                .is_none());
            assert!(projectile
                .on_overlap(category, relation, true, ctx(0.0, &trail, &impact))
                .is_none());
        }

        assert!(projectile.is_flying());
        assert!(!projectile.has_resolved);
    }

    #[test]
    fn test_overlap_requires_damageable_target() {
        let trail = TrailConfig::default();
        let impact = ImpactConfig::default();
        let mut projectile = spawn_projectile();

        assert!(projectile
            .on_overlap(CollisionCategory::Environment, ContactRelation::Foreign, false, ctx(0.0, &trail, &impact))
            .is_none());
        assert!(projectile.is_flying());
    }

    #[test]
    fn test_overlap_reports_damage_and_resolves() {
        let trail = TrailConfig::default();
        let impact = ImpactConfig::default();
        let mut projectile = spawn_projectile();
        projectile.position = Vec3::new(0.0, 1.0, -9.0);

        let hit = projectile
            .on_overlap(CollisionCategory::Combatant, ContactRelation::Foreign, true, ctx(0.5, &trail, &impact))
            .expect("target overlap");

        assert_eq!(hit.damage, 10.0);
        assert_eq!(hit.resolution.impact.position, Vec3::new(0.0, 1.0, -9.0));
        assert_eq!(hit.resolution.impact.normal, Vec3::NEG_Z);
        assert!(projectile.has_resolved);
        assert!(!projectile.ready_to_destroy(0.55));
        assert!(projectile.ready_to_destroy(0.6));

        // Уже resolved → collision с геометрией игнорируется
        assert!(projectile
            .on_collision(
                CollisionCategory::Environment,
                ContactRelation::Foreign,
                Vec3::ZERO,
                Vec3::Y,
                ctx(0.5, &trail, &impact),
            )
            .is_none());
    }

    #[test]
    fn test_resolved_projectile_does_not_expire() {
        let trail = TrailConfig::default();
        let impact = ImpactConfig::default();
        let mut projectile = spawn_projectile();
        projectile.on_collision(
            CollisionCategory::Environment,
            ContactRelation::Foreign,
            Vec3::ZERO,
            Vec3::Y,
            ctx(0.0, &trail, &impact),
        );

        projectile.lifetime_remaining = 0.0;
        assert_eq!(projectile.tick(DT, 0.2), ProjectileTick::Inactive);
        assert_eq!(projectile.phase, ProjectilePhase::Resolved);
    }

    #[test]
    fn test_trail_handoff_fades() {
        let mut handoff = TrailHandoff {
            points: vec![Vec3::ZERO, Vec3::Z],
            fade_duration: 0.1,
            remaining: 0.1,
            start_width: 0.05,
            end_width: 0.0,
        };

        assert!(handoff.tick(0.05));
        assert!((handoff.opacity() - 0.5).abs() < 1e-5);
        assert!(!handoff.tick(0.06));
        assert_eq!(handoff.opacity(), 0.0);
    }
}
