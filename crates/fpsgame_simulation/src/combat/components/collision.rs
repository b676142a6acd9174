//! Collision categories, filter table and collider queries
//!
//! Категории совпадают с rapier `Group` битами, чтобы внешний physics
//! integrator фильтровал контакты так же, как `decide` ниже.
//! Геометрия: rapier `Collider` + его point/ray queries (без RapierContext,
//! работает в headless App без physics plugin).

use bevy::prelude::*;
use bevy_rapier3d::prelude::{Collider, CollisionGroups, Group};

/// Physical category of an entity
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
#[reflect(Component)]
pub enum CollisionCategory {
    /// Player or dummy body (damageable when it has `Health`)
    Combatant,
    /// Walls, floor, props
    #[default]
    Environment,
    Projectile,
    /// Weapon models and other held gear
    Equipment,
}

impl CollisionCategory {
    pub const ALL: [CollisionCategory; 4] = [
        CollisionCategory::Combatant,
        CollisionCategory::Environment,
        CollisionCategory::Projectile,
        CollisionCategory::Equipment,
    ];

    /// Rapier membership bit
    pub fn group(self) -> Group {
        match self {
            CollisionCategory::Combatant => Group::GROUP_2,
            CollisionCategory::Environment => Group::GROUP_3,
            CollisionCategory::Projectile => Group::GROUP_4,
            CollisionCategory::Equipment => Group::GROUP_5,
        }
    }

    /// Categories this one may resolve against (ownership not considered)
    pub fn filter(self) -> Group {
        Self::ALL
            .into_iter()
            .filter(|other| decide(self, *other, ContactRelation::Foreign) == FilterDecision::Resolve)
            .fold(Group::NONE, |acc, other| acc | other.group())
    }

    pub fn collision_groups(self) -> CollisionGroups {
        CollisionGroups::new(self.group(), self.filter())
    }
}

/// Outcome of a filter table lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Resolve,
    Ignore,
}

/// Does the other party belong to whoever fired the projectile?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactRelation {
    Foreign,
    /// The firer's own body or gear
    Owner,
}

impl ContactRelation {
    pub fn between(owner: Entity, other: Entity) -> Self {
        if owner == other {
            ContactRelation::Owner
        } else {
            ContactRelation::Foreign
        }
    }
}

/// Filter table: unordered category pair (+ ownership) → resolve/ignore
///
/// Ignored:
/// - projectile ↔ projectile
/// - projectile ↔ equipment
/// - projectile ↔ anything owned by the firer
pub fn decide(a: CollisionCategory, b: CollisionCategory, relation: ContactRelation) -> FilterDecision {
    use CollisionCategory::*;

    let involves_projectile = a == Projectile || b == Projectile;
    if !involves_projectile {
        return FilterDecision::Resolve;
    }

    let other = if a == Projectile { b } else { a };
    match (other, relation) {
        (Projectile, _) | (Equipment, _) => FilterDecision::Ignore,
        (_, ContactRelation::Owner) => FilterDecision::Ignore,
        _ => FilterDecision::Resolve,
    }
}

/// First touch of a moving sphere along its step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// Distance along the step (0 = already touching at the start)
    pub distance: f32,
    pub point: Vec3,
    /// Outward surface normal
    pub normal: Vec3,
}

/// Ray hit against a collider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Vec3,
    pub normal: Vec3,
}

/// Standing combatant body
pub fn combatant_collider() -> Collider {
    Collider::cuboid(0.4, 0.9, 0.4)
}

/// Sphere of `radius` moved `from → to` this step against `collider`.
///
/// Order: touching at `from`, then the step segment (catches thin walls at
/// high speed), then resting contact at `to`. Scale is not applied.
pub fn sweep_sphere(collider: &Collider, body: &Transform, from: Vec3, to: Vec3, radius: f32) -> Option<SweepHit> {
    let (translation, rotation) = (body.translation, body.rotation);

    if let Some(hit) = resting_contact(collider, body, from, radius) {
        return Some(hit);
    }

    let step = to - from;
    let length = step.length();
    if let Some(direction) = step.try_normalize() {
        if let Some(hit) = collider.cast_ray_and_get_normal(translation, rotation, from, direction, length, true) {
            return Some(SweepHit {
                distance: hit.time_of_impact,
                point: hit.point,
                normal: hit.normal.try_normalize().unwrap_or(-direction),
            });
        }
    }

    resting_contact(collider, body, to, radius).map(|hit| SweepHit { distance: length, ..hit })
}

fn resting_contact(collider: &Collider, body: &Transform, center: Vec3, radius: f32) -> Option<SweepHit> {
    let (translation, rotation) = (body.translation, body.rotation);
    let projection = collider.project_point(translation, rotation, center, false);
    let offset = center - projection.point;

    if projection.is_inside {
        // Центр внутри → нормаль к ближайшей грани наружу
        let normal = (-offset)
            .try_normalize()
            .or_else(|| (center - translation).try_normalize())
            .unwrap_or(Vec3::Y);
        return Some(SweepHit {
            distance: 0.0,
            point: projection.point,
            normal,
        });
    }

    if offset.length_squared() > radius * radius {
        return None;
    }

    Some(SweepHit {
        distance: 0.0,
        point: projection.point,
        normal: offset.try_normalize().unwrap_or(Vec3::Y),
    })
}

/// `direction` must be normalized.
pub fn cast_ray(collider: &Collider, body: &Transform, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
    collider
        .cast_ray_and_get_normal(body.translation, body.rotation, origin, direction, max_distance, true)
        .map(|hit| RayHit {
            distance: hit.time_of_impact,
            point: hit.point,
            // Луч стартовал внутри: нормаль ненадёжна
            normal: hit.normal.try_normalize().unwrap_or(-direction),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_ignored_pairs() {
        use CollisionCategory::*;

        assert_eq!(decide(Projectile, Projectile, ContactRelation::Foreign), FilterDecision::Ignore);
        assert_eq!(decide(Projectile, Equipment, ContactRelation::Foreign), FilterDecision::Ignore);
        assert_eq!(decide(Equipment, Projectile, ContactRelation::Foreign), FilterDecision::Ignore);
        assert_eq!(decide(Projectile, Combatant, ContactRelation::Owner), FilterDecision::Ignore);
        assert_eq!(decide(Combatant, Projectile, ContactRelation::Owner), FilterDecision::Ignore);
    }

    #[test]
    fn test_other_pairs_resolve() {
        use CollisionCategory::*;

        assert_eq!(decide(Projectile, Combatant, ContactRelation::Foreign), FilterDecision::Resolve);
        assert_eq!(decide(Projectile, Environment, ContactRelation::Foreign), FilterDecision::Resolve);
        assert_eq!(decide(Combatant, Environment, ContactRelation::Foreign), FilterDecision::Resolve);
        assert_eq!(decide(Combatant, Equipment, ContactRelation::Owner), FilterDecision::Resolve);
    }

    #[test]
    fn test_table_is_symmetric() {
        for a in CollisionCategory::ALL {
            for b in CollisionCategory::ALL {
                for relation in [ContactRelation::Foreign, ContactRelation::Owner] {
                    assert_eq!(decide(a, b, relation), decide(b, a, relation), "{:?} {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_rapier_groups_match_table() {
        let projectile = CollisionCategory::Projectile.collision_groups();
        assert_eq!(projectile.memberships, Group::GROUP_4);
        assert!(projectile.filters.contains(Group::GROUP_2));
        assert!(projectile.filters.contains(Group::GROUP_3));
        assert!(!projectile.filters.contains(Group::GROUP_4));
        assert!(!projectile.filters.contains(Group::GROUP_5));

        let combatant = CollisionCategory::Combatant.collision_groups();
        assert!(combatant.filters.contains(Group::GROUP_4));
    }

    fn wall(z: f32, half_depth: f32) -> (Collider, Transform) {
        (
            Collider::cuboid(5.0, 5.0, half_depth),
            Transform::from_xyz(0.0, 0.0, z),
        )
    }

    #[test]
    fn test_resting_sphere_touches_wall() {
        let (collider, body) = wall(-10.0, 0.5);

        // Грань стены на z = -9.5
        let at = Vec3::new(0.0, 1.0, -9.46);
        let hit = sweep_sphere(&collider, &body, at, at, 0.05).expect("touching the wall");
        assert_eq!(hit.distance, 0.0);
        assert!((hit.point.z - -9.5).abs() < 1e-4);
        assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-4));

        let away = Vec3::new(0.0, 1.0, -9.0);
        assert!(sweep_sphere(&collider, &body, away, away, 0.05).is_none());
    }

    #[test]
    fn test_sweep_catches_tunneling() {
        let (collider, body) = wall(-10.0, 0.1);

        // Шаг 0.83m перепрыгивает стену толщиной 0.2m
        let from = Vec3::new(0.0, 0.0, -9.5);
        let to = Vec3::new(0.0, 0.0, -10.33);
        assert!(sweep_sphere(&collider, &body, to, to, 0.05).is_none());

        let hit = sweep_sphere(&collider, &body, from, to, 0.05).expect("step crosses the wall");
        assert!((hit.distance - 0.4).abs() < 1e-4);
        assert!((hit.point.z - -9.9).abs() < 1e-4);
        assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-4));
    }

    #[test]
    fn test_sweep_distance_orders_volumes() {
        // Стена ближе манекена на том же шаге
        let (wall_collider, wall_body) = wall(-9.4, 0.05);
        let dummy = combatant_collider();
        let dummy_body = Transform::from_xyz(0.0, 1.0, -10.0);

        let from = Vec3::new(0.0, 1.0, -9.0);
        let to = Vec3::new(0.0, 1.0, -9.83);
        let wall_hit = sweep_sphere(&wall_collider, &wall_body, from, to, 0.05).expect("wall");
        let dummy_hit = sweep_sphere(&dummy, &dummy_body, from, to, 0.06).expect("dummy");

        assert!(wall_hit.distance < dummy_hit.distance);
    }

    #[test]
    fn test_ray_cast_nearest_face() {
        let target = combatant_collider();
        let body = Transform::from_xyz(0.0, 1.0, -10.0);

        let hit = cast_ray(&target, &body, Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, 100.0)
            .expect("ray hits the target");
        assert!((hit.distance - 9.6).abs() < 1e-4);
        assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-4));

        assert!(cast_ray(&target, &body, Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, 5.0).is_none());
        assert!(cast_ray(&target, &body, Vec3::new(0.0, 1.0, 0.0), Vec3::Z, 100.0).is_none());
    }

    #[test]
    fn test_ray_cast_respects_rotation() {
        // Тонкая по X стена, повёрнутая на 90° вокруг Y → тонкая по Z
        let collider = Collider::cuboid(0.1, 5.0, 5.0);
        let body = Transform::from_xyz(0.0, 0.0, -10.0)
            .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2));

        let hit = cast_ray(&collider, &body, Vec3::ZERO, Vec3::NEG_Z, 100.0).expect("rotated wall");
        assert!((hit.distance - 9.9).abs() < 1e-3);
        assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-3));
    }

    #[test]
    fn test_ray_cast_ball() {
        let ball = Collider::ball(1.0);
        let hit = cast_ray(&ball, &Transform::from_xyz(0.0, 0.0, -5.0), Vec3::ZERO, Vec3::NEG_Z, 100.0)
            .expect("ray hits the ball");
        assert!((hit.distance - 4.0).abs() < 1e-4);
        assert!(hit.normal.abs_diff_eq(Vec3::Z, 1e-4));
    }
}
