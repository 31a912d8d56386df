//! Ground probe result structures.
//!
//! These hold the results of the physics queries the motor issues through
//! its backend. Only the downward ground probe uses them today.

use bevy::prelude::*;

/// Information about a raycast hit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CollisionData {
    /// Distance from the ray origin to the hit point.
    pub distance: f32,
    /// Normal of the surface at the hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Entity that was hit (if the backend knows it).
    pub entity: Option<Entity>,
}

impl CollisionData {
    /// Create a collision result.
    pub fn new(distance: f32, normal: Vec3, point: Vec3, entity: Option<Entity>) -> Self {
        Self {
            distance,
            normal,
            point,
            entity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_data_new() {
        let hit = CollisionData::new(1.2, Vec3::Y, Vec3::new(3.0, 0.0, -1.0), None);

        assert_eq!(hit.distance, 1.2);
        assert_eq!(hit.normal, Vec3::Y);
        assert_eq!(hit.point, Vec3::new(3.0, 0.0, -1.0));
        assert!(hit.entity.is_none());
    }

    #[test]
    fn collision_data_with_entity() {
        let entity = Entity::from_raw(42);
        let hit = CollisionData::new(0.5, Vec3::Y, Vec3::ZERO, Some(entity));

        assert_eq!(hit.entity, Some(entity));
    }
}
