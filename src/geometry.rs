//! Oriented half-space planes and the bounded half-space ("boundary")
//! constraints that restrict where on a plane a particle may actually rest.
use tracing::trace;

use crate::error::GeometryError;
use crate::vector::Vector;

/// A half-space on a [`CollisionPlane`]: a particle sliding on the plane stays
/// "on" the plane only where it also satisfies every one of the plane's
/// boundaries.
#[derive(Clone, Debug)]
pub struct Boundary {
    /// A point lying on both the plane and this boundary's edge.
    pub anchor: Vector,
    /// Unit direction, in-plane, such that increasing `u.dot(p - anchor)` moves
    /// away from the boundary's interior.
    pub direction: Vector,
    pub offset: f64,
}

impl Boundary {
    pub fn new(
        anchor: Vector,
        direction: Vector,
        offset: f64,
        plane_normal: &Vector,
        force_epsilon: f64,
    ) -> Result<Boundary, GeometryError> {
        let length = direction.length();
        if (length - 1.0).abs() > force_epsilon {
            return Err(GeometryError::DirectionNotUnit {
                direction,
                length,
                epsilon: force_epsilon,
            });
        }
        let dot = direction.dot(plane_normal);
        if dot.abs() > force_epsilon {
            return Err(GeometryError::DirectionNotInPlane {
                direction,
                dot,
                epsilon: force_epsilon,
            });
        }
        Ok(Boundary {
            anchor,
            direction,
            offset,
        })
    }

    /// A point is inside the boundary iff `u . (p - anchor) - offset <= 0`.
    pub fn contains(&self, p: &Vector) -> bool {
        self.direction.dot(&(*p - self.anchor)) - self.offset <= 0.0
    }
}

/// An oriented plane: `n . p - d = 0`, with `n` a unit outward normal.
#[derive(Clone, Debug)]
pub struct CollisionPlane {
    pub normal: Vector,
    pub offset: f64,
    pub friction: f64,
    pub boundaries: Vec<Boundary>,
}

impl CollisionPlane {
    pub fn new(
        normal: Vector,
        offset: f64,
        friction: f64,
        force_epsilon: f64,
    ) -> Result<CollisionPlane, GeometryError> {
        let length = normal.length();
        if (length - 1.0).abs() > force_epsilon {
            return Err(GeometryError::NormalNotUnit {
                normal,
                length,
                epsilon: force_epsilon,
            });
        }
        if friction < 0.0 {
            return Err(GeometryError::NegativeFriction { mu: friction });
        }
        Ok(CollisionPlane {
            normal,
            offset,
            friction,
            boundaries: Vec::new(),
        })
    }

    pub fn add_boundary(&mut self, boundary: Boundary) {
        self.boundaries.push(boundary);
    }

    /// Signed distance from `p` to the plane; positive on the side the normal
    /// points toward.
    pub fn distance(&self, p: &Vector) -> f64 {
        self.normal.dot(p) - self.offset
    }

    pub fn project_onto(&self, p: &Vector) -> Vector {
        *p - self.normal * self.distance(p)
    }

    /// Whether `p` is on the plane (within `collision_epsilon`) and inside
    /// every one of its boundaries.
    pub fn on_plane(&self, p: &Vector, collision_epsilon: f64) -> bool {
        if self.distance(p).abs() >= collision_epsilon {
            return false;
        }
        let inside = self.boundaries.iter().all(|b| b.contains(p));
        trace!(distance = self.distance(p), inside, "on_plane check");
        inside
    }

    pub fn coefficient_of_friction(&self) -> f64 {
        self.friction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    fn v(x: f64, y: f64) -> Vector {
        Vector::D2(DVec2::new(x, y))
    }

    #[test]
    fn distance_and_projection() {
        let plane = CollisionPlane::new(v(0.0, 1.0), 20.0, 0.5, 1e-9).unwrap();
        assert_eq!(plane.distance(&v(5.0, 25.0)), 5.0);
        let projected = plane.project_onto(&v(5.0, 25.0));
        assert_eq!(projected, v(5.0, 20.0));
    }

    #[test]
    fn rejects_non_unit_normal() {
        let err = CollisionPlane::new(v(0.0, 2.0), 20.0, 0.0, 1e-9).unwrap_err();
        assert!(matches!(err, GeometryError::NormalNotUnit { .. }));
    }

    #[test]
    fn rejects_negative_friction() {
        let err = CollisionPlane::new(v(0.0, 1.0), 20.0, -0.1, 1e-9).unwrap_err();
        assert!(matches!(err, GeometryError::NegativeFriction { .. }));
    }

    #[test]
    fn boundary_bounds_the_plane() {
        let mut plane = CollisionPlane::new(v(0.0, 1.0), 20.0, 0.0, 1e-9).unwrap();
        let boundary =
            Boundary::new(v(35.0, 20.0), v(1.0, 0.0), 0.0, &plane.normal, 1e-9).unwrap();
        plane.add_boundary(boundary);

        assert!(plane.on_plane(&v(0.0, 20.0), 1e-9));
        assert!(!plane.on_plane(&v(40.0, 20.0), 1e-9));
    }

    #[test]
    fn boundary_rejects_non_in_plane_direction() {
        let plane = CollisionPlane::new(v(0.0, 1.0), 20.0, 0.0, 1e-9).unwrap();
        let err = Boundary::new(v(35.0, 20.0), v(0.0, 1.0), 0.0, &plane.normal, 1e-9).unwrap_err();
        assert!(matches!(err, GeometryError::DirectionNotInPlane { .. }));
    }
}
