//! Solves for the earliest positive time at which a particle's trajectory
//! under a constant force crosses a plane or a boundary, under either of the
//! two supported integrator flavors.
use tracing::trace;

use crate::geometry::{Boundary, CollisionPlane};
use crate::vector::Vector;
use crate::world::Tolerances;

/// Linear (symplectic Euler) vs. exact-quadratic free advance and root-finding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Integrator {
    Euler,
    QuadraticExact,
}

impl Integrator {
    /// Advances `(pos, vel)` by `dt` under constant `force`, without checking for events.
    pub fn free_advance(
        &self,
        pos: Vector,
        vel: Vector,
        force: Vector,
        dt: f64,
    ) -> (Vector, Vector) {
        match self {
            Integrator::Euler => {
                let new_pos = pos + vel * dt;
                let new_vel = vel + force * dt;
                (new_pos, new_vel)
            }
            Integrator::QuadraticExact => {
                let new_pos = pos + vel * dt + force * (0.5 * dt * dt);
                let new_vel = vel + force * dt;
                (new_pos, new_vel)
            }
        }
    }

    /// Smallest admissible root `t` of `n.x(t) - offset = 0`.
    ///
    /// When `require_inward` is set (plane collisions), a root only qualifies
    /// if the normal velocity there is non-outward (`n.v(t) <= velocity_epsilon`) —
    /// we are solving for the particle *arriving* at the plane — and `t` must
    /// be strictly positive, per the Event model's `Collision(t > 0, ...)`.
    /// Boundary crossings have neither requirement: the particle is *leaving*
    /// the boundary's half-space, so any admissible non-negative root,
    /// regardless of the velocity's sign there, is the crossing time, per
    /// `BoundaryCrossing(t >= 0, ...)`.
    fn earliest_root(
        &self,
        pos: &Vector,
        vel: &Vector,
        force: &Vector,
        normal: &Vector,
        offset: f64,
        tolerances: &Tolerances,
        require_inward: bool,
    ) -> Option<f64> {
        let collision_epsilon = tolerances.collision_epsilon;
        let velocity_epsilon = tolerances.velocity_epsilon;
        let force_epsilon = tolerances.force_epsilon;

        match self {
            Integrator::Euler => {
                let n_v = normal.dot(vel);
                if require_inward && n_v >= 0.0 {
                    return None;
                }
                if n_v.abs() < velocity_epsilon {
                    return None;
                }
                let n_x = normal.dot(pos);
                let mut t = (offset - n_x) / n_v;
                if t < 0.0 && t > -collision_epsilon {
                    t = 0.0;
                }
                if require_inward {
                    if t > 0.0 {
                        Some(t)
                    } else {
                        None
                    }
                } else if t >= 0.0 {
                    Some(t)
                } else {
                    None
                }
            }
            Integrator::QuadraticExact => {
                let n_f = normal.dot(force);
                let a = 0.5 * n_f;
                let b = normal.dot(vel);
                let c = normal.dot(pos) - offset;

                let candidate_roots: Vec<f64> = if a.abs() < force_epsilon {
                    if b.abs() < velocity_epsilon {
                        Vec::new()
                    } else {
                        vec![-c / b]
                    }
                } else {
                    let discriminant = b * b - 4.0 * a * c;
                    if discriminant < 0.0 {
                        Vec::new()
                    } else {
                        let sqrt_d = discriminant.sqrt();
                        vec![(-b - sqrt_d) / (2.0 * a), (-b + sqrt_d) / (2.0 * a)]
                    }
                };

                let mut best: Option<f64> = None;
                for mut t in candidate_roots {
                    if t < 0.0 && t > -collision_epsilon {
                        t = 0.0;
                    }
                    if t <= -collision_epsilon {
                        continue;
                    }
                    let t = t.max(0.0);
                    // A root at "now" is the particle's current state, not a
                    // future event: Collision requires t > 0, strictly,
                    // unlike BoundaryCrossing's t >= 0.
                    if require_inward && t <= 0.0 {
                        continue;
                    }
                    if require_inward {
                        let n_v_at_t = b + n_f * t;
                        if n_v_at_t > velocity_epsilon {
                            continue;
                        }
                    }
                    if best.is_none() || t < best.unwrap() {
                        best = Some(t);
                    }
                }
                best
            }
        }
    }

    /// First time the particle, currently free of `plane`, would collide with it.
    pub fn plane_collision_time(
        &self,
        pos: &Vector,
        vel: &Vector,
        force: &Vector,
        plane: &CollisionPlane,
        tolerances: &Tolerances,
    ) -> Option<f64> {
        let t = self.earliest_root(
            pos,
            vel,
            force,
            &plane.normal,
            plane.offset,
            tolerances,
            true,
        );
        trace!(?t, "plane_collision_time");
        t
    }

    /// First time a particle already sliding on a plane crosses `boundary`.
    pub fn boundary_crossing_time(
        &self,
        pos: &Vector,
        vel: &Vector,
        force: &Vector,
        boundary: &Boundary,
        tolerances: &Tolerances,
    ) -> Option<f64> {
        let offset = boundary.direction.dot(&boundary.anchor) + boundary.offset;
        let t = self.earliest_root(
            pos,
            vel,
            force,
            &boundary.direction,
            offset,
            tolerances,
            false,
        );
        trace!(?t, "boundary_crossing_time");
        t
    }
}
