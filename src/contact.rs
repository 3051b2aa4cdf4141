//! Friction-cone resolution: adjusting a driving force to the particle's
//! current manifold set, resolving plastic impacts, and predicting when
//! sliding friction will bring a particle to rest.
use tracing::{instrument, trace};

use crate::event::Event;
use crate::geometry::CollisionPlane;
use crate::vector::Vector;
use crate::world::{Particle, Tolerances};

struct Decomposition {
    /// Residual force once every positive into-manifold component has been removed.
    tangent_force: Vector,
    normal_force: Vector,
    tangent_velocity: Vector,
    mu_max: f64,
}

/// Shared by `adjust_to_manifolds` (with the friction term) and the
/// velocity-zero clamp (without it): strips every force component pressing
/// into a surviving manifold, accumulating the normal force, the truly
/// tangential velocity, and the largest coefficient of friction seen.
fn decompose(
    force_in: Vector,
    velocity: Vector,
    manifolds: &[usize],
    planes: &[CollisionPlane],
) -> Decomposition {
    let dim = force_in.dimension();
    let mut remaining_force = force_in;
    let mut normal_force = Vector::zero(dim);
    let mut tangent_velocity = Vector::zero(dim);
    let mut remaining_velocity = velocity;
    let mut mu_max = 0.0_f64;

    for &m in manifolds {
        let plane = &planes[m];
        let n = plane.normal;

        let f_n = remaining_force.dot(&n);
        if f_n >= 0.0 {
            // Force is not pressing into this manifold; it does not constrain it.
            continue;
        }
        let normal_component = n * f_n;
        normal_force = normal_force + normal_component;
        remaining_force = remaining_force - normal_component;

        let v_n = remaining_velocity.dot(&n);
        let tangent_component = remaining_velocity - n * v_n;
        tangent_velocity = tangent_velocity + tangent_component;
        remaining_velocity = remaining_velocity - tangent_component;

        mu_max = mu_max.max(plane.coefficient_of_friction());
    }

    Decomposition {
        tangent_force: remaining_force,
        normal_force,
        tangent_velocity,
        mu_max,
    }
}

/// Adjusts `force_in` to the particle's current manifold set, returning the
/// effective force to use for the upcoming free-advance. Mutates `particle`:
/// stale manifolds are purged, penetration and residual into-manifold
/// velocity are corrected, and (in the sticking/sliding branches) velocity is
/// snapped to the sliding plane.
#[instrument(level = "trace", skip(particle, planes, tolerances))]
pub fn adjust_to_manifolds(
    particle: &mut Particle,
    force_in: Vector,
    planes: &[CollisionPlane],
    tolerances: &Tolerances,
) -> Vector {
    // Single pass over the manifolds the particle is *currently* on: correction
    // of position/velocity happens inline, and affects the distance/velocity
    // readings taken by later manifolds in this same pass, then stale manifolds
    // (left, or leaving) are purged once the pass is complete.
    let snapshot: Vec<usize> = particle.manifolds().to_vec();
    let mut stale = Vec::new();
    for &m in &snapshot {
        let plane = &planes[m];
        let d_n = plane.distance(&particle.position);
        let v_n = plane.normal.dot(&particle.velocity);

        if d_n > tolerances.collision_epsilon || v_n > tolerances.velocity_epsilon {
            stale.push(m);
        }
        if d_n < 0.0 {
            assert!(
                -d_n < tolerances.collision_epsilon,
                "penetration {} exceeds collisionEpsilon {}",
                -d_n,
                tolerances.collision_epsilon
            );
            particle.position = plane.project_onto(&particle.position);
        }
        if v_n < 0.0 {
            assert!(
                -v_n < tolerances.velocity_epsilon,
                "velocity {} into manifold normal exceeds velocityEpsilon {}",
                -v_n,
                tolerances.velocity_epsilon
            );
            particle.velocity = particle.velocity - plane.normal * v_n;
        }
    }
    particle.retain_manifolds(|m| !stale.contains(&m));

    if particle.manifolds().is_empty() {
        return force_in;
    }

    let decomposition = decompose(force_in, particle.velocity, particle.manifolds(), planes);
    let tangent_force_magnitude = decomposition.tangent_force.length();
    let normal_force_magnitude = decomposition.normal_force.length();
    let tangent_velocity_magnitude = decomposition.tangent_velocity.length();

    if tangent_velocity_magnitude > tolerances.velocity_epsilon {
        // Sliding: kinetic friction opposes the existing tangent velocity. Velocity
        // itself is left untouched here; only the effective force changes.
        let unit_tangent_velocity = decomposition
            .tangent_velocity
            .try_normalize()
            .expect("tangent velocity magnitude checked above");
        trace!(tangent_force_magnitude, normal_force_magnitude, "sliding");
        return decomposition.tangent_force
            - unit_tangent_velocity * (decomposition.mu_max * normal_force_magnitude);
    }

    // Any residual tangential velocity below epsilon is numerical noise that must
    // be quenched, otherwise the unmodelled opposing static friction would leak energy.
    particle.velocity = Vector::zero(force_in.dimension());

    if tangent_force_magnitude <= decomposition.mu_max * normal_force_magnitude + tolerances.force_epsilon {
        trace!("stuck: within friction cone");
        return Vector::zero(force_in.dimension());
    }

    let unit_tangent_force = decomposition
        .tangent_force
        .try_normalize()
        .expect("tangent force magnitude checked above");
    trace!(tangent_force_magnitude, normal_force_magnitude, "breaking loose");
    decomposition.tangent_force - unit_tangent_force * (decomposition.mu_max * normal_force_magnitude)
}

/// Resolves a plastic, Coulomb-dissipative impact with `plane`. Mutates
/// `particle.velocity`; does not touch the manifold set (the caller adds
/// `plane` to it).
#[instrument(level = "trace", skip(particle, plane, tolerances))]
pub fn process_impact(particle: &mut Particle, plane: &CollisionPlane, tolerances: &Tolerances) {
    let n = plane.normal;
    let v_n_dot = particle.velocity.dot(&n);
    assert!(
        v_n_dot <= 0.0,
        "impact velocity must not point outward: n.v = {v_n_dot}"
    );
    let v_n_magnitude = v_n_dot.abs();
    let normal_velocity = n * v_n_dot;
    let tangent_velocity = particle.velocity - normal_velocity;
    let tangent_magnitude = tangent_velocity.length();
    let mu = plane.coefficient_of_friction();

    if tangent_magnitude < tolerances.velocity_epsilon || tangent_magnitude < mu * v_n_magnitude {
        trace!("impact fully absorbed");
        particle.velocity = Vector::zero(particle.velocity.dimension());
    } else {
        let unit_tangent = tangent_velocity
            .try_normalize()
            .expect("tangent magnitude checked above");
        trace!(tangent_magnitude, v_n_magnitude, "impact partially absorbed");
        particle.velocity = tangent_velocity - unit_tangent * (mu * v_n_magnitude);
    }
}

/// Predicts the time at which friction (possibly acting on a velocity not
/// colinear with the driving force) brings the particle's velocity to zero
/// along some direction, per §4.D.3. `force_eff` is the already-adjusted
/// force for this timestep; `force_in` is the original, unadjusted force.
#[instrument(level = "trace", skip(particle, planes, tolerances))]
pub fn get_first_velocity_zero(
    particle: &Particle,
    force_eff: Vector,
    force_in: Vector,
    planes: &[CollisionPlane],
    tolerances: &Tolerances,
) -> Option<Event> {
    if !particle.is_on_any_manifold() {
        return None;
    }
    if particle.velocity.length() <= tolerances.velocity_epsilon {
        return None;
    }

    let force_diff = (force_eff - force_in).length();
    if force_diff < tolerances.force_epsilon {
        // The manifolds are having no effect at all.
        return None;
    }

    let clamped_force = decompose(force_in, particle.velocity, particle.manifolds(), planes).tangent_force;
    let clamp_diff = (force_eff - clamped_force).length();
    if clamp_diff < tolerances.force_epsilon {
        // Friction has no effect beyond the plain manifold clamp.
        return None;
    }

    let clamped_magnitude = clamped_force.length();
    if clamped_magnitude < tolerances.force_epsilon {
        // No driving force: friction alone decelerates the particle.
        let force_eff_magnitude = force_eff.length();
        assert!(force_eff_magnitude > 0.0, "friction force must be non-zero here");
        let unit_force = force_eff
            .try_normalize()
            .expect("magnitude checked above");
        let vel_dot_force = particle.velocity.dot(&unit_force);
        assert!(
            vel_dot_force < 0.0,
            "expected velocity opposing pure-friction force, got {vel_dot_force}"
        );
        let zero_time = -vel_dot_force / force_eff_magnitude;
        return Some(Event::zero_velocity(zero_time, unit_force));
    }

    let unit_clamped = clamped_force
        .try_normalize()
        .expect("magnitude checked above");
    let v_parallel = unit_clamped * particle.velocity.dot(&unit_clamped);
    let v_orthogonal = particle.velocity - v_parallel;
    let f_parallel = unit_clamped * force_eff.dot(&unit_clamped);
    let f_orthogonal = force_eff - f_parallel;

    let v_orthogonal_magnitude = v_orthogonal.length();
    if v_orthogonal_magnitude > tolerances.velocity_epsilon {
        assert!(
            v_orthogonal.dot(&f_orthogonal) < 0.0,
            "orthogonal friction force expected to oppose orthogonal velocity"
        );
        let f_orthogonal_magnitude = f_orthogonal.length();
        let direction = f_orthogonal
            .try_normalize()
            .expect("orthogonal force magnitude is non-zero: it opposes nonzero orthogonal velocity");
        return Some(Event::zero_velocity(
            v_orthogonal_magnitude / f_orthogonal_magnitude,
            direction,
        ));
    }

    if f_parallel.dot(&v_parallel) < 0.0 {
        let v_parallel_magnitude = v_parallel.length();
        let f_parallel_magnitude = f_parallel.length();
        let direction = f_parallel
            .try_normalize()
            .expect("parallel force magnitude is non-zero: it opposes nonzero parallel velocity");
        return Some(Event::zero_velocity(
            v_parallel_magnitude / f_parallel_magnitude,
            direction,
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::Dimension;
    use glam::DVec2;

    fn v(x: f64, y: f64) -> Vector {
        Vector::D2(DVec2::new(x, y))
    }

    fn horizontal_plane(mu: f64) -> CollisionPlane {
        CollisionPlane::new(v(0.0, 1.0), 20.0, mu, 1e-9).unwrap()
    }

    fn default_tolerances() -> Tolerances {
        Tolerances {
            collision_epsilon: 1e-9,
            velocity_epsilon: 1e-9,
            force_epsilon: 1e-9,
        }
    }

    #[test]
    fn empty_manifold_set_passes_force_through() {
        let mut particle = Particle::new(v(0.0, 25.0), v(0.0, 0.0));
        let planes = [];
        let tolerances = default_tolerances();
        let force = v(1.0, -9.8);
        assert_eq!(
            adjust_to_manifolds(&mut particle, force, &planes, &tolerances),
            force
        );
    }

    #[test]
    fn stuck_within_cone_returns_zero() {
        let plane = horizontal_plane(1.0);
        let planes = [plane];
        let tolerances = default_tolerances();
        let mut particle = Particle::new(v(0.0, 20.0), v(0.0, 0.0));
        particle.add_manifold(0);
        // Small horizontal force well inside the friction cone (mu=1, normal force ~9.8).
        let force = v(1.0, -9.8);
        let effective = adjust_to_manifolds(&mut particle, force, &planes, &tolerances);
        assert_eq!(effective, Vector::zero(Dimension::Two));
        assert_eq!(particle.velocity, Vector::zero(Dimension::Two));
    }

    #[test]
    fn breaking_loose_leaves_excess_force() {
        let plane = horizontal_plane(0.1);
        let planes = [plane];
        let tolerances = default_tolerances();
        let mut particle = Particle::new(v(0.0, 20.0), v(0.0, 0.0));
        particle.add_manifold(0);
        let force = v(5.0, -9.8);
        let effective = adjust_to_manifolds(&mut particle, force, &planes, &tolerances);
        // Friction cone magnitude = 0.1 * 9.8 = 0.98; excess = 5.0 - 0.98 = 4.02
        assert!((effective.as_dvec2().x - 4.02).abs() < 1e-9);
        assert!(effective.as_dvec2().y.abs() < 1e-9);
    }

    #[test]
    fn idempotent_adjust_p4() {
        let plane = horizontal_plane(0.3);
        let planes = [plane];
        let tolerances = default_tolerances();
        let mut particle = Particle::new(v(0.0, 20.0), v(3.0, 0.0));
        particle.add_manifold(0);
        let force = v(0.0, -9.8);
        let first = adjust_to_manifolds(&mut particle, force, &planes, &tolerances);
        let second = adjust_to_manifolds(&mut particle, force, &planes, &tolerances);
        assert_eq!(first, second);
    }

    #[test]
    fn impact_absorbs_velocity_within_cone_p3() {
        let plane = horizontal_plane(1.0);
        let mut particle = Particle::new(v(0.0, 20.0), v(0.1, -5.0));
        let before = particle.velocity.length();
        let tolerances = default_tolerances();
        process_impact(&mut particle, &plane, &tolerances);
        assert!(particle.velocity.length() <= before);
    }

    #[test]
    fn impact_never_increases_speed_when_sliding_p3() {
        let plane = horizontal_plane(0.1);
        let mut particle = Particle::new(v(0.0, 20.0), v(10.0, -5.0));
        let before = particle.velocity.length();
        let tolerances = default_tolerances();
        process_impact(&mut particle, &plane, &tolerances);
        assert!(particle.velocity.length() <= before);
    }
}
