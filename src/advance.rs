//! The sub-timestep advancer: the entry point tying geometry, event
//! detection, root-finding and contact resolution together over a single
//! outer timestep.
use tracing::{instrument, trace};

use crate::contact::{adjust_to_manifolds, get_first_velocity_zero, process_impact};
use crate::event::{earliest, Event};
use crate::vector::Vector;
use crate::world::{Particle, World};

/// A single free-advance may recurse into at most this many further
/// sub-timesteps before something is almost certainly wrong upstream (an
/// event loop that never consumes `time_left`, or numerically inconsistent
/// geometry).
const MAX_RECURSION_DEPTH: u32 = 10;

/// Advances `particle` by `time_left` under `force_in`, resolving every
/// collision, boundary crossing, and friction-induced velocity zero that
/// occurs strictly inside the interval. Mutates `particle` in place.
#[instrument(level = "trace", skip(world), fields(time_left))]
pub fn advance(particle_index: usize, force_in: Vector, mut time_left: f64, world: &mut World) {
    let mut depth = 0u32;

    while time_left > 0.0 {
        assert!(
            depth <= MAX_RECURSION_DEPTH,
            "advance exceeded {MAX_RECURSION_DEPTH} sub-timestep recursions; \
             an event must be failing to consume time_left"
        );

        let (particle, planes, tolerances) = world.particle_with_context_mut(particle_index);
        let force_eff = adjust_to_manifolds(particle, force_in, planes, tolerances);

        let particle = world.particle(particle_index);
        let event = next_event(particle, force_in, force_eff, world);

        // An event at or beyond the remaining time is not reached this
        // timestep: free-advance the full remainder and stop, without
        // applying it. Only a strictly earlier event is reached and applied.
        let reached_event = event.filter(|e| e.time() < time_left);
        let step = reached_event.as_ref().map_or(time_left, Event::time);

        let integrator = world.integrator;
        let particle = world.particle_mut(particle_index);
        let old_position = particle.position;
        let (new_pos, new_vel) =
            integrator.free_advance(particle.position, particle.velocity, force_eff, step);
        particle.position = new_pos;
        particle.velocity = new_vel;
        time_left -= step;

        if let Some(event) = reached_event {
            apply_event(particle_index, event, world);
        }

        debug_assert!(
            (world.particle(particle_index).position - old_position).length().is_finite(),
            "advance produced a non-finite displacement"
        );

        depth += 1;
        trace!(depth, time_left, "sub-timestep complete");
    }
}

/// The earliest of: a collision with a plane not currently in the manifold
/// set, a boundary crossing out of a plane currently in the manifold set, or
/// friction bringing the particle to rest.
fn next_event(particle: &Particle, force_in: Vector, force_eff: Vector, world: &World) -> Option<Event> {
    let mut earliest_event: Option<Event> = None;

    for (index, plane) in world.planes().iter().enumerate() {
        if particle.is_on_plane(index) {
            continue;
        }
        if let Some(t) = world.integrator.plane_collision_time(
            &particle.position,
            &particle.velocity,
            &force_eff,
            plane,
            &world.tolerances,
        ) {
            let (point, _) = world
                .integrator
                .free_advance(particle.position, particle.velocity, force_eff, t);
            earliest_event = earliest(earliest_event, Some(Event::collision(t, point, index)));
        }
    }

    for &manifold in particle.manifolds() {
        let plane = world.plane(manifold);
        for boundary in &plane.boundaries {
            if let Some(t) = world.integrator.boundary_crossing_time(
                &particle.position,
                &particle.velocity,
                &force_eff,
                boundary,
                &world.tolerances,
            ) {
                let (point, _) = world
                    .integrator
                    .free_advance(particle.position, particle.velocity, force_eff, t);
                earliest_event = earliest(
                    earliest_event,
                    Some(Event::boundary_crossing(t, point, manifold)),
                );
            }
        }
    }

    if let Some(zero) = get_first_velocity_zero(particle, force_eff, force_in, world.planes(), &world.tolerances)
    {
        earliest_event = earliest(earliest_event, Some(zero));
    }

    earliest_event
}

fn apply_event(particle_index: usize, event: Event, world: &mut World) {
    match event {
        Event::Collision { plane, .. } => {
            let tolerances = world.tolerances;
            let collision_plane = world.plane(plane).clone();
            let particle = world.particle_mut(particle_index);
            process_impact(particle, &collision_plane, &tolerances);
            particle.add_manifold(plane);
        }
        Event::BoundaryCrossing { plane, .. } => {
            world.particle_mut(particle_index).remove_manifold(plane);
        }
        Event::ZeroVelocity { .. } => {
            // No state change: the particle has merely stopped moving along some
            // direction; the next loop iteration will re-derive the correct
            // effective force for what remains static.
            trace!("zero-velocity event reached, no manifold change");
        }
    }
}
