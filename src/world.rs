//! The world: the fixed pool of collision planes, the set of particles, the
//! global numerical tolerances, and the narrow external-interface contract
//! (§6) the core needs from its caller.
use crate::geometry::CollisionPlane;
use crate::rootfinder::Integrator;
use crate::vector::{Dimension, Vector};

/// Absolute numerical tolerances, global to a run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub collision_epsilon: f64,
    pub velocity_epsilon: f64,
    pub force_epsilon: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            collision_epsilon: 1e-9,
            velocity_epsilon: 1e-9,
            force_epsilon: 1e-9,
        }
    }
}

/// A point-mass particle: position, velocity, recorded initial/goal state,
/// and the current manifold set (insertion-ordered indices into the world's
/// plane pool).
#[derive(Clone, Debug)]
pub struct Particle {
    pub position: Vector,
    pub velocity: Vector,
    pub start_position: Vector,
    pub start_velocity: Vector,
    /// Carried for the benefit of the (out-of-scope) controller/evaluator; the
    /// core never reads these.
    pub goal_position: Vector,
    pub goal_velocity: Vector,
    manifolds: Vec<usize>,
}

impl Particle {
    pub fn new(start_position: Vector, start_velocity: Vector) -> Particle {
        let goal_position = start_position;
        let goal_velocity = start_velocity;
        Particle {
            position: start_position,
            velocity: start_velocity,
            start_position,
            start_velocity,
            goal_position,
            goal_velocity,
            manifolds: Vec::new(),
        }
    }

    pub fn with_goal(mut self, goal_position: Vector, goal_velocity: Vector) -> Particle {
        self.goal_position = goal_position;
        self.goal_velocity = goal_velocity;
        self
    }

    /// Resets (position, velocity, manifold set) to the particle's recorded start state.
    pub fn set_to_initial_state(&mut self) {
        self.position = self.start_position;
        self.velocity = self.start_velocity;
        self.manifolds.clear();
    }

    pub fn manifolds(&self) -> &[usize] {
        &self.manifolds
    }

    pub fn is_on_plane(&self, plane: usize) -> bool {
        self.manifolds.contains(&plane)
    }

    pub fn is_on_any_manifold(&self) -> bool {
        !self.manifolds.is_empty()
    }

    pub fn add_manifold(&mut self, plane: usize) {
        if !self.manifolds.contains(&plane) {
            self.manifolds.push(plane);
        }
    }

    pub fn remove_manifold(&mut self, plane: usize) {
        self.manifolds.retain(|&m| m != plane);
    }

    pub(crate) fn retain_manifolds(&mut self, keep: impl Fn(usize) -> bool) {
        self.manifolds.retain(|&m| keep(m));
    }
}

/// Opaque-to-the-core collaborator: resolves the total external force
/// (inclusive of gravity) on a particle during a phase. The core treats the
/// result as constant over the timestep.
pub trait ForceSource {
    fn get_force(&self, phase: usize, particle_index: usize) -> Vector;
}

/// Configuration consumed only by the (out-of-scope) outer phase/timestep
/// loop; the core never reads it, but it is a natural part of a complete
/// world's configuration surface (§6).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSchedule {
    pub num_phases: usize,
    pub timesteps_per_phase: usize,
    pub timestep: f64,
}

pub struct World {
    pub dimension: Dimension,
    pub gravity: Vector,
    pub tolerances: Tolerances,
    pub integrator: Integrator,
    pub schedule: PhaseSchedule,
    planes: Vec<CollisionPlane>,
    particles: Vec<Particle>,
    force_source: Box<dyn ForceSource>,
}

impl World {
    pub fn new(
        dimension: Dimension,
        gravity: Vector,
        tolerances: Tolerances,
        integrator: Integrator,
        schedule: PhaseSchedule,
        force_source: Box<dyn ForceSource>,
    ) -> World {
        World {
            dimension,
            gravity,
            tolerances,
            integrator,
            schedule,
            planes: Vec::new(),
            particles: Vec::new(),
            force_source,
        }
    }

    pub fn add_plane(&mut self, plane: CollisionPlane) -> usize {
        self.planes.push(plane);
        self.planes.len() - 1
    }

    pub fn add_particle(&mut self, particle: Particle) -> usize {
        self.particles.push(particle);
        self.particles.len() - 1
    }

    pub fn planes(&self) -> &[CollisionPlane] {
        &self.planes
    }

    pub fn plane(&self, index: usize) -> &CollisionPlane {
        &self.planes[index]
    }

    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    pub fn particle(&self, index: usize) -> &Particle {
        &self.particles[index]
    }

    pub fn particle_mut(&mut self, index: usize) -> &mut Particle {
        &mut self.particles[index]
    }

    /// Splits the borrow of `self` so a particle can be mutated while its
    /// plane pool and tolerances are read alongside it, as `adjust_to_manifolds`
    /// needs to.
    pub fn particle_with_context_mut(
        &mut self,
        index: usize,
    ) -> (&mut Particle, &[CollisionPlane], &Tolerances) {
        (&mut self.particles[index], &self.planes, &self.tolerances)
    }

    pub fn get_force(&self, phase: usize, particle_index: usize) -> Vector {
        self.force_source.get_force(phase, particle_index)
    }

    /// Resets every particle's (position, velocity, manifold set) to its
    /// recorded start values.
    pub fn set_to_initial_state(&mut self) {
        for p in &mut self.particles {
            p.set_to_initial_state();
        }
    }
}
