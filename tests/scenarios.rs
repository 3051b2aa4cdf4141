//! Table-driven check of the crate's five reference scenarios: a single
//! particle falling onto a horizontal collision plane under gravity plus a
//! constant applied force, with various starting velocities and
//! coefficients of friction, each exercising a different sliding/stopping
//! regime over one ten-second phase.
use glam::DVec2;
use manifold_dynamics::{
    advance, CollisionPlane, Dimension, ForceSource, PhaseSchedule, Particle, Tolerances, Vector,
    World,
};
use manifold_dynamics::Integrator;

fn v(x: f64, y: f64) -> Vector {
    Vector::D2(DVec2::new(x, y))
}

struct NoForce;
impl ForceSource for NoForce {
    fn get_force(&self, _phase: usize, _particle_index: usize) -> Vector {
        Vector::zero(Dimension::Two)
    }
}

struct Scenario {
    start_pos: Vector,
    start_vel: Vector,
    mu: f64,
    applied_force: Vector,
    expected_final: Vector,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            start_pos: v(20.0, 25.0),
            start_vel: v(5.0, 0.0),
            mu: 0.6,
            applied_force: v(0.0, 0.0),
            expected_final: v(25.05076272, 20.0),
        },
        Scenario {
            start_pos: v(20.0, 100.0),
            start_vel: v(-2.0, 0.0),
            mu: 0.3,
            applied_force: v(3.2, 0.0),
            expected_final: v(42.65809114, 20.0),
        },
        Scenario {
            start_pos: v(20.0, 100.0),
            start_vel: v(2.0, 0.0),
            mu: 0.3,
            applied_force: v(2.6, 0.0),
            expected_final: v(49.88235294, 20.0),
        },
        Scenario {
            start_pos: v(20.0, 100.0),
            start_vel: v(30.0, 0.0),
            mu: 0.3,
            applied_force: v(-3.2, 0.0),
            expected_final: v(113.8900041, 20.0),
        },
        Scenario {
            start_pos: v(20.0, 100.0),
            start_vel: v(2.0, 0.0),
            mu: 0.3,
            applied_force: v(4.0, 0.0),
            expected_final: v(117.0, 20.0),
        },
    ]
}

#[test]
fn reference_scenarios_match_expected_final_positions() {
    let gravity = v(0.0, -9.8);

    for (n, scenario) in scenarios().into_iter().enumerate() {
        let mut world = World::new(
            Dimension::Two,
            gravity,
            Tolerances::default(),
            Integrator::QuadraticExact,
            PhaseSchedule {
                num_phases: 1,
                timesteps_per_phase: 1,
                timestep: 10.0,
            },
            Box::new(NoForce),
        );
        world.add_plane(CollisionPlane::new(v(0.0, 1.0), 20.0, scenario.mu, 1e-9).unwrap());
        let particle_index = world.add_particle(Particle::new(scenario.start_pos, scenario.start_vel));

        let force = gravity + scenario.applied_force;
        // Mirrors how the (out-of-scope) outer loop would drive a 10-second
        // phase: one-second timesteps, each a fresh call to `advance`.
        for _ in 0..10 {
            advance(particle_index, force, 1.0, &mut world);
        }

        let final_position = world.particle(particle_index).position.as_dvec2();
        let expected = scenario.expected_final.as_dvec2();
        assert!(
            (final_position.x - expected.x).abs() < 1e-4,
            "scenario {}: x = {}, expected {}",
            n + 1,
            final_position.x,
            expected.x
        );
        assert!(
            (final_position.y - expected.y).abs() < 1e-4,
            "scenario {}: y = {}, expected {}",
            n + 1,
            final_position.y,
            expected.y
        );
    }
}
