//! The three kinds of things that can interrupt a free-advance: a collision
//! with a plane not currently in the manifold set, a boundary crossing that
//! leaves a plane currently in the manifold set, and the velocity along some
//! manifold-imposed direction reaching zero.
use crate::vector::Vector;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum EventRank {
    ZeroVelocity,
    Collision,
    BoundaryCrossing,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The particle would first touch `plane` at time `time`, at `point`.
    Collision {
        time: f64,
        point: Vector,
        plane: usize,
    },
    /// A particle sliding on `plane` reaches one of its boundaries.
    BoundaryCrossing {
        time: f64,
        point: Vector,
        plane: usize,
    },
    /// A particle sliding on some manifold set reaches zero velocity along `direction`.
    ZeroVelocity { time: f64, direction: Vector },
}

impl Event {
    pub fn collision(time: f64, point: Vector, plane: usize) -> Event {
        assert!(time >= 0.0, "Collision requested at negative time {time}");
        Event::Collision { time, point, plane }
    }

    pub fn boundary_crossing(time: f64, point: Vector, plane: usize) -> Event {
        assert!(
            time >= 0.0,
            "BoundaryCrossing requested at negative time {time}"
        );
        Event::BoundaryCrossing { time, point, plane }
    }

    pub fn zero_velocity(time: f64, direction: Vector) -> Event {
        assert!(time >= 0.0, "ZeroVelocity requested at negative time {time}");
        Event::ZeroVelocity { time, direction }
    }

    pub fn time(&self) -> f64 {
        match self {
            Event::Collision { time, .. }
            | Event::BoundaryCrossing { time, .. }
            | Event::ZeroVelocity { time, .. } => *time,
        }
    }

    fn rank(&self) -> EventRank {
        match self {
            Event::ZeroVelocity { .. } => EventRank::ZeroVelocity,
            Event::Collision { .. } => EventRank::Collision,
            Event::BoundaryCrossing { .. } => EventRank::BoundaryCrossing,
        }
    }
}

/// Events are ordered by time; ties are broken by `ZeroVelocity < Collision <
/// BoundaryCrossing`, matching the physical intuition of stopping before
/// re-contact.
fn key(event: &Event) -> (f64, EventRank) {
    (event.time(), event.rank())
}

/// Returns whichever of two candidate events should fire first, per the
/// ordering above. Either argument may be absent.
pub fn earliest(a: Option<Event>, b: Option<Event>) -> Option<Event> {
    match (a, b) {
        (None, None) => None,
        (Some(e), None) | (None, Some(e)) => Some(e),
        (Some(a), Some(b)) => {
            if key(&a).partial_cmp(&key(&b)) == Some(std::cmp::Ordering::Greater) {
                Some(b)
            } else {
                Some(a)
            }
        }
    }
}
