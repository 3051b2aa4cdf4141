//! A dimension-polymorphic vector: the world picks 2D or 3D once, at
//! construction, and every [`Vector`] that flows through the core after that
//! is stamped with the matching variant.
use std::ops::{Add, Mul, Neg, Sub};

use glam::{DVec2, DVec3};

/// The dimensionality a [`crate::World`] is built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dimension {
    Two,
    Three,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Vector {
    D2(DVec2),
    D3(DVec3),
}

impl Vector {
    pub fn zero(dimension: Dimension) -> Vector {
        match dimension {
            Dimension::Two => Vector::D2(DVec2::ZERO),
            Dimension::Three => Vector::D3(DVec3::ZERO),
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Vector::D2(_) => Dimension::Two,
            Vector::D3(_) => Dimension::Three,
        }
    }

    /// Panics if `self` and `other` are not the same dimension; every vector that
    /// reaches the core shares the world's dimension, so a mismatch here is a bug.
    fn assert_same_dimension(&self, other: &Vector) {
        debug_assert!(
            self.dimension() == other.dimension(),
            "mixed-dimension vector operation: {self:?} vs {other:?}"
        );
    }

    pub fn dot(&self, other: &Vector) -> f64 {
        self.assert_same_dimension(other);
        match (self, other) {
            (Vector::D2(a), Vector::D2(b)) => a.dot(*b),
            (Vector::D3(a), Vector::D3(b)) => a.dot(*b),
            _ => unreachable!("checked by assert_same_dimension"),
        }
    }

    pub fn length(&self) -> f64 {
        match self {
            Vector::D2(v) => v.length(),
            Vector::D3(v) => v.length(),
        }
    }

    pub fn try_normalize(&self) -> Option<Vector> {
        match self {
            Vector::D2(v) => v.try_normalize().map(Vector::D2),
            Vector::D3(v) => v.try_normalize().map(Vector::D3),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Vector::D2(v) => *v == DVec2::ZERO,
            Vector::D3(v) => *v == DVec3::ZERO,
        }
    }

    pub fn as_dvec2(&self) -> DVec2 {
        match self {
            Vector::D2(v) => *v,
            Vector::D3(_) => panic!("as_dvec2 called on a 3D vector"),
        }
    }

    pub fn as_dvec3(&self) -> DVec3 {
        match self {
            Vector::D3(v) => *v,
            Vector::D2(_) => panic!("as_dvec3 called on a 2D vector"),
        }
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(self, rhs: Vector) -> Vector {
        self.assert_same_dimension(&rhs);
        match (self, rhs) {
            (Vector::D2(a), Vector::D2(b)) => Vector::D2(a + b),
            (Vector::D3(a), Vector::D3(b)) => Vector::D3(a + b),
            _ => unreachable!("checked by assert_same_dimension"),
        }
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        self.assert_same_dimension(&rhs);
        match (self, rhs) {
            (Vector::D2(a), Vector::D2(b)) => Vector::D2(a - b),
            (Vector::D3(a), Vector::D3(b)) => Vector::D3(a - b),
            _ => unreachable!("checked by assert_same_dimension"),
        }
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        match self {
            Vector::D2(v) => Vector::D2(-v),
            Vector::D3(v) => Vector::D3(-v),
        }
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;
    fn mul(self, rhs: f64) -> Vector {
        match self {
            Vector::D2(v) => Vector::D2(v * rhs),
            Vector::D3(v) => Vector::D3(v * rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_and_length_match_glam() {
        let a = Vector::D2(DVec2::new(3.0, 4.0));
        assert_eq!(a.length(), 5.0);
        let b = Vector::D2(DVec2::new(1.0, 0.0));
        assert_eq!(a.dot(&b), 3.0);
    }

    #[test]
    fn try_normalize_handles_zero() {
        let zero = Vector::zero(Dimension::Three);
        assert!(zero.try_normalize().is_none());
    }

    #[test]
    #[should_panic]
    fn mixed_dimension_add_panics_in_debug() {
        let a = Vector::D2(DVec2::ONE);
        let b = Vector::D3(DVec3::ONE);
        let _ = a + b;
    }
}
