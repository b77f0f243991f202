//! Gauss quadrature rules on reference elements.
//!
//! Reference domains: `[-1, 1]` for lines, `[-1, 1]^2` for quadrilaterals,
//! and the unit triangle `{ξ, η ≥ 0, ξ + η ≤ 1}` for triangles. Points are
//! stored as `[ξ, η]`; line rules leave `η = 0`.

use seam_core::{ElemType, Order};

/// A set of reference points with weights.
#[derive(Clone, Debug, PartialEq)]
pub struct QuadratureRule {
    points: Vec<[f64; 2]>,
    weights: Vec<f64>,
}

impl QuadratureRule {
    /// Gauss–Legendre rule on `[-1, 1]` exact for polynomials of `order`.
    pub fn gauss_line(order: Order) -> Self {
        let n = usize::from(order.degree()) / 2 + 1;
        let (points, weights): (Vec<f64>, Vec<f64>) = match n {
            1 => (vec![0.0], vec![2.0]),
            2 => {
                let a = 1.0 / 3.0_f64.sqrt();
                (vec![-a, a], vec![1.0, 1.0])
            }
            _ => {
                let a = (3.0_f64 / 5.0).sqrt();
                (vec![-a, 0.0, a], vec![5.0 / 9.0, 8.0 / 9.0, 5.0 / 9.0])
            }
        };
        Self {
            points: points.into_iter().map(|x| [x, 0.0]).collect(),
            weights,
        }
    }

    /// Tensor-product Gauss rule on `[-1, 1]^2`.
    pub fn gauss_quad(order: Order) -> Self {
        let line = Self::gauss_line(order);
        let mut points = Vec::with_capacity(line.len() * line.len());
        let mut weights = Vec::with_capacity(line.len() * line.len());
        for (j, eta) in line.points.iter().enumerate() {
            for (i, xi) in line.points.iter().enumerate() {
                points.push([xi[0], eta[0]]);
                weights.push(line.weights[i] * line.weights[j]);
            }
        }
        Self { points, weights }
    }

    /// Symmetric rule on the unit triangle.
    ///
    /// One point for first order, three for second, Dunavant's six-point
    /// rule up to fourth and seven-point rule for fifth.
    pub fn gauss_tri(order: Order) -> Self {
        match order {
            Order::First => Self {
                points: vec![[1.0 / 3.0, 1.0 / 3.0]],
                weights: vec![0.5],
            },
            Order::Second => {
                let w = 1.0 / 6.0;
                Self {
                    points: vec![[1.0 / 6.0, 1.0 / 6.0], [2.0 / 3.0, 1.0 / 6.0], [1.0 / 6.0, 2.0 / 3.0]],
                    weights: vec![w; 3],
                }
            }
            Order::Third | Order::Fourth => {
                let (a1, b1, w1) = (0.108_103_018_168_070, 0.445_948_490_915_965, 0.223_381_589_678_011 / 2.0);
                let (a2, b2, w2) = (0.816_847_572_980_459, 0.091_576_213_509_771, 0.109_951_743_655_322 / 2.0);
                Self {
                    points: vec![[b1, b1], [a1, b1], [b1, a1], [b2, b2], [a2, b2], [b2, a2]],
                    weights: vec![w1, w1, w1, w2, w2, w2],
                }
            }
            Order::Fifth => {
                let (a1, b1, w1) = (0.059_715_871_789_770, 0.470_142_064_105_115, 0.132_394_152_788_506 / 2.0);
                let (a2, b2, w2) = (0.797_426_985_353_087, 0.101_286_507_323_456, 0.125_939_180_544_827 / 2.0);
                Self {
                    points: vec![
                        [1.0 / 3.0, 1.0 / 3.0],
                        [b1, b1],
                        [a1, b1],
                        [b1, a1],
                        [b2, b2],
                        [a2, b2],
                        [b2, a2],
                    ],
                    weights: vec![0.225 / 2.0, w1, w1, w1, w2, w2, w2],
                }
            }
        }
    }

    /// Rule on a single point, used for the sides of line elements.
    pub fn point() -> Self {
        Self {
            points: vec![[0.0, 0.0]],
            weights: vec![1.0],
        }
    }

    /// Volumetric rule for an element.
    pub fn for_elem(kind: ElemType, order: Order) -> Self {
        match kind {
            ElemType::Edge2 => Self::gauss_line(order),
            ElemType::Tri3 => Self::gauss_tri(order),
            ElemType::Quad4 => Self::gauss_quad(order),
        }
    }

    /// Rule for one side of an element.
    pub fn for_side(kind: ElemType, order: Order) -> Self {
        match kind {
            ElemType::Edge2 => Self::point(),
            ElemType::Tri3 | ElemType::Quad4 => Self::gauss_line(order),
        }
    }

    /// Reference points.
    pub fn points(&self) -> &[[f64; 2]] {
        &self.points
    }

    /// Weights, parallel to [`points`](Self::points).
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the rule has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
