//! Constraint Builder: translates sources and a target into a linear program
//!
//! Every weighted-average bound `Σ x·a / Σ x ⋛ b` is multiplied through by
//! `Σ x` so the constraint stays linear in `x`:
//!
//! | Bound          | Canonical row (`g(x) >= 0`)      |
//! |----------------|----------------------------------|
//! | total quantity | `Σ x[i] - total_required = 0`    |
//! | `gcv_min`      | `Σ x[i]·(gcv[i] - gcv_min)`      |
//! | `ash_max`      | `Σ x[i]·(ash_max - ash[i])`      |
//! | `sulfur_max`   | `Σ x[i]·(sulfur_max - sulfur[i])`|
//! | `moisture_max` | `Σ x[i]·(moisture_max - moisture[i])` |
//!
//! Absent bounds contribute no row.

use serde::Serialize;

use crate::types::{CoalSource, QualityAttribute, TargetSpecification};

/// Relation between `coefficients · x` and `rhs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstraintKind {
    /// `coefficients · x == rhs`
    Equality,
    /// `coefficients · x >= rhs`
    AtLeast,
}

/// What a constraint row enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstraintTag {
    TotalQuantity,
    Quality(QualityAttribute),
}

/// One linear constraint row over the source quantities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearConstraint {
    pub tag: ConstraintTag,
    pub kind: ConstraintKind,
    /// One coefficient per source, in source order
    pub coefficients: Vec<f64>,
    pub rhs: f64,
}

impl LinearConstraint {
    /// `coefficients · x - rhs`; non-negative (or zero for equalities) when satisfied.
    pub fn residual(&self, x: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(x)
            .map(|(c, v)| c * v)
            .sum::<f64>()
            - self.rhs
    }
}

/// Inclusive quantity bounds for one source
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuantityBounds {
    pub lower: f64,
    pub upper: f64,
}

/// Canonical LP: minimize `objective · x` subject to `constraints` and `bounds`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendProblem {
    pub source_names: Vec<String>,
    /// Unit cost per source
    pub objective: Vec<f64>,
    pub constraints: Vec<LinearConstraint>,
    pub bounds: Vec<QuantityBounds>,
}

impl BlendProblem {
    pub fn num_variables(&self) -> usize {
        self.source_names.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value for a candidate assignment.
    pub fn cost(&self, x: &[f64]) -> f64 {
        self.objective.iter().zip(x).map(|(c, v)| c * v).sum()
    }

    /// Right-hand side of the total-quantity row.
    pub fn total_required(&self) -> f64 {
        self.constraints
            .iter()
            .find(|c| c.tag == ConstraintTag::TotalQuantity)
            .map_or(0.0, |c| c.rhs)
    }
}

/// Coefficients of one quality row, oriented so the feasible side is `>= 0`.
fn quality_row(sources: &[CoalSource], attr: QualityAttribute, bound: f64) -> Vec<f64> {
    sources
        .iter()
        .map(|s| {
            let value = s.attribute(attr);
            if attr.is_minimum() {
                value - bound
            } else {
                bound - value
            }
        })
        .collect()
}

/// Build the linear program for one optimization call.
pub fn build_problem(sources: &[CoalSource], target: &TargetSpecification) -> BlendProblem {
    let mut constraints = Vec::with_capacity(5);

    constraints.push(LinearConstraint {
        tag: ConstraintTag::TotalQuantity,
        kind: ConstraintKind::Equality,
        coefficients: vec![1.0; sources.len()],
        rhs: target.total_required,
    });

    for (attr, bound) in target.bounded_attributes() {
        constraints.push(LinearConstraint {
            tag: ConstraintTag::Quality(attr),
            kind: ConstraintKind::AtLeast,
            coefficients: quality_row(sources, attr, bound),
            rhs: 0.0,
        });
    }

    BlendProblem {
        source_names: sources.iter().map(|s| s.name.clone()).collect(),
        objective: sources.iter().map(|s| s.unit_cost).collect(),
        constraints,
        bounds: sources
            .iter()
            .map(|s| QuantityBounds {
                lower: 0.0,
                upper: s.available,
            })
            .collect(),
    }
}
