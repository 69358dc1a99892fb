//! Optimizer output types

use serde::{Deserialize, Serialize};

/// Why a solve did not produce a blend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Combined availability is below the required tonnage
    InsufficientAvailability,
    /// Quality bounds cannot be satisfied together
    Infeasible,
    /// Objective is unbounded (only possible with malformed costs)
    Unbounded,
    /// Any other solver failure
    SolverError,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientAvailability => write!(f, "insufficient availability"),
            Self::Infeasible => write!(f, "infeasible"),
            Self::Unbounded => write!(f, "unbounded"),
            Self::SolverError => write!(f, "solver error"),
        }
    }
}

/// Quantity assigned to one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceQuantity {
    pub source: String,
    pub quantity: f64,
}

/// Result of one optimization call.
///
/// `quantities` holds one entry per input source, in input order, zeros included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendSolution {
    pub success: bool,
    pub quantities: Vec<SourceQuantity>,
    pub total_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl BlendSolution {
    /// A failed solve: no quantities, zero cost.
    pub fn failed(kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            quantities: Vec::new(),
            total_cost: 0.0,
            failure_kind: Some(kind),
            failure_reason: Some(reason.into()),
        }
    }

    /// Sum of all assigned quantities.
    pub fn total_quantity(&self) -> f64 {
        self.quantities.iter().map(|q| q.quantity).sum()
    }

    /// Quantity assigned to a named source.
    pub fn quantity_of(&self, source: &str) -> Option<f64> {
        self.quantities
            .iter()
            .find(|q| q.source == source)
            .map(|q| q.quantity)
    }
}
