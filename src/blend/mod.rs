//! Blend Optimization Core
//!
//! Validate → build LP → solve → project → score. Entirely deterministic;
//! every call is independent and shares no state with any other.

pub mod compliance;
pub mod constraints;
pub mod model;
pub mod optimizer;
pub mod projector;

pub use compliance::score;
pub use constraints::{build_problem, BlendProblem, ConstraintKind, ConstraintTag, LinearConstraint};
pub use model::{validate, ValidationError, ValidationReport};
pub use optimizer::{optimize, solve_problem};
pub use projector::{project, ProjectionError};
