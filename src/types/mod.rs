//! Shared data structures for the coal blend optimizer
//!
//! This module defines the value objects that flow through the pipeline:
//! - Input: CoalSource, TargetSpecification
//! - Optimizer output: BlendSolution
//! - Derived: BlendProfile, ComplianceReport

mod coal;
mod profile;
mod solution;

pub use coal::*;
pub use profile::*;
pub use solution::*;
