//! Coal Blend: least-cost coal blend optimization
//!
//! Chooses how many tons to draw from each available coal source so the
//! blend meets a required total tonnage and quality bounds at minimum cost.
//!
//! ## Architecture
//!
//! - **Blend core**: validation, LP construction, solve, projection, compliance
//! - **Analysis**: stateless analyzers over a solved blend (cost, quality, comparison)
//! - **Pipeline**: one call from raw request to full report
//! - **API**: axum HTTP surface over the pipeline

pub mod analysis;
pub mod api;
pub mod blend;
pub mod config;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::BlendConfig;

// Re-export commonly used types
pub use types::{
    AchievedQuality, BlendProfile, BlendSolution, CoalSource, ComplianceReport,
    CompositionEntry, FailureKind, QualityAttribute, SourceQuantity, TargetSpecification,
};

// Re-export the core operations
pub use blend::{optimize, project, score, validate, ValidationError, ValidationReport};

// Re-export pipeline entry points
pub use pipeline::{run_pipeline, run_request, BlendError, BlendReport, OptimizationRequest};
