//! Blend Pipeline
//!
//! ```text
//! STAGE 1: Validate   (fail fast on malformed input)
//! STAGE 2: Optimize   (LP solve, failure returned as data)
//! STAGE 3: Project    (ONLY if the solve succeeded)
//! STAGE 4: Score      (ONLY if the solve succeeded)
//! STAGE 5: Analyze    (ONLY if the solve succeeded, analyzers in parallel)
//! ```
//!
//! Every stage after validation reads the same immutable inputs; nothing here
//! holds state between calls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::{default_analyzers, run_analyzers, AnalysisContext, NamedAnalysis};
use crate::blend::{self, ProjectionError, ValidationError, ValidationReport};
use crate::config::{AnalysisConfig, BlendConfig};
use crate::types::{
    BlendProfile, BlendSolution, CoalSource, ComplianceReport, FailureKind, TargetSpecification,
};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum BlendError {
    #[error("Invalid blend request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Could not project solution: {0}")]
    Projection(#[from] ProjectionError),
}

// ============================================================================
// Request
// ============================================================================

/// Quality bounds as they arrive over the wire, without the tonnage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityTargets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcv_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ash_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sulfur_max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_max: Option<f64>,
}

/// Body accepted by the HTTP layer and the `solve` / `validate` commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub coal_sources: Vec<CoalSource>,
    #[serde(default)]
    pub target_specs: QualityTargets,
    pub total_required: f64,
}

impl OptimizationRequest {
    pub fn target(&self) -> TargetSpecification {
        TargetSpecification {
            gcv_min: self.target_specs.gcv_min,
            ash_max: self.target_specs.ash_max,
            sulfur_max: self.target_specs.sulfur_max,
            moisture_max: self.target_specs.moisture_max,
            total_required: self.total_required,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Wall-clock time spent in each stage (milliseconds).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageTimings {
    pub validate_ms: f64,
    pub optimize_ms: f64,
    pub project_ms: f64,
    pub score_ms: f64,
    pub analyze_ms: f64,
    pub total_ms: f64,
}

/// Everything one pipeline run produced.
///
/// `profile`, `compliance`, and `analyses` are only populated for a
/// successful solve.
#[derive(Debug, Clone, Serialize)]
pub struct BlendReport {
    pub validation: ValidationReport,
    pub solution: BlendSolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<BlendProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<ComplianceReport>,
    pub insights: Vec<String>,
    pub analyses: Vec<NamedAnalysis>,
    pub timings: StageTimings,
    pub generated_at: DateTime<Utc>,
}

impl BlendReport {
    pub fn is_success(&self) -> bool {
        self.solution.success
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ============================================================================
// Pipeline
// ============================================================================

/// Run one request through every stage.
pub fn run_request(
    request: &OptimizationRequest,
    config: &BlendConfig,
) -> Result<BlendReport, BlendError> {
    run_pipeline(&request.coal_sources, &request.target(), config)
}

/// Validate, optimize, and (on success) project, score, and analyze.
pub fn run_pipeline(
    sources: &[CoalSource],
    target: &TargetSpecification,
    config: &BlendConfig,
) -> Result<BlendReport, BlendError> {
    let run_start = Instant::now();
    let mut timings = StageTimings::default();

    // STAGE 1
    let stage = Instant::now();
    let validation = blend::validate(sources, target)?;
    timings.validate_ms = elapsed_ms(stage);

    // STAGE 2
    let stage = Instant::now();
    let solution = blend::optimize(sources, target, &config.solver);
    timings.optimize_ms = elapsed_ms(stage);

    if !solution.success {
        let solution = diagnose_failure(solution, &validation, target);
        timings.total_ms = elapsed_ms(run_start);
        warn!(
            failure = ?solution.failure_kind,
            reason = solution.failure_reason.as_deref().unwrap_or(""),
            "No feasible blend"
        );
        return Ok(BlendReport {
            validation,
            solution,
            profile: None,
            compliance: None,
            insights: Vec::new(),
            analyses: Vec::new(),
            timings,
            generated_at: Utc::now(),
        });
    }

    // STAGE 3
    let stage = Instant::now();
    let profile = blend::project(&solution, sources, config.projection.display_threshold_percent)?;
    timings.project_ms = elapsed_ms(stage);

    // STAGE 4
    let stage = Instant::now();
    let compliance = blend::score(&profile, target);
    timings.score_ms = elapsed_ms(stage);

    // STAGE 5
    let stage = Instant::now();
    let ctx = AnalysisContext {
        profile: &profile,
        target,
        sources,
        config: &config.analysis,
    };
    let analyses = run_analyzers(&default_analyzers(), &ctx);
    timings.analyze_ms = elapsed_ms(stage);

    let insights = optimization_insights(&profile, &compliance, &config.analysis);
    timings.total_ms = elapsed_ms(run_start);

    info!(
        sources = sources.len(),
        total_cost = solution.total_cost,
        score = compliance.score,
        total_ms = timings.total_ms,
        "Blend pipeline complete"
    );

    Ok(BlendReport {
        validation,
        solution,
        profile: Some(profile),
        compliance: Some(compliance),
        insights,
        analyses,
        timings,
        generated_at: Utc::now(),
    })
}

/// Attach a precise diagnosis to a failed solve.
///
/// A shortfall in combined availability explains any failure on its own, so
/// it takes precedence over whatever the solver reported.
fn diagnose_failure(
    mut solution: BlendSolution,
    validation: &ValidationReport,
    target: &TargetSpecification,
) -> BlendSolution {
    if validation.has_shortfall() {
        solution.failure_kind = Some(FailureKind::InsufficientAvailability);
        solution.failure_reason = Some(format!(
            "Total available ({:.2} t) is less than required ({:.2} t)",
            validation.total_available, validation.total_required
        ));
    } else if solution.failure_kind == Some(FailureKind::Infeasible) {
        let bounds: Vec<String> = target
            .bounded_attributes()
            .map(|(attr, bound)| {
                let op = if attr.is_minimum() { ">=" } else { "<=" };
                format!("{} {op} {bound}", attr.key())
            })
            .collect();
        solution.failure_reason = Some(format!(
            "Quality bounds cannot be met together with the available sources ({})",
            bounds.join(", ")
        ));
    }
    solution
}

/// Summary lines for a successful blend.
pub fn optimization_insights(
    profile: &BlendProfile,
    compliance: &ComplianceReport,
    config: &AnalysisConfig,
) -> Vec<String> {
    let active = profile
        .composition
        .iter()
        .filter(|c| c.percentage > config.active_source_percent)
        .count();

    let mut insights = vec![format!(
        "{active} coal source(s) contribute more than {}% of the blend",
        config.active_source_percent
    )];
    if let Some(dominant) = profile.dominant() {
        insights.push(format!(
            "Dominant source: {} at {:.1}%",
            dominant.source, dominant.percentage
        ));
    }
    if compliance.checked == 0 {
        insights.push("No quality bounds specified".to_string());
    } else {
        insights.push(format!(
            "{}/{} bounded parameters meet targets",
            compliance.compliant, compliance.checked
        ));
    }
    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OptimizationRequest {
        serde_json::from_str(
            r#"{
                "coal_sources": [
                    {"name":"A","gcv":6000,"ash":10,"sulfur":0.5,"moisture":8,"cost":100,"available":10000},
                    {"name":"B","gcv":5500,"ash":12,"sulfur":0.6,"moisture":10,"cost":80,"available":15000}
                ],
                "target_specs": {"gcv_min": 5800},
                "total_required": 5000
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn request_maps_to_target() {
        let target = request().target();
        assert_eq!(target.gcv_min, Some(5800.0));
        assert_eq!(target.ash_max, None);
        assert_eq!(target.total_required, 5000.0);
    }

    #[test]
    fn successful_run_populates_every_stage() {
        let report = run_request(&request(), &BlendConfig::default()).unwrap();
        assert!(report.is_success());
        let profile = report.profile.as_ref().unwrap();
        assert!((profile.total_cost - 460_000.0).abs() < 1e-3);
        assert_eq!(report.compliance.as_ref().unwrap().checked, 1);
        assert_eq!(report.analyses.len(), 3);
        assert!(report.insights.iter().any(|i| i == "Dominant source: A at 60.0%"));
        assert!(report.insights.iter().any(|i| i == "1/1 bounded parameters meet targets"));
        assert!(report.timings.total_ms >= report.timings.optimize_ms);
    }

    #[test]
    fn shortfall_is_diagnosed_as_insufficient_availability() {
        let mut req = request();
        req.total_required = 30000.0;
        let report = run_request(&req, &BlendConfig::default()).unwrap();
        assert!(!report.is_success());
        assert_eq!(
            report.solution.failure_kind,
            Some(FailureKind::InsufficientAvailability)
        );
        let reason = report.solution.failure_reason.unwrap();
        assert!(reason.contains("25000.00"));
        assert!(reason.contains("30000.00"));
        assert!(report.profile.is_none());
        assert!(report.analyses.is_empty());
    }

    #[test]
    fn unreachable_quality_names_the_bounds() {
        let mut req = request();
        req.target_specs.gcv_min = Some(6500.0);
        let report = run_request(&req, &BlendConfig::default()).unwrap();
        assert_eq!(report.solution.failure_kind, Some(FailureKind::Infeasible));
        assert!(report
            .solution
            .failure_reason
            .unwrap()
            .contains("gcv >= 6500"));
    }

    #[test]
    fn validation_error_fails_fast() {
        let mut req = request();
        req.coal_sources.clear();
        let err = run_request(&req, &BlendConfig::default()).unwrap_err();
        assert!(matches!(err, BlendError::Validation(ValidationError::NoSources)));
    }
}
