//! Downstream blend analyzers
//!
//! Each analyzer is a stateless transformer over a shared, read-only
//! [`BlendProfile`]. None depends on another, so the default set runs
//! concurrently on the rayon pool and results are collected in
//! registration order.
//!
//! ## Analyzers
//!
//! 1. **Cost**: per-source cost breakdown, cost per ton
//! 2. **Quality**: compliance report with grade and failed attributes
//! 3. **Comparison**: target vs achieved margins, cost vs cheapest baseline

pub mod comparison;
pub mod cost;
pub mod quality;

pub use comparison::{ComparisonAnalyzer, PerformanceComparison};
pub use cost::{CostAnalysis, CostAnalyzer};
pub use quality::{QualityAnalyzer, QualityAssessment, QualityGrade};

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::types::{BlendProfile, CoalSource, TargetSpecification};

/// Read-only inputs shared by every analyzer.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub profile: &'a BlendProfile,
    pub target: &'a TargetSpecification,
    pub sources: &'a [CoalSource],
    pub config: &'a AnalysisConfig,
}

/// Output of one analyzer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisOutput {
    Cost(CostAnalysis),
    Quality(QualityAssessment),
    Comparison(PerformanceComparison),
}

/// Analyzer output tagged with the analyzer that produced it
#[derive(Debug, Clone, Serialize)]
pub struct NamedAnalysis {
    pub analyzer: String,
    #[serde(flatten)]
    pub output: AnalysisOutput,
}

/// Trait for downstream blend analyzers
///
/// Implementations hold no mutable state; the same instance may be called
/// from several threads at once.
pub trait BlendAnalyzer: Send + Sync {
    /// Analyzer name (e.g., "Cost", "Quality", "Comparison")
    fn name(&self) -> &str;

    /// Analyze the profile
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> AnalysisOutput;
}

/// Create the default set of analyzers
pub fn default_analyzers() -> Vec<Box<dyn BlendAnalyzer>> {
    vec![
        Box::new(CostAnalyzer),
        Box::new(QualityAnalyzer),
        Box::new(ComparisonAnalyzer),
    ]
}

/// Run every analyzer against the same context in parallel.
pub fn run_analyzers(
    analyzers: &[Box<dyn BlendAnalyzer>],
    ctx: &AnalysisContext<'_>,
) -> Vec<NamedAnalysis> {
    analyzers
        .par_iter()
        .map(|analyzer| {
            debug!(analyzer = analyzer.name(), "Running analyzer");
            NamedAnalysis {
                analyzer: analyzer.name().to_string(),
                output: analyzer.analyze(ctx),
            }
        })
        .collect()
}

/// `(a - b) / b * 100`, or 0 when `b` is zero.
pub(crate) fn percent_change(a: f64, b: f64) -> f64 {
    if b.abs() > f64::EPSILON {
        (a - b) / b * 100.0
    } else {
        0.0
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_runs_in_registration_order() {
        let (profile, target, sources, config) = (
            test_support::profile(),
            test_support::target(),
            test_support::sources(),
            test_support::config(),
        );
        let ctx = AnalysisContext {
            profile: &profile,
            target: &target,
            sources: &sources,
            config: &config,
        };
        let results = run_analyzers(&default_analyzers(), &ctx);
        let names: Vec<_> = results.iter().map(|r| r.analyzer.as_str()).collect();
        assert_eq!(names, vec!["Cost", "Quality", "Comparison"]);
        assert!(matches!(results[0].output, AnalysisOutput::Cost(_)));
        assert!(matches!(results[2].output, AnalysisOutput::Comparison(_)));
    }

    #[test]
    fn percent_change_guards_zero_base() {
        assert_eq!(percent_change(5.0, 0.0), 0.0);
        assert!((percent_change(110.0, 100.0) - 10.0).abs() < 1e-12);
    }
}
