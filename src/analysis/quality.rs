//! Quality analyzer: compliance grade and per-attribute predictions

use serde::Serialize;

use super::{AnalysisContext, AnalysisOutput, BlendAnalyzer};
use crate::blend::score;
use crate::types::{ComplianceReport, QualityAttribute};

/// Coarse grade derived from the compliance score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    /// score >= 75
    Excellent,
    /// score >= 50
    Good,
    Partial,
}

impl QualityGrade {
    pub fn from_score(score: f64) -> Self {
        if score >= 75.0 {
            Self::Excellent
        } else if score >= 50.0 {
            Self::Good
        } else {
            Self::Partial
        }
    }
}

/// Achieved value of one attribute, with its bound if it has one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributePrediction {
    pub attribute: QualityAttribute,
    pub achieved: f64,
    pub unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meets_target: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityAssessment {
    pub compliance: ComplianceReport,
    pub grade: QualityGrade,
    pub predictions: Vec<AttributePrediction>,
    pub insights: Vec<String>,
}

pub struct QualityAnalyzer;

impl BlendAnalyzer for QualityAnalyzer {
    fn name(&self) -> &str {
        "Quality"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> AnalysisOutput {
        let compliance = score(ctx.profile, ctx.target);
        let grade = QualityGrade::from_score(compliance.score);

        let predictions: Vec<AttributePrediction> = QualityAttribute::ALL
            .iter()
            .map(|&attr| AttributePrediction {
                attribute: attr,
                achieved: ctx.profile.achieved.get(attr),
                unit: attr.unit(),
                target: ctx.target.bound(attr),
                meets_target: compliance.per_attribute.get(&attr).copied(),
            })
            .collect();

        let mut insights = Vec::new();
        if compliance.checked == 0 {
            insights.push("No quality bounds specified".to_string());
        } else {
            insights.push(format!(
                "{}/{} bounded parameters meet targets ({:.0}%)",
                compliance.compliant, compliance.checked, compliance.score
            ));
        }
        for attr in compliance.failures() {
            let op = if attr.is_minimum() { "below" } else { "above" };
            if let Some(bound) = ctx.target.bound(attr) {
                insights.push(format!(
                    "{attr} {:.2} {} is {op} target {:.2}",
                    ctx.profile.achieved.get(attr),
                    attr.unit(),
                    bound
                ));
            }
        }

        AnalysisOutput::Quality(QualityAssessment {
            compliance,
            grade,
            predictions,
            insights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support;
    use crate::types::TargetSpecification;

    fn assess(target: &TargetSpecification) -> QualityAssessment {
        let (profile, sources, config) = (
            test_support::profile(),
            test_support::sources(),
            test_support::config(),
        );
        let ctx = AnalysisContext {
            profile: &profile,
            target,
            sources: &sources,
            config: &config,
        };
        match QualityAnalyzer.analyze(&ctx) {
            AnalysisOutput::Quality(q) => q,
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn grade_thresholds() {
        assert_eq!(QualityGrade::from_score(100.0), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_score(75.0), QualityGrade::Excellent);
        assert_eq!(QualityGrade::from_score(50.0), QualityGrade::Good);
        assert_eq!(QualityGrade::from_score(25.0), QualityGrade::Partial);
    }

    #[test]
    fn compliant_blend_is_excellent() {
        let assessment = assess(&test_support::target());
        assert_eq!(assessment.grade, QualityGrade::Excellent);
        assert_eq!(assessment.compliance.checked, 4);
        assert_eq!(assessment.predictions.len(), 4);
        assert!(assessment.insights[0].starts_with("4/4"));
    }

    #[test]
    fn failed_bound_is_named() {
        let target = TargetSpecification {
            gcv_min: Some(5900.0),
            ash_max: Some(10.0),
            total_required: 5000.0,
            ..Default::default()
        };
        let assessment = assess(&target);
        assert_eq!(assessment.compliance.compliant, 0);
        assert_eq!(assessment.grade, QualityGrade::Partial);
        assert!(assessment.insights.iter().any(|i| i.starts_with("GCV")));
        assert!(assessment.insights.iter().any(|i| i.starts_with("Ash")));

        let sulfur = &assessment.predictions[2];
        assert_eq!(sulfur.attribute, QualityAttribute::Sulfur);
        assert_eq!(sulfur.target, None);
        assert_eq!(sulfur.meets_target, None);
    }
}
