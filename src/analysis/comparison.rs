//! Comparison analyzer: achieved quality and cost against their references
//!
//! Quality is compared with the target bound of each constrained attribute.
//! Cost is compared with buying all of `total_required` from the cheapest
//! source, ignoring quality and availability.

use serde::Serialize;
use std::cmp::Ordering;

use super::{percent_change, AnalysisContext, AnalysisOutput, BlendAnalyzer};
use crate::types::QualityAttribute;

/// Relative band around a reference value that counts as `Met` / `Equal`.
const MET_BAND: f64 = 1e-9;

/// Positive when `achieved` sits on the favourable side of `bound`.
fn favourable_difference(attr: QualityAttribute, achieved: f64, bound: f64) -> f64 {
    if attr.is_minimum() {
        achieved - bound
    } else {
        bound - achieved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    /// Above a minimum bound
    Exceeded,
    /// Below a maximum bound
    Better,
    /// On the bound
    Met,
    /// Under a minimum bound
    Below,
    /// Over a maximum bound
    Worse,
}

impl TargetStatus {
    fn for_attribute(attr: QualityAttribute, achieved: f64, bound: f64) -> Self {
        match (sign(favourable_difference(attr, achieved, bound), bound), attr.is_minimum()) {
            (Ordering::Greater, true) => Self::Exceeded,
            (Ordering::Greater, false) => Self::Better,
            (Ordering::Equal, _) => Self::Met,
            (Ordering::Less, true) => Self::Below,
            (Ordering::Less, false) => Self::Worse,
        }
    }

    pub fn is_favourable(self) -> bool {
        matches!(self, Self::Exceeded | Self::Better)
    }

    pub fn is_violation(self) -> bool {
        matches!(self, Self::Below | Self::Worse)
    }
}

/// Sign of `difference`, treating a small band around zero as `Equal`.
fn sign(difference: f64, reference: f64) -> Ordering {
    let band = reference.abs().max(1.0) * MET_BAND;
    if difference > band {
        Ordering::Greater
    } else if difference < -band {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CostStatus {
    Higher,
    Equal,
    Lower,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeComparison {
    pub attribute: QualityAttribute,
    pub target: f64,
    pub achieved: f64,
    /// Favourable distance from the bound as % of the bound; positive is better
    pub margin_percent: f64,
    pub status: TargetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComparison {
    /// Cheapest unit cost times required tonnage
    pub baseline: f64,
    pub achieved: f64,
    pub change_percent: f64,
    pub status: CostStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceComparison {
    pub attributes: Vec<AttributeComparison>,
    pub cost: CostComparison,
    pub insights: Vec<String>,
}

pub struct ComparisonAnalyzer;

impl BlendAnalyzer for ComparisonAnalyzer {
    fn name(&self) -> &str {
        "Comparison"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> AnalysisOutput {
        let attributes: Vec<AttributeComparison> = ctx
            .target
            .bounded_attributes()
            .map(|(attr, bound)| {
                let achieved = ctx.profile.achieved.get(attr);
                let margin_percent = if attr.is_minimum() {
                    percent_change(achieved, bound)
                } else {
                    -percent_change(achieved, bound)
                };
                AttributeComparison {
                    attribute: attr,
                    target: bound,
                    achieved,
                    margin_percent,
                    status: TargetStatus::for_attribute(attr, achieved, bound),
                }
            })
            .collect();

        let min_unit_cost = ctx
            .sources
            .iter()
            .map(|s| s.unit_cost)
            .min_by(f64::total_cmp)
            .unwrap_or(0.0);
        let baseline = min_unit_cost * ctx.target.total_required;
        let achieved = ctx.profile.total_cost;
        let change_percent = percent_change(achieved, baseline);
        let cost_status = match sign(achieved - baseline, baseline) {
            Ordering::Greater => CostStatus::Higher,
            Ordering::Equal => CostStatus::Equal,
            Ordering::Less => CostStatus::Lower,
        };

        let mut insights = Vec::new();
        for cmp in &attributes {
            if cmp.status.is_violation() {
                insights.push(format!(
                    "{} misses its target by {:.1}%",
                    cmp.attribute, -cmp.margin_percent
                ));
            } else if cmp.status.is_favourable() && cmp.margin_percent > 10.0 {
                insights.push(format!(
                    "{} has {:.1}% headroom against its target",
                    cmp.attribute, cmp.margin_percent
                ));
            }
        }
        if cost_status != CostStatus::Higher {
            insights.push("Cost matches the cheapest-source baseline".to_string());
        } else if change_percent < 10.0 {
            insights.push(format!(
                "Cost within 10% of the cheapest-source baseline (+{change_percent:.1}%)"
            ));
        } else if change_percent < 20.0 {
            insights.push(format!(
                "Moderate premium over the cheapest-source baseline (+{change_percent:.1}%)"
            ));
        } else {
            insights.push(format!(
                "High premium over the cheapest-source baseline (+{change_percent:.1}%)"
            ));
        }

        AnalysisOutput::Comparison(PerformanceComparison {
            attributes,
            cost: CostComparison {
                baseline,
                achieved,
                change_percent,
                status: cost_status,
            },
            insights,
        })
    }
}
