//! Result Projector: BlendSolution → BlendProfile
//!
//! Achieved quality is always computed from the solved quantities, never the
//! targets. Every source counts toward the weighted averages; the display
//! threshold only affects which entries appear in `composition`.

use thiserror::Error;

use crate::types::{
    AchievedQuality, BlendProfile, BlendSolution, CoalSource, CompositionEntry, QualityAttribute,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("cannot project a failed solution: {0}")]
    FailedSolution(String),

    #[error("solution references unknown source: {0}")]
    UnknownSource(String),

    #[error("solution has zero total quantity")]
    EmptyBlend,
}

/// Build the blend profile for a successful solution.
///
/// `display_threshold_percent` hides composition entries whose share of the
/// total is below the threshold.
///
/// The target specification is not a parameter: the profile depends only on
/// the solved quantities and the source attributes. Bounds are checked
/// afterwards by [`super::compliance::score`].
pub fn project(
    solution: &BlendSolution,
    sources: &[CoalSource],
    display_threshold_percent: f64,
) -> Result<BlendProfile, ProjectionError> {
    if !solution.success {
        return Err(ProjectionError::FailedSolution(
            solution
                .failure_reason
                .clone()
                .unwrap_or_else(|| "unknown failure".to_string()),
        ));
    }

    let mut paired = Vec::with_capacity(solution.quantities.len());
    for q in &solution.quantities {
        let source = sources
            .iter()
            .find(|s| s.name == q.source)
            .ok_or_else(|| ProjectionError::UnknownSource(q.source.clone()))?;
        paired.push((source, q.quantity));
    }

    let total_quantity: f64 = paired.iter().map(|(_, q)| q).sum();
    if total_quantity <= 0.0 {
        return Err(ProjectionError::EmptyBlend);
    }

    let weighted = |attr: QualityAttribute| {
        paired
            .iter()
            .map(|(s, q)| q * s.attribute(attr))
            .sum::<f64>()
            / total_quantity
    };
    let achieved = AchievedQuality {
        gcv: weighted(QualityAttribute::Gcv),
        ash: weighted(QualityAttribute::Ash),
        sulfur: weighted(QualityAttribute::Sulfur),
        moisture: weighted(QualityAttribute::Moisture),
    };

    let total_cost = paired.iter().map(|(s, q)| q * s.unit_cost).sum();

    let mut composition = Vec::with_capacity(paired.len());
    let mut omitted_sources = 0;
    for (source, quantity) in &paired {
        let percentage = quantity / total_quantity * 100.0;
        if percentage < display_threshold_percent {
            omitted_sources += 1;
            continue;
        }
        composition.push(CompositionEntry {
            source: source.name.clone(),
            quantity: *quantity,
            percentage,
            unit_cost: source.unit_cost,
            cost: quantity * source.unit_cost,
        });
    }

    Ok(BlendProfile {
        achieved,
        composition,
        total_quantity,
        total_cost,
        omitted_sources,
    })
}
