//! Input validation for coal sources and target specifications
//!
//! Structural problems (negative values, empty input, bad names) are fatal
//! `ValidationError`s raised before the solver runs. An availability shortfall
//! is only a warning: the solve is still attempted and reported infeasible.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::warn;

use crate::types::{CoalSource, QualityAttribute, TargetSpecification};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("At least one coal source is required")]
    NoSources,

    #[error("Coal source at position {0} has an empty name")]
    EmptyName(usize),

    #[error("Duplicate coal source name: {0}")]
    DuplicateName(String),

    #[error("Coal source {source_name}: {field} = {value} must be non-negative")]
    NegativeValue {
        source_name: String,
        field: &'static str,
        value: f64,
    },

    #[error("{field} must be a finite number (got {value})")]
    NonFinite { field: String, value: f64 },

    #[error("total_required = {0} must be greater than zero")]
    NonPositiveRequirement(f64),

    #[error("Target bound {field} = {value} must be non-negative")]
    NegativeBound { field: &'static str, value: f64 },
}

/// Pre-solve summary of the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub coal_count: usize,
    pub total_available: f64,
    pub total_required: f64,
    /// `total_available >= total_required`
    pub feasible: bool,
    pub warnings: Vec<String>,
    pub insights: Vec<String>,
}

impl ValidationReport {
    /// Whether combined availability falls short of the requirement.
    pub fn has_shortfall(&self) -> bool {
        !self.feasible
    }
}

fn check_finite(field: impl FnOnce() -> String, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFinite {
            field: field(),
            value,
        })
    }
}

fn check_source(index: usize, source: &CoalSource) -> Result<(), ValidationError> {
    if source.name.trim().is_empty() {
        return Err(ValidationError::EmptyName(index));
    }

    let fields: [(&'static str, f64); 6] = [
        ("gcv", source.gcv),
        ("ash", source.ash),
        ("sulfur", source.sulfur),
        ("moisture", source.moisture),
        ("unit_cost", source.unit_cost),
        ("available", source.available),
    ];

    for (field, value) in fields {
        check_finite(|| format!("{}.{field}", source.name), value)?;
        if value < 0.0 {
            return Err(ValidationError::NegativeValue {
                source_name: source.name.clone(),
                field,
                value,
            });
        }
    }
    Ok(())
}

fn check_target(target: &TargetSpecification) -> Result<(), ValidationError> {
    check_finite(|| "total_required".to_string(), target.total_required)?;
    if target.total_required <= 0.0 {
        return Err(ValidationError::NonPositiveRequirement(target.total_required));
    }

    for attr in QualityAttribute::ALL {
        let Some(bound) = target.bound(attr) else {
            continue;
        };
        let field = match attr {
            QualityAttribute::Gcv => "gcv_min",
            QualityAttribute::Ash => "ash_max",
            QualityAttribute::Sulfur => "sulfur_max",
            QualityAttribute::Moisture => "moisture_max",
        };
        check_finite(|| field.to_string(), bound)?;
        if bound < 0.0 {
            return Err(ValidationError::NegativeBound { field, value: bound });
        }
    }
    Ok(())
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Validate caller input and summarize it.
///
/// Pure: inspects but never modifies `sources` or `target`.
pub fn validate(
    sources: &[CoalSource],
    target: &TargetSpecification,
) -> Result<ValidationReport, ValidationError> {
    if sources.is_empty() {
        return Err(ValidationError::NoSources);
    }

    let mut seen = HashSet::with_capacity(sources.len());
    for (i, source) in sources.iter().enumerate() {
        check_source(i, source)?;
        if !seen.insert(source.name.as_str()) {
            return Err(ValidationError::DuplicateName(source.name.clone()));
        }
    }
    check_target(target)?;

    let total_available: f64 = sources.iter().map(|s| s.available).sum();
    let total_required = target.total_required;
    let feasible = total_available >= total_required;

    let mut warnings = Vec::new();
    let mut insights = Vec::new();

    if sources.len() < 2 {
        warnings.push(format!(
            "Only {} coal source provided; blending needs at least 2 for any trade-off",
            sources.len()
        ));
    }

    if feasible {
        let surplus = total_available - total_required;
        insights.push(format!(
            "Surplus capacity: {:.0} tons ({:.1}% of requirement)",
            surplus,
            surplus / total_required * 100.0
        ));
    } else {
        let msg = format!(
            "Total available ({total_available:.0} t) < required ({total_required:.0} t)"
        );
        warn!(total_available, total_required, "Availability shortfall");
        warnings.push(msg);
    }

    if let Some((lo, hi)) = min_max(sources.iter().map(|s| s.gcv)) {
        insights.push(format!("GCV range: {lo:.0} - {hi:.0} kcal/kg"));
    }
    if let Some((lo, hi)) = min_max(sources.iter().map(|s| s.ash)) {
        insights.push(format!("Ash range: {lo:.1}% - {hi:.1}%"));
    }

    // sources is non-empty here
    let avg_cost = sources.iter().map(|s| s.unit_cost).sum::<f64>() / sources.len() as f64;
    insights.push(format!("Average coal cost: {avg_cost:.2}/ton"));

    Ok(ValidationReport {
        coal_count: sources.len(),
        total_available,
        total_required,
        feasible,
        warnings,
        insights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, available: f64) -> CoalSource {
        CoalSource {
            name: name.to_string(),
            gcv: 6000.0,
            ash: 10.0,
            sulfur: 0.5,
            moisture: 8.0,
            unit_cost: 100.0,
            available,
        }
    }

    fn target(total: f64) -> TargetSpecification {
        TargetSpecification {
            gcv_min: Some(5800.0),
            total_required: total,
            ..Default::default()
        }
    }

    #[test]
    fn rejects_empty_source_list() {
        assert_eq!(validate(&[], &target(100.0)).unwrap_err(), ValidationError::NoSources);
    }

    #[test]
    fn rejects_negative_attribute() {
        let mut bad = source("A", 100.0);
        bad.ash = -1.0;
        let err = validate(&[bad], &target(50.0)).unwrap_err();
        assert!(matches!(err, ValidationError::NegativeValue { field: "ash", .. }));
    }

    #[test]
    fn rejects_negative_availability() {
        let err = validate(&[source("A", -5.0)], &target(50.0)).unwrap_err();
        assert!(matches!(err, ValidationError::NegativeValue { field: "available", .. }));
    }

    #[test]
    fn rejects_zero_requirement() {
        let err = validate(&[source("A", 100.0)], &target(0.0)).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveRequirement(0.0));
    }

    #[test]
    fn rejects_nan_cost() {
        let mut bad = source("A", 100.0);
        bad.unit_cost = f64::NAN;
        let err = validate(&[bad], &target(50.0)).unwrap_err();
        assert!(matches!(err, ValidationError::NonFinite { .. }));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = validate(&[source("A", 1.0), source("A", 2.0)], &target(1.0)).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateName("A".to_string()));
    }

    #[test]
    fn rejects_negative_bound() {
        let mut t = target(10.0);
        t.sulfur_max = Some(-0.1);
        let err = validate(&[source("A", 100.0)], &t).unwrap_err();
        assert!(matches!(err, ValidationError::NegativeBound { field: "sulfur_max", .. }));
    }

    #[test]
    fn shortfall_is_a_warning_not_an_error() {
        let report = validate(&[source("A", 10.0), source("B", 10.0)], &target(30.0)).unwrap();
        assert!(!report.feasible);
        assert!(report.has_shortfall());
        assert!(report.warnings.iter().any(|w| w.contains("< required")));
    }

    #[test]
    fn single_source_warns() {
        let report = validate(&[source("A", 100.0)], &target(50.0)).unwrap();
        assert!(report.feasible);
        assert!(report.warnings.iter().any(|w| w.contains("at least 2")));
        assert!(report.insights.iter().any(|i| i.starts_with("Surplus capacity")));
    }
}
