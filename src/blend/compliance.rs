//! Compliance Scorer: achieved blend quality vs target bounds
//!
//! Only bounded attributes are checked. An attribute without a target is left
//! out of both numerator and denominator rather than counted as compliant.
//! With no bounds at all the score is 100 and `checked` is 0.

use std::collections::BTreeMap;

use crate::types::{BlendProfile, ComplianceReport, QualityAttribute, TargetSpecification};

/// Relative slack absorbing floating-point noise on a binding bound.
const RELATIVE_SLACK: f64 = 1e-9;

fn satisfies(attr: QualityAttribute, achieved: f64, bound: f64) -> bool {
    let slack = bound.abs() * RELATIVE_SLACK;
    if attr.is_minimum() {
        achieved >= bound - slack
    } else {
        achieved <= bound + slack
    }
}

/// Score a profile against its target.
pub fn score(profile: &BlendProfile, target: &TargetSpecification) -> ComplianceReport {
    let per_attribute: BTreeMap<QualityAttribute, bool> = target
        .bounded_attributes()
        .map(|(attr, bound)| (attr, satisfies(attr, profile.achieved.get(attr), bound)))
        .collect();

    let checked = per_attribute.len();
    let compliant = per_attribute.values().filter(|ok| **ok).count();
    let score = if checked == 0 {
        100.0
    } else {
        compliant as f64 / checked as f64 * 100.0
    };

    ComplianceReport {
        per_attribute,
        compliant,
        checked,
        score,
    }
}
