//! Derived blend profile and compliance types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::QualityAttribute;

/// Quantity-weighted quality of the solved blend
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievedQuality {
    pub gcv: f64,
    pub ash: f64,
    pub sulfur: f64,
    pub moisture: f64,
}

impl AchievedQuality {
    pub fn get(&self, attr: QualityAttribute) -> f64 {
        match attr {
            QualityAttribute::Gcv => self.gcv,
            QualityAttribute::Ash => self.ash,
            QualityAttribute::Sulfur => self.sulfur,
            QualityAttribute::Moisture => self.moisture,
        }
    }
}

/// One source's share of the blend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionEntry {
    pub source: String,
    /// Tons
    pub quantity: f64,
    /// Share of total tonnage (0-100)
    pub percentage: f64,
    pub unit_cost: f64,
    /// `quantity * unit_cost`
    pub cost: f64,
}

/// Read-only view of a successful blend shared by every downstream analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendProfile {
    pub achieved: AchievedQuality,
    /// Entries at or above the display threshold, in input order
    pub composition: Vec<CompositionEntry>,
    pub total_quantity: f64,
    pub total_cost: f64,
    /// Sources considered by the optimizer but hidden from `composition`
    pub omitted_sources: usize,
}

impl BlendProfile {
    /// Sum of retained composition percentages.
    pub fn retained_percentage(&self) -> f64 {
        self.composition.iter().map(|c| c.percentage).sum()
    }

    /// Entry with the largest share, if any.
    pub fn dominant(&self) -> Option<&CompositionEntry> {
        self.composition
            .iter()
            .max_by(|a, b| a.percentage.total_cmp(&b.percentage))
    }
}

/// Outcome of checking a profile against its target bounds.
///
/// Only bounded attributes appear in `per_attribute` and count toward `score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub per_attribute: BTreeMap<QualityAttribute, bool>,
    pub compliant: usize,
    pub checked: usize,
    /// `compliant / checked * 100`; 100 when nothing is bounded
    pub score: f64,
}

impl ComplianceReport {
    /// Attributes that failed their bound.
    pub fn failures(&self) -> impl Iterator<Item = QualityAttribute> + '_ {
        self.per_attribute
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(attr, _)| *attr)
    }

    pub fn is_fully_compliant(&self) -> bool {
        self.compliant == self.checked
    }
}
