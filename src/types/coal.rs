//! Coal source and target specification types

use serde::{Deserialize, Serialize};

/// Blend quality attributes tracked by the optimizer and the compliance scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityAttribute {
    /// Gross calorific value (kcal/kg), bounded from below
    Gcv,
    /// Ash content (%), bounded from above
    Ash,
    /// Sulfur content (%), bounded from above
    Sulfur,
    /// Moisture content (%), bounded from above
    Moisture,
}

impl QualityAttribute {
    /// All attributes in canonical order.
    pub const ALL: [Self; 4] = [Self::Gcv, Self::Ash, Self::Sulfur, Self::Moisture];

    /// Lowercase key used in logs and JSON
    pub fn key(self) -> &'static str {
        match self {
            Self::Gcv => "gcv",
            Self::Ash => "ash",
            Self::Sulfur => "sulfur",
            Self::Moisture => "moisture",
        }
    }

    /// Display unit
    pub fn unit(self) -> &'static str {
        match self {
            Self::Gcv => "kcal/kg",
            Self::Ash | Self::Sulfur | Self::Moisture => "%",
        }
    }

    /// `true` when the target bound is a minimum (GCV); all others are maxima.
    pub fn is_minimum(self) -> bool {
        matches!(self, Self::Gcv)
    }
}

impl std::fmt::Display for QualityAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gcv => write!(f, "GCV"),
            Self::Ash => write!(f, "Ash"),
            Self::Sulfur => write!(f, "Sulfur"),
            Self::Moisture => write!(f, "Moisture"),
        }
    }
}

/// A single coal source offered for blending.
///
/// Immutable for the duration of one optimization call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoalSource {
    /// Unique identifier
    pub name: String,
    /// Gross calorific value (kcal/kg)
    pub gcv: f64,
    /// Ash content (%)
    pub ash: f64,
    /// Sulfur content (%)
    pub sulfur: f64,
    /// Moisture content (%)
    pub moisture: f64,
    /// Currency per ton
    #[serde(alias = "cost")]
    pub unit_cost: f64,
    /// Maximum obtainable quantity (tons)
    pub available: f64,
}

impl CoalSource {
    /// Value of one quality attribute for this source.
    pub fn attribute(&self, attr: QualityAttribute) -> f64 {
        match attr {
            QualityAttribute::Gcv => self.gcv,
            QualityAttribute::Ash => self.ash,
            QualityAttribute::Sulfur => self.sulfur,
            QualityAttribute::Moisture => self.moisture,
        }
    }
}

/// Target blend specification.
///
/// Any bound left as `None` leaves that attribute unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetSpecification {
    /// Minimum blended GCV (kcal/kg)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gcv_min: Option<f64>,
    /// Maximum blended ash (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ash_max: Option<f64>,
    /// Maximum blended sulfur (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sulfur_max: Option<f64>,
    /// Maximum blended moisture (%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moisture_max: Option<f64>,
    /// Required total tonnage (equality constraint)
    pub total_required: f64,
}

impl TargetSpecification {
    /// Bound configured for an attribute, if any.
    pub fn bound(&self, attr: QualityAttribute) -> Option<f64> {
        match attr {
            QualityAttribute::Gcv => self.gcv_min,
            QualityAttribute::Ash => self.ash_max,
            QualityAttribute::Sulfur => self.sulfur_max,
            QualityAttribute::Moisture => self.moisture_max,
        }
    }

    /// Attributes that carry a bound, in canonical order.
    pub fn bounded_attributes(&self) -> impl Iterator<Item = (QualityAttribute, f64)> + '_ {
        QualityAttribute::ALL
            .into_iter()
            .filter_map(|attr| self.bound(attr).map(|b| (attr, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_accepts_cost_alias() {
        let json = r#"{"name":"A","gcv":6000,"ash":10,"sulfur":0.5,"moisture":8,"cost":100,"available":10000}"#;
        let source: CoalSource = serde_json::from_str(json).unwrap();
        assert_eq!(source.unit_cost, 100.0);
        assert_eq!(source.attribute(QualityAttribute::Sulfur), 0.5);
    }

    #[test]
    fn missing_bounds_deserialize_as_none() {
        let target: TargetSpecification =
            serde_json::from_str(r#"{"gcv_min":5800,"total_required":5000}"#).unwrap();
        assert_eq!(target.gcv_min, Some(5800.0));
        assert!(target.ash_max.is_none());
        let bounded: Vec<_> = target.bounded_attributes().collect();
        assert_eq!(bounded, vec![(QualityAttribute::Gcv, 5800.0)]);
    }
}
