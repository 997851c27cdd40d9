//! Risk categories derived from the continuous AQI target.

use serde::{Deserialize, Serialize};

/// Human-readable label reported for out-of-range class indices.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Discrete health-risk category predicted by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskClass {
    Low,
    Moderate,
    High,
}

impl RiskClass {
    /// All categories in class-index order.
    pub const ALL: [RiskClass; 3] = [RiskClass::Low, RiskClass::Moderate, RiskClass::High];

    /// Number of risk categories.
    pub const COUNT: usize = Self::ALL.len();

    /// Map a continuous AQI value to its risk category.
    ///
    /// Boundary values belong to the lower category: 30.0 is `Low` and 60.0
    /// is `Moderate`.
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi <= 30.0 {
            RiskClass::Low
        } else if aqi <= 60.0 {
            RiskClass::Moderate
        } else {
            RiskClass::High
        }
    }

    /// Class index used for labels and model outputs.
    pub fn index(self) -> usize {
        match self {
            RiskClass::Low => 0,
            RiskClass::Moderate => 1,
            RiskClass::High => 2,
        }
    }

    /// Inverse of [`RiskClass::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Stable identifier stored in persisted models.
    pub fn id(self) -> &'static str {
        match self {
            RiskClass::Low => "low",
            RiskClass::Moderate => "moderate",
            RiskClass::High => "high",
        }
    }

    /// Human-readable label for reports and interactive output.
    pub fn label(self) -> &'static str {
        match self {
            RiskClass::Low => "Low Risk",
            RiskClass::Moderate => "Moderate Risk",
            RiskClass::High => "High Risk",
        }
    }

    /// Ordered class identifiers for a freshly trained model.
    pub fn class_ids() -> Vec<String> {
        Self::ALL.iter().map(|class| class.id().to_string()).collect()
    }
}

/// Label for a class index, falling back to [`UNKNOWN_LABEL`] out of range.
pub fn label_for_index(index: usize) -> &'static str {
    RiskClass::from_index(index)
        .map(RiskClass::label)
        .unwrap_or(UNKNOWN_LABEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_assign_boundary_values_to_lower_class() {
        assert_eq!(RiskClass::from_aqi(0.0), RiskClass::Low);
        assert_eq!(RiskClass::from_aqi(30.0), RiskClass::Low);
        assert_eq!(RiskClass::from_aqi(30.000001), RiskClass::Moderate);
        assert_eq!(RiskClass::from_aqi(60.0), RiskClass::Moderate);
        assert_eq!(RiskClass::from_aqi(60.000001), RiskClass::High);
        assert_eq!(RiskClass::from_aqi(500.0), RiskClass::High);
    }

    #[test]
    fn indices_round_trip() {
        for class in RiskClass::ALL {
            assert_eq!(RiskClass::from_index(class.index()), Some(class));
        }
        assert_eq!(RiskClass::from_index(3), None);
    }

    #[test]
    fn unknown_label_for_out_of_range_index() {
        assert_eq!(label_for_index(1), "Moderate Risk");
        assert_eq!(label_for_index(9), UNKNOWN_LABEL);
    }
}
