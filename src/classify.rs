//! Threshold classification of health-metric readings.
//!
//! This module is the single source of truth for which metrics the service
//! recognizes and how a measured value maps onto a category bucket. It is
//! pure: no I/O, no persistence, no logging.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The set of health metrics the service recognizes.
///
/// One canonical enum is used everywhere (request validation, threshold
/// classification, advice lookup). `Glucose` and `Sugar` name the same
/// underlying measurement (blood glucose) and share thresholds and advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disease {
    Fever,
    BloodPressure,
    Glucose,
    Hypertension,
    Sugar,
    Diabetes,
}

/// All recognized metrics, in display order.
pub const ALL_DISEASES: [Disease; 6] = [
    Disease::Fever,
    Disease::BloodPressure,
    Disease::Glucose,
    Disease::Hypertension,
    Disease::Sugar,
    Disease::Diabetes,
];

impl Disease {
    /// Canonical display name, as persisted and rendered to users.
    pub fn name(&self) -> &'static str {
        match self {
            Disease::Fever => "Fever",
            Disease::BloodPressure => "Blood Pressure",
            Disease::Glucose => "Glucose",
            Disease::Hypertension => "Hypertension",
            Disease::Sugar => "Sugar",
            Disease::Diabetes => "Diabetes",
        }
    }

    /// Measurement unit shown alongside a value.
    pub fn unit(&self) -> &'static str {
        match self {
            Disease::Fever => "°C",
            Disease::BloodPressure | Disease::Hypertension => "mmHg",
            Disease::Glucose | Disease::Sugar | Disease::Diabetes => "mg/dL",
        }
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for metric names outside the recognized set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized metric name: {0}")]
pub struct UnrecognizedMetric(pub String);

impl FromStr for Disease {
    type Err = UnrecognizedMetric;

    /// Names are matched case-insensitively; surrounding whitespace is
    /// ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fever" => Ok(Disease::Fever),
            "blood pressure" => Ok(Disease::BloodPressure),
            "glucose" => Ok(Disease::Glucose),
            "hypertension" => Ok(Disease::Hypertension),
            "sugar" => Ok(Disease::Sugar),
            "diabetes" => Ok(Disease::Diabetes),
            _ => Err(UnrecognizedMetric(s.trim().to_string())),
        }
    }
}

/// Classification bucket derived from a metric's thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Low,
    Normal,
    High,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Low => "low",
            Category::Normal => "normal",
            Category::High => "high",
        })
    }
}

/// (below → low, above → high) bounds per metric.
///
/// Values equal to a bound are normal.
fn thresholds(disease: Disease) -> (f64, f64) {
    match disease {
        Disease::Diabetes => (70.0, 180.0),
        Disease::Glucose | Disease::Sugar => (70.0, 140.0),
        Disease::Hypertension => (120.0, 140.0),
        Disease::Fever => (37.5, 38.5),
        Disease::BloodPressure => (90.0, 140.0),
    }
}

/// Classify a reading against the metric's thresholds.
///
/// Boundaries are exact: a fever reading of 37.5 is normal, 37.49 is low,
/// 38.51 is high. Total over the enum, deterministic, no side effects.
pub fn classify(disease: Disease, value: f64) -> Category {
    let (low_below, high_above) = thresholds(disease);
    if value < low_below {
        Category::Low
    } else if value > high_above {
        Category::High
    } else {
        Category::Normal
    }
}
