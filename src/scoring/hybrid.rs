use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;

use super::contributions::{calculate_contributions, study_fraction, Contributions};
use super::features::{FeatureName, StudentFeatures};
use crate::model::{BinaryClassifier, ModelLabel};

pub const TEST_MAX: f64 = 40.0;
pub const ASSIGNMENT_MAX: f64 = 10.0;
pub const ATTENDANCE_MAX: f64 = 100.0;

pub const WEIGHT_TESTS: f64 = 35.0;
pub const WEIGHT_ASSIGNMENT: f64 = 15.0;
pub const WEIGHT_ATTENDANCE: f64 = 25.0;
pub const WEIGHT_STUDY: f64 = 25.0;

pub const EXCELLENT_THRESHOLD: f64 = 85.0;
pub const AVERAGE_THRESHOLD: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("non-finite value for {feature}: {value}")]
    NonFiniteFeature { feature: FeatureName, value: f64 },
    #[error("model produced a non-finite output")]
    NonFiniteOutput,
    #[error("inference failed: {0}")]
    Inference(String),
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
pub enum PerformanceCategory {
    Poor,
    Average,
    Good,
    Excellent,
}

impl PerformanceCategory {
    /// Representative score for the band; the only four values ever emitted.
    pub fn predicted_score(&self) -> u8 {
        match self {
            Self::Excellent => 92,
            Self::Good => 82,
            Self::Average => 72,
            Self::Poor => 55,
        }
    }

    pub fn confidence(&self) -> Confidence {
        Confidence::from_score(self.predicted_score())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, IntoStaticStr, Serialize, Deserialize,
)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub const HIGH_THRESHOLD: u8 = 85;
    pub const MEDIUM_THRESHOLD: u8 = 70;

    pub fn from_score(score: u8) -> Self {
        if score >= Self::HIGH_THRESHOLD {
            Confidence::High
        } else if score >= Self::MEDIUM_THRESHOLD {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_score: u8,
    pub category: PerformanceCategory,
    pub contributions: Contributions,
    pub confidence: Confidence,
}

/// Everything that went into a [`PredictionResult`], kept for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assessment {
    pub features: StudentFeatures,
    pub label: ModelLabel,
    pub calculated_score: f64,
    pub result: PredictionResult,
}

pub fn calculated_score(features: &StudentFeatures) -> f64 {
    let test_avg = (features.test1 + features.test2) / 2.0;
    let test_score = (test_avg / TEST_MAX) * WEIGHT_TESTS;
    let assignment_score = (features.assignment / ASSIGNMENT_MAX) * WEIGHT_ASSIGNMENT;
    let attendance_score = (features.attendance / ATTENDANCE_MAX) * WEIGHT_ATTENDANCE;
    let study_score = study_fraction(features.study_hours) * WEIGHT_STUDY;

    test_score + assignment_score + attendance_score + study_score
}

/// The model picks the class, the calculated score picks the band within it.
pub fn reconcile(label: ModelLabel, calculated_score: f64) -> PerformanceCategory {
    match label {
        ModelLabel::Higher if calculated_score >= EXCELLENT_THRESHOLD => {
            PerformanceCategory::Excellent
        }
        ModelLabel::Higher => PerformanceCategory::Good,
        ModelLabel::Lower if calculated_score >= AVERAGE_THRESHOLD => PerformanceCategory::Average,
        ModelLabel::Lower => PerformanceCategory::Poor,
    }
}

pub fn evaluate(
    model: &dyn BinaryClassifier,
    features: &StudentFeatures,
) -> Result<Assessment, ScoringError> {
    let label = model.predict(&features.to_vector())?;
    let calculated_score = calculated_score(features);
    let category = reconcile(label, calculated_score);

    let result = PredictionResult {
        predicted_score: category.predicted_score(),
        category,
        contributions: calculate_contributions(features),
        confidence: category.confidence(),
    };

    Ok(Assessment {
        features: *features,
        label,
        calculated_score,
        result,
    })
}

pub fn score(
    model: &dyn BinaryClassifier,
    features: &StudentFeatures,
) -> Result<PredictionResult, ScoringError> {
    evaluate(model, features).map(|assessment| assessment.result)
}
