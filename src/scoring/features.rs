use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};
use thiserror::Error;

pub const FEATURE_COUNT: usize = 5;

pub const UNKNOWN_STUDENT_ID: &str = "N/A";

/// Required inputs, declared in the column order the classifier was fitted on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, IntoStaticStr,
)]
pub enum FeatureName {
    #[strum(to_string = "Attendance")]
    Attendance,
    #[strum(to_string = "Internal Test 1")]
    InternalTest1,
    #[strum(to_string = "Internal Test 2")]
    InternalTest2,
    #[strum(to_string = "Assignment")]
    Assignment,
    #[strum(to_string = "Study Hours")]
    StudyHours,
}

impl FeatureName {
    pub fn ordered() -> Vec<FeatureName> {
        Self::iter().collect()
    }

    pub fn ordered_names() -> Vec<&'static str> {
        Self::iter().map(|f| f.into()).collect()
    }

    pub fn key(&self) -> &'static str {
        self.into()
    }
}

impl Serialize for FeatureName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required features: {}", join_names(.0))]
    MissingFeatures(Vec<FeatureName>),
}

impl ValidationError {
    pub fn missing(&self) -> &[FeatureName] {
        match self {
            Self::MissingFeatures(names) => names,
        }
    }
}

fn join_names(names: &[FeatureName]) -> String {
    names
        .iter()
        .map(|n| n.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Caller-supplied input keyed by display name, e.g. `"Internal Test 1"`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<String>,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_student_id(mut self, id: impl Into<String>) -> Self {
        self.student_id = Some(id.into());
        self
    }

    pub fn with(mut self, feature: FeatureName, value: f64) -> Self {
        self.values.insert(feature.key().to_string(), value);
        self
    }

    pub fn get(&self, feature: FeatureName) -> Option<f64> {
        self.values.get(feature.key()).copied()
    }

    pub fn missing_features(&self) -> Vec<FeatureName> {
        missing_features(self)
    }

    pub fn validate(&self) -> Result<StudentFeatures, ValidationError> {
        StudentFeatures::try_from(self)
    }
}

pub fn missing_features(record: &FeatureRecord) -> Vec<FeatureName> {
    FeatureName::iter()
        .filter(|f| !record.values.contains_key(f.key()))
        .collect()
}

/// A record whose five required features are known to be present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StudentFeatures {
    pub attendance: f64,
    pub test1: f64,
    pub test2: f64,
    pub assignment: f64,
    pub study_hours: f64,
}

impl StudentFeatures {
    pub fn to_vector(&self) -> [f64; FEATURE_COUNT] {
        let mut vector = [0.0; FEATURE_COUNT];
        for (slot, feature) in vector.iter_mut().zip(FeatureName::iter()) {
            *slot = self.value(feature);
        }
        vector
    }

    pub fn value(&self, feature: FeatureName) -> f64 {
        match feature {
            FeatureName::Attendance => self.attendance,
            FeatureName::InternalTest1 => self.test1,
            FeatureName::InternalTest2 => self.test2,
            FeatureName::Assignment => self.assignment,
            FeatureName::StudyHours => self.study_hours,
        }
    }
}

impl TryFrom<&FeatureRecord> for StudentFeatures {
    type Error = ValidationError;

    fn try_from(record: &FeatureRecord) -> Result<Self, Self::Error> {
        let missing = missing_features(record);
        if !missing.is_empty() {
            return Err(ValidationError::MissingFeatures(missing));
        }

        let value = |f: FeatureName| record.get(f).unwrap_or_default();
        Ok(Self {
            attendance: value(FeatureName::Attendance),
            test1: value(FeatureName::InternalTest1),
            test2: value(FeatureName::InternalTest2),
            assignment: value(FeatureName::Assignment),
            study_hours: value(FeatureName::StudyHours),
        })
    }
}
