use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

use crate::scoring::{PerformanceCategory, PredictionResult, StudentFeatures, UNKNOWN_STUDENT_ID};

pub const COLUMNS: [&str; 9] = [
    "timestamp",
    "student_id",
    "attendance",
    "test1",
    "test2",
    "assignment",
    "study_hours",
    "predicted_score",
    "category",
];

/// Timestamps are kept to microseconds.
pub const TIMESTAMP_SUBSEC_DIGITS: u16 = 6;

/// One persisted scoring event. Field order is the on-disk column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: NaiveDateTime,
    pub student_id: String,
    pub attendance: f64,
    pub test1: f64,
    pub test2: f64,
    pub assignment: f64,
    pub study_hours: f64,
    pub predicted_score: u8,
    pub category: PerformanceCategory,
}

impl HistoryRecord {
    pub fn new(
        student_id: Option<&str>,
        features: &StudentFeatures,
        result: &PredictionResult,
    ) -> Self {
        let now = Local::now().naive_local().trunc_subsecs(TIMESTAMP_SUBSEC_DIGITS);
        Self::at(now, student_id, features, result)
    }

    pub fn at(
        timestamp: NaiveDateTime,
        student_id: Option<&str>,
        features: &StudentFeatures,
        result: &PredictionResult,
    ) -> Self {
        Self {
            timestamp,
            student_id: student_id
                .filter(|id| !id.is_empty())
                .unwrap_or(UNKNOWN_STUDENT_ID)
                .to_string(),
            attendance: features.attendance,
            test1: features.test1,
            test2: features.test2,
            assignment: features.assignment,
            study_hours: features.study_hours,
            predicted_score: result.predicted_score,
            category: result.category,
        }
    }

    pub fn features(&self) -> StudentFeatures {
        StudentFeatures {
            attendance: self.attendance,
            test1: self.test1,
            test2: self.test2,
            assignment: self.assignment,
            study_hours: self.study_hours,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Confidence, Contributions};

    fn result() -> PredictionResult {
        PredictionResult {
            predicted_score: 82,
            category: PerformanceCategory::Good,
            contributions: Contributions::default(),
            confidence: Confidence::Medium,
        }
    }

    #[test]
    fn test_missing_student_id_uses_sentinel() {
        let record = HistoryRecord::new(None, &StudentFeatures::default(), &result());
        assert_eq!(record.student_id, "N/A");

        let record = HistoryRecord::new(Some(""), &StudentFeatures::default(), &result());
        assert_eq!(record.student_id, "N/A");
    }

    #[test]
    fn test_copies_features_and_result() {
        let features = StudentFeatures {
            attendance: 85.0,
            test1: 35.0,
            test2: 34.0,
            assignment: 8.0,
            study_hours: 5.0,
        };
        let record = HistoryRecord::new(Some("S-1"), &features, &result());
        assert_eq!(record.features(), features);
        assert_eq!(record.predicted_score, 82);
        assert_eq!(record.category, PerformanceCategory::Good);
    }

    #[test]
    fn test_timestamp_has_microsecond_precision() {
        let record = HistoryRecord::new(Some("S-1"), &StudentFeatures::default(), &result());
        assert_eq!(record.timestamp.and_utc().timestamp_subsec_nanos() % 1_000, 0);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        let at = NaiveDateTime::parse_from_str("2024-03-05T09:15:42.123456", "%Y-%m-%dT%H:%M:%S%.f")
            .unwrap();
        writer
            .serialize(HistoryRecord::at(at, None, &StudentFeatures::default(), &result()))
            .unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert!(text.starts_with("2024-03-05T09:15:42.123456,N/A,"));
    }

    #[test]
    fn test_header_matches_field_order() {
        let mut writer = csv::Writer::from_writer(Vec::new());
        let record = HistoryRecord::new(Some("S-1"), &StudentFeatures::default(), &result());
        writer.serialize(&record).unwrap();
        let bytes = writer.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().next().unwrap(), COLUMNS.join(","));
    }
}
