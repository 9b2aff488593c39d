use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::record::HistoryRecord;
use crate::scoring::{round2, PerformanceCategory};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub by_category: BTreeMap<PerformanceCategory, usize>,
    pub average_score: f64,
}

impl Statistics {
    pub fn count(&self, category: PerformanceCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or(0)
    }
}

/// Reduces a full history to totals. Categories that never occur are absent
/// from `by_category` rather than present with a zero count.
pub fn summarize(records: &[HistoryRecord]) -> Statistics {
    if records.is_empty() {
        return Statistics::default();
    }

    let mut by_category = BTreeMap::new();
    let mut score_sum = 0.0;
    for record in records {
        *by_category.entry(record.category).or_insert(0) += 1;
        score_sum += f64::from(record.predicted_score);
    }

    Statistics {
        total: records.len(),
        by_category,
        average_score: round2(score_sum / records.len() as f64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Contributions, PredictionResult, StudentFeatures};

    fn record(category: PerformanceCategory) -> HistoryRecord {
        let result = PredictionResult {
            predicted_score: category.predicted_score(),
            category,
            contributions: Contributions::default(),
            confidence: category.confidence(),
        };
        HistoryRecord::new(None, &StudentFeatures::default(), &result)
    }

    #[test]
    fn test_empty_history() {
        let stats = summarize(&[]);
        assert_eq!(stats.total, 0);
        assert!(stats.by_category.is_empty());
        assert_eq!(stats.average_score, 0.0);
    }

    #[test]
    fn test_counts_and_average() {
        let records = vec![
            record(PerformanceCategory::Excellent),
            record(PerformanceCategory::Good),
            record(PerformanceCategory::Good),
            record(PerformanceCategory::Poor),
        ];
        let stats = summarize(&records);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.count(PerformanceCategory::Good), 2);
        assert_eq!(stats.count(PerformanceCategory::Excellent), 1);
        assert_eq!(stats.count(PerformanceCategory::Average), 0);
        assert!(!stats.by_category.contains_key(&PerformanceCategory::Average));
        // (92 + 82 + 82 + 55) / 4 = 77.75
        assert_eq!(stats.average_score, 77.75);
    }

    #[test]
    fn test_average_rounded_to_two_decimals() {
        let records = vec![
            record(PerformanceCategory::Excellent),
            record(PerformanceCategory::Good),
            record(PerformanceCategory::Poor),
        ];
        // 229 / 3 = 76.333...
        assert_eq!(summarize(&records).average_score, 76.33);
    }

    #[test]
    fn test_serializes_category_keys_as_names() {
        let stats = summarize(&[record(PerformanceCategory::Average)]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["by_category"]["Average"], 1);
        assert_eq!(json["average_score"], 72.0);
    }
}
