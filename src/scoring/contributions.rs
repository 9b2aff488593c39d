use serde::{Deserialize, Serialize};

use super::features::StudentFeatures;

pub const ATTENDANCE_WEIGHT: f64 = 25.0;
pub const TESTS_WEIGHT: f64 = 35.0;
pub const ASSIGNMENT_WEIGHT: f64 = 15.0;
pub const STUDY_WEIGHT: f64 = 25.0;

pub const ATTENDANCE_MAX: f64 = 100.0;
pub const TESTS_COMBINED_MAX: f64 = 80.0;
pub const ASSIGNMENT_MAX: f64 = 10.0;
pub const STUDY_HOURS_CAP: f64 = 8.0;

/// Explanatory split of a student's profile into four weighted parts.
/// Not used for classification.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Contributions {
    pub attendance: f64,
    pub tests: f64,
    pub assignment: f64,
    pub study_hours: f64,
}

impl Contributions {
    pub fn total(&self) -> f64 {
        self.attendance + self.tests + self.assignment + self.study_hours
    }

    pub fn as_pairs(&self) -> [(&'static str, f64); 4] {
        [
            ("attendance", self.attendance),
            ("tests", self.tests),
            ("assignment", self.assignment),
            ("study_hours", self.study_hours),
        ]
    }
}

pub fn calculate_contributions(features: &StudentFeatures) -> Contributions {
    let attendance = (features.attendance / ATTENDANCE_MAX) * ATTENDANCE_WEIGHT;
    let tests = ((features.test1 + features.test2) / TESTS_COMBINED_MAX) * TESTS_WEIGHT;
    let assignment = (features.assignment / ASSIGNMENT_MAX) * ASSIGNMENT_WEIGHT;
    let study_hours = study_fraction(features.study_hours) * STUDY_WEIGHT;

    Contributions {
        attendance: round2(attendance),
        tests: round2(tests),
        assignment: round2(assignment),
        study_hours: round2(study_hours),
    }
}

pub(crate) fn study_fraction(study_hours: f64) -> f64 {
    (study_hours / STUDY_HOURS_CAP).min(1.0)
}

/// Two-decimal rounding of the exact binary value, ties to even.
///
/// Scaling by 100 first would round twice: 50.1 / 100 * 25 is stored just
/// above 12.525 but the product with 100 lands on 1252.5 exactly.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(attendance: f64, t1: f64, t2: f64, assignment: f64, hours: f64) -> StudentFeatures {
        StudentFeatures {
            attendance,
            test1: t1,
            test2: t2,
            assignment,
            study_hours: hours,
        }
    }

    #[test]
    fn test_full_marks_contribute_hundred() {
        let c = calculate_contributions(&features(100.0, 40.0, 40.0, 10.0, 8.0));
        assert_eq!(c.attendance, 25.0);
        assert_eq!(c.tests, 35.0);
        assert_eq!(c.assignment, 15.0);
        assert_eq!(c.study_hours, 25.0);
        assert_eq!(c.total(), 100.0);
    }

    #[test]
    fn test_poor_profile_breakdown() {
        let c = calculate_contributions(&features(50.0, 15.0, 15.0, 4.0, 1.0));
        assert_eq!(c.attendance, 12.5);
        assert_eq!(c.tests, 13.12);
        assert_eq!(c.assignment, 6.0);
        assert_eq!(c.study_hours, 3.12);
    }

    #[test]
    fn test_study_hours_capped() {
        let c = calculate_contributions(&features(0.0, 0.0, 0.0, 0.0, 20.0));
        assert_eq!(c.study_hours, 25.0);
    }

    #[test]
    fn test_out_of_range_values_pass_through() {
        let c = calculate_contributions(&features(150.0, 50.0, 50.0, 12.0, 8.0));
        assert_eq!(c.attendance, 37.5);
        assert_eq!(c.tests, 43.75);
        assert_eq!(c.assignment, 18.0);
        assert!(c.total() > 100.0);
    }

    #[test]
    fn test_nominal_range_sum_bounded() {
        let steps = [0.0, 0.25, 0.5, 0.75, 1.0];
        for a in steps {
            for t in steps {
                for s in steps {
                    for h in steps {
                        let c = calculate_contributions(&features(
                            a * 100.0,
                            t * 40.0,
                            (1.0 - t) * 40.0,
                            s * 10.0,
                            h * 8.0,
                        ));
                        assert!(c.total() <= 100.0 + 1e-9);
                        for (_, v) in c.as_pairs() {
                            assert!(v >= 0.0);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(13.125), 13.12);
        assert_eq!(round2(3.125), 3.12);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_round2_uses_exact_value() {
        assert_eq!(round2(50.1 / 100.0 * 25.0), 12.53);
        let c = calculate_contributions(&features(50.1, 15.0, 15.0, 4.0, 1.0));
        assert_eq!(c.attendance, 12.53);
        assert_eq!(round2(-1.005), -1.0);
    }
}
