//! Risk grading and reduction arithmetic.
//!
//! The grade boundaries are a regulatory-style classification: they must
//! match the table exactly, and every integer maps to exactly one grade.

use serde::{Deserialize, Serialize};

/// Letter grade derived from the composite risk score T.
///
/// `A` is the highest risk band, `E` the lowest; scores outside 1..=25
/// grade as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskGrade {
    A,
    B,
    C,
    D,
    E,
    Unknown,
}

impl std::fmt::Display for RiskGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskGrade::A => "A",
            RiskGrade::B => "B",
            RiskGrade::C => "C",
            RiskGrade::D => "D",
            RiskGrade::E => "E",
            RiskGrade::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Map a composite risk score `T = frequency × intensity` to its grade.
pub fn grade_of(score: i64) -> RiskGrade {
    match score {
        16..=25 => RiskGrade::A,
        10..=15 => RiskGrade::B,
        5..=9 => RiskGrade::C,
        3..=4 => RiskGrade::D,
        1..=2 => RiskGrade::E,
        _ => RiskGrade::Unknown,
    }
}

/// Percentage reduction between an original and an improved score.
///
/// Negative results (regression) are valid outcomes. Not clamped; an
/// out-of-domain improved score shows up in the number rather than being
/// sanitized away.
pub fn reduction_rate(original: i64, improved: i64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (original - improved) as f64 / original as f64 * 100.0
}

/// Synthetic post-improvement rating for few-shot examples.
///
/// Historical rows rarely record their post-improvement state, so the
/// improvement prompt bootstraps one: each dimension drops one level,
/// floored at 1. A heuristic, not ground truth.
pub fn assumed_improvement(value: i64) -> i64 {
    (value - 1).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_boundaries_match_the_table() {
        assert_eq!(grade_of(25), RiskGrade::A);
        assert_eq!(grade_of(16), RiskGrade::A);
        assert_eq!(grade_of(15), RiskGrade::B);
        assert_eq!(grade_of(12), RiskGrade::B);
        assert_eq!(grade_of(10), RiskGrade::B);
        assert_eq!(grade_of(9), RiskGrade::C);
        assert_eq!(grade_of(5), RiskGrade::C);
        assert_eq!(grade_of(4), RiskGrade::D);
        assert_eq!(grade_of(3), RiskGrade::D);
        assert_eq!(grade_of(2), RiskGrade::E);
        assert_eq!(grade_of(1), RiskGrade::E);
    }

    #[test]
    fn out_of_domain_scores_grade_unknown() {
        assert_eq!(grade_of(0), RiskGrade::Unknown);
        assert_eq!(grade_of(-7), RiskGrade::Unknown);
        assert_eq!(grade_of(26), RiskGrade::Unknown);
        assert_eq!(grade_of(1000), RiskGrade::Unknown);
    }

    #[test]
    fn reduction_rate_basic_cases() {
        assert!((reduction_rate(12, 2) - 83.333_333).abs() < 1e-4);
        assert_eq!(reduction_rate(0, 5), 0.0);
        assert_eq!(reduction_rate(10, 12), -20.0);
        assert_eq!(reduction_rate(10, 0), 100.0);
    }

    #[test]
    fn assumed_improvement_floors_at_one() {
        assert_eq!(assumed_improvement(5), 4);
        assert_eq!(assumed_improvement(2), 1);
        assert_eq!(assumed_improvement(1), 1);
    }

    #[test]
    fn pure_functions_are_idempotent() {
        assert_eq!(grade_of(17), grade_of(17));
        assert_eq!(reduction_rate(9, 3), reduction_rate(9, 3));
    }
}
