//! Session-scoped assessment history.
//!
//! Lives in process memory only; persistence is the hosting
//! application's concern. Mirrors the statistics the assessment UI used
//! to aggregate per session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assess::grading::RiskGrade;
use crate::assess::types::Assessment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub assessment: Assessment,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistorySummary {
    pub total: usize,
    /// Assessments graded A (highest risk band).
    pub high_risk: usize,
    pub average_risk_score: f64,
    pub average_reduction_rate: f64,
}

#[derive(Debug, Default)]
pub struct AssessmentHistory {
    entries: Vec<HistoryEntry>,
}

impl AssessmentHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self, assessment: Assessment) -> HistoryEntry {
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            assessment,
        };
        self.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> HistorySummary {
        let total = self.entries.len();
        if total == 0 {
            return HistorySummary {
                total: 0,
                high_risk: 0,
                average_risk_score: 0.0,
                average_reduction_rate: 0.0,
            };
        }

        let high_risk = self
            .entries
            .iter()
            .filter(|e| e.assessment.result.grade == RiskGrade::A)
            .count();
        let average_risk_score = self
            .entries
            .iter()
            .map(|e| e.assessment.result.risk_score as f64)
            .sum::<f64>()
            / total as f64;
        let average_reduction_rate = self
            .entries
            .iter()
            .map(|e| e.assessment.result.risk_reduction_rate)
            .sum::<f64>()
            / total as f64;

        HistorySummary {
            total,
            high_risk,
            average_risk_score,
            average_reduction_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assess::types::AssessmentResult;
    use crate::core::language::Language;

    fn assessment(risk_score: i64, grade: RiskGrade, rate: f64) -> Assessment {
        Assessment {
            result: AssessmentResult {
                activity: "test".to_string(),
                hazard: "test".to_string(),
                frequency: 3,
                intensity: 3,
                risk_score,
                grade,
                improvement_plan: "1) test".to_string(),
                improved_frequency: 1,
                improved_intensity: 1,
                improved_risk_score: 1,
                improved_grade: RiskGrade::E,
                risk_reduction_rate: rate,
                output_language: Language::English,
            },
            similar: vec![],
            confidence: 80.0,
        }
    }

    #[test]
    fn saved_entries_are_retrievable_by_id() {
        let mut history = AssessmentHistory::new();
        let id = history.save(assessment(12, RiskGrade::B, 50.0)).id;

        assert_eq!(history.len(), 1);
        let entry = history.get(id).expect("entry");
        assert_eq!(entry.assessment.result.risk_score, 12);
        assert!(history.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn summary_aggregates_over_entries() {
        let mut history = AssessmentHistory::new();
        history.save(assessment(20, RiskGrade::A, 80.0));
        history.save(assessment(10, RiskGrade::B, 40.0));
        history.save(assessment(6, RiskGrade::C, -30.0));

        let summary = history.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.high_risk, 1);
        assert!((summary.average_risk_score - 12.0).abs() < 1e-9);
        assert!((summary.average_reduction_rate - 30.0).abs() < 1e-9);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = AssessmentHistory::new().summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_risk_score, 0.0);
    }
}
