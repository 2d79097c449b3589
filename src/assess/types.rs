use serde::{Deserialize, Serialize};

use crate::assess::grading::RiskGrade;
use crate::core::language::Language;
use crate::dataset::HazardRecord;
use crate::retrieval::Retrieved;

/// Parsed frequency / intensity / T triple from the risk-scoring stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScore {
    pub frequency: i64,
    pub intensity: i64,
    pub t: i64,
}

/// One end-to-end assessment. Created fresh per run, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub activity: String,
    pub hazard: String,
    pub frequency: i64,
    pub intensity: i64,
    pub risk_score: i64,
    pub grade: RiskGrade,
    pub improvement_plan: String,
    pub improved_frequency: i64,
    pub improved_intensity: i64,
    pub improved_risk_score: i64,
    pub improved_grade: RiskGrade,
    /// Percentage decrease in T. Negative values report a regression.
    pub risk_reduction_rate: f64,
    pub output_language: Language,
}

/// Snapshot of a retrieved historical case, detached from the pool so it
/// can be serialized into responses, history entries and exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedCase {
    pub activity: String,
    pub hazard: String,
    pub frequency: i64,
    pub intensity: i64,
    pub risk_score: i64,
    pub grade: RiskGrade,
    pub distance: f32,
    pub confidence: f32,
}

impl RetrievedCase {
    pub fn from_retrieved(retrieved: &Retrieved<'_>) -> Self {
        let record: &HazardRecord = retrieved.record;
        Self {
            activity: record.activity.clone(),
            hazard: record.hazard.clone(),
            frequency: record.frequency,
            intensity: record.intensity,
            risk_score: record.risk_score(),
            grade: record.grade(),
            distance: retrieved.hit.distance,
            confidence: retrieved.hit.confidence(),
        }
    }
}

/// Full outcome of one pipeline run: the result plus the retrieved
/// context it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub result: AssessmentResult,
    pub similar: Vec<RetrievedCase>,
    /// Display-only confidence percentage for the retrieval.
    pub confidence: f64,
}
