//! CSV export of a finished assessment.
//!
//! Produces spreadsheet-compatible bytes: the assessment summary block
//! first, then the retrieved similar cases it was grounded on. Column
//! layout is cosmetic and not a stability contract.

use csv::Writer;

use crate::assess::types::{AssessmentResult, RetrievedCase};
use crate::core::errors::ApiError;

pub fn export_csv(
    result: &AssessmentResult,
    similar: &[RetrievedCase],
) -> Result<Vec<u8>, ApiError> {
    let mut wtr = Writer::from_writer(vec![]);

    wtr.write_record([
        "Section",
        "Activity",
        "Hazard",
        "Frequency",
        "Intensity",
        "T",
        "Grade",
        "Improvement Plan",
        "Reduction Rate (%)",
    ])
    .map_err(ApiError::internal)?;

    wtr.write_record([
        "Assessment".to_string(),
        result.activity.clone(),
        result.hazard.clone(),
        result.frequency.to_string(),
        result.intensity.to_string(),
        result.risk_score.to_string(),
        result.grade.to_string(),
        result.improvement_plan.clone(),
        format!("{:.1}", result.risk_reduction_rate),
    ])
    .map_err(ApiError::internal)?;

    wtr.write_record([
        "Improved".to_string(),
        result.activity.clone(),
        result.hazard.clone(),
        result.improved_frequency.to_string(),
        result.improved_intensity.to_string(),
        result.improved_risk_score.to_string(),
        result.improved_grade.to_string(),
        String::new(),
        String::new(),
    ])
    .map_err(ApiError::internal)?;

    for case in similar {
        wtr.write_record([
            "Similar Case".to_string(),
            case.activity.clone(),
            case.hazard.clone(),
            case.frequency.to_string(),
            case.intensity.to_string(),
            case.risk_score.to_string(),
            case.grade.to_string(),
            String::new(),
            format!("{:.1}", case.confidence * 100.0),
        ])
        .map_err(ApiError::internal)?;
    }

    wtr.into_inner()
        .map_err(|e| ApiError::Internal(format!("CSV writer error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assess::grading::RiskGrade;
    use crate::core::language::Language;

    fn result() -> AssessmentResult {
        AssessmentResult {
            activity: "Excavation work".to_string(),
            hazard: "Cave-in".to_string(),
            frequency: 3,
            intensity: 4,
            risk_score: 12,
            grade: RiskGrade::B,
            improvement_plan: "1) Shoring 2) Inspections 3) Training".to_string(),
            improved_frequency: 1,
            improved_intensity: 2,
            improved_risk_score: 2,
            improved_grade: RiskGrade::E,
            risk_reduction_rate: 83.333,
            output_language: Language::English,
        }
    }

    #[test]
    fn export_contains_assessment_and_similar_rows() {
        let case = RetrievedCase {
            activity: "Backfilling".to_string(),
            hazard: "Burial".to_string(),
            frequency: 4,
            intensity: 4,
            risk_score: 16,
            grade: RiskGrade::A,
            distance: 0.5,
            confidence: 1.0 / 1.5,
        };

        let bytes = export_csv(&result(), &[case]).expect("export");
        let text = String::from_utf8(bytes).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();

        // Header, assessment, improved, one similar case.
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("Assessment,Excavation work,Cave-in,3,4,12,B"));
        assert!(lines[2].starts_with("Improved,"));
        assert!(lines[2].contains(",1,2,2,E"));
        assert!(lines[3].starts_with("Similar Case,Backfilling,Burial,4,4,16,A"));
        assert!(lines[1].contains("83.3"));
    }

    #[test]
    fn export_without_similar_cases_still_has_summary() {
        let bytes = export_csv(&result(), &[]).expect("export");
        let text = String::from_utf8(bytes).expect("utf8");
        assert_eq!(text.lines().count(), 3);
    }
}
