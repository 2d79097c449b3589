//! Historical hazard dataset ingestion.
//!
//! Datasets are CSV exports of per-process risk assessment sheets. The
//! column headers vary between sheets and languages (Korean originals,
//! bilingual exports), so loading normalizes headers through alias
//! tables, coerces the numeric ratings, and recomputes the derived
//! score and grade. A built-in sample dataset stands in when the named
//! file does not exist.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assess::grading::{grade_of, RiskGrade};
use crate::core::errors::ApiError;

/// Rating used when a row is missing frequency or intensity.
const DEFAULT_RATING: i64 = 3;

/// Improvement text used when a row has none.
const DEFAULT_IMPROVEMENT_PLAN: &str =
    "1) Conduct regular worker safety training 2) Reinforce site supervision and inspections";

/// One row of historical assessment data. Immutable once loaded; the
/// assessment flow only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardRecord {
    pub activity: String,
    pub hazard: String,
    pub damage_type: String,
    pub frequency: i64,
    pub intensity: i64,
    pub improvement_plan: String,
}

impl HazardRecord {
    /// Composite risk score T, always derived from the ratings.
    pub fn risk_score(&self) -> i64 {
        self.frequency * self.intensity
    }

    pub fn grade(&self) -> RiskGrade {
        grade_of(self.risk_score())
    }

    /// Text embedded for retrieval: activity, hazard and damage type
    /// joined into one passage.
    pub fn content(&self) -> String {
        let mut parts = vec![self.activity.as_str(), self.hazard.as_str()];
        if !self.damage_type.is_empty() {
            parts.push(self.damage_type.as_str());
        }
        parts.join(" ")
    }
}

// Header aliases per logical column, tried in order. Korean headers come
// from the original assessment sheets, the rest from bilingual exports.
const ACTIVITY_ALIASES: &[&str] = &["작업활동 및 내용", "work & contents", "work activity", "activity"];
const HAZARD_ALIASES: &[&str] = &[
    "유해위험요인 및 환경측면 영향",
    "hazard & risk",
    "hazard",
];
const DAMAGE_ALIASES: &[&str] = &["피해형태 및 환경영향", "damage & effect", "damage type", "damage"];
const FREQUENCY_ALIASES: &[&str] = &["빈도", "frequency"];
const INTENSITY_ALIASES: &[&str] = &["강도", "severity", "intensity"];
const IMPROVEMENT_ALIASES: &[&str] = &[
    "개선대책 및 세부관리방안",
    "개선대책",
    "개선방안",
    "improvement measures",
    "improvement plan",
    "corrective action",
    "countermeasures",
];

fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    for alias in aliases {
        let alias_lower = alias.to_lowercase();
        if let Some(idx) = headers
            .iter()
            .position(|h| h.to_lowercase().contains(&alias_lower))
        {
            return Some(idx);
        }
    }
    None
}

fn parse_rating(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .map(|v| v.round() as i64)
        .unwrap_or(DEFAULT_RATING)
}

/// Resolve a dataset name to its CSV path.
pub fn dataset_path(data_dir: &Path, name: &str) -> PathBuf {
    data_dir.join(format!("{name}.csv"))
}

/// Load the named dataset, or the built-in sample data when the file
/// does not exist. A file that exists but yields no usable rows is a
/// configuration problem and surfaces as a hard error.
pub fn load_dataset(data_dir: &Path, name: &str) -> Result<Vec<HazardRecord>, ApiError> {
    let path = dataset_path(data_dir, name);
    if !path.exists() {
        tracing::warn!(
            "dataset file {} not found, using built-in sample data",
            path.display()
        );
        return Ok(sample_records());
    }

    let records = read_csv(&path)?;
    if records.is_empty() {
        return Err(ApiError::BadRequest(format!(
            "dataset '{name}' contains no usable rows"
        )));
    }

    tracing::info!("loaded {} records from dataset '{}'", records.len(), name);
    Ok(records)
}

fn read_csv(path: &Path) -> Result<Vec<HazardRecord>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ApiError::BadRequest(format!("cannot read dataset file: {e}")))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ApiError::BadRequest(format!("cannot read dataset headers: {e}")))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let activity_col = find_column(&headers, ACTIVITY_ALIASES);
    let hazard_col = find_column(&headers, HAZARD_ALIASES);
    let damage_col = find_column(&headers, DAMAGE_ALIASES);
    let frequency_col = find_column(&headers, FREQUENCY_ALIASES);
    let intensity_col = find_column(&headers, INTENSITY_ALIASES);
    let improvement_col = find_column(&headers, IMPROVEMENT_ALIASES);

    let (activity_col, hazard_col) = match (activity_col, hazard_col) {
        (Some(a), Some(h)) => (a, h),
        _ => {
            return Err(ApiError::BadRequest(
                "dataset is missing the activity or hazard column".to_string(),
            ))
        }
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| ApiError::BadRequest(format!("malformed dataset row: {e}")))?;

        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or("").trim();

        let activity = field(Some(activity_col)).to_string();
        let hazard = field(Some(hazard_col)).to_string();
        // Rows with neither an activity nor a hazard carry no signal.
        if activity.is_empty() && hazard.is_empty() {
            continue;
        }

        let improvement = field(improvement_col);
        records.push(HazardRecord {
            activity,
            hazard,
            damage_type: field(damage_col).to_string(),
            frequency: parse_rating(frequency_col.and_then(|i| row.get(i))),
            intensity: parse_rating(intensity_col.and_then(|i| row.get(i))),
            improvement_plan: if improvement.is_empty() {
                DEFAULT_IMPROVEMENT_PLAN.to_string()
            } else {
                improvement.to_string()
            },
        });
    }

    Ok(records)
}

/// Built-in fallback corpus, used when no dataset file is available.
pub fn sample_records() -> Vec<HazardRecord> {
    let rows: [(&str, &str, &str, i64, i64, &str); 10] = [
        (
            "Unloading of steel structure materials using forklift at temporary site storage area",
            "Fall of load due to multiple lifting",
            "Injury from falling objects",
            3,
            5,
            "1) Install proper rigging equipment 2) Conduct pre-lift safety checks 3) Maintain clear communication",
        ),
        (
            "Installation of Concrete / CMU blocks",
            "Fall due to insufficient working platform",
            "Fall injury",
            3,
            5,
            "1) Install missing scaffold planks 2) Use full body harness 3) Install safety railings",
        ),
        (
            "Excavation and backfill work",
            "Cave-in due to unstable soil conditions",
            "Burial and crushing",
            4,
            4,
            "1) Proper soil analysis 2) Install shoring system 3) Regular inspection",
        ),
        (
            "Steel reinforcement installation",
            "Cut injury from rebar handling",
            "Laceration",
            2,
            3,
            "1) Use proper PPE 2) Safe handling procedures 3) Tool maintenance",
        ),
        (
            "Concrete pouring and finishing",
            "Chemical exposure from concrete additives",
            "Chemical burns",
            2,
            4,
            "1) Proper ventilation 2) Use appropriate PPE 3) Material safety procedures",
        ),
        (
            "Scaffolding assembly and dismantling",
            "Fall from height during assembly",
            "Fall from height",
            4,
            5,
            "1) Competent person supervision 2) Fall protection system 3) Regular inspection",
        ),
        (
            "Electrical wiring and installation",
            "Electric shock from live wires",
            "Electrocution",
            3,
            5,
            "1) LOTO procedures 2) Qualified electrician 3) Proper insulation",
        ),
        (
            "Welding operations",
            "Fire and explosion from welding",
            "Burns and fire",
            2,
            4,
            "1) Fire watch personnel 2) Proper ventilation 3) Hot work permits",
        ),
        (
            "Heavy equipment operation",
            "Struck by moving equipment",
            "Impact injury",
            3,
            4,
            "1) Designated traffic routes 2) Spotters 3) Equipment maintenance",
        ),
        (
            "Material handling and transportation",
            "Musculoskeletal injury from manual handling",
            "Strain and sprain",
            4,
            2,
            "1) Mechanical aids 2) Proper lifting techniques 3) Team lifting",
        ),
    ];

    rows.into_iter()
        .map(
            |(activity, hazard, damage, frequency, intensity, plan)| HazardRecord {
                activity: activity.to_string(),
                hazard: hazard.to_string(),
                damage_type: damage.to_string(),
                frequency,
                intensity,
                improvement_plan: plan.to_string(),
            },
        )
        .collect()
}
