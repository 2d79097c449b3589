//! Structured-output parsers for the two JSON-bearing stages.
//!
//! Both escalate primary pattern → fallback pattern → heuristic
//! extraction, but they fail differently: the risk parser returns a hard
//! error carrying the raw model text (the caller must not fabricate
//! numbers), while the improvement parser degrades to a default plan so
//! an unparseable improvement never fails the run. Both are pure
//! functions of their input text.

use regex::Regex;
use serde_json::Value;

use crate::assess::types::RiskScore;
use crate::core::errors::ApiError;
use crate::core::language::Language;

fn risk_pattern(language: Language) -> &'static str {
    match language {
        Language::Korean => r#"\{"빈도":\s*([1-5]),\s*"강도":\s*([1-5]),\s*"T":\s*([0-9]+)\}"#,
        Language::English => {
            r#"\{"frequency":\s*([1-5]),\s*"intensity":\s*([1-5]),\s*"T":\s*([0-9]+)\}"#
        }
        Language::Chinese => r#"\{"频率":\s*([1-5]),\s*"强度":\s*([1-5]),\s*"T":\s*([0-9]+)\}"#,
    }
}

/// Languages in parse order: the requested one first, then the rest.
fn language_order(first: Language) -> impl Iterator<Item = Language> {
    std::iter::once(first).chain(Language::ALL.into_iter().filter(move |l| *l != first))
}

/// Extract `(frequency, intensity, T)` from the risk-scoring output.
///
/// Tries the exact JSON shape for each language, then falls back to the
/// first two standalone digits in 1..=5 with `T` recomputed as their
/// product. Fewer than two digit tokens is a definite failure; the raw
/// text rides along in the error for diagnosis.
pub fn parse_risk_output(text: &str, language: Language) -> Result<RiskScore, ApiError> {
    for lang in language_order(language) {
        let pattern = Regex::new(risk_pattern(lang)).expect("static risk pattern");
        if let Some(caps) = pattern.captures(text) {
            let frequency: i64 = caps[1].parse().map_err(ApiError::internal)?;
            let intensity: i64 = caps[2].parse().map_err(ApiError::internal)?;
            let t: i64 = caps[3].parse().map_err(ApiError::internal)?;
            return Ok(RiskScore {
                frequency,
                intensity,
                t,
            });
        }
    }

    let digits = Regex::new(r"\b([1-5])\b").expect("static digit pattern");
    let found: Vec<i64> = digits
        .captures_iter(text)
        .filter_map(|c| c[1].parse().ok())
        .take(2)
        .collect();

    if let [frequency, intensity] = found[..] {
        return Ok(RiskScore {
            frequency,
            intensity,
            t: frequency * intensity,
        });
    }

    Err(ApiError::RiskParse {
        raw: text.to_string(),
    })
}

/// Parsed improvement stage output.
#[derive(Debug, Clone, PartialEq)]
pub struct ImprovementOutcome {
    pub plan: String,
    pub improved_frequency: i64,
    pub improved_intensity: i64,
    pub improved_t: i64,
    /// Model-reported reduction rate; `None` when the model omitted it
    /// and the caller should compute it from the scores.
    pub reduction_rate: Option<f64>,
}

impl ImprovementOutcome {
    /// Full-fallback outcome used when no JSON can be extracted at all.
    pub fn default_fallback(language: Language) -> Self {
        Self {
            plan: default_plan(language).to_string(),
            improved_frequency: 1,
            improved_intensity: 1,
            improved_t: 1,
            reduction_rate: Some(50.0),
        }
    }
}

fn default_plan(language: Language) -> &'static str {
    match language {
        Language::Korean => {
            "1) 작업 전 위험성 검토 및 안전교육 실시 2) 개인보호구 착용 철저 3) 작업구역 통제 및 관리감독 강화"
        }
        Language::English => {
            "1) Conduct a pre-task risk review and safety briefing 2) Enforce personal protective equipment 3) Control the work zone and strengthen supervision"
        }
        Language::Chinese => "1) 作业前进行风险审查和安全教育 2) 严格佩戴个人防护装备 3) 控制作业区域并加强监督管理",
    }
}

// Key aliases per logical field, in the order the original sheets and
// model outputs have been observed to use them.
fn plan_aliases(language: Language) -> &'static [&'static str] {
    match language {
        Language::Korean => &["개선대책", "개선방안", "개선조치"],
        Language::English => &["improvement_measures", "improvement_plan", "improvements"],
        Language::Chinese => &["改进措施", "改进计划"],
    }
}

fn frequency_aliases(language: Language) -> &'static [&'static str] {
    match language {
        Language::Korean => &["개선_후_빈도", "개선후빈도", "개선 후 빈도"],
        Language::English => &["improved_frequency", "new_frequency"],
        Language::Chinese => &["改进后频率", "新频率"],
    }
}

fn intensity_aliases(language: Language) -> &'static [&'static str] {
    match language {
        Language::Korean => &["개선_후_강도", "개선후강도", "개선 후 강도"],
        Language::English => &["improved_intensity", "new_intensity"],
        Language::Chinese => &["改进后强度", "新强度"],
    }
}

fn t_aliases(language: Language) -> &'static [&'static str] {
    match language {
        Language::Korean => &["개선_후_T", "개선후T", "개선 후 T"],
        Language::English => &["improved_T", "new_T"],
        Language::Chinese => &["改进后T值", "新T值"],
    }
}

fn rate_aliases(language: Language) -> &'static [&'static str] {
    match language {
        Language::Korean => &["위험_감소율", "감소율", "위험감소율"],
        Language::English => &["risk_reduction_rate", "reduction_rate"],
        Language::Chinese => &["风险降低率", "降低率"],
    }
}

fn lookup<'a>(
    object: &'a Value,
    language: Language,
    aliases: fn(Language) -> &'static [&'static str],
) -> Option<&'a Value> {
    for lang in language_order(language) {
        for key in aliases(lang) {
            if let Some(value) = object.get(key) {
                return Some(value);
            }
        }
    }
    None
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn value_as_plan(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        // Some models return the measures as a list; join them back into
        // the numbered-text shape downstream consumers expect.
        Value::Array(items) => {
            let joined: Vec<String> = items
                .iter()
                .filter_map(|v| v.as_str().map(|s| s.trim().to_string()))
                .filter(|s| !s.is_empty())
                .collect();
            if joined.is_empty() {
                None
            } else {
                Some(joined.join(" "))
            }
        }
        _ => None,
    }
}

/// Locate the JSON payload inside the model output: a fenced ```json
/// block first, then the outermost brace group, then the whole text.
fn extract_json_str(text: &str) -> String {
    let fenced = Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("static fence pattern");
    if let Some(caps) = fenced.captures(text) {
        return caps[1].to_string();
    }

    let braces = Regex::new(r"(?s)\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("static brace pattern");
    if let Some(m) = braces.find(text) {
        return m.as_str().to_string();
    }

    text.trim().to_string()
}

/// Parse the improvement stage output. Never fails: an unextractable or
/// unparseable payload degrades to the default plan with neutral
/// numbers, and individual missing keys get conservative defaults.
pub fn parse_improvement_output(text: &str, language: Language) -> ImprovementOutcome {
    let json_str = extract_json_str(text);
    let object: Value = match serde_json::from_str(&json_str) {
        Ok(value @ Value::Object(_)) => value,
        _ => {
            tracing::warn!("improvement output not parseable as JSON, using default plan");
            return ImprovementOutcome::default_fallback(language);
        }
    };

    let plan = lookup(&object, language, plan_aliases)
        .and_then(value_as_plan)
        .unwrap_or_else(|| default_plan(language).to_string());
    let improved_frequency = lookup(&object, language, frequency_aliases)
        .and_then(value_as_i64)
        .unwrap_or(2);
    let improved_intensity = lookup(&object, language, intensity_aliases)
        .and_then(value_as_i64)
        .unwrap_or(2);
    // The model's own T is trusted when present, even if it disagrees
    // with the product; only an absent key is recomputed.
    let improved_t = lookup(&object, language, t_aliases)
        .and_then(value_as_i64)
        .unwrap_or(improved_frequency * improved_intensity);
    let reduction_rate = lookup(&object, language, rate_aliases).and_then(value_as_f64);

    ImprovementOutcome {
        plan,
        improved_frequency,
        improved_intensity,
        improved_t,
        reduction_rate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_parser_reads_exact_json() {
        let score =
            parse_risk_output(r#"{"frequency": 3, "intensity": 4, "T": 12}"#, Language::English)
                .expect("parse");
        assert_eq!(
            score,
            RiskScore {
                frequency: 3,
                intensity: 4,
                t: 12
            }
        );
    }

    #[test]
    fn risk_parser_accepts_other_language_shapes() {
        // Korean-shaped answer to an English-language request.
        let score = parse_risk_output(r#"{"빈도": 2, "강도": 5, "T": 10}"#, Language::English)
            .expect("parse");
        assert_eq!(score.frequency, 2);
        assert_eq!(score.intensity, 5);
        assert_eq!(score.t, 10);
    }

    #[test]
    fn risk_parser_falls_back_to_digit_heuristic() {
        let score = parse_risk_output(
            "I think frequency 3 and intensity 4 apply",
            Language::English,
        )
        .expect("parse");
        assert_eq!(
            score,
            RiskScore {
                frequency: 3,
                intensity: 4,
                t: 12
            }
        );
    }

    #[test]
    fn risk_parser_ignores_out_of_range_digits() {
        // 7 and 12 are outside 1..=5; only 4 and 2 qualify.
        let score =
            parse_risk_output("ratings: 7, then 4, then 12, then 2", Language::English).expect("parse");
        assert_eq!(score.frequency, 4);
        assert_eq!(score.intensity, 2);
        assert_eq!(score.t, 8);
    }

    #[test]
    fn risk_parser_fails_definitively_with_raw_text() {
        let err = parse_risk_output("no usable numbers here", Language::English).unwrap_err();
        match err {
            ApiError::RiskParse { raw } => assert_eq!(raw, "no usable numbers here"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn risk_parser_is_deterministic() {
        let text = "frequency 2, intensity 3";
        assert_eq!(
            parse_risk_output(text, Language::English).unwrap(),
            parse_risk_output(text, Language::English).unwrap()
        );
    }

    #[test]
    fn improvement_parser_reads_fenced_json() {
        let text = "Here is my assessment:\n```json\n{\"improvement_measures\": \"1) Shoring 2) Inspections 3) Training\", \"improved_frequency\": 1, \"improved_intensity\": 2, \"improved_T\": 2, \"risk_reduction_rate\": 83.3}\n```";
        let outcome = parse_improvement_output(text, Language::English);

        assert_eq!(outcome.plan, "1) Shoring 2) Inspections 3) Training");
        assert_eq!(outcome.improved_frequency, 1);
        assert_eq!(outcome.improved_intensity, 2);
        assert_eq!(outcome.improved_t, 2);
        assert_eq!(outcome.reduction_rate, Some(83.3));
    }

    #[test]
    fn improvement_parser_accepts_korean_keys() {
        let text = r#"{"개선대책": "1) 보강 2) 점검 3) 교육", "개선_후_빈도": 1, "개선_후_강도": 1, "개선_후_T": 1, "위험_감소율": 90}"#;
        let outcome = parse_improvement_output(text, Language::English);

        assert_eq!(outcome.plan, "1) 보강 2) 점검 3) 교육");
        assert_eq!(outcome.improved_t, 1);
        assert_eq!(outcome.reduction_rate, Some(90.0));
    }

    #[test]
    fn improvement_parser_recomputes_missing_t() {
        let text = r#"{"improvement_measures": "1) a 2) b 3) c", "improved_frequency": 2, "improved_intensity": 3}"#;
        let outcome = parse_improvement_output(text, Language::English);
        assert_eq!(outcome.improved_t, 6);
        assert_eq!(outcome.reduction_rate, None);
    }

    #[test]
    fn improvement_parser_trusts_model_t_over_product() {
        let text = r#"{"improvement_measures": "1) a 2) b 3) c", "improved_frequency": 2, "improved_intensity": 3, "improved_T": 5}"#;
        let outcome = parse_improvement_output(text, Language::English);
        assert_eq!(outcome.improved_t, 5);
    }

    #[test]
    fn improvement_parser_joins_array_plans() {
        let text = r#"{"improvement_measures": ["1) Shoring", "2) Training"], "improved_frequency": 1, "improved_intensity": 1}"#;
        let outcome = parse_improvement_output(text, Language::English);
        assert_eq!(outcome.plan, "1) Shoring 2) Training");
    }

    #[test]
    fn improvement_parser_never_fails() {
        let outcome = parse_improvement_output("completely free-form refusal", Language::English);
        assert_eq!(outcome, ImprovementOutcome::default_fallback(Language::English));
        assert_eq!(outcome.improved_frequency, 1);
        assert_eq!(outcome.improved_intensity, 1);
        assert_eq!(outcome.improved_t, 1);
        assert_eq!(outcome.reduction_rate, Some(50.0));
    }

    #[test]
    fn improvement_parser_is_deterministic() {
        let text = r#"{"improvement_measures": "1) a", "improved_frequency": 2}"#;
        assert_eq!(
            parse_improvement_output(text, Language::English),
            parse_improvement_output(text, Language::English)
        );
    }
}
