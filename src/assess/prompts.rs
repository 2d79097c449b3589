//! Prompt builders for the three generation stages.
//!
//! All three share one shape: a fixed intro (domain context or rating
//! rubric), up to N few-shot examples drawn from the retrieved records,
//! and a query section ending in an explicit output-format instruction.
//! Templates are fixed per language and not editable at runtime; the
//! example caps bound prompt length deterministically.

use crate::assess::grading::{assumed_improvement, reduction_rate};
use crate::core::language::Language;
use crate::retrieval::Retrieved;

/// Build the hazard-prediction prompt: activity/hazard example pairs,
/// then the new activity. Free-text answer, no JSON at this stage.
pub fn hazard_prompt(
    retrieved: &[Retrieved<'_>],
    activity: &str,
    language: Language,
    max_examples: usize,
) -> String {
    let (intro, query_format) = match language {
        Language::Korean => (
            "다음은 건설 현장의 작업활동과 그에 따른 유해위험요인의 예시입니다:\n\n",
            format!(
                "이제 다음 작업활동에 대한 유해위험요인을 예측해주세요. \
                 구체적이고 실무적인 위험요인을 제시하세요:\n작업활동: {activity}\n\n예측된 유해위험요인: "
            ),
        ),
        Language::English => (
            "The following are examples of work activities at construction sites and their associated hazards:\n\n",
            format!(
                "Now, please predict the hazard for the following work activity. \
                 Provide specific and practical risk factors:\nWork Activity: {activity}\n\nPredicted Hazard: "
            ),
        ),
        Language::Chinese => (
            "以下是建筑工地的工作活动及其相关危害的例子:\n\n",
            format!("现在，请预测以下工作活动的危害。请提供具体和实用的风险因素:\n工作活动: {activity}\n\n预测的危害: "),
        ),
    };

    let mut prompt = String::from(intro);
    for (i, item) in retrieved.iter().take(max_examples).enumerate() {
        let record = item.record;
        let example = match language {
            Language::Korean => format!(
                "예시 {n}:\n작업활동: {activity}\n유해위험요인: {hazard}\n위험도: T={t} (등급 {grade})\n\n",
                n = i + 1,
                activity = record.activity,
                hazard = record.hazard,
                t = record.risk_score(),
                grade = record.grade(),
            ),
            Language::English => format!(
                "Example {n}:\nWork Activity: {activity}\nHazard: {hazard}\nRisk Level: T={t} (Grade {grade})\n\n",
                n = i + 1,
                activity = record.activity,
                hazard = record.hazard,
                t = record.risk_score(),
                grade = record.grade(),
            ),
            Language::Chinese => format!(
                "例子 {n}:\n工作活动: {activity}\n危害: {hazard}\n风险等级: T={t} (等级 {grade})\n\n",
                n = i + 1,
                activity = record.activity,
                hazard = record.hazard,
                t = record.risk_score(),
                grade = record.grade(),
            ),
        };
        prompt.push_str(&example);
    }

    prompt.push_str(&query_format);
    prompt
}

/// Build the risk-scoring prompt: the 1–5 rubric, worked examples with
/// computed T, and a demand for a single-line JSON object.
pub fn risk_prompt(
    retrieved: &[Retrieved<'_>],
    activity: &str,
    hazard: &str,
    language: Language,
    max_examples: usize,
) -> String {
    let json_format = match language {
        Language::Korean => r#"{"빈도": 숫자, "강도": 숫자, "T": 숫자}"#,
        Language::English => r#"{"frequency": number, "intensity": number, "T": number}"#,
        Language::Chinese => r#"{"频率": 数字, "强度": 数字, "T": 数字}"#,
    };

    let intro = match language {
        Language::Korean => "다음은 작업활동과 유해위험요인에 따른 위험도 평가 예시입니다:\n\n",
        Language::English => {
            "The following are examples of risk assessment based on work activities and hazards:\n\n"
        }
        Language::Chinese => "以下是基于工作活动和危害的风险评估示例:\n\n",
    };

    let mut prompt = String::from(intro);
    for (i, item) in retrieved.iter().take(max_examples).enumerate() {
        let record = item.record;
        let example = match language {
            Language::Korean => format!(
                "예시 {n}:\n작업활동: {activity}\n유해위험요인: {hazard}\n\
                 빈도: {freq} (1=매우 드뭄, 2=드뭄, 3=보통, 4=자주, 5=매우 자주)\n\
                 강도: {intensity} (1=경미, 2=약간, 3=보통, 4=심각, 5=치명적)\nT값: {t}\n\n",
                n = i + 1,
                activity = record.activity,
                hazard = record.hazard,
                freq = record.frequency,
                intensity = record.intensity,
                t = record.risk_score(),
            ),
            Language::English => format!(
                "Example {n}:\nWork Activity: {activity}\nHazard: {hazard}\n\
                 Frequency: {freq} (1=Very Rare, 2=Rare, 3=Moderate, 4=Frequent, 5=Very Frequent)\n\
                 Severity: {intensity} (1=Minor, 2=Slight, 3=Moderate, 4=Serious, 5=Fatal)\nT-value: {t}\n\n",
                n = i + 1,
                activity = record.activity,
                hazard = record.hazard,
                freq = record.frequency,
                intensity = record.intensity,
                t = record.risk_score(),
            ),
            Language::Chinese => format!(
                "示例 {n}:\n工作活动: {activity}\n危害: {hazard}\n\
                 频率: {freq} (1=非常罕见, 2=罕见, 3=中等, 4=频繁, 5=非常频繁)\n\
                 严重程度: {intensity} (1=轻微, 2=轻度, 3=中等, 4=严重, 5=致命)\nT值: {t}\n\n",
                n = i + 1,
                activity = record.activity,
                hazard = record.hazard,
                freq = record.frequency,
                intensity = record.intensity,
                t = record.risk_score(),
            ),
        };
        prompt.push_str(&example);
    }

    let query = match language {
        Language::Korean => format!(
            "다음 작업활동과 유해위험요인에 대해 빈도(1-5)와 강도(1-5)를 평가하세요:\n\n\
             작업활동: {activity}\n유해위험요인: {hazard}\n\n\
             평가 기준:\n- 빈도: 해당 위험이 발생할 가능성 (1=매우 드뭄 ~ 5=매우 자주)\n\
             - 강도: 사고 발생 시 피해 정도 (1=경미 ~ 5=치명적)\n\n\
             다음 JSON 형식으로 정확히 응답하세요:\n{json_format}\n\n응답:"
        ),
        Language::English => format!(
            "Please evaluate the frequency (1-5) and severity (1-5) for the following work activity and hazard:\n\n\
             Work Activity: {activity}\nHazard: {hazard}\n\n\
             Evaluation Criteria:\n- Frequency: Likelihood of the risk occurring (1=Very Rare ~ 5=Very Frequent)\n\
             - Severity: Degree of harm if accident occurs (1=Minor ~ 5=Fatal)\n\n\
             Please respond exactly in the following JSON format:\n{json_format}\n\nResponse:"
        ),
        Language::Chinese => format!(
            "请评估以下工作活动和危害的频率(1-5)和严重程度(1-5):\n\n\
             工作活动: {activity}\n危害: {hazard}\n\n\
             评估标准:\n- 频率: 风险发生的可能性 (1=非常罕见 ~ 5=非常频繁)\n\
             - 严重程度: 事故发生时的伤害程度 (1=轻微 ~ 5=致命)\n\n\
             请完全按照以下JSON格式回答:\n{json_format}\n\n回答:"
        ),
    };
    prompt.push_str(&query);
    prompt
}

/// JSON keys the improvement prompt instructs the model to use.
pub fn improvement_json_keys(language: Language) -> [&'static str; 5] {
    match language {
        Language::Korean => ["개선대책", "개선_후_빈도", "개선_후_강도", "개선_후_T", "위험_감소율"],
        Language::English => [
            "improvement_measures",
            "improved_frequency",
            "improved_intensity",
            "improved_T",
            "risk_reduction_rate",
        ],
        Language::Chinese => ["改进措施", "改进后频率", "改进后强度", "改进后T值", "风险降低率"],
    }
}

/// Build the improvement-measure prompt.
///
/// Historical rows carry no post-improvement ratings, so each example's
/// improved state is synthesized with `assumed_improvement`. Records
/// without an improvement plan are skipped; if none qualify, a fixed
/// fallback example block keeps the few-shot structure intact.
pub fn improvement_prompt(
    retrieved: &[Retrieved<'_>],
    activity: &str,
    hazard: &str,
    frequency: i64,
    intensity: i64,
    t: i64,
    language: Language,
    max_examples: usize,
) -> String {
    let mut example_section = String::new();
    let mut examples_added = 0;

    for item in retrieved {
        if examples_added >= max_examples {
            break;
        }
        let record = item.record;
        let plan = record.improvement_plan.trim();
        if plan.is_empty() {
            continue;
        }

        let original_t = record.risk_score();
        let improved_freq = assumed_improvement(record.frequency);
        let improved_intensity = assumed_improvement(record.intensity);
        let improved_t = improved_freq * improved_intensity;
        let rate = reduction_rate(original_t, improved_t);

        let example = match language {
            Language::Korean => format!(
                "예시 {n}:\n작업활동: {activity}\n유해위험요인: {hazard}\n\
                 원래 위험도: 빈도 {of}, 강도 {oi}, T={ot}\n개선대책: {plan}\n\
                 개선 후 위험도: 빈도 {nf}, 강도 {ni}, T={nt}\n위험 감소율: {rate:.1}%\n\n",
                n = examples_added + 1,
                activity = record.activity,
                hazard = record.hazard,
                of = record.frequency,
                oi = record.intensity,
                ot = original_t,
                plan = plan,
                nf = improved_freq,
                ni = improved_intensity,
                nt = improved_t,
                rate = rate,
            ),
            Language::English | Language::Chinese => format!(
                "Example {n}:\nWork Activity: {activity}\nHazard: {hazard}\n\
                 Original Risk: Frequency {of}, Intensity {oi}, T={ot}\n\
                 Improvement Measures: {plan}\n\
                 Improved Risk: Frequency {nf}, Intensity {ni}, T={nt}\n\
                 Risk Reduction Rate: {rate:.1}%\n\n",
                n = examples_added + 1,
                activity = record.activity,
                hazard = record.hazard,
                of = record.frequency,
                oi = record.intensity,
                ot = original_t,
                plan = plan,
                nf = improved_freq,
                ni = improved_intensity,
                nt = improved_t,
                rate = rate,
            ),
        };
        example_section.push_str(&example);
        examples_added += 1;
    }

    if examples_added == 0 {
        example_section = default_improvement_examples(language).to_string();
    }

    let (task, guidelines, output_instruction) = match language {
        Language::Korean => (
            "다음 작업활동과 유해위험요인에 대한 구체적이고 실행 가능한 개선대책을 제시하고, 개선 후 위험도를 평가하세요:",
            "개선대책 작성 가이드라인:\n\
             - 최소 4개 이상의 구체적인 개선조치를 제시하세요\n\
             - 기술적 대책, 관리적 대책, 개인보호구 대책을 균형있게 포함하세요\n\
             - 실제 현장에서 적용 가능한 현실적인 방안을 제시하세요\n\
             - 각 대책은 번호를 매겨 명확히 구분하세요\n\n\
             위험도 평가 기준:\n\
             - 개선 후 빈도는 원래 빈도보다 1-2단계 낮게 평가\n\
             - 개선 후 강도는 대책의 효과성에 따라 조정\n\
             - 현실적인 개선 효과를 반영하세요",
            "다음 JSON 형식으로 정확히 응답하세요:",
        ),
        Language::English => (
            "Provide specific and actionable improvement measures for the following work activity and hazard, and evaluate the post-improvement risk level:",
            "Improvement Measures Guidelines:\n\
             - Provide at least 4 specific improvement actions\n\
             - Include a balanced mix of technical, administrative, and PPE measures\n\
             - Suggest realistic solutions applicable in actual field conditions\n\
             - Clearly distinguish each measure with numbering\n\n\
             Risk Assessment Criteria:\n\
             - Post-improvement frequency should be 1-2 levels lower than original\n\
             - Post-improvement intensity should be adjusted based on measure effectiveness\n\
             - Reflect realistic improvement effects",
            "Please respond exactly in the following JSON format:",
        ),
        Language::Chinese => (
            "为以下工作活动和危害提供具体可行的改进措施，并评估改进后的风险等级：",
            "改进措施指导原则:\n\
             - 提供至少4项具体的改进行动\n\
             - 包括技术措施、管理措施和个人防护设备措施的平衡组合\n\
             - 建议在实际现场条件下可应用的现实解决方案\n\
             - 用编号清晰区分每项措施\n\n\
             风险评估标准:\n\
             - 改进后频率应比原始频率低1-2个等级\n\
             - 改进后强度应根据措施有效性进行调整\n\
             - 反映现实的改进效果",
            "请完全按照以下JSON格式回答：",
        ),
    };

    let (activity_label, hazard_label, risk_label) = match language {
        Language::Korean => ("작업활동", "유해위험요인", "현재 위험도"),
        Language::English => ("Work Activity", "Hazard", "Current Risk"),
        Language::Chinese => ("工作活动", "危害", "当前风险"),
    };

    let keys = improvement_json_keys(language);
    format!(
        "{example_section}\n{task}\n\n\
         {activity_label}: {activity}\n{hazard_label}: {hazard}\n\
         {risk_label}: {frequency}, {intensity}, T={t}\n\n\
         {guidelines}\n\n{output_instruction}\n\
         {{\n    \"{k0}\": \"...\",\n    \"{k1}\": 1-5,\n    \"{k2}\": 1-5,\n    \"{k3}\": number,\n    \"{k4}\": percent\n}}\n",
        k0 = keys[0],
        k1 = keys[1],
        k2 = keys[2],
        k3 = keys[3],
        k4 = keys[4],
    )
}

/// Fallback few-shot block used when no retrieved record carries an
/// improvement plan.
fn default_improvement_examples(language: Language) -> &'static str {
    match language {
        Language::Korean => {
            "예시 1:\n작업활동: 굴착 및 되메우기 작업\n유해위험요인: 부적절한 경사로 인한 굴착벽 붕괴\n\
             원래 위험도: 빈도 3, 강도 4, T=12\n\
             개선대책: 1) 토양 분류에 따른 적절한 경사 유지 2) 굴착 벽면 보강 시설 설치 3) 정기적인 지반 상태 점검 실시 4) 작업자 안전교육 강화\n\
             개선 후 위험도: 빈도 1, 강도 2, T=2\n위험 감소율: 83.3%\n\n\
             예시 2:\n작업활동: 중장비를 이용한 자재 운반\n유해위험요인: 운반 중 자재 낙하로 인한 충돌\n\
             원래 위험도: 빈도 2, 강도 5, T=10\n\
             개선대책: 1) 적절한 리깅 장비 사용 2) 작업 전 안전점검 실시 3) 신호수 배치 4) 안전구역 설정 및 출입통제\n\
             개선 후 위험도: 빈도 1, 강도 2, T=2\n위험 감소율: 80.0%\n\n"
        }
        Language::English | Language::Chinese => {
            "Example 1:\nWork Activity: Excavation and backfilling\nHazard: Collapse of excavation wall due to improper sloping\n\
             Original Risk: Frequency 3, Intensity 4, T=12\n\
             Improvement Measures: 1) Maintain proper slope according to soil classification 2) Install excavation wall reinforcement 3) Conduct regular ground condition inspections 4) Enhance worker safety training\n\
             Improved Risk: Frequency 1, Intensity 2, T=2\nRisk Reduction Rate: 83.3%\n\n\
             Example 2:\nWork Activity: Material transportation using heavy equipment\nHazard: Material fall causing collision during transport\n\
             Original Risk: Frequency 2, Intensity 5, T=10\n\
             Improvement Measures: 1) Use appropriate rigging equipment 2) Conduct pre-work safety inspections 3) Deploy signal personnel 4) Establish safety zones and access control\n\
             Improved Risk: Frequency 1, Intensity 2, T=2\nRisk Reduction Rate: 80.0%\n\n"
        }
    }
}
