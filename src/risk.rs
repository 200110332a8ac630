use tracing::{debug, warn};

use crate::models::{
    BaselineRiskInput, FlagOrigin, FlagValue, PatientSnapshot, ProgressTrend, RiskAssessment,
    RiskFlag, RiskLevel, VitalSigns,
};

const PHQ9_METRIC: &str = "PHQ-9 (Depression)";
const GAD7_METRIC: &str = "GAD-7 (Anxiety)";
const PCL5_METRIC: &str = "PCL-5 (PTSD)";
const ACE_METRIC: &str = "ACE (Childhood Trauma)";

struct Rule {
    severity: RiskLevel,
    threshold: u32,
    message: &'static str,
    recommendation: &'static str,
}

/// Rules per instrument, highest threshold first. The first rule the score
/// reaches produces the flag.
const PHQ9_RULES: &[Rule] = &[
    Rule {
        severity: RiskLevel::High,
        threshold: 20,
        message: "Severe Depression",
        recommendation: "Trauma-informed approach required. Close monitoring during session.",
    },
    Rule {
        severity: RiskLevel::Moderate,
        threshold: 15,
        message: "Moderately Severe Depression",
        recommendation: "Monitor closely during session.",
    },
];

const GAD7_RULES: &[Rule] = &[
    Rule {
        severity: RiskLevel::High,
        threshold: 15,
        message: "Severe Anxiety",
        recommendation:
            "Have rescue medication available. Ensure experienced practitioner present.",
    },
    Rule {
        severity: RiskLevel::Moderate,
        threshold: 10,
        message: "Moderate Anxiety",
        recommendation: "Monitor for anxiety escalation during session.",
    },
];

const PCL5_RULES: &[Rule] = &[Rule {
    severity: RiskLevel::High,
    threshold: 33,
    message: "Significant PTSD Symptoms",
    recommendation: "Trauma-informed approach required. Have rescue medication available.",
}];

const ACE_RULES: &[Rule] = &[
    Rule {
        severity: RiskLevel::High,
        threshold: 6,
        message: "High Childhood Adversity",
        recommendation: "Trauma-informed approach required. Close monitoring during session.",
    },
    Rule {
        severity: RiskLevel::Moderate,
        threshold: 4,
        message: "Moderate Childhood Adversity",
        recommendation: "Be aware of potential trauma responses during session.",
    },
];

fn baseline_flag(metric: &str, score: Option<u32>, rules: &[Rule]) -> Option<RiskFlag> {
    let score = score?;
    let rule = rules.iter().find(|rule| score >= rule.threshold)?;

    Some(RiskFlag {
        origin: FlagOrigin::Baseline,
        severity: rule.severity,
        metric: metric.to_string(),
        value: FlagValue::number(score as f64),
        threshold: Some(rule.threshold as f64),
        message: rule.message.to_string(),
        recommendation: rule.recommendation.to_string(),
    })
}

/// Flags from intake scores, in PHQ-9, GAD-7, PCL-5, ACE order.
pub fn evaluate_baseline(input: &BaselineRiskInput) -> Vec<RiskFlag> {
    [
        baseline_flag(PHQ9_METRIC, input.phq9, PHQ9_RULES),
        baseline_flag(GAD7_METRIC, input.gad7, GAD7_RULES),
        baseline_flag(PCL5_METRIC, input.pcl5, PCL5_RULES),
        baseline_flag(ACE_METRIC, input.ace, ACE_RULES),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn evaluate_vitals(vitals: &VitalSigns) -> Vec<RiskFlag> {
    let mut flags = Vec::new();

    // A zero baseline is treated as not recorded.
    if let Some(baseline) = vitals.baseline_heart_rate.filter(|bpm| *bpm != 0.0) {
        let percent_change = (vitals.heart_rate - baseline) / baseline * 100.0;
        if percent_change.abs() > 30.0 {
            flags.push(RiskFlag {
                origin: FlagOrigin::Vitals,
                severity: if percent_change > 50.0 {
                    RiskLevel::High
                } else {
                    RiskLevel::Moderate
                },
                metric: "Heart Rate".to_string(),
                value: FlagValue::text(
                    vitals.heart_rate,
                    format!(
                        "{} bpm ({:+.1}% from baseline)",
                        vitals.heart_rate, percent_change
                    ),
                ),
                threshold: Some(30.0),
                message: "Heart Rate Anomaly Detected".to_string(),
                recommendation:
                    "Monitor closely. Consider reducing stimulation. Have rescue medication ready."
                        .to_string(),
            });
        }
    }

    let systolic = vitals.blood_pressure_systolic;
    let diastolic = vitals.blood_pressure_diastolic;
    if systolic > 130.0 || diastolic > 85.0 {
        flags.push(RiskFlag {
            origin: FlagOrigin::Vitals,
            severity: if systolic > 140.0 {
                RiskLevel::High
            } else {
                RiskLevel::Moderate
            },
            metric: "Blood Pressure".to_string(),
            value: FlagValue::text(systolic, format!("{systolic}/{diastolic} mmHg")),
            threshold: None,
            message: "Elevated Blood Pressure".to_string(),
            recommendation: "Monitor closely. Consider reducing stimulation.".to_string(),
        });
    }

    if let Some(spo2) = vitals.spo2.filter(|value| *value < 95.0) {
        flags.push(RiskFlag {
            origin: FlagOrigin::Vitals,
            severity: if spo2 < 90.0 {
                RiskLevel::High
            } else {
                RiskLevel::Moderate
            },
            metric: "SpO2".to_string(),
            value: FlagValue::text(spo2, format!("{spo2}%")),
            threshold: Some(95.0),
            message: "Low Oxygen Saturation".to_string(),
            recommendation: "Check breathing. Consider supplemental oxygen if <90%.".to_string(),
        });
    }

    if let Some(temperature) = vitals
        .temperature
        .filter(|value| *value > 99.5 || *value < 97.0)
    {
        let severe = temperature > 100.5 || temperature < 96.0;
        flags.push(RiskFlag {
            origin: FlagOrigin::Vitals,
            severity: if severe {
                RiskLevel::High
            } else {
                RiskLevel::Moderate
            },
            metric: "Temperature".to_string(),
            value: FlagValue::text(temperature, format!("{temperature}°F")),
            threshold: None,
            message: if temperature > 99.5 {
                "Elevated Temperature"
            } else {
                "Low Temperature"
            }
            .to_string(),
            recommendation: "Monitor closely. Document in session notes.".to_string(),
        });
    }

    flags
}

/// Length of the run of strictly increasing steps ending at the latest value.
/// Any non-increase earlier in the series resets the run.
pub fn terminal_increase_streak(values: &[f64]) -> usize {
    values
        .windows(2)
        .rev()
        .take_while(|pair| pair[1] > pair[0])
        .count()
}

/// Drops float noise from a derived difference (0.30000000000000004 -> 0.3).
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn evaluate_trend(trend: &ProgressTrend) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    let values = &trend.values;
    if values.len() < 2 {
        return flags;
    }

    let latest = values[values.len() - 1];
    let previous = values[values.len() - 2];

    let streak = terminal_increase_streak(values);
    if streak >= 2 {
        flags.push(RiskFlag {
            origin: FlagOrigin::Progress,
            severity: if streak >= 3 {
                RiskLevel::High
            } else {
                RiskLevel::Moderate
            },
            metric: trend.metric.clone(),
            value: FlagValue::text(
                latest,
                format!(
                    "{latest} (↑{} from previous)",
                    round_hundredths(latest - previous)
                ),
            ),
            threshold: None,
            message: "Declining Progress Detected".to_string(),
            recommendation: "Schedule additional integration session. Assess for external stressors. Consider booster session.".to_string(),
        });
    }

    if trend.baseline == 0.0 {
        // Percent change from a zero baseline is undefined; the comparison
        // below is false for both inf and NaN so no reversion flag is raised.
        warn!(metric = %trend.metric, "trend baseline is zero, skipping baseline reversion");
    }
    let percent_from_baseline = (latest - trend.baseline) / trend.baseline * 100.0;
    if percent_from_baseline.abs() < 10.0 {
        flags.push(RiskFlag {
            origin: FlagOrigin::Progress,
            severity: RiskLevel::Moderate,
            metric: trend.metric.clone(),
            value: FlagValue::text(
                latest,
                format!("{latest} ({percent_from_baseline:+.1}% from baseline)"),
            ),
            threshold: None,
            message: "Returning to Baseline".to_string(),
            recommendation: "Review treatment plan. Consider booster session.".to_string(),
        });
    }

    flags
}

/// Highest severity present; no flags means low.
pub fn aggregate(flags: &[RiskFlag]) -> RiskLevel {
    flags
        .iter()
        .map(|flag| flag.severity)
        .max()
        .unwrap_or(RiskLevel::Low)
}

pub fn assess(snapshot: &PatientSnapshot) -> RiskAssessment {
    let baseline_flags = snapshot
        .baseline
        .as_ref()
        .map(evaluate_baseline)
        .unwrap_or_default();
    let vital_flags = snapshot
        .vitals
        .as_ref()
        .map(evaluate_vitals)
        .unwrap_or_default();
    let progress_flags: Vec<RiskFlag> = snapshot
        .progress_trends
        .iter()
        .flat_map(evaluate_trend)
        .collect();

    let all_flags: Vec<RiskFlag> = baseline_flags
        .iter()
        .chain(vital_flags.iter())
        .chain(progress_flags.iter())
        .cloned()
        .collect();
    let overall_risk_level = aggregate(&all_flags);

    debug!(
        baseline = baseline_flags.len(),
        vitals = vital_flags.len(),
        progress = progress_flags.len(),
        level = %overall_risk_level,
        "risk assessment computed"
    );

    RiskAssessment {
        has_high_risk: all_flags.iter().any(|f| f.severity == RiskLevel::High),
        has_moderate_risk: all_flags.iter().any(|f| f.severity == RiskLevel::Moderate),
        all_flags,
        baseline_flags,
        vital_flags,
        progress_flags,
        overall_risk_level,
    }
}
