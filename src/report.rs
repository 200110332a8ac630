use std::fmt::Write;

use crate::models::{
    IntegrationPrediction, LevelSummary, PatientScore, PatientSnapshot, RiskAssessment,
    RiskFlag, RiskLevel, SessionDate,
};
use crate::severity::{classify, Instrument};

pub fn summarize_by_level(scores: &[PatientScore]) -> Vec<LevelSummary> {
    let mut map: std::collections::HashMap<RiskLevel, usize> = std::collections::HashMap::new();

    for score in scores {
        *map.entry(score.level).or_insert(0) += 1;
    }

    let mut summaries: Vec<LevelSummary> = map
        .into_iter()
        .map(|(level, count)| LevelSummary { level, count })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then(b.level.cmp(&a.level)));
    summaries
}

/// Highest overall level first, then most flags.
pub fn rank_by_risk(scores: &mut [PatientScore]) {
    scores.sort_by(|a, b| {
        b.level
            .cmp(&a.level)
            .then(b.flag_count.cmp(&a.flag_count))
            .then(a.full_name.cmp(&b.full_name))
    });
}

fn write_flags(output: &mut String, heading: &str, flags: &[RiskFlag]) {
    let _ = writeln!(output, "### {heading}");
    if flags.is_empty() {
        let _ = writeln!(output, "No flags raised.");
    } else {
        for flag in flags {
            let _ = writeln!(
                output,
                "- [{}] {}: {} ({}). {}",
                flag.severity, flag.metric, flag.message, flag.value.display, flag.recommendation
            );
        }
    }
    let _ = writeln!(output);
}

pub fn build_patient_report(
    label: &str,
    snapshot: &PatientSnapshot,
    assessment: &RiskAssessment,
    prediction: &IntegrationPrediction,
    calendar: Option<&[SessionDate]>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Patient Risk Report");
    let _ = writeln!(output, "Generated for {label}");
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Overall risk level: **{}** across {} flags",
        assessment.overall_risk_level,
        assessment.all_flags.len()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Baseline Severity");
    let scores = match &snapshot.baseline {
        Some(b) => vec![
            (Instrument::Phq9, b.phq9),
            (Instrument::Gad7, b.gad7),
            (Instrument::Pcl5, b.pcl5),
            (Instrument::Ace, b.ace),
        ],
        None => Vec::new(),
    };
    let mut classified = 0;
    for (instrument, score) in scores {
        let Some(score) = score else { continue };
        let classification = classify(instrument, f64::from(score));
        classified += 1;
        let _ = write!(output, "- {instrument}: {score} ({})", classification.label);
        if let Some(recommendation) = classification.recommendation {
            let _ = write!(output, ". {recommendation}");
        }
        let _ = writeln!(output);
    }
    if classified == 0 {
        let _ = writeln!(output, "No baseline assessments recorded.");
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Risk Flags");
    write_flags(&mut output, "Baseline", &assessment.baseline_flags);
    write_flags(&mut output, "Vitals", &assessment.vital_flags);
    write_flags(&mut output, "Progress", &assessment.progress_flags);

    let _ = writeln!(output, "## Integration Plan");
    let _ = writeln!(
        output,
        "{} {} sessions ({} risk)",
        prediction.recommended_sessions,
        prediction.frequency.as_str(),
        prediction.risk_level
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "{}", prediction.rationale.trim_end());
    let _ = writeln!(output);

    match calendar {
        Some(dates) => {
            for session in dates {
                let _ = writeln!(
                    output,
                    "- Session {} (week {}): {}",
                    session.session_number, session.week, session.date
                );
            }
        }
        None => {
            for session in &prediction.schedule {
                let _ = writeln!(
                    output,
                    "- Session {}: week {}",
                    session.session_number, session.week
                );
            }
        }
    }

    output
}

pub fn build_cohort_report(source: &str, scores: &[PatientScore]) -> String {
    let summaries = summarize_by_level(scores);
    let mut output = String::new();

    let _ = writeln!(output, "# Cohort Screening Report");
    let _ = writeln!(output, "Generated from {source}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No patients screened.");
    } else {
        for summary in &summaries {
            let _ = writeln!(output, "- {}: {} patients", summary.level, summary.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Highest Risk Patients");

    let mut ranked = scores.to_vec();
    rank_by_risk(&mut ranked);
    if ranked.is_empty() {
        let _ = writeln!(output, "No patients screened.");
    } else {
        for score in ranked.iter().take(10) {
            let _ = writeln!(
                output,
                "- {} ({}) {} risk, {} flags, {} integration sessions",
                score.full_name,
                score.patient_id,
                score.level,
                score.flag_count,
                score.integration_sessions
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::predict_integration;
    use crate::models::{BaselineRiskInput, IntegrationInput};
    use crate::risk::assess;
    use uuid::Uuid;

    fn score(name: &str, level: RiskLevel, flag_count: usize) -> PatientScore {
        PatientScore {
            patient_id: Uuid::new_v4(),
            full_name: name.to_string(),
            level,
            flag_count,
            integration_sessions: 2,
        }
    }

    #[test]
    fn summary_orders_by_count() {
        let scores = vec![
            score("A", RiskLevel::Low, 0),
            score("B", RiskLevel::High, 2),
            score("C", RiskLevel::Low, 0),
        ];
        let summaries = summarize_by_level(&scores);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].level, RiskLevel::Low);
        assert_eq!(summaries[0].count, 2);
    }

    #[test]
    fn ranking_puts_high_risk_first() {
        let mut scores = vec![
            score("Low", RiskLevel::Low, 0),
            score("Moderate", RiskLevel::Moderate, 3),
            score("High", RiskLevel::High, 1),
            score("Higher", RiskLevel::High, 2),
        ];
        rank_by_risk(&mut scores);
        let names: Vec<_> = scores.iter().map(|s| s.full_name.as_str()).collect();
        assert_eq!(names, vec!["Higher", "High", "Moderate", "Low"]);
    }

    #[test]
    fn patient_report_lists_flags_and_plan() {
        let snapshot = PatientSnapshot {
            baseline: Some(BaselineRiskInput {
                phq9: Some(22),
                gad7: Some(8),
                ..Default::default()
            }),
            ..Default::default()
        };
        let assessment = assess(&snapshot);
        let prediction = predict_integration(&IntegrationInput {
            phq9: 22,
            gad7: 8,
            expectancy: 80,
            ..Default::default()
        });

        let report = build_patient_report("Avery Lee", &snapshot, &assessment, &prediction, None);
        assert!(report.contains("Overall risk level: **high**"));
        assert!(report.contains("- PHQ-9: 22 (Severe)"));
        assert!(report.contains("- GAD-7: 8 (Mild)"));
        assert!(report.contains("Severe Depression"));
        assert!(report.contains("4 monthly sessions (low risk)"));
        assert!(report.contains("- Session 4: week 13"));
    }

    #[test]
    fn cohort_report_handles_empty_input() {
        let report = build_cohort_report("screening.csv", &[]);
        assert!(report.contains("No patients screened."));
    }
}
