use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{
    Frequency, IntegrationInput, IntegrationPrediction, RiskLevel, ScheduledSession, SessionDate,
};

/// Recommends an integration-session plan. Tiers are checked high, moderate,
/// low; the first match wins even where the tier conditions overlap.
pub fn predict_integration(input: &IntegrationInput) -> IntegrationPrediction {
    let IntegrationInput {
        ace,
        gad7,
        expectancy,
        phq9,
        pcl5,
    } = *input;

    let prediction = if ace > 6 || gad7 > 15 || pcl5 > 33 {
        let sessions = if ace > 8 { 8 } else { 6 };
        let pcl5_note = if pcl5 > 0 {
            format!(", PCL-5: {pcl5}")
        } else {
            String::new()
        };
        IntegrationPrediction {
            recommended_sessions: sessions,
            risk_level: RiskLevel::High,
            frequency: Frequency::Weekly,
            schedule: schedule(sessions, 1),
            rationale: format!(
                "High baseline risk factors detected (ACE: {ace}, GAD-7: {gad7}{pcl5_note}). \
                 Intensive weekly support recommended to prevent relapse and process emerging material."
            ),
        }
    } else if (3..=6).contains(&ace) || (10..=15).contains(&gad7) {
        let sessions = if ace >= 5 || gad7 >= 13 { 6 } else { 4 };
        IntegrationPrediction {
            recommended_sessions: sessions,
            risk_level: RiskLevel::Moderate,
            frequency: Frequency::Biweekly,
            schedule: schedule(sessions, 2),
            rationale: format!(
                "Moderate risk factors present (ACE: {ace}, GAD-7: {gad7}). \
                 Biweekly integration sessions will support processing and skill-building."
            ),
        }
    } else {
        let low_expectancy = expectancy < 50;
        let severe_depression = phq9 > 20;
        let sessions = if low_expectancy || severe_depression { 4 } else { 2 };

        let mut rationale =
            String::from("Low baseline risk. Standard integration protocol is appropriate.");
        if low_expectancy {
            rationale.push_str(" Additional sessions recommended due to low treatment expectancy.");
        }
        if severe_depression {
            rationale.push_str(&format!(
                " Additional sessions recommended due to severe depression (PHQ-9: {phq9})."
            ));
        }

        IntegrationPrediction {
            recommended_sessions: sessions,
            risk_level: RiskLevel::Low,
            frequency: Frequency::Monthly,
            schedule: schedule(sessions, 4),
            rationale,
        }
    };

    debug!(
        sessions = prediction.recommended_sessions,
        frequency = prediction.frequency.as_str(),
        level = %prediction.risk_level,
        "integration plan predicted"
    );
    prediction
}

fn schedule(sessions: u32, spacing_weeks: u32) -> Vec<ScheduledSession> {
    (0..sessions)
        .map(|i| ScheduledSession {
            week: spacing_weeks * i + 1,
            session_number: i + 1,
        })
        .collect()
}

/// Maps schedule weeks onto dates, week 1 falling on `first_session`.
pub fn session_calendar(
    prediction: &IntegrationPrediction,
    first_session: NaiveDate,
) -> Vec<SessionDate> {
    prediction
        .schedule
        .iter()
        .map(|session| SessionDate {
            session_number: session.session_number,
            week: session.week,
            date: first_session + Duration::weeks(i64::from(session.week) - 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(ace: u32, gad7: u32, expectancy: u32, phq9: u32, pcl5: u32) -> IntegrationInput {
        IntegrationInput {
            ace,
            gad7,
            expectancy,
            phq9,
            pcl5,
        }
    }

    fn weeks(prediction: &IntegrationPrediction) -> Vec<u32> {
        prediction.schedule.iter().map(|s| s.week).collect()
    }

    #[test]
    fn high_ace_gets_weekly_plan() {
        let prediction = predict_integration(&input(7, 5, 80, 10, 0));
        assert_eq!(prediction.risk_level, RiskLevel::High);
        assert_eq!(prediction.recommended_sessions, 6);
        assert_eq!(prediction.frequency, Frequency::Weekly);
        assert_eq!(weeks(&prediction), vec![1, 2, 3, 4, 5, 6]);
        assert!(prediction.rationale.contains("ACE: 7"));
        assert!(!prediction.rationale.contains("PCL-5"));
    }

    #[test]
    fn very_high_ace_gets_eight_sessions() {
        let prediction = predict_integration(&input(9, 0, 80, 0, 40));
        assert_eq!(prediction.recommended_sessions, 8);
        assert!(prediction.rationale.contains("PCL-5: 40"));
    }

    #[test]
    fn low_expectancy_adds_sessions() {
        let prediction = predict_integration(&input(2, 4, 40, 10, 0));
        assert_eq!(prediction.risk_level, RiskLevel::Low);
        assert_eq!(prediction.recommended_sessions, 4);
        assert_eq!(prediction.frequency, Frequency::Monthly);
        assert_eq!(weeks(&prediction), vec![1, 5, 9, 13]);
        assert!(prediction.rationale.contains("low treatment expectancy"));
    }

    #[test]
    fn low_risk_default_is_two_sessions() {
        let prediction = predict_integration(&input(0, 2, 75, 8, 0));
        assert_eq!(prediction.recommended_sessions, 2);
        assert!(!prediction.rationale.contains("Additional"));

        let depressed = predict_integration(&input(0, 2, 75, 22, 0));
        assert_eq!(depressed.recommended_sessions, 4);
        assert!(depressed.rationale.contains("PHQ-9: 22"));
    }

    #[test]
    fn moderate_tier_is_biweekly() {
        let prediction = predict_integration(&input(3, 4, 80, 5, 0));
        assert_eq!(prediction.risk_level, RiskLevel::Moderate);
        assert_eq!(prediction.recommended_sessions, 4);
        assert_eq!(weeks(&prediction), vec![1, 3, 5, 7]);

        let heavier = predict_integration(&input(1, 13, 80, 5, 0));
        assert_eq!(heavier.recommended_sessions, 6);
        assert_eq!(weeks(&heavier), vec![1, 3, 5, 7, 9, 11]);
    }

    #[test]
    fn overlapping_tiers_resolve_high_first() {
        let prediction = predict_integration(&input(5, 20, 80, 5, 0));
        assert_eq!(prediction.risk_level, RiskLevel::High);
        assert_eq!(prediction.recommended_sessions, 6);
    }

    #[test]
    fn tier_edges_use_strict_and_inclusive_bounds() {
        let ace_edge = predict_integration(&input(6, 0, 80, 0, 0));
        assert_eq!(ace_edge.risk_level, RiskLevel::Moderate);
        assert_eq!(ace_edge.recommended_sessions, 6);

        let gad7_edge = predict_integration(&input(0, 15, 80, 0, 0));
        assert_eq!(gad7_edge.risk_level, RiskLevel::Moderate);
        assert_eq!(gad7_edge.frequency, Frequency::Biweekly);

        let pcl5_edge = predict_integration(&input(0, 0, 80, 0, 33));
        assert_eq!(pcl5_edge.risk_level, RiskLevel::Low);
        assert_eq!(pcl5_edge.recommended_sessions, 2);

        let pcl5_over = predict_integration(&input(0, 0, 80, 0, 34));
        assert_eq!(pcl5_over.risk_level, RiskLevel::High);
        assert_eq!(pcl5_over.recommended_sessions, 6);

        let ace_eight = predict_integration(&input(8, 0, 80, 0, 0));
        assert_eq!(ace_eight.recommended_sessions, 6);

        assert_eq!(
            predict_integration(&input(0, 0, 50, 0, 0)).recommended_sessions,
            2
        );
        assert_eq!(
            predict_integration(&input(0, 0, 80, 20, 0)).recommended_sessions,
            2
        );
        assert_eq!(
            predict_integration(&input(0, 0, 80, 21, 0)).recommended_sessions,
            4
        );
    }

    #[test]
    fn schedule_length_matches_session_count() {
        for ace in 0..=10 {
            for gad7 in (0..=21).step_by(3) {
                for expectancy in [1, 49, 50, 100] {
                    for pcl5 in [0, 33, 34] {
                        let prediction =
                            predict_integration(&input(ace, gad7, expectancy, 21, pcl5));
                        assert_eq!(
                            prediction.schedule.len() as u32,
                            prediction.recommended_sessions
                        );
                        assert!((2..=8).contains(&prediction.recommended_sessions));
                    }
                }
            }
        }
    }

    #[test]
    fn calendar_offsets_by_week() {
        let prediction = predict_integration(&input(2, 4, 40, 10, 0));
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).expect("valid date");
        let calendar = session_calendar(&prediction, start);
        assert_eq!(calendar.len(), 4);
        assert_eq!(calendar[0].date, start);
        assert_eq!(
            calendar[1].date,
            NaiveDate::from_ymd_opt(2026, 3, 30).expect("valid date")
        );
    }
}
