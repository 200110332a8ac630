use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::models::{BaselineRiskInput, PatientSnapshot, ScreeningRecord};
use crate::severity::Instrument;

/// A score outside its instrument's documented range. Raised before data
/// reaches the engine, which itself never rejects input.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{instrument} score {value} is outside range [{min}, {max}]")]
pub struct ValidationError {
    pub instrument: Instrument,
    pub value: u32,
    pub min: f64,
    pub max: f64,
}

pub fn validate_score(instrument: Instrument, value: u32) -> Result<(), ValidationError> {
    let (min, max) = instrument.range();
    let score = f64::from(value);
    if score < min || score > max {
        return Err(ValidationError {
            instrument,
            value,
            min,
            max,
        });
    }
    Ok(())
}

pub fn validate_baseline(
    baseline: &BaselineRiskInput,
    expectancy: Option<u32>,
) -> Vec<ValidationError> {
    [
        (Instrument::Phq9, baseline.phq9),
        (Instrument::Gad7, baseline.gad7),
        (Instrument::Pcl5, baseline.pcl5),
        (Instrument::Ace, baseline.ace),
        (Instrument::Expectancy, expectancy),
    ]
    .into_iter()
    .filter_map(|(instrument, value)| value.map(|v| validate_score(instrument, v)))
    .filter_map(Result::err)
    .collect()
}

/// Logs any out-of-range scores; callers still run the engine afterwards.
pub fn warn_on_invalid(label: &str, baseline: &BaselineRiskInput, expectancy: Option<u32>) {
    for error in validate_baseline(baseline, expectancy) {
        warn!(patient = label, %error, "score failed intake validation");
    }
}

pub fn load_snapshot(path: &Path) -> anyhow::Result<PatientSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let snapshot = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid patient snapshot", path.display()))?;
    Ok(snapshot)
}

pub fn load_screening_csv(path: &Path) -> anyhow::Result<Vec<ScreeningRecord>> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        patient_id: Option<Uuid>,
        full_name: String,
        phq9: Option<u32>,
        gad7: Option<u32>,
        pcl5: Option<u32>,
        ace: Option<u32>,
        expectancy: Option<u32>,
    }

    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut records = Vec::new();

    for (line, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("invalid screening row {}", line + 1))?;
        records.push(ScreeningRecord {
            patient_id: row.patient_id.unwrap_or_else(Uuid::new_v4),
            full_name: row.full_name,
            baseline: BaselineRiskInput {
                phq9: row.phq9,
                gad7: row.gad7,
                pcl5: row.pcl5,
                ace: row.ace,
            },
            expectancy: row.expectancy,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_scores_outside_instrument_range() {
        let baseline = BaselineRiskInput {
            phq9: Some(30),
            gad7: Some(21),
            pcl5: None,
            ace: Some(11),
        };
        let errors = validate_baseline(&baseline, Some(0));
        let instruments: Vec<_> = errors.iter().map(|e| e.instrument).collect();
        assert_eq!(
            instruments,
            vec![Instrument::Phq9, Instrument::Ace, Instrument::Expectancy]
        );
        assert_eq!(
            errors[0].to_string(),
            "PHQ-9 score 30 is outside range [0, 27]"
        );
    }

    #[test]
    fn in_range_scores_pass() {
        let baseline = BaselineRiskInput {
            phq9: Some(27),
            gad7: Some(0),
            pcl5: Some(80),
            ace: Some(10),
        };
        assert!(validate_baseline(&baseline, Some(100)).is_empty());
        assert!(validate_baseline(&BaselineRiskInput::default(), None).is_empty());
    }

    #[test]
    fn loads_snapshot_json() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{
                "baseline": {{ "phq9": 22, "gad7": 8 }},
                "vitals": {{
                    "heartRate": 130,
                    "baselineHeartRate": 80,
                    "bloodPressureSystolic": 118,
                    "bloodPressureDiastolic": 76
                }},
                "progressTrends": [
                    {{ "metric": "PHQ-9", "values": [20, 18, 19, 21, 23], "baseline": 20 }}
                ]
            }}"#
        )
        .expect("write snapshot");

        let snapshot = load_snapshot(file.path()).expect("snapshot parses");
        let baseline = snapshot.baseline.expect("baseline present");
        assert_eq!(baseline.phq9, Some(22));
        assert_eq!(baseline.pcl5, None);
        let vitals = snapshot.vitals.expect("vitals present");
        assert_eq!(vitals.baseline_heart_rate, Some(80.0));
        assert_eq!(vitals.spo2, None);
        assert_eq!(snapshot.progress_trends[0].values.len(), 5);
    }

    #[test]
    fn rejects_malformed_snapshot() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{ \"vitals\": {{ \"heartRate\": 80 }} }}").expect("write snapshot");
        assert!(load_snapshot(file.path()).is_err());
    }

    #[test]
    fn loads_screening_rows_with_blank_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "patient_id,full_name,phq9,gad7,pcl5,ace,expectancy").expect("header");
        writeln!(
            file,
            "3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2,Avery Lee,22,8,,2,40"
        )
        .expect("row");
        writeln!(file, ",Jules Moreno,5,,,7,").expect("row");

        let records = load_screening_csv(file.path()).expect("csv parses");
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].patient_id,
            Uuid::parse_str("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2").expect("uuid")
        );
        assert_eq!(records[0].baseline.pcl5, None);
        assert_eq!(records[0].expectancy, Some(40));
        assert_eq!(records[1].full_name, "Jules Moreno");
        assert_eq!(records[1].baseline.ace, Some(7));
        assert_eq!(records[1].expectancy, None);
    }
}
