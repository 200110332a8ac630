use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Overall or per-flag severity. Ordered so the highest tier wins a `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which evaluator produced a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagOrigin {
    Baseline,
    Vitals,
    Progress,
}

impl FlagOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagOrigin::Baseline => "baseline",
            FlagOrigin::Vitals => "vitals",
            FlagOrigin::Progress => "progress",
        }
    }
}

/// Observed measurement behind a flag, kept both raw and formatted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagValue {
    pub numeric: f64,
    pub display: String,
}

impl FlagValue {
    pub fn number(value: f64) -> Self {
        Self {
            numeric: value,
            display: value.to_string(),
        }
    }

    pub fn text(value: f64, display: impl Into<String>) -> Self {
        Self {
            numeric: value,
            display: display.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFlag {
    pub origin: FlagOrigin,
    pub severity: RiskLevel,
    pub metric: String,
    pub value: FlagValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    pub message: String,
    pub recommendation: String,
}

/// Intake assessment scores. Absent fields were not assessed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineRiskInput {
    #[serde(default)]
    pub phq9: Option<u32>,
    #[serde(default)]
    pub gad7: Option<u32>,
    #[serde(default)]
    pub pcl5: Option<u32>,
    #[serde(default)]
    pub ace: Option<u32>,
}

/// One vitals observation taken during a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    pub heart_rate: f64,
    #[serde(default)]
    pub baseline_heart_rate: Option<f64>,
    pub blood_pressure_systolic: f64,
    pub blood_pressure_diastolic: f64,
    #[serde(default)]
    pub spo2: Option<f64>,
    /// Degrees Fahrenheit.
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Repeated measurements of one instrument, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTrend {
    pub metric: String,
    pub values: Vec<f64>,
    pub baseline: f64,
}

/// Everything the dashboard knows about a patient at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSnapshot {
    #[serde(default)]
    pub baseline: Option<BaselineRiskInput>,
    #[serde(default)]
    pub vitals: Option<VitalSigns>,
    #[serde(default)]
    pub progress_trends: Vec<ProgressTrend>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub all_flags: Vec<RiskFlag>,
    pub baseline_flags: Vec<RiskFlag>,
    pub vital_flags: Vec<RiskFlag>,
    pub progress_flags: Vec<RiskFlag>,
    pub overall_risk_level: RiskLevel,
    pub has_high_risk: bool,
    pub has_moderate_risk: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Biweekly => "biweekly",
            Frequency::Monthly => "monthly",
        }
    }
}

/// Scheduler inputs. `pcl5` is optional on intake and counts as zero when absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationInput {
    pub ace: u32,
    pub gad7: u32,
    pub expectancy: u32,
    pub phq9: u32,
    #[serde(default)]
    pub pcl5: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledSession {
    pub week: u32,
    pub session_number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationPrediction {
    pub recommended_sessions: u32,
    pub risk_level: RiskLevel,
    pub frequency: Frequency,
    pub schedule: Vec<ScheduledSession>,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDate {
    pub session_number: u32,
    pub week: u32,
    pub date: chrono::NaiveDate,
}

/// One row of a batch baseline screening file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningRecord {
    pub patient_id: Uuid,
    pub full_name: String,
    pub baseline: BaselineRiskInput,
    pub expectancy: Option<u32>,
}

/// Screening outcome for one patient in a batch.
#[derive(Debug, Clone)]
pub struct PatientScore {
    pub patient_id: Uuid,
    pub full_name: String,
    pub level: RiskLevel,
    pub flag_count: usize,
    pub integration_sessions: u32,
}

#[derive(Debug, Clone)]
pub struct LevelSummary {
    pub level: RiskLevel,
    pub count: usize,
}
