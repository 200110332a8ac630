use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    Phq9,
    Gad7,
    Pcl5,
    Ace,
    Expectancy,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown instrument: {0}")]
pub struct UnknownInstrument(pub String);

/// One row of an instrument's band table. Bounds are inclusive.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
    pub label: &'static str,
    pub recommendation: Option<&'static str>,
}

const fn band(
    lower: f64,
    upper: f64,
    label: &'static str,
    recommendation: Option<&'static str>,
) -> Band {
    Band {
        lower,
        upper,
        label,
        recommendation,
    }
}

const PHQ9_BANDS: &[Band] = &[
    band(0.0, 4.0, "Minimal", Some("Standard protocol appropriate")),
    band(5.0, 9.0, "Mild", Some("Monitor symptoms during integration")),
    band(10.0, 14.0, "Moderate", Some("Enhanced safety monitoring recommended")),
    band(
        15.0,
        19.0,
        "Moderately Severe",
        Some("Psychiatric consultation and safety protocol required"),
    ),
    band(
        20.0,
        27.0,
        "Severe",
        Some("Psychiatric consultation and safety protocol required"),
    ),
];

const GAD7_BANDS: &[Band] = &[
    band(0.0, 4.0, "Minimal", Some("Standard protocol appropriate")),
    band(5.0, 9.0, "Mild", Some("Grounding techniques on standby")),
    band(10.0, 14.0, "Moderate", Some("Anxiolytic support may be beneficial")),
    band(
        15.0,
        21.0,
        "Severe",
        Some("Pre-medication with anxiolytic strongly recommended"),
    ),
];

const PCL5_BANDS: &[Band] = &[
    band(0.0, 30.0, "Minimal", Some("Standard protocol appropriate")),
    band(
        31.0,
        45.0,
        "Mild",
        Some("Trauma-informed care and grounding techniques indicated"),
    ),
    band(
        46.0,
        60.0,
        "Moderate",
        Some("Trauma-focused integration and enhanced safety monitoring required"),
    ),
    band(
        61.0,
        80.0,
        "Severe",
        Some("Psychiatric consultation and trauma specialist involvement strongly indicated"),
    ),
];

const ACE_BANDS: &[Band] = &[
    band(0.0, 0.0, "None", Some("No additional support needed")),
    band(1.0, 3.0, "Low", Some("Standard integration protocol")),
    band(4.0, 6.0, "Moderate", Some("4-6 integration sessions recommended")),
    band(7.0, 10.0, "High", Some("6-8 integration sessions strongly recommended")),
];

const EXPECTANCY_BANDS: &[Band] = &[
    band(1.0, 40.0, "Low Belief", None),
    band(41.0, 70.0, "Moderate Belief", None),
    band(71.0, 100.0, "High Belief", None),
];

impl Instrument {
    pub const ALL: [Instrument; 5] = [
        Instrument::Phq9,
        Instrument::Gad7,
        Instrument::Pcl5,
        Instrument::Ace,
        Instrument::Expectancy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Instrument::Phq9 => "PHQ-9",
            Instrument::Gad7 => "GAD-7",
            Instrument::Pcl5 => "PCL-5",
            Instrument::Ace => "ACE",
            Instrument::Expectancy => "Expectancy",
        }
    }

    pub fn bands(&self) -> &'static [Band] {
        match self {
            Instrument::Phq9 => PHQ9_BANDS,
            Instrument::Gad7 => GAD7_BANDS,
            Instrument::Pcl5 => PCL5_BANDS,
            Instrument::Ace => ACE_BANDS,
            Instrument::Expectancy => EXPECTANCY_BANDS,
        }
    }

    /// Documented score range as `(min, max)`.
    pub fn range(&self) -> (f64, f64) {
        let bands = self.bands();
        (bands[0].lower, bands[bands.len() - 1].upper)
    }
}

impl FromStr for Instrument {
    type Err = UnknownInstrument;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "phq9" | "phq-9" => Ok(Instrument::Phq9),
            "gad7" | "gad-7" => Ok(Instrument::Gad7),
            "pcl5" | "pcl-5" => Ok(Instrument::Pcl5),
            "ace" => Ok(Instrument::Ace),
            "expectancy" => Ok(Instrument::Expectancy),
            _ => Err(UnknownInstrument(value.to_string())),
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub instrument: Instrument,
    /// Score after clamping into the instrument's range.
    pub score: f64,
    pub label: &'static str,
    pub recommendation: Option<&'static str>,
}

/// Places a score in its instrument's band table. Out-of-range scores are
/// clamped to the nearest edge; NaN lands in the lowest band.
pub fn classify(instrument: Instrument, score: f64) -> Classification {
    let (min, max) = instrument.range();
    let score = if score.is_nan() { min } else { score.clamp(min, max) };
    let found = classify_by_band(instrument.bands(), score);

    Classification {
        instrument,
        score,
        label: found.label,
        recommendation: found.recommendation,
    }
}

/// First band whose upper bound covers the score. Scores falling between two
/// integer bands (e.g. 4.5) belong to the higher one.
pub fn classify_by_band(bands: &'static [Band], score: f64) -> &'static Band {
    bands
        .iter()
        .find(|band| score <= band.upper)
        .unwrap_or(&bands[bands.len() - 1])
}
