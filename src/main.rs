use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;

use arc_of_care_risk::config::{AppConfig, OutputFormat};
use arc_of_care_risk::models::{BaselineRiskInput, IntegrationInput, PatientScore, RiskAssessment};
use arc_of_care_risk::severity::{classify, Instrument};
use arc_of_care_risk::{integration, intake, report, risk, telemetry};

#[derive(Parser)]
#[command(name = "arc-of-care-risk")]
#[command(about = "Clinical risk flags and integration planning for the arc of care", long_about = None)]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a single score in its instrument's severity band
    Classify {
        #[arg(long)]
        instrument: Instrument,
        #[arg(long, allow_negative_numbers = true)]
        score: f64,
    },
    /// Evaluate baseline, vitals and progress flags for a patient snapshot
    Screen {
        #[arg(long)]
        input: PathBuf,
    },
    /// Predict an integration-session plan from baseline scores
    Plan {
        #[arg(long)]
        ace: u32,
        #[arg(long)]
        gad7: u32,
        #[arg(long)]
        expectancy: u32,
        #[arg(long)]
        phq9: u32,
        #[arg(long, default_value_t = 0)]
        pcl5: u32,
        /// Date of the first integration session
        #[arg(long)]
        start: Option<NaiveDate>,
    },
    /// Screen a CSV of baseline scores and rank patients by risk
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Also write a markdown cohort report
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown patient report
    Report {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "patient")]
        label: String,
        #[arg(long, default_value_t = 50)]
        expectancy: u32,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Check snapshot scores against instrument ranges
    Validate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        expectancy: Option<u32>,
    },
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize output")?
    );
    Ok(())
}

fn print_assessment(assessment: &RiskAssessment) {
    if assessment.all_flags.is_empty() {
        println!("No risk flags raised.");
    } else {
        for flag in &assessment.all_flags {
            println!(
                "- [{}] {} {}: {} ({})",
                flag.severity,
                flag.origin.as_str(),
                flag.metric,
                flag.message,
                flag.value.display
            );
            println!("    {}", flag.recommendation);
        }
    }
    println!("Overall risk level: {}", assessment.overall_risk_level);
}

/// Missing baseline scores count as zero for scheduling.
fn integration_input(baseline: Option<&BaselineRiskInput>, expectancy: u32) -> IntegrationInput {
    let baseline = baseline.cloned().unwrap_or_default();
    IntegrationInput {
        ace: baseline.ace.unwrap_or(0),
        gad7: baseline.gad7.unwrap_or(0),
        expectancy,
        phq9: baseline.phq9.unwrap_or(0),
        pcl5: baseline.pcl5.unwrap_or(0),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(&config.telemetry).context("failed to initialise logging")?;

    let output = if cli.json {
        OutputFormat::Json
    } else {
        config.output
    };

    match cli.command {
        Commands::Classify { instrument, score } => {
            let classification = classify(instrument, score);
            match output {
                OutputFormat::Json => print_json(&classification)?,
                OutputFormat::Text => {
                    println!(
                        "{} {}: {}",
                        instrument, classification.score, classification.label
                    );
                    if let Some(recommendation) = classification.recommendation {
                        println!("{recommendation}");
                    }
                }
            }
        }
        Commands::Screen { input } => {
            let snapshot = intake::load_snapshot(&input)?;
            if let Some(baseline) = &snapshot.baseline {
                intake::warn_on_invalid(&input.display().to_string(), baseline, None);
            }
            let assessment = risk::assess(&snapshot);
            info!(
                flags = assessment.all_flags.len(),
                level = %assessment.overall_risk_level,
                "snapshot screened"
            );
            match output {
                OutputFormat::Json => print_json(&assessment)?,
                OutputFormat::Text => print_assessment(&assessment),
            }
        }
        Commands::Plan {
            ace,
            gad7,
            expectancy,
            phq9,
            pcl5,
            start,
        } => {
            let prediction = integration::predict_integration(&IntegrationInput {
                ace,
                gad7,
                expectancy,
                phq9,
                pcl5,
            });
            let calendar = start.map(|date| integration::session_calendar(&prediction, date));

            match output {
                OutputFormat::Json => print_json(&serde_json::json!({
                    "prediction": prediction,
                    "calendar": calendar,
                }))?,
                OutputFormat::Text => {
                    println!(
                        "{} {} integration sessions ({} risk)",
                        prediction.recommended_sessions,
                        prediction.frequency.as_str(),
                        prediction.risk_level
                    );
                    println!("{}", prediction.rationale.trim_end());
                    match &calendar {
                        Some(dates) => {
                            for session in dates {
                                println!(
                                    "- Session {} (week {}): {}",
                                    session.session_number, session.week, session.date
                                );
                            }
                        }
                        None => {
                            for session in &prediction.schedule {
                                println!(
                                    "- Session {}: week {}",
                                    session.session_number, session.week
                                );
                            }
                        }
                    }
                }
            }
        }
        Commands::Import { csv, limit, out } => {
            let records = intake::load_screening_csv(&csv)?;
            let mut scores: Vec<PatientScore> = records
                .iter()
                .map(|record| {
                    intake::warn_on_invalid(&record.full_name, &record.baseline, record.expectancy);
                    let flags = risk::evaluate_baseline(&record.baseline);
                    let plan = integration::predict_integration(&integration_input(
                        Some(&record.baseline),
                        record.expectancy.unwrap_or(50),
                    ));
                    PatientScore {
                        patient_id: record.patient_id,
                        full_name: record.full_name.clone(),
                        level: risk::aggregate(&flags),
                        flag_count: flags.len(),
                        integration_sessions: plan.recommended_sessions,
                    }
                })
                .collect();
            report::rank_by_risk(&mut scores);
            info!(patients = scores.len(), source = %csv.display(), "screening file processed");

            if let Some(out) = out {
                let path = config.report_path(&out);
                let cohort = report::build_cohort_report(&csv.display().to_string(), &scores);
                std::fs::write(&path, cohort)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Cohort report written to {}.", path.display());
            }

            if scores.is_empty() {
                println!("No patients found in {}.", csv.display());
                return Ok(());
            }

            println!("Risk mix:");
            for summary in report::summarize_by_level(&scores) {
                println!("- {}: {} patients", summary.level, summary.count);
            }
            println!("Top patients by risk:");
            for score in scores.iter().take(limit) {
                println!(
                    "- {} ({}) {} risk across {} flags, {} integration sessions",
                    score.full_name,
                    score.patient_id,
                    score.level,
                    score.flag_count,
                    score.integration_sessions
                );
            }
        }
        Commands::Report {
            input,
            label,
            expectancy,
            start,
            out,
        } => {
            let snapshot = intake::load_snapshot(&input)?;
            let assessment = risk::assess(&snapshot);
            let prediction = integration::predict_integration(&integration_input(
                snapshot.baseline.as_ref(),
                expectancy,
            ));
            let calendar = start.map(|date| integration::session_calendar(&prediction, date));
            let document = report::build_patient_report(
                &label,
                &snapshot,
                &assessment,
                &prediction,
                calendar.as_deref(),
            );

            let path = config.report_path(&out);
            std::fs::write(&path, document)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        Commands::Validate { input, expectancy } => {
            let snapshot = intake::load_snapshot(&input)?;
            let baseline = snapshot.baseline.unwrap_or_default();
            let errors = intake::validate_baseline(&baseline, expectancy);

            match output {
                OutputFormat::Json => print_json(&errors)?,
                OutputFormat::Text if errors.is_empty() => println!("All scores within range."),
                OutputFormat::Text => {
                    for error in &errors {
                        println!("- {error}");
                    }
                }
            }

            if !errors.is_empty() {
                anyhow::bail!("{} score(s) out of range", errors.len());
            }
        }
    }

    Ok(())
}
