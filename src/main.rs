//! `asset-inspector` command-line front end.
//!
//! ```bash
//! asset-inspector analyze --status Fair --comments "rust on door hinge" --photos 2
//! asset-inspector analyze --submission audit.json --photo door.jpg --photo gauge.jpg
//! asset-inspector photo door.jpg --status Poor
//! asset-inspector health
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use asset_inspector_lib::config::{self, AiSettings};
use asset_inspector_lib::models::{AnalysisResult, AuditInput, AuditStatus, AuditSubmission};
use asset_inspector_lib::pipeline::analysis::AnalysisPipeline;
use asset_inspector_lib::pipeline::capability::LlmClient;
use asset_inspector_lib::pipeline::extraction_example::ExtractionExample;

/// AI analysis for field asset inspections
#[derive(Parser, Debug)]
#[command(name = "asset-inspector", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify, summarize and structure one audit
    Analyze {
        /// Audit status: Good, Fair, Poor or Critical
        #[arg(long, required_unless_present = "submission")]
        status: Option<AuditStatus>,

        /// Inspector comments (free text)
        #[arg(long, default_value = "", conflicts_with = "submission")]
        comments: String,

        /// Number of photos taken during the audit
        #[arg(long, default_value_t = 0, conflicts_with = "submission")]
        photos: u32,

        /// Audit submission JSON file
        #[arg(long, value_name = "FILE", conflicts_with = "status")]
        submission: Option<PathBuf>,

        /// Photo to assess alongside the audit (repeatable)
        #[arg(long = "photo", value_name = "IMAGE")]
        photo_paths: Vec<PathBuf>,
    },

    /// Assess a single inspection photo
    Photo {
        /// Image file (JPEG, PNG, GIF or WebP)
        path: PathBuf,

        /// Status the inspector assigned to the asset
        #[arg(long, default_value = "Good")]
        status: String,
    },

    /// Probe the configured AI service
    Health,
}

#[derive(Serialize)]
struct PhotoAssessment {
    path: PathBuf,
    assessment: String,
}

#[derive(Serialize)]
struct AuditReport {
    #[serde(flatten)]
    analysis: AnalysisResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    photo_assessments: Vec<PhotoAssessment>,
}

fn main() -> Result<()> {
    asset_inspector_lib::init_tracing();
    let cli = Cli::parse();

    let settings = AiSettings::from_env().context("Invalid AI configuration")?;
    let client = config::build_client(&settings).context("Cannot create AI client")?;

    match cli.command {
        Command::Health => {
            let health = client
                .health_check()
                .context("AI service health check failed")?;
            print_json(&health)
        }
        Command::Photo { path, status } => {
            let bytes = read_image(&path)?;
            let pipeline = AnalysisPipeline::new(client, ExtractionExample::bundled());
            println!("{}", pipeline.analyze_photo(&bytes, &status));
            Ok(())
        }
        Command::Analyze {
            status,
            comments,
            photos,
            submission,
            photo_paths,
        } => {
            let input = match (submission, status) {
                (Some(path), _) => load_submission(&path)?.to_input(),
                (None, Some(status)) => AuditInput::new(comments, status, photos),
                (None, None) => bail!("either --status or --submission is required"),
            };
            let example = load_example(&settings)?;
            let pipeline = AnalysisPipeline::new(client, example);
            let report = run_audit(&pipeline, &input, &photo_paths)?;
            print_json(&report)
        }
    }
}

/// Audit stages and photo assessments run side by side on scoped threads.
fn run_audit(
    pipeline: &AnalysisPipeline,
    input: &AuditInput,
    photo_paths: &[PathBuf],
) -> Result<AuditReport> {
    let images = photo_paths
        .iter()
        .map(|path| read_image(path).map(|bytes| (path, bytes)))
        .collect::<Result<Vec<_>>>()?;
    let status_context = input.audit_status.to_string();

    let (analysis, photo_assessments) = std::thread::scope(|s| {
        let photo_handles: Vec<_> = images
            .iter()
            .map(|(path, bytes)| {
                let status_context = status_context.as_str();
                s.spawn(move || PhotoAssessment {
                    path: path.to_path_buf(),
                    assessment: pipeline.analyze_photo(bytes, status_context),
                })
            })
            .collect();

        let analysis = pipeline.analyze_audit(input);
        let assessments = photo_handles
            .into_iter()
            .map(|h| h.join())
            .collect::<std::result::Result<Vec<_>, _>>();
        (analysis, assessments)
    });

    let photo_assessments = match photo_assessments {
        Ok(assessments) => assessments,
        Err(_) => bail!("photo analysis worker panicked"),
    };

    Ok(AuditReport {
        analysis,
        photo_assessments,
    })
}

fn load_example(settings: &AiSettings) -> Result<ExtractionExample> {
    let default_path = config::default_example_path().unwrap_or_default();
    ExtractionExample::resolve(settings.extraction_example.as_deref(), &default_path)
        .context("Cannot load extraction example")
}

fn load_submission(path: &Path) -> Result<AuditSubmission> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read submission {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid submission {}", path.display()))
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Cannot read image {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Cannot serialize output")?;
    println!("{json}");
    Ok(())
}
