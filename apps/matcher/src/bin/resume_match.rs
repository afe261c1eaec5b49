//! Scores a PDF resume against a job description and prints a JSON verdict.
//!
//! Called by the platform backend as `resume-match "<job description>" <resume.pdf>`;
//! stdout is always exactly one JSON object.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::Parser;
use serde_json::json;
use tracing::error;

use matcher::cli::{init_logging, ModelArgs};
use matcher::resume::extract_pdf_text;
use matcher::{score_pair, MatchPolicy, MatchReport};

#[derive(Debug, Parser)]
#[command(name = "resume-match", version, about = "Semantic resume vs job description match")]
struct Cli {
    /// Job description from the alumni job post
    #[arg(allow_hyphen_values = true)]
    job_description: Option<String>,

    /// Path of the student's uploaded resume (PDF)
    resume_path: Option<PathBuf>,

    #[command(flatten)]
    model: ModelArgs,
}

fn run(model: &ModelArgs, job_description: &str, resume_path: &Path) -> Result<MatchReport> {
    let policy = model.apply_threshold(MatchPolicy::resume());
    let embedder = model.load_embedder("all-MiniLM-L6-v2", 256, &policy)?;
    let resume_text = extract_pdf_text(resume_path)?;
    score_pair(&embedder, &policy, job_description, &resume_text)
}

/// What the command line asks for.
#[derive(Debug)]
enum Invocation {
    Match {
        job_description: String,
        resume_path: PathBuf,
        model: ModelArgs,
    },
    /// `--help` or `--version`; clap prints these itself.
    Info(clap::Error),
    /// Unusable arguments, reported as `{"error": <message>}`.
    Invalid(String),
}

fn parse_invocation<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            return Invocation::Info(e)
        }
        Err(e) => {
            let rendered = e.to_string();
            let message = rendered
                .lines()
                .next()
                .unwrap_or("Invalid arguments")
                .trim_start_matches("error: ")
                .to_string();
            return Invocation::Invalid(message);
        }
    };

    match (cli.job_description, cli.resume_path) {
        (Some(job_description), Some(resume_path)) => Invocation::Match {
            job_description,
            resume_path,
            model: cli.model,
        },
        _ => Invocation::Invalid("Missing arguments".to_string()),
    }
}

fn main() -> ExitCode {
    init_logging();

    let (job_description, resume_path, model) = match parse_invocation(std::env::args_os()) {
        Invocation::Match {
            job_description,
            resume_path,
            model,
        } => (job_description, resume_path, model),
        Invocation::Info(e) => e.exit(),
        Invocation::Invalid(message) => {
            println!("{}", json!({ "error": message }));
            return ExitCode::FAILURE;
        }
    };

    match run(&model, &job_description, &resume_path) {
        Ok(report) => {
            println!("{}", json!(report));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Resume match failed: {e:#}");
            println!("{}", json!({"error": format!("{e:#}")}));
            ExitCode::FAILURE
        }
    }
}
