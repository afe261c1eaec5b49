//! Interactive shortlist check: paste a job description and a resume, get a verdict.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use matcher::cli::{init_logging, ModelArgs};
use matcher::{score_pair, MatchPolicy, MatchReport};

#[derive(Debug, Parser)]
#[command(name = "shortlist", version, about = "Shortlist a resume against a job description")]
struct Cli {
    /// Read the job description from a file instead of stdin
    #[arg(long)]
    jd_file: Option<PathBuf>,

    /// Read the resume text from a file instead of stdin
    #[arg(long)]
    resume_file: Option<PathBuf>,

    #[command(flatten)]
    model: ModelArgs,
}

/// Reads a file, or prompts and reads one line from stdin.
fn read_input(file: Option<&PathBuf>, prompt: &str, input: &mut impl BufRead) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    println!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn render(report: &MatchReport, policy: &MatchPolicy) -> String {
    let mark = if report.is_eligible { "✅" } else { "❌" };
    let label = if report.is_eligible {
        policy.accept_label
    } else {
        policy.reject_label
    };
    format!(
        "Similarity Score: {:.2}%\nStatus: {label} {mark}",
        report.score
    )
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let policy = cli.model.apply_threshold(MatchPolicy::shortlist());
    let embedder = cli
        .model
        .load_embedder("all-mpnet-base-v2", 384, &policy)?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let jd = read_input(cli.jd_file.as_ref(), "Enter Job Description:", &mut input)?;
    let resume = read_input(cli.resume_file.as_ref(), "\nEnter Resume Text:", &mut input)?;

    let report = score_pair(&embedder, &policy, &jd, &resume)?;
    println!("\n{}", render(&report, &policy));
    Ok(())
}
