//! Fine-tuning workflow CLI.
//!
//! Drives the complete workflow (validate -> upload -> create -> poll) and
//! exposes the individual job operations. On success the `run` command
//! prints the fine-tuned model id to stdout; any failure exits non-zero
//! with an error message.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use identifier::{
    types::validate_artifact, JobOrchestrator, DEFAULT_BASE_MODEL, DEFAULT_SUFFIX,
};
use openai_client::OpenAIClient;

#[derive(Parser)]
#[command(name = "finetune", about = "Fine-tuning workflow for the component identifier")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full workflow: validate, upload, create, and poll to completion
    Run {
        /// Training artifact (JSONL, one example per line)
        #[arg(long, default_value = "data/training_data.jsonl")]
        training: PathBuf,

        /// Optional validation artifact
        #[arg(long)]
        validation: Option<PathBuf>,

        /// Base model to fine-tune
        #[arg(long, default_value = DEFAULT_BASE_MODEL)]
        base_model: String,

        /// Suffix for the fine-tuned model name
        #[arg(long, default_value = DEFAULT_SUFFIX)]
        suffix: String,

        /// Number of training epochs (provider default when unset)
        #[arg(long)]
        epochs: Option<u32>,

        /// Seconds between status polls
        #[arg(long, default_value_t = 60)]
        poll_interval: u64,

        /// Client-side polling budget in seconds; the job keeps running
        /// upstream when it lapses
        #[arg(long, default_value_t = 6 * 3600)]
        timeout: u64,
    },

    /// Check the status of an existing job
    Status {
        job_id: String,
    },

    /// List recent fine-tuning jobs
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Cancel a job upstream
    Cancel {
        job_id: String,
    },

    /// List uploaded fine-tune artifacts
    Files,

    /// Validate an artifact locally without uploading anything
    Validate {
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            training,
            validation,
            base_model,
            suffix,
            epochs,
            poll_interval,
            timeout,
        } => {
            let client = OpenAIClient::from_env().context("OPENAI_API_KEY must be set")?;
            let mut orchestrator = JobOrchestrator::new(client)
                .with_base_model(base_model)
                .with_suffix(suffix);
            if let Some(epochs) = epochs {
                orchestrator = orchestrator.with_n_epochs(epochs);
            }

            eprintln!("{}", "Submitting fine-tuning job...".bright_cyan());
            let mut job = orchestrator
                .submit(&training, validation.as_deref())
                .await
                .context("Job submission failed")?;
            eprintln!("  job id: {}", job.id.bright_white());

            eprintln!(
                "{}",
                format!("Polling every {}s (budget {}s)...", poll_interval, timeout)
                    .bright_cyan()
            );
            let job = orchestrator
                .await_completion(
                    &mut job,
                    Duration::from_secs(poll_interval),
                    Duration::from_secs(timeout),
                )
                .await
                .context("Fine-tuning did not complete")?;

            let model_id = job
                .model_id
                .context("Job succeeded but reported no model id")?;
            eprintln!("{}", "Fine-tuning succeeded".bright_green().bold());
            eprintln!("  set FINE_TUNED_MODEL to deploy this model");

            // The model id is the command's output; everything else goes
            // to stderr
            println!("{}", model_id);
        }

        Command::Status { job_id } => {
            let client = OpenAIClient::from_env().context("OPENAI_API_KEY must be set")?;
            let mut orchestrator = JobOrchestrator::new(client);
            let job = orchestrator
                .resume(&job_id)
                .await
                .context("Could not fetch job status")?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }

        Command::List { limit } => {
            let client = OpenAIClient::from_env().context("OPENAI_API_KEY must be set")?;
            let orchestrator = JobOrchestrator::new(client);
            let jobs = orchestrator
                .list_jobs(limit)
                .await
                .context("Could not list jobs")?;

            for job in jobs {
                let status = match job.status {
                    s if s.is_terminal() => s.to_string().bright_green(),
                    s => s.to_string().bright_yellow(),
                };
                print!("{}  {}", job.id.bright_white(), status);
                if let Some(model) = job.fine_tuned_model {
                    print!("  {}", model);
                }
                println!();
            }
        }

        Command::Cancel { job_id } => {
            let client = OpenAIClient::from_env().context("OPENAI_API_KEY must be set")?;
            let mut orchestrator = JobOrchestrator::new(client);
            let snapshot = orchestrator
                .cancel(&job_id)
                .await
                .context("Could not cancel job")?;
            eprintln!(
                "{} {} -> {}",
                "Cancelled".bright_yellow(),
                snapshot.id,
                snapshot.status
            );
        }

        Command::Files => {
            let client = OpenAIClient::from_env().context("OPENAI_API_KEY must be set")?;
            let files = client
                .list_files(Some("fine-tune"))
                .await
                .context("Could not list files")?;

            for file in files {
                println!(
                    "{}  {}  {} bytes",
                    file.id.bright_white(),
                    file.filename,
                    file.bytes
                );
            }
        }

        Command::Validate { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let count = validate_artifact(&content).context("Artifact is invalid")?;
            eprintln!(
                "{} {} examples",
                "Valid:".bright_green(),
                count.to_string().bright_white()
            );
        }
    }

    Ok(())
}
