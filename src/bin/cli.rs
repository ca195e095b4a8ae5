//! Demo binary driving an [`IntakeRuntime`] from the command line.
//!
//! Reads a JSON Schema file, keeps one intake's submissions in memory for
//! the process lifetime, and exposes the orchestrator's operations as
//! subcommands. Useful for poking at the lifecycle by hand; not a served
//! API of any kind — wiring a transport in front of [`IntakeRuntime`] is an
//! embedder's job.

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use intake_kernel::{Actor, ActorKind, IntakeRuntime};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "intake-cli", about = "Drive an intake submission runtime from the command line")]
struct Cli {
    /// Path to the JSON Schema file governing this intake.
    #[arg(long)]
    schema: PathBuf,

    /// Identifier for this intake (used only for log correlation).
    #[arg(long, default_value = "cli")]
    intake_id: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new submission, optionally seeded with initial field data.
    Create {
        #[arg(long)]
        fields: Option<String>,
        #[arg(long)]
        idempotency_key: Option<String>,
    },
    /// Print a submission's full state, including its event log.
    Get { submission_id: String },
    /// Merge field data into a submission.
    Update {
        submission_id: String,
        #[arg(long)]
        fields: String,
    },
    /// Validate and transition a submission to `submitted`.
    Submit { submission_id: String },
    /// Move a submitted submission to `needs_review`.
    RequestReview { submission_id: String },
    /// Approve a submission under review.
    Approve { submission_id: String },
    /// Reject a submission under review.
    Reject {
        submission_id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Move an approved (or directly submitted) submission to `finalized`.
    Finalize { submission_id: String },
    /// Cancel a submission from any non-terminal state.
    Cancel { submission_id: String },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    intake_kernel::observability::init_tracing();
    let cli = Cli::parse();

    let schema_text = fs::read_to_string(&cli.schema)?;
    let schema: Value = serde_json::from_str(&schema_text)?;
    let runtime = IntakeRuntime::new(cli.intake_id, schema)?;
    let actor = Actor::new(ActorKind::Human, "cli-operator");

    let result = match cli.command {
        Command::Create { fields, idempotency_key } => {
            let initial = fields
                .map(|raw| parse_fields(&raw))
                .transpose()?;
            runtime.create_submission(actor, idempotency_key, initial, None)
        }
        Command::Update { submission_id, fields } => {
            runtime.update_fields(&submission_id, actor, parse_fields(&fields)?)
        }
        Command::Submit { submission_id } => runtime.submit(&submission_id, actor),
        Command::RequestReview { submission_id } => runtime.request_review(&submission_id, actor),
        Command::Approve { submission_id } => runtime.approve(&submission_id, actor),
        Command::Reject { submission_id, reason } => runtime.reject(&submission_id, actor, reason),
        Command::Finalize { submission_id } => runtime.finalize(&submission_id, actor),
        Command::Cancel { submission_id } => runtime.cancel(&submission_id, actor),
        Command::Get { submission_id } => {
            let detail = runtime.get_submission(&submission_id)?;
            println!("{}", serde_json::to_string_pretty(&detail)?);
            return Ok(());
        }
    }?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn parse_fields(raw: &str) -> Result<serde_json::Map<String, Value>, Box<dyn std::error::Error>> {
    match serde_json::from_str(raw)? {
        Value::Object(map) => Ok(map),
        _ => Err("--fields must be a JSON object".into()),
    }
}
