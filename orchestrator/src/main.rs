//! VIRA CLI
//!
//! Usage:
//!   vira list
//!   vira run planning --input "Migrate the billing service"
//!   vira run code-development --input '{"task": "Rate limiter", "language": "rust"}'
//!   vira models --intelligence 0.9 --cost 0.05 --speed 0.05

use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vira_agent::config::{McpConfig, ViraFileConfig};
use vira_agent::ModelPreferences;
use vira_orchestrator::{
    builtin_registry, EngineConfig, WorkflowContext, WorkflowResult, WorkflowRunner,
};

#[derive(Parser)]
#[command(name = "vira")]
#[command(about = "Run VIRA agent workflows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List available workflows
    List,
    /// Run a workflow
    Run {
        /// Workflow name (e.g., "planning", "code-development")
        workflow: String,

        /// Workflow input: JSON, or plain text passed as a string
        #[arg(long, short)]
        input: Option<String>,

        /// Print the full invocation record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the model catalog and which variant preferences select
    Models {
        #[arg(long, default_value_t = 0.5)]
        intelligence: f64,
        #[arg(long, default_value_t = 0.25)]
        cost: f64,
        #[arg(long, default_value_t = 0.25)]
        speed: f64,
        /// Backend kind (defaults to the configured backend)
        #[arg(long)]
        backend: Option<String>,
    },
}

/// Initialize tracing with the given verbosity level
///
/// - 0: warn (default)
/// - 1: info (-v)
/// - 2: debug (-vv)
/// - 3+: trace (-vvv)
fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    // Allow RUST_LOG to override if set
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// JSON when it parses, otherwise the raw text as a JSON string
fn parse_input(raw: Option<String>) -> Value {
    match raw {
        None => Value::Null,
        Some(raw) => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let file_config = ViraFileConfig::load()?;

    match cli.command {
        Commands::List => {
            let registry = builtin_registry()?;
            println!("Available Workflows:\n");
            for (name, description) in registry.list() {
                println!("  {} - {}", name, description);
            }
            println!("\nRun a workflow with: vira run <name> --input \"...\"");
        }

        Commands::Run {
            workflow,
            input,
            json,
        } => {
            let ctx = WorkflowContext::from_config(&file_config, McpConfig::load()?)?;
            let runner = WorkflowRunner::new(Arc::new(builtin_registry()?), ctx)
                .with_config(EngineConfig::from_file_config(&file_config));

            let cancel = CancellationToken::new();
            let on_ctrl_c = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    eprintln!("Cancelling...");
                    on_ctrl_c.cancel();
                }
            });

            let invocation = runner
                .invoke_with_cancel(&workflow, parse_input(input), cancel)
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&invocation)?);
            } else if let Some(text) = invocation.result.text() {
                println!("{}", text);
            }

            if let WorkflowResult::Failure {
                kind,
                message,
                agent,
            } = &invocation.result
            {
                match agent {
                    Some(agent) => eprintln!(
                        "Workflow '{}' failed ({}) in agent '{}': {}",
                        workflow, kind, agent, message
                    ),
                    None => eprintln!("Workflow '{}' failed ({}): {}", workflow, kind, message),
                }
                std::process::exit(1);
            }
        }

        Commands::Models {
            intelligence,
            cost,
            speed,
            backend,
        } => {
            let catalog = file_config.model_catalog()?;
            let backend = backend.unwrap_or_else(|| file_config.llm.backend.clone());
            let preferences = ModelPreferences::new(intelligence, cost, speed)?;

            println!("Models for backend '{}':\n", backend);
            for variant in catalog.candidates_for(&backend) {
                println!(
                    "  {:<20} capability {:.2}  cost {:.2}  latency {:.2}  score {:+.3}",
                    variant.name,
                    variant.capability,
                    variant.cost,
                    variant.latency,
                    variant.weighted_score(&preferences)
                );
            }

            let selected = catalog.select(&backend, &preferences)?;
            println!("\nSelected: {}", selected.name);
        }
    }

    Ok(())
}
