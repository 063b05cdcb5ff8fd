use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use quintet_config::{KernelConfig, WorkflowDef};
use quintet_driver::SemanticDriver;
use quintet_graph::NodeId;
use quintet_kernel::Stimulus;
use quintet_ontology::PatternOntology;
use quintet_transaction::{FireOutcome, TransactionManager};
use quintet_workflow::Topology;

/// Quintet - workflow patterns executed as five graph verbs
#[derive(Parser)]
#[command(name = "quintet")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Turtle file with the pattern ontology (default: built-in dataset)
  #[arg(long, global = true)]
  ontology: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List the pattern mappings of the ontology
  Patterns,

  /// Start a case and fire tasks in order
  Run {
    /// Path to the workflow file (JSON)
    workflow_file: PathBuf,

    /// Task to fire; repeat to fire several in order
    #[arg(long = "fire")]
    fire: Vec<String>,

    /// Lineage (case) identifier
    #[arg(long, default_value = "case-1")]
    lineage: String,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    )
    .with_writer(io::stderr)
    .init();

  let cli = Cli::parse();
  let config = KernelConfig {
    ontology_path: cli.ontology,
  };

  match cli.command {
    Some(Commands::Patterns) => list_patterns(&config)?,
    Some(Commands::Run {
      workflow_file,
      fire,
      lineage,
    }) => run_case(&config, workflow_file, fire, lineage)?,
    None => {
      println!("quintet - use --help to see available commands");
    }
  }

  Ok(())
}

fn load_ontology(config: &KernelConfig) -> Result<PatternOntology> {
  match &config.ontology_path {
    Some(path) => PatternOntology::load(path)
      .with_context(|| format!("failed to load ontology: {}", path.display())),
    None => PatternOntology::builtin().context("failed to load built-in ontology"),
  }
}

fn list_patterns(config: &KernelConfig) -> Result<()> {
  let ontology = load_ontology(config)?;
  let mappings: Vec<serde_json::Value> = ontology
    .mappings()
    .into_iter()
    .map(serde_json::to_value)
    .collect::<Result<_, _>>()?;

  println!("{}", serde_json::to_string_pretty(&mappings)?);
  Ok(())
}

fn run_case(
  config: &KernelConfig,
  workflow_file: PathBuf,
  fire: Vec<String>,
  lineage: String,
) -> Result<()> {
  let workflow_def = WorkflowDef::from_json_file(&workflow_file)
    .with_context(|| format!("failed to read workflow file: {}", workflow_file.display()))?;
  let topology = Topology::compile(&workflow_def).context("invalid workflow")?;
  info!(workflow_id = %topology.workflow_id, name = %topology.name, "workflow_loaded");

  let data = match read_payload_from_stdin()? {
    serde_json::Value::Object(map) => map.into_iter().collect(),
    other => anyhow::bail!("case data must be a JSON object, got {}", other),
  };

  let driver = SemanticDriver::new(load_ontology(config)?);
  let start = topology.start().to_vec();
  let mut manager = TransactionManager::new(topology.into_graph(), driver);

  let ctx = manager.context(&lineage).with_data(data);
  manager
    .inject(Stimulus::Start { nodes: start }, ctx.clone())
    .context("failed to start case")?;

  let mut steps = Vec::new();
  for task in fire {
    let ctx = manager
      .context(&lineage)
      .with_data(ctx.data.clone());
    let outcome = manager
      .fire(&NodeId::from(task.as_str()), ctx)
      .with_context(|| format!("failed to fire task '{}'", task))?;

    steps.push(match outcome {
      FireOutcome::Committed(receipt) => serde_json::to_value(receipt)?,
      FireOutcome::Unchanged => serde_json::json!({ "task": task, "unchanged": true }),
    });
  }

  let tokens: Vec<String> = manager
    .graph()
    .token_holders()
    .into_iter()
    .map(|n| n.to_string())
    .collect();

  let output = serde_json::json!({
    "lineage": lineage,
    "head": manager.head(&lineage),
    "steps": steps,
    "tokens": tokens,
  });
  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

fn read_payload_from_stdin() -> Result<serde_json::Value> {
  use std::io::IsTerminal;

  if io::stdin().is_terminal() {
    return Ok(serde_json::json!({}));
  }

  let mut input = String::new();
  io::stdin()
    .read_to_string(&mut input)
    .context("failed to read case data from stdin")?;

  if input.trim().is_empty() {
    Ok(serde_json::json!({}))
  } else {
    serde_json::from_str(&input).context("failed to parse case data JSON from stdin")
  }
}
