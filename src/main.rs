// Reforge: step through a small program and check a predicted trace against it

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reforge::snapshot::decode_learner_trace_str;
use reforge::ui::App;
use reforge::{ExecutionRequest, SimulationConfig, SubsetKind};

#[derive(Parser, Debug)]
#[command(name = "reforge", version, about = "Trace a small program step by step")]
struct Args {
    /// Source file to simulate
    file: PathBuf,

    /// Language tag (defaults to the file extension, then "cpp")
    #[arg(short, long)]
    language: Option<String>,

    /// JSON file holding the learner's predicted trace
    #[arg(long, value_name = "TRACE.json")]
    learner: Option<PathBuf>,

    /// Loop iteration cap for the C-like stepper
    #[arg(long)]
    iteration_cap: Option<usize>,

    /// Statement budget for the dynamic-subset evaluator
    #[arg(long)]
    step_budget: Option<usize>,

    /// Maximum call depth for the dynamic-subset evaluator
    #[arg(long)]
    max_call_depth: Option<usize>,

    /// Print the outcome as JSON instead of opening the viewer
    #[arg(long)]
    json: bool,
}

impl Args {
    fn language_tag(&self) -> String {
        self.language
            .clone()
            .or_else(|| {
                self.file
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| "cpp".to_string())
    }

    fn config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        if let Some(cap) = self.iteration_cap {
            config.iteration_cap = cap;
        }
        if let Some(budget) = self.step_budget {
            config.script_step_budget = budget;
        }
        if let Some(depth) = self.max_call_depth {
            config.max_call_depth = depth;
        }
        config
    }
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        bail!("File '{}' not found", path.display());
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let source = read_file(&args.file)?;
    let subset = SubsetKind::from_language_tag(&args.language_tag());

    let mut request = ExecutionRequest::new(source.clone(), subset);
    if let Some(path) = &args.learner {
        let trace = decode_learner_trace_str(&read_file(path)?);
        if trace.is_empty() {
            warn!(path = %path.display(), "learner trace is empty or unreadable");
        }
        request = request.with_learner_trace(trace);
    }
    let has_learner_trace = request.learner_trace.is_some();

    let outcome = reforge::execute(&request, &args.config())?;
    info!(
        file = %args.file.display(),
        subset = subset.name(),
        steps = outcome.trace.len(),
        "simulation finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(outcome, source, has_learner_trace);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("viewer failed")
}
