//! CLI entrypoint for LLM Council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use council_application::{
    Broadcaster, CallContext, CouncilParams, InMemoryMetrics, NoBroadcast, RunCouncilError,
    RunCouncilInput, RunCouncilUseCase,
};
use council_domain::{ConfigIssue, OutputFormat, Question, Severity};
use council_infrastructure::{
    ConfigLoader, FileConfig, JsonSnapshotExporter, JsonlPersistenceSink, load_fixture,
};
use council_presentation::{Cli, ConsoleFormatter, ProgressReporter};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    apply_overrides(&mut config, &cli);

    let issues = config.validate();
    report_issues(&issues);
    if ConfigIssue::has_errors(&issues) {
        bail!("Invalid configuration");
    }

    let Some(fixture) = &cli.fixture else {
        bail!("No agents configured. Use --fixture <PATH> to describe the council.");
    };
    let agents = load_fixture(fixture)?;

    let question = match &cli.question {
        Some(q) => Question::new(q.as_str())?,
        None => bail!("Question is required."),
    };

    let format = output_format(&config, &cli);
    ConsoleFormatter::set_color(config.output.color && !cli.no_color);

    // === Dependency Injection ===
    let params = config.to_params();
    let metrics = Arc::new(InMemoryMetrics::new());
    let broadcaster: Arc<dyn Broadcaster> = if cli.quiet {
        Arc::new(NoBroadcast)
    } else {
        Arc::new(ProgressReporter::new(agents.len()))
    };
    let use_case = build_use_case(params, &config, metrics.clone(), broadcaster)?;

    // Ctrl-C cancels the whole request
    let ctx = CallContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling council");
            canceller.cancel();
        }
    });

    info!("Starting LLM Council with {} agents", agents.len());
    let outcome = match use_case
        .execute(&ctx, RunCouncilInput::new(question, agents))
        .await
    {
        Ok(outcome) => outcome,
        Err(e @ RunCouncilError::Cancelled { .. }) => bail!("{}", e),
        Err(e) => return Err(e).context("Council run failed"),
    };

    for (agent, m) in metrics.snapshot_all() {
        info!(
            "{}: {} ok / {} failed, {} attempts, {} tokens",
            agent,
            m.rounds_succeeded,
            m.rounds_failed,
            m.attempts,
            m.total_tokens().total()
        );
    }

    println!("{}", ConsoleFormatter::render(&outcome, format));

    Ok(())
}

/// Command-line flags take precedence over every config source
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(rounds) = cli.rounds {
        config.council.rounds = rounds;
    }
    if let Some(seed) = cli.seed {
        config.council.seed = Some(seed);
    }
    if let Some(dir) = &cli.results_dir {
        config.output.results_dir = Some(dir.clone());
    }
}

fn output_format(config: &FileConfig, cli: &Cli) -> OutputFormat {
    match cli.output {
        Some(format) => format.into(),
        None => config.output.parse_format().0,
    }
}

fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        match issue.severity {
            Severity::Error => eprintln!("{}", issue),
            Severity::Warning => warn!("{}", issue.message),
        }
    }
}

fn build_use_case(
    params: CouncilParams,
    config: &FileConfig,
    metrics: Arc<InMemoryMetrics>,
    broadcaster: Arc<dyn Broadcaster>,
) -> Result<RunCouncilUseCase> {
    let mut use_case = RunCouncilUseCase::new(params)
        .with_metrics(metrics)
        .with_broadcaster(broadcaster);

    if let Some(dir) = &config.output.results_dir {
        let sink = JsonlPersistenceSink::new(dir)
            .with_context(|| format!("Cannot use results directory {}", dir.display()))?;
        use_case = use_case.with_persistence(Arc::new(sink));
        if config.output.export_snapshot {
            use_case = use_case.with_export(Arc::new(JsonSnapshotExporter::new(dir)));
        }
    } else if config.output.export_snapshot {
        warn!("output.export_snapshot is set but output.results_dir is not; skipping export");
    }

    Ok(use_case)
}
