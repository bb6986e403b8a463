//! Process bootstrap: flag parsing, environment/config loading, sink and
//! parser construction, and orderly shutdown on Ctrl-C.
//!
//! This binary is not the Control Surface (§1) — it has no HTTP listener.
//! It demonstrates the engine's public API, the same API an HTTP façade
//! would call. Grounded in shape on the pack's CLI bootstrap convention
//! (flag parse -> init tracing -> load config -> construct -> run ->
//! handle errors at the top), rewritten cleanly rather than copied.

mod demo_parser;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use syncgraph_core::traits::GraphSink;
use syncgraph_core::EngineConfig;
use syncgraph_engine::SyncEngine;
use syncgraph_storage::{InMemoryGraphSink, NullGraphSink};
use tracing_subscriber::EnvFilter;

use demo_parser::DemoSourceParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SinkKind {
    Memory,
    Null,
}

#[derive(Debug, Parser)]
#[command(name = "syncgraph", about = "Continuous synchronization engine")]
struct Cli {
    /// Root of the working copy to watch.
    root: PathBuf,

    /// Optional TOML config file layered under the flags below.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    batching: bool,

    #[arg(long)]
    batch_size: Option<usize>,

    #[arg(long)]
    batch_flush_secs: Option<u64>,

    #[arg(long)]
    diff: bool,

    #[arg(long)]
    revision_control: bool,

    #[arg(long)]
    embeddings: bool,

    #[arg(long, value_enum, default_value_t = SinkKind::Memory)]
    sink: SinkKind,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "syncgraph exited with an error");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
    std::process::exit(0);
}

fn run(cli: Cli) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if !cli.root.exists() {
        anyhow::bail!("root path {} does not exist", cli.root.display());
    }

    let mut config = load_config_file(cli.config.as_deref())?;
    config.root = Some(cli.root.clone());
    if cli.batching {
        config.enable_batching = Some(true);
    }
    if let Some(size) = cli.batch_size {
        config.batch_size = Some(size);
    }
    if let Some(secs) = cli.batch_flush_secs {
        config.batch_flush_interval_secs = Some(secs);
    }
    if cli.diff {
        config.enable_diff = Some(true);
    }
    if cli.revision_control {
        config.enable_revision_control = Some(true);
    }
    if cli.embeddings {
        config.enable_embeddings = Some(true);
    }

    let sink: Arc<dyn GraphSink> = match cli.sink {
        SinkKind::Memory => Arc::new(InMemoryGraphSink::new()),
        SinkKind::Null => Arc::new(NullGraphSink),
    };
    let parser = Arc::new(DemoSourceParser::new());

    let engine = SyncEngine::new(config, parser, sink);
    engine.start().context("engine failed to start")?;
    tracing::info!(root = %cli.root.display(), "syncgraph started");

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("failed to install Ctrl-C handler")?;
    }

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(200));
    }

    tracing::info!("shutting down");
    engine.stop().context("shutdown failed")?;
    Ok(())
}

fn load_config_file(path: Option<&std::path::Path>) -> anyhow::Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse config file {}", path.display()))
}
