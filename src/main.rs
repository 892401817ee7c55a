mod scan;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use dart_lsp::DartLanguageService;
use project_graph::{AnalysisRequest, LanguageService, SnapshotService, analyze_project, config};
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Build an architecture graph of a Dart/Flutter project.
#[derive(Debug, Parser)]
#[command(name = "archgraph", version)]
struct Cli {
    /// Project root (the directory holding `pubspec.yaml`).
    project: PathBuf,

    /// Output file; defaults to `<project>/graphs_data/<timestamp>/graph.json`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Recorded symbol snapshot to use instead of a live language server.
    #[arg(long)]
    symbols: Option<PathBuf>,

    /// Path to the `dart` executable.
    #[arg(long)]
    dart: Option<PathBuf>,

    /// Write compact JSON.
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,project_graph=info,dart_lsp=info"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let root = dunce::canonicalize(&cli.project)
        .with_context(|| format!("project root {}", cli.project.display()))?;
    let cfg = config::load(&root)?;

    let paths = scan::scan_dart_files(&root, &cfg.filters.ignore_globs)?;
    let files = scan::load_sources(&paths)?;

    let service: Box<dyn LanguageService> = match &cli.symbols {
        Some(path) => Box::new(SnapshotService::from_path(path)?),
        None => Box::new(DartLanguageService::start(&root, cli.dart.as_deref())?),
    };

    let request = AnalysisRequest {
        project_root: Some(root.clone()),
        files,
    };
    let output = analyze_project(request, service.as_ref(), cfg).await?;

    let out_path = match cli.out {
        Some(p) => p,
        None => {
            let timestamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
            root.join("graphs_data").join(timestamp).join("graph.json")
        }
    };
    if let Some(dir) = out_path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let json = if cli.compact {
        serde_json::to_vec(&output)?
    } else {
        serde_json::to_vec_pretty(&output)?
    };
    fs::write(&out_path, json).with_context(|| format!("writing {}", out_path.display()))?;

    info!(
        out = %out_path.display(),
        nodes = output.graph.nodes.len(),
        edges = output.graph.edges.len(),
        clean = output.report.is_clean(),
        "Graph written"
    );
    Ok(())
}
