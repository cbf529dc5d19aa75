use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use shadegraph::{compiler, dsl};

#[derive(Debug, Default, Clone)]
struct Cli {
    graph_json: Option<PathBuf>,
    node: Option<String>,
    output: Option<PathBuf>,
}

fn parse_cli(args: &[String]) -> Result<Cli> {
    let mut cli = Cli::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--graph-json" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --graph-json"));
                };
                cli.graph_json = Some(PathBuf::from(v));
                i += 2;
            }
            "--node" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --node"));
                };
                cli.node = Some(v.clone());
                i += 2;
            }
            "--output" => {
                let Some(v) = args.get(i + 1) else {
                    return Err(anyhow!("missing value for --output"));
                };
                cli.output = Some(PathBuf::from(v));
                i += 2;
            }
            other => {
                return Err(anyhow!(
                    "unknown argument: {other} (supported: --graph-json <graph.json>, --node <id>, --output <file.frag>)"
                ));
            }
        }
    }
    Ok(cli)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = parse_cli(&args)?;

    let graph = match &cli.graph_json {
        Some(path) => dsl::load_graph_from_path(path)?,
        None => dsl::load_graph_from_default_asset()?,
    };

    let bundle = match &cli.node {
        Some(id) => compiler::compile_node(&graph, id)?,
        None => compiler::compile_graph(&graph)?,
    };

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &bundle.fragment)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote fragment shader");
        }
        None => print!("{}", bundle.fragment),
    }
    Ok(())
}
