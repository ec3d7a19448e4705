use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use subgraph_select::config::{Config, DEFAULT_CONFIG_PATH};
use subgraph_select::domain::{GraphModel, InstanceData, VIRTUAL_SOURCE};
use subgraph_select::io::{
    read_coordinates, read_graph, read_instance, read_weights, Coordinates, VertexWeights,
};
use subgraph_select::optimizer::GoodLpBackend;
use subgraph_select::report::RunSummary;
use subgraph_select::selection::{SelectionOutcome, SubgraphSelector};
use subgraph_select::telemetry::init_tracing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Select a connected, budget-feasible vertex set of maximum utility
#[derive(Debug, Parser)]
#[command(name = "subgraph-select", version, about)]
struct Cli {
    /// Arc list, one `x,y` pair per line
    #[arg(long, conflicts_with = "instance", required_unless_present = "instance")]
    graph: Option<PathBuf>,

    /// JSON instance with `n`, `E`, `cost`, `utility`, `T` and `C`
    #[arg(long)]
    instance: Option<PathBuf>,

    /// Per-vertex weights, a header line then `v,cost,utility` lines
    #[arg(long, requires = "graph")]
    weights: Option<PathBuf>,

    /// Vertex layout, a header line then `v,x,y` lines
    #[arg(long)]
    coordinates: Option<PathBuf>,

    /// Number of vertices, for graphs with isolated vertices
    #[arg(long, requires = "graph")]
    vertices: Option<usize>,

    /// Terminal vertices; the first one is the flow root
    #[arg(long, value_delimiter = ',')]
    terminals: Vec<usize>,

    /// Cost budget
    #[arg(long)]
    budget: Option<f64>,

    /// Seconds before the solve is abandoned
    #[arg(long)]
    time_limit: Option<f64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write the built model in CPLEX LP format before solving
    #[arg(long)]
    write_lp: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Skip the reachability check on the returned selection
    #[arg(long)]
    no_connectivity_check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let cfg = match Config::load_from(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            return ExitCode::from(1);
        }
    };
    init_tracing(&cfg.logging);

    match run(&cli, cfg).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %format!("{err:#}"), "run failed");
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli, mut cfg: Config) -> Result<ExitCode> {
    if let Some(seconds) = cli.time_limit {
        cfg.solver.time_limit_seconds = Some(seconds);
    }
    if cli.no_connectivity_check {
        cfg.solver.verify_connectivity = false;
    }

    let Inputs { data, coordinates } = load_inputs(cli, &cfg)?;
    let graph = GraphModel::from_instance(&data).context("malformed instance")?;
    info!(
        vertices = graph.n(),
        arcs = graph.arcs().len(),
        budget = graph.budget(),
        "instance loaded"
    );

    let selector = SubgraphSelector::new(Box::new(GoodLpBackend::new()), cfg.selector_options());

    if let Some(path) = &cli.write_lp {
        let model = selector.build_model(&graph);
        std::fs::write(path, model.program().to_string())
            .with_context(|| format!("cannot write LP file {}", path.display()))?;
        info!(path = %path.display(), "model written");
    }

    let outcome = selector.select(&graph).await?;

    let summary = RunSummary::from_outcome(&outcome, coordinates.as_ref());
    match cli.format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }

    Ok(exit_code(&outcome))
}

/// Everything read from disk, validated before any solve starts
struct Inputs {
    data: InstanceData,
    coordinates: Option<Coordinates>,
}

fn load_inputs(cli: &Cli, cfg: &Config) -> Result<Inputs> {
    let data = load_instance(cli, cfg)?;
    let coordinates = cli.coordinates.as_deref().map(read_coordinates).transpose()?;
    Ok(Inputs { data, coordinates })
}

fn load_instance(cli: &Cli, cfg: &Config) -> Result<InstanceData> {
    if let Some(path) = &cli.instance {
        let mut data = read_instance(path)?;
        if !cli.terminals.is_empty() {
            retarget(&mut data, cli.terminals.clone());
        }
        if let Some(budget) = cli.budget {
            data.budget = budget;
        }
        return Ok(data);
    }

    let graph_path = cli
        .graph
        .as_deref()
        .context("either --graph or --instance is required")?;
    let budget = cli.budget.context("--budget is required with --graph")?;
    let edge_list = read_graph(graph_path)?;
    let weights = cli
        .weights
        .as_deref()
        .map(read_weights)
        .transpose()?
        .unwrap_or_default();

    let n = cli.vertices.unwrap_or_else(|| implied_vertex_count(edge_list.n, &weights));
    let (cost, utility) = weights.resolve(n, cfg.input.default_cost, cfg.input.default_utility);
    Ok(InstanceData::from_edges(
        n,
        edge_list.edges,
        cost,
        utility,
        cli.terminals.clone(),
        budget,
    ))
}

fn implied_vertex_count(from_edges: usize, weights: &VertexWeights) -> usize {
    let from_weights = weights
        .cost
        .keys()
        .chain(weights.utility.keys())
        .copied()
        .max()
        .unwrap_or(0);
    from_edges.max(from_weights)
}

/// Replace the terminals of a loaded instance, moving the source arc to the new root
fn retarget(data: &mut InstanceData, terminals: Vec<usize>) {
    data.arcs.retain(|&(tail, _)| tail != VIRTUAL_SOURCE);
    if let Some(&root) = terminals.first() {
        data.arcs.push((VIRTUAL_SOURCE, root));
    }
    data.terminals = terminals;
}

fn exit_code(outcome: &SelectionOutcome) -> ExitCode {
    match outcome {
        SelectionOutcome::Selected(_) => ExitCode::SUCCESS,
        SelectionOutcome::Infeasible(_) => ExitCode::from(2),
        SelectionOutcome::Unbounded => ExitCode::from(3),
        SelectionOutcome::TimedOut(_) => ExitCode::from(4),
    }
}
