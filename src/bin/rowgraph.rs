use std::process;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rowgraph::{
    BuildConfig, GraphBuilder, GraphExport, PayloadFormat, PayloadPolicy, RowGraph,
    SqliteRowAccessor, TraversalOrder, fixture, structural_signature,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Signature,
}

/// Print every row a seed row transitively relates to through foreign keys.
#[derive(Debug, Parser)]
#[command(name = "rowgraph", version)]
struct Cli {
    /// SQLite database path, or `memory` for the built-in demo dataset
    #[arg(long = "db", visible_alias = "database", default_value = "memory")]
    db: String,
    /// Table of the seed row
    #[arg(long, default_value = fixture::DEMO_TABLE)]
    table: String,
    /// Primary key of the seed row
    #[arg(long, default_value = "1")]
    key: String,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// dfs or bfs
    #[arg(long, default_value = "dfs")]
    order: TraversalOrder,
    /// Which row snapshot to keep when a row is reached twice: first or last
    #[arg(long, default_value = "first")]
    payload: PayloadPolicy,
    #[arg(long, default_value_t = 25)]
    max_row_length: usize,
    #[arg(long, default_value_t = 7)]
    max_rows: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "warn"))
        .init();
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let accessor = open_accessor(&cli.db)?;
    let config = BuildConfig::default()
        .with_order(cli.order)
        .with_payload_policy(cli.payload);
    let key = accessor.parse_key(&cli.table, &cli.key)?;
    let graph = GraphBuilder::with_config(&accessor, config)
        .build(&cli.table, &key)
        .with_context(|| format!("building graph for {}.{}", cli.table, cli.key))?;

    let format = PayloadFormat {
        max_row_length: cli.max_row_length,
        max_rows: cli.max_rows,
        ..PayloadFormat::default()
    };
    match cli.format {
        OutputFormat::Text => print_text(&graph, &format),
        OutputFormat::Json => {
            println!("{}", GraphExport::from_graph(&graph, &format).to_json_pretty()?)
        }
        OutputFormat::Signature => println!("{}", structural_signature(&graph)),
    }
    Ok(())
}

fn open_accessor(db: &str) -> Result<SqliteRowAccessor> {
    if db == "memory" {
        return fixture::demo_accessor().context("seeding demo dataset");
    }
    SqliteRowAccessor::open(db).with_context(|| format!("opening {db}"))
}

fn print_text(graph: &RowGraph, format: &PayloadFormat) {
    let indented = PayloadFormat {
        line_separator: "\n  ".to_string(),
        ..format.clone()
    };
    println!(
        "seed {} ({} nodes, {} edges)",
        graph.seed(),
        graph.node_count(),
        graph.edge_count()
    );
    for node in graph.nodes() {
        println!("{node}");
        println!("  {}", graph.describe(node, &indented));
    }
    println!("edges");
    for edge in graph.edges() {
        let (a, b) = edge.endpoints();
        println!("{a} -- {b}");
    }
}
