use anyhow::{Context, Result};
use bundlescope::config::GraphConfig;
use bundlescope::export::{self, ExportFormat};
use bundlescope::graph::{BuildGraph, GraphBuilder};
use bundlescope::logger::init_logger;
use bundlescope::stats::{format_size, BuildRows, StatsReport};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bundlescope")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Relationship graph engine for bundler build reports", long_about = None)]
struct Cli {
    /// Config file (defaults to ./bundlescope.config.json when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct InputArgs {
    /// Row dump with modules, chunks, namedChunkGroups and assets
    #[arg(long, conflicts_with = "stats", required_unless_present = "stats")]
    rows: Option<PathBuf>,

    /// webpack stats.json report
    #[arg(long)]
    stats: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the graph and write a report
    Graph {
        #[command(flatten)]
        input: InputArgs,

        /// Output format: json, csv or markdown
        #[arg(short, long, default_value = "markdown")]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List modules carried by more than one chunk
    Duplicates {
        #[command(flatten)]
        input: InputArgs,

        /// Number of modules to list
        #[arg(short = 'n', long, default_value_t = 20)]
        top: usize,
    },
    /// Show how a module is reached from an entry point
    Path {
        #[command(flatten)]
        input: InputArgs,

        /// Module identifier
        identifier: String,
    },
    /// Show version information
    Version,
}

fn load_graph(input: &InputArgs, config: &GraphConfig) -> Result<BuildGraph> {
    let rows = match (&input.rows, &input.stats) {
        (Some(path), _) => BuildRows::from_file(path)
            .with_context(|| format!("Failed to read rows from {}", path.display()))?,
        (None, Some(path)) => {
            let report = StatsReport::from_file(path)
                .with_context(|| format!("Failed to read stats from {}", path.display()))?;
            BuildRows::from_stats(&report, 1)
        }
        (None, None) => anyhow::bail!("Either --rows or --stats is required"),
    };

    tracing::info!(entities = rows.len(), "building graph");
    let graph = GraphBuilder::from_config(config)
        .build(&rows)
        .context("Failed to build the graph")?;
    Ok(graph)
}

fn write_report(graph: &BuildGraph, format: ExportFormat, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            export::export(format, graph, &mut writer)?;
            writer.flush()?;
            eprintln!("Wrote {} report to {}", format, path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            export::export(format, graph, &mut writer)?;
        }
    }
    Ok(())
}

fn print_duplicates(graph: &BuildGraph, top: usize) {
    let duplicated = graph.duplicated_modules();
    if duplicated.is_empty() {
        println!("No duplicated modules");
        return;
    }

    for entry in duplicated.iter().take(top) {
        let name = graph
            .module(entry.module_id)
            .map(|m| m.display_name())
            .unwrap_or_default();
        println!(
            "{:>10}  {} x{}",
            format_size(entry.extra_size),
            name,
            entry.chunk_ids.len()
        );
    }
    println!(
        "\n{} duplicated modules, {} total",
        duplicated.len(),
        format_size(graph.duplication_cost())
    );
}

fn print_path(graph: &BuildGraph, identifier: &str) -> Result<()> {
    let module = graph
        .module_by_identifier(identifier)
        .with_context(|| format!("No module with identifier '{}'", identifier))?;

    if module.path_from_entry.is_empty() {
        println!("{} is not reachable from any entry point", module.display_name());
        return Ok(());
    }

    for (depth, id) in module.path_from_entry.iter().enumerate() {
        let name = graph.module(*id).map(|m| m.display_name()).unwrap_or_default();
        println!("{}{}", "  ".repeat(depth), name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.quiet, cli.no_color);

    let config = GraphConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    match &cli.command {
        Some(Commands::Graph {
            input,
            format,
            output,
        }) => {
            let graph = load_graph(input, &config)?;
            write_report(&graph, *format, output.as_ref())?;
        }
        Some(Commands::Duplicates { input, top }) => {
            let graph = load_graph(input, &config)?;
            print_duplicates(&graph, *top);
        }
        Some(Commands::Path { input, identifier }) => {
            let graph = load_graph(input, &config)?;
            print_path(&graph, identifier)?;
        }
        Some(Commands::Version) => {
            println!("bundlescope v{}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("bundlescope - build report graph engine");
            println!("Run 'bundlescope graph --stats stats.json' to build a report");
            println!("Run 'bundlescope --help' for more information");
        }
    }

    Ok(())
}
