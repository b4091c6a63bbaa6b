//! `pangraph`: thin CLI wiring around `pangraph_core`.
//!
//! Usage: pangraph summarize --input alleles.txt --output out.gfa

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use pangraph_core::config::Config;
use pangraph_core::graph::GraphGenome;
use pangraph_core::simplify::Simplifier;
use pangraph_core::{allele, builder, gfa, zoom};

#[derive(Parser)]
#[command(name = "pangraph")]
#[command(author = "Manish Kumar Bobbili")]
#[command(version)]
#[command(about = "Pangenome graph summarization: build, simplify, and zoom out", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a graph from an allele matrix, simplify it, and emit GFA
    Summarize {
        /// Input allele matrix (whitespace-separated integers, one line per locus)
        #[arg(short, long)]
        input: PathBuf,

        /// Output GFA file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Signature window width
        #[arg(long, default_value_t = 20)]
        block_size: usize,

        /// Minimum specimen support retained by the simplifier
        #[arg(long, default_value_t = 4)]
        filter_threshold: usize,

        /// Number of zoom-out steps to advance after simplification
        #[arg(long, default_value_t = 0)]
        zoom_steps: u32,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Summarize {
            input,
            output,
            block_size,
            filter_threshold,
            zoom_steps,
        } => {
            let config = Config::new(block_size, filter_threshold)?;
            let (_, individual_major) = allele::load_matrix(&input)?;

            let mut graph = GraphGenome::new(input.to_string_lossy());
            let build_report = builder::build_graph(&mut graph, &individual_major, &config)?;
            eprintln!(
                "built {} nodes across {} windows for {} individuals",
                build_report.nodes_created, build_report.windows, build_report.individuals
            );

            let mut zoom_level = 0u32;
            let simplify_report = Simplifier::run(&mut graph, zoom_level, &config)?;
            eprintln!(
                "simplified: {} passes, {} merges, {} neglected, {} splits",
                simplify_report.passes, simplify_report.merges, simplify_report.neglected, simplify_report.splits
            );

            for _ in 0..zoom_steps {
                let report = zoom::advance_zoom(&mut graph, zoom_level)?;
                zoom_level += 1;
                eprintln!(
                    "advanced to zoom {zoom_level}: {} slices, {} nodes, {} paths",
                    report.slices, report.nodes_created, report.paths_created
                );
                Simplifier::run(&mut graph, zoom_level, &config)?;
            }

            match output {
                Some(path) => {
                    let mut file = std::fs::File::create(path)?;
                    gfa::write_graph(&graph, zoom_level, &mut file)?;
                }
                None => {
                    let stdout = std::io::stdout();
                    let mut handle = stdout.lock();
                    gfa::write_graph(&graph, zoom_level, &mut handle)?;
                }
            }
            Ok(())
        }
    }
}
