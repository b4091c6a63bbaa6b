//! Pangenome graph summarization core.
//!
//! Ingests individuals encoded as allele signatures, builds a node-per-
//! signature graph (B, C), simplifies it to a fixed point (D), and produces
//! zoomed-out summaries via DAGify path reconciliation (E, F).
//!
//! ```rust,no_run
//! use pangraph_core::{allele, builder, config::Config, graph::GraphGenome, simplify::Simplifier, zoom};
//!
//! let (_, individual_major) = allele::load_matrix("alleles.txt").unwrap();
//! let config = Config::default();
//! let mut graph = GraphGenome::new("demo");
//! builder::build_graph(&mut graph, &individual_major, &config).unwrap();
//! Simplifier::run(&mut graph, 0, &config).unwrap();
//! zoom::advance_zoom(&mut graph, 0).unwrap();
//! ```

pub mod allele;
pub mod builder;
pub mod config;
pub mod dagify;
pub mod error;
pub mod gfa;
pub mod graph;
pub mod node;
pub mod path;
pub mod signature;
pub mod simplify;
pub mod zoom;

pub use config::Config;
pub use error::{GraphError, Result};
pub use graph::GraphGenome;
pub use node::{Node, NodeId, Strand};
pub use path::{NodeTraversal, Path, PathId};
pub use simplify::{SimplifyReport, Simplifier};
