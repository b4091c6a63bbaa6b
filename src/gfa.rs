//! GFA text adapter (§6): the external-graph-format subset the core itself
//! writes and can reload, scoped away from full GFA2/rGFA and the external
//! `xg` conversion tool (§1 Non-goals).

use crate::error::GraphError;
use crate::graph::GraphGenome;
use crate::node::Strand;
use std::io::{self, BufRead, BufReader, Read, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GfaError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}: path references unknown node '{name}'")]
    UnknownNode { line: usize, name: String },

    #[error("line {line}: malformed GFA line: {message}")]
    Malformed { line: usize, message: String },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type Result<T> = std::result::Result<T, GfaError>;

/// Writes zoom `zoom` of `graph`: one `S` line per node, one `P` line per
/// path. Matches `Node.to_gfa`/`Path.to_gfa` in the original source
/// byte-for-byte: comma-joined steps, `*` placeholder per step.
pub fn write_graph(graph: &GraphGenome, zoom: u32, out: &mut impl Write) -> io::Result<()> {
    for &id in &graph.zoom_level(zoom).node_ids {
        let node = graph.node(id);
        writeln!(out, "S\t{}\t{}", node.name, node.seq.as_deref().unwrap_or(""))?;
    }
    for &pid in &graph.zoom_level(zoom).path_ids {
        let path = graph.path(pid);
        let steps: Vec<String> = path
            .traversals
            .iter()
            .map(|t| format!("{}{}", graph.node(t.node).name, t.strand))
            .collect();
        let placeholders = vec!["*"; path.traversals.len()].join(",");
        writeln!(out, "P\t{}\t{}\t{}", path.accession, steps.join(","), placeholders)?;
    }
    Ok(())
}

/// Parses the subset of GFA emitted by [`write_graph`] and replays it
/// through the §4.A operations, creating a fresh graph named `graph_name` at
/// zoom 0.
pub fn read_graph(graph_name: &str, source: &mut impl Read) -> Result<GraphGenome> {
    let mut graph = GraphGenome::new(graph_name);
    let reader = BufReader::new(source);

    for (idx, raw) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw?;
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        match fields.next() {
            Some("S") => {
                let name = fields.next().ok_or_else(|| GfaError::Malformed {
                    line: line_no,
                    message: "missing segment name".to_string(),
                })?;
                let seq = fields.next().unwrap_or("");
                let seq = if seq.is_empty() { None } else { Some(seq.to_string()) };
                graph.add_node(0, name, seq)?;
            }
            Some("P") => {
                let accession = fields.next().ok_or_else(|| GfaError::Malformed {
                    line: line_no,
                    message: "missing path accession".to_string(),
                })?;
                let steps = fields.next().ok_or_else(|| GfaError::Malformed {
                    line: line_no,
                    message: "missing path steps".to_string(),
                })?;
                let path_id = graph.create_path(accession, 0)?;
                if !steps.is_empty() {
                    for step in steps.split(',') {
                        let (name, strand_char) = step.split_at(step.len() - 1);
                        let strand = Strand::from_char(
                            strand_char.chars().next().ok_or_else(|| GfaError::Malformed {
                                line: line_no,
                                message: format!("malformed step '{step}'"),
                            })?,
                        )
                        .ok_or_else(|| GfaError::Malformed {
                            line: line_no,
                            message: format!("unknown strand in step '{step}'"),
                        })?;
                        let node_id = graph.get_node(name).map_err(|_| GfaError::UnknownNode {
                            line: line_no,
                            name: name.to_string(),
                        })?;
                        graph.append_traversal(path_id, node_id, strand)?;
                    }
                }
            }
            _ => {
                return Err(GfaError::Malformed {
                    line: line_no,
                    message: format!("unrecognized record: {line}"),
                })
            }
        }
    }

    Ok(graph)
}
