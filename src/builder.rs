//! Graph builder (§4.C): instantiates unique-signature nodes per window and
//! appends each individual's traversal in window order.

use crate::config::Config;
use crate::error::Result;
use crate::graph::GraphGenome;
use crate::node::{NodeId, Strand};
use crate::signature::{num_windows, signature};
use rayon::prelude::*;
use rustc_hash::FxHashMap;

/// Summary of one `build_graph` call, for CLI diagnostics and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildReport {
    pub windows: usize,
    pub individuals: usize,
    pub nodes_created: usize,
}

/// Builds zoom 0 of `graph` from an individual-major allele matrix (§4.C).
///
/// `individual_major[i]` is individual `i`'s full allele sequence; individual
/// `i` becomes path accession `i.to_string()`, which doubles as its specimen
/// id everywhere downstream (§9 Design Notes: specimens are dense integer
/// indices).
pub fn build_graph(graph: &mut GraphGenome, individual_major: &[Vec<i64>], config: &Config) -> Result<BuildReport> {
    let individuals = individual_major.len();
    let locus_len = individual_major.first().map_or(0, |v| v.len());
    let windows = num_windows(locus_len, config.block_size);

    // Precompute every individual's signature at every window in parallel;
    // the per-window node-creation pass below stays strictly sequential so
    // that "insertion index within the window" is deterministic (§4.C.2).
    let window_signatures: Vec<Vec<Vec<i64>>> = (0..windows)
        .into_par_iter()
        .map(|w| {
            individual_major
                .iter()
                .map(|indiv| signature(indiv, w, config.block_size).to_vec())
                .collect()
        })
        .collect();

    let mut path_ids = Vec::with_capacity(individuals);
    for i in 0..individuals {
        path_ids.push(graph.create_path(&i.to_string(), 0)?);
    }

    let mut lanes: Vec<Vec<NodeId>> = vec![Vec::with_capacity(windows); individuals];
    let mut nodes_created = 0usize;

    for (w, sigs) in window_signatures.iter().enumerate() {
        let mut seen: FxHashMap<&Vec<i64>, NodeId> = FxHashMap::default();
        for (i, sig) in sigs.iter().enumerate() {
            let node_id = match seen.get(sig) {
                Some(&id) => id,
                None => {
                    let k = seen.len();
                    let name = format!("{k}:{w}-{w}");
                    let seq = concat_tokens(sig);
                    let id = graph.add_node(0, &name, Some(seq))?;
                    nodes_created += 1;
                    seen.insert(sig, id);
                    id
                }
            };
            lanes[i].push(node_id);
            graph.append_traversal(path_ids[i], node_id, Strand::Plus)?;
        }
    }

    populate_transitions(graph, &lanes);

    Ok(BuildReport {
        windows,
        individuals,
        nodes_created,
    })
}

/// Concatenates a signature's integer tokens into the node's sequence string,
/// e.g. `[1,0,0,2]` -> `"1002"` (§4.C.2).
fn concat_tokens(sig: &[i64]) -> String {
    let mut buf = itoa::Buffer::new();
    let mut out = String::with_capacity(sig.len());
    for &tok in sig {
        out.push_str(buf.format(tok));
    }
    out
}

/// Populates `specimens`/`upstream`/`downstream` from each individual's
/// ordered node list (§4.C.3). Boundary transitions are routed through
/// `NOTHING` immediately, so the deficit absorption required by I2 holds
/// without a separate recompute pass (see DESIGN.md for why this departs
/// from the commented-out `NOTHING` bookkeeping in the original source).
pub fn populate_transitions(graph: &mut GraphGenome, lanes: &[Vec<NodeId>]) {
    for (i, lane) in lanes.iter().enumerate() {
        let specimen = i as u32;
        let w = lane.len();
        for x in 0..w {
            let node_id = lane[x];
            graph.node_mut(node_id).specimens.insert(specimen);

            let down_key = if x + 1 < w { lane[x + 1] } else { NodeId::NOTHING };
            *graph.node_mut(node_id).downstream.entry(down_key).or_insert(0) += 1;

            let up_key = if x > 0 { lane[x - 1] } else { NodeId::NOTHING };
            *graph.node_mut(node_id).upstream.entry(up_key).or_insert(0) += 1;
        }
    }
}
