//! Zoom layer (§4.F): produce zoom N+1 from zoom N's converged paths.

use crate::builder::populate_transitions;
use crate::dagify::{generate_profiles_with_minimizing_replications, to_slices, Slice};
use crate::error::Result;
use crate::graph::GraphGenome;
use crate::node::{NodeId, Strand};

/// Outcome of one `advance_zoom` call, for CLI diagnostics and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoomReport {
    pub slices: usize,
    pub nodes_created: usize,
    pub paths_created: usize,
}

fn slice_sequence(slice: &Slice) -> Option<String> {
    let mut out = String::new();
    for member in slice {
        if let Some(s) = &member.seq {
            out.push_str(s);
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

/// Materializes zoom `zoom + 1` from zoom `zoom`'s (simplifier-converged)
/// paths. DAGify reconciles them into one profile; `to_slices` reduces that
/// profile into disjoint groups; each group becomes one fresh node traversed
/// by every path that reaches it (§4.F's wiring decision, resolved as an
/// Open Question in DESIGN.md).
///
/// Adjacency at the new level is (re)established the same way the builder
/// establishes it at zoom 0 (`populate_transitions`, C.3): a node born at
/// this zoom has no remembered neighbor keys yet, so the 4.D.4 recompute
/// routine — which only refreshes counts for keys already present — has
/// nothing to bootstrap from.
pub fn advance_zoom(graph: &mut GraphGenome, zoom: u32) -> Result<ZoomReport> {
    let path_ids = graph.zoom_level(zoom).path_ids.clone();
    let accessions: Vec<String> = path_ids.iter().map(|&pid| graph.path(pid).accession.clone()).collect();
    let node_seqs: Vec<Vec<NodeId>> = path_ids
        .iter()
        .map(|&pid| graph.path(pid).traversals.iter().map(|t| t.node).collect())
        .collect();

    let (_, profile) = generate_profiles_with_minimizing_replications(&node_seqs);
    let slices = to_slices(&profile, graph);
    let next_zoom = zoom + 1;

    let mut slice_node_ids = Vec::with_capacity(slices.len());
    for (idx, slice) in slices.iter().enumerate() {
        let name = format!("z{next_zoom}:{idx}");
        let seq = slice_sequence(slice);
        let new_id = graph.add_node(next_zoom, &name, seq)?;
        if let [single] = slice.as_slice() {
            if let Some(parent) = single.node {
                graph.set_node_summary(new_id, parent);
            }
        }
        slice_node_ids.push(new_id);
    }

    let mut new_path_ids = Vec::with_capacity(path_ids.len());
    for (p_idx, (accession, &old_path)) in accessions.iter().zip(path_ids.iter()).enumerate() {
        let new_path = graph.create_path(accession, next_zoom)?;
        graph.set_path_summary(new_path, old_path);
        for (slice_idx, slice) in slices.iter().enumerate() {
            if slice.iter().any(|n| n.paths.contains(&p_idx)) {
                graph.append_traversal(new_path, slice_node_ids[slice_idx], Strand::Plus)?;
            }
        }
        new_path_ids.push(new_path);
    }

    let lanes: Vec<Vec<NodeId>> = new_path_ids
        .iter()
        .map(|&pid| graph.path(pid).traversals.iter().map(|t| t.node).collect())
        .collect();
    populate_transitions(graph, &lanes);

    Ok(ZoomReport {
        slices: slices.len(),
        nodes_created: slice_node_ids.len(),
        paths_created: new_path_ids.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::config::Config;
    use crate::simplify::simple_merge;

    #[test]
    fn advancing_zoom_after_merge_preserves_coverage() {
        let pattern: Vec<i64> = (0..60).map(|x| x % 3).collect();
        let matrix = vec![pattern.clone(), pattern];
        let mut g = GraphGenome::new("g");
        build_graph(&mut g, &matrix, &Config::default()).unwrap();
        simple_merge(&mut g, 0).unwrap();
        assert_eq!(g.zoom_level(0).node_ids.len(), 1);
        let merged = g.zoom_level(0).node_ids[0];

        let report = advance_zoom(&mut g, 0).unwrap();
        assert_eq!(report.slices, 1);
        assert_eq!(g.zoom_level(1).node_ids.len(), 1);
        assert_eq!(g.zoom_level(1).path_ids.len(), 2);

        let new_node = g.zoom_level(1).node_ids[0];
        assert_eq!(g.node(new_node).summarized_by, Some(merged));
        assert_eq!(g.node(new_node).specimens.len(), 2);
        assert_eq!(g.node(new_node).upstream.get(&NodeId::NOTHING), Some(&2));
        assert_eq!(g.node(new_node).downstream.get(&NodeId::NOTHING), Some(&2));
        g.validate(1).unwrap();

        for &pid in &g.zoom_level(1).path_ids.clone() {
            assert_eq!(g.path(pid).traversals.len(), 1);
            assert_eq!(g.path(pid).traversals[0].node, new_node);
        }
    }
}
