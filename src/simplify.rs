//! Simplifier (§4.D): `simple_merge`, `neglect_nodes`, `split_groups`, and the
//! outer fixed-point driver.

use crate::error::{GraphError, Result};
use crate::graph::GraphGenome;
use crate::node::NodeId;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Upstream,
    Downstream,
}

/// Outcome of one `Simplifier::run` call, for CLI diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplifyReport {
    pub passes: usize,
    pub merges: usize,
    pub neglected: usize,
    pub splits: usize,
}

pub struct Simplifier;

impl Simplifier {
    /// Runs `simple_merge`, `neglect_nodes`, `split_groups` until a fixed
    /// point: no change in node count and no split produced (§4.D, §5).
    pub fn run(graph: &mut GraphGenome, zoom: u32, config: &crate::config::Config) -> Result<SimplifyReport> {
        let mut report = SimplifyReport::default();
        loop {
            report.passes += 1;
            let before = graph.zoom_level(zoom).node_ids.len();

            let merges = simple_merge(graph, zoom)?;
            let neglected = neglect_nodes(graph, zoom, config.filter_threshold)?;
            let splits = split_groups(graph, zoom)?;
            if splits > 0 {
                neglect_nodes(graph, zoom, 0)?;
            }

            report.merges += merges;
            report.neglected += neglected;
            report.splits += splits;

            let after = graph.zoom_level(zoom).node_ids.len();
            if after == before && splits == 0 {
                break;
            }
        }
        Ok(report)
    }
}

/// §4.D.1: collapse a single-successor `n` into `m` when their specimen
/// coverage is identical.
pub fn simple_merge(graph: &mut GraphGenome, zoom: u32) -> Result<usize> {
    let mut merged = 0usize;
    let mut i = 0usize;
    loop {
        let len = graph.zoom_level(zoom).node_ids.len();
        if i >= len {
            break;
        }
        let n = graph.zoom_level(zoom).node_ids[i];
        let only_successor = {
            let node = graph.node(n);
            (node.downstream.len() == 1)
                .then(|| *node.downstream.keys().next().unwrap())
        };
        if let Some(m) = only_successor {
            if !m.is_nothing() && graph.node(m).specimens.len() == graph.node(n).specimens.len() {
                merge_into(graph, zoom, n, m)?;
                merged += 1;
                continue; // list shrank; rescan this index
            }
        }
        i += 1;
    }
    Ok(merged)
}

fn merge_into(graph: &mut GraphGenome, zoom: u32, n: NodeId, m: NodeId) -> Result<()> {
    let n_upstream: Vec<(NodeId, u64)> = graph.node(n).upstream.iter().map(|(&k, &v)| (k, v)).collect();
    graph.node_mut(m).upstream = n_upstream.iter().copied().collect();
    for &(p, c) in &n_upstream {
        if p.is_nothing() {
            continue;
        }
        graph.node_mut(p).downstream.remove(&n);
        graph.node_mut(p).downstream.insert(m, c);
    }
    remove_from_zoom(graph, zoom, n);
    Ok(())
}

/// §4.D.2: delete every node at or below `threshold` specimens. With
/// `threshold == 0`, neighbors are left untouched (used to garbage-collect
/// the zero-specimen residue `split_groups` leaves behind).
pub fn neglect_nodes(graph: &mut GraphGenome, zoom: u32, threshold: usize) -> Result<usize> {
    let candidates: Vec<NodeId> = graph
        .zoom_level(zoom)
        .node_ids
        .iter()
        .copied()
        .filter(|&id| graph.node(id).specimens.len() <= threshold)
        .collect();
    let adjust_neighbors = threshold > 0;
    for id in &candidates {
        delete_node(graph, zoom, *id, adjust_neighbors);
    }
    Ok(candidates.len())
}

fn delete_node(graph: &mut GraphGenome, zoom: u32, n: NodeId, adjust_neighbors: bool) {
    if adjust_neighbors {
        let ups: Vec<(NodeId, u64)> = graph.node(n).upstream.iter().map(|(&k, &v)| (k, v)).collect();
        for (p, c) in ups {
            if p.is_nothing() {
                continue;
            }
            graph.node_mut(p).downstream.remove(&n);
            *graph.node_mut(p).downstream.entry(NodeId::NOTHING).or_insert(0) += c;
        }
        let downs: Vec<(NodeId, u64)> = graph.node(n).downstream.iter().map(|(&k, &v)| (k, v)).collect();
        for (s, c) in downs {
            if s.is_nothing() {
                continue;
            }
            graph.node_mut(s).upstream.remove(&n);
            *graph.node_mut(s).upstream.entry(NodeId::NOTHING).or_insert(0) += c;
        }
    }
    remove_from_zoom(graph, zoom, n);
}

fn remove_from_zoom(graph: &mut GraphGenome, zoom: u32, id: NodeId) {
    graph.zoom_level_mut(zoom).node_ids.retain(|&x| x != id);
}

/// The specimen set attributed to `neighbor` when evaluating a split
/// candidate: `neighbor.specimens`, or, when `neighbor` is `NOTHING`,
/// `anchor.specimens` minus the union of `anchor`'s other non-`NOTHING`
/// neighbors in that direction (§4.D.3).
fn effective_specimens(graph: &GraphGenome, anchor: NodeId, neighbor: NodeId, direction: Direction) -> FxHashSet<u32> {
    if !neighbor.is_nothing() {
        return graph.node(neighbor).specimens.clone();
    }
    let anchor_node = graph.node(anchor);
    let map = match direction {
        Direction::Upstream => &anchor_node.upstream,
        Direction::Downstream => &anchor_node.downstream,
    };
    let mut union: FxHashSet<u32> = FxHashSet::default();
    for &k in map.keys() {
        if !k.is_nothing() {
            union.extend(graph.node(k).specimens.iter().copied());
        }
    }
    anchor_node.specimens.difference(&union).copied().collect()
}

/// §4.D.3: split every anchor whose upstream/downstream partitions line up.
/// New nodes appended mid-pass are not themselves revisited as anchors (§5).
pub fn split_groups(graph: &mut GraphGenome, zoom: u32) -> Result<usize> {
    let anchors: Vec<NodeId> = graph.zoom_level(zoom).node_ids.clone();
    let mut splits = 0usize;
    for anchor in anchors {
        if graph.node(anchor).specimens.is_empty() {
            continue;
        }
        loop {
            let up_keys: Vec<NodeId> = graph.node(anchor).upstream.keys().copied().collect();
            let down_keys: Vec<NodeId> = graph.node(anchor).downstream.keys().copied().collect();
            let mut found = None;
            'pairs: for &up in &up_keys {
                let set1 = effective_specimens(graph, anchor, up, Direction::Upstream);
                if set1.is_empty() {
                    continue;
                }
                for &down in &down_keys {
                    if up.is_nothing() && down.is_nothing() {
                        // Both ends untracked: the "split" would just clone
                        // the anchor verbatim with no structural change, so
                        // the pass never terminates (§5 exhaustion).
                        continue;
                    }
                    let set2 = effective_specimens(graph, anchor, down, Direction::Downstream);
                    if set1 == set2 {
                        found = Some((up, down));
                        break 'pairs;
                    }
                }
            }
            match found {
                Some((up, down)) => {
                    split_one_group(graph, zoom, up, anchor, down)?;
                    splits += 1;
                }
                None => break,
            }
        }
    }
    Ok(splits)
}

fn split_one_group(graph: &mut GraphGenome, zoom: u32, up: NodeId, anchor: NodeId, down: NodeId) -> Result<NodeId> {
    let new_specimens: FxHashSet<u32> = {
        let eff_up = effective_specimens(graph, anchor, up, Direction::Upstream);
        let eff_down = effective_specimens(graph, anchor, down, Direction::Downstream);
        let anchor_specimens = &graph.node(anchor).specimens;
        eff_up
            .intersection(&eff_down)
            .filter(|s| anchor_specimens.contains(s))
            .copied()
            .collect()
    };

    let new_upstream: FxHashMap<NodeId, u64> = if up.is_nothing() {
        graph.node(anchor).upstream.clone()
    } else {
        graph.node(up).upstream.clone()
    };
    let new_downstream: FxHashMap<NodeId, u64> = if down.is_nothing() {
        graph.node(anchor).downstream.clone()
    } else {
        graph.node(down).downstream.clone()
    };

    let base_name = graph.node(anchor).name.clone();
    let new_name = graph.fresh_split_name(&base_name);
    let new_id = graph.add_node(zoom, &new_name, None)?;
    {
        let node = graph.node_mut(new_id);
        node.specimens = new_specimens.clone();
        node.upstream = new_upstream;
        node.downstream = new_downstream;
    }

    for target in [anchor, up, down] {
        if target.is_nothing() {
            continue;
        }
        let t = graph.node_mut(target);
        for s in &new_specimens {
            t.specimens.remove(s);
        }
    }

    let up_neighbors: Vec<NodeId> = graph.node(new_id).upstream.keys().copied().collect();
    for &k in &up_neighbors {
        if !k.is_nothing() {
            graph.node_mut(k).downstream.insert(new_id, 1);
        }
    }
    let down_neighbors: Vec<NodeId> = graph.node(new_id).downstream.keys().copied().collect();
    for &k in &down_neighbors {
        if !k.is_nothing() {
            graph.node_mut(k).upstream.insert(new_id, 1);
        }
    }

    recompute_transitions(graph, new_id, Direction::Upstream)?;
    recompute_transitions(graph, new_id, Direction::Downstream)?;
    recompute_transitions(graph, up, Direction::Upstream)?;
    recompute_transitions(graph, up, Direction::Downstream)?;
    recompute_transitions(graph, anchor, Direction::Upstream)?;
    recompute_transitions(graph, anchor, Direction::Downstream)?;
    recompute_transitions(graph, down, Direction::Upstream)?;
    recompute_transitions(graph, down, Direction::Downstream)?;
    for &k in up_neighbors.iter().chain(down_neighbors.iter()) {
        recompute_transitions(graph, k, Direction::Upstream)?;
        recompute_transitions(graph, k, Direction::Downstream)?;
    }

    Ok(new_id)
}

/// §4.D.4: rebuild one direction's transition map from the node's current
/// specimen set, routing any deficit to `NOTHING`. Builds into a scratch map
/// and only swaps it in once the non-negativity check passes (§7: no partial
/// commits on an invariant violation).
fn recompute_transitions(graph: &mut GraphGenome, n: NodeId, direction: Direction) -> Result<()> {
    if n.is_nothing() {
        return Ok(());
    }
    let keys: Vec<NodeId> = {
        let map = match direction {
            Direction::Upstream => &graph.node(n).upstream,
            Direction::Downstream => &graph.node(n).downstream,
        };
        map.keys().copied().filter(|k| !k.is_nothing()).collect()
    };
    let specimens_n = graph.node(n).specimens.clone();
    let mut scratch: FxHashMap<NodeId, u64> = FxHashMap::default();
    let mut total: i64 = 0;
    for k in keys {
        let count = graph.node(k).specimens.intersection(&specimens_n).count() as u64;
        if count > 0 {
            scratch.insert(k, count);
            total += count as i64;
        }
    }
    let deficit = specimens_n.len() as i64 - total;
    if deficit < 0 {
        return Err(GraphError::InvariantViolation {
            node: graph.node(n).name.clone(),
            detail: format!("recomputed {direction:?} deficit {deficit} < 0"),
        });
    }
    if deficit > 0 {
        scratch.insert(NodeId::NOTHING, deficit as u64);
    }
    match direction {
        Direction::Upstream => graph.node_mut(n).upstream = scratch,
        Direction::Downstream => graph.node_mut(n).downstream = scratch,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_graph;
    use crate::config::Config;

    fn repeat_matrix(rows: usize, pattern: &[i64]) -> Vec<Vec<i64>> {
        (0..rows).map(|_| pattern.to_vec()).collect()
    }

    #[test]
    fn simple_merge_collapses_identical_individuals() {
        // S2/B2: two identical individuals across three windows merge to one node.
        let pattern: Vec<i64> = (0..60).map(|x| x % 3).collect();
        let matrix = repeat_matrix(2, &pattern);
        let mut g = GraphGenome::new("g");
        let config = Config::default();
        build_graph(&mut g, &matrix, &config).unwrap();

        let merges = simple_merge(&mut g, 0).unwrap();
        assert!(merges > 0);
        assert_eq!(g.zoom_level(0).node_ids.len(), 1);

        let only = g.zoom_level(0).node_ids[0];
        let node = g.node(only);
        assert_eq!(node.specimens.len(), 2);
        assert_eq!(node.upstream.get(&NodeId::NOTHING), Some(&2));
        assert_eq!(node.downstream.get(&NodeId::NOTHING), Some(&2));
        g.validate(0).unwrap();
    }

    #[test]
    fn simple_merge_is_idempotent() {
        // R2
        let pattern: Vec<i64> = (0..60).map(|x| x % 3).collect();
        let matrix = repeat_matrix(2, &pattern);
        let mut g = GraphGenome::new("g");
        build_graph(&mut g, &matrix, &Config::default()).unwrap();
        simple_merge(&mut g, 0).unwrap();
        let before = g.zoom_level(0).node_ids.clone();
        let merges_again = simple_merge(&mut g, 0).unwrap();
        assert_eq!(merges_again, 0);
        assert_eq!(g.zoom_level(0).node_ids, before);
    }

    #[test]
    fn neglect_nodes_removes_low_support_outlier() {
        // S3: four individuals share windows 0,1; individual 3 deviates at window 2.
        let mut base: Vec<i64> = (0..60).map(|x| x % 5).collect();
        let mut outlier = base.clone();
        for v in outlier.iter_mut().skip(40) {
            *v += 7;
        }
        let matrix = vec![base.clone(), base.clone(), base.clone(), outlier];
        base.truncate(0);

        let mut g = GraphGenome::new("g");
        build_graph(&mut g, &matrix, &Config::default()).unwrap();

        let common_w1 = g.get_node("0:1-1").unwrap();
        let outlier_w2 = g.get_node("1:2-2").unwrap();
        assert_eq!(g.node(outlier_w2).specimens.len(), 1);

        let neglected = neglect_nodes(&mut g, 0, 1).unwrap();
        assert_eq!(neglected, 1);
        assert!(!g.zoom_level(0).node_ids.contains(&outlier_w2));
        assert_eq!(g.node(common_w1).downstream.get(&NodeId::NOTHING), Some(&1));
        g.validate(0).unwrap();
    }

    #[test]
    fn neglect_nodes_threshold_zero_is_noop_on_clean_graph() {
        // R3
        let pattern: Vec<i64> = (0..60).map(|x| x % 4).collect();
        let matrix = repeat_matrix(3, &pattern);
        let mut g = GraphGenome::new("g");
        build_graph(&mut g, &matrix, &Config::default()).unwrap();
        let before = g.zoom_level(0).node_ids.clone();
        let neglected = neglect_nodes(&mut g, 0, 0).unwrap();
        assert_eq!(neglected, 0);
        assert_eq!(g.zoom_level(0).node_ids, before);
    }

    #[test]
    fn split_groups_replaces_matching_anchor_block() {
        // S4
        let mut g = GraphGenome::new("g");
        let u = g.add_node(0, "U", None).unwrap();
        let x = g.add_node(0, "X", None).unwrap();
        let d = g.add_node(0, "D", None).unwrap();
        for &s in &[0u32, 1, 2] {
            g.node_mut(u).specimens.insert(s);
            g.node_mut(x).specimens.insert(s);
            g.node_mut(d).specimens.insert(s);
        }
        g.node_mut(u).downstream.insert(x, 3);
        g.node_mut(x).upstream.insert(u, 3);
        g.node_mut(x).downstream.insert(d, 3);
        g.node_mut(d).upstream.insert(x, 3);

        let splits = split_groups(&mut g, 0).unwrap();
        assert_eq!(splits, 1);
        assert!(g.node(x).specimens.is_empty());

        let new_id = *g.zoom_level(0).node_ids.last().unwrap();
        assert_eq!(g.node(new_id).specimens.len(), 3);

        neglect_nodes(&mut g, 0, 0).unwrap();
        assert!(!g.zoom_level(0).node_ids.contains(&x));
    }

    #[test]
    fn split_groups_skips_both_nothing_anchor() {
        // A node flanked by NOTHING on both sides would otherwise be
        // "splittable" against itself forever: effective_specimens(NOTHING)
        // falls back to anchor.specimens on both sides, so set1 == set2
        // trivially. split_groups must not treat that pair as a split
        // candidate, or the outer fixed-point driver never terminates.
        let mut g = GraphGenome::new("g");
        let x = g.add_node(0, "X", None).unwrap();
        for &s in &[0u32, 1, 2] {
            g.node_mut(x).specimens.insert(s);
        }
        g.node_mut(x).upstream.insert(NodeId::NOTHING, 3);
        g.node_mut(x).downstream.insert(NodeId::NOTHING, 3);

        let splits = split_groups(&mut g, 0).unwrap();
        assert_eq!(splits, 0);
        assert_eq!(g.zoom_level(0).node_ids.len(), 1);
        assert_eq!(g.node(x).specimens.len(), 3);
    }

    #[test]
    fn simplifier_run_terminates_on_both_nothing_flanked_node() {
        // Regression for the non-termination bug: three identical
        // individuals converge to one node flanked by NOTHING on both
        // ends, which must not loop forever inside Simplifier::run.
        let pattern: Vec<i64> = (0..20).map(|x| x % 5).collect();
        let matrix = repeat_matrix(3, &pattern);
        let mut g = GraphGenome::new("g");
        let config = Config {
            block_size: 20,
            filter_threshold: 1,
        };
        build_graph(&mut g, &matrix, &config).unwrap();

        let report = Simplifier::run(&mut g, 0, &config).unwrap();
        assert_eq!(report.splits, 0);
        assert_eq!(g.zoom_level(0).node_ids.len(), 1);
        g.validate(0).unwrap();
    }
}
