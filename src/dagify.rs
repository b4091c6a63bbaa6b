//! DAGify (§4.E): iterative pairwise LCS path reconciliation into a unified
//! profile, then reduction of that profile into disjoint slices.

use crate::graph::GraphGenome;
use crate::node::NodeId;
use rustc_hash::FxHashSet;

/// One path in DAGify's input, identified purely by its position (§4.E calls
/// this a "path index"; it need not be the zoom level's `PathId`).
pub type PathIndex = usize;

/// One step of the reconciled profile: a node plus the set of input paths
/// aligned at this position so far (§4.E.1-2).
#[derive(Debug, Clone)]
pub struct ProfileEntry {
    pub node: NodeId,
    pub paths: FxHashSet<PathIndex>,
    pub candidate_paths: FxHashSet<PathIndex>,
    pub duplicate: bool,
}

/// Builds the profile for primary path `primary`, folding in every other
/// path (in input order) via `lcs_merge` (§4.E.1).
pub fn generate_profiles(primary: PathIndex, paths: &[Vec<NodeId>]) -> Vec<ProfileEntry> {
    let mut profile: Vec<ProfileEntry> = paths[primary]
        .iter()
        .map(|&node| ProfileEntry {
            node,
            paths: [primary].into_iter().collect(),
            candidate_paths: [primary].into_iter().collect(),
            duplicate: false,
        })
        .collect();

    for q in 0..paths.len() {
        if q == primary {
            continue;
        }
        profile = lcs_merge(&profile, &paths[q], q);
    }
    profile
}

/// Tries every path as primary and keeps the one whose final profile has the
/// fewest duplicate entries, first-wins on ties (§4.E.1).
pub fn generate_profiles_with_minimizing_replications(paths: &[Vec<NodeId>]) -> (PathIndex, Vec<ProfileEntry>) {
    let mut best: Option<(PathIndex, Vec<ProfileEntry>, usize)> = None;
    for p in 0..paths.len() {
        let profile = generate_profiles(p, paths);
        let duplicates = profile.iter().filter(|e| e.duplicate).count();
        match &best {
            Some((_, _, best_dup)) if *best_dup <= duplicates => {}
            _ => best = Some((p, profile, duplicates)),
        }
    }
    let (p, profile, _) = best.expect("generate_profiles_with_minimizing_replications requires at least one path");
    (p, profile)
}

/// Standard O(n*m) LCS of `profile` (by node) against `path`, tracing back
/// into a merged profile (§4.E.2).
fn lcs_merge(profile: &[ProfileEntry], path: &[NodeId], q: PathIndex) -> Vec<ProfileEntry> {
    let n = profile.len();
    let m = path.len();
    let mut dp = vec![vec![0u32; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            dp[i][j] = if profile[i - 1].node == path[j - 1] {
                dp[i - 1][j - 1] + 1
            } else {
                dp[i - 1][j].max(dp[i][j - 1])
            };
        }
    }

    let mut out = Vec::with_capacity(n + m);
    let mut prev: FxHashSet<NodeId> = FxHashSet::default();
    let mut candidate_path_flag = false;
    let mut i = n;
    let mut j = m;

    while i > 0 && j > 0 {
        if profile[i - 1].node == path[j - 1] {
            let mut paths = profile[i - 1].paths.clone();
            paths.insert(q);
            let mut candidate_paths = profile[i - 1].candidate_paths.clone();
            candidate_paths.insert(q);
            candidate_path_flag = true;
            let node = profile[i - 1].node;
            let duplicate = !prev.insert(node);
            out.push(ProfileEntry {
                node,
                paths,
                candidate_paths,
                duplicate,
            });
            i -= 1;
            j -= 1;
        } else if dp[i - 1][j] > dp[i][j - 1] {
            let mut entry = profile[i - 1].clone();
            if candidate_path_flag {
                entry.candidate_paths.insert(q);
            }
            entry.duplicate = !prev.insert(entry.node);
            out.push(entry);
            i -= 1;
        } else {
            let node = path[j - 1];
            let mut candidate_paths: FxHashSet<PathIndex> = [q].into_iter().collect();
            if i >= 1 {
                candidate_paths.extend(profile[i - 1].candidate_paths.iter().copied());
            }
            let duplicate = !prev.insert(node);
            out.push(ProfileEntry {
                node,
                paths: [q].into_iter().collect(),
                candidate_paths,
                duplicate,
            });
            j -= 1;
        }
    }
    while i > 0 {
        let mut entry = profile[i - 1].clone();
        entry.duplicate = !prev.insert(entry.node);
        out.push(entry);
        i -= 1;
    }
    while j > 0 {
        let node = path[j - 1];
        let duplicate = !prev.insert(node);
        let paths: FxHashSet<PathIndex> = [q].into_iter().collect();
        out.push(ProfileEntry {
            node,
            paths: paths.clone(),
            candidate_paths: paths,
            duplicate,
        });
        j -= 1;
    }

    out.reverse();
    out
}

/// One member of a slice: either a real node carried over from the profile,
/// or a zero-length filler representing paths that cross the slice boundary
/// without contributing content (§4.E.3).
#[derive(Debug, Clone)]
pub struct SliceNode {
    pub seq: Option<String>,
    pub paths: FxHashSet<PathIndex>,
    pub node: Option<NodeId>,
}

impl SliceNode {
    fn real(graph: &GraphGenome, prof: &ProfileEntry) -> Self {
        Self {
            seq: graph.node(prof.node).seq.clone(),
            paths: prof.paths.clone(),
            node: Some(prof.node),
        }
    }

    fn filler(paths: FxHashSet<PathIndex>) -> Self {
        Self {
            seq: Some(String::new()),
            paths,
            node: None,
        }
    }
}

pub type Slice = Vec<SliceNode>;

fn flush_slice(
    current_slice: &mut Vec<SliceNode>,
    current_paths: &mut FxHashSet<PathIndex>,
    cand: &FxHashSet<PathIndex>,
    slices: &mut Vec<Slice>,
) {
    let missing: FxHashSet<PathIndex> = cand.difference(current_paths).copied().collect();
    if !missing.is_empty() {
        current_slice.push(SliceNode::filler(missing));
    }
    if !current_slice.is_empty() {
        slices.push(std::mem::take(current_slice));
    }
    current_paths.clear();
}

/// Reduces a reconciled profile into disjoint slices (§4.E.3).
pub fn to_slices(profile: &[ProfileEntry], graph: &GraphGenome) -> Vec<Slice> {
    let mut slices: Vec<Slice> = Vec::new();
    let mut current_slice: Vec<SliceNode> = Vec::new();
    let mut current_paths: FxHashSet<PathIndex> = FxHashSet::default();

    for k in 0..profile.len() {
        let prof = &profile[k];
        let mut cand = prof.candidate_paths.clone();
        if k + 1 < profile.len() {
            cand.extend(profile[k + 1].candidate_paths.iter().copied());
        }

        if prof.paths.len() == cand.len() {
            flush_slice(&mut current_slice, &mut current_paths, &prof.candidate_paths, &mut slices);
            slices.push(vec![SliceNode::real(graph, prof)]);
        } else if !prof.paths.is_disjoint(&current_paths) {
            flush_slice(&mut current_slice, &mut current_paths, &prof.candidate_paths, &mut slices);
            current_slice.push(SliceNode::real(graph, prof));
            current_paths = prof.paths.clone();
        } else {
            current_slice.push(SliceNode::real(graph, prof));
            current_paths.extend(prof.paths.iter().copied());
        }
    }

    if let Some(last) = profile.last() {
        flush_slice(&mut current_slice, &mut current_paths, &last.candidate_paths, &mut slices);
    } else if !current_slice.is_empty() {
        slices.push(current_slice);
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphGenome;

    #[test]
    fn single_path_profile_has_no_duplicates() {
        // B3
        let mut g = GraphGenome::new("g");
        let a = g.add_node(0, "A", Some("A".into())).unwrap();
        let b = g.add_node(0, "B", Some("B".into())).unwrap();
        let paths = vec![vec![a, b]];
        let (primary, profile) = generate_profiles_with_minimizing_replications(&paths);
        assert_eq!(primary, 0);
        assert_eq!(profile.len(), 2);
        assert!(profile.iter().all(|e| !e.duplicate));
        assert_eq!(profile[0].node, a);
        assert_eq!(profile[1].node, b);
    }

    #[test]
    fn lcs_merge_interleaves_disjoint_tails() {
        // S5: profile [A,B,C] vs path [B,C,D] -> [A,B,C,D]; B,C carry both
        // paths, A and D carry one each.
        let mut g = GraphGenome::new("g");
        let a = g.add_node(0, "A", None).unwrap();
        let b = g.add_node(0, "B", None).unwrap();
        let c = g.add_node(0, "C", None).unwrap();
        let d = g.add_node(0, "D", None).unwrap();
        let profile: Vec<ProfileEntry> = [a, b, c]
            .into_iter()
            .map(|node| ProfileEntry {
                node,
                paths: [0].into_iter().collect(),
                candidate_paths: [0].into_iter().collect(),
                duplicate: false,
            })
            .collect();
        let merged = lcs_merge(&profile, &[b, c, d], 1);
        let nodes: Vec<NodeId> = merged.iter().map(|e| e.node).collect();
        assert_eq!(nodes, vec![a, b, c, d]);
        assert_eq!(merged[0].paths, [0].into_iter().collect());
        assert_eq!(merged[1].paths, [0, 1].into_iter().collect());
        assert_eq!(merged[2].paths, [0, 1].into_iter().collect());
        assert_eq!(merged[3].paths, [1].into_iter().collect());
    }

    #[test]
    fn three_paths_shared_middle_slices() {
        // S1: P1=[A,B,C], P2=[A,B,D], P3=[E,B,C]; primary P1, 0 duplicates;
        // slices group by shared candidate boundary: {A,E}, {B}, {C,D}.
        let mut g = GraphGenome::new("g");
        let a = g.add_node(0, "A", None).unwrap();
        let b = g.add_node(0, "B", None).unwrap();
        let c = g.add_node(0, "C", None).unwrap();
        let d = g.add_node(0, "D", None).unwrap();
        let e = g.add_node(0, "E", None).unwrap();
        let paths = vec![vec![a, b, c], vec![a, b, d], vec![e, b, c]];

        let (primary, profile) = generate_profiles_with_minimizing_replications(&paths);
        assert_eq!(primary, 0);
        assert_eq!(profile.iter().filter(|p| p.duplicate).count(), 0);

        let slices = to_slices(&profile, &g);
        assert_eq!(slices.len(), 3);
        let slice_nodes: Vec<FxHashSet<NodeId>> = slices
            .iter()
            .map(|s| s.iter().filter_map(|n| n.node).collect())
            .collect();
        assert_eq!(slice_nodes[0], [a, e].into_iter().collect());
        assert_eq!(slice_nodes[1], [b].into_iter().collect());
        assert_eq!(slice_nodes[2], [c, d].into_iter().collect());
    }

    #[test]
    fn conflict_case_filler_uses_this_entrys_candidate_paths_only() {
        // Regression: the conflict branch's filler must be seeded from
        // `prof.candidate_paths`, not `cand` (which also folds in the
        // *next* profile entry's candidate paths via the anchor-test
        // lookahead). A filler built from `cand` would wrongly carry a
        // path that only crosses the *following* boundary.
        let mut g = GraphGenome::new("g");
        let a = g.add_node(0, "A", None).unwrap();
        let b = g.add_node(0, "B", None).unwrap();
        let c = g.add_node(0, "C", None).unwrap();

        let profile = vec![
            ProfileEntry {
                node: a,
                paths: [0].into_iter().collect(),
                candidate_paths: [0].into_iter().collect(),
                duplicate: false,
            },
            ProfileEntry {
                node: b,
                paths: [0].into_iter().collect(),
                candidate_paths: [0, 5].into_iter().collect(),
                duplicate: false,
            },
            ProfileEntry {
                node: c,
                paths: [0, 1, 2].into_iter().collect(),
                candidate_paths: [0, 1, 2].into_iter().collect(),
                duplicate: false,
            },
        ];

        let slices = to_slices(&profile, &g);
        // The first flush happens when entry B conflicts with A's open
        // slice; at that point current_slice == [A], so slices[0] is
        // exactly A plus whatever filler the conflict branch produced.
        let first = &slices[0];
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].node, Some(a));
        assert!(first[1].node.is_none());
        assert_eq!(first[1].paths, [5].into_iter().collect());
    }
}
