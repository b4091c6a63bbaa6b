//! Graph model (§4.A): `GraphGenome`, `ZoomLevel`, and the node/path arenas.

use crate::error::{GraphError, Result};
use crate::node::{nothing_node, Node, NodeId, Strand};
use crate::path::{NodeTraversal, Path, PathId};
use rustc_hash::FxHashMap;

/// One set of paths (and the node working-list behind them) at a given
/// summarization depth. Zoom 0 always exists once a graph is created (§3).
#[derive(Debug, Clone, Default)]
pub struct ZoomLevel {
    pub zoom: u32,
    /// Paths present at this zoom level, insertion order.
    pub path_ids: Vec<PathId>,
    accession_index: FxHashMap<String, PathId>,
    /// The simplifier's working node list for this zoom level (§4.D,§5):
    /// insertion order is the "stable order" passes iterate in.
    pub node_ids: Vec<NodeId>,
}

impl ZoomLevel {
    fn new(zoom: u32) -> Self {
        Self {
            zoom,
            ..Default::default()
        }
    }
}

/// A named, owned collection of nodes and zoom levels (§3).
#[derive(Debug, Clone)]
pub struct GraphGenome {
    pub name: String,
    nodes: Vec<Node>,
    node_index: FxHashMap<String, NodeId>,
    paths: Vec<Path>,
    zoom_levels: Vec<ZoomLevel>,
    split_counter: u64,
}

impl GraphGenome {
    /// Creates a graph with zoom level 0 attached.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: vec![nothing_node()],
            node_index: FxHashMap::default(),
            paths: Vec::new(),
            zoom_levels: vec![ZoomLevel::new(0)],
            split_counter: 0,
        }
    }

    fn ensure_zoom(&mut self, zoom: u32) {
        while self.zoom_levels.len() <= zoom as usize {
            let z = self.zoom_levels.len() as u32;
            self.zoom_levels.push(ZoomLevel::new(z));
        }
    }

    pub fn zoom_level(&self, zoom: u32) -> &ZoomLevel {
        &self.zoom_levels[zoom as usize]
    }

    pub fn zoom_level_mut(&mut self, zoom: u32) -> &mut ZoomLevel {
        self.ensure_zoom(zoom);
        &mut self.zoom_levels[zoom as usize]
    }

    pub fn max_zoom(&self) -> u32 {
        self.zoom_levels.len() as u32 - 1
    }

    // ---- Nodes -----------------------------------------------------------

    /// Adds a node to zoom `zoom`'s working list. Fails if `(graph, name)` exists (I4).
    pub fn add_node(&mut self, zoom: u32, name: &str, seq: Option<String>) -> Result<NodeId> {
        if self.node_index.contains_key(name) || name == "-1" {
            return Err(GraphError::DuplicateNode {
                graph: self.name.clone(),
                name: name.to_string(),
            });
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(name, seq));
        self.node_index.insert(name.to_string(), id);
        self.zoom_level_mut(zoom).node_ids.push(id);
        Ok(id)
    }

    /// Looks a node up by name; fails when missing.
    pub fn get_node(&self, name: &str) -> Result<NodeId> {
        if name == "-1" {
            return Ok(NodeId::NOTHING);
        }
        self.node_index
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NodeMissing {
                graph: self.name.clone(),
                name: name.to_string(),
            })
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn node_count(&self) -> usize {
        // excludes the NOTHING sentinel
        self.nodes.len() - 1
    }

    /// Generates a fresh, graph-unique node name derived from `base`, for
    /// `split_one_group` (§4.D.3), which has no natural name of its own.
    pub(crate) fn fresh_split_name(&mut self, base: &str) -> String {
        loop {
            self.split_counter += 1;
            let candidate = format!("{base}*{}", self.split_counter);
            if !self.node_index.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub(crate) fn set_node_summary(&mut self, id: NodeId, parent: NodeId) {
        self.node_mut(id).summarized_by = Some(parent);
    }

    // ---- Paths -------------------------------------------------------------

    /// Ensures the zoom level exists and creates a new path for `accession`.
    /// Fails if the accession already exists at that zoom level (I4).
    pub fn create_path(&mut self, accession: &str, zoom: u32) -> Result<PathId> {
        self.ensure_zoom(zoom);
        if self.zoom_levels[zoom as usize]
            .accession_index
            .contains_key(accession)
        {
            return Err(GraphError::DuplicatePath {
                graph: self.name.clone(),
                accession: accession.to_string(),
                zoom,
            });
        }
        let id = PathId(self.paths.len());
        self.paths.push(Path::new(accession));
        let level = &mut self.zoom_levels[zoom as usize];
        level.path_ids.push(id);
        level.accession_index.insert(accession.to_string(), id);
        Ok(id)
    }

    pub fn path_by_accession(&self, zoom: u32, accession: &str) -> Option<PathId> {
        self.zoom_levels
            .get(zoom as usize)?
            .accession_index
            .get(accession)
            .copied()
    }

    #[inline]
    pub fn path(&self, id: PathId) -> &Path {
        &self.paths[id.0]
    }

    #[inline]
    pub fn path_mut(&mut self, id: PathId) -> &mut Path {
        &mut self.paths[id.0]
    }

    pub(crate) fn set_path_summary(&mut self, id: PathId, parent: PathId) {
        self.path_mut(id).summarized_by = Some(parent);
    }

    /// Appends a traversal at `order = max(order) + 1` (or 0), per §4.A.
    pub fn append_traversal(&mut self, path: PathId, node: NodeId, strand: Strand) -> Result<u32> {
        let p = self.path_mut(path);
        let order = p.traversals.len() as u32;
        p.traversals.push(NodeTraversal {
            node,
            strand,
            order,
        });
        Ok(order)
    }

    /// Returns the traversal on the same path at `order + delta`, if present.
    pub fn neighbor(&self, path: PathId, order: u32, delta: i64) -> Option<&NodeTraversal> {
        self.path(path).traversal_at(order as i64 + delta)
    }

    // ---- Invariant checking (§8, P1-P5) -------------------------------------

    /// Checks I1-I3 for every node currently active at `zoom`, and I4-I5 for
    /// every path at `zoom`. Returns the first violation found.
    pub fn validate(&self, zoom: u32) -> Result<()> {
        let level = self.zoom_level(zoom);
        for &id in &level.node_ids {
            self.validate_node(id)?;
        }
        let mut seen_accessions = std::collections::HashSet::new();
        for &pid in &level.path_ids {
            let path = self.path(pid);
            if !seen_accessions.insert(&path.accession) {
                return Err(GraphError::DuplicatePath {
                    graph: self.name.clone(),
                    accession: path.accession.clone(),
                    zoom,
                });
            }
            for (i, t) in path.traversals.iter().enumerate() {
                if t.order as usize != i {
                    return Err(GraphError::InvariantViolation {
                        node: self.node(t.node).name.clone(),
                        detail: format!(
                            "path '{}' traversal {} has order {} (expected {})",
                            path.accession, i, t.order, i
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_node(&self, id: NodeId) -> Result<()> {
        if id.is_nothing() {
            return Ok(());
        }
        let node = self.node(id);
        let up_sum: i64 = node.upstream.values().map(|&c| c as i64).sum();
        let down_sum: i64 = node.downstream.values().map(|&c| c as i64).sum();
        let specimens = node.specimens.len() as i64;
        if up_sum != specimens {
            return Err(GraphError::InvariantViolation {
                node: node.name.clone(),
                detail: format!("sum(upstream)={up_sum} != |specimens|={specimens}"),
            });
        }
        if down_sum != specimens {
            return Err(GraphError::InvariantViolation {
                node: node.name.clone(),
                detail: format!("sum(downstream)={down_sum} != |specimens|={specimens}"),
            });
        }
        for (&m, &c) in node.upstream.iter().chain(node.downstream.iter()) {
            if c == 0 {
                return Err(GraphError::InvariantViolation {
                    node: node.name.clone(),
                    detail: format!("zero-valued transition to {m} was not purged"),
                });
            }
        }
        for (&m, &c) in &node.downstream {
            if m.is_nothing() {
                continue;
            }
            let back = self.node(m).upstream.get(&id).copied();
            if back != Some(c) {
                return Err(GraphError::InvariantViolation {
                    node: node.name.clone(),
                    detail: format!(
                        "downstream[{m}]={c} but {m}.upstream[{}]={:?}",
                        node.name, back
                    ),
                });
            }
        }
        Ok(())
    }
}
