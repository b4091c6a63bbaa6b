//! Node arena types: `NodeId`, `Node`, and the `NOTHING` sentinel.

use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Dense arena index into `GraphGenome`'s node table.
///
/// Index 0 is always the `NOTHING` sentinel (§3): it represents a specimen's
/// untracked continuation (chromosome end, or the far side of a pruned node)
/// and must never be mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub const NOTHING: NodeId = NodeId(0);

    #[inline]
    pub fn is_nothing(self) -> bool {
        self == NodeId::NOTHING
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Strand orientation of a traversal (§4.A).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Plus),
            '-' => Some(Strand::Minus),
            _ => None,
        }
    }

    #[inline]
    pub fn as_char(self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }

    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Watson-Crick complement of one base; non-ACGT characters pass through (§4.A).
#[inline]
fn complement_base(c: char) -> char {
    match c {
        'A' => 'T',
        'T' => 'A',
        'C' => 'G',
        'G' => 'C',
        'a' => 't',
        't' => 'a',
        'c' => 'g',
        'g' => 'c',
        other => other,
    }
}

/// Reverse-complement a sequence. Used to render `-` strand traversals.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement_base).collect()
}

/// A node in the pangenome graph: carries sequence and, once summarization
/// begins, the derived `specimens`/`upstream`/`downstream` tables (§3).
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub seq: Option<String>,
    pub summarized_by: Option<NodeId>,
    pub specimens: FxHashSet<u32>,
    pub upstream: FxHashMap<NodeId, u64>,
    pub downstream: FxHashMap<NodeId, u64>,
}

impl Node {
    pub fn new(name: impl Into<String>, seq: Option<String>) -> Self {
        Self {
            name: name.into(),
            seq,
            summarized_by: None,
            specimens: FxHashSet::default(),
            upstream: FxHashMap::default(),
            downstream: FxHashMap::default(),
        }
    }

    fn nothing() -> Self {
        Self {
            name: "-1".to_string(),
            seq: None,
            summarized_by: None,
            specimens: FxHashSet::default(),
            upstream: FxHashMap::default(),
            downstream: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        self.name == "-1"
    }

    /// Render this node's sequence as traversed on the given strand (§4.A).
    pub fn render(&self, strand: Strand) -> String {
        let seq = self.seq.as_deref().unwrap_or("");
        match strand {
            Strand::Plus => seq.to_string(),
            Strand::Minus => reverse_complement(seq),
        }
    }
}

/// Equality by name, matching the spec's "two nodes with equal name are equal".
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Node {}

pub(crate) fn nothing_node() -> Node {
    Node::nothing()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strand_complement_round_trip() {
        // S6: reverse-complement of ACGT is ACGT.
        assert_eq!(reverse_complement("ACGT"), "ACGT");
    }

    #[test]
    fn node_equality_by_name() {
        let a = Node::new("5:0-0", Some("AAA".into()));
        let b = Node::new("5:0-0", Some("different-seq".into()));
        assert_eq!(a, b);
    }

    #[test]
    fn nothing_sentinel_is_empty() {
        let n = nothing_node();
        assert!(n.is_nothing());
        assert!(n.specimens.is_empty());
        assert!(n.upstream.is_empty());
    }
}
