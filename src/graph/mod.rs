//! # Conversion Graph
//!
//! A weighted multigraph of known conversion factors. Nodes are unit
//! identities with the prefix stripped off (`mg`, `g` and `kg` share the
//! `g` node); arcs carry a factor and a weight describing how far the
//! factor can be trusted.
//!
//! Every registration adds a reciprocal pair of arcs storing the same
//! factor, one of them flagged `inverted`. The adjacency store sits behind
//! a `RwLock`: registration takes the write lock, path search the read lock.

pub mod factors;
pub mod path;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::model::Unit;
use crate::numeric::Number;
use crate::registry::UnitRegistry;
use crate::{Error, Result};

pub use factors::{load_factor_table, parse_factor_table, FactorLine, STANDARD_FACTORS};
pub use path::{ConversionPath, PathStep};

/// Index of a node in its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Identity of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKey {
    /// A registered name, keyed by abbreviation (or full name when it has none)
    Named(String),
    /// An unnamed unit, keyed by its canonical prefix-free form
    Structural(Unit),
}

/// Where a unit lands in the graph.
#[derive(Debug, Clone)]
pub struct NodeRef {
    /// Prefix power of the unit relative to `unit`
    pub delta: i32,
    pub key: NodeKey,
    /// Reference unit of the node
    pub unit: Unit,
    pub label: String,
}

/// A directed arc: `1 source = factor target` (or `1 target = factor source`
/// when `inverted`).
#[derive(Debug, Clone)]
pub struct ConversionArc {
    pub target: NodeId,
    pub factor: Number,
    pub inverted: bool,
    pub weight: f64,
}

#[derive(Debug, Clone)]
struct ConversionNode {
    label: String,
    unit: Unit,
    arcs: Vec<ConversionArc>,
}

#[derive(Debug, Default)]
struct GraphInner {
    nodes: Vec<ConversionNode>,
    index: HashMap<NodeKey, NodeId>,
}

impl GraphInner {
    fn node_id(&mut self, node: &NodeRef) -> NodeId {
        if let Some(id) = self.index.get(&node.key) {
            return *id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ConversionNode { label: node.label.clone(), unit: node.unit.clone(), arcs: Vec::new() });
        self.index.insert(node.key.clone(), id);
        id
    }

    fn node(&self, id: NodeId) -> &ConversionNode {
        &self.nodes[id.0 as usize]
    }
}

/// Best complete path seen so far during search.
struct Candidate {
    weight: f64,
    arcs: Vec<(NodeId, usize)>,
    labels: Vec<String>,
}

impl Candidate {
    /// Higher weight wins, then fewer arcs, then the lexicographically smaller labels.
    fn beats(&self, other: &Candidate) -> bool {
        match self.weight.partial_cmp(&other.weight) {
            Some(std::cmp::Ordering::Greater) => true,
            Some(std::cmp::Ordering::Less) => false,
            _ => (self.arcs.len(), &self.labels) < (other.arcs.len(), &other.labels),
        }
    }
}

/// Registry of conversion factors between unit nodes.
#[derive(Debug, Default)]
pub struct ConversionGraph {
    inner: RwLock<GraphInner>,
}

impl ConversionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node for `unit` and the unit's prefix delta against it. Read-only:
    /// works for units that have no node yet.
    pub fn resolve_node(registry: &UnitRegistry, unit: &Unit) -> NodeRef {
        let canon = unit.canonicalize();
        if let Some((residual, named)) = registry.resolve_name(&canon) {
            return NodeRef {
                delta: residual.power(),
                key: NodeKey::Named(named.key().to_string()),
                unit: named.unit.clone(),
                label: named.key().to_string(),
            };
        }
        let bare = canon.without_prefix();
        NodeRef {
            delta: canon.prefix().power(),
            key: NodeKey::Structural(bare.clone()),
            label: registry.abbrev(&bare),
            unit: bare,
        }
    }

    /// Record `1 a = factor b` between the nodes of `a` and `b`.
    ///
    /// `weight` defaults to the factor's precision weight. Units on the same
    /// node only differ by prefix and are rejected, as are zero and
    /// undefined factors.
    pub fn register(&self, registry: &UnitRegistry, a: &Unit, b: &Unit, factor: Number, weight: Option<f64>) -> Result<()> {
        let from = Self::resolve_node(registry, a);
        let to = Self::resolve_node(registry, b);
        if from.key == to.key {
            return Err(Error::PrefixOnlyConversion { from: registry.abbrev(a), to: registry.abbrev(b) });
        }
        if factor.is_zero() || factor.is_dne() {
            return Err(Error::InvalidFactor {
                from: registry.abbrev(a),
                to: registry.abbrev(b),
                factor: factor.to_string(),
            });
        }
        let weight = weight.unwrap_or_else(|| factor.precision_weight());
        let scaled = factor.scale_pow10(to.delta - from.delta)?;

        debug!(from = %from.label, to = %to.label, factor = %scaled, weight, "registered conversion");

        let mut inner = self.inner.write();
        let ia = inner.node_id(&from);
        let ib = inner.node_id(&to);
        inner.nodes[ia.0 as usize].arcs.push(ConversionArc { target: ib, factor: scaled.clone(), inverted: false, weight });
        inner.nodes[ib.0 as usize].arcs.push(ConversionArc { target: ia, factor: scaled, inverted: true, weight });
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().nodes.len()
    }

    /// Number of registered factors (each stored as a reciprocal pair of arcs).
    pub fn factor_count(&self) -> usize {
        self.inner.read().nodes.iter().map(|n| n.arcs.len()).sum::<usize>() / 2
    }

    /// Whether `unit`'s node has any registered factor.
    pub fn contains(&self, registry: &UnitRegistry, unit: &Unit) -> bool {
        let node = Self::resolve_node(registry, unit);
        self.inner.read().index.contains_key(&node.key)
    }

    /// Labels of the nodes one arc away from `unit`'s node, sorted.
    pub fn neighbors(&self, registry: &UnitRegistry, unit: &Unit) -> Vec<String> {
        let node = Self::resolve_node(registry, unit);
        let inner = self.inner.read();
        let Some(id) = inner.index.get(&node.key) else {
            return Vec::new();
        };
        let mut labels: Vec<String> = inner.node(*id).arcs.iter().map(|a| inner.node(a.target).label.clone()).collect();
        labels.sort();
        labels.dedup();
        labels
    }

    /// Most trustworthy path between the nodes of `from` and `to`.
    ///
    /// Enumerates every simple path and keeps the one with the highest
    /// product of arc weights; ties go to fewer arcs, then to the
    /// lexicographically smallest sequence of node labels.
    pub fn find_best_path(&self, registry: &UnitRegistry, from: &Unit, to: &Unit) -> Result<ConversionPath> {
        let start = Self::resolve_node(registry, from);
        let goal = Self::resolve_node(registry, to);
        let no_path = || Error::NoConversionPath { from: registry.abbrev(from), to: registry.abbrev(to) };

        if start.key == goal.key {
            return Ok(ConversionPath {
                from_delta: start.delta,
                to_delta: goal.delta,
                origin: start.unit,
                origin_label: start.label,
                steps: Vec::new(),
            });
        }

        let inner = self.inner.read();
        let (Some(&start_id), Some(&goal_id)) = (inner.index.get(&start.key), inner.index.get(&goal.key)) else {
            return Err(no_path());
        };

        let mut visited = vec![false; inner.nodes.len()];
        let mut trail = Vec::new();
        let mut best = None;
        visited[start_id.0 as usize] = true;
        search(&inner, start_id, goal_id, &mut visited, &mut trail, &mut best);
        let best = best.ok_or_else(no_path)?;

        debug!(path = ?best.labels, weight = best.weight, "best conversion path");

        let steps = best
            .arcs
            .iter()
            .map(|&(node, arc)| {
                let arc = &inner.node(node).arcs[arc];
                let target = inner.node(arc.target);
                PathStep {
                    factor: arc.factor.clone(),
                    inverted: arc.inverted,
                    weight: arc.weight,
                    unit: target.unit.clone(),
                    label: target.label.clone(),
                }
            })
            .collect();

        Ok(ConversionPath {
            from_delta: start.delta,
            to_delta: goal.delta,
            origin: inner.node(start_id).unit.clone(),
            origin_label: inner.node(start_id).label.clone(),
            steps,
        })
    }
}

/// Depth-first enumeration of simple paths with push/pop backtracking.
fn search(
    inner: &GraphInner,
    at: NodeId,
    goal: NodeId,
    visited: &mut [bool],
    trail: &mut Vec<(NodeId, usize)>,
    best: &mut Option<Candidate>,
) {
    if at == goal {
        let mut labels = vec![inner.node(trail.first().map_or(at, |t| t.0)).label.clone()];
        labels.extend(trail.iter().map(|&(n, a)| inner.node(inner.node(n).arcs[a].target).label.clone()));
        let weight = trail.iter().map(|&(n, a)| inner.node(n).arcs[a].weight).product();
        let candidate = Candidate { weight, arcs: trail.clone(), labels };
        trace!(path = ?candidate.labels, weight, "candidate path");
        if best.as_ref().is_none_or(|b| candidate.beats(b)) {
            *best = Some(candidate);
        }
        return;
    }

    for (i, arc) in inner.node(at).arcs.iter().enumerate() {
        let next = arc.target.0 as usize;
        if visited[next] {
            continue;
        }
        visited[next] = true;
        trail.push((at, i));
        search(inner, arc.target, goal, visited, trail, best);
        trail.pop();
        visited[next] = false;
    }
}
