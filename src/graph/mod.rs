use crate::task::{ChildSide, Edge};
use crate::tree::TaskTree;
use std::collections::{BTreeMap, BTreeSet};

pub mod plan_dag;

pub use plan_dag::PlanDag;

/// Merged dependency relation of a plan.
///
/// Built from two sources: the tree hierarchy (direction taken from each
/// child's side tag) and the explicit edges. Both maps are sets, so an
/// explicit edge repeating a hierarchy link is stored once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    predecessors: BTreeMap<String, BTreeSet<String>>,
    successors: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn predecessors(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.predecessors
    }

    pub fn successors(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.successors
    }

    pub fn predecessors_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.predecessors
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn successors_of(&self, id: &str) -> impl Iterator<Item = &str> {
        self.successors
            .get(id)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn contains_dependency(&self, from_id: &str, to_id: &str) -> bool {
        self.successors
            .get(from_id)
            .is_some_and(|set| set.contains(to_id))
    }

    /// Every id known to the graph, including ids only referenced by edges.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.predecessors.keys().map(String::as_str)
    }

    pub fn dependency_count(&self) -> usize {
        self.successors.values().map(BTreeSet::len).sum()
    }

    fn ensure_node(&mut self, id: &str) {
        self.predecessors.entry(id.to_string()).or_default();
        self.successors.entry(id.to_string()).or_default();
    }

    fn add_dependency(&mut self, from_id: &str, to_id: &str) {
        if from_id.is_empty() || to_id.is_empty() || from_id == to_id {
            return;
        }
        self.ensure_node(from_id);
        self.ensure_node(to_id);
        if let Some(set) = self.predecessors.get_mut(to_id) {
            set.insert(from_id.to_string());
        }
        if let Some(set) = self.successors.get_mut(from_id) {
            set.insert(to_id.to_string());
        }
    }
}

/// Build the dependency graph of a tree plus explicit edges.
///
/// Never fails: self-loops are dropped, edges naming unknown ids are kept
/// (callers restrict to tree ids where needed), cycles are left for the
/// consumers to handle.
pub fn build_graph(tree: &TaskTree, edges: &[Edge]) -> DependencyGraph {
    let mut graph = DependencyGraph::default();
    for id in tree.ids() {
        graph.ensure_node(&id);
    }

    for (parent, child) in tree.hierarchy_pairs() {
        match child.effective_side() {
            ChildSide::Before => graph.add_dependency(&child.id, &parent.id),
            ChildSide::After => graph.add_dependency(&parent.id, &child.id),
        }
    }

    for edge in edges {
        if edge.is_self_loop() {
            log::debug!("dropping self-referential edge {}", edge.id);
            continue;
        }
        graph.add_dependency(&edge.from_id, &edge.to_id);
    }
    graph
}
