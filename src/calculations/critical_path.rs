use crate::graph::{PlanDag, build_graph};
use crate::task::Edge;
use crate::tree::TaskTree;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Slack at or below this many days counts as zero.
pub const SLACK_EPSILON: f64 = 0.001;

/// CPM timings of one task, in days relative to project start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskTiming {
    pub duration: f64,
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    pub slack: f64,
}

impl TaskTiming {
    pub fn is_critical(&self) -> bool {
        self.slack <= SLACK_EPSILON
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPathAnalysis {
    pub timings: BTreeMap<String, TaskTiming>,
    pub critical_node_ids: BTreeSet<String>,
    pub critical_conn_ids: BTreeSet<String>,
    pub project_duration: f64,
    /// Tasks left out of the topological order (cycles and everything
    /// downstream of them). They carry no timings and are never critical.
    pub unordered_ids: Vec<String>,
    #[serde(default)]
    critical_chain: Vec<String>,
}

impl CriticalPathAnalysis {
    /// No critical path found. A normal outcome, not a failure.
    pub fn is_empty(&self) -> bool {
        self.critical_node_ids.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.unordered_ids.is_empty()
    }

    pub fn timing(&self, id: &str) -> Option<&TaskTiming> {
        self.timings.get(id)
    }

    pub fn is_critical(&self, id: &str) -> bool {
        self.critical_node_ids.contains(id)
    }

    /// Critical task ids ordered by earliest start, ties in tree order.
    pub fn critical_chain(&self) -> &[String] {
        &self.critical_chain
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("tasks={}", self.timings.len()));
        parts.push(format!("critical={}", self.critical_node_ids.len()));
        parts.push(format!("critical_edges={}", self.critical_conn_ids.len()));
        parts.push(format!("duration={}", self.project_duration));
        if !self.unordered_ids.is_empty() {
            parts.push(format!("unordered={}", self.unordered_ids.len()));
        }
        if !self.critical_chain.is_empty() {
            parts.push(format!("crit_path={}", self.critical_chain.join("->")));
        }
        parts.join(", ")
    }
}

/// Forward and backward CPM passes over the plan's dependency graph.
pub struct CriticalPath<'a> {
    tree: &'a TaskTree,
    edges: &'a [Edge],
}

impl<'a> CriticalPath<'a> {
    pub fn new(tree: &'a TaskTree, edges: &'a [Edge]) -> Self {
        Self { tree, edges }
    }

    pub fn execute(&self) -> CriticalPathAnalysis {
        let dependencies = build_graph(self.tree, self.edges);
        let dag = PlanDag::build(self.tree, &dependencies);

        let order = Self::kahn_order(&dag);
        let mut unordered_ids = Vec::new();
        if order.len() < dag.graph.node_count() {
            let ordered: BTreeSet<NodeIndex> = order.iter().copied().collect();
            unordered_ids = dag
                .graph
                .node_indices()
                .filter(|ix| !ordered.contains(ix))
                .map(|ix| dag.graph[ix].clone())
                .collect();
            log::warn!(
                "dependency cycle detected; critical path computed over {} of {} tasks (skipped: {})",
                order.len(),
                dag.graph.node_count(),
                unordered_ids.join(", ")
            );
        }

        // Forward pass
        let mut earliest: HashMap<NodeIndex, (f64, f64)> = HashMap::with_capacity(order.len());
        for &node_ix in &order {
            let es = dag
                .graph
                .neighbors_directed(node_ix, Direction::Incoming)
                .filter_map(|pred| earliest.get(&pred).map(|(_, ef)| *ef))
                .fold(0.0_f64, f64::max);
            let ef = es + dag.duration(node_ix);
            earliest.insert(node_ix, (es, ef));
        }

        let project_duration = earliest.values().map(|(_, ef)| *ef).fold(0.0_f64, f64::max);

        // Backward pass; successors outside the order have no latest dates
        // and are ignored.
        let mut latest: HashMap<NodeIndex, (f64, f64)> = HashMap::with_capacity(order.len());
        for &node_ix in order.iter().rev() {
            let lf = dag
                .graph
                .neighbors_directed(node_ix, Direction::Outgoing)
                .filter_map(|succ| latest.get(&succ).map(|(ls, _)| *ls))
                .fold(None, |acc: Option<f64>, ls| Some(acc.map_or(ls, |m| m.min(ls))))
                .unwrap_or(project_duration);
            let ls = lf - dag.duration(node_ix);
            latest.insert(node_ix, (ls, lf));
        }

        let mut timings = BTreeMap::new();
        let mut critical_node_ids = BTreeSet::new();
        let mut chain: Vec<(f64, usize, String)> = Vec::new();
        for &node_ix in &order {
            let (es, ef) = earliest[&node_ix];
            let (ls, lf) = latest[&node_ix];
            let id = dag.graph[node_ix].clone();
            let timing = TaskTiming {
                duration: dag.duration(node_ix),
                earliest_start: es,
                earliest_finish: ef,
                latest_start: ls,
                latest_finish: lf,
                slack: ls - es,
            };
            // A task with no analyzed dependency in either direction is on no
            // chain.
            let linked = dag
                .graph
                .neighbors_undirected(node_ix)
                .any(|neighbor| earliest.contains_key(&neighbor));
            if linked && timing.is_critical() {
                critical_node_ids.insert(id.clone());
                chain.push((es, node_ix.index(), id.clone()));
            }
            timings.insert(id, timing);
        }
        chain.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        let critical_conn_ids = self
            .edges
            .iter()
            .filter(|edge| {
                critical_node_ids.contains(&edge.from_id) && critical_node_ids.contains(&edge.to_id)
            })
            .filter(|edge| match (timings.get(&edge.from_id), timings.get(&edge.to_id)) {
                (Some(from), Some(to)) => {
                    (from.earliest_finish - to.earliest_start).abs() <= SLACK_EPSILON
                }
                _ => false,
            })
            .map(|edge| edge.id.clone())
            .collect();

        CriticalPathAnalysis {
            timings,
            critical_node_ids,
            critical_conn_ids,
            project_duration,
            unordered_ids,
            critical_chain: chain.into_iter().map(|(_, _, id)| id).collect(),
        }
    }

    /// Kahn's algorithm seeded in node-index (tree pre-order) order. Nodes on
    /// or behind a cycle never reach in-degree zero and are left out.
    fn kahn_order(dag: &PlanDag) -> Vec<NodeIndex> {
        let mut in_degree: HashMap<NodeIndex, usize> = dag
            .graph
            .node_indices()
            .map(|ix| {
                let count = dag.graph.neighbors_directed(ix, Direction::Incoming).count();
                (ix, count)
            })
            .collect();

        let mut queue: VecDeque<NodeIndex> = dag
            .graph
            .node_indices()
            .filter(|ix| in_degree[ix] == 0)
            .collect();

        let mut order = Vec::with_capacity(dag.graph.node_count());
        while let Some(node_ix) = queue.pop_front() {
            order.push(node_ix);
            for succ in dag.graph.neighbors_directed(node_ix, Direction::Outgoing) {
                if let Some(count) = in_degree.get_mut(&succ) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        queue.push_back(succ);
                    }
                }
            }
        }
        order
    }
}

/// Critical tasks and critical explicit edges of a plan.
pub fn calculate_critical_path(tree: &TaskTree, edges: &[Edge]) -> CriticalPathAnalysis {
    CriticalPath::new(tree, edges).execute()
}
