use crate::dates;
use crate::graph::DependencyGraph;
use crate::task::Task;
use crate::tree::TaskTree;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Dependency graph restricted to the tasks of one tree, with the duration
/// each task contributes to critical-path analysis.
///
/// Node indices follow the tree's pre-order.
pub struct PlanDag {
    pub graph: DiGraph<String, ()>,
    pub id_to_index: HashMap<String, NodeIndex>,
    pub durations: HashMap<String, f64>,
}

impl PlanDag {
    pub fn build(tree: &TaskTree, dependencies: &DependencyGraph) -> Self {
        let mut graph: DiGraph<String, ()> = DiGraph::new();
        let mut id_to_index: HashMap<String, NodeIndex> = HashMap::new();
        let mut durations: HashMap<String, f64> = HashMap::new();

        // Add nodes first
        for task in tree.flatten() {
            let node_ix = graph.add_node(task.id.clone());
            id_to_index.insert(task.id.clone(), node_ix);
            durations.insert(task.id.clone(), task_duration(task));
        }

        // Add edges: pred -> task, skipping ids outside the tree
        for task in tree.flatten() {
            for pred_id in dependencies.predecessors_of(&task.id) {
                if let (Some(&u), Some(&v)) =
                    (id_to_index.get(pred_id), id_to_index.get(&task.id))
                {
                    graph.add_edge(u, v, ());
                }
            }
        }

        Self {
            graph,
            id_to_index,
            durations,
        }
    }

    pub fn duration(&self, node_ix: NodeIndex) -> f64 {
        self.durations
            .get(&self.graph[node_ix])
            .copied()
            .unwrap_or(1.0)
    }
}

/// Days a task takes for critical-path purposes: positive effort, else the
/// inclusive span of its stored dates, else one day.
pub fn task_duration(task: &Task) -> f64 {
    if let Some(effort) = task.positive_effort() {
        return effort;
    }
    match (task.start_date, task.end_date) {
        (Some(start), Some(end)) => dates::inclusive_day_count(start, end).max(1) as f64,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::task::{ChildSide, Edge, ROOT_ID};
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn durations_prefer_effort_then_dates() {
        assert_eq!(task_duration(&Task::new("a", "A").with_effort(4.0)), 4.0);
        assert_eq!(
            task_duration(&Task::new("b", "B").with_dates(Some(d(2024, 1, 1)), Some(d(2024, 1, 3)))),
            3.0
        );
        assert_eq!(
            task_duration(
                &Task::new("c", "C")
                    .with_effort(0.0)
                    .with_dates(Some(d(2024, 1, 5)), Some(d(2024, 1, 1)))
            ),
            1.0
        );
        assert_eq!(task_duration(&Task::new("e", "E")), 1.0);
    }

    #[test]
    fn foreign_edges_do_not_enter_the_dag() {
        let mut tree = TaskTree::with_root("Goal");
        tree.add_child(ROOT_ID, Task::new("a", "A").with_side(ChildSide::Before))
            .unwrap();
        let edges = vec![Edge::new("conn-1", "999", "a")];
        let deps = build_graph(&tree, &edges);
        let dag = PlanDag::build(&tree, &deps);
        assert_eq!(dag.graph.node_count(), 2);
        assert_eq!(dag.graph.edge_count(), 1);
        assert_eq!(dag.graph[dag.id_to_index["root"]], "root");
    }
}
