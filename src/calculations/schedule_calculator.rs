use crate::dates;
use crate::graph::{DependencyGraph, build_graph};
use crate::task::Edge;
use crate::tree::TaskTree;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Resolved calendar window of one task (both ends inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDates {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Backward date propagation from the root's end date.
///
/// Every task ends the day before the earliest start among the tasks that
/// depend on it, and starts `effort - 1` days before its end.
pub struct ScheduleCalculator<'a> {
    tree: &'a TaskTree,
    graph: DependencyGraph,
    today: NaiveDate,
}

enum Visit<'g> {
    Enter(&'g str),
    Exit(&'g str),
}

impl<'a> ScheduleCalculator<'a> {
    pub fn new(tree: &'a TaskTree, edges: &[Edge], today: NaiveDate) -> Self {
        Self {
            tree,
            graph: build_graph(tree, edges),
            today,
        }
    }

    pub fn execute(&self) -> HashMap<String, ScheduledDates> {
        let mut resolved: HashMap<String, ScheduledDates> = HashMap::with_capacity(self.tree.len());
        let mut in_progress: HashSet<&str> = HashSet::new();

        let order = self.tree.ids();
        for id in &order {
            if resolved.contains_key(id.as_str()) {
                continue;
            }
            let mut stack = vec![Visit::Enter(id.as_str())];
            while let Some(visit) = stack.pop() {
                match visit {
                    Visit::Enter(current) => {
                        if resolved.contains_key(current) || in_progress.contains(current) {
                            continue;
                        }
                        in_progress.insert(current);
                        stack.push(Visit::Exit(current));
                        if current == self.tree.root_id() {
                            continue;
                        }
                        let dependents: Vec<&str> = self
                            .graph
                            .successors_of(current)
                            .filter(|dep| self.tree.contains(dep))
                            .collect();
                        for dependent in dependents.into_iter().rev() {
                            if !resolved.contains_key(dependent) && !in_progress.contains(dependent) {
                                stack.push(Visit::Enter(dependent));
                            }
                        }
                    }
                    Visit::Exit(current) => {
                        let dates = self.resolve_from(current, &resolved);
                        in_progress.remove(current);
                        resolved.insert(current.to_string(), dates);
                    }
                }
            }
        }
        resolved
    }

    /// Dates for one task once every reachable dependent has been settled.
    /// Dependents still in progress (a cycle back to this task) are skipped.
    fn resolve_from(&self, id: &str, resolved: &HashMap<String, ScheduledDates>) -> ScheduledDates {
        let Some(task) = self.tree.get(id) else {
            return ScheduledDates {
                start_date: self.today,
                end_date: self.today,
            };
        };

        let mut end_date = None;
        if id != self.tree.root_id() {
            let earliest_next_start = self
                .graph
                .successors_of(id)
                .filter_map(|dep| resolved.get(dep))
                .map(|dates| dates.start_date)
                .min();
            end_date = earliest_next_start.map(|start| dates::shift_days(start, -1));
        }
        let end_date = end_date.or(task.end_date).unwrap_or(self.today);
        let start_date = dates::shift_days(end_date, -(dates::span_days(task.effort) - 1));

        ScheduledDates {
            start_date,
            end_date,
        }
    }

    /// New tree carrying the resolved dates; structure is unchanged.
    pub fn apply(&self, results: &HashMap<String, ScheduledDates>) -> TaskTree {
        self.tree.map_tasks(|task| {
            let mut task = task.clone();
            if let Some(dates) = results.get(&task.id) {
                task.start_date = Some(dates.start_date);
                task.end_date = Some(dates.end_date);
            }
            task
        })
    }
}

/// Schedule every task backward from the root, using today's date where no
/// anchor exists.
pub fn calculate_schedule(tree: &TaskTree, edges: &[Edge]) -> TaskTree {
    calculate_schedule_as_of(tree, edges, dates::today())
}

pub fn calculate_schedule_as_of(tree: &TaskTree, edges: &[Edge], today: NaiveDate) -> TaskTree {
    let calculator = ScheduleCalculator::new(tree, edges, today);
    let results = calculator.execute();
    calculator.apply(&results)
}
