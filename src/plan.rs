use crate::calculations::{CriticalPathAnalysis, calculate_critical_path, calculate_schedule_as_of};
use crate::error::{PlanError, TreeError};
use crate::graph::{DependencyGraph, build_graph};
use crate::registration::{RegistrationPayload, RegistrationSettings, build_registration_payload};
use crate::task::{ChildSide, Edge, Task, TaskNode};
use crate::tree::TaskTree;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Editor document: the nested tree plus its explicit connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub data: TaskNode,
    #[serde(default)]
    pub connections: Vec<Edge>,
}

/// A task tree together with the explicit edges between its tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    tree: TaskTree,
    edges: Vec<Edge>,
}

impl Plan {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            tree: TaskTree::with_root(goal),
            edges: Vec::new(),
        }
    }

    pub fn from_parts(tree: TaskTree, edges: Vec<Edge>) -> Self {
        Self { tree, edges }
    }

    pub fn from_document(document: &PlanDocument) -> Self {
        Self {
            tree: TaskTree::from_node(&document.data),
            edges: document.connections.clone(),
        }
    }

    pub fn to_document(&self) -> PlanDocument {
        PlanDocument {
            data: self.tree.to_node(),
            connections: self.edges.clone(),
        }
    }

    pub fn tree(&self) -> &TaskTree {
        &self.tree
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tree.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Add a task under `parent_id` and return its generated id.
    pub fn add_task(
        &mut self,
        parent_id: &str,
        text: impl Into<String>,
        side: Option<ChildSide>,
    ) -> Result<String, PlanError> {
        if !self.tree.contains(parent_id) {
            return Err(TreeError::UnknownTask(parent_id.to_string()).into());
        }
        let id = self.next_task_id();
        let mut task = Task::new(id.clone(), text);
        task.side = side;
        self.tree.add_child(parent_id, task)?;
        Ok(id)
    }

    pub fn update_task<F>(&mut self, id: &str, mutator: F) -> Result<(), PlanError>
    where
        F: FnOnce(&mut Task),
    {
        self.tree.update(id, mutator)?;
        Ok(())
    }

    /// Delete a task with its subtree and every edge touching a removed task.
    pub fn delete_task(&mut self, id: &str) -> Result<Vec<String>, PlanError> {
        let removed = self.tree.remove(id)?;
        let gone: HashSet<&str> = removed.iter().map(String::as_str).collect();
        let before = self.edges.len();
        self.edges
            .retain(|edge| !gone.contains(edge.from_id.as_str()) && !gone.contains(edge.to_id.as_str()));
        if self.edges.len() < before {
            log::debug!(
                "dropped {} edges attached to deleted task {id}",
                before - self.edges.len()
            );
        }
        Ok(removed)
    }

    pub fn move_task(&mut self, id: &str, new_parent: &str) -> Result<(), PlanError> {
        self.tree.move_node(id, new_parent)?;
        Ok(())
    }

    pub fn detach_task(&mut self, id: &str) -> Result<(), PlanError> {
        self.tree.detach(id)?;
        Ok(())
    }

    /// Add an explicit dependency and return its generated id.
    pub fn add_edge(&mut self, from_id: &str, to_id: &str) -> Result<String, PlanError> {
        if from_id == to_id {
            return Err(PlanError::SelfLoop(from_id.to_string()));
        }
        for endpoint in [from_id, to_id] {
            if !self.tree.contains(endpoint) {
                return Err(PlanError::UnknownEndpoint(endpoint.to_string()));
            }
        }
        if self.edges.iter().any(|edge| edge.joins_same_pair(from_id, to_id)) {
            return Err(PlanError::DuplicateEdge {
                from_id: from_id.to_string(),
                to_id: to_id.to_string(),
            });
        }
        let id = self.next_edge_id();
        self.edges.push(Edge::new(id.clone(), from_id, to_id));
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, PlanError> {
        let position = self
            .edges
            .iter()
            .position(|edge| edge.id == id)
            .ok_or_else(|| PlanError::UnknownEdge(id.to_string()))?;
        Ok(self.edges.remove(position))
    }

    pub fn dependency_graph(&self) -> DependencyGraph {
        build_graph(&self.tree, &self.edges)
    }

    /// Recompute every task's dates in place.
    pub fn apply_schedule(&mut self, today: NaiveDate) {
        self.tree = calculate_schedule_as_of(&self.tree, &self.edges, today);
    }

    pub fn critical_path(&self) -> CriticalPathAnalysis {
        calculate_critical_path(&self.tree, &self.edges)
    }

    pub fn registration_payload(
        &self,
        settings: &RegistrationSettings,
    ) -> Result<RegistrationPayload, PlanError> {
        let graph = self.dependency_graph();
        let payload = build_registration_payload(
            &self.tree.flatten(),
            &self.tree.parent_map(),
            &graph,
            self.tree.root_id(),
            settings,
        );
        if payload.is_empty() {
            return Err(PlanError::NothingToRegister);
        }
        Ok(payload)
    }

    fn next_task_id(&self) -> String {
        let mut n = self.tree.len();
        loop {
            let candidate = format!("task-{n}");
            if !self.tree.contains(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn next_edge_id(&self) -> String {
        let mut n = self.edges.len() + 1;
        loop {
            let candidate = format!("conn-{n}");
            if self.edge(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Plan::new("Goal")
    }
}

impl From<PlanDocument> for Plan {
    fn from(document: PlanDocument) -> Self {
        Plan::from_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::ROOT_ID;

    #[test]
    fn generated_ids_are_sequential() {
        let mut plan = Plan::new("Launch");
        let a = plan.add_task(ROOT_ID, "Design", None).unwrap();
        let b = plan.add_task(ROOT_ID, "Build", None).unwrap();
        assert_eq!(a, "task-1");
        assert_eq!(b, "task-2");
        assert_eq!(plan.add_edge(&a, &b).unwrap(), "conn-1");
    }

    #[test]
    fn edge_validation() {
        let mut plan = Plan::new("Launch");
        let a = plan.add_task(ROOT_ID, "Design", None).unwrap();
        let b = plan.add_task(ROOT_ID, "Build", None).unwrap();
        assert_eq!(plan.add_edge(&a, &a), Err(PlanError::SelfLoop(a.clone())));
        assert_eq!(
            plan.add_edge(&a, "ghost"),
            Err(PlanError::UnknownEndpoint("ghost".into()))
        );
        plan.add_edge(&a, &b).unwrap();
        assert!(matches!(
            plan.add_edge(&b, &a),
            Err(PlanError::DuplicateEdge { .. })
        ));
        assert_eq!(
            plan.remove_edge("conn-9"),
            Err(PlanError::UnknownEdge("conn-9".into()))
        );
    }

    #[test]
    fn document_round_trip() {
        let mut plan = Plan::new("Launch");
        let a = plan.add_task(ROOT_ID, "Design", Some(ChildSide::Before)).unwrap();
        let b = plan.add_task(ROOT_ID, "Build", None).unwrap();
        plan.add_edge(&a, &b).unwrap();
        let json = serde_json::to_string(&plan.to_document()).unwrap();
        let document: PlanDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(Plan::from(document), plan);
    }
}
