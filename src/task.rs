use crate::dates;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reserved identifier of the root task in editor-created trees.
pub const ROOT_ID: &str = "root";

/// How a child relates to its parent for scheduling purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildSide {
    /// Prerequisite: the child finishes before the parent starts.
    #[serde(alias = "left")]
    Before,
    /// Follow-up or elaboration: the child starts after the parent.
    #[serde(alias = "right")]
    After,
}

impl ChildSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChildSide::Before => "before",
            ChildSide::After => "after",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "before" | "left" => Some(ChildSide::Before),
            "after" | "right" => Some(ChildSide::After),
            _ => None,
        }
    }
}

/// A single task without its children.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub effort: Option<f64>,
    pub side: Option<ChildSide>,
}

impl Task {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            start_date: None,
            end_date: None,
            effort: None,
            side: None,
        }
    }

    pub fn with_effort(mut self, effort: f64) -> Self {
        self.effort = Some(effort);
        self
    }

    pub fn with_side(mut self, side: ChildSide) -> Self {
        self.side = Some(side);
        self
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Side tag with the default applied.
    pub fn effective_side(&self) -> ChildSide {
        self.side.unwrap_or(ChildSide::After)
    }

    /// Positive effort, if any.
    pub fn positive_effort(&self) -> Option<f64> {
        self.effort.filter(|e| e.is_finite() && *e > 0.0)
    }
}

/// Nested document form of a task tree, as exchanged with the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNode {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(
        default,
        deserialize_with = "dates::deserialize_lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "dates::deserialize_lenient_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "dates::deserialize_lenient_effort",
        skip_serializing_if = "Option::is_none"
    )]
    pub effort: Option<f64>,
    #[serde(default)]
    pub children: Vec<TaskNode>,
    #[serde(default, alias = "direction", skip_serializing_if = "Option::is_none")]
    pub side: Option<ChildSide>,
}

impl TaskNode {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::from_task(Task::new(id, text), Vec::new())
    }

    pub fn from_task(task: Task, children: Vec<TaskNode>) -> Self {
        Self {
            id: task.id,
            text: task.text,
            start_date: task.start_date,
            end_date: task.end_date,
            effort: task.effort,
            children,
            side: task.side,
        }
    }

    pub fn to_task(&self) -> Task {
        Task {
            id: self.id.clone(),
            text: self.text.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            effort: self.effort,
            side: self.side,
        }
    }

    pub fn with_child(mut self, child: TaskNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Explicit dependency: `from_id` must complete before `to_id` starts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub from_id: String,
    pub to_id: String,
}

impl Edge {
    pub fn new(id: impl Into<String>, from_id: impl Into<String>, to_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from_id: from_id.into(),
            to_id: to_id.into(),
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from_id == self.to_id
    }

    /// True when both edges join the same two tasks, in either direction.
    pub fn joins_same_pair(&self, from_id: &str, to_id: &str) -> bool {
        (self.from_id == from_id && self.to_id == to_id)
            || (self.from_id == to_id && self.to_id == from_id)
    }
}
