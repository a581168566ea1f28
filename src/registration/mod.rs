//! Translation of a plan into creation requests for an external tracker.

pub mod result;
pub mod settings;

pub use result::{RegistrationResult, SUCCESS_SAMPLE_LIMIT, TaskOutcome};
pub use settings::{RegistrationSettings, RelationMode, RootHandling};

use crate::graph::DependencyGraph;
use crate::task::Task;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

/// One ticket creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationTask {
    pub id: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub man_days: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub relation_mode: RelationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_root_issue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub tasks: Vec<RegistrationTask>,
}

impl RegistrationPayload {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn task(&self, id: &str) -> Option<&RegistrationTask> {
        self.tasks.iter().find(|task| task.id == id)
    }
}

/// Build the creation requests for `tasks` (expected in tree pre-order).
///
/// In child mode the tree relation travels as `parent_task_id` and only the
/// remaining predecessors are listed as dependencies. In dependency mode every
/// predecessor from `graph` is listed, which folds the hierarchy in according
/// to each child's side tag. References to the root follow the settings' root
/// handling.
pub fn build_registration_payload(
    tasks: &[&Task],
    parent_map: &HashMap<String, String>,
    graph: &DependencyGraph,
    root_id: &str,
    settings: &RegistrationSettings,
) -> RegistrationPayload {
    let root_handling = settings.root_handling();
    let resolve = |id: &str| -> Option<String> {
        if id != root_id {
            return Some(id.to_string());
        }
        match &root_handling {
            RootHandling::Create => Some(id.to_string()),
            RootHandling::Existing(external) => Some(external.clone()),
            RootHandling::Omit => None,
        }
    };

    let mut children_of: HashMap<&str, HashSet<&str>> = HashMap::new();
    for (child, parent) in parent_map {
        children_of
            .entry(parent.as_str())
            .or_default()
            .insert(child.as_str());
    }

    let mut out = Vec::with_capacity(tasks.len());
    for task in tasks {
        if task.id == root_id && root_handling != RootHandling::Create {
            continue;
        }
        let parent = parent_map.get(&task.id).map(String::as_str);

        let dependencies: BTreeSet<String> = match settings.relation_mode {
            RelationMode::Child => {
                let children = children_of.get(task.id.as_str());
                graph
                    .predecessors_of(&task.id)
                    .filter(|pred| Some(*pred) != parent)
                    .filter(|pred| !children.is_some_and(|set| set.contains(pred)))
                    .filter_map(|pred| resolve(pred))
                    .collect()
            }
            RelationMode::Dependency => graph
                .predecessors_of(&task.id)
                .filter_map(|pred| resolve(pred))
                .collect(),
        };

        let parent_task_id = match settings.relation_mode {
            RelationMode::Child => parent.and_then(|parent| resolve(parent)),
            RelationMode::Dependency => None,
        };

        out.push(RegistrationTask {
            id: task.id.clone(),
            subject: task.text.clone(),
            start_date: task.start_date,
            due_date: task.end_date,
            man_days: task.positive_effort(),
            dependencies: dependencies.into_iter().collect(),
            parent_task_id,
        });
    }

    log::debug!(
        "built registration payload: {} tasks, mode {}",
        out.len(),
        settings.relation_mode.as_str()
    );

    RegistrationPayload {
        relation_mode: settings.relation_mode,
        existing_root_issue_id: match root_handling {
            RootHandling::Existing(id) => Some(id),
            _ => None,
        },
        tracker_id: settings.tracker_id.clone(),
        assigned_to_id: settings.assigned_to_id.clone(),
        status_id: settings.status_id.clone(),
        priority_id: settings.priority_id.clone(),
        category_id: settings.category_id.clone(),
        tasks: out,
    }
}
