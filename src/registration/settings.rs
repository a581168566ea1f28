use serde::{Deserialize, Serialize};

/// How the tree hierarchy is expressed on the tracker side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationMode {
    /// Parent/child tickets; hierarchy carried by `parent_task_id`.
    #[default]
    Child,
    /// Flat tickets; hierarchy folded into precedes/follows dependencies.
    Dependency,
}

impl RelationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationMode::Child => "child",
            RelationMode::Dependency => "dependency",
        }
    }

    pub fn from_str(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "child" | "hierarchy" => Some(RelationMode::Child),
            "dependency" | "dependencies" => Some(RelationMode::Dependency),
            _ => None,
        }
    }
}

/// What happens to the root task when exporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootHandling {
    /// The root is created as a ticket like any other task.
    Create,
    /// The root maps to a ticket that already exists in the tracker.
    Existing(String),
    /// The root is left out and references to it are dropped.
    Omit,
}

/// Caller-supplied export settings. Tracker defaults are passed through
/// untouched; resolving them is the tracker's business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSettings {
    #[serde(default)]
    pub relation_mode: RelationMode,
    #[serde(default)]
    pub create_root_issue: bool,
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
}

impl RegistrationSettings {
    pub fn root_handling(&self) -> RootHandling {
        if self.create_root_issue {
            return RootHandling::Create;
        }
        match self.existing_root_issue_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => RootHandling::Existing(id.to_string()),
            _ => RootHandling::Omit,
        }
    }
}
