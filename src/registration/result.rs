use serde::{Deserialize, Serialize};

/// How many created ticket ids a result keeps as a sample.
pub const SUCCESS_SAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub task_id: String,
    pub reason: String,
}

/// Tracker response to a registration payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResult {
    #[serde(default)]
    pub success_count: usize,
    #[serde(default)]
    pub success_sample_ids: Vec<u64>,
    #[serde(default)]
    pub failures: Vec<TaskOutcome>,
    #[serde(default)]
    pub warnings: Vec<TaskOutcome>,
}

impl RegistrationResult {
    pub fn add_success(&mut self, issue_id: u64) {
        self.success_count += 1;
        if self.success_sample_ids.len() < SUCCESS_SAMPLE_LIMIT {
            self.success_sample_ids.push(issue_id);
        }
    }

    pub fn add_failure(&mut self, task_id: impl Into<String>, reason: impl Into<String>) {
        self.failures.push(TaskOutcome {
            task_id: task_id.into(),
            reason: reason.into(),
        });
    }

    pub fn add_warning(&mut self, task_id: impl Into<String>, reason: impl Into<String>) {
        self.warnings.push(TaskOutcome {
            task_id: task_id.into(),
            reason: reason.into(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = vec![format!("created={}", self.success_count)];
        if !self.success_sample_ids.is_empty() {
            let sample = self
                .success_sample_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("sample={sample}"));
        }
        if !self.failures.is_empty() {
            parts.push(format!("failed={}", self.failures.len()));
        }
        if !self.warnings.is_empty() {
            parts.push(format!("warnings={}", self.warnings.len()));
        }
        parts.join(", ")
    }
}
