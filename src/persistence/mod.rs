use crate::plan::{Plan, PlanDocument};
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Somewhere a plan can be kept between sessions.
pub trait PlanStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()>;
    fn load_plan(&self) -> PersistenceResult<Option<Plan>>;
}

/// Structural checks a stored document must pass before it becomes a plan.
/// Edge endpoints are not checked; unknown ids are tolerated downstream.
pub fn validate_document(document: &PlanDocument) -> PersistenceResult<()> {
    if document.data.id.trim().is_empty() {
        return Err(PersistenceError::InvalidData("root task has no id".into()));
    }
    let mut edge_ids = HashSet::new();
    for edge in &document.connections {
        if edge.id.trim().is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "connection {} -> {} has no id",
                edge.from_id, edge.to_id
            )));
        }
        if !edge_ids.insert(edge.id.as_str()) {
            return Err(PersistenceError::InvalidData(format!(
                "connection id {} used more than once",
                edge.id
            )));
        }
    }
    Ok(())
}

pub mod file;

pub use file::{
    JsonFileStore, ScheduleCsvRecord, export_schedule_to_csv, load_plan_from_json,
    save_plan_to_json, write_schedule_csv,
};
