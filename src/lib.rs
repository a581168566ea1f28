pub mod calculations;
pub mod config;
pub mod dates;
pub mod error;
pub mod graph;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod persistence;
pub mod plan;
pub mod registration;
pub mod task;
pub mod tree;

pub use calculations::{
    CriticalPathAnalysis, ScheduledDates, TaskTiming, calculate_critical_path, calculate_schedule,
    calculate_schedule_as_of,
};
pub use config::{ConfigError, PlannerConfig};
pub use error::{PlanError, TreeError};
pub use graph::{DependencyGraph, build_graph};
pub use persistence::{
    JsonFileStore, PersistenceError, PlanStore, export_schedule_to_csv, load_plan_from_json,
    save_plan_to_json,
};
pub use plan::{Plan, PlanDocument};
pub use registration::{
    RegistrationPayload, RegistrationResult, RegistrationSettings, RegistrationTask, RelationMode,
    RootHandling, build_registration_payload,
};
pub use task::{ChildSide, Edge, ROOT_ID, Task, TaskNode};
pub use tree::TaskTree;
