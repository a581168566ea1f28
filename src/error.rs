use thiserror::Error;

/// Errors raised by the tree-editing API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("task {0} not found")]
    UnknownTask(String),

    #[error("task id {0} already exists")]
    DuplicateId(String),

    #[error("the root task cannot be {0}")]
    RootImmutable(&'static str),

    #[error("cannot move task {task} under its own subtree ({target})")]
    MoveIntoSubtree { task: String, target: String },
}

/// Errors raised while editing a plan (tree plus explicit edges).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("a task cannot depend on itself ({0})")]
    SelfLoop(String),

    #[error("tasks {from_id} and {to_id} are already connected")]
    DuplicateEdge { from_id: String, to_id: String },

    #[error("edge endpoint {0} is not part of the plan")]
    UnknownEndpoint(String),

    #[error("edge {0} not found")]
    UnknownEdge(String),

    #[error("no tasks to register")]
    NothingToRegister,
}
