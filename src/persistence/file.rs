use super::{PersistenceError, PersistenceResult, PlanStore};
use crate::calculations::{CriticalPathAnalysis, TaskTiming};
use crate::dates;
use crate::graph::DependencyGraph;
use crate::plan::{Plan, PlanDocument};
use crate::task::Task;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub fn save_plan_to_json<P: AsRef<Path>>(plan: &Plan, path: P) -> PersistenceResult<()> {
    let document = plan.to_document();
    super::validate_document(&document)?;
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &document)?;
    Ok(())
}

pub fn load_plan_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Plan> {
    let file = File::open(path)?;
    let document: PlanDocument = serde_json::from_reader(file)?;
    super::validate_document(&document)?;
    Ok(Plan::from_document(&document))
}

/// Plan kept as a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PlanStore for JsonFileStore {
    fn save_plan(&self, plan: &Plan) -> PersistenceResult<()> {
        save_plan_to_json(plan, &self.path)
    }

    fn load_plan(&self) -> PersistenceResult<Option<Plan>> {
        match load_plan_from_json(&self.path) {
            Ok(plan) => Ok(Some(plan)),
            Err(PersistenceError::Io(err)) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// One flat row of the schedule export.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCsvRecord {
    pub id: String,
    pub parent_id: String,
    pub text: String,
    pub side: String,
    pub effort: String,
    pub start_date: String,
    pub end_date: String,
    pub predecessors: String,
    pub successors: String,
    pub earliest_start: String,
    pub earliest_finish: String,
    pub latest_start: String,
    pub latest_finish: String,
    pub slack: String,
    pub is_critical: bool,
}

impl ScheduleCsvRecord {
    fn build(
        task: &Task,
        parent_id: Option<&str>,
        graph: &DependencyGraph,
        analysis: &CriticalPathAnalysis,
    ) -> Self {
        let mut record = ScheduleCsvRecord {
            id: task.id.clone(),
            parent_id: parent_id.unwrap_or_default().to_string(),
            text: task.text.clone(),
            side: task.side.map(|side| side.as_str().to_string()).unwrap_or_default(),
            effort: format_option_f64(task.effort),
            start_date: dates::format_date(task.start_date),
            end_date: dates::format_date(task.end_date),
            predecessors: join_ids(graph.predecessors_of(&task.id)),
            successors: join_ids(graph.successors_of(&task.id)),
            is_critical: analysis.is_critical(&task.id),
            ..Default::default()
        };
        if let Some(timing) = analysis.timing(&task.id) {
            record.fill_timing(timing);
        }
        record
    }

    fn fill_timing(&mut self, timing: &TaskTiming) {
        self.earliest_start = timing.earliest_start.to_string();
        self.earliest_finish = timing.earliest_finish.to_string();
        self.latest_start = timing.latest_start.to_string();
        self.latest_finish = timing.latest_finish.to_string();
        self.slack = timing.slack.to_string();
    }
}

/// Write the flat schedule table (one row per task, tree pre-order).
pub fn write_schedule_csv<W: Write>(
    plan: &Plan,
    analysis: &CriticalPathAnalysis,
    writer: W,
) -> PersistenceResult<()> {
    let graph = plan.dependency_graph();
    let tree = plan.tree();
    let mut writer = csv::Writer::from_writer(writer);
    for task in tree.flatten() {
        let record = ScheduleCsvRecord::build(task, tree.parent_of(&task.id), &graph, analysis);
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn export_schedule_to_csv<P: AsRef<Path>>(
    plan: &Plan,
    analysis: &CriticalPathAnalysis,
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    write_schedule_csv(plan, analysis, file)
}

fn format_option_f64(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn join_ids<'a>(ids: impl Iterator<Item = &'a str>) -> String {
    ids.collect::<Vec<_>>().join(";")
}
