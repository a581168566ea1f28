use chrono::NaiveDate;
use taskplan::{
    ChildSide, Edge, Plan, PlanError, ROOT_ID, RegistrationPayload, RegistrationSettings,
    RelationMode, Task, TaskTree,
};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sample_plan() -> Plan {
    let mut tree = TaskTree::with_root("Launch");
    tree.add_child(
        ROOT_ID,
        Task::new("design", "Design")
            .with_effort(2.0)
            .with_side(ChildSide::Before)
            .with_dates(Some(d(2024, 3, 1)), Some(d(2024, 3, 2))),
    )
    .unwrap();
    tree.add_child(
        "design",
        Task::new("research", "Research").with_side(ChildSide::Before),
    )
    .unwrap();
    tree.add_child(ROOT_ID, Task::new("build", "Build")).unwrap();
    tree.add_child("build", Task::new("qa", "QA").with_side(ChildSide::After))
        .unwrap();
    let edges = vec![
        Edge::new("conn-1", "design", "build"),
        Edge::new("conn-2", "9001", "build"),
    ];
    Plan::from_parts(tree, edges)
}

fn deps(payload: &RegistrationPayload, id: &str) -> Vec<String> {
    payload.task(id).unwrap().dependencies.clone()
}

#[test]
fn child_mode_keeps_only_cross_tree_dependencies() {
    let payload = sample_plan()
        .registration_payload(&RegistrationSettings::default())
        .unwrap();

    assert!(payload.task(ROOT_ID).is_none());
    assert_eq!(payload.len(), 4);
    assert_eq!(payload.task("design").unwrap().parent_task_id, None);
    assert!(deps(&payload, "design").is_empty());
    assert_eq!(
        payload.task("research").unwrap().parent_task_id.as_deref(),
        Some("design")
    );
    assert_eq!(deps(&payload, "build"), vec!["9001", "design"]);
    assert_eq!(payload.task("qa").unwrap().parent_task_id.as_deref(), Some("build"));
    assert!(deps(&payload, "qa").is_empty());
}

#[test]
fn dependency_mode_folds_hierarchy_into_predecessors() {
    let settings = RegistrationSettings {
        relation_mode: RelationMode::Dependency,
        existing_root_issue_id: Some("500".into()),
        ..Default::default()
    };
    let payload = sample_plan().registration_payload(&settings).unwrap();

    assert_eq!(payload.existing_root_issue_id.as_deref(), Some("500"));
    assert!(payload.tasks.iter().all(|task| task.parent_task_id.is_none()));
    assert_eq!(deps(&payload, "design"), vec!["research"]);
    assert_eq!(deps(&payload, "build"), vec!["500", "9001", "design"]);
    assert_eq!(deps(&payload, "qa"), vec!["build"]);
    assert!(deps(&payload, "research").is_empty());
}

#[test]
fn dependency_mode_without_root_drops_root_references() {
    let settings = RegistrationSettings {
        relation_mode: RelationMode::Dependency,
        ..Default::default()
    };
    let payload = sample_plan().registration_payload(&settings).unwrap();

    assert_eq!(deps(&payload, "build"), vec!["9001", "design"]);
}

#[test]
fn created_root_is_registered_first() {
    let settings = RegistrationSettings {
        create_root_issue: true,
        tracker_id: Some("2".into()),
        ..Default::default()
    };
    let payload = sample_plan().registration_payload(&settings).unwrap();

    assert_eq!(payload.tasks[0].id, ROOT_ID);
    assert_eq!(payload.tasks[0].subject, "Launch");
    assert!(payload.tasks[0].dependencies.is_empty());
    assert_eq!(payload.task("build").unwrap().parent_task_id.as_deref(), Some(ROOT_ID));
    assert_eq!(payload.tracker_id.as_deref(), Some("2"));
}

#[test]
fn task_fields_are_carried_over() {
    let payload = sample_plan()
        .registration_payload(&RegistrationSettings::default())
        .unwrap();
    let design = payload.task("design").unwrap();

    assert_eq!(design.subject, "Design");
    assert_eq!(design.start_date, Some(d(2024, 3, 1)));
    assert_eq!(design.due_date, Some(d(2024, 3, 2)));
    assert_eq!(design.man_days, Some(2.0));

    let json = serde_json::to_value(&payload).unwrap();
    let design_json = &json["tasks"][0];
    assert_eq!(design_json["start_date"], "2024-03-01");
    assert!(design_json.get("dependencies").is_none());
    assert_eq!(json["relation_mode"], "child");
}

#[test]
fn lone_root_has_nothing_to_register() {
    let plan = Plan::new("Empty");

    assert_eq!(
        plan.registration_payload(&RegistrationSettings::default()),
        Err(PlanError::NothingToRegister)
    );
    let settings = RegistrationSettings {
        create_root_issue: true,
        ..Default::default()
    };
    assert_eq!(plan.registration_payload(&settings).unwrap().len(), 1);
}
