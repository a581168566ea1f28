use chrono::NaiveDate;
use taskplan::{ChildSide, Plan, PlanError, ROOT_ID, TreeError, build_graph};

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn deleting_a_subtree_drops_its_edges() {
    let mut plan = Plan::new("Launch");
    let a = plan.add_task(ROOT_ID, "A", None).unwrap();
    let a1 = plan.add_task(&a, "A1", None).unwrap();
    let b = plan.add_task(ROOT_ID, "B", None).unwrap();
    let c = plan.add_task(ROOT_ID, "C", None).unwrap();
    plan.add_edge(&a1, &b).unwrap();
    plan.add_edge(&b, &c).unwrap();

    let removed = plan.delete_task(&a).unwrap();

    assert_eq!(removed, vec![a.clone(), a1.clone()]);
    assert_eq!(plan.edges().len(), 1);
    assert_eq!(plan.edges()[0].from_id, b);
    assert!(plan.task(&a1).is_none());
}

#[test]
fn root_cannot_be_deleted_moved_or_detached() {
    let mut plan = Plan::new("Launch");
    let a = plan.add_task(ROOT_ID, "A", None).unwrap();

    assert_eq!(
        plan.delete_task(ROOT_ID),
        Err(PlanError::Tree(TreeError::RootImmutable("deleted")))
    );
    assert!(matches!(
        plan.move_task(ROOT_ID, &a),
        Err(PlanError::Tree(TreeError::RootImmutable(_)))
    ));
    assert!(plan.detach_task(ROOT_ID).is_err());
}

#[test]
fn move_rejects_descendant_targets() {
    let mut plan = Plan::new("Launch");
    let a = plan.add_task(ROOT_ID, "A", None).unwrap();
    let a1 = plan.add_task(&a, "A1", None).unwrap();
    let b = plan.add_task(ROOT_ID, "B", None).unwrap();

    assert!(matches!(
        plan.move_task(&a, &a1),
        Err(PlanError::Tree(TreeError::MoveIntoSubtree { .. }))
    ));
    plan.move_task(&a, &b).unwrap();
    assert_eq!(plan.tree().parent_of(&a), Some(b.as_str()));
    assert_eq!(plan.tree().parent_of(&a1), Some(a.as_str()));
}

#[test]
fn detached_task_becomes_follow_up_of_root() {
    let mut plan = Plan::new("Launch");
    let a = plan.add_task(ROOT_ID, "A", Some(ChildSide::Before)).unwrap();
    let a1 = plan.add_task(&a, "A1", None).unwrap();
    let a2 = plan.add_task(&a, "A2", Some(ChildSide::Before)).unwrap();

    plan.detach_task(&a1).unwrap();
    plan.detach_task(&a2).unwrap();

    assert_eq!(plan.tree().parent_of(&a1), Some(ROOT_ID));
    assert_eq!(plan.task(&a1).unwrap().side, Some(ChildSide::After));
    assert_eq!(plan.task(&a2).unwrap().side, Some(ChildSide::Before));
    let graph = build_graph(plan.tree(), plan.edges());
    assert!(graph.contains_dependency(ROOT_ID, &a1));
    assert!(graph.contains_dependency(&a2, ROOT_ID));
}

#[test]
fn side_change_flips_the_dependency() {
    let mut plan = Plan::new("Launch");
    let a = plan.add_task(ROOT_ID, "A", None).unwrap();
    assert!(plan.dependency_graph().contains_dependency(ROOT_ID, &a));

    plan.update_task(&a, |task| task.side = Some(ChildSide::Before))
        .unwrap();

    let graph = plan.dependency_graph();
    assert!(graph.contains_dependency(&a, ROOT_ID));
    assert!(!graph.contains_dependency(ROOT_ID, &a));
}

#[test]
fn edge_ids_skip_ids_in_use() {
    let mut plan = Plan::new("Launch");
    let a = plan.add_task(ROOT_ID, "A", None).unwrap();
    let b = plan.add_task(ROOT_ID, "B", None).unwrap();
    let c = plan.add_task(ROOT_ID, "C", None).unwrap();
    let first = plan.add_edge(&a, &b).unwrap();
    let second = plan.add_edge(&b, &c).unwrap();
    plan.remove_edge(&first).unwrap();

    let third = plan.add_edge(&a, &c).unwrap();

    assert_ne!(third, second);
    assert_eq!(plan.edges().len(), 2);
}

#[test]
fn apply_schedule_updates_the_plan_in_place() {
    let mut plan = Plan::new("Launch");
    plan.update_task(ROOT_ID, |task| task.end_date = Some(d(2024, 1, 10)))
        .unwrap();
    let b = plan.add_task(ROOT_ID, "B", Some(ChildSide::Before)).unwrap();
    let a = plan.add_task(&b, "A", Some(ChildSide::Before)).unwrap();
    plan.update_task(&b, |task| task.effort = Some(3.0)).unwrap();
    plan.update_task(&a, |task| task.effort = Some(2.0)).unwrap();

    plan.apply_schedule(d(2024, 1, 1));

    let b_task = plan.task(&b).unwrap();
    assert_eq!(b_task.start_date, Some(d(2024, 1, 7)));
    assert_eq!(b_task.end_date, Some(d(2024, 1, 9)));
    let a_task = plan.task(&a).unwrap();
    assert_eq!(a_task.start_date, Some(d(2024, 1, 5)));
    assert_eq!(a_task.end_date, Some(d(2024, 1, 6)));
}
