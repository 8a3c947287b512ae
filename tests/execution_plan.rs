mod common;

use common::*;
use pybuild::errors::BuildError;
use pybuild::execution::{ExecutionManager, Exclusions};
use pybuild::registry::TaskDependency;

#[test]
fn linear_dependency_orders_dependency_first() {
    init_tracing();
    let rec = Recorder::new();
    let manager = resolved_manager(
        vec![
            TaskBuilder::new("alpha").build(&rec),
            TaskBuilder::new("beta").depends_on("alpha").build(&rec),
        ],
        vec![],
        Exclusions::default(),
    );

    let plan = manager.build_execution_plan(&["beta"]).unwrap();
    assert_eq!(names(&plan), vec!["alpha", "beta"]);

    let plan = manager.build_execution_plan(&["alpha"]).unwrap();
    assert_eq!(names(&plan), vec!["alpha"]);
}

#[test]
fn plan_has_no_duplicates_and_keeps_request_order() {
    let rec = Recorder::new();
    let manager = resolved_manager(
        vec![
            TaskBuilder::new("base").build(&rec),
            TaskBuilder::new("left").depends_on("base").build(&rec),
            TaskBuilder::new("right").depends_on("base").build(&rec),
            TaskBuilder::new("top").depends_on("left").depends_on("right").build(&rec),
        ],
        vec![],
        Exclusions::default(),
    );

    let plan = manager.build_execution_plan(&["top", "base"]).unwrap();
    assert_eq!(names(&plan), vec!["base", "left", "right", "top"]);

    let plan = manager.build_execution_plan(&["right", "left"]).unwrap();
    assert_eq!(names(&plan), vec!["base", "right", "left"]);
}

#[test]
fn exclude_all_optional_drops_optional_edges() {
    let rec = Recorder::new();
    let exclusions = Exclusions {
        exclude_all_optional: true,
        ..Exclusions::default()
    };
    let manager = resolved_manager(
        vec![
            TaskBuilder::new("alpha").build(&rec),
            TaskBuilder::new("beta").depends_on_optional("alpha").build(&rec),
        ],
        vec![],
        exclusions,
    );

    let plan = manager.build_execution_plan(&["beta"]).unwrap();
    assert_eq!(names(&plan), vec!["beta"]);
}

#[test]
fn optional_exclusion_of_required_dependency_fails() {
    let rec = Recorder::new();
    let exclusions = Exclusions {
        exclude_optional_tasks: vec!["alpha".into()],
        ..Exclusions::default()
    };
    let manager = resolved_manager(
        vec![
            TaskBuilder::new("alpha").build(&rec),
            TaskBuilder::new("beta").depends_on_optional("alpha").build(&rec),
            TaskBuilder::new("gamma").depends_on("alpha").build(&rec),
        ],
        vec![],
        exclusions,
    );

    let plan = manager.build_execution_plan(&["beta"]).unwrap();
    assert_eq!(names(&plan), vec!["beta"]);

    let err = manager.build_execution_plan(&["gamma"]).unwrap_err();
    match err {
        BuildError::RequiredTaskExclusion { task, dependency } => {
            assert_eq!(task, "gamma");
            assert_eq!(dependency, "alpha");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn exclude_tasks_drops_required_edges_too() {
    let rec = Recorder::new();
    let exclusions = Exclusions {
        exclude_tasks: vec!["alpha".into()],
        ..Exclusions::default()
    };
    let manager = resolved_manager(
        vec![
            TaskBuilder::new("alpha").build(&rec),
            TaskBuilder::new("beta").depends_on("alpha").build(&rec),
        ],
        vec![],
        exclusions,
    );

    let plan = manager.build_execution_plan(&["beta"]).unwrap();
    assert_eq!(names(&plan), vec!["beta"]);
}

#[test]
fn cycle_is_reported_with_every_member() {
    let rec = Recorder::new();
    let manager = resolved_manager(
        vec![
            TaskBuilder::new("aa").depends_on("bb").build(&rec),
            TaskBuilder::new("bb").depends_on("cc").build(&rec),
            TaskBuilder::new("cc").depends_on("aa").build(&rec),
        ],
        vec![],
        Exclusions::default(),
    );

    let err = manager.build_execution_plan(&["aa"]).unwrap_err();
    match err {
        BuildError::CircularTaskDependency { cycles, .. } => {
            assert_eq!(cycles.len(), 1);
            let mut members = cycles[0].clone();
            members.sort();
            assert_eq!(members, vec!["aa", "bb", "cc"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn cycle_through_excluded_optional_edge_is_still_reported() {
    let rec = Recorder::new();
    let exclusions = Exclusions {
        exclude_all_optional: true,
        ..Exclusions::default()
    };
    let manager = resolved_manager(
        vec![
            TaskBuilder::new("aa").depends_on_optional("bb").build(&rec),
            TaskBuilder::new("bb").depends_on("aa").build(&rec),
        ],
        vec![],
        exclusions,
    );

    let err = manager.build_execution_plan(&["aa"]).unwrap_err();
    assert!(matches!(err, BuildError::CircularTaskDependency { .. }));
}

#[test]
fn missing_dependency_fails_resolution() {
    let rec = Recorder::new();
    let mut manager = ExecutionManager::new();
    manager.register_task(TaskBuilder::new("beta").depends_on("ghost").build(&rec));

    let err = manager.resolve_dependencies(Exclusions::default()).unwrap_err();
    match err {
        BuildError::MissingTaskDependency { task, dependency } => {
            assert_eq!(task, "beta");
            assert_eq!(dependency, "ghost");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn action_on_unknown_task_fails_resolution() {
    let rec = Recorder::new();
    let mut manager = ExecutionManager::new();
    manager.register_task(TaskBuilder::new("beta").build(&rec));
    manager.register_action(ActionBuilder::new("hook").before("ghost").build(&rec));

    let err = manager.resolve_dependencies(Exclusions::default()).unwrap_err();
    assert!(matches!(
        err,
        BuildError::MissingActionDependency { ref action, ref task } if action == "hook" && task == "ghost"
    ));
}

#[test]
fn planning_before_resolution_fails() {
    let rec = Recorder::new();
    let mut manager = ExecutionManager::new();
    manager.register_task(TaskBuilder::new("beta").build(&rec));

    let err = manager.build_execution_plan(&["beta"]).unwrap_err();
    assert!(matches!(err, BuildError::DependenciesNotResolved));
}

#[test]
fn unknown_requested_task_fails() {
    let rec = Recorder::new();
    let manager = resolved_manager(vec![TaskBuilder::new("beta").build(&rec)], vec![], Exclusions::default());

    let err = manager.build_execution_plan(&["nope"]).unwrap_err();
    assert!(matches!(err, BuildError::NoSuchTask(ref name) if name == "nope"));
}

#[test]
fn required_declaration_wins_over_optional() {
    let rec = Recorder::new();
    let mut manager = ExecutionManager::new();
    manager.register_task(TaskBuilder::new("alpha").build(&rec));
    manager.register_task(TaskBuilder::new("beta").depends_on_optional("alpha").build(&rec));
    manager.register_task(TaskBuilder::new("beta").depends_on("alpha").build(&rec));
    manager.resolve_dependencies(Exclusions::default()).unwrap();

    assert_eq!(
        manager.resolved_dependencies("beta"),
        &[TaskDependency::required("alpha")]
    );
}

#[test]
fn late_dependencies_wait_for_their_target() {
    let rec = Recorder::new();
    let mut manager = ExecutionManager::new();
    manager.register_task(TaskBuilder::new("alpha").build(&rec));
    manager.register_late_task_dependencies(vec![(
        "beta".to_string(),
        vec![TaskDependency::required("alpha")],
    )]);
    assert_eq!(manager.pending_late_dependencies(), vec!["beta"]);

    manager.register_task(TaskBuilder::new("beta").build(&rec));
    assert!(manager.pending_late_dependencies().is_empty());

    manager.resolve_dependencies(Exclusions::default()).unwrap();
    let plan = manager.build_execution_plan(&["beta"]).unwrap();
    assert_eq!(names(&plan), vec!["alpha", "beta"]);
}

#[test]
fn late_dependency_on_never_registered_task_fails() {
    let rec = Recorder::new();
    let mut manager = ExecutionManager::new();
    manager.register_task(TaskBuilder::new("alpha").build(&rec));
    manager.register_late_task_dependencies(vec![(
        "ghost".to_string(),
        vec![TaskDependency::required("alpha")],
    )]);

    let err = manager.resolve_dependencies(Exclusions::default()).unwrap_err();
    assert!(matches!(err, BuildError::NoSuchTask(ref name) if name == "ghost"));
}

#[test]
fn same_name_registrations_merge_bodies() {
    let rec = Recorder::new();
    let mut manager = ExecutionManager::new();
    manager.register_task(TaskBuilder::new("alpha").build(&rec));
    manager.register_task(TaskBuilder::new("alpha").build(&rec));
    manager.resolve_dependencies(Exclusions::default()).unwrap();

    assert_eq!(manager.tasks().len(), 1);
    assert_eq!(manager.tasks()[0].executables().len(), 2);

    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["alpha"]).unwrap();
    manager.execute_execution_plan(&mut project, &plan).unwrap();
    assert_eq!(rec.events(), vec!["alpha", "alpha"]);
}
