mod common;

use common::*;
use pybuild::errors::BuildError;
use pybuild::execution::Exclusions;

#[test]
fn teardown_runs_after_failure_and_original_error_surfaces() {
    init_tracing();
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![TaskBuilder::new("target").failing("boom").build(&rec)],
        vec![
            ActionBuilder::new("plain_after").after("target").build(&rec),
            ActionBuilder::new("cleanup").after("target").teardown().build(&rec),
        ],
        Exclusions::default(),
    );

    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["target"]).unwrap();
    let err = manager.execute_execution_plan(&mut project, &plan).unwrap_err();

    assert_eq!(rec.events(), vec!["target", "cleanup"]);
    assert!(err.to_string().contains("boom"), "got: {err}");
    assert!(manager.tasks_executed().is_empty());
}

#[test]
fn failing_before_action_skips_body_and_teardowns() {
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![TaskBuilder::new("target").build(&rec)],
        vec![
            ActionBuilder::new("pre").before("target").failing("pre broke").build(&rec),
            ActionBuilder::new("cleanup").after("target").teardown().build(&rec),
        ],
        Exclusions::default(),
    );

    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["target"]).unwrap();
    let err = manager.execute_execution_plan(&mut project, &plan).unwrap_err();

    assert_eq!(rec.events(), vec!["pre"]);
    assert!(err.to_string().contains("pre broke"), "got: {err}");
    assert!(manager.tasks_executed().is_empty());
}

#[test]
fn failing_teardown_does_not_replace_task_error() {
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![TaskBuilder::new("target").failing("task broke").build(&rec)],
        vec![
            ActionBuilder::new("first_td").after("target").teardown().failing("td broke").build(&rec),
            ActionBuilder::new("second_td").after("target").teardown().build(&rec),
        ],
        Exclusions::default(),
    );

    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["target"]).unwrap();
    let err = manager.execute_execution_plan(&mut project, &plan).unwrap_err();

    assert_eq!(rec.events(), vec!["target", "first_td", "second_td"]);
    assert!(err.to_string().contains("task broke"), "got: {err}");
}

#[test]
fn after_action_failure_still_runs_teardowns() {
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![TaskBuilder::new("target").build(&rec)],
        vec![
            ActionBuilder::new("checker").after("target").failing("check failed").build(&rec),
            ActionBuilder::new("skipped").after("target").build(&rec),
            ActionBuilder::new("cleanup").after("target").teardown().build(&rec),
        ],
        Exclusions::default(),
    );

    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["target"]).unwrap();
    let err = manager.execute_execution_plan(&mut project, &plan).unwrap_err();

    assert_eq!(rec.events(), vec!["target", "checker", "cleanup"]);
    assert!(err.to_string().contains("check failed"));
}

#[test]
fn without_teardowns_failure_stops_immediately() {
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![
            TaskBuilder::new("first").failing("nope").build(&rec),
            TaskBuilder::new("second").depends_on("first").build(&rec),
        ],
        vec![ActionBuilder::new("after_first").after("first").build(&rec)],
        Exclusions::default(),
    );

    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["second"]).unwrap();
    assert!(manager.execute_execution_plan(&mut project, &plan).is_err());
    assert_eq!(rec.events(), vec!["first"]);
}

#[test]
fn actions_run_around_task_in_registration_order() {
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![TaskBuilder::new("target").build(&rec)],
        vec![
            ActionBuilder::new("before_one").before("target").build(&rec),
            ActionBuilder::new("after_one").after("target").build(&rec),
            ActionBuilder::new("before_two").before("target").build(&rec),
            ActionBuilder::new("after_two").after("target").build(&rec),
        ],
        Exclusions::default(),
    );

    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["target"]).unwrap();
    let summaries = manager.execute_execution_plan(&mut project, &plan).unwrap();

    assert_eq!(
        rec.events(),
        vec!["before_one", "before_two", "target", "after_one", "after_two"]
    );
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].task, "target");
    assert_eq!(summaries[0].number_of_actions, 4);
}

#[test]
fn only_once_action_runs_a_single_time_per_build() {
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![
            TaskBuilder::new("alpha").build(&rec),
            TaskBuilder::new("beta").depends_on("alpha").build(&rec),
        ],
        vec![
            ActionBuilder::new("once")
                .before("alpha")
                .before("beta")
                .only_once()
                .build(&rec),
            ActionBuilder::new("every").before("alpha").before("beta").build(&rec),
        ],
        Exclusions::default(),
    );

    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["beta"]).unwrap();
    let summaries = manager.execute_execution_plan(&mut project, &plan).unwrap();

    assert_eq!(rec.count("once"), 1);
    assert_eq!(rec.count("every"), 2);
    assert_eq!(summaries[0].number_of_actions, 2);
    assert_eq!(summaries[1].number_of_actions, 1);
}

#[test]
fn interrupt_flag_aborts_before_next_task() {
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![
            TaskBuilder::new("alpha").build(&rec),
            TaskBuilder::new("beta").depends_on("alpha").build(&rec),
        ],
        vec![],
        Exclusions::default(),
    );

    manager.interrupt_flag().store(true, std::sync::atomic::Ordering::SeqCst);
    let mut project = scratch_project();
    let plan = manager.build_execution_plan(&["beta"]).unwrap();
    let err = manager.execute_execution_plan(&mut project, &plan).unwrap_err();

    assert!(matches!(err, BuildError::BuildFailed(ref msg) if msg == "build aborted"));
    assert!(rec.events().is_empty());
}

#[test]
fn execute_single_task_records_execution() {
    let rec = Recorder::new();
    let mut manager = resolved_manager(
        vec![TaskBuilder::new("alpha").build(&rec)],
        vec![],
        Exclusions::default(),
    );

    let task = manager.get_task("alpha").unwrap().clone();
    let mut project = scratch_project();
    let summary = manager.execute_task(&mut project, &task).unwrap();

    assert_eq!(summary.task, "alpha");
    assert_eq!(manager.tasks_executed(), &["alpha".to_string()]);
}
