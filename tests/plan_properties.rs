mod common;

use std::collections::HashSet;

use common::*;
use proptest::prelude::*;
use pybuild::execution::{ExecutionManager, Exclusions};
use pybuild::registry::Task;

// Acyclic by construction: task N may only depend on tasks 0..N-1.
// Each edge is (dependency index, optional).
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = Vec<Vec<(usize, bool)>>> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            proptest::collection::vec((any::<usize>(), any::<bool>()), 0..4),
            num_tasks,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, deps)| {
                    if i == 0 {
                        return Vec::new();
                    }
                    let mut seen = HashSet::new();
                    deps.into_iter()
                        .map(|(dep, optional)| (dep % i, optional))
                        .filter(|(dep, _)| seen.insert(*dep))
                        .collect()
                })
                .collect()
        })
    })
}

fn task_name(i: usize) -> String {
    format!("task_{i}")
}

fn build_manager(dag: &[Vec<(usize, bool)>], exclusions: Exclusions) -> ExecutionManager {
    let rec = Recorder::new();
    let tasks: Vec<Task> = dag
        .iter()
        .enumerate()
        .map(|(i, deps)| {
            let mut builder = TaskBuilder::new(&task_name(i));
            for (dep, optional) in deps {
                builder = if *optional {
                    builder.depends_on_optional(&task_name(*dep))
                } else {
                    builder.depends_on(&task_name(*dep))
                };
            }
            builder.build(&rec)
        })
        .collect();
    resolved_manager(tasks, vec![], exclusions)
}

proptest! {
    #[test]
    fn plan_is_duplicate_free_and_dependency_ordered(
        dag in dag_strategy(12),
        requested in proptest::collection::vec(any::<usize>(), 1..4),
    ) {
        let manager = build_manager(&dag, Exclusions::default());
        let requested: Vec<String> = requested.iter().map(|r| task_name(r % dag.len())).collect();
        let plan = manager.build_execution_plan(&requested).unwrap();
        let names = plan.names();

        let unique: HashSet<&String> = names.iter().collect();
        prop_assert_eq!(unique.len(), names.len());

        for name in &requested {
            prop_assert!(names.contains(name));
        }

        for (pos, name) in names.iter().enumerate() {
            let index: usize = name.trim_start_matches("task_").parse().unwrap();
            for (dep, _) in &dag[index] {
                let dep_pos = plan.position(&task_name(*dep));
                prop_assert!(dep_pos.is_some(), "{} missing dependency {}", name, dep);
                prop_assert!(dep_pos.unwrap() < pos);
            }
        }
    }

    #[test]
    fn excluding_all_optional_never_grows_the_plan(
        dag in dag_strategy(12),
        requested in 0usize..12,
    ) {
        let requested = vec![task_name(requested % dag.len())];
        let full = build_manager(&dag, Exclusions::default())
            .build_execution_plan(&requested)
            .unwrap()
            .names();
        let trimmed = build_manager(
            &dag,
            Exclusions { exclude_all_optional: true, ..Exclusions::default() },
        )
        .build_execution_plan(&requested)
        .unwrap()
        .names();

        prop_assert!(trimmed.len() <= full.len());
        for name in &trimmed {
            prop_assert!(full.contains(name));
        }
        prop_assert_eq!(trimmed.last(), full.last());
    }

    #[test]
    fn execution_follows_the_plan(dag in dag_strategy(8)) {
        let rec = Recorder::new();
        let mut manager = ExecutionManager::new();
        for (i, deps) in dag.iter().enumerate() {
            let mut builder = TaskBuilder::new(&task_name(i));
            for (dep, _) in deps {
                builder = builder.depends_on(&task_name(*dep));
            }
            manager.register_task(builder.build(&rec));
        }
        manager.resolve_dependencies(Exclusions::default()).unwrap();

        let last = vec![task_name(dag.len() - 1)];
        let plan = manager.build_execution_plan(&last).unwrap();
        let mut project = scratch_project();
        manager.execute_execution_plan(&mut project, &plan).unwrap();

        prop_assert_eq!(rec.events(), plan.names());
        prop_assert_eq!(manager.tasks_executed().to_vec(), plan.names());
    }
}
