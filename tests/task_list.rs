use pybuild::reactor::{expand_task_list, TaskSpecifier};

fn defaults(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn specifier_parsing() {
    assert_eq!(TaskSpecifier::parse("clean"), TaskSpecifier::New("clean".into()));
    assert_eq!(TaskSpecifier::parse("+sign"), TaskSpecifier::Append("sign".into()));
    assert_eq!(TaskSpecifier::parse("^test"), TaskSpecifier::Remove("test".into()));
}

#[test]
fn modifiers_apply_to_default_task_list() {
    let tasks = expand_task_list(&["+sign", "^test"], &defaults(&["publish"]));
    assert_eq!(tasks, vec!["publish", "sign"]);

    let tasks = expand_task_list(&["+sign", "^test"], &defaults(&["test", "publish"]));
    assert_eq!(tasks, vec!["publish", "sign"]);
}

#[test]
fn bare_names_replace_default() {
    let tasks = expand_task_list(&["clean", "+publish"], &defaults(&["publish"]));
    assert_eq!(tasks, vec!["clean", "publish"]);
}

#[test]
fn append_of_present_task_is_ignored() {
    let tasks = expand_task_list(&["+publish"], &defaults(&["publish"]));
    assert_eq!(tasks, vec!["publish"]);
}

#[test]
fn empty_input_yields_default() {
    let empty: [&str; 0] = [];
    assert_eq!(expand_task_list(&empty, &defaults(&["verify"])), vec!["verify"]);
    assert!(expand_task_list(&empty, &[]).is_empty());
}

#[test]
fn removing_everything_leaves_nothing() {
    let tasks = expand_task_list(&["^publish"], &defaults(&["publish"]));
    assert!(tasks.is_empty());
}
