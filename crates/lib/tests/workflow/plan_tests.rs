use pipeset_lib::apply::{ApplyOutcome, FixedAnswer, apply, plan};
use pipeset_lib::config::CollectionKind;
use pipeset_lib::diff::DiffRecord;
use pipeset_lib::store::{ConfigStore, FileConfigStore};
use tempfile::TempDir;

use super::common::{FakeStore, RecordingSink, Rendered, request};

const PIPELINE: &str = r#"
resources:
- name: repo
  type: git
  source:
    uri: ((repo_uri))
    branch: main

jobs:
- name: build
  plan:
  - get: repo
    trigger: true
"#;

#[test]
fn plan_renders_without_saving() {
  let store = FakeStore::holding("resources:\n- name: repo\n  type: git\n", 1);
  let mut sink = RecordingSink::default();

  let diff = plan(
    request(PIPELINE, &[], &["repo_uri=https://example.com/app.git"]),
    &store,
    &mut sink,
  )
  .unwrap();

  assert_eq!(diff.len(), 2);
  assert!(matches!(
    diff.section(CollectionKind::Resource),
    [DiffRecord::Changed { name, .. }] if name == "repo"
  ));
  assert_eq!(sink.events.len(), 4);
  assert!(store.puts.is_empty());
}

#[test]
fn plan_reports_validation_errors() {
  let store = FakeStore::invalid("broken", 2, &["bad"]);
  let mut sink = RecordingSink::default();

  let diff = plan(request("", &[], &[]), &store, &mut sink).unwrap();

  assert!(diff.is_empty());
  assert_eq!(sink.events, vec![Rendered::ValidationErrors(vec!["bad".to_string()])]);
}

#[test]
fn file_store_round_trip() {
  let temp = TempDir::new().unwrap();
  let mut store = FileConfigStore::new(temp.path());
  let vars = [("creds.yml", "repo_uri: git@example.com:app.git\n")];

  let outcome = apply(
    request(PIPELINE, &vars, &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut RecordingSink::default(),
  )
  .unwrap();
  assert_eq!(outcome, ApplyOutcome::Created);

  let mut sink = RecordingSink::default();
  let diff = plan(request(PIPELINE, &vars, &[]), &store, &mut sink).unwrap();
  assert!(diff.is_empty());
  assert!(sink.events.is_empty());

  let outcome = apply(
    request(PIPELINE, &vars, &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut RecordingSink::default(),
  )
  .unwrap();
  assert_eq!(outcome, ApplyOutcome::Updated);

  let stored = store.get("main").unwrap();
  assert_eq!(stored.version.as_str(), "2");
  assert!(stored.raw.contains("uri: \"git@example.com:app.git\""));
}
