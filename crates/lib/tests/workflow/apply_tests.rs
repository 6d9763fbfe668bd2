use pipeset_lib::apply::{ApplyError, ApplyOutcome, Confirm, FixedAnswer, apply};
use pipeset_lib::config::{Body, CollectionKind, Entity};
use pipeset_lib::diff::DiffRecord;
use pipeset_lib::resolve::ResolveError;
use pipeset_lib::store::{StoreError, VersionToken};
use pipeset_lib::template::TemplateError;
use serde_yaml::Value;

use super::common::{FakeStore, RecordingSink, Rendered, request};

fn entity(name: &str, kind: &str) -> Entity {
  let mut body = Body::new();
  body.insert("type".to_string(), Value::String(kind.to_string()));
  Entity::new(name, body)
}

/// Counts how often it was asked.
struct CountingConfirm {
  answer: bool,
  asked: usize,
}

impl Confirm for CountingConfirm {
  fn confirm(&mut self) -> bool {
    self.asked += 1;
    self.answer
  }
}

#[test]
fn creates_new_pipeline() {
  let mut store = FakeStore::empty();
  let mut sink = RecordingSink::default();

  let outcome = apply(
    request("resources:\n- name: a\n  type: git\n", &[], &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut sink,
  )
  .unwrap();

  assert_eq!(outcome, ApplyOutcome::Created);
  assert_eq!(
    sink.events,
    vec![
      Rendered::Section(CollectionKind::Resource),
      Rendered::Record(CollectionKind::Resource, DiffRecord::Added(entity("a", "git"))),
    ]
  );
  assert_eq!(store.puts.len(), 1);
  assert_eq!(store.puts[0].0, "main");
  assert!(store.puts[0].1.is_none());
}

#[test]
fn added_resource_updates_existing_pipeline() {
  let mut store = FakeStore::holding("resources:\n- name: a\n  type: git\n", 3);
  let mut sink = RecordingSink::default();

  let document = "resources:\n- name: a\n  type: git\n- name: b\n  type: ((kind))\n";
  let outcome = apply(
    request(document, &[("vars.yml", "kind: s3\n")], &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut sink,
  )
  .unwrap();

  assert_eq!(outcome, ApplyOutcome::Updated);
  assert_eq!(
    sink.events,
    vec![
      Rendered::Section(CollectionKind::Resource),
      Rendered::Record(CollectionKind::Resource, DiffRecord::Added(entity("b", "s3"))),
    ]
  );
  assert_eq!(store.puts.len(), 1);
  assert_eq!(store.puts[0].1, VersionToken::from(3));
  assert_eq!(
    store.puts[0].2,
    "resources:\n- name: a\n  type: git\n- name: b\n  type: \"s3\"\n"
  );
}

#[test]
fn declined_confirmation_never_saves() {
  let mut store = FakeStore::holding("jobs:\n- name: build\n", 1);
  let mut sink = RecordingSink::default();

  let outcome = apply(
    request("jobs:\n- name: test\n", &[], &[]),
    &mut store,
    &mut FixedAnswer(false),
    &mut sink,
  )
  .unwrap();

  assert_eq!(outcome, ApplyOutcome::Declined);
  assert!(store.puts.is_empty());
  assert_eq!(sink.events.len(), 3);
}

#[test]
fn unchanged_config_still_asks() {
  let text = "groups:\n- name: all\n  jobs: [build]\n";
  let mut store = FakeStore::holding(text, 2);
  let mut sink = RecordingSink::default();
  let mut confirm = CountingConfirm {
    answer: true,
    asked: 0,
  };

  let outcome = apply(request(text, &[], &[]), &mut store, &mut confirm, &mut sink).unwrap();

  assert_eq!(outcome, ApplyOutcome::Updated);
  assert_eq!(confirm.asked, 1);
  assert!(sink.events.is_empty());
}

#[test]
fn both_flags_set_is_inconsistent() {
  let mut store = FakeStore::empty().with_result(true, true, &[]);

  let result = apply(
    request("jobs: []\n", &[], &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut RecordingSink::default(),
  );

  assert!(matches!(
    result,
    Err(ApplyError::InconsistentStore {
      created: true,
      updated: true
    })
  ));
}

#[test]
fn neither_flag_set_is_inconsistent() {
  let mut store = FakeStore::empty().with_result(false, false, &[]);

  let result = apply(
    request("jobs: []\n", &[], &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut RecordingSink::default(),
  );

  assert!(matches!(
    result,
    Err(ApplyError::InconsistentStore {
      created: false,
      updated: false
    })
  ));
}

#[test]
fn invalid_existing_config_is_tolerated() {
  let mut store = FakeStore::invalid("jobs: oops\n", 5, &["jobs must be a list"]);
  let mut sink = RecordingSink::default();

  let outcome = apply(
    request("jobs:\n- name: build\n", &[], &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut sink,
  )
  .unwrap();

  assert_eq!(outcome, ApplyOutcome::Updated);
  assert_eq!(
    sink.events.last(),
    Some(&Rendered::ValidationErrors(vec!["jobs must be a list".to_string()]))
  );
  assert!(matches!(
    &sink.events[1],
    Rendered::Record(CollectionKind::Job, DiffRecord::Added(e)) if e.name == "build"
  ));
  assert_eq!(store.puts[0].1, VersionToken::from(5));
}

#[test]
fn missing_variables_abort_before_rendering() {
  let mut store = FakeStore::empty();
  let mut sink = RecordingSink::default();
  let mut confirm = CountingConfirm {
    answer: true,
    asked: 0,
  };

  let result = apply(
    request("resources:\n- name: ((name))\n  type: ((kind))\n", &[], &["name=repo"]),
    &mut store,
    &mut confirm,
    &mut sink,
  );

  match result {
    Err(ApplyError::Resolve(ResolveError::Template(TemplateError::Missing(missing)))) => {
      assert_eq!(missing.names, vec!["kind"]);
    }
    other => panic!("expected missing variables, got {:?}", other),
  }
  assert!(sink.events.is_empty());
  assert_eq!(confirm.asked, 0);
  assert!(store.puts.is_empty());
}

#[test]
fn malformed_config_is_an_error() {
  let mut store = FakeStore::empty();
  let result = apply(
    request("resources: not-a-list\n", &[], &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut RecordingSink::default(),
  );

  assert!(matches!(result, Err(ApplyError::Config(_))));
  assert!(store.puts.is_empty());
}

#[test]
fn warnings_rendered_after_save() {
  let mut store = FakeStore::empty().with_result(true, false, &["resource 'a' is declared more than once"]);
  let mut sink = RecordingSink::default();

  apply(
    request("resources:\n- name: a\n- name: a\n", &[], &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut sink,
  )
  .unwrap();

  assert_eq!(
    sink.events.last(),
    Some(&Rendered::Warnings(vec![
      "resource 'a' is declared more than once".to_string()
    ]))
  );
}

#[test]
fn flags_override_files() {
  let mut store = FakeStore::empty();

  apply(
    request(
      "groups:\n- name: ((env))-((region))\n",
      &[("a.yml", "env: staging\n"), ("b.yml", "env: prod\nregion: eu\n")],
      &[],
    ),
    &mut store,
    &mut FixedAnswer(true),
    &mut RecordingSink::default(),
  )
  .unwrap();
  assert_eq!(store.puts[0].2, "groups:\n- name: staging-eu\n");

  let mut store = FakeStore::empty();
  apply(
    request(
      "groups:\n- name: ((env))-((region))\n",
      &[("a.yml", "env: staging\n"), ("b.yml", "env: prod\nregion: eu\n")],
      &["env=dev"],
    ),
    &mut store,
    &mut FixedAnswer(true),
    &mut RecordingSink::default(),
  )
  .unwrap();
  assert_eq!(store.puts[0].2, "groups:\n- name: dev-eu\n");
}

#[test]
fn sections_follow_collection_order() {
  let mut store = FakeStore::holding("jobs:\n- name: old\n", 1);
  let mut sink = RecordingSink::default();

  apply(
    request(
      "jobs:\n- name: new\nresource_types:\n- name: slack\ngroups:\n- name: all\n",
      &[],
      &[],
    ),
    &mut store,
    &mut FixedAnswer(true),
    &mut sink,
  )
  .unwrap();

  let sections: Vec<_> = sink
    .events
    .iter()
    .filter_map(|e| match e {
      Rendered::Section(kind) => Some(*kind),
      _ => None,
    })
    .collect();
  assert_eq!(
    sections,
    vec![CollectionKind::Group, CollectionKind::ResourceType, CollectionKind::Job]
  );
}

#[test]
fn unreadable_store_aborts_before_anything_is_shown() {
  let mut store = FakeStore::empty().unreadable();
  let mut sink = RecordingSink::default();
  let mut confirm = CountingConfirm {
    answer: true,
    asked: 0,
  };

  let result = apply(request("jobs:\n- name: build\n", &[], &[]), &mut store, &mut confirm, &mut sink);

  assert!(matches!(result, Err(ApplyError::Store(StoreError::Io { .. }))));
  assert!(sink.events.is_empty());
  assert_eq!(confirm.asked, 0);
  assert_eq!(store.put_attempts, 0);
}

#[test]
fn conflicting_save_is_returned_without_warnings() {
  let mut store = FakeStore::holding("jobs:\n- name: build\n", 4)
    .with_result(false, true, &["should never be shown"])
    .conflicting();
  let mut sink = RecordingSink::default();

  let result = apply(
    request("jobs:\n- name: test\n", &[], &[]),
    &mut store,
    &mut FixedAnswer(true),
    &mut sink,
  );

  match result {
    Err(ApplyError::Store(StoreError::Conflict { expected, found, .. })) => {
      assert_eq!(expected, VersionToken::from(4));
      assert_eq!(found, VersionToken::from(99));
    }
    other => panic!("expected conflict, got {:?}", other),
  }
  assert_eq!(store.put_attempts, 1);
  assert!(store.puts.is_empty());
  assert!(!sink.events.iter().any(|e| matches!(e, Rendered::Warnings(_))));
}
