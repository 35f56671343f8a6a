//! Queries across a corpus of artifact documents

use artifact_status::{
    NewArtifact, QueryCriteria, QueryEngine, StateReason, Status, TrackerConfig,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fs;
use tempfile::TempDir;

fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

fn ids(engine: &QueryEngine, kind: Option<&str>, criteria: &QueryCriteria) -> Vec<String> {
    engine
        .query(kind, criteria)
        .into_iter()
        .map(|hit| hit.record.id().to_string())
        .collect()
}

fn assigned(assignee: &str, epic: Option<&str>) -> NewArtifact {
    NewArtifact {
        assignees: vec![assignee.to_string()],
        labels: Vec::new(),
        epic: epic.map(str::to_string),
    }
}

#[test]
fn test_assignee_query_returns_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let engine = QueryEngine::new(temp_dir.path(), TrackerConfig::default());
    let store = engine.store();
    let root = temp_dir.path();

    store
        .create_at(&root.join("features/a.md"), "F-1", "feature", assigned("alice", None), at(0))
        .unwrap();
    store
        .create_at(&root.join("features/b.md"), "F-2", "feature", assigned("bob", None), at(10))
        .unwrap();
    store
        .create_at(&root.join("features/c.md"), "F-3", "feature", assigned("alice", None), at(20))
        .unwrap();

    let alice = QueryCriteria::new().with_assignee("alice");
    assert_eq!(ids(&engine, None, &alice), ["F-3", "F-1"]);
    assert_eq!(ids(&engine, Some("feature"), &alice), ["F-3", "F-1"]);

    // Touching F-1 moves it to the front
    store
        .update_status(&root.join("features/a.md"), Status::InProgress, None)
        .unwrap();
    assert_eq!(ids(&engine, None, &alice), ["F-1", "F-3"]);
}

#[test]
fn test_status_and_epic_filter() {
    let temp_dir = TempDir::new().unwrap();
    let engine = QueryEngine::new(temp_dir.path(), TrackerConfig::default());
    let store = engine.store();
    let root = temp_dir.path();

    let docs = [
        ("features/1.md", "F-1", "feature", Some("X"), Some(Status::InProgress)),
        ("features/2.md", "F-2", "feature", Some("X"), None),
        ("features/3.md", "F-3", "feature", Some("Y"), Some(Status::InProgress)),
        ("experiments/4.md", "E-4", "experiment", Some("X"), Some(Status::InProgress)),
        ("experiments/5.md", "E-5", "experiment", None, Some(Status::InProgress)),
        ("ships-log/6.md", "S-6", "ships-log", Some("X"), Some(Status::Blocked)),
    ];
    for (i, (rel, id, kind, epic, status)) in docs.into_iter().enumerate() {
        let path = root.join(rel);
        store
            .create_at(&path, id, kind, assigned("alice", epic), at(i as i64))
            .unwrap();
        if let Some(status) = status {
            store.transition(&path, status, None).unwrap();
        }
    }

    let criteria = QueryCriteria::new()
        .with_status(Status::InProgress)
        .with_epic("X");
    let hits = engine.query(None, &criteria);

    let mut found: Vec<_> = hits.iter().map(|hit| hit.record.id()).collect();
    found.sort();
    assert_eq!(found, ["E-4", "F-1"]);
    assert!(hits
        .windows(2)
        .all(|pair| pair[0].record.updated_at() >= pair[1].record.updated_at()));
    for hit in &hits {
        assert_eq!(hit.record.status(), Status::InProgress);
        assert_eq!(hit.record.epic(), Some("X"));
        assert_eq!(engine.store().load(&hit.path).unwrap(), hit.record);
    }

    assert_eq!(ids(&engine, Some("experiment"), &criteria), ["E-4"]);
}

#[test]
fn test_closed_reason_and_label_filters() {
    let temp_dir = TempDir::new().unwrap();
    let engine = QueryEngine::new(temp_dir.path(), TrackerConfig::default());
    let store = engine.store();
    let root = temp_dir.path();

    for (i, reason) in [StateReason::Completed, StateReason::Duplicate, StateReason::Completed]
        .into_iter()
        .enumerate()
    {
        let path = root.join(format!("quality-assessments/q-{i}.md"));
        let fields = NewArtifact {
            labels: vec![format!("round-{}", i % 2)],
            ..NewArtifact::default()
        };
        store
            .create_at(&path, &format!("Q-{i}"), "quality-assessment", fields, at(i as i64))
            .unwrap();
        store.transition(&path, Status::Closed, Some(reason)).unwrap();
    }

    let completed = QueryCriteria::new().with_state_reason(StateReason::Completed);
    let mut found = ids(&engine, None, &completed);
    found.sort();
    assert_eq!(found, ["Q-0", "Q-2"]);

    let round_one = QueryCriteria::new().with_label("round-1");
    assert_eq!(ids(&engine, None, &round_one), ["Q-1"]);

    let open = QueryCriteria::new().with_status(Status::Open);
    assert!(ids(&engine, None, &open).is_empty());
}

#[test]
fn test_documents_without_valid_headers_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let engine = QueryEngine::new(temp_dir.path(), TrackerConfig::default());
    let root = temp_dir.path();

    engine
        .store()
        .create_at(&root.join("features/ok.md"), "F-1", "feature", NewArtifact::default(), at(0))
        .unwrap();
    fs::write(root.join("features/readme.md"), "# Features\n").unwrap();
    fs::write(root.join("features/unclosed.md"), "---\nid: F-2\n").unwrap();
    fs::write(
        root.join("features/bad-status.md"),
        "---\nid: F-3\ntype: feature\nstatus: done\n---\n",
    )
    .unwrap();
    fs::write(
        root.join("features/_template.md"),
        "---\nid: F-0\ntype: feature\nstatus: open\n---\n",
    )
    .unwrap();

    assert_eq!(ids(&engine, None, &QueryCriteria::new()), ["F-1"]);
}

#[test]
fn test_kind_filter_and_unregistered_kind() {
    let temp_dir = TempDir::new().unwrap();
    let engine = QueryEngine::new(temp_dir.path(), TrackerConfig::default());
    let root = temp_dir.path();

    engine
        .store()
        .create_at(&root.join("features/f.md"), "F-1", "feature", NewArtifact::default(), at(0))
        .unwrap();
    engine
        .store()
        .create_at(&root.join("ships-log/s.md"), "S-1", "ships-log", NewArtifact::default(), at(1))
        .unwrap();

    let all = QueryCriteria::new();
    assert_eq!(ids(&engine, None, &all), ["S-1", "F-1"]);
    assert_eq!(ids(&engine, Some("ships-log"), &all), ["S-1"]);
    assert!(ids(&engine, Some("retrospective"), &all).is_empty());
}

#[test]
fn test_custom_layout_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(
        root.join("tracker.toml"),
        "[kinds.feature]\ndir = \"docs/features\"\n\n[kinds.retrospective]\ndir = \"docs/retros\"\nextension = \"txt\"\n",
    )
    .unwrap();

    let engine = QueryEngine::open(root).unwrap();
    engine
        .store()
        .create_at(&root.join("docs/features/f.md"), "F-1", "feature", NewArtifact::default(), at(0))
        .unwrap();
    engine
        .store()
        .create_at(&root.join("docs/retros/r.txt"), "R-1", "retrospective", NewArtifact::default(), at(1))
        .unwrap();

    // Outside every configured layout
    fs::create_dir_all(root.join("features")).unwrap();
    fs::write(
        root.join("features/old.md"),
        "---\nid: F-9\ntype: feature\nstatus: open\n---\n",
    )
    .unwrap();

    assert_eq!(ids(&engine, None, &QueryCriteria::new()), ["R-1", "F-1"]);
    assert_eq!(ids(&engine, Some("retrospective"), &QueryCriteria::new()), ["R-1"]);
    assert!(ids(&engine, Some("experiment"), &QueryCriteria::new()).is_empty());
}

#[test]
fn test_open_rejects_invalid_kind_names() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("tracker.toml"),
        "[kinds.ships_log]\ndir = \"logs\"\n",
    )
    .unwrap();

    let err = QueryEngine::open(temp_dir.path()).unwrap_err();
    assert!(err.to_string().contains("ships_log"));
}
