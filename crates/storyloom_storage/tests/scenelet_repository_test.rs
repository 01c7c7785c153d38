//! Tests for the scenelet repositories.

use storyloom_core::{NewScenelet, NewSceneletBuilder, SceneletId, ScriptwriterScenelet};
use storyloom_error::{StorageErrorKind, StoryloomErrorKind};
use storyloom_interface::SceneletRepository;
use storyloom_storage::{FileSceneletRepository, InMemorySceneletRepository, RepositoryOperation};
use tempfile::TempDir;

fn content(description: &str) -> ScriptwriterScenelet {
    ScriptwriterScenelet {
        description: description.to_string(),
        dialogue: vec![],
        shot_suggestions: vec!["Wide".to_string()],
        choice_label: None,
    }
}

fn new_scenelet(story: &str, parent: Option<&SceneletId>, description: &str) -> NewScenelet {
    NewSceneletBuilder::default()
        .story_id(story)
        .parent_id(parent.cloned())
        .content(content(description))
        .build()
        .expect("valid scenelet")
}

fn choice(story: &str, parent: &SceneletId, label: &str) -> NewScenelet {
    NewSceneletBuilder::default()
        .story_id(story)
        .parent_id(Some(parent.clone()))
        .choice_label_from_parent(Some(label.to_string()))
        .content(content(label))
        .build()
        .expect("valid scenelet")
}

async fn exercise_batches<R: SceneletRepository>(repo: &R) {
    let root = repo
        .create_scenelet(new_scenelet("fork", None, "root"))
        .await
        .unwrap();
    let children = repo
        .create_scenelets(vec![
            choice("fork", &root.id, "North"),
            choice("fork", &root.id, "South"),
            choice("fork", &root.id, "East"),
        ])
        .await
        .unwrap();
    let labels: Vec<_> = children
        .iter()
        .map(|c| c.choice_label_from_parent.as_deref().unwrap())
        .collect();
    assert_eq!(labels, ["North", "South", "East"]);

    let listed = repo.list_scenelets_by_story("fork").await.unwrap();
    let listed_labels: Vec<_> = listed
        .iter()
        .filter_map(|r| r.choice_label_from_parent.as_deref())
        .collect();
    assert_eq!(listed_labels, ["North", "South", "East"]);

    repo.delete_scenelets(&[children[0].id.clone(), children[2].id.clone()])
        .await
        .unwrap();
    let remaining = repo.list_scenelets_by_story("fork").await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert!(remaining.iter().any(|r| r.id == children[1].id));
    assert!(repo.delete_scenelets(&[children[0].id.clone()]).await.is_err());
}

fn storage_kind(err: &storyloom_error::StoryloomError) -> StorageErrorKind {
    match err.kind() {
        StoryloomErrorKind::Storage(e) => e.kind.clone(),
        other => panic!("expected storage error, got {other}"),
    }
}

async fn exercise_repository<R: SceneletRepository>(repo: &R) {
    assert!(!repo.has_scenelets_for_story("tide").await.unwrap());

    let root = repo
        .create_scenelet(new_scenelet("tide", None, "root"))
        .await
        .unwrap();
    assert!(root.is_root());
    assert!(!root.is_branch_point);

    let left = repo
        .create_scenelet(new_scenelet("tide", Some(&root.id), "left"))
        .await
        .unwrap();
    let right = repo
        .create_scenelet(new_scenelet("tide", Some(&root.id), "right"))
        .await
        .unwrap();

    repo.mark_scenelet_as_branch_point(&root.id, "Which way?")
        .await
        .unwrap();
    repo.mark_scenelet_as_terminal(&right.id).await.unwrap();

    assert!(repo.has_scenelets_for_story("tide").await.unwrap());
    assert!(!repo.has_scenelets_for_story("other").await.unwrap());

    let records = repo.list_scenelets_by_story("tide").await.unwrap();
    assert_eq!(records.len(), 3);

    let stored_root = records.iter().find(|r| r.id == root.id).unwrap();
    assert!(stored_root.is_branch_point);
    assert_eq!(stored_root.choice_prompt.as_deref(), Some("Which way?"));

    let stored_right = records.iter().find(|r| r.id == right.id).unwrap();
    assert!(stored_right.is_terminal_node);

    let stored_left = records.iter().find(|r| r.id == left.id).unwrap();
    assert_eq!(stored_left.parent_id.as_ref(), Some(&root.id));
    assert_eq!(stored_left.content.description, "left");
}

#[tokio::test]
async fn in_memory_repository_round_trip() {
    let repo = InMemorySceneletRepository::new();
    exercise_repository(&repo).await;
    assert_eq!(repo.len().await, 3);
}

#[tokio::test]
async fn in_memory_journal_records_write_order() {
    let repo = InMemorySceneletRepository::new();
    let root = repo
        .create_scenelet(new_scenelet("s", None, "root"))
        .await
        .unwrap();
    repo.mark_scenelet_as_terminal(&root.id).await.unwrap();

    assert_eq!(
        repo.journal().await,
        vec![
            RepositoryOperation::Create {
                id: root.id.clone(),
                parent_id: None
            },
            RepositoryOperation::MarkTerminal { id: root.id },
        ]
    );
}

#[tokio::test]
async fn marking_unknown_scenelet_fails() {
    let repo = InMemorySceneletRepository::new();
    let missing = SceneletId::new("missing");
    assert!(repo.mark_scenelet_as_terminal(&missing).await.is_err());
    assert!(
        repo.mark_scenelet_as_branch_point(&missing, "?")
            .await
            .is_err()
    );
}

#[tokio::test]
async fn file_repository_round_trip() {
    let dir = TempDir::new().unwrap();
    let repo = FileSceneletRepository::new(dir.path().join("stories")).unwrap();
    exercise_repository(&repo).await;
}

#[tokio::test]
async fn file_repository_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let root_id = {
        let repo = FileSceneletRepository::new(dir.path()).unwrap();
        repo.create_scenelet(new_scenelet("reopen", None, "root"))
            .await
            .unwrap()
            .id
    };

    let reopened = FileSceneletRepository::new(dir.path()).unwrap();
    let records = reopened.list_scenelets_by_story("reopen").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, root_id);
}

#[tokio::test]
async fn file_repository_rejects_path_like_story_ids() {
    let dir = TempDir::new().unwrap();
    let repo = FileSceneletRepository::new(dir.path()).unwrap();
    assert!(
        repo.create_scenelet(new_scenelet("../escape", None, "root"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn in_memory_batches_keep_order_and_delete() {
    let repo = InMemorySceneletRepository::new();
    exercise_batches(&repo).await;
    assert!(
        repo.journal()
            .await
            .iter()
            .any(|op| matches!(op, RepositoryOperation::Delete { .. }))
    );
}

#[tokio::test]
async fn file_batches_keep_order_and_delete() {
    let dir = TempDir::new().unwrap();
    let repo = FileSceneletRepository::new(dir.path()).unwrap();
    exercise_batches(&repo).await;
}

#[tokio::test]
async fn failed_file_batch_stores_nothing() {
    let dir = TempDir::new().unwrap();
    let repo = FileSceneletRepository::new(dir.path()).unwrap();
    let root = repo
        .create_scenelet(new_scenelet("fork", None, "root"))
        .await
        .unwrap();

    let result = repo
        .create_scenelets(vec![
            choice("fork", &root.id, "North"),
            choice("../escape", &root.id, "South"),
        ])
        .await;

    assert!(result.is_err());
    let records = repo.list_scenelets_by_story("fork").await.unwrap();
    assert_eq!(records.len(), 1);
    let leftovers = std::fs::read_dir(dir.path().join("fork")).unwrap().count();
    assert_eq!(leftovers, 1, "no staged files remain");
}

#[tokio::test]
async fn terminal_flag_is_set_at_creation() {
    let dir = TempDir::new().unwrap();
    let repo = FileSceneletRepository::new(dir.path()).unwrap();
    let mut ending = new_scenelet("end", None, "The end.");
    ending.is_terminal_node = true;

    let record = repo.create_scenelet(ending).await.unwrap();
    assert!(record.is_terminal_node);
    let stored = repo.list_scenelets_by_story("end").await.unwrap();
    assert!(stored[0].is_terminal_node);
}

#[tokio::test]
async fn unreadable_base_directory_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("stories");
    let repo = FileSceneletRepository::new(&base).unwrap();
    std::fs::remove_dir_all(&base).unwrap();

    let err = repo
        .mark_scenelet_as_terminal(&SceneletId::new("missing"))
        .await
        .unwrap_err();
    assert!(matches!(storage_kind(&err), StorageErrorKind::FileRead(_)));
}
