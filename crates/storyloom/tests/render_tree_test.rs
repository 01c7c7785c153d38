//! Tests for the story outline printed by `storyloom show`.

use storyloom::{
    InMemorySceneletRepository, NewScenelet, SceneletRepository, ScriptwriterScenelet,
    render_tree,
};

fn content(description: &str) -> ScriptwriterScenelet {
    ScriptwriterScenelet {
        description: description.to_string(),
        dialogue: vec![],
        shot_suggestions: vec!["Wide".to_string()],
        choice_label: None,
    }
}

#[tokio::test]
async fn outline_shows_structure_in_depth_first_order() {
    let repo = InMemorySceneletRepository::new();
    let root = repo
        .create_scenelet(NewScenelet {
            story_id: "s".to_string(),
            parent_id: None,
            choice_label_from_parent: None,
            content: content("The storm arrives."),
            is_terminal_node: false,
        })
        .await
        .unwrap();
    let stay = repo
        .create_scenelet(NewScenelet {
            story_id: "s".to_string(),
            parent_id: Some(root.id.clone()),
            choice_label_from_parent: Some("Stay".to_string()),
            content: content("You bar the door."),
            is_terminal_node: false,
        })
        .await
        .unwrap();
    repo.create_scenelet(NewScenelet {
        story_id: "s".to_string(),
        parent_id: Some(root.id.clone()),
        choice_label_from_parent: Some("Run".to_string()),
        content: content("You flee to the cliffs."),
        is_terminal_node: false,
    })
    .await
    .unwrap();
    repo.mark_scenelet_as_branch_point(&root.id, "Stay or run?")
        .await
        .unwrap();
    repo.mark_scenelet_as_terminal(&stay.id).await.unwrap();

    let records = repo.list_scenelets_by_story("s").await.unwrap();
    let outline = render_tree(&records);
    let lines: Vec<&str> = outline.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("* The storm arrives."));
    assert_eq!(lines[1], "  ? Stay or run?");
    assert!(lines[2].starts_with("  # [Stay] You bar the door."));
    assert!(lines[3].starts_with("  + [Run] You flee to the cliffs."));
}
