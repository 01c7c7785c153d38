//! Command handlers.

use std::path::Path;
use storyloom::{
    FileSceneletRepository, GeminiJsonClient, GenerationMode, GenerationReport, JsonError,
    PromptCache, SceneletRepository, StorageError, StorageErrorKind, StoryGenerationEngine,
    StoryloomConfig, StoryloomError, StoryloomResult, plan_resume, render_tree,
};
use tracing::info;

/// Run a fresh or resumed generation and return its report.
#[tracing::instrument(skip(config, constitution), fields(constitution = %constitution.display()))]
pub async fn run_generation(
    config: &StoryloomConfig,
    story_id: &str,
    constitution: &Path,
    mode: GenerationMode,
) -> StoryloomResult<GenerationReport> {
    let constitution = tokio::fs::read_to_string(constitution)
        .await
        .map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                constitution.display(),
                e
            )))
        })?;

    let client = GeminiJsonClient::from_env(config.model.clone(), config.retry.clone())?;
    let repository = FileSceneletRepository::new(&config.storage.path)?;
    let system_prompt = PromptCache::new(config.prompts.directory.clone())
        .interactive_scriptwriter()
        .await?;

    info!(
        model = %config.model.model(),
        storage = %config.storage.path.display(),
        "Engine ready"
    );
    let engine =
        StoryGenerationEngine::new(client, repository, system_prompt, config.generation.clone())?;
    engine.generate(story_id, &constitution, mode).await
}

/// Print the resume plan of a story without calling the model.
pub async fn print_plan(config: &StoryloomConfig, story_id: &str) -> StoryloomResult<()> {
    let repository = FileSceneletRepository::new(&config.storage.path)?;
    let records = repository.list_scenelets_by_story(story_id).await?;
    let plan = plan_resume(story_id, &records)?;
    println!("{}", to_pretty_json(&plan)?);
    Ok(())
}

/// Print a story tree.
pub async fn show_tree(config: &StoryloomConfig, story_id: &str) -> StoryloomResult<()> {
    let repository = FileSceneletRepository::new(&config.storage.path)?;
    let records = repository.list_scenelets_by_story(story_id).await?;
    print!("{}", render_tree(&records));
    Ok(())
}

/// Serialize for terminal output.
pub fn to_pretty_json<T: serde::Serialize>(value: &T) -> StoryloomResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| StoryloomError::from(JsonError::new(e.to_string())))
}
