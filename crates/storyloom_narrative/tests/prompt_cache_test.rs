//! Tests for prompt loading.

use storyloom_narrative::{INTERACTIVE_SCRIPTWRITER, PromptCache, TARGET_PLACEHOLDER};
use tempfile::TempDir;

#[tokio::test]
async fn bundled_prompt_is_used_without_override() -> anyhow::Result<()> {
    let cache = PromptCache::new(None);
    let prompt = cache.interactive_scriptwriter().await?;
    assert!(prompt.contains("next_scenelets"));
    assert!(prompt.contains(TARGET_PLACEHOLDER));
    assert!(cache.is_cached(INTERACTIVE_SCRIPTWRITER).await);
    Ok(())
}

#[tokio::test]
async fn override_is_memoized_until_reset() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("interactive_scriptwriter.md");
    std::fs::write(&path, "first version")?;

    let cache = PromptCache::new(Some(dir.path().to_path_buf()));
    assert_eq!(&*cache.interactive_scriptwriter().await?, "first version");

    std::fs::write(&path, "second version")?;
    assert_eq!(&*cache.interactive_scriptwriter().await?, "first version");

    cache.reset().await;
    assert!(!cache.is_cached(INTERACTIVE_SCRIPTWRITER).await);
    assert_eq!(&*cache.interactive_scriptwriter().await?, "second version");
    Ok(())
}

#[tokio::test]
async fn unknown_prompt_without_override_fails() {
    let cache = PromptCache::new(None);
    assert!(cache.get("storyboard").await.is_err());
}
