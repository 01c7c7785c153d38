//! Model input for the interactive scriptwriter.

use storyloom_core::ScriptwriterScenelet;
use storyloom_error::JsonError;

/// Placeholder in the system prompt replaced by the advisory path length.
pub const TARGET_PLACEHOLDER: &str = "{target_scenelets_per_path}";

const ROOT_INSTRUCTION: &str = "Begin the story. Write the opening scenelet of the interactive \
     story described by the constitution above.";

const CONTINUE_INSTRUCTION: &str = "Continue the story from the last scenelet of the current \
     narrative path. Write the next scenelet, or the choices that follow it.";

/// Build the user content for one generation task.
///
/// The constitution is always present. The path section carries the whole
/// root-first lineage so the model sees more than the immediate parent; it is
/// omitted for the root and for an empty path.
///
/// # Errors
///
/// Fails if the path cannot be rendered as JSON.
///
/// # Examples
///
/// ```
/// use storyloom_narrative::assemble_prompt;
///
/// let prompt = assemble_prompt("  A lighthouse keeper finds a map.  ", &[], true).unwrap();
/// assert!(prompt.contains("A lighthouse keeper finds a map.\n"));
/// assert!(prompt.contains("Begin the story."));
/// assert!(!prompt.contains("Current narrative path"));
/// ```
pub fn assemble_prompt(
    constitution: &str,
    path_context: &[ScriptwriterScenelet],
    is_root: bool,
) -> Result<String, JsonError> {
    let mut prompt = String::new();
    prompt.push_str("## Story constitution\n\n");
    prompt.push_str(constitution.trim());
    prompt.push_str("\n\n");

    if !is_root && !path_context.is_empty() {
        let path = serde_json::to_string_pretty(path_context)
            .map_err(|e| JsonError::new(format!("narrative path: {}", e)))?;
        prompt.push_str("## Current narrative path (root first)\n\n```json\n");
        prompt.push_str(&path);
        prompt.push_str("\n```\n\n");
    }

    prompt.push_str("## Instruction\n\n");
    prompt.push_str(if is_root {
        ROOT_INSTRUCTION
    } else {
        CONTINUE_INSTRUCTION
    });
    Ok(prompt)
}

/// Render the system instruction with the advisory path length filled in.
pub fn render_system_instruction(template: &str, target_scenelets_per_path: usize) -> String {
    template.replace(TARGET_PLACEHOLDER, &target_scenelets_per_path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(description: &str) -> ScriptwriterScenelet {
        ScriptwriterScenelet {
            description: description.to_string(),
            dialogue: vec![],
            shot_suggestions: vec!["Close-up".to_string()],
            choice_label: None,
        }
    }

    #[test]
    fn continuation_includes_full_path_in_order() {
        let path = vec![beat("first beat"), beat("second beat")];
        let prompt = assemble_prompt("Constitution", &path, false).unwrap();

        let first = prompt.find("first beat").unwrap();
        let second = prompt.find("second beat").unwrap();
        assert!(first < second);
        assert!(prompt.contains("Current narrative path"));
        assert!(prompt.ends_with(CONTINUE_INSTRUCTION));
    }

    #[test]
    fn root_ignores_path() {
        let prompt = assemble_prompt("Constitution", &[beat("stray")], true).unwrap();
        assert!(!prompt.contains("stray"));
        assert!(prompt.ends_with(ROOT_INSTRUCTION));
    }

    #[test]
    fn empty_path_without_root_has_no_path_section() {
        let prompt = assemble_prompt("Constitution", &[], false).unwrap();
        assert!(!prompt.contains("Current narrative path"));
    }

    #[test]
    fn system_instruction_fills_target() {
        let rendered = render_system_instruction("Aim for {target_scenelets_per_path} beats.", 9);
        assert_eq!(rendered, "Aim for 9 beats.");
    }
}
