//! Scenelet content schema and validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use storyloom_error::ValidationError;

/// One spoken line inside a scenelet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogueLine {
    /// Who speaks the line
    pub character: String,
    /// What is said
    pub line: String,
}

/// Narrative payload of a single scenelet.
///
/// `choice_label` is only present on scenelets that are one of the choices of
/// a branch point. A blank label is never stored: it is omitted from both the
/// struct and its serialized form.
///
/// # Examples
///
/// ```
/// use storyloom_core::ScriptwriterScenelet;
/// use serde_json::json;
///
/// let scenelet = ScriptwriterScenelet::from_json(
///     &json!({
///         "description": "Rain on the harbor.",
///         "shot_suggestions": ["Wide shot of the docks"],
///         "choice_label": "  "
///     }),
///     "root",
/// )
/// .unwrap();
///
/// assert!(scenelet.dialogue.is_empty());
/// assert_eq!(scenelet.choice_label, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptwriterScenelet {
    /// What happens in this beat
    pub description: String,
    /// Spoken lines, in order
    #[serde(default)]
    pub dialogue: Vec<DialogueLine>,
    /// Camera/shot ideas for the storyboard stage
    pub shot_suggestions: Vec<String>,
    /// Label of the choice that leads here, when the parent is a branch point
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_label: Option<String>,
}

impl ScriptwriterScenelet {
    /// Validate raw JSON and normalize it into a scenelet.
    ///
    /// See [`validate_scenelet`].
    pub fn from_json(value: &Value, scenelet_id: &str) -> Result<Self, ValidationError> {
        validate_scenelet(value, scenelet_id)
    }
}

/// Validate parsed JSON that claims to be a scenelet.
///
/// `scenelet_id` only labels errors; it is whatever identifies the scenelet
/// to a human (a persisted id, or a position such as `next_scenelets[1]`).
///
/// Rules:
/// - `description` is a required non-empty string (trimmed)
/// - `dialogue` is optional; when present every entry needs non-empty
///   `character` and `line` strings
/// - `shot_suggestions` is a required array of non-empty strings
/// - `choice_label` is optional and dropped when blank
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the scenelet and the offending field
/// path, e.g. `dialogue[2].line`.
pub fn validate_scenelet(
    value: &Value,
    scenelet_id: &str,
) -> Result<ScriptwriterScenelet, ValidationError> {
    let object = value
        .as_object()
        .ok_or_else(|| ValidationError::scenelet(scenelet_id, "$", "must be a JSON object"))?;

    let description = required_text(object, "description", "description", scenelet_id)?;

    let dialogue = match object.get("dialogue") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| dialogue_line(entry, index, scenelet_id))
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ValidationError::scenelet(
                scenelet_id,
                "dialogue",
                "must be an array",
            ));
        }
    };

    let shot_suggestions = match object.get("shot_suggestions") {
        Some(Value::Array(entries)) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                non_empty_text(entry, &format!("shot_suggestions[{index}]"), scenelet_id)
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ValidationError::scenelet(
                scenelet_id,
                "shot_suggestions",
                "must be an array",
            ));
        }
        None => {
            return Err(ValidationError::scenelet(
                scenelet_id,
                "shot_suggestions",
                "is required",
            ));
        }
    };

    let choice_label = match object.get("choice_label") {
        None | Some(Value::Null) => None,
        Some(Value::String(label)) => {
            let label = label.trim();
            (!label.is_empty()).then(|| label.to_string())
        }
        Some(_) => {
            return Err(ValidationError::scenelet(
                scenelet_id,
                "choice_label",
                "must be a string",
            ));
        }
    };

    Ok(ScriptwriterScenelet {
        description,
        dialogue,
        shot_suggestions,
        choice_label,
    })
}

/// Deep copy of a scenelet that applies the same blank-label omission rule as
/// the validator.
pub fn clone_scenelet(scenelet: &ScriptwriterScenelet) -> ScriptwriterScenelet {
    ScriptwriterScenelet {
        description: scenelet.description.clone(),
        dialogue: scenelet.dialogue.to_vec(),
        shot_suggestions: scenelet.shot_suggestions.to_vec(),
        choice_label: scenelet
            .choice_label
            .as_ref()
            .filter(|label| !label.trim().is_empty())
            .cloned(),
    }
}

fn dialogue_line(
    entry: &Value,
    index: usize,
    scenelet_id: &str,
) -> Result<DialogueLine, ValidationError> {
    let path = format!("dialogue[{index}]");
    let object = entry
        .as_object()
        .ok_or_else(|| ValidationError::scenelet(scenelet_id, &path, "must be an object"))?;

    Ok(DialogueLine {
        character: required_text(
            object,
            "character",
            &format!("{path}.character"),
            scenelet_id,
        )?,
        line: required_text(object, "line", &format!("{path}.line"), scenelet_id)?,
    })
}

fn required_text(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    scenelet_id: &str,
) -> Result<String, ValidationError> {
    match object.get(key) {
        Some(value) => non_empty_text(value, path, scenelet_id),
        None => Err(ValidationError::scenelet(scenelet_id, path, "is required")),
    }
}

fn non_empty_text(value: &Value, path: &str, scenelet_id: &str) -> Result<String, ValidationError> {
    value
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(String::from)
        .ok_or_else(|| ValidationError::scenelet(scenelet_id, path, "must be a non-empty string"))
}
