//! Decoding scriptwriter responses.
//!
//! A response is exactly one of three shapes, distinguished by the
//! `branch_point` and `is_concluding_scene` flags. Shapes are tried in a fixed
//! order (branch, linear, concluding); each checks both flags before looking
//! at the payload, so a response can never be read as the wrong shape.

use crate::extract_json;
use serde_json::{Map, Value};
use storyloom_core::{ScriptwriterScenelet, validate_scenelet};
use storyloom_error::ValidationError;

/// Which of the three response shapes a response had.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ResponseShape {
    /// Two or more labeled choices
    Branch,
    /// One continuation
    Linear,
    /// One final scenelet ending the path
    Concluding,
}

/// A validated scriptwriter response.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptwriterResponse {
    /// The parent becomes a branch point with these choices
    Branch {
        /// Question shown to the reader
        choice_prompt: String,
        /// One child per choice, at least two
        scenelets: Vec<ScriptwriterScenelet>,
    },
    /// The story continues with one scenelet
    Linear(ScriptwriterScenelet),
    /// The story ends with this scenelet
    Concluding(ScriptwriterScenelet),
}

impl ScriptwriterResponse {
    /// Shape of this response.
    pub fn shape(&self) -> ResponseShape {
        match self {
            Self::Branch { .. } => ResponseShape::Branch,
            Self::Linear(_) => ResponseShape::Linear,
            Self::Concluding(_) => ResponseShape::Concluding,
        }
    }

    /// Every scenelet the response introduces.
    pub fn scenelets(&self) -> &[ScriptwriterScenelet] {
        match self {
            Self::Branch { scenelets, .. } => scenelets,
            Self::Linear(scenelet) | Self::Concluding(scenelet) => std::slice::from_ref(scenelet),
        }
    }

    /// Parse and validate raw model output.
    ///
    /// `context` identifies the task in error messages; scenelet errors are
    /// reported as `"{context} next_scenelets[i]"` plus the offending field.
    ///
    /// # Errors
    ///
    /// Any deviation from the three shapes, or any invalid scenelet, is a
    /// validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyloom_narrative::{ResponseShape, ScriptwriterResponse};
    ///
    /// let text = r#"{
    ///     "branch_point": false,
    ///     "is_concluding_scene": true,
    ///     "next_scenelets": [{"description": "The end.", "shot_suggestions": ["Fade out"]}]
    /// }"#;
    /// let response = ScriptwriterResponse::parse(text, "root").unwrap();
    /// assert_eq!(response.shape(), ResponseShape::Concluding);
    /// ```
    pub fn parse(text: &str, context: &str) -> Result<Self, ValidationError> {
        let json = extract_json(text, context)?;
        let value: Value = serde_json::from_str(&json)
            .map_err(|e| ValidationError::response(context, format!("invalid JSON: {}", e)))?;
        Self::from_value(&value, context)
    }

    /// Classify an already parsed JSON value.
    pub fn from_value(value: &Value, context: &str) -> Result<Self, ValidationError> {
        let object = value
            .as_object()
            .ok_or_else(|| ValidationError::response(context, "response must be a JSON object"))?;
        let flags = Flags::read(object, context)?;

        if let Some(response) = decode_branch(object, flags, context)? {
            return Ok(response);
        }
        if let Some(response) = decode_linear(object, flags, context)? {
            return Ok(response);
        }
        if let Some(response) = decode_concluding(object, flags, context)? {
            return Ok(response);
        }

        Err(ValidationError::response(
            context,
            "branch_point and is_concluding_scene cannot both be true",
        ))
    }
}

#[derive(Debug, Clone, Copy)]
struct Flags {
    branch_point: bool,
    is_concluding_scene: bool,
}

impl Flags {
    fn read(object: &Map<String, Value>, context: &str) -> Result<Self, ValidationError> {
        let flag = |name: &str| {
            object.get(name).and_then(Value::as_bool).ok_or_else(|| {
                ValidationError::response(context, format!("'{}' must be a boolean", name))
            })
        };
        Ok(Self {
            branch_point: flag("branch_point")?,
            is_concluding_scene: flag("is_concluding_scene")?,
        })
    }
}

fn decode_branch(
    object: &Map<String, Value>,
    flags: Flags,
    context: &str,
) -> Result<Option<ScriptwriterResponse>, ValidationError> {
    if !flags.branch_point || flags.is_concluding_scene {
        return Ok(None);
    }

    let choice_prompt = object
        .get("choice_prompt")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .ok_or_else(|| {
            ValidationError::response(context, "branch response needs a non-empty choice_prompt")
        })?;

    let scenelets = next_scenelets(object, context)?;
    if scenelets.len() < 2 {
        return Err(ValidationError::response(
            context,
            format!(
                "branch response needs at least 2 next_scenelets, got {}",
                scenelets.len()
            ),
        ));
    }

    Ok(Some(ScriptwriterResponse::Branch {
        choice_prompt: choice_prompt.to_string(),
        scenelets,
    }))
}

fn decode_linear(
    object: &Map<String, Value>,
    flags: Flags,
    context: &str,
) -> Result<Option<ScriptwriterResponse>, ValidationError> {
    if flags.branch_point || flags.is_concluding_scene {
        return Ok(None);
    }
    single_scenelet(object, context, "linear").map(|s| Some(ScriptwriterResponse::Linear(s)))
}

fn decode_concluding(
    object: &Map<String, Value>,
    flags: Flags,
    context: &str,
) -> Result<Option<ScriptwriterResponse>, ValidationError> {
    if flags.branch_point || !flags.is_concluding_scene {
        return Ok(None);
    }
    single_scenelet(object, context, "concluding")
        .map(|s| Some(ScriptwriterResponse::Concluding(s)))
}

fn single_scenelet(
    object: &Map<String, Value>,
    context: &str,
    shape: &str,
) -> Result<ScriptwriterScenelet, ValidationError> {
    let mut scenelets = next_scenelets(object, context)?;
    if scenelets.len() != 1 {
        return Err(ValidationError::response(
            context,
            format!(
                "{} response needs exactly 1 next_scenelets entry, got {}",
                shape,
                scenelets.len()
            ),
        ));
    }
    Ok(scenelets.remove(0))
}

/// Validate every `next_scenelets` entry; each must carry a shot suggestion.
fn next_scenelets(
    object: &Map<String, Value>,
    context: &str,
) -> Result<Vec<ScriptwriterScenelet>, ValidationError> {
    let entries = object
        .get("next_scenelets")
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::response(context, "'next_scenelets' must be an array"))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let scenelet_id = format!("{} next_scenelets[{}]", context, i);
            let scenelet = validate_scenelet(entry, &scenelet_id)?;
            if scenelet.shot_suggestions.is_empty() {
                return Err(ValidationError::scenelet(
                    scenelet_id,
                    "shot_suggestions",
                    "must contain at least one suggestion",
                ));
            }
            Ok(scenelet)
        })
        .collect()
}
