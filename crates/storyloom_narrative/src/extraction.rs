//! Locating the JSON document inside model output.
//!
//! The model is asked for bare JSON, but replies sometimes arrive wrapped in a
//! markdown fence or with a sentence of prose around them.

use storyloom_error::ValidationError;

/// Extract the JSON object from a model response.
///
/// Tries, in order: the whole trimmed response when it already starts with
/// `{`, the first fenced code block, the first balanced `{ ... }` span.
///
/// # Errors
///
/// Returns a validation error naming `context` when no object is found.
///
/// # Examples
///
/// ```
/// use storyloom_narrative::extract_json;
///
/// let response = "Here is the next beat:\n```json\n{\"branch_point\": false}\n```";
/// assert_eq!(extract_json(response, "root").unwrap(), "{\"branch_point\": false}");
/// ```
pub fn extract_json(response: &str, context: &str) -> Result<String, ValidationError> {
    let trimmed = response.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Ok(trimmed.to_string());
    }

    if let Some(block) = extract_from_code_block(trimmed) {
        return Ok(block);
    }

    if let Some(object) = extract_balanced_object(trimmed) {
        return Ok(object);
    }

    tracing::error!(
        response_length = response.len(),
        context,
        "No JSON object found in model response"
    );
    Err(ValidationError::response(
        context,
        format!(
            "no JSON object found in response (length: {})",
            response.len()
        ),
    ))
}

/// Content of the first ``` fence, language tag skipped.
fn extract_from_code_block(response: &str) -> Option<String> {
    let start = response.find("```")? + 3;
    let body_start = response[start..]
        .find('\n')
        .map(|n| start + n + 1)
        .unwrap_or(start);
    let body = match response[body_start..].find("```") {
        Some(end) => &response[body_start..body_start + end],
        // Unterminated fence: truncated output, take the rest.
        None => &response[body_start..],
    };
    let body = body.trim();
    body.starts_with('{').then(|| body.to_string())
}

/// First `{` through its matching `}`, ignoring braces inside strings.
fn extract_balanced_object(response: &str) -> Option<String> {
    let start = response.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}
