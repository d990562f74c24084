//! Extracting structured data from fill-in responses.
//!
//! Model responses often arrive with the JSON wrapped in markdown fences
//! or mixed with explanatory text. These utilities recover the payload
//! before schema validation; when every strategy fails, the caller falls
//! back to the deterministic fill.

use vignette_error::VignetteResult;

/// Extract JSON from a response that may contain markdown or extra text.
///
/// Strategies, in order:
/// 1. Markdown code blocks: ```json ... ```
/// 2. Balanced braces: { ... }
/// 3. Balanced brackets: [ ... ]
///
/// # Errors
///
/// Returns an error if no JSON-shaped payload is found in the response.
///
/// # Examples
///
/// ```
/// use vignette_pipeline::extract_json;
///
/// let response = "Here is the fill:\n```json\n{\"composition\": \"low over the hatch\"}\n```\n";
/// let json = extract_json(response).unwrap();
/// assert!(json.contains("composition"));
/// ```
pub fn extract_json(response: &str) -> VignetteResult<String> {
    if let Some(json) = extract_from_code_block(response, "json") {
        return Ok(json);
    }

    // Prefer whichever balanced structure appears first
    let bracket_pos = response.find('[');
    let brace_pos = response.find('{');

    match (bracket_pos, brace_pos) {
        (Some(b_pos), Some(c_pos)) if b_pos < c_pos => {
            if let Some(json) = extract_balanced(response, '[', ']') {
                return Ok(json);
            }
            if let Some(json) = extract_balanced(response, '{', '}') {
                return Ok(json);
            }
        }
        (Some(_), None) => {
            if let Some(json) = extract_balanced(response, '[', ']') {
                return Ok(json);
            }
        }
        _ => {
            if let Some(json) = extract_balanced(response, '{', '}') {
                return Ok(json);
            }
            if let Some(json) = extract_balanced(response, '[', ']') {
                return Ok(json);
            }
        }
    }

    tracing::debug!(
        response_length = response.len(),
        "No JSON found in fill-in response"
    );

    Err(vignette_error::BackendError::new(format!(
        "No JSON found in fill-in response (length: {})",
        response.len()
    ))
    .into())
}

/// Extract content from markdown code blocks.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        if let Some(end) = response[content_start..].find("```") {
            let content = &response[content_start..content_start + end];
            return Some(content.trim().to_string());
        }
        // No closing fence; likely a truncated response
        return Some(response[content_start..].trim().to_string());
    }

    if let Some(start) = response.find("```") {
        let content_start = start + 3;
        let skip_to = response[content_start..]
            .find('\n')
            .map(|n| content_start + n + 1)
            .unwrap_or(content_start);

        if let Some(end) = response[skip_to..].find("```") {
            let content = &response[skip_to..skip_to + end];
            return Some(content.trim().to_string());
        }
        return Some(response[skip_to..].trim().to_string());
    }

    None
}

/// Extract content between balanced delimiters, handling nesting and
/// string literals.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
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

/// Parse and validate JSON, returning a specific type.
///
/// # Errors
///
/// Returns an error if the JSON string cannot be parsed into type `T`.
pub fn parse_json<T>(json_str: &str) -> VignetteResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json_str).map_err(|e| {
        let preview = json_str.chars().take(100).collect::<String>();

        tracing::debug!(
            error = %e,
            json_preview = %preview,
            "Fill-in JSON failed schema validation"
        );

        vignette_error::JsonError::new(format!(
            "Failed to parse fill-in JSON: {} (JSON: {}...)",
            e, preview
        ))
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = r#"
Here is the fill you asked for:

```json
{
  "composition": "framed low across the hatch",
  "subjects": []
}
```

Let me know if you need adjustments.
"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("\"composition\""));
    }

    #[test]
    fn test_extract_json_balanced_braces() {
        let response = r#"Sure: {"subjects": [{"character": "mara"}]}"#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
    }

    #[test]
    fn test_no_json_found() {
        let response = "Plain prose with no payload at all";
        assert!(extract_json(response).is_err());
    }

    #[test]
    fn test_extract_json_with_string_escapes() {
        let response = r#"{"action": "mouths \"go\" at the door"}"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("mouths"));
    }

    #[test]
    fn test_parse_json_into_struct() {
        use serde::Deserialize;

        #[derive(Deserialize, Debug)]
        struct Fill {
            composition: String,
        }

        let json = r#"{"composition": "low angle over the hatch"}"#;
        let fill: Fill = parse_json(json).unwrap();
        assert_eq!(fill.composition, "low angle over the hatch");
    }

    #[test]
    fn test_parse_json_rejects_wrong_shape() {
        use serde::Deserialize;

        #[derive(Deserialize, Debug)]
        struct Fill {
            #[allow(dead_code)]
            composition: String,
        }

        assert!(parse_json::<Fill>(r#"{"composition": 42}"#).is_err());
    }
}
