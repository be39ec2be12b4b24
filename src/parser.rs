//! Response normalization
//!
//! Turns Gemini responses into plain text, inline audio, or a validated
//! [`StoryGenerationResult`].

use crate::ai::gemini::types::{GenerateContentResponse, Part};
use crate::models::{AudioPayload, StoryGenerationResult};
use crate::{Error, Result};

pub const MIN_STORY_PROMPTS: usize = 3;
pub const MAX_STORY_PROMPTS: usize = 5;

/// JSON schema declared on the story generation request.
pub fn story_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "story": {
                "type": "STRING",
                "description": "The opening paragraph of the story."
            },
            "prompts": {
                "type": "ARRAY",
                "description": "Inspiration prompts or questions for continuing the story.",
                "items": { "type": "STRING" },
                "minItems": MIN_STORY_PROMPTS,
                "maxItems": MAX_STORY_PROMPTS
            }
        },
        "required": ["story", "prompts"],
        "propertyOrdering": ["story", "prompts"]
    })
}

/// Decode and validate schema-constrained story output.
///
/// Never returns a partially decoded result.
pub fn parse_story_generation(raw: &str) -> Result<StoryGenerationResult> {
    let body = strip_code_fence(raw.trim());

    let result: StoryGenerationResult = serde_json::from_str(body)
        .map_err(|e| Error::StructuredOutput(format!("Invalid story JSON: {}", e)))?;

    if result.story.trim().is_empty() {
        return Err(Error::StructuredOutput("Story text is empty".to_string()));
    }

    let count = result.prompts.len();
    if !(MIN_STORY_PROMPTS..=MAX_STORY_PROMPTS).contains(&count) {
        return Err(Error::StructuredOutput(format!(
            "Expected {}-{} inspiration prompts, got {}",
            MIN_STORY_PROMPTS, MAX_STORY_PROMPTS, count
        )));
    }

    if result.prompts.iter().any(|p| p.trim().is_empty()) {
        return Err(Error::StructuredOutput(
            "Inspiration prompt is empty".to_string(),
        ));
    }

    Ok(result)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Concatenated text parts of the first candidate.
pub fn extract_text(response: &GenerateContentResponse) -> Result<String> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| Error::AiProvider("No candidates in Gemini response".to_string()))?;

    let texts: Vec<&str> = candidate
        .content
        .parts
        .iter()
        .filter_map(|p| match p {
            Part::Text { text } => Some(text.as_str()),
            Part::InlineData { .. } => None,
        })
        .collect();

    if texts.is_empty() {
        return Err(Error::AiProvider(
            "No text in Gemini response".to_string(),
        ));
    }

    Ok(texts.concat())
}

/// Inline data of the first candidate's first part, if any.
pub fn extract_audio(response: &GenerateContentResponse) -> Option<AudioPayload> {
    let part = response.candidates.first()?.content.parts.first()?;
    match part {
        Part::InlineData { inline_data } if !inline_data.data.is_empty() => Some(AudioPayload {
            data: inline_data.data.clone(),
            mime_type: inline_data.mime_type.clone(),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_story_generation_accepts_valid_payload() {
        let raw = r#"
            {"story": "Rain hammered the pier.", "prompts": ["Who waits?", "Why now?", "What is hidden?"]}
        "#;

        let result = parse_story_generation(raw).unwrap();
        assert_eq!(result.story, "Rain hammered the pier.");
        assert_eq!(result.prompts.len(), 3);
    }

    #[test]
    fn test_parse_story_generation_accepts_fenced_json() {
        let raw = "```json\n{\"story\": \"A.\", \"prompts\": [\"1\", \"2\", \"3\", \"4\"]}\n```";
        let result = parse_story_generation(raw).unwrap();
        assert_eq!(result.prompts, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_parse_story_generation_rejects_prompt_count_out_of_range() {
        let too_few = r#"{"story": "A.", "prompts": ["1", "2"]}"#;
        let too_many = r#"{"story": "A.", "prompts": ["1", "2", "3", "4", "5", "6"]}"#;

        for raw in [too_few, too_many] {
            let err = parse_story_generation(raw).unwrap_err();
            assert!(matches!(err, Error::StructuredOutput(_)));
        }
    }

    #[test]
    fn test_parse_story_generation_rejects_missing_fields_and_garbage() {
        for raw in [
            r#"{"prompts": ["1", "2", "3"]}"#,
            r#"{"story": "A."}"#,
            r#"{"story": "   ", "prompts": ["1", "2", "3"]}"#,
            r#"{"story": "A.", "prompts": ["1", "", "3"]}"#,
            "not json at all",
            "",
        ] {
            let err = parse_story_generation(raw).unwrap_err();
            assert!(matches!(err, Error::StructuredOutput(_)), "{}", raw);
        }
    }

    #[test]
    fn test_schema_requires_story_and_prompts() {
        let schema = story_response_schema();
        assert_eq!(schema["required"], serde_json::json!(["story", "prompts"]));
        assert_eq!(schema["properties"]["prompts"]["minItems"], 3);
        assert_eq!(schema["properties"]["prompts"]["maxItems"], 5);
    }

    #[test]
    fn test_extract_text_joins_text_parts() {
        let resp = response(serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Hello, " }, { "text": "world" }] }
            }]
        }));
        assert_eq!(extract_text(&resp).unwrap(), "Hello, world");
    }

    #[test]
    fn test_extract_text_rejects_empty_candidates() {
        let resp = response(serde_json::json!({ "candidates": [] }));
        assert!(matches!(extract_text(&resp), Err(Error::AiProvider(_))));

        let resp = response(serde_json::json!({}));
        assert!(matches!(extract_text(&resp), Err(Error::AiProvider(_))));
    }

    #[test]
    fn test_extract_audio_reads_first_part() {
        let resp = response(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAAA" }
                    }]
                }
            }]
        }));

        let audio = extract_audio(&resp).unwrap();
        assert_eq!(audio.data, "AAAA");
        assert_eq!(audio.mime_type, "audio/L16;codec=pcm;rate=24000");
    }

    #[test]
    fn test_extract_audio_absent_without_inline_data() {
        let text_only = response(serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "no audio" }] } }]
        }));
        assert!(extract_audio(&text_only).is_none());

        let no_content = response(serde_json::json!({ "candidates": [{}] }));
        assert!(extract_audio(&no_content).is_none());
    }
}
