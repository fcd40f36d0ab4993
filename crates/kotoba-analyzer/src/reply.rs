use kotoba_types::AnalysisResult;

use crate::AnalysisError;

/// Parse the model's JSON text into a validated result. All or nothing.
pub fn parse_reply(text: &str) -> Result<AnalysisResult, AnalysisError> {
    let text = strip_code_fence(text.trim());
    if text.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let result: AnalysisResult = serde_json::from_str(text)?;
    result
        .validate()
        .map_err(|e| AnalysisError::Schema(e.to_string()))?;

    Ok(result)
}

/// Models occasionally wrap JSON in a markdown fence despite the mime type
fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{"originalText":"猫が好きです","translation":"I like cats","tokens":[{"surface":"好き","reading":"すき","definition":"to like (na-adjective)"}]}"#;

    #[test]
    fn test_well_formed_reply() {
        let result = parse_reply(WELL_FORMED).unwrap();

        assert_eq!(result.original_text, "猫が好きです");
        assert_eq!(result.translation, "I like cats");
        assert_eq!(result.tokens.len(), 1);
        assert_eq!(result.tokens[0].surface, "好き");
        assert_eq!(result.tokens[0].reading, "すき");
        assert_eq!(result.tokens[0].definition, "to like (na-adjective)");
        assert_eq!(result.tokens[0].notes, None);
    }

    #[test]
    fn test_token_order_and_notes_preserved() {
        let text = r#"{
            "originalText": "雨が降り始めた",
            "translation": "It started to rain",
            "tokens": [
                {"surface": "降り始めた", "reading": "ふりはじめた", "definition": "started to fall", "notes": "V-stem + 始める"},
                {"surface": "雨", "reading": "あめ", "definition": "rain"}
            ]
        }"#;
        let result = parse_reply(text).unwrap();

        assert_eq!(result.tokens[0].surface, "降り始めた");
        assert_eq!(result.tokens[0].notes.as_deref(), Some("V-stem + 始める"));
        assert_eq!(result.tokens[1].surface, "雨");
    }

    #[test]
    fn test_empty_token_list_is_valid() {
        let result =
            parse_reply(r#"{"originalText":"はい","translation":"Yes","tokens":[]}"#).unwrap();
        assert!(result.tokens.is_empty());
    }

    #[test]
    fn test_missing_tokens_field_fails() {
        let result = parse_reply(r#"{"originalText":"猫","translation":"cat"}"#);
        assert!(matches!(result, Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn test_missing_token_definition_fails() {
        let result = parse_reply(
            r#"{"originalText":"猫","translation":"cat","tokens":[{"surface":"猫","reading":"ねこ"}]}"#,
        );
        assert!(matches!(result, Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn test_malformed_json_fails() {
        let result = parse_reply(r#"{"originalText":"猫","translation":"#);
        assert!(matches!(result, Err(AnalysisError::Malformed(_))));
    }

    #[test]
    fn test_blank_reply_fails() {
        assert!(matches!(parse_reply("   "), Err(AnalysisError::EmptyResponse)));
    }

    #[test]
    fn test_blank_translation_is_schema_violation() {
        let result = parse_reply(r#"{"originalText":"猫","translation":" ","tokens":[]}"#);
        assert!(matches!(result, Err(AnalysisError::Schema(_))));
    }

    #[test]
    fn test_fenced_reply() {
        let fenced = format!("```json\n{}\n```", WELL_FORMED);
        assert_eq!(parse_reply(&fenced).unwrap().tokens.len(), 1);
    }
}
