use serde_json::{Value, json};

/// Simple particles the model is told to leave out of the breakdown
pub const SKIPPED_PARTICLES: [&str; 6] = ["は", "を", "が", "に", "と", "も"];

/// Fixed task description sent with every image
pub const INSTRUCTION: &str = "Perform a non-trivial grammatical analysis on this Japanese image.
1. Extract the full text.
2. Provide a natural English translation.
3. Break down ONLY the significant grammatical components.
   - IGNORE punctuation, footnote markers, and simple particles like は, を, が, に, と, も.
   - FOCUS on verbs, adjectives, compound nouns, and advanced grammar patterns.
For each significant component, provide the surface form, reading (hiragana), and a concise English definition or grammatical function.";

/// Schema the model's JSON reply is constrained to
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "originalText": {
                "type": "STRING",
                "description": "The full original Japanese text."
            },
            "translation": {
                "type": "STRING",
                "description": "A natural English translation."
            },
            "tokens": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "surface": { "type": "STRING", "description": "The Japanese word or phrase." },
                        "reading": { "type": "STRING", "description": "Reading in hiragana." },
                        "definition": { "type": "STRING", "description": "English meaning or function." },
                        "notes": { "type": "STRING", "description": "Optional nuance." }
                    },
                    "required": ["surface", "reading", "definition"]
                }
            }
        },
        "required": ["originalText", "translation", "tokens"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_lists_every_skipped_particle() {
        for particle in SKIPPED_PARTICLES {
            assert!(INSTRUCTION.contains(particle), "missing {particle}");
        }
        assert!(INSTRUCTION.contains("punctuation"));
        assert!(INSTRUCTION.contains("footnote markers"));
    }

    #[test]
    fn test_schema_required_fields() {
        let schema = response_schema();
        assert_eq!(
            schema["required"],
            json!(["originalText", "translation", "tokens"])
        );
        let token = &schema["properties"]["tokens"]["items"];
        assert_eq!(token["required"], json!(["surface", "reading", "definition"]));
        assert!(token["properties"].get("notes").is_some());
    }
}
