//! Chat completion request construction.

use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "mistralai/mistral-7b-instruct";

pub const TEMPERATURE: f32 = 0.2;

pub const SYSTEM_PROMPT: &str =
    "You are an assistant that converts raw IELTS PDF text into structured HTML and question JSON.";

const PASSAGE_REQUIREMENTS: &str = r#"  passageHtml: string;            // HTML for the reading passage.
  // Requirements:
  // 1. First output the italic introductory description line in its own <p><i>...</i></p>, e.g. "You should spend about 20 minutes on Questions 1-16, which are based on Reading Passage 1 below." If such a line exists in the RAW TEXT, reuse it; otherwise synthesise the standard sentence.
  // 2. Immediately AFTER the intro line, detect the actual passage TITLE (the next non-empty line) and wrap it in <h2 style="text-align:center"><b>...</b></h2>. Do NOT invent generic titles like "Reading Passage 1", use the real title present in the text.
  // 3. Treat every blank line in RAW TEXT as a paragraph break. Two or more consecutive newlines always start a new paragraph. Wrap each paragraph in its own <p>...</p>.
  // 4. NEVER nest paragraphs or merge multiple paragraphs into a single <p>.
  // 5. Escape internal newlines inside <p> nodes as \n."#;

const QUESTION_SCHEMA: &str = r#"  questions: {
    id: number;
    text: string;
    type: "multiple-choice" | "fill-blank" | "true-false";
    options?: { value: string; text: string }[];
    correctAnswer: string;
    explanation?: string;
    relevantText?: string;
  }[];
}"#;

const OUTPUT_RULES: &str = r#"Rules:
1. Do NOT wrap the JSON in markdown fences or back-ticks.
2. Escape every newline in passageHtml as \n.
3. Output must be compact single-line JSON starting with { and ending with }. Nothing before or after."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of a non-streaming chat completion call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub stream: bool,
}

/// User message embedding `raw` and the JSON contract the model must follow.
pub fn build_user_prompt(raw: &str) -> String {
    format!(
        "You are an assistant that converts raw IELTS PDF text into structured JSON.\n\n\
         Input (RAW TEXT):\n{raw}\n\n\
         Return ONLY valid JSON matching this exact TypeScript interface:\n\
         interface Result {{\n{PASSAGE_REQUIREMENTS}\n\n{QUESTION_SCHEMA}\n\n{OUTPUT_RULES}"
    )
}

pub fn build_request(model: &str, raw: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::new(Role::System, SYSTEM_PROMPT),
            ChatMessage::new(Role::User, build_user_prompt(raw)),
        ],
        temperature: TEMPERATURE,
        stream: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = build_request(DEFAULT_MODEL, "RAW");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["model"], "mistralai/mistral-7b-instruct");
        assert_eq!(json["stream"], false);
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][0]["content"], SYSTEM_PROMPT);
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_user_prompt_embeds_raw_text_and_contract() {
        let prompt = build_user_prompt("The history of glass");

        assert!(prompt.contains("Input (RAW TEXT):\nThe history of glass\n"));
        assert!(prompt.contains("interface Result {"));
        assert!(prompt.contains("passageHtml: string;"));
        assert!(prompt.contains(r#"type: "multiple-choice" | "fill-blank" | "true-false";"#));
        assert!(prompt.contains("Do NOT wrap the JSON in markdown fences"));
        assert!(prompt.ends_with("Nothing before or after."));
    }

    #[test]
    fn test_newline_escape_is_a_single_backslash() {
        let prompt = build_user_prompt("x");

        assert!(prompt.contains(r"inside <p> nodes as \n."));
        assert!(prompt.contains(r"in passageHtml as \n."));
        assert!(!prompt.contains(r"\\n"));
    }

    #[test]
    fn test_empty_raw_text_still_builds() {
        let request = build_request("m", "");
        assert_eq!(request.messages.len(), 2);
        assert!(request.messages[1].content.contains("Input (RAW TEXT):\n\n"));
    }
}
