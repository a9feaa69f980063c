use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::ValueEnum;
use tracing::{debug, info};

use super::conversation_state::{ImageAttachment, Turn};
use crate::error::InsightError;
use crate::gemini_client::{
    Content, ContentGenerator, GenerateContentRequest, GenerationConfig, Part,
};

/// Returned instead of an error when the model answers with no text.
pub const NO_RESPONSE: &str = "No response generated.";

/// Low temperature keeps repeated troubleshooting advice consistent.
pub const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 0.4,
    top_p: 0.9,
};

const SKILL_LEVEL_TOKEN: &str = "{{SKILL_LEVEL}}";

const SYSTEM_INSTRUCTION_TEMPLATE: &str = r#"You are Circuit Insight, a senior electronics engineer and a patient bench mentor. You help people diagnose and repair circuits, boards, power supplies and hobby electronics projects.

The user has described their experience as: {{SKILL_LEVEL}}. Match the depth of every explanation to that level. Define jargon when the user is new, skip the basics when they are not, and always explain why a step matters before telling them to do it.

# Mentoring style
- Ask one clarifying question when the symptom is ambiguous instead of guessing.
- Prefer measurements the user can take with a multimeter before suggesting part swaps.
- Walk through faults from the power source outward.
- Be honest about uncertainty and say which observation would settle it.

# When the user shares an image
Your response MUST be structured with these sections, in this order:

### Safety Check
Call out hazards visible or implied in the image: mains voltage, charged capacitors, damaged batteries, heat damage, missing insulation. Say whether it is safe to keep working with power applied. If nothing looks hazardous, say so explicitly.

### Component Identification
List the components you can identify, with reference designators or markings where readable, and note anything that looks burnt, swollen, cracked, cold-soldered or misplaced.

### Diagnosis
Explain the most likely causes of the problem, most probable first.

### Next Steps
Give a short, numbered list of checks or fixes for the user to try next.

Without an image, answer conversationally but keep safety warnings up front whenever mains power, batteries or high-energy circuits are involved."#;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn label(self) -> &'static str {
        match self {
            SkillLevel::Beginner => "Beginner",
            SkillLevel::Intermediate => "Intermediate",
            SkillLevel::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SkillLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s.trim(), true).map_err(|_| {
            format!(
                "Unknown skill level '{}'. Use beginner, intermediate or advanced.",
                s.trim()
            )
        })
    }
}

pub fn system_instruction(skill_level: SkillLevel) -> String {
    SYSTEM_INSTRUCTION_TEMPLATE.replace(SKILL_LEVEL_TOKEN, skill_level.label())
}

fn image_part(image: &ImageAttachment) -> Part {
    Part::inline_data(image.mime_type.clone(), BASE64.encode(&image.data))
}

fn history_content(turn: &Turn) -> Content {
    let mut parts = vec![Part::text(turn.text.clone())];
    if let Some(image) = &turn.image {
        parts.push(image_part(image));
    }
    Content {
        role: Some(turn.role.as_str().to_string()),
        parts,
    }
}

/// Shape one `generateContent` request: prior turns in order, then the new
/// user turn with its image ahead of the text.
pub fn build_request(
    prompt: &str,
    history: &[Turn],
    skill_level: SkillLevel,
    image: Option<&ImageAttachment>,
) -> GenerateContentRequest {
    let mut contents: Vec<Content> = history.iter().map(history_content).collect();

    let mut parts = Vec::with_capacity(2);
    if let Some(image) = image {
        parts.push(image_part(image));
    }
    parts.push(Part::text(prompt));
    contents.push(Content {
        role: Some("user".to_string()),
        parts,
    });

    GenerateContentRequest {
        system_instruction: Content {
            role: None,
            parts: vec![Part::text(system_instruction(skill_level))],
        },
        contents,
        generation_config: GENERATION_CONFIG,
    }
}

/// Ask the model about one user turn. Makes exactly one call and never retries.
pub async fn get_electronics_insight(
    generator: &dyn ContentGenerator,
    prompt: &str,
    history: &[Turn],
    skill_level: SkillLevel,
    image: Option<&ImageAttachment>,
) -> Result<String, InsightError> {
    let request = build_request(prompt, history, skill_level, image);
    debug!(
        history = history.len(),
        with_image = image.is_some(),
        skill = %skill_level,
        "Requesting insight"
    );

    let response = generator.generate_content(&request).await?;

    match response.text() {
        Some(text) => Ok(text),
        None => {
            info!(
                finish_reason = response.finish_reason().unwrap_or("none"),
                "Model returned no text, using fallback"
            );
            Ok(NO_RESPONSE.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::error::InsightError;
    use crate::gemini_client::{ContentGenerator, GenerateContentRequest, GenerateContentResponse};

    /// Generator that replays queued results and records every request.
    pub struct MockGenerator {
        responses: Mutex<VecDeque<Result<GenerateContentResponse, InsightError>>>,
        requests: Mutex<Vec<GenerateContentRequest>>,
    }

    impl MockGenerator {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn replying(text: &str) -> Self {
            let mock = Self::new();
            mock.queue_text(text);
            mock
        }

        pub fn failing(error: InsightError) -> Self {
            let mock = Self::new();
            mock.queue_error(error);
            mock
        }

        pub fn queue_text(&self, text: &str) {
            let response = serde_json::from_value(json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": text }] },
                    "finishReason": "STOP"
                }]
            }))
            .unwrap();
            self.responses.lock().unwrap().push_back(Ok(response));
        }

        pub fn queue_empty(&self) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(GenerateContentResponse::default()));
        }

        pub fn queue_error(&self, error: InsightError) {
            self.responses.lock().unwrap().push_back(Err(error));
        }

        pub fn recorded_requests(&self) -> Vec<GenerateContentRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentGenerator for MockGenerator {
        async fn generate_content(
            &self,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse, InsightError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(InsightError::Transport("No mock response queued".into())))
        }
    }
}
