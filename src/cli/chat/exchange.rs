use tracing::{error, info};

use super::conversation_state::{ConversationState, ImageAttachment};
use super::insight::{get_electronics_insight, SkillLevel};
use crate::error::InsightError;
use crate::gemini_client::ContentGenerator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Nothing to send, or a request was already pending.
    Ignored,
    Answered(String),
    Failed(String),
}

/// Run one user turn end to end: submit, ask the model, then resolve or fail.
///
/// This is the only place inference failures are turned into conversation
/// errors.
pub async fn exchange(
    state: &mut ConversationState,
    generator: &dyn ContentGenerator,
    skill_level: SkillLevel,
    text: Option<&str>,
    image: Option<ImageAttachment>,
) -> ExchangeOutcome {
    let Some(submission) = state.submit(text, image) else {
        return ExchangeOutcome::Ignored;
    };

    let result = get_electronics_insight(
        generator,
        &submission.prompt,
        &submission.history,
        skill_level,
        submission.image.as_ref(),
    )
    .await;

    settle(state, submission.generation, result)
}

/// Apply a finished request to the store. A completion the store refuses
/// (stale generation, nothing pending) reports as `Ignored`.
fn settle(
    state: &mut ConversationState,
    generation: u64,
    result: Result<String, InsightError>,
) -> ExchangeOutcome {
    match result {
        Ok(text) => {
            info!("Received reply ({} chars)", text.len());
            if state.resolve(generation, text.clone()) {
                ExchangeOutcome::Answered(text)
            } else {
                ExchangeOutcome::Ignored
            }
        }
        Err(e) => {
            let message = e.user_message();
            error!(status = ?e.status(), "Insight request failed: {}", message);
            if state.fail(generation, message.clone()) {
                ExchangeOutcome::Failed(message)
            } else {
                ExchangeOutcome::Ignored
            }
        }
    }
}
