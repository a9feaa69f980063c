use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Stored text of a user turn submitted with an image and no words.
pub const IMAGE_ONLY_PROMPT: &str = "Analyze this image.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Raw image bytes plus the media type they were acquired as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: u64,
    pub role: Role,
    pub text: String,
    pub image: Option<ImageAttachment>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    pub turns: Vec<Turn>,
    pub pending: bool,
    pub error: Option<String>,
}

/// Everything needed to ask for a reply to the turn that was just appended.
#[derive(Debug, Clone)]
pub struct Submission {
    pub prompt: String,
    pub image: Option<ImageAttachment>,
    /// Turns strictly before the new one.
    pub history: Vec<Turn>,
    pub generation: u64,
}

pub struct ConversationState {
    conversation: Conversation,
    staged_image: Option<ImageAttachment>,
    generation: u64,
    next_turn_id: u64,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            conversation: Conversation::default(),
            staged_image: None,
            generation: 0,
            next_turn_id: 1,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn turns(&self) -> &[Turn] {
        &self.conversation.turns
    }

    pub fn is_pending(&self) -> bool {
        self.conversation.pending
    }

    pub fn error(&self) -> Option<&str> {
        self.conversation.error.as_deref()
    }

    pub fn staged_image(&self) -> Option<&ImageAttachment> {
        self.staged_image.as_ref()
    }

    pub fn stage_image(&mut self, image: ImageAttachment) {
        self.staged_image = Some(image);
    }

    pub fn clear_staged_image(&mut self) {
        self.staged_image = None;
    }

    /// Append a user turn and enter the pending state.
    ///
    /// Returns `None`, leaving everything untouched, when there is nothing to
    /// send or a request is already outstanding. An accepted submission
    /// consumes the staged image.
    pub fn submit(
        &mut self,
        text: Option<&str>,
        image: Option<ImageAttachment>,
    ) -> Option<Submission> {
        if self.conversation.pending {
            debug!("Ignoring submission while a request is pending");
            return None;
        }

        let text = text.unwrap_or_default();
        let blank = text.trim().is_empty();
        if blank && image.is_none() {
            return None;
        }

        let prompt = if blank {
            IMAGE_ONLY_PROMPT.to_string()
        } else {
            text.to_string()
        };

        let history = self.conversation.turns.clone();
        let turn = self.new_turn(Role::User, prompt.clone(), image.clone());
        self.conversation.turns.push(turn);
        self.conversation.pending = true;
        self.conversation.error = None;
        self.staged_image = None;

        Some(Submission {
            prompt,
            image,
            history,
            generation: self.generation,
        })
    }

    /// Record the model's reply. Returns whether it was applied.
    pub fn resolve(&mut self, generation: u64, response_text: impl Into<String>) -> bool {
        if !self.accepts_completion(generation) {
            return false;
        }

        let turn = self.new_turn(Role::Model, response_text.into(), None);
        self.conversation.turns.push(turn);
        self.conversation.pending = false;
        true
    }

    /// Record a failed request. Returns whether it was applied.
    pub fn fail(&mut self, generation: u64, error_message: impl Into<String>) -> bool {
        if !self.accepts_completion(generation) {
            return false;
        }

        self.conversation.pending = false;
        self.conversation.error = Some(error_message.into());
        true
    }

    /// Start over. Any request still in flight belongs to the old generation
    /// and its completion will be dropped.
    pub fn reset(&mut self) {
        self.conversation = Conversation::default();
        self.staged_image = None;
        self.generation += 1;
    }

    fn accepts_completion(&self, generation: u64) -> bool {
        if generation != self.generation {
            warn!(
                "Dropping completion for generation {} (current is {})",
                generation, self.generation
            );
            return false;
        }
        if !self.conversation.pending {
            warn!("Dropping completion with no request pending");
            return false;
        }
        true
    }

    fn new_turn(&mut self, role: Role, text: String, image: Option<ImageAttachment>) -> Turn {
        let id = self.next_turn_id;
        self.next_turn_id += 1;
        Turn {
            id,
            role,
            text,
            image,
            created_at: Utc::now(),
        }
    }
}
