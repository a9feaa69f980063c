pub mod command;
pub mod conversation_state;
pub mod exchange;
pub mod image;
pub mod insight;
pub mod prompt;
pub mod suggestions;

use std::io::Write;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use color_print::cformat;
use command::Command;
use conversation_state::{ConversationState, Role, Turn};
use exchange::{ExchangeOutcome, exchange};
use eyre::{Result, eyre};
use insight::SkillLevel;
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use tracing::{error, info};

use crate::config::Config;
use crate::gemini_client::{ContentGenerator, GeminiClient};

const HELP_TEXT: &str = "
Circuit Insight

/image <path>   Attach an image to your next message
/unstage        Drop the attached image
/skill [level]  Show or set your level (beginner, intermediate, advanced)
/history        Show the conversation so far
/clear          Start a new conversation
/help           Show this help dialogue
/quit           Quit the application

Press Enter on an empty line to send a staged image on its own.
";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    image_path: Option<PathBuf>,
    interactive: bool,
    skill_level: SkillLevel,
    suggestion_seed: u64,
    config: Config,
    conversation_state: ConversationState,
    gemini_client: Option<Box<dyn ContentGenerator>>,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        config: Config,
        input: Option<String>,
        image_path: Option<PathBuf>,
        skill_level: SkillLevel,
        suggestion_seed: u64,
    ) -> Self {
        let interactive = input.is_none();
        Self {
            output,
            input,
            image_path,
            interactive,
            skill_level,
            suggestion_seed,
            config,
            conversation_state: ConversationState::new(),
            gemini_client: None,
        }
    }

    /// Use an already built generator instead of connecting to Gemini.
    pub fn with_generator(mut self, generator: Box<dyn ContentGenerator>) -> Self {
        self.gemini_client = Some(generator);
        self
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.gemini_client.is_none() {
            match GeminiClient::new(&self.config) {
                Ok(client) => {
                    info!("Using {}", client.model_endpoint());
                    self.gemini_client = Some(Box::new(client));
                }
                Err(e) => {
                    error!(
                        configuration = e.is_configuration(),
                        "Could not start Gemini client: {}", e
                    );
                    writeln!(self.output, "Failed to initialize Gemini client: {}", e)?;
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        if let Some(path) = self.image_path.take() {
            if let Err(e) = self.stage_image(&path) {
                writeln!(self.output, "{}", cformat!("<red>Error:</> {}", e))?;
                return Ok(ExitCode::FAILURE);
            }
        }

        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            let outcome = self.process_chat_input(&input).await?;
            return Ok(match outcome {
                ExchangeOutcome::Answered(_) => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            });
        }

        if self.interactive {
            self.print_welcome()?;
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "\nHi, I'm Circuit Insight. Tell me what your circuit is doing, or show me a photo.\n"
        )?;
        writeln!(self.output, "Things to try")?;
        for suggestion in suggestions::starter_suggestions(self.suggestion_seed, 3) {
            writeln!(self.output, "• {}", suggestion)?;
        }
        writeln!(self.output, "\n/help         Show the help dialogue")?;
        writeln!(self.output, "/quit         Quit the application\n")?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(
                self.skill_level,
                self.conversation_state.staged_image().is_some(),
            );

            match rl.readline(&prompt_text) {
                Ok(line) => {
                    if line.trim().is_empty() && self.conversation_state.staged_image().is_none() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    match self.handle_input(&line).await {
                        Ok(ControlFlow::Break(())) => break,
                        Ok(ControlFlow::Continue(())) => {}
                        Err(e) => writeln!(self.output, "Error: {}", e)?,
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<ControlFlow<()>> {
        let command = match Command::parse(input) {
            Ok(command) => command,
            Err(message) => {
                writeln!(self.output, "{}", message)?;
                return Ok(ControlFlow::Continue(()));
            }
        };

        match command {
            Command::Quit => return Ok(ControlFlow::Break(())),
            Command::Help => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            Command::Clear => {
                self.conversation_state.reset();
                writeln!(self.output, "Conversation cleared.")?;
            }
            Command::History => self.print_history()?,
            Command::StageImage(path) => {
                if let Err(e) = self.stage_image(&path) {
                    writeln!(self.output, "{}", cformat!("<red>Error:</> {}", e))?;
                }
            }
            Command::Unstage => {
                self.conversation_state.clear_staged_image();
                writeln!(self.output, "Image removed.")?;
            }
            Command::Skill(None) => {
                writeln!(self.output, "Skill level: {}", self.skill_level)?;
            }
            Command::Skill(Some(level)) => {
                self.skill_level = level;
                info!("Skill level set to {}", level);
                writeln!(self.output, "Skill level set to {}.", level)?;
            }
            Command::Ask(text) => {
                self.process_chat_input(&text).await?;
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    fn stage_image(&mut self, path: &Path) -> Result<()> {
        let image = image::load_image(path)?;
        writeln!(
            self.output,
            "Attached {} ({}, {} bytes). It will be sent with your next message.",
            path.display(),
            image.mime_type,
            image.data.len()
        )?;
        self.conversation_state.stage_image(image);
        Ok(())
    }

    async fn process_chat_input(&mut self, input: &str) -> Result<ExchangeOutcome> {
        let generator = self
            .gemini_client
            .as_deref()
            .ok_or_else(|| eyre!("Gemini client not initialized"))?;

        let image = self.conversation_state.staged_image().cloned();
        let outcome = exchange(
            &mut self.conversation_state,
            generator,
            self.skill_level,
            Some(input),
            image,
        )
        .await;

        match &outcome {
            ExchangeOutcome::Answered(_) => {
                if let Some(turn) = self.conversation_state.turns().last() {
                    writeln!(self.output, "{}\n", render_turn(turn))?;
                }
            }
            ExchangeOutcome::Failed(message) => {
                error!("Turn failed: {}", message);
                writeln!(self.output, "{}", cformat!("<red>Error:</> {}", message))?;
            }
            ExchangeOutcome::Ignored => {}
        }

        Ok(outcome)
    }

    fn print_history(&mut self) -> Result<()> {
        let conversation = self.conversation_state.conversation();
        if conversation.turns.is_empty() {
            writeln!(self.output, "No messages yet.")?;
        }
        if self.conversation_state.is_pending() {
            writeln!(self.output, "Waiting for a reply...")?;
        }
        for turn in &conversation.turns {
            writeln!(self.output, "{}\n", render_turn(turn))?;
        }
        if let Some(message) = &conversation.error {
            writeln!(self.output, "{}", cformat!("<red>Last error:</> {}", message))?;
        }
        Ok(())
    }
}

fn render_turn(turn: &Turn) -> String {
    let time = turn.created_at.format("%H:%M");
    match turn.role {
        Role::User => {
            let attachment = turn
                .image
                .as_ref()
                .map(|image| format!(" [{} image]", image.mime_type))
                .unwrap_or_default();
            cformat!("<bold>You</> <dim>{}</>{}\n{}", time, attachment, turn.text)
        }
        Role::Model => cformat!("<green,bold>Circuit Insight</> <dim>{}</>\n{}", time, turn.text),
    }
}
