use std::path::PathBuf;

use super::insight::SkillLevel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    /// Reset the conversation.
    Clear,
    History,
    StageImage(PathBuf),
    Unstage,
    /// `None` shows the current level.
    Skill(Option<SkillLevel>),
    Ask(String),
}

impl Command {
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();
        if !input.starts_with('/') {
            return Ok(Command::Ask(input.to_string()));
        }

        let (name, arg) = match input.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (input, ""),
        };

        match name {
            "/help" => Ok(Command::Help),
            "/quit" | "/exit" => Ok(Command::Quit),
            "/clear" | "/reset" => Ok(Command::Clear),
            "/history" => Ok(Command::History),
            "/unstage" => Ok(Command::Unstage),
            "/image" if arg.is_empty() => Err("Usage: /image <path>".to_string()),
            "/image" => Ok(Command::StageImage(PathBuf::from(arg))),
            "/skill" if arg.is_empty() => Ok(Command::Skill(None)),
            "/skill" => arg.parse().map(|level| Command::Skill(Some(level))),
            _ => Err(format!("Unknown command: {}. Type /help for the list.", name)),
        }
    }
}
