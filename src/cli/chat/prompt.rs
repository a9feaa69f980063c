use rustyline::{Config, Editor, Result};

use super::insight::SkillLevel;

pub fn generate_prompt(skill_level: SkillLevel, image_staged: bool) -> String {
    let marker = if image_staged { " [image]" } else { "" };
    format!("[{}]{}> ", skill_level.label().to_lowercase(), marker)
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(rustyline::CompletionType::List)
        .build();
    Editor::with_config(config)
}
