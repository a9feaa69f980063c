mod cli;
mod config;
mod error;
mod gemini_client;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::cli::chat::ChatContext;
use crate::cli::chat::insight::SkillLevel;
use crate::config::Config;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ask a single question and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Image to attach to the first message
    #[arg(long)]
    image: Option<PathBuf>,

    /// How much background the answers should assume
    #[arg(short, long, value_enum, default_value_t = SkillLevel::Intermediate)]
    skill: SkillLevel,

    /// Gemini model to talk to
    #[arg(short, long)]
    model: Option<String>,

    /// Seed for the starter suggestions shown on launch
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Circuit Insight");

    let config = Config::from_env(cli.model);
    let seed = cli.seed.unwrap_or_else(|| chrono::Utc::now().timestamp() as u64);

    let mut chat_context = ChatContext::new(
        Box::new(io::stdout()),
        config,
        cli.input,
        cli.image,
        cli.skill,
        seed,
    );
    chat_context.run().await
}
