//! CLI entrypoint for Delivery Consult
//!
//! Wires configuration, the question catalog, and the AI provider into the
//! consultation handlers and runs them from the terminal.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use delivery_consult::adapters::ai::build_provider;
use delivery_consult::application::{
    ConductSurveyHandler, PreviewQuestionHandler, PreviewQuestionQuery, SurveyTurnCommand,
};
use delivery_consult::config::{AiProvider, AppConfig, LoggingConfig};
use delivery_consult::domain::conversation::{ConversationMessage, KeywordContextExtractor};
use delivery_consult::domain::survey::{
    build_agent_instruction, QuestionCatalog, QuestionId, SurveyAgentDefinition, SurveyProgress,
};

#[derive(Debug, Parser)]
#[command(name = "delivery-consult", version, about = "TAFE NSW delivery staff consultation assistant")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run an interactive consultation (default)
    Chat,
    /// Print a catalog question as the agent receives it
    Preview {
        /// Question ID
        #[arg(long)]
        id: u32,
    },
    /// Print the agent's system instruction
    Instructions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_logging(&config.logging)?;

    let catalog = Arc::new(load_catalog(&config)?);
    tracing::info!(questions = catalog.len(), "Question catalog loaded");

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            config.validate().context("Invalid configuration")?;
            run_chat(&config, catalog).await
        }
        Command::Preview { id } => {
            config.survey.validate().context("Invalid configuration")?;
            let handler = PreviewQuestionHandler::new(catalog);
            match handler.handle(PreviewQuestionQuery {
                question_id: QuestionId::new(id),
            }) {
                Ok(text) => println!("{text}"),
                Err(err) => println!("{err}"),
            }
            Ok(())
        }
        Command::Instructions => {
            config.survey.validate().context("Invalid configuration")?;
            println!(
                "{}",
                build_agent_instruction(&config.survey.assistant_name, &catalog)?
            );
            Ok(())
        }
    }
}

fn init_logging(config: &LoggingConfig) -> Result<()> {
    // RUST_LOG overrides the configured filter
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .context("Failed to create log filter")?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    };
    result.context("Failed to initialize logging")
}

fn load_catalog(config: &AppConfig) -> Result<QuestionCatalog> {
    match &config.survey.catalog_path {
        Some(path) => QuestionCatalog::load(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display())),
        None => QuestionCatalog::bundled().context("Bundled catalog is invalid"),
    }
}

async fn run_chat(config: &AppConfig, catalog: Arc<QuestionCatalog>) -> Result<()> {
    let provider = build_provider(&config.ai)?;
    let model = match config.ai.primary_provider {
        AiProvider::OpenAI => config.ai.openai_model.clone(),
        AiProvider::Anthropic => config.ai.anthropic_model.clone(),
    };
    let definition = SurveyAgentDefinition::new(&config.survey.assistant_name, model, &catalog)?
        .with_name(config.survey.agent_name.clone());

    let handler = ConductSurveyHandler::new(
        provider,
        catalog,
        Arc::new(KeywordContextExtractor::new()),
        definition,
    )
    .with_sampling(config.survey.max_tokens, config.survey.temperature);

    let mut history: Vec<ConversationMessage> = Vec::new();
    let mut progress = SurveyProgress::new();
    tracing::info!(session_id = %progress.session_id(), "Consultation started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let result = handler
            .handle(SurveyTurnCommand::new(history.clone()).with_progress(progress))
            .await?;
        println!("\n{}: {}\n", config.survey.assistant_name, result.reply);
        history.push(ConversationMessage::agent(result.reply));
        progress = result.progress;

        let answer = loop {
            let Some(line) = lines.next_line().await? else {
                break None;
            };
            match ChatInput::parse(&line) {
                ChatInput::Blank => continue,
                ChatInput::Quit => break None,
                ChatInput::Answer(text) => break Some(text.to_string()),
            }
        };
        let Some(answer) = answer else {
            break;
        };
        history.push(ConversationMessage::user(answer));
    }

    tracing::info!(
        session_id = %progress.session_id(),
        last_question = ?progress.last_presented().map(|id| id.value()),
        updated_at = %progress.updated_at(),
        "Consultation ended"
    );
    Ok(())
}

/// One line typed at the chat prompt.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    /// Whitespace only; not sent to the agent.
    Blank,
    Quit,
    Answer(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        let input = line.trim();
        if input.is_empty() {
            ChatInput::Blank
        } else if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            ChatInput::Quit
        } else {
            ChatInput::Answer(input)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod chat_input {
        use super::*;

        #[test]
        fn blank_lines_are_skipped() {
            assert_eq!(ChatInput::parse(""), ChatInput::Blank);
            assert_eq!(ChatInput::parse("   \t"), ChatInput::Blank);
        }

        #[test]
        fn quit_words_end_the_chat() {
            assert_eq!(ChatInput::parse("quit"), ChatInput::Quit);
            assert_eq!(ChatInput::parse(" EXIT "), ChatInput::Quit);
        }

        #[test]
        fn answers_are_trimmed() {
            assert_eq!(ChatInput::parse("  Liverpool \n"), ChatInput::Answer("Liverpool"));
        }
    }

    #[test]
    fn cli_defaults_to_chat() {
        let cli = Cli::try_parse_from(["delivery-consult"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["delivery-consult", "preview", "--id", "6"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Preview { id: 6 })));
    }
}
