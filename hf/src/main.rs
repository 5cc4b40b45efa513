//! HolidayFinder - CLI entry point

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use holidayfinder::catalog::Catalog;
use holidayfinder::cli::{Cli, Command};
use holidayfinder::config::Config;
use holidayfinder::console::TerminalConsole;
use holidayfinder::inference::InferredTags;
use holidayfinder::llm::create_client;
use holidayfinder::prompts::PromptLoader;
use holidayfinder::ranking::{MatchTier, choose_top_properties};
use holidayfinder::session::{Session, SessionOutcome};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // stdout belongs to the conversation, so logs go to a file
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("holidayfinder")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("holidayfinder.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The API key may live in a local .env file
    let dotenv = dotenvy::dotenv();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;
    if let Ok(path) = &dotenv {
        debug!(?path, "main: loaded .env");
    }

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(path) = cli.catalog {
        config.catalog.path = path;
    }
    config.validate().context("Invalid configuration")?;
    info!(model = %config.llm.model, catalog = %config.catalog.path.display(), "holidayfinder starting");

    let catalog = Catalog::load(&config.catalog.path).context("Failed to load property catalog")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => cmd_chat(&config, &catalog).await,
        Command::Catalog => cmd_catalog(&catalog),
        Command::Tags { tags } => cmd_tags(&config, &catalog, &tags),
    }
}

async fn cmd_chat(config: &Config, catalog: &Catalog) -> Result<()> {
    config.validate_credentials()?;
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let prompts = PromptLoader::new(std::env::current_dir()?);
    let mut console = TerminalConsole::new()?;

    // rustyline sees Ctrl-C at a prompt; this catches it while a model call is running
    let interrupt = async {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("cmd_chat: cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let session = Session::new(config, catalog, llm.as_ref(), &prompts);
    match session.run_until(&mut console, interrupt).await? {
        SessionOutcome::Recommended(rec) => info!(property = %rec.property.name, "Session finished"),
        SessionOutcome::Aborted => info!("Session aborted by user"),
    }
    Ok(())
}

fn cmd_catalog(catalog: &Catalog) -> Result<()> {
    if catalog.is_empty() {
        println!("No properties found");
        return Ok(());
    }

    for property in catalog.properties() {
        println!("{} [{}]", property.name.cyan(), property.tag_list().yellow());
        println!("  {}", property.description);
    }
    println!();
    println!("{} {}", "Tags:".bright_cyan(), catalog.vocabulary().joined());
    Ok(())
}

fn cmd_tags(config: &Config, catalog: &Catalog, words: &[String]) -> Result<()> {
    let mut tags = InferredTags::new();
    for word in words {
        match catalog.vocabulary().resolve(word) {
            Some(tag) => {
                tags.insert(tag.to_string());
            }
            None => {
                warn!(%word, "cmd_tags: not in vocabulary");
                println!("{} {} is not a catalog tag, ignoring", "?".yellow(), word);
            }
        }
    }

    let candidates = choose_top_properties(&tags, catalog.properties(), config.interview.top_n);
    match candidates.tier {
        MatchTier::Perfect => println!("{} perfect match(es)", candidates.len().to_string().green()),
        MatchTier::BestOverlap { score } => println!(
            "No perfect match; {} candidate(s) sharing {} tag(s)",
            candidates.len().to_string().yellow(),
            score
        ),
    }
    for property in &candidates.properties {
        println!("  {} [{}]", property.name.cyan(), property.tag_list());
    }
    Ok(())
}
