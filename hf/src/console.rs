//! Interaction surface
//!
//! The session talks to the user only through [`Console`], so tests can
//! script the user's side of the conversation.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::recommendation::Recommendation;

/// What the user did at a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A line of text, trimmed
    Line(String),
    /// Ctrl-C or Ctrl-D: abandon the session
    Interrupted,
}

/// Everything the session prints or reads
pub trait Console {
    fn show_welcome(&mut self);

    fn show_assistant(&mut self, text: &str);

    /// Block until the user answers or interrupts
    fn read_user(&mut self) -> Result<Reply>;

    fn show_recommendation(&mut self, recommendation: &Recommendation);

    fn show_farewell(&mut self);
}

/// Terminal console backed by rustyline
pub struct TerminalConsole {
    editor: DefaultEditor,
}

impl TerminalConsole {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;
        Ok(Self { editor })
    }
}

impl Console for TerminalConsole {
    fn show_welcome(&mut self) {
        println!(
            "{}",
            "Welcome to Colland Rentals! Let's find the perfect place for you.".bright_cyan().bold()
        );
        println!();
    }

    fn show_assistant(&mut self, text: &str) {
        println!();
        println!("{} {}", "Guide:".bright_blue(), text);
    }

    fn read_user(&mut self) -> Result<Reply> {
        match self.editor.readline("You: ") {
            Ok(line) => {
                let input = line.trim().to_string();
                if !input.is_empty() {
                    let _ = self.editor.add_history_entry(&input);
                }
                Ok(Reply::Line(input))
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                debug!("read_user: interrupted");
                Ok(Reply::Interrupted)
            }
            Err(err) => Err(eyre::eyre!("Readline error: {}", err)),
        }
    }

    fn show_recommendation(&mut self, recommendation: &Recommendation) {
        println!();
        println!("{} {}", "Inferred tags:".dimmed(), recommendation.tag_list().dimmed());
        println!(
            "{} {}",
            "Chosen property:".dimmed(),
            recommendation.property.name.bright_white()
        );
        println!();
        println!("{}", "— Recommendation —".bright_cyan().bold());
        println!("{}", recommendation.text);
    }

    fn show_farewell(&mut self) {
        println!();
        println!("{}", "Conversation ended.".dimmed());
    }
}
