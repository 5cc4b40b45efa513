//! Conversation driver
//!
//! Runs the fixed number of question/answer rounds. Every round reads one
//! user message; every round except the last asks the model for the guide's
//! follow-up, so the transcript always ends on the user's final answer.

use eyre::{Context, Result};
use tracing::{debug, info};

use crate::console::{Console, Reply};
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::PromptLoader;
use crate::transcript::Transcript;

/// How an interview ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterviewOutcome {
    Completed(Transcript),
    /// The user interrupted at a prompt
    Aborted,
}

/// Drives one interview
pub struct Interviewer<'a> {
    llm: &'a dyn LlmClient,
    prompts: &'a PromptLoader,
    rounds: usize,
    temperature: f32,
}

impl<'a> Interviewer<'a> {
    pub fn new(llm: &'a dyn LlmClient, prompts: &'a PromptLoader, rounds: usize, temperature: f32) -> Self {
        Self {
            llm,
            prompts,
            rounds,
            temperature,
        }
    }

    /// Seed the transcript, then alternate user answers and guide questions
    pub async fn run(&self, console: &mut dyn Console) -> Result<InterviewOutcome> {
        debug!(rounds = self.rounds, "Interviewer::run: called");
        let opening = self.prompts.opening()?;
        let mut transcript = Transcript::seeded(self.prompts.interviewer(self.rounds)?, opening.clone());
        console.show_assistant(&opening);

        for round in 0..self.rounds {
            let answer = match console.read_user()? {
                Reply::Line(text) => text,
                Reply::Interrupted => {
                    info!(round = round + 1, "Interview aborted by user");
                    return Ok(InterviewOutcome::Aborted);
                }
            };
            transcript.push(Message::user(answer));

            if round + 1 < self.rounds {
                let request = CompletionRequest::conversational(transcript.messages().to_vec(), self.temperature);
                let reply = self
                    .llm
                    .complete(request)
                    .await
                    .context(format!("Failed to get the guide's reply for round {}", round + 1))?
                    .text_or_empty();
                transcript.push(Message::assistant(reply.clone()));
                console.show_assistant(&reply);
            }
        }

        info!(
            messages = transcript.len(),
            user_turns = transcript.user_turns(),
            "Interview completed"
        );
        Ok(InterviewOutcome::Completed(transcript))
    }
}
