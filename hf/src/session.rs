//! One interview session, end to end
//!
//! interview → tag inference → ranking → disambiguation → recommendation.
//! Either a full recommendation is shown or none is: model failures
//! propagate, an interrupt ends the session with a farewell.

use std::future::Future;

use eyre::Result;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::console::Console;
use crate::disambiguation::Disambiguator;
use crate::inference::TagInference;
use crate::interview::{InterviewOutcome, Interviewer};
use crate::llm::LlmClient;
use crate::prompts::PromptLoader;
use crate::ranking::choose_top_properties;
use crate::recommendation::{Composer, Recommendation};

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Recommended(Recommendation),
    Aborted,
}

/// Everything a session reads; nothing here changes while it runs
pub struct Session<'a> {
    config: &'a Config,
    catalog: &'a Catalog,
    llm: &'a dyn LlmClient,
    prompts: &'a PromptLoader,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a Config, catalog: &'a Catalog, llm: &'a dyn LlmClient, prompts: &'a PromptLoader) -> Self {
        Self {
            config,
            catalog,
            llm,
            prompts,
        }
    }

    pub async fn run(&self, console: &mut dyn Console) -> Result<SessionOutcome> {
        debug!(
            rounds = self.config.interview.rounds,
            top_n = self.config.interview.top_n,
            "Session::run: called"
        );
        if self.catalog.is_empty() {
            return Err(eyre::eyre!("The property catalog is empty; nothing to recommend"));
        }
        let temperature = self.config.llm.temperature;

        console.show_welcome();
        let interviewer = Interviewer::new(self.llm, self.prompts, self.config.interview.rounds, temperature);
        let transcript = match interviewer.run(console).await? {
            InterviewOutcome::Completed(transcript) => transcript,
            InterviewOutcome::Aborted => {
                console.show_farewell();
                return Ok(SessionOutcome::Aborted);
            }
        };

        let tags = TagInference::new(self.llm, self.prompts)
            .infer(&transcript, self.catalog.vocabulary())
            .await?;

        let candidates = choose_top_properties(&tags, self.catalog.properties(), self.config.interview.top_n);
        info!(
            tier = ?candidates.tier,
            candidates = ?candidates.properties.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            "Ranked candidates"
        );

        let chosen = Disambiguator::new(self.llm, self.prompts, temperature)
            .choose(&transcript, &tags, &candidates)
            .await?;

        let recommendation = Composer::new(self.llm, self.prompts, temperature)
            .compose(&transcript, &tags, chosen)
            .await?;
        info!(property = %recommendation.property.name, "Recommendation ready");

        console.show_recommendation(&recommendation);
        Ok(SessionOutcome::Recommended(recommendation))
    }

    /// Like [`Session::run`], but abandons the session with a farewell once
    /// `interrupt` resolves, even mid model call
    pub async fn run_until<I>(&self, console: &mut dyn Console, interrupt: I) -> Result<SessionOutcome>
    where
        I: Future<Output = ()>,
    {
        let finished = tokio::select! {
            biased;
            outcome = self.run(console) => Some(outcome),
            _ = interrupt => None,
        };

        match finished {
            Some(outcome) => outcome,
            None => {
                info!("Session interrupted");
                console.show_farewell();
                Ok(SessionOutcome::Aborted)
            }
        }
    }
}
