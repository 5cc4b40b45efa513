//! Final recommendation

use eyre::{Context, Result};
use tracing::debug;

use crate::catalog::Property;
use crate::inference::{InferredTags, join_tags};
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::PromptLoader;
use crate::transcript::Transcript;

/// The finished result of a session, shown verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub property: Property,
    pub tags: InferredTags,
    pub text: String,
}

impl Recommendation {
    /// Inferred tags, sorted and comma-joined; "(none)" when empty
    pub fn tag_list(&self) -> String {
        if self.tags.is_empty() {
            "(none)".to_string()
        } else {
            join_tags(&self.tags)
        }
    }
}

/// Writes the recommendation message
pub struct Composer<'a> {
    llm: &'a dyn LlmClient,
    prompts: &'a PromptLoader,
    temperature: f32,
}

impl<'a> Composer<'a> {
    pub fn new(llm: &'a dyn LlmClient, prompts: &'a PromptLoader, temperature: f32) -> Self {
        Self {
            llm,
            prompts,
            temperature,
        }
    }

    /// Transcript, then the composition rules, then a note of what was picked
    pub fn request(&self, transcript: &Transcript, tags: &InferredTags, chosen: &Property) -> Result<CompletionRequest> {
        let rules = self.prompts.recommendation()?;
        let note = format!(
            "The tags I inferred are: {}\nThe chosen property is {} ({}).",
            join_tags(tags),
            chosen.name,
            chosen.tag_list()
        );
        Ok(CompletionRequest::conversational(
            transcript.followed_by([Message::system(rules), Message::assistant(note)]),
            self.temperature,
        ))
    }

    pub async fn compose(&self, transcript: &Transcript, tags: &InferredTags, chosen: &Property) -> Result<Recommendation> {
        debug!(property = %chosen.name, "Composer::compose: called");
        let request = self.request(transcript, tags, chosen)?;
        let text = self
            .llm
            .complete(request)
            .await
            .context("Failed to compose the recommendation")?
            .text_or_empty();

        Ok(Recommendation {
            property: chosen.clone(),
            tags: tags.clone(),
            text,
        })
    }
}
