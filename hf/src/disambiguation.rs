//! Disambiguation among close candidates
//!
//! Only consulted when ranking leaves more than one property. The model is
//! asked for a name; an unrecognised answer falls back to the first candidate.

use eyre::{Context, Result};
use tracing::{debug, info, warn};

use crate::catalog::Property;
use crate::inference::{InferredTags, join_tags};
use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::PromptLoader;
use crate::ranking::Candidates;
use crate::transcript::Transcript;

/// Candidate whose name equals the first line of `reply` ignoring case,
/// otherwise the first candidate. `None` only for an empty list.
pub fn match_candidate<'a>(reply: &str, candidates: &[&'a Property]) -> Option<&'a Property> {
    let chosen = reply.trim().lines().next().unwrap_or_default().trim();
    let matched = candidates
        .iter()
        .copied()
        .find(|p| p.name.to_lowercase() == chosen.to_lowercase());

    if matched.is_none() {
        warn!(%chosen, "Model named no candidate; falling back to the first");
    }
    matched.or_else(|| candidates.first().copied())
}

/// Picks one property from several
pub struct Disambiguator<'a> {
    llm: &'a dyn LlmClient,
    prompts: &'a PromptLoader,
    temperature: f32,
}

impl<'a> Disambiguator<'a> {
    pub fn new(llm: &'a dyn LlmClient, prompts: &'a PromptLoader, temperature: f32) -> Self {
        Self {
            llm,
            prompts,
            temperature,
        }
    }

    /// Transcript followed by one system message listing the candidates
    pub fn request(
        &self,
        transcript: &Transcript,
        tags: &InferredTags,
        candidates: &[&Property],
    ) -> Result<CompletionRequest> {
        let listing = candidates
            .iter()
            .map(|p| format!("{}: {} (Tags: {})", p.name, p.description, p.tag_list()))
            .collect::<Vec<_>>()
            .join("\n");
        let system = self.prompts.disambiguation(join_tags(tags), listing)?;
        Ok(CompletionRequest::conversational(
            transcript.followed_by([Message::system(system)]),
            self.temperature,
        ))
    }

    /// Choose a property; a single candidate is returned without a model call
    pub async fn choose<'p>(
        &self,
        transcript: &Transcript,
        tags: &InferredTags,
        candidates: &Candidates<'p>,
    ) -> Result<&'p Property> {
        debug!(count = candidates.len(), "Disambiguator::choose: called");
        if let Some(only) = candidates.single() {
            return Ok(only);
        }

        let request = self.request(transcript, tags, &candidates.properties)?;
        let reply = self
            .llm
            .complete(request)
            .await
            .context("Failed to choose between candidate properties")?
            .text_or_empty();
        debug!(%reply, "Disambiguator::choose: model reply");

        let chosen = match_candidate(&reply, &candidates.properties)
            .ok_or_else(|| eyre::eyre!("No candidate properties to choose from"))?;
        info!(property = %chosen.name, "Disambiguated");
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::llm::Role;
    use crate::llm::client::mock::MockLlmClient;
    use crate::ranking::MatchTier;

    fn catalog() -> Catalog {
        Catalog::parse(
            "Seaside Cottage:Two-bed by the harbour:[seaside][budget]\n\
             Mountain Lodge:Timber lodge:[mountain][luxury]\n",
        )
    }

    fn candidates(catalog: &Catalog) -> Candidates<'_> {
        Candidates {
            tier: MatchTier::BestOverlap { score: 0 },
            properties: catalog.properties().iter().collect(),
        }
    }

    #[test]
    fn test_match_ignores_case() {
        let catalog = catalog();
        let list = candidates(&catalog).properties;
        assert_eq!(match_candidate("seaside cottage", &list).unwrap().name, "Seaside Cottage");
        assert_eq!(match_candidate("  MOUNTAIN LODGE \n", &list).unwrap().name, "Mountain Lodge");
    }

    #[test]
    fn test_match_uses_first_line_only() {
        let catalog = catalog();
        let list = candidates(&catalog).properties;
        let reply = "Mountain Lodge\nIt suits a bigger budget.";
        assert_eq!(match_candidate(reply, &list).unwrap().name, "Mountain Lodge");
    }

    #[test]
    fn test_unknown_name_falls_back_to_first() {
        let catalog = catalog();
        let list = candidates(&catalog).properties;
        assert_eq!(match_candidate("The Castle", &list).unwrap().name, "Seaside Cottage");
        assert_eq!(match_candidate("", &list).unwrap().name, "Seaside Cottage");
        assert!(match_candidate("anything", &[]).is_none());
    }

    #[test]
    fn test_request_appends_candidate_listing() {
        let catalog = catalog();
        let llm = MockLlmClient::new(vec![]);
        let prompts = PromptLoader::embedded_only();
        let transcript = Transcript::seeded("Persona", "Hello!");
        let tags: InferredTags = ["budget".to_string()].into_iter().collect();

        let request = Disambiguator::new(&llm, &prompts, 0.7)
            .request(&transcript, &tags, &candidates(&catalog).properties)
            .unwrap();

        assert_eq!(request.messages.len(), 3);
        let last = request.messages.last().unwrap();
        assert_eq!(last.role(), Role::System);
        assert!(last.content().contains("Seaside Cottage: Two-bed by the harbour (Tags: budget, seaside)"));
        assert!(last.content().contains("Mountain Lodge: Timber lodge (Tags: luxury, mountain)"));
        assert!(last.content().contains("willing to spend"));
    }

    #[tokio::test]
    async fn test_single_candidate_skips_model() {
        let catalog = catalog();
        let llm = MockLlmClient::new(vec![]);
        let prompts = PromptLoader::embedded_only();
        let single = Candidates {
            tier: MatchTier::Perfect,
            properties: vec![&catalog.properties()[1]],
        };

        let chosen = Disambiguator::new(&llm, &prompts, 0.7)
            .choose(&Transcript::default(), &InferredTags::new(), &single)
            .await
            .unwrap();
        assert_eq!(chosen.name, "Mountain Lodge");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_choose_matches_model_reply() {
        let catalog = catalog();
        let llm = MockLlmClient::with_replies(&["seaside cottage"]);
        let prompts = PromptLoader::embedded_only();

        let chosen = Disambiguator::new(&llm, &prompts, 0.7)
            .choose(&Transcript::default(), &InferredTags::new(), &candidates(&catalog))
            .await
            .unwrap();
        assert_eq!(chosen.name, "Seaside Cottage");
        assert_eq!(llm.call_count(), 1);
    }
}
