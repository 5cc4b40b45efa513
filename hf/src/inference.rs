//! Tag inference
//!
//! Turns a finished transcript into a set of vocabulary tags with a single
//! deterministic model call. The model's reply is free text, so parsing is
//! best effort: anything malformed degrades to fewer tags, never an error.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use eyre::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::TagVocabulary;
use crate::llm::{CompletionRequest, LlmClient, Message, StopReason};
use crate::prompts::PromptLoader;
use crate::transcript::Transcript;

/// First `{` through last `}`, across newlines
static JSON_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is a valid regex"));

/// Tags inferred from one session: lowercase, drawn from the vocabulary
pub type InferredTags = BTreeSet<String>;

/// Sorted, comma-joined tags
pub fn join_tags(tags: &InferredTags) -> String {
    tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Deserialize)]
struct TagReply {
    #[serde(default)]
    tags: Vec<serde_json::Value>,
}

/// Best-effort structured-output parser for the tag reply
///
/// Takes the first brace-delimited object in `reply`, reads its `tags` array
/// and keeps the entries that match a vocabulary tag ignoring case. No object,
/// invalid JSON, or a missing array all yield an empty set.
pub fn extract_tags(reply: &str, vocabulary: &TagVocabulary) -> InferredTags {
    let Some(object) = JSON_OBJECT_RE.find(reply) else {
        debug!("extract_tags: no JSON object in reply");
        return InferredTags::new();
    };

    let parsed: TagReply = match serde_json::from_str(object.as_str()) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "extract_tags: reply object is not valid tag JSON");
            return InferredTags::new();
        }
    };

    parsed
        .tags
        .iter()
        .filter_map(|v| v.as_str())
        .filter_map(|tag| {
            let known = vocabulary.resolve(tag);
            if known.is_none() {
                debug!(%tag, "extract_tags: dropping off-vocabulary tag");
            }
            known
        })
        .map(str::to_string)
        .collect()
}

/// Infers tags from a transcript
pub struct TagInference<'a> {
    llm: &'a dyn LlmClient,
    prompts: &'a PromptLoader,
}

impl<'a> TagInference<'a> {
    pub fn new(llm: &'a dyn LlmClient, prompts: &'a PromptLoader) -> Self {
        Self { llm, prompts }
    }

    /// Build the single-shot request: vocabulary instruction plus the flattened transcript
    pub fn request(&self, transcript: &Transcript, vocabulary: &TagVocabulary) -> Result<CompletionRequest> {
        let system = self.prompts.tag_extraction(vocabulary.joined())?;
        Ok(CompletionRequest::deterministic(vec![
            Message::system(system),
            Message::user(transcript.flatten()),
        ]))
    }

    /// Ask the model for tags. Only a failed model call is an error.
    pub async fn infer(&self, transcript: &Transcript, vocabulary: &TagVocabulary) -> Result<InferredTags> {
        debug!(vocabulary_len = vocabulary.len(), "TagInference::infer: called");
        let request = self.request(transcript, vocabulary)?;
        let response = self
            .llm
            .complete(request)
            .await
            .context("Failed to infer tags from the conversation")?;
        if response.stop_reason == StopReason::MaxTokens {
            warn!("Tag reply hit the token limit; its JSON may be incomplete");
        }
        let reply = response.text_or_empty();
        debug!(%reply, "TagInference::infer: raw tag reply");

        let tags = extract_tags(&reply, vocabulary);
        info!(tags = ?tags, "Inferred tags");
        Ok(tags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::llm::client::mock::MockLlmClient;
    use crate::llm::{CompletionResponse, Role};

    fn vocabulary() -> TagVocabulary {
        Catalog::parse(
            "Seaside Cottage:By the harbour:[seaside][quiet]\n\
             Mountain Lodge:Timber lodge:[mountain][group]\n",
        )
        .vocabulary()
        .clone()
    }

    fn tags(list: &[&str]) -> InferredTags {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_extract_drops_off_vocabulary_tags() {
        let reply = r#"Sure! {"tags": ["seaside","luxury"]} enjoy!"#;
        assert_eq!(extract_tags(reply, &vocabulary()), tags(&["seaside"]));
    }

    #[test]
    fn test_extract_without_json_is_empty() {
        assert!(extract_tags("I think they like the sea.", &vocabulary()).is_empty());
        assert!(extract_tags("", &vocabulary()).is_empty());
    }

    #[test]
    fn test_extract_invalid_json_is_empty() {
        assert!(extract_tags(r#"{"tags": [seaside]}"#, &vocabulary()).is_empty());
        // Greedy match spans both objects, which is not valid JSON
        assert!(extract_tags(r#"{"tags": ["quiet"]} or {"tags": ["group"]}"#, &vocabulary()).is_empty());
    }

    #[test]
    fn test_extract_lowercases_and_collapses_duplicates() {
        let reply = "```json\n{\n  \"tags\": [\"Seaside\", \"seaside\", \"QUIET\"]\n}\n```";
        assert_eq!(extract_tags(reply, &vocabulary()), tags(&["quiet", "seaside"]));
    }

    #[test]
    fn test_extract_tolerates_missing_or_odd_tags_field() {
        assert!(extract_tags(r#"{"labels": ["seaside"]}"#, &vocabulary()).is_empty());
        assert_eq!(
            extract_tags(r#"{"tags": ["mountain", 3, null]}"#, &vocabulary()),
            tags(&["mountain"])
        );
        assert!(extract_tags(r#"{"tags": "seaside"}"#, &vocabulary()).is_empty());
    }

    #[test]
    fn test_request_is_single_shot_and_deterministic() {
        let mut transcript = Transcript::seeded("Persona", "Hello!");
        transcript.push(Message::user("Somewhere by the water"));

        let llm = MockLlmClient::new(vec![]);
        let prompts = PromptLoader::embedded_only();
        let request = TagInference::new(&llm, &prompts)
            .request(&transcript, &vocabulary())
            .unwrap();

        assert_eq!(request.temperature, 0.0);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role(), Role::System);
        assert!(request.messages[0].content().contains("group, mountain, quiet, seaside"));
        assert_eq!(
            request.messages[1],
            Message::user("System: Persona\nAssistant: Hello!\nUser: Somewhere by the water")
        );
    }

    #[tokio::test]
    async fn test_infer_uses_model_reply() {
        let llm = MockLlmClient::with_replies(&[r#"{"tags": ["mountain", "group"]}"#]);
        let prompts = PromptLoader::embedded_only();
        let transcript = Transcript::seeded("Persona", "Hello!");

        let inferred = TagInference::new(&llm, &prompts)
            .infer(&transcript, &vocabulary())
            .await
            .unwrap();
        assert_eq!(inferred, tags(&["group", "mountain"]));
    }

    #[tokio::test]
    async fn test_infer_truncated_reply_yields_no_tags() {
        let llm = MockLlmClient::new(vec![CompletionResponse {
            content: Some(r#"{"tags": ["seaside", "qu"#.to_string()),
            stop_reason: StopReason::MaxTokens,
            usage: Default::default(),
        }]);
        let prompts = PromptLoader::embedded_only();
        let transcript = Transcript::seeded("Persona", "Hello!");

        let inferred = TagInference::new(&llm, &prompts)
            .infer(&transcript, &vocabulary())
            .await
            .unwrap();
        assert!(inferred.is_empty());
    }

    #[tokio::test]
    async fn test_infer_model_failure_is_fatal() {
        let llm = MockLlmClient::new(vec![]);
        let prompts = PromptLoader::embedded_only();
        let transcript = Transcript::seeded("Persona", "Hello!");

        let result = TagInference::new(&llm, &prompts).infer(&transcript, &vocabulary()).await;
        assert!(result.is_err());
    }
}
