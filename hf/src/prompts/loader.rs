//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Context for the interviewer persona
#[derive(Debug, Clone, Serialize)]
pub struct InterviewerContext {
    pub rounds: usize,
}

/// Context for tag extraction
#[derive(Debug, Clone, Serialize)]
pub struct TagExtractionContext {
    /// Comma-joined vocabulary
    pub vocabulary: String,
}

/// Context for disambiguation
#[derive(Debug, Clone, Serialize)]
pub struct DisambiguationContext {
    /// Comma-joined inferred tags
    pub tags: String,
    /// One `"<name>: <description> (Tags: <tags>)"` line per candidate
    pub candidates: String,
}

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.holidayfinder/prompts/`)
    user_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader that checks `<root>/.holidayfinder/prompts/` before the embedded defaults
    pub fn new(root: impl AsRef<Path>) -> Self {
        let user_dir = root.as_ref().join(".holidayfinder/prompts");
        let user_dir_exists = user_dir.is_dir();
        debug!(?user_dir, %user_dir_exists, "PromptLoader::new: called");

        Self {
            hbs: Self::engine(),
            user_dir: user_dir_exists.then_some(user_dir),
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        debug!("PromptLoader::embedded_only: called");
        Self {
            hbs: Self::engine(),
            user_dir: None,
        }
    }

    fn engine() -> Handlebars<'static> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);
        hbs.set_strict_mode(true);
        hbs
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.holidayfinder/prompts/{name}.pmt`
    /// 2. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        debug!(%name, "PromptLoader::load_template: called");
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!(?path, "PromptLoader::load_template: found in user override");
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        embedded::get_embedded(name)
            .map(str::to_string)
            .ok_or_else(|| eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        debug!(%template_name, "PromptLoader::render: called");
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map(|s| s.trim().to_string())
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }

    /// Load a template that takes no variables
    pub fn text(&self, template_name: &str) -> Result<String> {
        Ok(self.load_template(template_name)?.trim().to_string())
    }

    pub fn interviewer(&self, rounds: usize) -> Result<String> {
        self.render("interviewer", &InterviewerContext { rounds })
    }

    pub fn opening(&self) -> Result<String> {
        self.text("opening")
    }

    pub fn tag_extraction(&self, vocabulary: String) -> Result<String> {
        self.render("tag-extraction", &TagExtractionContext { vocabulary })
    }

    pub fn disambiguation(&self, tags: String, candidates: String) -> Result<String> {
        self.render("disambiguation", &DisambiguationContext { tags, candidates })
    }

    pub fn recommendation(&self) -> Result<String> {
        self.text("recommendation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_interviewer_renders_rounds() {
        let loader = PromptLoader::embedded_only();
        let prompt = loader.interviewer(5).unwrap();
        assert!(prompt.contains("after 5 short exchanges"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_tag_extraction_lists_vocabulary_verbatim() {
        let loader = PromptLoader::embedded_only();
        let prompt = loader.tag_extraction("city, forest, seaside".to_string()).unwrap();
        assert!(prompt.contains("\n\ncity, forest, seaside\n\n"));
        // Braces and quotes must survive unescaped
        assert!(prompt.contains(r#"{"tags": ["tag1", "tag2"]}"#));
    }

    #[test]
    fn test_disambiguation_renders_candidates() {
        let loader = PromptLoader::embedded_only();
        let prompt = loader
            .disambiguation(
                "quiet, seaside".to_string(),
                "Seaside Cottage: By the harbour (Tags: quiet, seaside)".to_string(),
            )
            .unwrap();
        assert!(prompt.contains("inferred tags: quiet, seaside,"));
        assert!(prompt.contains("Seaside Cottage: By the harbour (Tags: quiet, seaside)"));
    }

    #[test]
    fn test_user_override_wins() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join(".holidayfinder/prompts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("opening.pmt"), "Welcome, traveller!\n").unwrap();

        let loader = PromptLoader::new(root.path());
        assert_eq!(loader.opening().unwrap(), "Welcome, traveller!");
        // Templates without an override still come from the binary
        assert!(loader.recommendation().unwrap().contains("Colland"));
    }

    #[test]
    fn test_unknown_template_is_error() {
        let loader = PromptLoader::embedded_only();
        assert!(loader.load_template("nonexistent-template").is_err());
    }
}
