//! HolidayFinder - a five-turn holiday rental interview
//!
//! Talks with a traveller for a fixed number of rounds, infers descriptive
//! tags from the conversation with one deterministic model call, and picks the
//! best-matching property from a small static catalog.
//!
//! # Pipeline
//!
//! ```text
//! catalog ──► vocabulary ──► tag inference ◄── interview
//!                                 │
//!                                 ▼
//!                             ranking ──► disambiguation ──► recommendation
//! ```
//!
//! # Modules
//!
//! - [`catalog`] - Catalog file parsing and the tag vocabulary
//! - [`interview`] - The question/answer rounds
//! - [`inference`] - Tag extraction from the transcript
//! - [`ranking`] - Superset / best-overlap candidate selection
//! - [`disambiguation`] - Model-assisted pick among several candidates
//! - [`recommendation`] - The final message
//! - [`session`] - All of the above, in order
//! - [`llm`] - Chat-completion client trait and OpenAI implementation

pub mod catalog;
pub mod cli;
pub mod config;
pub mod console;
pub mod disambiguation;
pub mod inference;
pub mod interview;
pub mod llm;
pub mod prompts;
pub mod ranking;
pub mod recommendation;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, Property, TagVocabulary};
pub use config::{CatalogConfig, Config, InterviewConfig, LlmConfig};
pub use console::{Console, Reply, TerminalConsole};
pub use disambiguation::{Disambiguator, match_candidate};
pub use inference::{InferredTags, TagInference, extract_tags};
pub use interview::{InterviewOutcome, Interviewer};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, OpenAIClient, Role, create_client};
pub use prompts::PromptLoader;
pub use ranking::{Candidates, MatchTier, choose_top_properties};
pub use recommendation::{Composer, Recommendation};
pub use session::{Session, SessionOutcome};
pub use transcript::Transcript;
