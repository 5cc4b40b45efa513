//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

use tracing::debug;

/// Interviewer persona
pub const INTERVIEWER: &str = include_str!("../../prompts/interviewer.pmt");

/// First assistant line of every interview
pub const OPENING: &str = include_str!("../../prompts/opening.pmt");

/// Vocabulary-constrained JSON tag extraction
pub const TAG_EXTRACTION: &str = include_str!("../../prompts/tag-extraction.pmt");

/// Pick one property among close candidates
pub const DISAMBIGUATION: &str = include_str!("../../prompts/disambiguation.pmt");

/// Final recommendation rules
pub const RECOMMENDATION: &str = include_str!("../../prompts/recommendation.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    debug!(%name, "get_embedded: called");
    match name {
        "interviewer" => Some(INTERVIEWER),
        "opening" => Some(OPENING),
        "tag-extraction" => Some(TAG_EXTRACTION),
        "disambiguation" => Some(DISAMBIGUATION),
        "recommendation" => Some(RECOMMENDATION),
        _ => {
            debug!("get_embedded: no match found");
            None
        }
    }
}
