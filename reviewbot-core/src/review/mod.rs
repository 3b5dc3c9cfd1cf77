//! Review generation
//!
//! Builds the review prompt from a filtered diff, sends it to a language model
//! and always hands back displayable text: the review itself or a localized
//! placeholder explaining why there is none.

mod gemini;
mod model;
pub mod prompt;
mod requester;

pub use gemini::GeminiModel;
pub use model::ReviewModel;
pub use requester::{ReviewRequester, EMPTY_DIFF_TEXT, FAILURE_PREFIX, NO_MODEL_TEXT};
