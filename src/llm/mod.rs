//! Language-model client
//!
//! A [`ChatModel`] takes an ordered list of role-tagged messages and returns
//! the text of the first completion choice. [`OpenAiClient`] talks to any
//! OpenAI-compatible API; [`MockChatModel`] serves scripted replies in tests.

mod mock;
mod openai;
mod traits;

pub use mock::MockChatModel;
pub use openai::OpenAiClient;
pub use traits::*;
