//! agent-matcher - route customer questions to persona agents
//!
//! A triage model call decides which Cybruxer personas should answer a
//! question. Each selected persona answers in turn, the answers are joined
//! into one reply, and the whole interaction is appended to a history file.
//!
//! The library exposes the pipeline ([`pipeline::AgentMatcher`]) and the HTTP
//! surface ([`server`]); the `agent-matcher` binary wires them to config,
//! logging and the CLI.

pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod llm;
pub mod logging;
pub mod persona;
pub mod pipeline;
pub mod responder;
pub mod server;
pub mod triage;
pub mod version;

pub use error::{Error, Result};
pub use pipeline::{AgentMatcher, AskResponse};
