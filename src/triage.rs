//! Triage: decide which agents answer a question, and in which order.
//!
//! The decision itself is delegated to the chat model. The only local logic
//! is parsing its reply, which has two outcomes: a [`Selection::Parsed`] list
//! read from the `agents` field, or a [`Selection::Fallback`] to the default
//! agent when the reply is not the expected JSON. A parse failure is never an
//! error.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::llm::{ChatMessage, SharedChatModel};
use crate::persona::PersonaRegistry;

const TRIAGE_SYSTEM_PROMPT: &str = "You are a smart triage agent for Cybruxer.";

/// Which agents triage picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Names read from the model's JSON `agents` field (may be empty or unknown)
    Parsed(Vec<String>),
    /// Reply was unusable; exactly the default agent
    Fallback(Vec<String>),
}

impl Selection {
    pub fn agents(&self) -> &[String] {
        match self {
            Selection::Parsed(agents) | Selection::Fallback(agents) => agents,
        }
    }

    pub fn into_agents(self) -> Vec<String> {
        match self {
            Selection::Parsed(agents) | Selection::Fallback(agents) => agents,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Selection::Fallback(_))
    }
}

/// Triage decision plus the model's raw reply
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    pub selection: Selection,
    pub raw_response: String,
}

/// Build the three-message triage request
pub fn build_triage_messages(question: &str, context: &str) -> Vec<ChatMessage> {
    let instruction = format!(
        "Question: {question}\n\
         Decide which agents need to answer and in which order.\n\
         Return only a JSON object like this:\n\
         {{ \"agents\": [\"Head of HR\", \"Web Developer\"], \"reason\": \"Head of HR answers timelines, Web Developer answers role requirements\" }}\n"
    );

    vec![
        ChatMessage::system(TRIAGE_SYSTEM_PROMPT),
        ChatMessage::system(context),
        ChatMessage::user(instruction),
    ]
}

/// Parse the model reply. The whole text must be a JSON object whose
/// `agents` field is an array of strings; anything else falls back.
pub fn parse_selection(raw: &str, default_agent: &str) -> Selection {
    let fallback = |reason: &str| {
        warn!(reason, default_agent, "Triage reply unusable, falling back");
        Selection::Fallback(vec![default_agent.to_string()])
    };

    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(_) => return fallback("not valid JSON"),
    };

    let Some(agents) = value.get("agents") else {
        return fallback("missing 'agents' field");
    };
    let Some(items) = agents.as_array() else {
        return fallback("'agents' is not a list");
    };

    let names: Option<Vec<String>> = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect();

    match names {
        Some(names) => Selection::Parsed(names),
        None => fallback("'agents' contains a non-string entry"),
    }
}

/// Model-backed triage step
pub struct Triage {
    model: SharedChatModel,
    registry: Arc<PersonaRegistry>,
}

impl Triage {
    pub fn new(model: SharedChatModel, registry: Arc<PersonaRegistry>) -> Self {
        Self { model, registry }
    }

    /// Choose an ordered list of agent names for `question`.
    ///
    /// Fails only when the model call fails.
    pub async fn classify(&self, question: &str) -> Result<TriageOutcome> {
        let messages = build_triage_messages(question, self.registry.context());
        let raw_response = self.model.complete(&messages).await?;
        debug!(response = %raw_response, "Triage reply");

        let selection = parse_selection(&raw_response, self.registry.default_agent_name());
        info!(
            agents = ?selection.agents(),
            fallback = selection.is_fallback(),
            "Triage decision"
        );

        Ok(TriageOutcome {
            selection,
            raw_response,
        })
    }
}
