//! Per-agent responder: frame the model as one persona and ask the question.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::llm::{ChatMessage, SharedChatModel};
use crate::persona::{Agent, PersonaRegistry};

/// Build the three-message persona request
pub fn build_agent_messages(agent: &Agent, context: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(agent.persona_prompt()),
        ChatMessage::system(context),
        ChatMessage::user(question),
    ]
}

pub struct Responder {
    model: SharedChatModel,
    registry: Arc<PersonaRegistry>,
}

impl Responder {
    pub fn new(model: SharedChatModel, registry: Arc<PersonaRegistry>) -> Self {
        Self { model, registry }
    }

    /// Ask `agent` the original question; the reply is returned unprocessed.
    pub async fn respond(&self, agent: &Agent, question: &str) -> Result<String> {
        let messages = build_agent_messages(agent, self.registry.context(), question);
        let reply = self.model.complete(&messages).await?;
        debug!(agent = %agent.name, chars = reply.len(), "Agent replied");
        Ok(reply)
    }
}
