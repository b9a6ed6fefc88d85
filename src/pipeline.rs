//! Question pipeline: triage, per-agent answers, aggregation, logging.
//!
//! Steps run strictly in order. The caller gets an answer only after every
//! selected agent has replied and the record is on disk; any upstream failure
//! aborts before logging, so nothing is appended for a failed request.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::history::{ConversationTurn, HistoryStore, InteractionRecord};
use crate::llm::SharedChatModel;
use crate::persona::{Agent, PersonaRegistry};
use crate::responder::Responder;
use crate::triage::{Selection, Triage};

/// What `POST /ask` returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub agents_involved: Vec<String>,
    pub conversation: Vec<ConversationTurn>,
    pub final_answer: String,
}

impl From<&InteractionRecord> for AskResponse {
    fn from(record: &InteractionRecord) -> Self {
        Self {
            agents_involved: record.agents_involved.clone(),
            conversation: record.conversation.clone(),
            final_answer: record.final_answer.clone(),
        }
    }
}

/// Drives one question through the whole flow
pub struct AgentMatcher {
    triage: Triage,
    responder: Responder,
    registry: Arc<PersonaRegistry>,
    history: Arc<HistoryStore>,
    model_id: String,
}

impl AgentMatcher {
    pub fn new(
        model: SharedChatModel,
        registry: Arc<PersonaRegistry>,
        history: Arc<HistoryStore>,
    ) -> Self {
        Self {
            model_id: model.model_id().to_string(),
            triage: Triage::new(model.clone(), registry.clone()),
            responder: Responder::new(model, registry.clone()),
            registry,
            history,
        }
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Answer `prompt` and persist the interaction
    pub async fn ask(&self, prompt: &str) -> Result<AskResponse> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("ask", %request_id);
        self.run(prompt).instrument(span).await
    }

    async fn run(&self, prompt: &str) -> Result<AskResponse> {
        let timestamp = Utc::now();
        info!(prompt_preview = %prompt.chars().take(50).collect::<String>(), "Question received");

        let outcome = self.triage.classify(prompt).await?;
        let agents = self.resolve(outcome.selection);

        let mut conversation = Vec::with_capacity(agents.len());
        for agent in agents {
            let message = self.responder.respond(agent, prompt).await?;
            conversation.push(ConversationTurn::new(agent.name.clone(), message));
        }

        let record = InteractionRecord::from_turns(timestamp, prompt, conversation);
        self.history.append(&record).await?;

        info!(agents = ?record.agents_involved, "Question answered");
        Ok(AskResponse::from(&record))
    }

    /// Map triage names onto registered agents.
    ///
    /// Unknown names are skipped. If a non-empty selection loses every name,
    /// the default agent answers instead. Duplicates are kept.
    fn resolve(&self, selection: Selection) -> Vec<&Agent> {
        let names = selection.into_agents();
        let requested = names.len();

        let agents: Vec<&Agent> = names
            .iter()
            .filter_map(|name| match self.registry.require(name) {
                Ok(agent) => Some(agent),
                Err(e) => {
                    warn!(error = %e, "Skipping triage selection");
                    None
                }
            })
            .collect();

        if agents.is_empty() && requested > 0 {
            warn!(
                default_agent = %self.registry.default_agent_name(),
                "No known agents selected, using default"
            );
            return vec![self.registry.default_agent()];
        }

        agents
    }
}
