//! Built-in persona registry.

use crate::error::{Error, Result};

use super::types::Agent;

/// Agent used when triage output cannot be parsed
pub const DEFAULT_AGENT: &str = "Office Manager";

/// Organizational context injected into every model call
pub const COMPANY_CONTEXT: &str = "
Cybruxer is a deep-tech cybersecurity startup founded in 2023 in Tallinn, Estonia.
Mission: \"To outthink cyber threats by creating AI defenders that never sleep, never forget, and always adapt.\"
Products: Cybruxer Sentinel, PhantomShield, ThreatForge, BlackIce API.
Culture: Hybrid, elite team of 28 engineers, data scientists, ethical hackers.
";

const BUILTIN_AGENTS: &[(&str, &str)] = &[
    ("Office Manager", "Handles office-related questions."),
    ("Web Developer", "Handles technical and development questions."),
    ("Head of HR", "Handles recruitment and employee-related questions."),
    (
        "Salesperson",
        "Handles product, business model, and client-related questions.",
    ),
];

/// Immutable set of agents plus the shared context.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    agents: Vec<Agent>,
    context: String,
    default_agent: String,
}

impl PersonaRegistry {
    /// The four built-in agents with the Cybruxer context
    pub fn builtin() -> Self {
        Self {
            agents: BUILTIN_AGENTS
                .iter()
                .map(|(name, role)| Agent::new(*name, *role))
                .collect(),
            context: COMPANY_CONTEXT.to_string(),
            default_agent: DEFAULT_AGENT.to_string(),
        }
    }

    /// Look up an agent by name. Exact match wins; otherwise the comparison
    /// ignores case and surrounding whitespace.
    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name).or_else(|| {
            let wanted = name.trim();
            self.agents
                .iter()
                .find(|a| a.name.eq_ignore_ascii_case(wanted))
        })
    }

    /// Like [`get`](Self::get), but a miss is an error
    pub fn require(&self, name: &str) -> Result<&Agent> {
        self.get(name).ok_or_else(|| Error::unknown_agent(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All agents in registration order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn default_agent_name(&self) -> &str {
        &self.default_agent
    }

    pub fn default_agent(&self) -> &Agent {
        // builtin() always registers the default agent
        self.get(&self.default_agent)
            .unwrap_or(&self.agents[0])
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
