//! Core persona types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named role used to frame a model call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Display name, also the identifier triage returns
    pub name: String,

    /// One-line role description appended to the persona prompt
    pub role: String,
}

impl Agent {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
        }
    }

    /// System prompt that frames the model as this agent
    pub fn persona_prompt(&self) -> String {
        format!("You are {}. {}", self.name, self.role)
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
