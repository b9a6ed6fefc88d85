//! Persona system: the fixed set of agents a question can be routed to.
//!
//! Each agent is a name plus a one-line role description. Every model call,
//! triage included, is also given the shared organizational context.

pub mod registry;
pub mod types;

pub use registry::{PersonaRegistry, COMPANY_CONTEXT, DEFAULT_AGENT};
pub use types::Agent;
