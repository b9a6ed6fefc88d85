//! Scripted chat model for testing
//!
//! Replies are served in order from a script; once the script runs out the
//! fallback reply is used. A failure can be injected on a given call.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::{ChatMessage, ChatModel};

/// Deterministic [`ChatModel`] that records every request it receives
pub struct MockChatModel {
    script: Mutex<VecDeque<String>>,
    fallback: String,
    fail_on_call: Option<usize>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockChatModel {
    /// Serve `replies` in order, then the fallback reply
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fallback: "mock response".to_string(),
            fail_on_call: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `reply`
    pub fn fixed(reply: impl Into<String>) -> Self {
        let mut mock = Self::scripted(Vec::<String>::new());
        mock.fallback = reply.into();
        mock
    }

    /// Fail the `n`-th call (1-based) with an upstream error
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Number of `complete` calls so far, failed ones included
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Every message list sent so far, in call order
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    fn model_id(&self) -> &str {
        "mock"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let call = {
            let mut requests = self.requests.lock();
            requests.push(messages.to_vec());
            requests.len()
        };

        if self.fail_on_call == Some(call) {
            return Err(Error::upstream("Request error: mock transport failure"));
        }

        Ok(self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone()))
    }
}
