//! Scripted `TextGenerator` for tests. Counts calls and records prompts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{LlmError, TextGenerator};

#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    /// Fails with `LlmError::Api` carrying this status.
    Status(u16),
    /// Never completes.
    Hang,
}

pub struct MockGenerator {
    replies: Mutex<VecDeque<MockReply>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockGenerator {
    /// Replies in order; the last reply repeats once the script runs out.
    pub fn sequence(replies: Vec<MockReply>) -> Self {
        assert!(!replies.is_empty(), "mock needs at least one reply");
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(reply: MockReply) -> Self {
        Self::sequence(vec![reply])
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::always(MockReply::Text(text.into()))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next_reply(&self) -> MockReply {
        let mut replies = self.replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies.front().cloned().unwrap()
        }
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());

        match self.next_reply() {
            MockReply::Text(text) => Ok(text),
            MockReply::Status(status) => Err(LlmError::Api {
                status,
                message: format!("mock status {status}"),
            }),
            MockReply::Hang => std::future::pending().await,
        }
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}
