use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{
    language_models::{llm::LLM, options::CallOptions, GenerateResult, LLMError},
    schemas::Message,
};

/// A call observed by [`MockLLM`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    /// Names of the tools offered to the model on this call.
    pub functions: Vec<String>,
}

/// A model that replays pre-configured responses in order.
///
/// Clones share the response queue and the call log, so a test can keep a
/// handle after boxing the model into an agent.
#[derive(Clone, Default)]
pub struct MockLLM {
    responses: Arc<Mutex<VecDeque<GenerateResult>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    options: CallOptions,
    gate: Option<Gate>,
}

/// Holds each call open until the test releases it.
#[derive(Clone)]
struct Gate {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl MockLLM {
    pub fn new(responses: Vec<GenerateResult>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Default::default()
        }
    }

    /// Makes every call signal `entered` and then wait for `release` before
    /// replying, so a test can observe a turn while it is in flight.
    pub fn with_gate(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some(Gate { entered, release });
        self
    }

    /// Queues another response behind the existing ones.
    pub fn push_response(&self, response: GenerateResult) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LLM for MockLLM {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResult, LLMError> {
        let functions = self
            .options
            .functions
            .iter()
            .flatten()
            .map(|f| f.name.clone())
            .collect();
        self.calls
            .lock()
            .map_err(|e| LLMError::OtherError(e.to_string()))?
            .push(RecordedCall {
                messages: messages.to_vec(),
                functions,
            });

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.responses
            .lock()
            .map_err(|e| LLMError::OtherError(e.to_string()))?
            .pop_front()
            .ok_or_else(|| LLMError::OtherError("mock LLM has no responses left".to_string()))
    }

    fn add_options(&mut self, options: CallOptions) {
        self.options.merge_options(options);
    }
}
