//! Shared test utilities for integration tests
//!
//! A scripted `GenerationService` that answers batch prompts by echoing the
//! ids it finds in them, with per-call failure injection and hooks that run
//! while a call is "in flight".

use async_trait::async_trait;
use essayist::error::ApiError;
use essayist::generation::GenerationClient;
use essayist::orchestrator::{Orchestrator, RunPolicy};
use essayist::provider::GenerationService;
use essayist::settings::GenerationConfig;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// How the next call is answered.
#[derive(Debug, Clone)]
pub enum Reply {
    /// One `{id, content}` entry per id in the prompt.
    Echo,
    /// Echo, but leave out the last `n` ids.
    EchoDropping(usize),
    /// Fail with `ProviderRequestFailed(message)`.
    Fail(String),
    /// Return this text verbatim.
    Raw(String),
}

type Hook = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub struct ScriptedService {
    replies: Mutex<VecDeque<Reply>>,
    hooks: Mutex<HashMap<usize, Hook>>,
    prompts: Mutex<Vec<String>>,
    delay: Mutex<Duration>,
}

impl ScriptedService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a reply; once the queue is empty every call echoes.
    pub fn push_reply(&self, reply: Reply) {
        self.replies.lock().push_back(reply);
    }

    /// Run `hook` during the `call`-th request (1-based), before it answers.
    pub fn on_call(&self, call: usize, hook: impl FnOnce() + Send + 'static) {
        self.hooks.lock().insert(call, Box::new(hook));
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = delay;
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    async fn answer(&self, prompt: &str) -> Result<Reply, ApiError> {
        let call = {
            let mut prompts = self.prompts.lock();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let hook = self.hooks.lock().remove(&call);
        if let Some(hook) = hook {
            hook();
        }
        let reply = self.replies.lock().pop_front().unwrap_or(Reply::Echo);
        match reply {
            Reply::Fail(message) => Err(ApiError::ProviderRequestFailed(message)),
            other => Ok(other),
        }
    }
}

/// Ids listed as `[ID: ...]` in a batch prompt, in order.
pub fn ids_in(prompt: &str) -> Vec<String> {
    prompt
        .split("[ID: ")
        .skip(1)
        .filter_map(|rest| rest.split(']').next())
        .map(str::to_string)
        .collect()
}

pub fn prose_for(id: &str) -> String {
    format!("Prose for {}.", id)
}

pub fn echo_results(ids: &[String]) -> String {
    let results: Vec<Value> = ids
        .iter()
        .map(|id| json!({ "id": id, "content": prose_for(id) }))
        .collect();
    json!({ "results": results }).to_string()
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate_text(&self, prompt: &str) -> Result<String, ApiError> {
        match self.answer(prompt).await? {
            Reply::Raw(text) => Ok(text),
            _ => Ok("Single section prose.".to_string()),
        }
    }

    async fn generate_structured(&self, prompt: &str, _schema: &Value) -> Result<String, ApiError> {
        let ids = ids_in(prompt);
        match self.answer(prompt).await? {
            Reply::Raw(text) => Ok(text),
            Reply::EchoDropping(n) => Ok(echo_results(&ids[..ids.len().saturating_sub(n)])),
            _ => Ok(echo_results(&ids)),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-1"
    }
}

/// Orchestrator over `service` with no inter-batch delay, loaded with `outline`.
pub fn orchestrator_for(
    service: &Arc<ScriptedService>,
    outline: &str,
) -> Orchestrator<Arc<ScriptedService>> {
    let orchestrator = Orchestrator::new(
        GenerationClient::new(Arc::clone(service)),
        GenerationConfig::default(),
    )
    .with_policy(RunPolicy {
        batch_delay: Duration::ZERO,
        ..RunPolicy::default()
    });
    orchestrator.process_outline(outline);
    orchestrator
}

/// `n` flat points: "- Point 1" .. "- Point n".
pub fn flat_outline(n: usize) -> String {
    (1..=n)
        .map(|i| format!("- Point {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}
