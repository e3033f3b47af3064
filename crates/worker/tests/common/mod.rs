//! Shared fakes for worker integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use swipegen_core::content::{ContentRecorder, NewBatch, NewContentItem};
use swipegen_core::error::GenerationError;
use swipegen_core::provider::GenerationProvider;
use swipegen_core::types::DbId;
use swipegen_worker::GenerationWorker;
use tokio::sync::Semaphore;

type Responder = Box<dyn Fn(usize) -> Result<Value, String> + Send + Sync>;

/// A call the worker made to the provider.
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub token: String,
    pub model: String,
    pub input: Value,
}

/// Provider whose response is computed from the zero-based call index.
///
/// With a gate, every call first waits for a permit.
pub struct ScriptedProvider {
    respond: Responder,
    calls: Mutex<Vec<ProviderCall>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedProvider {
    pub fn new(respond: impl Fn(usize) -> Result<Value, String> + Send + Sync + 'static) -> Self {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Each call returns one distinct png URL.
    pub fn numbered_images() -> Self {
        Self::new(|n| Ok(Value::from(vec![format!("https://cdn.test/{n}.png")])))
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn run(&self, token: &str, model: &str, input: &Value) -> Result<Value, GenerationError> {
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(ProviderCall {
                token: token.to_string(),
                model: model.to_string(),
                input: input.clone(),
            });
            calls.len() - 1
        };
        (self.respond)(index).map_err(GenerationError::Provider)
    }
}

/// Content store keeping everything in vectors.
#[derive(Default)]
pub struct MemoryRecorder {
    batches: Mutex<Vec<NewBatch>>,
    items: Mutex<Vec<NewContentItem>>,
    next_id: AtomicUsize,
    fail_batches: bool,
    fail_content: bool,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_batches() -> Self {
        Self {
            fail_batches: true,
            ..Self::default()
        }
    }

    pub fn failing_content() -> Self {
        Self {
            fail_content: true,
            ..Self::default()
        }
    }

    pub fn batches(&self) -> Vec<NewBatch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn items(&self) -> Vec<NewContentItem> {
        self.items.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentRecorder for MemoryRecorder {
    async fn record_batch(&self, batch: &NewBatch) -> Result<(), GenerationError> {
        if self.fail_batches {
            return Err(GenerationError::ContentStore("batches table missing".into()));
        }
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }

    async fn create_content(&self, item: &NewContentItem) -> Result<DbId, GenerationError> {
        if self.fail_content {
            return Err(GenerationError::ContentStore("disk full".into()));
        }
        self.items.lock().unwrap().push(item.clone());
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst) as DbId + 1)
    }
}

pub fn worker(provider: &Arc<ScriptedProvider>, recorder: &Arc<MemoryRecorder>) -> GenerationWorker {
    GenerationWorker::new(provider.clone(), recorder.clone())
}
