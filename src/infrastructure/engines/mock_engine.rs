//! Scripted engine and factory for tests.
//!
//! Every engine created by one `MockEngineFactory` appends to a shared
//! call log (`load:<id>`, `transcribe:<id>`, `release:<id>`), so tests
//! can assert the release-before-load contract and swap ordering. A
//! shared gate lets a test hold the worker mid-inference to fill the
//! queue behind it.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex};

use crate::application::ports::{AsrEngine, EngineError, EngineFactory, TranscribeOptions};
use crate::domain::{EngineCapabilities, EngineKind, ModelSpec, Segment, Transcript};

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// A latch the mock engine blocks on while closed.
#[derive(Clone, Default)]
pub struct Gate {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Gate {
    /// A closed gate; `transcribe` parks until `open` is called.
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }

    fn wait(&self) {
        let (lock, cvar) = &*self.inner;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
    }
}

pub struct MockEngine {
    spec: ModelSpec,
    log: CallLog,
    loaded: bool,
    fail_load: bool,
    fail_transcribe: bool,
    transcript: Transcript,
    gate: Option<Gate>,
}

impl AsrEngine for MockEngine {
    fn load(&mut self) -> Result<(), EngineError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("load:{}", self.spec.model_id));
        if self.fail_load {
            return Err(EngineError::LoadFailed("scripted load failure".to_string()));
        }
        self.loaded = true;
        Ok(())
    }

    fn transcribe(
        &mut self,
        _path: &Path,
        _opts: &TranscribeOptions,
    ) -> Result<Transcript, EngineError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("transcribe:{}", self.spec.model_id));
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        if !self.loaded {
            return Err(EngineError::NotLoaded);
        }
        if self.fail_transcribe {
            return Err(EngineError::InferenceFailed(
                "scripted inference failure".to_string(),
            ));
        }
        Ok(self.transcript.clone())
    }

    fn release(&mut self) {
        self.log
            .lock()
            .unwrap()
            .push(format!("release:{}", self.spec.model_id));
        self.loaded = false;
    }

    fn capabilities(&self) -> EngineCapabilities {
        self.spec.capabilities
    }

    fn model_id(&self) -> &str {
        &self.spec.model_id
    }

    fn engine_kind(&self) -> EngineKind {
        self.spec.engine_kind
    }
}

#[derive(Default)]
pub struct MockEngineFactory {
    pub log: CallLog,
    fail_load: HashSet<String>,
    fail_reload: HashSet<String>,
    fail_transcribe: HashSet<String>,
    transcripts: HashMap<String, Transcript>,
    gate: Option<Gate>,
    created: Mutex<HashMap<String, usize>>,
}

impl MockEngineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script `load` to fail for the given model id.
    pub fn fail_load_for(mut self, model_id: &str) -> Self {
        self.fail_load.insert(model_id.to_string());
        self
    }

    /// Script `load` to fail for the given model id, but only once the
    /// model has already been created before. Simulates a model that
    /// loaded fine at startup and then cannot be restored during swap
    /// recovery.
    pub fn fail_load_for_reloads(mut self, model_id: &str) -> Self {
        self.fail_reload.insert(model_id.to_string());
        self
    }

    /// Script `transcribe` to fail for the given model id.
    pub fn fail_transcribe_for(mut self, model_id: &str) -> Self {
        self.fail_transcribe.insert(model_id.to_string());
        self
    }

    /// Fix the transcript returned for the given model id.
    pub fn with_transcript(mut self, model_id: &str, transcript: Transcript) -> Self {
        self.transcripts.insert(model_id.to_string(), transcript);
        self
    }

    /// Make every engine block in `transcribe` until the gate opens.
    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    fn default_transcript(spec: &ModelSpec) -> Transcript {
        let segments = spec.capabilities.timestamp.then(|| {
            vec![Segment {
                id: 0,
                speaker: spec
                    .capabilities
                    .diarization
                    .then(|| "Speaker 0".to_string()),
                start: 0.0,
                end: 1.5,
                text: "hello from the mock engine".to_string(),
            }]
        });
        Transcript {
            text: "hello from the mock engine".to_string(),
            duration: Some(1.5),
            language: Some("zh".to_string()),
            segments,
        }
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(&self, spec: &ModelSpec) -> Box<dyn AsrEngine> {
        let prior_creates = {
            let mut created = self.created.lock().unwrap();
            let count = created.entry(spec.model_id.clone()).or_insert(0);
            let prior = *count;
            *count += 1;
            prior
        };
        Box::new(MockEngine {
            log: Arc::clone(&self.log),
            loaded: false,
            fail_load: self.fail_load.contains(&spec.model_id)
                || (prior_creates > 0 && self.fail_reload.contains(&spec.model_id)),
            fail_transcribe: self.fail_transcribe.contains(&spec.model_id),
            transcript: self
                .transcripts
                .get(&spec.model_id)
                .cloned()
                .unwrap_or_else(|| Self::default_transcript(spec)),
            gate: self.gate.clone(),
            spec: spec.clone(),
        })
    }
}
