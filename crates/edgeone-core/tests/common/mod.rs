//! Test doubles and common utilities for refresher contract tests
//!
//! Sources here are scripted: each fetch pops the next outcome, and the
//! last outcome repeats once the script runs out.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use edgeone_core::error::{Error, Result};
use edgeone_core::prefix::parse_all;
use edgeone_core::{
    Prefix, PrefixSource, PrefixSourceFactory, RefreshEvent, SourceConfig, SourceKind,
    SourceRegistry,
};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// What a scripted fetch does
#[derive(Debug, Clone)]
pub enum Step {
    /// Return these CIDR expressions
    Ok(Vec<&'static str>),
    /// Fail with a transport error carrying this message
    Fail(&'static str),
    /// Never complete
    Hang,
}

struct Script {
    steps: VecDeque<Step>,
    last: Step,
}

/// A PrefixSource that follows a script and counts its calls
#[derive(Clone)]
pub struct ScriptedSource {
    name: &'static str,
    script: Arc<Mutex<Script>>,
    calls: Arc<AtomicUsize>,
    call_times: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedSource {
    pub fn new(name: &'static str, steps: Vec<Step>) -> Self {
        let last = steps.last().cloned().unwrap_or(Step::Ok(Vec::new()));
        Self {
            name,
            script: Arc::new(Mutex::new(Script {
                steps: steps.into(),
                last,
            })),
            calls: Arc::new(AtomicUsize::new(0)),
            call_times: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A source that always returns `cidrs`
    pub fn always(name: &'static str, cidrs: Vec<&'static str>) -> Self {
        Self::new(name, vec![Step::Ok(cidrs)])
    }

    /// A source that always fails
    pub fn failing(name: &'static str, message: &'static str) -> Self {
        Self::new(name, vec![Step::Fail(message)])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Clock readings taken at the start of each fetch
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    fn next_step(&self) -> Step {
        let mut script = self.script.lock().unwrap();
        match script.steps.pop_front() {
            Some(step) => {
                script.last = step.clone();
                step
            }
            None => script.last.clone(),
        }
    }
}

#[async_trait::async_trait]
impl PrefixSource for ScriptedSource {
    async fn fetch(&self) -> Result<Vec<Prefix>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_times.lock().unwrap().push(Instant::now());

        match self.next_step() {
            Step::Ok(cidrs) => parse_all(cidrs),
            Step::Fail(message) => Err(Error::http(message)),
            Step::Hang => std::future::pending().await,
        }
    }

    fn source_name(&self) -> &'static str {
        self.name
    }
}

/// Factory handing out clones of one scripted source
pub struct ScriptedFactory {
    source: ScriptedSource,
    creates: Arc<AtomicUsize>,
}

impl ScriptedFactory {
    pub fn new(source: ScriptedSource) -> (Self, Arc<AtomicUsize>) {
        let creates = Arc::new(AtomicUsize::new(0));
        (
            Self {
                source,
                creates: creates.clone(),
            },
            creates,
        )
    }
}

impl PrefixSourceFactory for ScriptedFactory {
    fn create(&self, _config: &SourceConfig) -> Result<Box<dyn PrefixSource>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.source.clone()))
    }
}

/// Registry with the given privileged and public doubles
pub fn registry_with(privileged: &ScriptedSource, public: &ScriptedSource) -> SourceRegistry {
    let registry = SourceRegistry::new();
    let (privileged, _) = ScriptedFactory::new(privileged.clone());
    let (public, _) = ScriptedFactory::new(public.clone());
    registry.register_source(SourceKind::Privileged, Box::new(privileged));
    registry.register_source(SourceKind::Public, Box::new(public));
    registry
}

/// Config with complete privileged credentials
pub fn credentialed_config() -> SourceConfig {
    SourceConfig::new().with_credentials("zone-2o0i7nd1yj1o", "AKIDEXAMPLE", "SECRETEXAMPLE")
}

/// Receive the next event, failing the test if none arrives in time
///
/// Under a paused clock the wait auto-advances to the next timer.
pub async fn next_event(rx: &mut mpsc::Receiver<RefreshEvent>) -> RefreshEvent {
    tokio::time::timeout(Duration::from_secs(24 * 60 * 60), rx.recv())
        .await
        .expect("event arrives")
        .expect("event channel open")
}

/// Skip events until the next `Published`, returning (source, generation)
pub async fn next_published(rx: &mut mpsc::Receiver<RefreshEvent>) -> (SourceKind, u64) {
    loop {
        if let RefreshEvent::Published {
            source, generation, ..
        } = next_event(rx).await
        {
            return (source, generation);
        }
    }
}

/// Render a prefix slice as strings for comparison
pub fn rendered(prefixes: &[Prefix]) -> Vec<String> {
    prefixes.iter().map(ToString::to_string).collect()
}
