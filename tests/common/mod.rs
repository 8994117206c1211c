//! Shared fakes for controller, resolution, and guard tests.
//!
//! `FakeSource` and `FakeProbe` are scripted stand-ins for the real
//! secret stores and network probes: each returns a handle whose
//! behavior can be flipped mid-test to simulate outages and recovery.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use handover::bootstrap::model::{ProviderSpec, SecretSpec};
use handover::controller::{ControllerSettings, FailoverController, ProviderSlot};
use handover::error::{HandoverError, ResourceError};
use handover::probe::{ConnectivityProbe, ProbeOutcome, ProbeTarget};
use handover::provider::{
    CacheSettings, DatabaseSettings, PayloadVersion, ProviderConfig, SecretSource, SigningSecret,
};
use handover::registry::{EnvironmentCheck, ProviderRegistry};
use handover::resources::SwitchSubscriber;

pub fn test_config(provider: &str, version: &str) -> ProviderConfig {
    ProviderConfig {
        provider_id: provider.to_string(),
        signing_secret: SigningSecret::from(format!("secret-{provider}")),
        database: DatabaseSettings {
            host: format!("db.{provider}.internal"),
            port: 3306,
            user: "app".into(),
            password: "pw".into(),
            database: "boards".into(),
        },
        cache: CacheSettings {
            host: format!("cache.{provider}.internal"),
            port: 6379,
            tls_required: provider == "secondary",
        },
        version: PayloadVersion::Hash(version.to_string()),
    }
}

/// Shared control surface for a [`FakeSource`].
#[derive(Clone)]
pub struct SourceHandle {
    fail: Arc<Mutex<Option<String>>>,
    version: Arc<Mutex<String>>,
    delay: Arc<Mutex<Duration>>,
    pub fetches: Arc<AtomicUsize>,
}

impl SourceHandle {
    pub fn fail_with(&self, reason: &str) {
        *self.fail.lock().unwrap() = Some(reason.to_string());
    }

    pub fn succeed(&self) {
        *self.fail.lock().unwrap() = None;
    }

    pub fn rotate_payload(&self, version: &str) {
        *self.version.lock().unwrap() = version.to_string();
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

pub struct FakeSource {
    provider: String,
    handle: SourceHandle,
}

impl FakeSource {
    pub fn new(provider: &str) -> (Box<dyn SecretSource>, SourceHandle) {
        let handle = SourceHandle {
            fail: Arc::new(Mutex::new(None)),
            version: Arc::new(Mutex::new("v1".to_string())),
            delay: Arc::new(Mutex::new(Duration::ZERO)),
            fetches: Arc::new(AtomicUsize::new(0)),
        };
        let source = Self {
            provider: provider.to_string(),
            handle: handle.clone(),
        };
        (Box::new(source), handle)
    }
}

#[async_trait]
impl SecretSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch(&self) -> Result<ProviderConfig, HandoverError> {
        self.handle.fetches.fetch_add(1, Ordering::SeqCst);

        let delay = *self.handle.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(reason) = self.handle.fail.lock().unwrap().clone() {
            return Err(HandoverError::SourceUnavailable {
                provider: self.provider.clone(),
                source: reason.into(),
            });
        }

        let version = self.handle.version.lock().unwrap().clone();
        Ok(test_config(&self.provider, &version))
    }
}

/// Shared control surface for a [`FakeProbe`].
#[derive(Clone)]
pub struct ProbeHandle {
    failing: Arc<Mutex<HashMap<String, String>>>,
    pub checks: Arc<AtomicUsize>,
}

impl ProbeHandle {
    pub fn fail_provider(&self, provider: &str, reason: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(provider.to_string(), reason.to_string());
    }

    pub fn pass_provider(&self, provider: &str) {
        self.failing.lock().unwrap().remove(provider);
    }

    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

pub struct FakeProbe {
    handle: ProbeHandle,
}

impl FakeProbe {
    pub fn new() -> (Box<dyn ConnectivityProbe>, ProbeHandle) {
        let handle = ProbeHandle {
            failing: Arc::new(Mutex::new(HashMap::new())),
            checks: Arc::new(AtomicUsize::new(0)),
        };
        let probe = Self {
            handle: handle.clone(),
        };
        (Box::new(probe), handle)
    }
}

#[async_trait]
impl ConnectivityProbe for FakeProbe {
    async fn check(&self, config: &ProviderConfig) -> ProbeOutcome {
        self.handle.checks.fetch_add(1, Ordering::SeqCst);
        match self.handle.failing.lock().unwrap().get(&config.provider_id) {
            Some(reason) => ProbeOutcome::Fail {
                target: ProbeTarget::Database,
                reason: reason.clone(),
            },
            None => ProbeOutcome::Pass,
        }
    }
}

/// Environment check answering with a fixed hint.
pub struct FixedHint(pub Option<String>);

#[async_trait]
impl EnvironmentCheck for FixedHint {
    fn name(&self) -> &'static str {
        "fixed-hint"
    }

    async fn detect(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Subscriber recording the provider id of every rebuild.
pub struct CountingSubscriber {
    pub rebuilds: Arc<Mutex<Vec<String>>>,
}

impl CountingSubscriber {
    pub fn new() -> (Arc<dyn SwitchSubscriber>, Arc<Mutex<Vec<String>>>) {
        let rebuilds = Arc::new(Mutex::new(Vec::new()));
        let subscriber = Arc::new(Self {
            rebuilds: Arc::clone(&rebuilds),
        });
        (subscriber, rebuilds)
    }
}

#[async_trait]
impl SwitchSubscriber for CountingSubscriber {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn rebuild(&self, config: &ProviderConfig) -> Result<(), ResourceError> {
        self.rebuilds
            .lock()
            .unwrap()
            .push(config.provider_id.clone());
        Ok(())
    }
}

pub fn spec(id: &str, enabled: bool) -> ProviderSpec {
    ProviderSpec {
        id: id.to_string(),
        enabled,
        secrets: SecretSpec::File {
            path: "unused.json".into(),
        },
        metadata_addr: None,
        runtime_env: None,
    }
}

pub struct TestController {
    pub controller: Arc<FailoverController>,
    pub sources: HashMap<String, SourceHandle>,
    pub probe: ProbeHandle,
}

/// Controller with fake sources and probe for the given providers, in
/// static priority order, with an optional fixed environment hint.
pub fn build_controller(ids: &[&str], hint: Option<&str>) -> TestController {
    build_controller_with_specs(
        &ids.iter().map(|id| spec(id, true)).collect::<Vec<_>>(),
        hint,
    )
}

pub fn build_controller_with_specs(
    specs: &[ProviderSpec],
    hint: Option<&str>,
) -> TestController {
    let mut slots = Vec::new();
    let mut sources = HashMap::new();

    for provider_spec in specs {
        let (source, handle) = FakeSource::new(&provider_spec.id);
        slots.push(ProviderSlot {
            id: provider_spec.id.clone(),
            source,
        });
        sources.insert(provider_spec.id.clone(), handle);
    }

    let checks: Vec<Box<dyn EnvironmentCheck>> =
        vec![Box::new(FixedHint(hint.map(String::from)))];
    let registry = ProviderRegistry::with_checks(specs, checks);

    let (probe, probe_handle) = FakeProbe::new();

    let controller = Arc::new(FailoverController::new(
        slots,
        probe,
        registry,
        ControllerSettings {
            fetch_timeout: Duration::from_secs(2),
        },
    ));

    TestController {
        controller,
        sources,
        probe: probe_handle,
    }
}
