//! `handover run` — start the controller.
//!
//! Loads the bootstrap file, builds the provider sources, performs the
//! initial resolution (fatal when every provider is down), spawns the
//! background health monitor, and serves the diagnostics endpoint
//! with graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::bootstrap::{self, model::MonitorSettings};
use crate::cli::RunArgs;
use crate::controller::{ControllerSettings, FailoverController, ProviderSlot};
use crate::error::HandoverError;
use crate::logging;
use crate::monitor::HealthMonitor;
use crate::probe::NetProbe;
use crate::provider::sources;
use crate::registry::ProviderRegistry;
use crate::resources::{CacheHandle, DatabaseHandle, SessionSigner};
use crate::server::{self, AppState};

pub async fn execute(args: RunArgs) -> Result<(), HandoverError> {
    let log_format = logging::resolve_format(args.pretty, args.json);
    logging::init(&args.log_level, log_format);

    #[cfg(feature = "sentry-integration")]
    let _sentry_guard = args
        .sentry_dsn
        .as_ref()
        .map(|dsn| crate::sentry_integration::init(dsn, args.sentry_environment.as_deref()));

    let path = bootstrap::resolve_path(args.config.as_deref()).await?;
    let mut boot = bootstrap::load(&path).await?;

    // Apply CLI monitor-interval override if it differs from the default
    if args.monitor_interval != MonitorSettings::default().interval_secs {
        boot.monitor.interval_secs = args.monitor_interval;
    }

    let mut slots = Vec::with_capacity(boot.providers.len());
    for spec in &boot.providers {
        let source = sources::build_source(spec).await?;
        slots.push(ProviderSlot {
            id: spec.id.clone(),
            source,
        });
    }

    let registry = ProviderRegistry::from_specs(&boot.providers);
    let probe = NetProbe::new(Duration::from_secs(boot.probe.timeout_secs));

    let controller = Arc::new(FailoverController::new(
        slots,
        Box::new(probe),
        registry,
        ControllerSettings {
            fetch_timeout: Duration::from_secs(boot.fetch.timeout_secs),
        },
    ));

    // Dependent handles rebuilt on every switch: database pool, cache
    // client, session-store signer.
    controller
        .register_subscriber(Arc::new(DatabaseHandle::default()))
        .await;
    controller
        .register_subscriber(Arc::new(CacheHandle::new()))
        .await;
    controller
        .register_subscriber(Arc::new(SessionSigner::new()))
        .await;

    // Initial resolution is fatal when every provider is down.
    let resolution = controller.resolve().await?;

    // Shutdown signal: flipping the channel stops the monitor loop
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let monitor = HealthMonitor::new(
        Arc::clone(&controller),
        Duration::from_secs(boot.monitor.interval_secs),
    );
    let monitor_handle = tokio::spawn(monitor.run(shutdown_rx));

    let state = Arc::new(AppState {
        controller: Arc::clone(&controller),
        start_time: Instant::now(),
    });
    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        provider = %resolution.provider_id,
        providers = boot.providers.len(),
        monitor_interval_secs = boot.monitor.interval_secs,
        guard_throttle_secs = boot.guard.throttle_secs,
        "handover started"
    );

    // Wrap the shutdown signal to also stop the monitor loop immediately
    let graceful_shutdown = async move {
        server::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(graceful_shutdown)
        .await?;

    // Wait for the monitor task to finish (catches panics)
    if let Err(e) = monitor_handle.await {
        tracing::error!(error = %e, "health monitor task failed");
    }

    tracing::info!("handover stopped");
    Ok(())
}
