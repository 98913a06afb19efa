// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Router};
use clap::Parser;
use futures::StreamExt;
use globaldns::{
    config::ControllerConfig,
    constants::{METRICS_SERVER_PATH, TOKIO_WORKER_THREADS},
    context::Context,
    crd::GlobalDNS,
    errors::SyncError,
    metrics,
    reconcilers::{ownership::ingress_name, reconcile_globaldns},
};
use k8s_openapi::api::networking::v1::Ingress;
use kube::{
    runtime::{controller, controller::Action, reflector::ObjectRef, watcher::Config, Controller},
    Api, Client, Resource, ResourceExt,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

fn main() -> Result<()> {
    let config = ControllerConfig::parse();

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("globaldns-controller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(config))
}

async fn async_main(config: ControllerConfig) -> Result<()> {
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Example: RUST_LOG=debug cargo run
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json cargo run
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    info!(
        global_namespace = %config.global_namespace,
        concurrency = config.reconcile_concurrency,
        "Starting GlobalDNS controller"
    );

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let metrics_addr = config.metrics_bind_address;
    let ctx = Arc::new(Context::from_client(client.clone(), config));

    // Neither task should ever exit - if one does, exit the main process
    tokio::select! {
        result = run_metrics_server(metrics_addr) => {
            error!("CRITICAL: metrics server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("metrics server exited unexpectedly without error")
        }
        result = run_globaldns_controller(client, ctx) => {
            error!("GlobalDNS controller stopped: {:?}", result);
            result
        }
    }
}

/// Serve the Prometheus registry over HTTP.
async fn run_metrics_server(addr: SocketAddr) -> Result<()> {
    let app = Router::new().route(METRICS_SERVER_PATH, get(metrics_handler));

    let listener = TcpListener::bind(addr).await?;
    info!(address = %addr, path = METRICS_SERVER_PATH, "Serving metrics");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn metrics_handler() -> (StatusCode, String) {
    match metrics::gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!("Failed to encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Run the `GlobalDNS` controller
///
/// Derived `Ingress`es live in the global namespace while `GlobalDNS` is
/// cluster-scoped, so they are mapped back to their owner through owner
/// references rather than `owns`.
async fn run_globaldns_controller(client: Client, ctx: Arc<Context>) -> Result<()> {
    info!("Starting GlobalDNS controller");

    let api = Api::<GlobalDNS>::all(client.clone());
    let ingress_api = Api::<Ingress>::namespaced(client, ctx.global_namespace());
    let concurrency = ctx.config.reconcile_concurrency;

    Controller::new(api, Config::default())
        .watches(ingress_api, Config::default(), |ingress| {
            ingress
                .owner_references()
                .iter()
                .filter(|owner| owner.kind == GlobalDNS::kind(&()))
                .map(|owner| ObjectRef::<GlobalDNS>::new(&owner.name))
                .collect::<Vec<_>>()
        })
        .with_config(controller::Config::default().concurrency(concurrency))
        .shutdown_on_signal()
        .run(reconcile_globaldns_wrapper, error_policy, ctx)
        .for_each(|res| async move {
            match res {
                Ok((obj, _)) => debug!(globaldns = %obj.name, "Reconciled"),
                Err(e) => debug!("Reconcile loop error: {e}"),
            }
        })
        .await;

    info!("GlobalDNS controller shut down");
    Ok(())
}

/// Reconcile wrapper for `GlobalDNS`
async fn reconcile_globaldns_wrapper(
    globaldns: Arc<GlobalDNS>,
    ctx: Arc<Context>,
) -> Result<Action, SyncError> {
    let start = Instant::now();
    let kind = GlobalDNS::kind(&());

    debug!(
        globaldns = %globaldns.name_any(),
        ingress = %ingress_name(&globaldns.name_any()),
        "Reconcile wrapper called for GlobalDNS"
    );

    match reconcile_globaldns(ctx.clone(), (*globaldns).clone()).await {
        Ok(outcome) => {
            debug!(globaldns = %globaldns.name_any(), outcome = ?outcome, "Reconciliation finished");
            metrics::record_reconciliation_success(&kind, start.elapsed());
            Ok(Action::requeue(ctx.config.requeue_interval()))
        }
        Err(e) => {
            metrics::record_reconciliation_error(&kind, start.elapsed());
            metrics::record_error(&kind, e.reason());
            Err(e)
        }
    }
}

/// Error policy for the `GlobalDNS` controller
///
/// Transient failures come back quickly. Failures that need someone to fix the
/// object or the project bindings wait for the slower interval.
fn error_policy(globaldns: Arc<GlobalDNS>, err: &SyncError, ctx: Arc<Context>) -> Action {
    if err.is_retryable() {
        warn!(
            globaldns = %globaldns.name_any(),
            reason = err.reason(),
            "Failed to reconcile GlobalDNS, retrying: {err}"
        );
        Action::requeue(ctx.config.error_requeue())
    } else {
        error!(
            globaldns = %globaldns.name_any(),
            reason = err.reason(),
            "Failed to reconcile GlobalDNS, waiting for an external fix: {err}"
        );
        Action::requeue(ctx.config.fatal_requeue())
    }
}
