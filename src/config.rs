// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Controller configuration.
//!
//! Every setting can be passed as a command-line flag or through the matching
//! environment variable, which is how the controller is configured when it runs
//! in a pod.

use crate::constants::{
    DEFAULT_GLOBAL_NAMESPACE, DEFAULT_RECONCILE_CONCURRENCY, DEFAULT_REQUEUE_DURATION_SECS,
    ERROR_REQUEUE_DURATION_SECS, FATAL_ERROR_REQUEUE_DURATION_SECS, METRICS_SERVER_BIND_ADDRESS,
};
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Runtime settings of the GlobalDNS controller.
#[derive(Parser, Clone, Debug, PartialEq, Eq)]
#[command(name = "globaldns-controller", version, about)]
pub struct ControllerConfig {
    /// Namespace holding derived Ingresses, Roles and RoleBindings
    #[arg(long, env = "GLOBAL_NAMESPACE", default_value = DEFAULT_GLOBAL_NAMESPACE)]
    pub global_namespace: String,

    /// Address the Prometheus metrics endpoint listens on
    #[arg(long, env = "METRICS_BIND_ADDRESS", default_value = METRICS_SERVER_BIND_ADDRESS)]
    pub metrics_bind_address: SocketAddr,

    /// Seconds before a successfully reconciled GlobalDNS is checked again
    #[arg(long, env = "REQUEUE_INTERVAL_SECS", default_value_t = DEFAULT_REQUEUE_DURATION_SECS)]
    pub requeue_interval_secs: u64,

    /// Seconds before a pass that failed with a transient error is retried
    #[arg(long, env = "ERROR_REQUEUE_SECS", default_value_t = ERROR_REQUEUE_DURATION_SECS)]
    pub error_requeue_secs: u64,

    /// Seconds before a pass that needs an external fix is retried
    #[arg(long, env = "FATAL_REQUEUE_SECS", default_value_t = FATAL_ERROR_REQUEUE_DURATION_SECS)]
    pub fatal_requeue_secs: u64,

    /// Maximum number of GlobalDNS objects reconciled in parallel
    #[arg(long, env = "RECONCILE_CONCURRENCY", default_value_t = DEFAULT_RECONCILE_CONCURRENCY)]
    pub reconcile_concurrency: u16,
}

impl ControllerConfig {
    #[must_use]
    pub fn requeue_interval(&self) -> Duration {
        Duration::from_secs(self.requeue_interval_secs)
    }

    #[must_use]
    pub fn error_requeue(&self) -> Duration {
        Duration::from_secs(self.error_requeue_secs)
    }

    #[must_use]
    pub fn fatal_requeue(&self) -> Duration {
        Duration::from_secs(self.fatal_requeue_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            global_namespace: DEFAULT_GLOBAL_NAMESPACE.to_string(),
            metrics_bind_address: SocketAddr::from(([0, 0, 0, 0], 8080)),
            requeue_interval_secs: DEFAULT_REQUEUE_DURATION_SECS,
            error_requeue_secs: ERROR_REQUEUE_DURATION_SECS,
            fatal_requeue_secs: FATAL_ERROR_REQUEUE_DURATION_SECS,
            reconcile_concurrency: DEFAULT_RECONCILE_CONCURRENCY,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
