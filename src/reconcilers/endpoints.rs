// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Mirroring declared endpoints onto the derived `Ingress` status.
//!
//! Published endpoints are compared to the declared ones as sets of strings:
//! address and hostname entries are flattened together and ordering is
//! ignored. When they differ the whole list is rewritten; entries are never
//! patched individually.

use crate::errors::SyncError;
use crate::store::ResourceStore;
use k8s_openapi::api::networking::v1::{
    Ingress, IngressLoadBalancerIngress, IngressLoadBalancerStatus, IngressStatus,
};
use kube::ResourceExt;
use std::collections::HashSet;
use std::net::IpAddr;
use tracing::{debug, info};

/// Published endpoint entries of an `Ingress`.
#[must_use]
pub fn published_endpoints(ingress: &Ingress) -> &[IngressLoadBalancerIngress] {
    ingress
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_deref())
        .unwrap_or_default()
}

/// Flatten published entries into their address or hostname strings.
///
/// An entry with both fields set contributes its address; an entry with
/// neither contributes nothing.
fn published_values(published: &[IngressLoadBalancerIngress]) -> HashSet<&str> {
    published
        .iter()
        .filter_map(|entry| {
            entry
                .ip
                .as_deref()
                .filter(|ip| !ip.is_empty())
                .or_else(|| entry.hostname.as_deref().filter(|host| !host.is_empty()))
        })
        .collect()
}

/// Whether the published entries are stale with respect to `declared`.
///
/// Stale means the counts differ, or some declared string is not among the
/// published values.
#[must_use]
pub fn endpoints_differ(published: &[IngressLoadBalancerIngress], declared: &[String]) -> bool {
    if published.len() != declared.len() {
        return true;
    }

    let values = published_values(published);
    declared
        .iter()
        .any(|endpoint| !values.contains(endpoint.as_str()))
}

/// Convert declared endpoint strings into load-balancer entries.
///
/// Strings that parse as an IPv4 or IPv6 address become address entries,
/// everything else becomes a hostname entry. Order is preserved.
#[must_use]
pub fn endpoints_to_status(declared: &[String]) -> Vec<IngressLoadBalancerIngress> {
    declared
        .iter()
        .map(|endpoint| {
            if endpoint.parse::<IpAddr>().is_ok() {
                IngressLoadBalancerIngress {
                    ip: Some(endpoint.clone()),
                    ..Default::default()
                }
            } else {
                IngressLoadBalancerIngress {
                    hostname: Some(endpoint.clone()),
                    ..Default::default()
                }
            }
        })
        .collect()
}

/// Rewrite the published endpoints of `ingress` if they drifted from `declared`.
///
/// # Returns
///
/// `true` if the status was rewritten, `false` if it was already current.
///
/// # Errors
///
/// Returns [`SyncError::StatusUpdate`] if the status write fails, including an
/// optimistic-concurrency conflict.
pub async fn reconcile_endpoints(
    store: &dyn ResourceStore,
    namespace: &str,
    globaldns_name: &str,
    ingress: &Ingress,
    declared: &[String],
) -> Result<bool, SyncError> {
    if !endpoints_differ(published_endpoints(ingress), declared) {
        debug!(
            globaldns = %globaldns_name,
            ingress = %ingress.name_any(),
            "Ingress endpoints already current"
        );
        return Ok(false);
    }

    let mut desired = ingress.clone();
    desired.status = Some(IngressStatus {
        load_balancer: Some(IngressLoadBalancerStatus {
            ingress: Some(endpoints_to_status(declared)),
        }),
    });

    store
        .replace_ingress_status(namespace, &desired)
        .await
        .map_err(|source| SyncError::StatusUpdate {
            name: globaldns_name.to_string(),
            source,
        })?;

    info!(
        globaldns = %globaldns_name,
        ingress = %ingress.name_any(),
        endpoints = ?declared,
        "Updated Ingress endpoints"
    );
    crate::metrics::record_resource_updated("Ingress");

    Ok(true)
}

#[cfg(test)]
#[path = "endpoints_tests.rs"]
mod endpoints_tests;
