// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Building and creating the placeholder `Ingress` for a `GlobalDNS`.
//!
//! The `Ingress` routes the FQDN to a backend that does not exist. It never
//! serves traffic; its only job is to carry the endpoint list in
//! `status.loadBalancer.ingress`, where external-dns picks it up for the
//! `rancher-external-dns` ingress class.

use super::ownership::ingress_name;
use crate::constants::{
    INGRESS_CLASS_EXTERNAL_DNS, PLACEHOLDER_PATH_TYPE, PLACEHOLDER_SERVICE_NAME,
    PLACEHOLDER_SERVICE_PORT,
};
use crate::crd::GlobalDNS;
use crate::errors::SyncError;
use crate::labels::{
    COMPONENT_ENDPOINT_PROJECTION, INGRESS_CLASS_ANNOTATION, K8S_COMPONENT, K8S_MANAGED_BY,
    K8S_PART_OF, MANAGED_BY_GLOBALDNS_CONTROLLER, PART_OF_GLOBALDNS,
};
use crate::store::ResourceStore;
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use tracing::info;

/// Labels placed on every derived object of a given component.
pub(crate) fn derived_labels(component: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (K8S_PART_OF.to_string(), PART_OF_GLOBALDNS.to_string()),
        (K8S_COMPONENT.to_string(), component.to_string()),
        (
            K8S_MANAGED_BY.to_string(),
            MANAGED_BY_GLOBALDNS_CONTROLLER.to_string(),
        ),
    ])
}

/// Build the desired `Ingress` for `globaldns` in `namespace`.
///
/// The owner reference is a controller reference to the `GlobalDNS`, so the
/// garbage collector removes the `Ingress` when the `GlobalDNS` is deleted.
#[must_use]
pub fn build_ingress(globaldns: &GlobalDNS, namespace: &str) -> Ingress {
    let annotations = BTreeMap::from([(
        INGRESS_CLASS_ANNOTATION.to_string(),
        INGRESS_CLASS_EXTERNAL_DNS.to_string(),
    )]);

    let placeholder_path = HTTPIngressPath {
        path_type: PLACEHOLDER_PATH_TYPE.to_string(),
        backend: IngressBackend {
            service: Some(IngressServiceBackend {
                name: PLACEHOLDER_SERVICE_NAME.to_string(),
                port: Some(ServiceBackendPort {
                    number: Some(PLACEHOLDER_SERVICE_PORT),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        },
        ..Default::default()
    };

    Ingress {
        metadata: ObjectMeta {
            name: Some(ingress_name(&globaldns.name_any())),
            namespace: Some(namespace.to_string()),
            labels: Some(derived_labels(COMPONENT_ENDPOINT_PROJECTION)),
            annotations: Some(annotations),
            owner_references: globaldns.controller_owner_ref(&()).map(|owner| vec![owner]),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            rules: Some(vec![IngressRule {
                host: Some(globaldns.spec.fqdn.clone()),
                http: Some(HTTPIngressRuleValue {
                    paths: vec![placeholder_path],
                }),
            }]),
            ..Default::default()
        }),
        status: None,
    }
}

/// Create the placeholder `Ingress` for `globaldns`.
///
/// This is a single create call. A failure, including a name collision, is
/// returned as-is and retried on the next trigger.
///
/// # Errors
///
/// Returns [`SyncError::Creation`] if the store rejects the create.
pub async fn create_ingress(
    store: &dyn ResourceStore,
    namespace: &str,
    globaldns: &GlobalDNS,
) -> Result<Ingress, SyncError> {
    let desired = build_ingress(globaldns, namespace);
    let created = store
        .create_ingress(namespace, &desired)
        .await
        .map_err(|source| SyncError::Creation {
            name: globaldns.name_any(),
            source,
        })?;

    info!(
        globaldns = %globaldns.name_any(),
        ingress = %created.name_any(),
        namespace = %namespace,
        fqdn = %globaldns.spec.fqdn,
        "Created Ingress for GlobalDNS"
    );
    crate::metrics::record_resource_created("Ingress");

    Ok(created)
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod projection_tests;
