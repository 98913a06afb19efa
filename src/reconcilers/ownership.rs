// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Locating the `Ingress` derived from a `GlobalDNS`.
//!
//! The derived `Ingress` has a deterministic name, but a name alone proves
//! nothing: an unrelated object may already use it. An `Ingress` is only
//! considered ours when one of its owner references carries the `GlobalDNS`
//! UID and kind. Anything else is left untouched and treated as absent.

use crate::constants::INGRESS_NAME_PREFIX;
use crate::crd::GlobalDNS;
use crate::errors::SyncError;
use crate::store::ResourceStore;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::{Resource, ResourceExt};
use tracing::{debug, warn};

/// Identity of the object an `Ingress` was created for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnerLink {
    pub uid: String,
    pub kind: String,
}

impl OwnerLink {
    /// Owner link of a `GlobalDNS`, or `None` if it has no UID yet.
    #[must_use]
    pub fn of(globaldns: &GlobalDNS) -> Option<Self> {
        globaldns.uid().map(|uid| Self {
            uid,
            kind: GlobalDNS::kind(&()).to_string(),
        })
    }

    /// Whether an owner reference points at this identity.
    #[must_use]
    pub fn matches(&self, owner: &OwnerReference) -> bool {
        owner.uid == self.uid && owner.kind == self.kind
    }
}

/// Deterministic name of the `Ingress` derived from the named `GlobalDNS`.
#[must_use]
pub fn ingress_name(globaldns_name: &str) -> String {
    format!("{INGRESS_NAME_PREFIX}-{globaldns_name}")
}

/// Whether any owner reference of `ingress` matches `link`.
#[must_use]
pub fn is_owned_by(ingress: &Ingress, link: &OwnerLink) -> bool {
    ingress
        .owner_references()
        .iter()
        .any(|owner| link.matches(owner))
}

/// Find the `Ingress` owned by `globaldns`.
///
/// # Returns
///
/// * `Ok(Some(ingress))` - the `Ingress` exists and is owned by this `GlobalDNS`
/// * `Ok(None)` - no `Ingress` with the derived name, or one owned by something else
///
/// # Errors
///
/// Returns [`SyncError::Lookup`] if the store fails for a reason other than
/// not-found.
pub async fn find_owned_ingress(
    store: &dyn ResourceStore,
    namespace: &str,
    globaldns: &GlobalDNS,
    link: &OwnerLink,
) -> Result<Option<Ingress>, SyncError> {
    let globaldns_name = globaldns.name_any();
    let name = ingress_name(&globaldns_name);

    let ingress = match store.get_ingress(namespace, &name).await {
        Ok(ingress) => ingress,
        Err(e) if e.is_not_found() => {
            debug!(globaldns = %globaldns_name, ingress = %name, "No derived Ingress yet");
            return Ok(None);
        }
        Err(source) => {
            return Err(SyncError::Lookup {
                name: globaldns_name,
                source,
            })
        }
    };

    if is_owned_by(&ingress, link) {
        Ok(Some(ingress))
    } else {
        warn!(
            globaldns = %globaldns_name,
            ingress = %name,
            namespace = %namespace,
            "Ingress with the derived name is not owned by this GlobalDNS, ignoring it"
        );
        crate::metrics::record_ownership_mismatch();
        Ok(None)
    }
}

#[cfg(test)]
#[path = "ownership_tests.rs"]
mod ownership_tests;
