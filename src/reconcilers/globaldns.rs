// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! `GlobalDNS` reconciliation pass.
//!
//! One pass takes a `GlobalDNS` to its derived state:
//!
//! - **Terminal** - the object is being deleted; nothing to do. The derived
//!   `Ingress` and RBAC objects go away through owner-reference garbage collection.
//! - **Missing metadata** - no creator annotation or no UID; fail before any write.
//! - **No-op** - no endpoints declared and no derived `Ingress`; nothing to publish.
//! - **Create** - no owned `Ingress` yet; create it, then publish the endpoints.
//! - **Update** - an owned `Ingress` exists; rewrite its endpoints if they drifted.
//!
//! Create and update both finish with the access stage (authorization check,
//! membership derivation, RBAC objects, membership persistence). Any error aborts
//! the pass; the next trigger starts again from the top.

use super::access::{sync_access, AccessSyncResult};
use super::endpoints::reconcile_endpoints;
use super::ownership::{find_owned_ingress, OwnerLink};
use super::projection::create_ingress;
use crate::context::Context;
use crate::crd::GlobalDNS;
use crate::errors::SyncError;
use crate::labels::CREATOR_ID_ANNOTATION;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a successful pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The `GlobalDNS` is being deleted
    Terminal,
    /// Nothing declared and nothing derived
    NoOp,
    /// The `Ingress` was created and the access stage ran
    Created {
        endpoints_written: bool,
        access: AccessSyncResult,
    },
    /// An owned `Ingress` already existed and the access stage ran
    Updated {
        endpoints_written: bool,
        access: AccessSyncResult,
    },
}

impl SyncOutcome {
    /// Whether the pass wrote anything to the store.
    #[must_use]
    pub fn wrote(&self) -> bool {
        match self {
            SyncOutcome::Terminal | SyncOutcome::NoOp => false,
            SyncOutcome::Created { .. } => true,
            SyncOutcome::Updated {
                endpoints_written,
                access,
            } => *endpoints_written || access.rbac_objects_written > 0 || access.members_updated,
        }
    }
}

/// Creator identity recorded on the `GlobalDNS`. An empty value counts as missing,
/// since it cannot name a `RoleBinding` subject.
fn creator_id(globaldns: &GlobalDNS) -> Result<&str, SyncError> {
    globaldns
        .annotations()
        .get(CREATOR_ID_ANNOTATION)
        .map(String::as_str)
        .filter(|creator| !creator.is_empty())
        .ok_or_else(|| SyncError::MissingMetadata {
            name: globaldns.name_any(),
            field: format!("annotation {CREATOR_ID_ANNOTATION}"),
        })
}

/// Reconcile a `GlobalDNS` against the store held by `ctx`.
///
/// # Errors
///
/// Returns the first [`SyncError`] raised by any stage. Nothing is rolled back;
/// every stage is safe to repeat.
pub async fn reconcile_globaldns(
    ctx: Arc<Context>,
    globaldns: GlobalDNS,
) -> Result<SyncOutcome, SyncError> {
    let name = globaldns.name_any();

    if globaldns.metadata.deletion_timestamp.is_some() {
        debug!(globaldns = %name, "GlobalDNS is being deleted, nothing to do");
        return Ok(SyncOutcome::Terminal);
    }

    let creator = creator_id(&globaldns)?;
    let link = OwnerLink::of(&globaldns).ok_or_else(|| SyncError::MissingMetadata {
        name: name.clone(),
        field: "metadata.uid".to_string(),
    })?;

    let store = ctx.store.as_ref();
    let namespace = ctx.global_namespace();
    let declared = globaldns.declared_endpoints();

    let existing = find_owned_ingress(store, namespace, &globaldns, &link).await?;

    if existing.is_none() && declared.is_empty() {
        debug!(globaldns = %name, "No endpoints declared and no Ingress, nothing to publish");
        return Ok(SyncOutcome::NoOp);
    }

    let (ingress, created) = match existing {
        Some(ingress) => (ingress, false),
        None => (create_ingress(store, namespace, &globaldns).await?, true),
    };

    let endpoints_written =
        reconcile_endpoints(store, namespace, &name, &ingress, declared).await?;
    let access = sync_access(store, namespace, &globaldns, creator).await?;

    let outcome = if created {
        SyncOutcome::Created {
            endpoints_written,
            access,
        }
    } else {
        SyncOutcome::Updated {
            endpoints_written,
            access,
        }
    };

    if outcome.wrote() {
        info!(globaldns = %name, outcome = ?outcome, "Reconciled GlobalDNS");
    } else {
        debug!(globaldns = %name, "GlobalDNS already converged");
    }

    Ok(outcome)
}

#[cfg(test)]
#[path = "globaldns_tests.rs"]
mod globaldns_tests;
