// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciliation logic for `GlobalDNS` resources.
//!
//! A `GlobalDNS` declares an FQDN and the endpoints it should resolve to. The
//! controller publishes those endpoints through a placeholder `Ingress` and keeps
//! the object's access control in sync with project role bindings.
//!
//! # Reconciliation Architecture
//!
//! 1. **Ownership** - [`ownership`] finds the derived `Ingress` and refuses any
//!    object under that name that is not owned by the `GlobalDNS`
//! 2. **Projection** - [`projection`] builds and creates the `Ingress`
//! 3. **Endpoints** - [`endpoints`] mirrors declared endpoints onto the `Ingress`
//!    load-balancer status
//! 4. **Access** - [`access`] checks member groups, derives membership, and
//!    maintains the `Role`s and `RoleBinding`s
//!
//! [`reconcile_globaldns`] drives one full pass.
//!
//! # Example: Using the Reconciler
//!
//! ```rust,no_run
//! use globaldns::config::ControllerConfig;
//! use globaldns::context::Context;
//! use globaldns::crd::GlobalDNS;
//! use globaldns::reconcilers::reconcile_globaldns;
//! use std::sync::Arc;
//!
//! async fn reconcile(client: kube::Client, globaldns: GlobalDNS) -> anyhow::Result<()> {
//!     let ctx = Arc::new(Context::from_client(client, ControllerConfig::default()));
//!     let outcome = reconcile_globaldns(ctx, globaldns).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod endpoints;
pub mod globaldns;
pub mod ownership;
pub mod projection;

pub use globaldns::{reconcile_globaldns, SyncOutcome};

#[cfg(test)]
mod fixtures;
