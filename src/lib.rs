// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # GlobalDNS - endpoint publishing controller for Kubernetes
//!
//! The GlobalDNS controller turns `GlobalDNS` custom resources into the objects
//! an external-dns deployment consumes, and keeps their access control in line
//! with project role bindings.
//!
//! ## Overview
//!
//! For every `GlobalDNS` the controller:
//!
//! - Creates a placeholder `Ingress` for the FQDN, owned by the `GlobalDNS`
//! - Mirrors the declared endpoints onto the `Ingress` load-balancer status
//! - Checks that member groups hold access to the referenced projects
//! - Derives membership from project owners and members, and persists it
//! - Maintains owner and read-only `Role`s and `RoleBinding`s
//!
//! ## Modules
//!
//! - [`crd`] - `GlobalDNS` and the management types it is checked against
//! - [`reconcilers`] - Reconciliation logic
//! - [`store`] - Resource-store abstraction over the Kubernetes API
//! - [`context`] - Dependencies shared by reconciliation passes
//! - [`config`] - Command-line and environment configuration
//! - [`errors`] - Store and reconciliation error types
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use globaldns::crd::{GlobalDNS, GlobalDNSSpec};
//!
//! let globaldns = GlobalDNS::new(
//!     "app",
//!     GlobalDNSSpec {
//!         fqdn: "app.example.com".to_string(),
//!         ..Default::default()
//!     },
//! );
//! ```

pub mod config;
pub mod constants;
pub mod context;
pub mod crd;
pub mod errors;
pub mod labels;
pub mod metrics;
pub mod reconcilers;
pub mod store;
