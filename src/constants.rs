// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the GlobalDNS controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for the management CRDs
pub const API_GROUP: &str = "management.cattle.io";

/// API version for the management CRDs
pub const API_VERSION: &str = "v3";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "management.cattle.io/v3";

/// Kind name for `ProjectRoleTemplateBinding` resource
pub const KIND_PROJECT_ROLE_TEMPLATE_BINDING: &str = "ProjectRoleTemplateBinding";

/// Kind name for `RoleTemplate` resource
pub const KIND_ROLE_TEMPLATE: &str = "RoleTemplate";

/// Plural resource name of `GlobalDNS`, used in RBAC rules
pub const GLOBAL_DNS_RESOURCE: &str = "globaldnses";

/// RBAC API group
pub const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

// ============================================================================
// Ingress Projection Constants
// ============================================================================

/// Prefix of the derived `Ingress` name; the `GlobalDNS` name is appended
pub const INGRESS_NAME_PREFIX: &str = "globaldns-ingress";

/// Ingress class that external-dns watches for global DNS entries
pub const INGRESS_CLASS_EXTERNAL_DNS: &str = "rancher-external-dns";

/// Backend service of the placeholder routing rule. Nothing serves it.
pub const PLACEHOLDER_SERVICE_NAME: &str = "http-svc-dummy";

/// Port of the placeholder backend service
pub const PLACEHOLDER_SERVICE_PORT: i32 = 42;

/// Path type of the placeholder routing rule
pub const PLACEHOLDER_PATH_TYPE: &str = "ImplementationSpecific";

/// Default namespace holding derived `Ingress`es and RBAC objects
pub const DEFAULT_GLOBAL_NAMESPACE: &str = "cattle-global-data";

// ============================================================================
// Membership Constants
// ============================================================================

/// Access type granting full control of a `GlobalDNS`
pub const ACCESS_TYPE_OWNER: &str = "owner";

/// Access type granted to project members
pub const ACCESS_TYPE_MEMBER: &str = "member";

/// Project role template whose holders become `owner` members
pub const ROLE_TEMPLATE_PROJECT_OWNER: &str = "project-owner";

/// Project role template whose holders become `member` members
pub const ROLE_TEMPLATE_PROJECT_MEMBER: &str = "project-member";

/// Verb a group must hold on `globaldnses` in every referenced project
pub const MINIMUM_PROJECT_VERB: &str = "create";

/// Suffix of the owner `Role` and `RoleBinding` names
pub const ROLE_SUFFIX_OWNER: &str = "globaldns-owner";

/// Suffix of the read-only `Role` and `RoleBinding` names
pub const ROLE_SUFFIX_READ_ONLY: &str = "globaldns-readonly";

/// Verbs granted by the read-only `Role`
pub const READ_ONLY_VERBS: [&str; 3] = ["get", "list", "watch"];

// ============================================================================
// Controller Constants
// ============================================================================

/// Field manager / controller name reported to the API server
pub const CONTROLLER_NAME: &str = "mgmt-global-dns-controller";

/// Requeue duration after a successful reconciliation (5 minutes)
pub const DEFAULT_REQUEUE_DURATION_SECS: u64 = 300;

/// Requeue duration for retryable controller errors (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration for errors that need an external fix (5 minutes)
pub const FATAL_ERROR_REQUEUE_DURATION_SECS: u64 = 300;

/// Default number of `GlobalDNS` objects reconciled in parallel
pub const DEFAULT_RECONCILE_CONCURRENCY: u16 = 4;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0:8080";
