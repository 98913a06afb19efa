// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the GlobalDNS controller.
//!
//! - [`StoreError`] - failures of a single resource-store primitive, already
//!   classified into the outcomes the reconciler cares about
//! - [`SyncError`] - failures of a reconciliation pass, classified by the step
//!   that failed and whether a retry can help
//!
//! The split between retryable and fatal errors drives the controller's error
//! policy: transient store failures requeue quickly, while missing metadata and
//! denied authorization wait for someone to fix the object or the RBAC state.

use thiserror::Error;

/// Errors returned by [`crate::store::ResourceStore`] primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The requested object does not exist (HTTP 404)
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// Kind of the missing object
        kind: String,
        /// Name of the missing object
        name: String,
    },

    /// An object with the same name already exists (HTTP 409, reason `AlreadyExists`)
    #[error("{kind} '{name}' already exists")]
    AlreadyExists {
        /// Kind of the existing object
        kind: String,
        /// Name of the existing object
        name: String,
    },

    /// The stored resource version moved since the object was read (HTTP 409)
    #[error("conflict writing {kind} '{name}': {message}")]
    Conflict {
        /// Kind of the object being written
        kind: String,
        /// Name of the object being written
        name: String,
        /// Message returned by the API server
        message: String,
    },

    /// The controller's service account may not perform the operation (HTTP 403)
    #[error("forbidden: {message}")]
    Forbidden {
        /// Message returned by the API server
        message: String,
    },

    /// Any other API or transport failure
    #[error("resource store request failed: {0}")]
    Transport(String),
}

impl StoreError {
    /// Whether this error means the object does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Whether this error means a create hit an existing object.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }

    /// Whether this error is an optimistic-concurrency conflict.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }

    /// Classify a kube API error for an operation on `kind`/`name`.
    #[must_use]
    pub fn from_kube(err: kube::Error, kind: &str, name: &str) -> Self {
        match err {
            kube::Error::Api(response) => match response.code {
                404 => StoreError::NotFound {
                    kind: kind.to_string(),
                    name: name.to_string(),
                },
                409 if response.reason == "AlreadyExists" => StoreError::AlreadyExists {
                    kind: kind.to_string(),
                    name: name.to_string(),
                },
                409 => StoreError::Conflict {
                    kind: kind.to_string(),
                    name: name.to_string(),
                    message: response.message,
                },
                403 => StoreError::Forbidden {
                    message: response.message,
                },
                _ => StoreError::Transport(format!(
                    "{} ({}): {}",
                    response.reason, response.code, response.message
                )),
            },
            other => StoreError::Transport(other.to_string()),
        }
    }
}

/// Errors that abort a `GlobalDNS` reconciliation pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The `GlobalDNS` lacks metadata a pass cannot proceed without, such as
    /// the creator identity annotation
    #[error("GlobalDNS {name} is missing {field}")]
    MissingMetadata {
        /// Name of the `GlobalDNS`
        name: String,
        /// Description of the missing field
        field: String,
    },

    /// Looking up the derived `Ingress` failed for a reason other than not-found
    #[error("error looking up ingress for GlobalDNS {name}: {source}")]
    Lookup {
        /// Name of the `GlobalDNS`
        name: String,
        #[source]
        source: StoreError,
    },

    /// Creating the derived `Ingress` failed
    #[error("error creating ingress for GlobalDNS {name}: {source}")]
    Creation {
        /// Name of the `GlobalDNS`
        name: String,
        #[source]
        source: StoreError,
    },

    /// Rewriting the published endpoint status failed
    #[error("error updating ingress status for GlobalDNS {name}: {source}")]
    StatusUpdate {
        /// Name of the `GlobalDNS`
        name: String,
        #[source]
        source: StoreError,
    },

    /// An explicit member group lacks the required access in a referenced project
    #[error("group {group} does not have access to project {project}")]
    AuthorizationDenied {
        /// Group principal lacking access
        group: String,
        /// Referenced project
        project: String,
    },

    /// A write lost an optimistic-concurrency race
    #[error("conflict while syncing GlobalDNS {name}: {source}")]
    StoreConflict {
        /// Name of the `GlobalDNS`
        name: String,
        #[source]
        source: StoreError,
    },

    /// Any other store failure while syncing access or membership
    #[error("error syncing access for GlobalDNS {name}: {source}")]
    Store {
        /// Name of the `GlobalDNS`
        name: String,
        #[source]
        source: StoreError,
    },
}

impl SyncError {
    /// Wrap a store failure from the access stage, keeping conflicts distinct.
    #[must_use]
    pub fn from_store(name: &str, source: StoreError) -> Self {
        if source.is_conflict() {
            SyncError::StoreConflict {
                name: name.to_string(),
                source,
            }
        } else {
            SyncError::Store {
                name: name.to_string(),
                source,
            }
        }
    }

    /// Whether requeueing without any external change can make progress.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            SyncError::MissingMetadata { .. } | SyncError::AuthorizationDenied { .. }
        )
    }

    /// Short CamelCase reason, used as a metrics label.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            SyncError::MissingMetadata { .. } => "MissingMetadata",
            SyncError::Lookup { .. } => "LookupFailure",
            SyncError::Creation { .. } => "CreationFailure",
            SyncError::StatusUpdate { .. } => "StatusUpdateFailure",
            SyncError::AuthorizationDenied { .. } => "AuthorizationDenied",
            SyncError::StoreConflict { .. } => "StoreConflict",
            SyncError::Store { .. } => "StoreFailure",
        }
    }
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
