// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource-store primitives used by the reconcilers.
//!
//! The reconcilers never talk to [`kube::Api`] directly. Every read and write goes
//! through [`ResourceStore`], which keeps each operation a single request/response
//! call and classifies failures into [`StoreError`]. The production
//! implementation is [`KubeStore`]; unit tests use an in-memory store that records
//! every write.
//!
//! All writes carry the `resourceVersion` of the object they were derived from, so
//! a concurrent writer surfaces as [`StoreError::Conflict`] instead of a lost update.

pub mod kube_store;

#[cfg(test)]
pub(crate) mod memory;

pub use kube_store::KubeStore;

use crate::crd::{GlobalDNS, ProjectRoleTemplateBinding, RoleTemplate};
use crate::errors::StoreError;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};

/// Request/response access to the objects the `GlobalDNS` controller reads and writes.
#[async_trait::async_trait]
pub trait ResourceStore: Send + Sync {
    /// Get an `Ingress` by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if it does not exist.
    async fn get_ingress(&self, namespace: &str, name: &str) -> Result<Ingress, StoreError>;

    /// Create an `Ingress` and return the stored object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] on a name collision.
    async fn create_ingress(&self, namespace: &str, ingress: &Ingress)
        -> Result<Ingress, StoreError>;

    /// Replace the status of an `Ingress`, guarded by its `resourceVersion`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the stored version moved.
    async fn replace_ingress_status(
        &self,
        namespace: &str,
        ingress: &Ingress,
    ) -> Result<Ingress, StoreError>;

    /// List the `ProjectRoleTemplateBinding`s of a project namespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the list request fails.
    async fn list_project_role_bindings(
        &self,
        namespace: &str,
    ) -> Result<Vec<ProjectRoleTemplateBinding>, StoreError>;

    /// Get a `RoleTemplate` by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if it does not exist.
    async fn get_role_template(&self, name: &str) -> Result<RoleTemplate, StoreError>;

    /// Get a `Role` by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if it does not exist.
    async fn get_role(&self, namespace: &str, name: &str) -> Result<Role, StoreError>;

    /// Create a `Role`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] on a name collision.
    async fn create_role(&self, namespace: &str, role: &Role) -> Result<Role, StoreError>;

    /// Replace a `Role`, guarded by its `resourceVersion`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the stored version moved.
    async fn replace_role(&self, namespace: &str, role: &Role) -> Result<Role, StoreError>;

    /// Get a `RoleBinding` by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if it does not exist.
    async fn get_role_binding(&self, namespace: &str, name: &str)
        -> Result<RoleBinding, StoreError>;

    /// Create a `RoleBinding`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyExists`] on a name collision.
    async fn create_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<RoleBinding, StoreError>;

    /// Replace a `RoleBinding`, guarded by its `resourceVersion`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the stored version moved.
    async fn replace_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<RoleBinding, StoreError>;

    /// Replace a `GlobalDNS`, guarded by its `resourceVersion`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the stored version moved.
    async fn replace_globaldns(&self, globaldns: &GlobalDNS) -> Result<GlobalDNS, StoreError>;
}
