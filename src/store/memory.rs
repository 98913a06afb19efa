// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory [`ResourceStore`] for unit tests.
//!
//! Objects are kept in ordered maps, every successful write is recorded in
//! order, and replaces enforce `resourceVersion` the way the API server does.
//! Failures can be injected per operation to exercise error paths.

use super::ResourceStore;
use crate::crd::{GlobalDNS, ProjectRoleTemplateBinding, RoleTemplate};
use crate::errors::StoreError;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A write that reached the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum WriteOp {
    CreateIngress(String),
    ReplaceIngressStatus(String),
    CreateRole(String),
    ReplaceRole(String),
    CreateRoleBinding(String),
    ReplaceRoleBinding(String),
    ReplaceGlobalDNS(String),
}

/// Store operations that failures can be injected into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Op {
    GetIngress,
    CreateIngress,
    ReplaceIngressStatus,
    ListProjectRoleBindings,
    GetRoleTemplate,
    CreateRole,
    CreateRoleBinding,
    ReplaceGlobalDNS,
}

type Key = (String, String);

#[derive(Default)]
struct State {
    ingresses: BTreeMap<Key, Ingress>,
    roles: BTreeMap<Key, Role>,
    role_bindings: BTreeMap<Key, RoleBinding>,
    project_role_bindings: BTreeMap<String, Vec<ProjectRoleTemplateBinding>>,
    role_templates: BTreeMap<String, RoleTemplate>,
    globaldnses: BTreeMap<String, GlobalDNS>,
    failures: BTreeMap<Op, StoreError>,
    writes: Vec<WriteOp>,
    version: u64,
}

impl State {
    fn next_version(&mut self) -> String {
        self.version += 1;
        self.version.to_string()
    }

    fn take_failure(&mut self, op: Op) -> Result<(), StoreError> {
        match self.failures.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    state: Mutex<State>,
}

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

fn not_found(kind: &str, name: &str) -> StoreError {
    StoreError::NotFound {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}

fn already_exists(kind: &str, name: &str) -> StoreError {
    StoreError::AlreadyExists {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}

/// Reject a replace whose `resourceVersion` is set and no longer current.
fn check_version(
    kind: &str,
    name: &str,
    stored: Option<String>,
    incoming: Option<String>,
) -> Result<(), StoreError> {
    match (stored, incoming) {
        (None, _) => Err(not_found(kind, name)),
        (Some(stored), Some(incoming)) if stored != incoming => Err(StoreError::Conflict {
            kind: kind.to_string(),
            name: name.to_string(),
            message: format!("resource version {incoming} is stale, current is {stored}"),
        }),
        _ => Ok(()),
    }
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Seed an `Ingress`, assigning it a resource version.
    pub(crate) fn insert_ingress(&self, namespace: &str, mut ingress: Ingress) -> Ingress {
        let mut state = self.lock();
        ingress.metadata.namespace = Some(namespace.to_string());
        ingress.metadata.resource_version = Some(state.next_version());
        state
            .ingresses
            .insert(key(namespace, &ingress.name_any()), ingress.clone());
        ingress
    }

    /// Seed a `ProjectRoleTemplateBinding` into a project namespace.
    pub(crate) fn insert_project_role_binding(
        &self,
        namespace: &str,
        mut binding: ProjectRoleTemplateBinding,
    ) {
        binding.metadata.namespace = Some(namespace.to_string());
        self.lock()
            .project_role_bindings
            .entry(namespace.to_string())
            .or_default()
            .push(binding);
    }

    /// Seed a `RoleTemplate`.
    pub(crate) fn insert_role_template(&self, template: RoleTemplate) {
        self.lock()
            .role_templates
            .insert(template.name_any(), template);
    }

    /// Seed a `GlobalDNS`, returning the stored copy with its resource version.
    pub(crate) fn insert_globaldns(&self, mut globaldns: GlobalDNS) -> GlobalDNS {
        let mut state = self.lock();
        globaldns.metadata.resource_version = Some(state.next_version());
        state
            .globaldnses
            .insert(globaldns.name_any(), globaldns.clone());
        globaldns
    }

    /// Make the next call of `op` fail with `err`.
    pub(crate) fn fail_next(&self, op: Op, err: StoreError) {
        self.lock().failures.insert(op, err);
    }

    pub(crate) fn writes(&self) -> Vec<WriteOp> {
        self.lock().writes.clone()
    }

    pub(crate) fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    pub(crate) fn ingress(&self, namespace: &str, name: &str) -> Option<Ingress> {
        self.lock().ingresses.get(&key(namespace, name)).cloned()
    }

    pub(crate) fn role(&self, namespace: &str, name: &str) -> Option<Role> {
        self.lock().roles.get(&key(namespace, name)).cloned()
    }

    pub(crate) fn role_binding(&self, namespace: &str, name: &str) -> Option<RoleBinding> {
        self.lock().role_bindings.get(&key(namespace, name)).cloned()
    }

    pub(crate) fn globaldns(&self, name: &str) -> Option<GlobalDNS> {
        self.lock().globaldnses.get(name).cloned()
    }
}

#[async_trait::async_trait]
impl ResourceStore for MemoryStore {
    async fn get_ingress(&self, namespace: &str, name: &str) -> Result<Ingress, StoreError> {
        let mut state = self.lock();
        state.take_failure(Op::GetIngress)?;
        state
            .ingresses
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("Ingress", name))
    }

    async fn create_ingress(
        &self,
        namespace: &str,
        ingress: &Ingress,
    ) -> Result<Ingress, StoreError> {
        let mut state = self.lock();
        state.take_failure(Op::CreateIngress)?;
        let name = ingress.name_any();
        if state.ingresses.contains_key(&key(namespace, &name)) {
            return Err(already_exists("Ingress", &name));
        }
        let mut stored = ingress.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        stored.metadata.resource_version = Some(state.next_version());
        state
            .ingresses
            .insert(key(namespace, &name), stored.clone());
        state.writes.push(WriteOp::CreateIngress(name));
        Ok(stored)
    }

    async fn replace_ingress_status(
        &self,
        namespace: &str,
        ingress: &Ingress,
    ) -> Result<Ingress, StoreError> {
        let mut state = self.lock();
        state.take_failure(Op::ReplaceIngressStatus)?;
        let name = ingress.name_any();
        let stored_version = state
            .ingresses
            .get(&key(namespace, &name))
            .and_then(|stored| stored.metadata.resource_version.clone());
        check_version(
            "Ingress",
            &name,
            stored_version,
            ingress.metadata.resource_version.clone(),
        )?;
        let version = state.next_version();
        let stored = state
            .ingresses
            .get_mut(&key(namespace, &name))
            .ok_or_else(|| not_found("Ingress", &name))?;
        stored.status = ingress.status.clone();
        stored.metadata.resource_version = Some(version);
        let stored = stored.clone();
        state.writes.push(WriteOp::ReplaceIngressStatus(name));
        Ok(stored)
    }

    async fn list_project_role_bindings(
        &self,
        namespace: &str,
    ) -> Result<Vec<ProjectRoleTemplateBinding>, StoreError> {
        let mut state = self.lock();
        state.take_failure(Op::ListProjectRoleBindings)?;
        Ok(state
            .project_role_bindings
            .get(namespace)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_role_template(&self, name: &str) -> Result<RoleTemplate, StoreError> {
        let mut state = self.lock();
        state.take_failure(Op::GetRoleTemplate)?;
        state
            .role_templates
            .get(name)
            .cloned()
            .ok_or_else(|| not_found("RoleTemplate", name))
    }

    async fn get_role(&self, namespace: &str, name: &str) -> Result<Role, StoreError> {
        self.lock()
            .roles
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("Role", name))
    }

    async fn create_role(&self, namespace: &str, role: &Role) -> Result<Role, StoreError> {
        let mut state = self.lock();
        state.take_failure(Op::CreateRole)?;
        let name = role.name_any();
        if state.roles.contains_key(&key(namespace, &name)) {
            return Err(already_exists("Role", &name));
        }
        let mut stored = role.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        stored.metadata.resource_version = Some(state.next_version());
        state.roles.insert(key(namespace, &name), stored.clone());
        state.writes.push(WriteOp::CreateRole(name));
        Ok(stored)
    }

    async fn replace_role(&self, namespace: &str, role: &Role) -> Result<Role, StoreError> {
        let mut state = self.lock();
        let name = role.name_any();
        let stored_version = state
            .roles
            .get(&key(namespace, &name))
            .and_then(|stored| stored.metadata.resource_version.clone());
        check_version(
            "Role",
            &name,
            stored_version,
            role.metadata.resource_version.clone(),
        )?;
        let mut stored = role.clone();
        stored.metadata.resource_version = Some(state.next_version());
        state.roles.insert(key(namespace, &name), stored.clone());
        state.writes.push(WriteOp::ReplaceRole(name));
        Ok(stored)
    }

    async fn get_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<RoleBinding, StoreError> {
        self.lock()
            .role_bindings
            .get(&key(namespace, name))
            .cloned()
            .ok_or_else(|| not_found("RoleBinding", name))
    }

    async fn create_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<RoleBinding, StoreError> {
        let mut state = self.lock();
        state.take_failure(Op::CreateRoleBinding)?;
        let name = binding.name_any();
        if state.role_bindings.contains_key(&key(namespace, &name)) {
            return Err(already_exists("RoleBinding", &name));
        }
        let mut stored = binding.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        stored.metadata.resource_version = Some(state.next_version());
        state
            .role_bindings
            .insert(key(namespace, &name), stored.clone());
        state.writes.push(WriteOp::CreateRoleBinding(name));
        Ok(stored)
    }

    async fn replace_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<RoleBinding, StoreError> {
        let mut state = self.lock();
        let name = binding.name_any();
        let stored_version = state
            .role_bindings
            .get(&key(namespace, &name))
            .and_then(|stored| stored.metadata.resource_version.clone());
        check_version(
            "RoleBinding",
            &name,
            stored_version,
            binding.metadata.resource_version.clone(),
        )?;
        let mut stored = binding.clone();
        stored.metadata.resource_version = Some(state.next_version());
        state
            .role_bindings
            .insert(key(namespace, &name), stored.clone());
        state.writes.push(WriteOp::ReplaceRoleBinding(name));
        Ok(stored)
    }

    async fn replace_globaldns(&self, globaldns: &GlobalDNS) -> Result<GlobalDNS, StoreError> {
        let mut state = self.lock();
        state.take_failure(Op::ReplaceGlobalDNS)?;
        let name = globaldns.name_any();
        let stored_version = state
            .globaldnses
            .get(&name)
            .and_then(|stored| stored.metadata.resource_version.clone());
        check_version(
            "GlobalDNS",
            &name,
            stored_version,
            globaldns.metadata.resource_version.clone(),
        )?;
        let mut stored = globaldns.clone();
        stored.metadata.resource_version = Some(state.next_version());
        state.globaldnses.insert(name.clone(), stored.clone());
        state.writes.push(WriteOp::ReplaceGlobalDNS(name));
        Ok(stored)
    }
}
