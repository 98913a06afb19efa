// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! [`ResourceStore`] backed by the Kubernetes API server.

use super::ResourceStore;
use crate::constants::CONTROLLER_NAME;
use crate::crd::{GlobalDNS, ProjectRoleTemplateBinding, RoleTemplate};
use crate::errors::StoreError;
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::rbac::v1::{Role, RoleBinding};
use kube::api::{ListParams, Patch, PatchParams, PostParams};
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::debug;

/// Resource store issuing one API request per primitive.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn post_params() -> PostParams {
        PostParams {
            field_manager: Some(CONTROLLER_NAME.to_string()),
            ..PostParams::default()
        }
    }
}

fn store_error<K: Resource<DynamicType = ()>>(err: kube::Error, name: &str) -> StoreError {
    StoreError::from_kube(err, &K::kind(&()), name)
}

#[async_trait::async_trait]
impl ResourceStore for KubeStore {
    async fn get_ingress(&self, namespace: &str, name: &str) -> Result<Ingress, StoreError> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| store_error::<Ingress>(e, name))
    }

    async fn create_ingress(
        &self,
        namespace: &str,
        ingress: &Ingress,
    ) -> Result<Ingress, StoreError> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        api.create(&Self::post_params(), ingress)
            .await
            .map_err(|e| store_error::<Ingress>(e, &ingress.name_any()))
    }

    async fn replace_ingress_status(
        &self,
        namespace: &str,
        ingress: &Ingress,
    ) -> Result<Ingress, StoreError> {
        let name = ingress.name_any();
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);

        // A merge patch replaces lists wholesale; the resourceVersion makes the
        // API server reject the write if the Ingress moved since it was read.
        let patch = json!({
            "metadata": {
                "resourceVersion": ingress.resource_version(),
            },
            "status": ingress.status,
        });

        debug!(namespace = %namespace, name = %name, "Replacing Ingress status");

        api.patch_status(
            &name,
            &PatchParams::default(),
            &Patch::Merge(&patch),
        )
        .await
        .map_err(|e| store_error::<Ingress>(e, &name))
    }

    async fn list_project_role_bindings(
        &self,
        namespace: &str,
    ) -> Result<Vec<ProjectRoleTemplateBinding>, StoreError> {
        let api: Api<ProjectRoleTemplateBinding> =
            Api::namespaced(self.client.clone(), namespace);
        api.list(&ListParams::default())
            .await
            .map(|list| list.items)
            .map_err(|e| store_error::<ProjectRoleTemplateBinding>(e, namespace))
    }

    async fn get_role_template(&self, name: &str) -> Result<RoleTemplate, StoreError> {
        let api: Api<RoleTemplate> = Api::all(self.client.clone());
        api.get(name)
            .await
            .map_err(|e| store_error::<RoleTemplate>(e, name))
    }

    async fn get_role(&self, namespace: &str, name: &str) -> Result<Role, StoreError> {
        let api: Api<Role> = Api::namespaced(self.client.clone(), namespace);
        api.get(name).await.map_err(|e| store_error::<Role>(e, name))
    }

    async fn create_role(&self, namespace: &str, role: &Role) -> Result<Role, StoreError> {
        let api: Api<Role> = Api::namespaced(self.client.clone(), namespace);
        api.create(&Self::post_params(), role)
            .await
            .map_err(|e| store_error::<Role>(e, &role.name_any()))
    }

    async fn replace_role(&self, namespace: &str, role: &Role) -> Result<Role, StoreError> {
        let name = role.name_any();
        let api: Api<Role> = Api::namespaced(self.client.clone(), namespace);
        api.replace(&name, &Self::post_params(), role)
            .await
            .map_err(|e| store_error::<Role>(e, &name))
    }

    async fn get_role_binding(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<RoleBinding, StoreError> {
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| store_error::<RoleBinding>(e, name))
    }

    async fn create_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<RoleBinding, StoreError> {
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), namespace);
        api.create(&Self::post_params(), binding)
            .await
            .map_err(|e| store_error::<RoleBinding>(e, &binding.name_any()))
    }

    async fn replace_role_binding(
        &self,
        namespace: &str,
        binding: &RoleBinding,
    ) -> Result<RoleBinding, StoreError> {
        let name = binding.name_any();
        let api: Api<RoleBinding> = Api::namespaced(self.client.clone(), namespace);
        api.replace(&name, &Self::post_params(), binding)
            .await
            .map_err(|e| store_error::<RoleBinding>(e, &name))
    }

    async fn replace_globaldns(&self, globaldns: &GlobalDNS) -> Result<GlobalDNS, StoreError> {
        let name = globaldns.name_any();
        let api: Api<GlobalDNS> = Api::all(self.client.clone());
        api.replace(&name, &Self::post_params(), globaldns)
            .await
            .map_err(|e| store_error::<GlobalDNS>(e, &name))
    }
}
