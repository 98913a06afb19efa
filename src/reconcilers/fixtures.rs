// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Object builders shared by the reconciler unit tests.

use crate::config::ControllerConfig;
use crate::constants::ROLE_TEMPLATE_PROJECT_OWNER;
use crate::context::Context;
use crate::crd::{GlobalDNS, GlobalDNSSpec, GlobalDNSStatus, Member, ProjectRoleTemplateBinding};
use crate::labels::CREATOR_ID_ANNOTATION;
use crate::store::memory::MemoryStore;
use k8s_openapi::api::networking::v1::{
    Ingress, IngressLoadBalancerIngress, IngressLoadBalancerStatus, IngressStatus,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use std::collections::BTreeMap;
use std::sync::Arc;

pub(crate) const NAMESPACE: &str = "cattle-global-data";
pub(crate) const CREATOR: &str = "u-creator";
pub(crate) const PROJECT: &str = "c-abc:p-xyz";
pub(crate) const PROJECT_NAMESPACE: &str = "p-xyz";

/// A `GlobalDNS` with a UID, a creator annotation and the given endpoints.
pub(crate) fn globaldns(name: &str, fqdn: &str, endpoints: &[&str]) -> GlobalDNS {
    let mut globaldns = GlobalDNS::new(
        name,
        GlobalDNSSpec {
            fqdn: fqdn.to_string(),
            ..Default::default()
        },
    );
    globaldns.metadata.uid = Some(format!("uid-{name}"));
    globaldns.metadata.annotations = Some(BTreeMap::from([(
        CREATOR_ID_ANNOTATION.to_string(),
        CREATOR.to_string(),
    )]));
    globaldns.status = Some(GlobalDNSStatus {
        endpoints: endpoints.iter().map(ToString::to_string).collect(),
    });
    globaldns
}

pub(crate) fn user_member(user: &str, access_type: &str) -> Member {
    Member {
        user_name: user.to_string(),
        access_type: access_type.to_string(),
        ..Default::default()
    }
}

pub(crate) fn group_member(group: &str, access_type: &str) -> Member {
    Member {
        group_principal_name: group.to_string(),
        access_type: access_type.to_string(),
        ..Default::default()
    }
}

pub(crate) fn user_binding(name: &str, user: &str, role_template: &str) -> ProjectRoleTemplateBinding {
    ProjectRoleTemplateBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        project_name: PROJECT.to_string(),
        role_template_name: role_template.to_string(),
        user_name: user.to_string(),
        ..Default::default()
    }
}

pub(crate) fn group_binding(
    name: &str,
    group: &str,
    role_template: &str,
) -> ProjectRoleTemplateBinding {
    ProjectRoleTemplateBinding {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        project_name: PROJECT.to_string(),
        role_template_name: role_template.to_string(),
        group_principal_name: group.to_string(),
        ..Default::default()
    }
}

/// Grant `group` project ownership in the test project.
pub(crate) fn grant_group(store: &MemoryStore, group: &str) {
    store.insert_project_role_binding(
        PROJECT_NAMESPACE,
        group_binding(&format!("prtb-{group}"), group, ROLE_TEMPLATE_PROJECT_OWNER),
    );
}

/// An `Ingress` named `name` with an owner reference of the given uid and kind.
pub(crate) fn owned_ingress(name: &str, owner_uid: &str, owner_kind: &str) -> Ingress {
    Ingress {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            owner_references: Some(vec![OwnerReference {
                api_version: "management.cattle.io/v3".to_string(),
                kind: owner_kind.to_string(),
                name: "owner".to_string(),
                uid: owner_uid.to_string(),
                controller: Some(true),
                ..Default::default()
            }]),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Set the published endpoints of an `Ingress`, as `(ip, hostname)` pairs.
pub(crate) fn with_published(mut ingress: Ingress, entries: &[(Option<&str>, Option<&str>)]) -> Ingress {
    ingress.status = Some(IngressStatus {
        load_balancer: Some(IngressLoadBalancerStatus {
            ingress: Some(
                entries
                    .iter()
                    .map(|(ip, hostname)| IngressLoadBalancerIngress {
                        ip: ip.map(ToString::to_string),
                        hostname: hostname.map(ToString::to_string),
                        ..Default::default()
                    })
                    .collect(),
            ),
        }),
    });
    ingress
}

pub(crate) fn context(store: Arc<MemoryStore>) -> Arc<Context> {
    Arc::new(Context::new(store, ControllerConfig::default()))
}
