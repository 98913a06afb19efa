// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) consumed by the GlobalDNS controller.
//!
//! # Resource Types
//!
//! - [`GlobalDNS`] - User-declared DNS intent: an FQDN, the endpoints it should
//!   resolve to, and the members allowed to manage it. Owned by this controller.
//! - [`ProjectRoleTemplateBinding`] - Grants a user or group a role template in a
//!   project. Read-only input for membership derivation and authorization checks.
//! - [`RoleTemplate`] - Named bundle of policy rules, possibly inheriting other
//!   templates. Read-only input for authorization checks.
//!
//! The two binding types are owned by the management plane and carry their fields
//! at the top level of the object instead of under `spec`, so they implement
//! [`kube::Resource`] by hand rather than through the `CustomResource` derive.
//!
//! # Example: Declaring a GlobalDNS
//!
//! ```rust,no_run
//! use globaldns::crd::{GlobalDNSSpec, Member};
//!
//! let spec = GlobalDNSSpec {
//!     fqdn: "app.example.com".to_string(),
//!     ttl: Some(300),
//!     members: vec![Member {
//!         group_principal_name: "github_team://1234".to_string(),
//!         access_type: "owner".to_string(),
//!         ..Default::default()
//!     }],
//!     project_names: vec!["c-abcde:p-xyz12".to_string()],
//!     provider_name: Some("route53".to_string()),
//!     multi_cluster_app_name: None,
//! };
//! ```

use crate::constants::{
    ACCESS_TYPE_OWNER, API_GROUP, API_GROUP_VERSION, API_VERSION,
    KIND_PROJECT_ROLE_TEMPLATE_BINDING, KIND_ROLE_TEMPLATE,
};
use k8s_openapi::api::rbac::v1::PolicyRule;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::{ClusterResourceScope, NamespaceResourceScope};
use kube::{CustomResource, Resource};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A principal granted access to a `GlobalDNS`.
///
/// Exactly one of `user_name`, `user_principal_name` or `group_principal_name` is
/// expected to identify the subject. Empty strings are treated as unset and are
/// omitted on the wire.
#[derive(
    Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Local user id (e.g. `u-abc12`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,

    /// Principal id of a user from an auth provider (e.g. `github_user://42`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_principal_name: String,

    /// Human readable name, informational only
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    /// Principal id of a group from an auth provider (e.g. `github_team://1234`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_principal_name: String,

    /// One of `owner`, `member` or `read-only`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub access_type: String,
}

/// Identity a [`Member`] resolves to when it is turned into an RBAC subject.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MemberSubject {
    /// A user, identified by user name or user principal
    User(String),
    /// A group, identified by group principal
    Group(String),
}

impl Member {
    /// The subject this member grants access to, or `None` if no identity is set.
    ///
    /// A local user name takes precedence over a user principal, and any user
    /// identity takes precedence over a group principal.
    #[must_use]
    pub fn subject(&self) -> Option<MemberSubject> {
        if !self.user_name.is_empty() {
            Some(MemberSubject::User(self.user_name.clone()))
        } else if !self.user_principal_name.is_empty() {
            Some(MemberSubject::User(self.user_principal_name.clone()))
        } else if !self.group_principal_name.is_empty() {
            Some(MemberSubject::Group(self.group_principal_name.clone()))
        } else {
            None
        }
    }

    /// Whether this member should be bound to the owner role.
    #[must_use]
    pub fn is_owner(&self) -> bool {
        self.access_type == ACCESS_TYPE_OWNER
    }
}

/// `GlobalDNS` status.
///
/// The endpoint list is written by the component that tracks where the target
/// workloads are exposed; this controller only reads it.
#[derive(Clone, Debug, Serialize, Deserialize, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalDNSStatus {
    /// IP addresses or hostnames the FQDN should resolve to
    #[serde(default)]
    pub endpoints: Vec<String>,
}

/// `GlobalDNS` declares an FQDN and the endpoints it should be published with.
///
/// The controller mirrors the endpoints onto the load-balancer status of a
/// placeholder `Ingress`, which an external-dns deployment turns into provider
/// records, and keeps `spec.members` in sync with project role bindings.
///
/// # Example
///
/// ```yaml
/// apiVersion: management.cattle.io/v3
/// kind: GlobalDNS
/// metadata:
///   name: app
///   annotations:
///     field.cattle.io/creatorId: u-abc12
/// spec:
///   fqdn: app.example.com
///   projectNames:
///     - c-abcde:p-xyz12
///   members:
///     - groupPrincipalName: github_team://1234
///       accessType: owner
/// status:
///   endpoints:
///     - 203.0.113.10
///     - lb.example.net
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, Default, JsonSchema)]
#[kube(
    group = "management.cattle.io",
    version = "v3",
    kind = "GlobalDNS",
    plural = "globaldnses",
    shortname = "gdns",
    doc = "GlobalDNS declares a fully-qualified domain name and the endpoints it should be published with. Endpoints are mirrored onto a placeholder Ingress for external-dns to pick up."
)]
#[kube(status = "GlobalDNSStatus")]
#[serde(rename_all = "camelCase")]
pub struct GlobalDNSSpec {
    /// Fully-qualified domain name to publish (e.g. `app.example.com`)
    #[schemars(regex(
        pattern = r"^([a-zA-Z0-9*]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)*[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?$"
    ))]
    pub fqdn: String,

    /// Record TTL in seconds, passed through to the DNS provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(range(min = 0, max = 2_147_483_647))]
    pub ttl: Option<i64>,

    /// Principals allowed to manage this `GlobalDNS`
    #[serde(default)]
    pub members: Vec<Member>,

    /// Projects whose workloads back this FQDN, as `<cluster-id>:<project-id>`
    #[serde(default)]
    pub project_names: Vec<String>,

    /// Name of the DNS provider configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    /// Multi-cluster app whose endpoints back this FQDN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_cluster_app_name: Option<String>,
}

impl GlobalDNS {
    /// Endpoints currently declared for this FQDN, empty when status is unset.
    #[must_use]
    pub fn declared_endpoints(&self) -> &[String] {
        self.status
            .as_ref()
            .map_or(&[][..], |status| status.endpoints.as_slice())
    }
}

/// Namespace of a project reference of the form `<cluster-id>:<project-id>`.
///
/// A project's bindings live in a namespace named after the project id. A bare
/// project id (no cluster prefix) is accepted as-is. Returns `None` for empty ids.
#[must_use]
pub fn project_namespace(project_name: &str) -> Option<&str> {
    let namespace = project_name
        .split_once(':')
        .map_or(project_name, |(_, project)| project);
    (!namespace.is_empty()).then_some(namespace)
}

/// Grants a user or group a role template within a project.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRoleTemplateBinding {
    #[serde(default)]
    pub metadata: ObjectMeta,

    /// Project the binding applies to, as `<cluster-id>:<project-id>`
    #[serde(default)]
    pub project_name: String,

    /// Name of the bound `RoleTemplate`
    #[serde(default)]
    pub role_template_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user_principal_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub group_principal_name: String,
}

impl ProjectRoleTemplateBinding {
    /// A binding that is being deleted no longer grants anything.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.metadata.deletion_timestamp.is_none()
    }
}

impl Resource for ProjectRoleTemplateBinding {
    type DynamicType = ();
    type Scope = NamespaceResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(KIND_PROJECT_ROLE_TEMPLATE_BINDING)
    }

    fn group(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(API_GROUP)
    }

    fn version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(API_VERSION)
    }

    fn api_version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(API_GROUP_VERSION)
    }

    fn plural(_: &()) -> Cow<'_, str> {
        Cow::Borrowed("projectroletemplatebindings")
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

/// A named set of policy rules that may inherit other templates.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoleTemplate {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    /// `project` or `cluster`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,

    #[serde(default)]
    pub rules: Vec<PolicyRule>,

    /// Templates whose rules this template inherits
    #[serde(default)]
    pub role_template_names: Vec<String>,

    #[serde(default)]
    pub builtin: bool,
}

impl Resource for RoleTemplate {
    type DynamicType = ();
    type Scope = ClusterResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(KIND_ROLE_TEMPLATE)
    }

    fn group(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(API_GROUP)
    }

    fn version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(API_VERSION)
    }

    fn api_version(_: &()) -> Cow<'_, str> {
        Cow::Borrowed(API_GROUP_VERSION)
    }

    fn plural(_: &()) -> Cow<'_, str> {
        Cow::Borrowed("roletemplates")
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}
