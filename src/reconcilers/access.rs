// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Membership and access control for `GlobalDNS` objects.
//!
//! A `GlobalDNS` lists explicit members and references projects. Each pass:
//!
//! 1. **Checks authorization** - every group named by an explicit member must
//!    hold at least [`MINIMUM_PROJECT_VERB`] on `globaldnses` in every referenced
//!    project, through a project role template binding.
//! 2. **Derives membership** - project owners and project members of the
//!    referenced projects become `owner` and `member` members, in addition to the
//!    explicit ones. Groups are only derived when they would pass the check in
//!    step 1. The result is recomputed from scratch every time.
//! 3. **Ensures RBAC objects** - an owner `Role` and a read-only `Role`, each with
//!    a `RoleBinding` whose subjects are the matching members. The creator is
//!    always bound as owner.
//! 4. **Persists membership** - `spec.members` is replaced when it differs from
//!    the derived set, ignoring order.

use super::projection::derived_labels;
use crate::constants::{
    ACCESS_TYPE_MEMBER, ACCESS_TYPE_OWNER, API_GROUP, GLOBAL_DNS_RESOURCE, MINIMUM_PROJECT_VERB,
    RBAC_API_GROUP, READ_ONLY_VERBS, ROLE_SUFFIX_OWNER, ROLE_SUFFIX_READ_ONLY,
    ROLE_TEMPLATE_PROJECT_MEMBER, ROLE_TEMPLATE_PROJECT_OWNER,
};
use crate::crd::{project_namespace, GlobalDNS, Member, MemberSubject, ProjectRoleTemplateBinding};
use crate::errors::{StoreError, SyncError};
use crate::labels::COMPONENT_ACCESS;
use crate::store::ResourceStore;
use k8s_openapi::api::rbac::v1::{PolicyRule, Role, RoleBinding, RoleRef, Subject};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::{Resource, ResourceExt};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, warn};

/// Active project role template bindings, keyed by referenced project name.
pub type ProjectBindings = BTreeMap<String, Vec<ProjectRoleTemplateBinding>>;

/// What the access stage wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccessSyncResult {
    /// Number of `Role`/`RoleBinding` objects created or replaced
    pub rbac_objects_written: usize,
    /// Whether `spec.members` was replaced
    pub members_updated: bool,
}

/// Group principals named by explicit members.
#[must_use]
pub fn member_groups(members: &[Member]) -> BTreeSet<String> {
    members
        .iter()
        .filter(|member| !member.group_principal_name.is_empty())
        .map(|member| member.group_principal_name.clone())
        .collect()
}

/// Load the active bindings of every referenced project.
///
/// A project name that does not name a project namespace is kept with no
/// bindings, so no group holds access to it.
///
/// # Errors
///
/// Returns a [`SyncError`] if a list request fails.
pub async fn load_project_bindings(
    store: &dyn ResourceStore,
    globaldns_name: &str,
    project_names: &[String],
) -> Result<ProjectBindings, SyncError> {
    let mut bindings = ProjectBindings::new();

    for project in project_names {
        let Some(namespace) = project_namespace(project) else {
            warn!(globaldns = %globaldns_name, project = %project, "Malformed project name grants no access");
            bindings.insert(project.clone(), Vec::new());
            continue;
        };

        let active: Vec<_> = store
            .list_project_role_bindings(namespace)
            .await
            .map_err(|e| SyncError::from_store(globaldns_name, e))?
            .into_iter()
            .filter(ProjectRoleTemplateBinding::is_active)
            .collect();

        debug!(
            globaldns = %globaldns_name,
            project = %project,
            bindings = active.len(),
            "Loaded project role template bindings"
        );
        bindings.insert(project.clone(), active);
    }

    Ok(bindings)
}

fn allows(values: Option<&Vec<String>>, wanted: &str) -> bool {
    values.is_some_and(|values| values.iter().any(|v| v == "*" || v == wanted))
}

/// Whether a policy rule grants `verb` on every object of `resource`.
///
/// Rules restricted to named instances do not count.
#[must_use]
pub fn rule_allows(rule: &PolicyRule, verb: &str, resource: &str) -> bool {
    let unrestricted = rule
        .resource_names
        .as_ref()
        .is_none_or(|names| names.is_empty());

    unrestricted
        && allows(rule.api_groups.as_ref(), API_GROUP)
        && allows(rule.resources.as_ref(), resource)
        && rule.verbs.iter().any(|v| v == "*" || v == verb)
}

/// Whether the role template named `template_name`, or any template it inherits,
/// grants `verb` on `resource`.
///
/// The standard project owner and project member templates always qualify.
/// Missing templates grant nothing; inheritance cycles are tolerated.
///
/// # Errors
///
/// Returns a [`StoreError`] if a template lookup fails for a reason other than
/// not-found.
pub async fn role_template_allows(
    store: &dyn ResourceStore,
    template_name: &str,
    verb: &str,
    resource: &str,
) -> Result<bool, StoreError> {
    let mut pending = vec![template_name.to_string()];
    let mut visited = HashSet::new();

    while let Some(name) = pending.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        if name == ROLE_TEMPLATE_PROJECT_OWNER || name == ROLE_TEMPLATE_PROJECT_MEMBER {
            return Ok(true);
        }

        let template = match store.get_role_template(&name).await {
            Ok(template) => template,
            Err(e) if e.is_not_found() => {
                debug!(role_template = %name, "Role template not found, it grants nothing");
                continue;
            }
            Err(e) => return Err(e),
        };

        if template
            .rules
            .iter()
            .any(|rule| rule_allows(rule, verb, resource))
        {
            return Ok(true);
        }
        pending.extend(template.role_template_names);
    }

    Ok(false)
}

/// The first referenced project in which `group` lacks the minimum access.
async fn first_denied_project<'a>(
    store: &dyn ResourceStore,
    globaldns_name: &str,
    group: &str,
    bindings: &'a ProjectBindings,
) -> Result<Option<&'a String>, SyncError> {
    for (project, project_bindings) in bindings {
        let mut granted = false;
        for binding in project_bindings
            .iter()
            .filter(|b| b.group_principal_name == group)
        {
            granted = role_template_allows(
                store,
                &binding.role_template_name,
                MINIMUM_PROJECT_VERB,
                GLOBAL_DNS_RESOURCE,
            )
            .await
            .map_err(|e| SyncError::from_store(globaldns_name, e))?;
            if granted {
                break;
            }
        }

        if !granted {
            return Ok(Some(project));
        }
    }

    Ok(None)
}

/// Verify every group holds the minimum access in every referenced project.
///
/// # Errors
///
/// Returns [`SyncError::AuthorizationDenied`] for the first group and project
/// without access, or a store error if a role template lookup fails.
pub async fn check_group_access(
    store: &dyn ResourceStore,
    globaldns_name: &str,
    groups: &BTreeSet<String>,
    bindings: &ProjectBindings,
) -> Result<(), SyncError> {
    for group in groups {
        if let Some(project) = first_denied_project(store, globaldns_name, group, bindings).await?
        {
            warn!(
                globaldns = %globaldns_name,
                group = %group,
                project = %project,
                "Member group lacks access to referenced project"
            );
            return Err(SyncError::AuthorizationDenied {
                group: group.clone(),
                project: project.clone(),
            });
        }
    }

    Ok(())
}

/// Drop derived group members that would fail [`check_group_access`].
///
/// Persisted members are explicit on the next pass, so a group bound in only
/// some of the referenced projects must not be derived.
///
/// # Errors
///
/// Returns a store error if a role template lookup fails.
pub async fn retain_authorized_groups(
    store: &dyn ResourceStore,
    globaldns_name: &str,
    derived: Vec<Member>,
    bindings: &ProjectBindings,
) -> Result<Vec<Member>, SyncError> {
    let mut retained = Vec::with_capacity(derived.len());
    for member in derived {
        if !member.group_principal_name.is_empty() {
            if let Some(project) = first_denied_project(
                store,
                globaldns_name,
                &member.group_principal_name,
                bindings,
            )
            .await?
            {
                debug!(
                    globaldns = %globaldns_name,
                    group = %member.group_principal_name,
                    project = %project,
                    "Not deriving group without access to every referenced project"
                );
                continue;
            }
        }
        retained.push(member);
    }

    Ok(retained)
}

/// Access type conferred by a project role template, if it confers membership.
fn access_type_for(role_template_name: &str) -> Option<&'static str> {
    match role_template_name {
        ROLE_TEMPLATE_PROJECT_OWNER => Some(ACCESS_TYPE_OWNER),
        ROLE_TEMPLATE_PROJECT_MEMBER => Some(ACCESS_TYPE_MEMBER),
        _ => None,
    }
}

/// Compute the full member list: explicit members first, in declared order,
/// followed by members derived from project bindings, ordered by subject.
///
/// A subject that is already an explicit member keeps its explicit entry. A
/// subject bound as both owner and member in the referenced projects is derived
/// as owner.
#[must_use]
pub fn derive_members(explicit: &[Member], bindings: &ProjectBindings) -> Vec<Member> {
    let explicit_subjects: HashSet<MemberSubject> =
        explicit.iter().filter_map(Member::subject).collect();

    let mut derived: BTreeMap<MemberSubject, Member> = BTreeMap::new();
    for binding in bindings.values().flatten() {
        let Some(access_type) = access_type_for(&binding.role_template_name) else {
            continue;
        };
        let member = Member {
            user_name: binding.user_name.clone(),
            user_principal_name: binding.user_principal_name.clone(),
            group_principal_name: binding.group_principal_name.clone(),
            access_type: access_type.to_string(),
            ..Default::default()
        };
        let Some(subject) = member.subject() else {
            continue;
        };
        if explicit_subjects.contains(&subject) {
            continue;
        }
        derived
            .entry(subject)
            .and_modify(|existing| {
                if member.is_owner() {
                    existing.access_type = ACCESS_TYPE_OWNER.to_string();
                }
            })
            .or_insert(member);
    }

    explicit.iter().cloned().chain(derived.into_values()).collect()
}

/// Order-independent equality of two member lists.
#[must_use]
pub fn members_equal(current: &[Member], desired: &[Member]) -> bool {
    if current.len() != desired.len() {
        return false;
    }
    let mut current = current.to_vec();
    let mut desired = desired.to_vec();
    current.sort();
    desired.sort();
    current == desired
}

/// Name of an RBAC object derived from a `GlobalDNS`.
#[must_use]
pub fn rbac_object_name(globaldns_name: &str, suffix: &str) -> String {
    format!("{globaldns_name}-{suffix}")
}

fn rbac_metadata(globaldns: &GlobalDNS, namespace: &str, suffix: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(rbac_object_name(&globaldns.name_any(), suffix)),
        namespace: Some(namespace.to_string()),
        labels: Some(derived_labels(COMPONENT_ACCESS)),
        owner_references: globaldns.controller_owner_ref(&()).map(|owner| vec![owner]),
        ..Default::default()
    }
}

/// The owner and read-only `Role`s for `globaldns`, in that order.
#[must_use]
pub fn build_roles(globaldns: &GlobalDNS, namespace: &str) -> [Role; 2] {
    let rule = |verbs: Vec<String>| PolicyRule {
        api_groups: Some(vec![API_GROUP.to_string()]),
        resources: Some(vec![GLOBAL_DNS_RESOURCE.to_string()]),
        resource_names: Some(vec![globaldns.name_any()]),
        verbs,
        ..Default::default()
    };

    [
        Role {
            metadata: rbac_metadata(globaldns, namespace, ROLE_SUFFIX_OWNER),
            rules: Some(vec![rule(vec!["*".to_string()])]),
        },
        Role {
            metadata: rbac_metadata(globaldns, namespace, ROLE_SUFFIX_READ_ONLY),
            rules: Some(vec![rule(
                READ_ONLY_VERBS.iter().map(ToString::to_string).collect(),
            )]),
        },
    ]
}

fn subject_for(subject: &MemberSubject) -> Subject {
    let (kind, name) = match subject {
        MemberSubject::User(name) => ("User", name),
        MemberSubject::Group(name) => ("Group", name),
    };
    Subject {
        api_group: Some(RBAC_API_GROUP.to_string()),
        kind: kind.to_string(),
        name: name.clone(),
        namespace: None,
    }
}

/// The owner and read-only `RoleBinding`s for `globaldns`, in that order.
///
/// The creator and `owner` members are bound to the owner role. Every other
/// member is bound to the read-only role unless it is already an owner. Subjects
/// are sorted so the desired bindings are stable across passes.
#[must_use]
pub fn build_role_bindings(
    globaldns: &GlobalDNS,
    namespace: &str,
    members: &[Member],
    creator_id: &str,
) -> [RoleBinding; 2] {
    let mut owners = BTreeSet::from([MemberSubject::User(creator_id.to_string())]);
    let mut readers = BTreeSet::new();

    for member in members {
        let Some(subject) = member.subject() else {
            warn!(
                globaldns = %globaldns.name_any(),
                member = ?member,
                "Member has no user or group identity, skipping"
            );
            continue;
        };
        if member.is_owner() {
            owners.insert(subject);
        } else {
            readers.insert(subject);
        }
    }
    readers.retain(|subject| !owners.contains(subject));

    let binding = |suffix: &str, subjects: &BTreeSet<MemberSubject>| RoleBinding {
        metadata: rbac_metadata(globaldns, namespace, suffix),
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_string(),
            kind: "Role".to_string(),
            name: rbac_object_name(&globaldns.name_any(), suffix),
        },
        subjects: Some(subjects.iter().map(subject_for).collect()),
    };

    [
        binding(ROLE_SUFFIX_OWNER, &owners),
        binding(ROLE_SUFFIX_READ_ONLY, &readers),
    ]
}

/// Make sure `desired` exists with the desired rules.
///
/// Returns whether a write happened. An `AlreadyExists` on create means another
/// writer got there first and counts as success.
async fn ensure_role(
    store: &dyn ResourceStore,
    namespace: &str,
    desired: &Role,
) -> Result<bool, StoreError> {
    let name = desired.name_any();
    match store.get_role(namespace, &name).await {
        Ok(existing) if existing.rules.clone().unwrap_or_default()
            == desired.rules.clone().unwrap_or_default() =>
        {
            Ok(false)
        }
        Ok(mut existing) => {
            existing.rules.clone_from(&desired.rules);
            store.replace_role(namespace, &existing).await?;
            info!(role = %name, namespace = %namespace, "Updated Role rules");
            crate::metrics::record_resource_updated("Role");
            Ok(true)
        }
        Err(e) if e.is_not_found() => match store.create_role(namespace, desired).await {
            Ok(_) => {
                info!(role = %name, namespace = %namespace, "Created Role");
                crate::metrics::record_resource_created("Role");
                Ok(true)
            }
            Err(e) if e.is_already_exists() => {
                debug!(role = %name, "Role created concurrently, treating as success");
                Ok(false)
            }
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    }
}

/// Make sure `desired` exists with the desired subjects.
///
/// Returns whether a write happened. An `AlreadyExists` on create means another
/// writer got there first and counts as success.
async fn ensure_role_binding(
    store: &dyn ResourceStore,
    namespace: &str,
    desired: &RoleBinding,
) -> Result<bool, StoreError> {
    let name = desired.name_any();
    match store.get_role_binding(namespace, &name).await {
        Ok(existing) if existing.subjects.clone().unwrap_or_default()
            == desired.subjects.clone().unwrap_or_default() =>
        {
            Ok(false)
        }
        Ok(mut existing) => {
            existing.subjects.clone_from(&desired.subjects);
            store.replace_role_binding(namespace, &existing).await?;
            info!(role_binding = %name, namespace = %namespace, "Updated RoleBinding subjects");
            crate::metrics::record_resource_updated("RoleBinding");
            Ok(true)
        }
        Err(e) if e.is_not_found() => match store.create_role_binding(namespace, desired).await {
            Ok(_) => {
                info!(role_binding = %name, namespace = %namespace, "Created RoleBinding");
                crate::metrics::record_resource_created("RoleBinding");
                Ok(true)
            }
            Err(e) if e.is_already_exists() => {
                debug!(role_binding = %name, "RoleBinding created concurrently, treating as success");
                Ok(false)
            }
            Err(e) => Err(e),
        },
        Err(e) => Err(e),
    }
}

/// Ensure the `Role`s and `RoleBinding`s granting `members` access exist.
///
/// # Returns
///
/// The number of objects created or replaced.
///
/// # Errors
///
/// Returns a [`SyncError`] on the first failing store call.
pub async fn ensure_authorization_objects(
    store: &dyn ResourceStore,
    namespace: &str,
    globaldns: &GlobalDNS,
    members: &[Member],
    creator_id: &str,
) -> Result<usize, SyncError> {
    let globaldns_name = globaldns.name_any();
    let mut written = 0;

    for role in build_roles(globaldns, namespace) {
        if ensure_role(store, namespace, &role)
            .await
            .map_err(|e| SyncError::from_store(&globaldns_name, e))?
        {
            written += 1;
        }
    }

    for binding in build_role_bindings(globaldns, namespace, members, creator_id) {
        if ensure_role_binding(store, namespace, &binding)
            .await
            .map_err(|e| SyncError::from_store(&globaldns_name, e))?
        {
            written += 1;
        }
    }

    Ok(written)
}

/// Replace `spec.members` when it differs from `members`.
///
/// Only the member list changes; the write carries the `resourceVersion` the
/// `GlobalDNS` was read at.
///
/// # Errors
///
/// Returns [`SyncError::StoreConflict`] if the `GlobalDNS` changed since it was
/// read, or [`SyncError::Store`] for any other failure.
pub async fn persist_members(
    store: &dyn ResourceStore,
    globaldns: &GlobalDNS,
    members: Vec<Member>,
) -> Result<bool, SyncError> {
    if members_equal(&globaldns.spec.members, &members) {
        return Ok(false);
    }

    let name = globaldns.name_any();
    let mut updated = globaldns.clone();
    updated.spec.members = members;

    store
        .replace_globaldns(&updated)
        .await
        .map_err(|e| SyncError::from_store(&name, e))?;

    info!(
        globaldns = %name,
        members = updated.spec.members.len(),
        "Updated GlobalDNS members"
    );
    crate::metrics::record_resource_updated(&GlobalDNS::kind(&()));

    Ok(true)
}

/// Run the whole access stage for `globaldns`.
///
/// # Errors
///
/// Returns [`SyncError::AuthorizationDenied`] if a member group lacks project
/// access, or a store error from any step.
pub async fn sync_access(
    store: &dyn ResourceStore,
    namespace: &str,
    globaldns: &GlobalDNS,
    creator_id: &str,
) -> Result<AccessSyncResult, SyncError> {
    let globaldns_name = globaldns.name_any();
    let bindings =
        load_project_bindings(store, &globaldns_name, &globaldns.spec.project_names).await?;

    let groups = member_groups(&globaldns.spec.members);
    check_group_access(store, &globaldns_name, &groups, &bindings).await?;

    let mut members = derive_members(&globaldns.spec.members, &bindings);
    let derived = members.split_off(globaldns.spec.members.len());
    members.extend(retain_authorized_groups(store, &globaldns_name, derived, &bindings).await?);
    let rbac_objects_written =
        ensure_authorization_objects(store, namespace, globaldns, &members, creator_id).await?;
    let members_updated = persist_members(store, globaldns, members).await?;

    Ok(AccessSyncResult {
        rbac_objects_written,
        members_updated,
    })
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod access_tests;
