// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Common label and annotation constants used by the GlobalDNS controller.
//!
//! This module defines standard Kubernetes labels and the management-specific
//! annotations read from `GlobalDNS` objects or written onto derived resources.

// ============================================================================
// Kubernetes Standard Labels
// https://kubernetes.io/docs/concepts/overview/working-with-objects/common-labels/
// ============================================================================

/// Standard label for the component name within the architecture
pub const K8S_COMPONENT: &str = "app.kubernetes.io/component";

/// Standard label for the tool being used to manage the operation of an application
pub const K8S_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Standard label for the name of a higher-level application this one is part of
pub const K8S_PART_OF: &str = "app.kubernetes.io/part-of";

// ============================================================================
// Kubernetes Standard Label Values
// ============================================================================

/// Value for `app.kubernetes.io/part-of` on every derived object
pub const PART_OF_GLOBALDNS: &str = "globaldns";

/// Component value for the derived `Ingress`
pub const COMPONENT_ENDPOINT_PROJECTION: &str = "endpoint-projection";

/// Component value for derived RBAC objects
pub const COMPONENT_ACCESS: &str = "access";

/// Value for `app.kubernetes.io/managed-by`
pub const MANAGED_BY_GLOBALDNS_CONTROLLER: &str = "globaldns-controller";

// ============================================================================
// Management Annotations
// ============================================================================

/// Annotation carrying the identity of the user that created the object
pub const CREATOR_ID_ANNOTATION: &str = "field.cattle.io/creatorId";

/// Annotation declaring which ingress controller handles an `Ingress`
pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
