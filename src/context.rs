// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Shared context passed to the `GlobalDNS` reconciler.
//!
//! The context is built once in `main` and handed to the controller as an
//! `Arc<Context>`. It holds no mutable state: everything a reconciliation pass
//! needs beyond its configuration is read from the resource store.

use crate::config::ControllerConfig;
use crate::store::{KubeStore, ResourceStore};
use kube::Client;
use std::sync::Arc;

/// Dependencies of a reconciliation pass.
#[derive(Clone)]
pub struct Context {
    /// Resource store for all reads and writes
    pub store: Arc<dyn ResourceStore>,

    /// Controller settings
    pub config: ControllerConfig,
}

impl Context {
    #[must_use]
    pub fn new(store: Arc<dyn ResourceStore>, config: ControllerConfig) -> Self {
        Self { store, config }
    }

    /// Context backed by the Kubernetes API server.
    #[must_use]
    pub fn from_client(client: Client, config: ControllerConfig) -> Self {
        Self::new(Arc::new(KubeStore::new(client)), config)
    }

    /// Namespace holding derived objects.
    #[must_use]
    pub fn global_namespace(&self) -> &str {
        &self.config.global_namespace
    }
}
