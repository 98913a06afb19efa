// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `ownership.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::reconcilers::fixtures::{globaldns, owned_ingress, NAMESPACE};
    use crate::store::memory::{MemoryStore, Op};
    use crate::errors::StoreError;

    #[test]
    fn test_ingress_name_is_prefixed() {
        assert_eq!(ingress_name("app"), "globaldns-ingress-app");
    }

    #[test]
    fn test_owner_link_requires_uid() {
        let mut gdns = globaldns("app", "app.example.com", &[]);
        let link = OwnerLink::of(&gdns).unwrap();
        assert_eq!(link.uid, "uid-app");
        assert_eq!(link.kind, "GlobalDNS");

        gdns.metadata.uid = None;
        assert!(OwnerLink::of(&gdns).is_none());
    }

    #[test]
    fn test_owner_link_matches_uid_and_kind() {
        let link = OwnerLink {
            uid: "uid-app".to_string(),
            kind: "GlobalDNS".to_string(),
        };

        assert!(is_owned_by(
            &owned_ingress("x", "uid-app", "GlobalDNS"),
            &link
        ));
        assert!(!is_owned_by(
            &owned_ingress("x", "uid-other", "GlobalDNS"),
            &link
        ));
        assert!(!is_owned_by(
            &owned_ingress("x", "uid-app", "MultiClusterApp"),
            &link
        ));
    }

    #[tokio::test]
    async fn test_find_owned_ingress_absent() {
        let store = MemoryStore::new();
        let gdns = globaldns("app", "app.example.com", &[]);
        let link = OwnerLink::of(&gdns).unwrap();

        let found = find_owned_ingress(&store, NAMESPACE, &gdns, &link)
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_find_owned_ingress_present() {
        let store = MemoryStore::new();
        store.insert_ingress(
            NAMESPACE,
            owned_ingress("globaldns-ingress-app", "uid-app", "GlobalDNS"),
        );
        let gdns = globaldns("app", "app.example.com", &[]);
        let link = OwnerLink::of(&gdns).unwrap();

        let found = find_owned_ingress(&store, NAMESPACE, &gdns, &link)
            .await
            .unwrap();
        assert_eq!(found.unwrap().name_any(), "globaldns-ingress-app");
    }

    #[tokio::test]
    async fn test_find_owned_ingress_foreign_owner_is_absent() {
        let store = MemoryStore::new();
        let foreign = store.insert_ingress(
            NAMESPACE,
            owned_ingress("globaldns-ingress-app", "uid-someone-else", "GlobalDNS"),
        );
        let gdns = globaldns("app", "app.example.com", &[]);
        let link = OwnerLink::of(&gdns).unwrap();

        let found = find_owned_ingress(&store, NAMESPACE, &gdns, &link)
            .await
            .unwrap();
        assert!(found.is_none());

        // untouched
        assert_eq!(
            store.ingress(NAMESPACE, "globaldns-ingress-app"),
            Some(foreign)
        );
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn test_find_owned_ingress_lookup_failure() {
        let store = MemoryStore::new();
        store.fail_next(
            Op::GetIngress,
            StoreError::Transport("connection refused".to_string()),
        );
        let gdns = globaldns("app", "app.example.com", &[]);
        let link = OwnerLink::of(&gdns).unwrap();

        let err = find_owned_ingress(&store, NAMESPACE, &gdns, &link)
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Lookup { .. }));
        assert!(err.is_retryable());
    }
}
