use std::sync::Arc;

use models::{Au, AuDraft};
use tracing::{info, instrument, warn};

use super::store::AuStore;
use crate::auth::AdminGate;
use crate::errors::ServiceError;

/// AU business service independent of web framework.
/// Validation and authorization run here, before the store is touched.
#[derive(Clone)]
pub struct AuService {
    store: Arc<dyn AuStore>,
    gate: AdminGate,
}

impl AuService {
    pub fn new(store: Arc<dyn AuStore>, gate: AdminGate) -> Self { Self { store, gate } }

    pub fn backend(&self) -> &'static str { self.store.backend() }

    /// All entries, newest first.
    pub async fn list(&self) -> Result<Vec<Au>, ServiceError> {
        self.store.list().await
    }

    /// Validate `draft` and persist it.
    #[instrument(skip_all)]
    pub async fn create(&self, draft: AuDraft) -> Result<Au, ServiceError> {
        let new = draft.validate()?;
        let au = self.store.create(new).await?;
        info!(id = %au.id, name = %au.name, backend = self.backend(), "au created");
        Ok(au)
    }

    /// Delete `id` if `token` matches the admin secret.
    /// A refused token never reaches the store, so it reveals nothing about `id`.
    #[instrument(skip(self, token))]
    pub async fn delete(&self, id: &str, token: Option<&str>) -> Result<Au, ServiceError> {
        if let Err(e) = self.gate.authorize(token) {
            warn!(token_present = token.is_some(), "delete refused: bad admin token");
            return Err(e);
        }
        let au = self
            .store
            .delete(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("au"))?;
        info!(id = %au.id, "au deleted");
        Ok(au)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use models::NewAu;

    use crate::file::FileAuStore;
    use crate::test_support::{draft, temp_data_file};

    async fn file_service(prefix: &str) -> (AuService, std::path::PathBuf) {
        let tmp = temp_data_file(prefix);
        let store = FileAuStore::open(&tmp).await.expect("open store");
        (AuService::new(store, AdminGate::new("admin-token")), tmp)
    }

    /// Store whose writes always fail, counting every call it receives.
    #[derive(Default)]
    struct BrokenStore {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AuStore for BrokenStore {
        fn backend(&self) -> &'static str { "broken" }
        async fn list(&self) -> Result<Vec<Au>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ServiceError::Storage("disk on fire".into()))
        }
        async fn create(&self, _au: NewAu) -> Result<Au, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ServiceError::Storage("disk on fire".into()))
        }
        async fn delete(&self, _id: &str) -> Result<Option<Au>, ServiceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ServiceError::Storage("disk on fire".into()))
        }
    }

    #[tokio::test]
    async fn invalid_draft_leaves_store_unchanged() -> Result<(), anyhow::Error> {
        let (svc, tmp) = file_service("svc_invalid").await;
        svc.create(draft("keep")).await?;

        for bad in [
            AuDraft::default(),
            AuDraft::new("", "X", "d"),
            AuDraft::new("n", "", "d"),
            AuDraft::new("n", "X", ""),
        ] {
            let err = svc.create(bad).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }
        assert_eq!(svc.list().await?.len(), 1);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn create_adds_exactly_one_with_fresh_id() -> Result<(), anyhow::Error> {
        let (svc, tmp) = file_service("svc_create").await;
        let before = svc.list().await?.len();
        let au = svc.create(AuDraft::new("Outertale", "X", "desc").with_link("")).await?;
        let after = svc.list().await?;
        assert_eq!(after.len(), before + 1);
        assert_eq!(after[0], au);
        assert_eq!((au.name.as_str(), au.author.as_str(), au.desc.as_str(), au.link.as_str()), ("Outertale", "X", "desc", ""));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn create_a_then_b_lists_b_first() -> Result<(), anyhow::Error> {
        let (svc, tmp) = file_service("svc_order").await;
        let a = svc.create(draft("A")).await?;
        let b = svc.create(draft("B")).await?;
        assert_eq!(svc.list().await?, vec![b, a]);
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_requires_token() -> Result<(), anyhow::Error> {
        let (svc, tmp) = file_service("svc_delete").await;
        let a = svc.create(draft("A")).await?;
        let id = a.id.to_string();

        assert!(matches!(svc.delete(&id, None).await, Err(ServiceError::Forbidden)));
        assert!(matches!(svc.delete(&id, Some("wrong")).await, Err(ServiceError::Forbidden)));
        assert_eq!(svc.list().await?, vec![a.clone()]);

        assert!(matches!(svc.delete("12345", Some("admin-token")).await, Err(ServiceError::NotFound(_))));
        assert_eq!(svc.list().await?.len(), 1);

        let removed = svc.delete(&id, Some("admin-token")).await?;
        assert_eq!(removed, a);
        assert!(svc.list().await?.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn refused_delete_never_reaches_store() {
        let store = Arc::new(BrokenStore::default());
        let svc = AuService::new(store.clone(), AdminGate::new("admin-token"));

        assert!(matches!(svc.delete("1", Some("nope")).await, Err(ServiceError::Forbidden)));
        assert!(matches!(svc.create(AuDraft::default()).await, Err(ServiceError::Validation(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);

        assert!(matches!(svc.delete("1", Some("admin-token")).await, Err(ServiceError::Storage(_))));
        assert!(matches!(svc.create(draft("x")).await, Err(ServiceError::Storage(_))));
        assert!(matches!(svc.list().await, Err(ServiceError::Storage(_))));
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }
}
