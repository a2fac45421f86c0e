use async_trait::async_trait;
use models::{Au, NewAu};

use crate::errors::ServiceError;

/// Durable collection of AU entries.
/// Implementations must be indistinguishable to callers: same ordering,
/// same not-found semantics, same visibility after a failed write.
#[async_trait]
pub trait AuStore: Send + Sync {
    /// Short backend name, used in logs and `/health`.
    fn backend(&self) -> &'static str;

    /// All entries, newest `created` first.
    async fn list(&self) -> Result<Vec<Au>, ServiceError>;

    /// Assign `id`/`created`, persist, and return the stored record.
    async fn create(&self, au: NewAu) -> Result<Au, ServiceError>;

    /// Remove the entry whose id renders as `id`; `Ok(None)` if there is none.
    async fn delete(&self, id: &str) -> Result<Option<Au>, ServiceError>;
}
