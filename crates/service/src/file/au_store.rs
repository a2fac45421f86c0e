use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use models::{au::now_millis, Au, AuId, NewAu};

use crate::aus::store::AuStore;
use crate::errors::ServiceError;
use crate::storage::json_vec_store::JsonVecStore;

/// File-backed AU store.
/// Keeps the entries in insertion order in a JSON array on disk; ids are
/// epoch milliseconds, bumped past the highest id ever handed out when two
/// creates share a tick.
pub struct FileAuStore {
    store: JsonVecStore<Au>,
    /// Highest id issued so far. Only moves forward, so a deleted id is never reissued.
    high_water: AtomicI64,
}

impl FileAuStore {
    /// Load the store from the given file path. A missing file starts empty.
    pub async fn open<P: Into<std::path::PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonVecStore::<Au>::open(path).await?;
        let high_water = max_millis_id(&store.snapshot().await).unwrap_or(0);
        Ok(Arc::new(Self { store, high_water: AtomicI64::new(high_water) }))
    }

    pub fn path(&self) -> &std::path::Path {
        self.store.path()
    }
}

fn max_millis_id(items: &[Au]) -> Option<i64> {
    items
        .iter()
        .filter_map(|a| match a.id {
            AuId::Millis(n) => Some(n),
            AuId::Object(_) => None,
        })
        .max()
}

fn next_id_and_created(items: &[Au], high_water: i64) -> (i64, chrono::DateTime<chrono::Utc>) {
    let last_created = items.iter().map(|a| a.created).max();
    let last_id = max_millis_id(items).unwrap_or(0).max(high_water);

    let mut created = now_millis();
    if let Some(last) = last_created {
        created = created.max(last);
    }
    let id = created.timestamp_millis().max(last_id + 1);
    (id, created)
}

#[async_trait::async_trait]
impl AuStore for FileAuStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn list(&self) -> Result<Vec<Au>, ServiceError> {
        let mut items = self.store.snapshot().await;
        items.reverse();
        // stable: equal timestamps stay newest-inserted first
        items.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(items)
    }

    async fn create(&self, au: NewAu) -> Result<Au, ServiceError> {
        let high_water = &self.high_water;
        self.store
            .update(move |items| {
                // runs under the store's write lock, so issuing ids is serialized
                let (id, created) = next_id_and_created(items, high_water.load(Ordering::SeqCst));
                high_water.fetch_max(id, Ordering::SeqCst);
                let stored = au.into_au(AuId::Millis(id), created);
                items.push(stored.clone());
                stored
            })
            .await
    }

    async fn delete(&self, id: &str) -> Result<Option<Au>, ServiceError> {
        self.store.remove_where(|a| a.id.matches(id)).await
    }
}
