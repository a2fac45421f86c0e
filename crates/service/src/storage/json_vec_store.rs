use std::{io::ErrorKind, path::{Path, PathBuf}};
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered collection.
///
/// The whole collection is loaded once and kept in memory; every mutation
/// rewrites the file as a pretty-printed JSON array. Mutations hold the write
/// lock across modify + persist, so writers are serialized and readers only
/// ever see a fully committed collection.
///
/// The rewrite is a plain overwrite: a crash in the middle of it can leave a
/// truncated file, and nothing here tries to recover from that.
pub struct JsonVecStore<T> {
    inner: RwLock<Vec<T>>,
    file_path: PathBuf,
}

impl<T> JsonVecStore<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync,
{
    /// Load the collection from `path`. A missing file is an empty collection;
    /// an unreadable or malformed one is an error.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        let items: Vec<T> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Vec::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ServiceError::Storage(format!("malformed data file {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %file_path.display(), "data file not found; starting empty");
                Vec::new()
            }
            Err(e) => return Err(ServiceError::storage(e)),
        };
        debug!(path = %file_path.display(), count = items.len(), "data file loaded");
        Ok(Self { inner: RwLock::new(items), file_path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    async fn persist(&self, items: &[T]) -> Result<(), ServiceError> {
        let data = serde_json::to_vec_pretty(items).map_err(ServiceError::storage)?;
        fs::write(&self.file_path, data).await.map_err(ServiceError::storage)?;
        Ok(())
    }

    /// Clone of the committed collection, in insertion order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Apply `f` to a working copy, persist it, then commit it in memory.
    /// If the write fails the in-memory collection is left untouched.
    pub async fn update<R, F>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let mut guard = self.inner.write().await;
        let mut next = guard.clone();
        let out = f(&mut next);
        self.persist(&next).await?;
        *guard = next;
        Ok(out)
    }

    /// Remove the first item matching `pred` and persist. Nothing is written
    /// when no item matches.
    pub async fn remove_where<P>(&self, pred: P) -> Result<Option<T>, ServiceError>
    where
        P: Fn(&T) -> bool,
    {
        let mut guard = self.inner.write().await;
        let Some(pos) = guard.iter().position(|item| pred(item)) else {
            return Ok(None);
        };
        let mut next = guard.clone();
        let removed = next.remove(pos);
        self.persist(&next).await?;
        *guard = next;
        Ok(Some(removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_data_file;

    #[tokio::test]
    async fn json_vec_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = temp_data_file("json_vec_store");
        let store = JsonVecStore::<String>::open(&tmp).await?;

        // initially empty, and no file written yet
        assert!(store.is_empty().await);
        assert!(fs::metadata(&tmp).await.is_err());

        store.update(|v| v.push("a".to_string())).await?;
        store.update(|v| v.push("b".to_string())).await?;
        assert_eq!(store.snapshot().await, vec!["a", "b"]);

        let removed = store.remove_where(|s| s == "a").await?;
        assert_eq!(removed.as_deref(), Some("a"));
        assert_eq!(store.remove_where(|s| s == "zzz").await?, None);

        // reload from disk
        let reloaded = JsonVecStore::<String>::open(&tmp).await?;
        assert_eq!(reloaded.snapshot().await, vec!["b"]);
        assert_eq!(reloaded.len().await, 1);

        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = temp_data_file("json_vec_store_bad");
        fs::write(&tmp, b"{not json").await?;
        let res = JsonVecStore::<String>::open(&tmp).await;
        assert!(matches!(res, Err(ServiceError::Storage(_))));
        let _ = fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() -> Result<(), anyhow::Error> {
        let tmp = temp_data_file("json_vec_store_fail");
        let store = JsonVecStore::<String>::open(&tmp).await?;
        store.update(|v| v.push("kept".to_string())).await?;

        // Swap the file for a directory so the next write fails.
        fs::remove_file(&tmp).await?;
        fs::create_dir_all(&tmp).await?;

        let res = store.update(|v| v.push("lost".to_string())).await;
        assert!(matches!(res, Err(ServiceError::Storage(_))));
        assert_eq!(store.snapshot().await, vec!["kept"]);

        let res = store.remove_where(|s| s == "kept").await;
        assert!(res.is_err());
        assert_eq!(store.snapshot().await, vec!["kept"]);

        let _ = fs::remove_dir_all(&tmp).await;
        Ok(())
    }
}
