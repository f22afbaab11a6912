// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A JSON array persisted to one file.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use guestpulse_core::GuestPulseError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

/// A `Vec<T>` stored as a pretty-printed JSON array.
///
/// A missing or empty file reads as an empty list. A file that is present but
/// not valid JSON is an error: rewriting it would silently drop its history.
pub struct JsonFileStore<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record.
    pub async fn load(&self) -> Result<Vec<T>, GuestPulseError> {
        let _guard = self.lock.lock().await;
        self.read().await
    }

    /// Read, mutate and write back under the file lock.
    ///
    /// Nothing is written if `mutate` returns an error.
    pub async fn update<R: Send>(
        &self,
        mutate: impl FnOnce(&mut Vec<T>) -> Result<R, GuestPulseError> + Send,
    ) -> Result<R, GuestPulseError> {
        let _guard = self.lock.lock().await;
        let mut items = self.read().await?;
        let out = mutate(&mut items)?;
        self.write(&items).await?;
        Ok(out)
    }

    async fn read(&self) -> Result<Vec<T>, GuestPulseError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(GuestPulseError::storage(e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(GuestPulseError::storage)
    }

    async fn write(&self, items: &[T]) -> Result<(), GuestPulseError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(GuestPulseError::storage)?;
        }
        let json = serde_json::to_vec_pretty(items).map_err(GuestPulseError::storage)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(GuestPulseError::storage)?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(GuestPulseError::storage)?;
        debug!(path = %self.path.display(), records = items.len(), "journal file written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        n: u32,
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store: JsonFileStore<Row> = JsonFileStore::new(dir.path().join("rows.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_creates_directory_and_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("rows.json");
        let store = JsonFileStore::new(&path);
        store
            .update(|rows: &mut Vec<Row>| {
                rows.push(Row { n: 1 });
                Ok(())
            })
            .await
            .unwrap();

        let reopened: JsonFileStore<Row> = JsonFileStore::new(&path);
        assert_eq!(reopened.load().await.unwrap(), vec![Row { n: 1 }]);
        assert!(!dir.path().join("nested").join("rows.json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_mutation_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.json");
        let store: JsonFileStore<Row> = JsonFileStore::new(&path);
        let result = store
            .update(|rows| {
                rows.push(Row { n: 9 });
                Err::<(), _>(GuestPulseError::Validation("nope".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.json");
        std::fs::write(&path, "{not json").unwrap();
        let store: JsonFileStore<Row> = JsonFileStore::new(&path);
        assert!(store.load().await.is_err());
    }

    #[tokio::test]
    async fn concurrent_updates_are_serialized() {
        let dir = tempdir().unwrap();
        let store: Arc<JsonFileStore<Row>> = Arc::new(JsonFileStore::new(dir.path().join("rows.json")));

        let mut handles = Vec::new();
        for n in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .update(|rows| {
                        rows.push(Row { n });
                        Ok(())
                    })
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.load().await.unwrap().len(), 20);
    }
}
