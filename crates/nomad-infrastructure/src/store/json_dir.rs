//! JSON-file `DocumentStore`.
//!
//! Each document is one pretty-printed JSON file. A document path maps to
//! `<base>/<seg>/<seg>/.../<id>.json`, a collection path to a directory:
//!
//! ```text
//! base_dir/
//! └── users/
//!     ├── u1.json              # profile document
//!     └── u1/
//!         ├── chats/
//!         │   ├── <session-id>.json
//!         │   └── <session-id>.json
//!         └── favorites/
//!             └── saved.json
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use nomad_core::error::{NomadError, Result};
use nomad_core::store::{CollectionPath, DocumentPath, DocumentStore};
use serde_json::Value;
use tokio::fs;
use tokio::sync::Mutex;

/// Document store persisting JSON files below a base directory.
///
/// Writes go through a temporary file and an atomic rename, and are
/// serialized by an internal lock so read-modify-write merges never
/// interleave.
pub struct JsonDirDocumentStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDirDocumentStore {
    /// Creates a store rooted at `base_dir`, creating the directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn document_file(&self, path: &DocumentPath) -> Result<PathBuf> {
        path.validate()?;
        let segments = path.segments();
        let mut file = self.base_dir.clone();
        for segment in &segments[..segments.len() - 1] {
            file.push(segment);
        }
        file.push(format!("{}.json", path.id()));
        Ok(file)
    }

    fn collection_dir(&self, collection: &CollectionPath) -> Result<PathBuf> {
        collection.validate()?;
        let mut dir = self.base_dir.clone();
        for segment in collection.segments() {
            dir.push(segment);
        }
        Ok(dir)
    }

    async fn read_file(file: &Path) -> Result<Option<Value>> {
        match fs::read(file).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn write_file(file: &Path, document: &Value) -> Result<()> {
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = file.with_extension("json.tmp");
        fs::write(&tmp, bytes).await?;
        fs::rename(&tmp, file).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonDirDocumentStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>> {
        let file = self.document_file(path)?;
        Self::read_file(&file).await
    }

    async fn set(&self, path: &DocumentPath, document: Value) -> Result<()> {
        let file = self.document_file(path)?;
        let _guard = self.write_lock.lock().await;
        Self::write_file(&file, &document).await
    }

    async fn merge(&self, path: &DocumentPath, fields: Value) -> Result<()> {
        let Value::Object(fields) = fields else {
            return Err(NomadError::validation("merge expects a JSON object"));
        };
        let file = self.document_file(path)?;
        let _guard = self.write_lock.lock().await;

        let merged = match Self::read_file(&file).await? {
            Some(Value::Object(mut existing)) => {
                existing.extend(fields);
                Value::Object(existing)
            }
            _ => Value::Object(fields),
        };
        Self::write_file(&file, &merged).await
    }

    async fn delete(&self, path: &DocumentPath) -> Result<()> {
        let file = self.document_file(path)?;
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&file).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self, collection: &CollectionPath) -> Result<Vec<(String, Value)>> {
        let dir = self.collection_dir(collection)?;
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file = entry.path();
            if file.extension() != Some(OsStr::new("json")) || !entry.file_type().await?.is_file()
            {
                continue;
            }
            let Some(id) = file.file_stem().and_then(OsStr::to_str).map(str::to_string) else {
                continue;
            };
            match Self::read_file(&file).await {
                Ok(Some(document)) => documents.push((id, document)),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!("Skipping unreadable document {}: {}", file.display(), err);
                }
            }
        }

        documents.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(documents)
    }
}
