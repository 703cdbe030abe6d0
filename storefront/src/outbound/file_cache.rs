//! File-backed local store.
//!
//! Each shared collection is a sub-directory of the cache root and each
//! user-scoped collection lives under `users/<sha256 of user id>/`. Every
//! document is a JSON envelope file named after the SHA-256 of its key. Writes go to a
//! hidden temporary file that is then renamed over the target, so readers
//! never observe a partially written document. Blocking filesystem calls run
//! on Tokio's blocking pool.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::ports::{LocalStore, LocalStoreError};
use crate::domain::{CollectionPath, EntityKey, USERS_SEGMENT};

const DOCUMENT_EXTENSION: &str = "json";

/// Stored form of one document; the key is kept so listings need no index.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    key: EntityKey,
    document: Value,
}

/// Local store persisting documents under one directory.
#[derive(Debug, Clone)]
pub struct FileLocalStore {
    root: Arc<Dir>,
}

impl FileLocalStore {
    /// Open the cache at `path`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let root = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self::from_dir(root))
    }

    /// Use an already opened directory as the cache root.
    pub fn from_dir(root: Dir) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, LocalStoreError>
    where
        F: FnOnce(&Dir) -> Result<T, LocalStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| LocalStoreError::io(format!("cache task did not complete: {err}")))?
    }
}

fn digest(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

fn collection_folder(path: &CollectionPath) -> PathBuf {
    let collection = path.collection().as_str();
    match path.owner() {
        Some(owner) => Path::new(USERS_SEGMENT)
            .join(digest(owner.as_str()))
            .join(collection),
        None => PathBuf::from(collection),
    }
}

fn document_path(folder: &Path, key: &EntityKey) -> PathBuf {
    folder.join(format!("{}.{DOCUMENT_EXTENSION}", digest(key.as_str())))
}

fn io_error(action: &str, path: &Path, err: &io::Error) -> LocalStoreError {
    LocalStoreError::io(format!("failed to {action} {}: {err}", path.display()))
}

fn read_envelope(root: &Dir, path: &Path) -> Result<Option<Envelope>, LocalStoreError> {
    let bytes = match root.read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_error("read", path, &err)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| LocalStoreError::corrupt(format!("{}: {err}", path.display())))
}

fn write_envelope(root: &Dir, folder: &Path, envelope: &Envelope) -> Result<(), LocalStoreError> {
    root.create_dir_all(folder)
        .map_err(|err| io_error("create", folder, &err))?;

    let target = document_path(folder, &envelope.key);
    let bytes = serde_json::to_vec(envelope)
        .map_err(|err| LocalStoreError::corrupt(format!("{}: {err}", target.display())))?;
    let staging = folder.join(format!(".{}.tmp", Uuid::new_v4().simple()));

    root.write(&staging, &bytes)
        .map_err(|err| io_error("write", &staging, &err))?;
    if let Err(err) = root.rename(&staging, root, &target) {
        drop(root.remove_file(&staging));
        return Err(io_error("replace", &target, &err));
    }
    Ok(())
}

fn list_envelopes(root: &Dir, folder: &Path) -> Result<Vec<Envelope>, LocalStoreError> {
    let entries = match root.read_dir(folder) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_error("list", folder, &err)),
    };

    let mut envelopes = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| io_error("list", folder, &err))?;
        let path = folder.join(entry.file_name());
        let is_document = path
            .extension()
            .is_some_and(|extension| extension == DOCUMENT_EXTENSION);
        if !is_document {
            continue;
        }
        if let Some(envelope) = read_envelope(root, &path)? {
            envelopes.push(envelope);
        }
    }
    envelopes.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(envelopes)
}

#[async_trait]
impl LocalStore for FileLocalStore {
    async fn get(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
    ) -> Result<Option<Value>, LocalStoreError> {
        let path = document_path(&collection_folder(path), key);
        self.blocking(move |root| {
            Ok(read_envelope(root, &path)?.map(|envelope| envelope.document))
        })
        .await
    }

    async fn get_all(&self, path: &CollectionPath) -> Result<Vec<Value>, LocalStoreError> {
        let folder = collection_folder(path);
        self.blocking(move |root| {
            Ok(list_envelopes(root, &folder)?
                .into_iter()
                .map(|envelope| envelope.document)
                .collect())
        })
        .await
    }

    async fn put(
        &self,
        path: &CollectionPath,
        key: &EntityKey,
        document: &Value,
    ) -> Result<(), LocalStoreError> {
        let folder = collection_folder(path);
        let envelope = Envelope {
            key: key.clone(),
            document: document.clone(),
        };
        self.blocking(move |root| write_envelope(root, &folder, &envelope))
            .await
    }

    async fn put_all(
        &self,
        path: &CollectionPath,
        documents: &[(EntityKey, Value)],
    ) -> Result<(), LocalStoreError> {
        let folder = collection_folder(path);
        let envelopes: Vec<Envelope> = documents
            .iter()
            .map(|(key, document)| Envelope {
                key: key.clone(),
                document: document.clone(),
            })
            .collect();
        self.blocking(move |root| {
            envelopes
                .iter()
                .try_for_each(|envelope| write_envelope(root, &folder, envelope))
        })
        .await
    }

    async fn delete(&self, path: &CollectionPath, key: &EntityKey) -> Result<(), LocalStoreError> {
        let path = document_path(&collection_folder(path), key);
        self.blocking(move |root| match root.remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error("remove", &path, &err)),
        })
        .await
    }

    async fn clear(&self, path: &CollectionPath) -> Result<(), LocalStoreError> {
        let folder = collection_folder(path);
        self.blocking(move |root| {
            match root.remove_dir_all(&folder) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(io_error("clear", &folder, &err)),
            }
        })
        .await
    }
}
