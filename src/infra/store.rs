//! File-backed JSON document store.
//!
//! The whole database lives in one pretty-printed JSON file. Reads are memoized for the
//! lifetime of the store; writes go through a process-wide gate, are checked against the
//! document version both in memory and on disk, copy the previous file to `<path>.backup`
//! and replace the primary file with a temp-file-then-rename.

use std::{
    fmt,
    io::{self, ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
    time::Instant,
};

use metrics::{counter, histogram};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    document::{COLLECTION_KEYS, Database, Quarantined},
    entities::{LeadRecord, OrderRecord, ProductRecord},
};

const TARGET: &str = "poshpoule::store";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableReason {
    Missing,
    NotAFile,
    ReadOnly,
    Unreadable,
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UnavailableReason::Missing => "file does not exist",
            UnavailableReason::NotAFile => "path is not a regular file",
            UnavailableReason::ReadOnly => "file is not writable",
            UnavailableReason::Unreadable => "file could not be read",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document store `{}` is unavailable: {reason}", path.display())]
    Unavailable {
        path: PathBuf,
        reason: UnavailableReason,
        #[source]
        source: Option<io::Error>,
    },
    #[error("document store `{}` is corrupt: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },
    #[error("failed to write document store `{}`", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("document version conflict: expected version {expected}, found {found}")]
    Conflict { expected: u64, found: u64 },
    #[error("failed to serialize document")]
    Serialize(#[source] serde_json::Error),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

#[derive(Debug, Deserialize)]
struct VersionStamp {
    #[serde(default)]
    version: u64,
}

pub struct JsonDocumentStore {
    path: PathBuf,
    backup_path: PathBuf,
    memo: RwLock<Option<Arc<Database>>>,
    write_gate: Mutex<()>,
}

impl JsonDocumentStore {
    /// Create a store for `path`. No I/O happens until the first read.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut backup = path.clone().into_os_string();
        backup.push(".backup");
        Self {
            path,
            backup_path: PathBuf::from(backup),
            memo: RwLock::new(None),
            write_gate: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }

    /// Current document, loading it from disk on first use.
    pub async fn read(&self) -> Result<Arc<Database>, StoreError> {
        let cached = self
            .memo
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(document) = cached {
            return Ok(document);
        }

        let loaded = Arc::new(self.load().await?);
        let mut memo = self.memo.write().unwrap_or_else(PoisonError::into_inner);
        // A concurrent reader or a commit may have filled the memo while we were loading.
        Ok(memo.get_or_insert(loaded).clone())
    }

    /// Replace the document. `document.version` must match the current version.
    pub async fn write(&self, document: Database) -> Result<Arc<Database>, StoreError> {
        let _gate = self.write_gate.lock().await;
        self.commit(document).await
    }

    /// Apply `apply` to a copy of the current document and commit it. Nothing is written
    /// when `apply` fails.
    pub async fn mutate<T, E, F>(&self, apply: F) -> Result<T, E>
    where
        F: FnOnce(&mut Database) -> Result<T, E>,
        E: From<StoreError>,
    {
        let _gate = self.write_gate.lock().await;
        let current = self.read().await?;
        let mut draft = Database::clone(&current);
        let output = apply(&mut draft)?;
        self.commit(draft).await?;
        Ok(output)
    }

    /// Create the backing file with `document` unless it already exists.
    /// Returns `true` when a new file was written.
    pub async fn initialize(&self, document: Database) -> Result<bool, StoreError> {
        let _gate = self.write_gate.lock().await;
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => return Ok(false),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(self.unavailable(UnavailableReason::Unreadable, Some(err))),
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.write_failed(source))?;
        }

        let bytes = encode(&document)?;
        self.replace_file(bytes).await?;
        *self.memo.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(document));
        info!(
            target = TARGET,
            op = "store::initialize",
            path = %self.path.display(),
            "Created empty document store"
        );
        Ok(true)
    }

    async fn load(&self) -> Result<Database, StoreError> {
        let started_at = Instant::now();

        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(self.unavailable(UnavailableReason::Missing, Some(err)));
            }
            Err(err) => return Err(self.unavailable(UnavailableReason::Unreadable, Some(err))),
        };
        if !metadata.is_file() {
            return Err(self.unavailable(UnavailableReason::NotAFile, None));
        }
        if metadata.permissions().readonly() {
            return Err(self.unavailable(UnavailableReason::ReadOnly, None));
        }

        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|err| self.unavailable(UnavailableReason::Unreadable, Some(err)))?;
        let document = decode(&self.path, &raw)?;

        info!(
            target = TARGET,
            op = "store::load",
            result = "ok",
            path = %self.path.display(),
            version = document.version,
            products = document.products.len(),
            orders = document.orders.len(),
            quarantined = document.quarantined.len(),
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            "Loaded document store"
        );
        Ok(document)
    }

    async fn commit(&self, mut document: Database) -> Result<Arc<Database>, StoreError> {
        let started_at = Instant::now();
        let current = self.read().await?;

        if document.version != current.version {
            return Err(self.conflict(current.version, document.version));
        }
        if let Some(on_disk) = self.disk_version().await? {
            if on_disk != current.version {
                return Err(self.conflict(current.version, on_disk));
            }
        }

        document.version = current.version + 1;
        let bytes = encode(&document)?;

        self.backup().await;
        self.replace_file(bytes).await?;

        let document = Arc::new(document);
        *self.memo.write().unwrap_or_else(PoisonError::into_inner) = Some(document.clone());

        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        counter!("poshpoule_store_write_total").increment(1);
        histogram!("poshpoule_store_write_ms").record(elapsed_ms as f64);
        debug!(
            target = TARGET,
            op = "store::commit",
            result = "ok",
            version = document.version,
            elapsed_ms,
            "Committed document"
        );
        Ok(document)
    }

    async fn disk_version(&self) -> Result<Option<u64>, StoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.unavailable(UnavailableReason::Unreadable, Some(err))),
        };
        let stamp: VersionStamp = serde_json::from_slice(&raw).map_err(|err| StoreError::Corrupt {
            path: self.path.clone(),
            message: format!("on-disk document changed and no longer parses: {err}"),
        })?;
        Ok(Some(stamp.version))
    }

    /// Best effort: a failed backup is logged and the write goes ahead.
    async fn backup(&self) {
        match tokio::fs::copy(&self.path, &self.backup_path).await {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => warn!(
                target = TARGET,
                op = "store::backup",
                result = "error",
                backup_path = %self.backup_path.display(),
                error = %err,
                "Failed to back up document before write"
            ),
        }
    }

    async fn replace_file(&self, bytes: Vec<u8>) -> Result<(), StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(io::Error::other)
            .and_then(|result| result)
            .map_err(|source| self.write_failed(source))
    }

    fn unavailable(&self, reason: UnavailableReason, source: Option<io::Error>) -> StoreError {
        StoreError::Unavailable {
            path: self.path.clone(),
            reason,
            source,
        }
    }

    fn write_failed(&self, source: io::Error) -> StoreError {
        warn!(
            target = TARGET,
            op = "store::write",
            result = "error",
            path = %self.path.display(),
            error = %source,
            "Failed to write document"
        );
        StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        }
    }

    fn conflict(&self, expected: u64, found: u64) -> StoreError {
        counter!("poshpoule_store_conflict_total").increment(1);
        warn!(
            target = TARGET,
            op = "store::commit",
            result = "conflict",
            expected,
            found,
            "Rejected write against a stale document"
        );
        StoreError::Conflict { expected, found }
    }
}

fn decode(path: &Path, raw: &[u8]) -> Result<Database, StoreError> {
    let corrupt = |message: String| StoreError::Corrupt {
        path: path.to_path_buf(),
        message,
    };

    let mut value: Value =
        serde_json::from_slice(raw).map_err(|err| corrupt(format!("invalid JSON: {err}")))?;
    let object = match &mut value {
        Value::Object(object) => object,
        Value::Null => return Err(corrupt("document is null".to_string())),
        _ => return Err(corrupt("top-level value is not an object".to_string())),
    };

    for key in COLLECTION_KEYS {
        if !object.contains_key(key) {
            warn!(
                target = TARGET,
                op = "store::load",
                collection = key,
                "Document has no such collection; treating it as empty"
            );
        }
    }

    let quarantined = Quarantined {
        products: set_aside::<ProductRecord>(object, "products"),
        orders: set_aside::<OrderRecord>(object, "orders"),
        leads: set_aside::<LeadRecord>(object, "leads"),
    };

    let mut document: Database = serde_json::from_value(value)
        .map_err(|err| corrupt(format!("unexpected shape: {err}")))?;
    document.quarantined = quarantined;
    Ok(document)
}

/// Pulls the members of `key` that do not decode as `T` out of the document.
fn set_aside<T: DeserializeOwned>(object: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    let Some(Value::Array(members)) = object.get_mut(key) else {
        return Vec::new();
    };

    let mut rejected = Vec::new();
    members.retain(|member| match T::deserialize(member) {
        Ok(_) => true,
        Err(err) => {
            warn!(
                target = TARGET,
                op = "store::load",
                collection = key,
                id = member.get("id").and_then(serde_json::Value::as_str).unwrap_or("<none>"),
                error = %err,
                "Record does not match its expected shape; setting it aside"
            );
            rejected.push(member.clone());
            false
        }
    });
    rejected
}

fn encode(document: &Database) -> Result<Vec<u8>, StoreError> {
    let mut bytes = if document.quarantined.is_empty() {
        serde_json::to_vec_pretty(document)
    } else {
        serde_json::to_value(document).and_then(|mut value| {
            restore_quarantined(&mut value, &document.quarantined);
            serde_json::to_vec_pretty(&value)
        })
    }
    .map_err(StoreError::Serialize)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Appends set-aside records to the end of their collections.
fn restore_quarantined(value: &mut Value, quarantined: &Quarantined) {
    let collections = [
        ("products", &quarantined.products),
        ("orders", &quarantined.orders),
        ("leads", &quarantined.leads),
    ];
    for (key, records) in collections {
        if let Some(Value::Array(members)) = value.get_mut(key) {
            members.extend(records.iter().cloned());
        }
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = tempfile::Builder::new()
        .prefix(".document-")
        .suffix(".tmp")
        .tempfile_in(directory)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;

    if let Ok(existing) = std::fs::metadata(path) {
        staged.as_file().set_permissions(existing.permissions())?;
    }

    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}
