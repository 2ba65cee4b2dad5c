//! Persisted key-value collaborator
//!
//! The credential store only needs two things from persistence: a consistent
//! snapshot of a handful of keys, and atomic batches of edits. `KeyValueStore`
//! is that seam. `MemoryStore` keeps everything in process; `FileStore` keeps
//! a JSON object on disk and rewrites it atomically (temp file + rename) on
//! every batch, so a crash never leaves a token paired with a stale expiry.

use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Boxed future returned by `KeyValueStore` methods, keeping the trait dyn-compatible.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// A single change within an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Put(String, String),
    Remove(String),
    Clear,
}

impl Edit {
    pub fn put(key: &str, value: impl Into<String>) -> Self {
        Edit::Put(key.to_string(), value.into())
    }

    pub fn remove(key: &str) -> Self {
        Edit::Remove(key.to_string())
    }
}

/// Storage backend for the credential triple.
///
/// Implementations must make `apply` atomic with respect to `read`: a reader
/// sees either none or all of a batch.
pub trait KeyValueStore: Send + Sync {
    /// Read several keys from one consistent snapshot, in the order given.
    fn read<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, Vec<Option<String>>>;

    /// Apply a batch of edits atomically.
    fn apply(&self, edits: Vec<Edit>) -> StoreFuture<'_, ()>;
}

fn apply_edits(state: &mut HashMap<String, String>, edits: Vec<Edit>) {
    for edit in edits {
        match edit {
            Edit::Put(key, value) => {
                state.insert(key, value);
            }
            Edit::Remove(key) => {
                state.remove(&key);
            }
            Edit::Clear => state.clear(),
        }
    }
}

fn snapshot(state: &HashMap<String, String>, keys: &[&str]) -> Vec<Option<String>> {
    keys.iter().map(|key| state.get(*key).cloned()).collect()
}

/// In-process store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, Vec<Option<String>>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(snapshot(&state, keys))
        })
    }

    fn apply(&self, edits: Vec<Edit>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            apply_edits(&mut state, edits);
            Ok(())
        })
    }
}

/// JSON file store.
///
/// The in-memory map is the read path; the Mutex serializes writes so the
/// file and the map never disagree.
pub struct FileStore {
    path: PathBuf,
    state: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// If the file doesn't exist it is created as `{}`: a fresh install has no
    /// credential and will obtain one on first use.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let state = if path.exists() {
            let contents = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| Error::Storage(format!("reading credential file: {e}")))?;
            let entries: HashMap<String, String> = serde_json::from_str(&contents)
                .map_err(|e| Error::Storage(format!("parsing credential file: {e}")))?;
            info!(path = %path.display(), keys = entries.len(), "loaded credential file");
            entries
        } else {
            info!(path = %path.display(), "credential file not found, starting empty");
            let entries = HashMap::new();
            write_atomic(&path, &entries).await?;
            entries
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn read<'a>(&'a self, keys: &'a [&'a str]) -> StoreFuture<'a, Vec<Option<String>>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok(snapshot(&state, keys))
        })
    }

    fn apply(&self, edits: Vec<Edit>) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let mut next = state.clone();
            apply_edits(&mut next, edits);
            // Disk first: a failed write leaves memory matching the old file.
            write_atomic(&self.path, &next).await?;
            *state = next;
            Ok(())
        })
    }
}

/// Write the map to `path` atomically with 0600 permissions on unix.
///
/// Every write gets its own randomly named temp file next to `path`, so
/// stores sharing a directory never rename each other's data.
async fn write_atomic(path: &Path, data: &HashMap<String, String>) -> Result<()> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| Error::Storage(format!("serializing credential file: {e}")))?;

    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        Some(_) => PathBuf::from("."),
        None => return Err(Error::Storage("credential path has no parent directory".into())),
    };
    let target = path.to_path_buf();

    tokio::task::spawn_blocking(move || persist_in(&dir, &target, json.as_bytes()))
        .await
        .map_err(|e| Error::Storage(format!("credential write task failed: {e}")))??;

    debug!(path = %path.display(), "persisted credential file");
    Ok(())
}

fn persist_in(dir: &Path, target: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".sensimity.")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| Error::Storage(format!("creating temp credential file: {e}")))?;

    tmp.write_all(contents)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| Error::Storage(format!("writing temp credential file: {e}")))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tmp.as_file()
            .set_permissions(perms)
            .map_err(|e| Error::Storage(format!("setting credential file permissions: {e}")))?;
    }

    tmp.persist(target)
        .map_err(|e| Error::Storage(format!("renaming temp credential file: {}", e.error)))?;
    Ok(())
}
