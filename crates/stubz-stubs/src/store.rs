//! Persistent stub storage and the single index writer.
//!
//! Workers build and encode stub trees without any shared lock, producing a
//! `StagedStubTree`. Only `StubIndexWriter::commit` publishes a stage: the
//! stored bytes and the secondary index change together under the writer
//! lock. A stage that is dropped uncommitted leaves no trace, so a file's
//! stored stub tree is always the previous or the latest complete one.

use crate::error::{DecodeError, IndexError};
use crate::index::{FileId, StubIndex};
use crate::serializer::deserialize_stub_tree;
use crate::sink::Occurrence;
use crate::stub::StubTree;
use dashmap::DashMap;
use rustc_hash::FxHashSet;
use std::sync::{Arc, Mutex, PoisonError};
use stubz_tree::lock_order::BroaderLockScope;
use tracing::{debug, warn};

/// Opaque `FileId -> bytes` storage.
pub trait PersistentStore: Send + Sync {
    fn get(&self, file: FileId) -> Option<Arc<[u8]>>;

    /// Replace the bytes of `file` in one step.
    fn put(&self, file: FileId, bytes: Arc<[u8]>) -> Result<(), IndexError>;

    fn remove(&self, file: FileId) -> Result<(), IndexError>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<FileId, Arc<[u8]>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, file: FileId) -> Option<Arc<[u8]>> {
        self.entries.get(&file).map(|bytes| bytes.clone())
    }

    fn put(&self, file: FileId, bytes: Arc<[u8]>) -> Result<(), IndexError> {
        self.entries.insert(file, bytes);
        Ok(())
    }

    fn remove(&self, file: FileId) -> Result<(), IndexError> {
        self.entries.remove(&file);
        Ok(())
    }
}

/// A fully built, encoded stub tree that has not been published yet.
#[derive(Debug)]
#[must_use = "a staged stub tree is discarded unless committed"]
pub struct StagedStubTree {
    file: FileId,
    bytes: Arc<[u8]>,
    occurrences: Vec<Occurrence>,
}

impl StagedStubTree {
    pub fn new(file: FileId, bytes: Vec<u8>, occurrences: Vec<Occurrence>) -> StagedStubTree {
        StagedStubTree {
            file,
            bytes: Arc::from(bytes),
            occurrences,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }
}

pub struct StubIndexWriter {
    store: Arc<dyn PersistentStore>,
    index: Arc<StubIndex>,
    version: u32,
    write_lock: Mutex<()>,
    reindex: Mutex<FxHashSet<FileId>>,
}

impl StubIndexWriter {
    pub fn new(store: Arc<dyn PersistentStore>, index: Arc<StubIndex>, version: u32) -> Self {
        StubIndexWriter {
            store,
            index,
            version,
            write_lock: Mutex::new(()),
            reindex: Mutex::new(FxHashSet::default()),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn index(&self) -> &Arc<StubIndex> {
        &self.index
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }

    /// Publish a stage. On a store failure nothing changes.
    pub fn commit(&self, staged: StagedStubTree) -> Result<(), IndexError> {
        let _scope = BroaderLockScope::enter("index writer");
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.put(staged.file, staged.bytes.clone())?;
        self.index.replace_file(staged.file, &staged.occurrences);
        self.reindex_set().remove(&staged.file);
        debug!(
            file_id = staged.file.0,
            bytes = staged.bytes.len(),
            occurrences = staged.occurrences.len(),
            "stub tree committed"
        );
        Ok(())
    }

    pub fn remove_file(&self, file: FileId) -> Result<(), IndexError> {
        let _scope = BroaderLockScope::enter("index writer");
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.store.remove(file)?;
        self.index.remove_file(file);
        self.reindex_set().remove(&file);
        Ok(())
    }

    /// Decode the committed stub tree of `file`.
    ///
    /// `Ok(None)` when the file has never been committed. A decode failure
    /// marks the file for re-indexing and is returned to the caller, who
    /// treats the file as not indexed.
    pub fn try_stub_tree(&self, file: FileId) -> Result<Option<StubTree>, DecodeError> {
        let Some(bytes) = self.store.get(file) else {
            return Ok(None);
        };
        match deserialize_stub_tree(&bytes, self.version) {
            Ok(stubs) => Ok(Some(stubs)),
            Err(err) => {
                warn!(file_id = file.0, error = %err, "stored stub tree unreadable, scheduling re-index");
                self.reindex_set().insert(file);
                Err(err)
            }
        }
    }

    /// Like `try_stub_tree`, folding decode failures into `None`.
    pub fn stub_tree(&self, file: FileId) -> Option<StubTree> {
        self.try_stub_tree(file).ok().flatten()
    }

    /// Files whose stored stub tree failed to decode since they were last
    /// committed, sorted.
    pub fn files_to_reindex(&self) -> Vec<FileId> {
        let mut files: Vec<FileId> = self.reindex_set().iter().copied().collect();
        files.sort_unstable();
        files
    }

    pub fn schedule_reindex(&self, file: FileId) {
        self.reindex_set().insert(file);
    }

    fn reindex_set(&self) -> std::sync::MutexGuard<'_, FxHashSet<FileId>> {
        self.reindex.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
