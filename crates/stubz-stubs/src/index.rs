//! In-memory secondary index over committed stub trees.
//!
//! Maps `(IndexKey, IndexValue)` to the stubs that contributed it. The index
//! remembers which keys each file contributed so a re-index only touches the
//! affected keys: stale occurrences of the file are dropped, new ones added,
//! and occurrences of other files are left alone.

use crate::sink::{IndexKey, IndexValue, Occurrence};
use crate::stub::StubId;
use dashmap::DashMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use stubz_common::{ShardedInterner, name_hash};
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StubLocation {
    pub file: FileId,
    pub stub: StubId,
}

type Entry = (IndexKey, IndexValue);

#[derive(Default)]
pub struct StubIndex {
    entries: DashMap<Entry, SmallVec<[StubLocation; 2]>>,
    by_file: DashMap<FileId, Vec<Entry>>,
}

impl StubIndex {
    pub fn new() -> StubIndex {
        StubIndex::default()
    }

    /// Replace everything `file` contributed with `occurrences`.
    ///
    /// Callers serialize updates (see `StubIndexWriter`); concurrent readers
    /// see each key either before or after the update.
    pub fn replace_file(&self, file: FileId, occurrences: &[Occurrence]) {
        let mut fresh: FxHashMap<Entry, SmallVec<[StubLocation; 2]>> = FxHashMap::default();
        for occurrence in occurrences {
            fresh
                .entry((occurrence.key, occurrence.value))
                .or_default()
                .push(StubLocation {
                    file,
                    stub: occurrence.stub,
                });
        }

        let stale = self.by_file.remove(&file).map(|(_, keys)| keys).unwrap_or_default();
        let mut dropped = 0usize;
        for entry in stale {
            if fresh.contains_key(&entry) {
                continue;
            }
            self.drop_file_from(entry, file);
            dropped += 1;
        }

        let keys: Vec<Entry> = fresh.keys().copied().collect();
        for (entry, locations) in fresh {
            let mut slot = self.entries.entry(entry).or_default();
            slot.retain(|loc| loc.file != file);
            slot.extend(locations);
        }
        trace!(file = file.0, dropped, keys = keys.len(), "index updated");
        if !keys.is_empty() {
            self.by_file.insert(file, keys);
        }
    }

    pub fn remove_file(&self, file: FileId) {
        if let Some((_, keys)) = self.by_file.remove(&file) {
            for entry in keys {
                self.drop_file_from(entry, file);
            }
        }
    }

    fn drop_file_from(&self, entry: Entry, file: FileId) {
        self.entries.remove_if_mut(&entry, |_, locations| {
            locations.retain(|loc| loc.file != file);
            locations.is_empty()
        });
    }

    pub fn get(&self, key: IndexKey, value: IndexValue) -> Vec<StubLocation> {
        self.entries
            .get(&(key, value))
            .map(|locations| locations.to_vec())
            .unwrap_or_default()
    }

    /// Look up a short-name key. Names never interned have no occurrences.
    pub fn get_by_name(
        &self,
        key: IndexKey,
        name: &str,
        interner: &ShardedInterner,
    ) -> Vec<StubLocation> {
        match interner.get(name) {
            Some(atom) => self.get(key, IndexValue::Name(atom)),
            None => Vec::new(),
        }
    }

    /// Candidates for a qualified class name. Hash collisions are possible;
    /// callers confirm against the stub's qualified name.
    pub fn get_by_qualified_name(&self, qualified_name: &str) -> Vec<StubLocation> {
        self.get(
            IndexKey::FullClassNameHash,
            IndexValue::Hash(name_hash(qualified_name)),
        )
    }

    pub fn files(&self) -> usize {
        self.by_file.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
