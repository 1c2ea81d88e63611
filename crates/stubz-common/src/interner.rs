//! String interner for index names.
//!
//! Short names contributed to secondary indices (class names, method names,
//! annotation names) repeat heavily across a project. Interning them into a
//! shared pool turns every stored value into a `u32` and makes value equality
//! an integer comparison.

use rustc_hash::{FxHashMap, FxHasher};
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// An interned string identifier.
///
/// Atoms are cheap to copy and compare; `ShardedInterner::resolve` gives the
/// text back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// The empty string.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

const SHARD_BITS: u32 = 6;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

/// Names that show up in nearly every Java project.
const COMMON_NAMES: &[&str] = &[
    "Object",
    "String",
    "Integer",
    "Long",
    "Boolean",
    "Class",
    "Enum",
    "Exception",
    "RuntimeException",
    "Throwable",
    "Runnable",
    "Iterable",
    "Comparable",
    "List",
    "Map",
    "Set",
    "Collection",
    "Override",
    "Deprecated",
    "SuppressWarnings",
    "FunctionalInterface",
    "Nullable",
    "NotNull",
    "Test",
    "Builder",
    "Impl",
    "main",
    "run",
    "get",
    "set",
    "equals",
    "hashCode",
    "toString",
    "compareTo",
    "iterator",
    "size",
    "isEmpty",
    "values",
    "valueOf",
    "getName",
    "getValue",
    "LOG",
    "INSTANCE",
    "serialVersionUID",
];

/// One shard's strings. `strings[i]` is the text of local index `i`.
#[derive(Default)]
struct Shard {
    ids: FxHashMap<Arc<str>, u32>,
    strings: Vec<Arc<str>>,
}

impl Shard {
    fn push(&mut self, text: Arc<str>) -> u32 {
        let local = self.strings.len() as u32;
        self.strings.push(text.clone());
        self.ids.insert(text, local);
        local
    }
}

/// Concurrent interner shared by indexing workers.
///
/// The shard is picked from the string hash and stored in the low
/// `SHARD_BITS` of the atom, so resolving never searches. Local slot 0 of
/// shard 0 holds the empty string, which makes `Atom(0)` the empty atom.
pub struct ShardedInterner {
    shards: [RwLock<Shard>; SHARD_COUNT],
}

impl ShardedInterner {
    pub fn new() -> Self {
        let mut first = Shard::default();
        first.push(Arc::from(""));
        let mut first = Some(first);
        let shards = std::array::from_fn(|_| RwLock::new(first.take().unwrap_or_default()));
        ShardedInterner { shards }
    }

    /// Atom for `text`, adding it on first sight.
    ///
    /// A poisoned shard or an exhausted shard yields `Atom::NONE`.
    pub fn intern(&self, text: &str) -> Atom {
        if text.is_empty() {
            return Atom::NONE;
        }
        let shard = Self::shard_of(text);
        if let Some(atom) = self.lookup(shard, text) {
            return atom;
        }

        let Ok(mut state) = self.shards[shard].write() else {
            return Atom::NONE;
        };
        // Lost the race between dropping the read lock and taking the write lock.
        if let Some(&local) = state.ids.get(text) {
            return Self::atom(shard, local);
        }
        if state.strings.len() as u32 > (u32::MAX >> SHARD_BITS) {
            return Atom::NONE;
        }
        let local = state.push(Arc::from(text));
        Self::atom(shard, local)
    }

    /// Atom for `text` if it was interned before.
    pub fn get(&self, text: &str) -> Option<Atom> {
        if text.is_empty() {
            return Some(Atom::NONE);
        }
        self.lookup(Self::shard_of(text), text)
    }

    fn lookup(&self, shard: usize, text: &str) -> Option<Atom> {
        let state = self.shards[shard].read().ok()?;
        state.ids.get(text).map(|&local| Self::atom(shard, local))
    }

    /// Text of `atom`; unknown atoms give the empty string.
    pub fn resolve(&self, atom: Atom) -> Arc<str> {
        self.try_resolve(atom).unwrap_or_else(|| Arc::from(""))
    }

    pub fn try_resolve(&self, atom: Atom) -> Option<Arc<str>> {
        let shard = (atom.0 & SHARD_MASK) as usize;
        let local = (atom.0 >> SHARD_BITS) as usize;
        let state = self.shards[shard].read().ok()?;
        state.strings.get(local).cloned()
    }

    /// Number of distinct strings, the empty string included.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .filter_map(|shard| shard.read().ok().map(|state| state.strings.len()))
            .sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-intern names that show up in nearly every Java project.
    pub fn intern_common(&self) {
        for name in COMMON_NAMES {
            self.intern(name);
        }
    }

    #[inline]
    fn shard_of(text: &str) -> usize {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        (hasher.finish() as usize) & (SHARD_COUNT - 1)
    }

    #[inline]
    fn atom(shard: usize, local: u32) -> Atom {
        Atom((local << SHARD_BITS) | (shard as u32 & SHARD_MASK))
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}
