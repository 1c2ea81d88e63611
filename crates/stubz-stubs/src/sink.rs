//! Index occurrences contributed by stubs.

use crate::stub::{StubId, StubTree};
use serde::Serialize;
use stubz_common::{Atom, ShardedInterner};

/// Secondary index a stub can contribute to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum IndexKey {
    ShortClassName,
    /// Keyed by `name_hash` of the qualified name, never the string.
    FullClassNameHash,
    AnonymousBaseRef,
    MethodName,
    FieldName,
    AnnotationName,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IndexValue {
    Name(Atom),
    Hash(i32),
}

/// Receives the occurrences of one stub at a time.
pub trait IndexSink {
    /// Intern a short name for use in `IndexValue::Name`.
    fn intern(&mut self, name: &str) -> Atom;

    fn occurrence(&mut self, key: IndexKey, value: IndexValue);

    fn name_occurrence(&mut self, key: IndexKey, name: &str) {
        let atom = self.intern(name);
        self.occurrence(key, IndexValue::Name(atom));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub key: IndexKey,
    pub value: IndexValue,
    pub stub: StubId,
}

/// Sink that records occurrences in memory, tagged with the current stub.
pub struct OccurrenceCollector<'a> {
    interner: &'a ShardedInterner,
    current: StubId,
    occurrences: Vec<Occurrence>,
}

impl<'a> OccurrenceCollector<'a> {
    pub fn new(interner: &'a ShardedInterner) -> OccurrenceCollector<'a> {
        OccurrenceCollector {
            interner,
            current: StubId::ROOT,
            occurrences: Vec::new(),
        }
    }

    pub fn set_current(&mut self, stub: StubId) {
        self.current = stub;
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn into_occurrences(self) -> Vec<Occurrence> {
        self.occurrences
    }
}

impl IndexSink for OccurrenceCollector<'_> {
    fn intern(&mut self, name: &str) -> Atom {
        self.interner.intern(name)
    }

    fn occurrence(&mut self, key: IndexKey, value: IndexValue) {
        self.occurrences.push(Occurrence {
            key,
            value,
            stub: self.current,
        });
    }
}

/// Run every stub of `stubs` through its element type's `index_stub`.
pub fn index_stub_tree(stubs: &StubTree, interner: &ShardedInterner) -> Vec<Occurrence> {
    let registry = crate::element_type::registry();
    let mut collector = OccurrenceCollector::new(interner);
    for id in stubs.ids() {
        let Some(data) = stubs.data(id) else {
            continue;
        };
        collector.set_current(id);
        registry.get(data.kind()).index_stub(data, &mut collector);
    }
    collector.into_occurrences()
}
