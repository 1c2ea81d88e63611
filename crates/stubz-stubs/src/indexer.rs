//! Background indexing of stub trees.
//!
//! Each file is handled by one worker at a time: build the stub tree, encode
//! it, collect its index occurrences, then hand the stage to the single
//! writer. Nothing is shared between files except the interner and the
//! writer.

use crate::builder::{Cancellation, build_light_stub_tree, build_stub_tree};
use crate::config::IndexerConfig;
use crate::element_type::registry;
use crate::error::IndexError;
use crate::index::{FileId, StubIndex};
use crate::serializer::serialize_stub_tree;
use crate::sink::index_stub_tree;
use crate::store::{PersistentStore, StagedStubTree, StubIndexWriter};
use crate::stub::StubTree;
use rayon::prelude::*;
use std::sync::Arc;
use stubz_common::ShardedInterner;
use stubz_tree::{LightTree, SyntaxTree};
use tracing::{debug, warn};

pub struct Indexer {
    config: IndexerConfig,
    interner: Arc<ShardedInterner>,
    writer: Arc<StubIndexWriter>,
    pool: Option<rayon::ThreadPool>,
}

impl Indexer {
    pub fn new(config: IndexerConfig, store: Arc<dyn PersistentStore>) -> Result<Indexer, IndexError> {
        let interner = Arc::new(ShardedInterner::new());
        if config.intern_common_names {
            interner.intern_common();
        }
        let version = registry().cumulative_version(config.stub_version_salt);
        let writer = Arc::new(StubIndexWriter::new(store, Arc::new(StubIndex::new()), version));
        let pool = match config.worker_threads {
            Some(threads) => Some(rayon::ThreadPoolBuilder::new().num_threads(threads).build()?),
            None => None,
        };
        debug!(version, workers = ?config.worker_threads, "indexer ready");
        Ok(Indexer {
            config,
            interner,
            writer,
            pool,
        })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Cumulative version written into every stored stub tree.
    pub fn version(&self) -> u32 {
        self.writer.version()
    }

    pub fn interner(&self) -> &Arc<ShardedInterner> {
        &self.interner
    }

    pub fn writer(&self) -> &Arc<StubIndexWriter> {
        &self.writer
    }

    pub fn index(&self) -> &Arc<StubIndex> {
        self.writer.index()
    }

    /// Apply indexer settings to a freshly opened syntax tree.
    pub fn configure_tree(&self, tree: SyntaxTree) -> SyntaxTree {
        tree.with_length_verification(self.config.verify_length_conservation)
    }

    fn stage(&self, file: FileId, stubs: &StubTree) -> StagedStubTree {
        let bytes = serialize_stub_tree(stubs, self.version());
        let occurrences = index_stub_tree(stubs, &self.interner);
        StagedStubTree::new(file, bytes, occurrences)
    }

    /// Build and encode the stub tree of a light tree without publishing it.
    pub fn stage_light(
        &self,
        file: FileId,
        tree: &LightTree,
        cancel: &dyn Cancellation,
    ) -> Result<StagedStubTree, IndexError> {
        let stubs = build_light_stub_tree(tree, cancel)?;
        Ok(self.stage(file, &stubs))
    }

    /// Build and encode the stub tree of a full syntax tree without
    /// publishing it.
    pub fn stage_tree(
        &self,
        file: FileId,
        tree: &SyntaxTree,
        cancel: &dyn Cancellation,
    ) -> Result<StagedStubTree, IndexError> {
        let stubs = build_stub_tree(tree, cancel)?;
        Ok(self.stage(file, &stubs))
    }

    fn publish(
        &self,
        staged: Result<StagedStubTree, IndexError>,
        cancel: &dyn Cancellation,
    ) -> Result<(), IndexError> {
        let staged = staged?;
        // Invalidated after the walk finished: drop the stage.
        if cancel.is_cancelled() {
            return Err(IndexError::Cancelled);
        }
        self.writer.commit(staged)
    }

    /// Index one file from its light tree.
    pub fn index_file(
        &self,
        file: FileId,
        tree: &LightTree,
        cancel: &dyn Cancellation,
    ) -> Result<(), IndexError> {
        self.publish(self.stage_light(file, tree, cancel), cancel)
    }

    /// Index one file from a full syntax tree.
    pub fn index_syntax_tree(
        &self,
        file: FileId,
        tree: &SyntaxTree,
        cancel: &dyn Cancellation,
    ) -> Result<(), IndexError> {
        self.publish(self.stage_tree(file, tree, cancel), cancel)
    }

    /// Index many files on the indexer's pool. One failing file never stops
    /// the others; results come back in input order.
    pub fn index_files_parallel(
        &self,
        files: &[(FileId, LightTree)],
        cancel: &dyn Cancellation,
    ) -> Vec<(FileId, Result<(), IndexError>)> {
        let run = || {
            files
                .par_iter()
                .map(|(file, tree)| (*file, self.index_file(*file, tree, cancel)))
                .collect::<Vec<_>>()
        };
        let results = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        let failed = results.iter().filter(|(_, r)| r.is_err()).count();
        if failed > 0 {
            warn!(files = files.len(), failed, "parallel indexing finished with failures");
        } else {
            debug!(files = files.len(), "parallel indexing finished");
        }
        results
    }

    /// Committed stub tree of `file`, or `None` when it is not indexed.
    pub fn stub_tree(&self, file: FileId) -> Option<StubTree> {
        self.writer.stub_tree(file)
    }

    pub fn schedule_reindex(&self, file: FileId) {
        self.writer.schedule_reindex(file);
    }

    pub fn files_to_reindex(&self) -> Vec<FileId> {
        self.writer.files_to_reindex()
    }
}
