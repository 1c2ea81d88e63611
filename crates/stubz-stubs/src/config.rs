use serde::Deserialize;

fn default_true() -> bool {
    true
}

/// Indexer settings. Every field is optional in the JSON form.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexerConfig {
    /// Size of the indexing thread pool; rayon's default when unset.
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Warn when an expanded chameleon's children do not cover its text.
    #[serde(default = "default_true")]
    pub verify_length_conservation: bool,
    /// Pre-intern frequent names before the first file is indexed.
    #[serde(default = "default_true")]
    pub intern_common_names: bool,
    /// Added to the cumulative stub version to force a full re-index.
    #[serde(default)]
    pub stub_version_salt: u32,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            worker_threads: None,
            verify_length_conservation: true,
            intern_common_names: true,
            stub_version_salt: 0,
        }
    }
}
