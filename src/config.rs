//! Loading `IndexerConfig` from JSON files.
//!
//! The file is plain JSON with `//` and `/* */` comments allowed. Every field
//! is optional; see `IndexerConfig` for the defaults.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use stubz_stubs::{Indexer, IndexerConfig, PersistentStore};
use tracing::debug;

pub fn parse_indexer_config(source: &str) -> Result<IndexerConfig> {
    let stripped = strip_comments(source);
    let config = serde_json::from_str(&stripped).context("failed to parse indexer config JSON")?;
    Ok(config)
}

pub fn load_indexer_config(path: &Path) -> Result<IndexerConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read indexer config: {}", path.display()))?;
    let config = parse_indexer_config(&source)
        .with_context(|| format!("failed to parse indexer config: {}", path.display()))?;
    debug!(path = %path.display(), ?config, "indexer config loaded");
    Ok(config)
}

/// Indexer over `store`, configured from `path` when given.
pub fn open_indexer(path: Option<&Path>, store: Arc<dyn PersistentStore>) -> Result<Indexer> {
    let config = match path {
        Some(path) => load_indexer_config(path)?,
        None => IndexerConfig::default(),
    };
    Indexer::new(config, store).context("failed to start indexer")
}

/// Blank out comments, keeping newlines so JSON error positions still match.
fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    prev = skipped;
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod config_tests;
