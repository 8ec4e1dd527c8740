//! Per-request accumulation of named layout blocks.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Named, ordered markup collected while a page is assembled.
///
/// One registry exists per request: the chrome middleware seeds a fresh one
/// into request extensions and handlers clone the handle out, so clones share
/// the same request-local storage and nothing leaks between requests.
///
/// Body templates register entries top-down as they render; the layout
/// flushes each name exactly once where the block belongs. Flushing clears
/// the name, so a later registration starts a fresh sequence rather than
/// appending to history.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl BlockRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `content` to the block `name`, creating the block on first use.
    ///
    /// Names are case-sensitive: `"scripts"` and `"Scripts"` are distinct
    /// blocks.
    pub fn register(&self, name: &str, content: impl Into<String>) {
        let mut blocks = self.blocks.lock();
        blocks.entry(name.to_owned()).or_default().push(content.into());
    }

    /// Join everything registered under `name` with newlines, clear the
    /// block, and return the result.
    ///
    /// A name nothing was registered under flushes to `""`.
    #[must_use]
    pub fn flush(&self, name: &str) -> String {
        let mut blocks = self.blocks.lock();
        blocks
            .remove(name)
            .map_or_else(String::new, |entries| entries.join("\n"))
    }
}
