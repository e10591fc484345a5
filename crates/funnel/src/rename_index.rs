//! Per-build index from destination paths back to source paths

use ahash::AHashMap;
use funnel_core::path::normalize;
use tracing::warn;

/// Destination path -> source path, rebuilt at the start of every build
#[derive(Debug, Default)]
pub struct RenameIndex {
    namespace: String,
    entries: AHashMap<String, String>,
}

impl RenameIndex {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: normalize(namespace),
            entries: AHashMap::new(),
        }
    }

    /// Forget the previous build
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Record that `destination` is fed by `source`
    pub fn insert(&mut self, destination: impl Into<String>, source: impl Into<String>) {
        self.entries.insert(destination.into(), source.into());
    }

    /// Source path recorded for `destination`
    ///
    /// Tries the bare key, then the key with a leading `/`, then the key
    /// prefixed with the namespace.
    pub fn lookup(&self, destination: &str) -> Option<&str> {
        self.entries
            .get(destination)
            .or_else(|| self.entries.get(&format!("/{}", destination)))
            .or_else(|| {
                if self.namespace.is_empty() {
                    None
                } else {
                    self.entries
                        .get(&format!("{}/{}", self.namespace, destination))
                }
            })
            .map(String::as_str)
    }

    /// Like [`RenameIndex::lookup`], falling back to the projection root
    pub fn source_for(&self, destination: &str) -> &str {
        match self.lookup(destination) {
            Some(source) => source,
            None => {
                warn!(
                    destination = destination,
                    "no source recorded for destination, linking the projection root"
                );
                ""
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
