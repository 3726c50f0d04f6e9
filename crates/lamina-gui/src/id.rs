use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Identity of an interactive element, stable across frames as long as the
/// same window title / label / index path is used.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Id(u64);

impl Id {
    pub fn new(source: impl Hash) -> Self {
        let mut h = DefaultHasher::new();
        source.hash(&mut h);
        Self(h.finish())
    }

    /// Child id; `with` is hashed together with this id.
    pub fn with(self, child: impl Hash) -> Self {
        let mut h = DefaultHasher::new();
        self.0.hash(&mut h);
        child.hash(&mut h);
        Self(h.finish())
    }
}
