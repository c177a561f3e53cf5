use serde::{Deserialize, Serialize};

/// Ad ids marked for follow-up, in the order they were added.
///
/// Owned by the caller: operations consume the collection and hand back the
/// updated one, so nothing is retained between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorites {
    ids: Vec<String>,
}

impl Favorites {
    #[must_use]
    pub fn new(ids: Vec<String>) -> Self {
        let mut favorites = Self::default();
        for id in ids {
            favorites = favorites.with(&id);
        }
        favorites
    }

    /// Returns the collection with `id` appended. Blank and already-present
    /// ids leave it unchanged.
    #[must_use]
    pub fn with(mut self, id: &str) -> Self {
        let id = id.trim();
        if !id.is_empty() && !self.contains(id) {
            self.ids.push(id.to_string());
        }
        self
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
