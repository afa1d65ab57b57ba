//! Per-user interaction state (likes, favorites)

use forum_api::{LikeRecord, PostId};
use std::collections::HashMap;

/// `post_id -> bool` record of the signed-in user's interactions.
/// A post absent from the map is treated as not interacted with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionMap {
    entries: HashMap<PostId, bool>,
}

/// Posts the signed-in user has liked
pub type LikeMap = InteractionMap;

/// Posts the signed-in user has favorited, as reported by the backend
pub type FavoriteMap = InteractionMap;

impl InteractionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the like mapping from the backend's per-user like list
    pub fn from_likes(records: &[LikeRecord]) -> Self {
        Self {
            entries: records.iter().map(|r| (r.post_id, true)).collect(),
        }
    }

    pub fn is_set(&self, post_id: PostId) -> bool {
        self.entries.get(&post_id).copied().unwrap_or(false)
    }

    pub fn set(&mut self, post_id: PostId, value: bool) {
        self.entries.insert(post_id, value);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids currently set to true
    pub fn active(&self) -> impl Iterator<Item = PostId> + '_ {
        self.entries
            .iter()
            .filter(|(_, on)| **on)
            .map(|(id, _)| *id)
    }
}
