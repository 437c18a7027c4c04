// SPDX-License-Identifier: GPL-3.0-only

//! Per-view storage indexed by view number
//!
//! Pre-sized to the expected view count so the frame loop does not reallocate.
//! Entries are only ever appended; the view count never shrinks.

use tracing::info;

/// Arena of per-view entries
#[derive(Debug, Clone, PartialEq)]
pub struct ViewArena<T> {
    entries: Vec<T>,
    capacity_hint: usize,
}

impl<T: Default> ViewArena<T> {
    /// Create an empty arena with room for `max_views` entries
    pub fn with_capacity(max_views: usize) -> Self {
        Self {
            entries: Vec::with_capacity(max_views),
            capacity_hint: max_views,
        }
    }

    /// Append default entries until `view` exists, returning it
    pub fn ensure(&mut self, view: usize) -> &mut T {
        if view >= self.entries.len() {
            if view >= self.capacity_hint {
                info!(
                    view,
                    capacity = self.capacity_hint,
                    "View index beyond pre-allocated arena, growing"
                );
                self.capacity_hint = view + 1;
            }
            self.entries.resize_with(view + 1, T::default);
        }
        &mut self.entries[view]
    }
}

impl<T> ViewArena<T> {
    /// Entry for `view`, if it has been created
    pub fn get(&self, view: usize) -> Option<&T> {
        self.entries.get(view)
    }

    /// Number of views created so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no view has been created yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in view order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_grows_monotonically() {
        let mut arena: ViewArena<u32> = ViewArena::with_capacity(2);
        assert!(arena.is_empty());

        *arena.ensure(1) = 7;
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(0), Some(&0));
        assert_eq!(arena.get(1), Some(&7));

        // Asking for a lower index never shrinks
        arena.ensure(0);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_ensure_beyond_capacity() {
        let mut arena: ViewArena<u8> = ViewArena::with_capacity(1);
        arena.ensure(3);
        assert_eq!(arena.len(), 4);
        assert_eq!(arena.get(4), None);
    }
}
