use super::value::FilterSet;
use crate::core::constants::DEFAULT_HISTORY_CAPACITY;

/// Linear undo/redo history of filter sets.
///
/// The cursor points at the entry matching the current state. Pushing while
/// the cursor is behind the tail discards the redo branch; pushing a set
/// equal to the entry under the cursor is a no-op. Once `capacity` is
/// exceeded the oldest entry is dropped.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    entries: Vec<FilterSet>,
    cursor: Option<usize>,
    capacity: usize,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Record a deep copy of `filters`. Returns false when deduplicated.
    pub fn push(&mut self, filters: &FilterSet) -> bool {
        if let Some(cursor) = self.cursor {
            if self.entries[cursor] == *filters {
                return false;
            }
            self.entries.truncate(cursor + 1);
        }

        self.entries.push(filters.clone());
        if self.entries.len() > self.capacity {
            let overflow = self.entries.len() - self.capacity;
            self.entries.drain(..overflow);
        }
        self.cursor = Some(self.entries.len() - 1);
        true
    }

    /// Step back one entry and return it
    pub fn undo(&mut self) -> Option<&FilterSet> {
        match self.cursor {
            Some(cursor) if cursor > 0 => {
                self.cursor = Some(cursor - 1);
                self.entries.get(cursor - 1)
            }
            _ => None,
        }
    }

    /// Step forward one entry and return it
    pub fn redo(&mut self) -> Option<&FilterSet> {
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => {
                self.cursor = Some(cursor + 1);
                self.entries.get(cursor + 1)
            }
            _ => None,
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(cursor) if cursor + 1 < self.entries.len())
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&FilterSet> {
        self.cursor.and_then(|cursor| self.entries.get(cursor))
    }

    /// Cursor position; `None` while the history is empty
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterValue;

    fn crops(tokens: &[&str]) -> FilterSet {
        [("crop_types", FilterValue::categories(tokens.iter().copied()))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_empty_history() {
        let mut history = HistoryStack::new();
        assert_eq!(history.cursor(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_undo_redo_walk() {
        let mut history = HistoryStack::new();
        history.push(&crops(&["wheat"]));
        history.push(&crops(&["wheat", "barley"]));

        assert!(history.can_undo());
        assert_eq!(history.undo(), Some(&crops(&["wheat"])));
        assert!(!history.can_undo());
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(&crops(&["wheat", "barley"])));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_consecutive_duplicates_are_skipped() {
        let mut history = HistoryStack::new();
        assert!(history.push(&crops(&["canola"])));
        assert!(!history.push(&crops(&["canola"])));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_push_prunes_redo_branch() {
        let mut history = HistoryStack::new();
        history.push(&crops(&["a"]));
        history.push(&crops(&["b"]));
        history.push(&crops(&["c"]));
        history.undo();
        history.undo();

        history.push(&crops(&["d"]));
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), Some(1));
        assert!(!history.can_redo());
        assert_eq!(history.undo(), Some(&crops(&["a"])));
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = HistoryStack::with_capacity(3);
        for token in ["a", "b", "c", "d", "e"] {
            history.push(&crops(&[token]));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert_eq!(history.current(), Some(&crops(&["e"])));
        history.undo();
        assert_eq!(history.undo(), Some(&crops(&["c"])));
        assert!(!history.can_undo());
    }
}
