//! Generic scrollable list with a cursor, shared by the album and song panes.

pub struct ScrollableList<T> {
    pub items: Vec<T>,
    pub selected: usize,
    pub scroll_offset: usize,
}

impl<T> Default for ScrollableList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            scroll_offset: 0,
        }
    }
}

impl<T> ScrollableList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the items, keeping the cursor on an equal item if one survives.
    pub fn set_items_keep<K: PartialEq>(&mut self, items: Vec<T>, key: impl Fn(&T) -> K) {
        let old = self.selected_item().map(&key);
        self.items = items;
        self.selected = old
            .and_then(|k| self.items.iter().position(|item| key(item) == k))
            .unwrap_or(0);
        self.clamp();
    }

    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.selected = 0;
        self.scroll_offset = 0;
    }

    fn clamp(&mut self) {
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
        if self.scroll_offset > self.selected {
            self.scroll_offset = self.selected;
        }
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + n).min(self.items.len() - 1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }

    /// Move the cursor to `idx` if it is in range.
    pub fn select(&mut self, idx: usize) {
        if idx < self.items.len() {
            self.selected = idx;
        }
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.items.get(self.selected)
    }

    pub fn selected_index(&self) -> Option<usize> {
        (self.selected < self.items.len()).then_some(self.selected)
    }

    /// Returns (index, &item) pairs visible in `height` rows.
    /// Call ensure_visible first to update scroll_offset.
    pub fn visible_items(&self, height: usize) -> Vec<(usize, &T)> {
        if height == 0 || self.items.is_empty() {
            return Vec::new();
        }
        let start = self.scroll_offset.min(self.items.len());
        let end = (start + height).min(self.items.len());
        (start..end).map(|i| (i, &self.items[i])).collect()
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// Handle a click at `row` within the rendered area.
    /// Returns the clicked item's index.
    pub fn handle_click(&mut self, row: usize) -> Option<usize> {
        let target = self.scroll_offset + row;
        if target < self.items.len() {
            self.selected = target;
            return Some(target);
        }
        None
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> ScrollableList<usize> {
        let mut l = ScrollableList::new();
        l.set_items((0..n).collect());
        l
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut l = list(3);
        l.select_down(10);
        assert_eq!(l.selected, 2);
        l.select_up(10);
        assert_eq!(l.selected, 0);

        let mut empty: ScrollableList<usize> = ScrollableList::new();
        empty.select_down(1);
        assert_eq!(empty.selected_index(), None);
    }

    #[test]
    fn scroll_follows_cursor() {
        let mut l = list(20);
        l.select(12);
        l.ensure_visible(5);
        assert_eq!(l.scroll_offset, 8);
        let visible: Vec<usize> = l.visible_items(5).into_iter().map(|(i, _)| i).collect();
        assert_eq!(visible, vec![8, 9, 10, 11, 12]);

        l.select_first();
        l.ensure_visible(5);
        assert_eq!(l.scroll_offset, 0);
    }

    #[test]
    fn click_maps_row_through_scroll_offset() {
        let mut l = list(20);
        l.scroll_offset = 4;
        assert_eq!(l.handle_click(2), Some(6));
        assert_eq!(l.selected, 6);
        assert_eq!(l.handle_click(30), None);
        assert_eq!(l.selected, 6);
    }

    #[test]
    fn replacing_items_keeps_matching_selection() {
        let mut l = ScrollableList::new();
        l.set_items(vec!["a", "b", "c"]);
        l.select(2);
        l.set_items_keep(vec!["c", "a"], |s| *s);
        assert_eq!(l.selected_item(), Some(&"c"));

        l.set_items_keep(vec!["x"], |s| *s);
        assert_eq!(l.selected, 0);
    }
}
