//! Scrollable list state for the terminal table.
//!
//! Tracks the focused row and the first row on screen. This is the
//! terminal's side of `aisview::Viewport`: it tells the projector which
//! rows are currently visible.

use aisview::Viewport;
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    len: usize,
    height: usize,
    focus: usize,
    offset: usize,
}

impl ListState {
    pub fn new(height: usize) -> ListState {
        ListState {
            height,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_height(&mut self, height: usize) {
        self.height = height;
        self.follow_focus();
    }

    /// Accounts for a row inserted at `row`. Rows already on screen stay
    /// put, and the focus stays on the same vessel.
    pub fn on_insert(&mut self, row: usize) {
        self.len += 1;
        if self.len > 1 && row <= self.focus {
            self.focus += 1;
        }
        if row < self.offset {
            self.offset += 1;
        }
        self.follow_focus();
    }

    pub fn up(&mut self, n: usize) {
        self.focus = self.focus.saturating_sub(n);
        self.follow_focus();
    }

    pub fn down(&mut self, n: usize) {
        self.focus = (self.focus + n).min(self.len.saturating_sub(1));
        self.follow_focus();
    }

    pub fn page_up(&mut self) {
        self.up(self.height.max(1));
    }

    pub fn page_down(&mut self) {
        self.down(self.height.max(1));
    }

    pub fn home(&mut self) {
        self.focus = 0;
        self.follow_focus();
    }

    pub fn end(&mut self) {
        self.focus = self.len.saturating_sub(1);
        self.follow_focus();
    }

    /// Scrolls just enough to keep the focused row on screen.
    fn follow_focus(&mut self) {
        if self.focus < self.offset {
            self.offset = self.focus;
        } else if self.height > 0 && self.focus >= self.offset + self.height {
            self.offset = self.focus + 1 - self.height;
        }
    }
}

impl Viewport for ListState {
    fn visible_rows(&self) -> Range<usize> {
        let end = (self.offset + self.height).min(self.len);
        self.offset.min(end)..end
    }
}

/// Lays `cells` out in equal-width columns separated by one space,
/// truncating or padding each cell, to fill exactly `width` characters.
pub fn format_row<S: AsRef<str>>(cells: &[S], width: usize) -> String {
    if cells.is_empty() || width == 0 {
        return " ".repeat(width);
    }
    let dividers = cells.len() - 1;
    let column = (width.saturating_sub(dividers) / cells.len()).max(1);
    let mut line = String::with_capacity(width);
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        let text: String = cell.as_ref().chars().take(column).collect();
        line.push_str(&format!("{:<column$}", text));
    }
    let mut line: String = line.chars().take(width).collect();
    let pad = width.saturating_sub(line.chars().count());
    line.push_str(&" ".repeat(pad));
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(len: usize, height: usize) -> ListState {
        let mut list = ListState::new(height);
        for row in 0..len {
            list.on_insert(row);
        }
        list
    }

    #[test]
    fn visible_window() {
        let list = filled(3, 10);
        assert_eq!(list.visible_rows(), 0..3);
        assert_eq!(ListState::new(10).visible_rows(), 0..0);
        assert_eq!(filled(30, 10).visible_rows(), 0..10);
    }

    #[test]
    fn scrolling_follows_focus() {
        let mut list = filled(30, 10);
        list.down(12);
        assert_eq!(list.focus(), 12);
        assert_eq!(list.visible_rows(), 3..13);
        list.page_down();
        assert_eq!(list.visible_rows(), 13..23);
        list.end();
        assert_eq!(list.focus(), 29);
        assert_eq!(list.visible_rows(), 20..30);
        list.up(25);
        assert_eq!(list.visible_rows(), 4..14);
        list.home();
        assert_eq!(list.visible_rows(), 0..10);
        list.up(1);
        assert_eq!(list.focus(), 0);
    }

    #[test]
    fn insert_above_keeps_screen() {
        let mut list = filled(30, 10);
        list.down(15);
        let before = list.visible_rows();
        list.on_insert(0);
        assert_eq!(list.focus(), 16);
        assert_eq!(list.visible_rows(), before.start + 1..before.end + 1);
        list.on_insert(29);
        assert_eq!(list.focus(), 16);
        assert_eq!(list.len(), 32);
    }

    #[test]
    fn shrinking_terminal() {
        let mut list = filled(30, 10);
        list.down(9);
        list.set_height(5);
        assert_eq!(list.visible_rows(), 5..10);
        list.set_height(0);
        assert!(list.visible_rows().is_empty());
    }

    #[test]
    fn row_layout() {
        assert_eq!(format_row(&["ab", "cdef"], 7), "ab  cde");
        assert_eq!(format_row(&["a", "b", "c"], 11), "a   b   c  ");
        assert_eq!(format_row::<&str>(&[], 3), "   ");
        assert_eq!(format_row(&["x"; 4], 3).chars().count(), 3);
    }
}
