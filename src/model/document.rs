use ropey::Rope;
use std::ops::Range;

/// Text buffer behind the editor pane. `revision` bumps on every text change and is
/// what the rest of the app watches.
#[derive(Clone)]
pub struct DocumentState {
    pub rope: Rope,
    pub revision: u64,
    pub cursor: usize,
    pub selection: Option<Range<usize>>, // character indices
    pub selection_anchor: Option<usize>, // starting point for shift/drag selections
}

impl DocumentState {
    pub fn new_empty() -> Self {
        Self {
            rope: Rope::new(),
            revision: 0,
            cursor: 0,
            selection: None,
            selection_anchor: None,
        }
    }

    pub fn set_text(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.cursor = self.rope.len_chars();
        self.clear_selection();
        self.bump_revision();
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    pub fn set_cursor(&mut self, idx: usize) {
        self.cursor = idx.min(self.len_chars());
        self.clear_selection();
    }

    pub fn set_selection(&mut self, start: usize, end: usize) {
        let (lo, hi) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };
        let len = self.len_chars();
        self.selection = if lo == hi {
            None
        } else {
            Some(lo.min(len)..hi.min(len))
        };
        self.cursor = end.min(len);
        self.selection_anchor = Some(start.min(len));
    }

    /// Moves the cursor to `idx`, growing the selection from the current anchor.
    pub fn extend_selection_to(&mut self, idx: usize) {
        let anchor = self.selection_anchor.unwrap_or(self.cursor);
        self.set_selection(anchor, idx);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.selection_anchor = None;
    }

    pub fn selection_bytes(&self) -> Option<Range<usize>> {
        self.selection.clone().map(|r| self.char_range_to_bytes(r))
    }

    pub fn selected_text(&self) -> Option<String> {
        self.selection.clone().map(|r| self.slice_chars(r))
    }

    pub fn delete_selection(&mut self) -> Option<usize> {
        let range = self.selection.clone()?;
        self.delete_range(range.clone());
        self.cursor = range.start.min(self.len_chars());
        self.clear_selection();
        Some(self.cursor)
    }

    pub fn insert(&mut self, char_idx: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.rope.insert(char_idx.min(self.len_chars()), text);
        self.bump_revision();
        self.clear_selection();
    }

    pub fn delete_range(&mut self, range: Range<usize>) {
        if range.start >= range.end || range.end > self.rope.len_chars() {
            return;
        }
        self.rope.remove(range);
        self.bump_revision();
        self.cursor = self.cursor.min(self.rope.len_chars());
        self.clear_selection();
    }

    /// Replaces the selection (if any) with `text` and leaves the cursor after it.
    pub fn insert_text(&mut self, text: &str) {
        self.delete_selection();
        let at = self.cursor;
        self.insert(at, text);
        self.cursor = at + text.chars().count();
    }

    pub fn backspace(&mut self) {
        if self.delete_selection().is_some() || self.cursor == 0 {
            return;
        }
        let start = self.cursor - 1;
        self.delete_range(start..self.cursor);
        self.cursor = start;
    }

    pub fn delete_forward(&mut self) {
        if self.delete_selection().is_some() || self.cursor >= self.len_chars() {
            return;
        }
        self.delete_range(self.cursor..self.cursor + 1);
    }

    pub fn move_left(&mut self, extend: bool) {
        let target = self.cursor.saturating_sub(1);
        if extend {
            self.extend_selection_to(target);
        } else if let Some(range) = self.selection.clone() {
            self.set_cursor(range.start);
        } else {
            self.set_cursor(target);
        }
    }

    pub fn move_right(&mut self, extend: bool) {
        let target = (self.cursor + 1).min(self.len_chars());
        if extend {
            self.extend_selection_to(target);
        } else if let Some(range) = self.selection.clone() {
            self.set_cursor(range.end);
        } else {
            self.set_cursor(target);
        }
    }

    pub fn select_all(&mut self) {
        let len = self.len_chars();
        self.selection = if len == 0 { None } else { Some(0..len) };
        self.selection_anchor = Some(0);
        self.cursor = len;
    }

    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        self.rope.char_to_byte(char_idx.min(self.len_chars()))
    }

    pub fn byte_to_char(&self, byte_idx: usize) -> usize {
        self.rope.byte_to_char(byte_idx.min(self.len_bytes()))
    }

    pub fn char_range_to_bytes(&self, range: Range<usize>) -> Range<usize> {
        self.char_to_byte(range.start)..self.char_to_byte(range.end)
    }

    pub fn slice_chars(&self, range: Range<usize>) -> String {
        self.rope.slice(range).to_string()
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// The buffer contents, only when `revision` moved past `seen`.
    pub fn text_since(&self, seen: u64) -> Option<(u64, String)> {
        (self.revision != seen).then(|| (self.revision, self.text()))
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> DocumentState {
        let mut doc = DocumentState::new_empty();
        doc.set_text(text);
        doc
    }

    #[test]
    fn typing_bumps_revision() {
        let mut doc = DocumentState::new_empty();
        let start = doc.revision;
        doc.insert_text("# Hi");
        doc.insert_text(" there");
        assert_eq!(doc.text(), "# Hi there");
        assert_eq!(doc.cursor, 10);
        assert!(doc.revision > start);
    }

    #[test]
    fn cursor_moves_do_not_bump_revision() {
        let mut doc = doc("abc");
        let revision = doc.revision;
        doc.move_left(false);
        doc.move_left(true);
        doc.select_all();
        assert_eq!(doc.revision, revision);
    }

    #[test]
    fn text_since_skips_unchanged_revisions() {
        let mut doc = doc("abc");
        let seen = doc.revision;
        doc.set_cursor(1);
        assert_eq!(doc.text_since(seen), None);

        doc.insert_text("d");
        let (revision, text) = doc.text_since(seen).expect("edit bumps the revision");
        assert_eq!(text, "adbc");
        assert_eq!(doc.text_since(revision), None);
    }

    #[test]
    fn backspace_and_delete() {
        let mut doc = doc("héllo");
        doc.set_cursor(2);
        doc.backspace();
        assert_eq!(doc.text(), "hllo");
        assert_eq!(doc.cursor, 1);
        doc.delete_forward();
        assert_eq!(doc.text(), "hlo");

        doc.set_cursor(0);
        doc.backspace();
        assert_eq!(doc.text(), "hlo");
        doc.set_cursor(3);
        doc.delete_forward();
        assert_eq!(doc.text(), "hlo");
    }

    #[test]
    fn typing_replaces_selection() {
        let mut doc = doc("hello world");
        doc.set_selection(6, 11);
        assert_eq!(doc.selected_text().as_deref(), Some("world"));
        doc.insert_text("there");
        assert_eq!(doc.text(), "hello there");
        assert!(doc.selection.is_none());
    }

    #[test]
    fn shift_arrows_extend_from_anchor() {
        let mut doc = doc("abcdef");
        doc.set_cursor(3);
        doc.move_right(true);
        doc.move_right(true);
        assert_eq!(doc.selection, Some(3..5));
        doc.move_left(true);
        assert_eq!(doc.selection, Some(3..4));
        doc.move_left(false);
        assert_eq!(doc.cursor, 3);
        assert!(doc.selection.is_none());
    }

    #[test]
    fn selection_bytes_handle_multibyte() {
        let mut doc = doc("añb");
        doc.set_selection(1, 2);
        assert_eq!(doc.selection_bytes(), Some(1..3));
        assert_eq!(doc.byte_to_char(3), 2);
    }

    #[test]
    fn select_all_on_empty_selects_nothing() {
        let mut doc = DocumentState::new_empty();
        doc.select_all();
        assert!(doc.selection.is_none());
        assert!(doc.is_empty());
    }
}
