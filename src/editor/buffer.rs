use std::ops::Range;

use ropey::Rope;
use thiserror::Error;

/// A selection range in char indices.
///
/// `anchor` stays put while `head` follows the caret when a selection is
/// extended from the keyboard. An empty selection is a plain caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    /// A collapsed selection (caret) at `pos`.
    pub const fn caret(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// A forward selection covering `start..end`.
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            anchor: start.min(end),
            head: start.max(end),
        }
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub const fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    fn clamped(self, len: usize) -> Self {
        Self {
            anchor: self.anchor.min(len),
            head: self.head.min(len),
        }
    }
}

/// Direction for caret movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A substring replacement plus the selection to apply once the new text
/// is visible.
///
/// Every assisted transformation produces one of these; nothing touches the
/// document until [`Document::apply_edit`] commits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Char range of the current text being replaced.
    pub range: Range<usize>,
    /// Replacement text.
    pub text: String,
    /// Selection in the new text.
    pub selection: Selection,
}

impl Edit {
    pub fn new(range: Range<usize>, text: impl Into<String>, selection: Selection) -> Self {
        Self {
            range,
            text: text.into(),
            selection,
        }
    }

    /// Replace `range` with `text` and leave the caret `caret_offset` chars
    /// into the inserted text.
    pub fn with_caret_offset(range: Range<usize>, text: impl Into<String>, caret_offset: usize) -> Self {
        let caret = range.start + caret_offset;
        Self::new(range, text, Selection::caret(caret))
    }

    /// Char length of a `len`-char document once this edit is applied.
    pub fn resulting_len(&self, len: usize) -> usize {
        len.saturating_sub(self.range.len()) + self.text.chars().count()
    }
}

/// Caret placement requested by a committed [`Edit`].
///
/// The host applies it with [`Document::place_caret`] after it has drawn
/// the new text.
#[must_use = "a pending caret must be placed once the new text has been rendered"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCaret(Selection);

impl PendingCaret {
    pub const fn selection(&self) -> Selection {
        self.0
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("edit range {start}..{end} does not fit a document of {len} chars")]
    InvalidRange { start: usize, end: usize, len: usize },
}

/// The text being edited plus its selection.
///
/// Backed by a rope; every position is a char index.
#[derive(Clone)]
pub struct Document {
    rope: Rope,
    selection: Selection,
    /// Remembered column for vertical movement (sticky column).
    col_memory: Option<usize>,
    revision: u64,
}

impl Document {
    /// Create a document from a string with the caret at the start.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            selection: Selection::default(),
            col_memory: None,
            revision: 0,
        }
    }

    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Replace the selection (clamped to the text).
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.set_selection(selection);
        self
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    pub const fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection.clamped(self.len_chars());
        self.col_memory = None;
    }

    /// Bumped on every text mutation.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Text of a char range, clamped to the document.
    pub fn slice(&self, range: Range<usize>) -> String {
        let len = self.len_chars();
        let end = range.end.min(len);
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    pub fn char_at(&self, idx: usize) -> Option<char> {
        (idx < self.len_chars()).then(|| self.rope.char(idx))
    }

    pub fn selected_text(&self) -> String {
        self.slice(self.selection.to_range())
    }

    /// Total number of lines in the document.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Content of a line without its trailing newline.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in chars (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.chars().count())
    }

    /// Line and column (chars) of a char index.
    pub fn line_col(&self, idx: usize) -> (usize, usize) {
        let idx = idx.min(self.len_chars());
        let line = self.rope.char_to_line(idx);
        (line, idx - self.rope.line_to_char(line))
    }

    /// Line and column of the caret (the selection head).
    pub fn caret_line_col(&self) -> (usize, usize) {
        self.line_col(self.selection.head)
    }

    /// Commit an edit.
    ///
    /// The live selection becomes a caret at the end of the inserted text;
    /// the edit's own selection is returned for [`Self::place_caret`].
    ///
    /// # Errors
    ///
    /// Returns [`EditError::InvalidRange`] and leaves the document untouched
    /// if the edit range does not fit the current text.
    pub fn apply_edit(&mut self, edit: &Edit) -> Result<PendingCaret, EditError> {
        let len = self.len_chars();
        if edit.range.start > edit.range.end || edit.range.end > len {
            return Err(EditError::InvalidRange {
                start: edit.range.start,
                end: edit.range.end,
                len,
            });
        }
        self.replace(edit.range.clone(), &edit.text);
        let inserted_end = edit.range.start + edit.text.chars().count();
        self.selection = Selection::caret(inserted_end);
        Ok(PendingCaret(edit.selection))
    }

    /// Apply a caret placement requested by an earlier edit.
    pub fn place_caret(&mut self, pending: PendingCaret) {
        self.set_selection(pending.selection());
    }

    /// Insert a character, replacing the selection.
    pub fn insert_char(&mut self, ch: char) {
        let mut buf = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buf));
    }

    /// Insert a string, replacing the selection.
    pub fn insert_str(&mut self, s: &str) {
        if s.is_empty() && self.selection.is_empty() {
            return;
        }
        let range = self.selection.to_range();
        let caret = range.start + s.chars().count();
        self.replace(range, s);
        self.selection = Selection::caret(caret);
        self.col_memory = None;
    }

    /// Delete the selection, or the character before the caret (Backspace).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_back(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.delete_selection();
            return true;
        }
        let caret = self.selection.head;
        if caret == 0 {
            return false;
        }
        self.replace(caret - 1..caret, "");
        self.selection = Selection::caret(caret - 1);
        self.col_memory = None;
        true
    }

    /// Delete the selection, or the character at the caret (Delete).
    ///
    /// Returns `true` if anything was deleted.
    pub fn delete_forward(&mut self) -> bool {
        if !self.selection.is_empty() {
            self.delete_selection();
            return true;
        }
        let caret = self.selection.head;
        if caret >= self.len_chars() {
            return false;
        }
        self.replace(caret..caret + 1, "");
        self.col_memory = None;
        true
    }

    /// Move the caret, optionally extending the selection.
    pub fn move_cursor(&mut self, direction: Direction, extend: bool) {
        match direction {
            Direction::Left => self.move_left(extend),
            Direction::Right => self.move_right(extend),
            Direction::Up => self.move_vertical(-1, extend),
            Direction::Down => self.move_vertical(1, extend),
        }
    }

    /// Move the caret to the beginning of its line (Home).
    pub fn move_home(&mut self, extend: bool) {
        let (line, _) = self.caret_line_col();
        let pos = self.rope.line_to_char(line);
        self.set_head(pos, extend);
    }

    /// Move the caret to the end of its line (End).
    pub fn move_end(&mut self, extend: bool) {
        let (line, _) = self.caret_line_col();
        let pos = self.rope.line_to_char(line) + self.line_len(line);
        self.set_head(pos, extend);
    }

    /// Move the caret one word to the left (Ctrl+Left).
    pub fn move_word_left(&mut self, extend: bool) {
        let pos = self.word_start_before(self.selection.head);
        self.set_head(pos, extend);
    }

    /// Move the caret one word to the right (Ctrl+Right).
    pub fn move_word_right(&mut self, extend: bool) {
        let pos = self.word_end_after(self.selection.head);
        self.set_head(pos, extend);
    }

    /// Move the caret to the start of the document (Ctrl+Home).
    pub fn move_to_start(&mut self, extend: bool) {
        self.set_head(0, extend);
    }

    /// Move the caret to the end of the document (Ctrl+End).
    pub fn move_to_end(&mut self, extend: bool) {
        self.set_head(self.len_chars(), extend);
    }

    /// Move the caret to a line and column, clamped to the text.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let line = line.min(self.line_count().saturating_sub(1));
        let pos = self.rope.line_to_char(line) + col.min(self.line_len(line));
        self.set_head(pos, false);
    }

    pub fn select_all(&mut self) {
        self.selection = Selection::range(0, self.len_chars());
        self.col_memory = None;
    }

    // --- Private helpers ---

    fn replace(&mut self, range: Range<usize>, text: &str) {
        if !range.is_empty() {
            self.rope.remove(range.clone());
        }
        if !text.is_empty() {
            self.rope.insert(range.start, text);
        }
        self.revision += 1;
    }

    fn delete_selection(&mut self) {
        let range = self.selection.to_range();
        let start = range.start;
        self.replace(range, "");
        self.selection = Selection::caret(start);
        self.col_memory = None;
    }

    fn set_head(&mut self, pos: usize, extend: bool) {
        if extend {
            self.selection.head = pos;
        } else {
            self.selection = Selection::caret(pos);
        }
        self.col_memory = None;
    }

    fn move_left(&mut self, extend: bool) {
        if !extend && !self.selection.is_empty() {
            self.set_head(self.selection.start(), false);
            return;
        }
        let pos = self.selection.head.saturating_sub(1);
        self.set_head(pos, extend);
    }

    fn move_right(&mut self, extend: bool) {
        if !extend && !self.selection.is_empty() {
            self.set_head(self.selection.end(), false);
            return;
        }
        let pos = (self.selection.head + 1).min(self.len_chars());
        self.set_head(pos, extend);
    }

    fn move_vertical(&mut self, delta: isize, extend: bool) {
        let (line, col) = self.caret_line_col();
        let Some(target) = line.checked_add_signed(delta) else {
            return;
        };
        if target >= self.line_count() {
            return;
        }
        let want = self.col_memory.unwrap_or(col);
        let pos = self.rope.line_to_char(target) + want.min(self.line_len(target));
        self.set_head(pos, extend);
        self.col_memory = Some(want);
    }

    fn word_start_before(&self, pos: usize) -> usize {
        if pos == 0 {
            return 0;
        }
        if self.rope.char(pos - 1) == '\n' {
            return pos - 1;
        }
        let mut idx = pos;
        while idx > 0 {
            let c = self.rope.char(idx - 1);
            if c == '\n' || is_word_char(c) {
                break;
            }
            idx -= 1;
        }
        while idx > 0 && is_word_char(self.rope.char(idx - 1)) {
            idx -= 1;
        }
        idx
    }

    fn word_end_after(&self, pos: usize) -> usize {
        let len = self.len_chars();
        if pos >= len {
            return len;
        }
        if self.rope.char(pos) == '\n' {
            return pos + 1;
        }
        let mut idx = pos;
        while idx < len && is_word_char(self.rope.char(idx)) {
            idx += 1;
        }
        while idx < len {
            let c = self.rope.char(idx);
            if c == '\n' || is_word_char(c) {
                break;
            }
            idx += 1;
        }
        idx
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field(
                "rope",
                &format_args!("Rope({} chars)", self.rope.len_chars()),
            )
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .finish()
    }
}
