//! [`LineList`]: circular selection over an ordered list of lines.

use std::path::Path;

use super::{ListError, SaveError};

/// `true` when `line` is a comment entry for cursor-skipping purposes.
pub fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

// ---------------------------------------------------------------------------
// ListOptions
// ---------------------------------------------------------------------------

/// Flags that change how the list is cycled and filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Step over entries starting with `#` while cycling.
    pub skip_comments: bool,
    /// Keep empty entries; when `false` they are stripped on every mutation.
    pub allow_blank_lines: bool,
    /// Swap the meaning of "advance" and "retreat".
    pub reverse: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            skip_comments: true,
            allow_blank_lines: false,
            reverse: false,
        }
    }
}

// ---------------------------------------------------------------------------
// LineList
// ---------------------------------------------------------------------------

/// Ordered lines plus the selected index.
#[derive(Debug, Clone, Default)]
pub struct LineList {
    lines: Vec<String>,
    cursor: Option<usize>,
    options: ListOptions,
}

impl LineList {
    /// An empty list with no selection.
    pub fn new(options: ListOptions) -> Self {
        Self {
            lines: Vec::new(),
            cursor: None,
            options,
        }
    }

    /// A list initialised through [`replace_all`](Self::replace_all).
    pub fn with_lines(lines: Vec<String>, options: ListOptions) -> Self {
        let mut list = Self::new(options);
        list.replace_all(lines);
        list
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn options(&self) -> ListOptions {
        self.options
    }

    /// Text of the selected entry.
    ///
    /// # Errors
    ///
    /// [`ListError::NoSelection`] when the list is empty.
    pub fn current_text(&self) -> Result<&str, ListError> {
        self.cursor
            .and_then(|i| self.lines.get(i))
            .map(String::as_str)
            .ok_or(ListError::NoSelection)
    }

    /// Newline-joined contents, without a trailing newline.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }

    /// Write [`to_text`](Self::to_text) to `path`, replacing any existing file.
    pub fn save_to(&self, path: &Path) -> Result<(), SaveError> {
        std::fs::write(path, self.to_text()).map_err(|source| SaveError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    // -----------------------------------------------------------------------
    // Options
    // -----------------------------------------------------------------------

    /// Turning comment skipping on immediately moves off a selected comment.
    pub fn set_skip_comments(&mut self, skip: bool) {
        self.options.skip_comments = skip;
        if skip {
            self.skip_comment_at_cursor();
        }
    }

    /// Turning blank lines off strips the ones already in the list.
    pub fn set_allow_blank_lines(&mut self, allow: bool) {
        self.options.allow_blank_lines = allow;
        self.strip_blank_lines();
    }

    pub fn set_reverse(&mut self, reverse: bool) {
        self.options.reverse = reverse;
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    /// Select `index` directly.  Returns `false` if it is out of range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.lines.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    /// Select the last entry (no-op on an empty list).
    pub fn select_last(&mut self) {
        self.cursor = self.lines.len().checked_sub(1);
    }

    /// Move to the next entry, wrapping at the end.
    pub fn advance(&mut self) {
        self.step(true);
    }

    /// Move to the previous entry, wrapping at the start.
    pub fn retreat(&mut self) {
        self.step(false);
    }

    /// [`advance`](Self::advance), or [`retreat`](Self::retreat) when reversed.
    pub fn effective_advance(&mut self) {
        self.step(!self.options.reverse);
    }

    /// [`retreat`](Self::retreat), or [`advance`](Self::advance) when reversed.
    pub fn effective_retreat(&mut self) {
        self.step(self.options.reverse);
    }

    /// If comment skipping is on and the selection is a comment, move off it
    /// in the effective direction.
    pub fn skip_comment_at_cursor(&mut self) {
        if self.options.skip_comments && self.current_text().is_ok_and(is_comment) {
            self.effective_advance();
        }
    }

    /// One circular step, then keep stepping over comments.  At most `len`
    /// steps are taken, so an all-comment list ends where it began.
    fn step(&mut self, forward: bool) {
        let len = self.lines.len();
        let Some(mut pos) = self.cursor else {
            return;
        };
        for _ in 0..len {
            pos = if forward {
                (pos + 1) % len
            } else {
                (pos + len - 1) % len
            };
            if !(self.options.skip_comments && is_comment(&self.lines[pos])) {
                break;
            }
        }
        self.cursor = Some(pos);
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Insert `text` before the selection and select it.  On an empty list
    /// the entry goes to index 0.
    pub fn insert_before(&mut self, text: impl Into<String>) {
        let at = self.cursor.unwrap_or(0);
        self.insert_at(at, text.into());
    }

    /// Insert `text` after the selection and select it.  On an empty list
    /// the entry goes to index 0.
    pub fn insert_after(&mut self, text: impl Into<String>) {
        let at = self.cursor.map_or(0, |c| c + 1);
        self.insert_at(at, text.into());
    }

    /// Insert in the direction of travel: after the selection normally,
    /// before it when the direction is reversed.
    pub fn insert_next(&mut self, text: impl Into<String>) {
        if self.options.reverse {
            self.insert_before(text);
        } else {
            self.insert_after(text);
        }
    }

    fn insert_at(&mut self, at: usize, text: String) {
        // A blank that would be stripped again leaves list and selection as is.
        if text.is_empty() && !self.options.allow_blank_lines {
            return;
        }
        self.lines.insert(at, text);
        self.cursor = Some(at);
    }

    /// Replace the selected entry in place; the selection stays on its slot.
    pub fn edit_current(&mut self, text: impl Into<String>) -> Result<(), ListError> {
        let at = self.cursor.ok_or(ListError::NoSelection)?;
        self.lines[at] = text.into();
        self.strip_blank_lines();
        Ok(())
    }

    /// Delete the selected entry and return it.
    ///
    /// The selection stays on the same index when possible, otherwise moves
    /// to the new last entry.  Removing the only entry leaves the list empty.
    pub fn remove(&mut self) -> Result<String, ListError> {
        let at = self.cursor.ok_or(ListError::NoSelection)?;
        let removed = self.lines.remove(at);
        self.clamp_cursor(Some(at));
        Ok(removed)
    }

    /// Swap the selection with the entry above it.  No-op at the top.
    pub fn move_up(&mut self) -> Result<(), ListError> {
        let at = self.cursor.ok_or(ListError::NoSelection)?;
        if at > 0 {
            self.lines.swap(at, at - 1);
            self.cursor = Some(at - 1);
        }
        Ok(())
    }

    /// Swap the selection with the entry below it.  No-op at the bottom.
    pub fn move_down(&mut self) -> Result<(), ListError> {
        let at = self.cursor.ok_or(ListError::NoSelection)?;
        if at + 1 < self.lines.len() {
            self.lines.swap(at, at + 1);
            self.cursor = Some(at + 1);
        }
        Ok(())
    }

    /// Replace the whole list, select the first entry, then step off it if
    /// it is a comment and skipping is on.
    pub fn replace_all(&mut self, lines: Vec<String>) {
        self.lines = lines;
        self.cursor = if self.lines.is_empty() { None } else { Some(0) };
        self.strip_blank_lines();
        self.skip_comment_at_cursor();
    }

    /// Append every line of `text` at the end.  The selection does not move
    /// unless the list was empty.
    pub fn append(&mut self, text: &str) {
        self.lines.extend(text.lines().map(str::to_owned));
        self.clamp_cursor(self.cursor);
        self.strip_blank_lines();
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.cursor = None;
    }

    // -----------------------------------------------------------------------
    // Invariant maintenance
    // -----------------------------------------------------------------------

    /// Drop empty entries unless they are allowed.  The selection follows its
    /// entry; if the selected entry itself was dropped, the next surviving
    /// entry is selected instead.
    fn strip_blank_lines(&mut self) {
        if self.options.allow_blank_lines || !self.lines.iter().any(String::is_empty) {
            return;
        }
        let selected = self.cursor;
        let mut kept = Vec::with_capacity(self.lines.len());
        let mut new_cursor = None;
        for (i, line) in std::mem::take(&mut self.lines).into_iter().enumerate() {
            if selected == Some(i) {
                new_cursor = Some(kept.len());
            }
            if !line.is_empty() {
                kept.push(line);
            }
        }
        self.lines = kept;
        self.clamp_cursor(new_cursor);
    }

    fn clamp_cursor(&mut self, preferred: Option<usize>) {
        self.cursor = match self.lines.len() {
            0 => None,
            len => Some(preferred.unwrap_or(0).min(len - 1)),
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> ListOptions {
        ListOptions {
            skip_comments: false,
            allow_blank_lines: false,
            reverse: false,
        }
    }

    fn list_of(items: &[&str], options: ListOptions) -> LineList {
        LineList::with_lines(items.iter().map(|s| s.to_string()).collect(), options)
    }

    // ---- cycling ---

    #[test]
    fn advance_then_retreat_restores_cursor() {
        let mut list = list_of(&["a", "b", "c"], plain());
        for start in 0..3 {
            list.select(start);
            list.advance();
            list.retreat();
            assert_eq!(list.cursor(), Some(start));
        }
    }

    #[test]
    fn full_lap_returns_to_start() {
        let mut list = list_of(&["a", "b", "c", "d"], plain());
        list.select(2);
        for _ in 0..list.len() {
            list.advance();
        }
        assert_eq!(list.cursor(), Some(2));
    }

    #[test]
    fn advance_wraps_to_top_and_retreat_wraps_to_bottom() {
        let mut list = list_of(&["a", "b", "c"], plain());
        list.select(2);
        list.advance();
        assert_eq!(list.cursor(), Some(0));
        list.retreat();
        assert_eq!(list.cursor(), Some(2));
    }

    #[test]
    fn advance_skips_comments() {
        let mut list = list_of(&["a", "# one", "#two", "b"], ListOptions::default());
        assert_eq!(list.cursor(), Some(0));
        list.advance();
        assert_eq!(list.current_text().unwrap(), "b");
        list.retreat();
        assert_eq!(list.current_text().unwrap(), "a");
    }

    #[test]
    fn all_comment_list_terminates_in_place() {
        let mut list = list_of(&["#a", "#b", "#c"], ListOptions::default());
        list.select(1);
        list.advance();
        assert_eq!(list.cursor(), Some(1));
        list.retreat();
        assert_eq!(list.cursor(), Some(1));
    }

    #[test]
    fn reverse_swaps_effective_direction() {
        let mut list = list_of(&["a", "b", "c"], plain());
        list.set_reverse(true);
        list.effective_advance();
        assert_eq!(list.cursor(), Some(2));
        list.effective_retreat();
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn cycling_empty_list_is_noop() {
        let mut list = LineList::new(plain());
        list.advance();
        list.retreat();
        assert_eq!(list.cursor(), None);
        assert_eq!(list.current_text(), Err(ListError::NoSelection));
    }

    // ---- insert / edit ---

    #[test]
    fn insert_before_and_after_select_new_entry() {
        let mut list = list_of(&["a", "b"], plain());
        list.select(1);
        list.insert_before("x");
        assert_eq!(list.lines(), ["a", "x", "b"]);
        assert_eq!(list.cursor(), Some(1));

        list.insert_after("y");
        assert_eq!(list.lines(), ["a", "x", "y", "b"]);
        assert_eq!(list.current_text().unwrap(), "y");
    }

    #[test]
    fn insert_into_empty_list_goes_to_index_zero() {
        let mut list = LineList::new(plain());
        list.insert_after("first");
        assert_eq!(list.lines(), ["first"]);
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn insert_next_follows_direction() {
        let mut list = list_of(&["a", "b"], plain());
        list.insert_next("after-a");
        assert_eq!(list.lines(), ["a", "after-a", "b"]);

        list.set_reverse(true);
        list.insert_next("before");
        assert_eq!(list.lines(), ["a", "before", "after-a", "b"]);
        assert_eq!(list.cursor(), Some(1));
    }

    #[test]
    fn blank_insert_is_dropped_when_blanks_disallowed() {
        let mut list = list_of(&["a", "b", "c"], plain());
        list.select(1);
        list.insert_after("");
        list.insert_before("");
        assert_eq!(list.lines(), ["a", "b", "c"]);
        assert_eq!(list.cursor(), Some(1));

        let mut empty = LineList::new(plain());
        empty.insert_next("");
        assert!(empty.is_empty());
        assert_eq!(empty.cursor(), None);
    }

    #[test]
    fn edit_replaces_single_slot() {
        let mut list = list_of(&["a", "b", "c"], plain());
        list.select(1);
        list.edit_current("B").unwrap();
        assert_eq!(list.lines(), ["a", "B", "c"]);
        assert_eq!(list.cursor(), Some(1));
    }

    // ---- remove / move ---

    #[test]
    fn remove_keeps_index_then_clamps() {
        let mut list = list_of(&["a", "b", "c"], plain());
        list.select(1);
        assert_eq!(list.remove().unwrap(), "b");
        assert_eq!(list.cursor(), Some(1));
        assert_eq!(list.remove().unwrap(), "c");
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn remove_singleton_leaves_empty_list() {
        let mut list = list_of(&["only"], plain());
        list.remove().unwrap();
        assert!(list.is_empty());
        assert_eq!(list.cursor(), None);
        assert_eq!(list.remove(), Err(ListError::NoSelection));
    }

    #[test]
    fn move_up_and_down_follow_entry() {
        let mut list = list_of(&["a", "b", "c"], plain());
        list.select(1);
        list.move_up().unwrap();
        assert_eq!(list.lines(), ["b", "a", "c"]);
        assert_eq!(list.cursor(), Some(0));
        list.move_up().unwrap();
        assert_eq!(list.lines(), ["b", "a", "c"]);

        list.select(2);
        list.move_down().unwrap();
        assert_eq!(list.cursor(), Some(2));
        list.move_up().unwrap();
        assert_eq!(list.lines(), ["b", "c", "a"]);
    }

    // ---- bulk ---

    #[test]
    fn replace_all_strips_blanks_and_skips_leading_comment() {
        let mut list = LineList::new(ListOptions::default());
        list.replace_all(vec!["# header".into(), "".into(), "run".into()]);
        assert_eq!(list.lines(), ["# header", "run"]);
        assert_eq!(list.current_text().unwrap(), "run");
    }

    #[test]
    fn replace_all_keeps_blanks_when_allowed() {
        let options = ListOptions {
            allow_blank_lines: true,
            ..plain()
        };
        let list = list_of(&["a", "", "b"], options);
        assert_eq!(list.len(), 3);
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn append_splits_lines_and_keeps_selection() {
        let mut list = list_of(&["a"], plain());
        list.append("b\r\n\nc");
        assert_eq!(list.lines(), ["a", "b", "c"]);
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn append_to_empty_list_selects_first() {
        let mut list = LineList::new(plain());
        list.append("x\ny");
        assert_eq!(list.cursor(), Some(0));
    }

    #[test]
    fn disallowing_blanks_later_strips_them() {
        let options = ListOptions {
            allow_blank_lines: true,
            ..plain()
        };
        let mut list = list_of(&["a", "", "b"], options);
        list.select(1);
        list.set_allow_blank_lines(false);
        assert_eq!(list.lines(), ["a", "b"]);
        assert_eq!(list.current_text().unwrap(), "b");
    }

    #[test]
    fn enabling_skip_comments_moves_off_comment() {
        let mut list = list_of(&["#c", "a"], plain());
        assert_eq!(list.cursor(), Some(0));
        list.set_skip_comments(true);
        assert_eq!(list.cursor(), Some(1));
    }

    #[test]
    fn save_writes_newline_joined_text() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("out.txt");
        let list = list_of(&["one", "two"], plain());
        list.save_to(&path).expect("save");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo");
    }
}
