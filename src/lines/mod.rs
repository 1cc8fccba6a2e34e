//! The list of lines to type, and the cursor that walks it.
//!
//! # Overview
//!
//! [`LineList`] owns an ordered `Vec<String>` plus an optional cursor.  The
//! cursor is `Some(i)` with `i < len` whenever the list is non-empty and
//! `None` when it is empty.  Every mutating method re-establishes that
//! invariant before returning.
//!
//! Cycling is circular.  With [`ListOptions::skip_comments`] set, entries
//! that start with `#` are stepped over; a list made only of comments leaves
//! the cursor where it started after one full lap.
//!
//! ```
//! use type_lines::lines::{LineList, ListOptions};
//!
//! let mut list = LineList::with_lines(
//!     vec!["ls".into(), "# list files".into(), "pwd".into()],
//!     ListOptions::default(),
//! );
//! assert_eq!(list.current_text().unwrap(), "ls");
//! list.advance();
//! assert_eq!(list.current_text().unwrap(), "pwd");
//! ```

pub mod cursor;

pub use cursor::{is_comment, LineList, ListOptions};

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// An action that needs a selected entry was attempted on an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    /// The list is empty, so nothing is selected.
    #[error("no line selected, select a line first")]
    NoSelection,
}

/// Writing the list out to disk failed.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Sample content
// ---------------------------------------------------------------------------

/// Number of entries in the startup sample list.
pub const SAMPLE_LEN: usize = 25;

/// `sample text 01` … `sample text 25`, shown when nothing was imported.
pub fn sample_lines() -> Vec<String> {
    (1..=SAMPLE_LEN)
        .map(|n| format!("sample text {n:02}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_lines_are_zero_padded() {
        let lines = sample_lines();
        assert_eq!(lines.len(), SAMPLE_LEN);
        assert_eq!(lines[0], "sample text 01");
        assert_eq!(lines[24], "sample text 25");
    }

    #[test]
    fn no_selection_message_is_user_facing() {
        assert_eq!(
            ListError::NoSelection.to_string(),
            "no line selected, select a line first"
        );
    }
}
