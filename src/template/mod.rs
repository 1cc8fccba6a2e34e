//! Importing list files, with optional `## var:` template variables.
//!
//! # File format
//!
//! A list file is plain text, one entry per line.  Two kinds of line are
//! special:
//!
//! * `## var:name:value1,value2,...` (the space after `##` is optional, and
//!   `=` may stand in for the second `:`) declares a variable whose first
//!   value is the default.  A declaration without values defaults to `""`.
//! * A line starting with `#` (or `;` in templates) immediately followed by
//!   something that is neither a letter, a digit nor a space is excluded from
//!   the imported lines.  `# note` survives; `#!run` and `##var:` do not.
//!
//! # Flow
//!
//! ```text
//! read_import_file(path) ──▶ ImportPlan::from_text(text)
//!        │                         │
//!        │                         ├─ Plain(lines)      → LineList::replace_all
//!        │                         └─ Template(template) → user picks values
//!        ▼                                                  → template.render(&choices)
//!  ImportError::FileNotFound                                → LineList::replace_all
//! ```

pub mod substitute;
pub mod vars;

pub use substitute::{plain_lines, Template, VariableChoices};
pub use vars::{scan_variables, Variable, VariableSet};

use std::path::{Path, PathBuf};

use thiserror::Error;

// ---------------------------------------------------------------------------
// ImportError
// ---------------------------------------------------------------------------

/// Why an import was aborted.  The list is never touched when one of these
/// is returned.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The chosen path does not exist.
    #[error("{} does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// The path exists but could not be read as UTF-8 text.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a list or template file.
pub fn read_import_file(path: &Path) -> Result<String, ImportError> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// ImportPlan
// ---------------------------------------------------------------------------

/// What an imported text turns into.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportPlan {
    /// No variables were declared: these lines replace the list as-is.
    Plain(Vec<String>),
    /// At least one variable was declared: values must be chosen first.
    Template(Template),
}

impl ImportPlan {
    pub fn from_text(text: &str) -> Self {
        let vars = scan_variables(text);
        if vars.is_empty() {
            log::info!("import: no variables found, importing lines as-is");
            ImportPlan::Plain(plain_lines(text))
        } else {
            log::info!("import: {} variable(s) declared", vars.len());
            ImportPlan::Template(Template::new(text, vars))
        }
    }

    /// Convenience for [`read_import_file`] followed by [`from_text`](Self::from_text).
    pub fn load(path: &Path) -> Result<Self, ImportError> {
        let text = read_import_file(path)?;
        Ok(Self::from_text(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nope.txt");
        let err = ImportPlan::load(&path).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(ref p) if p == &path));
        assert!(err.to_string().ends_with("does not exist"));
    }

    #[test]
    fn text_without_vars_is_plain() {
        let plan = ImportPlan::from_text("a\n# keep me\n#!drop\nb");
        assert_eq!(
            plan,
            ImportPlan::Plain(vec!["a".into(), "# keep me".into(), "b".into()])
        );
    }

    #[test]
    fn text_with_vars_is_template() {
        let plan = ImportPlan::from_text("## var:env:dev,prod\ndeploy to {env}");
        let ImportPlan::Template(template) = plan else {
            panic!("expected a template");
        };
        assert_eq!(template.variables().len(), 1);
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "one\ntwo\n").unwrap();
        let plan = ImportPlan::load(&path).expect("load");
        assert_eq!(plan, ImportPlan::Plain(vec!["one".into(), "two".into()]));
    }
}
