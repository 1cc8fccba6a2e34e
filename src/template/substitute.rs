//! Comment exclusion and `{name}` placeholder substitution.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::vars::VariableSet;

/// `true` when `line` starts with one of `markers` immediately followed by a
/// character that is not an ASCII letter, digit or space.
fn is_excluded(line: &str, markers: &[char]) -> bool {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(marker), Some(next)) => {
            markers.contains(&marker) && next != ' ' && !next.is_ascii_alphanumeric()
        }
        _ => false,
    }
}

/// Lines of a variable-free import, minus `#`-excluded lines.
pub fn plain_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !is_excluded(line, &['#']))
        .map(str::to_owned)
        .collect()
}

// ---------------------------------------------------------------------------
// VariableChoices
// ---------------------------------------------------------------------------

/// The value picked for each variable, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableChoices {
    values: Vec<(String, String)>,
}

impl VariableChoices {
    /// Every variable set to its first candidate.
    pub fn defaults(vars: &VariableSet) -> Self {
        Self {
            values: vars
                .iter()
                .map(|v| (v.name.clone(), v.default_value().to_owned()))
                .collect(),
        }
    }

    /// Override the value for `name`.  Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        if let Some((_, slot)) = self.values.iter_mut().find(|(n, _)| n == name) {
            *slot = value.into();
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Editable `(name, value)` pairs, for free-text entry.
    pub fn entries_mut(&mut self) -> impl Iterator<Item = (&str, &mut String)> {
        self.values.iter_mut().map(|(n, v)| (n.as_str(), v))
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// Imported text that declared at least one variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    text: String,
    vars: VariableSet,
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"))
}

impl Template {
    pub fn new(text: impl Into<String>, vars: VariableSet) -> Self {
        Self {
            text: text.into(),
            vars,
        }
    }

    pub fn variables(&self) -> &VariableSet {
        &self.vars
    }

    /// Choices pre-filled with each variable's default.
    pub fn default_choices(&self) -> VariableChoices {
        VariableChoices::defaults(&self.vars)
    }

    /// Substitute `choices` into every kept line.
    ///
    /// Lines starting with `#` or `;` followed by a non-alphanumeric,
    /// non-space character are dropped (this includes the `##var:`
    /// declarations).  Placeholders naming an unknown variable are left as
    /// written.
    pub fn render(&self, choices: &VariableChoices) -> Vec<String> {
        self.text
            .lines()
            .filter(|line| !is_excluded(line, &['#', ';']))
            .map(|line| {
                placeholder_regex()
                    .replace_all(line, |caps: &Captures<'_>| {
                        choices
                            .get(&caps[1])
                            .map_or_else(|| caps[0].to_owned(), str::to_owned)
                    })
                    .into_owned()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::scan_variables;

    fn template(text: &str) -> Template {
        Template::new(text, scan_variables(text))
    }

    #[test]
    fn plain_import_keeps_spaced_comment_and_drops_shebang_style() {
        let lines = plain_lines("# not a var decl\n#!shebang-like\n#tag\ncmd\n#");
        assert_eq!(lines, ["# not a var decl", "#tag", "cmd", "#"]);
    }

    #[test]
    fn plain_import_keeps_semicolon_lines() {
        assert_eq!(plain_lines(";; note"), [";; note"]);
    }

    #[test]
    fn chosen_value_is_substituted() {
        let t = template("## var:env:dev,prod\ndeploy to {env}");
        let mut choices = t.default_choices();
        choices.set("env", "prod");
        assert_eq!(t.render(&choices), ["deploy to prod"]);
    }

    #[test]
    fn defaults_are_first_candidates() {
        let t = template("## var:env:dev,prod\n## var:user\nssh {user}@{env}");
        assert_eq!(t.render(&t.default_choices()), ["ssh @dev"]);
    }

    #[test]
    fn free_text_overrides_candidates() {
        let t = template("##var:host:a,b\nping {host}");
        let mut choices = t.default_choices();
        for (name, value) in choices.entries_mut() {
            assert_eq!(name, "host");
            *value = "10.0.0.1".into();
        }
        assert_eq!(t.render(&choices), ["ping 10.0.0.1"]);
    }

    #[test]
    fn template_drops_declarations_and_marker_comments() {
        let t = template("## var:x:1\n;; old\n#!skip\n# keep {x}\n; keep too\nrun {x}");
        assert_eq!(t.render(&t.default_choices()), ["# keep 1", "; keep too", "run 1"]);
    }

    #[test]
    fn unknown_placeholders_are_left_verbatim() {
        let t = template("## var:x:1\necho {x} {y} {}");
        assert_eq!(t.render(&t.default_choices()), ["echo 1 {y} {}"]);
    }

    #[test]
    fn setting_unknown_name_is_ignored() {
        let t = template("## var:x:1\n{x}");
        let mut choices = t.default_choices();
        choices.set("nope", "2");
        assert_eq!(choices.get("nope"), None);
        assert_eq!(choices.get("x"), Some("1"));
    }
}
