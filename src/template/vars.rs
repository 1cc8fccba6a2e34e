//! Scanning `## var:` declarations.

use std::sync::OnceLock;

use regex::Regex;

/// A declared variable and its candidate values.  `candidates` is never
/// empty; the first entry is the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub candidates: Vec<String>,
}

impl Variable {
    pub fn default_value(&self) -> &str {
        self.candidates.first().map_or("", String::as_str)
    }
}

/// Variables in declaration order.  Re-declaring a name replaces its
/// candidates but keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableSet {
    vars: Vec<Variable>,
}

impl VariableSet {
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|v| v.name == name)
    }

    fn declare(&mut self, name: String, candidates: Vec<String>) {
        match self.vars.iter_mut().find(|v| v.name == name) {
            Some(existing) => existing.candidates = candidates,
            None => self.vars.push(Variable { name, candidates }),
        }
    }
}

fn declaration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^## ?var:(?P<name>[^:=]+)[:=]?(?P<values>.*)$")
            .expect("declaration pattern is valid")
    })
}

/// Collect every `## var:` declaration in `text`.
pub fn scan_variables(text: &str) -> VariableSet {
    let mut set = VariableSet::default();
    for line in text.lines() {
        let Some(caps) = declaration_regex().captures(line) else {
            continue;
        };
        let name = caps["name"].trim();
        if name.is_empty() {
            continue;
        }
        let candidates = caps["values"]
            .trim()
            .split(',')
            .map(|v| v.trim().to_owned())
            .collect();
        set.declare(name.to_owned(), candidates);
    }
    set
}
