//! Ordered regex replace-all over a file's text.

use regex::{NoExpand, Regex};

/// One pattern and the literal text that replaces every match.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub pattern: Regex,
    pub replacement: String,
}

impl Rule {
    /// `pattern` is a compile-time constant or built from escaped input.
    pub fn new(name: impl Into<String>, pattern: &str, replacement: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: Regex::new(pattern).expect("valid rule pattern"),
            replacement: replacement.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Substitution {
    pub content: String,
    /// Match count per rule, in rule order.
    pub applied: Vec<(String, usize)>,
}

impl Substitution {
    /// Names of rules that matched nothing.
    pub fn unmatched(&self) -> Vec<&str> {
        self.applied
            .iter()
            .filter(|(_, n)| *n == 0)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// Apply `rules` in order. The replacement is inserted verbatim, so a `$` in
/// a version or product name is never treated as a capture group.
pub fn apply_rules(content: &str, rules: &[Rule]) -> Substitution {
    let mut current = content.to_string();
    let mut applied = Vec::with_capacity(rules.len());

    for rule in rules {
        let count = rule.pattern.find_iter(&current).count();
        if count > 0 {
            current = rule
                .pattern
                .replace_all(&current, NoExpand(&rule.replacement))
                .into_owned();
        }
        applied.push((rule.name.clone(), count));
    }

    Substitution { content: current, applied }
}
