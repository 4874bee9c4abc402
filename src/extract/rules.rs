//! Ordered first-match-wins rewriting rules.
//!
//! Used for dataset renames and legend labels.

use regex::Regex;

use crate::common::*;

/// Decides whether a rule applies to a string.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// String is exactly this.
    Exact(String),
    /// String contains this.
    Contains(String),
    /// String matches this regex.
    Regex(Regex),
}
impl Matcher {
    /// True if the matcher accepts `s`.
    pub fn is_match(&self, s: &str) -> bool {
        match self {
            Matcher::Exact(exact) => s == exact,
            Matcher::Contains(sub) => s.contains(sub as &str),
            Matcher::Regex(re) => re.is_match(s),
        }
    }
}
impl ::std::fmt::Display for Matcher {
    fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        match self {
            Matcher::Exact(exact) => write!(fmt, "exact `{}`", exact),
            Matcher::Contains(sub) => write!(fmt, "contains `{}`", sub),
            Matcher::Regex(re) => write!(fmt, "regex `{}`", re.as_str()),
        }
    }
}

/// A rewriting rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// When the rule applies.
    pub matcher: Matcher,
    /// What the string becomes.
    pub label: String,
}

/// Ordered rules, the first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct Rules {
    rules: Vec<Rule>,
}
impl Rules {
    /// No rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule at the end.
    pub fn push<S: Into<String>>(&mut self, matcher: Matcher, label: S) {
        self.rules.push(Rule {
            matcher,
            label: label.into(),
        })
    }

    /// Adds a substring rule at the end, builder style.
    pub fn contains<S1: Into<String>, S2: Into<String>>(mut self, sub: S1, label: S2) -> Self {
        self.push(Matcher::Contains(sub.into()), label);
        self
    }

    /// Adds an exact rule at the end, builder style.
    pub fn exact<S1: Into<String>, S2: Into<String>>(mut self, exact: S1, label: S2) -> Self {
        self.push(Matcher::Exact(exact.into()), label);
        self
    }

    /// Label of the first rule matching `s`, if any.
    pub fn apply(&self, s: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matcher.is_match(s))
            .map(|rule| rule.label.as_str())
    }

    /// Rewrites `s`, leaving it unchanged when no rule matches.
    pub fn rename<'a>(&'a self, s: &'a str) -> &'a str {
        self.apply(s).unwrap_or(s)
    }

    /// Rules that match none of some strings.
    pub fn unused<'a, I>(&self, strings: I) -> Vec<&Rule>
    where
        I: IntoIterator<Item = &'a str>,
        I::IntoIter: Clone,
    {
        let strings = strings.into_iter();
        self.rules
            .iter()
            .filter(|rule| !strings.clone().any(|s| rule.matcher.is_match(s)))
            .collect()
    }

    /// Number of rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.rules.len()
    }
    /// True if there are no rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_match_wins() {
        let rules = Rules::new()
            .contains("acceleration=bb", "BB PGD")
            .contains("PGD", "PGD")
            .exact("ADMM", "ADMM (exact)");
        assert_eq!(rules.apply("PGD[acceleration=bb]"), Some("BB PGD"));
        assert_eq!(rules.apply("PGD[acceleration=none]"), Some("PGD"));
        assert_eq!(rules.apply("ADMM"), Some("ADMM (exact)"));
        assert_eq!(rules.apply("ADMM[rho=1]"), None);
        assert_eq!(rules.rename("ADMM[rho=1]"), "ADMM[rho=1]")
    }

    #[test]
    fn regex_matcher() {
        let mut rules = Rules::new();
        rules.push(
            Matcher::Regex(Regex::new(r"n_features=\d{5,}").unwrap()),
            "High Dim",
        );
        assert_eq!(rules.rename("n_features=20000, n_samples=200"), "High Dim");
        assert_eq!(
            rules.rename("n_features=200, n_samples=20000"),
            "n_features=200, n_samples=20000"
        )
    }

    #[test]
    fn unused_rules() {
        let rules = Rules::new().contains("ADMM", "ADMM").contains("Hybrid", "Hybrid");
        let unused = rules.unused(vec!["ADMM", "PGD"]);
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].label, "Hybrid")
    }
}
