//! Go version constraints
//!
//! Supports range specifications over Go versions:
//! - `1.15` - exact match (normalized to `1.15.0`)
//! - `^1.15`, `~1.15` - caret and tilde ranges
//! - `>=1.15`, `>1.15`, `<=1.15`, `<1.15`, `=1.15` - comparison operators
//! - `1.x`, `1.15.x`, `*` - wildcards (`x`, `X` and `*` are interchangeable)
//! - `1.16rc1`, `^1.2beta1` - prerelease tags
//! - `>=1.14 <1.16` - space or comma separated terms, all must satisfy
//! - `1.14.x || 1.16.x` - alternatives, any must satisfy
//!
//! A version with a prerelease tag only satisfies terms that carry a
//! prerelease tag themselves, so `1.x` never selects `go1.16rc1`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::version::error::ConstraintError;
use crate::version::go::GoVersion;

static TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(>=|=>|<=|=<|~>|>|<|=|~|\^)?(x|X|\*|\d+)(?:\.(x|X|\*|\d+))?(?:\.(x|X|\*|\d+))?([[:alpha:]][[:alnum:]]*)?$",
    )
    .unwrap()
});

const OPERATOR_CHARS: &[char] = &['>', '<', '=', '~', '^'];

/// Parsed constraint expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraints {
    /// Alternatives separated by `||`; each is a set of terms that must all hold
    alternatives: Vec<Vec<Comparator>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    /// No operator given: exact match
    Exact,
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Tilde,
    Caret,
}

impl Operator {
    fn parse(op: &str) -> Self {
        match op {
            "=" => Operator::Eq,
            ">" => Operator::Gt,
            ">=" | "=>" => Operator::Gte,
            "<" => Operator::Lt,
            "<=" | "=<" => Operator::Lte,
            "~" | "~>" => Operator::Tilde,
            "^" => Operator::Caret,
            _ => Operator::Exact,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Operator::Exact => "",
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Tilde => "~",
            Operator::Caret => "^",
        }
    }
}

/// A single term such as `>=1.15.0` or `1.x`.
///
/// `None` components are unconstrained because a wildcard appeared at or
/// before them.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    op: Operator,
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    prerelease: String,
}

impl Comparator {
    fn parse(term: &str) -> Option<Self> {
        let caps = TERM_RE.captures(term)?;
        let op = Operator::parse(caps.get(1).map_or("", |m| m.as_str()));

        // Until a wildcard shows up missing components default to 0; after it,
        // every remaining component is left open.
        let mut wildcard_seen = false;
        let mut components: [Option<u64>; 3] = [None; 3];
        for (slot, idx) in components.iter_mut().zip(2..=4) {
            if wildcard_seen {
                continue;
            }
            match caps.get(idx).map(|m| m.as_str()) {
                Some("x" | "X" | "*") => wildcard_seen = true,
                Some(digits) => *slot = Some(digits.parse().ok()?),
                None => *slot = Some(0),
            }
        }

        Some(Self {
            op,
            major: components[0],
            minor: components[1],
            patch: components[2],
            prerelease: caps
                .get(5)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        })
    }

    /// Lowest version this term refers to, wildcards counted as 0
    fn floor(&self) -> GoVersion {
        GoVersion::from_parts(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
            &self.prerelease,
        )
    }

    fn is_wildcard(&self) -> bool {
        self.patch.is_none()
    }

    /// Compare a version against this term looking only at constrained
    /// components; fully specified terms use the complete version order.
    fn compare(&self, version: &GoVersion) -> Ordering {
        if !self.is_wildcard() {
            return version.cmp(&self.floor());
        }
        let pairs = [
            (version.major(), self.major),
            (version.minor(), self.minor),
            (version.patch(), self.patch),
        ];
        for (actual, wanted) in pairs {
            let Some(wanted) = wanted else {
                break;
            };
            match actual.cmp(&wanted) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    fn satisfies(&self, version: &GoVersion) -> bool {
        if !version.is_stable() && self.prerelease.is_empty() {
            return false;
        }

        match self.op {
            Operator::Exact | Operator::Eq => self.compare(version) == Ordering::Equal,
            Operator::Gt => self.compare(version) == Ordering::Greater,
            Operator::Gte => self.compare(version) != Ordering::Less,
            Operator::Lt => self.compare(version) == Ordering::Less,
            Operator::Lte => self.compare(version) != Ordering::Greater,
            Operator::Tilde => {
                // ~1.2.3 -> >=1.2.3 <1.3.0
                // ~1.x -> >=1.0.0 <2.0.0
                // ~0.0.0 -> >=0.0.0
                if version < &self.floor() {
                    return false;
                }
                if (self.major, self.minor, self.patch) == (Some(0), Some(0), Some(0)) {
                    return true;
                }
                self.major.is_none_or(|major| version.major() == major)
                    && self.minor.is_none_or(|minor| version.minor() == minor)
            }
            Operator::Caret => {
                // ^1.2.3 -> >=1.2.3 <2.0.0
                // ^0.2.3 -> >=0.2.3 <0.3.0
                // ^0.0.3 -> >=0.0.3 <0.0.4
                if version < &self.floor() {
                    return false;
                }
                let Some(major) = self.major else {
                    return true;
                };
                if version.major() != major {
                    return false;
                }
                if major > 0 {
                    return true;
                }
                match (self.minor, self.patch) {
                    (None, _) => true,
                    (Some(minor), None) => version.minor() == minor,
                    (Some(minor), Some(_)) if minor > 0 => version.minor() == minor,
                    (Some(minor), Some(patch)) => {
                        version.minor() == minor && version.patch() == patch
                    }
                }
            }
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.op.as_str())?;
        match self.major {
            Some(major) => write!(f, "{}", major)?,
            None => f.write_str("*")?,
        }
        for component in [self.minor, self.patch] {
            if self.major.is_none() {
                break;
            }
            match component {
                Some(n) => write!(f, ".{}", n)?,
                None => {
                    f.write_str(".x")?;
                    break;
                }
            }
        }
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease)?;
        }
        Ok(())
    }
}

impl Constraints {
    /// Parse a constraint expression.
    ///
    /// Fails with [`ConstraintError::InvalidConstraint`] when the expression is
    /// empty or any term is not a valid range.
    pub fn parse(expr: &str) -> Result<Self, ConstraintError> {
        let invalid = || ConstraintError::InvalidConstraint(expr.to_string());

        let alternatives = expr
            .split("||")
            .map(|alternative| {
                let terms = split_terms(alternative);
                if terms.is_empty() {
                    return None;
                }
                terms
                    .iter()
                    .map(|term| Comparator::parse(term))
                    .collect::<Option<Vec<_>>>()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(invalid)?;

        Ok(Self { alternatives })
    }

    /// Check if a version satisfies the constraint
    pub fn check(&self, version: &GoVersion) -> bool {
        self.alternatives
            .iter()
            .any(|terms| terms.iter().all(|term| term.satisfies(version)))
    }

    /// Return the versions satisfying the constraint, in their original order
    pub fn filter<'a, I>(&self, versions: I) -> Vec<&'a GoVersion>
    where
        I: IntoIterator<Item = &'a GoVersion>,
    {
        versions.into_iter().filter(|v| self.check(v)).collect()
    }
}

/// Split one alternative into terms, gluing a bare operator such as `>=` in
/// `>= 1.2` onto the version that follows it.
fn split_terms(alternative: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut pending_op = String::new();

    for token in alternative
        .split(|c: char| c.is_whitespace() || c == ',' || c == '|')
        .filter(|t| !t.is_empty())
    {
        if token.chars().all(|c| OPERATOR_CHARS.contains(&c)) {
            pending_op.push_str(token);
            continue;
        }
        terms.push(format!("{}{}", std::mem::take(&mut pending_op), token));
    }

    if !pending_op.is_empty() {
        // A trailing operator never parses; keep it so the term fails.
        terms.push(pending_op);
    }
    terms
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, terms) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            for (j, term) in terms.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", term)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Constraints {
    type Err = ConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
