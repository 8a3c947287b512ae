// src/project/version.rs

//! Release versions and version specifier sets.
//!
//! Only the subset needed by the engine is modelled: a plain release
//! version (`1.2`, `2.0rc1`, `1.0.dev3`) or a comma separated list of
//! `<op><version>` clauses. Matching compares the numeric release segments.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{BuildError, Result};

static RELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^v?\d+(\.\d+)*((a|b|c|rc|alpha|beta)\d*)?([.-]?post\d*)?([.-]?dev\d*)?(\+[a-z0-9.]+)?$",
    )
    .expect("valid release pattern")
});

static CLAUSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(~=|===|==|!=|<=|>=|<|>)\s*(\S+)$").expect("valid clause pattern"));

static NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v?(\d+(?:\.\d+)*)").expect("valid numeric pattern"));

/// Whether `version` is a plain release version.
pub fn is_release_version(version: &str) -> bool {
    RELEASE.is_match(version.trim())
}

/// Canonical form of a dependency version: `>=<version>` for a plain
/// release, otherwise the normalised specifier set.
pub fn canonicalize_version(version: &str) -> Result<String> {
    let version = version.trim();
    if is_release_version(version) {
        return Ok(format!(">={version}"));
    }
    Ok(VersionSpec::parse(version)?.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Compatible,
    Arbitrary,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "~=" => Operator::Compatible,
            "===" => Operator::Arbitrary,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<=" => Operator::LessEqual,
            ">=" => Operator::GreaterEqual,
            "<" => Operator::Less,
            ">" => Operator::Greater,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            Operator::Compatible => "~=",
            Operator::Arbitrary => "===",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Clause {
    op: Operator,
    version: String,
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op.as_str(), self.version)
    }
}

/// A parsed specifier set such as `>=1.0,!=1.3.*,<2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSpec {
    clauses: Vec<Clause>,
}

impl VersionSpec {
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = || BuildError::InvalidVersion(spec.to_string());
        let mut clauses = Vec::new();

        for raw in spec.split(',') {
            let caps = CLAUSE.captures(raw.trim()).ok_or_else(invalid)?;
            let op = Operator::parse(&caps[1]).ok_or_else(invalid)?;
            let version = caps[2].to_string();
            let wildcard = version.strip_suffix(".*");
            let valid = match (op, wildcard) {
                (Operator::Arbitrary, _) => true,
                (Operator::Equal | Operator::NotEqual, Some(prefix)) => is_release_version(prefix),
                (_, Some(_)) => false,
                (_, None) => is_release_version(&version),
            };
            if !valid {
                return Err(invalid());
            }
            clauses.push(Clause { op, version });
        }

        clauses.sort_by_key(|c| c.to_string());
        Ok(Self { clauses })
    }

    /// Whether `version` satisfies every clause.
    pub fn matches(&self, version: &str) -> bool {
        let actual = release_segments(version);
        self.clauses.iter().all(|clause| {
            if clause.op == Operator::Arbitrary {
                return clause.version == version;
            }
            if let Some(prefix) = clause.version.strip_suffix(".*") {
                let prefix = release_segments(prefix);
                let matches = actual.len() >= prefix.len() && actual[..prefix.len()] == prefix[..];
                return match clause.op {
                    Operator::Equal => matches,
                    _ => !matches,
                };
            }

            let wanted = release_segments(&clause.version);
            let ordering = compare_segments(&actual, &wanted);
            match clause.op {
                Operator::Equal => ordering == Ordering::Equal,
                Operator::NotEqual => ordering != Ordering::Equal,
                Operator::LessEqual => ordering != Ordering::Greater,
                Operator::GreaterEqual => ordering != Ordering::Less,
                Operator::Less => ordering == Ordering::Less,
                Operator::Greater => ordering == Ordering::Greater,
                Operator::Compatible => {
                    let prefix = &wanted[..wanted.len().saturating_sub(1).max(1)];
                    ordering != Ordering::Less
                        && actual.len() >= prefix.len()
                        && actual[..prefix.len()] == prefix[..]
                }
                Operator::Arbitrary => unreachable!("handled above"),
            }
        })
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.clauses.iter().map(Clause::to_string).collect();
        f.write_str(&rendered.join(","))
    }
}

fn release_segments(version: &str) -> Vec<u64> {
    NUMERIC_PREFIX
        .captures(version.trim())
        .map(|caps| {
            caps[1]
                .split('.')
                .filter_map(|segment| segment.parse().ok())
                .collect()
        })
        .unwrap_or_default()
}

fn compare_segments(left: &[u64], right: &[u64]) -> Ordering {
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}
