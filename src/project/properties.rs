// src/project/properties.rs

//! Property expansion.
//!
//! `$name` and `${name}` are replaced by the string form of the property.
//! Substitution repeats until the text no longer changes, so property values
//! may reference other properties. `$$` escapes a dollar sign; it stays
//! escaped in expanded text and is unfolded by [`unescape`] where the text
//! is finally used.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use toml::Value;

use crate::errors::{BuildError, Result};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:(\$)|([_A-Za-z][_A-Za-z0-9]*)|\{([_A-Za-z][_A-Za-z0-9]*)\})")
        .expect("valid placeholder pattern")
});

/// Upper bound on substitution rounds; self-growing references never settle.
const MAX_ROUNDS: usize = 64;

/// String form of a property value as used in expansion.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Expand `template` against `properties` until a fixed point is reached.
/// Expanding the result again returns it unchanged.
pub fn expand(template: &str, properties: &BTreeMap<String, Value>) -> Result<String> {
    let mut current = template.to_string();
    for _ in 0..MAX_ROUNDS {
        let next = substitute(&current, properties)?;
        if next == current {
            return Ok(next);
        }
        current = next;
    }
    Err(BuildError::BuildFailed(format!(
        "expansion of '{template}' does not reach a fixed point"
    )))
}

/// Turn the `$$` escapes of expanded text into literal `$`.
pub fn unescape(expanded: &str) -> String {
    expanded.replace("$$", "$")
}

fn substitute(text: &str, properties: &BTreeMap<String, Value>) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        out.push_str(&text[last..whole.start()]);
        last = whole.end();

        if caps.get(1).is_some() {
            out.push_str("$$");
            continue;
        }
        let name = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
            .unwrap_or_default();
        let value = properties
            .get(name)
            .ok_or_else(|| BuildError::MissingProperty(name.to_string()))?;
        out.push_str(&render_value(value));
    }

    out.push_str(&text[last..]);
    Ok(out)
}

/// Lexically normalise a path: drop `.` segments and fold `..`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
