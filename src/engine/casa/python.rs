// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rendering of Python literals and task calls for CASA scripts.

use std::{fmt, path::Path};

use indexmap::IndexMap;
use itertools::Itertools;

/// A value that can be written as a Python literal.
#[derive(Debug, Clone, PartialEq)]
pub(super) enum PyValue {
    Str(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    List(Vec<PyValue>),
}

impl PyValue {
    pub(super) fn path(p: &Path) -> PyValue {
        PyValue::Str(p.display().to_string())
    }

    pub(super) fn str_list<S: AsRef<str>>(strings: &[S]) -> PyValue {
        PyValue::List(
            strings
                .iter()
                .map(|s| PyValue::Str(s.as_ref().to_string()))
                .collect(),
        )
    }
}

impl From<&str> for PyValue {
    fn from(s: &str) -> Self {
        PyValue::Str(s.to_string())
    }
}

impl From<String> for PyValue {
    fn from(s: String) -> Self {
        PyValue::Str(s)
    }
}

impl From<f64> for PyValue {
    fn from(f: f64) -> Self {
        PyValue::Float(f)
    }
}

impl From<u32> for PyValue {
    fn from(i: u32) -> Self {
        PyValue::Int(i.into())
    }
}

impl From<bool> for PyValue {
    fn from(b: bool) -> Self {
        PyValue::Bool(b)
    }
}

impl fmt::Display for PyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PyValue::Str(s) => {
                write!(f, "'")?;
                for c in s.chars() {
                    match c {
                        '\\' => write!(f, "\\\\")?,
                        '\'' => write!(f, "\\'")?,
                        '\n' => write!(f, "\\n")?,
                        '\r' => write!(f, "\\r")?,
                        '\t' => write!(f, "\\t")?,
                        c => write!(f, "{c}")?,
                    }
                }
                write!(f, "'")
            }
            // Debug formatting always keeps a decimal point or an exponent, so
            // Python sees a float.
            PyValue::Float(x) if x.is_nan() => write!(f, "float('nan')"),
            PyValue::Float(x) if x.is_infinite() && *x > 0.0 => write!(f, "float('inf')"),
            PyValue::Float(x) if x.is_infinite() => write!(f, "float('-inf')"),
            PyValue::Float(x) => write!(f, "{x:?}"),
            PyValue::Int(i) => write!(f, "{i}"),
            PyValue::Bool(true) => write!(f, "True"),
            PyValue::Bool(false) => write!(f, "False"),
            PyValue::List(l) => write!(f, "[{}]", l.iter().join(", ")),
        }
    }
}

/// Keyword arguments, kept in insertion order so scripts read like hand-written
/// ones.
pub(super) type Kwargs = IndexMap<&'static str, PyValue>;

/// Render `task(key=value, ...)`.
pub(super) fn render_call(task: &str, kwargs: &Kwargs) -> String {
    format!(
        "{task}({})",
        kwargs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .join(", ")
    )
}
