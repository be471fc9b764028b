//! Minimal ERB-style renderer for cookbook shell templates.
//!
//! Only output tags are evaluated, and only as lookups into [`Bindings`]:
//!
//! - `<%= node.java.default_version %>` (also `node['java']['default_version']`,
//!   `node["java"]["default_version"]` and `node[:java][:default_version]`)
//! - `<%# comment %>` renders to nothing
//! - `<%%` renders a literal `<%`
//! - a closing `-%>` swallows the newline right after the tag
//!
//! Code tags (`<% if ... %>`) are rejected instead of being silently dropped.

use crate::domain::model::JavaAttributes;
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_VERSION_PATH: &str = "node.java.default_version";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unterminated tag opened on line {line}")]
    Unterminated { line: usize },

    #[error("unknown variable `{path}` on line {line}")]
    UnknownVariable { path: String, line: usize },

    #[error("unsupported code tag `{tag}` on line {line}, only output tags can be rendered")]
    UnsupportedTag { tag: String, line: usize },

    #[error("cannot parse expression `{expr}` on line {line}")]
    InvalidExpression { expr: String, line: usize },

    #[error("`{name}` is not a valid binding name")]
    InvalidBinding { name: String },

    #[error("template is not valid UTF-8")]
    InvalidEncoding,
}

/// Values visible to a template, keyed by normalised lookup path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    values: BTreeMap<String, String>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_java(java: &JavaAttributes) -> Self {
        let mut bindings = Self::new();
        bindings
            .values
            .insert(DEFAULT_VERSION_PATH.to_string(), java.default_version.clone());
        bindings
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Result<(), TemplateError> {
        let path = normalize_path(name).ok_or_else(|| TemplateError::InvalidBinding {
            name: name.to_string(),
        })?;
        self.values.insert(path, value.into());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        normalize_path(name).and_then(|path| self.values.get(&path).map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    pub substitutions: usize,
}

pub fn render(template: &str, bindings: &Bindings) -> Result<Rendered, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut substitutions = 0;
    let mut rest = template;

    while let Some(open) = rest.find("<%") {
        out.push_str(&rest[..open]);
        let line = line_at(template, template.len() - rest.len() + open);
        let after_open = &rest[open + 2..];

        if let Some(after) = after_open.strip_prefix('%') {
            out.push_str("<%");
            rest = after;
            continue;
        }

        let close = after_open
            .find("%>")
            .ok_or(TemplateError::Unterminated { line })?;
        let raw = &after_open[..close];
        let mut tail = &after_open[close + 2..];
        let (body, trim_newline) = match raw.strip_suffix('-') {
            Some(body) => (body, true),
            None => (raw, false),
        };

        if let Some(expr) = body.strip_prefix('=') {
            let path = normalize_path(expr).ok_or_else(|| TemplateError::InvalidExpression {
                expr: expr.trim().to_string(),
                line,
            })?;
            let value = bindings
                .values
                .get(&path)
                .ok_or(TemplateError::UnknownVariable { path, line })?;
            out.push_str(value);
            substitutions += 1;
        } else if !body.starts_with('#') {
            return Err(TemplateError::UnsupportedTag {
                tag: body.trim().to_string(),
                line,
            });
        }

        if trim_newline {
            tail = tail
                .strip_prefix("\r\n")
                .or_else(|| tail.strip_prefix('\n'))
                .unwrap_or(tail);
        }
        rest = tail;
    }
    out.push_str(rest);

    Ok(Rendered {
        content: out,
        substitutions,
    })
}

fn line_at(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// `node['java'][:default_version]` -> `node.java.default_version`
fn normalize_path(expr: &str) -> Option<String> {
    let (head, mut rest) = split_ident(expr.trim())?;
    let mut segments = vec![head];

    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (ident, tail) = split_ident(after_dot)?;
            segments.push(ident);
            rest = tail;
        } else if let Some(inner) = rest.strip_prefix('[') {
            let close = inner.find(']')?;
            segments.push(index_key(inner[..close].trim())?);
            rest = &inner[close + 1..];
        } else {
            return None;
        }
    }

    Some(segments.join("."))
}

fn split_ident(s: &str) -> Option<(&str, &str)> {
    let end = s
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    match s.chars().next() {
        Some(c) if end > 0 && (c.is_ascii_alphabetic() || c == '_') => Some((&s[..end], &s[end..])),
        _ => None,
    }
}

fn index_key(key: &str) -> Option<&str> {
    let inner = if let Some(symbol) = key.strip_prefix(':') {
        symbol
    } else {
        ['\'', '"']
            .into_iter()
            .find_map(|q| key.strip_prefix(q).and_then(|k| k.strip_suffix(q)))?
    };
    match split_ident(inner)? {
        (ident, "") => Some(ident),
        _ => None,
    }
}
