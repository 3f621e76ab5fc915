// Copyright (C) 2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of logtail-syslog.
//
// logtail-syslog is free software: you can redistribute it and/or modify it under the terms of the
// GNU General Public License as published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// logtail-syslog is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with logtail-syslog.  If
// not, see <http://www.gnu.org/licenses/>.

//! The application-side log event model.
//!
//! [`LogEvent`] is the input to the formatting & dispatch pipeline: a timestamp (with
//! sub-millisecond precision & an explicit UTC offset), a [`LogLevel`], a message template, an
//! ordered collection of named properties, and an optional error description.
//!
//! Property order matters: RFC 5424 structured data is rendered in the event's original
//! insertion order, so properties are kept in a plain `Vec` of pairs rather than any hashed
//! container.

use crate::facility::Severity;

use chrono::prelude::*;

type StdResult<T, E> = std::result::Result<T, E>;

/// The levels at which an application may log.
///
/// These mirror the conventional "verbose through fatal" ladder found in structured-logging
/// frameworks; they are mapped to syslog [`Severity`] values at format time (see
/// [`default_severity_mapping`] & [`value_based_severity_mapping`]).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LogLevel {
    /// Anything & everything
    Verbose,
    /// Internal system events, useful during development & diagnosis
    Debug,
    /// The lifeblood of operational intelligence; things happen
    Information,
    /// Service is degraded or endangered
    Warning,
    /// Functionality is unavailable; invariants are broken
    Error,
    /// The aptly-named fatal level
    Fatal,
}

/// The default mapping from [`LogLevel`] to syslog [`Severity`]: match by name.
///
/// Levels without a syslog namesake (in practice, [`LogLevel::Verbose`]) fall back to
/// [`Severity::Notice`], which admittedly inverts the relative importance of the two; the
/// mapping is kept for compatibility with existing collector-side filtering.
pub fn default_severity_mapping(level: LogLevel) -> Severity {
    match level {
        LogLevel::Debug => Severity::Debug,
        LogLevel::Information => Severity::Informational,
        LogLevel::Warning => Severity::Warning,
        LogLevel::Error => Severity::Error,
        LogLevel::Fatal => Severity::Emergency,
        _ => Severity::Notice,
    }
}

/// An alternative mapping from [`LogLevel`] to syslog [`Severity`]: match by relative value
/// rather than by name.
///
/// syslog has more levels than the application ladder, so [`Severity::Critical`] and
/// [`Severity::Alert`] are skipped and [`LogLevel::Fatal`] maps to [`Severity::Emergency`].
/// The match is exhaustive; [`LogLevel`] being a closed enumeration, there is no
/// "unrecognized level" arm to error on.
pub fn value_based_severity_mapping(level: LogLevel) -> Severity {
    match level {
        LogLevel::Verbose => Severity::Debug,
        LogLevel::Debug => Severity::Informational,
        LogLevel::Information => Severity::Notice,
        LogLevel::Warning => Severity::Warning,
        LogLevel::Error => Severity::Error,
        LogLevel::Fatal => Severity::Emergency,
    }
}

/// A scalar property value.
///
/// The [`Display`](std::fmt::Display) implementation produces the value's display form: strings
/// are quoted, numerics & booleans are bare. This convention is what makes the `trim('"')` stage
/// of the structured-data value pipeline meaningful-- the surrounding quotes are put there by
/// rendering, not by the caller.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        match self {
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// One structured application log event.
pub struct LogEvent {
    timestamp: DateTime<FixedOffset>,
    level: LogLevel,
    template: String,
    properties: Vec<(String, Value)>,
    error: Option<String>,
}

impl LogEvent {
    pub fn new<S: Into<String>>(
        timestamp: DateTime<FixedOffset>,
        level: LogLevel,
        template: S,
    ) -> LogEvent {
        LogEvent {
            timestamp,
            level,
            template: template.into(),
            properties: Vec::new(),
            error: None,
        }
    }

    /// Append a property; insertion order is preserved through to the wire format.
    pub fn with_property<S: Into<String>, V: Into<Value>>(mut self, name: S, value: V) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// Attach an error description. Carried on the event for the benefit of custom body
    /// renderers; the stock formatter does not emit it.
    pub fn with_error<S: Into<String>>(mut self, error: S) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn timestamp(&self) -> &DateTime<FixedOffset> {
        &self.timestamp
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn properties(&self) -> &[(String, Value)] {
        &self.properties
    }

    /// Look up a property by name (first match wins).
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Render the message template: each `{Name}` placeholder is replaced by the display form of
    /// the property of that name (strings quoted, numerics bare); `{{` & `}}` are brace escapes;
    /// placeholders naming no property are left verbatim.
    pub fn render_message(&self) -> String {
        let mut out = String::with_capacity(self.template.len());
        let mut chars = self.template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    match (closed, self.property(&name)) {
                        (true, Some(value)) => out.push_str(&value.to_string()),
                        (true, None) => {
                            out.push('{');
                            out.push_str(&name);
                            out.push('}');
                        }
                        (false, _) => {
                            // Unterminated placeholder; emit what we consumed.
                            out.push('{');
                            out.push_str(&name);
                        }
                    }
                }
                c => out.push(c),
            }
        }
        out
    }
}
