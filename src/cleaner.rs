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

//! String sanitization for RFC [5424] header fields & structured data.
//!
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424
//!
//! RFC 5424 places assorted restrictions on the textual fields of a syslog message: APP-NAME &
//! MSGID must be printable ASCII of bounded length, structured-data parameter names may not
//! contain `=`, `"` or `]`, structured-data parameter values must escape `"`, `\` & `]`, and so
//! forth. Rather than scatter that logic across the formatter, [`StringCleaner`] expresses it as
//! an ordered pipeline of named, pure operations over an owned [`String`]:
//!
//! ```rust
//! use logtail_syslog::cleaner::StringCleaner;
//!
//! let msg_id = StringCleaner::new("\"My.Source.Context\"")
//!     .trim('"')
//!     .unescape_quotes()
//!     .ascii_printable()
//!     .max_length(32)
//!     .build();
//! assert_eq!(msg_id, "My.Source.Context");
//! ```
//!
//! Every operation is total: it never fails, and empty input yields empty output at every stage.

/// An immutable sanitization pipeline over a [`String`].
///
/// Each operation consumes the cleaner and returns a new one; [`build`](StringCleaner::build)
/// terminates the chain. Operations are applied left-to-right and have no effect beyond the
/// string itself.
pub struct StringCleaner {
    buf: String,
}

impl StringCleaner {
    pub fn new<S: Into<String>>(source: S) -> StringCleaner {
        StringCleaner { buf: source.into() }
    }

    /// Remove at most one leading and one trailing occurrence of `ch`.
    pub fn trim(mut self, ch: char) -> Self {
        if self.buf.starts_with(ch) {
            self.buf.remove(0);
        }
        if self.buf.ends_with(ch) {
            self.buf.pop();
        }
        self
    }

    /// Replace every `\"` with `"`.
    pub fn unescape_quotes(mut self) -> Self {
        self.buf = self.buf.replace("\\\"", "\"");
        self
    }

    /// Retain only characters in the inclusive range U+0021..U+007E, preserving relative order.
    ///
    /// Note that this removes spaces as well as control & non-ASCII characters; that is what the
    /// RFC's PRINTUSASCII production demands of header fields.
    pub fn ascii_printable(mut self) -> Self {
        self.buf.retain(|c| ('\u{21}'..='\u{7e}').contains(&c));
        self
    }

    /// Remove every occurrence of each character in `charset`.
    pub fn strip(mut self, charset: &[char]) -> Self {
        self.buf.retain(|c| !charset.contains(&c));
        self
    }

    /// Prefix every occurrence of each character in `charset` with a backslash.
    ///
    /// A single pass over the original characters; inserted backslashes are never re-escaped.
    pub fn escape(self, charset: &[char]) -> Self {
        let mut buf = String::with_capacity(self.buf.len());
        for c in self.buf.chars() {
            if charset.contains(&c) {
                buf.push('\\');
            }
            buf.push(c);
        }
        StringCleaner { buf }
    }

    /// Truncate to the first `max_length` characters; if truncation occurred and the result ends
    /// with a space, that trailing space is removed.
    pub fn max_length(mut self, max_length: usize) -> Self {
        if self.buf.chars().count() <= max_length {
            return self;
        }
        self.buf = self.buf.chars().take(max_length).collect();
        if self.buf.ends_with(' ') {
            self.buf.pop();
        }
        self
    }

    pub fn build(self) -> String {
        self.buf
    }
}
