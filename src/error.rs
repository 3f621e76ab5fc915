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

//! [logtail-syslog](crate) errors

use backtrace::Backtrace;

/// [logtail-syslog](crate) error type
///
/// [logtail-syslog](crate) eschews libraries like [thiserror], [anyhow] & [Snafu] in favor of
/// a straightforward enumeration with a few match arms chosen on the basis of what the caller
/// will need to respond.
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [Snafu]: https://docs.rs/snafu/latest/snafu
#[non_exhaustive]
pub enum Error {
    /// A facility code outside [0, 23]
    BadFacilityCode { code: u8, back: Backtrace },
    /// A severity code outside [0, 7]
    BadSeverityCode { code: u8, back: Backtrace },
    /// Name resolution yielded no usable IPv4 or IPv6 address for the collector
    Resolution {
        host: String,
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
        back: Backtrace,
    },
    /// The sink was closed; its socket is gone
    SinkClosed { back: Backtrace },
    /// General transport layer error
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadFacilityCode { code, .. } => {
                write!(f, "{} is not an RFC 5424 facility code", code)
            }
            Error::BadSeverityCode { code, .. } => {
                write!(f, "{} is not an RFC 5424 severity code", code)
            }
            Error::Resolution { host, source, .. } => match source {
                Some(err) => write!(f, "Failed to resolve '{}': {}", host, err),
                None => write!(f, "'{}' resolved to no usable IPv4 or IPv6 address", host),
            },
            Error::SinkClosed { .. } => write!(f, "The sink has been closed"),
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            _ => write!(f, "Other logtail-syslog error"),
        }
    }
}

impl std::fmt::Debug for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadFacilityCode { code: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::BadSeverityCode { code: _, back } => write!(f, "{}\n{:?}", self, back),
            Error::Resolution { back, .. } => write!(f, "{}\n{:?}", self, back),
            Error::SinkClosed { back } => write!(f, "{}\n{:?}", self, back),
            Error::Transport { source: _, back } => write!(f, "{}\n{:?}", self, back),
            err => write!(f, "logtail-syslog error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
