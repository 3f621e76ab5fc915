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

//! Best-effort shipping of structured log events to a [Logtail] collector as RFC [5424] syslog
//! over UDP.
//!
//! [Logtail]: https://betterstack.com/logs
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424
//!
//! # Introduction
//!
//! The Better Stack (née Logtail) ingest endpoint accepts RFC 5424 syslog with the source token
//! carried in a structured-data element. This crate turns one [`LogEvent`] into one such line:
//!
//! ```text
//! <PRI>1 TIMESTAMP HOST APP-NAME PROCID MSGID [tokenKey="token"][dataName k1="v1" k2="v2"] MSG
//! ```
//!
//! for instance:
//!
//! ```text
//! <14>1 2013-12-19T04:01:02.357852+00:00 myhost TestApp 1234 - [Logtail="SOURCE_TOKEN"] This is a test message
//! ```
//!
//! and ships batches of them, one UDP datagram apiece, to the collector. Delivery is
//! best-effort telemetry: a failed send is reported on the diagnostic side-channel (the
//! [`tracing`] macros) and the rest of the batch carries on; there is no retry, no ordering
//! guarantee across independent failures, and no persistence of unsent events.
//!
//! The pieces compose the way the wire format suggests:
//!
//! 1. [`cleaner::StringCleaner`] conforms text to the RFC's field restrictions;
//! 2. [`formatter::LogtailFormatter`] assembles the line, mapping the event's [`LogLevel`] to a
//!    syslog [`Severity`](facility::Severity) with a pluggable strategy;
//! 3. [`sink::LogtailSink`] sends each formatted line over a [`transport::Transport`].
//!
//! Buffering & flush policy (batch size, timers, queue capacity) belong to the host's batching
//! scheduler, not to this crate; [`sink::BatchingOptions`] merely carries the knobs a host hands
//! to that scheduler.
//!
//! # Usage
//!
//! ```no_run
//! use chrono::prelude::*;
//! use logtail_syslog::event::{LogEvent, LogLevel};
//! use logtail_syslog::formatter::LogtailFormatter;
//! use logtail_syslog::sink::LogtailSink;
//! use logtail_syslog::transport::UdpTransport;
//!
//! let formatter = LogtailFormatter::builder("$SOURCE_TOKEN")
//!     .app_name("my-service")
//!     .build();
//! // The collector's name is resolved here, once; failure is fatal at setup, not at send time.
//! let sink = LogtailSink::new(formatter, UdpTransport::try_default().unwrap());
//!
//! let event = LogEvent::new(Utc::now().fixed_offset(), LogLevel::Information, "Hello, {name}!")
//!     .with_property("name", "world");
//! sink.emit_batch(&[event]);
//! ```
//!
//! [`LogEvent`]: event::LogEvent
//! [`LogLevel`]: event::LogLevel

pub mod cleaner;
pub mod error;
pub mod event;
pub mod facility;
pub mod formatter;
pub mod sink;
pub mod transport;

pub use error::{Error, Result};
pub use event::{LogEvent, LogLevel, Value};
pub use facility::{Facility, Severity};
pub use formatter::LogtailFormatter;
pub use sink::{BatchingOptions, LogtailSink};
pub use transport::UdpTransport;
