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

//! The batched dispatcher.
//!
//! [`LogtailSink`] is handed ordered batches of [`LogEvent`]s by an external batching scheduler
//! (the thing deciding *when* to flush, on what size & time thresholds-- deliberately not this
//! crate's concern). For each event, in order, it formats one RFC 5424 line and attempts a
//! single UDP send. A failed send is reported on the diagnostic side-channel (the [`tracing`]
//! macros) and does not disturb the remaining events in the batch: this is best-effort
//! telemetry, never critical-path, so there is no retry & no error propagation to the caller.

use crate::{
    error::{Error, Result},
    event::LogEvent,
    formatter::LogtailFormatter,
    transport::Transport,
};

use backtrace::Backtrace;
use tracing::{debug, warn};

use std::{net::SocketAddr, time::Duration};

/// Knobs for the external batching scheduler.
///
/// The scheduler that buffers events & decides flush timing is outside this crate; these are the
/// settings a host passes to it when wiring a [`LogtailSink`] up.
#[derive(Clone, Debug)]
pub struct BatchingOptions {
    /// Maximum number of events in a single batch
    pub batch_size_limit: usize,
    /// Maximum time to buffer events before flushing
    pub buffering_time_limit: Duration,
    /// Maximum number of events held in the queue before new ones are dropped
    pub queue_limit: usize,
    /// Flush the very first event immediately rather than waiting out the buffering time
    pub eagerly_emit_first_event: bool,
}

impl std::default::Default for BatchingOptions {
    fn default() -> Self {
        BatchingOptions {
            batch_size_limit: 1000,
            buffering_time_limit: Duration::from_secs(2),
            queue_limit: 100_000,
            eagerly_emit_first_event: true,
        }
    }
}

/// A sink that writes log events to a remote collector using UDP.
///
/// One batch is processed at a time, to completion; within a batch, sends are issued
/// sequentially in the batch's order. The formatter & the sanitization pipeline beneath it are
/// pure, so the sink needs no locking beyond whatever the socket primitive itself carries.
pub struct LogtailSink<T: Transport> {
    formatter: LogtailFormatter,
    transport: Option<T>,
}

impl<T: Transport> LogtailSink<T> {
    pub fn new(formatter: LogtailFormatter, transport: T) -> LogtailSink<T> {
        LogtailSink {
            formatter,
            transport: Some(transport),
        }
    }

    /// Format & transmit a batch of events, in order.
    ///
    /// Failures are isolated per message: a transport error for one event is reported via
    /// [`tracing::warn!`] and processing continues with the next event. Nothing is propagated
    /// to the caller.
    pub fn emit_batch(&self, events: &[LogEvent]) {
        for (index, event) in events.iter().enumerate() {
            let message = self.formatter.format_message(event);
            if let Err(err) = self.send_one(message.as_bytes()) {
                match self.peer() {
                    Some(peer) => warn!(
                        "error while sending log event {} of {} to {}: {}",
                        index + 1,
                        events.len(),
                        peer,
                        err
                    ),
                    None => warn!(
                        "error while sending log event {} of {}: {}",
                        index + 1,
                        events.len(),
                        err
                    ),
                }
            }
        }
    }

    /// An empty-batch notification from the scheduler; a no-op.
    pub fn on_empty_batch(&self) {
        debug!("empty batch; nothing to send");
    }

    /// Close the underlying socket. Sends attempted after this fail immediately & are treated
    /// as per-event failures by [`emit_batch`](LogtailSink::emit_batch).
    pub fn close(&mut self) {
        self.transport = None;
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// The resolved collector address, while the sink is open & its transport has one.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.transport.as_ref().and_then(|transport| transport.peer())
    }

    fn send_one(&self, buf: &[u8]) -> Result<usize> {
        match &self.transport {
            Some(transport) => transport.send(buf),
            None => Err(Error::SinkClosed {
                back: Backtrace::new(),
            }),
        }
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::{
        event::LogLevel,
        facility::Facility,
        transport::{Transport, UdpTransport},
    };

    use chrono::prelude::*;

    use std::sync::Mutex;

    /// A [`Transport`] that records every payload it is given & fails on a chosen send.
    struct FlakyTransport {
        sent: Mutex<Vec<Vec<u8>>>,
        fail_on: usize, // 1-based index of the send that will fail
        calls: Mutex<usize>,
    }

    impl FlakyTransport {
        fn new(fail_on: usize) -> FlakyTransport {
            FlakyTransport {
                sent: Mutex::new(Vec::new()),
                fail_on,
                calls: Mutex::new(0),
            }
        }
    }

    impl Transport for FlakyTransport {
        fn send(&self, buf: &[u8]) -> crate::error::Result<usize> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == self.fail_on {
                return Err(Error::Transport {
                    source: Box::new(std::io::Error::new(
                        std::io::ErrorKind::ConnectionRefused,
                        "socket error",
                    )),
                    back: Backtrace::new(),
                });
            }
            self.sent.lock().unwrap().push(buf.to_vec());
            Ok(buf.len())
        }

        fn peer(&self) -> Option<SocketAddr> {
            Some("203.0.113.9:6517".parse().unwrap())
        }
    }

    fn test_formatter() -> LogtailFormatter {
        LogtailFormatter::builder("SOURCE_TOKEN")
            .token_key("Logtail")
            .facility(Facility::User)
            .app_name("TestApp")
            .hostname("myhost")
            .pid("1234")
            .build()
    }

    fn test_event(msg: &str) -> LogEvent {
        let timestamp = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2013, 12, 19, 4, 1, 2)
            .unwrap();
        LogEvent::new(timestamp, LogLevel::Information, msg)
    }

    #[test]
    fn failures_are_isolated_per_event() {
        let sink = LogtailSink::new(test_formatter(), FlakyTransport::new(2));
        let batch = vec![test_event("one"), test_event("two"), test_event("three")];
        sink.emit_batch(&batch);

        // The 2nd send failed; events 1 & 3 still went out, in order.
        let transport = sink.transport.as_ref().unwrap();
        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(std::str::from_utf8(&sent[0]).unwrap().ends_with(" one"));
        assert!(std::str::from_utf8(&sent[1]).unwrap().ends_with(" three"));
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let sink = LogtailSink::new(test_formatter(), FlakyTransport::new(usize::MAX));
        sink.emit_batch(&[]);
        sink.on_empty_batch();
        assert_eq!(sink.transport.as_ref().unwrap().sent.lock().unwrap().len(), 0);
    }

    #[test]
    fn failure_diagnostics_name_the_collector() {
        // The address a failed send was headed for comes from the transport & is available
        // for the warn! line; once the sink is closed there is no longer an address to name.
        let mut sink = LogtailSink::new(test_formatter(), FlakyTransport::new(1));
        assert_eq!(sink.peer(), Some("203.0.113.9:6517".parse().unwrap()));
        sink.emit_batch(&[test_event("one")]);
        sink.close();
        assert_eq!(sink.peer(), None);
    }

    #[test]
    fn sends_after_close_fail_per_event() {
        let mut sink = LogtailSink::new(test_formatter(), FlakyTransport::new(usize::MAX));
        sink.close();
        assert!(sink.is_closed());
        // Must neither panic nor propagate anything.
        sink.emit_batch(&[test_event("dropped")]);
    }

    #[test]
    fn one_datagram_per_event() {
        let receiver = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(std::time::Duration::from_secs(5)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();
        let sink = LogtailSink::new(
            test_formatter(),
            UdpTransport::new("127.0.0.1", port).unwrap(),
        );
        sink.emit_batch(&[test_event("one"), test_event("two")]);

        let mut buf = [0u8; 2048];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert!(std::str::from_utf8(&buf[..n]).unwrap().ends_with(" one"));
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert!(std::str::from_utf8(&buf[..n]).unwrap().ends_with(" two"));
    }
}
