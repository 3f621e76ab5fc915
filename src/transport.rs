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

//! The transport layer.
//!
//! This module defines the [`Transport`] trait that all implementations must support, as well as
//! the UDP implementation actually used to reach the collector. Delivery is best-effort
//! telemetry: one datagram per formatted message, no retransmission, no acknowledgement.
//!
//! # Examples
//!
//! To send messages to a collector listening on a non-standard port:
//!
//! ```rust
//! use logtail_syslog::transport::UdpTransport;
//! let transpo = UdpTransport::new("some-host.domain.io", 5514);
//! assert!(transpo.is_err()); // no such host, after all
//! ```

use crate::error::{Error, Result};

use backtrace::Backtrace;

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations all transport layers must support.
pub trait Transport {
    /// Send a slice of bytes on this transport mechanism.
    ///
    /// It would be nice to make this more general, to accept input in a variety of forms that
    /// might support zero-copy, but at the end of the day a UDP socket operates on a contiguous
    /// slice of `u8`, so we require that our caller assemble one.
    fn send(&self, buf: &[u8]) -> Result<usize>;

    /// The resolved collector address, for implementations that have one; used by diagnostics
    /// to say where a failed send was headed.
    fn peer(&self) -> Option<SocketAddr> {
        None
    }
}

/// Sending syslog messages via UDP datagrams.
///
/// The collector's address is resolved exactly once, at construction; a host that resolves to no
/// usable IPv4 or IPv6 address is a construction-time error, not a send-time one. The socket is
/// bound to the wildcard address of the resolved family and connected, so each
/// [`send`](Transport::send) is a single datagram to the collector.
pub struct UdpTransport {
    socket: UdpSocket,
    peer: SocketAddr,
}

/// The Better Stack ingest endpoint, used by [`UdpTransport::try_default`].
pub const DEFAULT_COLLECTOR: (&str, u16) = ("in.logs.betterstack.com", 6517);

impl UdpTransport {
    /// Construct a [`Transport`] implementation via UDP to `host`:`port`.
    pub fn new(host: &str, port: u16) -> Result<UdpTransport> {
        let peer = (host, port)
            .to_socket_addrs()
            .map_err(|err| Error::Resolution {
                host: host.to_string(),
                source: Some(Box::new(err)),
                back: Backtrace::new(),
            })?
            .next()
            .ok_or_else(|| Error::Resolution {
                host: host.to_string(),
                source: None,
                back: Backtrace::new(),
            })?;
        // Bind to any available port on the wildcard address matching the peer's family...
        let bind_addr = if peer.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(bind_addr).map_err(|err| Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        })?;
        // and connect to the collector at `peer`:
        socket.connect(peer).map_err(|err| Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        })?;
        Ok(UdpTransport { socket, peer })
    }

    /// Construct a [`Transport`] implementation aimed at the Better Stack ingest endpoint.
    pub fn try_default() -> Result<UdpTransport> {
        UdpTransport::new(DEFAULT_COLLECTOR.0, DEFAULT_COLLECTOR.1)
    }
}

impl Transport for UdpTransport {
    fn send(&self, buf: &[u8]) -> Result<usize> {
        self.socket.send(buf).map_err(|err| Error::Transport {
            source: Box::new(err),
            back: Backtrace::new(),
        })
    }

    fn peer(&self) -> Option<SocketAddr> {
        Some(self.peer)
    }
}
