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

//! syslog facility & severity definitions.
//!
//! [`Facility`] and [`Severity`] carry the numeric codes assigned by RFC [5424] (which inherited
//! them from `<syslog.h>` by way of RFC [3164]): facilities 0 through 23, severities 0 through 7.
//! The PRI field of a syslog message packs the two together as `facility * 8 + severity`.
//!
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424
//! [3164]: https://datatracker.ietf.org/doc/html/rfc3164
//!
//! The "facility" is clearly designed to indicate the source of the log message, but regrettably
//! selected a pre-defined set of values, along with eight "local" values and a "user" value
//! (documented in the `<syslog.h>` header file as, I kid you not, "random user-level
//! messages"). A sink shipping application telemetry to a collector has no business claiming to
//! be a line printer or a Usenet server, which is why [`Facility::Local0`] is the default here.

use crate::error::{Error, Result};

use backtrace::Backtrace;

type StdResult<T, E> = std::result::Result<T, E>;

/// RFC [5424] defines twenty-four "facilities" for messages. The enumeration values duplicate
/// the constants defined in `<syslog.h>`.
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Facility {
    /// kernel messages
    Kern = 0,
    /// random user-level messages
    User = 1,
    /// mail system
    Mail = 2,
    /// system daemons
    Daemon = 3,
    /// security/authorization messages
    Auth = 4,
    /// messages generated internally by syslogd
    Syslog = 5,
    /// line printer subsystem
    Lpr = 6,
    /// network news subsystem
    News = 7,
    /// UUCP subsystem
    Uucp = 8,
    /// clock daemon
    Cron = 9,
    /// security/authorization messages (private)
    AuthPriv = 10,
    /// ftp daemon
    Ftp = 11,
    /// NTP subsystem
    Ntp = 12,
    /// log audit
    Audit = 13,
    /// log alert
    Alert = 14,
    /// clock daemon (again; various operating systems have used both 9 & 15)
    Clock = 15,
    /// reserved for local use
    Local0 = 16,
    /// reserved for local use
    Local1 = 17,
    /// reserved for local use
    Local2 = 18,
    /// reserved for local use
    Local3 = 19,
    /// reserved for local use
    Local4 = 20,
    /// reserved for local use
    Local5 = 21,
    /// reserved for local use
    Local6 = 22,
    /// reserved for local use
    Local7 = 23,
}

impl std::default::Default for Facility {
    /// The default facility is `Local0`, matching the Logtail collector's expectations.
    fn default() -> Self {
        Facility::Local0
    }
}

impl std::convert::TryFrom<u8> for Facility {
    type Error = Error;
    fn try_from(x: u8) -> Result<Self> {
        use Facility::*;
        match x {
            0 => Ok(Kern),
            1 => Ok(User),
            2 => Ok(Mail),
            3 => Ok(Daemon),
            4 => Ok(Auth),
            5 => Ok(Syslog),
            6 => Ok(Lpr),
            7 => Ok(News),
            8 => Ok(Uucp),
            9 => Ok(Cron),
            10 => Ok(AuthPriv),
            11 => Ok(Ftp),
            12 => Ok(Ntp),
            13 => Ok(Audit),
            14 => Ok(Alert),
            15 => Ok(Clock),
            16 => Ok(Local0),
            17 => Ok(Local1),
            18 => Ok(Local2),
            19 => Ok(Local3),
            20 => Ok(Local4),
            21 => Ok(Local5),
            22 => Ok(Local6),
            23 => Ok(Local7),
            _ => Err(Error::BadFacilityCode {
                code: x,
                back: Backtrace::new(),
            }),
        }
    }
}

/// RFC [5424] defines eight severity levels for messages, 0 (most urgent) through 7 (least).
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Severity {
    /// system is unusable
    Emergency = 0,
    /// action must be taken immediately
    Alert = 1,
    /// critical conditions
    Critical = 2,
    /// error conditions
    Error = 3,
    /// warning conditions
    Warning = 4,
    /// normal, but significant condition
    Notice = 5,
    /// informational message
    Informational = 6,
    /// debug-level message
    Debug = 7,
}

impl std::convert::TryFrom<u8> for Severity {
    type Error = Error;
    fn try_from(x: u8) -> StdResult<Self, Error> {
        use Severity::*;
        match x {
            0 => Ok(Emergency),
            1 => Ok(Alert),
            2 => Ok(Critical),
            3 => Ok(Error),
            4 => Ok(Warning),
            5 => Ok(Notice),
            6 => Ok(Informational),
            7 => Ok(Debug),
            _ => Err(crate::error::Error::BadSeverityCode {
                code: x,
                back: Backtrace::new(),
            }),
        }
    }
}

/// Compute the PRI value for a facility & severity: `facility * 8 + severity`, always in
/// [0, 191].
pub fn priority(facility: Facility, severity: Severity) -> u8 {
    (facility as u8) * 8 + (severity as u8)
}
