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

//! RFC [5424]-compliant syslog message formatting with the Logtail structured-data extension.
//!
//! [5424]: https://datatracker.ietf.org/doc/html/rfc5424
//!
//! [`LogtailFormatter`] assembles one line per [`LogEvent`]:
//!
//! ```text
//! <PRI>1 TIMESTAMP HOST APP-NAME PROCID MSGID [tokenKey="token"][dataName k1="v1" ...] MSG
//! ```
//!
//! The Logtail source token always appears as the first SD-ELEMENT; the second SD-ELEMENT holds
//! the event's properties, in insertion order, and is omitted entirely when the event has none.

use crate::{
    cleaner::StringCleaner,
    event::{default_severity_mapping, LogEvent, LogLevel},
    facility::{priority, Facility, Severity},
};

type StdResult<T, E> = std::result::Result<T, E>;

/// Used in place of data that cannot be obtained or is unavailable.
const NILVALUE: &str = "-";

/// `yyyy-MM-ddTHH:mm:ss.ffffffzzz`: microsecond precision with an explicit UTC offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// The event property from which MSGID is derived, unless the caller chooses another.
pub const DEFAULT_MESSAGE_ID_PROPERTY: &str = "SourceContext";

/// Characters not permitted in structured-data parameter names; removed outright.
const SD_NAME_ILLEGAL: [char; 3] = ['=', '"', ']'];

/// Characters that must be backslash-escaped in structured-data parameter values.
const SD_VALUE_ESCAPED: [char; 3] = ['"', '\\', ']'];

/// A strategy value mapping an application [`LogLevel`] to a syslog [`Severity`].
pub type SeverityMapping = Box<dyn Fn(LogLevel) -> Severity + Send + Sync>;

/// An optional custom body renderer; its output is used verbatim as the MSG field.
pub type BodyRenderer = Box<dyn Fn(&LogEvent) -> String + Send + Sync>;

/// The HOSTNAME field: at most 255 characters.
///
/// Non-conforming input is conformed rather than rejected; an input that sanitizes to nothing
/// becomes the NILVALUE.
pub struct Hostname(String);

impl std::fmt::Display for Hostname {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl Hostname {
    pub fn new<S: Into<String>>(name: S) -> Hostname {
        let name = StringCleaner::new(name.into()).max_length(255).build();
        if name.is_empty() {
            Hostname(NILVALUE.to_string())
        } else {
            Hostname(name)
        }
    }
}

impl std::default::Default for Hostname {
    /// Attempt to figure out a HOSTNAME for this host.
    ///
    /// RFC 5424's order of preference for the contents of the HOSTNAME field is FQDN, static IP
    /// address, hostname, dynamic IP address, then the NILVALUE. This implementation first tries
    /// [gethostname()], then falls back to a local IP address, then to the NILVALUE.
    ///
    /// [gethostname()]: https://man7.org/linux/man-pages/man2/gethostname.2.html
    fn default() -> Self {
        hostname::get()
            .map(|name| Hostname::new(name.to_string_lossy().into_owned()))
            .or_else(|_| local_ip_address::local_ip().map(|ip| Hostname::new(ip.to_string())))
            .unwrap_or_else(|_| Hostname(NILVALUE.to_string()))
    }
}

/// The APP-NAME field: at most 48 characters of printable ASCII.
pub struct AppName(String);

impl std::fmt::Display for AppName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl AppName {
    pub fn new<S: Into<String>>(name: S) -> AppName {
        let name = StringCleaner::new(name.into())
            .ascii_printable()
            .max_length(48)
            .build();
        if name.is_empty() {
            AppName(NILVALUE.to_string())
        } else {
            AppName(name)
        }
    }
}

impl std::default::Default for AppName {
    /// The APP-NAME field SHOULD identify the device or application that originated the message.
    ///
    /// This implementation relies on [`std::env::current_exe`]; if for any reason that value
    /// cannot be retrieved, it simply yields the NILVALUE.
    fn default() -> Self {
        std::env::current_exe()
            .ok()
            .and_then(|pbuf| {
                pbuf.file_name()
                    .map(|os_str| AppName::new(os_str.to_string_lossy().into_owned()))
            })
            .unwrap_or_else(|| AppName(NILVALUE.to_string()))
    }
}

/// The PROCID field: at most 128 characters of printable ASCII.
pub struct ProcId(String);

impl std::fmt::Display for ProcId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl ProcId {
    pub fn new<S: Into<String>>(pid: S) -> ProcId {
        let pid = StringCleaner::new(pid.into())
            .ascii_printable()
            .max_length(128)
            .build();
        if pid.is_empty() {
            ProcId(NILVALUE.to_string())
        } else {
            ProcId(pid)
        }
    }
}

impl std::default::Default for ProcId {
    /// "PROCID is a value that is included in the message, having no interoperable meaning,
    /// except that a change in the value indicates there has been a discontinuity in syslog
    /// reporting." This implementation relies on [`std::process::id`]; it cannot fail.
    fn default() -> Self {
        ProcId(std::process::id().to_string())
    }
}

/// A formatter that produces RFC [5424]-conformant syslog messages carrying a Logtail source
/// token.
///
/// [5424]: https://datatracker.ietf.org/doc/html/rfc5424
///
/// The application name, message-id property name, hostname & process-id are sanitized once, at
/// construction, and re-used for every event. The token itself is caller-supplied & trusted; it
/// is emitted without sanitization.
pub struct LogtailFormatter {
    facility: Facility,
    hostname: Hostname,
    app_name: AppName,
    pid: ProcId,
    token_key: String,
    token: String,
    data_name: String,
    msg_id_property: String,
    severity_mapping: SeverityMapping,
    body_renderer: Option<BodyRenderer>,
}

pub struct LogtailFormatterBuilder {
    imp: LogtailFormatter,
}

impl LogtailFormatterBuilder {
    pub fn facility(mut self, facility: Facility) -> Self {
        self.imp.facility = facility;
        self
    }
    /// The key under which the source token is emitted, e.g. `logtail@11993 source_token`.
    pub fn token_key<S: Into<String>>(mut self, token_key: S) -> Self {
        self.imp.token_key = token_key.into();
        self
    }
    /// The SD-ID of the SD-ELEMENT carrying the event's properties.
    pub fn data_name<S: Into<String>>(mut self, data_name: S) -> Self {
        self.imp.data_name = data_name.into();
        self
    }
    pub fn hostname<S: Into<String>>(mut self, hostname: S) -> Self {
        self.imp.hostname = Hostname::new(hostname);
        self
    }
    pub fn app_name<S: Into<String>>(mut self, app_name: S) -> Self {
        self.imp.app_name = AppName::new(app_name);
        self
    }
    pub fn pid<S: Into<String>>(mut self, pid: S) -> Self {
        self.imp.pid = ProcId::new(pid);
        self
    }
    /// The event property from which MSGID will be derived.
    pub fn msg_id_property<S: Into<String>>(mut self, name: S) -> Self {
        self.imp.msg_id_property = StringCleaner::new(name.into())
            .ascii_printable()
            .max_length(32)
            .build();
        self
    }
    pub fn severity_mapping<F>(mut self, mapping: F) -> Self
    where
        F: Fn(LogLevel) -> Severity + Send + Sync + 'static,
    {
        self.imp.severity_mapping = Box::new(mapping);
        self
    }
    /// Delegate rendering of the MSG field; the renderer's output is used verbatim.
    pub fn body_renderer<F>(mut self, renderer: F) -> Self
    where
        F: Fn(&LogEvent) -> String + Send + Sync + 'static,
    {
        self.imp.body_renderer = Some(Box::new(renderer));
        self
    }
    pub fn build(self) -> LogtailFormatter {
        self.imp
    }
}

impl LogtailFormatter {
    /// Begin building a formatter for the given source token. All other settings have defaults.
    pub fn builder<S: Into<String>>(token: S) -> LogtailFormatterBuilder {
        LogtailFormatterBuilder {
            imp: LogtailFormatter {
                facility: Facility::default(),
                hostname: Hostname::default(),
                app_name: AppName::default(),
                pid: ProcId::default(),
                token_key: "logtail@11993 source_token".to_string(),
                token: token.into(),
                data_name: "Parameters".to_string(),
                msg_id_property: DEFAULT_MESSAGE_ID_PROPERTY.to_string(),
                severity_mapping: Box::new(default_severity_mapping),
                body_renderer: None,
            },
        }
    }

    /// Compute the PRI value for an event at `level` under this formatter's facility & severity
    /// mapping.
    pub fn priority_for(&self, level: LogLevel) -> u8 {
        priority(self.facility, (self.severity_mapping)(level))
    }

    /// Assemble the complete RFC 5424 line for one event.
    ///
    /// Note that the MSG field is used as rendered-- control characters & embedded newlines
    /// pass through untouched.
    pub fn format_message(&self, event: &LogEvent) -> String {
        let pri = self.priority_for(event.level());
        let timestamp = event.timestamp().format(TIMESTAMP_FORMAT);
        let msg_id = self.message_id(event);
        let sd = self.structured_data(event);
        let msg = match &self.body_renderer {
            Some(renderer) => renderer(event),
            None => event.render_message(),
        };
        format!(
            "<{}>1 {} {} {} {} {} {} {}",
            pri, timestamp, self.hostname, self.app_name, self.pid, msg_id, sd, msg
        )
    }

    /// Derive the MSGID field from the configured event property, or the NILVALUE if the
    /// property is absent or sanitizes to nothing.
    fn message_id(&self, event: &LogEvent) -> String {
        let value = match event.property(&self.msg_id_property) {
            Some(value) => value,
            None => return NILVALUE.to_string(),
        };
        let msg_id = StringCleaner::new(value.to_string())
            .trim('"')
            .unescape_quotes()
            .ascii_printable()
            .max_length(32)
            .build();
        if msg_id.is_empty() {
            NILVALUE.to_string()
        } else {
            msg_id
        }
    }

    /// Render the STRUCTURED-DATA field: the token SD-ELEMENT, then (only if the event has
    /// properties) the parameters SD-ELEMENT in insertion order.
    fn structured_data(&self, event: &LogEvent) -> String {
        let token_part = format!("{}=\"{}\"", self.token_key, self.token);
        if event.properties().is_empty() {
            return format!("[{}]", token_part);
        }
        let kvps = event
            .properties()
            .iter()
            .map(|(name, value)| {
                format!("{}=\"{}\"", clean_param_name(name), clean_param_value(&value.to_string()))
            })
            .collect::<Vec<_>>()
            .join(" ");
        format!("[{}][{} {}]", token_part, self.data_name, kvps)
    }
}

/// Conform a property name to the RFC's SD-NAME production: printable ASCII, no `=`, `"` or
/// `]`, at most 32 characters.
fn clean_param_name(name: &str) -> String {
    StringCleaner::new(name)
        .ascii_printable()
        .strip(&SD_NAME_ILLEGAL)
        .max_length(32)
        .build()
}

/// Conform a property value to the RFC's PARAM-VALUE production. The surrounding quotes put
/// there by [`Value`](crate::event::Value) rendering are dropped (the field is quoted on the
/// wire anyway), then `"`, `\` & `]` are backslash-escaped.
fn clean_param_value(value: &str) -> String {
    StringCleaner::new(value)
        .trim('"')
        .unescape_quotes()
        .escape(&SD_VALUE_ESCAPED)
        .build()
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::event::value_based_severity_mapping;

    use chrono::prelude::*;

    const APP_NAME: &str = "TestApp";
    const HOST: &str = "myhost";
    const PID: &str = "1234";
    const TOKEN_SD: &str = "[Logtail=\"SOURCE_TOKEN\"]";

    /// 2013-12-19T04:01:02.357 plus 8523 hundred-nanosecond ticks: .357852 at microsecond
    /// precision.
    fn test_timestamp() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2013, 12, 19, 4, 1, 2)
            .unwrap()
            .with_nanosecond(357_852_300)
            .unwrap()
    }

    fn test_formatter() -> LogtailFormatter {
        LogtailFormatter::builder("SOURCE_TOKEN")
            .token_key("Logtail")
            .facility(Facility::User)
            .app_name(APP_NAME)
            .hostname(HOST)
            .pid(PID)
            .build()
    }

    #[test]
    fn format_without_structured_data() {
        let event = LogEvent::new(
            test_timestamp(),
            LogLevel::Information,
            "This is a test message",
        );
        let formatted = test_formatter().format_message(&event);
        assert_eq!(
            formatted,
            "<14>1 2013-12-19T04:01:02.357852+00:00 myhost TestApp 1234 - \
             [Logtail=\"SOURCE_TOKEN\"] This is a test message"
        );
    }

    #[test]
    fn format_with_structured_data() {
        let event = LogEvent::new(
            test_timestamp(),
            LogLevel::Warning,
            "This is a test message with val {AProperty}",
        )
        .with_property("AProperty", "A Value")
        .with_property("AnotherProperty", "AnotherValue")
        .with_property("SourceContext", "TestCtx")
        .with_error("Test");
        let formatted = test_formatter().format_message(&event);
        assert_eq!(
            formatted,
            "<12>1 2013-12-19T04:01:02.357852+00:00 myhost TestApp 1234 TestCtx \
             [Logtail=\"SOURCE_TOKEN\"]\
             [Parameters AProperty=\"A Value\" AnotherProperty=\"AnotherValue\" \
             SourceContext=\"TestCtx\"] \
             This is a test message with val \"A Value\""
        );
    }

    #[test]
    fn choose_another_msg_id_property() {
        let formatter = LogtailFormatter::builder("SOURCE_TOKEN")
            .token_key("Logtail")
            .facility(Facility::User)
            .app_name(APP_NAME)
            .hostname(HOST)
            .pid(PID)
            .msg_id_property("AProperty")
            .build();
        let event = LogEvent::new(
            test_timestamp(),
            LogLevel::Warning,
            "This is a test message with val {AProperty}",
        )
        .with_property("AProperty", "AValue")
        .with_property("SourceContext", "TestCtx");
        let formatted = formatter.format_message(&event);
        let msg_id = formatted.split(' ').nth(5).unwrap();
        assert_eq!(msg_id, "AValue");
    }

    #[test]
    fn clean_invalid_strings() {
        let event = LogEvent::new(test_timestamp(), LogLevel::Information, "This is a test message")
            .with_property("安森Test", "test")
            .with_property(
                "APropertyNameThatIsLongerThan32Characters",
                "A value \\contain]ing \"quotes\" to test",
            )
            .with_property(
                "SourceContext",
                "安森 A string that is longer than 32 characters",
            );
        let formatted = test_formatter().format_message(&event);

        // MSGID: non-ASCII & spaces removed, truncated to exactly 32 characters.
        let msg_id = formatted.split(' ').nth(5).unwrap();
        assert_eq!(msg_id, "Astringthatislongerthan32charact");
        assert_eq!(msg_id.len(), 32);

        // Property names conformed; values escaped (but not ASCII-filtered).
        assert!(formatted.contains(TOKEN_SD));
        assert!(formatted.contains(" Test=\"test\" "));
        assert!(formatted.contains(
            "APropertyNameThatIsLongerThan32C=\"A value \\\\contain\\]ing \\\"quotes\\\" to test\""
        ));
        assert!(formatted.contains("SourceContext=\"安森 A string that is longer than 32 characters\""));
    }

    #[test]
    fn no_second_sd_element_without_properties() {
        let event = LogEvent::new(test_timestamp(), LogLevel::Information, "hello");
        let formatted = test_formatter().format_message(&event);
        assert!(formatted.contains(" [Logtail=\"SOURCE_TOKEN\"] "));
        assert!(!formatted.contains("[Parameters"));
    }

    #[test]
    fn override_severity_mapping() {
        let formatter = LogtailFormatter::builder("SOURCE_TOKEN")
            .facility(Facility::User)
            .severity_mapping(value_based_severity_mapping)
            .build();
        // Information maps to Notice (5) under the value-based strategy.
        assert_eq!(formatter.priority_for(LogLevel::Information), 13);
        // And to a constant under a caller-supplied one.
        let formatter = LogtailFormatter::builder("SOURCE_TOKEN")
            .facility(Facility::Local0)
            .severity_mapping(|_| Severity::Critical)
            .build();
        assert_eq!(formatter.priority_for(LogLevel::Debug), 130);
    }

    #[test]
    fn custom_body_renderer_is_used_verbatim() {
        let formatter = LogtailFormatter::builder("SOURCE_TOKEN")
            .token_key("Logtail")
            .facility(Facility::User)
            .app_name(APP_NAME)
            .hostname(HOST)
            .pid(PID)
            .body_renderer(|event: &LogEvent| {
                format!("{:?}: {}", event.level(), event.template())
            })
            .build();
        let event = LogEvent::new(test_timestamp(), LogLevel::Error, "boom");
        let formatted = formatter.format_message(&event);
        assert!(formatted.ends_with("[Logtail=\"SOURCE_TOKEN\"] Error: boom"));
    }

    #[test]
    fn message_body_is_not_sanitized() {
        // Control characters & newlines in the body pass through untouched. This can break the
        // one-line-per-message expectation of RFC 5424 collectors; it is a known gap inherited
        // from the wire format this crate reproduces, recorded here rather than silently fixed.
        let event = LogEvent::new(test_timestamp(), LogLevel::Information, "line one\nline two\x07");
        let formatted = test_formatter().format_message(&event);
        assert!(formatted.ends_with("line one\nline two\x07"));
    }

    #[test]
    fn construction_time_sanitization() {
        let formatter = LogtailFormatter::builder("SOURCE_TOKEN")
            .token_key("Logtail")
            .facility(Facility::User)
            .app_name("My App Name That Is Much Too Long For The RFC To Permit")
            .hostname(HOST)
            .pid(PID)
            .build();
        let event = LogEvent::new(test_timestamp(), LogLevel::Information, "hello");
        let formatted = formatter.format_message(&event);
        let app = formatted.split(' ').nth(3).unwrap();
        assert!(app.len() <= 48);
        assert!(app.chars().all(|c| ('\u{21}'..='\u{7e}').contains(&c)));
    }

    #[test]
    fn app_name_and_hostname_defaults() {
        let _x = AppName::default(); // At least _exercise_ `Default`
        let _x = Hostname::default();
        let _x = ProcId::default();
        assert_eq!(AppName::new("").to_string(), NILVALUE);
        assert_eq!(Hostname::new("").to_string(), NILVALUE);
    }
}
