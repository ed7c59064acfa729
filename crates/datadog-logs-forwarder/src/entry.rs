// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use datadog_logs_sender::Message;
use serde::Serialize;

pub const ORIGIN: &str = "stdin";

/// Attributes added to every line read on stdin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryTemplate {
    pub service: Option<String>,
    pub hostname: Option<String>,
    pub ddsource: String,
    pub ddtags: Option<String>,
}

impl EntryTemplate {
    pub fn from_env() -> Self {
        EntryTemplate {
            service: env::var("DD_SERVICE").ok(),
            hostname: env::var("DD_HOSTNAME").ok(),
            ddsource: env::var("DD_SOURCE").unwrap_or_else(|_| ORIGIN.to_string()),
            ddtags: env::var("DD_TAGS").ok().map(|tags| tags.replace(' ', ",")),
        }
    }

    /// Wraps a line into an intake JSON object. Returns None for blank lines.
    pub fn to_message(&self, line: &str) -> Option<Message> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }

        let entry = LogEntry {
            message: line,
            status: status_of(line),
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            service: self.service.as_deref(),
            hostname: self.hostname.as_deref(),
            ddsource: &self.ddsource,
            ddtags: self.ddtags.as_deref(),
        };
        let content = serde_json::to_vec(&entry).ok()?;
        Some(Message::new(content).with_origin(ORIGIN))
    }
}

#[derive(Serialize)]
struct LogEntry<'a> {
    message: &'a str,
    status: &'static str,
    timestamp: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hostname: Option<&'a str>,
    ddsource: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ddtags: Option<&'a str>,
}

// Best effort: only looks at the leading level token, e.g. "ERROR something"
fn status_of(line: &str) -> &'static str {
    let token = line
        .trim_start_matches(|c: char| c == '[' || c.is_whitespace())
        .split(|c: char| !c.is_ascii_alphabetic())
        .next()
        .unwrap_or_default();
    match token.to_ascii_lowercase().as_str() {
        "error" | "err" | "fatal" | "critical" => "error",
        "warn" | "warning" => "warn",
        "debug" | "trace" => "debug",
        _ => "info",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn template() -> EntryTemplate {
        EntryTemplate {
            service: Some("billing".to_string()),
            hostname: None,
            ddsource: ORIGIN.to_string(),
            ddtags: Some("env:prod,team:logs".to_string()),
        }
    }

    #[test]
    fn test_line_is_wrapped_into_json() {
        let message = template().to_message("ERROR payment failed\n").unwrap();

        let json: serde_json::Value = serde_json::from_slice(message.content()).unwrap();
        assert_eq!(json["message"], "ERROR payment failed");
        assert_eq!(json["status"], "error");
        assert_eq!(json["service"], "billing");
        assert_eq!(json["ddsource"], "stdin");
        assert_eq!(json["ddtags"], "env:prod,team:logs");
        assert!(json.get("hostname").is_none());
        assert_eq!(message.size(), message.content().len());
        assert_eq!(message.origin(), Some(ORIGIN));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        assert!(template().to_message("").is_none());
        assert!(template().to_message("   \r\n").is_none());
    }

    #[test]
    fn test_status_of() {
        assert_eq!(status_of("[WARN] disk almost full"), "warn");
        assert_eq!(status_of("debug: cache miss"), "debug");
        assert_eq!(status_of("Fatal error"), "error");
        assert_eq!(status_of("user signed in"), "info");
        assert_eq!(status_of("12:00 ERROR"), "info");
    }

    #[test]
    #[serial]
    fn test_template_from_env() {
        env::set_var("DD_SERVICE", "checkout");
        env::set_var("DD_TAGS", "env:staging version:1.2");
        env::remove_var("DD_HOSTNAME");
        env::remove_var("DD_SOURCE");

        let template = EntryTemplate::from_env();

        assert_eq!(template.service.as_deref(), Some("checkout"));
        assert_eq!(template.hostname, None);
        assert_eq!(template.ddsource, "stdin");
        assert_eq!(template.ddtags.as_deref(), Some("env:staging,version:1.2"));
        env::remove_var("DD_SERVICE");
        env::remove_var("DD_TAGS");
    }
}
