use serde::{Deserialize, Serialize};

use crate::ident::{new_id, now_iso};

/// Hard cap on retained console entries; the oldest is evicted on overflow.
pub const CONSOLE_CAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleLog {
    pub id: String,
    #[serde(rename = "type")]
    pub level: LogLevel,
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Bounded rolling log of operational events, newest first, memory only.
/// Pure observability: nothing reads it back to make decisions.
#[derive(Debug, Clone, Default)]
pub struct ConsoleSink {
    logs: Vec<ConsoleLog>,
}

impl ConsoleSink {
    pub fn push(&mut self, level: LogLevel, message: impl Into<String>, request_id: Option<&str>) {
        self.logs.insert(
            0,
            ConsoleLog {
                id: new_id(),
                level,
                message: message.into(),
                timestamp: now_iso(),
                request_id: request_id.map(str::to_string),
            },
        );
        self.logs.truncate(CONSOLE_CAP);
    }

    pub fn clear(&mut self) {
        self.logs.clear();
    }

    pub fn logs(&self) -> &[ConsoleLog] {
        &self.logs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_cap() {
        let mut sink = ConsoleSink::default();
        for i in 0..(CONSOLE_CAP + 5) {
            sink.push(LogLevel::Info, format!("m{i}"), None);
        }
        assert_eq!(sink.logs().len(), CONSOLE_CAP);
        assert_eq!(sink.logs()[0].message, format!("m{}", CONSOLE_CAP + 4));
        assert!(sink.logs().iter().all(|l| l.message != "m0"));
    }

    #[test]
    fn test_level_wire_names() {
        let json = serde_json::to_string(&LogLevel::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }
}
