//! Event sinks
//!
//! The game reports notable moments as `(message, category, details)`
//! triples. Sinks are fire-and-forget: they never feed back into the
//! simulation.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Log target used by [`LogSink`]
pub const EVENT_TARGET: &str = "tank_battle::events";

/// Default number of entries kept by [`MemorySink`]
pub const DEFAULT_CAPACITY: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Game,
    Info,
    Success,
    Warning,
    Error,
    Player,
    Enemy,
}

impl LogCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            LogCategory::Game => "game",
            LogCategory::Info => "info",
            LogCategory::Success => "success",
            LogCategory::Warning => "warning",
            LogCategory::Error => "error",
            LogCategory::Player => "player",
            LogCategory::Enemy => "enemy",
        }
    }
}

/// Receiver for game notifications
pub trait EventSink {
    fn log(&mut self, message: &str, category: LogCategory, details: Option<&str>);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn log(&mut self, message: &str, category: LogCategory, details: Option<&str>) {
        (**self).log(message, category, details);
    }
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn log(&mut self, message: &str, category: LogCategory, details: Option<&str>) {
        (**self).log(message, category, details);
    }
}

/// Forwards to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn log(&mut self, message: &str, category: LogCategory, details: Option<&str>) {
        let level = match category {
            LogCategory::Error => log::Level::Error,
            LogCategory::Warning => log::Level::Warn,
            // Reload notices and wall chips fire every few frames
            LogCategory::Info => log::Level::Debug,
            _ => log::Level::Info,
        };
        match details {
            Some(details) => log::log!(
                target: EVENT_TARGET,
                level,
                "[{}] {message} ({details})",
                category.as_str()
            ),
            None => log::log!(target: EVENT_TARGET, level, "[{}] {message}", category.as_str()),
        }
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn log(&mut self, _message: &str, _category: LogCategory, _details: Option<&str>) {}
}

/// One retained notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub message: String,
    pub category: LogCategory,
    pub details: Option<String>,
    /// Identical consecutive entries collapse into one with a count
    pub count: u32,
}

/// Keeps the newest entries in memory
#[derive(Debug, Clone)]
pub struct MemorySink {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MemorySink {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Entries whose message contains `needle`
    pub fn find<'a>(&'a self, needle: &'a str) -> impl Iterator<Item = &'a LogEntry> {
        self.entries.iter().filter(move |e| e.message.contains(needle))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl EventSink for MemorySink {
    fn log(&mut self, message: &str, category: LogCategory, details: Option<&str>) {
        if let Some(last) = self.entries.back_mut()
            && last.message == message
            && last.category == category
            && last.details.as_deref() == details
        {
            last.count += 1;
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            message: message.to_string(),
            category,
            details: details.map(str::to_string),
            count: 1,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_coalesces_duplicates() {
        let mut sink = MemorySink::default();
        sink.log("Player cannon reloading", LogCategory::Info, None);
        sink.log("Player cannon reloading", LogCategory::Info, None);
        sink.log("Enemy destroyed", LogCategory::Success, None);
        sink.log("Player cannon reloading", LogCategory::Info, None);
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.entries().next().unwrap().count, 2);
        assert_eq!(sink.last().unwrap().count, 1);
    }

    #[test]
    fn test_memory_sink_details_distinguish_entries() {
        let mut sink = MemorySink::default();
        sink.log("Wall damaged", LogCategory::Info, Some("wall 3"));
        sink.log("Wall damaged", LogCategory::Info, Some("wall 4"));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_memory_sink_capacity() {
        let mut sink = MemorySink::new(3);
        for i in 0..5 {
            sink.log(&format!("event {i}"), LogCategory::Game, None);
        }
        let messages: Vec<&str> = sink.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["event 2", "event 3", "event 4"]);
        assert_eq!(sink.find("event 3").count(), 1);
    }

    #[test]
    fn test_sink_through_reference() {
        fn send(mut sink: impl EventSink) {
            sink.log("hello", LogCategory::Game, None);
        }
        let mut sink = MemorySink::default();
        send(&mut sink);
        send(&mut NullSink);
        send(LogSink);
        assert_eq!(sink.len(), 1);
    }
}
