//! Logging seam shared by the pipeline stages.
//!
//! Stages report progress through an [`EventSink`] handed to them by the
//! caller instead of calling the `log` macros directly. The binary passes
//! [`LogSink`], which forwards to whatever logger is installed (env_logger in
//! `signalsnp`); tests pass a [`MemorySink`] and inspect what was reported.

use log::Level;
use std::cell::RefCell;

pub const LOG_TARGET: &str = "signalsnp";

pub trait EventSink {
    fn event(&self, level: Level, message: &str);

    fn info(&self, message: &str) {
        self.event(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.event(Level::Warn, message);
    }

    fn debug(&self, message: &str) {
        self.event(Level::Debug, message);
    }
}

/// Forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn event(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{}", message);
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RefCell<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(Level, String)> {
        self.events.borrow().clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl EventSink for MemorySink {
    fn event(&self, level: Level, message: &str) {
        self.events.borrow_mut().push((level, message.to_string()));
    }
}
