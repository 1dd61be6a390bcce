//! Diagnostics sink injected into the core components
//!
//! The indexer and packer never write to stdout/stderr directly; they report
//! through a `Diagnostics` implementation so a caller that owns stdout (for
//! example a protocol server speaking over stdio) can route messages elsewhere.

use std::sync::Mutex;

/// Severity of a recorded diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
}

pub trait Diagnostics {
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
}

/// Forwards diagnostics to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
    }

    /// All recorded entries, oldest first
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Messages recorded at `Warn`
    pub fn warnings(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(level, _)| *level == Level::Warn)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Diagnostics for MemoryDiagnostics {
    fn debug(&self, message: &str) {
        self.push(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }
}
