// src/progress.rs

//! Progress line sink shared by every engine phase
//!
//! The engine is synchronous and single-threaded, but a front end may run it
//! on a background thread. Human-readable progress therefore goes through a
//! [`ProgressSink`] rather than straight to stdout, so the front end decides
//! how (and on which thread) lines are shown.
//!
//! Implementations:
//! - `SilentProgress`: no-op for scripted/quiet modes
//! - `LogProgress`: forwards lines to tracing
//! - `CallbackProgress`: calls a closure with each [`ProgressEvent`]
//! - `ChannelProgress`: queues events on an mpsc channel for another thread to drain
//! - `CliProgress`: indicatif spinner that prints lines above itself
//!
//! # Example
//!
//! ```ignore
//! use mrfeature::progress::{ChannelProgress, ProgressEvent};
//!
//! let (sink, events) = ChannelProgress::new();
//! let worker = std::thread::spawn(move || run_engine(sink));
//! for event in events {
//!     ui.append_line(event.to_string());
//! }
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use tracing::{info, warn};

/// Coarse phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    FetchingCatalog,
    Resolving,
    Downloading,
    Installing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::FetchingCatalog => "Fetching release catalog",
            Phase::Resolving => "Resolving dependencies",
            Phase::Downloading => "Downloading packages",
            Phase::Installing => "Installing into project",
        };
        f.write_str(label)
    }
}

/// Events emitted to callback and channel sinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Phase(Phase),
    Message(String),
    Warning(String),
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Phase(phase) => write!(f, "--- {} ---", phase),
            ProgressEvent::Message(m) => f.write_str(m),
            ProgressEvent::Warning(m) => write!(f, "Warning: {}", m),
        }
    }
}

/// Receiver of human-readable progress lines
pub trait ProgressSink: Send + Sync {
    /// Report an informational line
    fn message(&self, message: &str);

    /// Report a recoverable problem
    fn warning(&self, message: &str);

    /// Mark the start of a phase
    fn set_phase(&self, phase: Phase) {
        self.message(&ProgressEvent::Phase(phase).to_string());
    }
}

/// Silent progress sink (no-op)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn message(&self, _message: &str) {}

    fn warning(&self, _message: &str) {}

    fn set_phase(&self, _phase: Phase) {}
}

/// Logging progress sink
///
/// Messages go to tracing at info level, warnings at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn message(&self, message: &str) {
        info!("{}", message);
    }

    fn warning(&self, message: &str) {
        warn!("{}", message);
    }
}

/// Callback-based progress sink
pub struct CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressSink for CallbackProgress<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn message(&self, message: &str) {
        (self.callback)(ProgressEvent::Message(message.to_string()));
    }

    fn warning(&self, message: &str) {
        (self.callback)(ProgressEvent::Warning(message.to_string()));
    }

    fn set_phase(&self, phase: Phase) {
        (self.callback)(ProgressEvent::Phase(phase));
    }
}

/// Channel-backed progress sink
///
/// Events are queued and never block the engine. Once the receiver is dropped
/// further events are discarded.
pub struct ChannelProgress {
    sender: Sender<ProgressEvent>,
}

impl ChannelProgress {
    /// Create a sink and the receiver a presentation thread drains
    pub fn new() -> (Self, Receiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ProgressEvent) {
        let _ = self.sender.send(event);
    }
}

impl ProgressSink for ChannelProgress {
    fn message(&self, message: &str) {
        self.send(ProgressEvent::Message(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.send(ProgressEvent::Warning(message.to_string()));
    }

    fn set_phase(&self, phase: Phase) {
        self.send(ProgressEvent::Phase(phase));
    }
}

/// Terminal progress sink
///
/// Keeps a spinner showing the current phase and prints every line above it.
pub struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner }
    }

    /// Clear the spinner, leaving printed lines in place
    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }

    // A hidden spinner (stderr not a terminal) swallows println
    fn print(&self, line: &str) {
        if self.spinner.is_hidden() {
            println!("{}", line);
        } else {
            self.spinner.println(line);
        }
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for CliProgress {
    fn message(&self, message: &str) {
        self.print(message);
    }

    fn warning(&self, message: &str) {
        self.print(&format!("Warning: {}", message));
    }

    fn set_phase(&self, phase: Phase) {
        self.print(&ProgressEvent::Phase(phase).to_string());
        self.spinner.set_message(phase.to_string());
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_silent_progress() {
        let progress = SilentProgress;
        progress.set_phase(Phase::Resolving);
        progress.message("resolving core");
        progress.warning("nothing happens");
    }

    #[test]
    fn test_callback_progress() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let events_clone = events.clone();

        let progress = CallbackProgress::new(move |event| {
            events_clone.lock().unwrap().push(event);
        });

        progress.set_phase(Phase::Downloading);
        progress.message("Downloading core v3.2.0");
        progress.warning("no asset for tools v1.0.0");

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 3);
        assert_eq!(captured[0], ProgressEvent::Phase(Phase::Downloading));
        assert!(matches!(&captured[1], ProgressEvent::Message(m) if m == "Downloading core v3.2.0"));
        assert!(matches!(&captured[2], ProgressEvent::Warning(m) if m.contains("tools")));
    }

    #[test]
    fn test_channel_progress_drains_in_order() {
        let (progress, events) = ChannelProgress::new();

        let worker = std::thread::spawn(move || {
            progress.set_phase(Phase::Installing);
            progress.message("Moved packages");
        });
        worker.join().unwrap();

        let drained: Vec<_> = events.try_iter().collect();
        assert_eq!(
            drained,
            vec![
                ProgressEvent::Phase(Phase::Installing),
                ProgressEvent::Message("Moved packages".into()),
            ]
        );
    }

    #[test]
    fn test_channel_progress_survives_dropped_receiver() {
        let (progress, events) = ChannelProgress::new();
        drop(events);
        progress.message("nobody is listening");
    }

    #[test]
    fn test_event_display() {
        assert_eq!(
            ProgressEvent::Phase(Phase::FetchingCatalog).to_string(),
            "--- Fetching release catalog ---"
        );
        assert_eq!(
            ProgressEvent::Warning("skipped".into()).to_string(),
            "Warning: skipped"
        );
    }
}
