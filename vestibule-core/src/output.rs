//! Output capture.
//!
//! Handlers may write side-channel output (diagnostics, echoed text) while
//! they run. An [`OutputBuffer`] collects it in a stack of scopes; each scope
//! is owned by a [`CaptureScope`] handle.
//!
//! Finishing or dropping a handle closes its scope together with every scope
//! opened above it, so a handler that forgets to close a nested scope cannot
//! leave stale scopes behind for the rest of the request.

use parking_lot::Mutex;
use std::{fmt, sync::Arc};

/// How a scope treats writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Writes are held until the scope is finished.
    Capture,
    /// Writes pass straight through to the sink, e.g. a compressing
    /// transport that must see output as it is produced.
    Passthrough,
}

#[derive(Debug)]
struct Frame {
    id: u64,
    kind: ScopeKind,
    text: String,
}

#[derive(Debug, Default)]
struct State {
    frames: Vec<Frame>,
    sink: String,
    next_id: u64,
}

impl State {
    fn position(&self, id: u64) -> Option<usize> {
        self.frames.iter().position(|frame| frame.id == id)
    }

    fn write(&mut self, text: &str) {
        match self.frames.last_mut() {
            Some(frame) if frame.kind == ScopeKind::Capture => frame.text.push_str(text),
            _ => self.sink.push_str(text),
        }
    }
}

/// A request-scoped stack of output scopes.
///
/// Clones share the same stack. Output written while no capture scope is open
/// goes to the sink, which the host drains with [`take_sink`](Self::take_sink).
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    state: Arc<Mutex<State>>,
}

impl OutputBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a capture scope.
    pub fn begin(&self) -> CaptureScope {
        self.begin_with(ScopeKind::Capture)
    }

    /// Open a scope of the given kind.
    pub fn begin_with(&self, kind: ScopeKind) -> CaptureScope {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.frames.push(Frame {
            id,
            kind,
            text: String::new(),
        });
        CaptureScope {
            buffer: self.clone(),
            id,
            level: state.frames.len(),
            open: true,
        }
    }

    /// Write to the innermost scope.
    pub fn write(&self, text: &str) {
        self.state.lock().write(text);
    }

    /// Number of open scopes.
    pub fn level(&self) -> usize {
        self.state.lock().frames.len()
    }

    /// Returns `true` if any open scope is a pass-through scope.
    pub fn has_passthrough(&self) -> bool {
        self.state
            .lock()
            .frames
            .iter()
            .any(|frame| frame.kind == ScopeKind::Passthrough)
    }

    /// Drain the text that escaped all scopes.
    pub fn take_sink(&self) -> String {
        std::mem::take(&mut self.state.lock().sink)
    }

    fn nested_above(&self, id: u64) -> Option<usize> {
        let state = self.state.lock();
        let position = state.position(id)?;
        Some(state.frames.len() - position - 1)
    }

    fn close_from(&self, id: u64) -> String {
        let mut state = self.state.lock();
        let Some(position) = state.position(id) else {
            return String::new();
        };
        state
            .frames
            .split_off(position)
            .into_iter()
            .map(|frame| frame.text)
            .collect()
    }
}

impl fmt::Write for OutputBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        OutputBuffer::write(self, s);
        Ok(())
    }
}

/// Ownership of one open scope.
///
/// The scope is released exactly once: by [`finish`](Self::finish),
/// [`flush`](Self::flush), or on drop (which discards the captured text).
#[derive(Debug)]
pub struct CaptureScope {
    buffer: OutputBuffer,
    id: u64,
    level: usize,
    open: bool,
}

impl CaptureScope {
    /// Depth of this scope when it was opened, `1` being the outermost.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Returns `true` while the scope is still on the stack.
    ///
    /// A scope closed by an enclosing scope is no longer open.
    pub fn is_open(&self) -> bool {
        self.open && self.buffer.nested_above(self.id).is_some()
    }

    /// Number of scopes opened above this one and not yet closed.
    pub fn nested(&self) -> usize {
        self.buffer.nested_above(self.id).unwrap_or(0)
    }

    /// Close this scope and every scope above it, returning their text
    /// outermost first.
    pub fn finish(mut self) -> String {
        self.release()
    }

    /// Close this scope and every scope above it, forwarding their text to
    /// the enclosing scope or the sink.
    pub fn flush(mut self) {
        let text = self.release();
        self.buffer.write(&text);
    }

    fn release(&mut self) -> String {
        self.open = false;
        self.buffer.close_from(self.id)
    }
}

impl Drop for CaptureScope {
    fn drop(&mut self) {
        if self.open {
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_and_finish() {
        let buffer = OutputBuffer::new();
        let scope = buffer.begin();
        buffer.write("hello ");
        buffer.write("world");
        assert_eq!(buffer.level(), 1);
        assert_eq!(scope.finish(), "hello world");
        assert_eq!(buffer.level(), 0);
    }

    #[test]
    fn test_finish_collapses_nested_scopes() {
        let buffer = OutputBuffer::new();
        let outer = buffer.begin();
        buffer.write("a");
        let inner = buffer.begin();
        buffer.write("b");
        std::mem::forget(inner);

        assert_eq!(outer.nested(), 1);
        assert_eq!(outer.finish(), "ab");
        assert_eq!(buffer.level(), 0);
    }

    #[test]
    fn test_drop_releases_scope() {
        let buffer = OutputBuffer::new();
        {
            let _scope = buffer.begin();
            buffer.write("discarded");
            assert_eq!(buffer.level(), 1);
        }
        assert_eq!(buffer.level(), 0);
        buffer.write("loose");
        assert_eq!(buffer.take_sink(), "loose");
    }

    #[test]
    fn test_flush_forwards_to_parent() {
        let buffer = OutputBuffer::new();
        let outer = buffer.begin();
        let inner = buffer.begin();
        buffer.write("inner");
        inner.flush();
        assert!(outer.is_open());
        assert_eq!(outer.finish(), "inner");
    }

    #[test]
    fn test_closed_by_outer_scope() {
        let buffer = OutputBuffer::new();
        let outer = buffer.begin();
        let inner = buffer.begin();
        buffer.write("x");
        assert_eq!(outer.finish(), "x");
        assert!(!inner.is_open());

        let fresh = buffer.begin();
        buffer.write("kept");
        drop(inner);
        assert!(fresh.is_open());
        assert_eq!(fresh.finish(), "kept");
    }

    #[test]
    fn test_passthrough_writes_reach_sink() {
        let buffer = OutputBuffer::new();
        let capture = buffer.begin();
        let passthrough = buffer.begin_with(ScopeKind::Passthrough);
        assert!(buffer.has_passthrough());
        buffer.write("streamed");
        drop(passthrough);
        assert!(!buffer.has_passthrough());
        assert_eq!(buffer.take_sink(), "streamed");
        assert_eq!(capture.finish(), "");
    }
}
