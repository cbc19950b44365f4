//! Log capture for TUI mode
//!
//! `LogBuffer` is a bounded queue of log lines that implements `MakeWriter`,
//! so the tracing fmt layer can write into it while the alternate screen is
//! active. The debug log pane drains it.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// Lines held before the oldest are dropped.
const DEFAULT_CAPACITY: usize = 500;

/// Shared, bounded queue of log lines. Clones share the same queue.
#[derive(Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity: capacity.max(1),
        }
    }

    /// Queue one line, dropping the oldest when full.
    pub fn push(&self, line: String) {
        // A poisoned lock still holds usable data.
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Take every queued line, oldest first.
    pub fn drain(&self) -> Vec<String> {
        let mut lines = self.lines.lock().unwrap_or_else(|e| e.into_inner());
        lines.drain(..).collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-event writer: collects bytes and queues each complete line.
pub struct LineWriter {
    target: LogBuffer,
    partial: Vec<u8>,
}

impl LineWriter {
    fn emit(&mut self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        self.target.push(text.trim_end_matches(['\r', '\n']).to_string());
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.partial.extend_from_slice(buf);
        while let Some(pos) = self.partial.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=pos).collect();
            self.emit(&line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.partial.is_empty() {
            let rest = std::mem::take(&mut self.partial);
            self.emit(&rest);
        }
        Ok(())
    }
}

impl Drop for LineWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter {
            target: self.clone(),
            partial: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_push_and_drain() {
        let buf = LogBuffer::new();
        buf.push("one".to_string());
        buf.push("two".to_string());
        assert_eq!(buf.drain(), vec!["one", "two"]);
        assert!(buf.drain().is_empty());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let buf = LogBuffer::with_capacity(3);
        for i in 0..5 {
            buf.push(format!("line {}", i));
        }
        assert_eq!(buf.drain(), vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_writer_splits_lines() {
        let buf = LogBuffer::new();
        let mut writer = buf.make_writer();
        writer.write_all(b"GET /user/1\nPOST /user/login\n").unwrap();
        assert_eq!(buf.drain(), vec!["GET /user/1", "POST /user/login"]);
    }

    #[test]
    fn test_writer_flushes_partial_on_drop() {
        let buf = LogBuffer::new();
        {
            let mut writer = buf.make_writer();
            writer.write_all(b"no newline").unwrap();
            assert!(buf.drain().is_empty());
        }
        assert_eq!(buf.drain(), vec!["no newline"]);
    }
}
