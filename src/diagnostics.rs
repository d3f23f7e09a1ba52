//! Bounded in-memory diagnostic channel.
//!
//! Errors that must never reach the editor's interaction loop (failed event
//! listeners, aborted batches) are logged through `tracing`. When a
//! [`DiagnosticLog`] is registered globally, the subscriber installed by
//! [`crate::tracing_sub`] writes into it instead of stderr, and the demo shows
//! its tail in a pane.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, OnceLock};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Paragraph, Widget};

pub const DEFAULT_MAX_LINES: usize = 2000;

static GLOBAL_LOG: OnceLock<DiagnosticLog> = OnceLock::new();

/// Register `log` as the process-wide channel. Only the first call wins.
pub fn set_global(log: DiagnosticLog) -> bool {
    GLOBAL_LOG.set(log).is_ok()
}

pub fn global() -> Option<DiagnosticLog> {
    GLOBAL_LOG.get().cloned()
}

pub fn log_line(line: impl Into<String>) {
    if let Some(log) = GLOBAL_LOG.get() {
        log.push(line);
    }
}

#[derive(Debug)]
struct Lines {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl Lines {
    fn push(&mut self, line: String) {
        self.lines.push_back(line);
        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }
}

/// Shared ring buffer of log lines. Cloning shares the buffer.
#[derive(Clone, Debug)]
pub struct DiagnosticLog {
    inner: Arc<Mutex<Lines>>,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl DiagnosticLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Lines {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
            })),
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if let Ok(mut lines) = self.inner.lock() {
            lines.push(line.into());
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map(|l| l.lines.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The newest `count` lines, oldest first.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let Ok(lines) = self.inner.lock() else {
            return Vec::new();
        };
        let skip = lines.lines.len().saturating_sub(count);
        lines.lines.iter().skip(skip).cloned().collect()
    }

    pub fn writer(&self) -> DiagnosticWriter {
        DiagnosticWriter {
            log: self.clone(),
            pending: Vec::new(),
        }
    }

    /// Widget drawing the tail of the log.
    pub fn view(&self, style: Style) -> DiagnosticView<'_> {
        DiagnosticView { log: self, style }
    }
}

/// Line-buffered writer: complete lines are pushed as they arrive, a trailing
/// partial line only on flush.
#[derive(Debug)]
pub struct DiagnosticWriter {
    log: DiagnosticLog,
    pending: Vec<u8>,
}

impl DiagnosticWriter {
    fn push_complete_lines(&mut self) {
        let Some(end) = self.pending.iter().rposition(|b| *b == b'\n') else {
            return;
        };
        let complete: Vec<u8> = self.pending.drain(..=end).collect();
        for line in String::from_utf8_lossy(&complete).split('\n') {
            if !line.is_empty() {
                self.log.push(line);
            }
        }
    }
}

impl Write for DiagnosticWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        self.push_complete_lines();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.push_complete_lines();
        if !self.pending.is_empty() {
            let rest = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            self.log.push(rest);
        }
        Ok(())
    }
}

impl Drop for DiagnosticWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

pub struct DiagnosticView<'a> {
    log: &'a DiagnosticLog,
    style: Style,
}

impl Widget for DiagnosticView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let lines = self.log.tail(area.height as usize);
        let text = Text::from(lines.into_iter().map(Line::from).collect::<Vec<_>>());
        Paragraph::new(text).style(self.style).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_buffer_drops_oldest_lines() {
        let log = DiagnosticLog::new(3);
        for line in ["one", "two", "three", "four"] {
            log.push(line);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.tail(10), vec!["two", "three", "four"]);
        assert_eq!(log.tail(1), vec!["four"]);
    }

    #[test]
    fn writer_splits_lines_and_flushes_partial() {
        let log = DiagnosticLog::new(10);
        let mut writer = log.writer();
        writer.write_all(b"first line\nsecond").unwrap();
        assert_eq!(log.tail(10), vec!["first line"]);
        writer.write_all(b" line\npartial").unwrap();
        writer.flush().unwrap();
        assert_eq!(log.tail(10), vec!["first line", "second line", "partial"]);
    }

    #[test]
    fn view_shows_the_tail() {
        let log = DiagnosticLog::new(10);
        for line in ["a", "b", "c"] {
            log.push(line);
        }
        let area = Rect::new(0, 0, 3, 2);
        let mut buf = Buffer::empty(area);
        log.view(Style::default()).render(area, &mut buf);
        assert_eq!(buf.cell((0, 0)).map(|c| c.symbol()), Some("b"));
        assert_eq!(buf.cell((0, 1)).map(|c| c.symbol()), Some("c"));
    }
}
