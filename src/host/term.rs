//! In-memory [`Host`] that draws its windows with ratatui.
//!
//! `TermHost` keeps buffers, windows and highlight links in plain maps and
//! implements batches by snapshotting that state on [`Host::begin_batch`].
//! It is what the demo binary runs on and what the tests assert against.

use std::collections::BTreeMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use unicode_width::UnicodeWidthChar;

use super::{
    BufferId, BufferOption, Environment, Highlight, Host, HostError, HostResult, NamespaceId,
    WindowId, WindowOption,
};
use crate::events::EditorEvent;
use crate::layout::{Edges, Position, ScreenSize};
use crate::theme::{NORMAL, TITLE, Theme};
use crate::window::BorderChars;
use crate::window::config::{PopupConfig, WinConfig};

/// Highlight links are followed at most this deep when drawing.
const MAX_LINK_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostStats {
    /// Host operations issued, not counting batch boundaries.
    pub calls: usize,
    pub commits: usize,
    pub aborts: usize,
}

#[derive(Debug, Clone, Default)]
struct HostBuffer {
    name: String,
    lines: Vec<String>,
    options: BTreeMap<&'static str, BufferOption>,
    highlights: Vec<Highlight>,
}

impl HostBuffer {
    fn is_modifiable(&self) -> bool {
        !matches!(
            self.options.get("modifiable"),
            Some(BufferOption::Modifiable(false))
        )
    }
}

#[derive(Debug, Clone)]
struct HostWindow {
    buffer: BufferId,
    config: WinConfig,
    options: BTreeMap<&'static str, WindowOption>,
}

#[derive(Debug, Clone, Default)]
struct State {
    next_id: u32,
    namespaces: BTreeMap<String, NamespaceId>,
    buffers: BTreeMap<BufferId, HostBuffer>,
    windows: BTreeMap<WindowId, HostWindow>,
    links: BTreeMap<String, String>,
    focused: Option<WindowId>,
    events: Vec<EditorEvent>,
}

impl State {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn window_of_buffer(&self, buffer: BufferId) -> Option<WindowId> {
        self.windows
            .iter()
            .find_map(|(id, window)| (window.buffer == buffer).then_some(*id))
    }

    fn buffer_mut(&mut self, buffer: BufferId) -> HostResult<&mut HostBuffer> {
        self.buffers
            .get_mut(&buffer)
            .ok_or(HostError::BufferNotFound(buffer))
    }

    fn remove_window(&mut self, window: WindowId) -> HostResult<()> {
        let removed = self
            .windows
            .remove(&window)
            .ok_or(HostError::WindowNotFound(window))?;
        if self.focused == Some(window) {
            self.focused = None;
        }
        if self.window_of_buffer(removed.buffer).is_none() {
            self.events.push(EditorEvent::BufWinLeave(removed.buffer));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TermHost {
    state: State,
    snapshot: Option<State>,
    depth: usize,
    screen: ScreenSize,
    cursor: Position,
    stats: HostStats,
}

impl TermHost {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            state: State::default(),
            snapshot: None,
            depth: 0,
            screen,
            cursor: Position::default(),
            stats: HostStats::default(),
        }
    }

    pub fn set_screen(&mut self, screen: ScreenSize) {
        self.screen = screen;
    }

    pub fn set_cursor(&mut self, cursor: Position) {
        self.cursor = cursor;
    }

    pub fn stats(&self) -> HostStats {
        self.stats
    }

    pub fn in_batch(&self) -> bool {
        self.depth > 0
    }

    pub fn buffer_exists(&self, buffer: BufferId) -> bool {
        self.state.buffers.contains_key(&buffer)
    }

    pub fn buffer_name(&self, buffer: BufferId) -> Option<&str> {
        self.state.buffers.get(&buffer).map(|b| b.name.as_str())
    }

    pub fn buffer_lines(&self, buffer: BufferId) -> Option<&[String]> {
        self.state.buffers.get(&buffer).map(|b| b.lines.as_slice())
    }

    pub fn buffer_option(&self, buffer: BufferId, key: &str) -> Option<&BufferOption> {
        self.state.buffers.get(&buffer)?.options.get(key)
    }

    pub fn buffer_highlights(&self, buffer: BufferId) -> &[Highlight] {
        self.state
            .buffers
            .get(&buffer)
            .map(|b| b.highlights.as_slice())
            .unwrap_or_default()
    }

    pub fn window_config(&self, window: WindowId) -> Option<&WinConfig> {
        self.state.windows.get(&window).map(|w| &w.config)
    }

    pub fn window_buffer(&self, window: WindowId) -> Option<BufferId> {
        self.state.windows.get(&window).map(|w| w.buffer)
    }

    pub fn window_option(&self, window: WindowId, key: &str) -> Option<&WindowOption> {
        self.state.windows.get(&window)?.options.get(key)
    }

    /// Open windows, bottom of the stack first.
    pub fn windows(&self) -> Vec<WindowId> {
        let mut windows: Vec<(u16, WindowId)> = self
            .state
            .windows
            .iter()
            .map(|(id, w)| (w.config.zindex(), *id))
            .collect();
        windows.sort();
        windows.into_iter().map(|(_, id)| id).collect()
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.state.focused
    }

    pub fn highlight_link(&self, group: &str) -> Option<&str> {
        self.state.links.get(group).map(String::as_str)
    }

    /// Close `window` the way a user would. Queues a `BufWinLeave` like any
    /// other close.
    pub fn close_window(&mut self, window: WindowId) -> HostResult<()> {
        self.stats.calls += 1;
        self.state.remove_window(window)
    }

    /// Drain the queued events. A buffer that is shown again by the time the
    /// events are taken did not really leave its window and is skipped.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        let queued = std::mem::take(&mut self.state.events);
        let mut events: Vec<EditorEvent> = Vec::with_capacity(queued.len());
        for event in queued {
            let EditorEvent::BufWinLeave(buffer) = event;
            if self.state.window_of_buffer(buffer).is_none() && !events.contains(&event) {
                events.push(event);
            }
        }
        events
    }

    fn resolve_style(&self, theme: &Theme, group: &str) -> Style {
        let mut group = group;
        for _ in 0..MAX_LINK_DEPTH {
            if let Some(style) = theme.get(group) {
                return style;
            }
            match self.state.links.get(group) {
                Some(next) => group = next.as_str(),
                None => break,
            }
        }
        theme.style(NORMAL)
    }

    fn window_style(&self, theme: &Theme, id: WindowId, window: &HostWindow) -> Style {
        if let WinConfig::Popup(config) = &window.config {
            return self.resolve_style(theme, &config.highlight);
        }
        let Some(WindowOption::WinHighlight(mapping)) = window.options.get("winhighlight") else {
            return theme.style(NORMAL);
        };
        let wanted = if self.state.focused == Some(id) {
            "Normal"
        } else {
            "NormalNC"
        };
        let group = mapping
            .split(',')
            .filter_map(|pair| pair.split_once(':'))
            .find_map(|(from, to)| (from == wanted).then_some(to))
            .unwrap_or(NORMAL);
        self.resolve_style(theme, group)
    }

    /// Draw every window into `buf`, lowest z-index first. Screen row 0 maps
    /// to `area.y`.
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        for id in self.windows() {
            let Some(window) = self.state.windows.get(&id) else {
                continue;
            };
            let Some(buffer) = self.state.buffers.get(&window.buffer) else {
                continue;
            };
            let style = self.window_style(theme, id, window);
            let mut canvas = Canvas { area, buf: &mut *buf };
            match &window.config {
                WinConfig::Float(config) => {
                    canvas.fill(config.row, config.col, config.width, config.height, style);
                    self.draw_buffer(
                        &mut canvas,
                        theme,
                        buffer,
                        Position::new(config.row, config.col),
                        config.width,
                        config.height,
                        style,
                    );
                }
                WinConfig::Popup(config) => {
                    self.draw_popup(&mut canvas, theme, buffer, config, style);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_buffer(
        &self,
        canvas: &mut Canvas<'_>,
        theme: &Theme,
        buffer: &HostBuffer,
        origin: Position,
        width: i32,
        height: i32,
        style: Style,
    ) {
        for (idx, line) in buffer.lines.iter().take(height.max(0) as usize).enumerate() {
            canvas.text(origin.top + idx as i32, origin.left, width, line, style);
        }
        for highlight in &buffer.highlights {
            let row = highlight.line as i32;
            if row >= height {
                continue;
            }
            let start = highlight.col_start as i32;
            let end = (highlight.col_end as i32).min(width);
            let hl_style = style.patch(self.resolve_style(theme, &highlight.group));
            canvas.restyle(origin.top + row, origin.left + start, end - start, hl_style);
        }
    }

    fn draw_popup(
        &self,
        canvas: &mut Canvas<'_>,
        theme: &Theme,
        buffer: &HostBuffer,
        config: &PopupConfig,
        style: Style,
    ) {
        let width = config.min_width.min(config.max_width).max(0);
        let height = config.min_height.min(config.max_height).max(0);
        let border = config.border.unwrap_or(Edges::ZERO);
        let padding = config.padding.unwrap_or(Edges::ZERO);
        let top = config.line - 1;
        let left = config.col - 1;
        let outer_width = width + border.left + padding.left + padding.right + border.right;
        let outer_height = height + border.top + padding.top + padding.bottom + border.bottom;
        canvas.fill(top, left, outer_width, outer_height, style);

        if config.border.is_some() {
            let border_style = style.patch(
                config
                    .border_highlight
                    .as_deref()
                    .map(|group| self.resolve_style(theme, group))
                    .unwrap_or_default(),
            );
            let chars = config.border_chars.clone().unwrap_or_default();
            draw_frame(
                canvas,
                &chars,
                border,
                (top, left, outer_width, outer_height),
                border_style,
            );
            if let Some(title) = &config.title {
                let title_style = border_style.patch(self.resolve_style(theme, TITLE));
                canvas.text(
                    top,
                    left + border.left,
                    outer_width - border.left - border.right,
                    title,
                    title_style,
                );
            }
        }

        let origin = Position::new(top + border.top + padding.top, left + border.left + padding.left);
        self.draw_buffer(canvas, theme, buffer, origin, width, height, style);
    }
}

/// Popup border glyphs around `(top, left, width, height)`.
fn draw_frame(
    canvas: &mut Canvas<'_>,
    chars: &BorderChars,
    border: Edges,
    (top, left, width, height): (i32, i32, i32, i32),
    style: Style,
) {
    let right = left + width - 1;
    let bottom = top + height - 1;
    if border.top > 0 {
        for col in left..=right {
            canvas.put(top, col, &chars.top, style);
        }
    }
    if border.bottom > 0 {
        for col in left..=right {
            canvas.put(bottom, col, &chars.bottom, style);
        }
    }
    if border.left > 0 {
        for row in top..=bottom {
            canvas.put(row, left, &chars.left, style);
        }
    }
    if border.right > 0 {
        for row in top..=bottom {
            canvas.put(row, right, &chars.right, style);
        }
    }
    let corners = [
        (border.top > 0 && border.left > 0, top, left, &chars.top_left),
        (border.top > 0 && border.right > 0, top, right, &chars.top_right),
        (border.bottom > 0 && border.right > 0, bottom, right, &chars.bottom_right),
        (border.bottom > 0 && border.left > 0, bottom, left, &chars.bottom_left),
    ];
    for (visible, row, col, glyph) in corners {
        if visible {
            canvas.put(row, col, glyph, style);
        }
    }
}

/// Clipped drawing in screen coordinates relative to `area`.
struct Canvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl Canvas<'_> {
    fn cell_pos(&self, row: i32, col: i32) -> Option<(u16, u16)> {
        if row < 0 || col < 0 || row >= self.area.height as i32 || col >= self.area.width as i32 {
            return None;
        }
        Some((self.area.x + col as u16, self.area.y + row as u16))
    }

    fn put(&mut self, row: i32, col: i32, symbol: &str, style: Style) {
        if let Some(pos) = self.cell_pos(row, col)
            && let Some(cell) = self.buf.cell_mut(pos)
        {
            cell.set_symbol(symbol).set_style(style);
        }
    }

    fn fill(&mut self, top: i32, left: i32, width: i32, height: i32, style: Style) {
        for row in top..top + height {
            for col in left..left + width {
                self.put(row, col, " ", style);
            }
        }
    }

    /// Write `text` starting at `(row, col)`, at most `max_cells` wide.
    fn text(&mut self, row: i32, col: i32, max_cells: i32, text: &str, style: Style) {
        let mut used = 0;
        let mut symbol = [0u8; 4];
        for ch in text.chars() {
            let cells = ch.width().unwrap_or(0) as i32;
            if cells == 0 {
                continue;
            }
            if used + cells > max_cells {
                break;
            }
            self.put(row, col + used, ch.encode_utf8(&mut symbol), style);
            if cells == 2 {
                self.put(row, col + used + 1, "", style);
            }
            used += cells;
        }
    }

    fn restyle(&mut self, row: i32, col: i32, cells: i32, style: Style) {
        for col in col..col + cells {
            if let Some(pos) = self.cell_pos(row, col)
                && let Some(cell) = self.buf.cell_mut(pos)
            {
                cell.set_style(style);
            }
        }
    }
}

impl Environment for TermHost {
    fn global_cursor_position(&self) -> Position {
        self.cursor
    }

    fn screen_size(&self) -> ScreenSize {
        self.screen
    }
}

impl Host for TermHost {
    fn create_namespace(&mut self, name: &str) -> HostResult<NamespaceId> {
        self.stats.calls += 1;
        if let Some(id) = self.state.namespaces.get(name) {
            return Ok(*id);
        }
        let id = NamespaceId(self.state.next_id());
        self.state.namespaces.insert(name.to_owned(), id);
        Ok(id)
    }

    fn create_buffer(&mut self, name: &str) -> HostResult<BufferId> {
        self.stats.calls += 1;
        let id = BufferId(self.state.next_id());
        self.state.buffers.insert(
            id,
            HostBuffer {
                name: name.to_owned(),
                ..HostBuffer::default()
            },
        );
        Ok(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) -> HostResult<()> {
        self.stats.calls += 1;
        if !self.state.buffers.contains_key(&buffer) {
            return Err(HostError::BufferNotFound(buffer));
        }
        while let Some(window) = self.state.window_of_buffer(buffer) {
            self.state.remove_window(window)?;
        }
        self.state.buffers.remove(&buffer);
        Ok(())
    }

    fn open_window(
        &mut self,
        buffer: BufferId,
        focus: bool,
        config: &WinConfig,
    ) -> HostResult<WindowId> {
        self.stats.calls += 1;
        if !self.state.buffers.contains_key(&buffer) {
            return Err(HostError::BufferNotFound(buffer));
        }
        let id = WindowId(self.state.next_id());
        self.state.windows.insert(
            id,
            HostWindow {
                buffer,
                config: config.clone(),
                options: BTreeMap::new(),
            },
        );
        if focus {
            self.state.focused = Some(id);
        }
        Ok(id)
    }

    fn set_window_config(&mut self, window: WindowId, config: &WinConfig) -> HostResult<()> {
        self.stats.calls += 1;
        let entry = self
            .state
            .windows
            .get_mut(&window)
            .ok_or(HostError::WindowNotFound(window))?;
        entry.config = config.clone();
        Ok(())
    }

    fn close_window_by_buffer(&mut self, buffer: BufferId) -> HostResult<()> {
        self.stats.calls += 1;
        let window = self
            .state
            .window_of_buffer(buffer)
            .ok_or(HostError::NoWindowForBuffer(buffer))?;
        self.state.remove_window(window)
    }

    fn window_of_buffer(&self, buffer: BufferId) -> Option<WindowId> {
        self.state.window_of_buffer(buffer)
    }

    /// Replaces the whole buffer and drops its highlights. Fails on buffers
    /// that are not modifiable.
    fn set_buffer_lines(&mut self, buffer: BufferId, lines: &[String]) -> HostResult<()> {
        self.stats.calls += 1;
        let entry = self.state.buffer_mut(buffer)?;
        if !entry.is_modifiable() {
            return Err(HostError::Rejected(format!(
                "buffer {buffer} is not modifiable"
            )));
        }
        entry.lines = lines.to_vec();
        entry.highlights.clear();
        Ok(())
    }

    fn set_buffer_option(&mut self, buffer: BufferId, option: BufferOption) -> HostResult<()> {
        self.stats.calls += 1;
        let entry = self.state.buffer_mut(buffer)?;
        entry.options.insert(option.key(), option);
        Ok(())
    }

    fn set_window_option(&mut self, window: WindowId, option: WindowOption) -> HostResult<()> {
        self.stats.calls += 1;
        let entry = self
            .state
            .windows
            .get_mut(&window)
            .ok_or(HostError::WindowNotFound(window))?;
        entry.options.insert(option.key(), option);
        Ok(())
    }

    fn add_highlight(&mut self, buffer: BufferId, highlight: &Highlight) -> HostResult<()> {
        self.stats.calls += 1;
        let entry = self.state.buffer_mut(buffer)?;
        entry.highlights.push(highlight.clone());
        Ok(())
    }

    fn link_highlight(&mut self, from: &str, to: &str) -> HostResult<()> {
        self.stats.calls += 1;
        self.state.links.insert(from.to_owned(), to.to_owned());
        Ok(())
    }

    fn begin_batch(&mut self) {
        if self.depth == 0 {
            self.snapshot = Some(self.state.clone());
        }
        self.depth += 1;
    }

    fn commit_batch(&mut self) -> HostResult<()> {
        if self.depth == 0 {
            return Err(HostError::Rejected("commit without an open batch".into()));
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.snapshot = None;
            self.stats.commits += 1;
        }
        Ok(())
    }

    fn abort_batch(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.state = snapshot;
        }
        self.depth = 0;
        self.stats.aborts += 1;
    }
}
