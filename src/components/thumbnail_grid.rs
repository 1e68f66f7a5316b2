use super::Component;
use crate::event::AppMsg;
use crate::model::search::SearchResultItem;
use crate::model::selection::{DownloadState, SelectionTracker};
use crate::widgets::common::focused_block;
use crate::widgets::theme::get_theme;
use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, StatefulWidget, Widget},
};
use ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol};
use std::collections::HashMap;

pub struct Thumbnail {
    pub full_url: String,
    pub thumb_url: String,
    pub protocol: StatefulProtocol,
}

pub struct ThumbnailGridState {
    pub items: Vec<Thumbnail>,
    pub cursor: usize,
    picker: Picker,
    thumbnail_size: u32,
    /// Selection state per full URL, mirrored from the tracker.
    marks: HashMap<String, DownloadState>,
    columns: usize,
    scroll_row: usize,
}

/// Cells that fit side by side, never fewer than one.
pub fn columns_for(width: u16, cell_width: u16) -> usize {
    (width / cell_width.max(1)).max(1) as usize
}

/// First visible row after moving the cursor to `cursor_row`.
pub fn scroll_to_show(cursor_row: usize, scroll_row: usize, visible_rows: usize) -> usize {
    let visible_rows = visible_rows.max(1);
    if cursor_row < scroll_row {
        cursor_row
    } else if cursor_row >= scroll_row + visible_rows {
        cursor_row + 1 - visible_rows
    } else {
        scroll_row
    }
}

impl ThumbnailGridState {
    pub fn new(picker: Picker, thumbnail_size: u32) -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            picker,
            thumbnail_size: thumbnail_size.max(1),
            marks: HashMap::new(),
            columns: 1,
            scroll_row: 0,
        }
    }

    /// Terminal cells one thumbnail occupies, borders included.
    pub fn cell_size(&self) -> (u16, u16) {
        let (font_w, font_h) = self.picker.font_size();
        let size = self.thumbnail_size as f64;
        let w = (size / font_w.max(1) as f64).ceil() as u16;
        let h = (size / font_h.max(1) as f64).ceil() as u16;
        (w + 2, h + 2)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.cursor = 0;
        self.scroll_row = 0;
    }

    /// Decodes a thumbnail payload and appends it to the grid.
    pub fn push(&mut self, item: SearchResultItem) -> Result<()> {
        let image = image::load_from_memory(&item.thumbnail)
            .with_context(|| format!("Could not decode thumbnail {}", item.thumb_url))?
            .thumbnail(self.thumbnail_size, self.thumbnail_size);
        let protocol = self.picker.new_resize_protocol(image);
        self.items.push(Thumbnail {
            full_url: item.full_url,
            thumb_url: item.thumb_url,
            protocol,
        });
        Ok(())
    }

    pub fn sync_selection(&mut self, tracker: &SelectionTracker) {
        self.marks = tracker
            .records()
            .iter()
            .map(|r| (r.url.clone(), r.state.clone()))
            .collect();
    }

    pub fn selected_url(&self) -> Option<&str> {
        self.items.get(self.cursor).map(|t| t.full_url.as_str())
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.items.is_empty() {
            return;
        }
        let last = self.items.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }
}

impl Component for ThumbnailGridState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        if let AppMsg::Key(key) = msg {
            let columns = self.columns as isize;
            match key.code {
                KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
                KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
                KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-columns),
                KeyCode::Down | KeyCode::Char('j') => self.move_cursor(columns),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    return self
                        .selected_url()
                        .map(|url| AppMsg::ToggleSelection { url: url.to_string() });
                }
                _ => {}
            }
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool) {
        let theme = get_theme();
        let title = format!("Results ({})", self.items.len());
        let block = focused_block(&title, is_focused);
        let inner = block.inner(area);
        block.render(area, buf);

        if self.items.is_empty() {
            Paragraph::new("No results yet. Search for something above.")
                .style(Style::default().fg(theme.text_secondary))
                .alignment(Alignment::Center)
                .render(inner, buf);
            return;
        }

        let (cell_w, cell_h) = self.cell_size();
        self.columns = columns_for(inner.width, cell_w);
        let visible_rows = (inner.height / cell_h.max(1)).max(1) as usize;
        self.scroll_row = scroll_to_show(self.cursor / self.columns, self.scroll_row, visible_rows);

        let first = self.scroll_row * self.columns;
        let last = (first + visible_rows * self.columns).min(self.items.len());
        let columns = self.columns;
        for idx in first..last {
            let slot = idx - first;
            let x = inner.x + (slot % columns) as u16 * cell_w;
            let y = inner.y + (slot / columns) as u16 * cell_h;
            let cell = Rect::new(x, y, cell_w, cell_h).intersection(inner);
            if cell.is_empty() {
                continue;
            }

            let thumb = &mut self.items[idx];
            let mark = self.marks.get(&thumb.full_url);
            let is_cursor = idx == self.cursor && is_focused;

            let (border_type, border_style, label) = match mark {
                Some(DownloadState::Ready) => (
                    BorderType::Thick,
                    Style::default()
                        .fg(theme.selection_marker)
                        .add_modifier(Modifier::BOLD),
                    "✓",
                ),
                Some(DownloadState::Downloading) => (
                    BorderType::Thick,
                    Style::default().fg(theme.status_running),
                    "…",
                ),
                None => (BorderType::Plain, Style::default().fg(theme.border_unfocused), ""),
            };
            let border_style = if is_cursor {
                border_style.fg(theme.text_highlight)
            } else {
                border_style
            };

            let cell_block = Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(border_style)
                .title(label);
            let image_area = cell_block.inner(cell);
            cell_block.render(cell, buf);
            StatefulWidget::render(StatefulImage::default(), image_area, buf, &mut thumb.protocol);
        }
    }
}
