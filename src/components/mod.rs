use crate::event::AppMsg;
use ratatui::{buffer::Buffer, layout::Rect};

pub mod confirm;
pub mod file_browser;
pub mod logs;
pub mod options_panel;
pub mod search_bar;
pub mod status_bar;
pub mod thumbnail_grid;

pub trait Component {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg>;

    fn render(&mut self, area: Rect, buf: &mut Buffer, is_focused: bool);
}
