use super::Component;
use crate::event::AppMsg;
use crate::pipeline::fs_ops::has_extension;
use crate::widgets::common::{centered_rect, popup_block};
use crate::widgets::theme::get_theme;
use crossterm::event::KeyCode;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{
        Clear, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState,
        StatefulWidget, Widget,
    },
};
use std::path::{Path, PathBuf};

pub const AUDIO_EXTENSIONS: [&str; 6] = ["mp3", "wav", "m4a", "aac", "ogg", "flac"];

/// Directories first, then audio files, each sorted. Hidden entries are skipped.
pub fn list_entries(dir: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden {
                continue;
            }
            if path.is_dir() {
                dirs.push(path);
            } else if has_extension(&path, &AUDIO_EXTENSIONS) {
                files.push(path);
            }
        }
    }

    dirs.sort();
    files.sort();
    dirs.extend(files);
    dirs
}

pub struct FileBrowserState {
    pub current_dir: PathBuf,
    pub entries: Vec<PathBuf>,
    pub list_state: ListState,
    pub scroll_state: ScrollbarState,
}

impl Default for FileBrowserState {
    fn default() -> Self {
        let root = dirs::home_dir()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(root)
    }
}

impl FileBrowserState {
    pub fn new(root: PathBuf) -> Self {
        let mut state = Self {
            current_dir: root,
            entries: Vec::new(),
            list_state: ListState::default(),
            scroll_state: ScrollbarState::default(),
        };
        state.refresh_entries();
        state
    }

    fn refresh_entries(&mut self) {
        self.entries.clear();
        if self.current_dir.parent().is_some() {
            self.entries.push(PathBuf::from(".."));
        }
        self.entries.extend(list_entries(&self.current_dir));
        self.list_state.select((!self.entries.is_empty()).then_some(0));
        self.scroll_state = self.scroll_state.position(0);
    }

    fn change_dir(&mut self, dir: PathBuf) {
        self.current_dir = dir;
        self.refresh_entries();
    }

    fn enter_selected(&mut self) -> Option<PathBuf> {
        let path = self.entries.get(self.list_state.selected()?)?.clone();
        if path.as_os_str() == ".." {
            if let Some(parent) = self.current_dir.parent() {
                self.change_dir(parent.to_path_buf());
            }
            None
        } else if path.is_dir() {
            self.change_dir(path);
            None
        } else {
            Some(path)
        }
    }

    fn step(&mut self, forward: bool) {
        if self.entries.is_empty() {
            return;
        }
        let len = self.entries.len();
        let i = match self.list_state.selected() {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None => 0,
        };
        self.list_state.select(Some(i));
        self.scroll_state = self.scroll_state.position(i);
    }
}

impl Component for FileBrowserState {
    fn update(&mut self, msg: &AppMsg) -> Option<AppMsg> {
        if let AppMsg::Key(key) = msg {
            match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.step(true),
                KeyCode::Up | KeyCode::Char('k') => self.step(false),
                KeyCode::Backspace | KeyCode::Left => {
                    if let Some(parent) = self.current_dir.parent() {
                        self.change_dir(parent.to_path_buf());
                    }
                }
                KeyCode::Enter => {
                    return self.enter_selected().map(AppMsg::MusicSelected);
                }
                KeyCode::Esc => return Some(AppMsg::BrowseCancelled),
                _ => {}
            }
        }
        None
    }

    fn render(&mut self, area: Rect, buf: &mut Buffer, _is_focused: bool) {
        let theme = get_theme();
        let popup = centered_rect(60, 60, area);
        Clear.render(popup, buf);

        let title = format!("Background music: {}", self.current_dir.display());
        let block = popup_block(&title);
        let inner = block.inner(popup);
        block.render(popup, buf);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|entry| {
                let is_up = entry.as_os_str() == "..";
                let icon = if is_up || entry.is_dir() { "📁" } else { "🎵" };
                let name = if is_up {
                    "..".into()
                } else {
                    entry.file_name().unwrap_or_default().to_string_lossy()
                };
                ListItem::new(format!("{} {}", icon, name))
                    .style(Style::default().fg(theme.text_primary))
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .fg(theme.text_highlight)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        StatefulWidget::render(list, inner, buf, &mut self.list_state);

        self.scroll_state = self.scroll_state.content_length(self.entries.len());

        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"));

        scrollbar.render(inner, buf, &mut self.scroll_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;
    use std::fs;

    fn key(code: KeyCode) -> AppMsg {
        AppMsg::Key(KeyEvent::from(code))
    }

    #[test]
    fn test_only_dirs_and_audio_listed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("albums")).unwrap();
        fs::write(dir.path().join("b.mp3"), b"").unwrap();
        fs::write(dir.path().join("a.FLAC"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"").unwrap();

        let names: Vec<String> = list_entries(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["albums", "a.FLAC", "b.mp3"]);
    }

    #[test]
    fn test_descend_choose_and_cancel() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("song.wav"), b"").unwrap();

        let mut browser = FileBrowserState::new(dir.path().to_path_buf());
        // ".." then "sub"
        browser.update(&key(KeyCode::Down));
        assert!(browser.update(&key(KeyCode::Enter)).is_none());
        assert_eq!(browser.current_dir, sub);

        browser.update(&key(KeyCode::Down));
        match browser.update(&key(KeyCode::Enter)) {
            Some(AppMsg::MusicSelected(path)) => assert_eq!(path, sub.join("song.wav")),
            other => panic!("unexpected {:?}", other),
        }

        browser.update(&key(KeyCode::Up));
        browser.update(&key(KeyCode::Enter));
        assert_eq!(browser.current_dir, dir.path());
        assert!(matches!(
            browser.update(&key(KeyCode::Esc)),
            Some(AppMsg::BrowseCancelled)
        ));
    }
}
