use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, unbounded};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
};
use ratatui_image::picker::Picker;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, time::Duration};
use tracing::{info, warn};

use crate::components::Component;
use crate::components::confirm::ConfirmState;
use crate::components::file_browser::FileBrowserState;
use crate::components::logs::LogsState;
use crate::components::options_panel::OptionsPanelState;
use crate::components::search_bar::SearchBarState;
use crate::components::status_bar::{READY_TEXT, StatusBarState};
use crate::components::thumbnail_grid::ThumbnailGridState;
use crate::config::Config;
use crate::event::{AppMsg, SearchEvent};
use crate::model::selection::{Completion, SelectionTracker, Toggle};
use crate::pipeline::download::{http_client, remove_download};
use crate::pipeline::fs_ops::display_name;
use crate::pipeline_worker::PipelineWorker;

const TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Search,
    Options,
    Grid,
    Logs,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Search => Focus::Options,
            Focus::Options => Focus::Grid,
            Focus::Grid => Focus::Logs,
            Focus::Logs => Focus::Search,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Search => Focus::Logs,
            Focus::Options => Focus::Search,
            Focus::Grid => Focus::Options,
            Focus::Logs => Focus::Grid,
        }
    }
}

pub enum Popup {
    Browser(FileBrowserState),
    Confirm {
        dialog: ConfirmState,
        paths: Vec<PathBuf>,
    },
}

pub struct App {
    pub config: Arc<Config>,
    pub focus: Focus,
    pub search_bar: SearchBarState,
    pub options: OptionsPanelState,
    pub grid: ThumbnailGridState,
    pub logs: LogsState,
    pub status_bar: StatusBarState,
    pub popup: Option<Popup>,
    pub tracker: SelectionTracker,
    pub search_running: bool,
    pub video_running: bool,
    pub should_quit: bool,
    worker: PipelineWorker,
    rx: Receiver<AppMsg>,
    thumb_rx: Receiver<SearchEvent>,
}

impl App {
    pub fn new(config: Config, picker: Picker) -> Result<Self> {
        let (tx, rx): (Sender<AppMsg>, Receiver<AppMsg>) = unbounded();
        let (thumb_tx, thumb_rx) = unbounded();
        let config = Arc::new(config);
        let worker = PipelineWorker::new(tx, thumb_tx, http_client()?, Arc::clone(&config));

        let mut logs = LogsState::default();
        logs.add_log(READY_TEXT.to_string());

        Ok(Self {
            grid: ThumbnailGridState::new(picker, config.thumbnail_size),
            config,
            focus: Focus::Search,
            search_bar: SearchBarState::default(),
            options: OptionsPanelState::default(),
            logs,
            status_bar: StatusBarState::default(),
            popup: None,
            tracker: SelectionTracker::new(),
            search_running: false,
            video_running: false,
            should_quit: false,
            worker,
            rx,
            thumb_rx,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;

        let res = self.event_loop(&mut terminal);

        restore_terminal(&mut terminal)?;
        res
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|f| self.draw(f))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()?
                    && key.kind == KeyEventKind::Press
                {
                    self.dispatch(AppMsg::Key(key));
                }
            } else {
                self.dispatch(AppMsg::Tick);
            }

            self.drain_channels();
        }
        Ok(())
    }

    fn draw(&mut self, f: &mut Frame) {
        let area = f.area();
        let buf = f.buffer_mut();

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(rows[1]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(3)])
            .split(body[1]);

        let popup_open = self.popup.is_some();
        let focused = |pane: Focus| !popup_open && self.focus == pane;
        let (search_f, options_f, grid_f, logs_f) = (
            focused(Focus::Search),
            focused(Focus::Options),
            focused(Focus::Grid),
            focused(Focus::Logs),
        );

        self.search_bar.render(rows[0], buf, search_f);
        self.grid.render(body[0], buf, grid_f);
        self.options.render(side[0], buf, options_f);
        self.logs.render(side[1], buf, logs_f);
        self.status_bar.render(rows[2], buf, false);

        match &mut self.popup {
            Some(Popup::Browser(browser)) => browser.render(area, buf, true),
            Some(Popup::Confirm { dialog, .. }) => dialog.render(area, buf, true),
            None => {}
        }
    }

    /// Handles `msg` and everything it leads to.
    pub fn dispatch(&mut self, msg: AppMsg) {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            if let Some(next) = self.handle(msg) {
                queue.push_back(next);
            }
        }
    }

    pub fn drain_channels(&mut self) {
        while let Ok(event) = self.thumb_rx.try_recv() {
            match event {
                SearchEvent::Thumbnail(item) => {
                    if let Err(e) = self.grid.push(item) {
                        warn!("thumbnail skipped: {:#}", e);
                        self.log(format!("Skipping thumbnail: {:#}", e));
                    }
                }
                SearchEvent::Complete => {
                    self.search_running = false;
                    self.search_bar.searching = false;
                }
            }
        }
        while let Ok(msg) = self.rx.try_recv() {
            self.dispatch(msg);
        }
    }

    fn log(&mut self, line: String) {
        self.logs.add_log(line);
    }

    fn set_status(&mut self, text: String) {
        let msg = AppMsg::Status(text);
        self.status_bar.update(&msg);
        self.logs.update(&msg);
    }

    fn is_editing(&self) -> bool {
        match self.focus {
            Focus::Search => true,
            Focus::Options => self.options.is_editing(),
            Focus::Grid | Focus::Logs => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<AppMsg> {
        if let Some(popup) = &mut self.popup {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Some(AppMsg::Quit);
            }
            let msg = AppMsg::Key(key);
            return match popup {
                Popup::Browser(browser) => browser.update(&msg),
                Popup::Confirm { dialog, .. } => dialog.update(&msg),
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return Some(AppMsg::Quit),
            KeyCode::Char('v') if ctrl => return Some(AppMsg::RequestVideo),
            KeyCode::F(5) => return Some(AppMsg::RequestVideo),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return None;
            }
            KeyCode::Char('q') if !self.is_editing() => return Some(AppMsg::Quit),
            _ => {}
        }

        let msg = AppMsg::Key(key);
        match self.focus {
            Focus::Search => self.search_bar.update(&msg),
            Focus::Options => self.options.update(&msg),
            Focus::Grid => self.grid.update(&msg),
            Focus::Logs => self.logs.update(&msg),
        }
    }

    fn handle(&mut self, msg: AppMsg) -> Option<AppMsg> {
        match msg {
            AppMsg::Key(key) => return self.handle_key(key),
            AppMsg::Tick => {}
            AppMsg::Quit => self.should_quit = true,

            AppMsg::StartSearch(keywords) => self.start_search(keywords),
            AppMsg::Status(text) => self.set_status(text),
            AppMsg::LogMessage(_) => {
                self.logs.update(&msg);
            }

            AppMsg::ToggleSelection { url } => self.toggle_selection(&url),
            AppMsg::DownloadFinished {
                url,
                generation,
                result,
            } => self.finish_download(&url, generation, result),

            AppMsg::BrowseMusic => {
                self.popup = Some(Popup::Browser(FileBrowserState::default()));
            }
            AppMsg::MusicSelected(ref path) => {
                self.popup = None;
                self.log(format!("Background music: {}", display_name(path)));
                self.options.update(&msg);
            }
            AppMsg::BrowseCancelled => self.popup = None,

            AppMsg::RequestVideo => self.request_video(),
            AppMsg::ConfirmVideo(accepted) => self.confirm_video(accepted),
            AppMsg::VideoProgress(percent) => {
                let file = display_name(&self.config.output_file);
                self.status_bar.update(&AppMsg::Status(format!(
                    "Writing video file: {}... {}%",
                    file, percent
                )));
                self.status_bar.update(&msg);
            }
            AppMsg::VideoFinished(ref result) => {
                self.video_running = false;
                let text = match result {
                    Ok(path) => format!("Success! Video saved as {}", path.display()),
                    Err(e) => format!("FATAL VIDEO ERROR: {}", e),
                };
                self.set_status(text);
                self.status_bar.update(&msg);
            }
        }
        None
    }

    fn start_search(&mut self, keywords: String) {
        if self.search_running {
            self.set_status("A search is already in progress.".to_string());
            return;
        }
        let keywords = keywords.trim().to_string();
        if keywords.is_empty() {
            self.set_status("Warning: Please enter keywords to search.".to_string());
            return;
        }
        self.grid.clear();
        self.search_running = true;
        self.search_bar.searching = true;
        info!(engine = self.search_bar.engine.name(), %keywords, "search requested");
        self.worker.start_search(self.search_bar.engine, keywords);
    }

    fn refresh_selection(&mut self) {
        self.grid.sync_selection(&self.tracker);
        self.status_bar.set_counter(self.tracker.counter_text());
    }

    fn toggle_selection(&mut self, url: &str) {
        match self.tracker.toggle(url) {
            Toggle::Selected(generation) => {
                self.worker.start_download(url.to_string(), generation)
            }
            Toggle::Deselected(record) => {
                if let Some(path) = record.path.filter(|p| p.exists()) {
                    match remove_download(&path) {
                        Ok(name) => self.log(format!("Removed deselected file: {}", name)),
                        Err(e) => self.log(format!("Error: {:#}", e)),
                    }
                }
            }
        }
        self.refresh_selection();
    }

    fn finish_download(&mut self, url: &str, generation: u64, result: Result<PathBuf, String>) {
        let error = result.as_ref().err().cloned();
        match self.tracker.complete(url, generation, result) {
            Completion::Stored => {
                if let Some(path) = self.tracker.get(url).and_then(|r| r.path.as_deref()) {
                    let line = format!("Saved: {}", display_name(path));
                    self.log(line);
                }
            }
            Completion::Orphaned(path) => match remove_download(&path) {
                Ok(name) => self.log(format!("Discarded download of deselected image: {}", name)),
                Err(e) => self.log(format!("Error: {:#}", e)),
            },
            Completion::Failed => {
                self.log(format!(
                    "Error downloading full {}: {}",
                    url,
                    error.unwrap_or_default()
                ));
            }
        }
        self.refresh_selection();
    }

    fn request_video(&mut self) {
        if self.video_running {
            self.set_status("Video creation is already in progress.".to_string());
            return;
        }
        let paths = self.tracker.valid_paths();
        if paths.is_empty() {
            self.set_status("No images selected or downloaded files are missing.".to_string());
            return;
        }
        if paths.len() < 2 {
            self.set_status("Please select at least 2 images to create a video.".to_string());
            return;
        }
        let message = format!(
            "Create video from {} selected images?\nOutput: {}",
            paths.len(),
            display_name(&self.config.output_file)
        );
        self.popup = Some(Popup::Confirm {
            dialog: ConfirmState::new(message),
            paths,
        });
    }

    fn confirm_video(&mut self, accepted: bool) {
        let Some(Popup::Confirm { paths, .. }) = self.popup.take() else {
            return;
        };
        if !accepted {
            self.set_status("Video creation cancelled.".to_string());
            return;
        }
        self.video_running = true;
        self.set_status(format!("Starting video creation with {} images...", paths.len()));
        self.worker.start_video(paths, self.options.options());
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().ok();
    // LeaveAlternateScreen must be executed on the same stdout the backend uses
    let mut out = io::stdout();
    execute!(out, LeaveAlternateScreen)?;
    Ok(())
}
