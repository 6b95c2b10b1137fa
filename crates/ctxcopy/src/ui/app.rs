//! Application loop for the TUI.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::app::export::{ExportOptions, Exporter};
use crate::app::filter::PathFilter;
use crate::app::selection::{checked_counts, collect_instructions};
use crate::app::tree::SelectionTree;
use crate::app::worker::{ExtractionHandle, WorkerEvent};
use crate::domain::model::{CheckState, ExtractionResult};
use crate::infra::clipboard::{ClipboardSink, SystemClipboard};
use crate::ui::components::file_tree::{FileTree, FileTreeState};
use crate::ui::components::summary::{ExtractionStatus, Summary};

const TICK_RATE: Duration = Duration::from_millis(100);

/// Interactive checkbox tree with background extraction.
pub struct UiApp<C: ClipboardSink = SystemClipboard> {
    root: PathBuf,
    filter: PathFilter,
    tree: SelectionTree,
    tree_state: FileTreeState,
    file_tree: FileTree,
    summary: Summary,
    exporter: Exporter<C>,
    export_options: ExportOptions,
    job: Option<ExtractionHandle>,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl<C: ClipboardSink> UiApp<C> {
    /// Open `root` with `filter` frozen for the lifetime of the app.
    pub fn new(
        root: PathBuf,
        filter: PathFilter,
        export_options: ExportOptions,
        clipboard: C,
    ) -> Result<Self> {
        let tree = SelectionTree::open(&root, filter.clone())
            .with_context(|| format!("failed to open {}", root.display()))?;
        let tree_state = FileTreeState::new(&tree);
        let summary = Summary::new(root.display().to_string());

        Ok(Self {
            root,
            filter,
            tree,
            tree_state,
            file_tree: FileTree,
            summary,
            exporter: Exporter::new(clipboard),
            export_options,
            job: None,
            status: None,
            should_quit: false,
        })
    }

    /// Launch the terminal UI and enter the event loop.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to initialize terminal")?;
        terminal.hide_cursor().ok();

        let event_loop_result = self.event_loop(&mut terminal);

        if let Some(job) = self.job.take() {
            job.cancel();
        }
        disable_raw_mode().ok();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        event_loop_result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|frame| self.render(frame))?;
            self.tick();

            if self.should_quit {
                break;
            }

            if event::poll(TICK_RATE)? {
                let ev = event::read()?;
                self.handle_event(ev);
            }
        }
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let size = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(2)])
            .split(size);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(40)])
            .split(layout[0]);

        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(4)])
            .split(main_chunks[1]);

        self.file_tree.render(frame, main_chunks[0], &self.tree, &self.tree_state);
        self.summary.render(frame, right_chunks[0]);
        frame.render_widget(key_hints(), right_chunks[1]);
        self.render_status(frame, layout[1]);
    }

    fn render_status(&self, frame: &mut Frame<'_>, area: Rect) {
        let line = match &self.status {
            Some(status) => {
                let style = match status.level {
                    StatusLevel::Info => Style::default().fg(Color::Gray),
                    StatusLevel::Success => Style::default().fg(Color::Green),
                    StatusLevel::Error => Style::default().fg(Color::Red),
                };
                Line::styled(status.text.clone(), style)
            }
            None => Line::styled(
                "Ready · space to check, c to copy",
                Style::default().fg(Color::DarkGray),
            ),
        };

        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    /// Expire old status messages and drain worker events.
    fn tick(&mut self) {
        if let Some(status) = &self.status
            && status.is_expired()
        {
            self.status = None;
        }
        self.poll_job();
    }

    fn poll_job(&mut self) {
        let Some(job) = self.job.as_mut() else {
            return;
        };

        while let Some(event) = job.try_next() {
            match event {
                WorkerEvent::Progress(processed) => {
                    let cancelling = job.is_cancelled();
                    self.summary.set_extraction(ExtractionStatus::Running {
                        processed,
                        cancelling,
                    });
                    self.status = Some(StatusMessage::new(
                        StatusLevel::Info,
                        format!("Processed {processed} files…"),
                    ));
                }
                WorkerEvent::Finished(Ok(result)) => {
                    self.job = None;
                    self.deliver(result);
                    return;
                }
                WorkerEvent::Finished(Err(err)) => {
                    self.job = None;
                    let message = format!("Extraction failed: {err}");
                    self.summary
                        .set_extraction(ExtractionStatus::Failed(message.clone()));
                    self.set_status(StatusLevel::Error, message);
                    return;
                }
            }
        }
    }

    fn deliver(&mut self, result: ExtractionResult) {
        match self.exporter.export(&result, &self.export_options) {
            Ok(report) => {
                let message = report.describe();
                self.summary
                    .set_extraction(ExtractionStatus::Finished(message.clone()));
                self.set_status(StatusLevel::Success, message);
            }
            Err(err) => {
                let message = format!("{err:#}");
                self.summary
                    .set_extraction(ExtractionStatus::Failed(message.clone()));
                self.set_status(StatusLevel::Error, message);
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event
            && key.kind != KeyEventKind::Release
        {
            self.handle_key_event(key);
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.quit(),
                KeyCode::Char('e') => self.start_extraction(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Esc => {
                if let Some(job) = &self.job {
                    job.cancel();
                    self.set_status(StatusLevel::Info, "Cancelling…");
                } else {
                    self.quit();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.tree_state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.tree_state.select_previous(),
            KeyCode::Char('l') | KeyCode::Right => self.tree_state.expand(&mut self.tree),
            KeyCode::Char('h') | KeyCode::Left => self.tree_state.collapse_or_parent(&self.tree),
            KeyCode::Enter => self.tree_state.toggle_expansion(&mut self.tree),
            KeyCode::Char(' ') => self.toggle_current(),
            KeyCode::Char('a') => self.toggle_all(),
            KeyCode::Char('c') => self.start_extraction(),
            KeyCode::Char('R') => self.rebuild(),
            _ => {}
        }
    }

    fn quit(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel();
        }
        self.should_quit = true;
    }

    fn toggle_current(&mut self) {
        let Some(id) = self.tree_state.selected_node() else {
            return;
        };
        if let Err(err) = self.tree.toggle(id) {
            self.set_status(StatusLevel::Error, err.to_string());
        }
        self.refresh_summary();
    }

    fn toggle_all(&mut self) {
        let all_checked = self
            .tree
            .top_level()
            .iter()
            .all(|&id| self.tree.node(id).state() == CheckState::Checked);
        let next = if all_checked {
            CheckState::Unchecked
        } else {
            CheckState::Checked
        };
        if let Err(err) = self.tree.set_top_level(next) {
            self.set_status(StatusLevel::Error, err.to_string());
        }
        self.refresh_summary();
    }

    fn start_extraction(&mut self) {
        if self.job.is_some() {
            self.set_status(StatusLevel::Error, "An extraction is already running");
            return;
        }

        let instructions = collect_instructions(&self.tree);
        if instructions.is_empty() {
            self.set_status(StatusLevel::Error, "Nothing selected");
            return;
        }

        tracing::debug!(instructions = instructions.len(), "starting extraction");
        match ExtractionHandle::spawn(self.root.clone(), instructions, self.filter.clone()) {
            Ok(job) => {
                self.job = Some(job);
                self.summary.set_extraction(ExtractionStatus::Running {
                    processed: 0,
                    cancelling: false,
                });
                self.set_status(StatusLevel::Info, "Extracting…");
            }
            Err(err) => self.set_status(StatusLevel::Error, err.to_string()),
        }
    }

    fn rebuild(&mut self) {
        if self.job.is_some() {
            self.set_status(StatusLevel::Error, "Wait for the extraction to finish");
            return;
        }
        match SelectionTree::open(&self.root, self.filter.clone()) {
            Ok(tree) => {
                self.tree = tree;
                self.tree_state = FileTreeState::new(&self.tree);
                self.refresh_summary();
                self.set_status(StatusLevel::Info, "Tree reloaded");
            }
            Err(err) => self.set_status(StatusLevel::Error, err.to_string()),
        }
    }

    fn refresh_summary(&mut self) {
        let (directories, files) = checked_counts(&self.tree);
        self.summary.update_selection(directories, files);
    }

    fn set_status<S: Into<String>>(&mut self, level: StatusLevel, message: S) {
        self.status = Some(StatusMessage::new(level, message.into()));
    }
}

fn key_hints() -> Paragraph<'static> {
    let key = Style::default().fg(Color::Cyan);
    Paragraph::new(vec![
        Line::from(vec![
            Span::styled("j/k", key),
            Span::raw(" move · "),
            Span::styled("h/l", key),
            Span::raw(" fold"),
        ]),
        Line::from(vec![
            Span::styled("space", key),
            Span::raw(" check · "),
            Span::styled("a", key),
            Span::raw(" all · "),
            Span::styled("R", key),
            Span::raw(" reload"),
        ]),
        Line::from(vec![
            Span::styled("c", key),
            Span::raw(" copy · "),
            Span::styled("esc", key),
            Span::raw(" cancel · "),
            Span::styled("q", key),
            Span::raw(" quit"),
        ]),
    ])
    .block(Block::default().title("Keys").borders(Borders::ALL))
    .wrap(Wrap { trim: true })
    .style(Style::default().fg(Color::Gray))
}

#[derive(Debug)]
struct StatusMessage {
    level: StatusLevel,
    text: String,
    expires_at: Instant,
}

impl StatusMessage {
    fn new(level: StatusLevel, text: String) -> Self {
        Self {
            level,
            text,
            expires_at: Instant::now() + Duration::from_secs(4),
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusLevel {
    Info,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use ratatui::backend::TestBackend;

    use crate::infra::clipboard::MemoryClipboard;

    fn app() -> (tempfile::TempDir, UiApp<MemoryClipboard>) {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(root.join("notes.txt"), "remember").unwrap();
        let app = UiApp::new(
            root.to_path_buf(),
            PathFilter::default(),
            ExportOptions::default(),
            MemoryClipboard::default(),
        )
        .unwrap();
        (temp, app)
    }

    fn press(app: &mut UiApp<MemoryClipboard>, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn status(app: &UiApp<MemoryClipboard>) -> Option<(StatusLevel, &str)> {
        app.status
            .as_ref()
            .map(|status| (status.level, status.text.as_str()))
    }

    fn wait_for_job(app: &mut UiApp<MemoryClipboard>) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while app.job.is_some() && Instant::now() < deadline {
            app.poll_job();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(app.job.is_none(), "extraction did not finish");
    }

    #[test]
    fn extracting_nothing_is_refused() {
        let (_temp, mut app) = app();
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(status(&app), Some((StatusLevel::Error, "Nothing selected")));
        assert!(app.job.is_none());
    }

    #[test]
    fn space_checks_the_highlighted_node() {
        let (_temp, mut app) = app();
        press(&mut app, KeyCode::Char(' '));
        let src = app.tree.top_level()[0];
        assert_eq!(app.tree.node(src).state(), CheckState::Checked);

        press(&mut app, KeyCode::Char('l'));
        let main_rs = app.tree.children(src)[0];
        assert_eq!(app.tree.node(main_rs).state(), CheckState::Checked);
    }

    #[test]
    fn copy_runs_in_background_and_fills_clipboard() {
        let (_temp, mut app) = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('c'));
        assert!(app.job.is_some());

        press(&mut app, KeyCode::Char('c'));
        if app.job.is_some() {
            assert_eq!(
                status(&app),
                Some((StatusLevel::Error, "An extraction is already running"))
            );
        }

        wait_for_job(&mut app);
        assert_eq!(status(&app), Some((StatusLevel::Success, "Copied 2 files")));
        let copied = app.exporter.clipboard().contents().unwrap();
        assert!(copied.starts_with("## File: "));
        assert!(copied.contains("fn main() {}"));
        assert!(copied.contains("remember"));
    }

    #[test]
    fn select_all_toggles_back_off() {
        let (_temp, mut app) = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('a'));
        assert!(collect_instructions(&app.tree).is_empty());
    }

    #[test]
    fn escape_quits_when_idle() {
        let (_temp, mut app) = app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn rebuild_discards_the_selection() {
        let (temp, mut app) = app();
        press(&mut app, KeyCode::Char('a'));
        fs::write(temp.path().join("added.txt"), "new").unwrap();
        press(&mut app, KeyCode::Char('R'));
        assert!(collect_instructions(&app.tree).is_empty());
        assert_eq!(app.tree.top_level().len(), 3);
    }

    #[test]
    fn renders_tree_summary_and_status() {
        let (_temp, mut app) = app();
        press(&mut app, KeyCode::Char(' '));

        let mut terminal = Terminal::new(TestBackend::new(90, 16)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("[x] src/"));
        assert!(text.contains("[ ] notes.txt"));
        assert!(text.contains("1 directories, 0 files"));
    }
}
