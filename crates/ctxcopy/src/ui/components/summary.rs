//! Selection and extraction summary component.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Lifecycle of the current (or last) extraction as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExtractionStatus {
    #[default]
    Idle,
    Running {
        processed: usize,
        cancelling: bool,
    },
    Finished(String),
    Failed(String),
}

/// Displays the collapsed selection size and extraction progress.
#[derive(Debug, Default)]
pub struct Summary {
    root: String,
    directories: usize,
    files: usize,
    extraction: ExtractionStatus,
}

impl Summary {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn update_selection(&mut self, directories: usize, files: usize) {
        self.directories = directories;
        self.files = files;
    }

    pub fn set_extraction(&mut self, status: ExtractionStatus) {
        self.extraction = status;
    }

    pub fn render(&self, frame: &mut Frame<'_>, area: Rect) {
        let block = Block::default().title("Selection").borders(Borders::ALL);
        let body = Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(body, area);
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let label = Style::default().fg(Color::Gray);
        let selection = if self.directories == 0 && self.files == 0 {
            Span::styled("nothing selected", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(
                format!("{} directories, {} files", self.directories, self.files),
                Style::default().fg(Color::Cyan),
            )
        };

        let extraction = match &self.extraction {
            ExtractionStatus::Idle => Span::styled("idle", Style::default().fg(Color::DarkGray)),
            ExtractionStatus::Running {
                processed,
                cancelling: false,
            } => Span::styled(
                format!("running · {processed} files"),
                Style::default().fg(Color::Yellow),
            ),
            ExtractionStatus::Running {
                processed,
                cancelling: true,
            } => Span::styled(
                format!("cancelling · {processed} files"),
                Style::default().fg(Color::Yellow),
            ),
            ExtractionStatus::Finished(message) => {
                Span::styled(message.clone(), Style::default().fg(Color::Green))
            }
            ExtractionStatus::Failed(message) => {
                Span::styled(message.clone(), Style::default().fg(Color::Red))
            }
        };

        vec![
            Line::from(vec![
                Span::styled("Root", label),
                Span::raw(": "),
                Span::raw(self.root.clone()),
            ]),
            Line::from(vec![Span::styled("Selected", label), Span::raw(": "), selection]),
            Line::from(vec![
                Span::styled("Extraction", label),
                Span::raw(": "),
                extraction,
            ]),
        ]
    }
}
