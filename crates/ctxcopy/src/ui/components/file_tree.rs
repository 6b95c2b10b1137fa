//! Checkbox tree component and its navigation state.

use std::collections::HashSet;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::app::tree::SelectionTree;
use crate::domain::model::{CheckState, NodeId};

/// Which directories are expanded and which row is highlighted.
///
/// Check states live in the [`SelectionTree`]; this only tracks presentation.
#[derive(Debug, Default, Clone)]
pub struct FileTreeState {
    expanded: HashSet<NodeId>,
    visible: Vec<VisibleRow>,
    selected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VisibleRow {
    id: NodeId,
    depth: usize,
}

impl FileTreeState {
    pub fn new(tree: &SelectionTree) -> Self {
        let mut state = Self::default();
        state.refresh(tree);
        state
    }

    /// Recompute the visible rows after the tree or the expansion set changed.
    pub fn refresh(&mut self, tree: &SelectionTree) {
        self.visible.clear();
        let mut stack: Vec<VisibleRow> = tree
            .top_level()
            .iter()
            .rev()
            .map(|&id| VisibleRow { id, depth: 0 })
            .collect();

        while let Some(row) = stack.pop() {
            self.visible.push(row);
            if self.expanded.contains(&row.id) {
                stack.extend(tree.children(row.id).iter().rev().map(|&id| VisibleRow {
                    id,
                    depth: row.depth + 1,
                }));
            }
        }

        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.visible.get(self.selected).map(|row| row.id)
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.visible.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    /// Expand the highlighted directory, loading its children on first use.
    ///
    /// An already expanded directory moves the highlight to its first child instead.
    pub fn expand(&mut self, tree: &mut SelectionTree) {
        let Some(id) = self.selected_node() else {
            return;
        };
        if !tree.node(id).is_dir() {
            return;
        }

        if self.expanded.contains(&id) {
            if let Some(&first) = tree.children(id).first()
                && let Some(pos) = self.position_of(first)
            {
                self.selected = pos;
            }
            return;
        }

        tree.populate_children(id);
        self.expanded.insert(id);
        self.refresh(tree);
    }

    /// Collapse the highlighted directory or move the highlight to its parent.
    pub fn collapse_or_parent(&mut self, tree: &SelectionTree) {
        let Some(id) = self.selected_node() else {
            return;
        };
        if self.expanded.remove(&id) {
            self.refresh(tree);
        } else if let Some(parent) = tree.node(id).parent()
            && let Some(pos) = self.position_of(parent)
        {
            self.selected = pos;
        }
    }

    pub fn toggle_expansion(&mut self, tree: &mut SelectionTree) {
        let Some(id) = self.selected_node() else {
            return;
        };
        if self.expanded.remove(&id) {
            self.refresh(tree);
        } else {
            self.expand(tree);
        }
    }

    fn position_of(&self, id: NodeId) -> Option<usize> {
        self.visible.iter().position(|row| row.id == id)
    }
}

/// Ratatui component rendering the checkbox tree.
#[derive(Debug, Default)]
pub struct FileTree;

impl FileTree {
    pub fn render(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        tree: &SelectionTree,
        state: &FileTreeState,
    ) {
        let root_label = tree
            .root_path()
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| tree.root_path().display().to_string());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Files · {root_label}"));

        if state.visible_len() == 0 {
            let placeholder = Paragraph::new("Nothing to show").block(block).style(
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            );
            frame.render_widget(placeholder, area);
            return;
        }

        let items: Vec<ListItem> = state
            .visible
            .iter()
            .map(|row| ListItem::new(row_line(tree, state, *row)))
            .collect();

        let mut list_state = ListState::default();
        list_state.select(state.selected_index());

        let highlight_style = Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD);

        let list = List::new(items)
            .block(block)
            .highlight_style(highlight_style);
        frame.render_stateful_widget(list, area, &mut list_state);
    }
}

fn row_line(tree: &SelectionTree, state: &FileTreeState, row: VisibleRow) -> Line<'static> {
    let node = tree.node(row.id);
    let mut spans = vec![Span::raw("  ".repeat(row.depth))];

    if node.is_dir() {
        let symbol = if state.is_expanded(row.id) {
            "▾ "
        } else if node.is_loaded() && node.children().is_empty() {
            "· "
        } else {
            "▸ "
        };
        spans.push(Span::styled(symbol, Style::default().fg(Color::Yellow)));
    } else {
        spans.push(Span::raw("  "));
    }

    let check_style = match node.state() {
        CheckState::Checked => Style::default().fg(Color::Green),
        CheckState::PartiallyChecked => Style::default().fg(Color::Yellow),
        CheckState::Unchecked => Style::default().fg(Color::DarkGray),
    };
    spans.push(Span::styled(node.state().glyph(), check_style));
    spans.push(Span::raw(" "));

    let mut name = node.name();
    if node.is_dir() {
        name.push('/');
    }
    spans.push(Span::raw(name));
    Line::from(spans)
}
