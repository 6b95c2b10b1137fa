//! Lazily populated tri-state selection tree.
//!
//! Nodes live in an arena owned by [`SelectionTree`] and refer to each other by [`NodeId`].
//! Index 0 is a virtual root standing for the opened directory; it is never selectable and
//! its own state is never derived.
//!
//! A directory's state is kept consistent with its *loaded* children only. The state of a
//! directory that has not been expanded yet is taken as given: when it is finally populated,
//! a `Checked` directory hands that state to every newly discovered child, so files created
//! on disk after the directory was checked are picked up as checked too.

use std::fs;
use std::path::{Path, PathBuf};

use crate::app::filter::PathFilter;
use crate::domain::errors::DomainError;
use crate::domain::model::{CheckState, NodeId};

/// One filesystem entry in the tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    path: PathBuf,
    is_dir: bool,
    state: CheckState,
    loaded: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    fn new(path: PathBuf, is_dir: bool, parent: Option<NodeId>) -> Self {
        Self {
            path,
            is_dir,
            state: CheckState::Unchecked,
            // Files have nothing to load.
            loaded: !is_dir,
            parent,
            children: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dir(&self) -> bool {
        self.is_dir
    }

    pub fn state(&self) -> CheckState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Final path component, or the full path for the root.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Arena of [`TreeNode`]s rooted at an opened directory.
#[derive(Debug, Clone)]
pub struct SelectionTree {
    nodes: Vec<TreeNode>,
    filter: PathFilter,
}

impl SelectionTree {
    const ROOT: NodeId = NodeId(0);

    /// Open `root` and materialise its top level.
    pub fn open(root: impl Into<PathBuf>, filter: PathFilter) -> Result<Self, DomainError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DomainError::NotADirectory(root));
        }

        let mut tree = Self {
            nodes: vec![TreeNode::new(root, true, None)],
            filter,
        };
        tree.populate_children(Self::ROOT);
        Ok(tree)
    }

    pub fn root_id(&self) -> NodeId {
        Self::ROOT
    }

    pub fn root_path(&self) -> &Path {
        &self.nodes[Self::ROOT.0].path
    }

    /// Access a node. Panics when `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn top_level(&self) -> &[NodeId] {
        self.children(Self::ROOT)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.nodes.len()
    }

    /// List the immediate entries of a directory node and attach them as children.
    ///
    /// Directories come first, then files, each group sorted by name. Ignored directory names
    /// and ignored file extensions are skipped. Children of a `Checked` directory start out
    /// `Checked`. A directory that cannot be listed ends up loaded with no children.
    ///
    /// Returns the number of children added; calling it on a loaded node is a no-op.
    pub fn populate_children(&mut self, id: NodeId) -> usize {
        let node = &self.nodes[id.0];
        if !node.is_dir || node.loaded {
            return 0;
        }
        let dir_path = node.path.clone();
        let inherited = if id != Self::ROOT && node.state == CheckState::Checked {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        };

        let (dirs, files) = self.list_entries(&dir_path);
        let added = dirs.len() + files.len();

        let mut children = Vec::with_capacity(added);
        for (path, is_dir) in dirs
            .into_iter()
            .map(|path| (path, true))
            .chain(files.into_iter().map(|path| (path, false)))
        {
            let child_id = NodeId(self.nodes.len());
            let mut child = TreeNode::new(path, is_dir, Some(id));
            child.state = inherited;
            self.nodes.push(child);
            children.push(child_id);
        }

        let node = &mut self.nodes[id.0];
        node.children = children;
        node.loaded = true;

        tracing::debug!(path = %dir_path.display(), children = added, "populated directory");
        added
    }

    fn list_entries(&self, dir: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(path = %dir.display(), error = %err, "skipping unreadable directory");
                return (Vec::new(), Vec::new());
            }
        };

        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                let name = entry.file_name();
                if !self.filter.is_ignored_directory_name(&name.to_string_lossy()) {
                    dirs.push(path);
                }
            } else if !self.filter.is_ignored_extension(&path) {
                files.push(path);
            }
        }

        dirs.sort();
        files.sort();
        (dirs, files)
    }

    /// Set a node's state, force it onto every loaded descendant, then re-derive ancestors.
    pub fn set_check_state(&mut self, id: NodeId, state: CheckState) -> Result<(), DomainError> {
        if id == Self::ROOT {
            return Err(DomainError::RootNotSelectable);
        }
        if state == CheckState::PartiallyChecked {
            return Err(DomainError::PartialStateNotSettable);
        }

        self.nodes[id.0].state = state;
        self.push_down(id, state);
        self.pull_up(id);
        Ok(())
    }

    /// Checked becomes Unchecked; anything else becomes Checked.
    pub fn toggle(&mut self, id: NodeId) -> Result<CheckState, DomainError> {
        let next = match self.node(id).state {
            CheckState::Checked => CheckState::Unchecked,
            CheckState::Unchecked | CheckState::PartiallyChecked => CheckState::Checked,
        };
        self.set_check_state(id, next)?;
        Ok(next)
    }

    /// Apply `state` to every top-level node.
    pub fn set_top_level(&mut self, state: CheckState) -> Result<(), DomainError> {
        for id in self.top_level().to_vec() {
            self.set_check_state(id, state)?;
        }
        Ok(())
    }

    fn push_down(&mut self, id: NodeId, state: CheckState) {
        let mut stack = self.nodes[id.0].children.clone();
        while let Some(child) = stack.pop() {
            let node = &mut self.nodes[child.0];
            node.state = state;
            stack.extend_from_slice(&node.children);
        }
    }

    fn pull_up(&mut self, id: NodeId) {
        let mut cursor = self.nodes[id.0].parent;
        while let Some(parent) = cursor {
            if parent == Self::ROOT {
                break;
            }
            let derived = CheckState::derive(
                self.nodes[parent.0]
                    .children
                    .iter()
                    .map(|child| self.nodes[child.0].state),
            );
            let Some(derived) = derived else { break };
            let node = &mut self.nodes[parent.0];
            if node.state == derived {
                break;
            }
            node.state = derived;
            cursor = node.parent;
        }
    }

    /// Populate every ancestor of `path` and return its node.
    ///
    /// `None` when the path lies outside the root, is filtered out, or does not exist.
    pub fn reveal(&mut self, path: &Path) -> Option<NodeId> {
        let relative = path.strip_prefix(self.root_path()).ok()?.to_path_buf();
        let mut cursor = Self::ROOT;
        for component in relative.components() {
            self.populate_children(cursor);
            let target = self.nodes[cursor.0].path.join(component);
            cursor = *self.nodes[cursor.0]
                .children
                .iter()
                .find(|child| self.nodes[child.0].path == target)?;
        }
        Some(cursor)
    }

    /// Check the state invariants over every loaded directory below the root.
    pub fn verify_consistency(&self) -> Result<(), DomainError> {
        for (index, node) in self.nodes.iter().enumerate().skip(1) {
            if !node.is_dir {
                if node.state == CheckState::PartiallyChecked {
                    return Err(DomainError::Inconsistent {
                        path: node.path.clone(),
                        expected: CheckState::Unchecked,
                        actual: node.state,
                    });
                }
                continue;
            }
            if !node.loaded {
                if node.state == CheckState::PartiallyChecked {
                    return Err(DomainError::PartialWithoutChildren(node.path.clone()));
                }
                continue;
            }
            let derived = CheckState::derive(
                self.nodes[index]
                    .children
                    .iter()
                    .map(|child| self.nodes[child.0].state),
            );
            match derived {
                Some(expected) if expected != node.state => {
                    return Err(DomainError::Inconsistent {
                        path: node.path.clone(),
                        expected,
                        actual: node.state,
                    });
                }
                None if node.state == CheckState::PartiallyChecked => {
                    return Err(DomainError::PartialWithoutChildren(node.path.clone()));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Every loaded descendant of `id`, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }
}
