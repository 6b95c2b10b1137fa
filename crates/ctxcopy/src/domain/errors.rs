//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::model::CheckState;

/// Misuse of the selection tree.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("the root node cannot be selected")]
    RootNotSelectable,
    #[error("a partial state can only be derived from children")]
    PartialStateNotSettable,
    #[error("{path} is {actual:?} but its loaded children imply {expected:?}")]
    Inconsistent {
        path: PathBuf,
        expected: CheckState,
        actual: CheckState,
    },
    #[error("{0} is partially checked but was never loaded")]
    PartialWithoutChildren(PathBuf),
}

/// Pipeline-level extraction failures. Per-file problems never show up here.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("root directory {0} is no longer available")]
    RootMissing(PathBuf),
    #[error("extraction worker stopped without reporting a result")]
    WorkerLost,
    #[error("failed to start extraction worker")]
    Spawn(#[source] std::io::Error),
}
