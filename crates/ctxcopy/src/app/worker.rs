//! Background extraction thread with a progress channel.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::app::extract::{CancelFlag, Extractor};
use crate::app::filter::PathFilter;
use crate::domain::errors::ExtractError;
use crate::domain::model::{ExtractionResult, SelectionInstruction};

/// Messages sent from the worker thread to its owner.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Number of files processed so far.
    Progress(usize),
    /// Terminal message; nothing follows it.
    Finished(Result<ExtractionResult, ExtractError>),
}

/// Owner side of a running extraction.
#[derive(Debug)]
pub struct ExtractionHandle {
    cancel: CancelFlag,
    events: Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
    finished: bool,
}

impl ExtractionHandle {
    /// Start extracting `instructions` relative to `root` on a dedicated thread.
    pub fn spawn(
        root: PathBuf,
        instructions: Vec<SelectionInstruction>,
        filter: PathFilter,
    ) -> Result<Self, ExtractError> {
        let cancel = CancelFlag::new();
        let extractor = Extractor::new(filter).with_cancel_flag(cancel.clone());
        let (tx, rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("ctxcopy-extract".into())
            .spawn(move || {
                let progress = tx.clone();
                let outcome = extractor.extract(&root, &instructions, |count| {
                    let _ = progress.send(WorkerEvent::Progress(count));
                });
                if let Err(err) = &outcome {
                    tracing::error!(error = %err, "extraction failed");
                }
                let _ = tx.send(WorkerEvent::Finished(outcome));
            })
            .map_err(ExtractError::Spawn)?;

        Ok(Self {
            cancel,
            events: rx,
            thread: Some(thread),
            finished: false,
        })
    }

    /// Ask the worker to stop after the file it is currently processing.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Poll for the next event without blocking.
    ///
    /// A worker that disappears without reporting is surfaced as [`ExtractError::WorkerLost`].
    pub fn try_next(&mut self) -> Option<WorkerEvent> {
        if self.finished {
            return None;
        }
        match self.events.try_recv() {
            Ok(event) => {
                if matches!(event, WorkerEvent::Finished(_)) {
                    self.finish();
                }
                Some(event)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finish();
                Some(WorkerEvent::Finished(Err(ExtractError::WorkerLost)))
            }
        }
    }

    /// Block until the worker finishes, forwarding progress counts to `on_progress`.
    pub fn wait<F>(mut self, mut on_progress: F) -> Result<ExtractionResult, ExtractError>
    where
        F: FnMut(usize),
    {
        while !self.finished {
            match self.events.recv() {
                Ok(WorkerEvent::Progress(count)) => on_progress(count),
                Ok(WorkerEvent::Finished(outcome)) => {
                    self.finish();
                    return outcome;
                }
                Err(_) => break,
            }
        }
        self.finish();
        Err(ExtractError::WorkerLost)
    }

    fn finish(&mut self) {
        self.finished = true;
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("extraction thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;
    use std::time::{Duration, Instant};

    #[test]
    fn wait_returns_result_and_reports_progress() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().to_path_buf();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b.txt"), "b").unwrap();

        let handle = ExtractionHandle::spawn(
            root.clone(),
            vec![SelectionInstruction::subtree(&root)],
            PathFilter::default(),
        )
        .unwrap();

        let mut seen = Vec::new();
        let result = handle.wait(|count| seen.push(count)).unwrap();
        assert_eq!(result.file_count, 2);
        assert_eq!(seen, vec![1, 2]);
    }

    #[test]
    fn polling_ends_with_a_single_finished_event() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().to_path_buf();
        fs::write(root.join("a.txt"), "a").unwrap();

        let mut handle = ExtractionHandle::spawn(
            root.clone(),
            vec![SelectionInstruction::file(root.join("a.txt"))],
            PathFilter::default(),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        let mut finished = None;
        while finished.is_none() && Instant::now() < deadline {
            match handle.try_next() {
                Some(WorkerEvent::Finished(outcome)) => finished = Some(outcome),
                Some(WorkerEvent::Progress(_)) => {}
                None => thread::sleep(Duration::from_millis(5)),
            }
        }

        let result = finished.expect("worker finished").unwrap();
        assert_eq!(result.file_count, 1);
        assert!(handle.is_finished());
        assert!(handle.try_next().is_none());
    }

    #[test]
    fn missing_root_is_reported_through_the_channel() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("missing");
        let handle = ExtractionHandle::spawn(root, Vec::new(), PathFilter::default()).unwrap();
        assert!(matches!(handle.wait(|_| {}), Err(ExtractError::RootMissing(_))));
    }
}
