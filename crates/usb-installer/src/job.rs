use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use crate::system::SevenZipUnpacker;
use crate::{install_batch_with_config_and_unpacker, BatchSummary, Config, Error, Unpacker};

/// Progress signals emitted while a batch runs.
#[derive(Debug, Clone, PartialEq)]
pub enum InstallEvent {
    /// Percentage for the job at `ordinal`, floored against the batch total.
    JobProgress { ordinal: usize, percent: u8 },
    /// Overall batch fraction in `[0.0, 1.0]`.
    BatchProgress(f32),
    /// Emitted exactly once, after every job was attempted or cancellation
    /// was observed.
    Finished,
}

/// A batch run executing on its own worker thread.
///
/// The spawner stays free while the worker copies. It observes the run
/// through [`InstallJob::events`] and may request cancellation at any time;
/// the flag is polled once per job boundary and never interrupts a job in
/// flight.
pub struct InstallJob {
    events: mpsc::Receiver<InstallEvent>,
    cancel: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<Result<BatchSummary, Error>>>,
}

impl InstallJob {
    pub fn spawn(images: Vec<PathBuf>, mount: PathBuf, config: Config) -> Self {
        Self::spawn_with_unpacker(images, mount, config, SevenZipUnpacker::default())
    }

    pub fn spawn_with_unpacker<U>(
        images: Vec<PathBuf>,
        mount: PathBuf,
        config: Config,
        unpacker: U,
    ) -> Self
    where
        U: Unpacker + Send + 'static,
    {
        let (sender, events) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let handle = thread::spawn(move || {
            install_batch_with_config_and_unpacker(
                &images, &mount, config, &unpacker, &sender, &flag,
            )
        });

        Self {
            events,
            cancel,
            handle: Some(handle),
        }
    }

    pub fn events(&self) -> &mpsc::Receiver<InstallEvent> {
        &self.events
    }

    /// Asks the worker to stop before its next job. Titles already written
    /// stay on the device; nothing is rolled back.
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map_or(true, |handle| handle.is_finished())
    }

    /// Blocks until the worker finishes and returns its outcome.
    pub fn wait(mut self) -> Result<BatchSummary, Error> {
        let handle = match self.handle.take() {
            Some(handle) => handle,
            None => return Ok(BatchSummary::default()),
        };
        handle.join().unwrap_or_else(|_| {
            Err(Error::IOError(io::Error::new(
                io::ErrorKind::Other,
                "install worker panicked",
            )))
        })
    }
}
