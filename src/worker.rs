//! Background worker - runs engine jobs off the caller's thread
//!
//! One thread, one queue. Jobs run strictly in submission order so a refresh
//! submitted after a transfer always sees the transfer's result.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

use tracing::{debug, warn};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pending result of a submitted job
pub struct TaskHandle<T> {
    rx: Receiver<T>,
    done: Option<T>,
}

impl<T> TaskHandle<T> {
    /// Non-blocking poll; `Some` once the job has finished.
    ///
    /// Returns `None` forever if the worker died before running the job.
    pub fn try_result(&mut self) -> Option<&T> {
        if self.done.is_none() {
            match self.rx.try_recv() {
                Ok(value) => self.done = Some(value),
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    debug!("Worker dropped a job before finishing it");
                }
            }
        }
        self.done.as_ref()
    }

    /// Block until the job finishes. `None` if the worker went away first.
    pub fn wait(mut self) -> Option<T> {
        match self.done.take() {
            Some(value) => Some(value),
            None => self.rx.recv().ok(),
        }
    }
}

pub struct EngineWorker {
    tx: Option<Sender<Job>>,
    thread: Option<JoinHandle<()>>,
}

impl EngineWorker {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let thread = std::thread::Builder::new()
            .name("svsm-worker".to_string())
            .spawn(move || {
                for job in rx {
                    job();
                }
                debug!("Worker queue closed");
            });

        let thread = match thread {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Error spawning worker thread, jobs will not run: {}", e);
                None
            }
        };

        Self {
            tx: Some(tx),
            thread,
        }
    }

    /// Queue `f`; its return value is delivered through the handle
    pub fn submit<T, F>(&self, f: F) -> TaskHandle<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (result_tx, result_rx) = mpsc::channel();
        let job: Job = Box::new(move || {
            // Receiver may already be gone; the job still ran.
            let _ = result_tx.send(f());
        });

        if let Some(tx) = &self.tx
            && tx.send(job).is_err()
        {
            warn!("Worker thread is gone, dropping job");
        }

        TaskHandle {
            rx: result_rx,
            done: None,
        }
    }
}

impl Drop for EngineWorker {
    /// Finish queued jobs, then join
    fn drop(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("Worker thread panicked");
        }
    }
}
