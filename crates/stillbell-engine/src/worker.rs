//! Background render thread.
//!
//! A [`RenderWorker`] owns an [`Engine`] and a shared sample source on a
//! dedicated thread. Each submitted request gets its own event channel that
//! carries progress events followed by exactly one terminal event.

use std::io;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::{Engine, SynthesisRequest};
use crate::error::SynthesisError;
use crate::progress::Progress;
use crate::sample::SampleSource;
use crate::wav::WavResult;

/// Events delivered for one request.
#[derive(Debug)]
pub enum WorkerEvent {
    /// Intermediate progress.
    Progress(Progress),
    /// The request finished. No further events follow.
    Complete(WavResult),
    /// The request failed. No further events follow.
    Failed(SynthesisError),
}

impl WorkerEvent {
    /// Returns true for `Complete` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerEvent::Progress(_))
    }
}

struct Job {
    request: SynthesisRequest,
    events: Sender<WorkerEvent>,
}

/// Runs synthesis requests one at a time on a background thread.
pub struct RenderWorker {
    jobs: Option<Sender<Job>>,
    handle: Option<JoinHandle<()>>,
}

impl RenderWorker {
    /// Starts the worker thread.
    pub fn spawn<S>(engine: Engine, sources: Arc<S>) -> io::Result<Self>
    where
        S: SampleSource + Send + Sync + 'static,
    {
        let (tx, rx) = channel::<Job>();
        let handle = thread::Builder::new()
            .name("stillbell-render".to_string())
            .spawn(move || {
                for job in rx {
                    let events = job.events;
                    let mut sink = |p: Progress| {
                        let _ = events.send(WorkerEvent::Progress(p));
                    };
                    let outcome = engine.synthesize(&job.request, sources.as_ref(), &mut sink);
                    let terminal = match outcome {
                        Ok(result) => WorkerEvent::Complete(result),
                        Err(e) => WorkerEvent::Failed(e),
                    };
                    // The requester may have dropped its receiver.
                    let _ = events.send(terminal);
                }
            })?;

        Ok(Self {
            jobs: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queues a request and returns the receiver for its events.
    ///
    /// If the worker thread is gone, the receiver yields a single `Failed` event.
    pub fn submit(&self, request: SynthesisRequest) -> Receiver<WorkerEvent> {
        let (events, rx) = channel();
        let job = Job { request, events };

        let rejected = match &self.jobs {
            Some(jobs) => jobs.send(job).err().map(|e| e.0),
            None => Some(job),
        };
        if let Some(job) = rejected {
            let _ = job.events.send(WorkerEvent::Failed(SynthesisError::render(
                "render worker has stopped",
            )));
        }

        rx
    }

    /// Finishes queued requests and joins the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        drop(self.jobs.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RenderWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
