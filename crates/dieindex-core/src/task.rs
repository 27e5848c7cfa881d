//! # Background Tasks
//!
//! Finalizing an index is the one piece of work that runs off the caller's
//! thread. Instead of a process-wide pool, the index is handed a
//! [`Scheduler`] when it is created and submits its finalize job there.
//!
//! [`submit`] wraps a closure so that its result (or its panic) is published
//! into a [`TaskHandle`]; consumers call [`TaskHandle::wait`] before reading
//! anything the job produces.
//!
//! ## Schedulers
//!
//! - [`InlineScheduler`]: runs the job immediately on the submitting thread.
//! - [`ThreadScheduler`]: one named OS thread per job.
//! - [`TokioScheduler`]: tokio's blocking pool.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{trace, warn};

/// A unit of work handed to a scheduler.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run a job, eventually, somewhere.
///
/// Implementations must run every job they accept or drop it; a dropped job
/// makes the corresponding [`TaskHandle::wait`] panic instead of hanging.
pub trait Scheduler: Send + Sync + fmt::Debug
{
    fn execute(&self, job: Job);
}

type Outcome<T> = Result<T, String>;

/// Completion handle of a submitted job.
pub struct TaskHandle<T>
{
    slot: Arc<OnceCell<Outcome<T>>>,
}

impl<T> TaskHandle<T>
{
    /// Block until the job has finished and return its result.
    ///
    /// Calling this again after completion returns immediately.
    ///
    /// ## Panics
    ///
    /// Panics if the job panicked or was dropped by the scheduler without
    /// running.
    pub fn wait(&self) -> &T
    {
        match self.slot.wait() {
            Ok(value) => value,
            Err(message) => panic!("background task failed: {message}"),
        }
    }

    /// Whether the job has finished (successfully or not), without blocking.
    pub fn is_complete(&self) -> bool
    {
        self.slot.get().is_some()
    }
}

impl<T> fmt::Debug for TaskHandle<T>
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("TaskHandle").field("complete", &self.is_complete()).finish()
    }
}

/// Producer side of a [`TaskHandle`]; reports a failure if dropped unfinished.
struct Completion<T>
{
    slot: Arc<OnceCell<Outcome<T>>>,
}

impl<T> Completion<T>
{
    fn finish(&self, outcome: Outcome<T>)
    {
        let _ = self.slot.set(outcome);
    }
}

impl<T> Drop for Completion<T>
{
    fn drop(&mut self)
    {
        let _ = self.slot.set(Err("task was dropped before it ran".to_string()));
    }
}

/// Submit `work` to `scheduler` and get a handle to its result.
pub fn submit<T, F>(scheduler: &dyn Scheduler, work: F) -> TaskHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + Sync + 'static,
{
    let slot = Arc::new(OnceCell::new());
    let completion = Completion { slot: Arc::clone(&slot) };

    scheduler.execute(Box::new(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(work)).map_err(|payload| panic_message(payload.as_ref()));
        completion.finish(outcome);
    }));

    TaskHandle { slot }
}

fn panic_message(payload: &(dyn Any + Send)) -> String
{
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Runs every job synchronously inside `execute`.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineScheduler;

impl Scheduler for InlineScheduler
{
    fn execute(&self, job: Job)
    {
        job();
    }
}

/// Spawns a dedicated, named OS thread per job.
#[derive(Debug, Clone)]
pub struct ThreadScheduler
{
    name: String,
}

impl ThreadScheduler
{
    pub fn new(name: impl Into<String>) -> Self
    {
        Self { name: name.into() }
    }
}

impl Default for ThreadScheduler
{
    fn default() -> Self
    {
        Self::new("dieindex-finalize")
    }
}

impl Scheduler for ThreadScheduler
{
    fn execute(&self, job: Job)
    {
        trace!(thread = %self.name, "scheduler.spawn_thread");
        if let Err(err) = std::thread::Builder::new().name(self.name.clone()).spawn(job) {
            warn!(error = %err, "failed to spawn finalize thread");
        }
    }
}

/// Runs jobs on a tokio runtime's blocking pool.
#[derive(Debug, Clone)]
pub struct TokioScheduler
{
    handle: tokio::runtime::Handle,
}

impl TokioScheduler
{
    pub fn new(handle: tokio::runtime::Handle) -> Self
    {
        Self { handle }
    }

    /// Scheduler for the runtime entered on this thread, if any.
    pub fn current() -> Option<Self>
    {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

impl Scheduler for TokioScheduler
{
    fn execute(&self, job: Job)
    {
        trace!("scheduler.spawn_blocking");
        drop(self.handle.spawn_blocking(job));
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::mpsc;

    use super::*;

    /// Holds jobs until told to run them.
    #[derive(Default)]
    struct DeferredScheduler
    {
        jobs: std::sync::Mutex<Vec<Job>>,
    }

    impl fmt::Debug for DeferredScheduler
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
        {
            f.debug_struct("DeferredScheduler").finish_non_exhaustive()
        }
    }

    impl DeferredScheduler
    {
        fn run_all(&self)
        {
            let jobs: Vec<Job> = std::mem::take(&mut *self.jobs.lock().unwrap());
            for job in jobs {
                job();
            }
        }
    }

    impl Scheduler for DeferredScheduler
    {
        fn execute(&self, job: Job)
        {
            self.jobs.lock().unwrap().push(job);
        }
    }

    #[derive(Debug)]
    struct DroppingScheduler;

    impl Scheduler for DroppingScheduler
    {
        fn execute(&self, job: Job)
        {
            drop(job);
        }
    }

    #[test]
    fn test_inline_completes_before_returning()
    {
        let handle = submit(&InlineScheduler, || 21 * 2);
        assert!(handle.is_complete());
        assert_eq!(*handle.wait(), 42);
        assert_eq!(*handle.wait(), 42);
    }

    #[test]
    fn test_deferred_job_is_pending_until_run()
    {
        let scheduler = DeferredScheduler::default();
        let handle = submit(&scheduler, || "done");
        assert!(!handle.is_complete());

        scheduler.run_all();
        assert!(handle.is_complete());
        assert_eq!(*handle.wait(), "done");
    }

    #[test]
    fn test_thread_scheduler_wait_blocks_until_done()
    {
        let (release, gate) = mpsc::channel::<()>();
        let handle = submit(&ThreadScheduler::default(), move || {
            gate.recv().unwrap();
            7
        });

        release.send(()).unwrap();
        assert_eq!(*handle.wait(), 7);
        assert!(handle.is_complete());
    }

    #[test]
    fn test_tokio_scheduler_runs_on_blocking_pool()
    {
        let runtime = tokio::runtime::Builder::new_multi_thread().worker_threads(1).build().unwrap();
        let scheduler = TokioScheduler::new(runtime.handle().clone());
        let handle = submit(&scheduler, || vec![1, 2, 3]);
        assert_eq!(handle.wait(), &vec![1, 2, 3]);
    }

    #[test]
    #[should_panic(expected = "background task failed: boom")]
    fn test_panicking_job_is_reported()
    {
        let handle: TaskHandle<u32> = submit(&InlineScheduler, || panic!("boom"));
        handle.wait();
    }

    #[test]
    #[should_panic(expected = "dropped before it ran")]
    fn test_dropped_job_is_reported()
    {
        let handle: TaskHandle<u32> = submit(&DroppingScheduler, || 1);
        handle.wait();
    }
}
