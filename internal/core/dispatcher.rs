// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*!
    Running code on the main thread.

    A [`MainThreadDispatcher`] accepts tasks from any thread and runs them, in submission
    order, on the thread that created it. Backends differ only in how the main thread is woken
    up: the Windows backend posts a message to a hidden window, while the portable
    [`QueueDispatcher`] relies on the host to call [`QueueDispatcher::pump`] from its own loop.

    Tasks only run if the main thread keeps iterating its loop. There is no timeout and no
    cancellation: a task scheduled on a loop that never runs again is silently dropped with
    the dispatcher.
*/

#![warn(missing_docs)]

use std::panic::AssertUnwindSafe;
use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::thread_id::SystemThreadId;
use crate::unpoison;

/// A unit of work scheduled on the main thread.
pub type Task = Box<dyn FnOnce() + Send>;

/// Error returned when a task cannot be dispatched.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[non_exhaustive]
pub enum DispatchError {
    /// The dispatcher was shut down and does not accept tasks anymore.
    Terminated,
    /// The operation may only be called on the main thread of the dispatcher.
    InvalidThread,
}

impl core::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Terminated => f.write_str("the main thread dispatcher was terminated"),
            Self::InvalidThread => {
                f.write_str("the operation must be performed on the dispatcher's main thread")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// Interface of the backends that can run tasks on the main thread.
pub trait MainThreadDispatcher: Send + Sync {
    /// The thread that was designated as main thread when the dispatcher was created.
    fn main_thread_id(&self) -> SystemThreadId;

    /// Returns true if called on the main thread.
    fn is_main_thread(&self) -> bool {
        self.main_thread_id().is_current()
    }

    /// Enqueues `task` to run on the main thread and returns immediately.
    ///
    /// This may be called from any thread, including the main thread itself. The task is
    /// never run inline, even when called on the main thread.
    fn schedule(&self, task: Task) -> Result<(), DispatchError>;
}

struct QueueState {
    tasks: Vec<Task>,
    closed: bool,
}

/// Mutex protected queue of pending tasks, shared by the dispatcher backends.
///
/// The mutex only guards pushing and swapping; tasks always run outside of it.
pub struct TaskQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskQueue {
    /// Creates an empty, open queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState { tasks: Vec::new(), closed: false }),
            available: Condvar::new(),
        }
    }

    /// Appends a task. Fails once the queue is [closed](Self::close).
    pub fn push(&self, task: Task) -> Result<(), DispatchError> {
        let mut state = unpoison(self.state.lock());
        if state.closed {
            return Err(DispatchError::Terminated);
        }
        state.tasks.push(task);
        drop(state);
        self.available.notify_all();
        Ok(())
    }

    /// Swaps the pending tasks with an empty queue and runs them in enqueue order.
    ///
    /// Tasks pushed while draining are left for the next call. A panicking task is logged
    /// and the remaining tasks still run. Returns the number of tasks that were run.
    pub fn drain(&self) -> usize {
        let tasks = std::mem::take(&mut unpoison(self.state.lock()).tasks);
        let count = tasks.len();
        for task in tasks {
            if std::panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                log::error!("A task scheduled on the main thread panicked");
            }
        }
        count
    }

    /// Blocks until a task is pending, the queue is closed, or `timeout` elapsed.
    ///
    /// Returns true if tasks are pending.
    pub fn wait(&self, timeout: Duration) -> bool {
        let state = unpoison(self.state.lock());
        let (state, _) = unpoison(
            self.available
                .wait_timeout_while(state, timeout, |s| s.tasks.is_empty() && !s.closed),
        );
        !state.tasks.is_empty()
    }

    /// Rejects further tasks and drops the pending ones without running them.
    pub fn close(&self) {
        let pending = {
            let mut state = unpoison(self.state.lock());
            state.closed = true;
            std::mem::take(&mut state.tasks)
        };
        if !pending.is_empty() {
            log::debug!("Dropping {} unrun main thread tasks", pending.len());
        }
        self.available.notify_all();
    }

    /// Returns true once [`close`](Self::close) was called.
    pub fn is_closed(&self) -> bool {
        unpoison(self.state.lock()).closed
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        unpoison(self.state.lock()).tasks.len()
    }

    /// Returns true if no task is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type WakeupHook = Box<dyn Fn() + Send + Sync>;

/// A dispatcher for platforms without a native message pump.
///
/// Tasks are queued behind a condition variable and run when the host calls
/// [`pump`](Self::pump) or [`pump_timeout`](Self::pump_timeout) on the main thread, typically
/// from a hook in its own event loop. An optional [wakeup hook](Self::with_wakeup) lets the host
/// wake that loop whenever a task is queued.
pub struct QueueDispatcher {
    main_thread: SystemThreadId,
    queue: TaskQueue,
    wakeup: Option<WakeupHook>,
}

impl QueueDispatcher {
    /// Creates a dispatcher whose main thread is the calling thread.
    pub fn new() -> Self {
        Self { main_thread: SystemThreadId::current(), queue: TaskQueue::new(), wakeup: None }
    }

    /// Installs a callback invoked after every scheduled task, from the scheduling thread.
    #[must_use]
    pub fn with_wakeup(mut self, wakeup: impl Fn() + Send + Sync + 'static) -> Self {
        self.wakeup = Some(Box::new(wakeup));
        self
    }

    /// Runs the tasks that are pending at the time of the call.
    ///
    /// Returns the number of tasks that ran, or [`DispatchError::InvalidThread`] when not
    /// called on the main thread.
    pub fn pump(&self) -> Result<usize, DispatchError> {
        if !self.is_main_thread() {
            return Err(DispatchError::InvalidThread);
        }
        Ok(self.queue.drain())
    }

    /// Waits up to `timeout` for tasks to arrive, then runs the pending ones.
    ///
    /// Returns [`DispatchError::Terminated`] once the dispatcher was shut down, since the wait
    /// would return immediately from then on.
    pub fn pump_timeout(&self, timeout: Duration) -> Result<usize, DispatchError> {
        if !self.is_main_thread() {
            return Err(DispatchError::InvalidThread);
        }
        self.queue.wait(timeout);
        if self.queue.is_closed() {
            return Err(DispatchError::Terminated);
        }
        Ok(self.queue.drain())
    }

    /// Stops accepting tasks. Pending tasks are dropped without running.
    pub fn shutdown(&self) {
        self.queue.close();
    }

    /// Number of tasks waiting for the next pump.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for QueueDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MainThreadDispatcher for QueueDispatcher {
    fn main_thread_id(&self) -> SystemThreadId {
        self.main_thread
    }

    fn schedule(&self, task: Task) -> Result<(), DispatchError> {
        self.queue.push(task).inspect_err(|_| {
            log::warn!("Task scheduled on a terminated main thread dispatcher");
        })?;
        if let Some(wakeup) = &self.wakeup {
            wakeup();
        }
        Ok(())
    }
}
