// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![warn(missing_docs)]

use std::sync::{Arc, Condvar, Mutex};

use crate::dispatcher::{DispatchError, MainThreadDispatcher};
use crate::thread_id::SystemThreadId;
use crate::unpoison;

/// Cloneable handle used to send closures to the main thread from anywhere.
///
/// ```
/// # use i_engine_context_core::{MainThreadSender, QueueDispatcher};
/// # use std::sync::Arc;
/// let dispatcher = Arc::new(QueueDispatcher::new());
/// let sender = MainThreadSender::new(dispatcher.clone());
/// let worker = std::thread::spawn(move || sender.send_and_wait(|| 6 * 7));
/// while !worker.is_finished() {
///     dispatcher.pump_timeout(std::time::Duration::from_millis(10)).unwrap();
/// }
/// assert_eq!(worker.join().unwrap(), Ok(42));
/// ```
#[derive(Clone)]
pub struct MainThreadSender {
    dispatcher: Arc<dyn MainThreadDispatcher>,
}

impl core::fmt::Debug for MainThreadSender {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MainThreadSender")
            .field("main_thread", &self.dispatcher.main_thread_id())
            .finish()
    }
}

impl MainThreadSender {
    /// Creates a sender that schedules through `dispatcher`.
    pub fn new(dispatcher: Arc<dyn MainThreadDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// The thread the closures are sent to.
    pub fn main_thread_id(&self) -> SystemThreadId {
        self.dispatcher.main_thread_id()
    }

    /// Returns true if the calling thread is the main thread.
    pub fn is_main_thread(&self) -> bool {
        self.dispatcher.is_main_thread()
    }

    /// Schedules `callback` on the main thread and returns immediately.
    pub fn send(&self, callback: impl FnOnce() + Send + 'static) -> Result<(), DispatchError> {
        self.dispatcher.schedule(Box::new(callback))
    }

    /// Schedules `callback` on the main thread and blocks until it returned.
    ///
    /// When called on the main thread the callback runs immediately, since waiting for the
    /// loop would deadlock.
    pub fn send_and_wait<R: Send + 'static>(
        &self,
        callback: impl FnOnce() -> R + Send + 'static,
    ) -> Result<R, DispatchError> {
        if self.is_main_thread() {
            return Ok(callback());
        }
        let var = BlockingVariable::new();
        let setter = var.clone();
        self.send(move || setter.set(callback()))?;
        var.get_blocking()
    }
}

/// A value set once by one thread and waited for by another.
///
/// If the setter is dropped without a value (the task was discarded because the dispatcher
/// shut down), the waiting side wakes up with [`DispatchError::Terminated`].
struct BlockingVariable<T> {
    state: Arc<(Mutex<Slot<T>>, Condvar)>,
}

enum Slot<T> {
    Empty { setters: usize },
    Ready(T),
    Abandoned,
}

impl<T> BlockingVariable<T> {
    fn new() -> Self {
        Self { state: Arc::new((Mutex::new(Slot::Empty { setters: 0 }), Condvar::new())) }
    }

    fn set(&self, value: T) {
        let (lock, cond) = &*self.state;
        *unpoison(lock.lock()) = Slot::Ready(value);
        cond.notify_all();
    }

    fn get_blocking(self) -> Result<T, DispatchError> {
        let (lock, cond) = &*self.state;
        let mut slot = unpoison(lock.lock());
        loop {
            match std::mem::replace(&mut *slot, Slot::Abandoned) {
                Slot::Ready(value) => return Ok(value),
                Slot::Abandoned => return Err(DispatchError::Terminated),
                empty @ Slot::Empty { .. } => {
                    *slot = empty;
                    slot = unpoison(cond.wait(slot));
                }
            }
        }
    }
}

impl<T> Clone for BlockingVariable<T> {
    fn clone(&self) -> Self {
        if let Slot::Empty { setters } = &mut *unpoison(self.state.0.lock()) {
            *setters += 1;
        }
        Self { state: self.state.clone() }
    }
}

impl<T> Drop for BlockingVariable<T> {
    fn drop(&mut self) {
        let (lock, cond) = &*self.state;
        let mut slot = unpoison(lock.lock());
        if let Slot::Empty { setters } = &mut *slot {
            if *setters == 0 {
                return;
            }
            *setters -= 1;
            if *setters == 0 {
                *slot = Slot::Abandoned;
                cond.notify_all();
            }
        }
    }
}
