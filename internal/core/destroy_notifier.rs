// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*!
    Observers that are told when an embedding goes away.
*/

#![warn(missing_docs)]

use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use crate::api::EngineHandle;
use crate::unpoison;

type DestroyCallback = Arc<dyn Fn(EngineHandle) + Send + Sync>;

/// Identifies a callback registered with [`DestroyNotifier::register`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DestroyNotificationId(u64);

#[derive(Default)]
struct NotifierInner {
    callbacks: Vec<(DestroyNotificationId, DestroyCallback)>,
    next_id: u64,
}

/// An ordered list of callbacks invoked with the handle of each removed embedding.
#[derive(Default)]
pub struct DestroyNotifier {
    inner: Mutex<NotifierInner>,
}

impl DestroyNotifier {
    /// Creates a notifier without observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `callback` to the observer list.
    ///
    /// The returned id can be passed to [`unregister`](Self::unregister). Callbacks that are
    /// never unregistered stay alive for as long as the notifier.
    pub fn register(
        &self,
        callback: impl Fn(EngineHandle) + Send + Sync + 'static,
    ) -> DestroyNotificationId {
        let mut inner = unpoison(self.inner.lock());
        let id = DestroyNotificationId(inner.next_id);
        inner.next_id += 1;
        inner.callbacks.push((id, Arc::new(callback)));
        id
    }

    /// Removes a previously registered callback. Returns false if the id is unknown.
    ///
    /// A notification that is already running keeps calling the callback it snapshotted.
    pub fn unregister(&self, id: DestroyNotificationId) -> bool {
        let mut inner = unpoison(self.inner.lock());
        let len = inner.callbacks.len();
        inner.callbacks.retain(|(cb_id, _)| *cb_id != id);
        inner.callbacks.len() != len
    }

    /// Invokes every registered callback with `handle`, in registration order.
    ///
    /// The list is copied before iterating, so callbacks may register or unregister
    /// observers. A panicking callback is logged and does not prevent the others from
    /// running.
    pub fn notify(&self, handle: EngineHandle) {
        let callbacks: Vec<DestroyCallback> =
            unpoison(self.inner.lock()).callbacks.iter().map(|(_, cb)| cb.clone()).collect();
        for callback in callbacks {
            if std::panic::catch_unwind(AssertUnwindSafe(|| callback(handle))).is_err() {
                log::error!("Destroy notification for engine {handle} panicked");
            }
        }
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        unpoison(self.inner.lock()).callbacks.len()
    }

    /// Returns true if there is no registered callback.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callbacks_run_in_registration_order() {
        let notifier = DestroyNotifier::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..5 {
            let log = log.clone();
            notifier.register(move |h| log.lock().unwrap().push((i, h.as_raw())));
        }
        notifier.notify(EngineHandle::from_raw(7));
        assert_eq!(*log.lock().unwrap(), (0..5).map(|i| (i, 7)).collect::<Vec<_>>());
    }

    #[test]
    fn unregister() {
        let notifier = DestroyNotifier::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let ids: Vec<_> = (0..3)
            .map(|i| {
                let log = log.clone();
                notifier.register(move |_| log.lock().unwrap().push(i))
            })
            .collect();
        assert!(notifier.unregister(ids[1]));
        assert!(!notifier.unregister(ids[1]));
        assert_eq!(notifier.len(), 2);
        notifier.notify(EngineHandle::from_raw(1));
        assert_eq!(*log.lock().unwrap(), vec![0, 2]);
    }

    #[test]
    fn registering_during_notification_does_not_affect_current_round() {
        let notifier = Arc::new(DestroyNotifier::new());
        let count = Arc::new(Mutex::new(0));
        let weak = Arc::downgrade(&notifier);
        let c = count.clone();
        notifier.register(move |_| {
            let c = c.clone();
            if let Some(notifier) = weak.upgrade() {
                notifier.register(move |_| *c.lock().unwrap() += 1);
            }
        });
        notifier.notify(EngineHandle::from_raw(1));
        assert_eq!(*count.lock().unwrap(), 0);
        assert_eq!(notifier.len(), 2);
        notifier.notify(EngineHandle::from_raw(2));
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn panicking_callback_does_not_skip_others() {
        let _ = env_logger::builder().is_test(true).try_init();
        let notifier = DestroyNotifier::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        notifier.register(move |_| l.lock().unwrap().push("first"));
        notifier.register(|_| panic!("observer failure"));
        let l = log.clone();
        notifier.register(move |_| l.lock().unwrap().push("third"));
        notifier.notify(EngineHandle::from_raw(1));
        assert_eq!(*log.lock().unwrap(), vec!["first", "third"]);
    }
}
