// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use std::sync::Arc;

use i_engine_context_core::dispatcher::{DispatchError, MainThreadDispatcher, QueueDispatcher};

use crate::{BACKEND_ENV_VAR, DEFAULT_BACKEND_NAME, PlatformError};

type WakeupHook = Box<dyn Fn() + Send + Sync>;

/// Use the BackendSelector to configure the main thread dispatcher. This is a programmatic
/// substitute for the `ENGINE_CONTEXT_BACKEND` environment variable.
///
/// ```
/// # use i_engine_context_backend_selector::api::BackendSelector;
/// let backend = BackendSelector::new().backend_name("queue".into()).select().unwrap();
/// assert_eq!(backend.name(), "queue");
/// ```
#[derive(Default)]
pub struct BackendSelector {
    backend: Option<String>,
    wakeup: Option<WakeupHook>,
}

impl BackendSelector {
    /// Creates a new BackendSelector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the requirement that the selected backend must match the given name. This is
    /// equivalent to setting the `ENGINE_CONTEXT_BACKEND=name` environment variable, except
    /// that an unknown name is an error instead of falling back to the default.
    #[must_use]
    pub fn backend_name(mut self, name: String) -> Self {
        self.backend = Some(name);
        self
    }

    /// Callback invoked whenever a task is queued on the `queue` backend, so that the host
    /// can wake up its loop and call [`Backend::pump`]. Ignored by the other backends.
    #[must_use]
    pub fn with_wakeup(mut self, wakeup: impl Fn() + Send + Sync + 'static) -> Self {
        self.wakeup = Some(Box::new(wakeup));
        self
    }

    /// Creates the selected backend. The calling thread becomes the main thread.
    pub fn select(self) -> Result<Backend, PlatformError> {
        let name = match self.backend {
            Some(name) => name,
            None => backend_name_from_env(),
        };

        match name.to_ascii_lowercase().as_str() {
            #[cfg(all(feature = "backend-win32", target_family = "windows"))]
            i_engine_context_backend_win32::BACKEND_NAME => {
                let dispatcher = i_engine_context_backend_win32::Win32Dispatcher::new()
                    .map_err(|e| format!("Error creating the win32 dispatcher window: {e}"))?;
                Ok(Backend::Win32(Arc::new(dispatcher)))
            }
            "queue" => {
                let mut dispatcher = QueueDispatcher::new();
                if let Some(wakeup) = self.wakeup {
                    dispatcher = dispatcher.with_wakeup(wakeup);
                }
                Ok(Backend::Queue(Arc::new(dispatcher)))
            }
            requested_backend => Err(PlatformError::NoBackend(requested_backend.into())),
        }
    }
}

fn backend_name_from_env() -> String {
    match std::env::var(BACKEND_ENV_VAR) {
        Ok(name) if is_known_backend(&name) => name,
        Ok(name) => {
            log::warn!(
                "Could not load main thread dispatcher backend {name}, fallback to {DEFAULT_BACKEND_NAME}"
            );
            DEFAULT_BACKEND_NAME.into()
        }
        Err(_) => DEFAULT_BACKEND_NAME.into(),
    }
}

/// Returns true if a backend of that name is compiled in.
pub fn is_known_backend(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    #[cfg(all(feature = "backend-win32", target_family = "windows"))]
    if name == i_engine_context_backend_win32::BACKEND_NAME {
        return true;
    }
    name == "queue"
}

/// The dispatcher picked by a [`BackendSelector`].
#[derive(Clone)]
#[non_exhaustive]
pub enum Backend {
    /// Queue drained by explicit pump calls.
    Queue(Arc<QueueDispatcher>),
    /// Hidden message window drained by the Win32 message loop.
    #[cfg(all(feature = "backend-win32", target_family = "windows"))]
    Win32(Arc<i_engine_context_backend_win32::Win32Dispatcher>),
}

impl Backend {
    /// The name this backend is selected by.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Queue(_) => "queue",
            #[cfg(all(feature = "backend-win32", target_family = "windows"))]
            Self::Win32(_) => i_engine_context_backend_win32::BACKEND_NAME,
        }
    }

    /// The dispatcher as a trait object.
    pub fn dispatcher(&self) -> Arc<dyn MainThreadDispatcher> {
        match self {
            Self::Queue(queue) => queue.clone(),
            #[cfg(all(feature = "backend-win32", target_family = "windows"))]
            Self::Win32(win32) => win32.clone(),
        }
    }

    /// Runs the pending tasks of the `queue` backend. Backends that are drained by a native
    /// message loop have nothing to pump and return `Ok(0)`.
    pub fn pump(&self) -> Result<usize, DispatchError> {
        match self {
            Self::Queue(queue) => queue.pump(),
            #[cfg(all(feature = "backend-win32", target_family = "windows"))]
            Self::Win32(_) => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn select_queue_by_name() {
        let wakeups = Arc::new(AtomicUsize::new(0));
        let w = wakeups.clone();
        let backend = BackendSelector::new()
            .backend_name("Queue".into())
            .with_wakeup(move || _ = w.fetch_add(1, Ordering::SeqCst))
            .select()
            .unwrap();
        assert_eq!(backend.name(), "queue");

        let ran = Arc::new(AtomicUsize::new(0));
        let r = ran.clone();
        backend.dispatcher().schedule(Box::new(move || _ = r.fetch_add(1, Ordering::SeqCst))).unwrap();
        assert_eq!(wakeups.load(Ordering::SeqCst), 1);
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(backend.pump(), Ok(1));
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_backend_name_is_an_error() {
        let err = BackendSelector::new().backend_name("cocoa".into()).select().err().unwrap();
        assert_eq!(err, PlatformError::NoBackend("cocoa".into()));
        assert_eq!(err.to_string(), "cocoa backend requested but it is not available");
    }

    #[test]
    fn known_backends() {
        assert!(is_known_backend("queue"));
        assert!(is_known_backend("QUEUE"));
        assert!(!is_known_backend("gtk"));
        assert_eq!(
            is_known_backend("win32"),
            cfg!(all(feature = "backend-win32", target_family = "windows"))
        );
    }
}
