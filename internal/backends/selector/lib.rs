// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![doc = include_str!("README.md")]
#![doc(html_logo_url = "https://slint.dev/logo/slint-logo-square-light.svg")]

use std::sync::Arc;

use i_engine_context_core::dispatcher::DispatchError;
use i_engine_context_core::{EngineContextHub, MainThreadSender};
use once_cell::sync::{Lazy, OnceCell};

pub mod api;

use api::{Backend, BackendSelector};

/// Environment variable read by [`BackendSelector::select`] when no name was set explicitly.
pub const BACKEND_ENV_VAR: &str = "ENGINE_CONTEXT_BACKEND";

cfg_if::cfg_if! {
    if #[cfg(all(feature = "backend-win32", target_family = "windows"))] {
        /// Backend used when nothing else was requested.
        pub const DEFAULT_BACKEND_NAME: &str = i_engine_context_backend_win32::BACKEND_NAME;
    } else {
        /// Backend used when nothing else was requested.
        pub const DEFAULT_BACKEND_NAME: &str = "queue";
    }
}

/// Error returned when the backend or the global context cannot be set up.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PlatformError {
    /// The requested backend is not compiled in or not supported on this platform.
    NoBackend(String),
    /// The global context was already initialized.
    AlreadyInitialized,
    /// The global context was not initialized on the main thread yet.
    NotInitialized,
    /// Another platform specific error.
    Other(String),
}

impl core::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoBackend(name) => {
                write!(f, "{name} backend requested but it is not available")
            }
            Self::AlreadyInitialized => f.write_str("the engine context was already initialized"),
            Self::NotInitialized => {
                f.write_str("the engine context must be initialized on the main thread first")
            }
            Self::Other(str) => f.write_str(str),
        }
    }
}

impl std::error::Error for PlatformError {}

impl From<String> for PlatformError {
    fn from(value: String) -> Self {
        Self::Other(value)
    }
}

impl From<&str> for PlatformError {
    fn from(value: &str) -> Self {
        Self::Other(value.into())
    }
}

static GLOBAL_HUB: Lazy<Arc<EngineContextHub>> = Lazy::new(Default::default);

/// The hub shared by every embedding of the process.
///
/// It exists independently of the main thread dispatcher, so handles can be queried and destroy
/// observers registered from any thread at any time.
pub fn global_hub() -> &'static Arc<EngineContextHub> {
    &GLOBAL_HUB
}

/// The hub and dispatcher shared by every embedding of the process.
pub struct GlobalContext {
    hub: Arc<EngineContextHub>,
    backend: Backend,
    sender: MainThreadSender,
}

impl GlobalContext {
    /// Creates a context around `hub` with the backend picked by `selector`. The calling thread
    /// becomes the main thread.
    pub fn new(hub: Arc<EngineContextHub>, selector: BackendSelector) -> Result<Self, PlatformError> {
        let backend = selector.select()?;
        log::debug!("Using the {} main thread dispatcher backend", backend.name());
        let sender = MainThreadSender::new(backend.dispatcher());
        Ok(Self { hub, backend, sender })
    }

    /// The hub holding the registered embeddings.
    pub fn hub(&self) -> &Arc<EngineContextHub> {
        &self.hub
    }

    /// The selected backend.
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// A sender posting to the main thread of this context.
    pub fn sender(&self) -> &MainThreadSender {
        &self.sender
    }

    /// See [`Backend::pump`].
    pub fn pump(&self) -> Result<usize, DispatchError> {
        self.backend.pump()
    }
}

static GLOBAL_CONTEXT: OnceCell<GlobalContext> = OnceCell::new();

/// Initializes the process wide context around [`global_hub`]. Must be called on the main
/// thread, which is the thread that loads the library or registers the plugin.
pub fn init_global_context(selector: BackendSelector) -> Result<(), PlatformError> {
    let mut created = false;
    GLOBAL_CONTEXT.get_or_try_init(|| {
        created = true;
        GlobalContext::new(global_hub().clone(), selector)
    })?;
    if created { Ok(()) } else { Err(PlatformError::AlreadyInitialized) }
}

/// Runs `f` with the process wide context.
///
/// Never creates the context: the calling thread might not be the main thread. Returns
/// [`PlatformError::NotInitialized`] until [`init_global_context`] was called.
pub fn with_global_context<R>(f: impl FnOnce(&GlobalContext) -> R) -> Result<R, PlatformError> {
    GLOBAL_CONTEXT.get().map(f).ok_or(PlatformError::NotInitialized)
}

/// Returns the process wide context if it was created already.
pub fn global_context() -> Option<&'static GlobalContext> {
    GLOBAL_CONTEXT.get()
}

/// Runs the tasks queued on the process wide context. Returns `Ok(0)` if the context does not
/// exist yet.
pub fn pump_main_thread() -> Result<usize, DispatchError> {
    match GLOBAL_CONTEXT.get() {
        Some(context) => context.pump(),
        None => Ok(0),
    }
}
