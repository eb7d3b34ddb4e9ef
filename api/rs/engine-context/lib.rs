// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![doc = include_str!("README.md")]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub use i_engine_context_core::api::*;
pub use i_engine_context_core::context::EngineContextHub;
pub use i_engine_context_core::destroy_notifier::{DestroyNotificationId, DestroyNotifier};
pub use i_engine_context_core::dispatcher::{
    DispatchError, MainThreadDispatcher, QueueDispatcher, Task,
};
pub use i_engine_context_core::handle_registry::HandleRegistry;
pub use i_engine_context_core::sender::MainThreadSender;
pub use i_engine_context_core::thread_id::SystemThreadId;

/// The plugin registered with the host framework, and the values exchanged on its channel.
pub mod plugin {
    pub use i_engine_context_core::plugin::*;
}

/// Backend selection and the process wide context used by the C API.
pub mod platform {
    pub use i_engine_context_backend_selector::api::{Backend, BackendSelector};
    pub use i_engine_context_backend_selector::{
        BACKEND_ENV_VAR, DEFAULT_BACKEND_NAME, GlobalContext, PlatformError, global_context,
        global_hub, init_global_context, pump_main_thread, with_global_context,
    };
}

/// Creates the dispatcher picked by the `ENGINE_CONTEXT_BACKEND` environment variable and
/// returns a sender for it. The calling thread becomes the main thread.
///
/// Unlike [`platform::init_global_context`], this does not touch the process wide context.
pub fn main_thread_sender() -> Result<(MainThreadSender, platform::Backend), platform::PlatformError>
{
    let backend = platform::BackendSelector::new().select()?;
    log::debug!("Created a {} main thread dispatcher", backend.name());
    Ok((MainThreadSender::new(backend.dispatcher()), backend))
}

/// A sender to the main thread of the process wide context used by the C API.
///
/// Returns [`EngineContextError::NotInitialized`] until [`platform::init_global_context`],
/// `engine_context_init()` or a plugin registration designated the main thread.
pub fn global_sender() -> Result<MainThreadSender, EngineContextError> {
    platform::global_context()
        .map(|context| context.sender().clone())
        .ok_or(EngineContextError::NotInitialized)
}
