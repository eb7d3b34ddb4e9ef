// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*! This crate just exposes the functions used by the native side of the host plugins.

Every function works on the process wide hub of the backend selector. Handles are plain
`int64_t`, resources are returned as untyped pointers, and unknown handles yield `0`/`NULL`.
The main thread is designated by `engine_context_init()` or by the first plugin registration;
the dispatch functions refuse to work before that.
*/

use core::ffi::c_void;
use std::sync::Mutex;

use i_engine_context_backend_selector::api::BackendSelector;
use i_engine_context_backend_selector::{
    GlobalContext, PlatformError, global_hub, init_global_context, with_global_context,
};
use i_engine_context_core::{DestroyNotificationId, EngineHandle};

pub mod dispatch;
pub mod plugin;

/// Runs `f` with the process wide context, or returns `default` if it was not initialized.
pub(crate) fn with_context<R>(default: R, f: impl FnOnce(&GlobalContext) -> R) -> R {
    with_global_context(f).unwrap_or_else(|err| {
        log::error!("Engine context is not available: {err}");
        default
    })
}

/// Creates the process wide context on the calling thread unless it exists already.
pub(crate) fn ensure_initialized() {
    match init_global_context(BackendSelector::new()) {
        Ok(()) => log::debug!("Engine context initialized"),
        Err(PlatformError::AlreadyInitialized) => {}
        Err(err) => log::error!("Could not initialize the engine context: {err}"),
    }
}

/// Creates the process wide context and designates the calling thread as main thread.
///
/// The backend is picked from the `ENGINE_CONTEXT_BACKEND` environment variable. Calling this
/// more than once has no effect. Registering a plugin does the same on the registering thread.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_init() {
    ensure_initialized()
}

/// Returns the native window or view of the embedding, or 0 for an unknown handle.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_get_flutter_view(handle: i64) -> usize {
    global_hub().window(EngineHandle::from_raw(handle)).as_raw()
}

/// Returns the binary messenger of the embedding, or null for an unknown handle.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_get_binary_messenger(handle: i64) -> *mut c_void {
    global_hub().messenger(EngineHandle::from_raw(handle)).as_ptr()
}

/// Returns the texture registrar of the embedding, or null for an unknown handle.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_get_texture_registrar(handle: i64) -> *mut c_void {
    global_hub().texture_registrar(EngineHandle::from_raw(handle)).as_ptr()
}

/// Signature of the callbacks invoked when an embedding is destroyed.
pub type DestroyCallback = extern "C" fn(handle: i64);

// Maps the function pointers handed out by C to the ids of the hub, most recent last.
static DESTROY_CALLBACKS: Mutex<Vec<(usize, DestroyNotificationId)>> = Mutex::new(Vec::new());

/// Registers `callback` to be invoked with the handle of every destroyed embedding.
///
/// The callback runs synchronously on the thread that disposes the embedding, after the handle
/// became invalid. Registering the same function twice makes it run twice.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_register_destroy_notification(callback: DestroyCallback) {
    let id = global_hub().register_destroy_notification(move |handle| callback(handle.as_raw()));
    DESTROY_CALLBACKS
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .push((callback as usize, id));
}

/// Removes the most recent registration of `callback`. Returns false if it was not registered.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_unregister_destroy_notification(
    callback: DestroyCallback,
) -> bool {
    let id = {
        let mut callbacks =
            DESTROY_CALLBACKS.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let Some(pos) = callbacks.iter().rposition(|(f, _)| *f == callback as usize) else {
            return false;
        };
        callbacks.remove(pos).1
    };
    global_hub().unregister_destroy_notification(id)
}
