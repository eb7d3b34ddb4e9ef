// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use core::ffi::c_void;

use i_engine_context_backend_selector::with_global_context;

use crate::with_context;

/// The identifier of the main thread (`GetCurrentThreadId()` on Windows, `pthread_self()` on
/// Unix), or 0 before the context was initialized.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_get_main_thread_id() -> u64 {
    with_context(0, |ctx| ctx.sender().main_thread_id().as_raw())
}

/// Returns true if called on the main thread. Always false before the context was initialized.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_is_main_thread() -> bool {
    with_context(false, |ctx| ctx.sender().is_main_thread())
}

/// Schedules `callback(user_data)` on the main thread and returns immediately.
///
/// Returns false if the task could not be scheduled, for instance because neither
/// `engine_context_init()` nor a plugin registration designated the main thread yet.
///
/// # Safety
/// `user_data` must stay valid until the callback ran, and may be used from the main thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_context_perform_on_main_thread(
    callback: extern "C" fn(user_data: *mut c_void),
    user_data: *mut c_void,
) -> bool {
    unsafe { engine_context_perform_on_main_thread_with_drop(callback, user_data, None) }
}

/// Like [`engine_context_perform_on_main_thread`], but `drop_user_data(user_data)` is called
/// once the task was run, or discarded without running. When this returns false,
/// `drop_user_data` already ran.
///
/// # Safety
/// `user_data` may be used and released from the main thread.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_context_perform_on_main_thread_with_drop(
    callback: extern "C" fn(user_data: *mut c_void),
    user_data: *mut c_void,
    drop_user_data: Option<extern "C" fn(*mut c_void)>,
) -> bool {
    struct UserData {
        user_data: *mut c_void,
        drop_user_data: Option<extern "C" fn(*mut c_void)>,
    }
    impl Drop for UserData {
        fn drop(&mut self) {
            if let Some(x) = self.drop_user_data {
                x(self.user_data)
            }
        }
    }
    unsafe impl Send for UserData {}
    let ud = UserData { user_data, drop_user_data };

    // The task, and with it the user data, is dropped when the context does not exist.
    let result = with_global_context(move |ctx| {
        ctx.sender().send(move || {
            let ud = &ud;
            callback(ud.user_data);
        })
    });
    match result {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            log::warn!("Could not schedule a task on the main thread: {err}");
            false
        }
        Err(err) => {
            log::error!("Could not schedule a task on the main thread: {err}");
            false
        }
    }
}

/// Runs the tasks queued for the main thread and returns how many ran.
///
/// Only the `queue` backend needs this. It must be called on the main thread; other threads
/// get 0.
#[unsafe(no_mangle)]
pub extern "C" fn engine_context_pump_main_thread() -> usize {
    i_engine_context_backend_selector::pump_main_thread().unwrap_or_else(|err| {
        log::error!("engine_context_pump_main_thread: {err}");
        0
    })
}
