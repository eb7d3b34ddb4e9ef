// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

// Own test binary: the process wide context must not exist when the test starts.

use core::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

use engine_context_cpp::dispatch::*;
use engine_context_cpp::{
    engine_context_get_flutter_view, engine_context_register_destroy_notification,
    engine_context_unregister_destroy_notification,
};
use i_engine_context_backend_selector::api::BackendSelector;
use i_engine_context_core::SystemThreadId;

static RAN: AtomicUsize = AtomicUsize::new(0);
static DROPPED: AtomicUsize = AtomicUsize::new(0);

extern "C" fn task(_: *mut c_void) {
    RAN.fetch_add(1, Ordering::SeqCst);
}

extern "C" fn release(_: *mut c_void) {
    DROPPED.fetch_add(1, Ordering::SeqCst);
}

extern "C" fn observer(_: i64) {}

#[test]
fn worker_thread_calling_first_does_not_become_main() {
    let _ = env_logger::builder().is_test(true).try_init();

    std::thread::spawn(|| {
        assert!(!engine_context_is_main_thread());
        assert_eq!(engine_context_get_main_thread_id(), 0);
        let scheduled = unsafe {
            engine_context_perform_on_main_thread_with_drop(task, core::ptr::null_mut(), Some(release))
        };
        assert!(!scheduled);
        assert_eq!(DROPPED.load(Ordering::SeqCst), 1);
        assert!(!unsafe { engine_context_perform_on_main_thread(task, core::ptr::null_mut()) });

        // The hub does not depend on the main thread.
        assert_eq!(engine_context_get_flutter_view(1), 0);
        engine_context_register_destroy_notification(observer);
        assert!(engine_context_unregister_destroy_notification(observer));
    })
    .join()
    .unwrap();

    assert!(!engine_context_is_main_thread());
    assert_eq!(engine_context_pump_main_thread(), 0);
    assert_eq!(RAN.load(Ordering::SeqCst), 0);

    // The UI thread initializes later and becomes the main thread.
    i_engine_context_backend_selector::init_global_context(
        BackendSelector::new().backend_name("queue".into()),
    )
    .unwrap();
    assert!(engine_context_is_main_thread());
    assert_eq!(engine_context_get_main_thread_id(), SystemThreadId::current().as_raw());

    std::thread::spawn(|| {
        let scheduled = unsafe {
            engine_context_perform_on_main_thread_with_drop(task, core::ptr::null_mut(), Some(release))
        };
        assert!(scheduled);
    })
    .join()
    .unwrap();
    assert_eq!(engine_context_pump_main_thread(), 1);
    assert_eq!(RAN.load(Ordering::SeqCst), 1);
    assert_eq!(DROPPED.load(Ordering::SeqCst), 2);
}
