// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use core::ffi::c_void;
use std::sync::Mutex;

use engine_context_cpp::plugin::*;
use engine_context_cpp::*;

// The user data of the fake registrar is the address of its view, the messenger and the
// texture registrar follow it.
unsafe extern "C" fn view(user_data: *mut c_void) -> usize {
    user_data as usize
}
unsafe extern "C" fn messenger(user_data: *mut c_void) -> *mut c_void {
    (user_data as usize + 1) as *mut c_void
}
unsafe extern "C" fn texture_registrar(user_data: *mut c_void) -> *mut c_void {
    (user_data as usize + 2) as *mut c_void
}

fn registrar(base: usize) -> EngineContextRegistrar {
    EngineContextRegistrar { user_data: base as *mut c_void, view, messenger, texture_registrar }
}

static DESTROYED: Mutex<Vec<i64>> = Mutex::new(Vec::new());

extern "C" fn on_destroy(handle: i64) {
    assert_eq!(engine_context_get_flutter_view(handle), 0);
    DESTROYED.lock().unwrap().push(handle);
}

extern "C" fn noop_observer(_: i64) {}

#[test]
fn register_query_and_destroy() {
    let _ = env_logger::builder().is_test(true).try_init();
    engine_context_register_destroy_notification(on_destroy);

    let first = unsafe { engine_context_plugin_register_with_registrar(&registrar(0x1000)) };
    let second = unsafe { engine_context_plugin_register_with_registrar(&registrar(0x2000)) };
    assert!(!first.is_null() && !second.is_null());

    let h1 = unsafe { engine_context_plugin_get_handle(first) };
    let h2 = unsafe { engine_context_plugin_get_handle(second) };
    assert!(h1 > 0);
    assert!(h2 > h1);

    assert_eq!(engine_context_get_flutter_view(h1), 0x1000);
    assert_eq!(engine_context_get_binary_messenger(h2) as usize, 0x2001);
    assert_eq!(engine_context_get_texture_registrar(h2) as usize, 0x2002);

    let mut out = 0;
    let status = unsafe {
        engine_context_plugin_handle_method_call(second, c"getEngineHandle".as_ptr(), &mut out)
    };
    assert_eq!(status, MethodCallStatus::Success);
    assert_eq!(out, h2);

    unsafe { engine_context_plugin_destroy(first) };
    assert!(DESTROYED.lock().unwrap().contains(&h1));
    assert!(!DESTROYED.lock().unwrap().contains(&h2));
    assert_eq!(engine_context_get_flutter_view(h1), 0);
    assert!(engine_context_get_binary_messenger(h1).is_null());
    assert!(engine_context_get_texture_registrar(h1).is_null());
    assert_eq!(engine_context_get_flutter_view(h2), 0x2000);

    unsafe { engine_context_plugin_destroy(second) };
    assert!(DESTROYED.lock().unwrap().contains(&h2));

    assert!(engine_context_unregister_destroy_notification(on_destroy));
}

#[test]
fn method_call_errors() {
    let plugin = unsafe { engine_context_plugin_register_with_registrar(&registrar(0x3000)) };
    let mut out = -1;
    let status = unsafe {
        engine_context_plugin_handle_method_call(plugin, c"getWindow".as_ptr(), &mut out)
    };
    assert_eq!(status, MethodCallStatus::NotImplemented);
    assert_eq!(out, -1);

    let status =
        unsafe { engine_context_plugin_handle_method_call(plugin, core::ptr::null(), &mut out) };
    assert_eq!(status, MethodCallStatus::InvalidArgument);

    let status = unsafe {
        engine_context_plugin_handle_method_call(
            core::ptr::null(),
            c"getEngineHandle".as_ptr(),
            &mut out,
        )
    };
    assert_eq!(status, MethodCallStatus::InvalidArgument);

    // A null output pointer is accepted, the result is discarded.
    let status = unsafe {
        engine_context_plugin_handle_method_call(
            plugin,
            c"getEngineHandle".as_ptr(),
            core::ptr::null_mut(),
        )
    };
    assert_eq!(status, MethodCallStatus::Success);

    unsafe { engine_context_plugin_destroy(plugin) };
    unsafe { engine_context_plugin_destroy(core::ptr::null_mut()) };
}

#[test]
fn null_arguments() {
    assert!(unsafe { engine_context_plugin_register_with_registrar(core::ptr::null()) }.is_null());
    assert_eq!(unsafe { engine_context_plugin_get_handle(core::ptr::null()) }, 0);
    assert_eq!(engine_context_get_flutter_view(i64::MAX), 0);
    assert!(engine_context_get_binary_messenger(-1).is_null());
}

#[test]
fn unregister_unknown_callback() {
    assert!(!engine_context_unregister_destroy_notification(noop_observer));
    engine_context_register_destroy_notification(noop_observer);
    engine_context_register_destroy_notification(noop_observer);
    assert!(engine_context_unregister_destroy_notification(noop_observer));
    assert!(engine_context_unregister_destroy_notification(noop_observer));
    assert!(!engine_context_unregister_destroy_notification(noop_observer));
}
