// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use core::ffi::{CStr, c_char, c_void};

use i_engine_context_core::plugin::{
    EngineContextPlugin, MethodCall, MethodCallResult, PluginRegistrar, Value,
};
use i_engine_context_core::{MessengerRef, TextureRegistrarRef, WindowRef};

use i_engine_context_backend_selector::global_hub;

use crate::ensure_initialized;

type RegistrarUserData = *mut c_void;

/// The accessors of the host registrar, implemented on the native side.
#[repr(C)]
pub struct EngineContextRegistrar {
    pub user_data: RegistrarUserData,
    pub view: unsafe extern "C" fn(RegistrarUserData) -> usize,
    pub messenger: unsafe extern "C" fn(RegistrarUserData) -> *mut c_void,
    pub texture_registrar: unsafe extern "C" fn(RegistrarUserData) -> *mut c_void,
}

impl PluginRegistrar for EngineContextRegistrar {
    fn view(&self) -> WindowRef {
        WindowRef::from_raw(unsafe { (self.view)(self.user_data) })
    }

    fn messenger(&self) -> MessengerRef {
        MessengerRef::from_ptr(unsafe { (self.messenger)(self.user_data) })
    }

    fn texture_registrar(&self) -> TextureRegistrarRef {
        TextureRegistrarRef::from_ptr(unsafe { (self.texture_registrar)(self.user_data) })
    }
}

/// Opaque plugin instance owned by the native side.
pub struct EngineContextPluginHandle(EngineContextPlugin);

/// Outcome of [`engine_context_plugin_handle_method_call`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MethodCallStatus {
    /// The call succeeded. Integer results were written to `out`.
    Success,
    /// The method is unknown. Reply with the host's "not implemented" response.
    NotImplemented,
    /// The plugin or the method name was null, or the name was not valid UTF-8.
    InvalidArgument,
}

/// Registers a new embedding with the resources of `registrar`.
///
/// The host registers plugins on its platform thread, so the process wide context is created
/// here if [`engine_context_init`](crate::engine_context_init) was not called. Returns null if
/// `registrar` is null. The result must be released with [`engine_context_plugin_destroy`].
///
/// # Safety
/// `registrar` must be null or point to a valid registrar whose callbacks are safe to call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_context_plugin_register_with_registrar(
    registrar: *const EngineContextRegistrar,
) -> *mut EngineContextPluginHandle {
    let Some(registrar) = (unsafe { registrar.as_ref() }) else {
        log::error!("engine_context_plugin_register_with_registrar called with a null registrar");
        return core::ptr::null_mut();
    };
    ensure_initialized();
    let plugin = EngineContextPlugin::register_with_registrar(global_hub().clone(), registrar);
    Box::into_raw(Box::new(EngineContextPluginHandle(plugin)))
}

/// Returns the handle of the embedding, or 0 if `plugin` is null.
///
/// # Safety
/// `plugin` must be null or returned by [`engine_context_plugin_register_with_registrar`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_context_plugin_get_handle(
    plugin: *const EngineContextPluginHandle,
) -> i64 {
    unsafe { plugin.as_ref() }.map_or(0, |plugin| plugin.0.handle().as_raw())
}

/// Answers a method call received on the plugin channel.
///
/// # Safety
/// `plugin` must be null or a live plugin, `method` null or a nul terminated string, and `out`
/// null or valid for writes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_context_plugin_handle_method_call(
    plugin: *const EngineContextPluginHandle,
    method: *const c_char,
    out: *mut i64,
) -> MethodCallStatus {
    let Some(plugin) = (unsafe { plugin.as_ref() }) else {
        return MethodCallStatus::InvalidArgument;
    };
    if method.is_null() {
        return MethodCallStatus::InvalidArgument;
    }
    let Ok(method) = unsafe { CStr::from_ptr(method) }.to_str() else {
        return MethodCallStatus::InvalidArgument;
    };
    match plugin.0.handle_method_call(&MethodCall::new(method)) {
        MethodCallResult::Success(value) => {
            if let (Value::I64(value), Some(out)) = (value, unsafe { out.as_mut() }) {
                *out = value;
            }
            MethodCallStatus::Success
        }
        MethodCallResult::NotImplemented => MethodCallStatus::NotImplemented,
    }
}

/// Disposes the plugin. The embedding is removed and the destroy callbacks run before this
/// returns.
///
/// # Safety
/// `plugin` must be null or returned by [`engine_context_plugin_register_with_registrar`], and
/// not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn engine_context_plugin_destroy(plugin: *mut EngineContextPluginHandle) {
    if !plugin.is_null() {
        drop(unsafe { Box::from_raw(plugin) });
    }
}
