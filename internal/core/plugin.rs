// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*!
    The plugin the host framework instantiates once per embedding.

    On registration the plugin stores the native resources of the embedding in the
    [`EngineContextHub`] and answers `getEngineHandle` on its method channel. When the host
    disposes the plugin, the embedding is removed from the hub and the destroy observers run.
*/

#![warn(missing_docs)]

use std::sync::Arc;

use crate::api::{EngineContext, EngineHandle, MessengerRef, TextureRegistrarRef, WindowRef};
use crate::context::EngineContextHub;

/// Name of the method channel the plugin listens on.
pub const ENGINE_CONTEXT_CHANNEL: &str = "dev.engine_context";

/// The only method understood by the plugin.
pub const GET_ENGINE_HANDLE_METHOD: &str = "getEngineHandle";

/// Accessors of the registrar the host framework passes to a plugin.
pub trait PluginRegistrar {
    /// The native window or view of the embedding.
    fn view(&self) -> WindowRef;
    /// The binary messenger of the embedding.
    fn messenger(&self) -> MessengerRef;
    /// The texture registrar of the embedding.
    fn texture_registrar(&self) -> TextureRegistrarRef;
}

/// The subset of the host codec values used on the channel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// A 64-bit integer.
    I64(i64),
    /// A string.
    String(String),
}

/// A decoded call received on the method channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodCall {
    /// The method name.
    pub method: String,
    /// The arguments of the call.
    pub arguments: Value,
}

impl MethodCall {
    /// Creates a call without arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self { method: method.into(), arguments: Value::Null }
    }
}

/// The reply sent back on the method channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MethodCallResult {
    /// The call succeeded with the given value.
    Success(Value),
    /// The method is not known to this plugin.
    NotImplemented,
}

/// One registered embedding. Dropping it unregisters the embedding.
pub struct EngineContextPlugin {
    hub: Arc<EngineContextHub>,
    handle: EngineHandle,
}

impl EngineContextPlugin {
    /// Registers a new embedding with the resources exposed by `registrar`.
    pub fn register_with_registrar(
        hub: Arc<EngineContextHub>,
        registrar: &dyn PluginRegistrar,
    ) -> Self {
        let handle = hub.create(EngineContext::new(
            registrar.view(),
            registrar.messenger(),
            registrar.texture_registrar(),
        ));
        Self { hub, handle }
    }

    /// The handle assigned to this embedding.
    pub fn handle(&self) -> EngineHandle {
        self.handle
    }

    /// The hub the embedding is registered with.
    pub fn hub(&self) -> &Arc<EngineContextHub> {
        &self.hub
    }

    /// Answers a call received on [`ENGINE_CONTEXT_CHANNEL`].
    pub fn handle_method_call(&self, call: &MethodCall) -> MethodCallResult {
        match call.method.as_str() {
            GET_ENGINE_HANDLE_METHOD => MethodCallResult::Success(Value::I64(self.handle.as_raw())),
            _ => MethodCallResult::NotImplemented,
        }
    }
}

impl Drop for EngineContextPlugin {
    fn drop(&mut self) {
        self.hub.remove(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeRegistrar(usize);

    impl PluginRegistrar for FakeRegistrar {
        fn view(&self) -> WindowRef {
            WindowRef::from_raw(self.0)
        }
        fn messenger(&self) -> MessengerRef {
            MessengerRef::from_raw(self.0 + 1)
        }
        fn texture_registrar(&self) -> TextureRegistrarRef {
            TextureRegistrarRef::from_raw(self.0 + 2)
        }
    }

    #[test]
    fn get_engine_handle() {
        let hub = Arc::new(EngineContextHub::new());
        let first = EngineContextPlugin::register_with_registrar(hub.clone(), &FakeRegistrar(16));
        let second = EngineContextPlugin::register_with_registrar(hub.clone(), &FakeRegistrar(32));

        assert_eq!(
            first.handle_method_call(&MethodCall::new(GET_ENGINE_HANDLE_METHOD)),
            MethodCallResult::Success(Value::I64(1))
        );
        assert_eq!(
            second.handle_method_call(&MethodCall::new("getEngineHandle")),
            MethodCallResult::Success(Value::I64(2))
        );
        assert_eq!(hub.window(second.handle()), WindowRef::from_raw(32));
        assert_eq!(hub.texture_registrar(first.handle()), TextureRegistrarRef::from_raw(18));
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let hub = Arc::new(EngineContextHub::new());
        let plugin = EngineContextPlugin::register_with_registrar(hub, &FakeRegistrar(8));
        for method in ["", "getengineHandle", "dispose", "getEngineHandle "] {
            assert_eq!(
                plugin.handle_method_call(&MethodCall::new(method)),
                MethodCallResult::NotImplemented
            );
        }
    }

    #[test]
    fn dropping_the_plugin_removes_and_notifies() {
        let hub = Arc::new(EngineContextHub::new());
        let destroyed = Arc::new(Mutex::new(Vec::new()));
        let d = destroyed.clone();
        hub.register_destroy_notification(move |h| d.lock().unwrap().push(h));

        let plugin = EngineContextPlugin::register_with_registrar(hub.clone(), &FakeRegistrar(8));
        let handle = plugin.handle();
        assert!(hub.lookup(handle).is_some());
        drop(plugin);
        assert!(hub.lookup(handle).is_none());
        assert_eq!(*destroyed.lock().unwrap(), vec![handle]);
    }
}
