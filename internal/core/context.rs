// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![warn(missing_docs)]

use crate::api::{
    EngineContext, EngineContextError, EngineHandle, MessengerRef, TextureRegistrarRef, WindowRef,
};
use crate::destroy_notifier::{DestroyNotificationId, DestroyNotifier};
use crate::handle_registry::HandleRegistry;

/// Owns the [`HandleRegistry`] and the [`DestroyNotifier`] of one host.
///
/// The hub is constructed explicitly and handed to the plugin adapter, so independent hubs can
/// coexist in the same process. Removing an embedding through the hub notifies the observers
/// after the context became unreachable.
#[derive(Default)]
pub struct EngineContextHub {
    registry: HandleRegistry,
    notifier: DestroyNotifier,
}

impl EngineContextHub {
    /// Creates a hub with an empty registry and no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// The underlying notifier.
    pub fn notifier(&self) -> &DestroyNotifier {
        &self.notifier
    }

    /// Registers a new embedding and returns its handle.
    pub fn create(&self, context: EngineContext) -> EngineHandle {
        self.registry.create(context)
    }

    /// Returns the context of `handle`, if it is alive.
    pub fn lookup(&self, handle: EngineHandle) -> Option<EngineContext> {
        self.registry.lookup(handle)
    }

    /// Like [`lookup`](Self::lookup), but reports unknown handles as an error.
    pub fn get(&self, handle: EngineHandle) -> Result<EngineContext, EngineContextError> {
        self.lookup(handle).ok_or(EngineContextError::InvalidHandle(handle))
    }

    /// See [`HandleRegistry::window`].
    pub fn window(&self, handle: EngineHandle) -> WindowRef {
        self.registry.window(handle)
    }

    /// See [`HandleRegistry::messenger`].
    pub fn messenger(&self, handle: EngineHandle) -> MessengerRef {
        self.registry.messenger(handle)
    }

    /// See [`HandleRegistry::texture_registrar`].
    pub fn texture_registrar(&self, handle: EngineHandle) -> TextureRegistrarRef {
        self.registry.texture_registrar(handle)
    }

    /// Removes the embedding and, if it existed, notifies the destroy observers.
    ///
    /// Removing an unknown or already removed handle does nothing and notifies nobody.
    pub fn remove(&self, handle: EngineHandle) -> Option<EngineContext> {
        let removed = self.registry.remove(handle);
        if removed.is_some() {
            self.notifier.notify(handle);
        }
        removed
    }

    /// See [`DestroyNotifier::register`].
    pub fn register_destroy_notification(
        &self,
        callback: impl Fn(EngineHandle) + Send + Sync + 'static,
    ) -> DestroyNotificationId {
        self.notifier.register(callback)
    }

    /// See [`DestroyNotifier::unregister`].
    pub fn unregister_destroy_notification(&self, id: DestroyNotificationId) -> bool {
        self.notifier.unregister(id)
    }
}
