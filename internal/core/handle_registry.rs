// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*!
    The registry mapping [`EngineHandle`]s to the [`EngineContext`] of each embedding.

    Lookups dominate and may come from auxiliary threads (rendering, texture upload), so
    the map is behind a reader-writer lock. Creation and removal take the write side.
*/

#![warn(missing_docs)]

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::api::{EngineContext, EngineHandle, MessengerRef, TextureRegistrarRef, WindowRef};
use crate::unpoison;

struct RegistryInner {
    contexts: BTreeMap<EngineHandle, EngineContext>,
    next_handle: i64,
}

/// Maps engine handles to the native resources of the embedding they identify.
///
/// Handles start at 1 and increase strictly; a removed handle is never handed out again.
pub struct HandleRegistry {
    inner: RwLock<RegistryInner>,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleRegistry {
    /// Creates an empty registry whose first handle will be 1.
    pub fn new() -> Self {
        Self { inner: RwLock::new(RegistryInner { contexts: BTreeMap::new(), next_handle: 1 }) }
    }

    /// Stores `context` under a freshly allocated handle and returns that handle.
    pub fn create(&self, context: EngineContext) -> EngineHandle {
        let mut inner = unpoison(self.inner.write());
        let handle = EngineHandle::from_raw(inner.next_handle);
        inner.next_handle += 1;
        inner.contexts.insert(handle, context);
        log::debug!("Registered engine context {handle}");
        handle
    }

    /// Returns the context stored for `handle`, or `None` if the handle was never
    /// created or was already removed.
    pub fn lookup(&self, handle: EngineHandle) -> Option<EngineContext> {
        unpoison(self.inner.read()).contexts.get(&handle).copied()
    }

    /// Erases the context stored for `handle` and returns it.
    ///
    /// Removing an unknown handle does nothing and returns `None`. The erase is visible to
    /// every subsequent [`lookup`](Self::lookup) once this function returns.
    pub fn remove(&self, handle: EngineHandle) -> Option<EngineContext> {
        let removed = unpoison(self.inner.write()).contexts.remove(&handle);
        if removed.is_some() {
            log::debug!("Removed engine context {handle}");
        }
        removed
    }

    /// Returns true if a context is registered for `handle`.
    pub fn contains(&self, handle: EngineHandle) -> bool {
        unpoison(self.inner.read()).contexts.contains_key(&handle)
    }

    /// The native window of the embedding, or [`WindowRef::NULL`] for unknown handles.
    pub fn window(&self, handle: EngineHandle) -> WindowRef {
        self.lookup(handle).map_or(WindowRef::NULL, |c| c.window)
    }

    /// The binary messenger of the embedding, or [`MessengerRef::NULL`] for unknown handles.
    pub fn messenger(&self, handle: EngineHandle) -> MessengerRef {
        self.lookup(handle).map_or(MessengerRef::NULL, |c| c.messenger)
    }

    /// The texture registrar of the embedding, or [`TextureRegistrarRef::NULL`] for unknown
    /// handles.
    pub fn texture_registrar(&self, handle: EngineHandle) -> TextureRegistrarRef {
        self.lookup(handle).map_or(TextureRegistrarRef::NULL, |c| c.texture_registrar)
    }

    /// The handles of all live embeddings, in creation order.
    pub fn handles(&self) -> Vec<EngineHandle> {
        unpoison(self.inner.read()).contexts.keys().copied().collect()
    }

    /// Number of live embeddings.
    pub fn len(&self) -> usize {
        unpoison(self.inner.read()).contexts.len()
    }

    /// Returns true if no embedding is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
