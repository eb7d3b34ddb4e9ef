// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![doc = include_str!("README.md")]
#![deny(unsafe_code)]

pub mod api;
pub mod context;
pub mod destroy_notifier;
pub mod dispatcher;
pub mod handle_registry;
pub mod plugin;
pub mod sender;
pub mod thread_id;

#[doc(inline)]
pub use api::{
    EngineContext, EngineContextError, EngineHandle, MessengerRef, TextureRegistrarRef, WindowRef,
};

#[doc(inline)]
pub use context::EngineContextHub;

#[doc(inline)]
pub use destroy_notifier::{DestroyNotificationId, DestroyNotifier};

#[doc(inline)]
pub use dispatcher::{DispatchError, MainThreadDispatcher, QueueDispatcher, Task};

#[doc(inline)]
pub use handle_registry::HandleRegistry;

#[doc(inline)]
pub use sender::MainThreadSender;

#[doc(inline)]
pub use thread_id::SystemThreadId;

/// Recovers the guard of a poisoned lock.
///
/// Callbacks never run while one of our locks is held, so a poisoned lock
/// still protects consistent data.
pub(crate) fn unpoison<G>(result: std::sync::LockResult<G>) -> G {
    result.unwrap_or_else(std::sync::PoisonError::into_inner)
}
