// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

/*!
This module contains types that are public and re-exported in the engine-context crate.
*/

#![warn(missing_docs)]

/// Opaque identifier of one running embedding of the engine.
///
/// Handles are allocated by a [`HandleRegistry`](crate::HandleRegistry) from a monotonic
/// counter starting at 1 and are never reused while that registry is alive.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EngineHandle(i64);

impl EngineHandle {
    /// Wraps a raw handle value, as received from the embedded application.
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw value that is sent over the method channel.
    pub const fn as_raw(self) -> i64 {
        self.0
    }
}

impl From<i64> for EngineHandle {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<EngineHandle> for i64 {
    fn from(handle: EngineHandle) -> Self {
        handle.0
    }
}

impl core::fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.0.fmt(f)
    }
}

macro_rules! declare_native_ref {
    ($(#[doc = $doc:literal])* $Name:ident) => {
        $(#[doc = $doc])*
        ///
        /// The reference does not own the resource. It stays valid until the host signals
        /// the disposal of the embedding it belongs to. A zero value is the null sentinel.
        #[repr(transparent)]
        #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $Name(usize);

        impl $Name {
            /// The null reference, returned by accessors for unknown handles.
            pub const NULL: Self = Self(0);

            /// Wraps the address of a native object.
            pub const fn from_raw(raw: usize) -> Self {
                Self(raw)
            }

            /// Wraps a native pointer.
            pub fn from_ptr<T>(ptr: *mut T) -> Self {
                Self(ptr as usize)
            }

            /// Returns the address of the native object.
            pub const fn as_raw(self) -> usize {
                self.0
            }

            /// Returns the native object as a raw pointer.
            pub fn as_ptr<T>(self) -> *mut T {
                self.0 as *mut T
            }

            /// Returns true for the null sentinel.
            pub const fn is_null(self) -> bool {
                self.0 == 0
            }
        }
    };
}

declare_native_ref! {
    /// Reference to the native window or view that hosts an embedding
    /// (an `HWND` on Windows, an `FlView*` on Linux).
    WindowRef
}

declare_native_ref! {
    /// Reference to the binary messenger of an embedding.
    MessengerRef
}

declare_native_ref! {
    /// Reference to the texture registrar of an embedding.
    TextureRegistrarRef
}

/// The native resources of one embedding, as stored by the [`HandleRegistry`](crate::HandleRegistry).
///
/// The record is immutable once inserted.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineContext {
    /// The native window or view.
    pub window: WindowRef,
    /// The binary messenger.
    pub messenger: MessengerRef,
    /// The texture registrar.
    pub texture_registrar: TextureRegistrarRef,
}

impl EngineContext {
    /// Creates a new record from the three native references.
    pub const fn new(
        window: WindowRef,
        messenger: MessengerRef,
        texture_registrar: TextureRegistrarRef,
    ) -> Self {
        Self { window, messenger, texture_registrar }
    }
}

/// Error returned by the `Result` based accessors of the engine context.
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum EngineContextError {
    /// There is no embedding registered for this handle, or it was already destroyed.
    InvalidHandle(EngineHandle),
    /// The process wide engine context was not initialized on the main thread yet.
    NotInitialized,
}

impl core::fmt::Display for EngineContextError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidHandle(handle) => write!(f, "invalid engine handle {handle}"),
            Self::NotInitialized => f.write_str("the engine context is not initialized"),
        }
    }
}

impl std::error::Error for EngineContextError {}

#[test]
fn native_refs_null_sentinel() {
    assert!(WindowRef::NULL.is_null());
    assert!(WindowRef::default().is_null());
    let mut value = 42u32;
    let messenger = MessengerRef::from_ptr(&mut value as *mut u32);
    assert!(!messenger.is_null());
    assert_eq!(messenger.as_ptr::<u32>(), &mut value as *mut u32);
    assert_eq!(TextureRegistrarRef::from_raw(7).as_raw(), 7);
}

#[test]
fn error_display() {
    assert_eq!(
        EngineContextError::InvalidHandle(EngineHandle::from_raw(3)).to_string(),
        "invalid engine handle 3"
    );
    assert_eq!(
        EngineContextError::NotInitialized.to_string(),
        "the engine context is not initialized"
    );
}
