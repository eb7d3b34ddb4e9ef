// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![allow(unsafe_code)]

/// Native identifier of an OS thread.
///
/// This is `GetCurrentThreadId()` on Windows and `pthread_self()` on Unix. Unlike
/// [`std::thread::ThreadId`] it can be queried while a thread is being torn down, and it can
/// be handed across the C boundary. The OS may reuse the value once the thread has exited.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SystemThreadId(u64);

impl SystemThreadId {
    /// The identifier of the calling thread.
    pub fn current() -> Self {
        Self(current_raw())
    }

    /// Wraps a raw identifier.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw identifier, as exposed through the C API.
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Returns true if this is the identifier of the calling thread.
    pub fn is_current(self) -> bool {
        self == Self::current()
    }
}

#[cfg(target_family = "windows")]
fn current_raw() -> u64 {
    // SAFETY: GetCurrentThreadId has no preconditions.
    unsafe { windows::Win32::System::Threading::GetCurrentThreadId() as u64 }
}

#[cfg(target_family = "unix")]
fn current_raw() -> u64 {
    // SAFETY: pthread_self has no preconditions.
    unsafe { libc::pthread_self() as u64 }
}

#[cfg(not(any(target_family = "windows", target_family = "unix")))]
fn current_raw() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    std::thread_local! {
        static ID: u64 = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    }
    ID.with(|id| *id)
}

#[test]
fn distinct_per_thread() {
    let main = SystemThreadId::current();
    assert!(main.is_current());
    assert_eq!(main, SystemThreadId::current());
    let other = std::thread::spawn(SystemThreadId::current).join().unwrap();
    assert_ne!(main, other);
    assert!(!other.is_current());
    assert_eq!(SystemThreadId::from_raw(main.as_raw()), main);
}
