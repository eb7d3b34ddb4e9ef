// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

#![doc = include_str!("README.md")]

#[cfg(target_family = "windows")]
mod message_window;

#[cfg(target_family = "windows")]
pub use message_window::Win32Dispatcher;

/// Name used to select this backend.
pub const BACKEND_NAME: &str = "win32";

/// True on the platforms where [`Win32Dispatcher`] exists.
pub const IS_AVAILABLE: bool = cfg!(target_family = "windows");
