// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: GPL-3.0-only OR LicenseRef-Slint-Royalty-free-2.0 OR LicenseRef-Slint-Software-3.0

use std::ffi::c_void;
use std::sync::Arc;

use i_engine_context_core::dispatcher::{DispatchError, MainThreadDispatcher, Task, TaskQueue};
use i_engine_context_core::SystemThreadId;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GWLP_USERDATA, HWND_MESSAGE, PostMessageW,
    RegisterClassW, WINDOW_EX_STYLE, WINDOW_STYLE, WM_CLOSE, WM_NCDESTROY, WM_NULL, WNDCLASSW,
};
use windows::core::{PCWSTR, w};

const WINDOW_CLASS_NAME: PCWSTR = w!("EngineContextMainThreadDispatcher");

// The `*LongPtr*` variants are only exported for 64-bit targets.
#[cfg(target_pointer_width = "64")]
unsafe fn user_data(hwnd: HWND) -> isize {
    unsafe { windows::Win32::UI::WindowsAndMessaging::GetWindowLongPtrW(hwnd, GWLP_USERDATA) }
}

#[cfg(target_pointer_width = "64")]
unsafe fn set_user_data(hwnd: HWND, value: isize) {
    unsafe {
        windows::Win32::UI::WindowsAndMessaging::SetWindowLongPtrW(hwnd, GWLP_USERDATA, value)
    };
}

#[cfg(target_pointer_width = "32")]
unsafe fn user_data(hwnd: HWND) -> isize {
    unsafe { windows::Win32::UI::WindowsAndMessaging::GetWindowLongW(hwnd, GWLP_USERDATA) as isize }
}

#[cfg(target_pointer_width = "32")]
unsafe fn set_user_data(hwnd: HWND, value: isize) {
    unsafe {
        windows::Win32::UI::WindowsAndMessaging::SetWindowLongW(hwnd, GWLP_USERDATA, value as i32)
    };
}

/// Dispatches tasks through a hidden message-only window of the main thread.
///
/// Must be created on the thread that runs the host's message loop. Scheduling posts `WM_NULL`
/// to the window; the window procedure drains the queue when the loop delivers the message.
pub struct Win32Dispatcher {
    main_thread: SystemThreadId,
    // HWND wraps a raw pointer and is not Send, keep the address instead.
    hwnd: isize,
    queue: Arc<TaskQueue>,
}

impl Win32Dispatcher {
    /// Creates the message window on the calling thread, which becomes the main thread.
    pub fn new() -> windows::core::Result<Self> {
        let instance = unsafe { GetModuleHandleW(None)? };

        let window_class = WNDCLASSW {
            lpfnWndProc: Some(wnd_proc),
            hInstance: instance.into(),
            lpszClassName: WINDOW_CLASS_NAME,
            ..Default::default()
        };
        // Fails with ERROR_CLASS_ALREADY_EXISTS for every dispatcher after the first one.
        unsafe { RegisterClassW(&window_class) };

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                WINDOW_CLASS_NAME,
                PCWSTR::null(),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                Some(HWND_MESSAGE),
                None,
                Some(instance.into()),
                None,
            )?
        };

        let queue = Arc::new(TaskQueue::new());
        // Released when the window receives WM_NCDESTROY.
        let queue_ptr = Arc::into_raw(queue.clone());
        unsafe { set_user_data(hwnd, queue_ptr as isize) };

        log::debug!("Created main thread dispatcher window {:?}", hwnd.0);

        Ok(Self { main_thread: SystemThreadId::current(), hwnd: hwnd.0 as isize, queue })
    }

    fn hwnd(&self) -> HWND {
        HWND(self.hwnd as *mut c_void)
    }
}

impl MainThreadDispatcher for Win32Dispatcher {
    fn main_thread_id(&self) -> SystemThreadId {
        self.main_thread
    }

    fn schedule(&self, task: Task) -> Result<(), DispatchError> {
        self.queue.push(task)?;
        if let Err(err) = unsafe { PostMessageW(Some(self.hwnd()), WM_NULL, WPARAM(0), LPARAM(0)) }
        {
            log::warn!("Failed to wake up the main thread: {err}");
        }
        Ok(())
    }
}

impl Drop for Win32Dispatcher {
    fn drop(&mut self) {
        self.queue.close();
        let hwnd = self.hwnd();
        let result = if self.is_main_thread() {
            unsafe { DestroyWindow(hwnd) }
        } else {
            // Only the owning thread may destroy the window. DefWindowProc handles WM_CLOSE
            // by calling DestroyWindow on that thread.
            unsafe { PostMessageW(Some(hwnd), WM_CLOSE, WPARAM(0), LPARAM(0)) }
        };
        if let Err(err) = result {
            log::warn!("Failed to destroy the main thread dispatcher window: {err}");
        }
    }
}

unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    message: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let queue = unsafe { user_data(hwnd) } as *const TaskQueue;
    if !queue.is_null() {
        match message {
            WM_NULL => {
                unsafe { &*queue }.drain();
            }
            WM_NCDESTROY => {
                unsafe { set_user_data(hwnd, 0) };
                drop(unsafe { Arc::from_raw(queue) });
            }
            _ => {}
        }
    }
    unsafe { DefWindowProcW(hwnd, message, wparam, lparam) }
}
