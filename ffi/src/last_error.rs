//! Per-thread storage for the message of the most recent failure.

use std::cell::RefCell;
use std::ffi::c_char;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(message: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Message of the last failed call on this thread.
pub fn last_error_message() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Copy the last error message of this thread into `buf`.
///
/// Writes at most `len - 1` bytes followed by a NUL terminator and
/// returns the full message length in bytes, so a caller can retry with
/// a larger buffer. Returns 0 when the last call succeeded.
///
/// # Safety
///
/// `buf` must be null or point to `len` writable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fastembed_last_error(buf: *mut c_char, len: usize) -> usize {
    let Some(message) = last_error_message() else {
        return 0;
    };
    if !buf.is_null() && len > 0 {
        let copied = message.len().min(len - 1);
        // SAFETY: caller guarantees `buf` holds `len` bytes and `copied < len`.
        unsafe {
            std::ptr::copy_nonoverlapping(message.as_ptr().cast::<c_char>(), buf, copied);
            *buf.add(copied) = 0;
        }
    }
    message.len()
}
