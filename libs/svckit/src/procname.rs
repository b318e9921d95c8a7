// Copyright 2025 The Rustux Authors
//
// Use of this source code is governed by a MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT

//! Process name rewriting
//!
//! Rewrites the argument strings the loader placed in memory, which is what
//! `ps` and `/proc/<pid>/cmdline` show. Every argument keeps its original
//! byte length: longer values are truncated, shorter ones padded with spaces.
//!
//! Writes are not synchronized with readers of the process arguments
//! (including `std::env::args`); callers serialize those themselves.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcNameError {
    #[error("wrong size of arguments: got {got}, process has {expected}")]
    WrongSize { expected: usize, got: usize },

    #[error("wrong arguments: both values must be non-empty")]
    WrongArguments,

    #[error("process name rewriting is not supported on this platform")]
    Unsupported,
}

/// Overwrite a fixed-size argument slot with `new`
///
/// `new` is truncated to the slot length, and the rest of the slot is filled
/// with spaces.
pub fn fill_slot(slot: &mut [u8], new: &[u8]) {
    let n = new.len().min(slot.len());
    slot[..n].copy_from_slice(&new[..n]);
    slot[n..].fill(b' ');
}

/// Current content of every argument slot
pub fn args() -> Result<Vec<String>, ProcNameError> {
    let slots = sys::slots()?;
    Ok(slots.iter().map(|s| String::from_utf8_lossy(s.bytes()).into_owned()).collect())
}

/// Replace all process arguments
///
/// `new_args` must have exactly as many items as the process has arguments.
pub fn set<S: AsRef<str>>(new_args: &[S]) -> Result<(), ProcNameError> {
    let slots = sys::slots()?;

    if new_args.len() != slots.len() {
        return Err(ProcNameError::WrongSize { expected: slots.len(), got: new_args.len() });
    }

    let _guard = sys::lock();

    for (i, (slot, new)) in slots.iter().zip(new_args).enumerate() {
        let new = new.as_ref().as_bytes();
        if slot.bytes() != new {
            // SAFETY: writes are serialized by the lock held above
            unsafe { slot.write(new) };
            log::trace!("rewrote argument {}", i);
        }
    }

    Ok(())
}

/// Replace every argument equal to `from` with `to`
pub fn replace(from: &str, to: &str) -> Result<(), ProcNameError> {
    if from.is_empty() || to.is_empty() {
        return Err(ProcNameError::WrongArguments);
    }

    let slots = sys::slots()?;
    let _guard = sys::lock();

    for slot in slots.iter().filter(|s| s.bytes() == from.as_bytes()) {
        // SAFETY: writes are serialized by the lock held above
        unsafe { slot.write(to.as_bytes()) };
    }

    Ok(())
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
mod sys {
    use super::{fill_slot, ProcNameError};
    use libc::{c_char, c_int};
    use std::ptr;
    use std::sync::atomic::{AtomicIsize, AtomicPtr, Ordering};
    use once_cell::sync::OnceCell;
    use std::sync::{Mutex, MutexGuard};

    static ARGC: AtomicIsize = AtomicIsize::new(0);
    static ARGV: AtomicPtr<*mut c_char> = AtomicPtr::new(ptr::null_mut());
    static SLOTS: OnceCell<Vec<Slot>> = OnceCell::new();
    static WRITE_LOCK: Mutex<()> = Mutex::new(());

    // glibc passes argc, argv and envp to .init_array functions
    #[used]
    #[link_section = ".init_array.00099"]
    static CAPTURE_ARGV: extern "C" fn(c_int, *mut *mut c_char, *mut *mut c_char) = capture;

    extern "C" fn capture(argc: c_int, argv: *mut *mut c_char, _envp: *mut *mut c_char) {
        ARGC.store(argc as isize, Ordering::Relaxed);
        ARGV.store(argv, Ordering::Relaxed);
    }

    /// One argument string in loader memory, without its terminating zero
    pub struct Slot {
        ptr: *mut u8,
        len: usize,
    }

    // The pointers refer to process-lifetime memory owned by the loader
    unsafe impl Send for Slot {}
    unsafe impl Sync for Slot {}

    impl Slot {
        pub fn bytes(&self) -> &[u8] {
            // SAFETY: ptr..ptr+len is the argument region measured at first use
            unsafe { std::slice::from_raw_parts(self.ptr, self.len) }
        }

        /// # Safety
        ///
        /// No other thread may read or write argument memory concurrently.
        pub unsafe fn write(&self, new: &[u8]) {
            let region = std::slice::from_raw_parts_mut(self.ptr, self.len);
            fill_slot(region, new);
        }
    }

    pub fn slots() -> Result<&'static [Slot], ProcNameError> {
        let slots = SLOTS.get_or_init(|| {
            let argc = ARGC.load(Ordering::Relaxed).max(0) as usize;
            let argv = ARGV.load(Ordering::Relaxed);
            if argv.is_null() {
                return Vec::new();
            }

            let mut slots = Vec::with_capacity(argc);
            for i in 0..argc {
                // SAFETY: argv holds argc valid C strings for the process lifetime
                let ptr = unsafe { *argv.add(i) };
                if ptr.is_null() {
                    break;
                }
                let len = unsafe { libc::strlen(ptr) };
                slots.push(Slot { ptr: ptr as *mut u8, len });
            }
            slots
        });

        if slots.is_empty() {
            return Err(ProcNameError::Unsupported);
        }

        Ok(slots)
    }

    pub fn lock() -> MutexGuard<'static, ()> {
        WRITE_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
mod sys {
    use super::ProcNameError;

    pub struct Slot;

    impl Slot {
        pub fn bytes(&self) -> &[u8] {
            &[]
        }

        pub unsafe fn write(&self, _new: &[u8]) {}
    }

    pub fn slots() -> Result<&'static [Slot], ProcNameError> {
        Err(ProcNameError::Unsupported)
    }

    pub fn lock() {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_slot() {
        let mut slot = *b"abcdef";
        fill_slot(&mut slot, b"xy");
        assert_eq!(&slot, b"xy    ");

        fill_slot(&mut slot, b"0123456789");
        assert_eq!(&slot, b"012345");

        fill_slot(&mut slot, b"qwerty");
        assert_eq!(&slot, b"qwerty");

        let mut empty: [u8; 0] = [];
        fill_slot(&mut empty, b"abc");
    }

    #[test]
    fn test_wrong_arguments() {
        assert_eq!(replace("", "x"), Err(ProcNameError::WrongArguments));
        assert_eq!(replace("x", ""), Err(ProcNameError::WrongArguments));
    }

    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn test_rewrite_argv() {
        let original = args().unwrap();
        assert_eq!(original.len(), std::env::args_os().len());

        let mut too_many = original.clone();
        too_many.push("extra".to_string());
        let err = set(&too_many).unwrap_err();
        assert_eq!(
            err,
            ProcNameError::WrongSize { expected: original.len(), got: original.len() + 1 }
        );

        // Identical values leave memory untouched
        set(&original).unwrap();
        assert_eq!(args().unwrap(), original);

        let slot_len = original[0].len();
        replace(&original[0], "svckit").unwrap();

        let mut expected = "svckit".as_bytes()[..slot_len.min(6)].to_vec();
        expected.resize(slot_len, b' ');
        assert_eq!(args().unwrap()[0].as_bytes(), &expected[..]);

        replace("no-such-argument-value", "x").unwrap();

        set(&original).unwrap();
        assert_eq!(args().unwrap(), original);
    }

    #[cfg(not(all(target_os = "linux", target_env = "gnu")))]
    #[test]
    fn test_unsupported() {
        assert_eq!(args(), Err(ProcNameError::Unsupported));
        assert_eq!(set(&["a"]), Err(ProcNameError::Unsupported));
    }
}
