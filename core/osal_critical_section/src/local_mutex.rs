//! Interrupt masking mutex.
//!
//! [LocalMutex] guards data that is only ever touched by one core but may be reached from both thread and interrupt
//! context on that core. Locking masks interrupts for the lifetime of the guard.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::{
    cell::UnsafeCell,
    fmt,
    ops::{Deref, DerefMut},
    sync::atomic::{AtomicBool, Ordering},
};

use osal_platform::InterruptControl;

use crate::guard::SingleCoreGuard;

/// Used to guard data with interrupts masked on the current core.
pub struct LocalMutex<T: ?Sized> {
    lock: AtomicBool,
    name: &'static str,
    data: UnsafeCell<T>,
}

/// Wrapper for guarded data, which can be accessed by Deref or DerefMut on this object.
pub struct LocalGuard<'a, I: InterruptControl + ?Sized, T: ?Sized + 'a> {
    // Dropped after `Drop::drop` has released `lock`, so interrupts are restored last.
    _masked: SingleCoreGuard<'a, I>,
    lock: &'a AtomicBool,
    data: *mut T,
}

unsafe impl<T: ?Sized + Send> Sync for LocalMutex<T> {}
unsafe impl<T: ?Sized + Send> Send for LocalMutex<T> {}

impl<T> LocalMutex<T> {
    /// Instantiates a new LocalMutex with the given data object and name string.
    pub const fn new(data: T, name: &'static str) -> Self {
        Self { lock: AtomicBool::new(false), name, data: UnsafeCell::new(data) }
    }

    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> LocalMutex<T> {
    /// Masks interrupts and locks the LocalMutex.
    ///
    /// Lock reentrance is not supported; attempting to lock something already locked will panic.
    pub fn lock<'a, I: InterruptControl + ?Sized>(&'a self, interrupts: &'a I) -> LocalGuard<'a, I, T> {
        self.try_lock(interrupts).unwrap_or_else(|| panic!("Re-entrant locks for {:?} not permitted.", self.name))
    }

    /// Attempts to lock the LocalMutex. Interrupts are left as they were if the lock is already held.
    pub fn try_lock<'a, I: InterruptControl + ?Sized>(&'a self, interrupts: &'a I) -> Option<LocalGuard<'a, I, T>> {
        let masked = SingleCoreGuard::enter(interrupts);
        if self.lock.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed).is_ok() {
            Some(LocalGuard { _masked: masked, lock: &self.lock, data: self.data.get() })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the data. No locking is needed since the borrow is exclusive.
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: ?Sized> fmt::Debug for LocalMutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.lock.load(Ordering::Relaxed) {
            write!(f, "LocalMutex {{ name: {:?}, <locked> }}", self.name)
        } else {
            write!(f, "LocalMutex {{ name: {:?} }}", self.name)
        }
    }
}

impl<I: InterruptControl + ?Sized, T: ?Sized + fmt::Debug> fmt::Debug for LocalGuard<'_, I, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<I: InterruptControl + ?Sized, T: ?Sized + fmt::Display> fmt::Display for LocalGuard<'_, I, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

impl<I: InterruptControl + ?Sized, T: ?Sized> Deref for LocalGuard<'_, I, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // Safety: data is only accessible through the lock, which is held for the lifetime of the guard.
        unsafe { &*self.data }
    }
}

impl<I: InterruptControl + ?Sized, T: ?Sized> DerefMut for LocalGuard<'_, I, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: data is only accessible through the lock, which is held for the lifetime of the guard.
        unsafe { &mut *self.data }
    }
}

impl<I: InterruptControl + ?Sized, T: ?Sized> Drop for LocalGuard<'_, I, T> {
    fn drop(&mut self) {
        self.lock.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::LocalMutex;
    use osal_platform::sim::{SemaphoreBank, SimulatedCore};
    use std::{format, string::String};

    #[test]
    fn local_mutex_should_mask_interrupts_while_locked() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(0, &bank);
        let mutex = LocalMutex::new(1_usize, "test_lock");

        let mut guard = mutex.lock(&core);
        assert!(!core.interrupts_enabled());
        *guard = 2;
        drop(guard);

        assert!(core.interrupts_enabled());
        assert_eq!(*mutex.lock(&core), 2);
    }

    #[test]
    fn try_lock_should_fail_and_leave_interrupts_masked_by_holder() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(0, &bank);
        let mutex = LocalMutex::new(0_u32, "test_lock");

        let guard = mutex.lock(&core);
        assert!(mutex.try_lock(&core).is_none());
        assert!(!core.interrupts_enabled());
        drop(guard);
        assert!(core.interrupts_enabled());
    }

    #[test]
    #[should_panic(expected = "Re-entrant locks")]
    fn relocking_should_panic() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(0, &bank);
        let mutex = LocalMutex::new(0_u32, "test_lock");

        let _guard = mutex.lock(&core);
        let _again = mutex.lock(&core);
    }

    #[test]
    fn local_mutex_and_guard_should_support_debug_and_display() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(0, &bank);
        let mutex = LocalMutex::new(7_u32, "test_lock");

        assert_eq!(format!("{mutex:?}"), "LocalMutex { name: \"test_lock\" }");
        let guard = mutex.lock(&core);
        assert_eq!(format!("{mutex:?}"), "LocalMutex { name: \"test_lock\", <locked> }");
        let rendered: String = format!("{guard:?} {guard}");
        assert_eq!(rendered, "7 7");
    }
}
