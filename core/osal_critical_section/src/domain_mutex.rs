//! Data guarded by a critical section domain.
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

use osal_platform::{HwSemaphore, InterruptControl};

use crate::{
    critical_sections::CriticalSections,
    domain::{Domain, DomainState},
    guard::DomainGuard,
};

/// Shared state that may only be touched while holding the layered critical section of its [Domain].
///
/// The hardware semaphore provides exclusion between cores. An additional in-memory flag catches callers that reach
/// the data through a [CriticalSections] with a different semaphore assignment, or that try to lock it re-entrantly.
pub struct DomainMutex<T: ?Sized> {
    domain: Domain,
    held: AtomicBool,
    data: UnsafeCell<T>,
}

/// Wrapper for guarded data, which can be accessed by Deref or DerefMut on this object.
pub struct DomainMutexGuard<'a, P: InterruptControl + HwSemaphore + ?Sized, T: ?Sized + 'a> {
    // Dropped after `Drop::drop` has cleared `held`.
    section: DomainGuard<'a, P>,
    held: &'a AtomicBool,
    data: *mut T,
}

unsafe impl<T: ?Sized + Send> Sync for DomainMutex<T> {}
unsafe impl<T: ?Sized + Send> Send for DomainMutex<T> {}

impl<T> DomainMutex<T> {
    pub const fn new(domain: Domain, data: T) -> Self {
        Self { domain, held: AtomicBool::new(false), data: UnsafeCell::new(data) }
    }
}

impl<T: ?Sized> DomainMutex<T> {
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Enters the domain's critical section and returns a guard for the data.
    ///
    /// Spins while another core holds the domain. Panics if the data is already held once the domain's critical
    /// section has been entered, which means the lock was taken re-entrantly or through a mismatched configuration.
    pub fn lock<'a, P: InterruptControl + HwSemaphore + ?Sized>(
        &'a self,
        sections: &CriticalSections<'a, P>,
    ) -> DomainMutexGuard<'a, P, T> {
        let section = sections.enter(self.domain);
        if self.held.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed).is_err() {
            panic!("{} domain data locked without exclusive access to its semaphore.", self.domain);
        }
        DomainMutexGuard { section, held: &self.held, data: self.data.get() }
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Returns [DomainState::LockedGlobalAndLocal] while some core holds a guard for the data, otherwise
    /// [DomainState::Unlocked].
    pub fn state(&self) -> DomainState {
        if self.held.load(Ordering::Acquire) {
            DomainState::LockedGlobalAndLocal
        } else {
            DomainState::Unlocked
        }
    }
}

impl<T: ?Sized> fmt::Debug for DomainMutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DomainMutex").field("domain", &self.domain).field("held", &self.held).finish_non_exhaustive()
    }
}

impl<P: InterruptControl + HwSemaphore + ?Sized, T: ?Sized> DomainMutexGuard<'_, P, T> {
    pub fn domain(&self) -> Domain {
        self.section.domain()
    }
}

impl<P: InterruptControl + HwSemaphore + ?Sized, T: ?Sized> Deref for DomainMutexGuard<'_, P, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // Safety: data is only accessible while the domain's critical section is held.
        unsafe { &*self.data }
    }
}

impl<P: InterruptControl + HwSemaphore + ?Sized, T: ?Sized> DerefMut for DomainMutexGuard<'_, P, T> {
    fn deref_mut(&mut self) -> &mut T {
        // Safety: data is only accessible while the domain's critical section is held.
        unsafe { &mut *self.data }
    }
}

impl<P: InterruptControl + HwSemaphore + ?Sized, T: ?Sized + fmt::Debug> fmt::Debug for DomainMutexGuard<'_, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<P: InterruptControl + HwSemaphore + ?Sized, T: ?Sized> Drop for DomainMutexGuard<'_, P, T> {
    fn drop(&mut self) {
        self.held.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::domain::DomainConfig;
    use osal_platform::sim::{SemaphoreBank, SimulatedCore};
    use std::{sync::Barrier, thread, vec::Vec};

    #[test]
    fn lock_should_hold_domain_semaphore_and_mask_interrupts() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(0, &bank);
        let sections = CriticalSections::new(&core, DomainConfig::default()).unwrap();
        let state = DomainMutex::new(Domain::Driver, 0_u32);
        assert_eq!(state.state(), DomainState::Unlocked);

        {
            let mut guard = state.lock(&sections);
            assert_eq!(state.state(), DomainState::LockedGlobalAndLocal);
            assert_eq!(guard.domain(), Domain::Driver);
            assert!(bank.is_held(sections.semaphore(Domain::Driver)));
            assert!(!core.interrupts_enabled());
            *guard += 1;
        }

        assert!(!bank.is_held(sections.semaphore(Domain::Driver)));
        assert!(core.interrupts_enabled());
        assert_eq!(state.state(), DomainState::Unlocked);
        assert_eq!(*state.lock(&sections), 1);
    }

    #[test]
    fn mismatched_semaphore_assignment_should_panic() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(0, &bank);
        let sections = CriticalSections::new(&core, DomainConfig::default()).unwrap();
        let other = CriticalSections::new(
            &core,
            DomainConfig {
                cppi: osal_platform::SemaphoreId::new(10),
                qmss: osal_platform::SemaphoreId::new(11),
                driver: osal_platform::SemaphoreId::new(12),
            },
        )
        .unwrap();
        let state = DomainMutex::new(Domain::Qmss, ());

        let _guard = state.lock(&sections);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _second = state.lock(&other);
        }));
        assert!(result.is_err());
    }

    #[test]
    fn cores_contending_on_domain_should_serialize_updates() {
        const CORES: usize = 4;
        const ITERATIONS: usize = 500;

        static BANK: SemaphoreBank = SemaphoreBank::new();
        let counter = DomainMutex::new(Domain::Qmss, (0_usize, false));
        let barrier = Barrier::new(CORES);

        thread::scope(|s| {
            let handles: Vec<_> = (0..CORES)
                .map(|id| {
                    let counter = &counter;
                    let barrier = &barrier;
                    s.spawn(move || {
                        let core = SimulatedCore::new(id, &BANK);
                        let sections = CriticalSections::new(&core, DomainConfig::default()).unwrap();
                        barrier.wait();
                        for _ in 0..ITERATIONS {
                            let mut guard = counter.lock(&sections);
                            assert!(!guard.1, "another core is inside the qmss domain");
                            guard.1 = true;
                            guard.0 += 1;
                            thread::yield_now();
                            guard.1 = false;
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
        });

        let mut counter = counter;
        assert_eq!(counter.get_mut().0, CORES * ITERATIONS);
    }
}
