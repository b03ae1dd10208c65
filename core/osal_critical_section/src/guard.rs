//! Scoped guards for single-core and cross-core exclusion.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

use osal_platform::{HwSemaphore, InterruptControl, InterruptState, SemaphoreId};

use crate::domain::{Domain, DomainState};

/// Interrupts are masked on the current core for as long as this guard lives.
///
/// Dropping the guard restores the interrupt state captured on entry, so nested guards re-enable interrupts only when
/// the outermost one is dropped.
#[must_use = "dropping the guard restores interrupts immediately"]
pub struct SingleCoreGuard<'a, I: InterruptControl + ?Sized> {
    interrupts: &'a I,
    prior: InterruptState,
}

impl<'a, I: InterruptControl + ?Sized> SingleCoreGuard<'a, I> {
    /// Masks interrupts on the calling core.
    pub fn enter(interrupts: &'a I) -> Self {
        let prior = interrupts.disable_interrupts();
        Self { interrupts, prior }
    }

    /// The interrupt state that will be restored when this guard is dropped.
    pub fn prior_state(&self) -> InterruptState {
        self.prior
    }

    /// Leaves the critical section.
    pub fn exit(self) {}
}

impl<I: InterruptControl + ?Sized> Drop for SingleCoreGuard<'_, I> {
    fn drop(&mut self) {
        self.interrupts.restore_interrupts(self.prior);
    }
}

impl<I: InterruptControl + ?Sized> fmt::Debug for SingleCoreGuard<'_, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleCoreGuard").field("prior", &self.prior).finish()
    }
}

/// A hardware semaphore is held by this core for as long as this guard lives.
#[must_use = "dropping the guard releases the semaphore immediately"]
pub struct CrossCoreGuard<'a, S: HwSemaphore + ?Sized> {
    semaphores: &'a S,
    id: SemaphoreId,
}

impl<'a, S: HwSemaphore + ?Sized> CrossCoreGuard<'a, S> {
    /// Spins until the semaphore is acquired.
    ///
    /// There is no timeout and no fairness: if the holder never releases the semaphore this never returns.
    pub fn enter(semaphores: &'a S, id: SemaphoreId) -> Self {
        while !semaphores.try_acquire(id) {
            core::hint::spin_loop();
        }
        Self { semaphores, id }
    }

    /// Makes a single acquisition attempt.
    pub fn try_enter(semaphores: &'a S, id: SemaphoreId) -> Option<Self> {
        semaphores.try_acquire(id).then(|| Self { semaphores, id })
    }

    pub fn semaphore(&self) -> SemaphoreId {
        self.id
    }

    pub fn state(&self) -> DomainState {
        DomainState::LockedGlobal
    }

    /// Leaves the critical section.
    pub fn exit(self) {}
}

impl<S: HwSemaphore + ?Sized> Drop for CrossCoreGuard<'_, S> {
    fn drop(&mut self) {
        self.semaphores.release(self.id);
    }
}

impl<S: HwSemaphore + ?Sized> fmt::Debug for CrossCoreGuard<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrossCoreGuard").field("id", &self.id).finish()
    }
}

/// Holds a domain's hardware semaphore with interrupts masked on the current core.
///
/// Acquisition takes the semaphore before masking interrupts. Release runs in the reverse order.
#[must_use = "dropping the guard leaves the critical section immediately"]
pub struct DomainGuard<'a, P: InterruptControl + HwSemaphore + ?Sized> {
    // Fields drop in declaration order: interrupts are restored before the semaphore is released.
    local: SingleCoreGuard<'a, P>,
    global: CrossCoreGuard<'a, P>,
    domain: Domain,
}

impl<'a, P: InterruptControl + HwSemaphore + ?Sized> DomainGuard<'a, P> {
    pub(crate) fn enter(platform: &'a P, domain: Domain, id: SemaphoreId) -> Self {
        let global = CrossCoreGuard::enter(platform, id);
        let local = SingleCoreGuard::enter(platform);
        Self { local, global, domain }
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn semaphore(&self) -> SemaphoreId {
        self.global.semaphore()
    }

    pub fn prior_interrupt_state(&self) -> InterruptState {
        self.local.prior_state()
    }

    pub fn state(&self) -> DomainState {
        DomainState::LockedGlobalAndLocal
    }

    /// Leaves the critical section.
    pub fn exit(self) {}
}

impl<P: InterruptControl + HwSemaphore + ?Sized> fmt::Debug for DomainGuard<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainGuard").field("domain", &self.domain).field("id", &self.global.id).finish()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use mockall::{predicate::eq, Sequence};
    use osal_platform::{hw_semaphore::MockHwSemaphore, interrupts::MockInterruptControl};
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    };

    mockall::mock! {
        Platform {}
        impl InterruptControl for Platform {
            fn disable_interrupts(&self) -> InterruptState;
            fn restore_interrupts(&self, state: InterruptState);
        }
        impl HwSemaphore for Platform {
            fn try_acquire(&self, id: SemaphoreId) -> bool;
            fn release(&self, id: SemaphoreId);
            fn count(&self) -> usize;
        }
    }

    #[test]
    fn single_core_guard_should_restore_prior_state() {
        let mut interrupts = MockInterruptControl::new();
        interrupts.expect_disable_interrupts().once().returning(|| InterruptState::new(true));
        interrupts.expect_restore_interrupts().with(eq(InterruptState::new(true))).once().return_const(());

        let guard = SingleCoreGuard::enter(&interrupts);
        assert!(guard.prior_state().were_enabled());
        guard.exit();
    }

    #[test]
    fn cross_core_guard_should_spin_until_acquired() {
        let mut semaphores = MockHwSemaphore::new();
        let mut attempts = 0;
        semaphores.expect_try_acquire().with(eq(SemaphoreId::new(3))).times(4).returning(move |_| {
            attempts += 1;
            attempts == 4
        });
        semaphores.expect_release().with(eq(SemaphoreId::new(3))).once().return_const(());

        let guard = CrossCoreGuard::enter(&semaphores, SemaphoreId::new(3));
        assert_eq!(guard.state(), DomainState::LockedGlobal);
        drop(guard);
    }

    #[test]
    fn try_enter_should_not_release_when_acquisition_fails() {
        let mut semaphores = MockHwSemaphore::new();
        semaphores.expect_try_acquire().once().return_const(false);
        semaphores.expect_release().never();

        assert!(CrossCoreGuard::try_enter(&semaphores, SemaphoreId::new(1)).is_none());
    }

    #[test]
    fn domain_guard_should_lock_global_then_local_and_unlock_in_reverse() {
        let mut platform = MockPlatform::new();
        let mut seq = Sequence::new();
        let id = SemaphoreId::new(2);

        platform.expect_try_acquire().with(eq(id)).once().in_sequence(&mut seq).return_const(true);
        platform.expect_disable_interrupts().once().in_sequence(&mut seq).returning(|| InterruptState::new(true));
        platform.expect_restore_interrupts().once().in_sequence(&mut seq).return_const(());
        platform.expect_release().with(eq(id)).once().in_sequence(&mut seq).return_const(());

        let guard = DomainGuard::enter(&platform, Domain::Qmss, id);
        assert_eq!(guard.domain(), Domain::Qmss);
        assert_eq!(guard.semaphore(), id);
        assert_eq!(guard.state(), DomainState::LockedGlobalAndLocal);
        guard.exit();
    }

    #[test]
    fn domain_guard_should_not_mask_interrupts_while_spinning() {
        let mut platform = MockPlatform::new();
        let acquired = Arc::new(AtomicBool::new(false));

        let mut attempts = 0;
        let on_acquire = acquired.clone();
        platform.expect_try_acquire().times(4).returning(move |_| {
            attempts += 1;
            on_acquire.store(attempts == 4, Ordering::SeqCst);
            attempts == 4
        });
        let on_disable = acquired.clone();
        platform.expect_disable_interrupts().once().returning(move || {
            assert!(on_disable.load(Ordering::SeqCst), "interrupts masked before the semaphore was held");
            InterruptState::new(false)
        });
        platform.expect_restore_interrupts().with(eq(InterruptState::new(false))).once().return_const(());
        platform.expect_release().once().return_const(());

        let guard = DomainGuard::enter(&platform, Domain::Cppi, SemaphoreId::new(1));
        assert!(!guard.prior_interrupt_state().were_enabled());
    }
}
