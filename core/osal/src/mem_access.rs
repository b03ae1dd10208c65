//! Cache bracketing for memory shared with other cores and with DMA engines.
//!
//! A driver calls a `begin` function before reading memory that another core or a peripheral may have written, and
//! the matching `end` function after writing memory that another core or a peripheral will read. Cache maintenance
//! runs with interrupts masked so an interrupt handler cannot dirty the lines in between.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use osal_critical_section::SingleCoreGuard;
use osal_platform::{CacheMaintenance, InterruptControl};

/// Invalidates the cached copy of `[addr, addr + size)` so that the following reads observe memory.
pub fn begin_access<P: InterruptControl + CacheMaintenance + ?Sized>(platform: &P, addr: usize, size: usize) {
    if size == 0 {
        return;
    }
    log::trace!("begin access {addr:#x}+{size:#x}");
    let _masked = SingleCoreGuard::enter(platform);
    platform.invalidate(addr, size);
}

/// Writes `[addr, addr + size)` back to memory and waits for the writes to complete.
pub fn end_access<P: InterruptControl + CacheMaintenance + ?Sized>(platform: &P, addr: usize, size: usize) {
    log::trace!("end access {addr:#x}+{size:#x}");
    let _masked = SingleCoreGuard::enter(platform);
    if size != 0 {
        platform.writeback(addr, size);
    }
    platform.memory_fence();
}

/// Prepares a descriptor for reading. Descriptors in core-local memory need no maintenance.
pub fn begin_descriptor_access<P: InterruptControl + CacheMaintenance + ?Sized>(
    platform: &P,
    shared: bool,
    addr: usize,
    size: usize,
) {
    if shared {
        begin_access(platform, addr, size);
    }
}

/// Publishes a descriptor before it is pushed to a hardware queue.
///
/// The fence is always issued: even a descriptor in local memory is read through its global alias by the queue
/// manager, and all writes to it must have landed first.
pub fn end_descriptor_access<P: InterruptControl + CacheMaintenance + ?Sized>(
    platform: &P,
    shared: bool,
    addr: usize,
    size: usize,
) {
    if shared {
        end_access(platform, addr, size);
    } else {
        platform.memory_fence();
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use mockall::{predicate::eq, Sequence};
    use osal_platform::{
        sim::{CacheOps, SemaphoreBank, SimulatedCore},
        InterruptState,
    };

    mockall::mock! {
        Core {}
        impl InterruptControl for Core {
            fn disable_interrupts(&self) -> InterruptState;
            fn restore_interrupts(&self, state: InterruptState);
        }
        impl CacheMaintenance for Core {
            fn invalidate(&self, addr: usize, size: usize);
            fn writeback(&self, addr: usize, size: usize);
            fn memory_fence(&self);
        }
    }

    #[test]
    fn begin_access_should_invalidate_with_interrupts_masked() {
        let mut seq = Sequence::new();
        let mut core = MockCore::new();
        core.expect_disable_interrupts().once().in_sequence(&mut seq).returning(|| InterruptState::new(true));
        core.expect_invalidate().with(eq(0x1080_0000), eq(256)).once().in_sequence(&mut seq).return_const(());
        core.expect_restore_interrupts()
            .with(eq(InterruptState::new(true)))
            .once()
            .in_sequence(&mut seq)
            .return_const(());
        core.expect_writeback().never();
        core.expect_memory_fence().never();

        begin_access(&core, 0x1080_0000, 256);
    }

    #[test]
    fn end_access_should_write_back_then_fence_with_interrupts_masked() {
        let mut seq = Sequence::new();
        let mut core = MockCore::new();
        core.expect_disable_interrupts().once().in_sequence(&mut seq).returning(|| InterruptState::new(false));
        core.expect_writeback().with(eq(0x0c00_0040), eq(64)).once().in_sequence(&mut seq).return_const(());
        core.expect_memory_fence().once().in_sequence(&mut seq).return_const(());
        core.expect_restore_interrupts()
            .with(eq(InterruptState::new(false)))
            .once()
            .in_sequence(&mut seq)
            .return_const(());
        core.expect_invalidate().never();

        end_access(&core, 0x0c00_0040, 64);
    }

    #[test]
    fn zero_size_access_should_only_fence() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(0, &bank);

        begin_access(&core, 0x1000, 0);
        end_access(&core, 0x1000, 0);

        assert_eq!(core.cache_ops(), CacheOps { invalidations: 0, writebacks: 0, fences: 1 });
        assert!(core.interrupts_enabled());
    }

    #[test]
    fn local_descriptors_should_only_be_fenced() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(1, &bank);

        begin_descriptor_access(&core, false, 0x0080_0000, 64);
        end_descriptor_access(&core, false, 0x0080_0000, 64);

        assert_eq!(core.cache_ops(), CacheOps { invalidations: 0, writebacks: 0, fences: 1 });
    }

    #[test]
    fn shared_descriptors_should_be_bracketed() {
        let bank = SemaphoreBank::new();
        let core = SimulatedCore::new(1, &bank);

        begin_descriptor_access(&core, true, 0x0c00_0000, 64);
        end_descriptor_access(&core, true, 0x0c00_0000, 64);

        assert_eq!(core.cache_ops(), CacheOps { invalidations: 1, writebacks: 1, fences: 1 });
        assert!(core.interrupts_enabled());
    }
}
