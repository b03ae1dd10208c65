//! Hardware Semaphore Module
//!
//! Multicore SoCs arbitrate shared resources with a block of hardware semaphores visible to every core. A semaphore
//! is acquired by a single read of its direct-access register and released by a write; the hardware guarantees that
//! at most one core observes a successful acquisition until the next release. There is no ownership tracking: any
//! core may release any semaphore.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::ptr;

#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

/// Index of a hardware semaphore within the platform's semaphore block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SemaphoreId(u8);

impl SemaphoreId {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Access to hardware-arbitrated semaphores shared by all cores.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait HwSemaphore {
    /// Makes a single attempt to acquire the semaphore. Returns true if this core now holds it.
    fn try_acquire(&self, id: SemaphoreId) -> bool;

    /// Releases the semaphore unconditionally.
    fn release(&self, id: SemaphoreId);

    /// Number of semaphores provided by the platform.
    fn count(&self) -> usize;
}

/// Memory mapped semaphore block with one direct-access register per semaphore.
///
/// Reading a direct-access register returns 1 in bit 0 if the semaphore was free and has been granted to the reading
/// core. Writing 1 releases it.
#[derive(Debug)]
pub struct MmioSemaphoreBlock {
    base: usize,
    count: usize,
}

impl MmioSemaphoreBlock {
    /// Base address of the KeyStone semaphore2 module.
    pub const KEYSTONE_BASE: usize = 0x0264_0000;
    /// Number of semaphores in the KeyStone semaphore2 module.
    pub const KEYSTONE_COUNT: usize = 64;

    const DIRECT_OFFSET: usize = 0x100;
    const GRANTED: u32 = 0x1;

    /// Creates an accessor for a semaphore block mapped at `base`.
    ///
    /// ## Safety
    ///
    /// - `base` must be the address of a semaphore block register window that remains mapped for the lifetime of the
    ///   returned object.
    /// - The window must contain at least `count` direct-access registers.
    pub const unsafe fn new(base: usize, count: usize) -> Self {
        Self { base, count }
    }

    fn direct_register(&self, id: SemaphoreId) -> *mut u32 {
        debug_assert!(id.index() < self.count, "semaphore {} out of range", id.index());
        (self.base + Self::DIRECT_OFFSET + id.index() * core::mem::size_of::<u32>()) as *mut u32
    }
}

impl HwSemaphore for MmioSemaphoreBlock {
    fn try_acquire(&self, id: SemaphoreId) -> bool {
        // Safety: the register window is valid per the contract of `new`.
        unsafe { ptr::read_volatile(self.direct_register(id)) & Self::GRANTED == Self::GRANTED }
    }

    fn release(&self, id: SemaphoreId) {
        // Safety: the register window is valid per the contract of `new`.
        unsafe { ptr::write_volatile(self.direct_register(id), Self::GRANTED) }
    }

    fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Enough registers to cover the direct-access window for 4 semaphores.
    const WINDOW_WORDS: usize = MmioSemaphoreBlock::DIRECT_OFFSET / 4 + 4;

    #[test]
    fn direct_register_read_of_one_means_granted() {
        let mut window = [0u32; WINDOW_WORDS];
        window[MmioSemaphoreBlock::DIRECT_OFFSET / 4 + 2] = 1;
        let block = unsafe { MmioSemaphoreBlock::new(window.as_mut_ptr() as usize, 4) };

        assert!(block.try_acquire(SemaphoreId::new(2)));
        assert!(!block.try_acquire(SemaphoreId::new(1)));
        assert_eq!(block.count(), 4);
    }

    #[test]
    fn release_should_write_one_to_direct_register() {
        let mut window = [0u32; WINDOW_WORDS];
        let block = unsafe { MmioSemaphoreBlock::new(window.as_mut_ptr() as usize, 4) };

        block.release(SemaphoreId::new(3));
        assert_eq!(window[MmioSemaphoreBlock::DIRECT_OFFSET / 4 + 3], 1);
        assert_eq!(window[MmioSemaphoreBlock::DIRECT_OFFSET / 4 + 2], 0);
    }
}
