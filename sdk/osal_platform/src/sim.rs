//! Simulated multicore platform.
//!
//! Provides a [SemaphoreBank] shared by any number of [SimulatedCore]s so that cross-core mutual exclusion can be
//! exercised on a host without multicore hardware. Each simulated core keeps its own interrupt-enable flag and counts
//! the cache maintenance operations issued on it.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::{
    alloc::Layout,
    ptr::NonNull,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use crate::{
    address::AddressTranslation,
    cache::CacheMaintenance,
    heap::{BackingAllocator, SystemHeap},
    hw_semaphore::{HwSemaphore, SemaphoreId},
    interrupts::{InterruptControl, InterruptState},
};

/// Number of semaphores in a simulated bank.
pub const SIM_SEMAPHORE_COUNT: usize = 32;

/// A bank of hardware semaphores shared between simulated cores.
#[derive(Debug)]
pub struct SemaphoreBank {
    locks: [AtomicBool; SIM_SEMAPHORE_COUNT],
    acquisitions: AtomicUsize,
}

impl SemaphoreBank {
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const FREE: AtomicBool = AtomicBool::new(false);
        Self { locks: [FREE; SIM_SEMAPHORE_COUNT], acquisitions: AtomicUsize::new(0) }
    }

    /// Returns true if some core currently holds the semaphore.
    pub fn is_held(&self, id: SemaphoreId) -> bool {
        self.locks[id.index()].load(Ordering::Acquire)
    }

    /// Number of successful acquisitions across all cores.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::Relaxed)
    }
}

impl Default for SemaphoreBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the cache maintenance calls issued on a simulated core.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheOps {
    pub invalidations: usize,
    pub writebacks: usize,
    pub fences: usize,
}

/// One simulated core attached to a [SemaphoreBank].
#[derive(Debug)]
pub struct SimulatedCore<'a> {
    core_id: usize,
    bank: &'a SemaphoreBank,
    heap: SystemHeap,
    interrupts_enabled: AtomicBool,
    invalidations: AtomicUsize,
    writebacks: AtomicUsize,
    fences: AtomicUsize,
}

impl<'a> SimulatedCore<'a> {
    /// Creates a core with interrupts enabled.
    pub const fn new(core_id: usize, bank: &'a SemaphoreBank) -> Self {
        Self {
            core_id,
            bank,
            heap: SystemHeap::new(),
            interrupts_enabled: AtomicBool::new(true),
            invalidations: AtomicUsize::new(0),
            writebacks: AtomicUsize::new(0),
            fences: AtomicUsize::new(0),
        }
    }

    pub fn core_id(&self) -> usize {
        self.core_id
    }

    pub fn bank(&self) -> &'a SemaphoreBank {
        self.bank
    }

    /// Returns true if interrupt delivery is currently enabled on this core.
    pub fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled.load(Ordering::SeqCst)
    }

    pub fn cache_ops(&self) -> CacheOps {
        CacheOps {
            invalidations: self.invalidations.load(Ordering::Relaxed),
            writebacks: self.writebacks.load(Ordering::Relaxed),
            fences: self.fences.load(Ordering::Relaxed),
        }
    }
}

impl InterruptControl for SimulatedCore<'_> {
    fn disable_interrupts(&self) -> InterruptState {
        InterruptState::new(self.interrupts_enabled.swap(false, Ordering::SeqCst))
    }

    fn restore_interrupts(&self, state: InterruptState) {
        if state.were_enabled() {
            self.interrupts_enabled.store(true, Ordering::SeqCst);
        }
    }
}

impl HwSemaphore for SimulatedCore<'_> {
    fn try_acquire(&self, id: SemaphoreId) -> bool {
        let acquired =
            self.bank.locks[id.index()].compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed).is_ok();
        if acquired {
            self.bank.acquisitions.fetch_add(1, Ordering::Relaxed);
        }
        acquired
    }

    fn release(&self, id: SemaphoreId) {
        self.bank.locks[id.index()].store(false, Ordering::Release);
    }

    fn count(&self) -> usize {
        SIM_SEMAPHORE_COUNT
    }
}

impl CacheMaintenance for SimulatedCore<'_> {
    fn invalidate(&self, _addr: usize, _size: usize) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    fn writeback(&self, _addr: usize, _size: usize) {
        self.writebacks.fetch_add(1, Ordering::Relaxed);
    }

    fn memory_fence(&self) {
        core::sync::atomic::fence(Ordering::SeqCst);
        self.fences.fetch_add(1, Ordering::Relaxed);
    }
}

impl BackingAllocator for SimulatedCore<'_> {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.heap.alloc(layout)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.heap.free(ptr, layout) }
    }
}

// Host memory is directly addressable by every simulated core.
impl AddressTranslation for SimulatedCore<'_> {
    fn local_to_global(&self, local: usize) -> usize {
        local
    }
}
