//! Board platform composition.
//!
//! [BoardPlatform] assembles one implementation of each capability into a type that satisfies
//! [Platform](osal_platform::Platform). By default it uses the backends selected for the compilation target, the
//! global allocator and the KeyStone address window; any part can be replaced with the `with_*` functions.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::{alloc::Layout, ptr::NonNull};

use osal_platform::{
    address::KeystoneWindow, cache::Cache, heap::SystemHeap, interrupts::Interrupts, AddressTranslation,
    BackingAllocator, CacheMaintenance, HwSemaphore, InterruptControl, InterruptState, SemaphoreId,
};

/// The capabilities of one core on a board.
#[derive(Debug)]
pub struct BoardPlatform<S, I = Interrupts, C = Cache, H = SystemHeap, T = KeystoneWindow> {
    semaphores: S,
    interrupts: I,
    cache: C,
    heap: H,
    translation: T,
}

impl<S: HwSemaphore> BoardPlatform<S> {
    /// Creates the platform for the core whose address window is `window`, using the target's default backends.
    pub const fn new(semaphores: S, window: KeystoneWindow) -> Self {
        Self {
            semaphores,
            interrupts: Interrupts::new(),
            cache: Cache::new(),
            heap: SystemHeap::new(),
            translation: window,
        }
    }
}

impl<S, I, C, H, T> BoardPlatform<S, I, C, H, T> {
    /// Replaces the interrupt controller.
    pub fn with_interrupts<I2: InterruptControl>(self, interrupts: I2) -> BoardPlatform<S, I2, C, H, T> {
        BoardPlatform {
            semaphores: self.semaphores,
            interrupts,
            cache: self.cache,
            heap: self.heap,
            translation: self.translation,
        }
    }

    /// Replaces the cache maintenance implementation.
    pub fn with_cache<C2: CacheMaintenance>(self, cache: C2) -> BoardPlatform<S, I, C2, H, T> {
        BoardPlatform {
            semaphores: self.semaphores,
            interrupts: self.interrupts,
            cache,
            heap: self.heap,
            translation: self.translation,
        }
    }

    /// Replaces the backing heap.
    pub fn with_heap<H2: BackingAllocator>(self, heap: H2) -> BoardPlatform<S, I, C, H2, T> {
        BoardPlatform {
            semaphores: self.semaphores,
            interrupts: self.interrupts,
            cache: self.cache,
            heap,
            translation: self.translation,
        }
    }

    /// Replaces the address translation.
    pub fn with_translation<T2: AddressTranslation>(self, translation: T2) -> BoardPlatform<S, I, C, H, T2> {
        BoardPlatform {
            semaphores: self.semaphores,
            interrupts: self.interrupts,
            cache: self.cache,
            heap: self.heap,
            translation,
        }
    }

    pub fn semaphores(&self) -> &S {
        &self.semaphores
    }
}

impl<S, I: InterruptControl, C, H, T> InterruptControl for BoardPlatform<S, I, C, H, T> {
    fn disable_interrupts(&self) -> InterruptState {
        self.interrupts.disable_interrupts()
    }

    fn restore_interrupts(&self, state: InterruptState) {
        self.interrupts.restore_interrupts(state)
    }
}

impl<S: HwSemaphore, I, C, H, T> HwSemaphore for BoardPlatform<S, I, C, H, T> {
    fn try_acquire(&self, id: SemaphoreId) -> bool {
        self.semaphores.try_acquire(id)
    }

    fn release(&self, id: SemaphoreId) {
        self.semaphores.release(id)
    }

    fn count(&self) -> usize {
        self.semaphores.count()
    }
}

impl<S, I, C: CacheMaintenance, H, T> CacheMaintenance for BoardPlatform<S, I, C, H, T> {
    fn invalidate(&self, addr: usize, size: usize) {
        self.cache.invalidate(addr, size)
    }

    fn writeback(&self, addr: usize, size: usize) {
        self.cache.writeback(addr, size)
    }

    fn memory_fence(&self) {
        self.cache.memory_fence()
    }
}

impl<S, I, C, H: BackingAllocator, T> BackingAllocator for BoardPlatform<S, I, C, H, T> {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        self.heap.alloc(layout)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.heap.free(ptr, layout) }
    }
}

impl<S, I, C, H, T: AddressTranslation> AddressTranslation for BoardPlatform<S, I, C, H, T> {
    fn local_to_global(&self, local: usize) -> usize {
        self.translation.local_to_global(local)
    }
}
