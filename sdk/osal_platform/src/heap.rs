//! Backing Heap Module
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::{alloc::Layout, ptr::NonNull};

#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

/// A general purpose allocator that backs fixed arenas such as the buffer pool.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait BackingAllocator {
    /// Allocates a block described by `layout`. Returns `None` if the heap is exhausted.
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Returns a block to the heap.
    ///
    /// ## Safety
    ///
    /// `ptr` must have been returned by [BackingAllocator::alloc] on this allocator with the same `layout`, and must
    /// not be used afterwards.
    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout);
}

/// [BackingAllocator] that forwards to the global allocator.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemHeap;

impl SystemHeap {
    pub const fn new() -> Self {
        Self
    }
}

impl BackingAllocator for SystemHeap {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return None;
        }
        // Safety: layout has a non-zero size.
        NonNull::new(unsafe { alloc::alloc::alloc(layout) })
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}
