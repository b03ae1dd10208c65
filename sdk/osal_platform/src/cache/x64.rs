//! X64 cache module
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::arch::x86_64::{_mm_clflush, _mm_mfence};

use crate::{base::cache_lines, cache::CacheMaintenance};

/// X64 implementation of [CacheMaintenance].
///
/// X64 has no per-line invalidate-only instruction, so both directions use `clflush`, which writes back and evicts
/// each line.
#[derive(Debug, Default, Copy, Clone)]
pub struct CacheX64;

impl CacheX64 {
    pub const fn new() -> Self {
        Self
    }

    fn flush(addr: usize, size: usize) {
        for line in cache_lines(addr, size) {
            unsafe { _mm_clflush(line as *const u8) };
        }
        unsafe { _mm_mfence() };
    }
}

impl CacheMaintenance for CacheX64 {
    fn invalidate(&self, addr: usize, size: usize) {
        Self::flush(addr, size);
    }

    fn writeback(&self, addr: usize, size: usize) {
        Self::flush(addr, size);
    }

    fn memory_fence(&self) {
        unsafe { _mm_mfence() };
    }
}
