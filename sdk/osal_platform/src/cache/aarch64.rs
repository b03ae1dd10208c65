//! AArch64 cache module
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::arch::asm;

use crate::{base::cache_lines, cache::CacheMaintenance};

/// AArch64 implementation of [CacheMaintenance] using data cache operations to the point of coherency.
#[derive(Debug, Default, Copy, Clone)]
pub struct CacheAarch64;

impl CacheAarch64 {
    pub const fn new() -> Self {
        Self
    }
}

impl CacheMaintenance for CacheAarch64 {
    fn invalidate(&self, addr: usize, size: usize) {
        for line in cache_lines(addr, size) {
            unsafe { asm!("dc ivac, {}", in(reg) line, options(nostack)) };
        }
        unsafe { asm!("dsb sy", options(nostack)) };
    }

    fn writeback(&self, addr: usize, size: usize) {
        for line in cache_lines(addr, size) {
            unsafe { asm!("dc cvac, {}", in(reg) line, options(nostack)) };
        }
        unsafe { asm!("dsb sy", options(nostack)) };
    }

    fn memory_fence(&self) {
        unsafe { asm!("dmb sy", options(nostack)) };
    }
}
