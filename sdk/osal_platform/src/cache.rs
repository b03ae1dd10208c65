//! Data Cache Maintenance Module
//!
//! This module provides the [CacheMaintenance] capability used to keep locally cached copies of shared memory
//! coherent with other cores and with DMA capable peripherals. The [Cache] type alias is the implementation for the
//! current compilation target.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

cfg_if::cfg_if! {
    if #[cfg(all(target_os = "none", target_arch = "x86_64"))] {
        mod x64;
        pub use x64::CacheX64;
        pub type Cache = x64::CacheX64;
    } else if #[cfg(all(target_os = "none", target_arch = "aarch64"))] {
        mod aarch64;
        pub use aarch64::CacheAarch64;
        pub type Cache = aarch64::CacheAarch64;
    } else {
        mod null;
        pub use null::CacheNull;
        pub type Cache = null::CacheNull;
    }
}

/// Cache maintenance operations over a byte range.
///
/// Addresses are passed as plain integers because the range may describe memory the caller does not own, such as a
/// descriptor ring written by a peripheral.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait CacheMaintenance {
    /// Discards any locally cached copy of `[addr, addr + size)` so the next read observes memory.
    fn invalidate(&self, addr: usize, size: usize);

    /// Writes dirty cache lines covering `[addr, addr + size)` back to memory.
    fn writeback(&self, addr: usize, size: usize);

    /// Waits until all outstanding memory accesses of this core are globally visible.
    fn memory_fence(&self);
}
