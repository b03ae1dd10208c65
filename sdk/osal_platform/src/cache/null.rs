//! Null cache module - For host builds
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::sync::atomic::{fence, Ordering};

use crate::cache::CacheMaintenance;

/// Null implementation of [CacheMaintenance] for cache coherent hosts. Only the fence has an effect.
#[derive(Debug, Default, Copy, Clone)]
pub struct CacheNull;

impl CacheNull {
    pub const fn new() -> Self {
        Self
    }
}

impl CacheMaintenance for CacheNull {
    fn invalidate(&self, _addr: usize, _size: usize) {}

    fn writeback(&self, _addr: usize, _size: usize) {}

    fn memory_fence(&self) {
        fence(Ordering::SeqCst);
    }
}
