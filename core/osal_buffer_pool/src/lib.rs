//! Data Buffer Pool
//!
//! A fixed-capacity allocator for data-plane buffers. One contiguous arena is taken from the backing heap when the
//! pool is built, translated to its global address so that other cores and DMA engines can reach it, and carved into
//! `N` slots of identical size. Slots are never split, merged or moved.
//!
//! Allocation is a linear first-fit scan over the slots with interrupts masked on the current core, so the worst case
//! latency is bounded by the pool capacity. The pool is meant to be used from a single core; it takes no hardware
//! semaphore.
//!
//! ## Examples
//!
//! ```
//! use osal_buffer_pool::{BufferPool, PoolConfig};
//! use osal_platform::sim::{SemaphoreBank, SimulatedCore};
//!
//! let bank = SemaphoreBank::new();
//! let core = SimulatedCore::new(0, &bank);
//! let pool: BufferPool<'_, _> = BufferPool::init(&core, PoolConfig::new(256)).unwrap();
//!
//! let buffer = pool.allocate(128).unwrap();
//! assert_eq!(pool.in_use(), 1);
//! pool.release(buffer).unwrap();
//! assert_eq!(pool.available(), pool.capacity());
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

mod config;
mod pool;

pub use config::{PoolConfig, ReleasePolicy, DEFAULT_ARENA_ALIGNMENT, DEFAULT_POOL_CAPACITY};
pub use pool::{BufferHandle, BufferPool, PoolPlatform, PoolStatistics};
