//! OSAL Platform Crate
//!
//! This crate defines the platform capabilities that the driver OS abstraction layer consumes: interrupt masking on
//! the current core, hardware-arbitrated semaphores shared by all cores, data cache maintenance, a backing heap, and
//! the translation of core-local addresses into the global address space.
//!
//! Each capability is a trait so that the critical section and buffer pool logic can run on ordinary hardware
//! against a mock or simulated backend. Architecture specific backends replace the [Interrupts](interrupts::Interrupts)
//! and [Cache](cache::Cache) type aliases at compile time based on the target.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(all(not(feature = "std"), not(test), not(feature = "mockall")), no_std)]
extern crate alloc;

pub mod address;
pub mod base;
pub mod cache;
pub mod error;
pub mod heap;
pub mod hw_semaphore;
pub mod interrupts;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use address::AddressTranslation;
pub use cache::CacheMaintenance;
pub use heap::BackingAllocator;
pub use hw_semaphore::{HwSemaphore, SemaphoreId};
pub use interrupts::{InterruptControl, InterruptState};

/// The full set of capabilities a core needs to run the OSAL.
///
/// Implemented automatically for any type providing every capability trait.
pub trait Platform: InterruptControl + HwSemaphore + CacheMaintenance + BackingAllocator + AddressTranslation {}

impl<T> Platform for T where
    T: InterruptControl + HwSemaphore + CacheMaintenance + BackingAllocator + AddressTranslation + ?Sized
{
}
