//! Error codes for the OSAL crates
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

use crate::hw_semaphore::SemaphoreId;

/// The error type for OSAL operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsalError {
    /// The backing heap could not satisfy a request of the given number of bytes.
    OutOfMemory { requested: usize },

    /// Every slot of the buffer pool is in use.
    NoBufferAvailable,

    /// The requested size exceeds the fixed slot size of the pool.
    OversizedRequest { requested: usize, slot_size: usize },

    /// A pool cannot be built with the given slot size.
    InvalidSlotSize(usize),

    /// The released address is not a slot base address of the pool.
    UnmanagedRelease(usize),

    /// The released slot was already free.
    DoubleRelease(usize),

    /// The semaphore does not exist on this platform.
    InvalidSemaphore { id: SemaphoreId, count: usize },

    /// The semaphore is assigned to more than one critical section domain.
    DuplicateSemaphore(SemaphoreId),
}

impl fmt::Display for OsalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsalError::OutOfMemory { requested } => write!(f, "Backing heap could not allocate {requested:#X} bytes"),
            OsalError::NoBufferAvailable => write!(f, "No free buffer available in pool"),
            OsalError::OversizedRequest { requested, slot_size } => {
                write!(f, "Requested {requested} bytes but pool slots are {slot_size} bytes")
            }
            OsalError::InvalidSlotSize(size) => write!(f, "Invalid pool slot size {size}"),
            OsalError::UnmanagedRelease(addr) => write!(f, "Released address {addr:#X} is not managed by the pool"),
            OsalError::DoubleRelease(addr) => write!(f, "Buffer at {addr:#X} released twice"),
            OsalError::InvalidSemaphore { id, count } => {
                write!(f, "Hardware semaphore {} out of range (platform has {count})", id.index())
            }
            OsalError::DuplicateSemaphore(id) => write!(f, "Hardware semaphore {} assigned to two domains", id.index()),
        }
    }
}

impl core::error::Error for OsalError {}

/// A specialized result type for the OSAL crates.
pub type Result<T> = core::result::Result<T, OsalError>;
