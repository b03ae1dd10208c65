//! Buffer pool configuration.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Number of slots in a pool unless a different capacity is chosen at compile time.
pub const DEFAULT_POOL_CAPACITY: usize = 30;

/// Alignment of the pool arena and of every slot.
pub const DEFAULT_ARENA_ALIGNMENT: usize = 16;

/// How the pool reacts to releasing a handle it does not consider allocated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReleasePolicy {
    /// Unknown handles and already free slots are ignored.
    #[default]
    Lenient,
    /// Unknown handles and already free slots are reported as errors.
    Strict,
}

/// Buffer Pool Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Size in bytes of every slot. Requests above this size are rejected.
    pub slot_size: usize,
    /// Power of two alignment of the arena. Slot base addresses are spaced by `slot_size` rounded up to it.
    pub alignment: usize,
    pub release_policy: ReleasePolicy,
}

impl PoolConfig {
    pub const fn new(slot_size: usize) -> Self {
        Self { slot_size, alignment: DEFAULT_ARENA_ALIGNMENT, release_policy: ReleasePolicy::Lenient }
    }

    pub const fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }

    pub const fn with_release_policy(mut self, release_policy: ReleasePolicy) -> Self {
        self.release_policy = release_policy;
        self
    }

    /// Shorthand for [ReleasePolicy::Strict].
    pub const fn strict(self) -> Self {
        self.with_release_policy(ReleasePolicy::Strict)
    }
}
