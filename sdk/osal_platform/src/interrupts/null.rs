//! Null Interrupt module - For host builds
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::interrupts::{InterruptControl, InterruptState};

/// Null implementation of [InterruptControl].
///
/// Replaces the architecture specific implementation when not compiling for a bare-metal x86_64 or AArch64 target.
/// Interrupts are reported as disabled and nothing is ever masked.
#[derive(Debug, Default, Copy, Clone)]
pub struct InterruptsNull;

impl InterruptsNull {
    /// Creates a new instance of the null implementation.
    pub const fn new() -> Self {
        Self
    }
}

impl InterruptControl for InterruptsNull {
    fn disable_interrupts(&self) -> InterruptState {
        InterruptState::new(false)
    }

    fn restore_interrupts(&self, _state: InterruptState) {}
}
