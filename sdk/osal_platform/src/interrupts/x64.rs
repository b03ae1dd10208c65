//! X64 Interrupt module
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use x86_64::instructions::interrupts;

use crate::interrupts::{InterruptControl, InterruptState};

/// X64 implementation of [InterruptControl] based on RFLAGS.IF.
#[derive(Debug, Default, Copy, Clone)]
pub struct InterruptsX64;

impl InterruptsX64 {
    pub const fn new() -> Self {
        Self
    }
}

impl InterruptControl for InterruptsX64 {
    fn disable_interrupts(&self) -> InterruptState {
        let enabled = interrupts::are_enabled();
        interrupts::disable();
        InterruptState::new(enabled)
    }

    fn restore_interrupts(&self, state: InterruptState) {
        if state.were_enabled() {
            interrupts::enable();
        }
    }
}
