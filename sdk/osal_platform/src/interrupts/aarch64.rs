//! AArch64 Interrupt module
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::arch::asm;

use crate::interrupts::{InterruptControl, InterruptState};

// DAIF.I
const DAIF_IRQ_MASK: u64 = 0x80;

/// AArch64 implementation of [InterruptControl] based on the DAIF IRQ mask.
#[derive(Debug, Default, Copy, Clone)]
pub struct InterruptsAarch64;

impl InterruptsAarch64 {
    pub const fn new() -> Self {
        Self
    }
}

impl InterruptControl for InterruptsAarch64 {
    fn disable_interrupts(&self) -> InterruptState {
        let daif: u64;
        unsafe {
            asm!("mrs {}, daif", out(reg) daif, options(nomem, nostack));
            asm!("msr daifset, #0x02", "isb sy", options(nostack));
        }
        InterruptState::new(daif & DAIF_IRQ_MASK == 0)
    }

    fn restore_interrupts(&self, state: InterruptState) {
        if state.were_enabled() {
            unsafe {
                asm!("msr daifclr, #0x02", "isb sy", options(nostack));
            }
        }
    }
}
