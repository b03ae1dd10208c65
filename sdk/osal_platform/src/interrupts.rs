//! Interrupt Masking Module
//!
//! This module provides the [InterruptControl] capability used for single-core critical sections. The [Interrupts]
//! type alias is the implementation for the current compilation target; the other structs are architecture specific
//! implementations and replace the [Interrupts] alias at compile time.
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
        pub use x64::InterruptsX64;
        pub type Interrupts = x64::InterruptsX64;
    } else if #[cfg(all(target_os = "none", target_arch = "aarch64"))] {
        mod aarch64;
        pub use aarch64::InterruptsAarch64;
        pub type Interrupts = aarch64::InterruptsAarch64;
    } else {
        mod null;
        pub use null::InterruptsNull;
        pub type Interrupts = null::InterruptsNull;
    }
}

/// Interrupt delivery state of a core captured when interrupts were masked.
///
/// Passing the state back to [InterruptControl::restore_interrupts] re-enables interrupts only if they were enabled
/// when the state was captured, which keeps nested critical sections correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterruptState {
    enabled: bool,
}

impl InterruptState {
    /// Creates a state describing whether interrupts were enabled.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Returns true if interrupts were enabled when this state was captured.
    pub const fn were_enabled(&self) -> bool {
        self.enabled
    }
}

/// Masks and restores interrupt delivery on the calling core.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait InterruptControl {
    /// Disables interrupt delivery on the calling core and returns the state prior to the call.
    fn disable_interrupts(&self) -> InterruptState;

    /// Restores interrupt delivery to a state returned by [InterruptControl::disable_interrupts].
    fn restore_interrupts(&self, state: InterruptState);
}
