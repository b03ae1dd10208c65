//! Address Translation Module
//!
//! Memory returned by a core's local heap may live in core-local RAM, which is aliased at the same address on every
//! core. Before such memory is handed to another core or to a peripheral it has to be converted to its global alias.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#[cfg(any(test, feature = "mockall"))]
use mockall::automock;

/// Converts core-local addresses into addresses valid for every core.
#[cfg_attr(any(test, feature = "mockall"), automock)]
pub trait AddressTranslation {
    /// Returns the global alias of `local`.
    fn local_to_global(&self, local: usize) -> usize;
}

/// Translation for platforms whose local and global address spaces are the same.
#[derive(Debug, Default, Copy, Clone)]
pub struct IdentityTranslation;

impl AddressTranslation for IdentityTranslation {
    fn local_to_global(&self, local: usize) -> usize {
        local
    }
}

/// KeyStone style global alias window: each core's local RAM is visible to all cores at
/// `global_base + core_id * core_stride`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct KeystoneWindow {
    pub global_base: usize,
    pub core_stride: usize,
    pub core_id: usize,
}

impl KeystoneWindow {
    pub const DEFAULT_GLOBAL_BASE: usize = 0x1000_0000;
    pub const DEFAULT_CORE_STRIDE: usize = 0x0100_0000;

    /// Window for `core_id` with the default KeyStone layout.
    pub const fn for_core(core_id: usize) -> Self {
        Self { global_base: Self::DEFAULT_GLOBAL_BASE, core_stride: Self::DEFAULT_CORE_STRIDE, core_id }
    }

    /// Offset added to local addresses of this core.
    pub const fn offset(&self) -> usize {
        self.global_base + self.core_id * self.core_stride
    }
}

impl Default for KeystoneWindow {
    fn default() -> Self {
        Self::for_core(0)
    }
}

impl AddressTranslation for KeystoneWindow {
    fn local_to_global(&self, local: usize) -> usize {
        local.wrapping_add(self.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keystone_window_should_offset_by_core() {
        assert_eq!(KeystoneWindow::for_core(0).local_to_global(0x0080_0000), 0x1080_0000);
        assert_eq!(KeystoneWindow::for_core(3).local_to_global(0x0080_0000), 0x1380_0000);
    }

    #[test]
    fn identity_translation_should_not_move_addresses() {
        assert_eq!(IdentityTranslation.local_to_global(0xdead_0000), 0xdead_0000);
    }
}
