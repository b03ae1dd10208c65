//! Common constants and alignment helpers.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

/// Data cache line size assumed by the cache maintenance backends.
pub const CACHE_LINE_SIZE: usize = 64;

/// Rounds `value` up to the next multiple of `align`.
///
/// Returns `None` if `align` is not a power of two or the result overflows.
pub const fn align_up(value: usize, align: usize) -> Option<usize> {
    if !align.is_power_of_two() {
        return None;
    }
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Rounds `value` down to the previous multiple of `align`. `align` must be a power of two.
pub const fn align_down(value: usize, align: usize) -> usize {
    debug_assert!(align.is_power_of_two());
    value & !(align - 1)
}

/// Returns an iterator over the base address of every cache line touched by `[addr, addr + size)`.
#[allow(dead_code)]
pub(crate) fn cache_lines(addr: usize, size: usize) -> impl Iterator<Item = usize> {
    let start = align_down(addr, CACHE_LINE_SIZE);
    let end = if size == 0 { start } else { addr.saturating_add(size) };
    (start..end).step_by(CACHE_LINE_SIZE)
}
