//! Fixed-capacity buffer pool.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::{alloc::Layout, fmt, ptr::NonNull};

use osal_critical_section::LocalMutex;
use osal_platform::{
    base::align_up,
    error::{OsalError, Result},
    AddressTranslation, BackingAllocator, InterruptControl,
};

use crate::config::{PoolConfig, ReleasePolicy, DEFAULT_POOL_CAPACITY};

/// Capabilities a [BufferPool] needs from its platform.
pub trait PoolPlatform: InterruptControl + BackingAllocator + AddressTranslation {}

impl<T> PoolPlatform for T where T: InterruptControl + BackingAllocator + AddressTranslation + ?Sized {}

/// Handle to one slot of a [BufferPool], holding the slot's global base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(usize);

impl BufferHandle {
    /// Wraps an arbitrary address. Only handles returned by [BufferPool::allocate] refer to pool memory.
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    pub const fn addr(&self) -> usize {
        self.0
    }

    pub const fn as_ptr(&self) -> *mut u8 {
        self.0 as *mut u8
    }
}

impl fmt::Display for BufferHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Usage counters of a [BufferPool].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatistics {
    /// Calls to `allocate()` that passed the size check.
    pub allocation_calls: usize,
    /// Calls to `release()`.
    pub release_calls: usize,
    /// Slots currently allocated.
    pub in_use: usize,
    /// Largest value `in_use` has reached.
    pub high_watermark: usize,
    /// Allocations that failed because every slot was in use.
    pub exhausted: usize,
    /// Releases that did not free a slot.
    pub ignored_releases: usize,
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    base: usize,
    is_free: bool,
}

struct PoolState<const N: usize> {
    slots: [Slot; N],
    stats: PoolStatistics,
}

enum ReleaseOutcome {
    Freed,
    AlreadyFree,
    Unmanaged,
}

/// Fixed-capacity pool of `N` equally sized buffers.
///
/// The pool is built once with [BufferPool::init] and serves buffers until it is dropped, at which point the arena is
/// returned to the backing heap. Slot metadata is only modified with interrupts masked on the current core.
///
/// A pool belongs to one core. It may be moved to another thread but not shared, since masking interrupts gives no
/// exclusion against a second core:
///
/// ```compile_fail
/// use osal_buffer_pool::{BufferPool, PoolConfig};
/// use osal_platform::sim::{SemaphoreBank, SimulatedCore};
///
/// fn share_between_cores<T: Sync>(_: &T) {}
///
/// let bank = SemaphoreBank::new();
/// let core = SimulatedCore::new(0, &bank);
/// let pool: BufferPool<'_, _, 4> = BufferPool::init(&core, PoolConfig::new(64)).unwrap();
/// share_between_cores(&pool);
/// ```
pub struct BufferPool<'p, P: PoolPlatform + ?Sized, const N: usize = DEFAULT_POOL_CAPACITY> {
    platform: &'p P,
    config: PoolConfig,
    stride: usize,
    /// Arena address as returned by the backing heap.
    arena: NonNull<u8>,
    layout: Layout,
    /// Global alias of `arena`; slot `i` starts at `global_base + i * stride`.
    global_base: usize,
    state: LocalMutex<PoolState<N>>,
}

// Safety: the arena pointer is owned by the pool and only used to free the arena in `drop`. The pool is not Sync, so
// slot metadata is never reached from two threads at once.
unsafe impl<P: PoolPlatform + Sync + ?Sized, const N: usize> Send for BufferPool<'_, P, N> {}

impl<'p, P: PoolPlatform + ?Sized, const N: usize> BufferPool<'p, P, N> {
    const NON_EMPTY: () = assert!(N > 0, "buffer pool capacity must be non-zero");

    /// Allocates the arena from the platform heap and carves it into `N` free slots of `config.slot_size` bytes.
    ///
    /// ## Errors
    ///
    /// InvalidSlotSize   If the slot size is zero, the alignment is not a power of two, the arena size overflows, or
    ///                   the global alias of the arena runs past the end of the address space.
    /// OutOfMemory       If the backing heap cannot provide the arena.
    pub fn init(platform: &'p P, config: PoolConfig) -> Result<Self> {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;

        let slot_size = config.slot_size;
        if slot_size == 0 {
            log::error!("Buffer pool slot size must be non-zero");
            return Err(OsalError::InvalidSlotSize(slot_size));
        }

        let layout = align_up(slot_size, config.alignment)
            .and_then(|stride| stride.checked_mul(N).map(|size| (stride, size)))
            .and_then(|(stride, size)| Layout::from_size_align(size, config.alignment).ok().map(|l| (stride, l)));
        let Some((stride, layout)) = layout else {
            log::error!(
                "Buffer pool of {N} x {slot_size} bytes aligned to {:#x} is not representable",
                config.alignment
            );
            return Err(OsalError::InvalidSlotSize(slot_size));
        };

        let Some(arena) = platform.alloc(layout) else {
            log::error!("Backing heap could not allocate {:#x} bytes for buffer pool", layout.size());
            return Err(OsalError::OutOfMemory { requested: layout.size() });
        };

        let global_base = platform.local_to_global(arena.as_ptr() as usize);
        if global_base.checked_add(layout.size() - stride).is_none() {
            log::error!("Buffer pool arena at global {global_base:#x} does not fit in the address space");
            // Safety: the arena was just allocated from this platform with this layout and was never handed out.
            unsafe { platform.free(arena, layout) };
            return Err(OsalError::InvalidSlotSize(slot_size));
        }
        let slots = core::array::from_fn(|index| Slot { base: global_base + index * stride, is_free: true });

        log::info!(
            "Buffer pool ready: {N} slots of {slot_size} bytes at {global_base:#x} (local {:#x})",
            arena.as_ptr() as usize
        );

        Ok(Self {
            platform,
            config,
            stride,
            arena,
            layout,
            global_base,
            state: LocalMutex::new(PoolState { slots, stats: PoolStatistics::default() }, "buffer_pool"),
        })
    }

    /// Hands out the lowest-indexed free slot.
    ///
    /// ## Errors
    ///
    /// OversizedRequest    If `size` exceeds the slot size. No slot is inspected.
    /// NoBufferAvailable   If every slot is in use.
    pub fn allocate(&self, size: usize) -> Result<BufferHandle> {
        if size > self.config.slot_size {
            return Err(OsalError::OversizedRequest { requested: size, slot_size: self.config.slot_size });
        }

        let mut guard = self.state.lock(self.platform);
        let state = &mut *guard;
        state.stats.allocation_calls += 1;

        match state.slots.iter_mut().find(|slot| slot.is_free) {
            Some(slot) => {
                slot.is_free = false;
                state.stats.in_use += 1;
                state.stats.high_watermark = state.stats.high_watermark.max(state.stats.in_use);
                Ok(BufferHandle(slot.base))
            }
            None => {
                state.stats.exhausted += 1;
                drop(guard);
                log::debug!("Buffer pool exhausted ({N} slots in use)");
                Err(OsalError::NoBufferAvailable)
            }
        }
    }

    /// Returns a slot to the pool.
    ///
    /// With [ReleasePolicy::Lenient] a handle that is not a slot base address, or a slot that is already free, leaves
    /// the pool untouched and succeeds.
    ///
    /// ## Errors
    ///
    /// UnmanagedRelease  Strict policy only. `handle` is not a slot of this pool.
    /// DoubleRelease     Strict policy only. The slot is already free.
    pub fn release(&self, handle: BufferHandle) -> Result<()> {
        let mut guard = self.state.lock(self.platform);
        let state = &mut *guard;
        state.stats.release_calls += 1;

        let outcome = match state.slots.iter_mut().find(|slot| slot.base == handle.addr()) {
            Some(slot) if !slot.is_free => {
                slot.is_free = true;
                state.stats.in_use -= 1;
                ReleaseOutcome::Freed
            }
            Some(_) => ReleaseOutcome::AlreadyFree,
            None => ReleaseOutcome::Unmanaged,
        };
        if !matches!(outcome, ReleaseOutcome::Freed) {
            state.stats.ignored_releases += 1;
        }
        drop(guard);

        match (outcome, self.config.release_policy) {
            (ReleaseOutcome::Freed, _) => Ok(()),
            (ReleaseOutcome::AlreadyFree, ReleasePolicy::Lenient) => {
                log::debug!("Ignoring release of free buffer {handle}");
                Ok(())
            }
            (ReleaseOutcome::Unmanaged, ReleasePolicy::Lenient) => {
                log::debug!("Ignoring release of unmanaged buffer {handle}");
                Ok(())
            }
            (ReleaseOutcome::AlreadyFree, ReleasePolicy::Strict) => {
                log::error!("Buffer {handle} released twice");
                Err(OsalError::DoubleRelease(handle.addr()))
            }
            (ReleaseOutcome::Unmanaged, ReleasePolicy::Strict) => {
                log::error!("Buffer {handle} is not managed by this pool");
                Err(OsalError::UnmanagedRelease(handle.addr()))
            }
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn slot_size(&self) -> usize {
        self.config.slot_size
    }

    /// Distance in bytes between consecutive slot base addresses.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Handle of slot `index`, whether or not it is allocated.
    pub fn slot(&self, index: usize) -> Option<BufferHandle> {
        (index < N).then(|| BufferHandle(self.global_base + index * self.stride))
    }

    /// Returns true if `handle` is the base address of one of the pool's slots.
    pub fn contains(&self, handle: BufferHandle) -> bool {
        handle
            .addr()
            .checked_sub(self.global_base)
            .is_some_and(|offset| offset % self.stride == 0 && offset / self.stride < N)
    }

    /// Returns true if slot `index` exists and is free.
    pub fn is_free(&self, index: usize) -> bool {
        index < N && self.state.lock(self.platform).slots[index].is_free
    }

    pub fn available(&self) -> usize {
        N - self.in_use()
    }

    pub fn in_use(&self) -> usize {
        self.state.lock(self.platform).stats.in_use
    }

    pub fn statistics(&self) -> PoolStatistics {
        self.state.lock(self.platform).stats
    }
}

impl<P: PoolPlatform + ?Sized, const N: usize> fmt::Debug for BufferPool<'_, P, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferPool")
            .field("capacity", &N)
            .field("slot_size", &self.config.slot_size)
            .field("stride", &self.stride)
            .field("global_base", &format_args!("{:#x}", self.global_base))
            .finish_non_exhaustive()
    }
}

impl<P: PoolPlatform + ?Sized, const N: usize> Drop for BufferPool<'_, P, N> {
    fn drop(&mut self) {
        let in_use = self.state.get_mut().stats.in_use;
        if in_use != 0 {
            log::warn!("Buffer pool dropped with {in_use} buffers outstanding");
        }
        // Safety: the arena was allocated from this platform with this layout in `init` and is not used afterwards.
        unsafe { self.platform.free(self.arena, self.layout) };
    }
}
