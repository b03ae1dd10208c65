//! Driver OS Abstraction Layer
//!
//! The glue a multicore NIC driver needs from the system it runs on:
//!
//! - fixed-capacity data buffer pools ([BufferPool]),
//! - per-domain layered critical sections ([CriticalSections]) protecting the queue manager, the descriptor subsystem
//!   and general driver state against other cores and against preemption on the local core, and
//! - cache bracketing around memory shared with other cores and with DMA capable peripherals.
//!
//! [Osal] binds these to one core's [Platform]. On hardware the platform is usually a [BoardPlatform]; on a host the
//! simulation backend of `osal_platform` can stand in for any number of cores.
//!
//! ## Examples
//!
//! ```
//! use osal::{Domain, Osal, OsalConfig, PoolConfig};
//! use osal_platform::sim::{SemaphoreBank, SimulatedCore};
//!
//! let bank = SemaphoreBank::new();
//! let core = SimulatedCore::new(0, &bank);
//! let osal = Osal::new(&core, OsalConfig::default()).unwrap();
//!
//! let pool = osal.create_pool::<30>(PoolConfig::new(256)).unwrap();
//! let buffer = pool.allocate(256).unwrap();
//!
//! osal.end_access(buffer.addr(), 256);
//! {
//!     let _qmss = osal.enter(Domain::Qmss);
//!     // push the buffer to a hardware queue
//! }
//! pool.release(buffer).unwrap();
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

mod config;
pub mod mem_access;
mod platform;

pub use config::OsalConfig;
pub use platform::BoardPlatform;

pub use osal_buffer_pool::{BufferHandle, BufferPool, PoolConfig, PoolStatistics, ReleasePolicy};
pub use osal_critical_section::{
    CriticalSections, CrossCoreGuard, Domain, DomainConfig, DomainGuard, DomainMutex, DomainState, LocalMutex,
    SingleCoreGuard,
};
pub use osal_platform::{
    error::{OsalError, Result},
    Platform,
};

/// One core's view of the OS abstraction layer.
pub struct Osal<'p, P: Platform + ?Sized> {
    platform: &'p P,
    sections: CriticalSections<'p, P>,
    config: OsalConfig,
}

impl<'p, P: Platform + ?Sized> Osal<'p, P> {
    /// Binds the OSAL to `platform`.
    ///
    /// ## Errors
    ///
    /// InvalidSemaphore    If a domain is assigned a semaphore the platform does not have.
    /// DuplicateSemaphore  If two domains are assigned the same semaphore.
    pub fn new(platform: &'p P, config: OsalConfig) -> Result<Self> {
        let sections = CriticalSections::new(platform, config.domains)?;
        log::info!(
            "OSAL ready: cppi sem {}, qmss sem {}, driver sem {}, shared descriptors: {}",
            config.domains.cppi.index(),
            config.domains.qmss.index(),
            config.domains.driver.index(),
            config.descriptors_in_shared_memory
        );
        Ok(Self { platform, sections, config })
    }

    /// Builds a buffer pool backed by this core's heap.
    pub fn create_pool<const N: usize>(&self, config: PoolConfig) -> Result<BufferPool<'p, P, N>> {
        BufferPool::init(self.platform, config)
    }

    /// Enters the layered critical section of `domain`.
    pub fn enter(&self, domain: Domain) -> DomainGuard<'p, P> {
        self.sections.enter(domain)
    }

    /// Spins on the hardware semaphore of `domain` without masking interrupts.
    pub fn enter_cross_core(&self, domain: Domain) -> CrossCoreGuard<'p, P> {
        self.sections.enter_cross_core(domain)
    }

    /// Masks interrupts on this core.
    pub fn enter_single_core(&self) -> SingleCoreGuard<'p, P> {
        self.sections.enter_single_core()
    }

    pub fn critical_sections(&self) -> &CriticalSections<'p, P> {
        &self.sections
    }

    /// See [mem_access::begin_access].
    pub fn begin_access(&self, addr: usize, size: usize) {
        mem_access::begin_access(self.platform, addr, size)
    }

    /// See [mem_access::end_access].
    pub fn end_access(&self, addr: usize, size: usize) {
        mem_access::end_access(self.platform, addr, size)
    }

    /// Cache maintenance before reading a descriptor, according to [OsalConfig::descriptors_in_shared_memory].
    pub fn begin_descriptor_access(&self, addr: usize, size: usize) {
        mem_access::begin_descriptor_access(self.platform, self.config.descriptors_in_shared_memory, addr, size)
    }

    /// Cache maintenance after writing a descriptor, according to [OsalConfig::descriptors_in_shared_memory].
    pub fn end_descriptor_access(&self, addr: usize, size: usize) {
        mem_access::end_descriptor_access(self.platform, self.config.descriptors_in_shared_memory, addr, size)
    }

    pub fn config(&self) -> &OsalConfig {
        &self.config
    }

    pub fn platform(&self) -> &'p P {
        self.platform
    }
}

impl<P: Platform + ?Sized> core::fmt::Debug for Osal<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Osal").field("config", &self.config).finish_non_exhaustive()
    }
}
