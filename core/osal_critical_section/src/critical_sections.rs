//! Per-domain enter/exit pairs bound to one core's platform.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use osal_platform::{error::Result, HwSemaphore, InterruptControl, SemaphoreId};

use crate::{
    domain::{Domain, DomainConfig},
    guard::{CrossCoreGuard, DomainGuard, SingleCoreGuard},
};

/// The critical sections available to one core.
///
/// Holds the core's platform and the semaphore assigned to each [Domain]. Every core of the system is expected to use
/// the same [DomainConfig]; the hardware semaphore is the only arbiter between cores.
pub struct CriticalSections<'p, P: ?Sized> {
    platform: &'p P,
    config: DomainConfig,
}

impl<P: ?Sized> Clone for CriticalSections<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: ?Sized> Copy for CriticalSections<'_, P> {}

impl<'p, P: InterruptControl + HwSemaphore + ?Sized> CriticalSections<'p, P> {
    /// Binds the domains in `config` to `platform`.
    ///
    /// ## Errors
    ///
    /// InvalidSemaphore    If a domain is assigned a semaphore the platform does not have.
    /// DuplicateSemaphore  If two domains are assigned the same semaphore.
    pub fn new(platform: &'p P, config: DomainConfig) -> Result<Self> {
        if let Err(err) = config.validate(platform.count()) {
            log::error!("Invalid critical section domain configuration: {err}");
            return Err(err);
        }
        Ok(Self { platform, config })
    }

    /// Enters the layered critical section for `domain`: spins on the domain's hardware semaphore, then masks
    /// interrupts on this core.
    pub fn enter(&self, domain: Domain) -> DomainGuard<'p, P> {
        DomainGuard::enter(self.platform, domain, self.config.semaphore(domain))
    }

    /// Spins until the hardware semaphore for `domain` is held. Interrupts are left untouched.
    pub fn enter_cross_core(&self, domain: Domain) -> CrossCoreGuard<'p, P> {
        CrossCoreGuard::enter(self.platform, self.config.semaphore(domain))
    }

    /// Makes a single attempt to take the hardware semaphore for `domain`.
    pub fn try_enter_cross_core(&self, domain: Domain) -> Option<CrossCoreGuard<'p, P>> {
        CrossCoreGuard::try_enter(self.platform, self.config.semaphore(domain))
    }

    /// Masks interrupts on this core.
    pub fn enter_single_core(&self) -> SingleCoreGuard<'p, P> {
        SingleCoreGuard::enter(self.platform)
    }

    pub fn semaphore(&self, domain: Domain) -> SemaphoreId {
        self.config.semaphore(domain)
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    pub fn platform(&self) -> &'p P {
        self.platform
    }
}
