//! Critical section domains and their semaphore assignment.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use core::fmt;

use osal_platform::{
    error::{OsalError, Result},
    SemaphoreId,
};

/// A named group of driver resources protected by one hardware semaphore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Queue manager: the data-plane hardware queues.
    Qmss,
    /// Packet DMA: descriptor and DMA channel configuration.
    Cppi,
    /// State shared by all instances of the network driver.
    Driver,
}

impl Domain {
    pub const ALL: [Domain; 3] = [Domain::Qmss, Domain::Cppi, Domain::Driver];

    pub const fn name(&self) -> &'static str {
        match self {
            Domain::Qmss => "qmss",
            Domain::Cppi => "cppi",
            Domain::Driver => "driver",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lock state of a domain as seen from the core holding a guard.
///
/// Entering a domain passes through the states in declaration order and leaving it passes through them in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainState {
    /// Neither the hardware semaphore nor the interrupt mask is held.
    Unlocked,
    /// The hardware semaphore is held, interrupts are untouched.
    LockedGlobal,
    /// The hardware semaphore is held and interrupts are masked on this core.
    LockedGlobalAndLocal,
}

/// Hardware semaphore assignment for each [Domain].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainConfig {
    pub cppi: SemaphoreId,
    pub qmss: SemaphoreId,
    pub driver: SemaphoreId,
}

impl Default for DomainConfig {
    fn default() -> Self {
        DomainConfig { cppi: SemaphoreId::new(1), qmss: SemaphoreId::new(2), driver: SemaphoreId::new(3) }
    }
}

impl DomainConfig {
    /// Returns the semaphore guarding `domain`.
    pub const fn semaphore(&self, domain: Domain) -> SemaphoreId {
        match domain {
            Domain::Qmss => self.qmss,
            Domain::Cppi => self.cppi,
            Domain::Driver => self.driver,
        }
    }

    /// Checks that every semaphore exists on a platform with `count` semaphores and that no two domains share one.
    pub fn validate(&self, count: usize) -> Result<()> {
        for (i, domain) in Domain::ALL.iter().enumerate() {
            let id = self.semaphore(*domain);
            if id.index() >= count {
                return Err(OsalError::InvalidSemaphore { id, count });
            }
            if Domain::ALL[..i].iter().any(|other| self.semaphore(*other) == id) {
                return Err(OsalError::DuplicateSemaphore(id));
            }
        }
        Ok(())
    }
}
