//! OSAL configuration.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use osal_critical_section::DomainConfig;

/// OSAL Configuration
///
/// Every core of the system must use the same configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OsalConfig {
    /// Hardware semaphore assigned to each critical section domain.
    pub domains: DomainConfig,
    /// Set when descriptors live in memory shared between cores (for example MSMC SRAM) rather than in core-local L2.
    /// Descriptor bracketing only performs cache maintenance when this is set.
    pub descriptors_in_shared_memory: bool,
}

impl OsalConfig {
    pub const fn with_domains(mut self, domains: DomainConfig) -> Self {
        self.domains = domains;
        self
    }

    pub const fn with_shared_descriptors(mut self, shared: bool) -> Self {
        self.descriptors_in_shared_memory = shared;
        self
    }
}
