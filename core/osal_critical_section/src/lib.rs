//! Layered Critical Sections
//!
//! Driver resources on a multicore SoC have to be protected along two independent axes:
//!
//! - other cores running in parallel, excluded by a hardware-arbitrated semaphore ([CrossCoreGuard]), and
//! - preemption on the local core, excluded by masking interrupts ([SingleCoreGuard]).
//!
//! Each protected resource belongs to a [Domain] with its own semaphore. [CriticalSections::enter] composes both
//! mechanisms in the only safe order: the hardware semaphore is taken first and interrupts are masked second, then on
//! release interrupts are restored before the semaphore is handed back. Releasing the semaphore is only possible by
//! dropping (or explicitly exiting) a guard, so a core can never release a semaphore it did not acquire through this
//! crate.
//!
//! Acquisition of a hardware semaphore spins without timeout. A semaphore that is never released stalls every other
//! core contending for it.
//!
//! ## Examples
//!
//! ```
//! use osal_critical_section::{CriticalSections, Domain, DomainConfig};
//! use osal_platform::sim::{SemaphoreBank, SimulatedCore};
//!
//! let bank = SemaphoreBank::new();
//! let core = SimulatedCore::new(0, &bank);
//! let sections = CriticalSections::new(&core, DomainConfig::default()).unwrap();
//!
//! {
//!     let _guard = sections.enter(Domain::Qmss);
//!     assert!(!core.interrupts_enabled());
//! }
//! assert!(core.interrupts_enabled());
//! ```
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

mod critical_sections;
mod domain;
mod domain_mutex;
mod guard;
mod local_mutex;

pub use critical_sections::CriticalSections;
pub use domain::{Domain, DomainConfig, DomainState};
pub use domain_mutex::{DomainMutex, DomainMutexGuard};
pub use guard::{CrossCoreGuard, DomainGuard, SingleCoreGuard};
pub use local_mutex::{LocalGuard, LocalMutex};
