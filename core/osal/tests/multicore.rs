//! Multicore behavior of the OSAL on simulated cores.
//!
//! ## License
//!
//! Copyright (C) Microsoft Corporation.
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Barrier,
    },
    thread,
};

use osal::{BufferHandle, Domain, DomainMutex, Osal, OsalConfig, OsalError, PoolConfig};
use osal_platform::sim::{SemaphoreBank, SimulatedCore};

#[test]
fn pool_scenario_should_exhaust_at_capacity_and_reuse_first_free_slot() {
    let bank = SemaphoreBank::new();
    let core = SimulatedCore::new(0, &bank);
    let osal = Osal::new(&core, OsalConfig::default()).unwrap();
    let pool = osal.create_pool::<30>(PoolConfig::new(256)).unwrap();

    let buffers: Vec<BufferHandle> = (0..30).map(|_| pool.allocate(256).unwrap()).collect();
    for (index, buffer) in buffers.iter().enumerate() {
        assert_eq!(pool.slot(index), Some(*buffer));
    }
    assert_eq!(pool.allocate(256), Err(OsalError::NoBufferAvailable));

    pool.release(buffers[5]).unwrap();
    assert_eq!(pool.allocate(256), Ok(buffers[5]));
    assert_eq!(pool.allocate(1), Err(OsalError::NoBufferAvailable));
    assert!(core.interrupts_enabled());
}

#[test]
fn cores_should_never_share_a_domain() {
    const CORES: usize = 2;
    const ITERATIONS: usize = 2000;

    static BANK: SemaphoreBank = SemaphoreBank::new();
    let inside = AtomicBool::new(false);
    let entries = AtomicUsize::new(0);
    let barrier = Barrier::new(CORES);

    thread::scope(|s| {
        for id in 0..CORES {
            let (inside, entries, barrier) = (&inside, &entries, &barrier);
            s.spawn(move || {
                let core = SimulatedCore::new(id, &BANK);
                let osal = Osal::new(&core, OsalConfig::default()).unwrap();
                barrier.wait();
                for _ in 0..ITERATIONS {
                    let guard = osal.enter(Domain::Driver);
                    assert!(!core.interrupts_enabled());
                    assert!(!inside.swap(true, Ordering::SeqCst), "both cores inside the driver domain");
                    entries.fetch_add(1, Ordering::Relaxed);
                    inside.store(false, Ordering::SeqCst);
                    drop(guard);
                    assert!(core.interrupts_enabled());
                }
            });
        }
    });

    assert_eq!(entries.load(Ordering::Relaxed), CORES * ITERATIONS);
    assert_eq!(BANK.acquisitions(), CORES * ITERATIONS);
}

// Core 0 owns the pool and fills buffers; core 1 consumes them and hands them back. The two queues model hardware
// queues guarded by the queue manager domain.
#[test]
fn buffers_should_round_trip_between_cores_through_guarded_queues() {
    const PACKETS: usize = 500;
    const PAYLOAD: usize = 128;

    let bank = SemaphoreBank::new();
    let rx_queue = DomainMutex::new(Domain::Qmss, VecDeque::<(BufferHandle, u8)>::new());
    let free_queue = DomainMutex::new(Domain::Qmss, VecDeque::<BufferHandle>::new());

    thread::scope(|s| {
        let (bank, rx_queue, free_queue) = (&bank, &rx_queue, &free_queue);

        s.spawn(move || {
            let core = SimulatedCore::new(0, bank);
            let osal = Osal::new(&core, OsalConfig::default().with_shared_descriptors(true)).unwrap();
            let pool = osal.create_pool::<8>(PoolConfig::new(PAYLOAD).strict()).unwrap();

            let mut sent = 0;
            let mut returned = 0;
            while returned < PACKETS {
                if sent < PACKETS {
                    if let Ok(buffer) = pool.allocate(PAYLOAD) {
                        let tag = (sent % 251) as u8;
                        // Safety: the slot is owned by this core until it is pushed to the rx queue.
                        unsafe { std::ptr::write_bytes(buffer.as_ptr(), tag, PAYLOAD) };
                        osal.end_access(buffer.addr(), PAYLOAD);
                        rx_queue.lock(osal.critical_sections()).push_back((buffer, tag));
                        sent += 1;
                    }
                }
                let recycled = free_queue.lock(osal.critical_sections()).pop_front();
                match recycled {
                    Some(buffer) => {
                        pool.release(buffer).unwrap();
                        returned += 1;
                    }
                    None => thread::yield_now(),
                }
            }

            assert_eq!(pool.available(), pool.capacity());
            let stats = pool.statistics();
            assert_eq!(stats.release_calls, PACKETS);
            assert!(stats.high_watermark <= 8);
        });

        s.spawn(move || {
            let core = SimulatedCore::new(1, bank);
            let osal = Osal::new(&core, OsalConfig::default().with_shared_descriptors(true)).unwrap();

            let mut received = 0;
            while received < PACKETS {
                let packet = rx_queue.lock(osal.critical_sections()).pop_front();
                let Some((buffer, tag)) = packet else {
                    thread::yield_now();
                    continue;
                };
                osal.begin_access(buffer.addr(), PAYLOAD);
                // Safety: the producer wrote PAYLOAD bytes and gave up the slot when it pushed it.
                let payload = unsafe { std::slice::from_raw_parts(buffer.as_ptr(), PAYLOAD) };
                assert!(payload.iter().all(|byte| *byte == tag));
                free_queue.lock(osal.critical_sections()).push_back(buffer);
                received += 1;
            }
            assert_eq!(core.cache_ops().invalidations, PACKETS);
        });
    });
}
