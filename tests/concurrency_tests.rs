//! Concurrency tests
//!
//! These tests verify:
//! - Concurrent writers into one node never lose an allocation
//! - Readers and writers interleave without torn quanta
//! - Interrupted callers fail without touching the store

use std::sync::{Arc, Barrier};
use std::thread;

use scull::config::Config;
use scull::store::QuantizedStore;
use scull::{Device, Interrupt, OpenMode, ScullError, Whence};

// =============================================================================
// Helper Functions
// =============================================================================

fn shared_store(quantum_size: usize, qset_size: usize) -> Arc<QuantizedStore> {
    let config = Config::builder()
        .quantum_size(quantum_size)
        .qset_size(qset_size)
        .build();
    Arc::new(QuantizedStore::new(&config).unwrap())
}

// =============================================================================
// Writer Tests
// =============================================================================

#[test]
fn test_concurrent_writers_disjoint_slots_same_node() {
    const QUANTUM: usize = 64;
    const SLOTS: usize = 16;

    let store = shared_store(QUANTUM, SLOTS);
    let barrier = Arc::new(Barrier::new(SLOTS));

    let writers: Vec<_> = (0..SLOTS)
        .map(|slot| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let interrupt = Interrupt::new();
                let data = vec![slot as u8 + 1; QUANTUM];
                barrier.wait();
                let written = store
                    .write((slot * QUANTUM) as u64, &data, QUANTUM, &interrupt)
                    .unwrap();
                assert_eq!(written, QUANTUM);
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(store.node_count(), 1);
    assert_eq!(store.quantum_count(), SLOTS);
    assert_eq!(store.size(), (SLOTS * QUANTUM) as u64);

    let interrupt = Interrupt::new();
    for slot in 0..SLOTS {
        assert!(store.has_quantum(0, slot));
        let mut buf = vec![0u8; QUANTUM];
        let read = store
            .read((slot * QUANTUM) as u64, &mut buf, QUANTUM, &interrupt)
            .unwrap();
        assert_eq!(read, QUANTUM);
        assert!(buf.iter().all(|&b| b == slot as u8 + 1), "slot {} corrupted", slot);
    }
}

#[test]
fn test_concurrent_writers_across_nodes() {
    const QUANTUM: usize = 16;
    const SLOTS: usize = 2;
    const THREADS: usize = 8;

    let store = shared_store(QUANTUM, SLOTS);
    let item_size = store.item_size();

    let writers: Vec<_> = (0..THREADS)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let interrupt = Interrupt::new();
                let data = vec![i as u8; QUANTUM];
                store
                    .write(i as u64 * item_size, &data, QUANTUM, &interrupt)
                    .unwrap();
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }

    // nodes are created strictly in sequence whatever the arrival order
    assert_eq!(store.node_count(), THREADS);
    assert_eq!(store.quantum_count(), THREADS);
    assert_eq!(store.size(), (THREADS as u64 - 1) * item_size + QUANTUM as u64);

    for i in 0..THREADS {
        assert!(store.has_quantum(i, 0));
        assert!(!store.has_quantum(i, 1));
    }
}

// =============================================================================
// Mixed Access Tests
// =============================================================================

#[test]
fn test_readers_never_see_torn_quantum() {
    const QUANTUM: usize = 128;

    let config = Config::builder().quantum_size(QUANTUM).qset_size(4).build();
    let device = Device::init(&config).unwrap();
    {
        let mut handle = device.open(OpenMode::WriteOnly, &Interrupt::new()).unwrap();
        handle.write(&[0u8; QUANTUM], QUANTUM).unwrap();
    }

    let writer = {
        let device = Arc::clone(&device);
        thread::spawn(move || {
            let mut handle = device.open(OpenMode::ReadWrite, &Interrupt::new()).unwrap();
            for round in 1..=200u32 {
                handle.seek(0, Whence::Set).unwrap();
                let fill = (round % 256) as u8;
                handle.write(&[fill; QUANTUM], QUANTUM).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let device = Arc::clone(&device);
            thread::spawn(move || {
                let mut handle = device.open(OpenMode::ReadOnly, &Interrupt::new()).unwrap();
                let mut buf = [0u8; QUANTUM];
                for _ in 0..200 {
                    handle.seek(0, Whence::Set).unwrap();
                    let read = handle.read(&mut buf, QUANTUM).unwrap();
                    assert_eq!(read, QUANTUM);
                    assert!(buf.iter().all(|&b| b == buf[0]), "torn quantum observed");
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}

// =============================================================================
// Interrupt Tests
// =============================================================================

#[test]
fn test_raised_interrupt_fails_every_locked_operation() {
    let store = shared_store(8, 4);
    let ok = Interrupt::new();
    store.write(0, b"abcd", 4, &ok).unwrap();

    let raised = Interrupt::new();
    raised.raise();
    let mut buf = [0u8; 4];

    assert!(matches!(store.read(0, &mut buf, 4, &raised), Err(ScullError::Interrupted)));
    assert!(matches!(store.write(4, b"efgh", 4, &raised), Err(ScullError::Interrupted)));
    assert!(matches!(store.trim(&raised), Err(ScullError::Interrupted)));
    assert!(matches!(store.follow(3, &raised), Err(ScullError::Interrupted)));

    // nothing changed
    assert_eq!(store.size(), 4);
    assert_eq!(store.node_count(), 1);

    // clearing the token makes it usable again
    raised.clear();
    assert_eq!(store.read(0, &mut buf, 4, &raised).unwrap(), 4);
}

#[test]
fn test_interrupt_only_affects_its_own_handle() {
    let device = Device::init(&Config::builder().quantum_size(8).qset_size(4).build()).unwrap();

    let mine = Interrupt::new();
    let theirs = Interrupt::new();
    let mut my_handle = device.open(OpenMode::ReadWrite, &mine).unwrap();
    let mut their_handle = device.open(OpenMode::ReadWrite, &theirs).unwrap();

    my_handle.interrupt().raise();

    assert!(matches!(my_handle.write(b"x", 1), Err(ScullError::Interrupted)));
    assert_eq!(their_handle.write(b"y", 1).unwrap(), 1);
    assert_eq!(my_handle.position(), 0);
}
