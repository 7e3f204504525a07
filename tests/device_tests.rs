//! Tests for Device and FileHandle
//!
//! These tests verify:
//! - Trim on write-only open
//! - Per-handle positions
//! - Seek semantics (Set/Cur/End, past end, negative)
//! - std::io adapters
//! - Device teardown

use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use scull::config::Config;
use scull::{Device, Interrupt, OpenMode, ScullError, Whence};

// =============================================================================
// Helper Functions
// =============================================================================

fn small_device() -> Arc<Device> {
    let config = Config::builder().quantum_size(8).qset_size(4).build();
    Device::init(&config).unwrap()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_write_only_open_discards_contents() {
    let device = small_device();
    let interrupt = Interrupt::new();

    let mut handle = device.open(OpenMode::ReadWrite, &interrupt).unwrap();
    handle.write(b"previous", 8).unwrap();
    assert_eq!(device.size(), 8);

    let _writer = device.open(OpenMode::WriteOnly, &interrupt).unwrap();
    assert_eq!(device.size(), 0);

    let mut reader = device.open(OpenMode::ReadOnly, &interrupt).unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf, 8).unwrap(), 0);
}

#[test]
fn test_read_only_and_read_write_open_keep_contents() {
    let device = small_device();
    let interrupt = Interrupt::new();

    let mut handle = device.open(OpenMode::ReadWrite, &interrupt).unwrap();
    handle.write(b"keep", 4).unwrap();

    let _r = device.open(OpenMode::ReadOnly, &interrupt).unwrap();
    let _rw = device.open(OpenMode::ReadWrite, &interrupt).unwrap();
    assert_eq!(device.size(), 4);
}

#[test]
fn test_write_only_open_interrupted() {
    let device = small_device();
    let interrupt = Interrupt::new();
    interrupt.raise();

    let result = device.open(OpenMode::WriteOnly, &interrupt);
    assert!(matches!(result, Err(ScullError::Interrupted)));

    // read-only open takes no lock
    assert!(device.open(OpenMode::ReadOnly, &interrupt).is_ok());
}

#[test]
fn test_open_mode_from_raw() {
    assert_eq!(OpenMode::from_raw(0).unwrap(), OpenMode::ReadOnly);
    assert_eq!(OpenMode::from_raw(1).unwrap(), OpenMode::WriteOnly);
    assert_eq!(OpenMode::from_raw(2).unwrap(), OpenMode::ReadWrite);
    assert!(OpenMode::from_raw(3).is_err());
    assert!(OpenMode::WriteOnly.truncates());
    assert!(!OpenMode::ReadWrite.truncates());
}

// =============================================================================
// Position Tests
// =============================================================================

#[test]
fn test_handles_track_positions_independently() {
    let device = small_device();
    let interrupt = Interrupt::new();

    let mut writer = device.open(OpenMode::WriteOnly, &interrupt).unwrap();
    writer.write(b"abcdefgh", 8).unwrap();
    writer.write(b"ijkl", 4).unwrap();
    assert_eq!(writer.position(), 12);

    let mut a = device.open(OpenMode::ReadOnly, &interrupt).unwrap();
    let mut b = device.open(OpenMode::ReadOnly, &interrupt).unwrap();
    let mut buf = [0u8; 8];

    assert_eq!(a.read(&mut buf, 3).unwrap(), 3);
    assert_eq!(&buf[..3], b"abc");
    assert_eq!(a.position(), 3);
    assert_eq!(b.position(), 0);

    assert_eq!(b.read(&mut buf, 8).unwrap(), 8);
    assert_eq!(&buf, b"abcdefgh");
    assert_eq!(b.read(&mut buf, 8).unwrap(), 4);
    assert_eq!(&buf[..4], b"ijkl");
    assert_eq!(b.read(&mut buf, 8).unwrap(), 0);
}

// =============================================================================
// Seek Tests
// =============================================================================

#[test]
fn test_seek_end_zero_returns_size() {
    let device = small_device();
    let interrupt = Interrupt::new();
    let mut handle = device.open(OpenMode::ReadWrite, &interrupt).unwrap();
    handle.write(b"12345", 5).unwrap();

    assert_eq!(handle.seek(0, Whence::End).unwrap(), 5);
    assert_eq!(handle.seek(0, Whence::End).unwrap(), device.size());
}

#[test]
fn test_seek_set_and_cur() {
    let device = small_device();
    let interrupt = Interrupt::new();
    let mut handle = device.open(OpenMode::ReadWrite, &interrupt).unwrap();

    assert_eq!(handle.seek(10, Whence::Set).unwrap(), 10);
    assert_eq!(handle.seek(5, Whence::Cur).unwrap(), 15);
    assert_eq!(handle.seek(-15, Whence::Cur).unwrap(), 0);
}

#[test]
fn test_seek_negative_fails_and_keeps_position() {
    let device = small_device();
    let interrupt = Interrupt::new();
    let mut handle = device.open(OpenMode::ReadWrite, &interrupt).unwrap();
    handle.seek(4, Whence::Set).unwrap();

    let err = handle.seek(-5, Whence::Cur).unwrap_err();
    assert!(matches!(err, ScullError::InvalidArgument(_)));
    assert_eq!(handle.position(), 4);

    assert!(handle.seek(-1, Whence::End).is_err());
}

#[test]
fn test_seek_past_end_then_write_extends_size() {
    let device = small_device();
    let interrupt = Interrupt::new();
    let mut handle = device.open(OpenMode::ReadWrite, &interrupt).unwrap();

    handle.seek(100, Whence::End).unwrap();
    handle.write(b"tail", 4).unwrap();

    assert_eq!(device.size(), 104);
    // seeking does not touch the store; only the write allocated
    assert_eq!(device.store().quantum_count(), 1);
}

// =============================================================================
// std::io Adapter Tests
// =============================================================================

#[test]
fn test_io_traits_round_trip() {
    let device = small_device();
    let interrupt = Interrupt::new();
    let payload: Vec<u8> = (0..100u8).collect();

    let mut writer = device.open(OpenMode::WriteOnly, &interrupt).unwrap();
    writer.write_all(&payload).unwrap();
    writer.flush().unwrap();

    let mut reader = device.open(OpenMode::ReadOnly, &interrupt).unwrap();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).unwrap();
    assert_eq!(out, payload);

    let pos = Seek::seek(&mut reader, SeekFrom::Start(90)).unwrap();
    assert_eq!(pos, 90);
    let mut tail = [0u8; 10];
    reader.read_exact(&mut tail).unwrap();
    assert_eq!(&tail[..], &payload[90..]);

    let pos = Seek::seek(&mut reader, SeekFrom::End(-1)).unwrap();
    assert_eq!(pos, 99);
}

#[test]
fn test_io_seek_negative_is_invalid_input() {
    let device = small_device();
    let mut handle = device.open(OpenMode::ReadOnly, &Interrupt::new()).unwrap();

    let err = Seek::seek(&mut handle, SeekFrom::Current(-1)).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[test]
fn test_io_write_all_surfaces_raised_interrupt() {
    let device = small_device();
    let handle = device.open(OpenMode::ReadWrite, &Interrupt::new()).unwrap();
    assert_eq!(handle.mode(), OpenMode::ReadWrite);
    handle.interrupt().raise();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut handle = handle;
        tx.send(handle.write_all(b"hello")).unwrap();
    });

    let err = rx
        .recv_timeout(Duration::from_secs(3))
        .expect("write_all kept retrying after the interrupt")
        .unwrap_err();
    assert_ne!(err.kind(), std::io::ErrorKind::Interrupted);
    let inner = err.get_ref().and_then(|e| e.downcast_ref::<ScullError>());
    assert!(matches!(inner, Some(ScullError::Interrupted)));
    assert_eq!(device.size(), 0);
}

#[test]
fn test_io_read_to_end_surfaces_raised_interrupt() {
    let device = small_device();
    {
        let mut writer = device.open(OpenMode::WriteOnly, &Interrupt::new()).unwrap();
        writer.write_all(b"some contents").unwrap();
    }

    let interrupt = Interrupt::new();
    let reader = device.open(OpenMode::ReadOnly, &interrupt).unwrap();
    assert_eq!(reader.mode(), OpenMode::ReadOnly);
    interrupt.raise();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut reader = reader;
        let mut out = Vec::new();
        tx.send(reader.read_to_end(&mut out)).unwrap();
    });

    let result = rx
        .recv_timeout(Duration::from_secs(3))
        .expect("read_to_end kept retrying after the interrupt");
    assert!(result.is_err());
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_release_keeps_contents() {
    let device = small_device();
    let interrupt = Interrupt::new();

    let mut handle = device.open(OpenMode::ReadWrite, &interrupt).unwrap();
    handle.write(b"stay", 4).unwrap();
    handle.release().unwrap();

    assert_eq!(device.size(), 4);
}

#[test]
fn test_destroy_requires_no_open_handles() {
    let device = small_device();
    let handle = device.open(OpenMode::ReadOnly, &Interrupt::new()).unwrap();

    let device = match device.destroy() {
        Ok(()) => panic!("destroy succeeded with an open handle"),
        Err(device) => device,
    };

    drop(handle);
    assert!(device.destroy().is_ok());
}

#[test]
fn test_device_reports_config() {
    let config = Config::default();
    let device = Device::init(&config).unwrap();

    assert_eq!(device.config().quantum_size, 4000);
    assert_eq!(device.config().qset_size, 1000);
    assert_eq!(device.size(), 0);
}
