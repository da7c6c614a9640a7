//! Pool Tests
//!
//! Tests verify:
//! - Objects are built on demand and reused after release
//! - Released objects come back reset
//! - The idle set never grows past capacity

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use bytes::{BufMut, BytesMut};
use yar_client::pool::{Pool, Reset};
use yar_client::protocol::{Header, MAGIC_NUMBER};
use yar_client::{Result, YarError};

fn counting_pool(capacity: usize) -> (Arc<AtomicUsize>, Pool<BytesMut>) {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let pool = Pool::new(capacity, move || {
        counter.fetch_add(1, Ordering::SeqCst);
        BytesMut::with_capacity(64)
    });
    (built, pool)
}

#[test]
fn test_acquire_builds_when_empty() {
    let (built, pool) = counting_pool(4);
    assert_eq!(pool.idle(), 0);

    let a = pool.acquire();
    let b = pool.acquire();
    assert_eq!(built.load(Ordering::SeqCst), 2);

    drop(a);
    drop(b);
    assert_eq!(pool.idle(), 2);
}

#[test]
fn test_released_object_is_reused_and_reset() {
    let (built, pool) = counting_pool(4);

    {
        let mut buf = pool.acquire();
        buf.put_slice(b"leftover");
        assert_eq!(buf.len(), 8);
    }

    let buf = pool.acquire();
    assert!(buf.is_empty());
    assert!(buf.capacity() >= 8);
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_idle_bounded_by_capacity() {
    let (_, pool) = counting_pool(2);
    assert_eq!(pool.capacity(), 2);

    let held: Vec<_> = (0..5).map(|_| pool.acquire()).collect();
    drop(held);

    assert_eq!(pool.idle(), 2);
}

#[test]
fn test_zero_capacity_still_usable() {
    let (_, pool) = counting_pool(0);
    assert_eq!(pool.capacity(), 1);

    drop(pool.acquire());
    assert_eq!(pool.idle(), 1);
}

#[test]
fn test_release_on_error_path() {
    fn fails(pool: &Pool<BytesMut>) -> Result<()> {
        let mut buf = pool.acquire();
        buf.put_u32(1);
        Err(YarError::Request("bail".into()))
    }

    let (_, pool) = counting_pool(4);
    assert!(fails(&pool).is_err());
    assert_eq!(pool.idle(), 1);
    assert!(pool.acquire().is_empty());
}

#[test]
fn test_frozen_split_reclaims_pooled_buffer() {
    let pool = Pool::new(1, || BytesMut::with_capacity(256));
    let base = pool.acquire().as_ptr() as usize;

    for round in 0..10u8 {
        let frame = {
            let mut buf = pool.acquire();
            buf.put_slice(&[round; 100]);
            buf.split().freeze()
        };
        assert_eq!(frame.len(), 100);

        // Frames are carved out of the pooled allocation once the previous
        // frame has been dropped
        let start = frame.as_ptr() as usize;
        assert!(start >= base && start + 100 <= base + 256, "round {}", round);
    }
}

#[test]
fn test_header_pool_resets_fields() {
    let pool: Pool<Header> = Pool::new(4, Header::new);

    {
        let mut header = pool.acquire();
        header.id = 99;
        header.body_length = 1234;
        header.set_provider("someone");
        header.set_token(b"secret");
    }

    let header = pool.acquire();
    assert_eq!(header.id, 0);
    assert_eq!(header.body_length, 0);
    assert_eq!(header.provider(), "");
    assert_eq!(header.token, [0u8; 32]);
    assert_eq!(header.magic_number, MAGIC_NUMBER);
}

#[test]
fn test_vec_reset() {
    let mut v = vec![1u8, 2, 3];
    v.reset();
    assert!(v.is_empty());
}

#[test]
fn test_concurrent_acquire_release() {
    let (built, pool) = counting_pool(8);
    let pool = Arc::new(pool);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for i in 0..200u32 {
                    let mut buf = pool.acquire();
                    assert!(buf.is_empty());
                    buf.put_u32(i);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(pool.idle() <= 8);
    assert!(built.load(Ordering::SeqCst) <= 8 * 200);
}
