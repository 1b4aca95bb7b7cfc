#![forbid(unsafe_code)]

//! Fixed-capacity circular byte queue for one producer and one consumer.
//!
//! The key-capture thread writes translated key bytes; the processing thread
//! peeks, decodes, and commits them. No lock is taken on either side.
//!
//! # Indexing
//!
//! `write_index` and `read_index` are monotonically increasing 64-bit
//! counters. The physical slot of a counter is `index & (capacity - 1)`,
//! which is why the capacity must be a power of two. At one byte per
//! nanosecond a 64-bit counter takes centuries to wrap, but all counter
//! arithmetic is still `wrapping_*` and every slot lookup is masked, so a
//! wrap would not break the accounting.
//!
//! # Invariants
//!
//! 1. `read_index <= write_index <= read_index + capacity`.
//! 2. `write_index - read_index` is the number of unread bytes.
//! 3. Only the producer stores `write_index`; only the consumer stores
//!    `read_index`.
//! 4. Slots are published with a `Release` store of the owning index and
//!    observed through an `Acquire` load of it, so a reader never sees a
//!    slot before the byte written into it, and a writer never reuses a slot
//!    the reader is still copying out.
//!
//! # Peek and commit
//!
//! [`peek`](ByteQueue::peek) copies unread bytes without consuming them and
//! [`commit_read`](ByteQueue::commit_read) consumes a prefix afterwards. The
//! pump uses this to hand bytes to the decoder and then consume exactly the
//! bytes the decoder actually interpreted.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use crate::error::QueueError;

/// Lock-free single-producer/single-consumer byte ring.
///
/// All operations take `&self`. Correctness requires that at most one thread
/// writes and at most one thread reads at a time; [`ByteQueue::split`]
/// enforces that with non-`Clone` handles.
pub struct ByteQueue {
    slots: Box<[AtomicU8]>,
    mask: u64,
    write_index: AtomicU64,
    read_index: AtomicU64,
}

impl fmt::Debug for ByteQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteQueue")
            .field("capacity", &self.capacity())
            .field("write_index", &self.write_index.load(Ordering::Relaxed))
            .field("read_index", &self.read_index.load(Ordering::Relaxed))
            .finish()
    }
}

impl ByteQueue {
    /// Create a queue with `capacity` bytes of storage.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if `capacity` is zero or not a power of two.
    pub fn new(capacity: usize) -> Result<Self, QueueError> {
        validate_capacity(capacity)?;
        let slots = (0..capacity).map(|_| AtomicU8::new(0)).collect();
        Ok(Self {
            slots,
            mask: capacity as u64 - 1,
            write_index: AtomicU64::new(0),
            read_index: AtomicU64::new(0),
        })
    }

    /// Create a shared queue and return its producer and consumer halves.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError`] if `capacity` is zero or not a power of two.
    pub fn split(capacity: usize) -> Result<(QueueProducer, QueueConsumer), QueueError> {
        let queue = Arc::new(Self::new(capacity)?);
        Ok((
            QueueProducer {
                queue: Arc::clone(&queue),
            },
            QueueConsumer { queue },
        ))
    }

    /// Total storage in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Reset both indices to zero, dropping any unread bytes.
    ///
    /// Takes `&mut self`, so no other thread can be mid-operation.
    pub fn clear(&mut self) {
        *self.write_index.get_mut() = 0;
        *self.read_index.get_mut() = 0;
    }

    /// Append as many of `bytes` as fit without overwriting unread data.
    ///
    /// Returns the number of bytes accepted, `0` when the queue is full.
    /// Never blocks.
    pub fn write(&self, bytes: &[u8]) -> usize {
        let write = self.write_index.load(Ordering::Relaxed);
        let read = self.read_index.load(Ordering::Acquire);
        let free = self.capacity() - used(write, read, self.capacity());
        let count = bytes.len().min(free);
        if count == 0 {
            return 0;
        }

        let (first, second) = self.segments(write, count);
        let split = first.len();
        for (slot, &byte) in self.slots[first].iter().zip(&bytes[..split]) {
            slot.store(byte, Ordering::Relaxed);
        }
        for (slot, &byte) in self.slots[second].iter().zip(&bytes[split..count]) {
            slot.store(byte, Ordering::Relaxed);
        }

        self.write_index
            .store(write.wrapping_add(count as u64), Ordering::Release);
        if count < bytes.len() {
            crate::trace!(
                requested = bytes.len(),
                accepted = count,
                "byte queue short write"
            );
        }
        count
    }

    /// Remove up to `out.len()` unread bytes into `out`, in FIFO order.
    ///
    /// Returns the number of bytes copied, `0` when the queue is empty.
    pub fn read(&self, out: &mut [u8]) -> usize {
        let count = self.peek(out);
        self.advance_read(count);
        count
    }

    /// Copy up to `out.len()` unread bytes into `out` without consuming them.
    ///
    /// Repeated peeks with no intervening read or commit return the same
    /// bytes.
    pub fn peek(&self, out: &mut [u8]) -> usize {
        let read = self.read_index.load(Ordering::Relaxed);
        let write = self.write_index.load(Ordering::Acquire);
        let count = out.len().min(used(write, read, self.capacity()));
        if count == 0 {
            return 0;
        }

        let (first, second) = self.segments(read, count);
        let split = first.len();
        for (dst, slot) in out[..split].iter_mut().zip(&self.slots[first]) {
            *dst = slot.load(Ordering::Relaxed);
        }
        for (dst, slot) in out[split..count].iter_mut().zip(&self.slots[second]) {
            *dst = slot.load(Ordering::Relaxed);
        }
        count
    }

    /// Consume up to `count` unread bytes, typically after a [`peek`](Self::peek).
    ///
    /// Returns the number of bytes actually consumed
    /// (`min(count, read_available())`).
    pub fn commit_read(&self, count: usize) -> usize {
        let read = self.read_index.load(Ordering::Relaxed);
        let write = self.write_index.load(Ordering::Acquire);
        let count = count.min(used(write, read, self.capacity()));
        self.advance_read(count);
        count
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn read_available(&self) -> usize {
        // Load `read` first: `write` can only have grown since, so the
        // difference is never negative.
        let read = self.read_index.load(Ordering::Acquire);
        let write = self.write_index.load(Ordering::Acquire);
        used(write, read, self.capacity())
    }

    /// Number of bytes a write could accept right now.
    #[must_use]
    pub fn write_available(&self) -> usize {
        self.capacity() - self.read_available()
    }

    /// Unread bytes that sit contiguously between the read position and the
    /// end of storage.
    #[must_use]
    pub fn read_available_to_end(&self) -> usize {
        let read = self.read_index.load(Ordering::Acquire);
        self.read_available()
            .min(self.capacity() - self.slot(read))
    }

    /// Free bytes that sit contiguously between the write position and the
    /// end of storage.
    #[must_use]
    pub fn write_available_to_end(&self) -> usize {
        let write = self.write_index.load(Ordering::Acquire);
        self.write_available()
            .min(self.capacity() - self.slot(write))
    }

    /// Raw counter values `(write_index, read_index)`.
    #[must_use]
    pub fn indices(&self) -> (u64, u64) {
        (
            self.write_index.load(Ordering::Acquire),
            self.read_index.load(Ordering::Acquire),
        )
    }

    fn advance_read(&self, count: usize) {
        if count == 0 {
            return;
        }
        let read = self.read_index.load(Ordering::Relaxed);
        self.read_index
            .store(read.wrapping_add(count as u64), Ordering::Release);
    }

    #[inline]
    fn slot(&self, index: u64) -> usize {
        (index & self.mask) as usize
    }

    /// Split `count` logical bytes starting at `index` into the physical
    /// range up to the end of storage and the wrapped range from slot 0.
    fn segments(
        &self,
        index: u64,
        count: usize,
    ) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let start = self.slot(index);
        let first = count.min(self.capacity() - start);
        (start..start + first, 0..count - first)
    }
}

/// Producer half of a split [`ByteQueue`].
#[derive(Debug)]
pub struct QueueProducer {
    queue: Arc<ByteQueue>,
}

impl QueueProducer {
    /// See [`ByteQueue::write`].
    pub fn write(&self, bytes: &[u8]) -> usize {
        self.queue.write(bytes)
    }

    /// See [`ByteQueue::write_available`].
    #[must_use]
    pub fn write_available(&self) -> usize {
        self.queue.write_available()
    }

    /// See [`ByteQueue::capacity`].
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// Consumer half of a split [`ByteQueue`].
#[derive(Debug)]
pub struct QueueConsumer {
    queue: Arc<ByteQueue>,
}

impl QueueConsumer {
    /// See [`ByteQueue::read`].
    pub fn read(&self, out: &mut [u8]) -> usize {
        self.queue.read(out)
    }

    /// See [`ByteQueue::peek`].
    pub fn peek(&self, out: &mut [u8]) -> usize {
        self.queue.peek(out)
    }

    /// See [`ByteQueue::commit_read`].
    pub fn commit_read(&self, count: usize) -> usize {
        self.queue.commit_read(count)
    }

    /// See [`ByteQueue::read_available`].
    #[must_use]
    pub fn read_available(&self) -> usize {
        self.queue.read_available()
    }

    /// See [`ByteQueue::read_available_to_end`].
    #[must_use]
    pub fn read_available_to_end(&self) -> usize {
        self.queue.read_available_to_end()
    }

    /// See [`ByteQueue::capacity`].
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// Reject capacities that cannot be masked.
///
/// # Errors
///
/// Returns [`QueueError`] if `capacity` is zero or not a power of two.
pub fn validate_capacity(capacity: usize) -> Result<(), QueueError> {
    if capacity == 0 {
        return Err(QueueError::ZeroCapacity);
    }
    if !capacity.is_power_of_two() {
        return Err(QueueError::CapacityNotPowerOfTwo { capacity });
    }
    Ok(())
}

/// Unread byte count, clamped to capacity for readers that observe the two
/// counters at different moments.
#[inline]
fn used(write: u64, read: u64, capacity: usize) -> usize {
    let diff = write.wrapping_sub(read);
    if diff > capacity as u64 {
        capacity
    } else {
        diff as usize
    }
}
