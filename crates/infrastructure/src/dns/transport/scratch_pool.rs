use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::dns::wire::MAXMSG;

/// Reusable datagram buffers.
///
/// Receiving and encoding both need a full-size scratch buffer for the
/// duration of one datagram. Checking one out avoids allocating 64 KiB per
/// packet; the buffer goes back to the pool when the guard is dropped.
pub struct ScratchPool {
    idle: Mutex<Vec<Box<[u8]>>>,
    buffer_size: usize,
    max_idle: usize,
    total_created: AtomicU64,
    total_reused: AtomicU64,
}

impl ScratchPool {
    /// Pool of `MAXMSG`-sized buffers keeping at most `max_idle` around.
    pub fn new(max_idle: usize) -> Self {
        Self::with_buffer_size(MAXMSG, max_idle)
    }

    pub fn with_buffer_size(buffer_size: usize, max_idle: usize) -> Self {
        info!(buffer_size, max_idle, "Initializing scratch buffer pool");

        Self {
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            buffer_size,
            max_idle,
            total_created: AtomicU64::new(0),
            total_reused: AtomicU64::new(0),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn checkout(&self) -> ScratchBuffer<'_> {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();

        let buf = match reused {
            Some(buf) => {
                self.total_reused.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.total_created.fetch_add(1, Ordering::Relaxed);
                debug!(buffer_size = self.buffer_size, "Allocated scratch buffer");
                vec![0u8; self.buffer_size].into_boxed_slice()
            }
        };

        ScratchBuffer {
            buf: Some(buf),
            pool: self,
        }
    }

    fn release(&self, buf: Box<[u8]>) {
        let mut idle = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
    }

    pub fn stats(&self) -> PoolStats {
        let idle = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len();

        PoolStats {
            total_created: self.total_created.load(Ordering::Relaxed),
            total_reused: self.total_reused.load(Ordering::Relaxed),
            idle,
        }
    }
}

/// A checked-out buffer, returned to its pool on drop.
pub struct ScratchBuffer<'a> {
    buf: Option<Box<[u8]>>,
    pool: &'a ScratchPool,
}

impl Deref for ScratchBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.buf.as_deref().unwrap_or_default()
    }
}

impl DerefMut for ScratchBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.buf.as_deref_mut().unwrap_or_default()
    }
}

impl Drop for ScratchBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buf) = self.buf.take() {
            self.pool.release(buf);
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoolStats {
    pub total_created: u64,
    pub total_reused: u64,
    pub idle: usize,
}

impl PoolStats {
    pub fn reuse_rate(&self) -> f64 {
        let total = self.total_created + self.total_reused;
        if total == 0 {
            0.0
        } else {
            (self.total_reused as f64 / total as f64) * 100.0
        }
    }
}
