//! Recycling of particle buffers between emitters
//!
//! Emitters grow their buffers in powers of two and hand the old buffer back
//! here; disposed emitters return theirs as well. Later growth anywhere in the
//! process reuses those allocations instead of asking the allocator again.

use parking_lot::Mutex;

use crate::particle::Particle;

/// Particles retained by the shared pool before further buffers are dropped
pub const DEFAULT_RETAINED_PARTICLES: usize = 64 * 1024;

/// A bounded free list of particle buffers
#[derive(Debug)]
pub struct ParticleBufferPool {
    free: Mutex<Vec<Vec<Particle>>>,
    retention_limit: usize,
}

static SHARED: ParticleBufferPool = ParticleBufferPool::with_retention(DEFAULT_RETAINED_PARTICLES);

impl ParticleBufferPool {
    /// A pool that keeps at most `retention_limit` particles worth of buffers
    pub const fn with_retention(retention_limit: usize) -> Self {
        Self {
            free: parking_lot::const_mutex(Vec::new()),
            retention_limit,
        }
    }

    /// The process-wide pool used by every emitter
    pub fn shared() -> &'static Self {
        &SHARED
    }

    /// Get a buffer of exactly `len` default particles.
    ///
    /// Reuses the smallest retained buffer that can hold `len` without
    /// reallocating.
    pub fn acquire(&self, len: usize) -> Vec<Particle> {
        if len == 0 {
            return Vec::new();
        }

        let reused = {
            let mut free = self.free.lock();
            let best = free
                .iter()
                .enumerate()
                .filter(|(_, buffer)| buffer.capacity() >= len)
                .min_by_key(|(_, buffer)| buffer.capacity())
                .map(|(index, _)| index);
            best.map(|index| free.swap_remove(index))
        };

        let mut buffer = reused.unwrap_or_else(|| Vec::with_capacity(len));
        buffer.clear();
        buffer.resize(len, Particle::default());
        buffer
    }

    /// Return a buffer for reuse; dropped if the pool is full
    pub fn release(&self, mut buffer: Vec<Particle>) {
        if buffer.capacity() == 0 {
            return;
        }
        buffer.clear();

        let mut free = self.free.lock();
        let retained: usize = free.iter().map(Vec::capacity).sum();
        if retained + buffer.capacity() <= self.retention_limit {
            free.push(buffer);
        }
    }

    /// Number of buffers currently retained
    pub fn retained_buffers(&self) -> usize {
        self.free.lock().len()
    }

    /// Total particle capacity currently retained
    pub fn retained_particles(&self) -> usize {
        self.free.lock().iter().map(Vec::capacity).sum()
    }

    /// Drop every retained buffer
    pub fn clear(&self) {
        self.free.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_acquire_fresh_buffer() {
        let pool = ParticleBufferPool::with_retention(1024);
        let buffer = pool.acquire(16);
        assert_eq!(buffer.len(), 16);
        assert!(buffer.iter().all(|p| *p == Particle::default()));
        assert!(pool.acquire(0).is_empty());
    }

    #[test]
    fn test_reuses_smallest_fitting_buffer() {
        let pool = ParticleBufferPool::with_retention(1024);
        pool.release(Vec::with_capacity(64));
        pool.release(Vec::with_capacity(16));
        pool.release(Vec::with_capacity(4));
        assert_eq!(pool.retained_buffers(), 3);

        let buffer = pool.acquire(10);
        assert_eq!(buffer.len(), 10);
        assert!(buffer.capacity() >= 16 && buffer.capacity() < 64);
        assert_eq!(pool.retained_buffers(), 2);
    }

    #[test]
    fn test_reused_buffer_is_reset() {
        let pool = ParticleBufferPool::with_retention(1024);
        let mut buffer = pool.acquire(8);
        buffer[3].scale = 42.0;
        pool.release(buffer);

        let buffer = pool.acquire(8);
        assert_eq!(buffer[3], Particle::default());
    }

    #[test]
    fn test_retention_limit() {
        let pool = ParticleBufferPool::with_retention(100);
        pool.release(Vec::with_capacity(64));
        pool.release(Vec::with_capacity(64));
        assert_eq!(pool.retained_buffers(), 1);
        assert!(pool.retained_particles() <= 100);

        pool.clear();
        assert_eq!(pool.retained_buffers(), 0);
    }
}
