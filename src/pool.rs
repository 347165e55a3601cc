//! Free-list object pool
//!
//! Holds released items so the next acquire can reuse one instead of asking
//! the factory for a fresh instance. Items released while the pool is full are
//! handed back to the caller to dispose.

use crate::error::TerrainResult;

/// Pool of reusable items
#[derive(Debug)]
pub struct ObjectPool<T> {
    /// Available items
    available: Vec<T>,
    capacity: usize,
    /// Items produced by the factory
    total_created: usize,
    /// Acquires served from the free list
    reused: usize,
}

impl<T> ObjectPool<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            available: Vec::with_capacity(capacity.min(64)),
            capacity,
            total_created: 0,
            reused: 0,
        }
    }

    /// Acquire an item, creating one with `factory` when none is free
    pub fn acquire<F>(&mut self, factory: F) -> TerrainResult<T>
    where
        F: FnOnce() -> TerrainResult<T>,
    {
        if let Some(item) = self.available.pop() {
            self.reused += 1;
            return Ok(item);
        }
        let item = factory()?;
        self.total_created += 1;
        Ok(item)
    }

    /// Return an item to the pool; gives it back when the pool is full
    pub fn release(&mut self, item: T) -> Option<T> {
        if self.available.len() < self.capacity {
            self.available.push(item);
            None
        } else {
            Some(item)
        }
    }

    /// Remove every pooled item
    pub fn drain(&mut self) -> Vec<T> {
        std::mem::take(&mut self.available)
    }

    pub fn available(&self) -> usize {
        self.available.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_created(&self) -> usize {
        self.total_created
    }

    pub fn reused(&self) -> usize {
        self.reused
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerrainError;

    #[test]
    fn test_reuses_released_items() {
        let mut pool = ObjectPool::new(4);
        let mut next = 0;
        let a = pool
            .acquire(|| {
                next += 1;
                Ok(next)
            })
            .unwrap();
        assert_eq!(a, 1);
        assert!(pool.release(a).is_none());

        let b = pool.acquire(|| Ok(99)).unwrap();
        assert_eq!(b, 1);
        assert_eq!(pool.total_created(), 1);
        assert_eq!(pool.reused(), 1);
    }

    #[test]
    fn test_full_pool_hands_item_back() {
        let mut pool = ObjectPool::new(1);
        assert!(pool.release(1).is_none());
        assert_eq!(pool.release(2), Some(2));
        assert_eq!(pool.drain(), vec![1]);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_factory_error_propagates() {
        let mut pool: ObjectPool<u32> = ObjectPool::new(2);
        let err = pool.acquire(|| Err(TerrainError::Disposed)).unwrap_err();
        assert_eq!(err, TerrainError::Disposed);
        assert_eq!(pool.total_created(), 0);
    }
}
