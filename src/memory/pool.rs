/*!
 * Shared Memory Pool
 *
 * Flat allocation counter over a single pool of words. There is no addressing
 * across processes: the pool only answers "is there room" and keeps
 * `0 <= filled <= total` as long as callers free exactly once per allocation.
 */

use super::types::{MemoryPressure, MemoryStats};
use crate::core::types::Size;
use tracing::{debug, warn};

/// Memory manager
#[derive(Debug, Clone)]
pub struct MemoryManager {
    total_memory: Size,
    filled_memory: Size,
}

impl MemoryManager {
    pub fn new(total: Size) -> Self {
        debug!(total, "Memory manager initialized");
        Self {
            total_memory: total,
            filled_memory: 0,
        }
    }

    /// Follow a runtime capacity change
    ///
    /// Shrinking below the filled amount evicts nothing; allocation is refused
    /// until enough memory is released.
    pub fn set_capacity(&mut self, total: Size) {
        if total != self.total_memory {
            debug!(old = self.total_memory, new = total, "Memory capacity changed");
            self.total_memory = total;
        }
    }

    #[inline]
    #[must_use]
    pub fn has_space(&self, size: Size) -> bool {
        self.filled_memory
            .checked_add(size)
            .is_some_and(|needed| needed <= self.total_memory)
    }

    /// Allocate `size` words; no-op returning `false` when the pool is too small
    pub fn allocate(&mut self, size: Size) -> bool {
        if !self.has_space(size) {
            return false;
        }
        self.filled_memory += size;
        true
    }

    /// Release `size` words, floored at zero
    ///
    /// Does not detect a logical double free of the same process.
    pub fn free(&mut self, size: Size) {
        if size > self.filled_memory {
            warn!(
                requested = size,
                filled = self.filled_memory,
                "Free exceeds filled memory, flooring at zero"
            );
        }
        self.filled_memory = self.filled_memory.saturating_sub(size);
    }

    /// Release everything
    pub fn clear(&mut self) {
        self.filled_memory = 0;
    }

    #[inline]
    pub fn total(&self) -> Size {
        self.total_memory
    }

    #[inline]
    pub fn used(&self) -> Size {
        self.filled_memory
    }

    /// Free words, clamped to zero when capacity shrank below usage
    #[inline]
    pub fn available(&self) -> Size {
        self.total_memory.saturating_sub(self.filled_memory)
    }

    pub fn stats(&self) -> MemoryStats {
        let usage_percentage = if self.total_memory == 0 {
            0.0
        } else {
            (self.filled_memory as f64 / self.total_memory as f64) * 100.0
        };
        MemoryStats {
            total_memory: self.total_memory,
            used_memory: self.filled_memory,
            available_memory: self.available(),
            usage_percentage,
            pressure: MemoryPressure::classify(self.filled_memory, self.total_memory),
        }
    }
}
