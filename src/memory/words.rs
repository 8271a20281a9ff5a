/*!
 * Process Memory
 * Private word array of a single process, separate from pool accounting
 */

use crate::core::errors::{SimError, SimResult};
use crate::core::types::{Address, Size, Word};

/// Word-addressed private memory, zero-initialized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessMemory {
    words: Vec<Word>,
}

impl ProcessMemory {
    pub fn new(size: Size) -> Self {
        Self {
            words: vec![0; size],
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        self.words.len()
    }

    #[inline]
    pub fn is_valid_address(&self, address: Address) -> bool {
        address < self.words.len()
    }

    pub fn read(&self, address: Address) -> SimResult<Word> {
        self.words
            .get(address)
            .copied()
            .ok_or(SimError::InvalidAddress {
                address,
                size: self.words.len(),
            })
    }

    pub fn write(&mut self, address: Address, value: Word) -> SimResult<()> {
        let size = self.words.len();
        let slot = self
            .words
            .get_mut(address)
            .ok_or(SimError::InvalidAddress { address, size })?;
        *slot = value;
        Ok(())
    }
}
