use strum_macros::{Display, EnumString};
use thiserror::Error;

pub type Word = u16;

/// Addressable words in a memory image.
pub const MEMORY_WORDS: usize = 0x10000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("writing {len} words at {address:#06x} runs past the end of memory")]
    Overflow { address: usize, len: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum ByteOrder {
    #[default]
    Big,
    Little,
}

/// The full 64K word address space, zero filled, along with the end of the
/// highest range written so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    words: Box<[Word]>,
    high_water: usize,
}

impl MemoryImage {
    pub fn new() -> Self {
        Self {
            words: vec![0; MEMORY_WORDS].into_boxed_slice(),
            high_water: 0,
        }
    }

    pub fn write(&mut self, address: usize, data: &[Word]) -> Result<(), MemoryError> {
        let end = address
            .checked_add(data.len())
            .filter(|end| *end <= MEMORY_WORDS)
            .ok_or(MemoryError::Overflow {
                address,
                len: data.len(),
            })?;

        self.words[address..end].copy_from_slice(data);
        if !data.is_empty() {
            self.high_water = self.high_water.max(end);
        }

        Ok(())
    }

    pub fn read(&self, address: usize) -> Option<Word> {
        self.words.get(address).copied()
    }

    /// Everything up to and including the highest word written.
    pub fn words(&self) -> &[Word] {
        &self.words[..self.high_water]
    }

    pub fn len(&self) -> usize {
        self.high_water
    }

    pub fn is_empty(&self) -> bool {
        self.high_water == 0
    }

    pub fn to_bytes(&self, order: ByteOrder) -> Vec<u8> {
        self.words()
            .iter()
            .flat_map(|word| match order {
                ByteOrder::Big => word.to_be_bytes(),
                ByteOrder::Little => word.to_le_bytes(),
            })
            .collect()
    }
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}
