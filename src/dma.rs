//! OAM DMA
//!
//! Writing 0xFF46 copies 160 bytes from `value << 8` into OAM
//! (0xFE00-0xFE9F), one byte every 4 T-cycles.

use std::ops::Range;

use crate::common::{Byte, Word};

pub const DMA_ADDRESS: Word = 0xFF46;

/// Bytes copied per transfer.
pub const DMA_LENGTH: u8 = 160;
/// T-cycles per copied byte.
const CYCLES_PER_BYTE: u32 = 4;

#[derive(Debug, Clone, Default)]
pub struct Dma {
    active: bool,
    /// Source page (value written to 0xFF46)
    value: Byte,
    /// Next byte to copy
    index: u8,
    /// Cycles not yet spent on a whole byte
    pending: u32,
}

impl Dma {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a transfer from page `value`.
    pub fn start(&mut self, value: Byte) {
        self.value = value;
        self.active = true;
        self.index = 0;
        self.pending = 0;
    }

    pub fn read(&self) -> Byte {
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Address of byte `index` of the current transfer.
    pub fn source_address(&self, index: u8) -> Word {
        ((self.value as Word) << 8) | index as Word
    }

    /// Advance by `cycles`. Returns the OAM offsets due to be copied now.
    pub fn tick(&mut self, cycles: u32) -> Range<u8> {
        if !self.active {
            return 0..0;
        }
        self.pending += cycles;

        let start = self.index;
        let due = (self.pending / CYCLES_PER_BYTE).min((DMA_LENGTH - start) as u32) as u8;
        self.pending -= due as u32 * CYCLES_PER_BYTE;
        self.index += due;

        if self.index >= DMA_LENGTH {
            self.active = false;
            self.pending = 0;
        }
        start..self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_copies_nothing() {
        let mut dma = Dma::new();
        assert!(dma.tick(1000).is_empty());
    }

    #[test]
    fn test_source_address() {
        let mut dma = Dma::new();
        dma.start(0xC1);
        assert_eq!(dma.source_address(0), 0xC100);
        assert_eq!(dma.source_address(0x32), 0xC132);
        assert_eq!(dma.read(), 0xC1);
    }

    #[test]
    fn test_one_byte_per_four_cycles() {
        let mut dma = Dma::new();
        dma.start(0xC0);
        assert_eq!(dma.tick(3), 0..0);
        assert_eq!(dma.tick(1), 0..1);
        assert_eq!(dma.tick(8), 1..3);
        assert!(dma.is_active());
    }

    #[test]
    fn test_transfer_completes() {
        let mut dma = Dma::new();
        dma.start(0xC0);
        let mut copied = 0;
        for _ in 0..200 {
            copied += dma.tick(4).len();
        }
        assert_eq!(copied, DMA_LENGTH as usize);
        assert!(!dma.is_active());
    }

    #[test]
    fn test_restart_resets_progress() {
        let mut dma = Dma::new();
        dma.start(0xC0);
        dma.tick(40);
        dma.start(0xD0);
        assert_eq!(dma.tick(4), 0..1);
        assert_eq!(dma.source_address(0), 0xD000);
    }
}
