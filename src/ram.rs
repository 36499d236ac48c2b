//! Work RAM and High RAM
//!
//! 8 KiB of WRAM at 0xC000-0xDFFF, mirrored by echo RAM at 0xE000-0xFDFF,
//! and 127 bytes of HRAM at 0xFF80-0xFFFE.

use crate::common::{Byte, Word};

const WRAM_START: Word = 0xC000;
const ECHO_START: Word = 0xE000;
const HRAM_START: Word = 0xFF80;

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;

#[derive(Debug, Clone)]
pub struct Ram {
    wram: [Byte; WRAM_SIZE],
    hram: [Byte; HRAM_SIZE],
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    pub fn new() -> Self {
        Self {
            wram: [0; WRAM_SIZE],
            hram: [0; HRAM_SIZE],
        }
    }

    /// Offset into WRAM for 0xC000-0xFDFF, folding echo RAM onto WRAM.
    fn wram_offset(address: Word) -> Option<usize> {
        match address {
            WRAM_START..=0xDFFF => Some((address - WRAM_START) as usize),
            ECHO_START..=0xFDFF => Some((address - ECHO_START) as usize),
            _ => None,
        }
    }

    /// Read from WRAM or its echo.
    pub fn wram_read(&self, address: Word) -> Byte {
        Self::wram_offset(address).map_or(0xFF, |offset| self.wram[offset])
    }

    /// Write to WRAM or its echo.
    pub fn wram_write(&mut self, address: Word, value: Byte) {
        if let Some(offset) = Self::wram_offset(address) {
            self.wram[offset] = value;
        }
    }

    pub fn hram_read(&self, address: Word) -> Byte {
        let offset = address.wrapping_sub(HRAM_START) as usize;
        self.hram.get(offset).copied().unwrap_or(0xFF)
    }

    pub fn hram_write(&mut self, address: Word, value: Byte) {
        let offset = address.wrapping_sub(HRAM_START) as usize;
        if let Some(slot) = self.hram.get_mut(offset) {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wram_bounds() {
        let mut ram = Ram::new();
        ram.wram_write(0xC000, 0x42);
        ram.wram_write(0xDFFF, 0xAB);
        assert_eq!(ram.wram_read(0xC000), 0x42);
        assert_eq!(ram.wram_read(0xDFFF), 0xAB);
        assert_eq!(ram.wram_read(0xBFFF), 0xFF);
    }

    #[test]
    fn test_echo_aliases_wram() {
        let mut ram = Ram::new();
        ram.wram_write(0xC123, 0x77);
        assert_eq!(ram.wram_read(0xE123), 0x77);

        ram.wram_write(0xFDFF, 0x99);
        assert_eq!(ram.wram_read(0xDDFF), 0x99);
    }

    #[test]
    fn test_hram_bounds() {
        let mut ram = Ram::new();
        ram.hram_write(0xFF80, 0x12);
        ram.hram_write(0xFFFE, 0x34);
        assert_eq!(ram.hram_read(0xFF80), 0x12);
        assert_eq!(ram.hram_read(0xFFFE), 0x34);

        // IE is not part of HRAM
        ram.hram_write(0xFFFF, 0x56);
        assert_eq!(ram.hram_read(0xFFFF), 0xFF);
    }
}
