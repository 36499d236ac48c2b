//! Plain 32 KiB cartridge, optionally with unbanked RAM.

use crate::common::{Byte, Word};

use super::{BankController, MbcKind};

#[derive(Debug)]
pub struct RomOnly {
    rom: Vec<Byte>,
    ram: Vec<Byte>,
}

impl RomOnly {
    pub fn new(rom: Vec<Byte>, ram: Vec<Byte>) -> Self {
        Self { rom, ram }
    }
}

impl BankController for RomOnly {
    fn kind(&self) -> MbcKind {
        MbcKind::RomOnly
    }

    fn read(&self, address: Word) -> Byte {
        match address {
            0x0000..=0x7FFF => self.rom.get(address as usize).copied().unwrap_or(0xFF),
            0xA000..=0xBFFF => self
                .ram
                .get((address - 0xA000) as usize)
                .copied()
                .unwrap_or(0xFF),
            _ => 0xFF,
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        if let 0xA000..=0xBFFF = address {
            if let Some(slot) = self.ram.get_mut((address - 0xA000) as usize) {
                *slot = value;
            }
        }
    }

    fn ram(&self) -> &[Byte] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [Byte] {
        &mut self.ram
    }
}
