//! MBC1
//!
//! Up to 2 MiB ROM and 32 KiB RAM. A 5-bit bank register selects the
//! 0x4000-0x7FFF window; a 2-bit register supplies either the upper ROM
//! bank bits or the RAM bank, depending on the banking mode.

use crate::common::{Byte, Word};

use super::{bank_count, banked_read, BankController, MbcKind, RAM_BANK_SIZE, ROM_BANK_SIZE};

#[derive(Debug)]
pub struct Mbc1 {
    rom: Vec<Byte>,
    ram: Vec<Byte>,
    ram_enabled: bool,
    /// Low 5 bits of the ROM bank, never zero
    rom_bank: u8,
    /// 2-bit secondary register
    upper_bank: u8,
    /// 0 = simple ROM banking, 1 = advanced
    banking_mode: u8,
}

impl Mbc1 {
    pub fn new(rom: Vec<Byte>, ram: Vec<Byte>) -> Self {
        Self {
            rom,
            ram,
            ram_enabled: false,
            rom_bank: 1,
            upper_bank: 0,
            banking_mode: 0,
        }
    }

    fn rom_banks(&self) -> usize {
        bank_count(self.rom.len(), ROM_BANK_SIZE)
    }

    /// Bank mapped at 0x0000-0x3FFF.
    fn rom0_bank(&self) -> usize {
        if self.banking_mode == 1 {
            ((self.upper_bank as usize) << 5) % self.rom_banks()
        } else {
            0
        }
    }

    /// Bank mapped at 0x4000-0x7FFF.
    fn romx_bank(&self) -> usize {
        let bank = ((self.upper_bank as usize) << 5) | self.rom_bank as usize;
        bank % self.rom_banks()
    }

    fn ram_offset(&self, address: Word) -> usize {
        let bank = if self.banking_mode == 1 {
            self.upper_bank as usize % bank_count(self.ram.len(), RAM_BANK_SIZE)
        } else {
            0
        };
        bank * RAM_BANK_SIZE + (address - 0xA000) as usize
    }
}

impl BankController for Mbc1 {
    fn kind(&self) -> MbcKind {
        MbcKind::Mbc1
    }

    fn read(&self, address: Word) -> Byte {
        match address {
            0x0000..=0x3FFF => banked_read(&self.rom, self.rom0_bank(), ROM_BANK_SIZE, address as usize),
            0x4000..=0x7FFF => banked_read(
                &self.rom,
                self.romx_bank(),
                ROM_BANK_SIZE,
                (address - 0x4000) as usize,
            ),
            0xA000..=0xBFFF if self.ram_enabled => {
                self.ram.get(self.ram_offset(address)).copied().unwrap_or(0xFF)
            }
            _ => 0xFF,
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        match address {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => {
                let bank = value & 0x1F;
                self.rom_bank = if bank == 0 { 1 } else { bank };
            }
            0x4000..=0x5FFF => self.upper_bank = value & 0x03,
            0x6000..=0x7FFF => self.banking_mode = value & 0x01,
            0xA000..=0xBFFF if self.ram_enabled => {
                let offset = self.ram_offset(address);
                if let Some(slot) = self.ram.get_mut(offset) {
                    *slot = value;
                }
            }
            _ => {}
        }
    }

    fn ram(&self) -> &[Byte] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [Byte] {
        &mut self.ram
    }
}
