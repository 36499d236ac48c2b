//! MBC5
//!
//! 9-bit ROM bank split over two registers, 4-bit RAM bank. Unlike MBC1 and
//! MBC3, bank 0 can be mapped into the switchable window.

use crate::common::{Byte, Word};

use super::{bank_count, banked_read, BankController, MbcKind, RAM_BANK_SIZE, ROM_BANK_SIZE};

#[derive(Debug)]
pub struct Mbc5 {
    rom: Vec<Byte>,
    ram: Vec<Byte>,
    ram_enabled: bool,
    rom_bank: u16,
    ram_bank: u8,
}

impl Mbc5 {
    pub fn new(rom: Vec<Byte>, ram: Vec<Byte>) -> Self {
        Self {
            rom,
            ram,
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
        }
    }

    fn ram_offset(&self, address: Word) -> usize {
        let bank = self.ram_bank as usize % bank_count(self.ram.len(), RAM_BANK_SIZE);
        bank * RAM_BANK_SIZE + (address - 0xA000) as usize
    }
}

impl BankController for Mbc5 {
    fn kind(&self) -> MbcKind {
        MbcKind::Mbc5
    }

    fn read(&self, address: Word) -> Byte {
        match address {
            0x0000..=0x3FFF => self.rom.get(address as usize).copied().unwrap_or(0xFF),
            0x4000..=0x7FFF => {
                let bank = self.rom_bank as usize % bank_count(self.rom.len(), ROM_BANK_SIZE);
                banked_read(&self.rom, bank, ROM_BANK_SIZE, (address - 0x4000) as usize)
            }
            0xA000..=0xBFFF if self.ram_enabled => {
                self.ram.get(self.ram_offset(address)).copied().unwrap_or(0xFF)
            }
            _ => 0xFF,
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        match address {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x2FFF => self.rom_bank = (self.rom_bank & 0x100) | value as u16,
            0x3000..=0x3FFF => {
                self.rom_bank = (self.rom_bank & 0x0FF) | ((value as u16 & 0x01) << 8)
            }
            0x4000..=0x5FFF => self.ram_bank = value & 0x0F,
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::banked_rom;

    #[test]
    fn test_bank_zero_is_selectable() {
        let mut mbc = Mbc5::new(banked_rom(0x19, 0x02, 0x00), Vec::new());
        assert_eq!(mbc.read(0x4000), 1);
        mbc.write(0x2000, 0x00);
        assert_eq!(mbc.read(0x4000), 0);
        mbc.write(0x2000, 0x07);
        assert_eq!(mbc.read(0x4000), 7);
    }

    #[test]
    fn test_ninth_bank_bit() {
        // 512 banks; bank byte is the low 8 bits of the index
        let mut mbc = Mbc5::new(banked_rom(0x19, 0x08, 0x00), Vec::new());
        mbc.write(0x2000, 0x05);
        mbc.write(0x3000, 0x01);
        assert_eq!(mbc.rom_bank, 0x105);
        assert_eq!(mbc.read(0x4000), 0x05);
        assert_eq!(mbc.read(0x5000), 0x05);

        mbc.write(0x3000, 0x00);
        assert_eq!(mbc.rom_bank, 0x005);
    }

    #[test]
    fn test_sixteen_ram_banks() {
        let mut mbc = Mbc5::new(banked_rom(0x1B, 0x01, 0x04), vec![0; 0x20000]);
        mbc.write(0x0000, 0x0A);
        for bank in 0..16u8 {
            mbc.write(0x4000, bank);
            mbc.write(0xA123, bank * 3);
        }
        for bank in 0..16u8 {
            mbc.write(0x4000, bank);
            assert_eq!(mbc.read(0xA123), bank * 3);
        }
    }
}
