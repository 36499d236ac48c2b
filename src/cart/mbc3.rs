//! MBC3
//!
//! 7-bit ROM bank register, four RAM banks and a real-time clock. The clock
//! is driven by emulated cycles rather than host time, so a session replays
//! identically.

use crate::common::{bit, Byte, Word, CLOCK_HZ};

use super::{bank_count, banked_read, BankController, MbcKind, RAM_BANK_SIZE, ROM_BANK_SIZE};

/// Day-high register: bit 0 is day bit 8, bit 6 halts, bit 7 is day carry.
const DAY_HIGH_MASK: Byte = 0xC1;
const HALT_BIT: u8 = 6;
const CARRY_BIT: u8 = 7;

/// RTC register file as seen through 0xA000 when 0x08-0x0C is selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RtcRegisters {
    pub seconds: Byte,
    pub minutes: Byte,
    pub hours: Byte,
    pub day_low: Byte,
    pub day_high: Byte,
}

impl RtcRegisters {
    fn get(&self, select: Byte) -> Byte {
        match select {
            0x08 => self.seconds,
            0x09 => self.minutes,
            0x0A => self.hours,
            0x0B => self.day_low,
            0x0C => self.day_high,
            _ => 0xFF,
        }
    }

    fn set(&mut self, select: Byte, value: Byte) {
        match select {
            0x08 => self.seconds = value & 0x3F,
            0x09 => self.minutes = value & 0x3F,
            0x0A => self.hours = value & 0x1F,
            0x0B => self.day_low = value,
            0x0C => self.day_high = value & DAY_HIGH_MASK,
            _ => {}
        }
    }

    pub fn days(&self) -> u16 {
        ((self.day_high as u16 & 0x01) << 8) | self.day_low as u16
    }

    fn set_days(&mut self, days: u16) {
        self.day_low = days as u8;
        self.day_high = (self.day_high & !0x01) | ((days >> 8) as u8 & 0x01);
    }

    pub fn halted(&self) -> bool {
        bit(self.day_high, HALT_BIT)
    }

    /// Advance by one second, carrying into minutes, hours and days.
    ///
    /// Out-of-range values written by software count up to their register
    /// width and wrap to zero without carrying.
    fn advance_second(&mut self) {
        self.seconds = (self.seconds + 1) & 0x3F;
        if self.seconds != 60 {
            return;
        }
        self.seconds = 0;

        self.minutes = (self.minutes + 1) & 0x3F;
        if self.minutes != 60 {
            return;
        }
        self.minutes = 0;

        self.hours = (self.hours + 1) & 0x1F;
        if self.hours != 24 {
            return;
        }
        self.hours = 0;

        let days = self.days() + 1;
        if days == 512 {
            self.set_days(0);
            self.day_high |= 1 << CARRY_BIT;
        } else {
            self.set_days(days);
        }
    }
}

/// Cycle-driven clock with a latched copy for reads.
#[derive(Debug, Clone, Default)]
pub struct Rtc {
    live: RtcRegisters,
    latched: RtcRegisters,
    /// Cycles accumulated toward the next second
    sub_second: u32,
    /// Last value written to the latch register
    latch_prev: Option<Byte>,
}

impl Rtc {
    pub fn tick(&mut self, cycles: u32) {
        if self.live.halted() {
            return;
        }
        self.sub_second += cycles;
        while self.sub_second >= CLOCK_HZ {
            self.sub_second -= CLOCK_HZ;
            self.live.advance_second();
        }
    }

    /// Writing 0x00 then 0x01 copies the live registers into the latch.
    pub fn write_latch(&mut self, value: Byte) {
        if self.latch_prev == Some(0x00) && value == 0x01 {
            self.latched = self.live;
        }
        self.latch_prev = Some(value);
    }

    pub fn read(&self, select: Byte) -> Byte {
        self.latched.get(select)
    }

    pub fn write(&mut self, select: Byte, value: Byte) {
        if select == 0x08 {
            self.sub_second = 0;
        }
        self.live.set(select, value);
    }

    pub fn live(&self) -> RtcRegisters {
        self.live
    }

    pub fn latched(&self) -> RtcRegisters {
        self.latched
    }
}

#[derive(Debug)]
pub struct Mbc3 {
    rom: Vec<Byte>,
    ram: Vec<Byte>,
    ram_enabled: bool,
    rom_bank: u8,
    /// 0x00-0x03 selects a RAM bank, 0x08-0x0C an RTC register
    select: u8,
    rtc: Rtc,
}

impl Mbc3 {
    pub fn new(rom: Vec<Byte>, ram: Vec<Byte>) -> Self {
        Self {
            rom,
            ram,
            ram_enabled: false,
            rom_bank: 1,
            select: 0,
            rtc: Rtc::default(),
        }
    }

    pub fn rtc(&self) -> &Rtc {
        &self.rtc
    }

    fn ram_offset(&self, address: Word) -> usize {
        let bank = self.select as usize % bank_count(self.ram.len(), RAM_BANK_SIZE);
        bank * RAM_BANK_SIZE + (address - 0xA000) as usize
    }
}

impl BankController for Mbc3 {
    fn kind(&self) -> MbcKind {
        MbcKind::Mbc3
    }

    fn read(&self, address: Word) -> Byte {
        match address {
            0x0000..=0x3FFF => self.rom.get(address as usize).copied().unwrap_or(0xFF),
            0x4000..=0x7FFF => {
                let bank = self.rom_bank as usize % bank_count(self.rom.len(), ROM_BANK_SIZE);
                banked_read(&self.rom, bank, ROM_BANK_SIZE, (address - 0x4000) as usize)
            }
            0xA000..=0xBFFF if self.ram_enabled => match self.select {
                0x00..=0x03 => self.ram.get(self.ram_offset(address)).copied().unwrap_or(0xFF),
                0x08..=0x0C => self.rtc.read(self.select),
                _ => 0xFF,
            },
            _ => 0xFF,
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        match address {
            0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
            0x2000..=0x3FFF => {
                let bank = value & 0x7F;
                self.rom_bank = if bank == 0 { 1 } else { bank };
            }
            0x4000..=0x5FFF => self.select = value & 0x0F,
            0x6000..=0x7FFF => self.rtc.write_latch(value),
            0xA000..=0xBFFF if self.ram_enabled => match self.select {
                0x00..=0x03 => {
                    let offset = self.ram_offset(address);
                    if let Some(slot) = self.ram.get_mut(offset) {
                        *slot = value;
                    }
                }
                0x08..=0x0C => self.rtc.write(self.select, value),
                _ => {}
            },
            _ => {}
        }
    }

    fn ram(&self) -> &[Byte] {
        &self.ram
    }

    fn ram_mut(&mut self) -> &mut [Byte] {
        &mut self.ram
    }

    fn tick(&mut self, cycles: u32) {
        self.rtc.tick(cycles);
    }
}
