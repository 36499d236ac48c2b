//! Memory Bus
//!
//! Routes CPU and host accesses to the component that owns each address:
//! - 0x0000-0x7FFF: cartridge ROM (writes reach the bank controller)
//! - 0x8000-0x9FFF: VRAM
//! - 0xA000-0xBFFF: cartridge RAM
//! - 0xC000-0xFDFF: WRAM and its echo
//! - 0xFE00-0xFE9F: OAM (0xFF while a DMA transfer runs)
//! - 0xFEA0-0xFEFF: unusable, reads 0xFF
//! - 0xFF00-0xFF7F: I/O registers
//! - 0xFF80-0xFFFE: HRAM
//! - 0xFFFF: IE
//!
//! The bus also owns the small devices whose registers live in I/O space
//! (joypad, serial, timer, LCD registers, DMA) and the interrupt request
//! latch they share.

use std::collections::VecDeque;

use crate::cart::Cartridge;
use crate::common::{Byte, Word};
use crate::dma::{Dma, DMA_ADDRESS};
use crate::interrupts::{Interrupt, IE_ADDRESS, IF_ADDRESS, INTERRUPT_MASK};
use crate::joypad::{Button, Joypad, P1_ADDRESS};
use crate::lcd::Lcd;
use crate::ram::Ram;
use crate::timer::Timer;

pub const SB_ADDRESS: Word = 0xFF01;
pub const SC_ADDRESS: Word = 0xFF02;

/// Undrained serial bytes kept; older ones are dropped first.
pub const SERIAL_BUFFER_LIMIT: usize = 4096;

pub const VRAM_SIZE: usize = 0x2000;
pub const OAM_SIZE: usize = 0xA0;

/// Byte and word access to a 16-bit address space.
pub trait MemoryBus {
    fn read(&self, address: Word) -> Byte;

    fn write(&mut self, address: Word, value: Byte);

    /// Little-endian word read.
    fn read16(&self, address: Word) -> Word {
        let lo = self.read(address) as Word;
        let hi = self.read(address.wrapping_add(1)) as Word;
        lo | (hi << 8)
    }

    /// Little-endian word write.
    fn write16(&mut self, address: Word, value: Word) {
        self.write(address, (value & 0xFF) as Byte);
        self.write(address.wrapping_add(1), (value >> 8) as Byte);
    }
}

#[derive(Debug)]
pub struct Bus {
    cart: Option<Cartridge>,
    vram: Box<[Byte; VRAM_SIZE]>,
    oam: [Byte; OAM_SIZE],
    ram: Ram,
    pub lcd: Lcd,
    pub timer: Timer,
    pub joypad: Joypad,
    pub dma: Dma,
    /// Registers with no modelled behaviour (sound, unused)
    io: [Byte; 0x80],
    interrupt_enable: Byte,
    interrupt_flag: Byte,
    serial_data: Byte,
    serial_control: Byte,
    serial_out: VecDeque<Byte>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    /// Bus in the post-boot state, with no cartridge inserted.
    pub fn new() -> Self {
        Self {
            cart: None,
            vram: Box::new([0; VRAM_SIZE]),
            oam: [0; OAM_SIZE],
            ram: Ram::new(),
            lcd: Lcd::new(),
            timer: Timer::new(),
            joypad: Joypad::new(),
            dma: Dma::new(),
            io: [0; 0x80],
            interrupt_enable: 0,
            interrupt_flag: Interrupt::VBlank.bit(),
            serial_data: 0,
            serial_control: 0,
            serial_out: VecDeque::new(),
        }
    }

    /// Return every device to its post-boot state, keeping the cartridge.
    /// Buttons still held by the host stay held.
    pub fn reset(&mut self) {
        let cart = self.cart.take();
        let joypad = self.joypad.held();
        *self = Self::new();
        self.cart = cart;
        self.joypad = joypad;
    }

    /// Insert a cartridge, replacing (and returning) any previous one.
    pub fn load_cartridge(&mut self, cart: Cartridge) -> Option<Cartridge> {
        self.cart.replace(cart)
    }

    pub fn cartridge(&self) -> Option<&Cartridge> {
        self.cart.as_ref()
    }

    pub fn cartridge_mut(&mut self) -> Option<&mut Cartridge> {
        self.cart.as_mut()
    }

    pub fn vram(&self) -> &[Byte; VRAM_SIZE] {
        &self.vram
    }

    /// OAM as the PPU sees it, regardless of DMA.
    pub fn oam(&self) -> &[Byte; OAM_SIZE] {
        &self.oam
    }

    // ========== Interrupts ==========

    pub fn request_interrupt(&mut self, interrupt: Interrupt) {
        self.interrupt_flag |= interrupt.bit();
    }


    // ========== Devices ==========

    /// Update a button; a fresh press requests the joypad interrupt.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        if self.joypad.set_button(button, pressed) {
            self.request_interrupt(Interrupt::Joypad);
        }
    }

    /// Drain bytes sent through the serial port since the last call. At
    /// most [`SERIAL_BUFFER_LIMIT`] of the newest bytes are kept.
    pub fn take_serial_output(&mut self) -> Vec<Byte> {
        self.serial_out.drain(..).collect()
    }

    fn write_serial_control(&mut self, value: Byte) {
        // No link partner: an internally clocked transfer completes at once
        // and shifts in 0xFF.
        if value & 0x81 == 0x81 {
            if self.serial_out.len() == SERIAL_BUFFER_LIMIT {
                self.serial_out.pop_front();
            }
            self.serial_out.push_back(self.serial_data);
            self.serial_data = 0xFF;
            self.serial_control = value & 0x7F;
            self.request_interrupt(Interrupt::Serial);
        } else {
            self.serial_control = value;
        }
    }

    /// Advance the timer, the DMA engine and the cartridge clock.
    pub fn tick(&mut self, cycles: u32) {
        if self.timer.tick(cycles) {
            self.request_interrupt(Interrupt::Timer);
        }

        for index in self.dma.tick(cycles) {
            let value = self.dma_source_read(self.dma.source_address(index));
            self.oam[index as usize] = value;
        }

        if let Some(cart) = self.cart.as_mut() {
            cart.tick(cycles);
        }
    }

    /// DMA sources above 0xDFFF see the WRAM echo.
    fn dma_source_read(&self, address: Word) -> Byte {
        if address >= 0xE000 {
            self.ram.wram_read(address - 0x2000)
        } else {
            self.read(address)
        }
    }

    fn io_read(&self, address: Word) -> Byte {
        match address {
            P1_ADDRESS => self.joypad.read(),
            SB_ADDRESS => self.serial_data,
            SC_ADDRESS => 0x7E | self.serial_control,
            0xFF04..=0xFF07 => self.timer.read(address),
            IF_ADDRESS => 0xE0 | self.interrupt_flag,
            DMA_ADDRESS => self.dma.read(),
            0xFF40..=0xFF4B => self.lcd.read(address),
            _ => self.io[(address - 0xFF00) as usize],
        }
    }

    fn io_write(&mut self, address: Word, value: Byte) {
        match address {
            P1_ADDRESS => self.joypad.write(value),
            SB_ADDRESS => self.serial_data = value,
            SC_ADDRESS => self.write_serial_control(value),
            0xFF04..=0xFF07 => {
                if self.timer.write(address, value) {
                    self.request_interrupt(Interrupt::Timer);
                }
            }
            IF_ADDRESS => self.interrupt_flag = value & INTERRUPT_MASK,
            DMA_ADDRESS => self.dma.start(value),
            0xFF40..=0xFF4B => {
                if self.lcd.write(address, value) {
                    self.request_interrupt(Interrupt::LcdStat);
                }
            }
            _ => self.io[(address - 0xFF00) as usize] = value,
        }
    }
}

impl MemoryBus for Bus {
    fn read(&self, address: Word) -> Byte {
        match address {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                self.cart.as_ref().map_or(0xFF, |cart| cart.read(address))
            }
            0x8000..=0x9FFF => self.vram[(address - 0x8000) as usize],
            0xC000..=0xFDFF => self.ram.wram_read(address),
            0xFE00..=0xFE9F => {
                if self.dma.is_active() {
                    0xFF
                } else {
                    self.oam[(address - 0xFE00) as usize]
                }
            }
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00..=0xFF7F => self.io_read(address),
            0xFF80..=0xFFFE => self.ram.hram_read(address),
            IE_ADDRESS => self.interrupt_enable,
        }
    }

    fn write(&mut self, address: Word, value: Byte) {
        match address {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                if let Some(cart) = self.cart.as_mut() {
                    cart.write(address, value);
                }
            }
            0x8000..=0x9FFF => self.vram[(address - 0x8000) as usize] = value,
            0xC000..=0xFDFF => self.ram.wram_write(address, value),
            0xFE00..=0xFE9F => {
                if !self.dma.is_active() {
                    self.oam[(address - 0xFE00) as usize] = value;
                }
            }
            0xFEA0..=0xFEFF => {}
            0xFF00..=0xFF7F => self.io_write(address, value),
            0xFF80..=0xFFFE => self.ram.hram_write(address, value),
            IE_ADDRESS => self.interrupt_enable = value,
        }
    }
}
