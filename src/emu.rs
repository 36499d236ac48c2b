//! Emulator Core
//!
//! [`Emulator`] is one session: CPU, memory bus and PPU stepped in lockstep.
//! Each step runs one CPU instruction and feeds its cycle count to the
//! timer, DMA, cartridge clock and PPU, so a given cartridge and input
//! trace always produce the same frames.

use std::fmt;
use std::path::Path;

use log::Level;

use crate::bus::{Bus, MemoryBus};
use crate::cart::{Cartridge, RomHeader};
use crate::common::{Byte, Word};
use crate::config::EmulatorConfig;
use crate::cpu::registers::Registers;
use crate::cpu::Cpu;
use crate::diagnostics::Diagnostics;
use crate::error::{Fault, LoadError};
use crate::joypad::Button;
use crate::lcd::PpuMode;
use crate::ppu::{FrameBuffer, Ppu, CYCLES_PER_FRAME};

/// Receives every finished frame.
pub type DrawCallback = Box<dyn FnMut(&FrameBuffer) + Send>;

pub struct Emulator {
    config: EmulatorConfig,
    cpu: Cpu,
    bus: Bus,
    ppu: Ppu,
    diagnostics: Box<dyn Diagnostics + Send>,
    draw: Option<DrawCallback>,
    running: bool,
    total_cycles: u64,
}

impl fmt::Debug for Emulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emulator")
            .field("cpu", &self.cpu)
            .field("ppu_mode", &self.ppu.mode())
            .field("line", &self.ppu.line())
            .field("running", &self.running)
            .field("total_cycles", &self.total_cycles)
            .finish_non_exhaustive()
    }
}

impl Emulator {
    /// Session with no cartridge, in the post-boot state.
    pub fn new(config: EmulatorConfig, diagnostics: Box<dyn Diagnostics + Send>) -> Self {
        Self {
            cpu: Cpu::post_boot(),
            bus: Bus::new(),
            ppu: Ppu::new(config.palette),
            config,
            diagnostics,
            draw: None,
            running: false,
            total_cycles: 0,
        }
    }

    /// Load a cartridge image, replacing any previous one, and reset.
    pub fn load_rom(&mut self, rom: Vec<Byte>) -> Result<&RomHeader, LoadError> {
        let cart = Cartridge::from_bytes(rom, self.diagnostics.as_mut())?;
        self.insert(cart)
    }

    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&RomHeader, LoadError> {
        let cart = Cartridge::load(path, self.diagnostics.as_mut())?;
        self.insert(cart)
    }

    fn insert(&mut self, cart: Cartridge) -> Result<&RomHeader, LoadError> {
        self.diagnostics.report(
            Level::Info,
            format_args!("cartridge '{}' ({})", cart.header.title, cart.kind()),
        );
        self.bus.load_cartridge(cart);
        self.reset();
        self.header().ok_or(LoadError::NotLoaded)
    }

    pub fn set_draw_callback(&mut self, draw: DrawCallback) {
        self.draw = Some(draw);
    }

    /// Power-cycle the machine. The cartridge, its bank registers and its
    /// RAM survive.
    pub fn reset(&mut self) {
        self.cpu = Cpu::post_boot();
        self.bus.reset();
        self.ppu.reset();
        self.total_cycles = 0;
    }

    /// Let [`run_frame`](Self::run_frame) make progress. Has no effect
    /// without a cartridge.
    pub fn start(&mut self) {
        self.running = self.bus.cartridge().is_some();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Execute one instruction and advance every device by its cost.
    ///
    /// Single-stepping works whether or not the session is running. A fault
    /// stops the session.
    pub fn step(&mut self) -> Result<u32, Fault> {
        if self.bus.cartridge().is_none() {
            return Err(Fault::NoCartridge);
        }

        let cycles = match self.cpu.step(&mut self.bus) {
            Ok(cycles) => cycles,
            Err(fault) => {
                self.running = false;
                self.diagnostics
                    .report(Level::Error, format_args!("{fault}; session stopped ({})", self.cpu));
                return Err(fault);
            }
        };

        self.bus.tick(cycles);
        let draw = &mut self.draw;
        self.ppu.tick(cycles, &mut self.bus, |frame| {
            if let Some(draw) = draw.as_mut() {
                draw(frame);
            }
        });
        self.total_cycles += cycles as u64;

        Ok(cycles)
    }

    /// Step until the next VBlank entry and on through VBlank. With the LCD
    /// off, step one frame's worth of cycles instead. Returns the cycles
    /// run, or 0 if the session is stopped.
    pub fn run_frame(&mut self) -> Result<u64, Fault> {
        if !self.running {
            return Ok(0);
        }

        let start_cycles = self.total_cycles;
        let start_frame = self.ppu.frame_count();
        loop {
            self.step()?;
            let elapsed = self.total_cycles - start_cycles;

            if self.ppu.mode() == PpuMode::LcdOff {
                if elapsed >= CYCLES_PER_FRAME as u64 {
                    break;
                }
            } else if self.ppu.frame_count() != start_frame && self.ppu.mode() != PpuMode::VBlank {
                break;
            }
        }
        Ok(self.total_cycles - start_cycles)
    }

    pub fn press(&mut self, button: Button) {
        self.bus.set_button(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.bus.set_button(button, false);
    }

    /// Frames completed since the last reset.
    pub fn frame_count(&self) -> u64 {
        self.ppu.frame_count()
    }

    /// T-cycles executed since the last reset.
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// Most recent frame contents.
    pub fn frame(&self) -> &FrameBuffer {
        self.ppu.frame()
    }

    /// Read through the memory map, with the same side effects as the CPU.
    pub fn read(&self, address: Word) -> Byte {
        self.bus.read(address)
    }

    pub fn write(&mut self, address: Word, value: Byte) {
        self.bus.write(address, value);
    }

    pub fn header(&self) -> Option<&RomHeader> {
        self.bus.cartridge().map(|cart| &cart.header)
    }

    /// External RAM bytes for persisting; `None` without a cartridge.
    pub fn cartridge_ram(&self) -> Option<&[Byte]> {
        self.bus.cartridge().map(Cartridge::ram)
    }

    /// Restore persisted external RAM. A size mismatch loads what fits and
    /// warns.
    pub fn load_cartridge_ram(&mut self, data: &[Byte]) -> Result<(), LoadError> {
        let cart = self.bus.cartridge_mut().ok_or(LoadError::NotLoaded)?;
        let expected = cart.ram().len();
        let copied = cart.load_ram(data);
        if data.len() != expected {
            self.diagnostics.warn(format_args!(
                "saved RAM is {} bytes, cartridge has {}; loaded {}",
                data.len(),
                expected,
                copied
            ));
        }
        Ok(())
    }

    /// Drain bytes the program has sent through the serial port.
    pub fn take_serial_output(&mut self) -> Vec<Byte> {
        self.bus.take_serial_output()
    }

    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }
}
