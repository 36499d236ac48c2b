//! CPU Module
//!
//! The SM83 core of the DMG. `step` runs one instruction (or services one
//! interrupt, or idles one halted slot) against any [`MemoryBus`] and
//! reports the T-cycles it took. IF and IE are read and written through
//! the bus at their mapped addresses, so the CPU keeps no copy of them.

pub mod alu;
pub mod execute;
pub mod fetch;
pub mod instructions;
pub mod registers;

use std::fmt;

use crate::bus::MemoryBus;
use crate::common::Word;
use crate::error::Fault;
use crate::interrupts::{Interrupt, IE_ADDRESS, IF_ADDRESS, INTERRUPT_MASK};
use registers::Registers;

/// Cost of dispatching to an interrupt handler.
pub const INTERRUPT_CYCLES: u32 = 20;
/// Cost of one idle slot while halted.
pub const HALT_CYCLES: u32 = 4;

#[derive(Debug, Clone, Default)]
pub struct Cpu {
    pub regs: Registers,
    /// Waiting for an interrupt
    pub halted: bool,
    /// Interrupt master enable
    pub ime: bool,
    /// EI was executed; IME turns on after the next instruction
    pub enabling_ime: bool,
}

impl Cpu {
    /// All registers zero, interrupts disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// CPU as the boot ROM leaves it at 0x0100.
    pub fn post_boot() -> Self {
        Self {
            regs: Registers::post_boot(),
            ..Self::default()
        }
    }

    /// Execute one step and return the T-cycles it consumed.
    pub fn step<B: MemoryBus>(&mut self, bus: &mut B) -> Result<u32, Fault> {
        let pending = self.pending_interrupts(bus);

        if self.ime && pending != 0 {
            return Ok(self.service_interrupt(bus, pending));
        }

        if self.enabling_ime {
            self.ime = true;
            self.enabling_ime = false;
        }

        if self.halted {
            if pending == 0 {
                return Ok(HALT_CYCLES);
            }
            // wake without servicing when IME is clear
            self.halted = false;
        }

        let start = self.regs.pc;
        let (opcode, inst) = self.fetch_instruction(bus);
        if !inst.is_valid() {
            self.regs.pc = start;
            return Err(Fault::InvalidOpcode { opcode, pc: start });
        }

        let operand = self.fetch_operand(bus, inst);
        debug_assert_eq!(
            self.regs.pc.wrapping_sub(start),
            inst.length as Word,
            "decode table length mismatch for opcode {opcode:#04X}"
        );

        Ok(self.execute(bus, inst, operand))
    }

    fn pending_interrupts<B: MemoryBus>(&self, bus: &B) -> u8 {
        bus.read(IF_ADDRESS) & bus.read(IE_ADDRESS) & INTERRUPT_MASK
    }

    /// Dispatch the highest-priority pending interrupt.
    fn service_interrupt<B: MemoryBus>(&mut self, bus: &mut B, pending: u8) -> u32 {
        let Some(interrupt) = Interrupt::highest_priority(pending) else {
            return 0;
        };

        let flags = bus.read(IF_ADDRESS);
        bus.write(IF_ADDRESS, flags & !interrupt.bit());

        self.ime = false;
        self.enabling_ime = false;
        self.halted = false;
        self.stack_push16(bus, self.regs.pc);
        self.regs.pc = interrupt.vector();

        INTERRUPT_CYCLES
    }
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PC={:04X} SP={:04X} AF={:04X} BC={:04X} DE={:04X} HL={:04X} IME={} HALT={}",
            self.regs.pc,
            self.regs.sp,
            self.regs.af(),
            self.regs.bc(),
            self.regs.de(),
            self.regs.hl(),
            self.ime as u8,
            self.halted as u8
        )
    }
}
