//! Instruction Fetch
//!
//! Reads the opcode and its immediate bytes and resolves the operand for
//! the instruction's addressing mode. HL auto-increment/decrement happens
//! here, so execution only ever sees the resolved value and destination.

use super::instructions::{instruction_by_opcode, AddressingMode, Instruction, RegisterType};
use super::Cpu;
use crate::bus::MemoryBus;
use crate::common::{join, Byte, Word};

/// Resolved operand of one instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Operand {
    /// Source value (immediate, register or memory contents)
    pub data: Word,
    /// Memory destination, when the result is stored to memory
    pub dest: Option<Word>,
}

impl Cpu {
    pub fn read_reg(&self, reg: RegisterType) -> Word {
        match reg {
            RegisterType::None => 0,
            RegisterType::Af => self.regs.af(),
            RegisterType::Bc => self.regs.bc(),
            RegisterType::De => self.regs.de(),
            RegisterType::Hl => self.regs.hl(),
            RegisterType::Sp => self.regs.sp,
            reg => self.read_reg8(reg) as Word,
        }
    }

    pub fn write_reg(&mut self, reg: RegisterType, value: Word) {
        match reg {
            RegisterType::None => {}
            RegisterType::Af => self.regs.set_af(value),
            RegisterType::Bc => self.regs.set_bc(value),
            RegisterType::De => self.regs.set_de(value),
            RegisterType::Hl => self.regs.set_hl(value),
            RegisterType::Sp => self.regs.sp = value,
            reg => self.write_reg8(reg, value as Byte),
        }
    }

    pub(super) fn read_reg8(&self, reg: RegisterType) -> Byte {
        match reg {
            RegisterType::A => self.regs.a,
            RegisterType::B => self.regs.b,
            RegisterType::C => self.regs.c,
            RegisterType::D => self.regs.d,
            RegisterType::E => self.regs.e,
            RegisterType::H => self.regs.h,
            RegisterType::L => self.regs.l,
            _ => 0,
        }
    }

    pub(super) fn write_reg8(&mut self, reg: RegisterType, value: Byte) {
        match reg {
            RegisterType::A => self.regs.a = value,
            RegisterType::B => self.regs.b = value,
            RegisterType::C => self.regs.c = value,
            RegisterType::D => self.regs.d = value,
            RegisterType::E => self.regs.e = value,
            RegisterType::H => self.regs.h = value,
            RegisterType::L => self.regs.l = value,
            _ => {}
        }
    }

    pub(super) fn read_pc8<B: MemoryBus>(&mut self, bus: &B) -> Byte {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn read_pc16<B: MemoryBus>(&mut self, bus: &B) -> Word {
        let lo = self.read_pc8(bus);
        let hi = self.read_pc8(bus);
        join(hi, lo)
    }

    /// Address named by a register operand; `C` is an offset into page 0xFF.
    fn indirect(&self, reg: RegisterType) -> Word {
        match reg {
            RegisterType::C => 0xFF00 | self.regs.c as Word,
            reg => self.read_reg(reg),
        }
    }

    fn step_hl(&mut self, forward: bool) -> Word {
        let hl = self.regs.hl();
        self.regs.set_hl(if forward {
            hl.wrapping_add(1)
        } else {
            hl.wrapping_sub(1)
        });
        hl
    }

    /// Fetch the opcode at PC and advance past it.
    pub fn fetch_instruction<B: MemoryBus>(&mut self, bus: &B) -> (Byte, &'static Instruction) {
        let opcode = self.read_pc8(bus);
        (opcode, instruction_by_opcode(opcode))
    }

    /// Consume the immediate bytes of `inst` and resolve its operand.
    pub fn fetch_operand<B: MemoryBus>(&mut self, bus: &B, inst: &Instruction) -> Operand {
        use AddressingMode::*;

        match inst.mode {
            Implied => Operand::default(),
            Register => Operand { data: self.read_reg(inst.reg1), dest: None },
            RegisterRegister => Operand { data: self.read_reg(inst.reg2), dest: None },
            RegisterD8 | D8 | HlSpr => Operand { data: self.read_pc8(bus) as Word, dest: None },
            RegisterD16 | D16 => Operand { data: self.read_pc16(bus), dest: None },
            MemoryRegister => Operand {
                data: self.read_reg(inst.reg2),
                dest: Some(self.indirect(inst.reg1)),
            },
            RegisterMemory => Operand {
                data: bus.read(self.indirect(inst.reg2)) as Word,
                dest: None,
            },
            RegisterHli | RegisterHld => {
                let address = self.step_hl(inst.mode == RegisterHli);
                Operand { data: bus.read(address) as Word, dest: None }
            }
            HliRegister | HldRegister => {
                let address = self.step_hl(inst.mode == HliRegister);
                Operand { data: self.read_reg(inst.reg2), dest: Some(address) }
            }
            RegisterA8 => {
                let address = 0xFF00 | self.read_pc8(bus) as Word;
                Operand { data: bus.read(address) as Word, dest: None }
            }
            A8Register => {
                let address = 0xFF00 | self.read_pc8(bus) as Word;
                Operand { data: self.read_reg(inst.reg2), dest: Some(address) }
            }
            RegisterA16 => {
                let address = self.read_pc16(bus);
                Operand { data: bus.read(address) as Word, dest: None }
            }
            A16Register => {
                let address = self.read_pc16(bus);
                Operand { data: self.read_reg(inst.reg2), dest: Some(address) }
            }
            MemoryRegisterD8 => Operand {
                data: self.read_pc8(bus) as Word,
                dest: Some(self.regs.hl()),
            },
            MemoryRegisterOnly => {
                let address = self.regs.hl();
                Operand { data: bus.read(address) as Word, dest: Some(address) }
            }
        }
    }
}
