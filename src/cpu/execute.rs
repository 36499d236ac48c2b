//! Instruction Execution
//!
//! One `proc_*` handler per instruction family. Arithmetic goes through the
//! pure functions in [`alu`](super::alu); handlers only move operands and
//! write back results and flags. `execute` returns the T-cycles consumed,
//! picking the taken cost for conditional control flow.

use super::alu;
use super::fetch::Operand;
use super::instructions::{
    cb_instruction_by_opcode, AddressingMode, ConditionType, Instruction, InstructionType,
    RegisterType,
};
use super::registers::{Flag, Flags};
use super::Cpu;
use crate::bus::MemoryBus;
use crate::common::{hi, join, lo, Byte, Word};

impl Cpu {
    fn check_condition(&self, cond: ConditionType) -> bool {
        match cond {
            ConditionType::None => true,
            ConditionType::Z => self.regs.flag(Flag::Z),
            ConditionType::Nz => !self.regs.flag(Flag::Z),
            ConditionType::C => self.regs.flag(Flag::C),
            ConditionType::Nc => !self.regs.flag(Flag::C),
        }
    }

    /// Run a decoded instruction. Invalid opcodes are rejected by the
    /// caller before they get here.
    pub(super) fn execute<B: MemoryBus>(
        &mut self,
        bus: &mut B,
        inst: &Instruction,
        op: Operand,
    ) -> u32 {
        use InstructionType::*;

        let taken = match inst.inst_type {
            Invalid | Nop | Stop => false,
            Ld | Ldh => {
                self.proc_ld(bus, inst, op);
                false
            }
            Inc => {
                self.proc_inc(bus, inst, op);
                false
            }
            Dec => {
                self.proc_dec(bus, inst, op);
                false
            }
            Add => {
                self.proc_add(inst, op);
                false
            }
            Adc | Sub | Sbc | And | Xor | Or | Cp => {
                self.proc_alu(inst.inst_type, op.data as Byte);
                false
            }
            Jr => self.proc_jr(inst, op),
            Jp => self.proc_jp(inst, op),
            Call => self.proc_call(bus, inst, op),
            Ret => self.proc_ret(bus, inst),
            Reti => {
                self.ime = true;
                self.regs.pc = self.stack_pop16(bus);
                false
            }
            Rst => {
                self.stack_push16(bus, self.regs.pc);
                self.regs.pc = inst.param as Word;
                false
            }
            Pop => {
                let value = self.stack_pop16(bus);
                self.write_reg(inst.reg1, value);
                false
            }
            Push => {
                self.stack_push16(bus, op.data);
                false
            }
            Rlca | Rrca | Rla | Rra => {
                self.proc_rotate_a(inst.inst_type);
                false
            }
            Halt => {
                self.halted = true;
                false
            }
            Daa => {
                let (result, flags) = alu::daa(self.regs.a, self.regs.flags());
                self.regs.a = result;
                self.regs.set_flags(flags);
                false
            }
            Cpl => {
                self.regs.a = !self.regs.a;
                self.regs.set_flag(Flag::N, true);
                self.regs.set_flag(Flag::H, true);
                false
            }
            Scf => {
                self.set_carry_only(true);
                false
            }
            Ccf => {
                self.set_carry_only(!self.regs.flag(Flag::C));
                false
            }
            Di => {
                self.ime = false;
                self.enabling_ime = false;
                false
            }
            Ei => {
                self.enabling_ime = true;
                false
            }
            Cb => {
                let cb = cb_instruction_by_opcode(op.data as Byte);
                self.proc_cb(bus, cb);
                return cb.cycles as u32;
            }
            Rlc | Rrc | Rl | Rr | Sla | Sra | Swap | Srl | Bit | Res | Set => {
                // only reachable through the CB table
                self.proc_cb(bus, inst);
                false
            }
        };

        if taken {
            inst.cycles_taken as u32
        } else {
            inst.cycles as u32
        }
    }

    // ========== Loads ==========

    fn proc_ld<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction, op: Operand) {
        if let Some(address) = op.dest {
            if inst.reg2.is_16bit() {
                bus.write16(address, op.data);
            } else {
                bus.write(address, op.data as Byte);
            }
            return;
        }

        if inst.mode == AddressingMode::HlSpr {
            let (result, flags) = alu::add_sp(self.regs.sp, op.data as Byte);
            self.regs.set_hl(result);
            self.regs.set_flags(flags);
            return;
        }

        self.write_reg(inst.reg1, op.data);
    }

    // ========== Arithmetic ==========

    fn proc_inc<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction, op: Operand) {
        let carry = self.regs.flag(Flag::C);
        match op.dest {
            Some(address) => {
                let (result, flags) = alu::inc8(op.data as Byte, carry);
                bus.write(address, result);
                self.regs.set_flags(flags);
            }
            None if inst.reg1.is_16bit() => {
                self.write_reg(inst.reg1, op.data.wrapping_add(1));
            }
            None => {
                let (result, flags) = alu::inc8(op.data as Byte, carry);
                self.write_reg8(inst.reg1, result);
                self.regs.set_flags(flags);
            }
        }
    }

    fn proc_dec<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction, op: Operand) {
        let carry = self.regs.flag(Flag::C);
        match op.dest {
            Some(address) => {
                let (result, flags) = alu::dec8(op.data as Byte, carry);
                bus.write(address, result);
                self.regs.set_flags(flags);
            }
            None if inst.reg1.is_16bit() => {
                self.write_reg(inst.reg1, op.data.wrapping_sub(1));
            }
            None => {
                let (result, flags) = alu::dec8(op.data as Byte, carry);
                self.write_reg8(inst.reg1, result);
                self.regs.set_flags(flags);
            }
        }
    }

    fn proc_add(&mut self, inst: &Instruction, op: Operand) {
        match inst.reg1 {
            RegisterType::Hl => {
                let zero = self.regs.flag(Flag::Z);
                let (result, flags) = alu::add16(self.regs.hl(), op.data, zero);
                self.regs.set_hl(result);
                self.regs.set_flags(flags);
            }
            RegisterType::Sp => {
                let (result, flags) = alu::add_sp(self.regs.sp, op.data as Byte);
                self.regs.sp = result;
                self.regs.set_flags(flags);
            }
            _ => {
                let (result, flags) = alu::add8(self.regs.a, op.data as Byte, false);
                self.regs.a = result;
                self.regs.set_flags(flags);
            }
        }
    }

    /// 8-bit ALU operations with A as destination.
    fn proc_alu(&mut self, kind: InstructionType, value: Byte) {
        let a = self.regs.a;
        let carry = self.regs.flag(Flag::C);
        let (result, flags) = match kind {
            InstructionType::Adc => alu::add8(a, value, carry),
            InstructionType::Sub => alu::sub8(a, value, false),
            InstructionType::Sbc => alu::sub8(a, value, carry),
            InstructionType::And => alu::and8(a, value),
            InstructionType::Xor => alu::xor8(a, value),
            InstructionType::Or => alu::or8(a, value),
            InstructionType::Cp => (a, alu::sub8(a, value, false).1),
            _ => return,
        };
        self.regs.a = result;
        self.regs.set_flags(flags);
    }

    fn proc_rotate_a(&mut self, kind: InstructionType) {
        let a = self.regs.a;
        let carry = self.regs.flag(Flag::C);
        let (result, flags) = match kind {
            InstructionType::Rlca => alu::rlc(a),
            InstructionType::Rrca => alu::rrc(a),
            InstructionType::Rla => alu::rl(a, carry),
            _ => alu::rr(a, carry),
        };
        // the accumulator forms always clear Z
        self.regs.a = result;
        self.regs.set_flags(Flags { z: false, ..flags });
    }

    fn set_carry_only(&mut self, carry: bool) {
        self.regs.set_flag(Flag::N, false);
        self.regs.set_flag(Flag::H, false);
        self.regs.set_flag(Flag::C, carry);
    }

    // ========== Control flow ==========

    fn proc_jr(&mut self, inst: &Instruction, op: Operand) -> bool {
        if !self.check_condition(inst.cond) {
            return false;
        }
        let offset = op.data as Byte as i8;
        self.regs.pc = self.regs.pc.wrapping_add(offset as i16 as Word);
        true
    }

    fn proc_jp(&mut self, inst: &Instruction, op: Operand) -> bool {
        if !self.check_condition(inst.cond) {
            return false;
        }
        self.regs.pc = op.data;
        true
    }

    fn proc_call<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction, op: Operand) -> bool {
        if !self.check_condition(inst.cond) {
            return false;
        }
        self.stack_push16(bus, self.regs.pc);
        self.regs.pc = op.data;
        true
    }

    fn proc_ret<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction) -> bool {
        if !self.check_condition(inst.cond) {
            return false;
        }
        self.regs.pc = self.stack_pop16(bus);
        true
    }

    // ========== CB prefix ==========

    fn proc_cb<B: MemoryBus>(&mut self, bus: &mut B, inst: &Instruction) {
        use InstructionType::*;

        let on_memory = inst.mode == AddressingMode::MemoryRegisterOnly;
        let value = if on_memory {
            bus.read(self.regs.hl())
        } else {
            self.read_reg8(inst.reg1)
        };
        let carry = self.regs.flag(Flag::C);

        let result = match inst.inst_type {
            Bit => {
                self.regs.set_flags(alu::test_bit(value, inst.param, carry));
                return;
            }
            Res => value & !(1 << inst.param),
            Set => value | (1 << inst.param),
            kind => {
                let (result, flags) = match kind {
                    Rlc => alu::rlc(value),
                    Rrc => alu::rrc(value),
                    Rl => alu::rl(value, carry),
                    Rr => alu::rr(value, carry),
                    Sla => alu::sla(value),
                    Sra => alu::sra(value),
                    Swap => alu::swap(value),
                    _ => alu::srl(value),
                };
                self.regs.set_flags(flags);
                result
            }
        };

        if on_memory {
            bus.write(self.regs.hl(), result);
        } else {
            self.write_reg8(inst.reg1, result);
        }
    }

    // ========== Stack ==========

    /// Push high byte first so the low byte ends up at the lower address.
    pub fn stack_push16<B: MemoryBus>(&mut self, bus: &mut B, value: Word) {
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, hi(value));
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write(self.regs.sp, lo(value));
    }

    pub fn stack_pop16<B: MemoryBus>(&mut self, bus: &mut B) -> Word {
        let low = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        let high = bus.read(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(1);
        join(high, low)
    }
}
