//! CPU Instructions
//!
//! Instruction kinds, operand addressing modes and the two 256-entry decode
//! tables. Every entry carries its byte length and its cost in T-cycles;
//! conditional control flow has a second cost used when the branch is
//! taken.

use crate::common::Byte;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionType {
    /// Opcode with no defined behaviour
    Invalid,
    Nop,
    Ld,
    Ldh,
    Inc,
    Dec,
    Rlca,
    Add,
    Rrca,
    Stop,
    Rla,
    Jr,
    Rra,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Halt,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
    Pop,
    Jp,
    Push,
    Ret,
    Cb,
    Call,
    Reti,
    Di,
    Ei,
    Rst,
    // CB-prefixed
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
    Bit,
    Res,
    Set,
}

/// Where an instruction takes its operand from and where the result goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    /// Operand is `reg1`
    Register,
    /// `reg1` <- `reg2`
    RegisterRegister,
    /// (`reg1`) <- `reg2`; `C` addresses 0xFF00+C
    MemoryRegister,
    /// `reg1` <- (`reg2`); `C` addresses 0xFF00+C
    RegisterMemory,
    RegisterD8,
    RegisterD16,
    /// `reg1` <- (0xFF00+d8)
    RegisterA8,
    /// `reg1` <- (a16)
    RegisterA16,
    /// (0xFF00+d8) <- `reg2`
    A8Register,
    /// (a16) <- `reg2`
    A16Register,
    /// (HL) <- d8
    MemoryRegisterD8,
    /// (HL+) <- `reg2`
    HliRegister,
    /// (HL-) <- `reg2`
    HldRegister,
    /// `reg1` <- (HL+)
    RegisterHli,
    /// `reg1` <- (HL-)
    RegisterHld,
    /// HL <- SP + e8
    HlSpr,
    D8,
    D16,
    /// Read-modify-write on (HL)
    MemoryRegisterOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterType {
    None,
    A,
    B,
    C,
    D,
    E,
    H,
    L,
    Af,
    Bc,
    De,
    Hl,
    Sp,
}

impl RegisterType {
    pub const fn is_16bit(self) -> bool {
        matches!(
            self,
            RegisterType::Af | RegisterType::Bc | RegisterType::De | RegisterType::Hl | RegisterType::Sp
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionType {
    None,
    Nz,
    Z,
    Nc,
    C,
}

/// One decode table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub inst_type: InstructionType,
    pub mode: AddressingMode,
    pub reg1: RegisterType,
    pub reg2: RegisterType,
    pub cond: ConditionType,
    /// RST vector, or bit index for BIT/RES/SET
    pub param: Byte,
    /// Bytes including the opcode (and the CB prefix)
    pub length: u8,
    /// T-cycles when no branch is taken
    pub cycles: u8,
    /// T-cycles when a conditional branch is taken
    pub cycles_taken: u8,
}

impl Instruction {
    pub const INVALID: Instruction = Instruction {
        inst_type: InstructionType::Invalid,
        mode: AddressingMode::Implied,
        reg1: RegisterType::None,
        reg2: RegisterType::None,
        cond: ConditionType::None,
        param: 0,
        length: 1,
        cycles: 4,
        cycles_taken: 4,
    };

    pub fn is_valid(&self) -> bool {
        self.inst_type != InstructionType::Invalid
    }
}

macro_rules! op {
    ($len:expr, $cyc:expr, $t:ident) => {
        op!($len, $cyc, $t, Implied, None, None)
    };
    ($len:expr, $cyc:expr, $t:ident, $m:ident) => {
        op!($len, $cyc, $t, $m, None, None)
    };
    ($len:expr, $cyc:expr, $t:ident, $m:ident, $r1:ident) => {
        op!($len, $cyc, $t, $m, $r1, None)
    };
    ($len:expr, $cyc:expr, $t:ident, $m:ident, $r1:ident, $r2:ident) => {
        Instruction {
            inst_type: InstructionType::$t,
            mode: AddressingMode::$m,
            reg1: RegisterType::$r1,
            reg2: RegisterType::$r2,
            cond: ConditionType::None,
            param: 0,
            length: $len,
            cycles: $cyc,
            cycles_taken: $cyc,
        }
    };
}

/// Conditional control flow: cost when not taken, then when taken.
macro_rules! branch {
    ($len:expr, $cyc:expr, $taken:expr, $t:ident, $m:ident, $cond:ident) => {
        Instruction {
            inst_type: InstructionType::$t,
            mode: AddressingMode::$m,
            reg1: RegisterType::None,
            reg2: RegisterType::None,
            cond: ConditionType::$cond,
            param: 0,
            length: $len,
            cycles: $cyc,
            cycles_taken: $taken,
        }
    };
}

macro_rules! rst {
    ($vector:expr) => {
        Instruction {
            param: $vector,
            ..op!(1, 16, Rst)
        }
    };
}

const INVALID: Instruction = Instruction::INVALID;

/// Base opcode table.
///
/// The 0xCB entry only consumes the prefix and its operand byte; the cost
/// of a prefixed instruction comes from [`CB_INSTRUCTIONS`].
pub static INSTRUCTIONS: [Instruction; 256] = [
    // 0x00
    op!(1, 4, Nop),
    op!(3, 12, Ld, RegisterD16, Bc),
    op!(1, 8, Ld, MemoryRegister, Bc, A),
    op!(1, 8, Inc, Register, Bc),
    op!(1, 4, Inc, Register, B),
    op!(1, 4, Dec, Register, B),
    op!(2, 8, Ld, RegisterD8, B),
    op!(1, 4, Rlca),
    op!(3, 20, Ld, A16Register, None, Sp),
    op!(1, 8, Add, RegisterRegister, Hl, Bc),
    op!(1, 8, Ld, RegisterMemory, A, Bc),
    op!(1, 8, Dec, Register, Bc),
    op!(1, 4, Inc, Register, C),
    op!(1, 4, Dec, Register, C),
    op!(2, 8, Ld, RegisterD8, C),
    op!(1, 4, Rrca),
    // 0x10
    op!(2, 4, Stop, D8),
    op!(3, 12, Ld, RegisterD16, De),
    op!(1, 8, Ld, MemoryRegister, De, A),
    op!(1, 8, Inc, Register, De),
    op!(1, 4, Inc, Register, D),
    op!(1, 4, Dec, Register, D),
    op!(2, 8, Ld, RegisterD8, D),
    op!(1, 4, Rla),
    op!(2, 12, Jr, D8),
    op!(1, 8, Add, RegisterRegister, Hl, De),
    op!(1, 8, Ld, RegisterMemory, A, De),
    op!(1, 8, Dec, Register, De),
    op!(1, 4, Inc, Register, E),
    op!(1, 4, Dec, Register, E),
    op!(2, 8, Ld, RegisterD8, E),
    op!(1, 4, Rra),
    // 0x20
    branch!(2, 8, 12, Jr, D8, Nz),
    op!(3, 12, Ld, RegisterD16, Hl),
    op!(1, 8, Ld, HliRegister, Hl, A),
    op!(1, 8, Inc, Register, Hl),
    op!(1, 4, Inc, Register, H),
    op!(1, 4, Dec, Register, H),
    op!(2, 8, Ld, RegisterD8, H),
    op!(1, 4, Daa),
    branch!(2, 8, 12, Jr, D8, Z),
    op!(1, 8, Add, RegisterRegister, Hl, Hl),
    op!(1, 8, Ld, RegisterHli, A, Hl),
    op!(1, 8, Dec, Register, Hl),
    op!(1, 4, Inc, Register, L),
    op!(1, 4, Dec, Register, L),
    op!(2, 8, Ld, RegisterD8, L),
    op!(1, 4, Cpl),
    // 0x30
    branch!(2, 8, 12, Jr, D8, Nc),
    op!(3, 12, Ld, RegisterD16, Sp),
    op!(1, 8, Ld, HldRegister, Hl, A),
    op!(1, 8, Inc, Register, Sp),
    op!(1, 12, Inc, MemoryRegisterOnly, Hl),
    op!(1, 12, Dec, MemoryRegisterOnly, Hl),
    op!(2, 12, Ld, MemoryRegisterD8, Hl),
    op!(1, 4, Scf),
    branch!(2, 8, 12, Jr, D8, C),
    op!(1, 8, Add, RegisterRegister, Hl, Sp),
    op!(1, 8, Ld, RegisterHld, A, Hl),
    op!(1, 8, Dec, Register, Sp),
    op!(1, 4, Inc, Register, A),
    op!(1, 4, Dec, Register, A),
    op!(2, 8, Ld, RegisterD8, A),
    op!(1, 4, Ccf),
    // 0x40
    op!(1, 4, Ld, RegisterRegister, B, B),
    op!(1, 4, Ld, RegisterRegister, B, C),
    op!(1, 4, Ld, RegisterRegister, B, D),
    op!(1, 4, Ld, RegisterRegister, B, E),
    op!(1, 4, Ld, RegisterRegister, B, H),
    op!(1, 4, Ld, RegisterRegister, B, L),
    op!(1, 8, Ld, RegisterMemory, B, Hl),
    op!(1, 4, Ld, RegisterRegister, B, A),
    op!(1, 4, Ld, RegisterRegister, C, B),
    op!(1, 4, Ld, RegisterRegister, C, C),
    op!(1, 4, Ld, RegisterRegister, C, D),
    op!(1, 4, Ld, RegisterRegister, C, E),
    op!(1, 4, Ld, RegisterRegister, C, H),
    op!(1, 4, Ld, RegisterRegister, C, L),
    op!(1, 8, Ld, RegisterMemory, C, Hl),
    op!(1, 4, Ld, RegisterRegister, C, A),
    // 0x50
    op!(1, 4, Ld, RegisterRegister, D, B),
    op!(1, 4, Ld, RegisterRegister, D, C),
    op!(1, 4, Ld, RegisterRegister, D, D),
    op!(1, 4, Ld, RegisterRegister, D, E),
    op!(1, 4, Ld, RegisterRegister, D, H),
    op!(1, 4, Ld, RegisterRegister, D, L),
    op!(1, 8, Ld, RegisterMemory, D, Hl),
    op!(1, 4, Ld, RegisterRegister, D, A),
    op!(1, 4, Ld, RegisterRegister, E, B),
    op!(1, 4, Ld, RegisterRegister, E, C),
    op!(1, 4, Ld, RegisterRegister, E, D),
    op!(1, 4, Ld, RegisterRegister, E, E),
    op!(1, 4, Ld, RegisterRegister, E, H),
    op!(1, 4, Ld, RegisterRegister, E, L),
    op!(1, 8, Ld, RegisterMemory, E, Hl),
    op!(1, 4, Ld, RegisterRegister, E, A),
    // 0x60
    op!(1, 4, Ld, RegisterRegister, H, B),
    op!(1, 4, Ld, RegisterRegister, H, C),
    op!(1, 4, Ld, RegisterRegister, H, D),
    op!(1, 4, Ld, RegisterRegister, H, E),
    op!(1, 4, Ld, RegisterRegister, H, H),
    op!(1, 4, Ld, RegisterRegister, H, L),
    op!(1, 8, Ld, RegisterMemory, H, Hl),
    op!(1, 4, Ld, RegisterRegister, H, A),
    op!(1, 4, Ld, RegisterRegister, L, B),
    op!(1, 4, Ld, RegisterRegister, L, C),
    op!(1, 4, Ld, RegisterRegister, L, D),
    op!(1, 4, Ld, RegisterRegister, L, E),
    op!(1, 4, Ld, RegisterRegister, L, H),
    op!(1, 4, Ld, RegisterRegister, L, L),
    op!(1, 8, Ld, RegisterMemory, L, Hl),
    op!(1, 4, Ld, RegisterRegister, L, A),
    // 0x70
    op!(1, 8, Ld, MemoryRegister, Hl, B),
    op!(1, 8, Ld, MemoryRegister, Hl, C),
    op!(1, 8, Ld, MemoryRegister, Hl, D),
    op!(1, 8, Ld, MemoryRegister, Hl, E),
    op!(1, 8, Ld, MemoryRegister, Hl, H),
    op!(1, 8, Ld, MemoryRegister, Hl, L),
    op!(1, 4, Halt),
    op!(1, 8, Ld, MemoryRegister, Hl, A),
    op!(1, 4, Ld, RegisterRegister, A, B),
    op!(1, 4, Ld, RegisterRegister, A, C),
    op!(1, 4, Ld, RegisterRegister, A, D),
    op!(1, 4, Ld, RegisterRegister, A, E),
    op!(1, 4, Ld, RegisterRegister, A, H),
    op!(1, 4, Ld, RegisterRegister, A, L),
    op!(1, 8, Ld, RegisterMemory, A, Hl),
    op!(1, 4, Ld, RegisterRegister, A, A),
    // 0x80
    op!(1, 4, Add, RegisterRegister, A, B),
    op!(1, 4, Add, RegisterRegister, A, C),
    op!(1, 4, Add, RegisterRegister, A, D),
    op!(1, 4, Add, RegisterRegister, A, E),
    op!(1, 4, Add, RegisterRegister, A, H),
    op!(1, 4, Add, RegisterRegister, A, L),
    op!(1, 8, Add, RegisterMemory, A, Hl),
    op!(1, 4, Add, RegisterRegister, A, A),
    op!(1, 4, Adc, RegisterRegister, A, B),
    op!(1, 4, Adc, RegisterRegister, A, C),
    op!(1, 4, Adc, RegisterRegister, A, D),
    op!(1, 4, Adc, RegisterRegister, A, E),
    op!(1, 4, Adc, RegisterRegister, A, H),
    op!(1, 4, Adc, RegisterRegister, A, L),
    op!(1, 8, Adc, RegisterMemory, A, Hl),
    op!(1, 4, Adc, RegisterRegister, A, A),
    // 0x90
    op!(1, 4, Sub, RegisterRegister, A, B),
    op!(1, 4, Sub, RegisterRegister, A, C),
    op!(1, 4, Sub, RegisterRegister, A, D),
    op!(1, 4, Sub, RegisterRegister, A, E),
    op!(1, 4, Sub, RegisterRegister, A, H),
    op!(1, 4, Sub, RegisterRegister, A, L),
    op!(1, 8, Sub, RegisterMemory, A, Hl),
    op!(1, 4, Sub, RegisterRegister, A, A),
    op!(1, 4, Sbc, RegisterRegister, A, B),
    op!(1, 4, Sbc, RegisterRegister, A, C),
    op!(1, 4, Sbc, RegisterRegister, A, D),
    op!(1, 4, Sbc, RegisterRegister, A, E),
    op!(1, 4, Sbc, RegisterRegister, A, H),
    op!(1, 4, Sbc, RegisterRegister, A, L),
    op!(1, 8, Sbc, RegisterMemory, A, Hl),
    op!(1, 4, Sbc, RegisterRegister, A, A),
    // 0xA0
    op!(1, 4, And, RegisterRegister, A, B),
    op!(1, 4, And, RegisterRegister, A, C),
    op!(1, 4, And, RegisterRegister, A, D),
    op!(1, 4, And, RegisterRegister, A, E),
    op!(1, 4, And, RegisterRegister, A, H),
    op!(1, 4, And, RegisterRegister, A, L),
    op!(1, 8, And, RegisterMemory, A, Hl),
    op!(1, 4, And, RegisterRegister, A, A),
    op!(1, 4, Xor, RegisterRegister, A, B),
    op!(1, 4, Xor, RegisterRegister, A, C),
    op!(1, 4, Xor, RegisterRegister, A, D),
    op!(1, 4, Xor, RegisterRegister, A, E),
    op!(1, 4, Xor, RegisterRegister, A, H),
    op!(1, 4, Xor, RegisterRegister, A, L),
    op!(1, 8, Xor, RegisterMemory, A, Hl),
    op!(1, 4, Xor, RegisterRegister, A, A),
    // 0xB0
    op!(1, 4, Or, RegisterRegister, A, B),
    op!(1, 4, Or, RegisterRegister, A, C),
    op!(1, 4, Or, RegisterRegister, A, D),
    op!(1, 4, Or, RegisterRegister, A, E),
    op!(1, 4, Or, RegisterRegister, A, H),
    op!(1, 4, Or, RegisterRegister, A, L),
    op!(1, 8, Or, RegisterMemory, A, Hl),
    op!(1, 4, Or, RegisterRegister, A, A),
    op!(1, 4, Cp, RegisterRegister, A, B),
    op!(1, 4, Cp, RegisterRegister, A, C),
    op!(1, 4, Cp, RegisterRegister, A, D),
    op!(1, 4, Cp, RegisterRegister, A, E),
    op!(1, 4, Cp, RegisterRegister, A, H),
    op!(1, 4, Cp, RegisterRegister, A, L),
    op!(1, 8, Cp, RegisterMemory, A, Hl),
    op!(1, 4, Cp, RegisterRegister, A, A),
    // 0xC0
    branch!(1, 8, 20, Ret, Implied, Nz),
    op!(1, 12, Pop, Register, Bc),
    branch!(3, 12, 16, Jp, D16, Nz),
    op!(3, 16, Jp, D16),
    branch!(3, 12, 24, Call, D16, Nz),
    op!(1, 16, Push, Register, Bc),
    op!(2, 8, Add, RegisterD8, A),
    rst!(0x00),
    branch!(1, 8, 20, Ret, Implied, Z),
    op!(1, 16, Ret),
    branch!(3, 12, 16, Jp, D16, Z),
    op!(2, 8, Cb, D8),
    branch!(3, 12, 24, Call, D16, Z),
    op!(3, 24, Call, D16),
    op!(2, 8, Adc, RegisterD8, A),
    rst!(0x08),
    // 0xD0
    branch!(1, 8, 20, Ret, Implied, Nc),
    op!(1, 12, Pop, Register, De),
    branch!(3, 12, 16, Jp, D16, Nc),
    INVALID,
    branch!(3, 12, 24, Call, D16, Nc),
    op!(1, 16, Push, Register, De),
    op!(2, 8, Sub, RegisterD8, A),
    rst!(0x10),
    branch!(1, 8, 20, Ret, Implied, C),
    op!(1, 16, Reti),
    branch!(3, 12, 16, Jp, D16, C),
    INVALID,
    branch!(3, 12, 24, Call, D16, C),
    INVALID,
    op!(2, 8, Sbc, RegisterD8, A),
    rst!(0x18),
    // 0xE0
    op!(2, 12, Ldh, A8Register, None, A),
    op!(1, 12, Pop, Register, Hl),
    op!(1, 8, Ld, MemoryRegister, C, A),
    INVALID,
    INVALID,
    op!(1, 16, Push, Register, Hl),
    op!(2, 8, And, RegisterD8, A),
    rst!(0x20),
    op!(2, 16, Add, RegisterD8, Sp),
    op!(1, 4, Jp, Register, Hl),
    op!(3, 16, Ld, A16Register, None, A),
    INVALID,
    INVALID,
    INVALID,
    op!(2, 8, Xor, RegisterD8, A),
    rst!(0x28),
    // 0xF0
    op!(2, 12, Ldh, RegisterA8, A),
    op!(1, 12, Pop, Register, Af),
    op!(1, 8, Ld, RegisterMemory, A, C),
    op!(1, 4, Di),
    INVALID,
    op!(1, 16, Push, Register, Af),
    op!(2, 8, Or, RegisterD8, A),
    rst!(0x30),
    op!(2, 12, Ld, HlSpr, Hl, Sp),
    op!(1, 8, Ld, RegisterRegister, Sp, Hl),
    op!(3, 16, Ld, RegisterA16, A),
    op!(1, 4, Ei),
    INVALID,
    INVALID,
    op!(2, 8, Cp, RegisterD8, A),
    rst!(0x38),
];

/// Operand register for CB opcode bits 0-2.
const CB_TARGETS: [RegisterType; 8] = [
    RegisterType::B,
    RegisterType::C,
    RegisterType::D,
    RegisterType::E,
    RegisterType::H,
    RegisterType::L,
    RegisterType::Hl,
    RegisterType::A,
];

/// Rotate/shift kind for CB opcodes 0x00-0x3F, by bits 3-5.
const CB_SHIFTS: [InstructionType; 8] = [
    InstructionType::Rlc,
    InstructionType::Rrc,
    InstructionType::Rl,
    InstructionType::Rr,
    InstructionType::Sla,
    InstructionType::Sra,
    InstructionType::Swap,
    InstructionType::Srl,
];

const fn cb_entry(opcode: u8) -> Instruction {
    let target = CB_TARGETS[(opcode & 0x07) as usize];
    let selector = (opcode >> 3) & 0x07;
    let group = opcode >> 6;
    let on_hl = matches!(target, RegisterType::Hl);

    let inst_type = match group {
        0 => CB_SHIFTS[selector as usize],
        1 => InstructionType::Bit,
        2 => InstructionType::Res,
        _ => InstructionType::Set,
    };
    // (HL) costs two extra memory accesses, BIT only one
    let cycles = match (on_hl, group) {
        (false, _) => 8,
        (true, 1) => 12,
        (true, _) => 16,
    };

    Instruction {
        inst_type,
        mode: if on_hl {
            AddressingMode::MemoryRegisterOnly
        } else {
            AddressingMode::Register
        },
        reg1: target,
        reg2: RegisterType::None,
        cond: ConditionType::None,
        param: selector,
        length: 2,
        cycles,
        cycles_taken: cycles,
    }
}

const fn build_cb_table() -> [Instruction; 256] {
    let mut table = [Instruction::INVALID; 256];
    let mut opcode = 0;
    while opcode < 256 {
        table[opcode] = cb_entry(opcode as u8);
        opcode += 1;
    }
    table
}

/// CB-prefixed table. Costs include the prefix fetch.
pub static CB_INSTRUCTIONS: [Instruction; 256] = build_cb_table();

#[inline]
pub fn instruction_by_opcode(opcode: Byte) -> &'static Instruction {
    &INSTRUCTIONS[opcode as usize]
}

#[inline]
pub fn cb_instruction_by_opcode(opcode: Byte) -> &'static Instruction {
    &CB_INSTRUCTIONS[opcode as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNDEFINED: [u8; 11] = [0xD3, 0xDB, 0xDD, 0xE3, 0xE4, 0xEB, 0xEC, 0xED, 0xF4, 0xFC, 0xFD];

    #[test]
    fn test_undefined_opcodes() {
        for opcode in 0..=255u8 {
            let inst = instruction_by_opcode(opcode);
            assert_eq!(
                inst.is_valid(),
                !UNDEFINED.contains(&opcode),
                "opcode {opcode:#04X}"
            );
        }
    }

    #[test]
    fn test_costs_are_machine_cycles() {
        for table in [&INSTRUCTIONS, &CB_INSTRUCTIONS] {
            for inst in table.iter() {
                assert_eq!(inst.cycles % 4, 0);
                assert_eq!(inst.cycles_taken % 4, 0);
                assert!(inst.cycles_taken >= inst.cycles);
                assert!((1..=3).contains(&inst.length));
            }
        }
    }

    #[test]
    fn test_only_conditionals_have_two_costs() {
        for inst in INSTRUCTIONS.iter() {
            if inst.cond == ConditionType::None {
                assert_eq!(inst.cycles, inst.cycles_taken, "{inst:?}");
            } else {
                assert!(inst.cycles_taken > inst.cycles, "{inst:?}");
            }
        }
    }

    #[test]
    fn test_known_entries() {
        let call = instruction_by_opcode(0xCD);
        assert_eq!((call.length, call.cycles), (3, 24));

        let jr_nz = instruction_by_opcode(0x20);
        assert_eq!((jr_nz.cycles, jr_nz.cycles_taken), (8, 12));

        let ret_c = instruction_by_opcode(0xD8);
        assert_eq!((ret_c.cycles, ret_c.cycles_taken), (8, 20));

        let ld_a16_sp = instruction_by_opcode(0x08);
        assert_eq!((ld_a16_sp.length, ld_a16_sp.cycles), (3, 20));

        let rst_38 = instruction_by_opcode(0xFF);
        assert_eq!(rst_38.inst_type, InstructionType::Rst);
        assert_eq!(rst_38.param, 0x38);
    }

    #[test]
    fn test_cb_decode() {
        let rlc_b = cb_instruction_by_opcode(0x00);
        assert_eq!(rlc_b.inst_type, InstructionType::Rlc);
        assert_eq!(rlc_b.reg1, RegisterType::B);
        assert_eq!(rlc_b.cycles, 8);

        let swap_hl = cb_instruction_by_opcode(0x36);
        assert_eq!(swap_hl.inst_type, InstructionType::Swap);
        assert_eq!(swap_hl.mode, AddressingMode::MemoryRegisterOnly);
        assert_eq!(swap_hl.cycles, 16);

        let bit_7_hl = cb_instruction_by_opcode(0x7E);
        assert_eq!(bit_7_hl.inst_type, InstructionType::Bit);
        assert_eq!(bit_7_hl.param, 7);
        assert_eq!(bit_7_hl.cycles, 12);

        let set_3_a = cb_instruction_by_opcode(0xDF);
        assert_eq!(set_3_a.inst_type, InstructionType::Set);
        assert_eq!(set_3_a.reg1, RegisterType::A);
        assert_eq!(set_3_a.param, 3);
    }
}
