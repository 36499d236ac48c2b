//! CPU Registers
//!
//! Eight 8-bit registers (A, F, B, C, D, E, H, L) viewed as the pairs AF,
//! BC, DE and HL, plus SP and PC. Pairs are combined and split
//! arithmetically; the high byte of each pair is the first-named register.

use crate::common::{bit, bit_set, hi, join, lo, Byte, Word};

/// Condition flags in F. Bits 0-3 of F always read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    /// Zero (bit 7)
    Z,
    /// Subtract (bit 6)
    N,
    /// Half carry (bit 5)
    H,
    /// Carry (bit 4)
    C,
}

impl Flag {
    fn bit(self) -> u8 {
        match self {
            Flag::Z => 7,
            Flag::N => 6,
            Flag::H => 5,
            Flag::C => 4,
        }
    }
}

/// Full flag result of an ALU operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    pub z: bool,
    pub n: bool,
    pub h: bool,
    pub c: bool,
}

impl Flags {
    pub fn from_byte(f: Byte) -> Self {
        Self {
            z: bit(f, 7),
            n: bit(f, 6),
            h: bit(f, 5),
            c: bit(f, 4),
        }
    }

    pub fn to_byte(self) -> Byte {
        (self.z as Byte) << 7 | (self.n as Byte) << 6 | (self.h as Byte) << 5 | (self.c as Byte) << 4
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers {
    pub a: Byte,
    f: Byte,
    pub b: Byte,
    pub c: Byte,
    pub d: Byte,
    pub e: Byte,
    pub h: Byte,
    pub l: Byte,
    pub pc: Word,
    pub sp: Word,
}

impl Registers {
    /// All registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// State the DMG boot ROM leaves behind when it jumps to 0x0100.
    pub fn post_boot() -> Self {
        let mut regs = Self::new();
        regs.set_af(0x01B0);
        regs.set_bc(0x0013);
        regs.set_de(0x00D8);
        regs.set_hl(0x014D);
        regs.sp = 0xFFFE;
        regs.pc = 0x0100;
        regs
    }

    #[inline]
    pub fn f(&self) -> Byte {
        self.f
    }

    #[inline]
    pub fn set_f(&mut self, value: Byte) {
        self.f = value & 0xF0;
    }

    #[inline]
    pub fn af(&self) -> Word {
        join(self.a, self.f)
    }

    #[inline]
    pub fn set_af(&mut self, value: Word) {
        self.a = hi(value);
        self.set_f(lo(value));
    }

    #[inline]
    pub fn bc(&self) -> Word {
        join(self.b, self.c)
    }

    #[inline]
    pub fn set_bc(&mut self, value: Word) {
        self.b = hi(value);
        self.c = lo(value);
    }

    #[inline]
    pub fn de(&self) -> Word {
        join(self.d, self.e)
    }

    #[inline]
    pub fn set_de(&mut self, value: Word) {
        self.d = hi(value);
        self.e = lo(value);
    }

    #[inline]
    pub fn hl(&self) -> Word {
        join(self.h, self.l)
    }

    #[inline]
    pub fn set_hl(&mut self, value: Word) {
        self.h = hi(value);
        self.l = lo(value);
    }

    #[inline]
    pub fn flag(&self, flag: Flag) -> bool {
        bit(self.f, flag.bit())
    }

    #[inline]
    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        bit_set(&mut self.f, flag.bit(), on);
    }

    #[inline]
    pub fn flags(&self) -> Flags {
        Flags::from_byte(self.f)
    }

    #[inline]
    pub fn set_flags(&mut self, flags: Flags) {
        self.f = flags.to_byte();
    }
}
