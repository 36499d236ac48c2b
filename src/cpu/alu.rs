//! Arithmetic and logic
//!
//! Pure functions: every operation takes its operands (and the incoming
//! carry where it matters) and returns the result with the complete flag
//! set it produces. Operations that leave a flag untouched take the old
//! value as input so the caller never patches flags afterwards.

use super::registers::Flags;
use crate::common::{Byte, Word};

/// ADD/ADC.
pub fn add8(a: Byte, value: Byte, carry_in: bool) -> (Byte, Flags) {
    let carry = carry_in as u16;
    let full = a as u16 + value as u16 + carry;
    let result = full as Byte;
    let flags = Flags {
        z: result == 0,
        n: false,
        h: (a & 0x0F) as u16 + (value & 0x0F) as u16 + carry > 0x0F,
        c: full > 0xFF,
    };
    (result, flags)
}

/// SUB/SBC, and CP when the result is discarded.
pub fn sub8(a: Byte, value: Byte, carry_in: bool) -> (Byte, Flags) {
    let carry = carry_in as i16;
    let full = a as i16 - value as i16 - carry;
    let result = full as Byte;
    let flags = Flags {
        z: result == 0,
        n: true,
        h: (a & 0x0F) as i16 - (value & 0x0F) as i16 - carry < 0,
        c: full < 0,
    };
    (result, flags)
}

pub fn and8(a: Byte, value: Byte) -> (Byte, Flags) {
    let result = a & value;
    (result, Flags { z: result == 0, n: false, h: true, c: false })
}

pub fn or8(a: Byte, value: Byte) -> (Byte, Flags) {
    let result = a | value;
    (result, Flags { z: result == 0, ..Flags::default() })
}

pub fn xor8(a: Byte, value: Byte) -> (Byte, Flags) {
    let result = a ^ value;
    (result, Flags { z: result == 0, ..Flags::default() })
}

/// 8-bit INC; carry is preserved.
pub fn inc8(value: Byte, carry: bool) -> (Byte, Flags) {
    let result = value.wrapping_add(1);
    let flags = Flags {
        z: result == 0,
        n: false,
        h: value & 0x0F == 0x0F,
        c: carry,
    };
    (result, flags)
}

/// 8-bit DEC; carry is preserved.
pub fn dec8(value: Byte, carry: bool) -> (Byte, Flags) {
    let result = value.wrapping_sub(1);
    let flags = Flags {
        z: result == 0,
        n: true,
        h: value & 0x0F == 0x00,
        c: carry,
    };
    (result, flags)
}

/// ADD HL,rr; zero is preserved, half carry is out of bit 11.
pub fn add16(hl: Word, value: Word, zero: bool) -> (Word, Flags) {
    let full = hl as u32 + value as u32;
    let flags = Flags {
        z: zero,
        n: false,
        h: (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF,
        c: full > 0xFFFF,
    };
    (full as Word, flags)
}

/// SP plus a signed byte, shared by ADD SP,e and LD HL,SP+e. Flags come
/// from the unsigned low-byte addition.
pub fn add_sp(sp: Word, offset: Byte) -> (Word, Flags) {
    let result = sp.wrapping_add(offset as i8 as i16 as Word);
    let flags = Flags {
        z: false,
        n: false,
        h: (sp & 0x000F) + (offset as Word & 0x000F) > 0x000F,
        c: (sp & 0x00FF) + offset as Word > 0x00FF,
    };
    (result, flags)
}

/// Decimal adjust after a BCD addition or subtraction; N is preserved.
pub fn daa(a: Byte, flags: Flags) -> (Byte, Flags) {
    let mut adjust = 0u8;
    let mut carry = flags.c;

    if flags.h || (!flags.n && a & 0x0F > 0x09) {
        adjust |= 0x06;
    }
    if flags.c || (!flags.n && a > 0x99) {
        adjust |= 0x60;
        carry = true;
    }

    let result = if flags.n {
        a.wrapping_sub(adjust)
    } else {
        a.wrapping_add(adjust)
    };
    (result, Flags { z: result == 0, n: flags.n, h: false, c: carry })
}

fn shifted(result: Byte, carry: bool) -> (Byte, Flags) {
    (result, Flags { z: result == 0, n: false, h: false, c: carry })
}

pub fn rlc(value: Byte) -> (Byte, Flags) {
    shifted(value.rotate_left(1), value & 0x80 != 0)
}

pub fn rrc(value: Byte) -> (Byte, Flags) {
    shifted(value.rotate_right(1), value & 0x01 != 0)
}

pub fn rl(value: Byte, carry: bool) -> (Byte, Flags) {
    shifted(value << 1 | carry as Byte, value & 0x80 != 0)
}

pub fn rr(value: Byte, carry: bool) -> (Byte, Flags) {
    shifted(value >> 1 | (carry as Byte) << 7, value & 0x01 != 0)
}

pub fn sla(value: Byte) -> (Byte, Flags) {
    shifted(value << 1, value & 0x80 != 0)
}

/// Arithmetic shift right: bit 7 is kept.
pub fn sra(value: Byte) -> (Byte, Flags) {
    shifted(((value as i8) >> 1) as Byte, value & 0x01 != 0)
}

pub fn srl(value: Byte) -> (Byte, Flags) {
    shifted(value >> 1, value & 0x01 != 0)
}

pub fn swap(value: Byte) -> (Byte, Flags) {
    shifted(value.rotate_left(4), false)
}

/// BIT n; carry is preserved.
pub fn test_bit(value: Byte, n: u8, carry: bool) -> Flags {
    Flags { z: value & (1 << n) == 0, n: false, h: true, c: carry }
}
