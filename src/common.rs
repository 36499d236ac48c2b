//! Common types and bit helpers shared by every hardware component.

/// 8-bit value as seen on the data bus.
pub type Byte = u8;

/// 16-bit value: addresses and register pairs.
pub type Word = u16;

/// Number of T-cycles the DMG clock runs per second.
pub const CLOCK_HZ: u32 = 4_194_304;

/// Check if bit `n` of `value` is set.
#[inline]
pub fn bit(value: Byte, n: u8) -> bool {
    (value & (1 << n)) != 0
}

/// Set or clear bit `n` of `value`.
#[inline]
pub fn bit_set(value: &mut Byte, n: u8, on: bool) {
    if on {
        *value |= 1 << n;
    } else {
        *value &= !(1 << n);
    }
}

/// High byte of a word, computed arithmetically.
#[inline]
pub fn hi(value: Word) -> Byte {
    (value >> 8) as Byte
}

/// Low byte of a word, computed arithmetically.
#[inline]
pub fn lo(value: Word) -> Byte {
    (value & 0x00FF) as Byte
}

/// Combine a high and a low byte into a word.
#[inline]
pub fn join(hi: Byte, lo: Byte) -> Word {
    ((hi as Word) << 8) | lo as Word
}
