//! Interrupts
//!
//! Interrupt kinds shared by the CPU, the memory bus and the devices that
//! raise requests. IE lives at 0xFFFF and IF at 0xFF0F; only the low five
//! bits of each are meaningful.

use crate::common::{Byte, Word};

/// Address of the interrupt flag register (IF).
pub const IF_ADDRESS: Word = 0xFF0F;
/// Address of the interrupt enable register (IE).
pub const IE_ADDRESS: Word = 0xFFFF;
/// Mask of the five bits IF/IE actually use.
pub const INTERRUPT_MASK: Byte = 0x1F;

/// Interrupt sources, declared in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    pub const ALL: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    /// Bit mask of this interrupt in IE/IF.
    pub fn bit(self) -> Byte {
        match self {
            Interrupt::VBlank => 0x01,
            Interrupt::LcdStat => 0x02,
            Interrupt::Timer => 0x04,
            Interrupt::Serial => 0x08,
            Interrupt::Joypad => 0x10,
        }
    }

    /// Fixed handler address.
    pub fn vector(self) -> Word {
        match self {
            Interrupt::VBlank => 0x0040,
            Interrupt::LcdStat => 0x0048,
            Interrupt::Timer => 0x0050,
            Interrupt::Serial => 0x0058,
            Interrupt::Joypad => 0x0060,
        }
    }

    /// Lowest-numbered interrupt set in `pending`, if any.
    pub fn highest_priority(pending: Byte) -> Option<Interrupt> {
        Self::ALL
            .into_iter()
            .find(|interrupt| pending & interrupt.bit() != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors() {
        assert_eq!(Interrupt::VBlank.vector(), 0x0040);
        assert_eq!(Interrupt::LcdStat.vector(), 0x0048);
        assert_eq!(Interrupt::Timer.vector(), 0x0050);
        assert_eq!(Interrupt::Serial.vector(), 0x0058);
        assert_eq!(Interrupt::Joypad.vector(), 0x0060);
    }

    #[test]
    fn test_priority_lower_bit_wins() {
        assert_eq!(Interrupt::highest_priority(0x00), None);
        assert_eq!(Interrupt::highest_priority(0x14), Some(Interrupt::Timer));
        assert_eq!(Interrupt::highest_priority(0x11), Some(Interrupt::VBlank));
        assert_eq!(Interrupt::highest_priority(0x10), Some(Interrupt::Joypad));
        // Unused upper bits never select anything.
        assert_eq!(Interrupt::highest_priority(0xE0), None);
    }
}
