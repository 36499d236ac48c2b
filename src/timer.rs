//! Timer
//!
//! DIV (0xFF04) is the upper byte of a free-running 16-bit counter. TIMA
//! (0xFF05) increments on the falling edge of the counter bit picked by TAC
//! (0xFF07) and reloads from TMA (0xFF06) when it overflows.

use crate::common::{Byte, Word};

pub const DIV_ADDRESS: Word = 0xFF04;
pub const TIMA_ADDRESS: Word = 0xFF05;
pub const TMA_ADDRESS: Word = 0xFF06;
pub const TAC_ADDRESS: Word = 0xFF07;

/// Internal counter value left behind by the boot ROM.
pub const POST_BOOT_DIV: u16 = 0xABCC;

/// TIMA increment rate selected by TAC bits 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSpeed {
    /// 4096 Hz
    Div1024,
    /// 262144 Hz
    Div16,
    /// 65536 Hz
    Div64,
    /// 16384 Hz
    Div256,
}

impl TimerSpeed {
    pub fn from_tac(tac: Byte) -> Self {
        match tac & 0x03 {
            0b00 => TimerSpeed::Div1024,
            0b01 => TimerSpeed::Div16,
            0b10 => TimerSpeed::Div64,
            0b11 => TimerSpeed::Div256,
            selector => {
                debug_assert!(false, "timer speed selector {selector:#04b} out of range");
                TimerSpeed::Div256
            }
        }
    }

    /// T-cycles per TIMA increment.
    pub fn period(self) -> u32 {
        match self {
            TimerSpeed::Div1024 => 1024,
            TimerSpeed::Div16 => 16,
            TimerSpeed::Div64 => 64,
            TimerSpeed::Div256 => 256,
        }
    }

    /// Counter bit whose falling edge clocks TIMA.
    fn counter_bit(self) -> u16 {
        match self {
            TimerSpeed::Div1024 => 9,
            TimerSpeed::Div16 => 3,
            TimerSpeed::Div64 => 5,
            TimerSpeed::Div256 => 7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Timer {
    counter: u16,
    tima: Byte,
    tma: Byte,
    tac: Byte,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            counter: POST_BOOT_DIV,
            tima: 0,
            tma: 0,
            tac: 0,
        }
    }

    pub fn read(&self, address: Word) -> Byte {
        match address {
            DIV_ADDRESS => (self.counter >> 8) as Byte,
            TIMA_ADDRESS => self.tima,
            TMA_ADDRESS => self.tma,
            TAC_ADDRESS => 0xF8 | self.tac,
            _ => 0xFF,
        }
    }

    /// Write a timer register. Returns `true` if the write overflowed TIMA.
    pub fn write(&mut self, address: Word, value: Byte) -> bool {
        match address {
            DIV_ADDRESS => {
                // Resetting the counter can itself produce a falling edge.
                let edge = self.enabled() && self.selected_bit(self.counter);
                self.counter = 0;
                edge && self.increment()
            }
            TIMA_ADDRESS => {
                self.tima = value;
                false
            }
            TMA_ADDRESS => {
                self.tma = value;
                false
            }
            TAC_ADDRESS => {
                self.tac = value & 0x07;
                false
            }
            _ => false,
        }
    }

    pub fn enabled(&self) -> bool {
        self.tac & 0x04 != 0
    }

    pub fn speed(&self) -> TimerSpeed {
        TimerSpeed::from_tac(self.tac)
    }

    fn selected_bit(&self, counter: u16) -> bool {
        (counter >> self.speed().counter_bit()) & 1 == 1
    }

    fn increment(&mut self) -> bool {
        let (next, overflow) = self.tima.overflowing_add(1);
        self.tima = if overflow { self.tma } else { next };
        overflow
    }

    /// Advance by `cycles` T-cycles. Returns `true` if TIMA overflowed at
    /// least once, meaning a timer interrupt should be requested.
    pub fn tick(&mut self, cycles: u32) -> bool {
        let mut overflowed = false;
        for _ in 0..cycles {
            let prev = self.counter;
            self.counter = self.counter.wrapping_add(1);

            if self.enabled() && self.selected_bit(prev) && !self.selected_bit(self.counter) {
                overflowed |= self.increment();
            }
        }
        overflowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{Bus, MemoryBus};
    use crate::interrupts::{Interrupt, IF_ADDRESS};
    use proptest::prelude::*;

    fn running(tac: Byte) -> Timer {
        let mut timer = Timer::new();
        timer.write(DIV_ADDRESS, 0);
        timer.write(TAC_ADDRESS, tac);
        timer
    }

    #[test]
    fn test_post_boot_div() {
        let timer = Timer::new();
        assert_eq!(timer.read(DIV_ADDRESS), 0xAB);
        assert!(!timer.enabled());
    }

    #[test]
    fn test_div_write_resets() {
        let mut timer = Timer::new();
        timer.write(DIV_ADDRESS, 0x42);
        assert_eq!(timer.read(DIV_ADDRESS), 0);
        timer.tick(256);
        assert_eq!(timer.read(DIV_ADDRESS), 1);
    }

    #[test]
    fn test_register_access() {
        let mut timer = Timer::new();
        timer.write(TIMA_ADDRESS, 0x12);
        timer.write(TMA_ADDRESS, 0x34);
        timer.write(TAC_ADDRESS, 0xFD);
        assert_eq!(timer.read(TIMA_ADDRESS), 0x12);
        assert_eq!(timer.read(TMA_ADDRESS), 0x34);
        assert_eq!(timer.read(TAC_ADDRESS), 0xFD);
        assert_eq!(timer.speed(), TimerSpeed::Div16);
    }

    #[test]
    fn test_disabled_timer_holds_tima() {
        let mut timer = running(0x00);
        assert!(!timer.tick(10_000));
        assert_eq!(timer.read(TIMA_ADDRESS), 0);
    }

    #[test]
    fn test_each_speed_period() {
        for tac in 0x04..=0x07 {
            let mut timer = running(tac);
            let period = timer.speed().period();
            timer.tick(period * 3);
            assert_eq!(timer.read(TIMA_ADDRESS), 3, "tac {tac:#04X}");
        }
    }

    #[test]
    fn test_overflow_reloads_tma() {
        let mut timer = running(0x05);
        timer.write(TIMA_ADDRESS, 0xFF);
        timer.write(TMA_ADDRESS, 0x42);

        assert!(!timer.tick(15));
        assert!(timer.tick(1));
        assert_eq!(timer.read(TIMA_ADDRESS), 0x42);
    }

    #[test]
    fn test_chunking_is_irrelevant() {
        let mut whole = running(0x05);
        let mut pieces = running(0x05);
        whole.tick(1000);
        for _ in 0..250 {
            pieces.tick(4);
        }
        assert_eq!(whole.read(TIMA_ADDRESS), pieces.read(TIMA_ADDRESS));
        assert_eq!(whole.read(DIV_ADDRESS), pieces.read(DIV_ADDRESS));
    }

    #[test]
    fn test_div_reset_falling_edge() {
        let mut timer = running(0x05);
        timer.tick(8); // bit 3 now set
        timer.write(DIV_ADDRESS, 0);
        assert_eq!(timer.read(TIMA_ADDRESS), 1);
    }

    #[test]
    fn test_speed_selector_uses_low_bits() {
        for tac in 0..=0xFFu8 {
            let expected = [
                TimerSpeed::Div1024,
                TimerSpeed::Div16,
                TimerSpeed::Div64,
                TimerSpeed::Div256,
            ][(tac & 0x03) as usize];
            assert_eq!(TimerSpeed::from_tac(tac), expected);
        }
    }

    proptest! {
        #[test]
        fn prop_overflow_reloads_and_requests(speed in 0u8..4, tma in any::<u8>()) {
            let mut bus = Bus::new();
            bus.write(IF_ADDRESS, 0);
            bus.write(DIV_ADDRESS, 0);
            bus.write(TAC_ADDRESS, 0x04 | speed);
            bus.write(TMA_ADDRESS, tma);
            bus.write(TIMA_ADDRESS, 0xFF);

            let period = TimerSpeed::from_tac(speed).period();
            bus.tick(period - 1);
            prop_assert_eq!(bus.read(TIMA_ADDRESS), 0xFF);
            prop_assert_eq!(bus.read(IF_ADDRESS) & Interrupt::Timer.bit(), 0);

            bus.tick(1);
            prop_assert_eq!(bus.read(TIMA_ADDRESS), tma);
            prop_assert_eq!(bus.read(IF_ADDRESS) & 0x1F, Interrupt::Timer.bit());
        }

        #[test]
        fn prop_timer_overflow_reports_once(speed in 0u8..4, tma in any::<u8>()) {
            let mut timer = running(0x04 | speed);
            timer.write(TMA_ADDRESS, tma);
            timer.write(TIMA_ADDRESS, 0xFF);

            let period = timer.speed().period();
            prop_assert!(!timer.tick(period - 1));
            prop_assert!(timer.tick(1));
            prop_assert_eq!(timer.read(TIMA_ADDRESS), tma);
        }
    }
}
