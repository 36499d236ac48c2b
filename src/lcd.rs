//! LCD registers
//!
//! LCDC (0xFF40), STAT (0xFF41), SCY/SCX, LY (read-only), LYC, the three
//! palettes and the window position. The PPU drives mode and LY through
//! [`Lcd::set_mode`] and [`Lcd::set_ly`]; both report whether the STAT
//! interrupt line fired so the caller can raise it on the bus.

use crate::common::{bit, bit_set, Byte, Word};

pub const LCDC_ADDRESS: Word = 0xFF40;
pub const STAT_ADDRESS: Word = 0xFF41;
pub const SCY_ADDRESS: Word = 0xFF42;
pub const SCX_ADDRESS: Word = 0xFF43;
pub const LY_ADDRESS: Word = 0xFF44;
pub const LYC_ADDRESS: Word = 0xFF45;
pub const BGP_ADDRESS: Word = 0xFF47;
pub const OBP0_ADDRESS: Word = 0xFF48;
pub const OBP1_ADDRESS: Word = 0xFF49;
pub const WY_ADDRESS: Word = 0xFF4A;
pub const WX_ADDRESS: Word = 0xFF4B;

/// Scanline state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpuMode {
    HBlank,
    VBlank,
    OamScan,
    Transfer,
    /// LCDC bit 7 clear; the machine is frozen at line 0.
    LcdOff,
}

impl PpuMode {
    /// Value of STAT bits 0-1 for this mode.
    pub fn stat_bits(self) -> Byte {
        match self {
            PpuMode::HBlank | PpuMode::LcdOff => 0,
            PpuMode::VBlank => 1,
            PpuMode::OamScan => 2,
            PpuMode::Transfer => 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Lcd {
    pub lcdc: Byte,
    /// STAT bits 3-6 (interrupt enables); mode and LYC flag are derived
    stat_enables: Byte,
    pub scy: Byte,
    pub scx: Byte,
    ly: Byte,
    pub lyc: Byte,
    pub bgp: Byte,
    pub obp0: Byte,
    pub obp1: Byte,
    pub wy: Byte,
    pub wx: Byte,
    mode: PpuMode,
}

impl Default for Lcd {
    fn default() -> Self {
        Self::new()
    }
}

impl Lcd {
    /// Post-boot register state.
    pub fn new() -> Self {
        Self {
            lcdc: 0x91,
            stat_enables: 0,
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: 0xFC,
            obp0: 0xFF,
            obp1: 0xFF,
            wy: 0,
            wx: 0,
            mode: PpuMode::OamScan,
        }
    }

    pub fn read(&self, address: Word) -> Byte {
        match address {
            LCDC_ADDRESS => self.lcdc,
            STAT_ADDRESS => self.stat(),
            SCY_ADDRESS => self.scy,
            SCX_ADDRESS => self.scx,
            LY_ADDRESS => self.ly,
            LYC_ADDRESS => self.lyc,
            BGP_ADDRESS => self.bgp,
            OBP0_ADDRESS => self.obp0,
            OBP1_ADDRESS => self.obp1,
            WY_ADDRESS => self.wy,
            WX_ADDRESS => self.wx,
            _ => 0xFF,
        }
    }

    /// Write a register. Returns `true` if the write raised the STAT line.
    pub fn write(&mut self, address: Word, value: Byte) -> bool {
        match address {
            LCDC_ADDRESS => self.lcdc = value,
            STAT_ADDRESS => self.stat_enables = value & 0x78,
            SCY_ADDRESS => self.scy = value,
            SCX_ADDRESS => self.scx = value,
            LY_ADDRESS => {}
            LYC_ADDRESS => {
                self.lyc = value;
                return self.lcd_enabled() && self.lyc_match() && self.lyc_int_enabled();
            }
            BGP_ADDRESS => self.bgp = value,
            OBP0_ADDRESS => self.obp0 = value,
            OBP1_ADDRESS => self.obp1 = value,
            WY_ADDRESS => self.wy = value,
            WX_ADDRESS => self.wx = value,
            _ => {}
        }
        false
    }

    /// Full STAT value; bit 7 always reads as 1.
    pub fn stat(&self) -> Byte {
        let mut stat = 0x80 | self.stat_enables | self.mode.stat_bits();
        bit_set(&mut stat, 2, self.lyc_match());
        stat
    }

    pub fn lcd_enabled(&self) -> bool {
        bit(self.lcdc, 7)
    }

    pub fn window_tile_map(&self) -> Word {
        if bit(self.lcdc, 6) {
            0x9C00
        } else {
            0x9800
        }
    }

    pub fn window_enabled(&self) -> bool {
        bit(self.lcdc, 5)
    }

    /// true = unsigned tile indices from 0x8000, false = signed from 0x9000
    pub fn unsigned_tile_data(&self) -> bool {
        bit(self.lcdc, 4)
    }

    pub fn bg_tile_map(&self) -> Word {
        if bit(self.lcdc, 3) {
            0x9C00
        } else {
            0x9800
        }
    }

    pub fn sprite_height(&self) -> u8 {
        if bit(self.lcdc, 2) {
            16
        } else {
            8
        }
    }

    pub fn sprites_enabled(&self) -> bool {
        bit(self.lcdc, 1)
    }

    pub fn bg_window_enabled(&self) -> bool {
        bit(self.lcdc, 0)
    }

    pub fn mode(&self) -> PpuMode {
        self.mode
    }

    pub fn ly(&self) -> Byte {
        self.ly
    }

    pub fn lyc_match(&self) -> bool {
        self.mode != PpuMode::LcdOff && self.ly == self.lyc
    }

    fn lyc_int_enabled(&self) -> bool {
        bit(self.stat_enables, 6)
    }

    /// Enter `mode`. Returns `true` if the matching STAT source is enabled.
    pub fn set_mode(&mut self, mode: PpuMode) -> bool {
        self.mode = mode;
        match mode {
            PpuMode::HBlank => bit(self.stat_enables, 3),
            PpuMode::VBlank => bit(self.stat_enables, 4),
            PpuMode::OamScan => bit(self.stat_enables, 5),
            PpuMode::Transfer | PpuMode::LcdOff => false,
        }
    }

    /// Move to scanline `ly`. Returns `true` if LY=LYC and that source is
    /// enabled.
    pub fn set_ly(&mut self, ly: Byte) -> bool {
        debug_assert!(ly <= 153, "scanline {ly} out of range");
        self.ly = ly;
        self.lyc_match() && self.lyc_int_enabled()
    }

    /// Shade (0-3) for background colour index `color`.
    pub fn bg_shade(&self, color: u8) -> u8 {
        (self.bgp >> (color * 2)) & 0x03
    }

    /// Shade (0-3) for sprite colour index `color` through OBP0 or OBP1.
    pub fn obj_shade(&self, color: u8, use_obp1: bool) -> u8 {
        let palette = if use_obp1 { self.obp1 } else { self.obp0 };
        (palette >> (color * 2)) & 0x03
    }
}
