//! PPU Module
//!
//! Scanline timing state machine. Each visible line runs OAM scan (80
//! cycles), pixel transfer (172) and HBlank (204); lines 144-153 are
//! VBlank. A line is rendered when pixel transfer ends, and the finished
//! frame is handed to the draw callback on VBlank entry, which is the only
//! place frames leave the PPU.

pub mod render;

use crate::bus::Bus;
use crate::config::Palette;
use crate::interrupts::Interrupt;
use crate::lcd::PpuMode;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;
/// RGBA bytes per pixel.
pub const BYTES_PER_PIXEL: usize = 4;
pub const FRAME_BYTES: usize = SCREEN_WIDTH * SCREEN_HEIGHT * BYTES_PER_PIXEL;

pub const LINES_PER_FRAME: u8 = 154;
pub const CYCLES_PER_LINE: u32 = 456;
pub const CYCLES_PER_FRAME: u32 = CYCLES_PER_LINE * LINES_PER_FRAME as u32;

const OAM_SCAN_CYCLES: u32 = 80;
const TRANSFER_CYCLES: u32 = 172;
const HBLANK_CYCLES: u32 = CYCLES_PER_LINE - OAM_SCAN_CYCLES - TRANSFER_CYCLES;

/// A finished 160x144 frame, row-major RGBA.
pub type FrameBuffer = [u8; FRAME_BYTES];

#[derive(Debug, Clone)]
pub struct Ppu {
    mode: PpuMode,
    /// Cycles spent in the current mode
    cycles: u32,
    line: u8,
    /// Window rows drawn so far this frame
    window_line: u8,
    frame: Box<FrameBuffer>,
    palette: Palette,
    frame_count: u64,
}

impl Ppu {
    pub fn new(palette: Palette) -> Self {
        let mut ppu = Self {
            mode: PpuMode::OamScan,
            cycles: 0,
            line: 0,
            window_line: 0,
            frame: Box::new([0; FRAME_BYTES]),
            palette,
            frame_count: 0,
        };
        ppu.blank();
        ppu
    }

    /// Back to the top of line 0 with a blank frame.
    pub fn reset(&mut self) {
        self.mode = PpuMode::OamScan;
        self.cycles = 0;
        self.line = 0;
        self.window_line = 0;
        self.frame_count = 0;
        self.blank();
    }

    pub fn mode(&self) -> PpuMode {
        self.mode
    }

    pub fn line(&self) -> u8 {
        self.line
    }

    pub fn cycles_in_mode(&self) -> u32 {
        self.cycles
    }

    /// Frame as drawn so far.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// VBlank entries since the last reset.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn budget(&self) -> u32 {
        match self.mode {
            PpuMode::OamScan => OAM_SCAN_CYCLES,
            PpuMode::Transfer => TRANSFER_CYCLES,
            PpuMode::HBlank => HBLANK_CYCLES,
            PpuMode::VBlank => CYCLES_PER_LINE,
            PpuMode::LcdOff => u32::MAX,
        }
    }

    /// Fill the frame with the lightest shade.
    fn blank(&mut self) {
        let white = self.palette.rgba(0);
        for pixel in self.frame.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&white);
        }
    }

    /// Advance by `cycles`, calling `draw` once for every VBlank entry.
    pub fn tick<F>(&mut self, cycles: u32, bus: &mut Bus, mut draw: F)
    where
        F: FnMut(&FrameBuffer),
    {
        if !bus.lcd.lcd_enabled() {
            if self.mode != PpuMode::LcdOff {
                self.switch_off(bus);
            }
            return;
        }
        if self.mode == PpuMode::LcdOff {
            self.switch_on(bus);
        }

        self.cycles += cycles;
        loop {
            let budget = self.budget();
            debug_assert!(budget > 0, "zero-length PPU mode {:?}", self.mode);
            if self.cycles < budget {
                break;
            }
            self.cycles -= budget;
            self.advance(bus, &mut draw);
        }
    }

    fn switch_off(&mut self, bus: &mut Bus) {
        self.mode = PpuMode::LcdOff;
        self.cycles = 0;
        self.line = 0;
        self.window_line = 0;
        bus.lcd.set_mode(PpuMode::LcdOff);
        bus.lcd.set_ly(0);
        self.blank();
    }

    fn switch_on(&mut self, bus: &mut Bus) {
        self.cycles = 0;
        self.line = 0;
        self.enter(bus, PpuMode::OamScan);
        if bus.lcd.set_ly(0) {
            bus.request_interrupt(Interrupt::LcdStat);
        }
    }

    fn enter(&mut self, bus: &mut Bus, mode: PpuMode) {
        self.mode = mode;
        if bus.lcd.set_mode(mode) {
            bus.request_interrupt(Interrupt::LcdStat);
        }
    }

    fn set_line(&mut self, bus: &mut Bus, line: u8) {
        self.line = line;
        if bus.lcd.set_ly(line) {
            bus.request_interrupt(Interrupt::LcdStat);
        }
    }

    /// The current mode's budget is spent: move to the next state.
    fn advance<F>(&mut self, bus: &mut Bus, draw: &mut F)
    where
        F: FnMut(&FrameBuffer),
    {
        match self.mode {
            PpuMode::OamScan => self.enter(bus, PpuMode::Transfer),
            PpuMode::Transfer => {
                self.render_line(bus);
                self.enter(bus, PpuMode::HBlank);
            }
            PpuMode::HBlank => {
                let next = self.line + 1;
                self.set_line(bus, next);
                if next as usize == SCREEN_HEIGHT {
                    self.enter(bus, PpuMode::VBlank);
                    bus.request_interrupt(Interrupt::VBlank);
                    self.frame_count += 1;
                    draw(&self.frame);
                } else {
                    self.enter(bus, PpuMode::OamScan);
                }
            }
            PpuMode::VBlank => {
                let next = self.line + 1;
                if next == LINES_PER_FRAME {
                    self.window_line = 0;
                    self.set_line(bus, 0);
                    self.enter(bus, PpuMode::OamScan);
                } else {
                    self.set_line(bus, next);
                }
            }
            PpuMode::LcdOff => {}
        }
    }

    fn render_line(&mut self, bus: &Bus) {
        let mut shades = [0u8; SCREEN_WIDTH];
        let window_drawn = render::render_line(
            &bus.lcd,
            bus.vram(),
            bus.oam(),
            self.line,
            self.window_line,
            &mut shades,
        );
        if window_drawn {
            self.window_line = self.window_line.wrapping_add(1);
        }

        let start = self.line as usize * SCREEN_WIDTH * BYTES_PER_PIXEL;
        let row = &mut self.frame[start..start + SCREEN_WIDTH * BYTES_PER_PIXEL];
        for (pixel, &shade) in row.chunks_exact_mut(BYTES_PER_PIXEL).zip(shades.iter()) {
            pixel.copy_from_slice(&self.palette.rgba(shade));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MemoryBus;
    use crate::interrupts::IF_ADDRESS;
    use crate::lcd::{LCDC_ADDRESS, LYC_ADDRESS, STAT_ADDRESS};
    use proptest::prelude::*;

    fn setup() -> (Ppu, Bus) {
        let mut bus = Bus::new();
        bus.write(IF_ADDRESS, 0);
        (Ppu::new(Palette::Grayscale), bus)
    }

    fn tick(ppu: &mut Ppu, bus: &mut Bus, cycles: u32) -> usize {
        let mut frames = 0;
        ppu.tick(cycles, bus, |_| frames += 1);
        frames
    }

    fn state(ppu: &Ppu) -> (PpuMode, u8, u32, u64) {
        (ppu.mode(), ppu.line(), ppu.cycles_in_mode(), ppu.frame_count())
    }

    #[test]
    fn test_mode_sequence() {
        let (mut ppu, mut bus) = setup();
        assert_eq!(ppu.mode(), PpuMode::OamScan);

        tick(&mut ppu, &mut bus, 79);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        tick(&mut ppu, &mut bus, 1);
        assert_eq!(ppu.mode(), PpuMode::Transfer);
        assert_eq!(bus.read(STAT_ADDRESS) & 0x03, 3);

        tick(&mut ppu, &mut bus, 172);
        assert_eq!(ppu.mode(), PpuMode::HBlank);
        assert_eq!(bus.read(STAT_ADDRESS) & 0x03, 0);

        tick(&mut ppu, &mut bus, 204);
        assert_eq!(ppu.mode(), PpuMode::OamScan);
        assert_eq!(ppu.line(), 1);
        assert_eq!(bus.lcd.ly(), 1);
    }

    #[test]
    fn test_remainder_carries_over() {
        let (mut ppu, mut bus) = setup();
        tick(&mut ppu, &mut bus, 100);
        assert_eq!(ppu.mode(), PpuMode::Transfer);
        assert_eq!(ppu.cycles_in_mode(), 20);
    }

    #[test]
    fn test_vblank_entry() {
        let (mut ppu, mut bus) = setup();
        let frames = tick(&mut ppu, &mut bus, CYCLES_PER_LINE * 144 - 1);
        assert_eq!(frames, 0);
        assert_eq!(bus.read(IF_ADDRESS) & 0x01, 0);

        let frames = tick(&mut ppu, &mut bus, 1);
        assert_eq!(frames, 1);
        assert_eq!(ppu.mode(), PpuMode::VBlank);
        assert_eq!(ppu.line(), 144);
        assert_eq!(ppu.frame_count(), 1);
        assert_eq!(bus.read(IF_ADDRESS) & 0x01, 0x01);
    }

    #[test]
    fn test_full_frame_wraps_to_line_zero() {
        let (mut ppu, mut bus) = setup();
        let frames = tick(&mut ppu, &mut bus, CYCLES_PER_FRAME);
        assert_eq!(frames, 1);
        assert_eq!(state(&ppu), (PpuMode::OamScan, 0, 0, 1));

        tick(&mut ppu, &mut bus, CYCLES_PER_LINE * 153);
        assert_eq!(ppu.line(), 153);
        assert_eq!(ppu.mode(), PpuMode::VBlank);
    }

    #[test]
    fn test_stat_interrupt_on_hblank() {
        let (mut ppu, mut bus) = setup();
        bus.write(STAT_ADDRESS, 0x08);
        tick(&mut ppu, &mut bus, OAM_SCAN_CYCLES + TRANSFER_CYCLES - 1);
        assert_eq!(bus.read(IF_ADDRESS) & 0x02, 0);
        tick(&mut ppu, &mut bus, 1);
        assert_eq!(bus.read(IF_ADDRESS) & 0x02, 0x02);
    }

    #[test]
    fn test_lyc_coincidence() {
        let (mut ppu, mut bus) = setup();
        bus.write(LYC_ADDRESS, 3);
        bus.write(STAT_ADDRESS, 0x40);
        tick(&mut ppu, &mut bus, CYCLES_PER_LINE * 3 - 1);
        assert_eq!(bus.read(STAT_ADDRESS) & 0x04, 0);
        assert_eq!(bus.read(IF_ADDRESS) & 0x02, 0);

        tick(&mut ppu, &mut bus, 1);
        assert_eq!(bus.read(STAT_ADDRESS) & 0x04, 0x04);
        assert_eq!(bus.read(IF_ADDRESS) & 0x02, 0x02);
    }

    #[test]
    fn test_lcd_off_freezes_and_blanks() {
        let (mut ppu, mut bus) = setup();
        tick(&mut ppu, &mut bus, CYCLES_PER_LINE * 10 + 5);
        assert_eq!(ppu.line(), 10);

        bus.write(LCDC_ADDRESS, 0x11);
        let frames = tick(&mut ppu, &mut bus, CYCLES_PER_FRAME * 2);
        assert_eq!(frames, 0);
        assert_eq!(ppu.mode(), PpuMode::LcdOff);
        assert_eq!(bus.lcd.ly(), 0);
        assert_eq!(bus.read(STAT_ADDRESS) & 0x03, 0);
        assert!(ppu.frame().chunks_exact(4).all(|p| p == [0xFF, 0xFF, 0xFF, 0xFF]));

        bus.write(LCDC_ADDRESS, 0x91);
        tick(&mut ppu, &mut bus, 0);
        assert_eq!(state(&ppu), (PpuMode::OamScan, 0, 0, 0));
        tick(&mut ppu, &mut bus, CYCLES_PER_LINE);
        assert_eq!(ppu.line(), 1);
    }

    #[test]
    fn test_rendered_line_reaches_frame() {
        let (mut ppu, mut bus) = setup();
        // tile 1 solid colour 3, placed at map (0,0); BGP 0xFC maps 3 -> black
        for offset in 0..16 {
            bus.write(0x8010 + offset, 0xFF);
        }
        bus.write(0x9800, 1);

        let mut captured = Vec::new();
        ppu.tick(CYCLES_PER_FRAME, &mut bus, |frame| captured = frame.to_vec());
        assert_eq!(captured.len(), FRAME_BYTES);
        assert_eq!(&captured[..4], &[0x00, 0x00, 0x00, 0xFF]);
        assert_eq!(&captured[8 * 4..8 * 4 + 4], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    proptest! {
        #[test]
        fn prop_line_timing_is_chunking_invariant(
            chunks in proptest::collection::vec(1u32..=CYCLES_PER_LINE, 1..64)
        ) {
            let total: u32 = chunks.iter().sum();

            let (mut whole, mut whole_bus) = setup();
            tick(&mut whole, &mut whole_bus, total);

            let (mut split, mut split_bus) = setup();
            for &chunk in &chunks {
                tick(&mut split, &mut split_bus, chunk);
            }

            prop_assert_eq!(state(&whole), state(&split));
            prop_assert_eq!(whole_bus.read(IF_ADDRESS), split_bus.read(IF_ADDRESS));
        }

        #[test]
        fn prop_one_line_per_456_cycles(split in 0u32..=CYCLES_PER_LINE) {
            let (mut ppu, mut bus) = setup();
            tick(&mut ppu, &mut bus, split);
            tick(&mut ppu, &mut bus, CYCLES_PER_LINE - split);
            prop_assert_eq!(state(&ppu), (PpuMode::OamScan, 1, 0, 0));
        }

        #[test]
        fn prop_one_draw_per_frame(
            frames in 1u32..4,
            chunk in 1u32..=CYCLES_PER_LINE,
        ) {
            let (mut ppu, mut bus) = setup();
            let mut remaining = CYCLES_PER_FRAME * frames;
            let mut drawn = 0;
            while remaining > 0 {
                let step = chunk.min(remaining);
                drawn += tick(&mut ppu, &mut bus, step);
                remaining -= step;
            }
            prop_assert_eq!(drawn, frames as usize);
            prop_assert_eq!(ppu.frame_count(), frames as u64);
        }
    }
}
