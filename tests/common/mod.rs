#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use shatter::{Emulator, EmulatorConfig, FrameBuffer, NullDiagnostics};

const BANK_SIZE: usize = 0x4000;
const TITLE: usize = 0x0134;
const CART_TYPE: usize = 0x0147;
const ROM_SIZE: usize = 0x0148;
const RAM_SIZE: usize = 0x0149;
const VERSION: usize = 0x014C;
const CHECKSUM: usize = 0x014D;
const PROGRAM: usize = 0x0150;

/// Builds cartridge images in memory.
pub struct RomBuilder {
    cart_type: u8,
    rom_code: u8,
    ram_code: u8,
    title: &'static str,
    program: Vec<u8>,
    patches: Vec<(usize, Vec<u8>)>,
}

impl RomBuilder {
    /// ROM-only, 32 KiB.
    pub fn new() -> Self {
        Self {
            cart_type: 0x00,
            rom_code: 0x00,
            ram_code: 0x00,
            title: "SHATTER",
            program: vec![0x18, 0xFE],
            patches: Vec::new(),
        }
    }

    pub fn cart_type(mut self, code: u8) -> Self {
        self.cart_type = code;
        self
    }

    pub fn ram_code(mut self, code: u8) -> Self {
        self.ram_code = code;
        self
    }

    /// Code placed at 0x0150; the entry point jumps straight to it.
    pub fn program(mut self, code: &[u8]) -> Self {
        self.program = code.to_vec();
        self
    }

    pub fn patch(mut self, address: usize, bytes: &[u8]) -> Self {
        self.patches.push((address, bytes.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut rom = vec![0u8; (2usize << self.rom_code) * BANK_SIZE];
        rom[0x0100..0x0104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
        rom[TITLE..TITLE + self.title.len()].copy_from_slice(self.title.as_bytes());
        rom[CART_TYPE] = self.cart_type;
        rom[ROM_SIZE] = self.rom_code;
        rom[RAM_SIZE] = self.ram_code;
        rom[PROGRAM..PROGRAM + self.program.len()].copy_from_slice(&self.program);
        for (address, bytes) in &self.patches {
            rom[*address..*address + bytes.len()].copy_from_slice(bytes);
        }
        rom[CHECKSUM] = rom[TITLE..=VERSION]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1));
        rom
    }
}

pub fn session(rom: Vec<u8>) -> Emulator {
    let mut emu = Emulator::new(EmulatorConfig::default(), Box::new(NullDiagnostics));
    emu.load_rom(rom).expect("valid image");
    emu
}

/// Every frame the session draws, in order.
pub fn record_frames(emu: &mut Emulator) -> Arc<Mutex<Vec<Vec<u8>>>> {
    let frames = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&frames);
    emu.set_draw_callback(Box::new(move |frame: &FrameBuffer| {
        sink.lock().unwrap().push(frame.to_vec());
    }));
    frames
}
