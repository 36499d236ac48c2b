//! Cartridge
//!
//! Header parsing and bank controller selection. The cartridge-type byte at
//! 0x0147 picks one [`BankController`] implementation at load time; the
//! controller then owns the ROM and RAM bytes until the next load.

pub mod mbc1;
pub mod mbc3;
pub mod mbc5;
pub mod rom_only;

use std::fmt;
use std::fs;
use std::path::Path;

use crate::common::{Byte, Word};
use crate::diagnostics::Diagnostics;
use crate::error::LoadError;

pub use mbc1::Mbc1;
pub use mbc3::Mbc3;
pub use mbc5::Mbc5;
pub use rom_only::RomOnly;

/// ROM header offsets
const HEADER_TITLE_START: usize = 0x134;
const HEADER_TITLE_END: usize = 0x143;
const HEADER_CART_TYPE: usize = 0x147;
const HEADER_ROM_SIZE: usize = 0x148;
const HEADER_RAM_SIZE: usize = 0x149;
const HEADER_VERSION: usize = 0x14C;
const HEADER_CHECKSUM: usize = 0x14D;
/// First byte past the header; anything shorter cannot be a cartridge.
pub const HEADER_END: usize = 0x150;

/// Size of one switchable ROM bank.
pub const ROM_BANK_SIZE: usize = 0x4000;
/// Size of one external RAM bank.
pub const RAM_BANK_SIZE: usize = 0x2000;

/// Parsed cartridge header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomHeader {
    /// Game title (up to 16 characters)
    pub title: String,
    /// Cartridge type code (selects the bank controller)
    pub cart_type: Byte,
    /// ROM size code
    pub rom_size: Byte,
    /// RAM size code
    pub ram_size: Byte,
    /// Mask ROM version
    pub version: Byte,
    /// Header checksum as stored in the image
    pub checksum: Byte,
}

impl RomHeader {
    /// Parse the header from a raw image.
    pub fn parse(rom: &[Byte]) -> Result<Self, LoadError> {
        if rom.len() < HEADER_END {
            return Err(LoadError::Truncated { len: rom.len() });
        }

        let title = rom[HEADER_TITLE_START..=HEADER_TITLE_END]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect();

        let header = Self {
            title,
            cart_type: rom[HEADER_CART_TYPE],
            rom_size: rom[HEADER_ROM_SIZE],
            ram_size: rom[HEADER_RAM_SIZE],
            version: rom[HEADER_VERSION],
            checksum: rom[HEADER_CHECKSUM],
        };

        if header.rom_size > 0x08 {
            return Err(LoadError::InvalidRomSize { code: header.rom_size });
        }
        Ok(header)
    }

    /// Number of 16 KiB ROM banks the header declares.
    pub fn rom_banks(&self) -> usize {
        2 << self.rom_size as usize
    }

    /// Declared ROM size in bytes.
    pub fn rom_size_bytes(&self) -> usize {
        self.rom_banks() * ROM_BANK_SIZE
    }

    /// Declared external RAM size in bytes.
    pub fn ram_size_bytes(&self) -> usize {
        match self.ram_size {
            0x01 => 0x800,
            0x02 => 0x2000,
            0x03 => 0x8000,
            0x04 => 0x20000,
            0x05 => 0x10000,
            _ => 0,
        }
    }

    /// Controller family for the type code, or `None` if unsupported.
    pub fn kind(&self) -> Option<MbcKind> {
        MbcKind::from_cart_type(self.cart_type)
    }

    /// Human readable name of the cartridge type.
    pub fn cart_type_name(&self) -> &'static str {
        match self.cart_type {
            0x00 => "ROM ONLY",
            0x01 => "MBC1",
            0x02 => "MBC1+RAM",
            0x03 => "MBC1+RAM+BATTERY",
            0x05 => "MBC2",
            0x06 => "MBC2+BATTERY",
            0x08 => "ROM+RAM",
            0x09 => "ROM+RAM+BATTERY",
            0x0B => "MMM01",
            0x0C => "MMM01+RAM",
            0x0D => "MMM01+RAM+BATTERY",
            0x0F => "MBC3+TIMER+BATTERY",
            0x10 => "MBC3+TIMER+RAM+BATTERY",
            0x11 => "MBC3",
            0x12 => "MBC3+RAM",
            0x13 => "MBC3+RAM+BATTERY",
            0x19 => "MBC5",
            0x1A => "MBC5+RAM",
            0x1B => "MBC5+RAM+BATTERY",
            0x1C => "MBC5+RUMBLE",
            0x1D => "MBC5+RUMBLE+RAM",
            0x1E => "MBC5+RUMBLE+RAM+BATTERY",
            0x20 => "MBC6",
            0x22 => "MBC7+SENSOR+RUMBLE+RAM+BATTERY",
            0xFC => "POCKET CAMERA",
            0xFD => "BANDAI TAMA5",
            0xFE => "HuC3",
            0xFF => "HuC1+RAM+BATTERY",
            _ => "UNKNOWN",
        }
    }

    /// Check if cartridge RAM is battery backed.
    pub fn has_battery(&self) -> bool {
        matches!(
            self.cart_type,
            0x03 | 0x06 | 0x09 | 0x0D | 0x0F | 0x10 | 0x13 | 0x1B | 0x1E | 0x22 | 0xFF
        )
    }

    /// Header checksum over 0x134..=0x14C.
    pub fn compute_checksum(rom: &[Byte]) -> Byte {
        rom[HEADER_TITLE_START..=HEADER_VERSION]
            .iter()
            .fold(0u8, |acc, &b| acc.wrapping_sub(b).wrapping_sub(1))
    }
}

/// Supported bank controller families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcKind {
    RomOnly,
    Mbc1,
    Mbc3,
    Mbc5,
}

impl MbcKind {
    /// Map a cartridge-type code to a controller family.
    pub fn from_cart_type(code: Byte) -> Option<Self> {
        match code {
            0x00 | 0x08 | 0x09 => Some(MbcKind::RomOnly),
            0x01..=0x03 => Some(MbcKind::Mbc1),
            0x0F..=0x13 => Some(MbcKind::Mbc3),
            0x19..=0x1E => Some(MbcKind::Mbc5),
            _ => None,
        }
    }
}

impl fmt::Display for MbcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MbcKind::RomOnly => "ROM only",
            MbcKind::Mbc1 => "MBC1",
            MbcKind::Mbc3 => "MBC3",
            MbcKind::Mbc5 => "MBC5",
        };
        f.write_str(name)
    }
}

/// Capability set every cartridge mapper provides.
///
/// `read`/`write` see the raw CPU addresses 0x0000-0x7FFF and
/// 0xA000-0xBFFF; the memory bus never forwards anything else.
pub trait BankController: fmt::Debug + Send {
    fn kind(&self) -> MbcKind;

    fn read(&self, address: Word) -> Byte;

    fn write(&mut self, address: Word, value: Byte);

    /// External RAM contents, for persistence.
    fn ram(&self) -> &[Byte];

    /// Mutable external RAM, for restoring persisted contents.
    fn ram_mut(&mut self) -> &mut [Byte];

    /// Advance any cartridge-side clock by `cycles` T-cycles.
    fn tick(&mut self, _cycles: u32) {}
}

/// Number of whole ROM banks in `rom`, never zero.
pub(crate) fn bank_count(len: usize, bank_size: usize) -> usize {
    (len / bank_size).max(1)
}

/// Read `offset` within `bank` of `data`, open bus past the end.
pub(crate) fn banked_read(data: &[Byte], bank: usize, bank_size: usize, offset: usize) -> Byte {
    data.get(bank * bank_size + offset).copied().unwrap_or(0xFF)
}

/// A loaded cartridge: parsed header plus the active bank controller.
#[derive(Debug)]
pub struct Cartridge {
    pub header: RomHeader,
    controller: Box<dyn BankController>,
}

impl Cartridge {
    /// Read an image from disk and build its controller.
    pub fn load<P: AsRef<Path>>(path: P, diag: &mut dyn Diagnostics) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let rom = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(rom, diag)
    }

    /// Build a cartridge from an in-memory image.
    ///
    /// An unsupported cartridge type falls back to ROM-only mapping with a
    /// warning; only a missing or malformed header fails the load.
    pub fn from_bytes(rom: Vec<Byte>, diag: &mut dyn Diagnostics) -> Result<Self, LoadError> {
        let header = RomHeader::parse(&rom)?;

        if RomHeader::compute_checksum(&rom) != header.checksum {
            diag.warn(format_args!(
                "header checksum mismatch (stored 0x{:02X}, computed 0x{:02X})",
                header.checksum,
                RomHeader::compute_checksum(&rom)
            ));
        }
        if rom.len() < header.rom_size_bytes() {
            diag.warn(format_args!(
                "image is {} bytes but header declares {}; missing banks read as 0xFF",
                rom.len(),
                header.rom_size_bytes()
            ));
        }

        let kind = match header.kind() {
            Some(kind) => kind,
            None => {
                diag.warn(format_args!(
                    "unsupported cartridge type 0x{:02X} ({}), falling back to ROM only",
                    header.cart_type,
                    header.cart_type_name()
                ));
                MbcKind::RomOnly
            }
        };

        let ram = vec![0; header.ram_size_bytes()];
        let controller: Box<dyn BankController> = match kind {
            MbcKind::RomOnly => Box::new(RomOnly::new(rom, ram)),
            MbcKind::Mbc1 => Box::new(Mbc1::new(rom, ram)),
            MbcKind::Mbc3 => Box::new(Mbc3::new(rom, ram)),
            MbcKind::Mbc5 => Box::new(Mbc5::new(rom, ram)),
        };

        diag.debug(format_args!(
            "loaded '{}': {} ({}), {} KiB ROM, {} KiB RAM",
            header.title,
            header.cart_type_name(),
            kind,
            header.rom_size_bytes() / 1024,
            header.ram_size_bytes() / 1024
        ));

        Ok(Self { header, controller })
    }

    pub fn kind(&self) -> MbcKind {
        self.controller.kind()
    }

    #[inline]
    pub fn read(&self, address: Word) -> Byte {
        self.controller.read(address)
    }

    #[inline]
    pub fn write(&mut self, address: Word, value: Byte) {
        self.controller.write(address, value);
    }

    pub fn tick(&mut self, cycles: u32) {
        self.controller.tick(cycles);
    }

    pub fn has_battery(&self) -> bool {
        self.header.has_battery()
    }

    /// Current external RAM bytes.
    pub fn ram(&self) -> &[Byte] {
        self.controller.ram()
    }

    /// Overwrite external RAM with persisted bytes.
    ///
    /// Copies as much as fits and returns the number of bytes taken.
    pub fn load_ram(&mut self, data: &[Byte]) -> usize {
        let ram = self.controller.ram_mut();
        let len = ram.len().min(data.len());
        ram[..len].copy_from_slice(&data[..len]);
        len
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::diagnostics::RecordingDiagnostics;
    use log::Level;

    /// Build an image with `banks` ROM banks; every byte of bank `n`
    /// (outside the header) holds `n`.
    pub(crate) fn banked_rom(cart_type: Byte, rom_code: Byte, ram_code: Byte) -> Vec<Byte> {
        let banks = 2usize << rom_code;
        let mut rom = vec![0u8; banks * ROM_BANK_SIZE];
        for (bank, chunk) in rom.chunks_mut(ROM_BANK_SIZE).enumerate() {
            chunk.fill(bank as u8);
        }
        rom[HEADER_TITLE_START..=HEADER_CHECKSUM].fill(0);
        rom[HEADER_TITLE_START..HEADER_TITLE_START + 4].copy_from_slice(b"TEST");
        rom[HEADER_CART_TYPE] = cart_type;
        rom[HEADER_ROM_SIZE] = rom_code;
        rom[HEADER_RAM_SIZE] = ram_code;
        rom[HEADER_CHECKSUM] = RomHeader::compute_checksum(&rom);
        rom
    }

    #[test]
    fn test_header_parse() {
        let rom = banked_rom(0x00, 0x00, 0x00);
        let header = RomHeader::parse(&rom).unwrap();

        assert_eq!(header.title, "TEST");
        assert_eq!(header.cart_type, 0x00);
        assert_eq!(header.rom_banks(), 2);
        assert_eq!(header.rom_size_bytes(), 0x8000);
        assert_eq!(header.ram_size_bytes(), 0);
        assert_eq!(header.cart_type_name(), "ROM ONLY");
    }

    #[test]
    fn test_truncated_image_is_fatal() {
        let mut diag = RecordingDiagnostics::new();
        let err = Cartridge::from_bytes(vec![0; 0x100], &mut diag).unwrap_err();
        assert!(matches!(err, LoadError::Truncated { len: 0x100 }));
    }

    #[test]
    fn test_invalid_rom_size_is_fatal() {
        let mut rom = banked_rom(0x00, 0x00, 0x00);
        rom[HEADER_ROM_SIZE] = 0x52;
        let err = RomHeader::parse(&rom).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRomSize { code: 0x52 }));
    }

    #[test]
    fn test_kind_selection() {
        assert_eq!(MbcKind::from_cart_type(0x00), Some(MbcKind::RomOnly));
        for code in 0x01..=0x03 {
            assert_eq!(MbcKind::from_cart_type(code), Some(MbcKind::Mbc1));
        }
        for code in 0x0F..=0x13 {
            assert_eq!(MbcKind::from_cart_type(code), Some(MbcKind::Mbc3));
        }
        for code in 0x19..=0x1E {
            assert_eq!(MbcKind::from_cart_type(code), Some(MbcKind::Mbc5));
        }
        assert_eq!(MbcKind::from_cart_type(0x05), None);
        assert_eq!(MbcKind::from_cart_type(0xFC), None);
    }

    #[test]
    fn test_unknown_type_falls_back_with_warning() {
        let rom = banked_rom(0xFC, 0x00, 0x00);
        let mut diag = RecordingDiagnostics::new();
        let cart = Cartridge::from_bytes(rom, &mut diag).unwrap();

        assert_eq!(cart.kind(), MbcKind::RomOnly);
        assert_eq!(diag.count(Level::Warn), 1);
        assert!(diag.entries[0].1.contains("0xFC"));
        assert_eq!(cart.read(0x4000), 1);
    }

    #[test]
    fn test_checksum_mismatch_warns() {
        let mut rom = banked_rom(0x00, 0x00, 0x00);
        rom[HEADER_CHECKSUM] ^= 0xFF;
        let mut diag = RecordingDiagnostics::new();
        Cartridge::from_bytes(rom, &mut diag).unwrap();
        assert_eq!(diag.count(Level::Warn), 1);
    }

    #[test]
    fn test_short_image_warns_and_reads_open_bus() {
        let mut rom = banked_rom(0x00, 0x00, 0x00);
        rom.truncate(0x4000);
        let mut diag = RecordingDiagnostics::new();
        let cart = Cartridge::from_bytes(rom, &mut diag).unwrap();
        assert_eq!(diag.count(Level::Warn), 1);
        assert_eq!(cart.read(0x4000), 0xFF);
    }

    #[test]
    fn test_load_ram_copies_what_fits() {
        let rom = banked_rom(0x03, 0x01, 0x02);
        let mut diag = RecordingDiagnostics::new();
        let mut cart = Cartridge::from_bytes(rom, &mut diag).unwrap();
        assert!(cart.has_battery());

        let saved = vec![0x5A; 0x3000];
        assert_eq!(cart.load_ram(&saved), 0x2000);
        assert!(cart.ram().iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let mut diag = RecordingDiagnostics::new();
        let err = Cartridge::load("/nonexistent/definitely/missing.gb", &mut diag).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
